//! Linked GitHub issues over the shell bridge. A deliberately small mirror
//! of the ClickUp facade: issue pages, issue detail and engine-backed
//! search for repositories the tool has linked to a project.

pub mod client;
pub mod issue;

pub use client::{keys, GithubClient, GithubClientConfig, DEFAULT_ISSUE_STALE_TIME};
pub use issue::{Issue, IssuePage, IssueState};

//! ClickUp tracker client over the shell bridge. Every read is a cached
//! query with a per-resource staleness profile; mutations go straight to
//! the backend and invalidate the affected cache prefix.

pub mod client;
pub mod context;

pub use client::{
    keys, ClickUpClient, ClickUpClientConfig, DEFAULT_AUTH_STALE_TIME, DEFAULT_GC_TIME,
    DEFAULT_HIERARCHY_STALE_TIME, DEFAULT_LIST_RETRY, DEFAULT_TASK_STALE_TIME,
};
pub use context::task_context_markdown;

use serde::{Deserialize, Serialize};

use crate::identifiers::{SessionId, WorktreeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Waiting,
    Idle,
}

/// A chat session the backend runs against one worktree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub status: SessionStatus,
    pub date_created: String,
}

/// An isolated checkout the tool manages sessions against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeRecord {
    pub id: WorktreeId,
    pub name: String,
    pub branch: String,
    pub path: String,
}

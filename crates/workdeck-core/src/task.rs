use serde::{Deserialize, Serialize};

use crate::identifiers::TaskId;

/// Status category as reported by the tracker. Anything the backend sends
/// beyond the two well-known categories is a tracker-defined custom status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Open,
    Closed,
    #[serde(other)]
    Custom,
}

impl StatusCategory {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub status: String,
    pub color: String,
    #[serde(rename = "type")]
    pub category: StatusCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub initials: String,
}

/// A tracker task as it arrives over the bridge.
///
/// `date_created` is epoch milliseconds carried as a numeric string, exactly
/// as the backend forwards it. `parent` is set only for subtasks; grouping
/// assumes at most one level of nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub custom_id: Option<String>,
    pub name: String,
    pub status: TaskStatus,
    pub date_created: String,
    pub url: String,
    #[serde(default)]
    pub parent: Option<TaskId>,
    #[serde(default)]
    pub assignees: Vec<TaskUser>,
}

impl Task {
    /// Creation timestamp in epoch milliseconds, if the wire value parses.
    pub fn created_at_ms(&self) -> Option<u64> {
        self.date_created.trim().parse().ok()
    }
}

/// One page of a task listing plus the final-page marker. Repeated fetches
/// carry no dedup guarantee; merge sites dedupe by task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub last_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub comment_text: String,
    pub user: TaskUser,
    pub date: String,
}

/// Full task detail including description, comments and immediate subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: TaskId,
    #[serde(default)]
    pub custom_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub markdown_description: Option<String>,
    pub status: TaskStatus,
    pub date_created: String,
    pub url: String,
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub error: Option<String>,
}

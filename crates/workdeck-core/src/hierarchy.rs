use serde::{Deserialize, Serialize};

use crate::identifiers::{FolderId, ListId, SpaceId, WorkspaceId};
use crate::task::Task;

/// Some backend endpoints report `taskCount` as a number, others as a
/// string. Accept both and normalize to an optional string.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: ListId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub task_count: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub task_count: Option<String>,
    #[serde(default)]
    pub lists: Vec<TaskList>,
}

impl Folder {
    /// Lists shown in active browsing views. Archived lists stay fetchable
    /// by id but never appear here.
    pub fn active_lists(&self) -> impl Iterator<Item = &TaskList> {
        self.lists.iter().filter(|list| !list.archived)
    }
}

/// Folders and folderless lists of one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceHierarchy {
    pub space_id: SpaceId,
    pub folders: Vec<Folder>,
    pub folderless_lists: Vec<TaskList>,
}

impl SpaceHierarchy {
    pub fn active_folderless_lists(&self) -> impl Iterator<Item = &TaskList> {
        self.folderless_lists.iter().filter(|list| !list.archived)
    }
}

/// Tasks, lists and folders shared directly with the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedHierarchy {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub lists: Vec<TaskList>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

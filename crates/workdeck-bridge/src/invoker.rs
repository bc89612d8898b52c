use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::BridgeError;
use crate::vocabulary::command_ids;

/// Where the client layer is running. Browser contexts have no native
/// backend to call, so reads degrade and mutations are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEnvironment {
    Native,
    Browser,
}

impl ShellEnvironment {
    pub fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }
}

/// The RPC boundary to the native backend. Commands take a flat object of
/// named parameters and resolve to JSON payloads on the fixed camelCase
/// contract.
#[async_trait]
pub trait ShellInvoker: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError>;
}

/// Invoker for browser-only contexts. Collection reads resolve to empty
/// payloads, keyed detail reads to `null`; anything that would mutate
/// backend state is refused with [`BridgeError::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInvoker;

#[async_trait]
impl ShellInvoker for NullInvoker {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        debug!(command, "degrading bridge command outside the native shell");
        match command {
            command_ids::CLICKUP_CHECK_AUTH => Ok(json!({ "authenticated": false })),
            command_ids::CLICKUP_LIST_WORKSPACES
            | command_ids::CLICKUP_LIST_SPACES
            | command_ids::SESSION_LIST
            | command_ids::WORKTREE_LIST => Ok(json!([])),
            command_ids::GITHUB_LIST_ISSUES => Ok(json!({ "issues": [], "lastPage": true })),
            command_ids::CLICKUP_SPACE_HIERARCHY => Ok(json!({
                "spaceId": args.get("spaceId").cloned().unwrap_or(Value::Null),
                "folders": [],
                "folderlessLists": [],
            })),
            command_ids::CLICKUP_SHARED_HIERARCHY => Ok(json!({
                "tasks": [],
                "lists": [],
                "folders": [],
            })),
            command_ids::CLICKUP_LIST_TASKS | command_ids::CLICKUP_LIST_TASKS_IN_LIST => {
                Ok(json!({ "tasks": [], "lastPage": true }))
            }
            command_ids::CLICKUP_SEARCH_TASK_BY_ID
            | command_ids::CLICKUP_GET_TASK
            | command_ids::CLICKUP_AUTHORIZED_USER
            | command_ids::GITHUB_GET_ISSUE => Ok(Value::Null),
            _ => Err(BridgeError::Unsupported),
        }
    }
}

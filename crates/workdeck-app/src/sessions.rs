use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::debug;
use workdeck_bridge::{command_ids, event_ids, ShellEvents, ShellInvoker};
use workdeck_core::{ChatSession, WorktreeId, WorktreeRecord};
use workdeck_dashboard::WorktreeSessions;
use workdeck_query::{
    command_fetcher, KeyPrefix, QueryClient, QueryKey, QueryOptions, TypedSnapshot,
};

pub mod keys {
    pub const WORKTREES: &str = "worktree.list";
    pub const SESSIONS: &str = "session.list";
}

/// Cached access to the worktree and session lists the dashboard is built
/// from. Each worktree's session list is its own query, so one slow or
/// failing worktree never blocks the others from rendering.
#[derive(Clone)]
pub struct SessionDirectory {
    invoker: Arc<dyn ShellInvoker>,
    queries: QueryClient,
}

impl SessionDirectory {
    pub fn new(invoker: Arc<dyn ShellInvoker>, queries: QueryClient) -> Self {
        Self { invoker, queries }
    }

    pub async fn worktrees(&self) -> TypedSnapshot<Vec<WorktreeRecord>> {
        self.queries
            .query(
                QueryKey::new(keys::WORKTREES),
                QueryOptions::default(),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::WORKTREE_LIST,
                    json!({}),
                ),
            )
            .await
            .typed(command_ids::WORKTREE_LIST)
    }

    pub async fn sessions(&self, worktree: &WorktreeId) -> TypedSnapshot<Vec<ChatSession>> {
        self.queries
            .query(
                QueryKey::new(keys::SESSIONS).param(worktree.as_str()),
                QueryOptions::default(),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::SESSION_LIST,
                    json!({ "worktreeId": worktree.as_str() }),
                ),
            )
            .await
            .typed(command_ids::SESSION_LIST)
    }

    /// Resolve the dashboard's input: every worktree paired with its
    /// sessions. A worktree whose session query is idle or failed shows as
    /// empty rather than blocking the list.
    pub async fn dashboard_input(&self) -> Vec<WorktreeSessions> {
        let Some(worktrees) = self.worktrees().await.data else {
            return Vec::new();
        };
        let mut groups = Vec::with_capacity(worktrees.len());
        for worktree in worktrees {
            let sessions = self.sessions(&worktree.id).await.data.unwrap_or_default();
            groups.push(WorktreeSessions { worktree, sessions });
        }
        groups
    }

    /// Invalidate the worktree/session entries whenever the backend
    /// reports a session change. Runs until the event hub is dropped.
    pub fn spawn_change_subscription(&self, events: &ShellEvents) -> JoinHandle<()> {
        let mut subscription = events.listen(event_ids::SESSION_CHANGED);
        let queries = self.queries.clone();
        tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                debug!("session change reported; invalidating dashboard queries");
                queries.invalidate_prefix(&KeyPrefix::kind(keys::SESSIONS));
                queries.invalidate_prefix(&KeyPrefix::kind(keys::WORKTREES));
            }
        })
    }
}

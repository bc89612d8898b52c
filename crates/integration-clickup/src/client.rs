use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use workdeck_bridge::{command_ids, event_ids, BridgeError, ShellEvents, ShellInvoker};
use workdeck_core::{
    filter_by_query, looks_like_identifier, merge_direct_lookup, AuthStatus, AuthenticatedUser,
    ListId, SharedHierarchy, Space, SpaceHierarchy, SpaceId, Task, TaskDetail, TaskId, TaskPage,
    Workspace, WorkspaceId,
};
use workdeck_query::{
    command_fetcher, KeyPrefix, QueryClient, QueryKey, QueryOptions, TypedSnapshot, NEVER,
};

pub const DEFAULT_AUTH_STALE_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_HIERARCHY_STALE_TIME: Duration = Duration::from_secs(300);
pub const DEFAULT_TASK_STALE_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);
pub const DEFAULT_LIST_RETRY: u32 = 1;

/// Cache key kinds for every ClickUp resource. All of them share the
/// [`keys::PREFIX`] so auth changes can drop the whole tracker at once.
pub mod keys {
    pub const PREFIX: &str = "clickup";
    pub const AUTH: &str = "clickup.auth";
    pub const AUTHORIZED_USER: &str = "clickup.authorized_user";
    pub const WORKSPACES: &str = "clickup.workspaces";
    pub const SPACES: &str = "clickup.spaces";
    pub const SPACE_HIERARCHY: &str = "clickup.space_hierarchy";
    pub const SHARED_HIERARCHY: &str = "clickup.shared_hierarchy";
    pub const TASKS: &str = "clickup.tasks";
    pub const TASKS_IN_LIST: &str = "clickup.tasks_in_list";
    pub const TASK_DETAIL: &str = "clickup.task_detail";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickUpClientConfig {
    pub auth_stale_time: Duration,
    pub hierarchy_stale_time: Duration,
    pub task_stale_time: Duration,
    pub gc_time: Duration,
    pub list_retry: u32,
}

impl Default for ClickUpClientConfig {
    fn default() -> Self {
        Self {
            auth_stale_time: DEFAULT_AUTH_STALE_TIME,
            hierarchy_stale_time: DEFAULT_HIERARCHY_STALE_TIME,
            task_stale_time: DEFAULT_TASK_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            list_retry: DEFAULT_LIST_RETRY,
        }
    }
}

/// Typed facade over the ClickUp command surface of the backend.
#[derive(Clone)]
pub struct ClickUpClient {
    invoker: Arc<dyn ShellInvoker>,
    queries: QueryClient,
    config: ClickUpClientConfig,
}

impl ClickUpClient {
    pub fn new(
        invoker: Arc<dyn ShellInvoker>,
        queries: QueryClient,
        config: ClickUpClientConfig,
    ) -> Self {
        Self {
            invoker,
            queries,
            config,
        }
    }

    pub async fn auth_status(&self) -> TypedSnapshot<AuthStatus> {
        self.queries
            .query(
                QueryKey::new(keys::AUTH),
                self.auth_options(),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_CHECK_AUTH,
                    json!({}),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_CHECK_AUTH)
    }

    /// Profile of the signed-in user. Immutable for the lifetime of a
    /// token, so the entry is never considered stale and never collected.
    pub async fn authorized_user(&self) -> TypedSnapshot<AuthenticatedUser> {
        self.queries
            .query(
                QueryKey::new(keys::AUTHORIZED_USER),
                QueryOptions::default()
                    .stale_time(NEVER)
                    .gc_time(NEVER)
                    .retry(self.config.list_retry),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_AUTHORIZED_USER,
                    json!({}),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_AUTHORIZED_USER)
    }

    pub async fn workspaces(&self) -> TypedSnapshot<Vec<Workspace>> {
        self.queries
            .query(
                QueryKey::new(keys::WORKSPACES),
                self.hierarchy_options(),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_LIST_WORKSPACES,
                    json!({}),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_LIST_WORKSPACES)
    }

    /// Spaces of a workspace. With no workspace selected yet the query is
    /// disabled and resolves idle, never as an error.
    pub async fn spaces(&self, workspace: Option<&WorkspaceId>) -> TypedSnapshot<Vec<Space>> {
        let workspace_id = workspace.map(|id| id.as_str().to_owned()).unwrap_or_default();
        self.queries
            .query(
                QueryKey::new(keys::SPACES).param(workspace_id.clone()),
                self.hierarchy_options().enabled(workspace.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_LIST_SPACES,
                    json!({ "workspaceId": workspace_id }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_LIST_SPACES)
    }

    /// Folders plus folderless lists of a space, fetched lazily when a
    /// space node is expanded in the browse tree.
    pub async fn space_hierarchy(&self, space: Option<&SpaceId>) -> TypedSnapshot<SpaceHierarchy> {
        let space_id = space.map(|id| id.as_str().to_owned()).unwrap_or_default();
        self.queries
            .query(
                QueryKey::new(keys::SPACE_HIERARCHY).param(space_id.clone()),
                self.hierarchy_options().enabled(space.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_SPACE_HIERARCHY,
                    json!({ "spaceId": space_id }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_SPACE_HIERARCHY)
    }

    pub async fn shared_hierarchy(
        &self,
        workspace: Option<&WorkspaceId>,
    ) -> TypedSnapshot<SharedHierarchy> {
        let workspace_id = workspace.map(|id| id.as_str().to_owned()).unwrap_or_default();
        self.queries
            .query(
                QueryKey::new(keys::SHARED_HIERARCHY).param(workspace_id.clone()),
                self.hierarchy_options().enabled(workspace.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_SHARED_HIERARCHY,
                    json!({ "workspaceId": workspace_id }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_SHARED_HIERARCHY)
    }

    /// One page of tasks across a workspace, optionally restricted to
    /// spaces. Closed tasks are excluded unless asked for.
    pub async fn tasks(
        &self,
        workspace: Option<&WorkspaceId>,
        space_ids: &[SpaceId],
        include_closed: bool,
        page: u32,
    ) -> TypedSnapshot<TaskPage> {
        let workspace_id = workspace.map(|id| id.as_str().to_owned()).unwrap_or_default();
        let spaces: Vec<&str> = space_ids.iter().map(SpaceId::as_str).collect();
        self.queries
            .query(
                QueryKey::new(keys::TASKS)
                    .param(workspace_id.clone())
                    .param(spaces.join(","))
                    .param(include_closed)
                    .param(page),
                self.task_options().enabled(workspace.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_LIST_TASKS,
                    json!({
                        "workspaceId": workspace_id,
                        "spaceIds": spaces,
                        "includeClosed": include_closed,
                        "page": page,
                    }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_LIST_TASKS)
    }

    pub async fn tasks_in_list(
        &self,
        list: Option<&ListId>,
        include_closed: bool,
        page: u32,
    ) -> TypedSnapshot<TaskPage> {
        let list_id = list.map(|id| id.as_str().to_owned()).unwrap_or_default();
        self.queries
            .query(
                QueryKey::new(keys::TASKS_IN_LIST)
                    .param(list_id.clone())
                    .param(include_closed)
                    .param(page),
                self.task_options().enabled(list.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_LIST_TASKS_IN_LIST,
                    json!({
                        "listId": list_id,
                        "includeClosed": include_closed,
                        "page": page,
                    }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_LIST_TASKS_IN_LIST)
    }

    /// Full detail of one task, comments and subtasks included.
    pub async fn task_detail(&self, task: Option<&TaskId>) -> TypedSnapshot<TaskDetail> {
        let task_id = task.map(|id| id.as_str().to_owned()).unwrap_or_default();
        self.queries
            .query(
                QueryKey::new(keys::TASK_DETAIL).param(task_id.clone()),
                self.task_options().enabled(task.is_some()),
                command_fetcher(
                    Arc::clone(&self.invoker),
                    command_ids::CLICKUP_GET_TASK,
                    json!({ "taskId": task_id }),
                ),
            )
            .await
            .typed(command_ids::CLICKUP_GET_TASK)
    }

    /// Filter an already fetched page by the user's query and, when the
    /// query plausibly names a task id, merge a direct lookup on top.
    pub async fn search_tasks(
        &self,
        workspace: &WorkspaceId,
        page: &TaskPage,
        query: &str,
    ) -> Vec<Task> {
        let direct_hit = if looks_like_identifier(query) {
            self.lookup_task_by_id(query, workspace).await
        } else {
            None
        };
        let filtered = filter_by_query(&page.tasks, query);
        merge_direct_lookup(filtered, direct_hit.as_ref())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Best-effort direct lookup by internal or custom id. Failures are
    /// treated as "not found": this channel only ever supplements the
    /// substring search, it is never authoritative.
    pub async fn lookup_task_by_id(&self, query: &str, workspace: &WorkspaceId) -> Option<Task> {
        let result = self
            .invoker
            .invoke(
                command_ids::CLICKUP_SEARCH_TASK_BY_ID,
                json!({ "query": query.trim(), "workspaceId": workspace.as_str() }),
            )
            .await;
        let payload = match result {
            Ok(payload) => payload,
            Err(error) => {
                debug!(%error, "task id lookup failed; treating as not found");
                return None;
            }
        };
        if payload.is_null() {
            return None;
        }
        match serde_json::from_value(payload) {
            Ok(task) => Some(task),
            Err(error) => {
                warn!(%error, "task id lookup returned an undecodable payload");
                None
            }
        }
    }

    /// Ask the backend to run the OAuth flow. Completion arrives later as
    /// a `clickup.auth_complete` event, not as this call's return.
    pub async fn start_oauth(&self) -> Result<(), BridgeError> {
        self.invoker
            .invoke(command_ids::CLICKUP_START_OAUTH, json!({}))
            .await?;
        Ok(())
    }

    /// Drop the stored token and every cached ClickUp resource.
    pub async fn logout(&self) -> Result<(), BridgeError> {
        self.invoker
            .invoke(command_ids::CLICKUP_LOGOUT, json!({}))
            .await?;
        self.queries.remove_prefix(&KeyPrefix::kind(keys::PREFIX));
        Ok(())
    }

    /// Invalidate every ClickUp entry whenever the backend reports a
    /// finished auth flow. Runs until the event hub is dropped.
    pub fn spawn_auth_subscription(&self, events: &ShellEvents) -> JoinHandle<()> {
        let mut subscription = events.listen(event_ids::CLICKUP_AUTH_COMPLETE);
        let queries = self.queries.clone();
        tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                debug!("tracker auth completed; invalidating cached ClickUp state");
                queries.invalidate_prefix(&KeyPrefix::kind(keys::PREFIX));
            }
        })
    }

    fn auth_options(&self) -> QueryOptions {
        QueryOptions::default()
            .stale_time(self.config.auth_stale_time)
            .gc_time(self.config.gc_time)
            .retry(self.config.list_retry)
    }

    fn hierarchy_options(&self) -> QueryOptions {
        QueryOptions::default()
            .stale_time(self.config.hierarchy_stale_time)
            .gc_time(self.config.gc_time)
            .retry(self.config.list_retry)
    }

    fn task_options(&self) -> QueryOptions {
        QueryOptions::default()
            .stale_time(self.config.task_stale_time)
            .gc_time(self.config.gc_time)
            .retry(self.config.list_retry)
    }
}

/// Stable command identifiers shared with the native backend.
///
/// These strings are public API vocabulary. They must be treated as stable
/// contracts and must not be renamed silently.
pub mod command_ids {
    pub const CLICKUP_CHECK_AUTH: &str = "clickup.check_auth";
    pub const CLICKUP_START_OAUTH: &str = "clickup.start_oauth";
    pub const CLICKUP_LOGOUT: &str = "clickup.logout";
    pub const CLICKUP_AUTHORIZED_USER: &str = "clickup.authorized_user";
    pub const CLICKUP_LIST_WORKSPACES: &str = "clickup.list_workspaces";
    pub const CLICKUP_LIST_SPACES: &str = "clickup.list_spaces";
    pub const CLICKUP_SPACE_HIERARCHY: &str = "clickup.space_hierarchy";
    pub const CLICKUP_SHARED_HIERARCHY: &str = "clickup.shared_hierarchy";
    pub const CLICKUP_LIST_TASKS: &str = "clickup.list_tasks";
    pub const CLICKUP_LIST_TASKS_IN_LIST: &str = "clickup.list_tasks_in_list";
    pub const CLICKUP_SEARCH_TASK_BY_ID: &str = "clickup.search_task_by_id";
    pub const CLICKUP_GET_TASK: &str = "clickup.get_task";

    pub const GITHUB_LIST_ISSUES: &str = "github.list_issues";
    pub const GITHUB_GET_ISSUE: &str = "github.get_issue";

    pub const SESSION_LIST: &str = "session.list";
    pub const WORKTREE_LIST: &str = "worktree.list";
}

/// Event names the backend publishes over the bridge.
pub mod event_ids {
    /// External OAuth flow finished; tracker caches must be refreshed.
    pub const CLICKUP_AUTH_COMPLETE: &str = "clickup.auth_complete";
    /// A chat session was created, renamed or closed.
    pub const SESSION_CHANGED: &str = "session.changed";
}

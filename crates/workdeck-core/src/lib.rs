//! Domain records and pure view logic shared across every workdeck crate.

pub mod filtering;
pub mod hierarchy;
pub mod identifiers;
pub mod session;
pub mod task;

pub use filtering::{
    filter_by_query, group_by_parent, is_recently_created, looks_like_identifier,
    merge_direct_lookup, SearchRecord, TaskGrouping, RECENT_TASK_WINDOW_MS,
};
pub use hierarchy::{Folder, SharedHierarchy, Space, SpaceHierarchy, TaskList, Workspace};
pub use identifiers::{
    FolderId, ListId, SessionId, SpaceId, TaskId, WorkspaceId, WorktreeId,
};
pub use session::{ChatSession, SessionStatus, WorktreeRecord};
pub use task::{
    AuthStatus, AuthenticatedUser, StatusCategory, Task, TaskComment, TaskDetail, TaskPage,
    TaskStatus, TaskUser,
};

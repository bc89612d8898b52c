//! Session/worktree dashboard state: flat card composition over the
//! per-worktree session queries, selection reconciliation, the lazy browse
//! tree and typed keyboard dispatch. Pure state — rendering lives with the
//! shell that embeds this layer.

pub mod browse;
pub mod cards;
pub mod keymap;
pub mod selection;

pub use browse::{BrowseNodeState, BrowseTree, LoadIndicator};
pub use cards::{compose_cards, selection_after_close, SessionCard, WorktreeSessions};
pub use keymap::{command_for_key, DashboardCommand};
pub use selection::Selection;

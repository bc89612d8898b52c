use std::collections::HashMap;

/// Lifecycle of one expandable browse node (space, folder or list).
/// Fetching is gated on expansion, so in-flight work is bounded by the
/// number of expanded nodes, never the full tree size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseNodeState {
    #[default]
    Collapsed,
    Loading,
    Loaded,
    Errored,
}

/// What a view shows for one node, given its query snapshot. A spinner
/// appears only while no data has ever been present; a stale value stays on
/// screen through a background refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadIndicator {
    Empty,
    Spinner,
    Content,
    ContentRefreshing,
    ErrorRetry,
}

impl LoadIndicator {
    pub fn from_flags(has_data: bool, is_fetching: bool, has_error: bool) -> Self {
        match (has_data, has_error, is_fetching) {
            (true, _, true) => Self::ContentRefreshing,
            (true, _, false) => Self::Content,
            (false, true, _) => Self::ErrorRetry,
            (false, false, true) => Self::Spinner,
            (false, false, false) => Self::Empty,
        }
    }
}

/// Expansion state for the whole browse tree, keyed by node id.
#[derive(Debug, Default)]
pub struct BrowseTree {
    states: HashMap<String, BrowseNodeState>,
}

impl BrowseTree {
    pub fn state(&self, node: &str) -> BrowseNodeState {
        self.states.get(node).copied().unwrap_or_default()
    }

    pub fn is_expanded(&self, node: &str) -> bool {
        self.state(node) != BrowseNodeState::Collapsed
    }

    /// Expand a node. Returns true when the transition enables the node's
    /// fetch; the cache decides whether the network is actually hit.
    pub fn expand(&mut self, node: &str) -> bool {
        match self.state(node) {
            BrowseNodeState::Collapsed | BrowseNodeState::Errored => {
                self.states
                    .insert(node.to_owned(), BrowseNodeState::Loading);
                true
            }
            BrowseNodeState::Loading | BrowseNodeState::Loaded => false,
        }
    }

    /// Collapse a node. The in-flight fetch, if any, is not cancelled and
    /// its cache entry persists for reuse on re-expansion.
    pub fn collapse(&mut self, node: &str) {
        self.states
            .insert(node.to_owned(), BrowseNodeState::Collapsed);
    }

    pub fn on_loaded(&mut self, node: &str) {
        if self.state(node) == BrowseNodeState::Loading {
            self.states.insert(node.to_owned(), BrowseNodeState::Loaded);
        }
    }

    pub fn on_error(&mut self, node: &str) {
        if self.state(node) == BrowseNodeState::Loading {
            self.states
                .insert(node.to_owned(), BrowseNodeState::Errored);
        }
    }
}

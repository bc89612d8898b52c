use workdeck_core::{ChatSession, SessionId, SessionStatus, WorktreeId, WorktreeRecord};

/// Sessions of one worktree, as resolved by that worktree's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeSessions {
    pub worktree: WorktreeRecord,
    pub sessions: Vec<ChatSession>,
}

/// One row of the flat dashboard list. `flat_index` is assigned at
/// composition time and is not a stable identity: the list is recomputed
/// on every input change, so consumers re-derive positions by matching
/// worktree and session ids, never by caching an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCard {
    pub flat_index: usize,
    pub worktree_id: WorktreeId,
    pub worktree_name: String,
    pub session_id: SessionId,
    pub session_title: String,
    pub session_status: SessionStatus,
}

/// Flatten the per-worktree session lists into one ordered card list.
/// Input order is preserved: worktrees in query order, sessions in each
/// worktree's order.
pub fn compose_cards(worktrees: &[WorktreeSessions]) -> Vec<SessionCard> {
    let mut cards = Vec::new();
    for group in worktrees {
        for session in &group.sessions {
            cards.push(SessionCard {
                flat_index: cards.len(),
                worktree_id: group.worktree.id.clone(),
                worktree_name: group.worktree.name.clone(),
                session_id: session.id.clone(),
                session_title: session.title.clone(),
                session_status: session.status,
            });
        }
    }
    cards
}

/// Which index to select after closing the card at `closed_index`, expressed
/// in the post-close list. Prefers the next sibling within the same
/// worktree, then the previous sibling; when the closed card was alone in
/// its worktree, falls back to the globally nearest remaining index by
/// absolute distance, ties broken toward the lower index.
pub fn selection_after_close(cards: &[SessionCard], closed_index: usize) -> Option<usize> {
    if closed_index >= cards.len() || cards.len() <= 1 {
        return None;
    }
    let closed = &cards[closed_index];

    if let Some(next) = cards.get(closed_index + 1) {
        if next.worktree_id == closed.worktree_id {
            // The next sibling shifts into the closed slot.
            return Some(closed_index);
        }
    }
    if closed_index > 0 && cards[closed_index - 1].worktree_id == closed.worktree_id {
        return Some(closed_index - 1);
    }

    let nearest_before = (0..cards.len())
        .filter(|&index| index != closed_index)
        .min_by_key(|&index| {
            (
                index.abs_diff(closed_index),
                index, // tie toward the lower index
            )
        })?;
    Some(if nearest_before < closed_index {
        nearest_before
    } else {
        nearest_before - 1
    })
}

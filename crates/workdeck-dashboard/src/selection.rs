use tracing::trace;
use workdeck_core::{SessionId, WorktreeId};

use crate::cards::SessionCard;

/// Dashboard selection held as an index plus the mirrored session identity.
/// Indices are recomputed on every composition, so the identity pair is the
/// durable half: [`Selection::reconcile`] re-derives the index from it after
/// each recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
    session: Option<(WorktreeId, SessionId)>,
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn session(&self) -> Option<&(WorktreeId, SessionId)> {
        self.session.as_ref()
    }

    pub fn clear(&mut self) {
        self.index = None;
        self.session = None;
    }

    pub fn select_index(&mut self, cards: &[SessionCard], index: usize) {
        match cards.get(index) {
            Some(card) => {
                self.index = Some(index);
                self.session = Some((card.worktree_id.clone(), card.session_id.clone()));
            }
            None => self.clear(),
        }
    }

    pub fn focus_next(&mut self, cards: &[SessionCard]) {
        if cards.is_empty() {
            self.clear();
            return;
        }
        let next = match self.index {
            Some(index) => (index + 1) % cards.len(),
            None => 0,
        };
        self.select_index(cards, next);
    }

    pub fn focus_previous(&mut self, cards: &[SessionCard]) {
        if cards.is_empty() {
            self.clear();
            return;
        }
        let previous = match self.index {
            Some(0) | None => cards.len() - 1,
            Some(index) => index - 1,
        };
        self.select_index(cards, previous);
    }

    /// Re-sync after the card list was recomputed. The mirrored identity
    /// wins when its session still exists anywhere in the new list; failing
    /// that, the old index is clamped into range; an empty list clears the
    /// selection.
    pub fn reconcile(&mut self, cards: &[SessionCard]) {
        if cards.is_empty() {
            self.clear();
            return;
        }

        if let Some((worktree_id, session_id)) = &self.session {
            if let Some(position) = cards.iter().position(|card| {
                &card.worktree_id == worktree_id && &card.session_id == session_id
            }) {
                if self.index != Some(position) {
                    trace!(from = ?self.index, to = position, "selection followed session");
                }
                self.index = Some(position);
                return;
            }
        }

        let Some(index) = self.index else {
            return;
        };
        let clamped = index.min(cards.len() - 1);
        self.select_index(cards, clamped);
    }
}

use std::collections::VecDeque;

use crate::scene::model::AnimationSequence;

/// Bounded undo/redo stacks of whole-document snapshots.
///
/// Each entry is a deep clone taken before an edit. Simple and always correct; the copy cost
/// grows with the document.
#[derive(Clone, Debug)]
pub struct History {
    limit: usize,
    undo: VecDeque<AnimationSequence>,
    redo: Vec<AnimationSequence>,
}

impl History {
    /// `limit == 0` disables undo entirely.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    /// Maximum undo depth.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record the state before an edit; invalidates the redo stack.
    pub fn record(&mut self, before: AnimationSequence) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
    }

    /// Swap `current` with the latest undo snapshot. Returns `false` when there is none.
    pub fn undo(&mut self, current: &mut AnimationSequence) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, prev));
        true
    }

    /// Swap `current` with the latest redo snapshot. Returns `false` when there is none.
    pub fn redo(&mut self, current: &mut AnimationSequence) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo snapshots held.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Forget every snapshot.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/history.rs"]
mod tests;

use std::collections::VecDeque;

use thiserror::Error;

use crate::surface::Snapshot;

/// Expected, recoverable history conditions; hosts surface them as disabled
/// affordances rather than errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    EmptyHistory,
    #[error("nothing to redo")]
    NoRedoAvailable,
}

/// Undo/redo history of full-surface snapshots.
///
/// Linear branch-cut semantics: any push after an undo discards the redo
/// branch. Unbounded by default; `with_max_depth` caps the undo stack with
/// oldest-entry eviction.
///
/// `undo`/`redo` exchange snapshots with the caller: they take the current
/// surface state and park it on the opposite stack, so undoing a commit and
/// redoing it both restore exact pixel contents.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: Option<usize>,
}

impl History {
    /// An unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// A history keeping at most `depth` undo entries.
    pub fn with_max_depth(depth: usize) -> Self {
        Self { max_depth: Some(depth), ..Self::default() }
    }

    /// Record a pre-operation snapshot, invalidating any redo branch.
    pub fn push(&mut self, entry: Snapshot) {
        self.undo_stack.push_back(entry);
        self.redo_stack.clear();
        if let Some(depth) = self.max_depth {
            while self.undo_stack.len() > depth {
                self.undo_stack.pop_front();
            }
        }
    }

    /// Step back one entry, parking `current` for redo. Returns the snapshot
    /// to restore.
    pub fn undo(&mut self, current: Snapshot) -> Result<Snapshot, HistoryError> {
        let prior = self.undo_stack.pop_back().ok_or(HistoryError::EmptyHistory)?;
        self.redo_stack.push(current);
        Ok(prior)
    }

    /// Step forward one entry, parking `current` for undo. Returns the
    /// snapshot to restore.
    pub fn redo(&mut self, current: Snapshot) -> Result<Snapshot, HistoryError> {
        let next = self.redo_stack.pop().ok_or(HistoryError::NoRedoAvailable)?;
        self.undo_stack.push_back(current);
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget everything; used when the session switches frames.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

//! Bounded undo history of input-buffer snapshots.

use std::collections::VecDeque;

/// Number of snapshots kept before the oldest is discarded.
pub const UNDO_CAPACITY: usize = 20;

/// Stack of previous buffer contents, newest on top.
#[derive(Clone, Debug, Default)]
pub struct UndoStack {
    snapshots: VecDeque<String>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot, evicting the oldest one when full.
    pub fn push(&mut self, snapshot: impl Into<String>) {
        if self.snapshots.len() == UNDO_CAPACITY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

//! Snapshot-based linear undo/redo over the composition.

use cutreel_common::InteractionDefaults;

use crate::composition::Composition;

/// Default number of retained undo snapshots.
pub const DEFAULT_DEPTH: usize = 50;

/// Bounded undo/redo stacks of whole-composition snapshots.
///
/// A snapshot is pushed before each mutating gesture. Undo and redo swap
/// the live composition with a stored copy; both are no-ops at the stack
/// bounds.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Composition>,
    redo_stack: Vec<Composition>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Build a history bounded by the configured snapshot depth.
    pub fn with_config(config: &InteractionDefaults) -> Self {
        Self::new(config.history_depth)
    }

    /// Record the current state before a mutation. Skips the push when the
    /// state is identical to the top entry; clears the redo stack; drops
    /// the oldest entry past the depth bound.
    pub fn snapshot(&mut self, current: &Composition) {
        if self.undo_stack.last() == Some(current) {
            return;
        }
        self.undo_stack.push(current.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > self.depth {
            self.undo_stack.remove(0);
        }
    }

    /// Restore the previous snapshot into `current`. No-op when empty.
    pub fn undo(&mut self, current: &mut Composition) {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(current.clone());
            *current = previous;
        }
    }

    /// Re-apply the last undone snapshot into `current`. No-op when empty.
    pub fn redo(&mut self, current: &mut Composition) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(current.clone());
            *current = next;
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

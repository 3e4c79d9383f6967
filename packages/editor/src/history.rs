//! # Undo/Redo History
//!
//! Tracks whole-document snapshots and a pointer into them.
//!
//! ## Design
//!
//! - Every logically complete user action saves one snapshot
//! - Undo moves the pointer back and hands out the snapshot to restore
//! - Redo moves the pointer forward again
//! - Saving from anywhere but the tail discards the redo branch
//! - The first save is the baseline; it can never be undone past
//!
//! Snapshots are full deep copies of the node tree rather than diffs. The
//! documents are small, so copying is cheap and the round-trip is trivially
//! exact.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.save(doc.snapshot());      // baseline
//!
//! // ... mutate doc ...
//! history.save(doc.snapshot());
//!
//! if let Some(snapshot) = history.undo() {
//!     doc.restore(snapshot);
//! }
//! ```

use crate::node::Node;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Immutable, independent copy of the whole node tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    root: Node,
}

impl Snapshot {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Value-copy encoding of the tree (not a public file format)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Snapshot history with an undo/redo pointer
#[derive(Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,

    /// Index of the snapshot matching the live document (`None` before the first save)
    pointer: Option<usize>,

    /// Maximum number of snapshots kept (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create a history with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            pointer: None,
            max_levels,
        }
    }

    /// Record a snapshot of the live document
    pub fn save(&mut self, snapshot: Snapshot) {
        // New action invalidates the redo branch
        let keep = self.pointer.map_or(0, |p| p + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.snapshots.len() > self.max_levels {
            let excess = self.snapshots.len() - self.max_levels;
            self.snapshots.drain(..excess);
        }

        self.pointer = Some(self.snapshots.len() - 1);
    }

    /// Step back; returns the snapshot the live document should become
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let pointer = self.pointer.filter(|p| *p > 0)? - 1;
        self.pointer = Some(pointer);
        debug!(len = self.snapshots.len(), pointer, "Undo");
        self.snapshots.get(pointer)
    }

    /// Step forward; returns the snapshot the live document should become
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let pointer = self.pointer.filter(|p| p + 1 < self.snapshots.len())? + 1;
        self.pointer = Some(pointer);
        debug!(len = self.snapshots.len(), pointer, "Redo");
        self.snapshots.get(pointer)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        matches!(self.pointer, Some(p) if p > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        matches!(self.pointer, Some(p) if p + 1 < self.snapshots.len())
    }

    /// Pointer position, `None` before the first save
    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.pointer.unwrap_or(0)
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.pointer.map_or(0, |p| self.snapshots.len() - 1 - p)
    }

    /// Snapshot matching the live document
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.pointer?)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.pointer = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

//! Selection tracking.
//!
//! At most one node is selected at a time. The selection only stores an id;
//! [`Selection::retain_in`] must be called after anything removes nodes so a
//! node that left the tree can never stay selected.

use crate::document::Document;
use crate::node::{ComponentType, NodeId};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Select `id`; returns the previously selected node, if it changed
    pub fn select(&mut self, id: NodeId) -> Option<NodeId> {
        if self.current.as_ref() == Some(&id) {
            return None;
        }
        debug!(node = %id, previous = ?self.current, "Select");
        self.current.replace(id)
    }

    pub fn deselect(&mut self) -> Option<NodeId> {
        let previous = self.current.take();
        if let Some(id) = &previous {
            debug!(node = %id, "Deselect");
        }
        previous
    }

    /// Clear the selection if it no longer points into `doc`
    pub fn retain_in(&mut self, doc: &Document) {
        if let Some(id) = &self.current {
            if !doc.contains(id) {
                debug!(node = %id, "Selected node left the document");
                self.current = None;
            }
        }
    }

    /// Deselect, except that a selected slide falls back to its carousel.
    ///
    /// Returns the carousel that received the selection, if any.
    pub fn deselect_or_promote(&mut self, doc: &Document) -> Option<NodeId> {
        let current = self.current.take()?;
        let is_slide = doc
            .find(&current)
            .is_some_and(|node| node.component_type() == ComponentType::Slide);

        if !is_slide {
            debug!(node = %current, "Deselect");
            return None;
        }

        let carousel = doc.owning_carousel(&current)?.id.clone();
        debug!(slide = %current, carousel = %carousel, "Slide deselected, promoting to carousel");
        self.current = Some(carousel.clone());
        Some(carousel)
    }
}

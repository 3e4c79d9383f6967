//! # Drag-Reorder Engine
//!
//! State machine over a single pointer drag:
//!
//! ```text
//!          start                 drag_over (valid)
//! Idle ───────────▶ Dragging ─────────────────────▶ Hovering
//!  ▲                  │  ▲  drag_leave / no target     │
//!  │                  │  └─────────────────────────────┘
//!  │   drop / cancel  │                                │ drop
//!  └──────────────────┴────────────────────────────────┘
//! ```
//!
//! Hovering is [`DragState::Dragging`] with a drop target set.
//!
//! ## Invariants
//!
//! 1. At most one drag is active; a second `start` is refused.
//! 2. The engine never mutates the document. A drop yields a [`DropPlan`]
//!    which the session turns into exactly one mutation and one history save.
//! 3. A node being reordered is hidden from hit-testing and from insertion
//!    index computation for the whole drag, and shown again on cancel.
//! 4. `drag_leave` only clears the drop indicator.

use crate::document::Document;
use crate::layout::{LayoutProvider, Point};
use crate::node::{ComponentType, Node, NodeId};
use thiserror::Error;
use tracing::debug;

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    /// A palette entry; the node is created on drop
    Component(ComponentType),
    /// An existing node being reordered
    Existing(NodeId),
}

/// Where a drop would land right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndicator {
    pub container: NodeId,
    pub index: usize,
}

/// Transient state between drag start and drop/cancel
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub payload: DragPayload,
    pub source_container: Option<NodeId>,
    pub target: Option<DropIndicator>,
}

impl DragSession {
    /// Node hidden from its source container for the duration of the drag
    pub fn hidden(&self) -> Option<&NodeId> {
        match &self.payload {
            DragPayload::Existing(id) => Some(id),
            DragPayload::Component(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Outcome of a drop, for the session to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum DropPlan {
    Create {
        component: ComponentType,
        container: NodeId,
        index: usize,
    },
    Move {
        node_id: NodeId,
        container: NodeId,
        index: usize,
    },
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DragError {
    #[error("A drag is already in progress")]
    AlreadyDragging,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} cannot be dragged")]
    NotMovable(NodeId),

    #[error("{0} cannot be dropped onto the canvas")]
    NotPlaceable(ComponentType),
}

#[derive(Debug, Default)]
pub struct DragEngine {
    state: DragState,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session().is_some()
    }

    /// Current drop indicator (container + index) for visual feedback
    pub fn indicator(&self) -> Option<&DropIndicator> {
        self.session()?.target.as_ref()
    }

    pub fn hidden(&self) -> Option<&NodeId> {
        self.session()?.hidden()
    }

    /// Begin a drag
    pub fn start(&mut self, payload: DragPayload, doc: &Document) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }

        let source_container = match &payload {
            DragPayload::Component(component) => {
                if !component.is_movable() {
                    return Err(DragError::NotPlaceable(*component));
                }
                None
            }
            DragPayload::Existing(id) => {
                let node = doc
                    .find(id)
                    .ok_or_else(|| DragError::NodeNotFound(id.clone()))?;
                if !node.component_type().is_movable() {
                    return Err(DragError::NotMovable(id.clone()));
                }
                doc.parent_of(id).map(|parent| parent.id.clone())
            }
        };

        debug!(payload = ?payload, source = ?source_container, "Drag start");
        self.state = DragState::Dragging(DragSession {
            payload,
            source_container,
            target: None,
        });
        Ok(())
    }

    /// Recompute the drop target under `point`
    pub fn drag_over(
        &mut self,
        doc: &Document,
        point: Point,
        layout: &dyn LayoutProvider,
    ) -> Option<&DropIndicator> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        session.target = resolve_target(doc, point, layout, session.hidden());
        session.target.as_ref()
    }

    /// Pointer left the candidate container: drop the indicator only
    pub fn drag_leave(&mut self) {
        if let DragState::Dragging(session) = &mut self.state {
            session.target = None;
        }
    }

    /// Finish the drag at `point`
    pub fn drop(&mut self, doc: &Document, point: Point, layout: &dyn LayoutProvider) -> DropPlan {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DropPlan::Cancelled;
        };

        let Some(target) = resolve_target(doc, point, layout, session.hidden()) else {
            debug!(payload = ?session.payload, "Drop outside any container, cancelled");
            return DropPlan::Cancelled;
        };

        debug!(payload = ?session.payload, container = %target.container, index = target.index, "Drop");
        match session.payload {
            DragPayload::Component(component) => DropPlan::Create {
                component,
                container: target.container,
                index: target.index,
            },
            DragPayload::Existing(node_id) => DropPlan::Move {
                node_id,
                container: target.container,
                index: target.index,
            },
        }
    }

    /// Abandon the drag; the hidden node (if any) becomes visible again
    pub fn cancel(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                debug!(payload = ?session.payload, "Drag cancelled");
                Some(session)
            }
            DragState::Idle => None,
        }
    }
}

fn resolve_target(
    doc: &Document,
    point: Point,
    layout: &dyn LayoutProvider,
    hidden: Option<&NodeId>,
) -> Option<DropIndicator> {
    let container = doc.find_container_at(point, layout, hidden)?;
    Some(DropIndicator {
        container: container.id.clone(),
        index: insertion_index(container, point.y, layout, hidden),
    })
}

/// Index at which a drop at vertical position `y` lands inside `container`.
///
/// Only the container's direct movable children are considered, minus the
/// dragged node. The result is the position of the first child whose vertical
/// midpoint lies below `y`, or the child count when there is none.
pub fn insertion_index(
    container: &Node,
    y: f64,
    layout: &dyn LayoutProvider,
    dragged: Option<&NodeId>,
) -> usize {
    let candidates: Vec<&Node> = container
        .children
        .iter()
        .filter(|child| Some(&child.id) != dragged && child.component_type().is_movable())
        .collect();

    candidates
        .iter()
        .position(|child| {
            layout
                .bounds(&child.id)
                .is_some_and(|rect| rect.mid_y() > y)
        })
        .unwrap_or(candidates.len())
}

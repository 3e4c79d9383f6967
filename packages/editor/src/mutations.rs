//! # Document Mutations
//!
//! Semantic operations on the node tree. Every change the editor makes to a
//! document goes through one of these.
//!
//! ## Design Principles
//!
//! 1. **Validated**: structural constraints are checked before anything changes
//! 2. **Atomic**: a mutation either applies completely or not at all
//! 3. **Minimal**: no redundant or overly generic operations
//!
//! ## Mutation Semantics
//!
//! ### MoveNode
//! - Atomic relocation of a node to a new parent at an index
//! - Fails if the new parent is the node itself or one of its descendants
//! - Index is clamped to the parent's child count after detaching
//!
//! ### SetStyle / SetContent / SetAttribute
//! - Atomic replacement, last write wins
//!
//! ### RemoveNode
//! - Removes node and all descendants; the root can never be removed

use crate::document::Document;
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a freshly created node under a parent at index
    InsertNode {
        parent_id: NodeId,
        index: usize,
        node: Node,
    },

    /// Move an existing node to a new parent at index
    MoveNode {
        node_id: NodeId,
        new_parent_id: NodeId,
        index: usize,
    },

    /// Set (or clear, with `None`) a style property
    SetStyle {
        node_id: NodeId,
        property: String,
        value: Option<String>,
    },

    /// Replace a node's editable text
    SetContent {
        node_id: NodeId,
        content: String,
    },

    /// Set a type-specific attribute
    SetAttribute {
        node_id: NodeId,
        key: String,
        value: String,
    },

    /// Remove a node (and its subtree) from the tree
    RemoveNode {
        node_id: NodeId,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("The canvas root cannot be removed or moved")]
    RootImmutable,

    #[error("Node {0} already exists in the document")]
    DuplicateNode(NodeId),

    #[error("Node {node_id} has no attribute '{key}'")]
    UnknownAttribute { node_id: NodeId, key: String },
}

impl Mutation {
    /// The node this mutation primarily targets
    pub fn target(&self) -> &NodeId {
        match self {
            Mutation::InsertNode { node, .. } => &node.id,
            Mutation::MoveNode { node_id, .. }
            | Mutation::SetStyle { node_id, .. }
            | Mutation::SetContent { node_id, .. }
            | Mutation::SetAttribute { node_id, .. }
            | Mutation::RemoveNode { node_id } => node_id,
        }
    }

    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertNode { parent_id, index, node } => {
                doc.insert(node.clone(), parent_id, *index)
            }

            Mutation::MoveNode { node_id, new_parent_id, index } => {
                let node = doc.remove(node_id)?;
                doc.insert(node, new_parent_id, *index)
            }

            Mutation::SetStyle { node_id, property, value } => {
                let node = doc
                    .find_mut(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                match value {
                    Some(value) => {
                        node.style.insert(property.clone(), value.clone());
                    }
                    None => {
                        node.style.remove(property);
                    }
                }
                Ok(())
            }

            Mutation::SetContent { node_id, content } => {
                let node = doc
                    .find_mut(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                node.content = Some(content.clone());
                Ok(())
            }

            Mutation::SetAttribute { node_id, key, value } => {
                let node = doc
                    .find_mut(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                if node.kind.set_attribute(key, value.clone()) {
                    Ok(())
                } else {
                    Err(MutationError::UnknownAttribute {
                        node_id: node_id.clone(),
                        key: key.clone(),
                    })
                }
            }

            Mutation::RemoveNode { node_id } => doc.remove(node_id).map(|_| ()),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertNode { parent_id, node, .. } => {
                let parent = doc
                    .find(parent_id)
                    .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;

                if doc.contains(&node.id) {
                    return Err(MutationError::DuplicateNode(node.id.clone()));
                }

                check_accepts(parent, node)
            }

            Mutation::MoveNode { node_id, new_parent_id, .. } => {
                if node_id == doc.root_id() {
                    return Err(MutationError::RootImmutable);
                }

                let node = doc
                    .find(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;

                let parent = doc
                    .find(new_parent_id)
                    .ok_or_else(|| MutationError::ParentNotFound(new_parent_id.clone()))?;

                if node.contains(new_parent_id) {
                    return Err(MutationError::CycleDetected);
                }

                check_accepts(parent, node)
            }

            Mutation::SetStyle { node_id, .. } | Mutation::SetContent { node_id, .. } => {
                doc.find(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                Ok(())
            }

            Mutation::SetAttribute { node_id, key, .. } => {
                let node = doc
                    .find(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;

                match node.kind.attribute(key) {
                    Some(_) => Ok(()),
                    None => Err(MutationError::UnknownAttribute {
                        node_id: node_id.clone(),
                        key: key.clone(),
                    }),
                }
            }

            Mutation::RemoveNode { node_id } => {
                if node_id == doc.root_id() {
                    return Err(MutationError::RootImmutable);
                }
                doc.find(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                Ok(())
            }
        }
    }
}

fn check_accepts(parent: &Node, child: &Node) -> Result<(), MutationError> {
    if parent.component_type().accepts(child.component_type()) {
        Ok(())
    } else {
        Err(MutationError::InvalidStructure(format!(
            "{} cannot contain {}",
            parent.component_type(),
            child.component_type()
        )))
    }
}

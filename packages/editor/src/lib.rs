//! # Pagecraft Editor
//!
//! Editing engine for a drag-and-drop page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host UI: palette, canvas view, form panel   │
//! └─────────────────────────────────────────────┘
//!          gestures ↓            ↑ form / tree / indicator
//! ┌─────────────────────────────────────────────┐
//! │ session: EditSession                        │
//! │  - click / drag / drop / edit / undo        │
//! │  - carousel slides and sub-edit mode        │
//! │  - async image uploads                      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document + mutations: validated node tree   │
//! │ history: whole-tree snapshots               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The node tree is the source of truth**: forms and views are derived
//! 2. **Validated mutations**: every document change is a [`Mutation`]
//! 3. **One snapshot per gesture**: rejected and no-op gestures save nothing
//! 4. **Geometry is borrowed**: pixel layout comes from a [`LayoutProvider`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{ComponentType, DragPayload, EditSession, LayoutMap, Point};
//!
//! let mut session = EditSession::new();
//!
//! session.start_drag(DragPayload::Component(ComponentType::Button))?;
//! session.drag_over(Point::new(40.0, 300.0), &layout);
//! session.drop(Point::new(40.0, 300.0), &layout);
//!
//! let form = session.form();
//! session.undo();
//! ```

pub mod binder;
pub mod carousel;
mod config;
mod document;
pub mod drag;
mod errors;
mod history;
mod layout;
pub mod logging;
mod mutations;
mod node;
pub mod schema;
mod selection;
mod session;
pub mod upload;

pub use binder::{Binding, BoundField, FormDescription, FormMode, SlideSummary};
pub use carousel::{CarouselError, CarouselView, Direction};
pub use config::{EditorConfig, UploadPolicy, DEFAULT_CONFIG_NAME};
pub use document::{Document, IdGenerator};
pub use drag::{DragEngine, DragError, DragPayload, DragState, DropIndicator, DropPlan};
pub use errors::EditorError;
pub use history::{History, Snapshot};
pub use layout::{LayoutMap, LayoutProvider, Point, Rect};
pub use mutations::{Mutation, MutationError};
pub use node::{ComponentType, Node, NodeId, NodeKind, StyleMap};
pub use schema::{FieldDescriptor, FieldTarget, InputKind, SelectOption};
pub use selection::Selection;
pub use session::{DropOutcome, EditOutcome, EditSession, Notice};
pub use upload::{UploadError, UploadTicket};

//! # Edit Session
//!
//! One user's editing context: the document, what is selected, which form
//! the property panel shows, the undo history, the active drag, and any
//! uploads still being read.
//!
//! Every inbound gesture is a method on [`EditSession`] and runs to
//! completion before the next one. A gesture that changes the document saves
//! exactly one history snapshot; rejected, unchanged and stale gestures
//! save nothing.

use crate::binder::{self, Binding, FormDescription, FormMode};
use crate::carousel::{self, CarouselError, CarouselView, Direction};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::drag::{DragEngine, DragPayload, DropIndicator, DropPlan};
use crate::errors::EditorError;
use crate::history::{History, Snapshot};
use crate::layout::{LayoutProvider, Point};
use crate::mutations::{Mutation, MutationError};
use crate::node::{ComponentType, NodeId};
use crate::schema::{self, FieldDescriptor, InputKind};
use crate::selection::Selection;
use crate::upload::{self, UploadError, UploadTicket};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of a property edit or a completed upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The document changed and one snapshot was saved
    Applied,
    /// The value was already current
    Unchanged,
    /// Input was invalid for the field; prior value kept
    Rejected,
    /// The target node is gone (or no longer eligible); nothing happened
    Stale,
}

/// Result of a drop gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Inserted(NodeId),
    Moved(NodeId),
    Cancelled,
}

/// User-visible message raised by a refused action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

pub struct EditSession {
    document: Document,
    selection: Selection,
    history: History,
    drag: DragEngine,
    form: FormMode,
    notices: Vec<Notice>,
    uploads: Vec<UploadTicket>,
    next_ticket: u64,
    config: EditorConfig,
}

impl EditSession {
    /// Session over an empty canvas with default config
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let document = Document::with_seed(config.id_seed.clone());
        let mut history = History::with_max_levels(config.history_limit);
        // Baseline; never undoable past
        history.save(document.snapshot());

        Self {
            document,
            selection: Selection::new(),
            history,
            drag: DragEngine::new(),
            form: FormMode::Empty,
            notices: Vec::new(),
            uploads: Vec::new(),
            next_ticket: 0,
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selection.current()
    }

    pub fn form_mode(&self) -> &FormMode {
        &self.form
    }

    /// Form the property panel should show right now
    pub fn form(&self) -> FormDescription {
        binder::render(&self.document, &self.form)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn drop_indicator(&self) -> Option<&DropIndicator> {
        self.drag.indicator()
    }

    /// Whether the view should hide `id` (a node picked up for reordering)
    pub fn is_hidden(&self, id: &NodeId) -> bool {
        self.drag.hidden() == Some(id)
    }

    /// Whether the empty-canvas prompt should be visible
    pub fn show_canvas_prompt(&self) -> bool {
        self.document.is_empty()
    }

    /// Drain user-visible notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn pending_uploads(&self) -> &[UploadTicket] {
        &self.uploads
    }

    /// Paint state for a carousel, with the sub-edited slide's overlay pinned
    pub fn carousel_view(&self, id: &NodeId) -> Result<CarouselView, EditorError> {
        let pinned = match &self.form {
            FormMode::SlideSubEdit { carousel, slide } if carousel == id => Some(slide),
            _ => None,
        };
        Ok(carousel::view(&self.document, id, pinned)?)
    }

    fn commit(&mut self, action: &str) {
        self.history.save(self.document.snapshot());
        info!(
            action,
            len = self.history.len(),
            pointer = ?self.history.pointer(),
            "State saved"
        );
    }

    // --- Drag and drop ---

    pub fn start_drag(&mut self, payload: DragPayload) -> Result<(), EditorError> {
        self.drag.start(payload, &self.document)?;
        Ok(())
    }

    pub fn drag_over(&mut self, point: Point, layout: &dyn LayoutProvider) -> Option<DropIndicator> {
        self.drag.drag_over(&self.document, point, layout).cloned()
    }

    pub fn drag_leave(&mut self) {
        self.drag.drag_leave();
    }

    /// Drag ended without a drop; the picked-up node reappears in place
    pub fn end_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn drop(&mut self, point: Point, layout: &dyn LayoutProvider) -> DropOutcome {
        let plan = self.drag.drop(&self.document, point, layout);

        let (mutation, outcome) = match plan {
            DropPlan::Cancelled => return DropOutcome::Cancelled,
            DropPlan::Create {
                component,
                container,
                index,
            } => {
                let node = self.document.create_node(component);
                let id = node.id.clone();
                (
                    Mutation::InsertNode {
                        parent_id: container,
                        index,
                        node,
                    },
                    DropOutcome::Inserted(id),
                )
            }
            DropPlan::Move {
                node_id,
                container,
                index,
            } => (
                Mutation::MoveNode {
                    node_id: node_id.clone(),
                    new_parent_id: container,
                    index,
                },
                DropOutcome::Moved(node_id),
            ),
        };

        if let Err(e) = mutation.apply(&mut self.document) {
            warn!(error = %e, "Drop refused");
            return DropOutcome::Cancelled;
        }
        self.commit("drop");
        outcome
    }

    // --- Selection ---

    /// Select whatever the user clicked at `point`.
    ///
    /// The deepest movable node wins; a click inside a column selects its
    /// columns block. A slide is only sub-edited when its carousel (or one of
    /// its slides) is already selected, otherwise the carousel is selected.
    /// Clicking empty canvas or outside everything deselects.
    pub fn click(&mut self, point: Point, layout: &dyn LayoutProvider) {
        let hit = self
            .document
            .hit_path(point, layout, None)
            .into_iter()
            .rev()
            .find(|node| {
                node.component_type().is_movable()
                    || node.component_type() == ComponentType::Slide
            })
            .map(|node| (node.id.clone(), node.component_type()));

        match hit {
            None => self.deselect(),
            Some((id, ComponentType::Slide)) => {
                let Some(carousel) = self.document.owning_carousel(&id).map(|c| c.id.clone())
                else {
                    return;
                };
                let carousel_active = self.selection.current().is_some_and(|current| {
                    current == &carousel
                        || self.document.parent_of(current).map(|p| &p.id) == Some(&carousel)
                });
                if carousel_active {
                    self.enter_slide_edit(carousel, id);
                } else {
                    self.select(&carousel);
                }
            }
            Some((id, _)) => {
                self.select(&id);
            }
        }
    }

    /// Select `id` and show its main form; returns false if it isn't in the document
    pub fn select(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.document.find(id) else {
            return false;
        };

        if node.component_type() == ComponentType::Slide {
            let Some(carousel) = self.document.owning_carousel(id).map(|c| c.id.clone()) else {
                return false;
            };
            self.enter_slide_edit(carousel, id.clone());
            return true;
        }

        self.selection.select(id.clone());
        self.form = FormMode::Main(id.clone());
        true
    }

    /// Clear the selection; a sub-edited slide falls back to its carousel
    pub fn deselect(&mut self) {
        self.form = match self.selection.deselect_or_promote(&self.document) {
            Some(carousel) => FormMode::Main(carousel),
            None => FormMode::Empty,
        };
    }

    fn enter_slide_edit(&mut self, carousel: NodeId, slide: NodeId) {
        debug!(carousel = %carousel, slide = %slide, "Slide sub-edit");
        self.selection.select(slide.clone());
        self.form = FormMode::SlideSubEdit { carousel, slide };
    }

    /// Open the image editor for slide `index` of the selected carousel
    pub fn select_slide(&mut self, index: usize) -> Result<(), EditorError> {
        let carousel = self.active_carousel()?;
        let slides = &self
            .document
            .find(&carousel)
            .ok_or(EditorError::NoCarouselSelected)?
            .children;
        let slide = slides
            .get(index)
            .map(|slide| slide.id.clone())
            .ok_or(CarouselError::IndexOutOfRange {
                index,
                count: slides.len(),
            })?;
        self.enter_slide_edit(carousel, slide);
        Ok(())
    }

    /// "Done" in the slide image editor: back to the carousel's main form
    pub fn finish_slide_edit(&mut self) {
        if let FormMode::SlideSubEdit { carousel, .. } = &self.form {
            let carousel = carousel.clone();
            self.selection.select(carousel.clone());
            self.form = FormMode::Main(carousel);
        }
    }

    // --- Property editing ---

    /// Write `raw` into `field` of the node the form is bound to
    pub fn edit_field(&mut self, field: &FieldDescriptor, raw: &str) -> EditOutcome {
        let Some(target) = self.form.target().cloned() else {
            return EditOutcome::Stale;
        };
        self.apply_binding(&target, field, raw, "edit")
    }

    fn apply_binding(
        &mut self,
        target: &NodeId,
        field: &FieldDescriptor,
        raw: &str,
        action: &str,
    ) -> EditOutcome {
        match binder::bind_edit(&self.document, target, field, raw) {
            Binding::Apply(mutation) => match mutation.apply(&mut self.document) {
                Ok(()) => {
                    debug!(node = %target, field = field.label, "Field edited");
                    self.commit(action);
                    EditOutcome::Applied
                }
                Err(e) => {
                    warn!(node = %target, field = field.label, error = %e, "Edit refused");
                    EditOutcome::Rejected
                }
            },
            Binding::Unchanged => EditOutcome::Unchanged,
            Binding::Rejected => {
                debug!(node = %target, field = field.label, raw, "Input rejected");
                EditOutcome::Rejected
            }
            Binding::Stale => {
                debug!(node = %target, "Edit target is gone");
                EditOutcome::Stale
            }
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.drag.cancel();
        self.document.restore(snapshot);
        self.selection.deselect();
        self.form = FormMode::Empty;
        self.prune_uploads();
        info!(
            len = self.history.len(),
            pointer = ?self.history.pointer(),
            "State restored"
        );
    }

    // --- Structure ---

    /// Delete a movable node and its subtree
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), EditorError> {
        let node = self
            .document
            .find(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
        if !node.component_type().is_movable() {
            return Err(MutationError::InvalidStructure(format!(
                "{} cannot be removed directly",
                node.component_type()
            ))
            .into());
        }

        Mutation::RemoveNode { node_id: id.clone() }.apply(&mut self.document)?;
        self.after_removal();
        self.commit("remove");
        Ok(())
    }

    fn after_removal(&mut self) {
        self.selection.retain_in(&self.document);
        let form_alive = self
            .form
            .target()
            .map_or(true, |target| self.document.contains(target));
        if !form_alive {
            self.form = FormMode::Empty;
        }
        self.prune_uploads();
    }

    /// Forget tickets whose node has left the document
    fn prune_uploads(&mut self) {
        let document = &self.document;
        self.uploads.retain(|ticket| {
            let alive = document.contains(&ticket.node_id);
            if !alive {
                debug!(ticket = ticket.id, node = %ticket.node_id, "Upload target gone");
            }
            alive
        });
    }

    // --- Carousel ---

    /// Carousel the property panel is currently bound to
    fn active_carousel(&self) -> Result<NodeId, EditorError> {
        match &self.form {
            FormMode::SlideSubEdit { carousel, .. } => Ok(carousel.clone()),
            FormMode::Main(id)
                if self
                    .document
                    .find(id)
                    .is_some_and(|n| n.component_type() == ComponentType::Carousel) =>
            {
                Ok(id.clone())
            }
            _ => Err(EditorError::NoCarouselSelected),
        }
    }

    /// Append a slide to the selected carousel
    pub fn add_slide(&mut self) -> Result<NodeId, EditorError> {
        let carousel = self.active_carousel()?;
        let slide = carousel::add_slide(&mut self.document, &carousel)?;
        self.commit("add slide");
        Ok(slide)
    }

    /// Delete slide `index` of the selected carousel.
    ///
    /// Deleting the last slide is refused with a notice and changes nothing.
    pub fn delete_slide(&mut self, index: usize) -> Result<(), EditorError> {
        let carousel = self.active_carousel()?;
        let removed = match carousel::delete_slide(&mut self.document, &carousel, index) {
            Ok(removed) => removed,
            Err(CarouselError::LastSlide) => {
                warn!(carousel = %carousel, "Refused to delete the last slide");
                self.notices.push(Notice {
                    message: CarouselError::LastSlide.to_string(),
                });
                return Err(CarouselError::LastSlide.into());
            }
            Err(e) => return Err(e.into()),
        };

        if matches!(&self.form, FormMode::SlideSubEdit { slide, .. } if slide == &removed.id) {
            self.selection.select(carousel.clone());
            self.form = FormMode::Main(carousel);
        }
        self.after_removal();
        self.commit("delete slide");
        Ok(())
    }

    /// Step a carousel's visible slide; not recorded in history
    pub fn advance_carousel(&mut self, id: &NodeId, direction: Direction) -> Result<usize, EditorError> {
        Ok(carousel::advance(&mut self.document, id, direction)?)
    }

    // --- Uploads ---

    /// Start an upload into a file field of the form's node.
    ///
    /// Returns `None` when nothing is bound or `field` doesn't take files.
    pub fn begin_upload(&mut self, field: &'static FieldDescriptor) -> Option<UploadTicket> {
        let node_id = self.form.target()?.clone();
        let node = self.document.find(&node_id)?;
        let accepted = field.input == InputKind::File
            && schema::fields_for(node.component_type())
                .iter()
                .any(|known| *known == field);
        if !accepted {
            return None;
        }

        self.next_ticket += 1;
        let ticket = UploadTicket {
            id: self.next_ticket,
            node_id,
            field,
            selection_at_request: self.selection.current().cloned(),
        };
        debug!(ticket = ticket.id, node = %ticket.node_id, "Upload requested");
        self.uploads.push(ticket.clone());
        Some(ticket)
    }

    /// Finish an upload with the result of reading the file.
    ///
    /// A ticket is forgotten once completed or once its node leaves the
    /// document; completing a forgotten ticket is [`EditOutcome::Stale`].
    pub fn complete_upload(
        &mut self,
        ticket_id: u64,
        result: Result<String, UploadError>,
    ) -> Result<EditOutcome, EditorError> {
        let Some(position) = self.uploads.iter().position(|ticket| ticket.id == ticket_id) else {
            if ticket_id == 0 || ticket_id > self.next_ticket {
                return Err(UploadError::UnknownTicket(ticket_id).into());
            }
            warn!(ticket = ticket_id, "Discarding late upload");
            return Ok(EditOutcome::Stale);
        };
        let ticket = self.uploads.remove(position);

        let data_uri = result?;
        if !ticket.is_applicable(
            &self.document,
            self.selection.current(),
            self.config.upload_policy,
        ) {
            warn!(
                ticket = ticket.id,
                node = %ticket.node_id,
                policy = ?self.config.upload_policy,
                "Discarding late upload"
            );
            return Ok(EditOutcome::Stale);
        }

        Ok(self.apply_binding(&ticket.node_id, ticket.field, &data_uri, "upload"))
    }

    /// Read `path` and apply it to `field` in one go
    pub async fn upload_file(
        &mut self,
        field: &'static FieldDescriptor,
        path: impl AsRef<Path>,
    ) -> Result<EditOutcome, EditorError> {
        let Some(ticket) = self.begin_upload(field) else {
            return Ok(EditOutcome::Rejected);
        };
        let result = upload::read_data_uri(path).await;
        self.complete_upload(ticket.id, result)
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

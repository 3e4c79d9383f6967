//! # Carousel Controller
//!
//! A carousel owns an ordered list of `slide` children and a cursor
//! (`current_slide`) stored on its [`NodeKind::Carousel`] payload.
//!
//! ## Invariants
//!
//! - A carousel always keeps at least one slide
//! - `0 <= current_slide < slide_count` after every structural change
//!
//! Advancing is a view action and never touches history. Cursors also ride
//! through undo/redo untouched (see [`Document::restore`]). Adding and deleting
//! slides are document edits; the session saves a snapshot after each.

use crate::document::Document;
use crate::mutations::{Mutation, MutationError};
use crate::node::{ComponentType, Node, NodeId, NodeKind};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CarouselError {
    #[error("Carousel must have at least one slide")]
    LastSlide,

    #[error("Node {0} is not a carousel")]
    NotACarousel(NodeId),

    #[error("Slide index {index} out of range (carousel has {count} slides)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Step direction for [`advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Sign of a prev/next control's delta; zero is not a step
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            -1 => Some(Direction::Previous),
            1 => Some(Direction::Next),
            _ => None,
        }
    }
}

/// What the host needs to paint a carousel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselView {
    pub current: usize,
    /// Horizontal translation of the slide strip, in percent
    pub offset_percent: i64,
    /// Overlay visibility per slide
    pub overlays: Vec<bool>,
}

fn carousel<'a>(doc: &'a Document, id: &NodeId) -> Result<&'a Node, CarouselError> {
    doc.find(id)
        .filter(|node| node.component_type() == ComponentType::Carousel)
        .ok_or_else(|| CarouselError::NotACarousel(id.clone()))
}

/// Number of slides in the carousel `id`
pub fn slide_count(doc: &Document, id: &NodeId) -> Result<usize, CarouselError> {
    Ok(carousel(doc, id)?.children.len())
}

/// Current cursor of the carousel `id`
pub fn cursor(doc: &Document, id: &NodeId) -> Result<usize, CarouselError> {
    match carousel(doc, id)?.kind {
        NodeKind::Carousel { current_slide } => Ok(current_slide),
        _ => Err(CarouselError::NotACarousel(id.clone())),
    }
}

fn set_cursor(doc: &mut Document, id: &NodeId, value: usize) -> Result<(), CarouselError> {
    match doc.find_mut(id).map(|node| &mut node.kind) {
        Some(NodeKind::Carousel { current_slide }) => {
            *current_slide = value;
            Ok(())
        }
        _ => Err(CarouselError::NotACarousel(id.clone())),
    }
}

/// Bring the cursor back into `0..slide_count`; returns the clamped value
pub fn clamp_cursor(doc: &mut Document, id: &NodeId) -> Result<usize, CarouselError> {
    let count = slide_count(doc, id)?;
    let current = cursor(doc, id)?;
    let clamped = current.min(count.saturating_sub(1));
    if clamped != current {
        set_cursor(doc, id, clamped)?;
    }
    Ok(clamped)
}

/// Move the cursor one slide, wrapping at both ends
pub fn advance(doc: &mut Document, id: &NodeId, direction: Direction) -> Result<usize, CarouselError> {
    let count = slide_count(doc, id)?;
    let current = cursor(doc, id)?;
    if count <= 1 {
        return Ok(current);
    }

    let next = match direction {
        Direction::Next => (current + 1) % count,
        Direction::Previous => (current + count - 1) % count,
    };
    set_cursor(doc, id, next)?;
    debug!(carousel = %id, from = current, to = next, "Carousel advanced");
    Ok(next)
}

/// Append a default slide; returns the new slide's id
pub fn add_slide(doc: &mut Document, id: &NodeId) -> Result<NodeId, CarouselError> {
    let count = slide_count(doc, id)?;
    let slide = doc.create_node(ComponentType::Slide);
    let slide_id = slide.id.clone();

    Mutation::InsertNode {
        parent_id: id.clone(),
        index: count,
        node: slide,
    }
    .apply(doc)?;
    clamp_cursor(doc, id)?;

    debug!(carousel = %id, slide = %slide_id, count = count + 1, "Slide added");
    Ok(slide_id)
}

/// Remove the slide at `index`, refusing to drop below one slide.
///
/// If the removed slide sat at or before the cursor, the cursor steps back
/// by one (never below zero).
pub fn delete_slide(doc: &mut Document, id: &NodeId, index: usize) -> Result<Node, CarouselError> {
    let node = carousel(doc, id)?;
    let count = node.children.len();
    if count <= 1 {
        return Err(CarouselError::LastSlide);
    }
    let slide_id = node
        .children
        .get(index)
        .map(|slide| slide.id.clone())
        .ok_or(CarouselError::IndexOutOfRange { index, count })?;

    let removed = doc.find(&slide_id).cloned();
    Mutation::RemoveNode {
        node_id: slide_id.clone(),
    }
    .apply(doc)?;

    let current = cursor(doc, id)?;
    if index <= current {
        set_cursor(doc, id, current.saturating_sub(1))?;
    }
    clamp_cursor(doc, id)?;

    debug!(carousel = %id, slide = %slide_id, index, count = count - 1, "Slide deleted");
    removed.ok_or(CarouselError::Mutation(MutationError::NodeNotFound(slide_id)))
}

/// Paint state for the carousel `id`; `pinned` is the slide being sub-edited
pub fn view(doc: &Document, id: &NodeId, pinned: Option<&NodeId>) -> Result<CarouselView, CarouselError> {
    let node = carousel(doc, id)?;
    let current = cursor(doc, id)?.min(node.children.len().saturating_sub(1));

    Ok(CarouselView {
        current,
        offset_percent: -(current as i64) * 100,
        overlays: node
            .children
            .iter()
            .map(|slide| Some(&slide.id) == pinned)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_carousel(slides: usize) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        let carousel = doc.create_node(ComponentType::Carousel);
        let id = carousel.id.clone();
        doc.insert(carousel, &root, 0).unwrap();
        while slide_count(&doc, &id).unwrap() < slides {
            add_slide(&mut doc, &id).unwrap();
        }
        while slide_count(&doc, &id).unwrap() > slides {
            delete_slide(&mut doc, &id, 0).unwrap();
        }
        (doc, id)
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(-1), Some(Direction::Previous));
        assert_eq!(Direction::from_delta(1), Some(Direction::Next));
        assert_eq!(Direction::from_delta(0), None);
    }

    #[test]
    fn test_advance_wraps_both_ways() {
        let (mut doc, id) = doc_with_carousel(3);

        assert_eq!(advance(&mut doc, &id, Direction::Previous), Ok(2));
        assert_eq!(advance(&mut doc, &id, Direction::Next), Ok(0));
        assert_eq!(advance(&mut doc, &id, Direction::Next), Ok(1));
        assert_eq!(advance(&mut doc, &id, Direction::Next), Ok(2));
        assert_eq!(advance(&mut doc, &id, Direction::Next), Ok(0));
    }

    #[test]
    fn test_advance_single_slide_stays_put() {
        let (mut doc, id) = doc_with_carousel(1);
        assert_eq!(advance(&mut doc, &id, Direction::Next), Ok(0));
        assert_eq!(advance(&mut doc, &id, Direction::Previous), Ok(0));
    }

    #[test]
    fn test_add_slide_appends_new_slide_placeholder() {
        let (mut doc, id) = doc_with_carousel(2);
        let slide = add_slide(&mut doc, &id).unwrap();

        let node = doc.find(&id).unwrap();
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.children[2].id, slide);
        assert!(node.children[2]
            .kind
            .attribute("src")
            .is_some_and(|src| src.contains("New+Slide")));
        assert_eq!(cursor(&doc, &id), Ok(0));
    }

    #[test]
    fn test_last_slide_cannot_be_deleted() {
        let (mut doc, id) = doc_with_carousel(1);
        assert_eq!(delete_slide(&mut doc, &id, 0), Err(CarouselError::LastSlide));
        assert_eq!(slide_count(&doc, &id), Ok(1));
    }

    #[test]
    fn test_delete_at_or_before_cursor_steps_back() {
        let (mut doc, id) = doc_with_carousel(4);
        advance(&mut doc, &id, Direction::Next).unwrap();
        advance(&mut doc, &id, Direction::Next).unwrap();
        assert_eq!(cursor(&doc, &id), Ok(2));

        delete_slide(&mut doc, &id, 3).unwrap();
        assert_eq!(cursor(&doc, &id), Ok(2));

        delete_slide(&mut doc, &id, 2).unwrap();
        assert_eq!(cursor(&doc, &id), Ok(1));

        delete_slide(&mut doc, &id, 0).unwrap();
        assert_eq!(cursor(&doc, &id), Ok(0));
    }

    #[test]
    fn test_delete_out_of_range() {
        let (mut doc, id) = doc_with_carousel(2);
        assert_eq!(
            delete_slide(&mut doc, &id, 5),
            Err(CarouselError::IndexOutOfRange { index: 5, count: 2 })
        );
    }

    #[test]
    fn test_non_carousel_is_refused() {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        assert_eq!(
            add_slide(&mut doc, &root),
            Err(CarouselError::NotACarousel(root))
        );
    }

    #[test]
    fn test_view_offset_and_pinned_overlay() {
        let (mut doc, id) = doc_with_carousel(3);
        advance(&mut doc, &id, Direction::Next).unwrap();
        let pinned = doc.find(&id).unwrap().children[2].id.clone();

        let view = view(&doc, &id, Some(&pinned)).unwrap();
        assert_eq!(view.current, 1);
        assert_eq!(view.offset_percent, -100);
        assert_eq!(view.overlays, vec![false, false, true]);
    }
}

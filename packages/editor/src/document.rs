//! # Document Handle
//!
//! The editable node tree plus the id generator that names new nodes.
//!
//! A Document always has exactly one root, the `canvas`. Every other node is
//! reachable from it and appears exactly once in its parent's child list.
//! Parents are not stored on nodes; they are recovered by walking the tree,
//! which is cheap at the document sizes the editor deals with (tens of nodes).
//!
//! ## Lifecycle
//!
//! ```text
//! create_node → insert → (edit / move) → remove
//!      ↓          ↓            ↓            ↓
//!  detached    attached    attached     detached
//! ```
//!
//! The document itself never records history. Callers that mutate it are
//! expected to save a snapshot afterwards (see [`crate::History`]).

use crate::history::Snapshot;
use crate::layout::{LayoutProvider, Point};
use crate::mutations::MutationError;
use crate::node::{
    ComponentType, Node, NodeId, NodeKind, IMAGE_PLACEHOLDER, NEW_SLIDE_PLACEHOLDER,
};
use std::collections::HashMap;

/// Sequential ID generator for nodes within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Editable page document
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,

    /// Not part of snapshots, so ids stay unique across undo/redo
    ids: IdGenerator,
}

impl Document {
    /// Create an empty document (just the canvas)
    pub fn new() -> Self {
        Self::with_seed("node")
    }

    /// Create an empty document whose node ids start with `seed`
    pub fn with_seed(seed: impl Into<String>) -> Self {
        let mut ids = IdGenerator::new(seed);
        let root = Node::new(ids.new_id(), NodeKind::Canvas);
        Self { root, ids }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root.id
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.root.contains(id)
    }

    /// Total number of nodes, including the canvas
    pub fn len(&self) -> usize {
        self.root.subtree_len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Build a new detached node of the given type with its default content,
    /// attributes, style and (for composite types) default children
    pub fn create_node(&mut self, ty: ComponentType) -> Node {
        let id = self.ids.new_id();
        match ty {
            ComponentType::Canvas => Node::new(id, NodeKind::Canvas),
            ComponentType::Text => {
                Node::new(id, NodeKind::Text).with_content("Click to edit this text block.")
            }
            ComponentType::Heading => {
                Node::new(id, NodeKind::Heading).with_content("Your Awesome Heading")
            }
            ComponentType::Image => Node::new(
                id,
                NodeKind::Image {
                    src: IMAGE_PLACEHOLDER.to_string(),
                    alt: "Placeholder Image".to_string(),
                },
            ),
            ComponentType::Button => Node::new(id, NodeKind::Button { href: "#".to_string() })
                .with_content("Click Me")
                .with_style("--button-bg-color", "#3498db")
                .with_style("--button-text-color", "white"),
            ComponentType::Navbar => Node::new(
                id,
                NodeKind::Navbar {
                    links: ["Home", "About", "Services", "Contact"]
                        .map(String::from)
                        .to_vec(),
                },
            )
            .with_content("Tech Command"),
            ComponentType::Footer => Node::new(
                id,
                NodeKind::Footer {
                    links: ["Facebook", "Twitter", "LinkedIn"].map(String::from).to_vec(),
                },
            )
            .with_content("© 2025 Tech Command. All rights reserved."),
            ComponentType::Section => Node::new(id, NodeKind::Section)
                .with_content("This is a flexible container. Drop elements inside!"),
            ComponentType::Columns => {
                let columns = (0..2)
                    .map(|index| Node::new(self.ids.new_id(), NodeKind::Column { index }))
                    .collect();
                Node::new(id, NodeKind::Columns)
                    .with_style("display", "flex")
                    .with_style("gap", "15px")
                    .with_style("grid-template-columns", "1fr 1fr")
                    .with_children(columns)
            }
            ComponentType::Column => Node::new(id, NodeKind::Column { index: 0 }),
            ComponentType::Icon => Node::new(id, NodeKind::Icon { name: "star".to_string() }),
            ComponentType::Video => Node::new(id, NodeKind::Video { url: String::new() }),
            ComponentType::Carousel => {
                let slides = (1..=2)
                    .map(|n| {
                        Node::new(
                            self.ids.new_id(),
                            NodeKind::Slide {
                                src: format!("https://via.placeholder.com/400x300?text=Slide+{n}"),
                                alt: format!("Slide {n}"),
                            },
                        )
                    })
                    .collect();
                Node::new(id, NodeKind::Carousel { current_slide: 0 }).with_children(slides)
            }
            ComponentType::Slide => Node::new(
                id,
                NodeKind::Slide {
                    src: NEW_SLIDE_PLACEHOLDER.to_string(),
                    alt: "New Slide".to_string(),
                },
            ),
        }
    }

    /// Attach `node` under `parent_id` at `index` (clamped to the child count)
    pub fn insert(&mut self, node: Node, parent_id: &NodeId, index: usize) -> Result<(), MutationError> {
        if self.contains(&node.id) {
            return Err(MutationError::DuplicateNode(node.id));
        }

        let parent = self
            .root
            .find_mut(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;

        if !parent.component_type().accepts(node.component_type()) {
            return Err(MutationError::InvalidStructure(format!(
                "{} cannot contain {}",
                parent.component_type(),
                node.component_type()
            )));
        }

        let index = index.min(parent.children.len());
        parent.children.insert(index, node);
        Ok(())
    }

    /// Detach `id` (and its subtree) from the tree and return it
    pub fn remove(&mut self, id: &NodeId) -> Result<Node, MutationError> {
        if id == self.root_id() {
            return Err(MutationError::RootImmutable);
        }

        let removed = remove_from(&mut self.root, id)
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
        Ok(removed)
    }

    /// Direct parent of `id`
    pub fn parent_of(&self, id: &NodeId) -> Option<&Node> {
        self.path_to(id)
            .and_then(|path| path.len().checked_sub(2).map(|i| path[i]))
    }

    /// Position of `id` within its parent's children
    pub fn index_in_parent(&self, id: &NodeId) -> Option<usize> {
        self.parent_of(id)?
            .children
            .iter()
            .position(|child| &child.id == id)
    }

    /// Nodes from the root down to `id` (inclusive)
    pub fn path_to(&self, id: &NodeId) -> Option<Vec<&Node>> {
        let mut path = Vec::new();
        if path_into(&self.root, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    /// Whether `node` sits somewhere below `ancestor`
    pub fn is_descendant_of(&self, node: &NodeId, ancestor: &NodeId) -> bool {
        node != ancestor
            && self
                .find(ancestor)
                .map(|a| a.contains(node))
                .unwrap_or(false)
    }

    /// Nearest enclosing carousel of a slide (or the carousel itself)
    pub fn owning_carousel(&self, id: &NodeId) -> Option<&Node> {
        self.path_to(id)?
            .into_iter()
            .rev()
            .find(|node| node.component_type() == ComponentType::Carousel)
    }

    /// Chain of rendered nodes under `point`, from the root to the deepest hit.
    ///
    /// Nodes without bounds are treated as not rendered, along with their
    /// subtree. The subtree rooted at `skip` is ignored entirely.
    pub fn hit_path(
        &self,
        point: Point,
        layout: &dyn LayoutProvider,
        skip: Option<&NodeId>,
    ) -> Vec<&Node> {
        let mut path = Vec::new();
        hit_into(&self.root, point, layout, skip, &mut path);
        path
    }

    /// Resolve a screen point to the nearest structural container (canvas,
    /// section or column) under it, or `None` if outside all of them
    pub fn find_container_at(
        &self,
        point: Point,
        layout: &dyn LayoutProvider,
        skip: Option<&NodeId>,
    ) -> Option<&Node> {
        self.hit_path(point, layout, skip)
            .into_iter()
            .rev()
            .find(|node| node.component_type().is_drop_container())
    }

    /// Capture an independent copy of the current tree
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.root.clone())
    }

    /// Replace the live tree with a snapshot's copy.
    ///
    /// Carousel cursors are view state: a carousel present both live and in
    /// the snapshot keeps its live cursor, clamped to the restored slides.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        let mut cursors = HashMap::new();
        self.root.walk(&mut |node: &Node| {
            if let NodeKind::Carousel { current_slide } = node.kind {
                cursors.insert(node.id.clone(), current_slide);
            }
        });
        self.root = snapshot.root().clone();
        carry_cursors(&mut self.root, &cursors);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn carry_cursors(node: &mut Node, cursors: &HashMap<NodeId, usize>) {
    let last = node.children.len().saturating_sub(1);
    if let NodeKind::Carousel { current_slide } = &mut node.kind {
        if let Some(live) = cursors.get(&node.id) {
            *current_slide = (*live).min(last);
        }
    }
    for child in &mut node.children {
        carry_cursors(child, cursors);
    }
}

fn remove_from(node: &mut Node, target: &NodeId) -> Option<Node> {
    if let Some(pos) = node.children.iter().position(|c| &c.id == target) {
        return Some(node.children.remove(pos));
    }

    node.children
        .iter_mut()
        .find_map(|child| remove_from(child, target))
}

fn path_into<'a>(node: &'a Node, target: &NodeId, path: &mut Vec<&'a Node>) -> bool {
    path.push(node);
    if &node.id == target {
        return true;
    }
    for child in &node.children {
        if path_into(child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

fn hit_into<'a>(
    node: &'a Node,
    point: Point,
    layout: &dyn LayoutProvider,
    skip: Option<&NodeId>,
    path: &mut Vec<&'a Node>,
) -> bool {
    if skip == Some(&node.id) {
        return false;
    }
    match layout.bounds(&node.id) {
        Some(rect) if rect.contains(point) => {}
        _ => return false,
    }

    path.push(node);
    // Later siblings paint on top, so they win overlaps
    for child in node.children.iter().rev() {
        if hit_into(child, point, layout, skip, path) {
            break;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutMap, Rect};

    fn doc_with(types: &[ComponentType]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        let mut ids = Vec::new();
        for (i, ty) in types.iter().enumerate() {
            let node = doc.create_node(*ty);
            ids.push(node.id.clone());
            doc.insert(node, &root, i).unwrap();
        }
        (doc, ids)
    }

    #[test]
    fn test_create_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        assert!(doc.is_empty());
        assert_eq!(doc.root().component_type(), ComponentType::Canvas);
        assert_eq!(doc.root_id().as_str(), "node-1");
    }

    #[test]
    fn test_create_node_defaults() {
        let mut doc = Document::new();

        let button = doc.create_node(ComponentType::Button);
        assert_eq!(button.content.as_deref(), Some("Click Me"));
        assert_eq!(button.style.get("--button-bg-color").map(String::as_str), Some("#3498db"));
        assert_eq!(button.kind.attribute("href"), Some("#"));

        let columns = doc.create_node(ComponentType::Columns);
        assert_eq!(columns.children.len(), 2);
        assert!(columns
            .children
            .iter()
            .all(|c| c.component_type() == ComponentType::Column));

        let carousel = doc.create_node(ComponentType::Carousel);
        assert_eq!(carousel.children.len(), 2);
        assert_eq!(carousel.kind, NodeKind::Carousel { current_slide: 0 });
    }

    #[test]
    fn test_ids_are_sequential_and_unique() {
        let mut doc = Document::with_seed("page");
        let a = doc.create_node(ComponentType::Text);
        let b = doc.create_node(ComponentType::Text);
        assert_eq!(a.id.as_str(), "page-2");
        assert_eq!(b.id.as_str(), "page-3");
    }

    #[test]
    fn test_insert_clamps_index_and_remove_detaches() {
        let (mut doc, ids) = doc_with(&[ComponentType::Text, ComponentType::Heading]);
        let root = doc.root_id().clone();

        let image = doc.create_node(ComponentType::Image);
        let image_id = image.id.clone();
        doc.insert(image, &root, 99).unwrap();
        assert_eq!(doc.index_in_parent(&image_id), Some(2));

        let removed = doc.remove(&ids[0]).unwrap();
        assert_eq!(removed.id, ids[0]);
        assert!(!doc.contains(&ids[0]));
        assert_eq!(doc.index_in_parent(&image_id), Some(1));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        assert_eq!(doc.remove(&root), Err(MutationError::RootImmutable));
    }

    #[test]
    fn test_parent_and_path() {
        let (doc, ids) = doc_with(&[ComponentType::Columns]);
        let column = doc.find(&ids[0]).unwrap().children[1].id.clone();

        assert_eq!(doc.parent_of(&column).map(|n| n.id.clone()), Some(ids[0].clone()));
        assert_eq!(doc.path_to(&column).map(|p| p.len()), Some(3));
        assert!(doc.is_descendant_of(&column, doc.root_id()));
        assert!(!doc.is_descendant_of(&ids[0], &column));
        assert!(doc.parent_of(doc.root_id()).is_none());
    }

    #[test]
    fn test_find_container_at_resolves_nearest_container() {
        let (doc, ids) = doc_with(&[ComponentType::Text, ComponentType::Columns]);
        let columns = doc.find(&ids[1]).unwrap();
        let left = columns.children[0].id.clone();
        let right = columns.children[1].id.clone();

        let layout = LayoutMap::new()
            .with(doc.root_id(), Rect::new(0.0, 0.0, 800.0, 600.0))
            .with(&ids[0], Rect::new(0.0, 0.0, 800.0, 100.0))
            .with(&ids[1], Rect::new(0.0, 100.0, 800.0, 200.0))
            .with(&left, Rect::new(0.0, 100.0, 390.0, 200.0))
            .with(&right, Rect::new(410.0, 100.0, 390.0, 200.0));

        let at = |x, y| {
            doc.find_container_at(Point::new(x, y), &layout, None)
                .map(|n| n.id.clone())
        };

        assert_eq!(at(50.0, 50.0), Some(doc.root_id().clone()));
        assert_eq!(at(50.0, 150.0), Some(left));
        assert_eq!(at(500.0, 150.0), Some(right));
        // Gap between the columns falls back to the canvas
        assert_eq!(at(400.0, 150.0), Some(doc.root_id().clone()));
        assert_eq!(at(900.0, 50.0), None);
    }

    #[test]
    fn test_hit_path_skips_subtree() {
        let (doc, ids) = doc_with(&[ComponentType::Section]);
        let layout = LayoutMap::new()
            .with(doc.root_id(), Rect::new(0.0, 0.0, 800.0, 600.0))
            .with(&ids[0], Rect::new(0.0, 0.0, 800.0, 300.0));

        let point = Point::new(10.0, 10.0);
        assert_eq!(doc.hit_path(point, &layout, None).len(), 2);
        assert_eq!(
            doc.find_container_at(point, &layout, Some(&ids[0])).map(|n| n.id.clone()),
            Some(doc.root_id().clone())
        );
    }

    #[test]
    fn test_snapshot_restore_keeps_id_generator() {
        let (mut doc, _) = doc_with(&[ComponentType::Text]);
        let snapshot = doc.snapshot();
        let root = doc.root_id().clone();
        let extra = doc.create_node(ComponentType::Icon);
        let extra_id = extra.id.clone();
        doc.insert(extra, &root, 1).unwrap();

        doc.restore(&snapshot);
        assert!(!doc.contains(&extra_id));

        let next = doc.create_node(ComponentType::Icon);
        assert_ne!(next.id, extra_id);
    }

    #[test]
    fn test_restore_keeps_live_carousel_cursor() {
        use crate::carousel::{self, Direction};

        let (mut doc, ids) = doc_with(&[ComponentType::Carousel]);
        carousel::add_slide(&mut doc, &ids[0]).unwrap();
        let three_slides = doc.snapshot();
        carousel::delete_slide(&mut doc, &ids[0], 2).unwrap();
        let two_slides = doc.snapshot();

        carousel::advance(&mut doc, &ids[0], Direction::Next).unwrap();
        doc.restore(&three_slides);
        assert_eq!(carousel::cursor(&doc, &ids[0]).unwrap(), 1);

        carousel::advance(&mut doc, &ids[0], Direction::Next).unwrap();
        assert_eq!(carousel::cursor(&doc, &ids[0]).unwrap(), 2);

        // Clamped to the restored slide count
        doc.restore(&two_slides);
        assert_eq!(carousel::cursor(&doc, &ids[0]).unwrap(), 1);
    }
}

//! # Node Model
//!
//! The document is a tree of component instances rooted at a single `canvas`
//! node. Nodes own their children; there is no stored parent pointer, parents
//! are recovered by traversal (see [`crate::Document::parent_of`]).
//!
//! Every node carries a [`NodeKind`], a tagged variant over the fixed set of
//! component kinds. Type-specific state (image source, link href, icon name,
//! slide cursor, ...) lives inside the variant's payload rather than in a
//! loosely typed attribute bag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder shown by freshly dropped image blocks
pub const IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/200x150?text=Click+to+Change+Image";

/// Placeholder used by slides created with "Add New Slide"
pub const NEW_SLIDE_PLACEHOLDER: &str = "https://via.placeholder.com/400x300?text=New+Slide";

/// CSS-like property name → value
pub type StyleMap = BTreeMap<String, String>;

/// Stable node identifier (never reused within a document)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plain component tag, used by the palette and the schema registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Canvas,
    Text,
    Heading,
    Image,
    Button,
    Navbar,
    Footer,
    Section,
    Columns,
    Column,
    Icon,
    Video,
    Carousel,
    Slide,
}

impl ComponentType {
    /// Component kinds offered by the sidebar palette
    pub const PALETTE: [ComponentType; 11] = [
        ComponentType::Text,
        ComponentType::Heading,
        ComponentType::Image,
        ComponentType::Button,
        ComponentType::Navbar,
        ComponentType::Footer,
        ComponentType::Section,
        ComponentType::Columns,
        ComponentType::Icon,
        ComponentType::Video,
        ComponentType::Carousel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentType::Canvas => "canvas",
            ComponentType::Text => "text",
            ComponentType::Heading => "heading",
            ComponentType::Image => "image",
            ComponentType::Button => "button",
            ComponentType::Navbar => "navbar",
            ComponentType::Footer => "footer",
            ComponentType::Section => "section",
            ComponentType::Columns => "columns",
            ComponentType::Column => "column",
            ComponentType::Icon => "icon",
            ComponentType::Video => "video",
            ComponentType::Carousel => "carousel",
            ComponentType::Slide => "slide",
        }
    }

    /// Parse a palette tag such as `"button"`
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "canvas" => ComponentType::Canvas,
            "text" => ComponentType::Text,
            "heading" => ComponentType::Heading,
            "image" => ComponentType::Image,
            "button" => ComponentType::Button,
            "navbar" => ComponentType::Navbar,
            "footer" => ComponentType::Footer,
            "section" => ComponentType::Section,
            "columns" => ComponentType::Columns,
            "column" => ComponentType::Column,
            "icon" => ComponentType::Icon,
            "video" => ComponentType::Video,
            "carousel" => ComponentType::Carousel,
            "slide" => ComponentType::Slide,
            _ => return None,
        };
        Some(ty)
    }

    /// Structural containers that participate in drag-reorder
    pub fn is_drop_container(self) -> bool {
        matches!(
            self,
            ComponentType::Canvas | ComponentType::Section | ComponentType::Column
        )
    }

    /// Whether a node of this type can be picked up and reordered
    pub fn is_movable(self) -> bool {
        !matches!(
            self,
            ComponentType::Canvas | ComponentType::Column | ComponentType::Slide
        )
    }

    /// Whether a node of this type may hold `child` as a direct child
    pub fn accepts(self, child: ComponentType) -> bool {
        match self {
            ComponentType::Columns => child == ComponentType::Column,
            ComponentType::Carousel => child == ComponentType::Slide,
            ty if ty.is_drop_container() => child.is_movable(),
            _ => false,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Component kind with its type-specific attribute payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Canvas,
    Text,
    Heading,
    Image { src: String, alt: String },
    Button { href: String },
    Navbar { links: Vec<String> },
    Footer { links: Vec<String> },
    Section,
    Columns,
    Column { index: usize },
    Icon { name: String },
    Video { url: String },
    Carousel { current_slide: usize },
    Slide { src: String, alt: String },
}

impl NodeKind {
    pub fn component_type(&self) -> ComponentType {
        match self {
            NodeKind::Canvas => ComponentType::Canvas,
            NodeKind::Text => ComponentType::Text,
            NodeKind::Heading => ComponentType::Heading,
            NodeKind::Image { .. } => ComponentType::Image,
            NodeKind::Button { .. } => ComponentType::Button,
            NodeKind::Navbar { .. } => ComponentType::Navbar,
            NodeKind::Footer { .. } => ComponentType::Footer,
            NodeKind::Section => ComponentType::Section,
            NodeKind::Columns => ComponentType::Columns,
            NodeKind::Column { .. } => ComponentType::Column,
            NodeKind::Icon { .. } => ComponentType::Icon,
            NodeKind::Video { .. } => ComponentType::Video,
            NodeKind::Carousel { .. } => ComponentType::Carousel,
            NodeKind::Slide { .. } => ComponentType::Slide,
        }
    }

    /// Read an attribute by its schema key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match (self, key) {
            (NodeKind::Image { src, .. }, "src") | (NodeKind::Slide { src, .. }, "src") => {
                Some(src.as_str())
            }
            (NodeKind::Button { href }, "href") => Some(href.as_str()),
            (NodeKind::Icon { name }, "icon") => Some(name.as_str()),
            (NodeKind::Video { url }, "url") => Some(url.as_str()),
            _ => None,
        }
    }

    /// Write an attribute by its schema key; returns false for unknown keys
    pub fn set_attribute(&mut self, key: &str, value: String) -> bool {
        match (self, key) {
            (NodeKind::Image { src, .. }, "src") | (NodeKind::Slide { src, .. }, "src") => *src = value,
            (NodeKind::Button { href }, "href") => *href = value,
            (NodeKind::Icon { name }, "icon") => *name = value,
            (NodeKind::Video { url }, "url") => *url = value,
            _ => return false,
        }
        true
    }
}

/// One component instance in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            style: StyleMap::new(),
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.style.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    /// Depth-first search in this subtree (including `self`)
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Number of nodes in this subtree (including `self`)
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Pre-order walk over this subtree
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

//! Host-supplied geometry.
//!
//! The editor never lays anything out itself. Pixel layout belongs to the host
//! platform, which reports the on-screen bounds of rendered nodes through a
//! [`LayoutProvider`]. Hit-testing for clicks and drops is computed against
//! those bounds.

use crate::node::NodeId;
use std::collections::HashMap;

/// Pointer position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Source of rendered node bounds
pub trait LayoutProvider {
    /// Current bounds of `id`, or `None` if it is not rendered
    fn bounds(&self, id: &NodeId) -> Option<Rect>;
}

/// Simple map-backed layout, handy for hosts that cache bounds per frame
#[derive(Debug, Clone, Default)]
pub struct LayoutMap {
    rects: HashMap<NodeId, Rect>,
}

impl LayoutMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: NodeId, rect: Rect) {
        self.rects.insert(id, rect);
    }

    pub fn with(mut self, id: &NodeId, rect: Rect) -> Self {
        self.set(id.clone(), rect);
        self
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

impl LayoutProvider for LayoutMap {
    fn bounds(&self, id: &NodeId) -> Option<Rect> {
        self.rects.get(id).copied()
    }
}

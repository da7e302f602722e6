use markmap_core::NodeId;
use markmap_core::geom::{Point, Rect, point, rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn pad_x(self, pad: f64) -> Self {
        Self {
            min_x: self.min_x - pad,
            max_x: self.max_x + pad,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// A visible node. `(x, y)` is the top-left corner of its content box; the underline runs along
/// the bottom edge and the toggle (for nodes with children) sits at its right end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub depth: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Wrapped label lines (used for plain-text labels).
    pub lines: Vec<String>,
    pub color: String,
    pub has_children: bool,
    pub folded: bool,
}

impl LayoutNode {
    pub fn rect(&self) -> Rect {
        rect(self.x, self.y, self.width, self.height)
    }

    pub fn toggle_center(&self) -> Option<Point> {
        self.has_children
            .then(|| point(self.x + self.width, self.y + self.height))
    }

    /// Where links to children start.
    pub fn anchor_out(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x + self.width,
            y: self.y + self.height,
        }
    }

    /// Where the link from the parent ends.
    pub fn anchor_in(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x,
            y: self.y + self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub points: Vec<LayoutPoint>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapLayout {
    /// Visible nodes in pre-order.
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Bounds,
}

impl MindmapLayout {
    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

//! Format-independent semantic model of a workflow diagram.
//!
//! Both syntax front-ends lower their input into a [`Diagram`]: a flat list
//! of [`Node`]s and the [`Edge`]s between them, plus the flow [`Direction`].
//! Edges refer to nodes by index, so a constructed diagram never contains a
//! dangling reference.

use std::fmt;

use crate::color::Color;

/// Main flow direction of a diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// Returns true when ranks advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Returns true when ranks advance against the axis (upwards or leftwards).
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::BottomToTop | Self::RightToLeft)
    }
}

/// Outline drawn around a node label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeShape {
    #[default]
    Rectangle,
    Rounded,
    Stadium,
    Subroutine,
    Cylinder,
    Circle,
    DoubleCircle,
    Ellipse,
    Diamond,
    Hexagon,
    Asymmetric,
    /// Label only, no outline.
    Plaintext,
}

impl NodeShape {
    /// Returns true for shapes that must keep a 1:1 aspect ratio.
    pub fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::DoubleCircle)
    }
}

/// Optional per-node color overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStyle {
    fill: Option<Color>,
    stroke: Option<Color>,
    text: Option<Color>,
}

impl NodeStyle {
    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    pub fn text(&self) -> Option<Color> {
        self.text
    }

    pub fn set_fill(&mut self, color: Color) {
        self.fill = Some(color);
    }

    pub fn set_stroke(&mut self, color: Color) {
        self.stroke = Some(color);
    }

    pub fn set_text(&mut self, color: Color) {
        self.text = Some(color);
    }
}

/// A single step of the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    label: String,
    shape: NodeShape,
    style: NodeStyle,
}

impl Node {
    /// Creates a node whose label is its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            shape: NodeShape::default(),
            style: NodeStyle::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display text; may contain `\n` line breaks.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_shape(&mut self, shape: NodeShape) {
        self.shape = shape;
    }

    pub fn style_mut(&mut self) -> &mut NodeStyle {
        &mut self.style
    }
}

/// Line style of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EdgeStroke {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Thick,
    Invisible,
}

/// Marker drawn at one end of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    #[default]
    None,
    Arrow,
}

/// A dependency between two nodes, referenced by index into [`Diagram::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    label: Option<String>,
    stroke: EdgeStroke,
    head: EdgeEnd,
    tail: EdgeEnd,
}

impl Edge {
    /// Creates a solid edge with an arrow head at `target`.
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            label: None,
            stroke: EdgeStroke::default(),
            head: EdgeEnd::Arrow,
            tail: EdgeEnd::None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_stroke(mut self, stroke: EdgeStroke) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_ends(mut self, tail: EdgeEnd, head: EdgeEnd) -> Self {
        self.tail = tail;
        self.head = head;
        self
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn stroke(&self) -> EdgeStroke {
        self.stroke
    }

    /// Marker at the target end.
    pub fn head(&self) -> EdgeEnd {
        self.head
    }

    /// Marker at the source end.
    pub fn tail(&self) -> EdgeEnd {
        self.tail
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Error returned when an edge refers to a node index that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    pub edge: usize,
    pub node: usize,
}

impl fmt::Display for DanglingEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {} refers to missing node {}", self.edge, self.node)
    }
}

impl std::error::Error for DanglingEdge {}

/// A fully resolved workflow diagram.
///
/// # Examples
///
/// ```
/// # use tracery_core::semantic::{Diagram, Direction, Edge, Node};
/// let diagram = Diagram::new(
///     Direction::LeftToRight,
///     vec![Node::new("fetch"), Node::new("train")],
///     vec![Edge::new(0, 1)],
/// )
/// .unwrap();
///
/// assert_eq!(diagram.nodes().len(), 2);
/// assert_eq!(diagram.node_index("train"), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    direction: Direction,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Creates a diagram, checking that every edge endpoint exists.
    pub fn new(
        direction: Direction,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self, DanglingEdge> {
        for (idx, edge) in edges.iter().enumerate() {
            for node in [edge.source, edge.target] {
                if node >= nodes.len() {
                    return Err(DanglingEdge { edge: idx, node });
                }
            }
        }

        Ok(Self {
            direction,
            nodes,
            edges,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the index of the node with the given identifier.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_rejects_dangling_edges() {
        let result = Diagram::new(
            Direction::default(),
            vec![Node::new("a")],
            vec![Edge::new(0, 3)],
        );
        assert_eq!(result, Err(DanglingEdge { edge: 0, node: 3 }));
    }

    #[test]
    fn test_node_builder() {
        let node = Node::new("prep")
            .with_label("Prepare data")
            .with_shape(NodeShape::Stadium);
        assert_eq!(node.id(), "prep");
        assert_eq!(node.label(), "Prepare data");
        assert_eq!(node.shape(), NodeShape::Stadium);
        assert_eq!(node.style().fill(), None);
    }

    #[test]
    fn test_edge_defaults() {
        let edge = Edge::new(1, 1);
        assert!(edge.is_self_loop());
        assert_eq!(edge.head(), EdgeEnd::Arrow);
        assert_eq!(edge.tail(), EdgeEnd::None);
        assert_eq!(edge.stroke(), EdgeStroke::Solid);
        assert_eq!(edge.label(), None);
    }

    #[test]
    fn test_direction_flags() {
        assert!(Direction::RightToLeft.is_horizontal());
        assert!(Direction::RightToLeft.is_reversed());
        assert!(!Direction::TopToBottom.is_reversed());
    }
}

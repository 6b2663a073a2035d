//! Layered layout of a semantic [`Diagram`].
//!
//! Placement is computed in a top-to-bottom frame and then mapped onto the
//! diagram's [`Direction`]:
//!
//! 1. Nodes are measured (sizes are transposed for horizontal flows).
//! 2. Every connected component is ranked with the Sugiyama method.
//! 3. Ranks are stacked, nodes within a rank are spread without overlap.
//! 4. Components sit side by side; nodes without edges form a trailing row.
//! 5. Edges are routed between node outlines in the final frame.

mod routing;
mod sugiyama;
mod text;

pub use routing::EdgePath;
pub use text::TextMetrics;

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use tracery_core::{
    geometry::{Bounds, Point, Size},
    semantic::{Diagram, Direction, Node},
};

use crate::{config::LayoutConfig, engine::EngineError};

use sugiyama::RankedComponent;

/// Position and extents of one node, in final drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    center: Point,
    size: Size,
}

impl NodePlacement {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.center, self.size)
    }
}

/// A measured edge label centered on its anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBox {
    center: Point,
    size: Size,
}

impl LabelBox {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.center, self.size)
    }
}

/// Geometry of one edge plus its optional label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRoute {
    path: EdgePath,
    label: Option<LabelBox>,
}

impl EdgeRoute {
    pub fn path(&self) -> &EdgePath {
        &self.path
    }

    pub fn label(&self) -> Option<&LabelBox> {
        self.label.as_ref()
    }
}

/// Complete placement of a diagram.
///
/// `nodes()[i]` and `edges()[i]` correspond to the diagram's `nodes()[i]` and
/// `edges()[i]`. Everything lies inside `(0, 0)..size()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    nodes: Vec<NodePlacement>,
    edges: Vec<EdgeRoute>,
    size: Size,
}

impl Layout {
    pub fn nodes(&self) -> &[NodePlacement] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeRoute] {
        &self.edges
    }

    /// Natural size of the drawing including padding.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Computes [`Layout`]s from a [`LayoutConfig`].
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    horizontal_spacing: f32,
    vertical_spacing: f32,
    padding: f32,
    node_padding: f32,
    metrics: TextMetrics,
}

impl LayoutEngine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            horizontal_spacing: config.horizontal_spacing(),
            vertical_spacing: config.vertical_spacing(),
            padding: config.padding(),
            node_padding: config.node_padding(),
            metrics: TextMetrics::new(config.font_size()),
        }
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    /// Lays out `diagram`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Layout`] when the layered layout fails.
    pub fn calculate(&self, diagram: &Diagram) -> Result<Layout, EngineError> {
        let direction = diagram.direction();
        let sizes: Vec<Size> = diagram.nodes().iter().map(|n| self.node_size(n)).collect();
        // Ranks always advance along y in the working frame.
        let frame_sizes: Vec<Size> = if direction.is_horizontal() {
            sizes.iter().map(|s| s.transpose()).collect()
        } else {
            sizes.clone()
        };

        let mut rank_edges: Vec<(usize, usize)> = Vec::new();
        let mut seen = HashSet::new();
        for edge in diagram.edges() {
            let pair = (edge.source(), edge.target());
            if !edge.is_self_loop() && seen.insert(pair) {
                rank_edges.push(pair);
            }
        }
        let components = sugiyama::rank_components(&rank_edges)?;

        let mut frame_centers = vec![Point::default(); sizes.len()];
        let mut placed = vec![false; sizes.len()];
        let mut cursor_x = 0.0;
        let mut frame_height: f32 = 0.0;
        for component in &components {
            let width =
                self.place_component(component, &frame_sizes, cursor_x, &mut frame_centers);
            for rank in component.ranks() {
                for &(node, _) in rank {
                    placed[node] = true;
                    let bottom = frame_centers[node].y() + frame_sizes[node].height() / 2.0;
                    frame_height = frame_height.max(bottom);
                }
            }
            cursor_x += width + self.horizontal_spacing;
        }

        let isolated: Vec<usize> = (0..sizes.len()).filter(|&idx| !placed[idx]).collect();
        if !isolated.is_empty() {
            let top = if components.is_empty() {
                0.0
            } else {
                frame_height + self.vertical_spacing
            };
            let row_height = isolated
                .iter()
                .map(|&idx| frame_sizes[idx].height())
                .fold(0.0, f32::max);
            let mut x = 0.0;
            for &idx in &isolated {
                let size = frame_sizes[idx];
                frame_centers[idx] = Point::new(x + size.width() / 2.0, top + row_height / 2.0);
                x += size.width() + self.horizontal_spacing;
            }
            frame_height = top + row_height;
            trace!(count = isolated.len(); "Placed isolated nodes on a trailing row");
        }

        let centers: Vec<Point> = frame_centers
            .iter()
            .map(|&center| orient(center, direction, frame_height))
            .collect();

        let mut layout = Layout {
            nodes: centers
                .iter()
                .zip(&sizes)
                .map(|(&center, &size)| NodePlacement { center, size })
                .collect(),
            edges: Vec::with_capacity(diagram.edges().len()),
            size: Size::default(),
        };
        layout.edges = self.route_edges(diagram, &layout.nodes);
        self.normalize(&mut layout);

        debug!(
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            components = components.len(),
            width = layout.size.width(),
            height = layout.size.height();
            "Layout calculated"
        );
        Ok(layout)
    }

    fn node_size(&self, node: &Node) -> Size {
        let label = self.metrics.measure(node.label());
        text::node_size(node.shape(), label, self.node_padding, &self.metrics)
    }

    /// Places one component with its left edge at `left`; returns its width.
    fn place_component(
        &self,
        component: &RankedComponent,
        sizes: &[Size],
        left: f32,
        centers: &mut [Point],
    ) -> f32 {
        let members = component.ranks().iter().flatten();
        let count = component.len().max(1) as f32;
        let average_width = members.map(|&(node, _)| sizes[node].width()).sum::<f32>() / count;
        let column = average_width + self.horizontal_spacing;

        let mut y = 0.0;
        let mut min_left = f32::INFINITY;
        let mut max_right = f32::NEG_INFINITY;
        for rank in component.ranks() {
            let height = rank
                .iter()
                .map(|&(node, _)| sizes[node].height())
                .fold(0.0, f32::max);

            let mut previous: Option<(f32, f32)> = None;
            for &(node, column_x) in rank {
                let width = sizes[node].width();
                let mut x = column_x * column;
                if let Some((prev_x, prev_width)) = previous {
                    x = x.max(prev_x + prev_width / 2.0 + self.horizontal_spacing + width / 2.0);
                }
                centers[node] = Point::new(x, y + height / 2.0);
                min_left = min_left.min(x - width / 2.0);
                max_right = max_right.max(x + width / 2.0);
                previous = Some((x, width));
            }
            y += height + self.vertical_spacing;
        }

        if !min_left.is_finite() {
            return 0.0;
        }
        let shift = Point::new(left - min_left, 0.0);
        for rank in component.ranks() {
            for &(node, _) in rank {
                centers[node] = centers[node].add_point(shift);
            }
        }
        max_right - min_left
    }

    fn route_edges(&self, diagram: &Diagram, nodes: &[NodePlacement]) -> Vec<EdgeRoute> {
        let mut bundles: HashMap<(usize, usize), usize> = HashMap::new();
        for edge in diagram.edges().iter().filter(|e| !e.is_self_loop()) {
            let key = bundle_key(edge.source(), edge.target());
            *bundles.entry(key).or_default() += 1;
        }

        let mut bundle_seen: HashMap<(usize, usize), usize> = HashMap::new();
        let mut loops_seen: HashMap<usize, usize> = HashMap::new();
        let loop_reach = (self.vertical_spacing * 0.5).max(20.0);

        diagram
            .edges()
            .iter()
            .map(|edge| {
                let source = &nodes[edge.source()];
                let target = &nodes[edge.target()];
                let source_shape = diagram.nodes()[edge.source()].shape();
                let target_shape = diagram.nodes()[edge.target()].shape();

                let path = if edge.is_self_loop() {
                    let nth = loops_seen.entry(edge.source()).or_default();
                    let path = routing::self_loop(source.center, source.size, *nth, loop_reach);
                    *nth += 1;
                    path
                } else {
                    let key = bundle_key(edge.source(), edge.target());
                    let count = bundles.get(&key).copied().unwrap_or(1);
                    let index = bundle_seen.entry(key).or_default();
                    let (low, high) = (nodes[key.0].center, nodes[key.1].center);
                    let control = routing::bow_control(
                        low,
                        high,
                        *index,
                        count,
                        self.horizontal_spacing / 2.0,
                    );
                    *index += 1;

                    match control {
                        Some(control) => EdgePath::Bow {
                            start: routing::boundary_point(
                                source_shape,
                                source.center,
                                source.size,
                                control,
                            ),
                            control,
                            end: routing::boundary_point(
                                target_shape,
                                target.center,
                                target.size,
                                control,
                            ),
                        },
                        None => EdgePath::Line {
                            start: routing::boundary_point(
                                source_shape,
                                source.center,
                                source.size,
                                target.center,
                            ),
                            end: routing::boundary_point(
                                target_shape,
                                target.center,
                                target.size,
                                source.center,
                            ),
                        },
                    }
                };

                let label = edge
                    .label()
                    .filter(|text| !text.is_empty())
                    .map(|text| LabelBox {
                        center: path.midpoint(),
                        size: self.metrics.measure(text),
                    });

                EdgeRoute { path, label }
            })
            .collect()
    }

    /// Moves everything so the drawing starts at `(padding, padding)` and sets
    /// the final size.
    fn normalize(&self, layout: &mut Layout) {
        let extents = layout
            .nodes
            .iter()
            .map(NodePlacement::bounds)
            .chain(layout.edges.iter().map(|e| e.path.bounds()))
            .chain(layout.edges.iter().filter_map(|e| e.label.map(|l| l.bounds())))
            .reduce(|acc, b| acc.merge(&b));

        let Some(extents) = extents else {
            layout.size = Size::new(2.0 * self.padding, 2.0 * self.padding);
            return;
        };

        let offset = Point::new(
            self.padding - extents.min_x(),
            self.padding - extents.min_y(),
        );
        for node in &mut layout.nodes {
            node.center = node.center.add_point(offset);
        }
        for edge in &mut layout.edges {
            edge.path = edge.path.translate(offset);
            if let Some(label) = &mut edge.label {
                label.center = label.center.add_point(offset);
            }
        }
        layout.size = Size::new(
            extents.width() + 2.0 * self.padding,
            extents.height() + 2.0 * self.padding,
        );
    }
}

fn bundle_key(source: usize, target: usize) -> (usize, usize) {
    (source.min(target), source.max(target))
}

/// Maps a point of the top-to-bottom working frame onto `direction`.
fn orient(point: Point, direction: Direction, frame_height: f32) -> Point {
    match direction {
        Direction::TopToBottom => point,
        Direction::BottomToTop => Point::new(point.x(), frame_height - point.y()),
        Direction::LeftToRight => point.transpose(),
        Direction::RightToLeft => Point::new(frame_height - point.y(), point.x()),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use tracery_core::semantic::{Edge, NodeShape};

    use super::*;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(&LayoutConfig::default())
    }

    fn chain(direction: Direction) -> Diagram {
        Diagram::new(
            direction,
            vec![Node::new("a"), Node::new("b"), Node::new("c")],
            vec![Edge::new(0, 1), Edge::new(1, 2)],
        )
        .unwrap()
    }

    fn overlaps(a: Bounds, b: Bounds) -> bool {
        a.min_x() < b.max_x() - 0.01
            && b.min_x() < a.max_x() - 0.01
            && a.min_y() < b.max_y() - 0.01
            && b.min_y() < a.max_y() - 0.01
    }

    #[test]
    fn test_directions() {
        let layout = engine().calculate(&chain(Direction::TopToBottom)).unwrap();
        let ys: Vec<f32> = layout.nodes().iter().map(|n| n.center().y()).collect();
        assert!(ys[0] < ys[1] && ys[1] < ys[2]);

        let layout = engine().calculate(&chain(Direction::BottomToTop)).unwrap();
        let ys: Vec<f32> = layout.nodes().iter().map(|n| n.center().y()).collect();
        assert!(ys[0] > ys[1] && ys[1] > ys[2]);

        let layout = engine().calculate(&chain(Direction::LeftToRight)).unwrap();
        let xs: Vec<f32> = layout.nodes().iter().map(|n| n.center().x()).collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);

        let layout = engine().calculate(&chain(Direction::RightToLeft)).unwrap();
        let xs: Vec<f32> = layout.nodes().iter().map(|n| n.center().x()).collect();
        assert!(xs[0] > xs[1] && xs[1] > xs[2]);
    }

    #[test]
    fn test_everything_inside_padding() {
        let layout = engine().calculate(&chain(Direction::TopToBottom)).unwrap();
        let padding = LayoutConfig::default().padding();
        for node in layout.nodes() {
            let bounds = node.bounds();
            assert!(bounds.min_x() >= padding - 0.01);
            assert!(bounds.min_y() >= padding - 0.01);
            assert!(bounds.max_x() <= layout.size().width() - padding + 0.01);
            assert!(bounds.max_y() <= layout.size().height() - padding + 0.01);
        }
    }

    #[test]
    fn test_edges_touch_node_outlines() {
        let layout = engine().calculate(&chain(Direction::TopToBottom)).unwrap();
        let a = layout.nodes()[0].bounds();
        let b = layout.nodes()[1].bounds();
        let path = layout.edges()[0].path();
        assert!(path.start().y() > a.center().y() && path.start().y() <= a.max_y() + 0.5);
        assert!(path.end().y() < b.center().y() && path.end().y() >= b.min_y() - 0.5);
    }

    #[test]
    fn test_isolated_nodes_trail_below() {
        let diagram = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b"), Node::new("lonely")],
            vec![Edge::new(0, 1)],
        )
        .unwrap();
        let layout = engine().calculate(&diagram).unwrap();
        let lonely = layout.nodes()[2].bounds();
        assert!(lonely.min_y() > layout.nodes()[1].bounds().max_y());
    }

    #[test]
    fn test_no_edges_single_row() {
        let diagram = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b")],
            vec![],
        )
        .unwrap();
        let layout = engine().calculate(&diagram).unwrap();
        assert_approx_eq!(
            f32,
            layout.nodes()[0].center().y(),
            layout.nodes()[1].center().y()
        );
        assert!(!overlaps(layout.nodes()[0].bounds(), layout.nodes()[1].bounds()));
    }

    #[test]
    fn test_empty_diagram() {
        let diagram = Diagram::default();
        let layout = engine().calculate(&diagram).unwrap();
        assert!(layout.nodes().is_empty());
        let padding = LayoutConfig::default().padding();
        assert_eq!(layout.size(), Size::new(2.0 * padding, 2.0 * padding));
    }

    #[test]
    fn test_self_loop_and_parallel_edges() {
        let diagram = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b").with_shape(NodeShape::Diamond)],
            vec![Edge::new(0, 0), Edge::new(0, 1), Edge::new(1, 0)],
        )
        .unwrap();
        let layout = engine().calculate(&diagram).unwrap();

        assert!(matches!(layout.edges()[0].path(), EdgePath::Loop { .. }));
        assert!(matches!(layout.edges()[1].path(), EdgePath::Bow { .. }));
        assert!(matches!(layout.edges()[2].path(), EdgePath::Bow { .. }));
        // The loop must be inside the drawing.
        assert!(layout.edges()[0].path().bounds().max_x() <= layout.size().width());
    }

    #[test]
    fn test_components_side_by_side() {
        let diagram = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b"), Node::new("c"), Node::new("d")],
            vec![Edge::new(0, 1), Edge::new(2, 3)],
        )
        .unwrap();
        let layout = engine().calculate(&diagram).unwrap();
        let first = layout.nodes()[0].bounds().merge(&layout.nodes()[1].bounds());
        let second = layout.nodes()[2].bounds().merge(&layout.nodes()[3].bounds());
        assert!(!overlaps(first, second));
    }

    #[test]
    fn test_edge_label_is_measured() {
        let diagram = Diagram::new(
            Direction::LeftToRight,
            vec![Node::new("a"), Node::new("b")],
            vec![Edge::new(0, 1).with_label("yes")],
        )
        .unwrap();
        let layout = engine().calculate(&diagram).unwrap();
        let label = layout.edges()[0].label().unwrap();
        assert!(label.size().width() > 0.0);
    }

    fn dag_strategy() -> impl Strategy<Value = Diagram> {
        (2usize..9)
            .prop_flat_map(|count| {
                (
                    Just(count),
                    prop::collection::vec((0..count, 0..count), 0..14),
                )
            })
            .prop_map(|(count, pairs)| {
                let nodes = (0..count).map(|i| Node::new(format!("n{i}"))).collect();
                let edges = pairs
                    .into_iter()
                    .map(|(a, b)| Edge::new(a.min(b), a.max(b)))
                    .collect();
                Diagram::new(Direction::TopToBottom, nodes, edges).unwrap()
            })
    }

    proptest! {
        #[test]
        fn nodes_never_overlap(diagram in dag_strategy()) {
            let layout = engine().calculate(&diagram).unwrap();
            let nodes = layout.nodes();
            for i in 0..nodes.len() {
                for j in (i + 1)..nodes.len() {
                    prop_assert!(
                        !overlaps(nodes[i].bounds(), nodes[j].bounds()),
                        "nodes {} and {} overlap", i, j
                    );
                }
            }
        }
    }
}

//! SVG export of laid-out diagrams.
//!
//! The exporter draws into a [`LayeredOutput`] (background, edges, nodes,
//! labels) and wraps the result in a document whose natural size is the
//! layout size. Every node group carries `data-node="<id>"` and every edge
//! group `data-edge="<index>"` so a host can attach interaction to them.

mod layer;
mod markers;
mod shapes;

use log::debug;
use svg::node::{Text as SvgText, element as svg_element};

use tracery_core::{
    color::Color,
    geometry::{Point, Size},
    semantic::{Diagram, EdgeStroke},
    source::DiagramFormat,
};

use crate::{
    config::Theme,
    layout::{Layout, TextMetrics},
};

use layer::{LayeredOutput, RenderLayer};
use markers::MarkerSet;
use shapes::Paint;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Document-level settings that differ between engines.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions<'a> {
    format: DiagramFormat,
    element_id: Option<&'a str>,
    constrain_width: bool,
}

impl<'a> ExportOptions<'a> {
    pub fn new(format: DiagramFormat) -> Self {
        Self {
            format,
            element_id: None,
            constrain_width: false,
        }
    }

    /// Sets the root `id` and namespaces marker ids with it.
    pub fn with_element_id(mut self, element_id: &'a str) -> Self {
        self.element_id = Some(element_id);
        self
    }

    /// Declares `max-width` on the root, capping the drawing at its natural
    /// width inside wider containers.
    pub fn with_constrained_width(mut self) -> Self {
        self.constrain_width = true;
        self
    }

    fn marker_prefix(&self) -> String {
        self.element_id
            .map(|id| format!("{id}-"))
            .unwrap_or_else(|| "tracery-".to_string())
    }
}

/// Renders layouts to SVG strings.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    theme: Theme,
    metrics: TextMetrics,
}

impl SvgExporter {
    pub fn new(theme: Theme, metrics: TextMetrics) -> Self {
        Self { theme, metrics }
    }

    /// Exports `diagram` placed by `layout`.
    pub fn export(
        &self,
        diagram: &Diagram,
        layout: &Layout,
        options: ExportOptions<'_>,
    ) -> String {
        let mut output = LayeredOutput::new();
        let mut markers = MarkerSet::new(options.marker_prefix());

        output.add_to_layer(RenderLayer::Background, self.background(layout.size()));

        for (index, (edge, route)) in diagram.edges().iter().zip(layout.edges()).enumerate() {
            let source = diagram.nodes()[edge.source()].id();
            let target = diagram.nodes()[edge.target()].id();

            let mut path = svg_element::Path::new()
                .set("d", route.path().to_path_data())
                .set("fill", "none");
            path = match edge.stroke() {
                EdgeStroke::Invisible => path.set("stroke", "none"),
                stroke => {
                    let mut path = path
                        .set("stroke", self.theme.edge)
                        .set("stroke-opacity", self.theme.edge.alpha());
                    path = match stroke {
                        EdgeStroke::Dashed => path
                            .set("stroke-width", 1.5)
                            .set("stroke-dasharray", "6 4"),
                        EdgeStroke::Dotted => path
                            .set("stroke-width", 1.5)
                            .set("stroke-dasharray", "2 3"),
                        EdgeStroke::Thick => path.set("stroke-width", 3.0),
                        _ => path.set("stroke-width", 1.5),
                    };
                    let (start, end) =
                        markers.references(edge.tail(), edge.head(), self.theme.edge);
                    if let Some(start) = start {
                        path = path.set("marker-start", start);
                    }
                    if let Some(end) = end {
                        path = path.set("marker-end", end);
                    }
                    path
                }
            };

            let group = svg_element::Group::new()
                .set("class", "edge")
                .set("data-edge", index.to_string())
                .set("data-source", source)
                .set("data-target", target)
                .add(path);
            output.add_to_layer(RenderLayer::Edges, Box::new(group));

            if let (Some(text), Some(label)) = (edge.label(), route.label()) {
                if edge.stroke() != EdgeStroke::Invisible {
                    output.merge(self.edge_label(text, label.center(), label.size()));
                }
            }
        }

        for (node, placement) in diagram.nodes().iter().zip(layout.nodes()) {
            let paint = Paint {
                fill: node.style().fill().unwrap_or(self.theme.node_fill),
                stroke: node.style().stroke().unwrap_or(self.theme.node_stroke),
            };
            let mut group = svg_element::Group::new()
                .set("class", "node")
                .set("data-node", node.id());
            if let Some(outline) =
                shapes::outline(node.shape(), placement.center(), placement.size(), paint)
            {
                group = group.add(outline);
            }
            output.add_to_layer(RenderLayer::Nodes, Box::new(group));

            let color = node.style().text().unwrap_or(self.theme.text);
            output.add_to_layer(
                RenderLayer::Labels,
                Box::new(self.text(node.label(), placement.center(), color)),
            );
        }

        let size = layout.size();
        let mut doc = self.document(size, options);
        if !markers.is_empty() {
            doc = doc.add(markers.definitions());
        }
        for node in output.render() {
            doc = doc.add(node);
        }

        debug!(
            format = options.format.name(),
            nodes = diagram.nodes().len(),
            edges = diagram.edges().len();
            "SVG exported"
        );
        doc.to_string()
    }

    /// Neutral stand-in shown where a diagram could not be rendered.
    pub fn placeholder(&self, message: &str, options: ExportOptions<'_>) -> String {
        let text_size = self.metrics.measure(message);
        let size = Size::new(text_size.width() + 48.0, text_size.height() + 32.0);
        let center = Point::new(size.width() / 2.0, size.height() / 2.0);

        let frame = svg_element::Rectangle::new()
            .set("x", 0.5)
            .set("y", 0.5)
            .set("width", size.width() - 1.0)
            .set("height", size.height() - 1.0)
            .set("rx", 6.0)
            .set("fill", self.theme.background)
            .set("stroke", self.theme.node_stroke)
            .set("stroke-dasharray", "4 3");
        let text = self.text(message, center, self.theme.text);

        self.document(size, options)
            .set("data-placeholder", "true")
            .add(frame)
            .add(text)
            .to_string()
    }

    fn document(&self, size: Size, options: ExportOptions<'_>) -> svg::Document {
        let mut doc = svg::Document::new()
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height())
            .set("data-format", options.format.name());
        if let Some(id) = options.element_id {
            doc = doc.set("id", id);
        }
        if options.constrain_width {
            doc = doc.set("style", format!("max-width: {}px;", size.width()));
        }
        doc
    }

    fn background(&self, size: Size) -> Box<dyn svg::Node> {
        Box::new(
            svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", size.width())
                .set("height", size.height())
                .set("fill", self.theme.background)
                .set("fill-opacity", self.theme.background.alpha()),
        )
    }

    fn edge_label(&self, text: &str, center: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let backdrop = svg_element::Rectangle::new()
            .set("x", center.x() - size.width() / 2.0 - 2.0)
            .set("y", center.y() - size.height() / 2.0 - 1.0)
            .set("width", size.width() + 4.0)
            .set("height", size.height() + 2.0)
            .set("rx", 3.0)
            .set("fill", self.theme.background)
            .set("fill-opacity", 0.85);
        output.add_to_layer(RenderLayer::Labels, Box::new(backdrop));
        output.add_to_layer(
            RenderLayer::Labels,
            Box::new(self.text(text, center, self.theme.text)),
        );
        output
    }

    /// Multi-line text centered on `center`, one `<tspan>` per line.
    fn text(&self, content: &str, center: Point, color: Color) -> svg_element::Text {
        let lines: Vec<&str> = content.split('\n').collect();
        let line_height = self.metrics.line_height();
        let first_dy = -(lines.len() as f32 - 1.0) * line_height / 2.0;

        let mut text = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", FONT_FAMILY)
            .set("font-size", self.metrics.font_size())
            .set("fill", color)
            .set("fill-opacity", color.alpha());

        for (idx, line) in lines.into_iter().enumerate() {
            let dy = if idx == 0 { first_dy } else { line_height };
            let tspan = svg_element::TSpan::new("")
                .set("x", center.x())
                .set("dy", dy)
                .add(SvgText::new(line));
            text = text.add(tspan);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use tracery_core::semantic::{Direction, Edge, EdgeEnd, Node};

    use super::*;
    use crate::{config::LayoutConfig, layout::LayoutEngine};

    fn render(diagram: &Diagram, options: ExportOptions<'_>) -> String {
        let engine = LayoutEngine::new(&LayoutConfig::default());
        let layout = engine.calculate(diagram).unwrap();
        SvgExporter::new(Theme::default(), *engine.metrics()).export(diagram, &layout, options)
    }

    fn two_nodes(edge: Edge) -> Diagram {
        Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("A"), Node::new("B")],
            vec![edge],
        )
        .unwrap()
    }

    #[test]
    fn test_data_attributes() {
        let svg = render(
            &two_nodes(Edge::new(0, 1)),
            ExportOptions::new(DiagramFormat::DirectedGraph),
        );
        assert_eq!(svg.matches("data-node=").count(), 2);
        assert_eq!(svg.matches("data-edge=").count(), 1);
        assert!(svg.contains("data-node=\"A\""));
        assert!(svg.contains("data-format=\"dot\""));
        assert!(svg.contains("marker-end=\"url(#tracery-arrow-head-"));
        assert!(!svg.contains("max-width"));
    }

    #[test]
    fn test_element_id_namespaces_markers() {
        let svg = render(
            &two_nodes(Edge::new(0, 1).with_ends(EdgeEnd::Arrow, EdgeEnd::Arrow)),
            ExportOptions::new(DiagramFormat::Flowchart)
                .with_element_id("flow-7")
                .with_constrained_width(),
        );
        assert!(svg.contains("id=\"flow-7\""));
        assert!(svg.contains("url(#flow-7-arrow-head-"));
        assert!(svg.contains("url(#flow-7-arrow-tail-"));
        assert!(svg.contains("max-width: "));
    }

    #[test]
    fn test_invisible_edges_have_no_markers() {
        let svg = render(
            &two_nodes(Edge::new(0, 1).with_stroke(EdgeStroke::Invisible)),
            ExportOptions::new(DiagramFormat::DirectedGraph),
        );
        assert!(svg.contains("data-edge=\"0\""));
        assert!(!svg.contains("<marker"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let diagram = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a").with_label("x < y & z")],
            vec![],
        )
        .unwrap();
        let svg = render(&diagram, ExportOptions::new(DiagramFormat::Flowchart));
        assert!(svg.contains("x &lt; y &amp; z"));
    }

    #[test]
    fn test_placeholder() {
        let exporter = SvgExporter::new(
            Theme::default(),
            TextMetrics::new(LayoutConfig::default().font_size()),
        );
        let svg = exporter.placeholder(
            "Unable to render diagram",
            ExportOptions::new(DiagramFormat::Flowchart).with_element_id("x-1"),
        );
        assert!(svg.contains("data-placeholder=\"true\""));
        assert!(svg.contains("Unable to render diagram"));
        assert!(svg.contains("id=\"x-1\""));
    }
}

//! Lowering of the DOT syntax tree into the semantic [`Diagram`].
//!
//! Follows Graphviz scoping rules: `node [...]` and `edge [...]` defaults
//! apply to elements created later in the same graph or subgraph, and a
//! subgraph starts from a copy of its parent's defaults. Subgraphs are
//! flattened; an edge to a subgraph connects to every node declared in it.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use tracery_core::semantic::{Diagram, Direction, Edge, EdgeEnd, EdgeStroke, Node, NodeShape};

use super::{
    ast::{Attr, AttrTarget, EdgeOperand, EdgeStmt, Graph, Id, Stmt, Subgraph},
    parser::{MAX_NESTING, nesting_too_deep},
};
use crate::{
    attrs::parse_color,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::{Span, Spanned},
};

type AttrMap = IndexMap<String, Spanned<Id>>;

/// Attribute defaults in effect for one graph or subgraph body.
#[derive(Debug, Clone, Default)]
struct Scope {
    node_defaults: AttrMap,
    edge_defaults: AttrMap,
}

fn extend(map: &mut AttrMap, attrs: &[Attr]) {
    for attr in attrs {
        map.insert(attr.key.inner().text.clone(), attr.value.clone());
    }
}

struct Builder<'a> {
    graph: &'a Graph,
    nodes: IndexMap<String, AttrMap>,
    edges: Vec<Edge>,
    seen_edges: HashSet<(usize, usize)>,
    direction: Direction,
    depth: usize,
}

impl<'a> Builder<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            seen_edges: HashSet::new(),
            direction: Direction::default(),
            depth: 1,
        }
    }

    fn graph_name(&self) -> &str {
        self.graph
            .name
            .as_ref()
            .map_or("", |name| name.inner().text.as_str())
    }

    /// Returns the node's index, creating it with the current defaults.
    fn touch(&mut self, name: &str, scope: &Scope) -> usize {
        if let Some(idx) = self.nodes.get_index_of(name) {
            return idx;
        }
        let (idx, _) = self
            .nodes
            .insert_full(name.to_string(), scope.node_defaults.clone());
        idx
    }

    /// Lowers a statement list, returning the indices of every node it mentions.
    fn stmts(
        &mut self,
        stmts: &[Stmt],
        scope: &mut Scope,
        root: bool,
        diagnostics: &mut DiagnosticCollector,
    ) -> Vec<usize> {
        let mut members = Vec::new();

        for stmt in stmts {
            match stmt {
                Stmt::Node { node, attrs } => {
                    let idx = self.touch(&node.name.inner().text, scope);
                    if let Some(node_attrs) = self.nodes.get_index_mut(idx).map(|(_, a)| a) {
                        extend(node_attrs, attrs);
                    }
                    members.push(idx);
                }
                Stmt::Edge(edge) => {
                    members.extend(self.edge_stmt(edge, scope, diagnostics));
                }
                Stmt::Attrs { target, attrs } => match target {
                    AttrTarget::Node => extend(&mut scope.node_defaults, attrs),
                    AttrTarget::Edge => extend(&mut scope.edge_defaults, attrs),
                    AttrTarget::Graph => {
                        for attr in attrs {
                            self.graph_attr(attr, root);
                        }
                    }
                },
                Stmt::Assign(attr) => self.graph_attr(attr, root),
                Stmt::Subgraph(subgraph) => {
                    members.extend(self.subgraph(subgraph, scope, diagnostics));
                }
            }
        }

        members
    }

    fn subgraph(
        &mut self,
        subgraph: &Subgraph,
        parent: &Scope,
        diagnostics: &mut DiagnosticCollector,
    ) -> Vec<usize> {
        if self.depth >= MAX_NESTING {
            diagnostics.emit(nesting_too_deep(self.graph.keyword_span));
            return Vec::new();
        }

        let mut scope = parent.clone();
        trace!(
            name:? = subgraph.name.as_ref().map(|n| n.inner().text.as_str()),
            depth = self.depth;
            "Flattening subgraph"
        );
        self.depth += 1;
        let members = self.stmts(&subgraph.stmts, &mut scope, false, diagnostics);
        self.depth -= 1;
        members
    }

    fn graph_attr(&mut self, attr: &Attr, root: bool) {
        if !root || !attr.key.inner().text.eq_ignore_ascii_case("rankdir") {
            return;
        }
        self.direction = match attr.value.inner().text.to_ascii_uppercase().as_str() {
            "LR" => Direction::LeftToRight,
            "RL" => Direction::RightToLeft,
            "BT" => Direction::BottomToTop,
            _ => Direction::TopToBottom,
        };
    }

    fn edge_stmt(
        &mut self,
        edge: &EdgeStmt,
        scope: &Scope,
        diagnostics: &mut DiagnosticCollector,
    ) -> Vec<usize> {
        let groups: Vec<Vec<usize>> = edge
            .operands
            .iter()
            .map(|operand| match operand {
                EdgeOperand::Node(node) => vec![self.touch(&node.name.inner().text, scope)],
                EdgeOperand::Subgraph(subgraph) => self.subgraph(subgraph, scope, diagnostics),
            })
            .collect();

        let mut attrs = scope.edge_defaults.clone();
        extend(&mut attrs, &edge.attrs);

        for (op, pair) in edge.ops.iter().zip(groups.windows(2)) {
            if op.directed != self.graph.directed {
                diagnostics.emit(self.operator_mismatch(op.span));
                continue;
            }
            for &source in &pair[0] {
                for &target in &pair[1] {
                    self.add_edge(source, target, &attrs);
                }
            }
        }

        groups.into_iter().flatten().collect()
    }

    fn operator_mismatch(&self, span: Span) -> Diagnostic {
        let (found, expected, kind) = if self.graph.directed {
            ("--", "->", "digraph")
        } else {
            ("->", "--", "graph")
        };
        Diagnostic::error(format!("edge operator `{found}` used in a {kind}"))
            .with_code(ErrorCode::E102)
            .with_label(span, format!("expected `{expected}`"))
            .with_secondary_label(
                self.graph.keyword_span,
                format!("declared as `{kind}` here"),
            )
            .with_help(format!("use `{expected}` for every edge in a {kind}"))
    }

    fn add_edge(&mut self, source: usize, target: usize, attrs: &AttrMap) {
        if self.graph.strict {
            let key = if self.graph.directed {
                (source, target)
            } else {
                (source.min(target), source.max(target))
            };
            if !self.seen_edges.insert(key) {
                trace!(source = source, target = target; "Dropping duplicate edge in strict graph");
                return;
            }
        }

        let mut edge = Edge::new(source, target);

        if let Some(label) = attrs.get("label").map(label_text) {
            if !label.is_empty() {
                edge = edge.with_label(label);
            }
        }

        if let Some(style) = attrs.get("style") {
            for part in style_parts(&style.inner().text) {
                let stroke = match part.as_str() {
                    "dashed" => EdgeStroke::Dashed,
                    "dotted" => EdgeStroke::Dotted,
                    "bold" => EdgeStroke::Thick,
                    "invis" => EdgeStroke::Invisible,
                    "solid" => EdgeStroke::Solid,
                    _ => continue,
                };
                edge = edge.with_stroke(stroke);
            }
        }

        let dir = attrs
            .get("dir")
            .map(|dir| dir.inner().text.to_ascii_lowercase());
        let default_dir = if self.graph.directed { "forward" } else { "none" };
        let (mut tail, mut head) = match dir.as_deref().unwrap_or(default_dir) {
            "back" => (EdgeEnd::Arrow, EdgeEnd::None),
            "both" => (EdgeEnd::Arrow, EdgeEnd::Arrow),
            "none" => (EdgeEnd::None, EdgeEnd::None),
            _ => (EdgeEnd::None, EdgeEnd::Arrow),
        };
        if attrs.get("arrowhead").is_some_and(|a| a.inner().text == "none") {
            head = EdgeEnd::None;
        }
        if attrs.get("arrowtail").is_some_and(|a| a.inner().text == "none") {
            tail = EdgeEnd::None;
        }

        self.edges.push(edge.with_ends(tail, head));
    }

    fn node(&self, id: &str, attrs: &AttrMap, diagnostics: &mut DiagnosticCollector) -> Node {
        let label = attrs
            .get("label")
            .map_or_else(|| id.to_string(), label_text)
            .replace("\\N", id)
            .replace("\\G", self.graph_name());

        let shape = attrs
            .get("shape")
            .map_or(NodeShape::Ellipse, |value| node_shape(value, diagnostics));

        let mut node = Node::new(id).with_label(label).with_shape(shape);

        let mut filled = false;
        if let Some(style) = attrs.get("style") {
            for part in style_parts(&style.inner().text) {
                match part.as_str() {
                    "rounded" if node.shape() == NodeShape::Rectangle => {
                        node.set_shape(NodeShape::Rounded)
                    }
                    "filled" => filled = true,
                    _ => {}
                }
            }
        }

        let color = |key: &str, diagnostics: &mut DiagnosticCollector| {
            attrs
                .get(key)
                .and_then(|value| parse_color(&value.inner().text, value.span(), diagnostics))
        };

        let stroke = color("color", diagnostics);
        let fill = color("fillcolor", diagnostics);
        let text = color("fontcolor", diagnostics);

        let style = node.style_mut();
        if let Some(stroke) = stroke {
            style.set_stroke(stroke);
        }
        if let Some(text) = text {
            style.set_text(text);
        }
        if filled {
            // Graphviz falls back to the outline color, then light grey.
            let fill = fill
                .or(stroke)
                .or_else(|| tracery_core::color::Color::new("lightgrey").ok());
            if let Some(fill) = fill {
                style.set_fill(fill);
            }
        }

        node
    }
}

fn style_parts(style: &str) -> Vec<String> {
    style
        .split(',')
        .map(|part| part.trim().to_ascii_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

fn node_shape(value: &Spanned<Id>, diagnostics: &mut DiagnosticCollector) -> NodeShape {
    match value.inner().text.to_ascii_lowercase().as_str() {
        "box" | "rect" | "rectangle" | "square" | "record" | "box3d" | "component" | "folder"
        | "tab" | "note" => NodeShape::Rectangle,
        "mrecord" => NodeShape::Rounded,
        "ellipse" | "oval" | "egg" => NodeShape::Ellipse,
        "circle" | "point" => NodeShape::Circle,
        "doublecircle" => NodeShape::DoubleCircle,
        "diamond" | "mdiamond" => NodeShape::Diamond,
        "hexagon" => NodeShape::Hexagon,
        "cylinder" => NodeShape::Cylinder,
        "cds" | "rarrow" => NodeShape::Asymmetric,
        "plaintext" | "plain" | "none" | "underline" => NodeShape::Plaintext,
        other => {
            diagnostics.emit(
                Diagnostic::warning(format!("unsupported shape `{other}`, using `ellipse`"))
                    .with_code(ErrorCode::E301)
                    .with_label(value.span(), ErrorCode::E301.description()),
            );
            NodeShape::Ellipse
        }
    }
}

/// Label text of an attribute value; HTML labels are reduced to plain text.
fn label_text(value: &Spanned<Id>) -> String {
    let id = value.inner();
    if id.html {
        html_to_text(&id.text)
    } else {
        id.text.clone()
    }
}

/// Strips tags from an HTML-like label. `<br/>` becomes a line break.
fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            text.push(c);
            continue;
        }
        let tag: String = chars.by_ref().take_while(|&c| c != '>').collect();
        let name = tag.trim_start_matches('/').trim().to_ascii_lowercase();
        if name.starts_with("br") {
            text.push('\n');
        }
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Lower a parsed graph, emitting E102 for mismatched edge operators and
/// warnings for attribute values that were ignored.
pub(crate) fn elaborate(
    graph: &Graph,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Diagram, Diagnostic> {
    let mut builder = Builder::new(graph);
    let mut scope = Scope::default();
    builder.stmts(&graph.stmts, &mut scope, true, diagnostics);

    let nodes: Vec<Node> = builder
        .nodes
        .iter()
        .map(|(id, attrs)| builder.node(id, attrs, diagnostics))
        .collect();

    debug!(
        nodes = nodes.len(),
        edges = builder.edges.len(),
        direction:? = builder.direction;
        "Elaborated DOT graph"
    );

    Diagram::new(builder.direction, nodes, builder.edges).map_err(|err| {
        Diagnostic::error(format!("internal error while building the diagram: {err}"))
            .with_code(ErrorCode::E100)
            .with_label(graph.keyword_span, "in this graph")
    })
}

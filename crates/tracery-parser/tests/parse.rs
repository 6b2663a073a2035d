use proptest::prelude::*;

use tracery_core::{
    semantic::{Direction, EdgeEnd, EdgeStroke, NodeShape},
    source::{DiagramFormat, DiagramSource},
};
use tracery_parser::{
    error::{ErrorCode, Severity},
    parse, parse_dot, parse_flowchart,
};

fn codes(err: &tracery_parser::error::ParseError) -> Vec<ErrorCode> {
    err.diagnostics()
        .iter()
        .filter_map(|diag| diag.code())
        .collect()
}

#[test]
fn test_minimal_digraph() {
    let diagram = parse_dot("digraph { A -> B }").expect("Failed to parse");

    assert_eq!(diagram.direction(), Direction::TopToBottom);
    assert_eq!(diagram.nodes().len(), 2);
    assert_eq!(diagram.nodes()[0].id(), "A");
    assert_eq!(diagram.nodes()[0].label(), "A");
    assert_eq!(diagram.nodes()[0].shape(), NodeShape::Ellipse);

    let edge = &diagram.edges()[0];
    assert_eq!((edge.source(), edge.target()), (0, 1));
    assert_eq!(edge.head(), EdgeEnd::Arrow);
    assert_eq!(edge.tail(), EdgeEnd::None);
}

#[test]
fn test_dot_attributes() {
    let source = r##"
        digraph pipeline {
            rankdir=LR;
            node [shape=box, style="rounded,filled", fillcolor="#e0f0ff"];
            fetch [label="Fetch\ndata"];
            train [shape=diamond, color=red];
            fetch -> train [label="ok", style=dashed];
            train -> fetch [dir=both];
        }
    "##;

    let diagram = parse_dot(source).expect("Failed to parse");

    assert_eq!(diagram.direction(), Direction::LeftToRight);

    let fetch = &diagram.nodes()[0];
    assert_eq!(fetch.label(), "Fetch\ndata");
    assert_eq!(fetch.shape(), NodeShape::Rounded);
    assert!(fetch.style().fill().is_some());

    let train = &diagram.nodes()[1];
    assert_eq!(train.shape(), NodeShape::Diamond);
    assert!(train.style().stroke().is_some());

    let first = &diagram.edges()[0];
    assert_eq!(first.label(), Some("ok"));
    assert_eq!(first.stroke(), EdgeStroke::Dashed);

    let second = &diagram.edges()[1];
    assert_eq!(second.tail(), EdgeEnd::Arrow);
    assert_eq!(second.head(), EdgeEnd::Arrow);
}

#[test]
fn test_dot_node_defaults_apply_to_later_nodes_only() {
    let diagram = parse_dot("digraph { a; node [shape=box]; b; a -> b }").unwrap();

    assert_eq!(diagram.nodes()[0].shape(), NodeShape::Ellipse);
    assert_eq!(diagram.nodes()[1].shape(), NodeShape::Rectangle);
}

#[test]
fn test_dot_undirected_graph_has_no_arrows() {
    let diagram = parse_dot("graph { a -- b -- c }").unwrap();

    assert_eq!(diagram.edges().len(), 2);
    assert!(
        diagram
            .edges()
            .iter()
            .all(|edge| edge.head() == EdgeEnd::None && edge.tail() == EdgeEnd::None)
    );
}

#[test]
fn test_dot_subgraph_edges_fan_out() {
    let diagram = parse_dot("digraph { start -> { left right } -> finish }").unwrap();

    assert_eq!(diagram.nodes().len(), 4);
    assert_eq!(diagram.edges().len(), 4);
}

#[test]
fn test_dot_strict_drops_duplicate_edges() {
    let diagram = parse_dot("strict digraph { a -> b; a -> b; b -> a }").unwrap();
    assert_eq!(diagram.edges().len(), 2);

    let diagram = parse_dot("strict graph { a -- b; b -- a }").unwrap();
    assert_eq!(diagram.edges().len(), 1);
}

#[test]
fn test_dot_label_substitution() {
    let diagram = parse_dot(r#"digraph G { node [label="step \N"]; a }"#).unwrap();
    assert_eq!(diagram.nodes()[0].label(), "step a");
}

#[test]
fn test_dot_edge_operator_mismatch() {
    let err = parse_dot("digraph { a -- b; c -- d }").unwrap_err();

    assert_eq!(codes(&err), vec![ErrorCode::E102, ErrorCode::E102]);
    let labels = err.diagnostics()[0].labels();
    assert_eq!(labels.len(), 2);
    assert!(!labels[1].is_primary());
}

#[test]
fn test_dot_invalid_color_is_only_a_warning() {
    let diagram = parse_dot("digraph { a [color=\"not a color\"] }").unwrap();
    assert!(diagram.nodes()[0].style().stroke().is_none());
}

#[test]
fn test_dot_syntax_errors() {
    assert_eq!(
        codes(&parse_dot("digraph { a -> }").unwrap_err()),
        vec![ErrorCode::E100]
    );
    assert_eq!(
        codes(&parse_dot("digraph { a -> b").unwrap_err()),
        vec![ErrorCode::E101]
    );
    assert_eq!(
        codes(&parse_dot("digraph { a -> \"b }").unwrap_err()),
        vec![ErrorCode::E001]
    );
    assert_eq!(
        codes(&parse_dot("// only a comment").unwrap_err()),
        vec![ErrorCode::E101]
    );
}

#[test]
fn test_flowchart_basic() {
    let source = r#"
        %% build pipeline
        flowchart LR
            fetch[Fetch sources] --> build([Build])
            build -->|passes| deploy{{Deploy}}
            build -. flaky .-> retry((Retry))
            retry --> build
    "#;

    let diagram = parse_flowchart(source).expect("Failed to parse");

    assert_eq!(diagram.direction(), Direction::LeftToRight);
    let ids: Vec<_> = diagram.nodes().iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec!["fetch", "build", "deploy", "retry"]);
    assert_eq!(diagram.nodes()[1].shape(), NodeShape::Stadium);
    assert_eq!(diagram.nodes()[2].shape(), NodeShape::Hexagon);

    assert_eq!(diagram.edges().len(), 4);
    assert_eq!(diagram.edges()[1].label(), Some("passes"));
    assert_eq!(diagram.edges()[2].stroke(), EdgeStroke::Dotted);
    assert_eq!(diagram.edges()[2].label(), Some("flaky"));
}

#[test]
fn test_flowchart_redeclaration_updates_node() {
    let diagram = parse_flowchart("graph TD\n a --> b\n b{Check}").unwrap();

    assert_eq!(diagram.nodes()[1].label(), "Check");
    assert_eq!(diagram.nodes()[1].shape(), NodeShape::Diamond);
}

#[test]
fn test_flowchart_subgraphs_are_flattened() {
    let source = "flowchart TB\n subgraph one [Stage 1]\n a --> b\n end\n b --> c";
    let diagram = parse_flowchart(source).unwrap();

    assert_eq!(diagram.nodes().len(), 3);
    assert_eq!(diagram.edges().len(), 2);
}

#[test]
fn test_flowchart_style_and_ignored_statements() {
    let source = r#"flowchart TD
        a --> b
        classDef hot fill:#f00
        class a hot
        click a "https://example.com"
        linkStyle 0 stroke:#f00
        style a fill:#ffcc00,stroke:#333,stroke-width:2px
    "#;
    let diagram = parse_flowchart(source).unwrap();

    let style = diagram.nodes()[0].style();
    assert!(style.fill().is_some());
    assert!(style.stroke().is_some());
    assert!(style.text().is_none());
}

#[test]
fn test_flowchart_empty_body_is_valid() {
    let diagram = parse_flowchart("flowchart TD").unwrap();
    assert!(diagram.is_empty());
}

#[test]
fn test_flowchart_collects_one_diagnostic_per_statement() {
    let source = "flowchart TD\n a[open --> b\n c -> d\n end\n subgraph x";
    let err = parse_flowchart(source).unwrap_err();

    assert_eq!(
        codes(&err),
        vec![
            ErrorCode::E202,
            ErrorCode::E205,
            ErrorCode::E203,
            ErrorCode::E204
        ]
    );
    assert!(
        err.diagnostics()
            .iter()
            .all(|diag| diag.severity() == Severity::Error)
    );

    let span = err.diagnostics()[1].primary_span().unwrap();
    assert!(source[span.range()].starts_with("->"));
}

#[test]
fn test_flowchart_header_errors() {
    assert_eq!(
        codes(&parse_flowchart("a --> b").unwrap_err()),
        vec![ErrorCode::E200]
    );
    assert_eq!(
        codes(&parse_flowchart("flowchart XY\n a --> b").unwrap_err()),
        vec![ErrorCode::E201]
    );
}

#[test]
fn test_parse_dispatches_on_format() {
    let dot = DiagramSource::new("digraph { A -> B }", DiagramFormat::DirectedGraph).unwrap();
    assert_eq!(parse(&dot).unwrap().nodes().len(), 2);

    let wrong = DiagramSource::new("digraph { A -> B }", DiagramFormat::Flowchart).unwrap();
    assert!(parse(&wrong).is_err());
}

#[test]
fn test_dot_deep_nesting_is_rejected() {
    let source = format!(
        "digraph {{ {}{} }}",
        "{".repeat(3000),
        "}".repeat(3000)
    );
    let err = parse_dot(&source).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::E104]);

    let unbalanced = format!("digraph {{ {}", "subgraph {".repeat(3000));
    let err = parse_dot(&unbalanced).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::E104]);
}

proptest! {
    #[test]
    fn dot_never_panics(input in "\\PC{0,80}") {
        let _ = parse_dot(&input);
    }

    #[test]
    fn flowchart_never_panics(input in "\\PC{0,80}") {
        let _ = parse_flowchart(&input);
    }

    #[test]
    fn flowchart_fragments_never_panic(
        body in prop::collection::vec(
            prop::sample::select(vec![
                "a", "b", "-->", "---", "-.->", "==>", "<-->", "|x|", "[", "]", "(", ")",
                "{", "}", "\"", "&", ";", "\n", " ", "subgraph", "end", "style a fill:red",
            ]),
            0..24,
        )
    ) {
        let source = format!("flowchart TD\n{}", body.concat());
        let _ = parse_flowchart(&source);
    }

    #[test]
    fn dot_fragments_never_panic(
        body in prop::collection::vec(
            prop::sample::select(vec![
                "a", "b", "->", "--", "[", "]", "{", "}", "=", ";", ",", ":", "\"", "<", ">",
                "label", "subgraph", "node", " ", "\n", "/*", "*/", "+",
            ]),
            0..24,
        )
    ) {
        let source = format!("digraph {{{}", body.concat());
        let _ = parse_dot(&source);
    }
}

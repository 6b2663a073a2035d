//! Render engines: stateful per-format backends that turn diagram text into
//! SVG markup.
//!
//! An engine may accumulate internal state across renders (the directed-graph
//! engine memoizes its last result). A failed render leaves that state
//! suspect, which is why the lifecycle manager discards an engine after any
//! failure instead of reusing it.

mod directed_graph;
mod flowchart;

pub use directed_graph::DirectedGraphEngine;
pub use flowchart::FlowchartEngine;

use std::fmt;

use async_trait::async_trait;
use log::{trace, warn};
use thiserror::Error;

use tracery_core::{semantic::Diagram, source::DiagramFormat};

use crate::{
    config::AppConfig,
    export::{ExportOptions, SvgExporter},
    layout::LayoutEngine,
};

/// Identity of one engine instance.
///
/// Identifiers are never reused within a lifecycle manager, so a fresh engine
/// created after a failure is always distinguishable from the one it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-{}", self.0)
    }
}

/// Reason an engine could not produce markup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The engine's own parse step rejected text the validator accepted.
    #[error("render-time parse failed: {0}")]
    Parse(String),

    #[error("diagram has {count} {what}, above the limit of {limit}")]
    TooLarge {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("layout failed: {0}")]
    Layout(String),

    /// The request's element identifier cannot be embedded in markup.
    #[error("invalid element id `{0}`")]
    InvalidElementId(String),
}

/// Input of one render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    text: &'a str,
    element_id: &'a str,
}

impl<'a> RenderRequest<'a> {
    /// Creates a request for `text`; `element_id` must be unique per call site.
    pub fn new(text: &'a str, element_id: &'a str) -> Self {
        Self { text, element_id }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn element_id(&self) -> &'a str {
        self.element_id
    }
}

/// Outcome of a single render call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderAttempt {
    /// SVG markup whose root is an `<svg>` element.
    Success(String),
    Failure(EngineError),
}

impl RenderAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Success(markup) => Some(markup),
            Self::Failure(_) => None,
        }
    }
}

impl From<Result<String, EngineError>> for RenderAttempt {
    fn from(result: Result<String, EngineError>) -> Self {
        match result {
            Ok(markup) => Self::Success(markup),
            Err(err) => Self::Failure(err),
        }
    }
}

/// A per-format rendering backend.
///
/// Implementations never panic or return errors to the caller: every problem
/// is reported as [`RenderAttempt::Failure`]. Engines run on a single-threaded
/// executor and may hold `Rc`/`RefCell` state, hence `?Send`.
#[async_trait(?Send)]
pub trait RenderEngine {
    /// Format this engine renders.
    fn format(&self) -> DiagramFormat;

    /// Renders `request` to SVG markup.
    async fn render(&self, request: RenderRequest<'_>) -> RenderAttempt;
}

/// Layout and export shared by the built-in engines.
#[derive(Debug, Clone)]
pub(crate) struct DiagramRenderer {
    layout: LayoutEngine,
    exporter: SvgExporter,
    max_nodes: usize,
    max_edges: usize,
}

impl DiagramRenderer {
    pub(crate) fn new(config: &AppConfig) -> Self {
        let theme = match config.style().theme() {
            Ok(theme) => theme,
            Err(err) => {
                warn!(err = err.as_str(); "Falling back to the default theme");
                Default::default()
            }
        };
        let layout = LayoutEngine::new(config.layout());
        let exporter = SvgExporter::new(theme, *layout.metrics());
        Self {
            layout,
            exporter,
            max_nodes: config.render().max_nodes(),
            max_edges: config.render().max_edges(),
        }
    }

    /// Lays out and exports `diagram`, refusing diagrams above the limits.
    pub(crate) fn render(
        &self,
        diagram: &Diagram,
        options: ExportOptions<'_>,
    ) -> Result<String, EngineError> {
        check_limit("nodes", diagram.nodes().len(), self.max_nodes)?;
        check_limit("edges", diagram.edges().len(), self.max_edges)?;

        let layout = self.layout.calculate(diagram)?;
        trace!(
            width = layout.size().width(),
            height = layout.size().height();
            "Layout calculated"
        );
        Ok(self.exporter.export(diagram, &layout, options))
    }
}

fn check_limit(what: &'static str, count: usize, limit: usize) -> Result<(), EngineError> {
    if count > limit {
        return Err(EngineError::TooLarge { what, count, limit });
    }
    Ok(())
}

/// Element ids end up in `id` attributes and marker references.
pub(crate) fn check_element_id(element_id: &str) -> Result<(), EngineError> {
    let mut chars = element_id.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidElementId(element_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_element_id() {
        assert!(check_element_id("tracery-main-3").is_ok());
        assert!(check_element_id("a.b_c").is_ok());
        assert!(check_element_id("").is_err());
        assert!(check_element_id("3abc").is_err());
        assert!(check_element_id("a b").is_err());
        assert!(check_element_id("a\"><script").is_err());
    }

    #[test]
    fn test_attempt_from_result() {
        let attempt = RenderAttempt::from(Ok("<svg/>".to_string()));
        assert_eq!(attempt.markup(), Some("<svg/>"));

        let attempt = RenderAttempt::from(Err(EngineError::Layout("boom".to_string())));
        assert!(!attempt.is_success());
        assert_eq!(attempt.markup(), None);
    }

    #[test]
    fn test_renderer_limits() {
        use tracery_core::semantic::{Direction, Edge, Node};

        use crate::config::{FailurePolicy, RenderConfig};

        let config =
            AppConfig::default().with_render(RenderConfig::new(2, 1, FailurePolicy::Silent));
        let renderer = DiagramRenderer::new(&config);
        let options = ExportOptions::new(DiagramFormat::DirectedGraph);

        let fits = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b")],
            vec![Edge::new(0, 1)],
        )
        .unwrap();
        assert!(renderer.render(&fits, options).is_ok());

        let too_many_edges = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b")],
            vec![Edge::new(0, 1), Edge::new(1, 0)],
        )
        .unwrap();
        assert_eq!(
            renderer.render(&too_many_edges, options),
            Err(EngineError::TooLarge {
                what: "edges",
                count: 2,
                limit: 1
            })
        );

        let too_many_nodes = Diagram::new(
            Direction::TopToBottom,
            vec![Node::new("a"), Node::new("b"), Node::new("c")],
            vec![],
        )
        .unwrap();
        assert!(matches!(
            renderer.render(&too_many_nodes, options),
            Err(EngineError::TooLarge { what: "nodes", .. })
        ));
    }

    #[test]
    fn test_engine_id_display() {
        assert_eq!(EngineId::new(7).to_string(), "engine-7");
    }
}

//! Engine for the flowchart language.
//!
//! Rendering happens in two steps: the text is parse-checked first, then the
//! checked diagram is rendered under the caller's element id. The executor may
//! run other work between the two steps.

use async_trait::async_trait;
use log::debug;

use tracery_core::{semantic::Diagram, source::DiagramFormat};
use tracery_parser::parse_flowchart;

use super::{
    DiagramRenderer, EngineError, RenderAttempt, RenderEngine, RenderRequest, check_element_id,
};
use crate::{config::AppConfig, export::ExportOptions};

/// Renders flowchart text into id-namespaced markup.
///
/// The root element carries the request's element id, marker ids are
/// prefixed with it, and the root declares a `max-width` equal to the
/// drawing's natural width.
#[derive(Debug)]
pub struct FlowchartEngine {
    renderer: DiagramRenderer,
}

impl FlowchartEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            renderer: DiagramRenderer::new(config),
        }
    }

    fn parse_check(&self, text: &str) -> Result<Diagram, EngineError> {
        parse_flowchart(text).map_err(|err| EngineError::Parse(err.to_string()))
    }

    fn render_by_id(&self, element_id: &str, diagram: &Diagram) -> Result<String, EngineError> {
        check_element_id(element_id)?;
        debug!(
            element_id = element_id,
            nodes = diagram.nodes().len(),
            edges = diagram.edges().len();
            "Rendering flowchart"
        );
        let options = ExportOptions::new(DiagramFormat::Flowchart)
            .with_element_id(element_id)
            .with_constrained_width();
        self.renderer.render(diagram, options)
    }
}

#[async_trait(?Send)]
impl RenderEngine for FlowchartEngine {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::Flowchart
    }

    async fn render(&self, request: RenderRequest<'_>) -> RenderAttempt {
        let diagram = match self.parse_check(request.text()) {
            Ok(diagram) => diagram,
            Err(err) => return RenderAttempt::Failure(err),
        };
        tokio::task::yield_now().await;
        self.render_by_id(request.element_id(), &diagram).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_markup_is_namespaced() {
        let engine = FlowchartEngine::new(&AppConfig::default());
        let attempt = engine
            .render(RenderRequest::new("flowchart LR\n  a --> b", "chart-3"))
            .await;
        let markup = attempt.markup().unwrap();
        assert!(markup.contains("id=\"chart-3\""));
        assert!(markup.contains("url(#chart-3-arrow-head-"));
        assert!(markup.contains("max-width: "));
        assert!(markup.contains("data-format=\"flowchart\""));
    }

    #[tokio::test]
    async fn test_empty_flowchart_renders() {
        let engine = FlowchartEngine::new(&AppConfig::default());
        let attempt = engine
            .render(RenderRequest::new("flowchart TD", "chart-1"))
            .await;
        assert!(attempt.is_success());
        assert!(!attempt.markup().unwrap().contains("data-node"));
    }

    #[tokio::test]
    async fn test_invalid_element_id_fails() {
        let engine = FlowchartEngine::new(&AppConfig::default());
        let attempt = engine
            .render(RenderRequest::new("flowchart TD\n  a --> b", "1 bad"))
            .await;
        assert_eq!(
            attempt,
            RenderAttempt::Failure(EngineError::InvalidElementId("1 bad".to_string()))
        );
    }

    #[tokio::test]
    async fn test_parse_failure() {
        let engine = FlowchartEngine::new(&AppConfig::default());
        let attempt = engine
            .render(RenderRequest::new("flowchart TD\n  a -->", "chart-1"))
            .await;
        assert!(matches!(attempt, RenderAttempt::Failure(EngineError::Parse(_))));
    }
}

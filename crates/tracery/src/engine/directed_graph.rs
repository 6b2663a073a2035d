//! Engine for the DOT directed-graph language.

use std::cell::RefCell;

use async_trait::async_trait;
use log::{debug, trace};

use tracery_core::source::DiagramFormat;
use tracery_parser::parse_dot;

use super::{DiagramRenderer, EngineError, RenderAttempt, RenderEngine, RenderRequest};
use crate::{config::AppConfig, export::ExportOptions};

/// Last successful render, keyed by the exact source text.
#[derive(Debug)]
struct Memo {
    text: String,
    markup: String,
}

/// Renders DOT text in a single step.
///
/// The engine remembers its last successful result and returns it again for
/// identical text. Markup is not namespaced by the request's element id, so
/// two renders of the same text are byte-identical.
#[derive(Debug)]
pub struct DirectedGraphEngine {
    renderer: DiagramRenderer,
    memo: RefCell<Option<Memo>>,
}

impl DirectedGraphEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            renderer: DiagramRenderer::new(config),
            memo: RefCell::new(None),
        }
    }

    fn cached(&self, text: &str) -> Option<String> {
        self.memo
            .borrow()
            .as_ref()
            .filter(|memo| memo.text == text)
            .map(|memo| memo.markup.clone())
    }

    fn render_text(&self, text: &str) -> Result<String, EngineError> {
        let diagram = parse_dot(text).map_err(|err| EngineError::Parse(err.to_string()))?;
        debug!(
            nodes = diagram.nodes().len(),
            edges = diagram.edges().len();
            "Rendering directed graph"
        );
        self.renderer
            .render(&diagram, ExportOptions::new(DiagramFormat::DirectedGraph))
    }
}

#[async_trait(?Send)]
impl RenderEngine for DirectedGraphEngine {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::DirectedGraph
    }

    async fn render(&self, request: RenderRequest<'_>) -> RenderAttempt {
        tokio::task::yield_now().await;

        if let Some(markup) = self.cached(request.text()) {
            trace!("Directed graph served from memo");
            return RenderAttempt::Success(markup);
        }

        let result = self.render_text(request.text());
        if let Ok(markup) = &result {
            *self.memo.borrow_mut() = Some(Memo {
                text: request.text().to_string(),
                markup: markup.clone(),
            });
        }
        result.into()
    }
}

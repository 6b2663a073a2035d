//! The end-to-end render pipeline.
//!
//! ```text
//! DiagramSource ─► SyntaxValidator ─► EngineLifecycleManager ─► RenderEngine
//!                        │ rejected                                  │
//!                        ▼                                           ▼
//!                   (nothing)             failure ─► FailureSink   markup
//!                                                                    │
//!                                   stale? ─► Superseded              ▼
//!                                                       ViewportController
//! ```
//!
//! Every [`RenderPipeline::render_diagram`] call starts a new generation on
//! its surface before anything else happens. When the call finishes, its
//! result is applied only if no newer call started on the same surface in
//! the meantime.

use std::rc::Rc;

use log::{debug, info};

use tracery_core::source::{DiagramFormat, DiagramSource};

use crate::{
    config::{AppConfig, FailurePolicy},
    diagnostics::{FailureRecord, FailureSink, LogSink},
    engine::{EngineError, EngineId, RenderAttempt, RenderRequest},
    error::TraceryError,
    export::{ExportOptions, SvgExporter},
    layout::TextMetrics,
    lifecycle::{EngineFactory, EngineHandle, EngineLifecycleManager, EngineState, StandardEngines},
    surface::DisplaySurface,
    validator::{StandardValidator, SyntaxValidator},
    viewport::{ViewportController, ViewportHandle},
};

const PLACEHOLDER_MESSAGE: &str = "Unable to render diagram";

/// What a [`RenderPipeline::render_diagram`] call did to its surface.
#[derive(Debug)]
pub enum RenderReport {
    /// The diagram is shown in a new, fitted viewport.
    Rendered(ViewportHandle),
    /// The validator rejected the source; the surface is untouched.
    Rejected,
    /// The engine failed. Depending on the failure policy the surface is
    /// untouched or shows a placeholder.
    Failed(EngineError),
    /// The result was discarded: a newer call on the same surface started
    /// before this one finished, or the engine that produced it failed on
    /// another request in the meantime.
    Superseded,
}

/// Builder for [`RenderPipeline`].
pub struct RenderPipelineBuilder {
    config: AppConfig,
    validator: Option<Box<dyn SyntaxValidator>>,
    factory: Option<Box<dyn EngineFactory>>,
    sink: Option<Box<dyn FailureSink>>,
}

impl RenderPipelineBuilder {
    /// Replaces the [`StandardValidator`].
    pub fn with_validator(mut self, validator: impl SyntaxValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Replaces the [`StandardEngines`] factory.
    pub fn with_engine_factory(mut self, factory: impl EngineFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Replaces the [`LogSink`].
    pub fn with_failure_sink(mut self, sink: impl FailureSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validates the configuration and assembles the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`TraceryError::Config`] for an invalid configuration.
    pub fn build(self) -> Result<RenderPipeline, TraceryError> {
        self.config.validate().map_err(TraceryError::Config)?;
        let theme = self.config.style().theme().map_err(TraceryError::Config)?;
        let metrics = TextMetrics::new(self.config.layout().font_size());

        let factory = match self.factory {
            Some(factory) => factory,
            None => Box::new(StandardEngines::new(self.config.clone())),
        };
        Ok(RenderPipeline {
            validator: self.validator.unwrap_or_else(|| Box::new(StandardValidator)),
            engines: EngineLifecycleManager::new(factory),
            viewport: ViewportController::new(self.config.viewport().clone()),
            sink: self.sink.unwrap_or_else(|| Box::new(LogSink)),
            failure_policy: self.config.render().failure(),
            placeholder: SvgExporter::new(theme, metrics),
        })
    }
}

/// Validates, renders and displays diagram sources.
///
/// The pipeline is single-threaded: its futures are `!Send` and are meant for
/// a current-thread executor. Several calls may be in flight at once.
pub struct RenderPipeline {
    validator: Box<dyn SyntaxValidator>,
    engines: EngineLifecycleManager,
    viewport: ViewportController,
    sink: Box<dyn FailureSink>,
    failure_policy: FailurePolicy,
    placeholder: SvgExporter,
}

impl RenderPipeline {
    pub fn builder(config: AppConfig) -> RenderPipelineBuilder {
        RenderPipelineBuilder {
            config,
            validator: None,
            factory: None,
            sink: None,
        }
    }

    /// Pipeline with the built-in validator, engines and log sink.
    ///
    /// # Errors
    ///
    /// Returns [`TraceryError::Config`] for an invalid configuration.
    pub fn new(config: AppConfig) -> Result<Self, TraceryError> {
        Self::builder(config).build()
    }

    /// Validates `source` and renders it with the live engine for its format.
    ///
    /// Returns `None` when the validator rejects the source; no engine is
    /// touched in that case. A failed render discards the engine and is
    /// reported to the failure sink before the attempt is returned.
    ///
    /// The attempt is returned even when its engine was discarded by another
    /// request while this one was rendering;
    /// [`render_diagram`](Self::render_diagram) drops such results instead.
    pub async fn request(
        &self,
        source: &DiagramSource,
        element_id: &str,
    ) -> Option<RenderAttempt> {
        self.attempt(source, element_id)
            .await
            .map(|(attempt, _)| attempt)
    }

    /// [`request`](Self::request), also returning the handle that rendered.
    async fn attempt(
        &self,
        source: &DiagramSource,
        element_id: &str,
    ) -> Option<(RenderAttempt, Rc<EngineHandle>)> {
        let outcome = self.validator.validate(source).await;
        if !outcome.is_accepted() {
            debug!(format = source.format().name(); "Render request rejected");
            return None;
        }

        let handle = self.engines.get_engine(source.format());
        let attempt = handle
            .engine()
            .render(RenderRequest::new(source.text(), element_id))
            .await;

        if let RenderAttempt::Failure(reason) = &attempt {
            self.engines.report_failure(&handle);
            self.sink.report(&FailureRecord {
                format: handle.format(),
                engine: handle.id(),
                reason: reason.clone(),
            });
        }
        Some((attempt, handle))
    }

    /// Renders `source` onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceryError::Viewport`] when the result cannot be attached,
    /// for instance because the surface was detached while rendering.
    pub async fn render_diagram(
        &self,
        source: &DiagramSource,
        surface: &DisplaySurface,
    ) -> Result<RenderReport, TraceryError> {
        let generation = surface.next_generation();
        let element_id = element_id(surface.id(), generation);
        debug!(
            surface = surface.id(),
            generation = generation,
            format = source.format().name();
            "Render started"
        );

        let attempt = self.attempt(source, &element_id).await;

        if !surface.is_current(generation) {
            debug!(surface = surface.id(), generation = generation; "Render superseded");
            return Ok(RenderReport::Superseded);
        }

        match attempt {
            None => Ok(RenderReport::Rejected),
            Some((RenderAttempt::Success(_), handle))
                if handle.state() == EngineState::Poisoned =>
            {
                debug!(
                    surface = surface.id(),
                    generation = generation,
                    engine:% = handle.id();
                    "Engine failed while this render was in flight, discarding result"
                );
                Ok(RenderReport::Superseded)
            }
            Some((RenderAttempt::Failure(reason), _)) => {
                if self.failure_policy == FailurePolicy::Placeholder {
                    let options =
                        ExportOptions::new(source.format()).with_element_id(&element_id);
                    let markup = self.placeholder.placeholder(PLACEHOLDER_MESSAGE, options);
                    self.viewport.attach(surface, &markup)?;
                }
                Ok(RenderReport::Failed(reason))
            }
            Some((RenderAttempt::Success(markup), _)) => {
                let handle = self.viewport.attach(surface, &markup)?;
                info!(surface = surface.id(), generation = generation; "Diagram rendered");
                Ok(RenderReport::Rendered(handle))
            }
        }
    }

    /// Identity of the live engine for `format`, if one exists.
    pub fn live_engine(&self, format: DiagramFormat) -> Option<EngineId> {
        self.engines.live_engine(format)
    }
}

/// Element id unique per surface and generation, restricted to characters
/// that are safe in `id` attributes.
fn element_id(surface: &str, generation: u64) -> String {
    let surface: String = surface
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("tracery-{surface}-{generation}")
}

//! Tracery - validation, rendering and interactive display of workflow
//! diagrams.
//!
//! Diagram text in one of two languages (DOT directed graphs and flowcharts)
//! flows through a [`RenderPipeline`]: a [`SyntaxValidator`] screens it, a
//! per-format [`RenderEngine`] turns it into SVG, and a
//! [`ViewportController`] shows the result on a [`DisplaySurface`] with
//! pan/zoom controls.
//!
//! Engines are stateful and are discarded after any failure. Rendering is
//! asynchronous and single-threaded; results of calls overtaken by a newer
//! call on the same surface are dropped.
//!
//! # Example
//!
//! ```
//! use tracery::{DisplaySurface, RenderPipeline, RenderReport, config::AppConfig};
//! use tracery::geometry::Size;
//! use tracery::source::DiagramSource;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build()?;
//! let pipeline = RenderPipeline::new(AppConfig::default())?;
//! let surface = DisplaySurface::new("main", Size::new(800.0, 600.0));
//! let source = DiagramSource::detect("flowchart LR\n  build --> test --> ship")?;
//!
//! let report = runtime.block_on(pipeline.render_diagram(&source, &surface))?;
//! let RenderReport::Rendered(viewport) = report else {
//!     panic!("diagram should render");
//! };
//! viewport.zoom_in();
//! assert!(surface.markup().is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;

mod diagnostics;
mod engine;
mod error;
mod export;
mod layout;
mod lifecycle;
mod pipeline;
mod surface;
mod validator;
mod viewport;

pub use tracery_core::{color, geometry, semantic, source};

pub use diagnostics::{FailureRecord, FailureSink, LogSink};
pub use engine::{
    DirectedGraphEngine, EngineError, EngineId, FlowchartEngine, RenderAttempt, RenderEngine,
    RenderRequest,
};
pub use error::TraceryError;
pub use lifecycle::{EngineFactory, StandardEngines};
pub use pipeline::{RenderPipeline, RenderPipelineBuilder, RenderReport};
pub use surface::DisplaySurface;
pub use validator::{StandardValidator, SyntaxValidator, ValidationOutcome};
pub use viewport::{ViewTransform, ViewportController, ViewportError, ViewportHandle, ViewportState};

//! CLI logic for the Tracery diagram tool.
//!
//! The CLI renders one diagram file through the full
//! [`RenderPipeline`](tracery::RenderPipeline): the source is validated, drawn
//! by the engine for its format and attached to a simulated display surface
//! of the requested size. The composed surface (or, with `--raw`, the
//! engine's own markup) is written to the output file.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::{info, warn};

use tracery::{
    DisplaySurface, RenderAttempt, RenderPipeline, RenderReport, StandardValidator, TraceryError,
    ViewportError, ViewportHandle,
    geometry::Size,
    source::{DiagramFormat, DiagramSource},
};

const RAW_ELEMENT_ID: &str = "tracery-cli";
const SURFACE_ID: &str = "output";

/// Run the Tracery CLI application
///
/// # Errors
///
/// Returns `TraceryError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Unknown formats and rejected sources (with full parser diagnostics)
/// - Render failures
pub fn run(args: &Args) -> Result<(), TraceryError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let text = fs::read_to_string(&args.input)?;
    let source = load_source(args, text)?;
    let pipeline = RenderPipeline::new(app_config)?;

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let svg = if args.raw {
        runtime.block_on(render_raw(&pipeline, &source))?
    } else {
        runtime.block_on(render_surface(args, &pipeline, &source))?
    };

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

/// Picks the format from `--format`, then the file extension, then the text.
fn load_source(args: &Args, text: String) -> Result<DiagramSource, TraceryError> {
    let format = args.format.or_else(|| {
        Path::new(&args.input)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DiagramFormat::from_extension)
    });
    let source = match format {
        Some(format) => DiagramSource::new(text, format)?,
        None => DiagramSource::detect(text)?,
    };
    info!(format = source.format().name(); "Diagram format resolved");
    Ok(source)
}

async fn render_raw(
    pipeline: &RenderPipeline,
    source: &DiagramSource,
) -> Result<String, TraceryError> {
    match pipeline.request(source, RAW_ELEMENT_ID).await {
        Some(RenderAttempt::Success(markup)) => Ok(markup),
        Some(RenderAttempt::Failure(reason)) => Err(reason.into()),
        None => Err(rejection(source)),
    }
}

async fn render_surface(
    args: &Args,
    pipeline: &RenderPipeline,
    source: &DiagramSource,
) -> Result<String, TraceryError> {
    let surface = DisplaySurface::new(SURFACE_ID, Size::new(args.width, args.height));

    match pipeline.render_diagram(source, &surface).await? {
        RenderReport::Rendered(viewport) => {
            apply_zoom(&viewport, args.zoom);
            viewport
                .surface_markup()
                .ok_or_else(|| ViewportError::Detached(surface.id().to_string()).into())
        }
        RenderReport::Failed(reason) => match surface.markup() {
            Some(placeholder) => {
                warn!(reason = reason.to_string(); "Writing placeholder for failed render");
                Ok(placeholder)
            }
            None => Err(reason.into()),
        },
        RenderReport::Rejected => Err(rejection(source)),
        RenderReport::Superseded => Err(TraceryError::NotRendered),
    }
}

/// Stops early once the zoom limit is reached.
fn apply_zoom(viewport: &ViewportHandle, steps: i32) {
    for _ in 0..steps.unsigned_abs() {
        let before = viewport.state().zoom();
        if steps > 0 {
            viewport.zoom_in();
        } else {
            viewport.zoom_out();
        }
        if viewport.state().zoom() == before {
            break;
        }
    }
}

/// The validator only says no; the parser says why.
fn rejection(source: &DiagramSource) -> TraceryError {
    match StandardValidator::diagnose(source) {
        Err(err) => err,
        Ok(()) => TraceryError::NotRendered,
    }
}

//! Error types for Tracery operations.
//!
//! [`TraceryError`] covers the failures a caller must handle. The pipeline
//! itself reports render-engine failures as
//! [`RenderAttempt::Failure`](crate::engine::RenderAttempt) or
//! [`RenderReport::Failed`](crate::RenderReport) values; the `Render` and
//! `NotRendered` variants exist for callers that turn those into errors.

use std::io;

use thiserror::Error;

use tracery_core::source::SourceError;
use tracery_parser::error::ParseError;

use crate::{engine::EngineError, viewport::ViewportError};

/// The main error type for Tracery operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// diagnostics so a reporter can render labeled snippets.
#[derive(Debug, Error)]
pub enum TraceryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Viewport error: {0}")]
    Viewport(#[from] ViewportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(#[from] EngineError),

    #[error("diagram was not rendered")]
    NotRendered,
}

impl TraceryError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

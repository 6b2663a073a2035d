//! Error and diagnostic system for the Tracery front-ends.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from a front-end.
//!
//! # Example
//!
//! ```
//! # use tracery_parser::error::{Diagnostic, ErrorCode};
//! # use tracery_parser::Span;
//!
//! let diag = Diagnostic::error("expected `->` in a directed graph")
//!     .with_code(ErrorCode::E102)
//!     .with_label(Span::new(20..22), "undirected edge operator")
//!     .with_secondary_label(Span::new(0..7), "graph declared as `digraph` here")
//!     .with_help("use `->` for edges in a digraph");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;

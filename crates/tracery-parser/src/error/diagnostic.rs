//! The core diagnostic type for the Tracery error system.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E202]: unterminated node shape
///   --> pipeline.mmd:3:5
///    |
///  3 |     load[Load data --> train
///    |         ^^^^^^^^^^^^^^^^^^^^ expected `]`
///    |
///    = help: close the node text with `]`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use tracery_parser::error::{Diagnostic, ErrorCode};
    /// # use tracery_parser::Span;
    ///
    /// let diag = Diagnostic::error("unexpected token")
    ///     .with_code(ErrorCode::E100)
    ///     .with_label(Span::new(0..3), "not valid here");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Help text set on this diagnostic, or the default advice for its code.
    pub fn help(&self) -> Option<&str> {
        self.help
            .as_deref()
            .or_else(|| self.code.and_then(ErrorCode::help))
    }

    /// Returns the span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Moves every label span forward by `offset` bytes.
    ///
    /// Used when a fragment of the source was parsed on its own.
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        for label in &mut self.labels {
            label.shift(offset);
        }
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_secondary_label() {
        let diag = Diagnostic::error("mismatched edge operator")
            .with_label(Span::new(10..12), "here")
            .with_secondary_label(Span::new(0..7), "declared here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.primary_span(), Some(Span::new(10..12)));
    }

    #[test]
    fn test_help_falls_back_to_code() {
        let diag = Diagnostic::error("unclosed").with_code(ErrorCode::E204);
        assert_eq!(diag.help(), ErrorCode::E204.help());

        let diag = diag.with_help("close `build` with `end`");
        assert_eq!(diag.help(), Some("close `build` with `end`"));

        assert_eq!(Diagnostic::warning("ignored").help(), None);
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("unterminated node shape").with_code(ErrorCode::E202);

        assert_eq!(diag.to_string(), "error[E202]: unterminated node shape");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("ignored color");

        assert_eq!(diag.to_string(), "warning: ignored color");
    }

    #[test]
    fn test_diagnostic_shifted() {
        let diag = Diagnostic::error("bad")
            .with_label(Span::new(1..4), "here")
            .with_secondary_label(Span::new(0..1), "there")
            .shifted(100);

        assert_eq!(diag.labels()[0].span(), Span::new(101..104));
        assert!(diag.labels()[0].is_primary());
        assert_eq!(diag.labels()[1].span(), Span::new(100..101));
        assert!(!diag.labels()[1].is_primary());
    }
}

//! Collector for accumulating diagnostics while parsing.
//!
//! The flowchart front-end recovers at statement boundaries and DOT
//! elaboration keeps going past mismatched edges, so one pass can report
//! every problem. Diagnostics are handed out in source order regardless of
//! the order they were found in.

use log::debug;

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a parse.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Ends the pass.
    ///
    /// Fails with every diagnostic, warnings included, when at least one is an
    /// error. Otherwise returns the warnings, which have already been logged.
    pub fn finish(mut self) -> Result<Vec<Diagnostic>, ParseError> {
        self.diagnostics
            .sort_by_key(|diag| diag.primary_span().map(|span| span.start()));

        if self
            .diagnostics
            .iter()
            .any(|diag| diag.severity().is_error())
        {
            return Err(ParseError::new(self.diagnostics));
        }

        for warning in &self.diagnostics {
            debug!(warning:% = warning; "Accepted source with warning");
        }
        Ok(self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_empty_pass_is_accepted() {
        assert!(DiagnosticCollector::new().finish().unwrap().is_empty());
    }

    #[test]
    fn test_warnings_do_not_reject() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("unknown shape `star`").with_code(ErrorCode::E301));

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E301));
    }

    #[test]
    fn test_errors_are_reported_in_source_order() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error("edge operator mismatch")
                .with_code(ErrorCode::E102)
                .with_label(Span::new(30..32), "here"),
        );
        collector.emit(
            Diagnostic::warning("invalid color")
                .with_code(ErrorCode::E300)
                .with_label(Span::new(10..20), "here"),
        );

        let err = collector.finish().unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(Diagnostic::code).collect();
        assert_eq!(codes, vec![ErrorCode::E300, ErrorCode::E102]);
    }
}

//! Syntax validation ahead of rendering.
//!
//! A [`SyntaxValidator`] decides whether a source is worth handing to an
//! engine. Rejection is silent: the pipeline does nothing for a rejected
//! source. Callers that want to know *why* a source was rejected use
//! [`StandardValidator::diagnose`].

use std::rc::Rc;

use async_trait::async_trait;
use log::debug;

use tracery_core::source::{DiagramFormat, DiagramSource};
use tracery_parser::{parse, parse_dot, parse_flowchart};

use crate::error::TraceryError;

/// Verdict of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    accepted: bool,
}

impl ValidationOutcome {
    pub fn accepted() -> Self {
        Self { accepted: true }
    }

    pub fn rejected() -> Self {
        Self { accepted: false }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

impl From<bool> for ValidationOutcome {
    fn from(accepted: bool) -> Self {
        Self { accepted }
    }
}

/// Checks diagram text before any engine sees it.
#[async_trait(?Send)]
pub trait SyntaxValidator {
    async fn validate(&self, source: &DiagramSource) -> ValidationOutcome;
}

#[async_trait(?Send)]
impl<T: SyntaxValidator + ?Sized> SyntaxValidator for Rc<T> {
    async fn validate(&self, source: &DiagramSource) -> ValidationOutcome {
        (**self).validate(source).await
    }
}

/// Accepts exactly what the built-in parsers accept.
///
/// DOT sources are checked with the same parse step the directed-graph
/// engine runs, flowchart sources with the flowchart grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl StandardValidator {
    /// Explains why `source` would be rejected.
    ///
    /// # Errors
    ///
    /// Returns [`TraceryError::Parse`] carrying every diagnostic and the
    /// source text.
    pub fn diagnose(source: &DiagramSource) -> Result<(), TraceryError> {
        parse(source)
            .map(|_| ())
            .map_err(|err| TraceryError::new_parse_error(err, source.text()))
    }
}

#[async_trait(?Send)]
impl SyntaxValidator for StandardValidator {
    async fn validate(&self, source: &DiagramSource) -> ValidationOutcome {
        let result = match source.format() {
            DiagramFormat::DirectedGraph => parse_dot(source.text()).map(|_| ()),
            DiagramFormat::Flowchart => parse_flowchart(source.text()).map(|_| ()),
        };
        if let Err(err) = &result {
            debug!(
                format = source.format().name(),
                diagnostics = err.diagnostics().len();
                "Source rejected by validator"
            );
        }
        ValidationOutcome::from(result.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str, format: DiagramFormat) -> DiagramSource {
        DiagramSource::new(text, format).unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_sources() {
        let validator = StandardValidator;
        let dot = source("digraph { a -> b }", DiagramFormat::DirectedGraph);
        let flow = source("flowchart LR\n  a --> b", DiagramFormat::Flowchart);
        assert!(validator.validate(&dot).await.is_accepted());
        assert!(validator.validate(&flow).await.is_accepted());
    }

    #[tokio::test]
    async fn test_rejects_invalid_sources() {
        let validator = StandardValidator;
        let dot = source("digraph { a -> }", DiagramFormat::DirectedGraph);
        let flow = source("graph XY\n  a --> b", DiagramFormat::Flowchart);
        assert_eq!(validator.validate(&dot).await, ValidationOutcome::rejected());
        assert_eq!(validator.validate(&flow).await, ValidationOutcome::rejected());
    }

    #[tokio::test]
    async fn test_rejects_deeply_nested_dot() {
        let text = format!("digraph {{ {}{} }}", "{".repeat(5000), "}".repeat(5000));
        let dot = source(&text, DiagramFormat::DirectedGraph);
        assert!(!StandardValidator.validate(&dot).await.is_accepted());
    }

    #[test]
    fn test_diagnose_keeps_source() {
        let text = "digraph { a -> }";
        let err = StandardValidator::diagnose(&source(text, DiagramFormat::DirectedGraph))
            .unwrap_err();
        match err {
            TraceryError::Parse { err, src } => {
                assert_eq!(src, text);
                assert!(!err.diagnostics().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_diagnose_accepts_valid_source() {
        let flow = source("flowchart TD\n  a --> b", DiagramFormat::Flowchart);
        assert!(StandardValidator::diagnose(&flow).is_ok());
    }
}

//! miette rendering of [`TraceryError`].
//!
//! A rejected source becomes one report per diagnostic, each with its
//! snippet taken from the named input file. Every other error becomes a
//! single `tracery::*` report that carries advice when the fix is known.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};

use tracery::{EngineError, TraceryError, ViewportError, source::SourceError};
use tracery_parser::error::{Diagnostic, Severity};

/// One front-end diagnostic pointing into the input file.
#[derive(Debug)]
pub struct SourceReport<'a> {
    diag: &'a Diagnostic,
    source: NamedSource<String>,
}

impl<'a> SourceReport<'a> {
    pub fn new(diag: &'a Diagnostic, name: &str, src: &str) -> Self {
        Self {
            diag,
            source: NamedSource::new(name, src.to_string()),
        }
    }
}

impl fmt::Display for SourceReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for SourceReport<'_> {}

impl MietteDiagnostic for SourceReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.diag
            .code()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.diag
            .help()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let text = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        })))
    }
}

/// Any error that is not tied to a place in the source.
#[derive(Debug)]
pub struct ErrorReport<'a>(&'a TraceryError);

impl ErrorReport<'_> {
    fn advice(&self) -> Option<&'static str> {
        let advice = match self.0 {
            TraceryError::Io(_) => "check that the input file exists and is readable",
            TraceryError::Source(SourceError::UnknownFormat) => {
                "pass `--format dot` or `--format flowchart`"
            }
            TraceryError::Source(SourceError::Empty) => "the input file has no diagram text",
            TraceryError::Viewport(ViewportError::Unusable(_)) => {
                "pass a positive `--width` and `--height`"
            }
            TraceryError::Config(_) => "fix the value in the configuration file or pass `--config`",
            TraceryError::Render(EngineError::TooLarge { what: "nodes", .. }) => {
                "raise `max_nodes` in the `[render]` table of the configuration file"
            }
            TraceryError::Render(EngineError::TooLarge { .. }) => {
                "raise `max_edges` in the `[render]` table of the configuration file"
            }
            _ => return None,
        };
        Some(advice)
    }
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl std::error::Error for ErrorReport<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let code = match self.0 {
            TraceryError::Io(_) => "tracery::io",
            TraceryError::Source(_) => "tracery::source",
            TraceryError::Parse { .. } => "tracery::parse",
            TraceryError::Viewport(_) => "tracery::viewport",
            TraceryError::Config(_) => "tracery::config",
            TraceryError::Render(_) | TraceryError::NotRendered => "tracery::render",
        };
        Some(Box::new(code))
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.advice()
            .map(|advice| Box::new(advice) as Box<dyn fmt::Display>)
    }
}

/// A report ready for a miette handler.
#[derive(Debug)]
pub enum Report<'a> {
    Source(SourceReport<'a>),
    Error(ErrorReport<'a>),
}

impl<'a> Report<'a> {
    fn inner(&self) -> &(dyn MietteDiagnostic + 'a) {
        match self {
            Report::Source(report) => report,
            Report::Error(report) => report,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner(), f)
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner().source()
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.inner().code()
    }

    fn severity(&self) -> Option<miette::Severity> {
        self.inner().severity()
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.inner().help()
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.inner().source_code()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.inner().labels()
    }
}

/// Reports for `err`; `source_name` names the input in source snippets.
///
/// A parse failure yields one report per diagnostic, in source order and
/// warnings included. A parse failure without diagnostics and every other
/// error yield a single report.
pub fn to_reports<'a>(err: &'a TraceryError, source_name: &str) -> Vec<Report<'a>> {
    match err {
        TraceryError::Parse { err: parse, src } if !parse.diagnostics().is_empty() => parse
            .diagnostics()
            .iter()
            .map(|diag| Report::Source(SourceReport::new(diag, source_name, src)))
            .collect(),
        _ => vec![Report::Error(ErrorReport(err))],
    }
}

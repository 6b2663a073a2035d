//! Diagram sources: raw text tagged with the syntax it is written in.
//!
//! A [`DiagramSource`] is created by whoever produced the workflow description
//! (a compiler, a file on disk, a test) and stays immutable for the lifetime
//! of one render request.

use std::{fmt, str::FromStr};

use log::trace;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while constructing a [`DiagramSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("diagram source is empty")]
    Empty,

    #[error("unable to determine the diagram format")]
    UnknownFormat,

    #[error("unknown diagram format `{0}` (expected `dot` or `flowchart`)")]
    InvalidFormatName(String),
}

/// The two supported diagram syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramFormat {
    /// A directed-graph description in the DOT family (`digraph { a -> b }`).
    DirectedGraph,
    /// A flowchart description in the Mermaid family (`flowchart TD; a --> b`).
    Flowchart,
}

impl DiagramFormat {
    /// All formats, in a stable order.
    pub const ALL: [DiagramFormat; 2] = [DiagramFormat::DirectedGraph, DiagramFormat::Flowchart];

    /// Returns a short, stable name for this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::DirectedGraph => "dot",
            Self::Flowchart => "flowchart",
        }
    }

    /// Looks up the format conventionally associated with a file extension.
    ///
    /// ```
    /// # use tracery_core::source::DiagramFormat;
    /// assert_eq!(DiagramFormat::from_extension("gv"), Some(DiagramFormat::DirectedGraph));
    /// assert_eq!(DiagramFormat::from_extension("MMD"), Some(DiagramFormat::Flowchart));
    /// assert_eq!(DiagramFormat::from_extension("txt"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "dot" | "gv" => Some(Self::DirectedGraph),
            "mmd" | "mermaid" => Some(Self::Flowchart),
            _ => None,
        }
    }

    /// Infers the format from the first meaningful keyword of `text`.
    ///
    /// Comments in either syntax are skipped. `graph` is ambiguous: it opens
    /// an undirected DOT graph when followed by a name or `{`, and a
    /// flowchart when followed by a direction such as `TD` or `LR`.
    ///
    /// ```
    /// # use tracery_core::source::DiagramFormat;
    /// assert_eq!(DiagramFormat::detect("digraph { a -> b }"), Some(DiagramFormat::DirectedGraph));
    /// assert_eq!(DiagramFormat::detect("graph LR\n a --> b"), Some(DiagramFormat::Flowchart));
    /// assert_eq!(DiagramFormat::detect("graph G { a -- b }"), Some(DiagramFormat::DirectedGraph));
    /// assert_eq!(DiagramFormat::detect("hello"), None);
    /// ```
    pub fn detect(text: &str) -> Option<Self> {
        let mut words = text
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && !line.starts_with("%%")
                    && !line.starts_with("//")
                    && !line.starts_with('#')
            })
            .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == '{' || c == ';'))
            .filter(|word| !word.is_empty());

        let first = words.next()?.to_ascii_lowercase();
        let detected = match first.as_str() {
            "digraph" | "strict" => Some(Self::DirectedGraph),
            "flowchart" | "flowchart-elk" => Some(Self::Flowchart),
            "graph" => match words.next() {
                Some(word) if is_flowchart_direction(word) => Some(Self::Flowchart),
                _ => Some(Self::DirectedGraph),
            },
            _ => None,
        };

        trace!(keyword = first, detected:?; "Detected diagram format");
        detected
    }
}

fn is_flowchart_direction(word: &str) -> bool {
    matches!(word, "TB" | "TD" | "BT" | "LR" | "RL")
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiagramFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot" | "gv" | "graphviz" | "digraph" | "directed-graph" => Ok(Self::DirectedGraph),
            "flowchart" | "mermaid" | "mmd" => Ok(Self::Flowchart),
            _ => Err(SourceError::InvalidFormatName(s.to_string())),
        }
    }
}

/// Raw diagram text plus the syntax it is written in.
///
/// # Examples
///
/// ```
/// # use tracery_core::source::{DiagramFormat, DiagramSource, SourceError};
/// let source = DiagramSource::new("digraph { A -> B }", DiagramFormat::DirectedGraph)?;
/// assert_eq!(source.format(), DiagramFormat::DirectedGraph);
///
/// assert_eq!(
///     DiagramSource::new("   ", DiagramFormat::Flowchart),
///     Err(SourceError::Empty)
/// );
/// # Ok::<(), SourceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    text: String,
    format: DiagramFormat,
}

impl DiagramSource {
    /// Creates a source, rejecting text with no non-whitespace content.
    pub fn new(text: impl Into<String>, format: DiagramFormat) -> Result<Self, SourceError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(Self { text, format })
    }

    /// Creates a source whose format is inferred with [`DiagramFormat::detect`].
    pub fn detect(text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        let format = DiagramFormat::detect(&text).ok_or(SourceError::UnknownFormat)?;
        Ok(Self { text, format })
    }

    /// Returns the raw diagram text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the syntax the text is written in.
    pub fn format(&self) -> DiagramFormat {
        self.format
    }
}

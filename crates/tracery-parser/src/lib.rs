//! # Tracery Parser
//!
//! Syntax front-ends for the two diagram languages Tracery renders:
//!
//! - [`parse_dot`]: the DOT directed-graph language (`digraph { a -> b }`)
//! - [`parse_flowchart`]: the flowchart language (`flowchart LR; a --> b`)
//!
//! Both lower their input into the format-independent
//! [`tracery_core::semantic::Diagram`]. Errors are reported as a
//! [`ParseError`](error::ParseError) holding one or more rich
//! [`Diagnostic`](error::Diagnostic)s with codes, labeled spans and help.
//!
//! ## Usage
//!
//! ```
//! # use tracery_core::source::{DiagramFormat, DiagramSource};
//! # use tracery_parser::parse;
//! let source = DiagramSource::new("flowchart TD\n  a --> b", DiagramFormat::Flowchart).unwrap();
//! let diagram = parse(&source)?;
//! assert_eq!(diagram.nodes().len(), 2);
//! # Ok::<(), tracery_parser::error::ParseError>(())
//! ```

mod attrs;
mod dot;
pub mod error;
mod flowchart;
mod span;

pub use dot::parse_dot;
pub use flowchart::parse_flowchart;
pub use span::{Span, Spanned};

use log::trace;

use tracery_core::{
    semantic::Diagram,
    source::{DiagramFormat, DiagramSource},
};

use error::ParseError;

/// Parse a diagram source with the front-end for its format.
pub fn parse(source: &DiagramSource) -> Result<Diagram, ParseError> {
    trace!(format:% = source.format(); "Parsing diagram source");
    match source.format() {
        DiagramFormat::DirectedGraph => parse_dot(source.text()),
        DiagramFormat::Flowchart => parse_flowchart(source.text()),
    }
}

//! Front-end for the DOT directed-graph language.
//!
//! Pipeline: [`lexer`] → [`parser`] → [`elaborate`]. Lexical errors are
//! collected in one pass; the parser stops at the first syntax error; the
//! elaboration step reports every mismatched edge operator.

mod ast;
mod elaborate;
mod lexer;
mod parser;
mod tokens;

use log::debug;

use tracery_core::semantic::Diagram;

use crate::error::{DiagnosticCollector, ParseError};

/// Parse DOT source text into a semantic diagram.
///
/// # Example
///
/// ```
/// # use tracery_parser::parse_dot;
/// let diagram = parse_dot("digraph { A -> B }")?;
/// assert_eq!(diagram.nodes().len(), 2);
/// assert_eq!(diagram.edges().len(), 1);
/// # Ok::<(), tracery_parser::error::ParseError>(())
/// ```
pub fn parse_dot(text: &str) -> Result<Diagram, ParseError> {
    let tokens = lexer::tokenize(text)?;
    debug!(tokens = tokens.len(); "Tokenized DOT source");

    let graph = parser::parse_graph(&tokens)?;

    let mut diagnostics = DiagnosticCollector::new();
    let diagram = elaborate::elaborate(&graph, &mut diagnostics)?;
    let warnings = diagnostics.finish()?;
    debug!(warnings = warnings.len(); "Elaborated DOT source");

    Ok(diagram)
}

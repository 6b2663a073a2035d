//! Error codes for the Tracery diagnostic system.
//!
//! Error codes are organized by front-end:
//! - `E0xx` - Lexer errors (DOT)
//! - `E1xx` - Parser errors (DOT)
//! - `E2xx` - Flowchart errors
//! - `E3xx` - Attribute warnings shared by both front-ends

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that cannot start any token.
    E002,

    /// Unterminated block comment.
    ///
    /// A `/*` comment was opened but never closed with `*/`.
    E003,

    /// Unterminated HTML label.
    ///
    /// An HTML-like label `<...>` has unbalanced angle brackets.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before the graph body was closed.
    E101,

    /// Edge operator mismatch.
    ///
    /// `--` was used in a `digraph` or `->` in an undirected `graph`.
    E102,

    /// Trailing content.
    ///
    /// Tokens were found after the closing brace of the graph.
    E103,

    /// Nesting too deep.
    ///
    /// Subgraphs or `{ }` blocks are nested beyond the supported depth.
    E104,

    // =========================================================================
    // Flowchart Errors (E2xx)
    // =========================================================================
    /// Missing flowchart header.
    ///
    /// The first statement must be `flowchart <dir>` or `graph <dir>`.
    E200,

    /// Invalid direction.
    ///
    /// The direction after the header is not one of `TB`, `TD`, `BT`, `LR`, `RL`.
    E201,

    /// Unterminated node shape.
    ///
    /// Node text was opened with a shape delimiter that was never closed.
    E202,

    /// Unmatched `end`.
    ///
    /// An `end` keyword was found outside any `subgraph`.
    E203,

    /// Unclosed subgraph.
    ///
    /// A `subgraph` block was still open at the end of input.
    E204,

    /// Malformed link.
    ///
    /// A link operator is incomplete or its label is not closed.
    E205,

    /// Unexpected flowchart token.
    ///
    /// A statement contains text that is neither a node nor a link.
    E206,

    // =========================================================================
    // Attribute Warnings (E3xx)
    // =========================================================================
    /// Invalid color.
    ///
    /// A color attribute could not be parsed and was ignored.
    E300,

    /// Unknown shape.
    ///
    /// A shape name is not supported; the default shape is used instead.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            // Flowchart errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            // Attribute warnings
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unterminated block comment",
            ErrorCode::E004 => "unterminated HTML label",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "edge operator mismatch",
            ErrorCode::E103 => "trailing content",
            ErrorCode::E104 => "nesting too deep",
            ErrorCode::E200 => "missing flowchart header",
            ErrorCode::E201 => "invalid direction",
            ErrorCode::E202 => "unterminated node shape",
            ErrorCode::E203 => "unmatched `end`",
            ErrorCode::E204 => "unclosed subgraph",
            ErrorCode::E205 => "malformed link",
            ErrorCode::E206 => "unexpected flowchart token",
            ErrorCode::E300 => "invalid color",
            ErrorCode::E301 => "unknown shape",
        }
    }
}

impl ErrorCode {
    /// Default advice shown when a diagnostic carries no help of its own.
    pub fn help(self) -> Option<&'static str> {
        let help = match self {
            ErrorCode::E001 => "close the string with a matching `\"`",
            ErrorCode::E002 => "quote identifiers that contain anything besides letters, digits and `_`",
            ErrorCode::E003 => "close the comment with `*/`",
            ErrorCode::E004 => "balance every `<` with a matching `>`",
            ErrorCode::E100 => "check the statement for a missing operator, bracket or `;`",
            ErrorCode::E101 => "close every `{` and `[` that was opened",
            ErrorCode::E102 => "use `->` in a `digraph` and `--` in a `graph`",
            ErrorCode::E103 => "a source contains exactly one graph",
            ErrorCode::E104 => "flatten the inner subgraphs",
            ErrorCode::E200 => "start the source with a header such as `flowchart TD`",
            ErrorCode::E201 => "use one of `TB`, `TD`, `BT`, `LR` or `RL`",
            ErrorCode::E202 => "close the node text with the delimiter matching its opening",
            ErrorCode::E203 => "remove the `end` or open a `subgraph` before it",
            ErrorCode::E204 => "add `end` after the last statement of the subgraph",
            ErrorCode::E205 => "write links as `-->`, `-.->`, `==>` or `-- text -->`",
            ErrorCode::E206 => "write nodes as `id`, `id[text]` or `id(text)`",
            ErrorCode::E300 | ErrorCode::E301 => return None,
        };
        Some(help)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E204.to_string(), "E204");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E003.description(), "unterminated block comment");
        assert_eq!(ErrorCode::E202.description(), "unterminated node shape");
        assert_eq!(ErrorCode::E301.description(), "unknown shape");
    }

    #[test]
    fn test_only_errors_carry_default_help() {
        assert_eq!(ErrorCode::E104.help(), Some("flatten the inner subgraphs"));
        assert!(ErrorCode::E204.help().unwrap().contains("`end`"));
        assert_eq!(ErrorCode::E300.help(), None);
    }
}

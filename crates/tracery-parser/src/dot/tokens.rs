//! Token definitions for the DOT front-end.

use std::fmt;

use crate::span::Span;

/// A DOT token.
///
/// Whitespace and comments are dropped by the lexer and never appear here.
/// Keywords are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Strict,
    Graph,
    Digraph,
    Node,
    Edge,
    Subgraph,

    /// Alphanumeric identifier (`a_1`, `Prepare`, non-ASCII allowed).
    Identifier(String),
    /// Numeral such as `-1.5` or `.3`.
    Numeral(String),
    /// Double-quoted string with escapes already resolved.
    Quoted(String),
    /// Body of an HTML-like label `<...>`, without the outer brackets.
    Html(String),

    /// `->`
    DirectedEdge,
    /// `--`
    UndirectedEdge,

    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Equals,
    Colon,
    Plus,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Strict => write!(f, "keyword `strict`"),
            Token::Graph => write!(f, "keyword `graph`"),
            Token::Digraph => write!(f, "keyword `digraph`"),
            Token::Node => write!(f, "keyword `node`"),
            Token::Edge => write!(f, "keyword `edge`"),
            Token::Subgraph => write!(f, "keyword `subgraph`"),
            Token::Identifier(name) => write!(f, "identifier `{name}`"),
            Token::Numeral(num) => write!(f, "numeral `{num}`"),
            Token::Quoted(_) => write!(f, "quoted string"),
            Token::Html(_) => write!(f, "HTML label"),
            Token::DirectedEdge => write!(f, "`->`"),
            Token::UndirectedEdge => write!(f, "`--`"),
            Token::LeftBrace => write!(f, "`{{`"),
            Token::RightBrace => write!(f, "`}}`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Comma => write!(f, "`,`"),
            Token::Equals => write!(f, "`=`"),
            Token::Colon => write!(f, "`:`"),
            Token::Plus => write!(f, "`+`"),
        }
    }
}

/// A token with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PositionedToken {
    pub token: Token,
    pub span: Span,
}

impl PositionedToken {
    pub fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}

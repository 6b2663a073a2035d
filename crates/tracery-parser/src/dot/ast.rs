//! Syntax tree produced by the DOT parser.

use crate::span::{Span, Spanned};

/// An `ID` in DOT terms: identifier, numeral, quoted string or HTML label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Id {
    pub text: String,
    pub html: bool,
}

impl Id {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
        }
    }
}

/// `key = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub key: Spanned<Id>,
    pub value: Spanned<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrTarget {
    Graph,
    Node,
    Edge,
}

/// A node reference. Ports are parsed and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeRef {
    pub name: Spanned<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Subgraph {
    pub name: Option<Spanned<Id>>,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EdgeOperand {
    Node(NodeRef),
    Subgraph(Subgraph),
}

/// An edge operator; `directed` is true for `->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeOp {
    pub directed: bool,
    pub span: Span,
}

/// `a -> b -> { c d } [attrs]`: `operands.len() == ops.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EdgeStmt {
    pub operands: Vec<EdgeOperand>,
    pub ops: Vec<EdgeOp>,
    pub attrs: Vec<Attr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Stmt {
    Node { node: NodeRef, attrs: Vec<Attr> },
    Edge(EdgeStmt),
    Attrs { target: AttrTarget, attrs: Vec<Attr> },
    /// Bare `key = value` at graph level.
    Assign(Attr),
    Subgraph(Subgraph),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Graph {
    pub strict: bool,
    pub directed: bool,
    /// Span of the `graph`/`digraph` keyword.
    pub keyword_span: Span,
    pub name: Option<Spanned<Id>>,
    pub stmts: Vec<Stmt>,
}

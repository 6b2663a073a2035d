//! Parser for DOT tokens.
//!
//! Transforms the token stream from the [`lexer`](super::lexer) into the
//! syntax tree in [`ast`](super::ast). The public entry point is
//! [`parse_graph`].
//!
//! Grammar (the commonly emitted subset):
//!
//! ```text
//! graph     : [strict] (graph | digraph) [ID] '{' stmt_list '}'
//! stmt_list : [stmt [';'] stmt_list]
//! stmt      : node_stmt | edge_stmt | attr_stmt | ID '=' ID | subgraph
//! attr_stmt : (graph | node | edge) attr_list
//! attr_list : '[' [a_list] ']' [attr_list]
//! a_list    : ID ['=' ID] [';' | ','] [a_list]
//! edge_stmt : (node_id | subgraph) edge_rhs [attr_list]
//! edge_rhs  : edgeop (node_id | subgraph) [edge_rhs]
//! node_stmt : node_id [attr_list]
//! node_id   : ID [':' ID [':' ID]]
//! subgraph  : [subgraph [ID]] '{' stmt_list '}'
//! ```

use winnow::{
    Parser as _,
    combinator::opt,
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use super::{
    ast::{Attr, AttrTarget, EdgeOp, EdgeOperand, EdgeStmt, Graph, Id, NodeRef, Stmt, Subgraph},
    tokens::{PositionedToken, Token},
};
use crate::{
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failing construct started
    StartOffset(usize),
}

/// Deepest `{ }` nesting accepted, counting the graph body as one level.
pub(crate) const MAX_NESTING: usize = 64;

type Input<'src> = TokenSlice<'src, PositionedToken>;
type IResult<O> = Result<O, ErrMode<ContextError<Context>>>;

/// Runs `f` and turns any failure into a Cut error that remembers where the
/// construct started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Consume the next token if it equals `expected`.
fn expect(input: &mut Input<'_>, expected: &Token, label: &'static str) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken| (token.token == *expected).then_some(token.span))
        .context(Context::Label(label))
        .parse_next(input)
}

/// Consume the next token only if it equals `expected`.
fn eat(input: &mut Input<'_>, expected: &Token) -> Option<Span> {
    match input.peek_token() {
        Some(token) if token.token == *expected => {
            input.next_token();
            Some(token.span)
        }
        _ => None,
    }
}

fn peek<'src>(input: &Input<'src>) -> Option<&'src Token> {
    input.peek_token().map(|token| &token.token)
}

/// A single ID token.
fn id_atom(input: &mut Input<'_>) -> IResult<Spanned<Id>> {
    any.verify_map(|token: &PositionedToken| {
        let id = match &token.token {
            Token::Identifier(text) | Token::Numeral(text) | Token::Quoted(text) => {
                Id::plain(text.clone())
            }
            Token::Html(text) => Id {
                text: text.clone(),
                html: true,
            },
            _ => return None,
        };
        Some(Spanned::new(id, token.span))
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

fn quoted(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken| match &token.token {
        Token::Quoted(text) => Some(Spanned::new(text.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("quoted string"))
    .parse_next(input)
}

/// Parse an ID, joining `"a" + "b"` concatenations.
fn id(input: &mut Input<'_>) -> IResult<Spanned<Id>> {
    let first = id_atom(input)?;
    if first.inner().html || peek(input) != Some(&Token::Plus) {
        return Ok(first);
    }

    let mut span = first.span();
    let mut text = first.into_inner().text;
    while eat(input, &Token::Plus).is_some() {
        let next = cut_err(input, quoted)?;
        span = span.union(next.span());
        text.push_str(next.inner());
    }
    Ok(Spanned::new(Id::plain(text), span))
}

/// Parse `node_id`; a trailing port (`:port` or `:port:compass`) is dropped.
fn node_ref(input: &mut Input<'_>) -> IResult<NodeRef> {
    let name = id(input)?;
    complete_node_ref(input, name)
}

fn complete_node_ref(input: &mut Input<'_>, name: Spanned<Id>) -> IResult<NodeRef> {
    for _ in 0..2 {
        if eat(input, &Token::Colon).is_none() {
            break;
        }
        cut_err(input, id)?;
    }
    Ok(NodeRef { name })
}

/// Parse zero or more `[ ... ]` attribute lists into one flat list.
fn attr_lists(input: &mut Input<'_>) -> IResult<Vec<Attr>> {
    let mut attrs = Vec::new();

    while eat(input, &Token::LeftBracket).is_some() {
        loop {
            match peek(input) {
                Some(Token::RightBracket) => {
                    input.next_token();
                    break;
                }
                Some(Token::Comma | Token::Semicolon) => {
                    input.next_token();
                }
                _ => {
                    let attr = cut_err(input, attribute)?;
                    attrs.push(attr);
                }
            }
        }
    }

    Ok(attrs)
}

/// `key = value`, or a bare `key` which means `key = true`.
fn attribute(input: &mut Input<'_>) -> IResult<Attr> {
    let key = id(input)?;
    let value = if eat(input, &Token::Equals).is_some() {
        id(input)?
    } else {
        Spanned::new(Id::plain("true"), key.span())
    };
    Ok(Attr { key, value })
}

fn edge_op(input: &mut Input<'_>) -> Option<EdgeOp> {
    match input.peek_token() {
        Some(token) if matches!(token.token, Token::DirectedEdge | Token::UndirectedEdge) => {
            input.next_token();
            Some(EdgeOp {
                directed: token.token == Token::DirectedEdge,
                span: token.span,
            })
        }
        _ => None,
    }
}

fn edge_operand(input: &mut Input<'_>) -> IResult<EdgeOperand> {
    match peek(input) {
        Some(Token::Subgraph | Token::LeftBrace) => subgraph(input).map(EdgeOperand::Subgraph),
        _ => node_ref(input).map(EdgeOperand::Node),
    }
}

/// Parse the rest of a node or edge statement after its first operand.
fn edge_or_node_stmt(input: &mut Input<'_>, first: EdgeOperand) -> IResult<Stmt> {
    let mut operands = vec![first];
    let mut ops = Vec::new();

    while let Some(op) = edge_op(input) {
        ops.push(op);
        operands.push(cut_err(input, edge_operand)?);
    }

    let attrs = attr_lists(input)?;

    if !ops.is_empty() {
        return Ok(Stmt::Edge(EdgeStmt {
            operands,
            ops,
            attrs,
        }));
    }

    match operands.pop() {
        Some(EdgeOperand::Node(node)) => Ok(Stmt::Node { node, attrs }),
        Some(EdgeOperand::Subgraph(subgraph)) => Ok(Stmt::Subgraph(subgraph)),
        None => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

fn attr_stmt(input: &mut Input<'_>) -> IResult<Stmt> {
    let target = any
        .verify_map(|token: &PositionedToken| match token.token {
            Token::Graph => Some(AttrTarget::Graph),
            Token::Node => Some(AttrTarget::Node),
            Token::Edge => Some(AttrTarget::Edge),
            _ => None,
        })
        .context(Context::Label("`graph`, `node` or `edge`"))
        .parse_next(input)?;

    let attrs = cut_err(input, attr_lists)?;
    Ok(Stmt::Attrs { target, attrs })
}

fn stmt(input: &mut Input<'_>) -> IResult<Stmt> {
    match peek(input) {
        Some(Token::Graph | Token::Node | Token::Edge) => attr_stmt(input),
        Some(Token::Subgraph | Token::LeftBrace) => {
            let subgraph = subgraph(input)?;
            edge_or_node_stmt(input, EdgeOperand::Subgraph(subgraph))
        }
        _ => {
            let first = id(input)?;
            if eat(input, &Token::Equals).is_some() {
                let value = cut_err(input, id)?;
                return Ok(Stmt::Assign(Attr { key: first, value }));
            }
            let node = complete_node_ref(input, first)?;
            edge_or_node_stmt(input, EdgeOperand::Node(node))
        }
    }
}

fn stmt_list(input: &mut Input<'_>) -> IResult<Vec<Stmt>> {
    let mut stmts = Vec::new();

    loop {
        match peek(input) {
            None | Some(Token::RightBrace) => break,
            Some(Token::Semicolon) => {
                input.next_token();
            }
            _ => {
                let parsed = cut_err(input, stmt)?;
                stmts.push(parsed);
            }
        }
    }

    Ok(stmts)
}

/// `'{' stmt_list '}'`
fn block(input: &mut Input<'_>) -> IResult<Vec<Stmt>> {
    expect(input, &Token::LeftBrace, "`{`")?;
    let stmts = stmt_list(input)?;
    expect(input, &Token::RightBrace, "`}`")?;
    Ok(stmts)
}

fn subgraph(input: &mut Input<'_>) -> IResult<Subgraph> {
    if eat(input, &Token::Subgraph).is_none() {
        let stmts = block(input)?;
        return Ok(Subgraph { name: None, stmts });
    }

    cut_err(input, |input: &mut Input<'_>| {
        let name = opt(id).parse_next(input)?;
        let stmts = block(input)?;
        Ok(Subgraph { name, stmts })
    })
}

fn graph(input: &mut Input<'_>) -> IResult<Graph> {
    let strict = eat(input, &Token::Strict).is_some();

    let (directed, keyword_span) = any
        .verify_map(|token: &PositionedToken| match token.token {
            Token::Graph => Some((false, token.span)),
            Token::Digraph => Some((true, token.span)),
            _ => None,
        })
        .context(Context::Label("`graph` or `digraph`"))
        .parse_next(input)?;

    cut_err(input, |input: &mut Input<'_>| {
        let name = opt(id).parse_next(input)?;
        let stmts = block(input)?;
        Ok(Graph {
            strict,
            directed,
            keyword_span,
            name,
            stmts,
        })
    })
}

/// Convert a winnow error into a diagnostic.
///
/// Errors at the end of the token stream become E101 (incomplete input);
/// everything else is E100 with the offending token as primary label and the
/// statement being parsed as secondary label.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let expected = context.context().find_map(|ctx| match ctx {
        Context::Label(label) => Some(*label),
        Context::StartOffset(_) => None,
    });
    let end_offset = tokens.len() - current_remaining;
    // Innermost construct that consumed at least one token.
    let start_offset = context
        .context()
        .filter_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(tokens.len() - n),
            Context::Label(_) => None,
        })
        .find(|start| *start < end_offset);

    let expectation = expected
        .map(|label| format!(", expected {label}"))
        .unwrap_or_default();

    let Some(token) = tokens.get(end_offset) else {
        let end = tokens.last().map(|t| t.span.end()).unwrap_or_default();
        return Diagnostic::error(format!("unexpected end of input{expectation}"))
            .with_code(ErrorCode::E101)
            .with_label(Span::point(end), "input ends here")
            .with_help("close every `{` and `[` that was opened");
    };

    let mut diag = Diagnostic::error(format!("unexpected {}{expectation}", token.token))
        .with_code(ErrorCode::E100)
        .with_label(token.span, ErrorCode::E100.description());

    if let Some(start) = start_offset {
        diag = diag.with_secondary_label(
            tokens[start].span.union(tokens[end_offset - 1].span),
            "while parsing this",
        );
    }

    diag
}

/// Rejects token streams whose braces nest deeper than [`MAX_NESTING`].
///
/// The grammar recurses once per block, so this runs before parsing starts.
fn check_nesting(tokens: &[PositionedToken]) -> Result<(), Diagnostic> {
    let mut depth = 0usize;
    for token in tokens {
        match token.token {
            Token::LeftBrace => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(nesting_too_deep(token.span));
                }
            }
            Token::RightBrace => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

pub(crate) fn nesting_too_deep(span: Span) -> Diagnostic {
    Diagnostic::error(format!("blocks are nested more than {MAX_NESTING} levels deep"))
        .with_code(ErrorCode::E104)
        .with_label(span, "this block is too deep")
        .with_help("flatten the inner subgraphs")
}

/// Parse a complete graph from tokens.
pub(crate) fn parse_graph(tokens: &[PositionedToken]) -> Result<Graph, Diagnostic> {
    check_nesting(tokens)?;

    let mut token_slice = TokenSlice::new(tokens);

    let parsed = match graph(&mut token_slice) {
        Ok(parsed) => parsed,
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            return Err(convert_error(e, tokens, current_remaining));
        }
    };

    if let Some(extra) = token_slice.peek_token() {
        let last = tokens.last().map_or(extra.span, |t| t.span);
        return Err(
            Diagnostic::error("unexpected content after the end of the graph")
                .with_code(ErrorCode::E103)
                .with_label(extra.span.union(last), "trailing content")
                .with_help("a source contains exactly one graph"),
        );
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dot::lexer::tokenize;

    fn parse(input: &str) -> Result<Graph, Diagnostic> {
        let tokens = tokenize(input).expect("input should tokenize");
        parse_graph(&tokens)
    }

    fn names(operands: &[EdgeOperand]) -> Vec<String> {
        operands
            .iter()
            .map(|operand| match operand {
                EdgeOperand::Node(node) => node.name.inner().text.clone(),
                EdgeOperand::Subgraph(_) => "{}".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!(
                "digraph {{ {} a {} }}",
                "{ ".repeat(depth - 1),
                "} ".repeat(depth - 1)
            )
        };
        assert!(parse(&nested(MAX_NESTING)).is_ok());

        let err = parse(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_minimal_digraph() {
        let graph = parse("digraph { A -> B }").unwrap();
        assert!(graph.directed);
        assert!(!graph.strict);
        assert!(graph.name.is_none());
        assert_eq!(graph.stmts.len(), 1);

        let Stmt::Edge(edge) = &graph.stmts[0] else {
            panic!("expected edge statement, got {:?}", graph.stmts[0]);
        };
        assert_eq!(names(&edge.operands), vec!["A", "B"]);
        assert!(edge.ops[0].directed);
    }

    #[test]
    fn test_strict_named_graph() {
        let graph = parse("strict graph \"my graph\" { a -- b; }").unwrap();
        assert!(graph.strict);
        assert!(!graph.directed);
        assert_eq!(graph.name.unwrap().inner().text, "my graph");
    }

    #[test]
    fn test_edge_chain_with_attrs() {
        let graph = parse("digraph { a -> b -> c [label=\"go\", style=dashed] }").unwrap();
        let Stmt::Edge(edge) = &graph.stmts[0] else {
            panic!("expected edge statement");
        };
        assert_eq!(names(&edge.operands), vec!["a", "b", "c"]);
        assert_eq!(edge.attrs.len(), 2);
        assert_eq!(edge.attrs[0].key.inner().text, "label");
        assert_eq!(edge.attrs[0].value.inner().text, "go");
    }

    #[test]
    fn test_attr_statements_and_assignment() {
        let graph = parse("digraph { rankdir=LR; node [shape=box]; edge [color=red] }").unwrap();
        assert!(matches!(graph.stmts[0], Stmt::Assign(_)));
        assert!(matches!(
            graph.stmts[1],
            Stmt::Attrs {
                target: AttrTarget::Node,
                ..
            }
        ));
        assert!(matches!(
            graph.stmts[2],
            Stmt::Attrs {
                target: AttrTarget::Edge,
                ..
            }
        ));
    }

    #[test]
    fn test_subgraph_as_edge_operand() {
        let graph = parse("digraph { a -> { b c } ; subgraph cluster_x { d } }").unwrap();
        let Stmt::Edge(edge) = &graph.stmts[0] else {
            panic!("expected edge statement");
        };
        assert_eq!(names(&edge.operands), vec!["a", "{}"]);

        let Stmt::Subgraph(subgraph) = &graph.stmts[1] else {
            panic!("expected subgraph statement");
        };
        assert_eq!(subgraph.name.as_ref().unwrap().inner().text, "cluster_x");
        assert_eq!(subgraph.stmts.len(), 1);
    }

    #[test]
    fn test_ports_are_dropped() {
        let graph = parse("digraph { a:out:s -> b:in }").unwrap();
        let Stmt::Edge(edge) = &graph.stmts[0] else {
            panic!("expected edge statement");
        };
        assert_eq!(names(&edge.operands), vec!["a", "b"]);
    }

    #[test]
    fn test_string_concatenation() {
        let graph = parse("digraph { a [label=\"first \" + \"second\"] }").unwrap();
        let Stmt::Node { attrs, .. } = &graph.stmts[0] else {
            panic!("expected node statement");
        };
        assert_eq!(attrs[0].value.inner().text, "first second");
    }

    #[test]
    fn test_html_label_value() {
        let graph = parse("digraph { a [label=<<b>A</b>>] }").unwrap();
        let Stmt::Node { attrs, .. } = &graph.stmts[0] else {
            panic!("expected node statement");
        };
        assert!(attrs[0].value.inner().html);
    }

    #[test]
    fn test_missing_closing_brace_is_incomplete() {
        let err = parse("digraph { a -> b").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_missing_edge_target() {
        let err = parse("digraph { a -> ; }").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E100));
        assert!(err.message().contains("`;`"), "{}", err.message());
    }

    #[test]
    fn test_missing_graph_keyword() {
        let err = parse("{ a -> b }").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E100));
        assert_eq!(err.primary_span(), Some(Span::new(0..1)));
    }

    #[test]
    fn test_trailing_content() {
        let err = parse("digraph { a } digraph { b }").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E103));
    }
}

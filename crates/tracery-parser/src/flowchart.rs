//! Front-end for the flowchart language (`flowchart TD` / `graph LR`).
//!
//! The source is split into statements at newlines and at `;` outside
//! quotes. Each statement is parsed on its own, so one malformed line yields
//! one diagnostic and parsing continues with the next statement. `%%` comment
//! lines and a leading `---` front-matter block are skipped.
//!
//! Supported statements:
//!
//! ```text
//! flowchart LR                      header (first statement)
//! a[Text] --> b((Text)) & c         node declarations, links, `&` groups
//! a -->|label| b    a -- label --> b
//! subgraph title ... end            flattened
//! style a fill:#f9f,stroke:#333     fill, stroke and text color
//! classDef / class / click / linkStyle / direction   accepted and ignored
//! ```

use indexmap::IndexMap;
use log::{debug, trace};
use winnow::{
    Parser as _,
    combinator::{opt, preceded},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, rest, take, take_until, take_while},
};

use tracery_core::semantic::{Diagram, Direction, Edge, EdgeEnd, EdgeStroke, Node, NodeShape};

use crate::{
    attrs::parse_color,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
};

/// Diagnostic details attached to winnow errors.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlowDiagnostic {
    code: ErrorCode,
    message: String,
    help: Option<String>,
    /// Offset within the statement where the failing construct started.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<FlowDiagnostic>>;

/// Node shapes by delimiter, longest opening delimiter first.
const SHAPES: [(&str, &str, NodeShape); 10] = [
    ("(((", ")))", NodeShape::DoubleCircle),
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Stadium),
    ("(", ")", NodeShape::Rounded),
    ("[[", "]]", NodeShape::Subroutine),
    ("[(", ")]", NodeShape::Cylinder),
    ("[", "]", NodeShape::Rectangle),
    ("{{", "}}", NodeShape::Hexagon),
    ("{", "}", NodeShape::Diamond),
    (">", "]", NodeShape::Asymmetric),
];

/// Statements that are valid but carry nothing the renderer uses.
const IGNORED_KEYWORDS: [&str; 5] = ["classDef", "class", "click", "linkStyle", "direction"];

/// Abort the current statement with a diagnostic.
fn fail<O>(
    input: &mut Input<'_>,
    code: ErrorCode,
    message: impl Into<String>,
    help: impl Into<String>,
    start: usize,
) -> IResult<O> {
    rest.void().parse_next(input)?;
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        FlowDiagnostic {
            code,
            message: message.into(),
            help: Some(help.into()),
            start,
        },
    )))
}

fn ws(input: &mut Input<'_>) -> IResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || !c.is_ascii()
}

fn node_id(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    let start = input.current_token_start();
    let id: &str = take_while(1.., is_id_char).parse_next(input)?;
    let end = input.current_token_start();
    Ok(Spanned::new(id.to_string(), Span::new(start..end)))
}

/// Normalizes display text: `<br>` becomes a newline, surrounding quotes and
/// markdown backticks are removed.
fn label_text(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        text = inner;
    }
    if let Some(inner) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
        text = inner;
    }
    text.replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n")
        .trim()
        .to_string()
}

/// Text between a shape's delimiters, optionally double-quoted.
fn shape_text(input: &mut Input<'_>, close: &'static str, start: usize) -> IResult<String> {
    if input.starts_with('"') {
        '"'.parse_next(input)?;
        let quoted: IResult<&str> = take_until(0.., '"').parse_next(input);
        let Ok(quoted) = quoted else {
            return fail(
                input,
                ErrorCode::E202,
                "unterminated quoted node text",
                "add closing `\"`",
                start,
            );
        };
        '"'.parse_next(input)?;
        ws(input)?;
        if opt(literal(close)).parse_next(input)?.is_none() {
            return fail(
                input,
                ErrorCode::E202,
                "unterminated node shape",
                format!("close the node text with `{close}`"),
                start,
            );
        }
        return Ok(label_text(quoted));
    }

    let raw: IResult<&str> = take_until(0.., close).parse_next(input);
    let Ok(raw) = raw else {
        return fail(
            input,
            ErrorCode::E202,
            "unterminated node shape",
            format!("close the node text with `{close}`"),
            start,
        );
    };
    literal(close).parse_next(input)?;
    Ok(label_text(raw))
}

/// A node reference with an optional shape declaration.
#[derive(Debug, Clone, PartialEq)]
struct NodeDecl {
    id: Spanned<String>,
    shape: Option<(NodeShape, String)>,
}

fn node_decl(input: &mut Input<'_>) -> IResult<NodeDecl> {
    let id = node_id(input)?;

    let start = input.current_token_start();
    let shape = match SHAPES.iter().find(|(open, _, _)| input.starts_with(open)) {
        Some(&(open, close, shape)) => {
            literal(open).parse_next(input)?;
            Some((shape, shape_text(input, close, start)?))
        }
        None => None,
    };

    // `:::className` styling hooks are accepted and ignored.
    opt(preceded(":::", take_while(1.., |c: char| is_id_char(c) || c == '-'))).parse_next(input)?;

    Ok(NodeDecl { id, shape })
}

/// `a & b & c`
fn group(input: &mut Input<'_>) -> IResult<Vec<NodeDecl>> {
    let mut nodes = vec![node_decl(input)?];

    loop {
        let checkpoint = input.checkpoint();
        ws(input)?;
        let amp_start = input.current_token_start();
        if opt('&').parse_next(input)?.is_none() {
            input.reset(&checkpoint);
            break;
        }
        ws(input)?;
        match node_decl(input) {
            Ok(node) => nodes.push(node),
            Err(ErrMode::Backtrack(_)) => {
                return fail(
                    input,
                    ErrorCode::E206,
                    "expected a node after `&`",
                    "write `a & b --> c`",
                    amp_start,
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(nodes)
}

#[derive(Debug, Clone, PartialEq)]
struct Link {
    stroke: EdgeStroke,
    tail: EdgeEnd,
    head: EdgeEnd,
    label: Option<String>,
}

/// Classifies a link body such as `--`, `===` or `-.-`.
///
/// Returns the stroke and whether the body only opens a `-- text -->` label.
fn classify_link(body: &str, head: bool) -> Option<(EdgeStroke, bool)> {
    let len = body.chars().count();
    if len >= 2 && body.chars().all(|c| c == '-') {
        return Some((EdgeStroke::Solid, len == 2 && !head));
    }
    if len >= 2 && body.chars().all(|c| c == '=') {
        return Some((EdgeStroke::Thick, len == 2 && !head));
    }
    let dots = body.trim_start_matches('-').trim_end_matches('-');
    if body.starts_with('-') && !dots.is_empty() && dots.chars().all(|c| c == '.') {
        let closed = body.ends_with('-') && len >= 3;
        if closed {
            return Some((EdgeStroke::Dotted, false));
        }
        if !head {
            return Some((EdgeStroke::Dotted, true));
        }
    }
    None
}

/// Closing marker for a `-- text -->` style label.
fn label_close_marker(stroke: EdgeStroke) -> &'static str {
    match stroke {
        EdgeStroke::Thick => "==",
        EdgeStroke::Dotted => ".-",
        _ => "--",
    }
}

fn link(input: &mut Input<'_>) -> IResult<Link> {
    let start = input.current_token_start();

    let tail = match opt('<').parse_next(input)? {
        Some(_) => EdgeEnd::Arrow,
        None => EdgeEnd::None,
    };

    if input.starts_with("~~~") {
        take_while(3.., '~').parse_next(input)?;
        return Ok(Link {
            stroke: EdgeStroke::Invisible,
            tail: EdgeEnd::None,
            head: EdgeEnd::None,
            label: None,
        });
    }

    let body: &str = take_while(0.., ['-', '=', '.']).parse_next(input)?;
    if body.is_empty() && tail == EdgeEnd::None {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    let head = opt('>').parse_next(input)?.is_some();

    let Some((stroke, open)) = classify_link(body, head) else {
        return fail(
            input,
            ErrorCode::E205,
            "malformed link",
            "use one of `-->`, `---`, `-.->`, `==>` or `<-->`",
            start,
        );
    };

    let mut link = Link {
        stroke,
        tail,
        head: if head { EdgeEnd::Arrow } else { EdgeEnd::None },
        label: None,
    };

    if open {
        let marker = label_close_marker(stroke);
        let Some(len) = input.find(marker) else {
            return fail(
                input,
                ErrorCode::E205,
                "link text is never closed",
                format!("close the link text with `{marker}>`"),
                start,
            );
        };
        let text: &str = take(len).parse_next(input)?;
        take_while(1.., ['-', '=', '.']).parse_next(input)?;
        if opt('>').parse_next(input)?.is_some() {
            link.head = EdgeEnd::Arrow;
        }
        link.label = Some(label_text(text));
    }

    let checkpoint = input.checkpoint();
    ws(input)?;
    let pipe_start = input.current_token_start();
    if opt('|').parse_next(input)?.is_some() {
        let text: IResult<&str> = take_until(0.., '|').parse_next(input);
        let Ok(text) = text else {
            return fail(
                input,
                ErrorCode::E205,
                "unterminated link label",
                "close the label with `|`",
                pipe_start,
            );
        };
        '|'.parse_next(input)?;
        link.label = Some(label_text(text));
    } else {
        input.reset(&checkpoint);
    }

    Ok(link)
}

/// `group (link group)*`
#[derive(Debug, Clone, PartialEq)]
struct Chain {
    groups: Vec<Vec<NodeDecl>>,
    links: Vec<Link>,
}

fn chain(input: &mut Input<'_>) -> IResult<Chain> {
    let mut groups = vec![group(input)?];
    let mut links = Vec::new();

    loop {
        ws(input)?;
        if input.is_empty() {
            break;
        }

        let link_start = input.current_token_start();
        match link(input) {
            Ok(link) => links.push(link),
            Err(ErrMode::Backtrack(_)) => {
                return fail(
                    input,
                    ErrorCode::E206,
                    "unexpected text after node",
                    "separate statements with a newline or `;`",
                    link_start,
                );
            }
            Err(e) => return Err(e),
        }

        ws(input)?;
        match group(input) {
            Ok(nodes) => groups.push(nodes),
            Err(ErrMode::Backtrack(_)) => {
                return fail(
                    input,
                    ErrorCode::E205,
                    "link has no target node",
                    "add a node after the link",
                    link_start,
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Chain { groups, links })
}

/// `style id fill:#f9f,stroke:#333,color:#fff`
#[derive(Debug, Clone, PartialEq)]
struct StyleStmt {
    id: Spanned<String>,
    properties: Vec<(String, Spanned<String>)>,
}

impl StyleStmt {
    fn shifted(self, offset: usize) -> Self {
        let shift = |value: Spanned<String>| {
            let span = value.span().shifted(offset);
            Spanned::new(value.into_inner(), span)
        };
        Self {
            id: shift(self.id),
            properties: self
                .properties
                .into_iter()
                .map(|(key, value)| (key, shift(value)))
                .collect(),
        }
    }
}

fn style_stmt(input: &mut Input<'_>) -> IResult<StyleStmt> {
    literal("style").parse_next(input)?;
    let start = input.current_token_start();
    ws(input)?;
    let Ok(id) = node_id(input) else {
        return fail(
            input,
            ErrorCode::E206,
            "expected a node identifier after `style`",
            "write `style id fill:#f9f`",
            start,
        );
    };
    ws(input)?;

    let offset = input.current_token_start();
    let list: &str = rest.parse_next(input)?;
    let mut properties = Vec::new();
    let mut cursor = offset;
    for part in list.split(',') {
        if let Some((key, value)) = part.split_once(':') {
            let value_start = cursor + key.len() + 1;
            let lead = value.len() - value.trim_start().len();
            let value_span = Span::new(value_start + lead..value_start + lead + value.trim().len());
            properties.push((
                key.trim().to_string(),
                Spanned::new(value.trim().to_string(), value_span),
            ));
        }
        cursor += part.len() + 1;
    }

    Ok(StyleStmt { id, properties })
}

/// Convert a statement-level error into a diagnostic relative to the statement.
fn convert_err_mode(err: ErrMode<ContextError<FlowDiagnostic>>, error_pos: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(FlowDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let mut diag = Diagnostic::error(message.clone())
            .with_code(*code)
            .with_label(Span::new(*start..error_pos), code.description());
        if let Some(help) = help {
            diag = diag.with_help(help.clone());
        }
        return diag;
    }

    Diagnostic::error("expected a node or statement")
        .with_code(ErrorCode::E206)
        .with_label(Span::point(error_pos), ErrorCode::E206.description())
}

/// One `;`- or newline-separated statement with its offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Statement<'a> {
    text: &'a str,
    offset: usize,
}

impl Statement<'_> {
    fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.text.len())
    }

    fn keyword(&self) -> &str {
        self.text.split_whitespace().next().unwrap_or_default()
    }

    /// Parse the statement with `parser`, shifting any diagnostic into
    /// source coordinates. Spans inside the parsed value stay relative to
    /// the statement.
    fn parse<O>(&self, parser: impl FnOnce(&mut Input<'_>) -> IResult<O>) -> Result<O, Diagnostic> {
        let mut input = LocatingSlice::new(self.text);
        parser(&mut input).map_err(|err| {
            let error_pos = input.current_token_start();
            convert_err_mode(err, error_pos).shifted(self.offset)
        })
    }
}

fn push_statement<'a>(statements: &mut Vec<Statement<'a>>, text: &'a str, offset: usize) {
    let lead = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(Statement {
            text: trimmed,
            offset: offset + lead,
        });
    }
}

fn split_statements(source: &str) -> Vec<Statement<'_>> {
    let mut statements = Vec::new();
    let mut offset = 0;
    let mut seen_content = false;
    let mut in_front_matter = false;

    for line in source.split_inclusive('\n') {
        let line_offset = offset;
        offset += line.len();

        let trimmed = line.trim();
        if in_front_matter {
            in_front_matter = trimmed != "---";
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        if !seen_content && trimmed == "---" {
            in_front_matter = true;
            continue;
        }
        seen_content = true;

        let mut start = 0;
        let mut in_quotes = false;
        for (idx, c) in line.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                ';' if !in_quotes => {
                    push_statement(&mut statements, &line[start..idx], line_offset + start);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        push_statement(&mut statements, &line[start..], line_offset + start);
    }

    statements
}

fn parse_header(statement: &Statement<'_>) -> Result<Direction, Diagnostic> {
    let keyword = statement.keyword();
    if !["flowchart", "graph", "flowchart-elk"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
    {
        return Err(Diagnostic::error("missing flowchart header")
            .with_code(ErrorCode::E200)
            .with_label(statement.span(), "expected `flowchart` or `graph`")
            .with_help("start the diagram with a header such as `flowchart TD`"));
    }

    let mut words = statement.text[keyword.len()..].split_whitespace();
    let Some(word) = words.next() else {
        return Ok(Direction::TopToBottom);
    };
    let after_keyword = &statement.text[keyword.len()..];
    let word_offset =
        statement.offset + keyword.len() + after_keyword.find(word).unwrap_or_default();
    let word_span = Span::new(word_offset..word_offset + word.len());

    let direction = match word.to_ascii_uppercase().as_str() {
        "TB" | "TD" => Direction::TopToBottom,
        "BT" => Direction::BottomToTop,
        "LR" => Direction::LeftToRight,
        "RL" => Direction::RightToLeft,
        _ => {
            return Err(Diagnostic::error(format!("invalid direction `{word}`"))
                .with_code(ErrorCode::E201)
                .with_label(word_span, ErrorCode::E201.description())
                .with_help("use one of `TB`, `TD`, `BT`, `LR` or `RL`"));
        }
    };

    if words.next().is_some() {
        let extra_start = word_span.end();
        return Err(Diagnostic::error("unexpected text after the flowchart header")
            .with_code(ErrorCode::E206)
            .with_label(
                Span::new(extra_start..statement.span().end()),
                ErrorCode::E206.description(),
            )
            .with_help("put each statement on its own line or separate them with `;`"));
    }

    Ok(direction)
}

#[derive(Default)]
struct Builder {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    styles: Vec<StyleStmt>,
    open_subgraphs: Vec<Span>,
    diagnostics: DiagnosticCollector,
}

impl Builder {
    fn declare(&mut self, decl: &NodeDecl) -> usize {
        let id = decl.id.inner();
        let idx = match self.nodes.get_index_of(id.as_str()) {
            Some(idx) => idx,
            None => self.nodes.insert_full(id.clone(), Node::new(id.clone())).0,
        };

        if let Some((shape, text)) = &decl.shape {
            if let Some((_, node)) = self.nodes.get_index_mut(idx) {
                node.set_shape(*shape);
                if !text.is_empty() {
                    node.set_label(text.clone());
                }
            }
        }

        idx
    }

    fn chain(&mut self, chain: &Chain) {
        let groups: Vec<Vec<usize>> = chain
            .groups
            .iter()
            .map(|group| group.iter().map(|decl| self.declare(decl)).collect())
            .collect();

        for (link, pair) in chain.links.iter().zip(groups.windows(2)) {
            for &source in &pair[0] {
                for &target in &pair[1] {
                    let mut edge = Edge::new(source, target)
                        .with_stroke(link.stroke)
                        .with_ends(link.tail, link.head);
                    if let Some(label) = link.label.as_ref().filter(|l| !l.is_empty()) {
                        edge = edge.with_label(label.clone());
                    }
                    self.edges.push(edge);
                }
            }
        }
    }

    fn statement(&mut self, statement: &Statement<'_>) {
        let keyword = statement.keyword();

        let result = match keyword {
            "subgraph" => {
                self.open_subgraphs.push(statement.span());
                Ok(())
            }
            "end" if statement.text == "end" => {
                if self.open_subgraphs.pop().is_none() {
                    Err(Diagnostic::error("`end` without a matching `subgraph`")
                        .with_code(ErrorCode::E203)
                        .with_label(statement.span(), ErrorCode::E203.description())
                        .with_help("remove this line or open a block with `subgraph`"))
                } else {
                    Ok(())
                }
            }
            "style" => statement
                .parse(style_stmt)
                .map(|style| self.styles.push(style.shifted(statement.offset))),
            _ if IGNORED_KEYWORDS.contains(&keyword) => {
                trace!(keyword; "Ignoring flowchart statement");
                Ok(())
            }
            _ => statement.parse(chain).map(|chain| self.chain(&chain)),
        };

        if let Err(diagnostic) = result {
            self.diagnostics.emit(diagnostic);
        }
    }

    fn apply_styles(&mut self) {
        for style in std::mem::take(&mut self.styles) {
            let Some(node) = self.nodes.get_mut(style.id.inner().as_str()) else {
                debug!(id = style.id.inner().as_str(); "Ignoring style for undeclared node");
                continue;
            };
            for (key, value) in &style.properties {
                if !matches!(key.as_str(), "fill" | "stroke" | "color") {
                    continue;
                }
                let Some(color) = parse_color(value.inner(), value.span(), &mut self.diagnostics)
                else {
                    continue;
                };
                let node_style = node.style_mut();
                match key.as_str() {
                    "fill" => node_style.set_fill(color),
                    "stroke" => node_style.set_stroke(color),
                    _ => node_style.set_text(color),
                }
            }
        }
    }

    fn finish(mut self, direction: Direction) -> Result<Diagram, ParseError> {
        self.apply_styles();

        for span in std::mem::take(&mut self.open_subgraphs) {
            self.diagnostics.emit(
                Diagnostic::error("subgraph is never closed")
                    .with_code(ErrorCode::E204)
                    .with_label(span, "opened here")
                    .with_help("close the block with `end`"),
            );
        }

        self.diagnostics.finish()?;

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            direction:?;
            "Parsed flowchart"
        );

        let nodes = self.nodes.into_values().collect();
        Diagram::new(direction, nodes, self.edges).map_err(|err| {
            ParseError::from(
                Diagnostic::error(format!("internal error while building the diagram: {err}"))
                    .with_code(ErrorCode::E206),
            )
        })
    }
}

/// Parse flowchart source text into a semantic diagram.
///
/// Every malformed statement is reported; the returned [`ParseError`] holds
/// one diagnostic per problem.
///
/// # Example
///
/// ```
/// # use tracery_parser::parse_flowchart;
/// let diagram = parse_flowchart("flowchart LR\n  fetch[Fetch data] --> train((Train))")?;
/// assert_eq!(diagram.nodes()[0].label(), "Fetch data");
/// assert_eq!(diagram.edges().len(), 1);
/// # Ok::<(), tracery_parser::error::ParseError>(())
/// ```
pub fn parse_flowchart(text: &str) -> Result<Diagram, ParseError> {
    let statements = split_statements(text);
    let Some((header, body)) = statements.split_first() else {
        return Err(Diagnostic::error("missing flowchart header")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(0..text.len()), "no statements found")
            .with_help("start the diagram with a header such as `flowchart TD`")
            .into());
    };

    let direction = parse_header(header)?;

    let mut builder = Builder::default();
    for statement in body {
        builder.statement(statement);
    }
    builder.finish(direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_chain(text: &str) -> Chain {
        let statement = Statement { text, offset: 0 };
        statement.parse(chain).expect("chain should parse")
    }

    fn chain_error(text: &str) -> Diagnostic {
        let statement = Statement { text, offset: 0 };
        statement.parse(chain).expect_err("chain should fail")
    }

    #[test]
    fn test_split_statements_offsets() {
        let source = "flowchart TD\n  a --> b; c\n%% comment\n  d";
        let statements = split_statements(source);
        let texts: Vec<_> = statements.iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["flowchart TD", "a --> b", "c", "d"]);
        assert_eq!(statements[1].offset, 15);
        assert_eq!(&source[statements[2].span().range()], "c");
    }

    #[test]
    fn test_split_keeps_quoted_semicolons() {
        let statements = split_statements("graph TD\na[\"x; y\"] --> b");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_front_matter_is_skipped() {
        let statements = split_statements("---\ntitle: Pipeline\n---\nflowchart LR\na");
        assert_eq!(statements[0].text, "flowchart LR");
    }

    #[test]
    fn test_node_shapes() {
        let cases = [
            ("a[Text]", NodeShape::Rectangle),
            ("a(Text)", NodeShape::Rounded),
            ("a([Text])", NodeShape::Stadium),
            ("a[[Text]]", NodeShape::Subroutine),
            ("a[(Text)]", NodeShape::Cylinder),
            ("a((Text))", NodeShape::Circle),
            ("a(((Text)))", NodeShape::DoubleCircle),
            ("a{Text}", NodeShape::Diamond),
            ("a{{Text}}", NodeShape::Hexagon),
            ("a>Text]", NodeShape::Asymmetric),
        ];
        for (text, expected) in cases {
            let chain = parse_chain(text);
            let (shape, label) = chain.groups[0][0].shape.clone().expect("shape");
            assert_eq!(shape, expected, "{text}");
            assert_eq!(label, "Text", "{text}");
        }
    }

    #[test]
    fn test_quoted_node_text() {
        let chain = parse_chain("a[\"Load (raw) data\"]");
        let (_, label) = chain.groups[0][0].shape.clone().unwrap();
        assert_eq!(label, "Load (raw) data");
    }

    #[test]
    fn test_link_kinds() {
        let cases = [
            ("a --> b", EdgeStroke::Solid, EdgeEnd::None, EdgeEnd::Arrow),
            ("a --- b", EdgeStroke::Solid, EdgeEnd::None, EdgeEnd::None),
            ("a -.-> b", EdgeStroke::Dotted, EdgeEnd::None, EdgeEnd::Arrow),
            ("a -.- b", EdgeStroke::Dotted, EdgeEnd::None, EdgeEnd::None),
            ("a ==> b", EdgeStroke::Thick, EdgeEnd::None, EdgeEnd::Arrow),
            ("a === b", EdgeStroke::Thick, EdgeEnd::None, EdgeEnd::None),
            ("a <--> b", EdgeStroke::Solid, EdgeEnd::Arrow, EdgeEnd::Arrow),
            ("a ~~~ b", EdgeStroke::Invisible, EdgeEnd::None, EdgeEnd::None),
            ("a---->b", EdgeStroke::Solid, EdgeEnd::None, EdgeEnd::Arrow),
        ];
        for (text, stroke, tail, head) in cases {
            let chain = parse_chain(text);
            let link = &chain.links[0];
            assert_eq!(link.stroke, stroke, "{text}");
            assert_eq!(link.tail, tail, "{text}");
            assert_eq!(link.head, head, "{text}");
        }
    }

    #[test]
    fn test_link_labels() {
        let chain = parse_chain("a -->|yes| b");
        assert_eq!(chain.links[0].label.as_deref(), Some("yes"));

        let chain = parse_chain("a -- on failure --> b");
        assert_eq!(chain.links[0].label.as_deref(), Some("on failure"));
        assert_eq!(chain.links[0].head, EdgeEnd::Arrow);

        let chain = parse_chain("a -. maybe .-> b");
        assert_eq!(chain.links[0].label.as_deref(), Some("maybe"));
        assert_eq!(chain.links[0].stroke, EdgeStroke::Dotted);
    }

    #[test]
    fn test_groups_and_chains() {
        let chain = parse_chain("a & b --> c --> d & e");
        assert_eq!(chain.groups.len(), 3);
        assert_eq!(chain.groups[0].len(), 2);
        assert_eq!(chain.groups[2].len(), 2);
        assert_eq!(chain.links.len(), 2);
    }

    #[test]
    fn test_unterminated_shape() {
        let diag = chain_error("a[Load data --> b");
        assert_eq!(diag.code(), Some(ErrorCode::E202));
        assert_eq!(diag.primary_span().unwrap().start(), 1);
    }

    #[test]
    fn test_malformed_link() {
        assert_eq!(chain_error("a -> b").code(), Some(ErrorCode::E205));
        assert_eq!(chain_error("a -->").code(), Some(ErrorCode::E205));
        assert_eq!(chain_error("a -->|open b").code(), Some(ErrorCode::E205));
    }

    #[test]
    fn test_unexpected_text() {
        let diag = chain_error("a b");
        assert_eq!(diag.code(), Some(ErrorCode::E206));
        assert_eq!(diag.primary_span(), Some(Span::new(2..3)));
    }

    #[test]
    fn test_statement_errors_are_shifted() {
        let statement = Statement {
            text: "a[open",
            offset: 40,
        };
        let diag = statement.parse(chain).unwrap_err();
        assert_eq!(diag.primary_span(), Some(Span::new(41..46)));
    }

    #[test]
    fn test_style_statement_offsets() {
        let statement = Statement {
            text: "style a fill:#f9f, stroke:#333",
            offset: 0,
        };
        let style = statement.parse(style_stmt).unwrap();
        assert_eq!(style.id.inner(), "a");
        assert_eq!(style.properties.len(), 2);
        let (key, value) = &style.properties[1];
        assert_eq!(key, "stroke");
        assert_eq!(&statement.text[value.span().range()], "#333");
    }
}

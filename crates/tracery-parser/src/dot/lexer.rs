//! Lexical analyzer for DOT source text.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass. Whitespace
//! and the three comment forms (`//`, `/* */`, `#` lines) are skipped.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, rest, take, take_until, take_while},
};

use super::tokens::{PositionedToken, Token};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// A fragment of a quoted string: a plain character or the character
/// following a backslash.
#[derive(Debug, Clone, Copy)]
enum Fragment {
    Char(char),
    Escape(char),
}

fn push_fragment(mut acc: String, fragment: Fragment) -> String {
    match fragment {
        Fragment::Char(c) => acc.push(c),
        Fragment::Escape('"') => acc.push('"'),
        Fragment::Escape('\\') => acc.push('\\'),
        // Centered, left- and right-justified line breaks all become newlines.
        Fragment::Escape('n' | 'l' | 'r') => acc.push('\n'),
        // Line continuation.
        Fragment::Escape('\n') => {}
        // Keep unknown escapes (`\N`, `\G`) for label substitution.
        Fragment::Escape(c) => {
            acc.push('\\');
            acc.push(c);
        }
    }
    acc
}

/// Parse a double-quoted string. Newlines are allowed inside.
fn quoted_string(input: &mut Input<'_>) -> IResult<Token> {
    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    let fragment = alt((
        preceded('\\', any).map(Fragment::Escape),
        none_of(['"', '\\']).map(Fragment::Char),
    ));
    let content = repeat(0.., fragment).fold(String::new, push_fragment);

    cut_err(terminated(content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start: start_pos,
        })
        .map(Token::Quoted)
        .parse_next(input)
}

/// Parse an HTML-like label: `<` ... `>` with balanced inner brackets.
fn html_string(input: &mut Input<'_>) -> IResult<Token> {
    let start_pos = input.current_token_start();

    '<'.parse_next(input)?;

    let mut depth = 1usize;
    let mut body_len = None;
    for (idx, c) in input.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    body_len = Some(idx);
                    break;
                }
            }
            _ => {}
        }
    }

    match body_len {
        Some(len) => {
            let body: &str = take(len).parse_next(input)?;
            '>'.parse_next(input)?;
            Ok(Token::Html(body.to_string()))
        }
        None => {
            rest.void().parse_next(input)?;
            Err(ErrMode::Cut(ContextError::new().add_context(
                input,
                &input.checkpoint(),
                LexerDiagnostic {
                    code: ErrorCode::E004,
                    message: "unterminated HTML label",
                    help: Some("balance every `<` with a matching `>`"),
                    start: start_pos,
                },
            )))
        }
    }
}

fn numeral(input: &mut Input<'_>) -> IResult<Token> {
    (
        opt('-'),
        alt((
            (digit1, opt(('.', digit0))).void(),
            ('.', digit1).void(),
        )),
    )
        .take()
        .map(|num: &str| Token::Numeral(num.to_string()))
        .parse_next(input)
}

/// Parse an identifier or a keyword. Keywords are case-insensitive.
fn identifier_or_keyword(input: &mut Input<'_>) -> IResult<Token> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '_' || !c.is_ascii()
    })
    .verify(|s: &str| s.chars().next().is_some_and(|c| !c.is_ascii_digit()))
    .map(|word: &str| {
        const KEYWORDS: [(&str, Token); 6] = [
            ("strict", Token::Strict),
            ("graph", Token::Graph),
            ("digraph", Token::Digraph),
            ("node", Token::Node),
            ("edge", Token::Edge),
            ("subgraph", Token::Subgraph),
        ];
        KEYWORDS
            .iter()
            .find(|(keyword, _)| word.eq_ignore_ascii_case(keyword))
            .map(|(_, token)| token.clone())
            .unwrap_or_else(|| Token::Identifier(word.to_string()))
    })
    .parse_next(input)
}

fn edge_operator(input: &mut Input<'_>) -> IResult<Token> {
    alt((
        literal("->").value(Token::DirectedEdge),
        literal("--").value(Token::UndirectedEdge),
    ))
    .parse_next(input)
}

fn single_char_token(input: &mut Input<'_>) -> IResult<Token> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
        '='.value(Token::Equals),
        ':'.value(Token::Colon),
        '+'.value(Token::Plus),
    ))
    .parse_next(input)
}

fn block_comment(input: &mut Input<'_>) -> IResult<()> {
    let start_pos = input.current_token_start();

    "/*".parse_next(input)?;

    if opt(terminated(take_until(0.., "*/"), "*/"))
        .parse_next(input)?
        .is_some()
    {
        return Ok(());
    }

    rest.void().parse_next(input)?;
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start: start_pos,
        },
    )))
}

/// Whitespace, `//` and `#` line comments, and block comments.
fn trivia(input: &mut Input<'_>) -> IResult<()> {
    alt((
        take_while(1.., char::is_whitespace).void(),
        preceded(alt(("//", "#")), take_while(0.., |c| c != '\n')).void(),
        block_comment,
    ))
    .parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token(input: &mut Input<'_>) -> IResult<PositionedToken> {
    let start_pos = input.current_token_start();

    let token = alt((
        quoted_string,
        html_string,
        edge_operator, // Must come before numeral (`-1` vs `--`)
        numeral,
        identifier_or_keyword,
        single_char_token,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer {
    tokens: Vec<PositionedToken>,
    diagnostics: DiagnosticCollector,
}

impl Lexer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'_>) {
        while !input.is_empty() {
            let step = alt((trivia.map(|()| None), positioned_token.map(Some)))
                .parse_next(&mut input);

            match step {
                Ok(Some(token)) => self.tokens.push(token),
                Ok(None) => {}
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let width = input.peek_token().map_or(1, char::len_utf8);

                    self.diagnostics
                        .emit(Self::convert_err_mode(e, error_pos, width));

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken>, ParseError> {
        self.diagnostics.finish().map(|_| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when the error carries no
    /// [`LexerDiagnostic`] context.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
        width: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(
                Span::new(error_pos..error_pos + width),
                ErrorCode::E002.description(),
            )
            .with_help("quote identifiers that contain punctuation")
    }
}

/// Tokenize DOT source, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully lexed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub(crate) fn tokenize(input: &str) -> Result<Vec<PositionedToken>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("input should tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn first_code(input: &str) -> ErrorCode {
        let err = tokenize(input).expect_err("input should fail to tokenize");
        err.diagnostics()[0].code().expect("lexer errors carry a code")
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("STRICT DiGraph node Edge subgraph graph"),
            vec![
                Token::Strict,
                Token::Digraph,
                Token::Node,
                Token::Edge,
                Token::Subgraph,
                Token::Graph,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("nodes graph_1"),
            vec![
                Token::Identifier("nodes".to_string()),
                Token::Identifier("graph_1".to_string()),
            ]
        );
    }

    #[test]
    fn test_edge_operators_and_numerals() {
        assert_eq!(
            kinds("a->b--c -1.5 .25"),
            vec![
                Token::Identifier("a".to_string()),
                Token::DirectedEdge,
                Token::Identifier("b".to_string()),
                Token::UndirectedEdge,
                Token::Identifier("c".to_string()),
                Token::Numeral("-1.5".to_string()),
                Token::Numeral(".25".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_string_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"\nnow\lleft" "\N""#),
            vec![
                Token::Quoted("say \"hi\"\nnow\nleft".to_string()),
                Token::Quoted("\\N".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_string_line_continuation() {
        assert_eq!(
            kinds("\"long \\\nlabel\""),
            vec![Token::Quoted("long label".to_string())]
        );
    }

    #[test]
    fn test_html_label_nesting() {
        assert_eq!(
            kinds("<<b>bold</b>>"),
            vec![Token::Html("<b>bold</b>".to_string())]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "// line\n# preprocessor\n/* block\n comment */ a";
        assert_eq!(kinds(input), vec![Token::Identifier("a".to_string())]);
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  ab -> \"c\"").unwrap();
        assert_eq!(tokens[0].span, Span::new(2..4));
        assert_eq!(tokens[1].span, Span::new(5..7));
        assert_eq!(tokens[2].span, Span::new(8..11));
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(
            kinds("étape"),
            vec![Token::Identifier("étape".to_string())]
        );
    }

    #[test]
    fn test_lexer_errors() {
        assert_eq!(first_code("a -> \"open"), ErrorCode::E001);
        assert_eq!(first_code("a @ b"), ErrorCode::E002);
        assert_eq!(first_code("/* never closed"), ErrorCode::E003);
        assert_eq!(first_code("label=<<b>x</b>"), ErrorCode::E004);
    }

    #[test]
    fn test_unterminated_string_span_starts_at_quote() {
        let err = tokenize("a -> \"open").unwrap_err();
        let span = err.diagnostics()[0].primary_span().unwrap();
        assert_eq!(span.start(), 5);
        assert_eq!(span.end(), 10);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let err = tokenize("a @ b $ c").unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
    }
}

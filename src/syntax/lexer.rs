//! Lexer - raw tokens from the pest grammar, then a layout pass
//!
//! `grammar.pest` splits the text into names, numbers, strings, operators,
//! whitespace and comments. The layout pass here turns line structure into
//! Python's NEWLINE/INDENT/DEDENT tokens: newlines inside brackets are
//! dropped, blank and comment-only lines vanish, and indentation changes are
//! checked against a stack of open widths.

use pest::{error::InputLocation, iterators::Pair, Parser};
use pest_derive::Parser;
use tracing::trace;

use crate::ast::Span;
use crate::diagnostics::ParseError;
use crate::syntax::token::{Token, TokenKind};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct PythonLexer;

const TAB_SIZE: usize = 8;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Tokenizes a complete source file. At most `max_brackets` brackets may be
/// open at once.
pub fn tokenize(source: &str, max_brackets: usize) -> Result<Vec<Token<'_>>, ParseError> {
    Layout::new(source, 0, Mode::File, max_brackets).run()
}

/// Tokenizes an expression embedded in a larger source (f-string fields).
///
/// The text behaves as if wrapped in parentheses: no layout tokens are
/// produced, and spans are shifted by `base` so they point into the
/// enclosing source.
pub fn tokenize_embedded(
    text: &str,
    base: usize,
    max_brackets: usize,
) -> Result<Vec<Token<'_>>, ParseError> {
    Layout::new(text, base, Mode::Embedded, max_brackets).run()
}

// ============================================================================
// LAYOUT PASS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    File,
    Embedded,
}

struct Layout<'src> {
    source: &'src str,
    base: usize,
    mode: Mode,
    tokens: Vec<Token<'src>>,
    indents: Vec<usize>,
    brackets: Vec<(&'src str, Span)>,
    max_brackets: usize,
    at_line_start: bool,
    line_start: usize,
}

impl<'src> Layout<'src> {
    fn new(source: &'src str, base: usize, mode: Mode, max_brackets: usize) -> Self {
        Self {
            source,
            base,
            mode,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            max_brackets,
            at_line_start: true,
            line_start: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token<'src>>, ParseError> {
        let mut pairs = PythonLexer::parse(Rule::tokens, self.source).map_err(|e| {
            let pos = match e.location {
                InputLocation::Pos(pos) => pos,
                InputLocation::Span((start, _)) => start,
            };
            ParseError::new("invalid syntax", self.span(pos, pos))
        })?;

        let Some(file) = pairs.next() else {
            return self.finish();
        };
        for pair in file.into_inner() {
            self.feed(pair)?;
        }
        self.finish()
    }

    fn feed(&mut self, pair: Pair<'src, Rule>) -> Result<(), ParseError> {
        let text = pair.as_str();
        let (start, end) = (pair.as_span().start(), pair.as_span().end());
        let span = self.span(start, end);

        match pair.as_rule() {
            Rule::newline => {
                if self.mode == Mode::Embedded || !self.brackets.is_empty() {
                    return Ok(());
                }
                if !self.at_line_start {
                    self.tokens.push(Token::new(TokenKind::Newline, text, span));
                    self.at_line_start = true;
                }
                self.line_start = end;
                Ok(())
            }
            Rule::space | Rule::comment | Rule::continuation | Rule::EOI => Ok(()),
            Rule::unterminated_string => {
                let message = if text.ends_with("\"\"\"") || text.ends_with("'''") {
                    "EOF while scanning triple-quoted string literal"
                } else {
                    "EOL while scanning string literal"
                };
                Err(ParseError::new(message, span))
            }
            Rule::stray => Err(stray_character(text, span)),
            Rule::name => self.push(TokenKind::Name, text, span, start),
            Rule::number => self.push(TokenKind::Number, text, span, start),
            Rule::string => self.push(TokenKind::String, text, span, start),
            Rule::op => {
                self.push(TokenKind::Op, text, span, start)?;
                self.track_bracket(text, span)
            }
            rule => Err(ParseError::new(format!("unexpected lexical rule {rule:?}"), span)),
        }
    }

    fn push(
        &mut self,
        kind: TokenKind,
        text: &'src str,
        span: Span,
        start: usize,
    ) -> Result<(), ParseError> {
        // A logical line never starts inside brackets.
        if self.at_line_start && self.mode == Mode::File {
            self.indent_to(start)?;
        }
        self.at_line_start = false;
        self.tokens.push(Token::new(kind, text, span));
        Ok(())
    }

    fn indent_to(&mut self, start: usize) -> Result<(), ParseError> {
        let width = indent_width(&self.source[self.line_start..start]);
        let here = self.span(start, start);
        let current = self.indents.last().copied().unwrap_or(0);

        if width > current {
            trace!(width, "indent");
            self.indents.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, "", here));
        } else if width < current {
            while self.indents.last().is_some_and(|&w| w > width) {
                trace!(width, "dedent");
                self.indents.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, "", here));
            }
            if self.indents.last() != Some(&width) {
                return Err(ParseError::new(
                    "unindent does not match any outer indentation level",
                    here,
                ));
            }
        }
        Ok(())
    }

    fn track_bracket(&mut self, text: &'src str, span: Span) -> Result<(), ParseError> {
        match text {
            "(" | "[" | "{" => {
                if self.brackets.len() >= self.max_brackets {
                    return Err(ParseError::new("too many nested parentheses", span));
                }
                self.brackets.push((text, span));
                Ok(())
            }
            ")" | "]" | "}" => {
                let Some((open, _)) = self.brackets.pop() else {
                    return Err(ParseError::new(format!("unmatched '{text}'"), span));
                };
                if closing_for(open) != text {
                    return Err(ParseError::new(
                        format!(
                            "closing parenthesis '{text}' does not match opening parenthesis '{open}'"
                        ),
                        span,
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finish(mut self) -> Result<Vec<Token<'src>>, ParseError> {
        let eof = self.span(self.source.len(), self.source.len());
        if !self.brackets.is_empty() {
            return Err(ParseError::new("unexpected EOF while parsing", eof));
        }
        if self.mode == Mode::File {
            if !self.at_line_start {
                self.tokens.push(Token::new(TokenKind::Newline, "", eof));
            }
            while self.indents.len() > 1 {
                self.indents.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, "", eof));
            }
        }
        self.tokens.push(Token::new(TokenKind::EndMarker, "", eof));
        trace!(count = self.tokens.len(), "tokenized");
        Ok(self.tokens)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Column reached by the leading whitespace of a line.
fn indent_width(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| match c {
        ' ' => width + 1,
        '\t' => (width / TAB_SIZE + 1) * TAB_SIZE,
        // Form feeds and explicit line joins restart the count.
        _ => 0,
    })
}

fn closing_for(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

fn stray_character(text: &str, span: Span) -> ParseError {
    let c = text.chars().next().unwrap_or('\0');
    if c.is_ascii_punctuation() || c == '\0' {
        ParseError::new("invalid syntax", span)
    } else {
        ParseError::new(
            format!("invalid character '{c}' (U+{:04X})", c as u32),
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
        super::tokenize(source, 100)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::Op))
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn empty_source_is_just_the_end_marker() {
        assert_eq!(kinds(""), vec![TokenKind::EndMarker]);
        assert_eq!(kinds("\n\n# comment only\n   \n"), vec![TokenKind::EndMarker]);
    }

    #[test]
    fn missing_final_newline_is_synthesized() {
        use TokenKind::*;
        assert_eq!(kinds("x = 1"), vec![Name, Op, Number, Newline, EndMarker]);
    }

    #[test]
    fn indentation_produces_indent_and_dedent() {
        use TokenKind::*;
        let source = "if x:\n    y\n\n    # note\nz\n";
        assert_eq!(
            kinds(source),
            vec![Name, Name, Op, Newline, Indent, Name, Newline, Dedent, Name, Newline, EndMarker]
        );
    }

    #[test]
    fn dedents_are_flushed_at_end_of_input() {
        use TokenKind::*;
        let source = "def f():\n  if x:\n    pass";
        let tokens = kinds(source);
        assert_eq!(&tokens[tokens.len() - 3..], &[Dedent, Dedent, EndMarker]);
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        use TokenKind::*;
        let source = "f(a,\n      b)\n";
        assert_eq!(
            kinds(source),
            vec![Name, Op, Name, Op, Name, Op, Newline, EndMarker]
        );
    }

    #[test]
    fn explicit_line_joining_continues_the_line() {
        assert_eq!(texts("x = 1 + \\\n    2\n"), vec!["x", "=", "1", "+", "2"]);
    }

    #[test]
    fn tabs_advance_to_multiples_of_eight() {
        assert_eq!(indent_width("\t"), 8);
        assert_eq!(indent_width("   \t"), 8);
        assert_eq!(indent_width("\t  "), 10);
    }

    #[test]
    fn numbers_and_strings_are_single_tokens() {
        assert_eq!(
            texts("0x_ff 1_000.5e-3j .5 rb'\\x00' f\"{x}\" '''a\nb'''"),
            vec!["0x_ff", "1_000.5e-3j", ".5", "rb'\\x00'", "f\"{x}\"", "'''a\nb'''"]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(texts("a **= b // c ... d"), vec!["a", "**=", "b", "//", "c", "...", "d"]);
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        let err = tokenize("if x:\n    y\n  z\n").unwrap_err();
        assert_eq!(err.message, "unindent does not match any outer indentation level");
    }

    #[test]
    fn unterminated_strings_are_reported() {
        let err = tokenize("x = 'abc\n").unwrap_err();
        assert_eq!(err.message, "EOL while scanning string literal");
        let err = tokenize("x = \"\"\"abc\n").unwrap_err();
        assert_eq!(err.message, "EOF while scanning triple-quoted string literal");
    }

    #[test]
    fn mismatched_brackets_are_reported() {
        let err = tokenize("(]").unwrap_err();
        assert_eq!(
            err.message,
            "closing parenthesis ']' does not match opening parenthesis '('"
        );
        assert_eq!(tokenize(")").unwrap_err().message, "unmatched ')'");
        assert_eq!(tokenize("(1,").unwrap_err().message, "unexpected EOF while parsing");
    }

    #[test]
    fn open_brackets_are_bounded() {
        assert!(super::tokenize("[[[1]]]", 3).is_ok());
        let err = super::tokenize("f(f(f(f(1))))", 3).unwrap_err();
        assert_eq!(err.message, "too many nested parentheses");
        assert_eq!(err.span, Span::new(7, 8));
    }

    #[test]
    fn stray_characters_are_reported() {
        assert_eq!(tokenize("a ? b").unwrap_err().message, "invalid syntax");
        assert!(tokenize("a = €").unwrap_err().message.starts_with("invalid character"));
    }

    #[test]
    fn embedded_spans_are_shifted() {
        let tokens = tokenize_embedded("a +\n b", 10, 100).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Name, TokenKind::Op, TokenKind::Name, TokenKind::EndMarker]);
        assert_eq!(tokens[0].span, Span::new(10, 11));
    }
}

//! Adjacent string literals and f-strings.
//!
//! Consecutive STRING tokens form one literal. Without an `f` prefix the
//! decoded bodies are concatenated into a single constant; with one, the
//! result is a `JoinedStr` whose pieces are literal text and
//! `FormattedValue` nodes for each `{expression}` field.

use crate::ast::{ConstantValue, Expr, PyString, Span};
use crate::diagnostics::ParseError;
use crate::syntax::literals::{decode_escapes, decode_raw, StringToken};
use crate::syntax::parser::{parse_embedded_expr, PResult, Parser};
use crate::syntax::token::Token;

/// Format specs may hold fields, but those fields may not nest again.
const MAX_SPEC_LEVEL: usize = 2;

impl<'src> Parser<'src> {
    /// Builds the node for a run of adjacent string tokens.
    pub(crate) fn parse_strings(&mut self, tokens: &[Token<'src>]) -> PResult<Expr> {
        let Some(first) = tokens.first() else {
            return Err(self.unexpected());
        };
        let whole = tokens
            .iter()
            .fold(first.span, |span, token| span.to(token.span));
        let parts: Vec<StringToken<'src>> = tokens.iter().map(|t| StringToken::split(t.text)).collect();

        let bytes = parts[0].bytes;
        if parts.iter().any(|part| part.bytes != bytes) {
            return Err(ParseError::new("cannot mix bytes and nonbytes literals", whole));
        }

        if !parts.iter().any(|part| part.formatted) {
            let mut value = PyString::new();
            for (part, token) in parts.iter().zip(tokens) {
                let decoded = part
                    .decode()
                    .map_err(|message| ParseError::new(message, token.span))?;
                value.append(&decoded);
            }
            return Ok(Expr::constant(if bytes {
                // Bytes bodies never decode to surrogates.
                ConstantValue::Bytes(value.to_string_lossy())
            } else {
                ConstantValue::Str(value)
            }));
        }

        let mut pieces = Pieces::default();
        for (part, token) in parts.iter().zip(tokens) {
            if part.formatted {
                let body = FString {
                    text: part.body,
                    base: token.span.start + part.body_offset,
                    raw: part.raw,
                    span: token.span,
                };
                self.parse_fstring_body(&body, 0, &mut pieces)?;
            } else {
                let decoded = part
                    .decode()
                    .map_err(|message| ParseError::new(message, token.span))?;
                pieces.push_decoded(&decoded);
            }
        }
        Ok(Expr::JoinedStr {
            values: pieces.finish(),
        })
    }

    /// Splits an f-string body into literal text and replacement fields.
    fn parse_fstring_body(&mut self, body: &FString<'_>, level: usize, pieces: &mut Pieces) -> PResult<()> {
        let text = body.text;
        let bytes = text.as_bytes();
        let mut chunk_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                // `\N{NAME}` braces belong to the escape.
                b'\\' if !body.raw && bytes.get(i + 1) == Some(&b'N') && bytes.get(i + 2) == Some(&b'{') => {
                    i = text[i..].find('}').map_or(bytes.len(), |end| i + end + 1);
                }
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    body.push_chunk(&text[chunk_start..i], pieces)?;
                    pieces.push_text("{");
                    i += 2;
                    chunk_start = i;
                }
                b'{' => {
                    body.push_chunk(&text[chunk_start..i], pieces)?;
                    i = self.parse_field(body, i + 1, level, pieces)?;
                    chunk_start = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    body.push_chunk(&text[chunk_start..i], pieces)?;
                    pieces.push_text("}");
                    i += 2;
                    chunk_start = i;
                }
                b'}' => {
                    return Err(body.error_at(i, "f-string: single '}' is not allowed"));
                }
                _ => i += 1,
            }
        }
        body.push_chunk(&text[chunk_start.min(text.len())..], pieces)
    }

    /// Parses one `{expr[=][!c][:spec]}` field starting just after the
    /// opening brace. Returns the offset just past the closing brace.
    fn parse_field(
        &mut self,
        body: &FString<'_>,
        start: usize,
        level: usize,
        pieces: &mut Pieces,
    ) -> PResult<usize> {
        if level >= MAX_SPEC_LEVEL {
            return Err(body.error_at(start, "f-string: expressions nested too deeply"));
        }
        let text = body.text;
        let bytes = text.as_bytes();
        let end = find_expression_end(body, start)?;

        let source = &text[start..end];
        if source.trim().is_empty() {
            return Err(body.error_at(start, "f-string: empty expression not allowed"));
        }
        let value = parse_embedded_expr(source, body.base + start, self.max_nesting, self.depth)?;

        let mut i = end;
        let mut debug_text = None;
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
                i += 1;
            }
            debug_text = Some(&text[start..i]);
        }

        let mut conversion = None;
        if bytes.get(i) == Some(&b'!') {
            let Some(c) = text[i + 1..].chars().next() else {
                return Err(body.error_at(i, "f-string: expecting '}'"));
            };
            if !matches!(c, 's' | 'r' | 'a') {
                return Err(body.error_at(
                    i + 1,
                    "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                ));
            }
            conversion = Some(c);
            i += 1 + c.len_utf8();
        }

        let mut format_spec = None;
        if bytes.get(i) == Some(&b':') {
            let spec_start = i + 1;
            let spec_end = find_spec_end(bytes, spec_start);
            let spec = FString {
                text: &text[spec_start..spec_end],
                base: body.base + spec_start,
                raw: body.raw,
                span: body.span,
            };
            let mut spec_pieces = Pieces::default();
            self.parse_fstring_body(&spec, level + 1, &mut spec_pieces)?;
            format_spec = Some(Box::new(Expr::JoinedStr {
                values: spec_pieces.finish(),
            }));
            i = spec_end;
        }

        if bytes.get(i) != Some(&b'}') {
            return Err(body.error_at(i.min(text.len()), "f-string: expecting '}'"));
        }

        if let Some(debug_text) = debug_text {
            pieces.push_text(debug_text);
            if conversion.is_none() && format_spec.is_none() {
                conversion = Some('r');
            }
        }
        pieces.push_value(Expr::FormattedValue {
            value: Box::new(value),
            conversion,
            format_spec,
        });
        Ok(i + 1)
    }
}

/// The body of one f-string token and where it sits in the source.
struct FString<'a> {
    text: &'a str,
    /// Absolute offset of `text` in the source.
    base: usize,
    raw: bool,
    /// The whole token, used to report chunk decoding errors.
    span: Span,
}

impl FString<'_> {
    fn push_chunk(&self, chunk: &str, pieces: &mut Pieces) -> PResult<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let decoded = if self.raw {
            decode_raw(chunk, false).map(PyString::from)
        } else {
            decode_escapes(chunk, false)
        };
        let decoded = decoded.map_err(|message| ParseError::new(message, self.span))?;
        pieces.push_decoded(&decoded);
        Ok(())
    }

    fn error_at(&self, offset: usize, message: &str) -> ParseError {
        let at = self.base + offset;
        ParseError::new(message, Span::new(at, at + 1))
    }
}

/// Finds where the expression of a field ends: the first top-level `}`,
/// `!`, `:` or `=` that is not part of a comparison operator.
fn find_expression_end(body: &FString<'_>, start: usize) -> PResult<usize> {
    let bytes = body.text.as_bytes();
    let mut depth = 0usize;
    // The open quote character and how many of it opened the string.
    let mut quote: Option<(u8, usize)> = None;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            return Err(body.error_at(i, "f-string expression part cannot include a backslash"));
        }
        if let Some((q, run)) = quote {
            if b == q && quote_run(bytes, i, q) >= run {
                quote = None;
                i += run;
            } else {
                i += 1;
            }
            continue;
        }
        let next = bytes.get(i + 1).copied();
        match b {
            b'\'' | b'"' => {
                let run = if quote_run(bytes, i, b) >= 3 { 3 } else { 1 };
                quote = Some((b, run));
                i += run;
                continue;
            }
            b'#' => {
                return Err(body.error_at(i, "f-string expression part cannot include '#'"));
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'}' if depth > 0 => depth -= 1,
            b'=' | b'!' | b'<' | b'>' if next == Some(b'=') => {
                i += 2;
                continue;
            }
            b'}' | b'!' | b':' | b'=' if depth == 0 => return Ok(i),
            _ => {}
        }
        i += 1;
    }

    if quote.is_some() {
        return Err(body.error_at(start, "f-string: unterminated string"));
    }
    Err(body.error_at(bytes.len(), "f-string: expecting '}'"))
}

/// How many `quote` bytes follow `at`, counting at most three.
fn quote_run(bytes: &[u8], at: usize, quote: u8) -> usize {
    bytes[at..].iter().take(3).take_while(|&&b| b == quote).count()
}

/// End of a format spec: the `}` that closes the enclosing field.
fn find_spec_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' if depth == 0 => return start + offset,
            b'}' => depth -= 1,
            _ => {}
        }
    }
    bytes.len()
}

/// Collected `JoinedStr` values; adjacent literal text is merged.
#[derive(Default)]
struct Pieces {
    values: Vec<Expr>,
    text: PyString,
}

impl Pieces {
    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_decoded(&mut self, text: &PyString) {
        self.text.append(text);
    }

    fn push_value(&mut self, value: Expr) {
        self.flush();
        self.values.push(value);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.values.push(Expr::constant(ConstantValue::Str(text)));
        }
    }

    fn finish(mut self) -> Vec<Expr> {
        self.flush();
        self.values
    }
}

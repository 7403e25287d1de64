//! Tokens produced by the lexer and consumed by the parser.

use unicode_normalization::UnicodeNormalization;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Op,
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

/// A token borrowing its text from the source. Spans are absolute byte
/// offsets into the top-level source, even for f-string sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Name && self.text == keyword
    }

    /// A name token that is not a reserved word.
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Name && !is_keyword(self.text)
    }

    /// The identifier a name token spells, NFKC-normalized as Python does.
    pub fn identifier(&self) -> String {
        normalize_identifier(self.text)
    }

    /// Human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indent".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            TokenKind::EndMarker => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub fn normalize_identifier(text: &str) -> String {
    if text.is_ascii() {
        text.to_string()
    } else {
        text.nfkc().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_nfkc_normalized() {
        assert_eq!(normalize_identifier("width"), "width");
        assert_eq!(normalize_identifier("\u{ff57}\u{ff49}\u{ff44}\u{ff54}\u{ff48}"), "width");
        assert_eq!(normalize_identifier("\u{b5}"), "\u{3bc}");
        assert_eq!(normalize_identifier("caf\u{e9}"), "caf\u{e9}");
    }
}

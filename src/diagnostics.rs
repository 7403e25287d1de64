//! # Diagnostics
//!
//! The `miette`-based error type for astgen. A conversion fails in exactly
//! one of two ways:
//!
//! - **Syntax**: the text is not valid Python 3.8. The error carries the
//!   source it came from, the byte span of the offending token and the
//!   1-based line/column, so `miette` can render a labeled snippet.
//! - **Io**: the input file could not be opened or read.
//!
//! The parser itself works with the lightweight [`ParseError`] and only
//! attaches the source once, at the API boundary, via
//! [`ParseError::with_source`].

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

// Type aliases for clarity and brevity
pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification that mirrors the `AstError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Source text does not conform to the grammar.
    Syntax,
    /// The referenced file cannot be opened or read.
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "Syntax",
            ErrorType::Io => "Io",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for every astgen failure mode.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("SyntaxError: {message} (line {line}, column {column})")]
    Syntax {
        message: String,
        /// 1-based line of the error position.
        line: usize,
        /// 1-based column, counted in characters.
        column: usize,
        span: Span,
        src: SourceArc,
    },
    #[error("IOError: cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AstError {
    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            AstError::Syntax { .. } => ErrorType::Syntax,
            AstError::Io { .. } => ErrorType::Io,
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.error_type() == ErrorType::Syntax
    }

    pub fn is_io(&self) -> bool {
        self.error_type() == ErrorType::Io
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AstError::Io {
            path: path.into(),
            source,
        }
    }
}

impl Diagnostic for AstError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            AstError::Syntax { .. } => "astgen::syntax",
            AstError::Io { .. } => "astgen::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            AstError::Syntax { .. } => Some(Box::new("the input must be valid Python 3.8 source")),
            AstError::Io { .. } => Some(Box::new("check that the path exists and is a readable UTF-8 file")),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            AstError::Syntax { src, .. } => Some(&**src),
            AstError::Io { .. } => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            AstError::Syntax { span, src, .. } => {
                let len = src.inner().len();
                let start = span.start.min(len);
                let end = span.end.clamp(start, len);
                let label = LabeledSpan::new(Some("here".into()), start, end - start);
                Some(Box::new(std::iter::once(label)))
            }
            AstError::Io { .. } => None,
        }
    }
}

/// Syntax error raised inside the lexer and parser, before any source
/// context is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Attaches the named source and resolves line/column.
    pub fn with_source(self, name: &str, source: &str) -> AstError {
        let (line, column) = line_and_column(source, self.span.start);
        AstError::Syntax {
            message: self.message,
            line,
            column,
            span: self.span,
            src: Arc::new(NamedSource::new(name, source.to_string())),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.span.start)
    }
}

impl std::error::Error for ParseError {}

/// 1-based line and character column of a byte offset.
pub fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: AstError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_are_one_based() {
        let source = "a = 1\nbb = é + 2\n";
        assert_eq!(line_and_column(source, 0), (1, 1));
        assert_eq!(line_and_column(source, 6), (2, 1));
        // `+` comes after a two-byte character.
        let plus = source.find('+').unwrap();
        assert_eq!(line_and_column(source, plus), (2, 8));
    }

    #[test]
    fn parse_error_gains_location_from_source() {
        let err = ParseError::new("invalid syntax", Span::new(4, 5)).with_source("<string>", "x = )");
        assert_eq!(err.error_type(), ErrorType::Syntax);
        match err {
            AstError::Syntax { line, column, .. } => assert_eq!((line, column), (1, 5)),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}

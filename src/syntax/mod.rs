//! Syntax module for astgen
//!
//! Source text goes through two stages: [`lexer`] turns it into a token
//! stream (pest for the raw tokens, a layout pass for NEWLINE/INDENT/DEDENT)
//! and the recursive-descent [`parser`] builds the typed tree in
//! [`crate::ast`]. Expression rules, f-strings and target validation live
//! in their own files but extend the same `Parser`.

pub mod lexer;
pub mod literals;
pub mod parser;
pub mod token;

mod expressions;
mod fstring;
mod targets;

pub use parser::parse_module;
pub use targets::set_context;

/// Default bound on nested brackets, blocks and unary chains.
///
/// Each bracket level walks the whole precedence chain, so this many levels
/// must fit in a 2 MiB thread stack in an unoptimized build. Raise it only
/// when the parse runs on a larger stack.
pub const DEFAULT_MAX_NESTING: usize = 50;

/// Knobs for a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// How deep brackets, indented blocks and operator chains may nest
    /// before the input is rejected.
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl ParseOptions {
    pub fn with_max_nesting(max_nesting: usize) -> Self {
        Self { max_nesting }
    }
}

//! astgen: Python source to a JSON-ready abstract syntax tree.
//!
//! [`parse_string`] and [`parse_file`] return a [`Document`], a sequence
//! holding one `Module` node whose children are tagged with their `type`.
//! Failures are [`AstError`]s: either a syntax error with its location or
//! an I/O error for unreadable files.

pub use crate::ast::Document;
pub use crate::converter::{parse_file, parse_string, parse_string_with};
pub use crate::diagnostics::{AstError, ErrorType};
pub use crate::syntax::ParseOptions;

pub mod ast;
pub mod cli;
pub mod converter;
pub mod diagnostics;
pub mod logging;
pub mod syntax;

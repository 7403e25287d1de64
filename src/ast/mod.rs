//! AST module for astgen
//!
//! Typed syntax tree for Python source. Every node serializes to a JSON
//! mapping whose first key is `type`; empty sequences and absent optional
//! children are left out of the output.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

pub mod constant;
pub mod expr;
pub mod stmt;

pub use constant::{Constant, ConstantValue, PyString};
pub use expr::{
    Arg, Arguments, BoolOperator, CmpOperator, Comprehension, Expr, ExprContext, Keyword,
    Operator, UnaryOperator,
};
pub use stmt::{Alias, ExceptHandler, Stmt, WithItem};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a byte range in the source code.
///
/// Spans are not part of the serialized tree; they locate tokens and errors.
///
/// # Examples
///
/// ```rust
/// use astgen::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// The root node of every parsed source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type")]
pub struct Module {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Stmt>,
}

/// The result of a parse: an ordered sequence holding exactly one root node.
///
/// Serializes as a JSON array, so an empty source becomes
/// `[{"type": "Module"}]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Module,
}

impl Document {
    pub fn new(root: Module) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Module {
        &self.root
    }

    pub fn into_root(self) -> Module {
        self.root
    }

    /// The node sequence as generic JSON values. `Value` only holds valid
    /// Unicode, so lone surrogates in `str` constants become U+FFFD here;
    /// [`Document::to_json`] keeps them as `\udXXX` escapes.
    pub fn to_value(&self) -> Vec<serde_json::Value> {
        let value = constant::with_replaced_surrogates(|| serde_json::to_value(&self.root));
        vec![value.unwrap_or(serde_json::Value::Null)]
    }

    /// Compact single-line JSON, suitable for JSON-lines output.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.root)?;
        seq.end()
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

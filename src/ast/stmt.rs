//! Statement nodes.

use serde::Serialize;

use super::expr::{Arguments, Expr, Keyword, Operator};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    FunctionDef {
        name: String,
        args: Box<Arguments>,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorator_list: Vec<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        returns: Option<Box<Expr>>,
    },
    AsyncFunctionDef {
        name: String,
        args: Box<Arguments>,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorator_list: Vec<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        returns: Option<Box<Expr>>,
    },
    ClassDef {
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        bases: Vec<Expr>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        keywords: Vec<Keyword>,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        decorator_list: Vec<Expr>,
    },
    Return {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    Delete {
        targets: Vec<Expr>,
    },
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: Operator,
        value: Expr,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
        /// True when the target is a bare, unparenthesized name.
        simple: bool,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<Stmt>,
    },
    AsyncFor {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<Stmt>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<Stmt>,
    },
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
    },
    AsyncWith {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
    },
    Raise {
        #[serde(skip_serializing_if = "Option::is_none")]
        exc: Option<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<Expr>,
    },
    Try {
        body: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        handlers: Vec<ExceptHandler>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<Stmt>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        finalbody: Vec<Stmt>,
    },
    Assert {
        test: Expr,
        #[serde(skip_serializing_if = "Option::is_none")]
        msg: Option<Expr>,
    },
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        /// `None` for `from . import x`.
        #[serde(skip_serializing_if = "Option::is_none")]
        module: Option<String>,
        names: Vec<Alias>,
        /// Number of leading dots.
        level: usize,
    },
    Global {
        names: Vec<String>,
    },
    Nonlocal {
        names: Vec<String>,
    },
    Expr {
        value: Expr,
    },
    Pass,
    Break,
    Continue,
}

/// An imported name with its optional `as` binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "alias")]
pub struct Alias {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "withitem")]
pub struct WithItem {
    pub context_expr: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_vars: Option<Expr>,
}

/// An `except` clause. The caught expression is written as `exception`
/// because `type` is taken by the node tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExceptHandler")]
pub struct ExceptHandler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_statements_serialize_with_tag_only() {
        assert_eq!(serde_json::to_value(Stmt::Pass).unwrap(), json!({"type": "Pass"}));
    }

    #[test]
    fn bare_except_omits_exception_and_name() {
        let handler = ExceptHandler {
            exception: None,
            name: None,
            body: vec![Stmt::Pass],
        };
        assert_eq!(
            serde_json::to_value(handler).unwrap(),
            json!({"type": "ExceptHandler", "body": [{"type": "Pass"}]})
        );
    }
}

//! Expression nodes and the operator/context tags they carry.

use serde::Serialize;

use super::constant::{Constant, ConstantValue};
use super::is_false;

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr>,
    },
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Lambda {
        args: Box<Arguments>,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Dict {
        /// `None` marks a `**mapping` unpacking entry.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        keys: Vec<Option<Expr>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        values: Vec<Expr>,
    },
    Set {
        elts: Vec<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Await {
        value: Box<Expr>,
    },
    Yield {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Box<Expr>>,
    },
    YieldFrom {
        value: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOperator>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        keywords: Vec<Keyword>,
    },
    FormattedValue {
        value: Box<Expr>,
        #[serde(skip_serializing_if = "Option::is_none")]
        conversion: Option<char>,
        #[serde(skip_serializing_if = "Option::is_none")]
        format_spec: Option<Box<Expr>>,
    },
    JoinedStr {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        values: Vec<Expr>,
    },
    Constant(Constant),
    Attribute {
        value: Box<Expr>,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
        ctx: ExprContext,
    },
    Starred {
        value: Box<Expr>,
        ctx: ExprContext,
    },
    Name {
        id: String,
        ctx: ExprContext,
    },
    List {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        elts: Vec<Expr>,
        ctx: ExprContext,
    },
    Tuple {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        elts: Vec<Expr>,
        ctx: ExprContext,
    },
    Slice {
        #[serde(skip_serializing_if = "Option::is_none")]
        lower: Option<Box<Expr>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        upper: Option<Box<Expr>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<Box<Expr>>,
    },
}

impl Expr {
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name {
            id: id.into(),
            ctx: ExprContext::Load,
        }
    }

    pub fn constant(value: ConstantValue) -> Self {
        Expr::Constant(Constant::new(value))
    }

    /// How the node is named in "cannot assign to ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::BoolOp { .. } | Expr::BinOp { .. } | Expr::UnaryOp { .. } => "operator",
            Expr::NamedExpr { .. } => "named expression",
            Expr::Lambda { .. } => "lambda",
            Expr::IfExp { .. } => "conditional expression",
            Expr::Dict { .. } => "dict display",
            Expr::Set { .. } => "set display",
            Expr::ListComp { .. } => "list comprehension",
            Expr::SetComp { .. } => "set comprehension",
            Expr::DictComp { .. } => "dict comprehension",
            Expr::GeneratorExp { .. } => "generator expression",
            Expr::Await { .. } => "await expression",
            Expr::Yield { .. } | Expr::YieldFrom { .. } => "yield expression",
            Expr::Compare { .. } => "comparison",
            Expr::Call { .. } => "function call",
            Expr::FormattedValue { .. } | Expr::JoinedStr { .. } => "f-string expression",
            Expr::Constant(c) => match c.value {
                ConstantValue::None => "None",
                ConstantValue::Bool(true) => "True",
                ConstantValue::Bool(false) => "False",
                ConstantValue::Ellipsis => "Ellipsis",
                _ => "literal",
            },
            Expr::Attribute { .. } => "attribute",
            Expr::Subscript { .. } => "subscript",
            Expr::Starred { .. } => "starred",
            Expr::Name { .. } => "name",
            Expr::List { .. } => "list",
            Expr::Tuple { .. } => "tuple",
            Expr::Slice { .. } => "slice",
        }
    }
}

/// Load/store/delete context of names, attributes, subscripts and displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ExprContext {
    Load,
    Store,
    Del,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum BoolOperator {
    And,
    Or,
}

/// Binary and augmented-assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Operator {
    /// Maps an operator token (`+`, `//`, ...) to its node.
    pub fn from_token(text: &str) -> Option<Self> {
        let op = match text {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mult,
            "@" => Operator::MatMult,
            "/" => Operator::Div,
            "%" => Operator::Mod,
            "**" => Operator::Pow,
            "<<" => Operator::LShift,
            ">>" => Operator::RShift,
            "|" => Operator::BitOr,
            "^" => Operator::BitXor,
            "&" => Operator::BitAnd,
            "//" => Operator::FloorDiv,
            _ => return None,
        };
        Some(op)
    }

    /// Maps an augmented assignment token (`+=`, `//=`, ...) to its operator.
    pub fn from_augmented(text: &str) -> Option<Self> {
        text.strip_suffix('=').and_then(Self::from_token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Parameter list of a function or lambda.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "arguments")]
pub struct Arguments {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub posonlyargs: Vec<Arg>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vararg: Option<Box<Arg>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kwonlyargs: Vec<Arg>,
    /// One entry per keyword-only parameter; `None` when it has no default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kw_defaults: Vec<Option<Expr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwarg: Option<Box<Arg>>,
    /// Defaults of the trailing positional parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "arg")]
pub struct Arg {
    pub arg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Box<Expr>>,
}

/// A `name=value` call argument; `arg` is `None` for `**mapping`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "keyword")]
pub struct Keyword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    pub value: Expr,
}

/// One `for ... in ... if ...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "comprehension")]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ifs: Vec<Expr>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_async: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operators_serialize_as_nodes() {
        let expr = Expr::BinOp {
            left: Box::new(Expr::name("a")),
            op: Operator::FloorDiv,
            right: Box::new(Expr::name("b")),
        };
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({
                "type": "BinOp",
                "left": {"type": "Name", "id": "a", "ctx": {"type": "Load"}},
                "op": {"type": "FloorDiv"},
                "right": {"type": "Name", "id": "b", "ctx": {"type": "Load"}}
            })
        );
    }

    #[test]
    fn augmented_tokens_map_to_operators() {
        assert_eq!(Operator::from_augmented("**="), Some(Operator::Pow));
        assert_eq!(Operator::from_augmented("=="), None);
    }

    #[test]
    fn empty_arguments_keep_only_the_tag() {
        let value = serde_json::to_value(Arguments::default()).unwrap();
        assert_eq!(value, json!({"type": "arguments"}));
    }
}

//! astgen Parser - expressions
//!
//! One method per precedence level, from `test` (conditional expressions
//! and lambdas) down to atoms and their trailers. Binary levels share
//! [`Parser::parse_binary`], which folds operators to the left.

use crate::ast::{
    BoolOperator, CmpOperator, Comprehension, ConstantValue, Expr, ExprContext, Keyword, Operator,
    UnaryOperator,
};
use crate::diagnostics::ParseError;
use crate::syntax::literals::parse_number;
use crate::syntax::parser::{PResult, Parser};
use crate::syntax::targets::set_context;
use crate::syntax::token::{is_keyword, TokenKind};

const TOO_DEEP: &str = "too many levels of nesting";
const TOO_MANY_PARENS: &str = "too many nested parentheses";

impl<'src> Parser<'src> {
    /// Whether the current token can begin an expression.
    pub(crate) fn starts_expression(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Number | TokenKind::String => true,
            TokenKind::Name => {
                !is_keyword(token.text)
                    || matches!(token.text, "None" | "True" | "False" | "not" | "lambda" | "await")
            }
            TokenKind::Op => matches!(token.text, "(" | "[" | "{" | "-" | "+" | "~" | "..." | "*"),
            _ => false,
        }
    }

    fn at_comprehension(&self) -> bool {
        self.at_keyword("for") || (self.at_keyword("async") && self.peek_nth(1).is_keyword("for"))
    }

    // ========================================================================
    // LISTS OF EXPRESSIONS
    // ========================================================================

    /// `(test|star_expr) (',' (test|star_expr))* [',']`
    pub(crate) fn parse_testlist_star_expr(&mut self) -> PResult<Expr> {
        self.parse_tuple_of(Self::parse_star_or_test)
    }

    /// `test (',' test)* [',']`
    pub(crate) fn parse_testlist(&mut self) -> PResult<Expr> {
        self.parse_tuple_of(Self::parse_test)
    }

    /// `(expr|star_expr) (',' (expr|star_expr))* [',']`, as a tuple when
    /// there is a comma.
    pub(crate) fn parse_exprlist(&mut self) -> PResult<Expr> {
        self.parse_tuple_of(Self::parse_star_or_expr)
    }

    /// The items of an exprlist, and whether they formed a tuple.
    pub(crate) fn parse_exprlist_items(&mut self) -> PResult<(Vec<Expr>, bool)> {
        let mut items = vec![self.parse_star_or_expr()?];
        let mut comma = false;
        while self.eat_op(",") {
            comma = true;
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_star_or_expr()?);
        }
        Ok((items, comma))
    }

    fn parse_tuple_of(&mut self, item: fn(&mut Self) -> PResult<Expr>) -> PResult<Expr> {
        let first = item(self)?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if !self.starts_expression() {
                break;
            }
            elts.push(item(self)?);
        }
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    fn parse_star_or_test(&mut self) -> PResult<Expr> {
        if self.at_op("*") {
            self.parse_star_expr()
        } else {
            self.parse_test()
        }
    }

    fn parse_star_or_expr(&mut self) -> PResult<Expr> {
        if self.at_op("*") {
            self.parse_star_expr()
        } else {
            self.parse_bitor()
        }
    }

    fn parse_star_or_namedexpr(&mut self) -> PResult<Expr> {
        if self.at_op("*") {
            self.parse_star_expr()
        } else {
            self.parse_namedexpr_test()
        }
    }

    /// `'*' expr`
    fn parse_star_expr(&mut self) -> PResult<Expr> {
        self.expect_op("*")?;
        let value = self.parse_bitor()?;
        Ok(Expr::Starred {
            value: Box::new(value),
            ctx: ExprContext::Load,
        })
    }

    // ========================================================================
    // TEST, LAMBDA, BOOLEAN OPERATORS
    // ========================================================================

    /// `test [':=' test]`, the target of `:=` must be a plain name.
    pub(crate) fn parse_namedexpr_test(&mut self) -> PResult<Expr> {
        let start = self.peek();
        let expr = self.parse_test()?;
        if !self.eat_op(":=") {
            return Ok(expr);
        }
        let target = match expr {
            Expr::Name { id, .. } => Expr::Name {
                id,
                ctx: ExprContext::Store,
            },
            other => {
                return Err(ParseError::new(
                    format!("cannot use assignment expressions with {}", other.describe()),
                    start.span,
                ))
            }
        };
        let value = self.parse_test()?;
        Ok(Expr::NamedExpr {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// `or_test ['if' or_test 'else' test] | lambdef`
    pub(crate) fn parse_test(&mut self) -> PResult<Expr> {
        if self.at_keyword("lambda") {
            return self.parse_lambda(false);
        }
        let body = self.parse_or_test()?;
        if !self.eat_keyword("if") {
            return Ok(body);
        }
        let test = self.parse_or_test()?;
        self.expect_keyword("else")?;
        let orelse = self.nested(TOO_DEEP, Self::parse_test)?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    /// `or_test | lambdef_nocond`, used after `if` in comprehensions.
    fn parse_test_nocond(&mut self) -> PResult<Expr> {
        if self.at_keyword("lambda") {
            self.parse_lambda(true)
        } else {
            self.parse_or_test()
        }
    }

    fn parse_lambda(&mut self, nocond: bool) -> PResult<Expr> {
        self.expect_keyword("lambda")?;
        let args = self.parse_parameters(":", false)?;
        self.expect_op(":")?;
        let body = self.nested(TOO_DEEP, |p| {
            if nocond {
                p.parse_test_nocond()
            } else {
                p.parse_test()
            }
        })?;
        Ok(Expr::Lambda {
            args: Box::new(args),
            body: Box::new(body),
        })
    }

    fn parse_or_test(&mut self) -> PResult<Expr> {
        self.parse_bool_op("or", BoolOperator::Or, Self::parse_and_test)
    }

    fn parse_and_test(&mut self) -> PResult<Expr> {
        self.parse_bool_op("and", BoolOperator::And, Self::parse_not_test)
    }

    fn parse_bool_op(
        &mut self,
        keyword: &str,
        op: BoolOperator,
        operand: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let first = operand(self)?;
        if !self.at_keyword(keyword) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword(keyword) {
            values.push(operand(self)?);
        }
        Ok(Expr::BoolOp { op, values })
    }

    fn parse_not_test(&mut self) -> PResult<Expr> {
        if !self.eat_keyword("not") {
            return self.parse_comparison();
        }
        let operand = self.nested(TOO_DEEP, Self::parse_not_test)?;
        Ok(Expr::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
        })
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        loop {
            let token = self.peek();
            let (op, width) = match (token.kind, token.text) {
                (TokenKind::Op, "<") => (CmpOperator::Lt, 1),
                (TokenKind::Op, ">") => (CmpOperator::Gt, 1),
                (TokenKind::Op, "==") => (CmpOperator::Eq, 1),
                (TokenKind::Op, ">=") => (CmpOperator::GtE, 1),
                (TokenKind::Op, "<=") => (CmpOperator::LtE, 1),
                (TokenKind::Op, "!=") => (CmpOperator::NotEq, 1),
                (TokenKind::Name, "in") => (CmpOperator::In, 1),
                (TokenKind::Name, "not") if self.peek_nth(1).is_keyword("in") => {
                    (CmpOperator::NotIn, 2)
                }
                (TokenKind::Name, "is") if self.peek_nth(1).is_keyword("not") => {
                    (CmpOperator::IsNot, 2)
                }
                (TokenKind::Name, "is") => (CmpOperator::Is, 1),
                _ => break,
            };
            for _ in 0..width {
                self.advance();
            }
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }

        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::Compare {
            left: Box::new(left),
            ops,
            comparators,
        })
    }

    // ========================================================================
    // ARITHMETIC AND BITWISE OPERATORS
    // ========================================================================

    /// `xor_expr ('|' xor_expr)*`, the grammar's `expr` rule.
    pub(crate) fn parse_bitor(&mut self) -> PResult<Expr> {
        self.parse_binary(&["|"], Self::parse_xor)
    }

    fn parse_xor(&mut self) -> PResult<Expr> {
        self.parse_binary(&["^"], Self::parse_bitand)
    }

    fn parse_bitand(&mut self) -> PResult<Expr> {
        self.parse_binary(&["&"], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> PResult<Expr> {
        self.parse_binary(&["<<", ">>"], Self::parse_arith)
    }

    fn parse_arith(&mut self) -> PResult<Expr> {
        self.parse_binary(&["+", "-"], Self::parse_term)
    }

    fn parse_term(&mut self) -> PResult<Expr> {
        self.parse_binary(&["*", "@", "/", "%", "//"], Self::parse_factor)
    }

    fn parse_binary(
        &mut self,
        operators: &[&str],
        operand: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let mut left = operand(self)?;
        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Op if operators.contains(&token.text) => Operator::from_token(token.text),
                _ => None,
            };
            let Some(op) = op else {
                break;
            };
            self.advance();
            let right = operand(self)?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `('+'|'-'|'~') factor | power`
    fn parse_factor(&mut self) -> PResult<Expr> {
        let token = self.peek();
        let op = match (token.kind, token.text) {
            (TokenKind::Op, "+") => UnaryOperator::UAdd,
            (TokenKind::Op, "-") => UnaryOperator::USub,
            (TokenKind::Op, "~") => UnaryOperator::Invert,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.nested(TOO_DEEP, Self::parse_factor)?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    /// `atom_expr ['**' factor]`; `**` binds tighter than a unary operator
    /// on its left and looser than one on its right.
    fn parse_power(&mut self) -> PResult<Expr> {
        let base = self.parse_atom_expr()?;
        if !self.eat_op("**") {
            return Ok(base);
        }
        let exponent = self.nested(TOO_DEEP, Self::parse_factor)?;
        Ok(Expr::BinOp {
            left: Box::new(base),
            op: Operator::Pow,
            right: Box::new(exponent),
        })
    }

    // ========================================================================
    // ATOMS AND TRAILERS
    // ========================================================================

    /// `['await'] atom trailer*`
    fn parse_atom_expr(&mut self) -> PResult<Expr> {
        if self.eat_keyword("await") {
            let value = self.parse_atom()?;
            let value = self.parse_trailers(value)?;
            return Ok(Expr::Await {
                value: Box::new(value),
            });
        }
        let atom = self.parse_atom()?;
        self.parse_trailers(atom)
    }

    fn parse_trailers(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            if self.at_op("(") {
                let (args, keywords) = self.nested(TOO_MANY_PARENS, |p| {
                    p.advance();
                    let arguments = p.parse_arglist()?;
                    p.expect_op(")")?;
                    Ok(arguments)
                })?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                    keywords,
                };
            } else if self.at_op("[") {
                let slice = self.nested(TOO_MANY_PARENS, |p| {
                    p.advance();
                    let slice = p.parse_subscriptlist()?;
                    p.expect_op("]")?;
                    Ok(slice)
                })?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    slice: Box::new(slice),
                    ctx: ExprContext::Load,
                };
            } else if self.eat_op(".") {
                let attr = self.expect_identifier()?;
                expr = Expr::Attribute {
                    value: Box::new(expr),
                    attr,
                    ctx: ExprContext::Load,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::Op => match token.text {
                "(" | "[" | "{" => self.nested(TOO_MANY_PARENS, Self::parse_bracketed),
                "..." => {
                    self.advance();
                    Ok(Expr::constant(ConstantValue::Ellipsis))
                }
                _ => Err(self.unexpected()),
            },
            TokenKind::Number => {
                self.advance();
                let value =
                    parse_number(token.text).map_err(|message| ParseError::new(message, token.span))?;
                Ok(Expr::constant(value))
            }
            TokenKind::String => {
                let mut strings = Vec::new();
                while self.peek().kind == TokenKind::String {
                    strings.push(self.advance());
                }
                self.parse_strings(&strings)
            }
            TokenKind::Name => {
                let value = match token.text {
                    "None" => ConstantValue::None,
                    "True" => ConstantValue::Bool(true),
                    "False" => ConstantValue::Bool(false),
                    text if is_keyword(text) => return Err(self.unexpected()),
                    _ => {
                        self.advance();
                        return Ok(Expr::name(token.identifier()));
                    }
                };
                self.advance();
                Ok(Expr::constant(value))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parenthesized expressions, tuples, generator expressions, list and
    /// dict/set displays and their comprehensions.
    fn parse_bracketed(&mut self) -> PResult<Expr> {
        let open = self.advance();
        match open.text {
            "(" => {
                if self.eat_op(")") {
                    return Ok(Expr::Tuple {
                        elts: Vec::new(),
                        ctx: ExprContext::Load,
                    });
                }
                if self.at_keyword("yield") {
                    let expr = self.parse_yield_expr()?;
                    self.expect_op(")")?;
                    return Ok(expr);
                }
                let (mut elts, generators, comma) = self.parse_testlist_comp(")")?;
                self.expect_op(")")?;
                Ok(match generators {
                    Some(generators) => Expr::GeneratorExp {
                        elt: Box::new(elts.remove(0)),
                        generators,
                    },
                    None if !comma && elts.len() == 1 => elts.remove(0),
                    None => Expr::Tuple {
                        elts,
                        ctx: ExprContext::Load,
                    },
                })
            }
            "[" => {
                if self.eat_op("]") {
                    return Ok(Expr::List {
                        elts: Vec::new(),
                        ctx: ExprContext::Load,
                    });
                }
                let (mut elts, generators, _) = self.parse_testlist_comp("]")?;
                self.expect_op("]")?;
                Ok(match generators {
                    Some(generators) => Expr::ListComp {
                        elt: Box::new(elts.remove(0)),
                        generators,
                    },
                    None => Expr::List {
                        elts,
                        ctx: ExprContext::Load,
                    },
                })
            }
            _ => self.parse_dict_or_set(),
        }
    }

    /// Elements of a parenthesized or bracketed display. Returns the
    /// elements, the comprehension clauses if any, and whether a comma was
    /// seen.
    fn parse_testlist_comp(
        &mut self,
        closing: &str,
    ) -> PResult<(Vec<Expr>, Option<Vec<Comprehension>>, bool)> {
        let first = self.parse_star_or_namedexpr()?;
        if self.at_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            return Ok((vec![first], Some(generators), false));
        }
        let mut elts = vec![first];
        let mut comma = false;
        while self.eat_op(",") {
            comma = true;
            if self.at_op(closing) {
                break;
            }
            elts.push(self.parse_star_or_namedexpr()?);
        }
        Ok((elts, None, comma))
    }

    fn parse_dict_or_set(&mut self) -> PResult<Expr> {
        if self.eat_op("}") {
            return Ok(Expr::Dict {
                keys: Vec::new(),
                values: Vec::new(),
            });
        }

        let mut keys = Vec::new();
        let mut values = Vec::new();
        if self.eat_op("**") {
            keys.push(None);
            values.push(self.parse_bitor()?);
        } else {
            let first = self.parse_star_or_test()?;
            let starred = matches!(first, Expr::Starred { .. });
            if starred || !self.eat_op(":") {
                return self.parse_set_rest(first);
            }
            let value = self.parse_test()?;
            if self.at_comprehension() {
                let generators = self.parse_comprehension_clauses()?;
                self.expect_op("}")?;
                return Ok(Expr::DictComp {
                    key: Box::new(first),
                    value: Box::new(value),
                    generators,
                });
            }
            keys.push(Some(first));
            values.push(value);
        }

        while self.eat_op(",") {
            if self.at_op("}") {
                break;
            }
            if self.eat_op("**") {
                keys.push(None);
                values.push(self.parse_bitor()?);
            } else {
                keys.push(Some(self.parse_test()?));
                self.expect_op(":")?;
                values.push(self.parse_test()?);
            }
        }
        self.expect_op("}")?;
        Ok(Expr::Dict { keys, values })
    }

    fn parse_set_rest(&mut self, first: Expr) -> PResult<Expr> {
        if self.at_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_op("}")?;
            return Ok(Expr::SetComp {
                elt: Box::new(first),
                generators,
            });
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("}") {
                break;
            }
            elts.push(self.parse_star_or_test()?);
        }
        self.expect_op("}")?;
        Ok(Expr::Set { elts })
    }

    /// One or more `[async] for ... in ... [if ...]*` clauses.
    fn parse_comprehension_clauses(&mut self) -> PResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.at_comprehension() {
            let is_async = self.eat_keyword("async");
            self.expect_keyword("for")?;
            let span = self.peek().span;
            let mut target = self.parse_exprlist()?;
            set_context(&mut target, ExprContext::Store, span)?;
            self.expect_keyword("in")?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.eat_keyword("if") {
                ifs.push(self.parse_test_nocond()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }

    /// `subscript (',' subscript)* [',']`; several subscripts form a tuple.
    fn parse_subscriptlist(&mut self) -> PResult<Expr> {
        let first = self.parse_subscript()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("]") {
                break;
            }
            elts.push(self.parse_subscript()?);
        }
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    /// `test | [test] ':' [test] [':' [test]]`
    fn parse_subscript(&mut self) -> PResult<Expr> {
        let lower = if self.at_op(":") {
            None
        } else {
            Some(self.parse_test()?)
        };
        if !self.eat_op(":") {
            return lower.ok_or_else(|| self.unexpected());
        }
        let upper = self.parse_optional_test()?;
        let step = if self.eat_op(":") {
            self.parse_optional_test()?
        } else {
            None
        };
        Ok(Expr::Slice {
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
            step: step.map(Box::new),
        })
    }

    fn parse_optional_test(&mut self) -> PResult<Option<Expr>> {
        if self.starts_expression() && !self.at_op("*") {
            Ok(Some(self.parse_test()?))
        } else {
            Ok(None)
        }
    }

    /// Call arguments up to (not including) the closing parenthesis.
    pub(crate) fn parse_arglist(&mut self) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        while !self.at_op(")") {
            let token = self.peek();
            if self.eat_op("*") {
                if keywords.iter().any(|k| k.arg.is_none()) {
                    return Err(ParseError::new(
                        "iterable argument unpacking follows keyword argument unpacking",
                        token.span,
                    ));
                }
                let value = self.parse_test()?;
                args.push(Expr::Starred {
                    value: Box::new(value),
                    ctx: ExprContext::Load,
                });
            } else if self.eat_op("**") {
                let value = self.parse_test()?;
                keywords.push(Keyword { arg: None, value });
            } else {
                let expr = self.parse_namedexpr_test()?;
                if self.eat_op("=") {
                    let arg = match expr {
                        Expr::Name { id, .. } => id,
                        _ => {
                            return Err(ParseError::new(
                                "expression cannot contain assignment, perhaps you meant \"==\"?",
                                token.span,
                            ))
                        }
                    };
                    let value = self.parse_test()?;
                    keywords.push(Keyword {
                        arg: Some(arg),
                        value,
                    });
                } else if self.at_comprehension() {
                    let generators = self.parse_comprehension_clauses()?;
                    let more_follow = self.at_op(",") && !self.peek_nth(1).is_op(")");
                    if !args.is_empty() || !keywords.is_empty() || more_follow {
                        return Err(ParseError::new(
                            "Generator expression must be parenthesized",
                            token.span,
                        ));
                    }
                    args.push(Expr::GeneratorExp {
                        elt: Box::new(expr),
                        generators,
                    });
                } else {
                    if keywords.iter().any(|k| k.arg.is_none()) {
                        return Err(ParseError::new(
                            "positional argument follows keyword argument unpacking",
                            token.span,
                        ));
                    }
                    if !keywords.is_empty() {
                        return Err(ParseError::new(
                            "positional argument follows keyword argument",
                            token.span,
                        ));
                    }
                    args.push(expr);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }
        Ok((args, keywords))
    }

    /// `'yield' ['from' test | testlist_star_expr]`
    pub(crate) fn parse_yield_expr(&mut self) -> PResult<Expr> {
        self.expect_keyword("yield")?;
        if self.eat_keyword("from") {
            let value = self.parse_test()?;
            return Ok(Expr::YieldFrom {
                value: Box::new(value),
            });
        }
        let value = if self.starts_expression() {
            Some(Box::new(self.parse_testlist_star_expr()?))
        } else {
            None
        };
        Ok(Expr::Yield { value })
    }
}

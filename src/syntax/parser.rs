//! astgen Parser - statements
//!
//! Recursive descent over the token stream produced by the lexer. This file
//! holds the parser state, the token helpers shared with the expression
//! parser, and every statement rule. Expressions live in `expressions.rs`.

use crate::ast::{
    Alias, Arg, Arguments, ExceptHandler, Expr, ExprContext, Module, Operator, Stmt, WithItem,
};
use crate::diagnostics::ParseError;
use crate::syntax::token::{Token, TokenKind};
use crate::syntax::targets::set_context;
use crate::syntax::{lexer, ParseOptions};

pub(crate) type PResult<T> = Result<T, ParseError>;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a complete source file into a module.
pub fn parse_module(source: &str, options: &ParseOptions) -> PResult<Module> {
    let tokens = lexer::tokenize(source, options.max_nesting)?;
    let mut parser = Parser::new(tokens, options.max_nesting, 0);
    parser.parse_file()
}

/// Parses the expression of an f-string replacement field.
///
/// `base` is the absolute offset of `text` in the enclosing source and
/// `depth` the nesting level already used by the enclosing parser.
pub(crate) fn parse_embedded_expr(
    text: &str,
    base: usize,
    max_nesting: usize,
    depth: usize,
) -> PResult<Expr> {
    let tokens = lexer::tokenize_embedded(text, base, max_nesting.saturating_sub(depth))?;
    let mut parser = Parser::new(tokens, max_nesting, depth);
    if parser.peek().kind == TokenKind::EndMarker {
        return Err(parser.error_here("f-string: empty expression not allowed"));
    }
    let expr = if parser.at_keyword("yield") {
        parser.parse_yield_expr()?
    } else {
        parser.parse_testlist_star_expr()?
    };
    if parser.peek().kind != TokenKind::EndMarker {
        return Err(parser.error_here("f-string: invalid syntax"));
    }
    Ok(expr)
}

// ============================================================================
// PARSER STATE AND TOKEN HELPERS
// ============================================================================

pub(crate) struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    pub(crate) depth: usize,
    pub(crate) max_nesting: usize,
}

impl<'src> Parser<'src> {
    fn new(tokens: Vec<Token<'src>>, max_nesting: usize, depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth,
            max_nesting,
        }
    }

    /// The current token. The stream always ends with ENDMARKER, which is
    /// returned for any position past the end.
    pub(crate) fn peek(&self) -> Token<'src> {
        self.peek_nth(0)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Token<'src> {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens
            .get((self.pos + n).min(last))
            .copied()
            .unwrap_or(Token::new(TokenKind::EndMarker, "", Default::default()))
    }

    pub(crate) fn advance(&mut self) -> Token<'src> {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    pub(crate) fn eat_op(&mut self, op: &str) -> bool {
        let found = self.at_op(op);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn expect_op(&mut self, op: &str) -> PResult<Token<'src>> {
        if self.at_op(op) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> PResult<Token<'src>> {
        if self.at_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> PResult<String> {
        let token = self.peek();
        if token.is_identifier() {
            self.pos += 1;
            Ok(token.identifier())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_newline(&mut self) -> PResult<()> {
        if self.peek().kind == TokenKind::Newline {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.peek().span)
    }

    /// The generic error for a token that cannot continue the current rule.
    pub(crate) fn unexpected(&self) -> ParseError {
        let token = self.peek();
        match token.kind {
            TokenKind::Indent => ParseError::new("unexpected indent", token.span),
            TokenKind::EndMarker => ParseError::new("unexpected EOF while parsing", token.span),
            _ => ParseError::new("invalid syntax", token.span),
        }
    }

    /// Runs `rule` one nesting level deeper, failing once the configured
    /// limit is reached.
    pub(crate) fn nested<T>(
        &mut self,
        message: &str,
        rule: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        if self.depth >= self.max_nesting {
            return Err(self.error_here(message));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // FILE AND BLOCKS
    // ========================================================================

    fn parse_file(&mut self) -> PResult<Module> {
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::EndMarker => break,
                TokenKind::Newline => {
                    self.advance();
                }
                _ => body.extend(self.parse_statement()?),
            }
        }
        Ok(Module { body })
    }

    /// A statement line. Simple statements separated by `;` come back as
    /// several nodes.
    fn parse_statement(&mut self) -> PResult<Vec<Stmt>> {
        let token = self.peek();
        if token.kind == TokenKind::Op && token.text == "@" {
            return Ok(vec![self.parse_decorated()?]);
        }
        if token.kind != TokenKind::Name {
            return self.parse_simple_statements();
        }
        let stmt = match token.text {
            "if" => self.parse_if()?,
            "while" => self.parse_while()?,
            "for" => self.parse_for(false)?,
            "try" => self.parse_try()?,
            "with" => self.parse_with(false)?,
            "def" => self.parse_funcdef(Vec::new(), false)?,
            "class" => self.parse_classdef(Vec::new())?,
            "async" => self.parse_async()?,
            _ => return self.parse_simple_statements(),
        };
        Ok(vec![stmt])
    }

    /// `':' suite` where suite is either a simple statement line or an
    /// indented block.
    fn parse_suite(&mut self) -> PResult<Vec<Stmt>> {
        self.expect_op(":")?;
        if self.peek().kind != TokenKind::Newline {
            return self.parse_simple_statements();
        }
        self.advance();
        if self.peek().kind != TokenKind::Indent {
            return Err(self.error_here("expected an indented block"));
        }
        self.advance();
        self.nested("too many levels of nesting", |p| {
            let mut body = Vec::new();
            loop {
                match p.peek().kind {
                    TokenKind::Dedent => {
                        p.advance();
                        break;
                    }
                    TokenKind::EndMarker => break,
                    _ => body.extend(p.parse_statement()?),
                }
            }
            Ok(body)
        })
    }

    // ========================================================================
    // SIMPLE STATEMENTS
    // ========================================================================

    fn parse_simple_statements(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_small_statement()?];
        while self.eat_op(";") {
            if self.peek().kind == TokenKind::Newline {
                break;
            }
            stmts.push(self.parse_small_statement()?);
        }
        self.expect_newline()?;
        Ok(stmts)
    }

    fn parse_small_statement(&mut self) -> PResult<Stmt> {
        let token = self.peek();
        if token.kind == TokenKind::Name {
            match token.text {
                "pass" => {
                    self.advance();
                    return Ok(Stmt::Pass);
                }
                "break" => {
                    self.advance();
                    return Ok(Stmt::Break);
                }
                "continue" => {
                    self.advance();
                    return Ok(Stmt::Continue);
                }
                "return" => {
                    self.advance();
                    let value = if self.starts_expression() {
                        Some(self.parse_testlist_star_expr()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Return { value });
                }
                "raise" => return self.parse_raise(),
                "global" | "nonlocal" => return self.parse_scope_declaration(),
                "del" => return self.parse_del(),
                "assert" => {
                    self.advance();
                    let test = self.parse_test()?;
                    let msg = if self.eat_op(",") {
                        Some(self.parse_test()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Assert { test, msg });
                }
                "import" => return self.parse_import(),
                "from" => return self.parse_import_from(),
                _ => {}
            }
        }
        self.parse_expr_statement()
    }

    fn parse_raise(&mut self) -> PResult<Stmt> {
        self.expect_keyword("raise")?;
        if !self.starts_expression() {
            return Ok(Stmt::Raise {
                exc: None,
                cause: None,
            });
        }
        let exc = self.parse_test()?;
        let cause = if self.eat_keyword("from") {
            Some(self.parse_test()?)
        } else {
            None
        };
        Ok(Stmt::Raise {
            exc: Some(exc),
            cause,
        })
    }

    fn parse_scope_declaration(&mut self) -> PResult<Stmt> {
        let keyword = self.advance();
        let mut names = vec![self.expect_identifier()?];
        while self.eat_op(",") {
            names.push(self.expect_identifier()?);
        }
        Ok(if keyword.text == "global" {
            Stmt::Global { names }
        } else {
            Stmt::Nonlocal { names }
        })
    }

    fn parse_del(&mut self) -> PResult<Stmt> {
        self.expect_keyword("del")?;
        let span = self.peek().span;
        let (mut items, _) = self.parse_exprlist_items()?;
        for item in &mut items {
            set_context(item, ExprContext::Del, span)?;
        }
        Ok(Stmt::Delete { targets: items })
    }

    fn parse_import(&mut self) -> PResult<Stmt> {
        self.expect_keyword("import")?;
        let mut names = vec![self.parse_dotted_alias()?];
        while self.eat_op(",") {
            names.push(self.parse_dotted_alias()?);
        }
        Ok(Stmt::Import { names })
    }

    fn parse_dotted_alias(&mut self) -> PResult<Alias> {
        let name = self.parse_dotted_name()?;
        let asname = if self.eat_keyword("as") {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }

    fn parse_dotted_name(&mut self) -> PResult<String> {
        let mut name = self.expect_identifier()?;
        while self.eat_op(".") {
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    fn parse_import_from(&mut self) -> PResult<Stmt> {
        self.expect_keyword("from")?;
        let mut level = 0;
        loop {
            if self.eat_op(".") {
                level += 1;
            } else if self.eat_op("...") {
                level += 3;
            } else {
                break;
            }
        }
        let module = if self.at_keyword("import") && level > 0 {
            None
        } else {
            Some(self.parse_dotted_name()?)
        };
        self.expect_keyword("import")?;

        if self.eat_op("*") {
            return Ok(Stmt::ImportFrom {
                module,
                names: vec![Alias {
                    name: "*".to_string(),
                    asname: None,
                }],
                level,
            });
        }

        let parenthesized = self.eat_op("(");
        let mut names = vec![self.parse_import_alias()?];
        while self.eat_op(",") {
            if parenthesized && self.at_op(")") {
                break;
            }
            if !parenthesized && self.peek().kind == TokenKind::Newline {
                return Err(self.error_here(
                    "trailing comma not allowed without surrounding parentheses",
                ));
            }
            names.push(self.parse_import_alias()?);
        }
        if parenthesized {
            self.expect_op(")")?;
        }
        Ok(Stmt::ImportFrom {
            module,
            names,
            level,
        })
    }

    fn parse_import_alias(&mut self) -> PResult<Alias> {
        let name = self.expect_identifier()?;
        let asname = if self.eat_keyword("as") {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }

    /// Expression statements, assignments, annotated and augmented
    /// assignments.
    fn parse_expr_statement(&mut self) -> PResult<Stmt> {
        let start = self.peek();
        let first = if self.at_keyword("yield") {
            self.parse_yield_expr()?
        } else {
            self.parse_testlist_star_expr()?
        };

        if self.at_op(":") {
            return self.parse_annotated_assignment(first, start);
        }

        let token = self.peek();
        if token.kind == TokenKind::Op {
            if let Some(op) = Operator::from_augmented(token.text) {
                self.advance();
                let mut target = first;
                if !matches!(
                    target,
                    Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. }
                ) {
                    return Err(ParseError::new(
                        "illegal expression for augmented assignment",
                        start.span,
                    ));
                }
                set_context(&mut target, ExprContext::Store, start.span)?;
                let value = if self.at_keyword("yield") {
                    self.parse_yield_expr()?
                } else {
                    self.parse_testlist()?
                };
                return Ok(Stmt::AugAssign { target, op, value });
            }
        }

        if !self.at_op("=") {
            return Ok(Stmt::Expr { value: first });
        }

        let mut pending = vec![(first, start.span)];
        let mut value = None;
        while self.eat_op("=") {
            let span = self.peek().span;
            let next = if self.at_keyword("yield") {
                self.parse_yield_expr()?
            } else {
                self.parse_testlist_star_expr()?
            };
            if let Some(previous) = value.replace((next, span)) {
                pending.push(previous);
            }
        }
        let Some((value, _)) = value else {
            return Err(self.unexpected());
        };
        let mut targets = Vec::with_capacity(pending.len());
        for (mut target, span) in pending {
            set_context(&mut target, ExprContext::Store, span)?;
            targets.push(target);
        }
        Ok(Stmt::Assign { targets, value })
    }

    fn parse_annotated_assignment(&mut self, target: Expr, start: Token<'src>) -> PResult<Stmt> {
        self.expect_op(":")?;
        let mut target = target;
        match target {
            Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => {}
            Expr::Tuple { .. } => {
                return Err(ParseError::new(
                    "only single target (not tuple) can be annotated",
                    start.span,
                ))
            }
            Expr::List { .. } => {
                return Err(ParseError::new(
                    "only single target (not list) can be annotated",
                    start.span,
                ))
            }
            ref other => {
                return Err(ParseError::new(
                    format!("illegal target for annotation: {}", other.describe()),
                    start.span,
                ))
            }
        }
        // `(x): int` is not simple even though the target is a name.
        let simple = matches!(target, Expr::Name { .. }) && !start.is_op("(");
        set_context(&mut target, ExprContext::Store, start.span)?;
        let annotation = self.parse_test()?;
        let value = if self.eat_op("=") {
            Some(if self.at_keyword("yield") {
                self.parse_yield_expr()?
            } else {
                self.parse_testlist_star_expr()?
            })
        } else {
            None
        };
        Ok(Stmt::AnnAssign {
            target,
            annotation,
            value,
            simple,
        })
    }

    // ========================================================================
    // COMPOUND STATEMENTS
    // ========================================================================

    fn parse_if(&mut self) -> PResult<Stmt> {
        // `if` or `elif`
        self.advance();
        let test = self.parse_namedexpr_test()?;
        let body = self.parse_suite()?;
        let orelse = if self.at_keyword("elif") {
            vec![self.parse_if()?]
        } else if self.eat_keyword("else") {
            self.parse_suite()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { test, body, orelse })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        self.expect_keyword("while")?;
        let test = self.parse_namedexpr_test()?;
        let body = self.parse_suite()?;
        let orelse = self.parse_else_clause()?;
        Ok(Stmt::While { test, body, orelse })
    }

    fn parse_for(&mut self, is_async: bool) -> PResult<Stmt> {
        self.expect_keyword("for")?;
        let span = self.peek().span;
        let mut target = self.parse_exprlist()?;
        set_context(&mut target, ExprContext::Store, span)?;
        self.expect_keyword("in")?;
        let iter = self.parse_testlist()?;
        let body = self.parse_suite()?;
        let orelse = self.parse_else_clause()?;
        Ok(if is_async {
            Stmt::AsyncFor {
                target,
                iter,
                body,
                orelse,
            }
        } else {
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            }
        })
    }

    fn parse_else_clause(&mut self) -> PResult<Vec<Stmt>> {
        if self.eat_keyword("else") {
            self.parse_suite()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        self.expect_keyword("try")?;
        let body = self.parse_suite()?;
        let mut handlers = Vec::new();
        let mut bare_except = None;

        while self.at_keyword("except") {
            let except = self.advance();
            if let Some(span) = bare_except {
                return Err(ParseError::new("default 'except:' must be last", span));
            }
            let (exception, name) = if self.at_op(":") {
                bare_except = Some(except.span);
                (None, None)
            } else {
                let exception = self.parse_test()?;
                let name = if self.eat_keyword("as") {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                (Some(exception), name)
            };
            let body = self.parse_suite()?;
            handlers.push(ExceptHandler {
                exception,
                name,
                body,
            });
        }

        let orelse = if !handlers.is_empty() {
            self.parse_else_clause()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat_keyword("finally") {
            self.parse_suite()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
        })
    }

    fn parse_with(&mut self, is_async: bool) -> PResult<Stmt> {
        self.expect_keyword("with")?;
        let mut items = vec![self.parse_with_item()?];
        while self.eat_op(",") {
            items.push(self.parse_with_item()?);
        }
        let body = self.parse_suite()?;
        Ok(if is_async {
            Stmt::AsyncWith { items, body }
        } else {
            Stmt::With { items, body }
        })
    }

    fn parse_with_item(&mut self) -> PResult<WithItem> {
        let context_expr = self.parse_test()?;
        let optional_vars = if self.eat_keyword("as") {
            let span = self.peek().span;
            let mut target = self.parse_bitor()?;
            set_context(&mut target, ExprContext::Store, span)?;
            Some(target)
        } else {
            None
        };
        Ok(WithItem {
            context_expr,
            optional_vars,
        })
    }

    fn parse_async(&mut self) -> PResult<Stmt> {
        self.expect_keyword("async")?;
        let token = self.peek();
        match token.text {
            "def" if token.kind == TokenKind::Name => self.parse_funcdef(Vec::new(), true),
            "for" if token.kind == TokenKind::Name => self.parse_for(true),
            "with" if token.kind == TokenKind::Name => self.parse_with(true),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_decorated(&mut self) -> PResult<Stmt> {
        let mut decorators = Vec::new();
        while self.eat_op("@") {
            decorators.push(self.parse_decorator()?);
            self.expect_newline()?;
        }
        let token = self.peek();
        match token.text {
            "def" if token.kind == TokenKind::Name => self.parse_funcdef(decorators, false),
            "class" if token.kind == TokenKind::Name => self.parse_classdef(decorators),
            "async" if token.kind == TokenKind::Name && self.peek_nth(1).is_keyword("def") => {
                self.advance();
                self.parse_funcdef(decorators, true)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// `dotted_name [ '(' [arglist] ')' ]`
    fn parse_decorator(&mut self) -> PResult<Expr> {
        let mut expr = Expr::name(self.expect_identifier()?);
        while self.eat_op(".") {
            expr = Expr::Attribute {
                value: Box::new(expr),
                attr: self.expect_identifier()?,
                ctx: ExprContext::Load,
            };
        }
        if self.eat_op("(") {
            let (args, keywords) = self.parse_arglist()?;
            self.expect_op(")")?;
            expr = Expr::Call {
                func: Box::new(expr),
                args,
                keywords,
            };
        }
        Ok(expr)
    }

    fn parse_funcdef(&mut self, decorator_list: Vec<Expr>, is_async: bool) -> PResult<Stmt> {
        self.expect_keyword("def")?;
        let name = self.expect_identifier()?;
        self.expect_op("(")?;
        let args = Box::new(self.parse_parameters(")", true)?);
        self.expect_op(")")?;
        let returns = if self.eat_op("->") {
            Some(Box::new(self.parse_test()?))
        } else {
            None
        };
        let body = self.parse_suite()?;
        Ok(if is_async {
            Stmt::AsyncFunctionDef {
                name,
                args,
                body,
                decorator_list,
                returns,
            }
        } else {
            Stmt::FunctionDef {
                name,
                args,
                body,
                decorator_list,
                returns,
            }
        })
    }

    fn parse_classdef(&mut self, decorator_list: Vec<Expr>) -> PResult<Stmt> {
        self.expect_keyword("class")?;
        let name = self.expect_identifier()?;
        let (bases, keywords) = if self.eat_op("(") {
            let parts = self.parse_arglist()?;
            self.expect_op(")")?;
            parts
        } else {
            (Vec::new(), Vec::new())
        };
        let body = self.parse_suite()?;
        Ok(Stmt::ClassDef {
            name,
            bases,
            keywords,
            body,
            decorator_list,
        })
    }

    /// Parameter lists of `def` (annotated, closed by `)`) and `lambda`
    /// (unannotated, closed by `:`). The closing token is left in place.
    pub(crate) fn parse_parameters(&mut self, closing: &str, annotated: bool) -> PResult<Arguments> {
        let mut arguments = Arguments::default();
        let mut positional: Vec<Arg> = Vec::new();
        let mut seen_slash = false;
        let mut seen_star = false;

        while !self.at_op(closing) {
            let token = self.peek();
            if self.eat_op("/") {
                if seen_slash || seen_star || positional.is_empty() {
                    return Err(ParseError::new("invalid syntax", token.span));
                }
                arguments.posonlyargs = std::mem::take(&mut positional);
                seen_slash = true;
            } else if self.eat_op("**") {
                arguments.kwarg = Some(Box::new(self.parse_parameter(annotated)?));
                self.eat_op(",");
                if !self.at_op(closing) {
                    return Err(self.unexpected());
                }
                break;
            } else if self.eat_op("*") {
                if seen_star {
                    return Err(ParseError::new("invalid syntax", token.span));
                }
                seen_star = true;
                if self.peek().kind == TokenKind::Name {
                    arguments.vararg = Some(Box::new(self.parse_parameter(annotated)?));
                }
            } else {
                let arg = self.parse_parameter(annotated)?;
                let default = if self.eat_op("=") {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                if seen_star {
                    arguments.kwonlyargs.push(arg);
                    arguments.kw_defaults.push(default);
                } else {
                    match default {
                        Some(default) => arguments.defaults.push(default),
                        None if !arguments.defaults.is_empty() => {
                            return Err(ParseError::new(
                                "non-default argument follows default argument",
                                token.span,
                            ))
                        }
                        None => {}
                    }
                    positional.push(arg);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }

        if seen_star && arguments.vararg.is_none() && arguments.kwonlyargs.is_empty() {
            return Err(self.error_here("named arguments must follow bare *"));
        }
        arguments.args = positional;
        Ok(arguments)
    }

    fn parse_parameter(&mut self, annotated: bool) -> PResult<Arg> {
        let arg = self.expect_identifier()?;
        let annotation = if annotated && self.eat_op(":") {
            Some(Box::new(self.parse_test()?))
        } else {
            None
        };
        Ok(Arg { arg, annotation })
    }
}

//! Store/Del context for assignment, deletion and loop targets.

use crate::ast::{Expr, ExprContext, Span};
use crate::diagnostics::ParseError;

/// Rewrites `expr` into a target with the given context, recursing into
/// tuples, lists and starred elements. Anything that cannot be bound fails
/// with Python's "cannot assign to ..."/"cannot delete ..." message.
pub fn set_context(expr: &mut Expr, context: ExprContext, span: Span) -> Result<(), ParseError> {
    match expr {
        Expr::Name { ctx, .. } | Expr::Attribute { ctx, .. } | Expr::Subscript { ctx, .. } => {
            *ctx = context;
            Ok(())
        }
        Expr::Starred { value, ctx } => {
            if context == ExprContext::Del {
                return Err(ParseError::new("cannot delete starred", span));
            }
            *ctx = context;
            set_context(value, context, span)
        }
        Expr::List { elts, ctx } | Expr::Tuple { elts, ctx } => {
            *ctx = context;
            elts.iter_mut()
                .try_for_each(|elt| set_context(elt, context, span))
        }
        other => {
            let verb = match context {
                ExprContext::Del => "delete",
                _ => "assign to",
            };
            Err(ParseError::new(
                format!("cannot {verb} {}", other.describe()),
                span,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConstantValue, Expr};

    #[test]
    fn nested_tuples_become_store_targets() {
        let mut target = Expr::Tuple {
            elts: vec![
                Expr::name("a"),
                Expr::List {
                    elts: vec![Expr::Starred {
                        value: Box::new(Expr::name("b")),
                        ctx: ExprContext::Load,
                    }],
                    ctx: ExprContext::Load,
                },
            ],
            ctx: ExprContext::Load,
        };
        set_context(&mut target, ExprContext::Store, Span::default()).unwrap();

        let Expr::Tuple { elts, ctx } = &target else {
            panic!("expected tuple");
        };
        assert_eq!(*ctx, ExprContext::Store);
        assert!(matches!(&elts[0], Expr::Name { ctx: ExprContext::Store, .. }));
        let Expr::List { elts: inner, .. } = &elts[1] else {
            panic!("expected list");
        };
        let Expr::Starred { value, .. } = &inner[0] else {
            panic!("expected starred");
        };
        assert!(matches!(**value, Expr::Name { ctx: ExprContext::Store, .. }));
    }

    #[test]
    fn literals_cannot_be_assigned() {
        let mut target = Expr::constant(ConstantValue::Int(1));
        let err = set_context(&mut target, ExprContext::Store, Span::default()).unwrap_err();
        assert_eq!(err.message, "cannot assign to literal");

        let mut target = Expr::constant(ConstantValue::None);
        let err = set_context(&mut target, ExprContext::Del, Span::default()).unwrap_err();
        assert_eq!(err.message, "cannot delete None");
    }
}

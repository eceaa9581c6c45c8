//! Sub-language evaluator, shared between the Interpreter and
//! marker-argument extraction. A tagged union over expression shapes
//! rather than a visitor hierarchy: a small hand-written switch is
//! enough for the handful of shapes this evaluator recognizes.
//!
//! This evaluator never executes user code: it only recognizes the
//! literal/identifier/slice/conversion shapes enumerated below and
//! returns an [`EvalResult`] describing what it found. Resolving an
//! `Identifier` result to an actual value is a separate, Loader-backed
//! procedure layered on top in [`super::markers`].

use crate::ast::{Expr, LitKind};
use crate::metadata::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Scalar(Value),
    Slice(Vec<EvalResult>),
    Identifier {
        name: String,
        package_alias: Option<String>,
    },
    Unevaluable,
}

impl EvalResult {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            EvalResult::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

/// Evaluates an expression within the sub-language.
pub fn eval(expr: &Expr) -> EvalResult {
    match expr {
        Expr::BasicLit { kind, value, .. } => eval_basic_lit(*kind, value),
        Expr::Ident { name, .. } => match name.as_str() {
            "true" => EvalResult::Scalar(Value::Bool(true)),
            "false" => EvalResult::Scalar(Value::Bool(false)),
            _ => EvalResult::Identifier {
                name: name.clone(),
                package_alias: None,
            },
        },
        Expr::Selector { x, sel, .. } => match x.as_ref() {
            Expr::Ident { name, .. } => EvalResult::Identifier {
                name: sel.clone(),
                package_alias: Some(name.clone()),
            },
            _ => EvalResult::Unevaluable,
        },
        Expr::Unary { op: '-', x, .. } => match eval(x) {
            EvalResult::Scalar(Value::Int(n)) => EvalResult::Scalar(Value::Int(-n)),
            EvalResult::Scalar(Value::Float(n)) => EvalResult::Scalar(Value::Float(-n)),
            _ => EvalResult::Unevaluable,
        },
        Expr::Unary { op: '+', x, .. } => match eval(x) {
            scalar @ EvalResult::Scalar(Value::Int(_) | Value::Float(_)) => scalar,
            _ => EvalResult::Unevaluable,
        },
        Expr::Composite { elts, .. } => {
            EvalResult::Slice(elts.iter().map(|elt| eval(&elt.value)).collect())
        }
        // A single-argument call is transparent to the evaluator: it
        // covers both type conversions (`string(X)`) and the pointer-
        // default helper pattern `helper(literal)` — in either
        // case the caller only cares about what the argument itself
        // evaluated to.
        Expr::Call { args, .. } if args.len() == 1 => eval(&args[0]),
        _ => EvalResult::Unevaluable,
    }
}

fn eval_basic_lit(kind: LitKind, value: &str) -> EvalResult {
    match kind {
        LitKind::String => EvalResult::Scalar(Value::String(value.to_string())),
        LitKind::Int => value
            .parse::<i64>()
            .map(Value::Int)
            .map(EvalResult::Scalar)
            .unwrap_or(EvalResult::Unevaluable),
        LitKind::Float => value
            .parse::<f64>()
            .map(Value::Float)
            .map(EvalResult::Scalar)
            .unwrap_or(EvalResult::Unevaluable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn eval_src(expr_src: &str) -> EvalResult {
        let src = format!("package main\nvar x = {expr_src}\n");
        let file = parse_file("t.go", &src).unwrap();
        let value_spec = file
            .decls
            .iter()
            .find_map(|d| match d {
                crate::ast::Decl::Gen(g) => g.specs.iter().find_map(|s| match s {
                    crate::ast::Spec::Value(v) => Some(v.clone()),
                    _ => None,
                }),
                _ => None,
            })
            .unwrap();
        eval(&value_spec.values[0])
    }

    #[test]
    fn string_literal() {
        assert_eq!(
            eval_src(r#""guest""#),
            EvalResult::Scalar(Value::String("guest".to_string()))
        );
    }

    #[test]
    fn negated_int_literal() {
        assert_eq!(eval_src("-1"), EvalResult::Scalar(Value::Int(-1)));
    }

    #[test]
    fn qualified_identifier() {
        assert_eq!(
            eval_src("external.Modes"),
            EvalResult::Identifier {
                name: "Modes".to_string(),
                package_alias: Some("external".to_string()),
            }
        );
    }

    #[test]
    fn slice_literal_of_scalars() {
        let got = eval_src(r#"[]string{"debug", "info"}"#);
        assert_eq!(
            got,
            EvalResult::Slice(vec![
                EvalResult::Scalar(Value::String("debug".to_string())),
                EvalResult::Scalar(Value::String("info".to_string())),
            ])
        );
    }

    #[test]
    fn type_conversion_of_literal_passes_through() {
        assert_eq!(
            eval_src(r#"string("x")"#),
            EvalResult::Scalar(Value::String("x".to_string()))
        );
    }

    #[test]
    fn unevaluable_expression() {
        assert_eq!(eval_src("a + b"), EvalResult::Unevaluable);
    }
}

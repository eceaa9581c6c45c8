//! Marker-info extraction: `Default`, `Enum`, `File`,
//! `MustExist`, `GlobPattern`. Recognition goes through the file's
//! import table rather than matching callee names by spelling alone:
//! a call only counts as a marker if its selector's base identifier
//! resolves, via the import table, to the configured marker package
//! path.

use std::sync::Arc;

use crate::ast::{self, Expr};
use crate::errors::Diagnostics;
use crate::loader::{Loader, SymbolKind};
use crate::metadata::{OptionMetadata, Value};

use super::eval::{eval, EvalResult};

pub struct MarkerContext<'a> {
    pub file: &'a ast::File,
    pub package_path: &'a str,
    pub marker_package_path: &'a str,
    pub loader: &'a mut Loader,
    pub diagnostics: &'a mut Diagnostics,
}

/// The package context identifier resolution is currently operating
/// in. Starts at the initializer's own file/package and moves to
/// whichever file/package a resolved symbol was declared in, so an
/// unqualified identifier inside *that* symbol's initializer resolves
/// against *its* package, not the original target file's.
struct Scope {
    package_path: String,
    file: Arc<ast::File>,
}

/// Recognizes `alias.Name(args)` where `alias` resolves to the
/// configured marker package. Returns the marker name and its
/// arguments on success.
pub fn recognize_marker<'e>(
    file: &ast::File,
    marker_package_path: &str,
    expr: &'e Expr,
) -> Option<(&'e str, &'e [Expr])> {
    let (func, args) = match expr {
        Expr::Call { func, args, .. } => (func, args),
        _ => return None,
    };
    let (x, sel) = match func.as_ref() {
        Expr::Selector { x, sel, .. } => (x, sel),
        _ => return None,
    };
    let alias = match x.as_ref() {
        Expr::Ident { name, .. } => name,
        _ => return None,
    };
    if file.import_path_for_alias(alias) == Some(marker_package_path) {
        Some((sel.as_str(), args.as_slice()))
    } else {
        None
    }
}

/// Feeds one field-initializing expression (a composite literal
/// element's value, or a field-assignment's right-hand side) to the
/// marker dispatcher. Non-marker expressions — including calls to an
/// unrelated package's identically-named function —
/// are silently left alone.
pub fn handle_field_expr(option: &mut OptionMetadata, expr: &Expr, mctx: &mut MarkerContext) {
    let (name, args) = match recognize_marker(mctx.file, mctx.marker_package_path, expr) {
        Some(found) => found,
        None => return,
    };
    let scope = Scope {
        package_path: mctx.package_path.to_string(),
        file: Arc::new(mctx.file.clone()),
    };
    match name {
        "Default" => handle_default(option, args, expr.span(), mctx, &scope),
        "Enum" => handle_enum(option, args, expr.span(), mctx, &scope),
        "File" => handle_file(option, args, expr.span(), mctx, &scope),
        other => mctx.diagnostics.info(
            format!("ignoring unrecognized marker `{other}`"),
            Some(expr.span()),
        ),
    }
}

fn handle_default(
    option: &mut OptionMetadata,
    args: &[Expr],
    span: ast::Span,
    mctx: &mut MarkerContext,
    scope: &Scope,
) {
    let value_arg = match args.first() {
        Some(arg) => arg,
        None => {
            mctx.diagnostics
                .warn("Default() called with no arguments", Some(span));
            return;
        }
    };
    match resolve_scalar_arg(value_arg, mctx, scope) {
        Some(value) => option.default_value = Some(value),
        None => mctx.diagnostics.warn(
            format!("could not resolve Default() argument for `{}`", option.name),
            Some(value_arg.span()),
        ),
    }

    if let Some(second) = args.get(1) {
        match recognize_marker(mctx.file, mctx.marker_package_path, second) {
            Some(("Enum", enum_args)) => handle_enum(option, enum_args, second.span(), mctx, scope),
            _ => apply_enum_values_expr(option, second, mctx, scope),
        }
    }
}

fn handle_enum(
    option: &mut OptionMetadata,
    args: &[Expr],
    span: ast::Span,
    mctx: &mut MarkerContext,
    scope: &Scope,
) {
    let values_expr = match args.len() {
        0 => {
            mctx.diagnostics
                .warn("Enum() called with no arguments", Some(span));
            return;
        }
        1 => &args[0],
        _ => &args[1],
    };
    apply_enum_values_expr(option, values_expr, mctx, scope);
}

fn handle_file(
    option: &mut OptionMetadata,
    args: &[Expr],
    span: ast::Span,
    mctx: &mut MarkerContext,
    scope: &Scope,
) {
    let path_arg = match args.first() {
        Some(arg) => arg,
        None => {
            mctx.diagnostics
                .warn("File() called with no arguments", Some(span));
            return;
        }
    };
    option.type_name = "string".to_string();
    match resolve_scalar_arg(path_arg, mctx, scope) {
        Some(value) => option.default_value = Some(value),
        None => mctx.diagnostics.warn(
            format!("could not resolve File() path for `{}`", option.name),
            Some(path_arg.span()),
        ),
    }

    for opt_arg in args.iter().skip(1) {
        match recognize_marker(mctx.file, mctx.marker_package_path, opt_arg) {
            Some(("MustExist", _)) => option.file_must_exist = true,
            Some(("GlobPattern", _)) => option.file_glob_pattern = true,
            Some((other, _)) => mctx.diagnostics.info(
                format!("ignoring unrecognized File() option `{other}`"),
                Some(opt_arg.span()),
            ),
            None => mctx.diagnostics.info(
                "ignoring non-marker argument to File()",
                Some(opt_arg.span()),
            ),
        }
    }
}

/// Evaluates `Default`'s (or `File`'s) first argument: a scalar is
/// used directly, an identifier is resolved to a string constant.
fn resolve_scalar_arg(expr: &Expr, mctx: &mut MarkerContext, scope: &Scope) -> Option<Value> {
    match eval(expr) {
        EvalResult::Scalar(v) => Some(v),
        EvalResult::Identifier { name, package_alias } => {
            resolve_identifier_to_string(mctx, &name, package_alias.as_deref(), scope)
                .map(Value::String)
        }
        _ => None,
    }
}

/// Populates `enumValues`/`isEnum` from an arbitrary enum-values
/// expression: a slice literal (of scalars or identifiers), or an
/// identifier naming a top-level slice-valued variable (the `Enum` marker).
fn apply_enum_values_expr(
    option: &mut OptionMetadata,
    expr: &Expr,
    mctx: &mut MarkerContext,
    scope: &Scope,
) {
    resolve_enum_result(option, eval(expr), expr.span(), mctx, scope);
}

fn resolve_enum_result(
    option: &mut OptionMetadata,
    result: EvalResult,
    span: ast::Span,
    mctx: &mut MarkerContext,
    scope: &Scope,
) {
    match result {
        EvalResult::Slice(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                match element {
                    EvalResult::Scalar(v) => values.push(v.to_string()),
                    EvalResult::Identifier { name, package_alias } => {
                        match resolve_identifier_to_string(
                            mctx,
                            &name,
                            package_alias.as_deref(),
                            scope,
                        ) {
                            Some(s) => values.push(s),
                            None => mctx.diagnostics.warn(
                                format!("dropping unresolved enum value `{name}`"),
                                Some(span.clone()),
                            ),
                        }
                    }
                    EvalResult::Slice(_) | EvalResult::Unevaluable => mctx
                        .diagnostics
                        .warn("dropping non-evaluable enum value", Some(span.clone())),
                }
            }
            option.enum_values = values;
            option.is_enum = !option.enum_values.is_empty();
        }
        EvalResult::Identifier { name, package_alias } => {
            match lookup_symbol(mctx, &name, package_alias.as_deref(), scope) {
                Some(resolved) => {
                    let next_scope = Scope {
                        package_path: resolved.package_path,
                        file: resolved.file,
                    };
                    resolve_enum_result(option, eval(&resolved.value_expr), span, mctx, &next_scope)
                }
                None => mctx.diagnostics.warn(
                    format!("could not resolve enum values identifier `{name}`"),
                    Some(span),
                ),
            }
        }
        EvalResult::Scalar(_) | EvalResult::Unevaluable => {
            mctx.diagnostics
                .warn("enum values argument is not evaluable", Some(span));
        }
    }
}

/// Identifier-resolution-to-string-constant procedure.
fn resolve_identifier_to_string(
    mctx: &mut MarkerContext,
    name: &str,
    package_alias: Option<&str>,
    scope: &Scope,
) -> Option<String> {
    let resolved = lookup_symbol(mctx, name, package_alias, scope)?;
    let next_scope = Scope {
        package_path: resolved.package_path,
        file: resolved.file,
    };
    resolve_string_expr(&resolved.value_expr, mctx, &next_scope)
}

fn resolve_string_expr(expr: &Expr, mctx: &mut MarkerContext, scope: &Scope) -> Option<String> {
    match eval(expr) {
        EvalResult::Scalar(Value::String(s)) => Some(s),
        EvalResult::Identifier { name, package_alias } => {
            resolve_identifier_to_string(mctx, &name, package_alias.as_deref(), scope)
        }
        _ => None,
    }
}

struct ResolvedSymbol {
    value_expr: Expr,
    package_path: String,
    file: Arc<ast::File>,
}

fn lookup_symbol(
    mctx: &mut MarkerContext,
    name: &str,
    package_alias: Option<&str>,
    scope: &Scope,
) -> Option<ResolvedSymbol> {
    let pkgpath = match package_alias {
        None => scope.package_path.clone(),
        Some(alias) => scope.file.import_path_for_alias(alias)?.to_string(),
    };
    let key = format!("{pkgpath}:{name}");
    let symbol = match mctx.loader.lookup_symbol(&key) {
        Ok(Some(symbol)) => symbol,
        Ok(None) => return None,
        Err(e) => {
            mctx.diagnostics
                .warn(format!("failed to load package `{pkgpath}`: {e}"), None);
            return None;
        }
    };
    if !matches!(symbol.kind, SymbolKind::Const | SymbolKind::Var) {
        return None;
    }
    let value_expr = symbol.value_expr?;
    let file = mctx.loader.get_ast(&symbol.declaring_file)?;
    Some(ResolvedSymbol {
        value_expr,
        package_path: symbol.package_path,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ToolchainLocator;
    use crate::parser::parse_file;
    use std::path::PathBuf;

    fn make_loader() -> Loader {
        Loader::new(Box::new(ToolchainLocator::default()), PathBuf::from("."))
    }

    #[test]
    fn recognizes_aliased_marker_call() {
        let src = r#"
package main

import goat "github.com/podhmo/goat"

func f() {
	goat.Default("x")
}
"#;
        let file = parse_file("t.go", src).unwrap();
        let call = match &file.func("f").unwrap().body.as_ref().unwrap().stmts[0] {
            ast::Stmt::Expr(e) => e.clone(),
            _ => panic!("expected expr stmt"),
        };
        let (name, args) = recognize_marker(&file, "github.com/podhmo/goat", &call).unwrap();
        assert_eq!(name, "Default");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn non_marker_package_is_not_recognized() {
        let src = r#"
package main

import "example.com/other"

func f() {
	other.Default("x")
}
"#;
        let file = parse_file("t.go", src).unwrap();
        let call = match &file.func("f").unwrap().body.as_ref().unwrap().stmts[0] {
            ast::Stmt::Expr(e) => e.clone(),
            _ => panic!("expected expr stmt"),
        };
        assert!(recognize_marker(&file, "github.com/podhmo/goat", &call).is_none());
    }

    #[test]
    fn default_from_scalar_literal() {
        let src = r#"
package main

import "github.com/podhmo/goat"

type Options struct {
	Name string
}
"#;
        let file = parse_file("t.go", src).unwrap();
        let mut diagnostics = Diagnostics::new();
        let mut loader = make_loader();
        let mut mctx = MarkerContext {
            file: &file,
            package_path: "example.com/app",
            marker_package_path: "github.com/podhmo/goat",
            loader: &mut loader,
            diagnostics: &mut diagnostics,
        };
        let mut option =
            OptionMetadata::new("Name".into(), "name".into(), "string".into(), 0..0);
        let call_src =
            "package main\nimport \"github.com/podhmo/goat\"\nvar _ = goat.Default(\"guest\")\n";
        let call_file = parse_file("c.go", call_src).unwrap();
        let call_expr = match &call_file.decls[0] {
            ast::Decl::Gen(g) => match &g.specs[0] {
                ast::Spec::Value(v) => v.values[0].clone(),
                _ => panic!(),
            },
            _ => panic!(),
        };
        handle_field_expr(&mut option, &call_expr, &mut mctx);
        assert_eq!(option.default_value, Some(Value::String("guest".to_string())));
        assert!(diagnostics.is_empty());
    }
}

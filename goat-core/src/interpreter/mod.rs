//! Interpreter: walks the initializer function's body,
//! recognizes marker calls, and mutates the Analyzer's option metadata
//! in place.

pub mod eval;
mod markers;

use crate::ast::{self, Expr, Stmt};
use crate::cancel::CancellationToken;
use crate::errors::{Diagnostics, InterpretError};
use crate::loader::Loader;
use crate::metadata::CommandMetadata;

use markers::{handle_field_expr, MarkerContext};

pub struct InterpreterConfig {
    pub initializer_function_name: String,
    pub marker_package_path: String,
}

/// Enriches `metadata` in place by interpreting `file`'s initializer
/// function. Callers only invoke this when an initializer name is
/// configured; an empty name means enrichment is skipped entirely
/// upstream.
pub fn interpret(
    file: &ast::File,
    package_path: &str,
    metadata: &mut CommandMetadata,
    config: &InterpreterConfig,
    loader: &mut Loader,
    cancellation: &CancellationToken,
) -> Result<Diagnostics, InterpretError> {
    let init_func = file
        .func(&config.initializer_function_name)
        .ok_or_else(|| InterpretError::InitializerNotFound {
            name: config.initializer_function_name.clone(),
            file: metadata.name.clone(),
        })?;
    let body = init_func
        .body
        .as_ref()
        .filter(|b| !b.stmts.is_empty())
        .ok_or_else(|| InterpretError::InitializerEmpty {
            name: init_func.name.clone(),
        })?;

    metadata.initializer_function_name = Some(init_func.name.clone());

    let mut diagnostics = Diagnostics::new();
    let mut mctx = MarkerContext {
        file,
        package_path,
        marker_package_path: &config.marker_package_path,
        loader,
        diagnostics: &mut diagnostics,
    };

    for stmt in &body.stmts {
        if cancellation.is_cancelled() {
            return Err(InterpretError::Loader(crate::errors::LoaderError::Cancelled));
        }
        walk_stmt(stmt, metadata, &mut mctx);
    }

    Ok(diagnostics)
}

fn walk_stmt(stmt: &Stmt, metadata: &mut CommandMetadata, mctx: &mut MarkerContext) {
    match stmt {
        Stmt::Return(Some(expr)) => walk_return_value(expr, metadata, mctx),
        Stmt::Assign { lhs, rhs, .. } => walk_field_assign(lhs, rhs, metadata, mctx),
        Stmt::Return(None) => {}
        Stmt::Expr(expr) => mctx.diagnostics.info(
            "ignoring expression statement in initializer",
            Some(expr.span()),
        ),
        Stmt::Other(span) => mctx.diagnostics.info(
            "ignoring unsupported statement in initializer",
            Some(span.clone()),
        ),
    }
}

/// `return &Record{Field: expr, ...}` or `return Record{...}`.
fn walk_return_value(expr: &Expr, metadata: &mut CommandMetadata, mctx: &mut MarkerContext) {
    let options_type = metadata.run_function.options_type.clone();
    match expr {
        Expr::Composite { typ, elts, .. } => {
            let matches_type = match typ {
                Some(t) => t.render_type() == options_type,
                None => true,
            };
            if !matches_type {
                mctx.diagnostics.info(
                    format!("ignoring composite literal not of type `{options_type}`"),
                    Some(expr.span()),
                );
                return;
            }
            for elt in elts {
                let key = match &elt.key {
                    Some(k) => k,
                    None => continue,
                };
                if let Some(option) = metadata.option_mut(key) {
                    handle_field_expr(option, &elt.value, mctx);
                }
            }
        }
        _ => mctx.diagnostics.info(
            "ignoring non-composite-literal return value in initializer",
            Some(expr.span()),
        ),
    }
}

/// `target.Field = expr`.
fn walk_field_assign(lhs: &Expr, rhs: &Expr, metadata: &mut CommandMetadata, mctx: &mut MarkerContext) {
    let field = match lhs {
        Expr::Selector { sel, .. } => sel,
        _ => {
            mctx.diagnostics.info(
                "ignoring assignment whose target is not a field selector",
                Some(lhs.span()),
            );
            return;
        }
    };
    match metadata.option_mut(field) {
        Some(option) => handle_field_expr(option, rhs, mctx),
        None => mctx.diagnostics.info(
            format!("ignoring assignment to unknown field `{field}`"),
            Some(lhs.span()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, AnalyzerConfig};
    use crate::loader::{Loader, ToolchainLocator};
    use crate::parser::parse_file;
    use crate::metadata::Value;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn loader() -> Loader {
        Loader::new(Box::new(ToolchainLocator::default()), PathBuf::from("."))
    }

    fn run_interpret(src: &str, marker_package_path: &str) -> (CommandMetadata, Diagnostics) {
        let file = parse_file("target.go", src).expect("parses");
        let out = analyze("target.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).expect("analyzes");
        let mut metadata = out.metadata;
        let mut loader = loader();
        let config = InterpreterConfig {
            initializer_function_name: "newOptions".to_string(),
            marker_package_path: marker_package_path.to_string(),
        };
        let diagnostics = interpret(
            &file,
            "example.com/app",
            &mut metadata,
            &config,
            &mut loader,
            &CancellationToken::new(),
        )
        .expect("interprets");
        (metadata, diagnostics)
    }

    #[test]
    fn interprets_simple_defaults() {
        let src = r#"
package main

import "github.com/podhmo/goat"

type Options struct {
	Name    string
	Port    int
	Verbose bool
}

func newOptions() *Options {
	return &Options{
		Name:    goat.Default("guest"),
		Port:    goat.Default(8080),
		Verbose: goat.Default(true),
	}
}

func run(opts *Options) error {
	return nil
}
"#;
        let (metadata, _) = run_interpret(src, "github.com/podhmo/goat");
        assert_eq!(
            metadata.options[0].default_value,
            Some(Value::String("guest".to_string()))
        );
        assert_eq!(metadata.options[1].default_value, Some(Value::Int(8080)));
        assert_eq!(metadata.options[2].default_value, Some(Value::Bool(true)));
    }

    #[test]
    fn interprets_enum_with_default() {
        let src = r#"
package main

import "github.com/podhmo/goat"

type Options struct {
	LogLevel string
}

func newOptions() *Options {
	return &Options{
		LogLevel: goat.Default("info", goat.Enum([]string{"debug", "info", "warn", "error"})),
	}
}

func run(opts *Options) error {
	return nil
}
"#;
        let (metadata, _) = run_interpret(src, "github.com/podhmo/goat");
        let opt = &metadata.options[0];
        assert_eq!(opt.default_value, Some(Value::String("info".to_string())));
        assert!(opt.is_enum);
        assert_eq!(
            opt.enum_values,
            vec!["debug", "info", "warn", "error"]
        );
    }

    #[test]
    fn interprets_file_marker() {
        let src = r#"
package main

import "github.com/podhmo/goat"

type Options struct {
	Config string
}

func newOptions() *Options {
	return &Options{
		Config: goat.File("config.yaml", goat.MustExist()),
	}
}

func run(opts *Options) error {
	return nil
}
"#;
        let (metadata, _) = run_interpret(src, "github.com/podhmo/goat");
        let opt = &metadata.options[0];
        assert_eq!(opt.type_name, "string");
        assert_eq!(
            opt.default_value,
            Some(Value::String("config.yaml".to_string()))
        );
        assert!(opt.file_must_exist);
        assert!(!opt.file_glob_pattern);
    }

    #[test]
    fn ignores_non_marker_call() {
        let src = r#"
package main

import "github.com/podhmo/goat"
import "example.com/other"

type Options struct {
	Name string
}

func newOptions() *Options {
	return &Options{
		Name: other.Default("ignored"),
	}
}

func run(opts *Options) error {
	return nil
}
"#;
        let (metadata, _) = run_interpret(src, "github.com/podhmo/goat");
        assert_eq!(metadata.options[0].default_value, None);
    }

    #[test]
    fn resolves_enum_identifier_from_another_package() {
        let src = r#"
package main

import "github.com/podhmo/goat"
import "example.com/external"

type Options struct {
	Mode string
}

func newOptions() *Options {
	return &Options{
		Mode: goat.Enum(external.Modes),
	}
}

func run(opts *Options) error {
	return nil
}
"#;
        let file = parse_file("target.go", src).expect("parses");
        let out = analyze("target.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).expect("analyzes");
        let mut metadata = out.metadata;

        let external_src = r#"
package external

const (
	ModeA Mode = "a"
	ModeB Mode = "b"
)

var Modes = []Mode{ModeA, ModeB}
"#;
        let mut loader = loader();
        loader.set_source("external/external.go", Arc::from(external_src));
        loader.register_package_files(
            "example.com/external".to_string(),
            vec!["external/external.go".to_string()],
        );

        let config = InterpreterConfig {
            initializer_function_name: "newOptions".to_string(),
            marker_package_path: "github.com/podhmo/goat".to_string(),
        };
        interpret(
            &file,
            "example.com/app",
            &mut metadata,
            &config,
            &mut loader,
            &CancellationToken::new(),
        )
        .expect("interprets");

        let opt = &metadata.options[0];
        assert!(opt.is_enum);
        assert_eq!(opt.enum_values, vec!["a", "b"]);
    }

    #[test]
    fn missing_initializer_is_fatal() {
        let src = "package main\n\ntype Options struct {\n\tName string\n}\n\nfunc run(opts Options) error {\n\treturn nil\n}\n";
        let file = parse_file("target.go", src).expect("parses");
        let out = analyze("target.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).expect("analyzes");
        let mut metadata = out.metadata;
        let mut loader = loader();
        let config = InterpreterConfig {
            initializer_function_name: "newOptions".to_string(),
            marker_package_path: "github.com/podhmo/goat".to_string(),
        };
        let err = interpret(
            &file,
            "example.com/app",
            &mut metadata,
            &config,
            &mut loader,
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, InterpretError::InitializerNotFound { .. }));
    }
}

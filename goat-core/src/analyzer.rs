//! Analyzer: from the target file's AST, locates the run
//! function, derives the options record type, and produces an
//! ordered skeleton [`CommandMetadata`] from its fields.

use crate::ast::{self, DeclKind, Expr, Field};
use crate::cancel::CancellationToken;
use crate::casing::kebab_case;
use crate::errors::AnalyzeError;
use crate::metadata::{CommandMetadata, OptionMetadata, RunFuncDescriptor};
use crate::tags::{parse_tag, tag_value};

pub struct AnalyzerConfig {
    pub run_function_name: String,
    pub entry_point_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            run_function_name: "run".to_string(),
            entry_point_name: "main".to_string(),
        }
    }
}

/// Output of [`analyze`]: the metadata skeleton plus the options
/// record's type name, which the Interpreter needs to know which
/// struct literal/assignments to pay attention to.
pub struct AnalyzeOutput {
    pub metadata: CommandMetadata,
    pub options_type_name: String,
}

pub fn analyze(
    file_path: &str,
    file: &ast::File,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<AnalyzeOutput, AnalyzeError> {
    let run_func = file
        .func(&config.run_function_name)
        .ok_or_else(|| AnalyzeError::RunNotFound {
            name: config.run_function_name.clone(),
            file: file_path.to_string(),
        })?;

    if run_func.params.len() != 1 || run_func.results.len() != 1 {
        return Err(AnalyzeError::RunSignature {
            name: config.run_function_name.clone(),
            reason: format!(
                "expected exactly one parameter and one result, found {} parameter(s) and {} result(s)",
                run_func.params.len(),
                run_func.results.len()
            ),
        });
    }
    let result_type = run_func.results[0].typ.render_type();
    if result_type != "error" {
        return Err(AnalyzeError::RunSignature {
            name: config.run_function_name.clone(),
            reason: format!("expected a single `error` result, found `{result_type}`"),
        });
    }

    let (options_by_pointer, options_type_name) = match &run_func.params[0].typ {
        Expr::Star { x, .. } => (true, x.render_type()),
        other => (false, other.render_type()),
    };

    let options_type = file
        .type_decl(&options_type_name)
        .ok_or_else(|| AnalyzeError::OptionsRecordNotFound {
            name: options_type_name.clone(),
            file: file_path.to_string(),
        })?;
    let fields = match &options_type.typ {
        Expr::StructType { fields, .. } => fields,
        _ => {
            return Err(AnalyzeError::OptionsRecordNotFound {
                name: options_type_name.clone(),
                file: file_path.to_string(),
            })
        }
    };

    let mut options = Vec::new();
    for field in fields {
        if cancellation.is_cancelled() {
            return Err(AnalyzeError::Cancelled);
        }
        options.extend(field_to_options(field));
    }

    let entry_point_span = file
        .func(&config.entry_point_name)
        .map(|f| f.span.clone());

    let metadata = CommandMetadata {
        name: file.package.clone(),
        doc_comment: run_func.doc.join(" ").trim().to_string(),
        run_function: RunFuncDescriptor {
            name: run_func.name.clone(),
            options_type: options_type_name.clone(),
            options_by_pointer,
        },
        initializer_function_name: None,
        entry_point_span,
        options,
    };

    Ok(AnalyzeOutput {
        metadata,
        options_type_name,
    })
}

fn field_to_options(field: &Field) -> Vec<OptionMetadata> {
    field
        .names
        .iter()
        .filter(|name| is_exported(name))
        .map(|name| option_from_field(name, field))
        .collect()
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn option_from_field(name: &str, field: &Field) -> OptionMetadata {
    let type_name = field.typ.render_type();
    let is_pointer = matches!(field.typ, Expr::Star { .. });
    let is_slice = matches!(field.typ, Expr::ArrayType { len: None, .. });

    let tag_pairs = field.tag.as_deref().map(parse_tag).unwrap_or_default();
    let env_var = tag_value(&tag_pairs, "env").map(str::to_string);
    let required = match tag_value(&tag_pairs, "required") {
        Some("true") => true,
        Some("false") => false,
        _ => !is_pointer && type_name != "bool",
    };

    let mut option = OptionMetadata::new(
        name.to_string(),
        kebab_case(name),
        type_name,
        field.span.clone(),
    );
    option.is_pointer = is_pointer;
    option.is_slice = is_slice;
    option.help_text = field.doc.join(" ").trim().to_string();
    option.env_var = env_var;
    option.required = required;
    option
}

/// Finds the options record's [`ast::TypeSpec`] field list directly,
/// for callers (the Interpreter) that only have the type name and a
/// file, not an `AnalyzeOutput`.
pub fn struct_fields<'a>(file: &'a ast::File, type_name: &str) -> Option<&'a [Field]> {
    let spec = file.type_decl(type_name)?;
    match &spec.typ {
        Expr::StructType { fields, .. } => Some(fields),
        _ => None,
    }
}

/// True if `decl` is a `type` declaration (used by callers scanning
/// for additional type specs, e.g. the enum-from-variable resolution
/// path in the Interpreter looking up same-file symbols).
pub fn is_type_decl(decl: &ast::Decl) -> bool {
    matches!(decl, ast::Decl::Gen(g) if g.kind == DeclKind::Type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn parse(src: &str) -> ast::File {
        parse_file("test.go", src).expect("parses")
    }

    #[test]
    fn analyzes_simple_defaults() {
        let src = r#"
package main

type Options struct {
	Name    string
	Port    int
	Verbose bool
}

func run(opts Options) error {
	return nil
}
"#;
        let file = parse(src);
        let out = analyze("test.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).unwrap();
        assert_eq!(out.options_type_name, "Options");
        let names: Vec<_> = out.metadata.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Name", "Port", "Verbose"]);
        assert_eq!(out.metadata.options[0].cli_name, "name");
        assert_eq!(out.metadata.options[1].cli_name, "port");
        assert_eq!(out.metadata.options[2].cli_name, "verbose");
        assert!(out.metadata.options[0].required);
        assert!(out.metadata.options[1].required);
        assert!(!out.metadata.options[2].required);
    }

    #[test]
    fn analyzes_optional_pointer_field() {
        let src = r#"
package main

type Options struct {
	Age *int `env:"AGE"`
}

func run(opts *Options) error {
	return nil
}
"#;
        let file = parse(src);
        let out = analyze("test.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).unwrap();
        assert!(out.metadata.run_function.options_by_pointer);
        let age = &out.metadata.options[0];
        assert!(age.is_pointer);
        assert!(!age.required);
        assert_eq!(age.env_var.as_deref(), Some("AGE"));
    }

    #[test]
    fn missing_run_function_is_fatal() {
        let file = parse("package main\n");
        let err = analyze("test.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, AnalyzeError::RunNotFound { .. }));
    }

    #[test]
    fn unexported_fields_are_skipped() {
        let src = r#"
package main

type Options struct {
	Name     string
	internal string
}

func run(opts Options) error {
	return nil
}
"#;
        let file = parse(src);
        let out = analyze("test.go", &file, &AnalyzerConfig::default(), &CancellationToken::new()).unwrap();
        assert_eq!(out.metadata.options.len(), 1);
    }
}

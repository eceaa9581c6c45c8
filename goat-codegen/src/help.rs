//! Formats a `help-message` response from finished metadata.
//! Mirrors the target language's own flag-package convention: a
//! `-name type` line followed by an indented detail line, since goat
//! always analyzes Go-shaped sources.

use std::fmt::Write as _;

use goatcore::metadata::{CommandMetadata, OptionMetadata, Value};

/// Renders the full help text for `metadata`, suitable for printing
/// to stdout by the `help-message` sub-command.
pub fn format_help(metadata: &CommandMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {} [flags]", metadata.name);

    if !metadata.doc_comment.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", metadata.doc_comment);
    }

    if !metadata.options.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Flags:");
        for option in &metadata.options {
            write_flag(&mut out, option);
        }
    }

    out
}

fn write_flag(out: &mut String, option: &OptionMetadata) {
    let _ = write!(out, "  -{}", option.cli_name);
    if option.type_name != "bool" {
        let _ = write!(out, " {}", option.type_name);
    }
    let _ = writeln!(out);

    let detail = flag_detail(option);
    if !detail.is_empty() {
        let _ = writeln!(out, "        {detail}");
    }
}

fn flag_detail(option: &OptionMetadata) -> String {
    let mut parts = Vec::new();
    if !option.help_text.is_empty() {
        parts.push(option.help_text.clone());
    }
    if let Some(default) = &option.default_value {
        parts.push(format!("(default {})", format_default(default)));
    }
    if option.is_enum {
        parts.push(format!("[{}]", option.enum_values.join("|")));
    }
    if let Some(env) = &option.env_var {
        parts.push(format!("(env {env})"));
    }
    if option.required {
        parts.push("(required)".to_string());
    }
    parts.join(" ")
}

fn format_default(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goatcore::ast::Span;
    use goatcore::metadata::{OptionMetadata, RunFuncDescriptor};

    fn span() -> Span {
        0..0
    }

    fn metadata_with(options: Vec<OptionMetadata>) -> CommandMetadata {
        CommandMetadata {
            name: "greeter".to_string(),
            doc_comment: "greets the configured name.".to_string(),
            run_function: RunFuncDescriptor {
                name: "run".to_string(),
                options_type: "Options".to_string(),
                options_by_pointer: false,
            },
            initializer_function_name: Some("newOptions".to_string()),
            entry_point_span: None,
            options,
        }
    }

    #[test]
    fn formats_scalar_default_and_required() {
        let mut name = OptionMetadata::new(
            "Name".to_string(),
            "name".to_string(),
            "string".to_string(),
            span(),
        );
        name.default_value = Some(Value::String("guest".to_string()));
        name.help_text = "the name to greet".to_string();

        let mut verbose = OptionMetadata::new(
            "Verbose".to_string(),
            "verbose".to_string(),
            "bool".to_string(),
            span(),
        );
        verbose.required = false;

        let help = format_help(&metadata_with(vec![name, verbose]));
        assert!(help.starts_with("Usage: greeter [flags]\n"));
        assert!(help.contains("greets the configured name.\n"));
        assert!(help.contains("Flags:\n"));
        assert!(help.contains("  -name string\n"));
        assert!(help.contains("the name to greet (default \"guest\") (required)"));
        assert!(help.contains("  -verbose\n"));
        assert!(!help.contains("-verbose bool"));
    }

    #[test]
    fn enum_flag_lists_choices() {
        let mut level = OptionMetadata::new(
            "LogLevel".to_string(),
            "log-level".to_string(),
            "string".to_string(),
            span(),
        );
        level.default_value = Some(Value::String("info".to_string()));
        level.is_enum = true;
        level.enum_values = vec![
            "debug".to_string(),
            "info".to_string(),
            "warn".to_string(),
            "error".to_string(),
        ];

        let help = format_help(&metadata_with(vec![level]));
        assert!(help.contains("[debug|info|warn|error]"));
        assert!(help.contains("(default \"info\")"));
    }
}

//! Templates a replacement entry-point function from finished
//! metadata. Generates Go source text using the standard library's
//! `flag` package, since every target the core pipeline analyzes is
//! Go-shaped.

use std::fmt::Write as _;

use goatcore::metadata::{CommandMetadata, OptionMetadata, Value};

/// Renders a replacement `func main() { ... }` body that parses flags
/// into the options record, applies environment overrides, validates
/// required/enum constraints, and invokes the run function.
pub fn generate_entry_point(metadata: &CommandMetadata) -> String {
    let mut out = String::new();
    let opts_expr = if metadata.run_function.options_by_pointer {
        "opts"
    } else {
        "*opts"
    };

    let _ = writeln!(out, "func main() {{");
    let _ = writeln!(out, "\topts := &{}{{}}", metadata.run_function.options_type);

    if let Some(initializer) = &metadata.initializer_function_name {
        let _ = writeln!(out, "\topts = {initializer}()");
    }

    let _ = writeln!(
        out,
        "\tfs := flag.NewFlagSet({:?}, flag.ExitOnError)",
        metadata.name
    );
    for option in &metadata.options {
        write_flag_registration(&mut out, option);
    }
    let _ = writeln!(out, "\tfs.Parse(os.Args[1:])");
    let _ = writeln!(out);

    let has_env = metadata.options.iter().any(|o| o.env_var.is_some());
    if has_env {
        let _ = writeln!(out, "\tseen := map[string]bool{{}}");
        let _ = writeln!(out, "\tfs.Visit(func(f *flag.Flag) {{ seen[f.Name] = true }})");
        for option in metadata.options.iter().filter(|o| o.env_var.is_some()) {
            write_env_override(&mut out, option);
        }
        let _ = writeln!(out);
    }

    let enum_options: Vec<&OptionMetadata> = metadata.options.iter().filter(|o| o.is_enum).collect();
    for option in &enum_options {
        write_enum_check(&mut out, option);
    }

    let required: Vec<&OptionMetadata> = metadata.options.iter().filter(|o| o.required).collect();
    if !required.is_empty() {
        write_required_check(&mut out, &required, has_env);
    }

    let _ = writeln!(out, "\tif err := {}({opts_expr}); err != nil {{", metadata.run_function.name);
    let _ = writeln!(out, "\t\tfmt.Fprintln(os.Stderr, err)");
    let _ = writeln!(out, "\t\tos.Exit(1)");
    let _ = writeln!(out, "\t}}");
    let _ = write!(out, "}}");
    out
}

fn write_flag_registration(out: &mut String, option: &OptionMetadata) {
    let field = format!("opts.{}", option.name);
    let dest = format!("&{field}");
    let default_literal = default_literal(option);
    let help = &option.help_text;
    match option.type_name.trim_start_matches('*') {
        "string" => {
            let _ = writeln!(
                out,
                "\tfs.StringVar({dest}, {:?}, {default_literal}, {help:?})",
                option.cli_name
            );
        }
        "int" => {
            let _ = writeln!(
                out,
                "\tfs.IntVar({dest}, {:?}, {default_literal}, {help:?})",
                option.cli_name
            );
        }
        "bool" => {
            let _ = writeln!(
                out,
                "\tfs.BoolVar({dest}, {:?}, {default_literal}, {help:?})",
                option.cli_name
            );
        }
        "float64" => {
            let _ = writeln!(
                out,
                "\tfs.Float64Var({dest}, {:?}, {default_literal}, {help:?})",
                option.cli_name
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "\t// unsupported flag type `{}` for -{}; wire {dest} manually",
                option.type_name, option.cli_name
            );
        }
    }
}

fn default_literal(option: &OptionMetadata) -> String {
    match &option.default_value {
        Some(Value::String(s)) => format!("{s:?}"),
        Some(Value::Int(i)) => i.to_string(),
        Some(Value::Float(f)) => f.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        None => zero_value(&option.type_name),
    }
}

fn zero_value(type_name: &str) -> String {
    match type_name.trim_start_matches('*') {
        "string" => "\"\"".to_string(),
        "int" | "int64" => "0".to_string(),
        "float64" => "0".to_string(),
        "bool" => "false".to_string(),
        _ => "nil".to_string(),
    }
}

fn write_env_override(out: &mut String, option: &OptionMetadata) {
    let env = option.env_var.as_deref().unwrap_or_default();
    let field = format!("opts.{}", option.name);
    let _ = writeln!(out, "\tif v, ok := os.LookupEnv({env:?}); ok && !seen[{:?}] {{", option.cli_name);
    match option.type_name.trim_start_matches('*') {
        "string" => {
            let _ = writeln!(out, "\t\t{field} = v");
        }
        "int" => {
            let _ = writeln!(out, "\t\tif n, err := strconv.Atoi(v); err == nil {{ {field} = n }}");
        }
        "bool" => {
            let _ = writeln!(out, "\t\tif b, err := strconv.ParseBool(v); err == nil {{ {field} = b }}");
        }
        "float64" => {
            let _ = writeln!(out, "\t\tif n, err := strconv.ParseFloat(v, 64); err == nil {{ {field} = n }}");
        }
        _ => {
            let _ = writeln!(out, "\t\t{field} = v // unsupported type `{}`, passed through as string", option.type_name);
        }
    }
    let _ = writeln!(out, "\t}}");
}

fn write_enum_check(out: &mut String, option: &OptionMetadata) {
    let field = format!("opts.{}", option.name);
    let values = option
        .enum_values
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "\t{{");
    let _ = writeln!(out, "\t\tvalid := map[string]bool{{}}");
    let _ = writeln!(out, "\t\tfor _, v := range []string{{{values}}} {{ valid[v] = true }}");
    let _ = writeln!(out, "\t\tif !valid[{field}] {{");
    let _ = writeln!(
        out,
        "\t\t\tfmt.Fprintf(os.Stderr, \"invalid value %q for -{}: must be one of {values}\\n\", {field})",
        option.cli_name
    );
    let _ = writeln!(out, "\t\t\tos.Exit(1)");
    let _ = writeln!(out, "\t\t}}");
    let _ = writeln!(out, "\t}}");
}

fn write_required_check(out: &mut String, required: &[&OptionMetadata], has_env: bool) {
    if !has_env {
        let _ = writeln!(out, "\tseen := map[string]bool{{}}");
        let _ = writeln!(out, "\tfs.Visit(func(f *flag.Flag) {{ seen[f.Name] = true }})");
    }
    let _ = writeln!(out, "\tvar missing []string");
    for option in required {
        let field = format!("opts.{}", option.name);
        let zero = zero_value(&option.type_name);
        let _ = writeln!(
            out,
            "\tif !seen[{:?}] && {field} == {zero} {{ missing = append(missing, \"-{}\") }}",
            option.cli_name, option.cli_name
        );
    }
    let _ = writeln!(out, "\tif len(missing) > 0 {{");
    let _ = writeln!(
        out,
        "\t\tfmt.Fprintf(os.Stderr, \"missing required flags: %s\\n\", strings.Join(missing, \", \"))"
    );
    let _ = writeln!(out, "\t\tos.Exit(1)");
    let _ = writeln!(out, "\t}}");
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use goatcore::ast::Span;
    use goatcore::metadata::{OptionMetadata, RunFuncDescriptor};

    fn span() -> Span {
        0..0
    }

    fn base_metadata() -> CommandMetadata {
        CommandMetadata {
            name: "greeter".to_string(),
            doc_comment: String::new(),
            run_function: RunFuncDescriptor {
                name: "run".to_string(),
                options_type: "Options".to_string(),
                options_by_pointer: true,
            },
            initializer_function_name: Some("newOptions".to_string()),
            entry_point_span: None,
            options: Vec::new(),
        }
    }

    #[test]
    fn generates_flag_registration_and_invocation() {
        let mut name = OptionMetadata::new(
            "Name".to_string(),
            "name".to_string(),
            "string".to_string(),
            span(),
        );
        name.default_value = Some(Value::String("guest".to_string()));

        let mut metadata = base_metadata();
        metadata.options.push(name);

        let generated = generate_entry_point(&metadata);
        assert!(generated.starts_with("func main() {"));
        assert!(generated.contains("opts := &Options{}"));
        assert!(generated.contains("opts = newOptions()"));
        assert!(generated.contains(r#"fs.StringVar(&opts.Name, "name", "guest", "")"#));
        assert!(generated.contains("fs.Parse(os.Args[1:])"));
        assert!(generated.contains("if err := run(opts); err != nil {"));
        assert!(generated.ends_with('}'));
    }

    #[test]
    fn required_field_without_default_is_checked_after_parse() {
        let mut port = OptionMetadata::new(
            "Port".to_string(),
            "port".to_string(),
            "int".to_string(),
            span(),
        );
        port.required = true;

        let mut metadata = base_metadata();
        metadata.options.push(port);

        let generated = generate_entry_point(&metadata);
        assert!(generated.contains("missing = append(missing, \"-port\")"));
        assert!(generated.contains("missing required flags"));
    }

    #[test]
    fn env_var_override_only_applies_when_flag_not_set() {
        let mut level = OptionMetadata::new(
            "LogLevel".to_string(),
            "log-level".to_string(),
            "string".to_string(),
            span(),
        );
        level.env_var = Some("LOG_LEVEL".to_string());
        level.is_enum = true;
        level.enum_values = vec!["debug".to_string(), "info".to_string()];
        level.default_value = Some(Value::String("info".to_string()));

        let mut metadata = base_metadata();
        metadata.options.push(level);

        let generated = generate_entry_point(&metadata);
        assert!(generated.contains(r#"os.LookupEnv("LOG_LEVEL")"#));
        assert!(generated.contains("!seen[\"log-level\"]"));
        assert!(generated.contains("valid[opts.LogLevel]"));
    }
}

//! The pipeline's output record (`CommandMetadata`/`OptionMetadata`,
//! stable JSON shape). `CommandMetadata` is built by the Analyzer,
//! mutated in place by the Interpreter, then handed out read-only.

use serde::Serialize;

use crate::ast::Span;

/// A scalar value in the host-neutral value domain the evaluator
/// produces (`EvalResult`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One field of the options record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionMetadata {
    pub name: String,
    #[serde(rename = "cliName")]
    pub cli_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "isPointer")]
    pub is_pointer: bool,
    #[serde(rename = "isSlice")]
    pub is_slice: bool,
    #[serde(rename = "help")]
    pub help_text: String,
    #[serde(rename = "envVar")]
    pub env_var: Option<String>,
    pub required: bool,
    #[serde(rename = "default")]
    pub default_value: Option<Value>,
    #[serde(rename = "isEnum", skip_serializing_if = "is_false")]
    pub is_enum: bool,
    #[serde(rename = "enumValues", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(rename = "fileMustExist", skip_serializing_if = "is_false")]
    pub file_must_exist: bool,
    #[serde(rename = "fileGlobPattern", skip_serializing_if = "is_false")]
    pub file_glob_pattern: bool,

    /// Not part of the public JSON shape: the field's source span, for
    /// diagnostics pointing back at the options record.
    #[serde(skip)]
    pub span: Span,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl OptionMetadata {
    pub fn new(name: String, cli_name: String, type_name: String, span: Span) -> Self {
        OptionMetadata {
            name,
            cli_name,
            type_name,
            is_pointer: false,
            is_slice: false,
            help_text: String::new(),
            env_var: None,
            required: true,
            default_value: None,
            is_enum: false,
            enum_values: Vec::new(),
            file_must_exist: false,
            file_glob_pattern: false,
            span,
        }
    }
}

/// Descriptor of the run function's signature, kept around for the
/// code generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFuncDescriptor {
    pub name: String,
    #[serde(rename = "optionsType")]
    pub options_type: String,
    #[serde(rename = "optionsByPointer")]
    pub options_by_pointer: bool,
}

/// The pipeline's output. Immutable once returned from
/// [`crate::pipeline::analyze`].
#[derive(Debug, Clone, Serialize)]
pub struct CommandMetadata {
    pub name: String,
    #[serde(rename = "doc")]
    pub doc_comment: String,
    #[serde(rename = "runFunc")]
    pub run_function: RunFuncDescriptor,
    #[serde(skip)]
    pub initializer_function_name: Option<String>,
    #[serde(skip)]
    pub entry_point_span: Option<Span>,
    pub options: Vec<OptionMetadata>,
}

impl CommandMetadata {
    /// Serializes to the stable JSON shape. Deterministic for
    /// a fixed input.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn option_mut(&mut self, name: &str) -> Option<&mut OptionMetadata> {
        self.options.iter_mut().find(|o| o.name == name)
    }

    /// Invariant: `cliName` is unique, case-insensitively.
    pub fn cli_name_collisions(&self) -> Vec<(String, String)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut collisions = Vec::new();
        for opt in &self.options {
            let lower = opt.cli_name.to_ascii_lowercase();
            if seen.iter().any(|s| s.eq_ignore_ascii_case(&lower)) {
                collisions.push((opt.name.clone(), opt.cli_name.clone()));
            } else {
                seen.push(&opt.cli_name);
            }
        }
        collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn sample() -> CommandMetadata {
        let mut name = OptionMetadata::new(
            "Name".to_string(),
            "name".to_string(),
            "string".to_string(),
            0..0,
        );
        name.default_value = Some(Value::String("guest".to_string()));
        name.help_text = "who to greet".to_string();

        CommandMetadata {
            name: "greeter".to_string(),
            doc_comment: "greets the configured name.".to_string(),
            run_function: RunFuncDescriptor {
                name: "run".to_string(),
                options_type: "Options".to_string(),
                options_by_pointer: true,
            },
            initializer_function_name: Some("newOptions".to_string()),
            entry_point_span: None,
            options: vec![name],
        }
    }

    #[test]
    fn to_json_pretty_matches_the_stable_shape() {
        let json = sample().to_json_pretty().unwrap();
        expect![[r#"
            {
              "name": "greeter",
              "doc": "greets the configured name.",
              "runFunc": {
                "name": "run",
                "optionsType": "Options",
                "optionsByPointer": true
              },
              "options": [
                {
                  "name": "Name",
                  "cliName": "name",
                  "type": "string",
                  "isPointer": false,
                  "isSlice": false,
                  "help": "who to greet",
                  "envVar": null,
                  "required": true,
                  "default": "guest"
                }
              ]
            }"#]]
        .assert_eq(&json);
    }

    #[test]
    fn cli_name_collisions_are_case_insensitive() {
        let mut metadata = sample();
        let mut dup = OptionMetadata::new(
            "NAME".to_string(),
            "NAME".to_string(),
            "string".to_string(),
            0..0,
        );
        dup.required = false;
        metadata.options.push(dup);

        let collisions = metadata.cli_name_collisions();
        assert_eq!(collisions, vec![("NAME".to_string(), "NAME".to_string())]);
    }
}

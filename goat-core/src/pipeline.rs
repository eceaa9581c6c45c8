//! The top-level entry point: target file path →
//! Loader parses it and locates its package → Analyzer produces
//! initial metadata → Interpreter enriches it if an initializer is
//! configured → metadata is handed to the caller.

use std::path::Path;
use std::sync::Arc;

use crate::analyzer::{analyze, AnalyzerConfig};
use crate::config::{LocatorKind, PipelineConfig};
use crate::errors::Diagnostics;
use crate::interpreter::{interpret, InterpreterConfig};
use crate::loader::{Loader, ModuleDescriptorLocator, ToolchainLocator};
use crate::metadata::CommandMetadata;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] crate::errors::LoaderError),
    #[error(transparent)]
    Analyze(#[from] crate::errors::AnalyzeError),
    #[error(transparent)]
    Interpret(#[from] crate::errors::InterpretError),
}

/// Output of [`run`]: the finished metadata plus any non-fatal
/// findings collected along the way (warnings/ignored).
pub struct PipelineOutput {
    pub metadata: CommandMetadata,
    pub diagnostics: Diagnostics,
}

/// Runs the full pipeline against a single target source file.
/// `target_path`'s parent directory is used as the Locator's working
/// directory, matching the execution-directory contract for
/// Locators that only examine the current directory.
pub fn run(target_path: &Path, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let source = std::fs::read_to_string(target_path).map_err(|cause| {
        crate::errors::LoaderError::Parse {
            path: target_path.display().to_string(),
            cause: cause.to_string(),
        }
    })?;

    let working_dir = target_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let locator: Box<dyn crate::loader::Locator> = match config.locator {
        LocatorKind::Toolchain => Box::new(ToolchainLocator::default()),
        LocatorKind::ModuleDescriptor => Box::new(ModuleDescriptorLocator::default()),
    };
    let mut loader = Loader::new(locator, working_dir).with_cancellation(config.cancellation.clone());

    let path_key = target_path.display().to_string();
    loader.set_source(path_key.clone(), Arc::<str>::from(source.as_str()));

    let file = loader
        .get_ast(&path_key)
        .ok_or_else(|| crate::errors::LoaderError::Parse {
            path: path_key.clone(),
            cause: "file registered but not parsed".to_string(),
        })?;

    let package_path = resolve_package_path(&loader, &file.package);

    let analyzer_config = AnalyzerConfig {
        run_function_name: config.run_function_name.clone(),
        ..AnalyzerConfig::default()
    };
    let analyzed = analyze(&path_key, &file, &analyzer_config, &config.cancellation)?;
    let mut metadata = analyzed.metadata;

    let mut diagnostics = match &config.initializer_function_name {
        Some(initializer_function_name) if !initializer_function_name.is_empty() => {
            let interpreter_config = InterpreterConfig {
                initializer_function_name: initializer_function_name.clone(),
                marker_package_path: config.marker_package_path.clone(),
            };
            interpret(
                &file,
                &package_path,
                &mut metadata,
                &interpreter_config,
                &mut loader,
                &config.cancellation,
            )?
        }
        _ => Diagnostics::new(),
    };

    for (name, cli_name) in metadata.cli_name_collisions() {
        diagnostics.warn(
            format!(
                "field `{name}` collides with another option's CLI flag name `-{cli_name}` (case-insensitive)"
            ),
            None,
        );
    }

    Ok(PipelineOutput {
        metadata,
        diagnostics,
    })
}

/// Best-effort canonical import path of the target's own package, used
/// as the "current package" when resolving unqualified identifiers
/// during interpretation. Locating the target's own package through
/// the configured Locator keeps this consistent with how cross-package
/// lookups are resolved, falling back to the bare package name if the
/// Locator cannot place it (e.g. no module descriptor in scope).
fn resolve_package_path(loader: &Loader, package_name: &str) -> String {
    match loader.locate(".") {
        Ok(candidates) if !candidates.is_empty() => candidates[0].import_path.clone(),
        _ => package_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn end_to_end_simple_defaults() {
        let dir = std::env::temp_dir().join(format!(
            "goat-pipeline-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let target = dir.join("main.go");
        let mut f = std::fs::File::create(&target).unwrap();
        writeln!(
            f,
            r#"package main

import "github.com/podhmo/goat"

type Options struct {{
	Name string
}}

func newOptions() *Options {{
	return &Options{{
		Name: goat.Default("guest"),
	}}
}}

func run(opts *Options) error {{
	return nil
}}
"#
        )
        .unwrap();

        let config = PipelineConfig {
            initializer_function_name: Some("newOptions".to_string()),
            locator: LocatorKind::ModuleDescriptor,
            ..PipelineConfig::default()
        };
        let out = run(&target, &config).expect("pipeline runs");
        assert_eq!(out.metadata.options.len(), 1);
        assert_eq!(
            out.metadata.options[0].default_value,
            Some(crate::metadata::Value::String("guest".to_string()))
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}

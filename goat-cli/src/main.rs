//! Command-line driver: wires the `emit`, `help-message`,
//! `scan` and `init` sub-commands to the core pipeline and its
//! codegen collaborators.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use structopt::StructOpt;

use goatcodegen::{format_help, generate_entry_point, rewriter, scaffold_project};
use goatcore::config::{LocatorKind, PipelineConfig};
use goatcore::pipeline;

#[derive(StructOpt)]
#[structopt(name = "goat", about = "Derives a CLI from a Go options record and run function.")]
enum Command {
    /// Rewrites the target file's entry point to parse and validate flags.
    #[structopt(name = "emit")]
    Emit {
        #[structopt(flatten)]
        flags: AnalysisFlags,
        #[structopt(name = "target", parse(from_os_str))]
        target: PathBuf,
    },
    /// Prints the derived help text to stdout.
    #[structopt(name = "help-message")]
    HelpMessage {
        #[structopt(flatten)]
        flags: AnalysisFlags,
        #[structopt(name = "target", parse(from_os_str))]
        target: PathBuf,
    },
    /// Prints the derived CommandMetadata as JSON to stdout.
    #[structopt(name = "scan")]
    Scan {
        #[structopt(flatten)]
        flags: AnalysisFlags,
        #[structopt(long, help = "pretty-print the JSON output")]
        pretty: bool,
        #[structopt(name = "target", parse(from_os_str))]
        target: PathBuf,
    },
    /// Scaffolds a minimal starter file.
    #[structopt(name = "init")]
    Init {
        #[structopt(name = "target", parse(from_os_str))]
        target: PathBuf,
        #[structopt(long, default_value = "app", help = "command name used in the scaffolded doc comment")]
        name: String,
    },
}

#[derive(StructOpt)]
struct AnalysisFlags {
    #[structopt(long = "run", default_value = "run", help = "name of the run function")]
    run: String,
    #[structopt(long = "initializer", default_value = "", help = "name of the initializer function")]
    initializer: String,
    #[structopt(long = "locator", default_value = "toolchain", possible_values = &["toolchain", "module"], help = "package locator strategy")]
    locator: String,
}

impl AnalysisFlags {
    fn into_config(self) -> PipelineConfig {
        let initializer_function_name = if self.initializer.is_empty() {
            None
        } else {
            Some(self.initializer)
        };
        let locator = match self.locator.as_str() {
            "module" => LocatorKind::ModuleDescriptor,
            _ => LocatorKind::Toolchain,
        };
        PipelineConfig {
            run_function_name: self.run,
            initializer_function_name,
            locator,
            ..PipelineConfig::default()
        }
    }
}

fn init_logging() {
    let debug = std::env::var("GOAT_DEBUG")
        .map(|v| !v.is_empty() && v != "0" && v.to_ascii_lowercase() != "false")
        .unwrap_or(false);
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() -> ExitCode {
    init_logging();
    match run(Command::from_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("goat: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Emit { flags, target } => emit(flags, &target),
        Command::HelpMessage { flags, target } => help_message(flags, &target),
        Command::Scan { flags, pretty, target } => scan(flags, pretty, &target),
        Command::Init { target, name } => init(&target, &name),
    }
}

fn emit(flags: AnalysisFlags, target: &Path) -> Result<()> {
    let config = flags.into_config();
    let out = pipeline::run(target, &config)
        .with_context(|| format!("analyzing {}", target.display()))?;
    for warning in out.diagnostics.warnings() {
        log::warn!("{warning}");
    }

    let replacement = generate_entry_point(&out.metadata);
    rewriter::rewrite_file(target, out.metadata.entry_point_span, &replacement)
        .with_context(|| format!("rewriting entry point of {}", target.display()))?;
    Ok(())
}

fn help_message(flags: AnalysisFlags, target: &Path) -> Result<()> {
    let config = flags.into_config();
    let out = pipeline::run(target, &config)
        .with_context(|| format!("analyzing {}", target.display()))?;
    print!("{}", format_help(&out.metadata));
    Ok(())
}

fn scan(flags: AnalysisFlags, pretty: bool, target: &Path) -> Result<()> {
    let config = flags.into_config();
    let out = pipeline::run(target, &config)
        .with_context(|| format!("analyzing {}", target.display()))?;
    let json = if pretty {
        out.metadata.to_json_pretty()
    } else {
        out.metadata.to_json()
    }
    .context("serializing command metadata")?;
    println!("{json}");
    Ok(())
}

fn init(target: &Path, name: &str) -> Result<()> {
    scaffold_project(target, name)
        .with_context(|| format!("scaffolding {}", target.display()))?;
    println!("wrote {}", target.display());
    Ok(())
}

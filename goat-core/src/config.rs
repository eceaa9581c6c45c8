//! Pipeline-wide configuration, constructed once by the outer tool
//! and threaded down through Loader/Analyzer/Interpreter rather than
//! kept as ambient global state.

use crate::cancel::CancellationToken;

/// The import path markers must resolve through, e.g. `"example.com/goat"`.
pub const DEFAULT_MARKER_PACKAGE: &str = "github.com/podhmo/goat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Toolchain,
    ModuleDescriptor,
}

impl Default for LocatorKind {
    fn default() -> Self {
        LocatorKind::Toolchain
    }
}

#[derive(Clone)]
pub struct PipelineConfig {
    pub run_function_name: String,
    pub initializer_function_name: Option<String>,
    pub marker_package_path: String,
    pub locator: LocatorKind,
    pub cancellation: CancellationToken,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            run_function_name: "run".to_string(),
            initializer_function_name: None,
            marker_package_path: DEFAULT_MARKER_PACKAGE.to_string(),
            locator: LocatorKind::default(),
            cancellation: CancellationToken::new(),
        }
    }
}

//! Error taxonomy for the pipeline: fatal errors abort a
//! stage and are returned; warnings are collected on a [`Diagnostics`]
//! sink so enrichment can continue past a single bad marker; ignored
//! conditions are informational-only and never surface as a value.

use std::fmt;

use crate::ast::Span;

/// A value (or nothing) paired with an optional source span, in the
/// spirit of `codespan-reporting` diagnostics: most of the pipeline
/// only needs "where", not a full rendered snippet, so we keep this
/// lightweight rather than depending on a `Files` database everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub span: Option<Span>,
    pub value: T,
}

impl<T> Located<T> {
    pub fn new(span: Span, value: T) -> Self {
        Located {
            span: Some(span),
            value,
        }
    }

    pub fn unspanned(value: T) -> Self {
        Located { span: None, value }
    }
}

pub fn located<T>(span: Span, value: T) -> Located<T> {
    Located::new(span, value)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    #[error("could not locate package for pattern `{pattern}`: {cause}")]
    Locate { pattern: String, cause: String },
    #[error("failed to parse {path}: {cause}")]
    Parse { path: String, cause: String },
    #[error("analysis cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("run function `{name}` not found in {file}")]
    RunNotFound { name: String, file: String },
    #[error("run function `{name}` has an unsupported signature: {reason}")]
    RunSignature { name: String, reason: String },
    #[error("options record `{name}` not declared in {file}")]
    OptionsRecordNotFound { name: String, file: String },
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("analysis cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("initializer function `{name}` not found in {file}")]
    InitializerNotFound { name: String, file: String },
    #[error("initializer function `{name}` has no body")]
    InitializerEmpty { name: String },
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("analysis cancelled")]
    Cancelled,
}

/// A non-fatal finding recorded during Interpreter enrichment.
/// `Warning`s are surfaced to the caller at `log::warn!`;
/// `Info`s (ignored statements, non-marker calls, unknown marker
/// names) at `log::info!`. Both are also collected here so tests can
/// assert on them without scraping log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Warning { message: String, span: Option<Span> },
    Info { message: String, span: Option<Span> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Warning { message, .. } => write!(f, "warning: {message}"),
            Diagnostic::Info { message, .. } => write!(f, "info: {message}"),
        }
    }
}

/// Accumulates diagnostics over the course of one Interpreter walk.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>, span: Option<Span>) {
        let message = message.into();
        log::warn!("{message}");
        self.entries.push(Diagnostic::Warning { message, span });
    }

    pub fn info(&mut self, message: impl Into<String>, span: Option<Span>) {
        let message = message.into();
        log::info!("{message}");
        self.entries.push(Diagnostic::Info { message, span });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::Warning { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Loader: resolves a package import pattern to
//! [`PackageInfo`] records via a pluggable [`Locator`], parses source
//! files on demand, and caches ASTs and a `pkgpath:name` symbol index
//! for the lifetime of the process.

mod db;
mod locator;
mod symbol;
mod workdir;

pub use db::{Database, FileResult, LoaderBase, LoaderDb};
pub use locator::{BuildContext, Locator, ModuleDescriptorLocator, PackageInfo, ToolchainLocator};
pub use symbol::{SymbolInfo, SymbolKind, SymbolTable};
pub use workdir::with_working_dir;

use std::path::PathBuf;
use std::sync::Arc;

use crate::ast;
use crate::cancel::CancellationToken;
use crate::errors::LoaderError;

/// `{PackageInfo, files, symbols}` — a thin view over the
/// shared [`Database`]; the actual AST/symbol caches live there so
/// that loading the same package twice from different call sites
/// never re-parses.
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    pub info: PackageInfo,
}

pub struct Loader {
    locator: Box<dyn Locator>,
    db: Database,
    working_dir: PathBuf,
    cancellation: CancellationToken,
}

impl Loader {
    pub fn new(locator: Box<dyn Locator>, working_dir: PathBuf) -> Self {
        Loader {
            locator,
            db: Database::default(),
            working_dir,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// `Locate(pattern, buildContext) → [PackageInfo]`.
    pub fn locate(&self, pattern: &str) -> Result<Vec<PackageInfo>, LoaderError> {
        let ctx = BuildContext {
            working_dir: self.working_dir.clone(),
        };
        self.locator.locate(pattern, &ctx)
    }

    /// `Load(importPaths…) → [LoadedPackage]`. Resolves each path via
    /// the Locator and reads its source files from disk into the
    /// cache, returning packages already known to the cache as-is.
    pub fn load(&mut self, import_paths: &[String]) -> Result<Vec<LoadedPackage>, LoaderError> {
        let mut out = Vec::with_capacity(import_paths.len());
        for path in import_paths {
            if let Some(info) = self.known_package_info(path) {
                out.push(LoadedPackage { info });
                continue;
            }
            let candidates = self.locate(path)?;
            let info = candidates
                .into_iter()
                .find(|c| &c.import_path == path)
                .ok_or_else(|| LoaderError::Locate {
                    pattern: path.clone(),
                    cause: "locator returned no matching package".to_string(),
                })?;
            self.register(&info)?;
            out.push(LoadedPackage { info });
        }
        Ok(out)
    }

    fn known_package_info(&self, import_path: &str) -> Option<PackageInfo> {
        // We don't keep a separate PackageInfo cache distinct from the
        // file-list input: if the Database already has files recorded
        // for this import path we reconstruct a minimal PackageInfo
        // from them rather than re-locating.
        let files = self.db.known_package_files(import_path)?;
        Some(PackageInfo {
            import_path: import_path.to_string(),
            directory: files
                .first()
                .and_then(|f| PathBuf::from(f).parent().map(|p| p.to_path_buf()))
                .unwrap_or_default(),
            source_files: files.into_iter().map(PathBuf::from).collect(),
            dependencies: Vec::new(),
        })
    }

    fn register(&mut self, info: &PackageInfo) -> Result<(), LoaderError> {
        let mut paths = Vec::with_capacity(info.source_files.len());
        for file in &info.source_files {
            if self.cancellation.is_cancelled() {
                return Err(LoaderError::Cancelled);
            }
            let path = file.to_string_lossy().to_string();
            let contents = std::fs::read_to_string(file).map_err(|cause| LoaderError::Parse {
                path: path.clone(),
                cause: cause.to_string(),
            })?;
            self.db.set_source(path.clone(), Arc::from(contents));
            paths.push(path);
        }
        self.db
            .set_package_files(info.import_path.clone(), paths);
        Ok(())
    }

    /// Registers a single already-read source (used by the Analyzer's
    /// entry point, which is handed the target file's contents
    /// directly rather than rediscovering it through a Locator).
    pub fn set_source(&mut self, path: impl Into<String>, source: impl Into<Arc<str>>) {
        self.db.set_source(path.into(), source.into());
    }

    pub fn register_package_files(&mut self, import_path: impl Into<String>, paths: Vec<String>) {
        self.db.set_package_files(import_path.into(), paths);
    }

    /// `Files(pkg) → [AST]`. Parses every source file in the package
    /// (idempotent: already-parsed files return the cached AST) and
    /// indexes their declarations as a side effect of the underlying
    /// query.
    pub fn files(&self, pkg: &PackageInfo) -> Result<Vec<Arc<ast::File>>, LoaderError> {
        let mut out = Vec::with_capacity(pkg.source_files.len());
        for file in &pkg.source_files {
            if self.cancellation.is_cancelled() {
                return Err(LoaderError::Cancelled);
            }
            let path = file.to_string_lossy().to_string();
            match &*self.db.file_ast(path) {
                Ok(ast) => out.push(Arc::new(ast.clone())),
                Err(e) => return Err(e.clone()),
            }
        }
        Ok(out)
    }

    /// `GetAST(filePath) → AST | not-found`.
    pub fn get_ast(&self, file_path: &str) -> Option<Arc<ast::File>> {
        self.db.file_ast_ok(file_path.to_string())
    }

    /// `LookupSymbol("pkgpath:name") → SymbolInfo | not-found`.
    /// Lazily loads the referenced package first if it has not been
    /// loaded yet, so Interpreter call sites don't need to sequence
    /// an explicit `Load` before every lookup.
    pub fn lookup_symbol(&mut self, key: &str) -> Result<Option<SymbolInfo>, LoaderError> {
        let pkgpath = key.split(':').next().unwrap_or_default().to_string();
        if self.db.known_package_files(&pkgpath).is_none() {
            self.load(&[pkgpath])?;
        }
        Ok(db::lookup_symbol(&self.db, key))
    }
}

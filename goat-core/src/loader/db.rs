//! The Loader's cache: parsed ASTs and the cross-package symbol
//! index, backed by an incremental `salsa` database. Only the
//! memoization half of salsa is used here — this is a one-shot
//! analysis, not an editor backend — but the query-group shape still
//! gives "write once per key, readers never race writers" for free.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ast;
use crate::errors::LoaderError;

use super::symbol::{index_file, SymbolInfo, SymbolTable};

pub type FileResult = Result<ast::File, LoaderError>;

/// Plain (non-incremental) state mutated directly by [`super::Loader`]
/// before any query runs: the set of files discovered for each
/// package, read by a derived query rather than held as a salsa
/// input directly.
pub trait LoaderBase {
    fn set_source(&mut self, path: String, source: Arc<str>);
    fn set_package_files(&mut self, import_path: String, files: Vec<String>);
    fn known_package_files(&self, import_path: &str) -> Option<Vec<String>>;
}

#[salsa::query_group(LoaderStorage)]
pub trait LoaderDb: LoaderBase {
    #[salsa::input]
    fn source_inner(&self, path: String) -> Arc<str>;

    fn file_ast(&self, path: String) -> Arc<FileResult>;

    #[salsa::transparent]
    fn file_ast_ok(&self, path: String) -> Option<Arc<ast::File>>;

    fn package_symbols(&self, import_path: String) -> Arc<SymbolTable>;
}

fn file_ast(db: &dyn LoaderDb, path: String) -> Arc<FileResult> {
    let source = db.source_inner(path.clone());
    Arc::new(crate::parser::parse_file(&path, &source))
}

fn file_ast_ok(db: &dyn LoaderDb, path: String) -> Option<Arc<ast::File>> {
    match &*db.file_ast(path) {
        Ok(file) => Some(Arc::new(file.clone())),
        Err(_) => None,
    }
}

fn package_symbols(db: &dyn LoaderDb, import_path: String) -> Arc<SymbolTable> {
    let mut table = SymbolTable::default();
    if let Some(files) = db.known_package_files(&import_path) {
        for path in files {
            if let Some(file) = db.file_ast_ok(path.clone()) {
                index_file(&import_path, &path, &file, &mut table);
            }
        }
    }
    Arc::new(table)
}

#[salsa::database(LoaderStorage)]
pub struct Database {
    storage: salsa::Storage<Self>,
    package_files: Mutex<HashMap<String, Vec<String>>>,
}

impl Default for Database {
    fn default() -> Self {
        Database {
            storage: Default::default(),
            package_files: Mutex::new(HashMap::new()),
        }
    }
}

impl salsa::Database for Database {}

impl LoaderBase for Database {
    fn set_source(&mut self, path: String, source: Arc<str>) {
        self.set_source_inner(path, source)
    }

    fn set_package_files(&mut self, import_path: String, files: Vec<String>) {
        self.package_files.lock().unwrap().insert(import_path, files);
    }

    fn known_package_files(&self, import_path: &str) -> Option<Vec<String>> {
        self.package_files.lock().unwrap().get(import_path).cloned()
    }
}

/// Looks up one symbol by its fully-qualified `pkgpath:name` key.
pub fn lookup_symbol(db: &Database, key: &str) -> Option<SymbolInfo> {
    let (pkgpath, name) = key.split_once(':')?;
    let table = db.package_symbols(pkgpath.to_string());
    table.get(name).cloned()
}

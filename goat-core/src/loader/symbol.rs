//! `SymbolInfo`: `{declaringFilePath, packagePath, AST node of the
//! declaration}`, one entry per top-level named declaration.

use std::collections::HashMap;

use crate::ast::{self, Decl, DeclKind, Spec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Const,
    Var,
    Type,
    Func,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub declaring_file: String,
    pub package_path: String,
    pub kind: SymbolKind,
    /// For `const`/`var` bindings: the initializer expression, when
    /// the declaration pairs exactly one value per name (the only shape
    /// identifier-resolution ever needs).
    pub value_expr: Option<ast::Expr>,
}

pub type SymbolTable = HashMap<String, SymbolInfo>;

/// Indexes every top-level declaration of `file` into `table`, keyed
/// `pkgpath:name`, one entry per top-level declaration.
pub fn index_file(package_path: &str, declaring_file: &str, file: &ast::File, table: &mut SymbolTable) {
    for decl in &file.decls {
        match decl {
            Decl::Func(f) => {
                table.insert(
                    format!("{package_path}:{}", f.name),
                    SymbolInfo {
                        declaring_file: declaring_file.to_string(),
                        package_path: package_path.to_string(),
                        kind: SymbolKind::Func,
                        value_expr: None,
                    },
                );
            }
            Decl::Gen(g) => index_gen_decl(package_path, declaring_file, g, table),
        }
    }
}

fn index_gen_decl(
    package_path: &str,
    declaring_file: &str,
    gen: &ast::GenDecl,
    table: &mut SymbolTable,
) {
    let kind = match gen.kind {
        DeclKind::Const => SymbolKind::Const,
        DeclKind::Var => SymbolKind::Var,
        DeclKind::Type => SymbolKind::Type,
    };
    for spec in &gen.specs {
        match spec {
            Spec::Type(t) => {
                table.insert(
                    format!("{package_path}:{}", t.name),
                    SymbolInfo {
                        declaring_file: declaring_file.to_string(),
                        package_path: package_path.to_string(),
                        kind: SymbolKind::Type,
                        value_expr: None,
                    },
                );
            }
            Spec::Value(v) => {
                // Multi-name declarations with a matching value per
                // name each map to their own expression; otherwise
                // (e.g. a single call returning multiple results, or
                // no initializer at all) the symbol is still indexed
                // but carries no resolvable value.
                let paired = v.names.len() == v.values.len();
                for (i, name) in v.names.iter().enumerate() {
                    let value_expr = if paired {
                        Some(v.values[i].clone())
                    } else {
                        None
                    };
                    table.insert(
                        format!("{package_path}:{name}"),
                        SymbolInfo {
                            declaring_file: declaring_file.to_string(),
                            package_path: package_path.to_string(),
                            kind,
                            value_expr,
                        },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;
    use maplit::hashmap;
    use pretty_assertions::assert_eq;

    #[test]
    fn indexes_funcs_types_and_paired_var_values() {
        let file = parse_file(
            "pkg.go",
            r#"
package widgets

var DefaultLevels = []string{"debug", "info"}

type Options struct {
	Name string
}

func run(opts *Options) error {
	return nil
}
"#,
        )
        .expect("parses");

        let mut table = SymbolTable::default();
        index_file("example.com/widgets", "pkg.go", &file, &mut table);

        let kinds: std::collections::HashMap<&str, SymbolKind> = hashmap! {
            "example.com/widgets:DefaultLevels" => SymbolKind::Var,
            "example.com/widgets:Options" => SymbolKind::Type,
            "example.com/widgets:run" => SymbolKind::Func,
        };
        for (key, expected_kind) in &kinds {
            assert_eq!(table[*key].kind, *expected_kind);
            assert_eq!(table[*key].declaring_file, "pkg.go");
            assert_eq!(table[*key].package_path, "example.com/widgets");
        }
        assert!(table["example.com/widgets:DefaultLevels"].value_expr.is_some());
        assert!(table["example.com/widgets:run"].value_expr.is_none());
    }
}

//! A minimal abstract syntax tree for the target language's surface
//! syntax: package clauses, imports, top-level const/var/type/func
//! declarations, struct types, and the restricted statement/expression
//! subset the Interpreter walks.
//!
//! This is deliberately not a complete grammar. Anything outside the
//! sub-language the Analyzer and Interpreter need is preserved as
//! opaque `Expr::Other`/`Stmt::Other` nodes carrying their source span
//! so callers can still report *where* something unsupported lives
//! without the parser needing to understand it.

use std::ops::Range;

/// Byte offsets into the originating source file.
pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    pub package: String,
    pub package_span: Span,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl File {
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }

    pub fn func(&self, name: &str) -> Option<&FuncDecl> {
        self.funcs().find(|f| f.name == name)
    }

    pub fn type_decl(&self, name: &str) -> Option<&TypeSpec> {
        self.decls.iter().find_map(|d| match d {
            Decl::Gen(g) if g.kind == DeclKind::Type => g.specs.iter().find_map(|s| match s {
                Spec::Type(t) if t.name == name => Some(t),
                _ => None,
            }),
            _ => None,
        })
    }

    /// Resolves the import path a given alias refers to, following the
    /// same rule the Interpreter uses for marker recognition:
    /// an import with an explicit `alias "path"` is keyed by the
    /// alias, otherwise by the last path segment.
    pub fn import_path_for_alias(&self, alias: &str) -> Option<&str> {
        self.imports.iter().find_map(|i| {
            let name = i.alias.as_deref().unwrap_or_else(|| default_alias(&i.path));
            if name == alias {
                Some(i.path.as_str())
            } else {
                None
            }
        })
    }
}

/// The conventional default import name: the last `/`-separated
/// segment of the import path.
pub fn default_alias(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Var,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenDecl {
    pub kind: DeclKind,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

/// A `const`/`var` spec: one or more names sharing a type and, for
/// `var`, initializer expressions (one per name, parallel assignment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub typ: Option<Expr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub doc: Vec<String>,
    pub typ: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub body: Option<BlockStmt>,
    pub span: Span,
}

/// Used both for function parameters/results and for struct fields.
/// `tag` and a field-level `doc` are only meaningful on struct fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub typ: Expr,
    pub tag: Option<String>,
    pub doc: Vec<String>,
    pub span: Span,
}

impl Field {
    /// A field declared without an explicit name list still has
    /// exactly one conceptual name for our purposes (unqualified
    /// single-parameter signatures); callers needing "the" name use
    /// this helper.
    pub fn single_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Return(Option<Expr>),
    /// `lhs = rhs` or `lhs := rhs`, single assignment only (the shapes
    /// the Interpreter cares about: `target.Field = expr`).
    Assign { lhs: Expr, rhs: Expr, span: Span },
    Expr(Expr),
    /// Anything else (if/for/switch/declare-and-branch/...): the walk
    /// skips these silently, logging at info level.
    Other(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident { name: String, span: Span },
    Selector {
        x: Box<Expr>,
        sel: String,
        span: Span,
    },
    BasicLit {
        kind: LitKind,
        value: String,
        span: Span,
    },
    Unary {
        op: char,
        x: Box<Expr>,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    /// `T{elt, ...}` or `&T{elt, ...}` with the `&` stripped and
    /// recorded via `pointer`.
    Composite {
        typ: Option<Box<Expr>>,
        elts: Vec<CompositeElt>,
        pointer: bool,
        span: Span,
    },
    /// `*T`
    Star { x: Box<Expr>, span: Span },
    /// `[]T` (slice) or `[N]T` (array, `len` populated) used as a type.
    ArrayType {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
        span: Span,
    },
    StructType {
        fields: Vec<Field>,
        span: Span,
    },
    /// Anything outside the sub-language; the span lets diagnostics
    /// still point somewhere sensible.
    Other(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeElt {
    pub key: Option<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    String,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::Selector { span, .. }
            | Expr::BasicLit { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Composite { span, .. }
            | Expr::Star { span, .. }
            | Expr::ArrayType { span, .. }
            | Expr::StructType { span, .. }
            | Expr::Other(span) => span.clone(),
        }
    }

    /// Renders a type expression back to source-like text, e.g. `*int`,
    /// `[]string`, `net.IP` (the option's `typeName`).
    pub fn render_type(&self) -> String {
        match self {
            Expr::Ident { name, .. } => name.clone(),
            Expr::Selector { x, sel, .. } => format!("{}.{}", x.render_type(), sel),
            Expr::Star { x, .. } => format!("*{}", x.render_type()),
            Expr::ArrayType { len: None, elt, .. } => format!("[]{}", elt.render_type()),
            Expr::ArrayType {
                len: Some(len),
                elt,
                ..
            } => format!("[{}]{}", len.render_type(), elt.render_type()),
            Expr::StructType { .. } => "struct{...}".to_string(),
            Expr::BasicLit { value, .. } => value.clone(),
            _ => "<?>".to_string(),
        }
    }
}

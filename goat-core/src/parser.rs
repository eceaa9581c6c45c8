//! Recursive-descent parser building [`crate::ast`] nodes from the
//! token stream produced by [`crate::lexer`].
//!
//! Only the grammar the Analyzer/Interpreter need is understood in
//! full (package clause, imports, const/var/type/func declarations,
//! struct types, the expression sub-language, and
//! return/assignment statements). Anything else is skipped as an
//! opaque, balanced span rather than rejected, so a target file with
//! ordinary control flow in unrelated functions still parses.

use crate::ast::*;
use crate::errors::LoaderError;
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, LoaderError>;

pub fn parse_file(path: &str, src: &str) -> PResult<File> {
    let tokens = tokenize(src);
    let mut p = Parser { tokens, pos: 0 };
    p.parse_file().map_err(|cause| LoaderError::Parse {
        path: path.to_string(),
        cause,
    })
}

impl Parser {
    fn tok(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.tok().kind
    }

    fn span(&self) -> Span {
        self.tok().span.clone()
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn eat_semicolons(&mut self) {
        while matches!(self.kind(), TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(format!("expected identifier, found {other:?}")),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), String> {
        if std::mem::discriminant(self.kind()) == std::mem::discriminant(kind) {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected {kind:?}, found {:?}", self.kind()))
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    fn parse_file(&mut self) -> Result<File, String> {
        self.eat_semicolons();
        self.expect(&TokenKind::Package)?;
        let pkg_start = self.span().start;
        let package = self.expect_ident()?;
        let package_span = pkg_start..self.tokens[self.pos.saturating_sub(1)].span.end;
        self.eat_semicolons();

        let mut imports = Vec::new();
        while self.at(&TokenKind::Import) {
            self.advance();
            self.parse_import_group(&mut imports)?;
            self.eat_semicolons();
        }

        let mut decls = Vec::new();
        while !self.at(&TokenKind::Eof) {
            decls.push(self.parse_top_level_decl()?);
            self.eat_semicolons();
        }

        Ok(File {
            package,
            package_span,
            imports,
            decls,
        })
    }

    fn parse_import_group(&mut self, out: &mut Vec<ImportSpec>) -> Result<(), String> {
        if self.at(&TokenKind::LParen) {
            self.advance();
            self.eat_semicolons();
            while !self.at(&TokenKind::RParen) {
                out.push(self.parse_import_spec()?);
                self.eat_semicolons();
            }
            self.advance();
        } else {
            out.push(self.parse_import_spec()?);
        }
        Ok(())
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, String> {
        let start = self.span().start;
        let alias = if let TokenKind::Ident(name) = self.kind().clone() {
            self.advance();
            Some(name)
        } else {
            None
        };
        let path = match self.kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                s
            }
            other => return Err(format!("expected import path string, found {other:?}")),
        };
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(ImportSpec {
            alias,
            path,
            span: start..end,
        })
    }

    fn parse_top_level_decl(&mut self) -> Result<Decl, String> {
        let doc = self.tok().leading_doc.clone();
        match self.kind().clone() {
            TokenKind::Func => Ok(Decl::Func(self.parse_func_decl(doc)?)),
            TokenKind::Const => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Const)?)),
            TokenKind::Var => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Var)?)),
            TokenKind::Type => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Type)?)),
            other => Err(format!("unexpected top-level token {other:?}")),
        }
    }

    fn parse_func_decl(&mut self, doc: Vec<String>) -> Result<FuncDecl, String> {
        let start = self.span().start;
        self.expect(&TokenKind::Func)?;
        let name = self.expect_ident()?;
        let params = self.parse_param_list()?;
        let results = self.parse_results()?;
        let body = if self.at(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(FuncDecl {
            name,
            doc,
            params,
            results,
            body,
            span: start..end,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Field>, String> {
        self.expect(&TokenKind::LParen)?;
        let mut fields = Vec::new();
        while !self.at(&TokenKind::RParen) {
            fields.push(self.parse_field(false)?);
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(fields)
    }

    fn parse_results(&mut self) -> Result<Vec<Field>, String> {
        if self.at(&TokenKind::LParen) {
            self.parse_param_list()
        } else if matches!(self.kind(), TokenKind::Ident(_) | TokenKind::Star) {
            let start = self.span().start;
            let typ = self.parse_type()?;
            let end = self.tokens[self.pos.saturating_sub(1)].span.end;
            Ok(vec![Field {
                names: Vec::new(),
                typ,
                tag: None,
                doc: Vec::new(),
                span: start..end,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    /// A parameter or struct field: `[names] Type [tag]`. We decide
    /// whether a leading identifier is a name or the start of a
    /// qualified type by checking for a following identifier/`*`/`[`.
    fn parse_field(&mut self, in_struct: bool) -> Result<Field, String> {
        let doc = self.tok().leading_doc.clone();
        let start = self.span().start;
        let mut names = Vec::new();
        if let TokenKind::Ident(first) = self.kind().clone() {
            // Lookahead: `name Type` vs a bare `Type` (possibly `pkg.Type`).
            if self.peek_is_field_continuation() {
                names.push(first);
                self.advance();
                while self.at(&TokenKind::Comma) {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
            }
        }
        let typ = self.parse_type()?;
        let tag = if in_struct {
            if let TokenKind::Str(s) = self.kind().clone() {
                self.advance();
                Some(s)
            } else {
                None
            }
        } else {
            None
        };
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(Field {
            names,
            typ,
            tag,
            doc,
            span: start..end,
        })
    }

    /// True if the current identifier is a field/parameter *name*
    /// (i.e. followed by another identifier, `*`, `[`, or `struct` —
    /// the start of a type) rather than itself being the type.
    fn peek_is_field_continuation(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(TokenKind::Ident(_))
                | Some(TokenKind::Star)
                | Some(TokenKind::LBracket)
                | Some(TokenKind::Struct)
        )
    }

    fn parse_type(&mut self) -> Result<Expr, String> {
        let start = self.span().start;
        match self.kind().clone() {
            TokenKind::Star => {
                self.advance();
                let x = Box::new(self.parse_type()?);
                let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                Ok(Expr::Star {
                    x,
                    span: start..end,
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let len = if self.at(&TokenKind::RBracket) {
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                self.expect(&TokenKind::RBracket)?;
                let elt = Box::new(self.parse_type()?);
                let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                Ok(Expr::ArrayType {
                    len,
                    elt,
                    span: start..end,
                })
            }
            TokenKind::Struct => {
                self.advance();
                self.expect(&TokenKind::LBrace)?;
                self.eat_semicolons();
                let mut fields = Vec::new();
                while !self.at(&TokenKind::RBrace) {
                    fields.push(self.parse_field(true)?);
                    self.eat_semicolons();
                }
                self.advance();
                let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                Ok(Expr::StructType {
                    fields,
                    span: start..end,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                let mut e = Expr::Ident {
                    name,
                    span: start..self.tokens[self.pos.saturating_sub(1)].span.end,
                };
                if self.at(&TokenKind::Dot) {
                    self.advance();
                    let sel = self.expect_ident()?;
                    let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                    e = Expr::Selector {
                        x: Box::new(e),
                        sel,
                        span: start..end,
                    };
                }
                Ok(e)
            }
            other => Err(format!("expected type, found {other:?}")),
        }
    }

    fn parse_block(&mut self) -> Result<BlockStmt, String> {
        let start = self.span().start;
        self.expect(&TokenKind::LBrace)?;
        self.eat_semicolons();
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
            self.eat_semicolons();
        }
        self.advance();
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(BlockStmt {
            stmts,
            span: start..end,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, String> {
        match self.kind().clone() {
            TokenKind::Return => {
                self.advance();
                if self.at(&TokenKind::Semicolon) || self.at(&TokenKind::RBrace) {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.parse_expr()?)))
                }
            }
            TokenKind::LBrace => {
                let span = self.parse_block()?.span;
                Ok(Stmt::Other(span))
            }
            _ => self.parse_simple_stmt_or_skip(),
        }
    }

    /// Parses `lhs = rhs` / `lhs := rhs` / a bare expression statement
    /// when the shape matches exactly one of those; anything else
    /// (if/for/switch/declare blocks, multi-assignment, ...) is
    /// skipped as a balanced, opaque statement.
    fn parse_simple_stmt_or_skip(&mut self) -> Result<Stmt, String> {
        let checkpoint = self.pos;
        let start = self.span().start;
        if let Ok(lhs) = self.parse_expr() {
            if self.at(&TokenKind::Assign) || self.at(&TokenKind::Define) {
                self.advance();
                if let Ok(rhs) = self.parse_expr() {
                    if self.at(&TokenKind::Semicolon) || self.at(&TokenKind::RBrace) {
                        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                        return Ok(Stmt::Assign {
                            lhs,
                            rhs,
                            span: start..end,
                        });
                    }
                }
            } else if self.at(&TokenKind::Semicolon) || self.at(&TokenKind::RBrace) {
                return Ok(Stmt::Expr(lhs));
            }
        }
        self.pos = checkpoint;
        self.skip_balanced_stmt()
    }

    /// Consumes tokens up to (and including) the next top-level `;`,
    /// or a single balanced `{...}` block, tracking nesting depth so
    /// interior semicolons/braces don't terminate early.
    fn skip_balanced_stmt(&mut self) -> Result<Stmt, String> {
        let start = self.span().start;
        let mut depth = 0i32;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 && matches!(self.kind(), TokenKind::Semicolon) {
                        self.advance();
                        break;
                    }
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(Stmt::Other(start..end))
    }

    fn parse_gen_decl(&mut self, kind: DeclKind) -> Result<GenDecl, String> {
        self.advance(); // const/var/type
        let mut specs = Vec::new();
        if self.at(&TokenKind::LParen) {
            self.advance();
            self.eat_semicolons();
            while !self.at(&TokenKind::RParen) {
                specs.push(self.parse_spec(kind)?);
                self.eat_semicolons();
            }
            self.advance();
        } else {
            specs.push(self.parse_spec(kind)?);
        }
        Ok(GenDecl { kind, specs })
    }

    fn parse_spec(&mut self, kind: DeclKind) -> Result<Spec, String> {
        let doc = self.tok().leading_doc.clone();
        let start = self.span().start;
        if kind == DeclKind::Type {
            let name = self.expect_ident()?;
            let typ = self.parse_type()?;
            let end = self.tokens[self.pos.saturating_sub(1)].span.end;
            return Ok(Spec::Type(TypeSpec {
                name,
                doc,
                typ,
                span: start..end,
            }));
        }
        let mut names = vec![self.expect_ident()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_ident()?);
        }
        let typ = if !self.at(&TokenKind::Assign) && !self.at(&TokenKind::Semicolon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut values = Vec::new();
        if self.at(&TokenKind::Assign) {
            self.advance();
            values.push(self.parse_expr()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                values.push(self.parse_expr()?);
            }
        }
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(Spec::Value(ValueSpec {
            names,
            typ,
            values,
            span: start..end,
        }))
    }

    // --- expressions (the sub-language, plus enough surrounding
    // grammar to parse it in context) ---

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        let start = self.span().start;
        match self.kind().clone() {
            TokenKind::Minus => {
                self.advance();
                let x = Box::new(self.parse_unary()?);
                let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                Ok(Expr::Unary {
                    op: '-',
                    x,
                    span: start..end,
                })
            }
            TokenKind::Plus => {
                self.advance();
                let x = Box::new(self.parse_unary()?);
                let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                Ok(Expr::Unary {
                    op: '+',
                    x,
                    span: start..end,
                })
            }
            TokenKind::Amp => {
                self.advance();
                let inner = self.parse_unary()?;
                let end = inner.span().end;
                match inner {
                    Expr::Composite {
                        typ, elts, span, ..
                    } => Ok(Expr::Composite {
                        typ,
                        elts,
                        pointer: true,
                        span: start..span.end,
                    }),
                    other => Ok(Expr::Unary {
                        op: '&',
                        x: Box::new(other),
                        span: start..end,
                    }),
                }
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let start = self.span().start;
        let mut e = self.parse_operand()?;
        loop {
            match self.kind().clone() {
                TokenKind::Dot => {
                    self.advance();
                    let sel = self.expect_ident()?;
                    let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                    e = Expr::Selector {
                        x: Box::new(e),
                        sel,
                        span: start..end,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.at(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if self.at(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    let end = self.tokens[self.pos.saturating_sub(1)].span.end;
                    e = Expr::Call {
                        func: Box::new(e),
                        args,
                        span: start..end,
                    };
                }
                TokenKind::LBrace if is_type_like(&e) => {
                    let (elts, end) = self.parse_composite_elts()?;
                    e = Expr::Composite {
                        typ: Some(Box::new(e)),
                        elts,
                        pointer: false,
                        span: start..end,
                    };
                }
                _ => break,
            }
        }
        Ok(e)
    }

    fn parse_composite_elts(&mut self) -> Result<(Vec<CompositeElt>, usize), String> {
        self.expect(&TokenKind::LBrace)?;
        let mut elts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            let elt_start = self.span().start;
            let first = self.parse_expr()?;
            let (key, value) = if self.at(&TokenKind::Colon) {
                self.advance();
                let key = match first {
                    Expr::Ident { name, .. } => name,
                    other => other.render_type(),
                };
                (Some(key), self.parse_expr()?)
            } else {
                (None, first)
            };
            let end = value.span().end;
            elts.push(CompositeElt {
                key,
                value,
                span: elt_start..end,
            });
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok((elts, end))
    }

    fn parse_operand(&mut self) -> Result<Expr, String> {
        let start = self.span().start;
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident {
                    name,
                    span: start..self.tokens[self.pos.saturating_sub(1)].span.end,
                })
            }
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Int,
                    value: v,
                    span: start..self.tokens[self.pos.saturating_sub(1)].span.end,
                })
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Float,
                    value: v,
                    span: start..self.tokens[self.pos.saturating_sub(1)].span.end,
                })
            }
            TokenKind::Str(v) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::String,
                    value: v,
                    span: start..self.tokens[self.pos.saturating_sub(1)].span.end,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::LBracket | TokenKind::Struct | TokenKind::Star => self.parse_type(),
            other => Err(format!("expected expression, found {other:?}")),
        }
    }
}

/// Whether an expression looks like a type name and can therefore be
/// followed directly by `{` to start a composite literal.
fn is_type_like(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Ident { .. } | Expr::Selector { .. } | Expr::ArrayType { .. } | Expr::StructType { .. }
    )
}

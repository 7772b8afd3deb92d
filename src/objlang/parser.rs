//! Recursive-descent parser for the object language.
//!
//! Produces a full [`File`] AST from a source string using the zero-copy
//! [`Lexer`]. Unlike a lint-tool parser that degrades gracefully on
//! unexpected input, this parser surfaces every syntax error to the caller:
//! a pattern source or a target file that doesn't parse is a hard failure,
//! not a best-effort partial tree, because a missing branch of the AST would
//! silently make later matches vacuous.

use std::fmt;

use crate::ast::{
    AssignOp, BasicLitKind, BinOp, BranchKind, CaseClause, ChanDir, CommClause, Decl, Expr,
    ExprKind, Field, File, FuncDecl, Ident, Pos, Spanned, Spec, Stmt, StmtKind, UnaryOp,
};
use crate::objlang::lexer::{Lexer, Token};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub offset: Pos,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

pub fn parse_file(src: &str) -> Result<File, ParseError> {
    Parser::new(src)?.parse_file()
}

/// Parse a standalone expression, for pattern fragments that are a bare
/// expression rather than a full file.
pub fn parse_expr_only(src: &str) -> Result<Expr, ParseError> {
    let mut p = Parser::new(src)?;
    let e = p.parse_expr()?;
    p.expect_eof()?;
    Ok(e)
}

pub fn parse_stmt_only(src: &str) -> Result<Stmt, ParseError> {
    let mut p = Parser::new(src)?;
    let s = p.parse_stmt()?;
    p.expect_eof()?;
    Ok(s)
}

/// Parse a standalone type expression, for wildcard `type=`/`asgn=`/`conv=`
/// side-condition values.
pub fn parse_type_only(src: &str) -> Result<Expr, ParseError> {
    let mut p = Parser::new(src)?;
    let t = p.parse_type()?;
    p.expect_eof()?;
    Ok(t)
}

pub fn parse_stmt_list_only(src: &str) -> Result<Vec<Stmt>, ParseError> {
    let mut p = Parser::new(src)?;
    let mut out = Vec::new();
    while !p.at(&Token::Eof) {
        out.push(p.parse_stmt()?);
        p.skip_semis();
    }
    Ok(out)
}

struct Parser<'src> {
    lex: Lexer<'src>,
    cur: Token<'src>,
    cur_offset: Pos,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Result<Self, ParseError> {
        let mut lex = Lexer::new(src);
        let first = lex.next_token().map_err(|e| ParseError { offset: e.offset, message: e.message })?;
        Ok(Parser { lex, cur: first.token, cur_offset: first.offset })
    }

    fn bump(&mut self) -> Result<Token<'src>, ParseError> {
        let next = self.lex.next_token().map_err(|e| ParseError { offset: e.offset, message: e.message })?;
        let prev = std::mem::replace(&mut self.cur, next.token);
        self.cur_offset = next.offset;
        Ok(prev)
    }

    fn at(&self, t: &Token<'_>) -> bool {
        &self.cur == t
    }

    fn expect(&mut self, t: Token<'src>) -> Result<Pos, ParseError> {
        let pos = self.cur_offset;
        if self.cur == t {
            self.bump()?;
            Ok(pos)
        } else {
            Err(ParseError { offset: pos, message: format!("expected {t:?}, found {:?}", self.cur) })
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        self.skip_semis();
        if self.cur == Token::Eof {
            Ok(())
        } else {
            Err(ParseError { offset: self.cur_offset, message: format!("unexpected trailing input {:?}", self.cur) })
        }
    }

    fn skip_semis(&mut self) {
        while self.cur == Token::Semicolon {
            let _ = self.bump();
        }
    }

    fn ident(&mut self) -> Result<Ident, ParseError> {
        let pos = self.cur_offset;
        match self.bump()? {
            Token::Ident(name) => Ok(Ident { name: name.to_string(), pos }),
            other => Err(ParseError { offset: pos, message: format!("expected identifier, found {other:?}") }),
        }
    }

    // ── File ─────────────────────────────────────────────────────────────────

    fn parse_file(&mut self) -> Result<File, ParseError> {
        self.skip_semis();
        self.expect(Token::KwPackage)?;
        let package = self.ident()?;
        self.skip_semis();

        let mut decls = Vec::new();
        while self.cur == Token::KwImport {
            decls.push(self.parse_import_decl()?);
            self.skip_semis();
        }
        while self.cur != Token::Eof {
            decls.push(self.parse_top_decl()?);
            self.skip_semis();
        }
        Ok(File { package, decls })
    }

    fn parse_import_decl(&mut self) -> Result<Decl, ParseError> {
        self.expect(Token::KwImport)?;
        let specs = self.parse_spec_group(Self::parse_import_spec)?;
        Ok(Decl::Import(specs))
    }

    fn parse_import_spec(&mut self) -> Result<Spec, ParseError> {
        let pos = self.cur_offset;
        let name = if let Token::Ident(_) = self.cur {
            Some(self.ident()?)
        } else {
            None
        };
        let path = match self.bump()? {
            Token::Str(s) => strip_quotes(s),
            other => return Err(ParseError { offset: pos, message: format!("expected import path, found {other:?}") }),
        };
        Ok(Spec::Import { name, path, pos })
    }

    fn parse_top_decl(&mut self) -> Result<Decl, ParseError> {
        match self.cur {
            Token::KwVar => {
                self.bump()?;
                Ok(Decl::Var(self.parse_spec_group(Self::parse_value_spec)?))
            }
            Token::KwConst => {
                self.bump()?;
                Ok(Decl::Const(self.parse_spec_group(Self::parse_value_spec)?))
            }
            Token::KwType => {
                self.bump()?;
                Ok(Decl::Type(self.parse_spec_group(Self::parse_type_spec)?))
            }
            Token::KwFunc => self.parse_func_decl(),
            ref other => Err(ParseError { offset: self.cur_offset, message: format!("expected top-level declaration, found {other:?}") }),
        }
    }

    fn parse_spec_group<T>(&mut self, mut one: impl FnMut(&mut Self) -> Result<T, ParseError>) -> Result<Vec<T>, ParseError> {
        if self.cur == Token::LParen {
            self.bump()?;
            self.skip_semis();
            let mut out = Vec::new();
            while self.cur != Token::RParen {
                out.push(one(self)?);
                self.skip_semis();
            }
            self.expect(Token::RParen)?;
            Ok(out)
        } else {
            Ok(vec![one(self)?])
        }
    }

    fn parse_value_spec(&mut self) -> Result<Spec, ParseError> {
        let pos = self.cur_offset;
        let mut names = vec![self.ident()?];
        while self.cur == Token::Comma {
            self.bump()?;
            names.push(self.ident()?);
        }
        let typ = if !matches!(self.cur, Token::Assign | Token::Semicolon | Token::Eof | Token::RParen) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let values = if self.cur == Token::Assign {
            self.bump()?;
            let mut vs = vec![self.parse_expr()?];
            while self.cur == Token::Comma {
                self.bump()?;
                vs.push(self.parse_expr()?);
            }
            vs
        } else {
            Vec::new()
        };
        Ok(Spec::Value { names, typ, values, pos })
    }

    fn parse_type_spec(&mut self) -> Result<Spec, ParseError> {
        let pos = self.cur_offset;
        let name = self.ident()?;
        let typ = self.parse_type()?;
        Ok(Spec::Type { name, typ, pos })
    }

    fn parse_func_decl(&mut self) -> Result<Decl, ParseError> {
        self.expect(Token::KwFunc)?;
        let recv = if self.cur == Token::LParen {
            Some(self.parse_single_param_field()?)
        } else {
            None
        };
        let name = self.ident()?;
        let params = self.parse_param_list()?;
        let results = self.parse_result_list()?;
        let typ = Expr { pos: name.pos, end: name.pos, kind: ExprKind::FuncType { params, results } };
        let body = if self.cur == Token::LBrace { Some(self.parse_block()?) } else { None };
        Ok(Decl::Func(Box::new(FuncDecl { name, recv, typ, body })))
    }

    fn parse_single_param_field(&mut self) -> Result<Field, ParseError> {
        self.expect(Token::LParen)?;
        let name = self.ident()?;
        let typ = self.parse_type()?;
        self.expect(Token::RParen)?;
        Ok(Field { names: vec![name], typ })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(Token::LParen)?;
        let mut out = Vec::new();
        while self.cur != Token::RParen {
            let name = self.ident()?;
            let typ = self.parse_type()?;
            out.push(Field { names: vec![name], typ });
            if self.cur == Token::Comma {
                self.bump()?;
            } else {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(out)
    }

    fn parse_result_list(&mut self) -> Result<Vec<Field>, ParseError> {
        match self.cur {
            Token::LBrace | Token::Semicolon | Token::Eof => Ok(Vec::new()),
            Token::LParen => self.parse_param_list(),
            _ => {
                let typ = self.parse_type()?;
                Ok(vec![Field { names: Vec::new(), typ }])
            }
        }
    }

    // ── Types (reuse the expression grammar) ────────────────────────────────

    fn parse_type(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur_offset;
        match self.cur.clone() {
            Token::Mul => {
                self.bump()?;
                let inner = self.parse_type()?;
                Ok(Expr { pos, end: inner.end, kind: ExprKind::Star(Box::new(inner)) })
            }
            Token::LBracket => {
                self.bump()?;
                let len = if self.cur == Token::RBracket { None } else { Some(Box::new(self.parse_expr()?)) };
                self.expect(Token::RBracket)?;
                let elt = Box::new(self.parse_type()?);
                Ok(Expr { pos, end: elt.end, kind: ExprKind::ArrayType { len, elt } })
            }
            Token::KwStruct => {
                self.bump()?;
                self.expect(Token::LBrace)?;
                self.skip_semis();
                let mut fields = Vec::new();
                while self.cur != Token::RBrace {
                    fields.push(self.parse_field())?;
                    self.skip_semis();
                }
                let end = self.expect(Token::RBrace)?;
                Ok(Expr { pos, end, kind: ExprKind::StructType { fields } })
            }
            Token::KwInterface => {
                self.bump()?;
                self.expect(Token::LBrace)?;
                self.skip_semis();
                let mut methods = Vec::new();
                while self.cur != Token::RBrace {
                    methods.push(self.parse_field())?;
                    self.skip_semis();
                }
                let end = self.expect(Token::RBrace)?;
                Ok(Expr { pos, end, kind: ExprKind::InterfaceType { methods } })
            }
            Token::KwFunc => {
                self.bump()?;
                let params = self.parse_param_list()?;
                let results = self.parse_result_list()?;
                Ok(Expr { pos, end: pos, kind: ExprKind::FuncType { params, results } })
            }
            Token::KwMap => {
                self.bump()?;
                self.expect(Token::LBracket)?;
                let key = Box::new(self.parse_type()?);
                self.expect(Token::RBracket)?;
                let value = Box::new(self.parse_type()?);
                Ok(Expr { pos, end: value.end, kind: ExprKind::MapType { key, value } })
            }
            Token::KwChan => {
                self.bump()?;
                let value = Box::new(self.parse_type()?);
                Ok(Expr { pos, end: value.end, kind: ExprKind::ChanType { dir: ChanDir::Both, value } })
            }
            Token::Arrow => {
                self.bump()?;
                self.expect(Token::KwChan)?;
                let value = Box::new(self.parse_type()?);
                Ok(Expr { pos, end: value.end, kind: ExprKind::ChanType { dir: ChanDir::Recv, value } })
            }
            Token::LParen => {
                self.bump()?;
                let inner = self.parse_type()?;
                let end = self.expect(Token::RParen)?;
                Ok(Expr { pos, end, kind: ExprKind::Paren(Box::new(inner)) })
            }
            _ => self.parse_type_name(),
        }
    }

    fn parse_type_name(&mut self) -> Result<Expr, ParseError> {
        let id = self.ident()?;
        let pos = id.pos;
        let mut e = Expr { pos, end: id.end(), kind: ExprKind::Ident(id) };
        while self.cur == Token::Dot {
            self.bump()?;
            let sel = self.ident()?;
            let end = sel.end();
            e = Expr { pos, end, kind: ExprKind::Selector { x: Box::new(e), sel } };
        }
        Ok(e)
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let mut names = vec![self.ident()?];
        while self.cur == Token::Comma {
            self.bump()?;
            names.push(self.ident()?);
        }
        let typ = self.parse_type()?;
        Ok(Field { names, typ })
    }

    // ── Statements ───────────────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace)?;
        self.skip_semis();
        let mut out = Vec::new();
        while self.cur != Token::RBrace {
            out.push(self.parse_stmt()?);
            self.skip_semis();
        }
        self.expect(Token::RBrace)?;
        Ok(out)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        match self.cur.clone() {
            Token::LBrace => {
                let body = self.parse_block()?;
                let end = body.last().map(|s| s.end).unwrap_or(pos);
                Ok(Stmt { pos, end, kind: StmtKind::Block(body) })
            }
            Token::KwVar | Token::KwConst | Token::KwType => {
                let decl = if self.cur == Token::KwVar {
                    self.bump()?;
                    Decl::Var(self.parse_spec_group(Self::parse_value_spec)?)
                } else if self.cur == Token::KwConst {
                    self.bump()?;
                    Decl::Const(self.parse_spec_group(Self::parse_value_spec)?)
                } else {
                    self.bump()?;
                    Decl::Type(self.parse_spec_group(Self::parse_type_spec)?)
                };
                Ok(Stmt { pos, end: pos, kind: StmtKind::Decl(decl) })
            }
            Token::KwReturn => {
                self.bump()?;
                let mut es = Vec::new();
                if !matches!(self.cur, Token::Semicolon | Token::RBrace | Token::Eof) {
                    es.push(self.parse_expr()?);
                    while self.cur == Token::Comma {
                        self.bump()?;
                        es.push(self.parse_expr()?);
                    }
                }
                Ok(Stmt { pos, end: pos, kind: StmtKind::Return(es) })
            }
            Token::KwBreak | Token::KwContinue | Token::KwGoto | Token::KwFallthrough => {
                let kind = match self.bump()? {
                    Token::KwBreak => BranchKind::Break,
                    Token::KwContinue => BranchKind::Continue,
                    Token::KwGoto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label =
                    if let Token::Ident(_) = self.cur { Some(self.ident()?) } else { None };
                Ok(Stmt { pos, end: pos, kind: StmtKind::Branch { kind, label } })
            }
            Token::KwGo => {
                self.bump()?;
                let e = self.parse_expr()?;
                let end = e.end;
                Ok(Stmt { pos, end, kind: StmtKind::Go(e) })
            }
            Token::KwDefer => {
                self.bump()?;
                let e = self.parse_expr()?;
                let end = e.end;
                Ok(Stmt { pos, end, kind: StmtKind::Defer(e) })
            }
            Token::KwIf => self.parse_if(),
            Token::KwFor => self.parse_for(),
            Token::KwSwitch => self.parse_switch(),
            Token::KwSelect => self.parse_select(),
            Token::Semicolon => Ok(Stmt { pos, end: pos, kind: StmtKind::Empty }),
            _ => self.parse_simple_stmt(),
        }
    }

    /// Labeled statements, assignments, send, inc/dec, and bare expression
    /// statements all start the same way: parse an expression list and
    /// disambiguate on what follows.
    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        if let Token::Ident(name) = self.cur {
            if self.peek_is_colon_not_define(name) {
                let label = self.ident()?;
                self.expect(Token::Colon)?;
                let stmt = Box::new(self.parse_stmt()?);
                let end = stmt.end;
                return Ok(Stmt { pos, end, kind: StmtKind::Labeled { label, stmt } });
            }
        }

        let mut lhs = vec![self.parse_expr()?];
        while self.cur == Token::Comma {
            self.bump()?;
            lhs.push(self.parse_expr()?);
        }

        match self.cur {
            Token::Arrow => {
                self.bump()?;
                let value = self.parse_expr()?;
                let chan = lhs.into_iter().next().unwrap();
                let end = value.end;
                Ok(Stmt { pos, end, kind: StmtKind::Send { chan, value } })
            }
            Token::Inc | Token::Dec => {
                let is_inc = self.bump()? == Token::Inc;
                let x = lhs.into_iter().next().unwrap();
                let end = x.end;
                Ok(Stmt { pos, end, kind: StmtKind::IncDec { x, is_inc } })
            }
            Token::Assign
            | Token::Define
            | Token::AddAssign
            | Token::SubAssign
            | Token::MulAssign
            | Token::QuoAssign
            | Token::RemAssign => {
                let op = match self.bump()? {
                    Token::Assign => AssignOp::Assign,
                    Token::Define => AssignOp::Define,
                    Token::AddAssign => AssignOp::AddAssign,
                    Token::SubAssign => AssignOp::SubAssign,
                    Token::MulAssign => AssignOp::MulAssign,
                    Token::QuoAssign => AssignOp::QuoAssign,
                    _ => AssignOp::RemAssign,
                };
                let mut rhs = vec![self.parse_expr()?];
                while self.cur == Token::Comma {
                    self.bump()?;
                    rhs.push(self.parse_expr()?);
                }
                let end = rhs.last().unwrap().end;
                Ok(Stmt { pos, end, kind: StmtKind::Assign { op, lhs, rhs } })
            }
            _ => {
                let e = lhs.into_iter().next().unwrap();
                let end = e.end;
                Ok(Stmt { pos, end, kind: StmtKind::Expr(e) })
            }
        }
    }

    /// A bare identifier followed directly by `:` (not `:=`) opens a labeled
    /// statement. Scans raw source text past the identifier rather than
    /// bumping the token stream, since there is no cheap way to un-lex a
    /// token once consumed.
    fn peek_is_colon_not_define(&mut self, name: &str) -> bool {
        let rest = self.lex.source_from(self.cur_offset as usize + name.len());
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace());
        trimmed.starts_with(':') && !trimmed.starts_with(":=")
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        self.expect(Token::KwIf)?;
        let (init, cond) = self.parse_if_header()?;
        let body = self.parse_block()?;
        let els = if self.cur == Token::KwElse {
            self.bump()?;
            if self.cur == Token::KwIf {
                Some(Box::new(self.parse_if()?))
            } else {
                let b = self.parse_block()?;
                let end = b.last().map(|s| s.end).unwrap_or(pos);
                Some(Box::new(Stmt { pos, end, kind: StmtKind::Block(b) }))
            }
        } else {
            None
        };
        let end = els.as_ref().map(|s| s.end).or_else(|| body.last().map(|s| s.end)).unwrap_or(pos);
        Ok(Stmt { pos, end, kind: StmtKind::If { init, cond, body, els } })
    }

    fn parse_if_header(&mut self) -> Result<(Option<Box<Stmt>>, Expr), ParseError> {
        let first = self.parse_simple_stmt_no_brace()?;
        if self.cur == Token::Semicolon {
            self.bump()?;
            let cond_stmt = self.parse_simple_stmt_no_brace()?;
            let cond = match cond_stmt.kind {
                StmtKind::Expr(e) => e,
                _ => return Err(ParseError { offset: cond_stmt.pos, message: "expected condition expression".to_string() }),
            };
            Ok((Some(Box::new(first)), cond))
        } else {
            let cond = match first.kind {
                StmtKind::Expr(e) => e,
                _ => return Err(ParseError { offset: first.pos, message: "expected condition expression".to_string() }),
            };
            Ok((None, cond))
        }
    }

    /// Parse one simple statement without treating `{` as the start of a
    /// composite literal — used for `if`/`for`/`switch` headers, where `{`
    /// always opens the body.
    fn parse_simple_stmt_no_brace(&mut self) -> Result<Stmt, ParseError> {
        self.parse_simple_stmt()
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        self.expect(Token::KwFor)?;
        if self.cur == Token::LBrace {
            let body = self.parse_block()?;
            let end = body.last().map(|s| s.end).unwrap_or(pos);
            return Ok(Stmt { pos, end, kind: StmtKind::For { init: None, cond: None, post: None, body } });
        }

        // range form: for [key[, value]] := range X { ... }
        if self.looks_like_range() {
            return self.parse_range();
        }

        if self.cur == Token::Semicolon {
            self.bump()?;
            let cond = if self.cur == Token::Semicolon { None } else { Some(self.parse_expr()?) };
            self.expect(Token::Semicolon)?;
            let post = if self.cur == Token::LBrace { None } else { Some(Box::new(self.parse_simple_stmt()?)) };
            let body = self.parse_block()?;
            let end = body.last().map(|s| s.end).unwrap_or(pos);
            return Ok(Stmt { pos, end, kind: StmtKind::For { init: None, cond, post, body } });
        }

        let first = self.parse_simple_stmt()?;
        if self.cur == Token::LBrace {
            let cond = match first.kind {
                StmtKind::Expr(e) => Some(e),
                _ => return Err(ParseError { offset: first.pos, message: "expected loop condition".to_string() }),
            };
            let body = self.parse_block()?;
            let end = body.last().map(|s| s.end).unwrap_or(pos);
            return Ok(Stmt { pos, end, kind: StmtKind::For { init: None, cond, post: None, body } });
        }
        self.expect(Token::Semicolon)?;
        let cond = if self.cur == Token::Semicolon { None } else { Some(self.parse_expr()?) };
        self.expect(Token::Semicolon)?;
        let post = if self.cur == Token::LBrace { None } else { Some(Box::new(self.parse_simple_stmt()?)) };
        let body = self.parse_block()?;
        let end = body.last().map(|s| s.end).unwrap_or(pos);
        Ok(Stmt { pos, end, kind: StmtKind::For { init: Some(Box::new(first)), cond, post, body } })
    }

    /// Heuristic lookahead for `for ... range` without a real checkpoint/
    /// rewind facility: the object language only ever uses `range` directly
    /// after `:=`/`=`, so a shallow scan of raw source text from the
    /// current offset to the next `{` is sufficient and avoids building a
    /// backtracking token buffer for a single rare construct.
    fn looks_like_range(&self) -> bool {
        let rest = self.lex.source_from(self.cur_offset as usize);
        match rest.find('{') {
            Some(brace_idx) => rest[..brace_idx].split_whitespace().any(|w| w == "range"),
            None => false,
        }
    }

    fn parse_range(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        let mut key = None;
        let mut value = None;
        let mut define = false;
        if self.cur != Token::KwRange {
            key = Some(self.parse_expr()?);
            if self.cur == Token::Comma {
                self.bump()?;
                value = Some(self.parse_expr()?);
            }
            define = self.cur == Token::Define;
            if matches!(self.cur, Token::Assign | Token::Define) {
                self.bump()?;
            }
        }
        self.expect(Token::KwRange)?;
        let x = self.parse_expr()?;
        let body = self.parse_block()?;
        let end = body.last().map(|s| s.end).unwrap_or(pos);
        Ok(Stmt { pos, end, kind: StmtKind::Range { key, value, define, x, body } })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        self.expect(Token::KwSwitch)?;

        let (init, tag, assign) = if self.cur == Token::LBrace {
            (None, None, None)
        } else {
            let first = self.parse_simple_stmt()?;
            if self.cur == Token::Semicolon {
                self.bump()?;
                if self.cur == Token::LBrace {
                    (Some(Box::new(first)), None, None)
                } else {
                    let second = self.parse_simple_stmt()?;
                    self.resolve_switch_tag(Some(Box::new(first)), second)?
                }
            } else {
                self.resolve_switch_tag(None, first)?
            }
        };

        self.expect(Token::LBrace)?;
        self.skip_semis();
        let mut cases = Vec::new();
        while self.cur != Token::RBrace {
            cases.push(self.parse_case_clause()?);
            self.skip_semis();
        }
        let end = self.expect(Token::RBrace)?;

        if let Some(assign) = assign {
            Ok(Stmt { pos, end, kind: StmtKind::TypeSwitch { init, assign: Some(assign), x: tag.unwrap(), cases } })
        } else {
            Ok(Stmt { pos, end, kind: StmtKind::Switch { init, tag, cases } })
        }
    }

    #[allow(clippy::type_complexity)]
    fn resolve_switch_tag(
        &mut self,
        init: Option<Box<Stmt>>,
        stmt: Stmt,
    ) -> Result<(Option<Box<Stmt>>, Option<Expr>, Option<Ident>), ParseError> {
        match stmt.kind {
            StmtKind::Expr(Expr { kind: ExprKind::TypeAssert { x, typ: None }, .. }) => {
                Ok((init, Some(*x), None))
            }
            StmtKind::Expr(e) => Ok((init, Some(e), None)),
            StmtKind::Assign { op: AssignOp::Define, mut lhs, mut rhs } if lhs.len() == 1 && rhs.len() == 1 => {
                let name = match lhs.pop().unwrap().kind {
                    ExprKind::Ident(id) => id,
                    _ => return Err(ParseError { offset: stmt.pos, message: "expected identifier in type switch guard".to_string() }),
                };
                let x = match rhs.pop().unwrap().kind {
                    ExprKind::TypeAssert { x, typ: None } => *x,
                    other => Expr { pos: stmt.pos, end: stmt.end, kind: other },
                };
                Ok((init, Some(x), Some(name)))
            }
            _ => Err(ParseError { offset: stmt.pos, message: "expected switch tag expression".to_string() }),
        }
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, ParseError> {
        let mut values = Vec::new();
        if self.cur == Token::KwCase {
            self.bump()?;
            values.push(self.parse_expr()?);
            while self.cur == Token::Comma {
                self.bump()?;
                values.push(self.parse_expr()?);
            }
        } else {
            self.expect(Token::KwDefault)?;
        }
        self.expect(Token::Colon)?;
        self.skip_semis();
        let mut body = Vec::new();
        while !matches!(self.cur, Token::KwCase | Token::KwDefault | Token::RBrace) {
            body.push(self.parse_stmt()?);
            self.skip_semis();
        }
        Ok(CaseClause { values, body })
    }

    fn parse_select(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cur_offset;
        self.expect(Token::KwSelect)?;
        self.expect(Token::LBrace)?;
        self.skip_semis();
        let mut comms = Vec::new();
        while self.cur != Token::RBrace {
            let comm = if self.cur == Token::KwCase {
                self.bump()?;
                let s = self.parse_simple_stmt()?;
                Some(Box::new(s))
            } else {
                self.expect(Token::KwDefault)?;
                None
            };
            self.expect(Token::Colon)?;
            self.skip_semis();
            let mut body = Vec::new();
            while !matches!(self.cur, Token::KwCase | Token::KwDefault | Token::RBrace) {
                body.push(self.parse_stmt()?);
                self.skip_semis();
            }
            comms.push(CommClause { comm, body });
        }
        let end = self.expect(Token::RBrace)?;
        Ok(Stmt { pos, end, kind: StmtKind::Select { comms } })
    }

    // ── Expressions (precedence climbing) ───────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn binop_prec(t: &Token<'_>) -> Option<(u8, BinOp)> {
        Some(match t {
            Token::Lor => (1, BinOp::Lor),
            Token::Land => (2, BinOp::Land),
            Token::Eq => (3, BinOp::Eq),
            Token::Ne => (3, BinOp::Ne),
            Token::Lt => (3, BinOp::Lt),
            Token::Le => (3, BinOp::Le),
            Token::Gt => (3, BinOp::Gt),
            Token::Ge => (3, BinOp::Ge),
            Token::Add => (4, BinOp::Add),
            Token::Sub => (4, BinOp::Sub),
            Token::Or => (4, BinOp::Or),
            Token::Xor => (4, BinOp::Xor),
            Token::Mul => (5, BinOp::Mul),
            Token::Quo => (5, BinOp::Quo),
            Token::Rem => (5, BinOp::Rem),
            Token::And => (5, BinOp::And),
            Token::Shl => (5, BinOp::Shl),
            Token::Shr => (5, BinOp::Shr),
            _ => return None,
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some((prec, op)) = Self::binop_prec(&self.cur) {
            if prec < min_prec {
                break;
            }
            self.bump()?;
            let rhs = self.parse_binary(prec + 1)?;
            let pos = lhs.pos;
            let end = rhs.end;
            lhs = Expr { pos, end, kind: ExprKind::Binary { op, x: Box::new(lhs), y: Box::new(rhs) } };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur_offset;
        let op = match self.cur {
            Token::Add => UnaryOp::Pos,
            Token::Sub => UnaryOp::Neg,
            Token::Not => UnaryOp::Not,
            Token::Xor => UnaryOp::Xor,
            Token::Arrow => UnaryOp::Recv,
            Token::Mul => {
                self.bump()?;
                let x = self.parse_unary()?;
                let end = x.end;
                return Ok(Expr { pos, end, kind: ExprKind::Star(Box::new(x)) });
            }
            Token::And => {
                self.bump()?;
                let x = self.parse_unary()?;
                let end = x.end;
                return Ok(Expr { pos, end, kind: ExprKind::Unary { op: UnaryOp::Pos, x: Box::new(x) } });
            }
            _ => return self.parse_postfix(),
        };
        self.bump()?;
        let x = self.parse_unary()?;
        let end = x.end;
        Ok(Expr { pos, end, kind: ExprKind::Unary { op, x: Box::new(x) } })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_primary()?;
        loop {
            match self.cur {
                Token::Dot => {
                    self.bump()?;
                    if self.cur == Token::LParen {
                        self.bump()?;
                        let typ = if self.cur == Token::KwType {
                            self.bump()?;
                            None
                        } else {
                            Some(Box::new(self.parse_type()?))
                        };
                        let end = self.expect(Token::RParen)?;
                        e = Expr { pos: e.pos, end, kind: ExprKind::TypeAssert { x: Box::new(e), typ } };
                    } else {
                        let sel = self.ident()?;
                        let end = sel.end();
                        e = Expr { pos: e.pos, end, kind: ExprKind::Selector { x: Box::new(e), sel } };
                    }
                }
                Token::LParen => {
                    self.bump()?;
                    let mut args = Vec::new();
                    let mut has_ellipsis = false;
                    while self.cur != Token::RParen {
                        args.push(self.parse_expr()?);
                        if self.cur == Token::Ellipsis {
                            self.bump()?;
                            has_ellipsis = true;
                        }
                        if self.cur == Token::Comma {
                            self.bump()?;
                        } else {
                            break;
                        }
                    }
                    let end = self.expect(Token::RParen)?;
                    e = Expr { pos: e.pos, end, kind: ExprKind::Call { fun: Box::new(e), args, has_ellipsis } };
                }
                Token::LBracket => {
                    self.bump()?;
                    if self.cur == Token::Colon {
                        self.bump()?;
                        let hi = if matches!(self.cur, Token::RBracket | Token::Colon) { None } else { Some(Box::new(self.parse_expr()?)) };
                        let max = if self.cur == Token::Colon {
                            self.bump()?;
                            Some(Box::new(self.parse_expr()?))
                        } else {
                            None
                        };
                        let end = self.expect(Token::RBracket)?;
                        e = Expr { pos: e.pos, end, kind: ExprKind::Slice { x: Box::new(e), lo: None, hi, max } };
                    } else {
                        let index = Box::new(self.parse_expr()?);
                        if self.cur == Token::Colon {
                            self.bump()?;
                            let hi = if matches!(self.cur, Token::RBracket | Token::Colon) { None } else { Some(Box::new(self.parse_expr()?)) };
                            let max = if self.cur == Token::Colon {
                                self.bump()?;
                                Some(Box::new(self.parse_expr()?))
                            } else {
                                None
                            };
                            let end = self.expect(Token::RBracket)?;
                            e = Expr { pos: e.pos, end, kind: ExprKind::Slice { x: Box::new(e), lo: Some(index), hi, max } };
                        } else {
                            let end = self.expect(Token::RBracket)?;
                            e = Expr { pos: e.pos, end, kind: ExprKind::Index { x: Box::new(e), index } };
                        }
                    }
                }
                Token::LBrace if composite_lit_allowed(&e) => {
                    e = self.parse_composite_lit(e)?;
                }
                _ => break,
            }
        }
        Ok(e)
    }

    fn parse_composite_lit(&mut self, typ: Expr) -> Result<Expr, ParseError> {
        let pos = typ.pos;
        self.expect(Token::LBrace)?;
        self.skip_semis();
        let mut elts = Vec::new();
        while self.cur != Token::RBrace {
            let first = self.parse_expr_or_nested_lit()?;
            if self.cur == Token::Colon {
                self.bump()?;
                let value = self.parse_expr_or_nested_lit()?;
                elts.push(Expr { pos: first.pos, end: value.end, kind: ExprKind::KeyValue { key: Box::new(first), value: Box::new(value) } });
            } else {
                elts.push(first);
            }
            if self.cur == Token::Comma {
                self.bump()?;
                self.skip_semis();
            } else {
                break;
            }
        }
        self.skip_semis();
        let end = self.expect(Token::RBrace)?;
        Ok(Expr { pos, end, kind: ExprKind::CompositeLit { typ: Some(Box::new(typ)), elts } })
    }

    fn parse_expr_or_nested_lit(&mut self) -> Result<Expr, ParseError> {
        if self.cur == Token::LBrace {
            let pos = self.cur_offset;
            self.bump()?;
            self.skip_semis();
            let mut elts = Vec::new();
            while self.cur != Token::RBrace {
                let first = self.parse_expr_or_nested_lit()?;
                if self.cur == Token::Colon {
                    self.bump()?;
                    let value = self.parse_expr_or_nested_lit()?;
                    elts.push(Expr { pos: first.pos, end: value.end, kind: ExprKind::KeyValue { key: Box::new(first), value: Box::new(value) } });
                } else {
                    elts.push(first);
                }
                if self.cur == Token::Comma {
                    self.bump()?;
                    self.skip_semis();
                } else {
                    break;
                }
            }
            self.skip_semis();
            let end = self.expect(Token::RBrace)?;
            Ok(Expr { pos, end, kind: ExprKind::CompositeLit { typ: None, elts } })
        } else {
            self.parse_expr()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.cur_offset;
        match self.cur.clone() {
            Token::Ident(name) => {
                self.bump()?;
                Ok(Expr { pos, end: pos + name.len() as Pos, kind: ExprKind::Ident(Ident { name: name.to_string(), pos }) })
            }
            Token::Int(v) => {
                self.bump()?;
                Ok(Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: v.to_string() } })
            }
            Token::Float(v) => {
                self.bump()?;
                Ok(Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Float, value: v.to_string() } })
            }
            Token::Str(v) => {
                self.bump()?;
                Ok(Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::String, value: strip_quotes(v) } })
            }
            Token::Char(v) => {
                self.bump()?;
                Ok(Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Char, value: strip_quotes(v) } })
            }
            Token::KwNil => {
                self.bump()?;
                Ok(Expr { pos, end: pos + 3, kind: ExprKind::BasicLit { kind: BasicLitKind::Nil, value: "nil".to_string() } })
            }
            Token::KwTrue | Token::KwFalse => {
                let is_true = self.bump()? == Token::KwTrue;
                let text = if is_true { "true" } else { "false" };
                Ok(Expr { pos, end: pos + text.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Bool, value: text.to_string() } })
            }
            Token::LParen => {
                self.bump()?;
                let inner = self.parse_expr()?;
                let end = self.expect(Token::RParen)?;
                Ok(Expr { pos, end, kind: ExprKind::Paren(Box::new(inner)) })
            }
            Token::KwFunc => {
                self.bump()?;
                let params = self.parse_param_list()?;
                let results = self.parse_result_list()?;
                let typ = Expr { pos, end: pos, kind: ExprKind::FuncType { params, results } };
                let body = self.parse_block()?;
                let end = body.last().map(|s| s.end).unwrap_or(pos);
                Ok(Expr { pos, end, kind: ExprKind::FuncLit { typ: Box::new(typ), body } })
            }
            Token::LBracket | Token::KwStruct | Token::KwInterface | Token::KwMap | Token::KwChan | Token::Mul => {
                self.parse_type()
            }
            other => Err(ParseError { offset: pos, message: format!("unexpected token {other:?} in expression") }),
        }
    }
}

fn composite_lit_allowed(e: &Expr) -> bool {
    matches!(
        e.kind,
        ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::ArrayType { .. } | ExprKind::StructType { .. } | ExprKind::MapType { .. }
    )
}

fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_file() {
        let src = "package main\n\nfunc main() {\n\treturn\n}\n";
        let file = parse_file(src).unwrap();
        assert_eq!(file.package.name, "main");
        assert_eq!(file.decls.len(), 1);
    }

    #[test]
    fn parses_binary_precedence() {
        let e = parse_expr_only("1 + 2 * 3").unwrap();
        match e.kind {
            ExprKind::Binary { op: BinOp::Add, y, .. } => match y.kind {
                ExprKind::Binary { op: BinOp::Mul, .. } => {}
                other => panic!("expected nested Mul, got {other:?}"),
            },
            other => panic!("expected Add at the top, got {other:?}"),
        }
    }

    #[test]
    fn parses_call_with_args() {
        let e = parse_expr_only("f(a, b, c)").unwrap();
        match e.kind {
            ExprKind::Call { args, .. } => assert_eq!(args.len(), 3),
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_with_init_and_else() {
        let s = parse_stmt_only("if x := f(); x > 0 { y() } else { z() }").unwrap();
        match s.kind {
            StmtKind::If { init: Some(_), els: Some(_), .. } => {}
            other => panic!("expected full If, got {other:?}"),
        }
    }

    #[test]
    fn parses_assignment() {
        let s = parse_stmt_only("x, y = y, x").unwrap();
        match s.kind {
            StmtKind::Assign { op: AssignOp::Assign, lhs, rhs } => {
                assert_eq!(lhs.len(), 2);
                assert_eq!(rhs.len(), 2);
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_file("package main\nfunc (\n").is_err());
    }
}

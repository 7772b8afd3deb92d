//! AST splice: locates the parent slot that held the originally matched
//! node inside the *original* tree and replaces it with a freshly
//! filled-and-scrubbed replacement fragment, then assigns
//! real positions to whatever in the inserted fragment is still
//! "no-position" so the output keeps monotone source coordinates.
//!
//! Parent discovery is structural rather than pointer-based: each recursive
//! descent function checks, at every expression or statement slot of the
//! node it holds, whether that slot's span equals the target. The first
//! slot found in traversal order is the splice point; everything else is
//! rebuilt unchanged around it. This plays the same role as an explicit
//! parent map without needing one, since Rust's ownership rules make an
//! actual mutable-pointer parent map awkward to build and walk safely —
//! the rebuild is the idiomatic substitute.
//!
//! A single-identifier parent slot is one of the four shapes the underlying
//! contract allows for, but no walker/matcher candidate root this crate
//! produces is ever a lone identifier, so it never arises here and has no
//! splice support.

use std::fmt;

use crate::ast::{Decl, Expr, ExprKind, Field, File, Pos, Spanned, Spec, Stmt, StmtKind, NO_POS};

/// A fresh, already-filled-and-scrubbed fragment ready to replace the node
/// spanning `(pos, end)` in the original tree.
#[derive(Debug, Clone)]
pub enum Replacement {
    Expr(Expr),
    Stmt(Stmt),
    StmtList(Vec<Stmt>),
}

impl Replacement {
    fn into_expr(self) -> Result<Expr, SpliceError> {
        match self {
            Replacement::Expr(e) => Ok(e),
            other => Err(err(format!("cannot splice {other:?} into an expression slot"))),
        }
    }

    fn into_stmt(self) -> Result<Stmt, SpliceError> {
        match self {
            Replacement::Stmt(s) => Ok(s),
            Replacement::Expr(e) => Ok(Stmt { pos: e.pos, end: e.end, kind: StmtKind::Expr(e) }),
            other => Err(err(format!("cannot splice {other:?} into a statement slot"))),
        }
    }

    fn into_expr_run(self) -> Result<Vec<Expr>, SpliceError> {
        match self {
            Replacement::Expr(e) => Ok(vec![e]),
            other => Err(err(format!("cannot splice {other:?} into an expression-list slot"))),
        }
    }

    fn into_stmt_run(self) -> Result<Vec<Stmt>, SpliceError> {
        match self {
            Replacement::StmtList(list) => Ok(list),
            Replacement::Stmt(s) => Ok(vec![s]),
            Replacement::Expr(e) => Ok(vec![Stmt { pos: e.pos, end: e.end, kind: StmtKind::Expr(e) }]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpliceError(String);

impl fmt::Display for SpliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SpliceError {}

fn err(msg: impl Into<String>) -> SpliceError {
    SpliceError(msg.into())
}

/// Replace the node spanning `(pos, end)` inside `file` with `replacement`.
/// Fails if no slot in `file` spans exactly `(pos, end)` — by contract this
/// is unreachable for a span produced by this crate's own command
/// pipeline, since the parent map (here, the traversal itself) is complete.
pub fn splice_file(file: &File, pos: Pos, end: Pos, replacement: Replacement) -> Result<File, SpliceError> {
    let mut found = false;
    let decls = splice_decl_list(&file.decls, pos, end, replacement, &mut found)?;
    if !found {
        return Err(err(format!("no parent slot spans ({pos}, {end})")));
    }
    Ok(File { package: file.package.clone(), decls })
}

// ── fix positions: assign real coordinates to whatever the splice left at NO_POS ──

fn fix_expr(e: &mut Expr, fallback_pos: Pos, fallback_end: Pos) {
    if e.pos == NO_POS {
        e.pos = fallback_pos;
    }
    if e.end == NO_POS {
        e.end = fallback_end;
    }
    match &mut e.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(t) = typ {
                fix_expr(t, fallback_pos, fallback_end);
            }
            elts.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
        }
        ExprKind::KeyValue { key, value } => {
            fix_expr(key, fallback_pos, fallback_end);
            fix_expr(value, fallback_pos, fallback_end);
        }
        ExprKind::FuncLit { typ, body } => {
            fix_expr(typ, fallback_pos, fallback_end);
            body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
        }
        ExprKind::Selector { x, .. } => fix_expr(x, fallback_pos, fallback_end),
        ExprKind::Index { x, index } => {
            fix_expr(x, fallback_pos, fallback_end);
            fix_expr(index, fallback_pos, fallback_end);
        }
        ExprKind::Slice { x, lo, hi, max } => {
            fix_expr(x, fallback_pos, fallback_end);
            [lo, hi, max].into_iter().flatten().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
        }
        ExprKind::TypeAssert { x, typ } => {
            fix_expr(x, fallback_pos, fallback_end);
            if let Some(t) = typ {
                fix_expr(t, fallback_pos, fallback_end);
            }
        }
        ExprKind::Call { fun, args, .. } => {
            fix_expr(fun, fallback_pos, fallback_end);
            args.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
        }
        ExprKind::Star(x) | ExprKind::Paren(x) => fix_expr(x, fallback_pos, fallback_end),
        ExprKind::Unary { x, .. } => fix_expr(x, fallback_pos, fallback_end),
        ExprKind::Binary { x, y, .. } => {
            fix_expr(x, fallback_pos, fallback_end);
            fix_expr(y, fallback_pos, fallback_end);
        }
        ExprKind::ArrayType { len, elt } => {
            if let Some(l) = len {
                fix_expr(l, fallback_pos, fallback_end);
            }
            fix_expr(elt, fallback_pos, fallback_end);
        }
        ExprKind::StructType { fields } | ExprKind::InterfaceType { methods: fields } => {
            fix_fields(fields, fallback_pos, fallback_end);
        }
        ExprKind::FuncType { params, results } => {
            fix_fields(params, fallback_pos, fallback_end);
            fix_fields(results, fallback_pos, fallback_end);
        }
        ExprKind::MapType { key, value } => {
            fix_expr(key, fallback_pos, fallback_end);
            fix_expr(value, fallback_pos, fallback_end);
        }
        ExprKind::ChanType { value, .. } => fix_expr(value, fallback_pos, fallback_end),
    }
}

fn fix_fields(fields: &mut [Field], fallback_pos: Pos, fallback_end: Pos) {
    for f in fields {
        for name in &mut f.names {
            if name.pos == NO_POS {
                name.pos = fallback_pos;
            }
        }
        fix_expr(&mut f.typ, fallback_pos, fallback_end);
    }
}

fn fix_stmt(s: &mut Stmt, fallback_pos: Pos, fallback_end: Pos) {
    if s.pos == NO_POS {
        s.pos = fallback_pos;
    }
    if s.end == NO_POS {
        s.end = fallback_end;
    }
    match &mut s.kind {
        StmtKind::Block(b) => b.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end)),
        StmtKind::Expr(e) => fix_expr(e, fallback_pos, fallback_end),
        StmtKind::Assign { lhs, rhs, .. } => {
            lhs.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
            rhs.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
        }
        StmtKind::Return(es) => es.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end)),
        StmtKind::Branch { .. } => {}
        StmtKind::Labeled { stmt, .. } => fix_stmt(stmt, fallback_pos, fallback_end),
        StmtKind::Send { chan, value } => {
            fix_expr(chan, fallback_pos, fallback_end);
            fix_expr(value, fallback_pos, fallback_end);
        }
        StmtKind::IncDec { x, .. } => fix_expr(x, fallback_pos, fallback_end),
        StmtKind::Decl(d) => fix_decl(d, fallback_pos, fallback_end),
        StmtKind::Go(e) | StmtKind::Defer(e) => fix_expr(e, fallback_pos, fallback_end),
        StmtKind::If { init, cond, body, els } => {
            if let Some(i) = init {
                fix_stmt(i, fallback_pos, fallback_end);
            }
            fix_expr(cond, fallback_pos, fallback_end);
            body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
            if let Some(e) = els {
                fix_stmt(e, fallback_pos, fallback_end);
            }
        }
        StmtKind::For { init, cond, post, body } => {
            if let Some(i) = init {
                fix_stmt(i, fallback_pos, fallback_end);
            }
            if let Some(c) = cond {
                fix_expr(c, fallback_pos, fallback_end);
            }
            if let Some(p) = post {
                fix_stmt(p, fallback_pos, fallback_end);
            }
            body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
        }
        StmtKind::Range { key, value, x, body, .. } => {
            if let Some(k) = key {
                fix_expr(k, fallback_pos, fallback_end);
            }
            if let Some(v) = value {
                fix_expr(v, fallback_pos, fallback_end);
            }
            fix_expr(x, fallback_pos, fallback_end);
            body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
        }
        StmtKind::Switch { init, tag, cases } => {
            if let Some(i) = init {
                fix_stmt(i, fallback_pos, fallback_end);
            }
            if let Some(t) = tag {
                fix_expr(t, fallback_pos, fallback_end);
            }
            fix_cases(cases, fallback_pos, fallback_end);
        }
        StmtKind::TypeSwitch { init, x, cases, .. } => {
            if let Some(i) = init {
                fix_stmt(i, fallback_pos, fallback_end);
            }
            fix_expr(x, fallback_pos, fallback_end);
            fix_cases(cases, fallback_pos, fallback_end);
        }
        StmtKind::Select { comms } => {
            for c in comms {
                if let Some(comm) = &mut c.comm {
                    fix_stmt(comm, fallback_pos, fallback_end);
                }
                c.body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
            }
        }
        StmtKind::Empty => {}
    }
}

fn fix_cases(cases: &mut [crate::ast::CaseClause], fallback_pos: Pos, fallback_end: Pos) {
    for c in cases {
        c.values.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
        c.body.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
    }
}

fn fix_decl(d: &mut Decl, fallback_pos: Pos, fallback_end: Pos) {
    match d {
        Decl::Import(s) | Decl::Var(s) | Decl::Const(s) | Decl::Type(s) => {
            for spec in s {
                fix_spec(spec, fallback_pos, fallback_end);
            }
        }
        Decl::Func(f) => {
            fix_expr(&mut f.typ, fallback_pos, fallback_end);
            if let Some(b) = &mut f.body {
                b.iter_mut().for_each(|s| fix_stmt(s, fallback_pos, fallback_end));
            }
        }
    }
}

fn fix_spec(s: &mut Spec, fallback_pos: Pos, fallback_end: Pos) {
    match s {
        Spec::Import { pos, .. } => {
            if *pos == NO_POS {
                *pos = fallback_pos;
            }
        }
        Spec::Value { typ, values, pos, .. } => {
            if let Some(t) = typ {
                fix_expr(t, fallback_pos, fallback_end);
            }
            values.iter_mut().for_each(|e| fix_expr(e, fallback_pos, fallback_end));
            if *pos == NO_POS {
                *pos = fallback_pos;
            }
        }
        Spec::Type { typ, pos, .. } => {
            fix_expr(typ, fallback_pos, fallback_end);
            if *pos == NO_POS {
                *pos = fallback_pos;
            }
        }
    }
}

// ── splice: rebuild the tree, substituting the first slot whose span matches ──

fn find_run<T: Spanned>(list: &[T], pos: Pos, end: Pos) -> Option<(usize, usize)> {
    let i = list.iter().position(|e| e.pos() == pos)?;
    let mut j = i;
    while j < list.len() && list[j].end() < end {
        j += 1;
    }
    if j < list.len() && list[j].end() == end {
        Some((i, j + 1))
    } else {
        None
    }
}

fn splice_expr(e: &Expr, pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Expr, SpliceError> {
    if !*found && e.pos == pos && e.end == end {
        *found = true;
        let mut out = repl.into_expr()?;
        fix_expr(&mut out, pos, end);
        return Ok(out);
    }
    let kind = match &e.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => return Ok(e.clone()),
        ExprKind::CompositeLit { typ, elts } => ExprKind::CompositeLit {
            typ: match typ {
                Some(t) => Some(Box::new(splice_expr(t, pos, end, repl.clone(), found)?)),
                None => None,
            },
            elts: splice_expr_list(elts, pos, end, repl, found)?,
        },
        ExprKind::KeyValue { key, value } => ExprKind::KeyValue {
            key: Box::new(splice_expr(key, pos, end, repl.clone(), found)?),
            value: Box::new(splice_expr(value, pos, end, repl, found)?),
        },
        ExprKind::FuncLit { typ, body } => ExprKind::FuncLit {
            typ: Box::new(splice_expr(typ, pos, end, repl.clone(), found)?),
            body: splice_stmt_list(body, pos, end, repl, found)?,
        },
        ExprKind::Selector { x, sel } => {
            ExprKind::Selector { x: Box::new(splice_expr(x, pos, end, repl, found)?), sel: sel.clone() }
        }
        ExprKind::Index { x, index } => ExprKind::Index {
            x: Box::new(splice_expr(x, pos, end, repl.clone(), found)?),
            index: Box::new(splice_expr(index, pos, end, repl, found)?),
        },
        ExprKind::Slice { x, lo, hi, max } => ExprKind::Slice {
            x: Box::new(splice_expr(x, pos, end, repl.clone(), found)?),
            lo: match lo {
                Some(e) => Some(Box::new(splice_expr(e, pos, end, repl.clone(), found)?)),
                None => None,
            },
            hi: match hi {
                Some(e) => Some(Box::new(splice_expr(e, pos, end, repl.clone(), found)?)),
                None => None,
            },
            max: match max {
                Some(e) => Some(Box::new(splice_expr(e, pos, end, repl, found)?)),
                None => None,
            },
        },
        ExprKind::TypeAssert { x, typ } => ExprKind::TypeAssert {
            x: Box::new(splice_expr(x, pos, end, repl.clone(), found)?),
            typ: match typ {
                Some(t) => Some(Box::new(splice_expr(t, pos, end, repl, found)?)),
                None => None,
            },
        },
        ExprKind::Call { fun, args, has_ellipsis } => ExprKind::Call {
            fun: Box::new(splice_expr(fun, pos, end, repl.clone(), found)?),
            args: splice_expr_list(args, pos, end, repl, found)?,
            has_ellipsis: *has_ellipsis,
        },
        ExprKind::Star(x) => ExprKind::Star(Box::new(splice_expr(x, pos, end, repl, found)?)),
        ExprKind::Unary { op, x } => ExprKind::Unary { op: *op, x: Box::new(splice_expr(x, pos, end, repl, found)?) },
        ExprKind::Binary { op, x, y } => ExprKind::Binary {
            op: *op,
            x: Box::new(splice_expr(x, pos, end, repl.clone(), found)?),
            y: Box::new(splice_expr(y, pos, end, repl, found)?),
        },
        ExprKind::Paren(x) => ExprKind::Paren(Box::new(splice_expr(x, pos, end, repl, found)?)),
        ExprKind::ArrayType { len, elt } => ExprKind::ArrayType {
            len: match len {
                Some(e) => Some(Box::new(splice_expr(e, pos, end, repl.clone(), found)?)),
                None => None,
            },
            elt: Box::new(splice_expr(elt, pos, end, repl, found)?),
        },
        ExprKind::StructType { fields } => ExprKind::StructType { fields: splice_fields(fields, pos, end, repl, found)? },
        ExprKind::InterfaceType { methods } => {
            ExprKind::InterfaceType { methods: splice_fields(methods, pos, end, repl, found)? }
        }
        ExprKind::FuncType { params, results } => ExprKind::FuncType {
            params: splice_fields(params, pos, end, repl.clone(), found)?,
            results: splice_fields(results, pos, end, repl, found)?,
        },
        ExprKind::MapType { key, value } => ExprKind::MapType {
            key: Box::new(splice_expr(key, pos, end, repl.clone(), found)?),
            value: Box::new(splice_expr(value, pos, end, repl, found)?),
        },
        ExprKind::ChanType { dir, value } => {
            ExprKind::ChanType { dir: *dir, value: Box::new(splice_expr(value, pos, end, repl, found)?) }
        }
    };
    Ok(Expr { pos: e.pos, end: e.end, kind })
}

fn splice_fields(fields: &[Field], pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Vec<Field>, SpliceError> {
    let mut out = Vec::with_capacity(fields.len());
    let mut repl = Some(repl);
    for f in fields {
        let this_repl = if out.len() + 1 == fields.len() { repl.take().unwrap() } else { repl.clone().unwrap() };
        out.push(Field { names: f.names.clone(), typ: splice_expr(&f.typ, pos, end, this_repl, found)? });
    }
    Ok(out)
}

fn splice_expr_list(list: &[Expr], pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Vec<Expr>, SpliceError> {
    if !*found {
        if let Some((i, j)) = find_run(list, pos, end) {
            *found = true;
            let mut inserted = repl.into_expr_run()?;
            inserted.iter_mut().for_each(|e| fix_expr(e, pos, end));
            let mut out = Vec::with_capacity(list.len() - (j - i) + inserted.len());
            out.extend(list[..i].iter().cloned());
            out.extend(inserted);
            out.extend(list[j..].iter().cloned());
            return Ok(out);
        }
    }
    splice_each(list, pos, end, repl, found, splice_expr)
}

fn splice_stmt_list(list: &[Stmt], pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Vec<Stmt>, SpliceError> {
    if !*found {
        if let Some((i, j)) = find_run(list, pos, end) {
            *found = true;
            let mut inserted = repl.into_stmt_run()?;
            inserted.iter_mut().for_each(|s| fix_stmt(s, pos, end));
            let mut out = Vec::with_capacity(list.len() - (j - i) + inserted.len());
            out.extend(list[..i].iter().cloned());
            out.extend(inserted);
            out.extend(list[j..].iter().cloned());
            return Ok(out);
        }
    }
    splice_each(list, pos, end, repl, found, splice_stmt)
}

/// Thread `repl` through each element of `list` in turn: every element but
/// the last is handed a clone (since `Replacement` is not `Copy`), and the
/// last is handed the owned value, so no unnecessary clone happens once the
/// element that actually needs `repl` is reached.
fn splice_each<T>(
    list: &[T],
    pos: Pos,
    end: Pos,
    repl: Replacement,
    found: &mut bool,
    one: impl Fn(&T, Pos, Pos, Replacement, &mut bool) -> Result<T, SpliceError>,
) -> Result<Vec<T>, SpliceError> {
    let mut out = Vec::with_capacity(list.len());
    let mut repl = Some(repl);
    for (idx, item) in list.iter().enumerate() {
        let this_repl = if idx + 1 == list.len() { repl.take().unwrap() } else { repl.clone().unwrap() };
        out.push(one(item, pos, end, this_repl, found)?);
    }
    Ok(out)
}

fn splice_stmt(s: &Stmt, pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Stmt, SpliceError> {
    if !*found && s.pos == pos && s.end == end {
        *found = true;
        let mut out = repl.into_stmt()?;
        fix_stmt(&mut out, pos, end);
        return Ok(out);
    }
    let kind = match &s.kind {
        StmtKind::Block(b) => StmtKind::Block(splice_stmt_list(b, pos, end, repl, found)?),
        StmtKind::Expr(e) => StmtKind::Expr(splice_expr(e, pos, end, repl, found)?),
        StmtKind::Assign { op, lhs, rhs } => StmtKind::Assign {
            op: *op,
            lhs: splice_expr_list(lhs, pos, end, repl.clone(), found)?,
            rhs: splice_expr_list(rhs, pos, end, repl, found)?,
        },
        StmtKind::Return(es) => StmtKind::Return(splice_expr_list(es, pos, end, repl, found)?),
        StmtKind::Branch { .. } => return Ok(s.clone()),
        StmtKind::Labeled { label, stmt } => {
            StmtKind::Labeled { label: label.clone(), stmt: Box::new(splice_stmt(stmt, pos, end, repl, found)?) }
        }
        StmtKind::Send { chan, value } => StmtKind::Send {
            chan: splice_expr(chan, pos, end, repl.clone(), found)?,
            value: splice_expr(value, pos, end, repl, found)?,
        },
        StmtKind::IncDec { x, is_inc } => StmtKind::IncDec { x: splice_expr(x, pos, end, repl, found)?, is_inc: *is_inc },
        StmtKind::Decl(d) => StmtKind::Decl(splice_decl(d, pos, end, repl, found)?),
        StmtKind::Go(e) => StmtKind::Go(splice_expr(e, pos, end, repl, found)?),
        StmtKind::Defer(e) => StmtKind::Defer(splice_expr(e, pos, end, repl, found)?),
        StmtKind::If { init, cond, body, els } => {
            let init = match init {
                Some(i) => Some(Box::new(splice_stmt(i, pos, end, repl.clone(), found)?)),
                None => None,
            };
            let cond = splice_expr(cond, pos, end, repl.clone(), found)?;
            let body = splice_stmt_list(body, pos, end, repl.clone(), found)?;
            let els = match els {
                Some(e) => Some(Box::new(splice_stmt(e, pos, end, repl, found)?)),
                None => None,
            };
            StmtKind::If { init, cond, body, els }
        }
        StmtKind::For { init, cond, post, body } => {
            let init = match init {
                Some(i) => Some(Box::new(splice_stmt(i, pos, end, repl.clone(), found)?)),
                None => None,
            };
            let cond = match cond {
                Some(c) => Some(splice_expr(c, pos, end, repl.clone(), found)?),
                None => None,
            };
            let post = match post {
                Some(p) => Some(Box::new(splice_stmt(p, pos, end, repl.clone(), found)?)),
                None => None,
            };
            let body = splice_stmt_list(body, pos, end, repl, found)?;
            StmtKind::For { init, cond, post, body }
        }
        StmtKind::Range { key, value, define, x, body } => {
            let key = match key {
                Some(k) => Some(splice_expr(k, pos, end, repl.clone(), found)?),
                None => None,
            };
            let value = match value {
                Some(v) => Some(splice_expr(v, pos, end, repl.clone(), found)?),
                None => None,
            };
            let x = splice_expr(x, pos, end, repl.clone(), found)?;
            let body = splice_stmt_list(body, pos, end, repl, found)?;
            StmtKind::Range { key, value, define: *define, x, body }
        }
        StmtKind::Switch { init, tag, cases } => {
            let init = match init {
                Some(i) => Some(Box::new(splice_stmt(i, pos, end, repl.clone(), found)?)),
                None => None,
            };
            let tag = match tag {
                Some(t) => Some(splice_expr(t, pos, end, repl.clone(), found)?),
                None => None,
            };
            let cases = splice_cases(cases, pos, end, repl, found)?;
            StmtKind::Switch { init, tag, cases }
        }
        StmtKind::TypeSwitch { init, assign, x, cases } => {
            let init = match init {
                Some(i) => Some(Box::new(splice_stmt(i, pos, end, repl.clone(), found)?)),
                None => None,
            };
            let x = splice_expr(x, pos, end, repl.clone(), found)?;
            let cases = splice_cases(cases, pos, end, repl, found)?;
            StmtKind::TypeSwitch { init, assign: assign.clone(), x, cases }
        }
        StmtKind::Select { comms } => {
            let mut out = Vec::with_capacity(comms.len());
            let mut repl = Some(repl);
            for (idx, c) in comms.iter().enumerate() {
                let last = idx + 1 == comms.len();
                let comm = match &c.comm {
                    Some(stmt) => Some(Box::new(splice_stmt(stmt, pos, end, repl.clone().unwrap(), found)?)),
                    None => None,
                };
                let body_repl = if last { repl.take().unwrap() } else { repl.clone().unwrap() };
                let body = splice_stmt_list(&c.body, pos, end, body_repl, found)?;
                out.push(crate::ast::CommClause { comm, body });
            }
            StmtKind::Select { comms: out }
        }
        StmtKind::Empty => return Ok(s.clone()),
    };
    Ok(Stmt { pos: s.pos, end: s.end, kind })
}

fn splice_cases(
    cases: &[crate::ast::CaseClause],
    pos: Pos,
    end: Pos,
    repl: Replacement,
    found: &mut bool,
) -> Result<Vec<crate::ast::CaseClause>, SpliceError> {
    let mut out = Vec::with_capacity(cases.len());
    let mut repl = Some(repl);
    for (idx, c) in cases.iter().enumerate() {
        let last = idx + 1 == cases.len();
        let values = splice_expr_list(&c.values, pos, end, repl.clone().unwrap(), found)?;
        let body_repl = if last { repl.take().unwrap() } else { repl.clone().unwrap() };
        let body = splice_stmt_list(&c.body, pos, end, body_repl, found)?;
        out.push(crate::ast::CaseClause { values, body });
    }
    Ok(out)
}

fn splice_decl_list(list: &[Decl], pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Vec<Decl>, SpliceError> {
    splice_each(list, pos, end, repl, found, splice_decl)
}

fn splice_decl(d: &Decl, pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Decl, SpliceError> {
    Ok(match d {
        Decl::Import(s) => Decl::Import(splice_spec_list(s, pos, end, repl, found)?),
        Decl::Var(s) => Decl::Var(splice_spec_list(s, pos, end, repl, found)?),
        Decl::Const(s) => Decl::Const(splice_spec_list(s, pos, end, repl, found)?),
        Decl::Type(s) => Decl::Type(splice_spec_list(s, pos, end, repl, found)?),
        Decl::Func(f) => Decl::Func(Box::new(crate::ast::FuncDecl {
            name: f.name.clone(),
            recv: f.recv.clone(),
            typ: splice_expr(&f.typ, pos, end, repl.clone(), found)?,
            body: match &f.body {
                Some(b) => Some(splice_stmt_list(b, pos, end, repl, found)?),
                None => None,
            },
        })),
    })
}

fn splice_spec_list(list: &[Spec], pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Vec<Spec>, SpliceError> {
    splice_each(list, pos, end, repl, found, splice_spec)
}

fn splice_spec(s: &Spec, pos: Pos, end: Pos, repl: Replacement, found: &mut bool) -> Result<Spec, SpliceError> {
    Ok(match s {
        Spec::Import { .. } => s.clone(),
        Spec::Value { names, typ, values, pos: spec_pos } => Spec::Value {
            names: names.clone(),
            typ: match typ {
                Some(t) => Some(splice_expr(t, pos, end, repl.clone(), found)?),
                None => None,
            },
            values: splice_expr_list(values, pos, end, repl, found)?,
            pos: *spec_pos,
        },
        Spec::Type { name, typ, pos: spec_pos } => {
            Spec::Type { name: name.clone(), typ: splice_expr(typ, pos, end, repl, found)?, pos: *spec_pos }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, FuncDecl, Ident};

    fn lit(v: &str, pos: Pos) -> Expr {
        Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: v.to_string() } }
    }

    fn file_with_return(v: &str, at: Pos) -> File {
        File {
            package: Ident { name: "main".to_string(), pos: 1 },
            decls: vec![Decl::Func(Box::new(FuncDecl {
                name: Ident { name: "f".to_string(), pos: 2 },
                recv: None,
                typ: Expr { pos: 3, end: 4, kind: ExprKind::FuncType { params: vec![], results: vec![] } },
                body: Some(vec![Stmt {
                    pos: 5,
                    end: at + v.len() as Pos + 1,
                    kind: StmtKind::Return(vec![lit(v, at)]),
                }]),
            }))],
        }
    }

    #[test]
    fn splices_a_single_expression_field() {
        let file = file_with_return("1", 10);
        let replacement = Replacement::Expr(lit("2", 0));
        let out = splice_file(&file, 10, 11, replacement).unwrap();
        match &out.decls[0] {
            Decl::Func(f) => match &f.body.as_ref().unwrap()[0].kind {
                StmtKind::Return(es) => match &es[0].kind {
                    ExprKind::BasicLit { value, .. } => assert_eq!(value, "2"),
                    other => panic!("expected BasicLit, got {other:?}"),
                },
                other => panic!("expected Return, got {other:?}"),
            },
            other => panic!("expected Func, got {other:?}"),
        }
    }

    #[test]
    fn splice_assigns_fallback_positions_to_the_inserted_fragment() {
        let file = file_with_return("1", 10);
        let replacement = Replacement::Expr(lit("2", NO_POS));
        let out = splice_file(&file, 10, 11, replacement).unwrap();
        match &out.decls[0] {
            Decl::Func(f) => match &f.body.as_ref().unwrap()[0].kind {
                StmtKind::Return(es) => {
                    assert_eq!(es[0].pos, 10);
                    assert_eq!(es[0].end, 11);
                }
                other => panic!("expected Return, got {other:?}"),
            },
            other => panic!("expected Func, got {other:?}"),
        }
    }

    #[test]
    fn splices_a_statement_into_a_statement_list_run() {
        let file = file_with_return("1", 10);
        let replacement = Replacement::StmtList(vec![
            Stmt { pos: NO_POS, end: NO_POS, kind: StmtKind::Return(vec![lit("2", NO_POS)]) },
            Stmt { pos: NO_POS, end: NO_POS, kind: StmtKind::Return(vec![lit("3", NO_POS)]) },
        ]);
        let out = splice_file(&file, 5, 12, replacement).unwrap();
        match &out.decls[0] {
            Decl::Func(f) => assert_eq!(f.body.as_ref().unwrap().len(), 2),
            other => panic!("expected Func, got {other:?}"),
        }
    }

    #[test]
    fn splice_wraps_an_expression_replacement_into_a_statement_slot() {
        let file = File {
            package: Ident { name: "main".to_string(), pos: 1 },
            decls: vec![Decl::Func(Box::new(FuncDecl {
                name: Ident { name: "f".to_string(), pos: 2 },
                recv: None,
                typ: Expr { pos: 3, end: 4, kind: ExprKind::FuncType { params: vec![], results: vec![] } },
                body: Some(vec![Stmt { pos: 5, end: 7, kind: StmtKind::Expr(lit("1", 5)) }]),
            }))],
        };
        let replacement = Replacement::Expr(lit("2", NO_POS));
        let out = splice_file(&file, 5, 7, replacement).unwrap();
        match &out.decls[0] {
            Decl::Func(f) => match &f.body.as_ref().unwrap()[0].kind {
                StmtKind::Expr(e) => match &e.kind {
                    ExprKind::BasicLit { value, .. } => assert_eq!(value, "2"),
                    other => panic!("expected BasicLit, got {other:?}"),
                },
                other => panic!("expected Expr stmt, got {other:?}"),
            },
            other => panic!("expected Func, got {other:?}"),
        }
    }

    #[test]
    fn missing_parent_slot_is_an_error() {
        let file = file_with_return("1", 10);
        let replacement = Replacement::Expr(lit("2", 0));
        let result = splice_file(&file, 999, 1000, replacement);
        assert!(result.is_err());
    }
}

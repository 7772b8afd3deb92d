//! Substituter.
//!
//! Builds a rewritten fragment from a replacement pattern and a completed
//! binding table. The replacement template's own positions are scrubbed to
//! [`NO_POS`] first, then wildcard identifiers are replaced by their bound
//! values (promoting a single bound node to a one-element list when the
//! replacement slot expects a list and the binding is scalar, or splicing a
//! bound list in when the slot itself is a list). Scrubbing before filling,
//! rather than after, means a bound value keeps the real source position it
//! had in the matched tree; only the template's own skeleton is synthetic.

use crate::ast::{Expr, ExprKind, Ident, Spanned, Stmt, StmtKind, NO_POS};
use crate::node::BoundValue;
use crate::unifier::Bindings;
use crate::wildcard::decode;

/// Rewrite `replacement` by substituting every wildcard identifier with its
/// bound value from `bindings`, then scrub all positions to [`NO_POS`].
/// Panics if a named wildcard in the replacement has no binding: by the
/// time substitution runs, every wildcard named in a successful match must
/// have been bound by the unifier, so a missing entry here means the
/// replacement pattern referenced a wildcard the match pattern never used —
/// a structural impossibility, not a data error.
pub fn substitute_expr(replacement: &Expr, bindings: &Bindings) -> Expr {
    let mut template = replacement.clone();
    scrub_expr(&mut template);
    fill_expr(&template, bindings)
}

pub fn substitute_stmt(replacement: &Stmt, bindings: &Bindings) -> Stmt {
    let mut template = replacement.clone();
    scrub_stmt(&mut template);
    fill_stmt(&template, bindings)
}

pub fn substitute_stmt_list(replacement: &[Stmt], bindings: &Bindings) -> Vec<Stmt> {
    let mut template = replacement.to_vec();
    for s in &mut template {
        scrub_stmt(s);
    }
    fill_stmt_list(&template, bindings)
}

// ── fill: replace wildcard identifiers with their bound values ─────────────

fn lookup<'b>(name: &str, bindings: &'b Bindings) -> &'b BoundValue {
    bindings
        .get(name)
        .unwrap_or_else(|| panic!("substitution referenced unbound wildcard `{name}`"))
}

fn fill_expr(e: &Expr, bindings: &Bindings) -> Expr {
    if let ExprKind::Ident(id) = &e.kind {
        if decode(&id.name).is_some() {
            return expr_from_binding(lookup(&id.name, bindings));
        }
    }
    let kind = match &e.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => e.kind.clone(),
        ExprKind::CompositeLit { typ, elts } => ExprKind::CompositeLit {
            typ: typ.as_ref().map(|t| Box::new(fill_expr(t, bindings))),
            elts: fill_expr_list(elts, bindings),
        },
        ExprKind::KeyValue { key, value } => ExprKind::KeyValue {
            key: Box::new(fill_expr(key, bindings)),
            value: Box::new(fill_expr(value, bindings)),
        },
        ExprKind::FuncLit { typ, body } => {
            ExprKind::FuncLit { typ: Box::new(fill_expr(typ, bindings)), body: fill_stmt_list(body, bindings) }
        }
        ExprKind::Selector { x, sel } => {
            ExprKind::Selector { x: Box::new(fill_expr(x, bindings)), sel: fill_ident(sel, bindings) }
        }
        ExprKind::Index { x, index } => {
            ExprKind::Index { x: Box::new(fill_expr(x, bindings)), index: Box::new(fill_expr(index, bindings)) }
        }
        ExprKind::Slice { x, lo, hi, max } => ExprKind::Slice {
            x: Box::new(fill_expr(x, bindings)),
            lo: lo.as_ref().map(|e| Box::new(fill_expr(e, bindings))),
            hi: hi.as_ref().map(|e| Box::new(fill_expr(e, bindings))),
            max: max.as_ref().map(|e| Box::new(fill_expr(e, bindings))),
        },
        ExprKind::TypeAssert { x, typ } => ExprKind::TypeAssert {
            x: Box::new(fill_expr(x, bindings)),
            typ: typ.as_ref().map(|t| Box::new(fill_expr(t, bindings))),
        },
        ExprKind::Call { fun, args, has_ellipsis } => ExprKind::Call {
            fun: Box::new(fill_expr(fun, bindings)),
            args: fill_expr_list(args, bindings),
            has_ellipsis: *has_ellipsis,
        },
        ExprKind::Star(x) => ExprKind::Star(Box::new(fill_expr(x, bindings))),
        ExprKind::Unary { op, x } => ExprKind::Unary { op: *op, x: Box::new(fill_expr(x, bindings)) },
        ExprKind::Binary { op, x, y } => {
            ExprKind::Binary { op: *op, x: Box::new(fill_expr(x, bindings)), y: Box::new(fill_expr(y, bindings)) }
        }
        ExprKind::Paren(x) => ExprKind::Paren(Box::new(fill_expr(x, bindings))),
        ExprKind::ArrayType { len, elt } => ExprKind::ArrayType {
            len: len.as_ref().map(|e| Box::new(fill_expr(e, bindings))),
            elt: Box::new(fill_expr(elt, bindings)),
        },
        ExprKind::StructType { fields } => ExprKind::StructType {
            fields: fields
                .iter()
                .map(|f| crate::ast::Field { names: fill_ident_list(&f.names, bindings), typ: fill_expr(&f.typ, bindings) })
                .collect(),
        },
        ExprKind::InterfaceType { methods } => ExprKind::InterfaceType {
            methods: methods
                .iter()
                .map(|f| crate::ast::Field { names: fill_ident_list(&f.names, bindings), typ: fill_expr(&f.typ, bindings) })
                .collect(),
        },
        ExprKind::FuncType { params, results } => ExprKind::FuncType {
            params: params
                .iter()
                .map(|f| crate::ast::Field { names: fill_ident_list(&f.names, bindings), typ: fill_expr(&f.typ, bindings) })
                .collect(),
            results: results
                .iter()
                .map(|f| crate::ast::Field { names: fill_ident_list(&f.names, bindings), typ: fill_expr(&f.typ, bindings) })
                .collect(),
        },
        ExprKind::MapType { key, value } => ExprKind::MapType {
            key: Box::new(fill_expr(key, bindings)),
            value: Box::new(fill_expr(value, bindings)),
        },
        ExprKind::ChanType { dir, value } => ExprKind::ChanType { dir: *dir, value: Box::new(fill_expr(value, bindings)) },
    };
    Expr { pos: e.pos, end: e.end, kind }
}

fn fill_ident(id: &Ident, bindings: &Bindings) -> Ident {
    if decode(&id.name).is_some() {
        if let BoundValue::Ident(bound) = lookup(&id.name, bindings) {
            return bound.clone();
        }
    }
    id.clone()
}

fn fill_ident_list(ids: &[Ident], bindings: &Bindings) -> Vec<Ident> {
    let mut out = Vec::new();
    for id in ids {
        if let Some(_wid) = decode(&id.name) {
            match lookup(&id.name, bindings) {
                BoundValue::Ident(bound) => out.push(bound.clone()),
                BoundValue::IdentList(list) => out.extend(list.iter().cloned()),
                other => out.push(coerce_single_ident(other)),
            }
        } else {
            out.push(id.clone());
        }
    }
    out
}

/// A single-node binding spliced into a position that requires a list is
/// promoted to a one-element list.
fn coerce_single_ident(v: &BoundValue) -> Ident {
    match v {
        BoundValue::Ident(i) => i.clone(),
        other => panic!("cannot splice {other:?} into an identifier-list position"),
    }
}

fn expr_from_binding(v: &BoundValue) -> Expr {
    match v {
        BoundValue::Expr(e) => e.clone(),
        BoundValue::Ident(i) => Expr { pos: i.pos, end: i.end(), kind: ExprKind::Ident(i.clone()) },
        BoundValue::Stmt(s) => expr_from_stmt_wrap(s),
        other => panic!("cannot splice {other:?} into a single-expression position"),
    }
}

fn expr_from_stmt_wrap(s: &Stmt) -> Expr {
    if let StmtKind::Expr(e) = &s.kind {
        e.clone()
    } else {
        panic!("cannot splice a non-expression statement into an expression position")
    }
}

fn fill_expr_list(exprs: &[Expr], bindings: &Bindings) -> Vec<Expr> {
    let mut out = Vec::new();
    for e in exprs {
        if let ExprKind::Ident(id) = &e.kind {
            if decode(&id.name).is_some() {
                match lookup(&id.name, bindings) {
                    BoundValue::ExprList(list) => {
                        out.extend(list.iter().cloned());
                        continue;
                    }
                    v => {
                        out.push(expr_from_binding(v));
                        continue;
                    }
                }
            }
        }
        out.push(fill_expr(e, bindings));
    }
    out
}

fn stmt_from_binding(v: &BoundValue) -> Stmt {
    match v {
        BoundValue::Stmt(s) => s.clone(),
        BoundValue::Expr(e) => Stmt { pos: e.pos, end: e.end, kind: StmtKind::Expr(e.clone()) },
        other => panic!("cannot splice {other:?} into a single-statement position"),
    }
}

fn fill_stmt_list(stmts: &[Stmt], bindings: &Bindings) -> Vec<Stmt> {
    let mut out = Vec::new();
    for s in stmts {
        if let StmtKind::Expr(Expr { kind: ExprKind::Ident(id), .. }) = &s.kind {
            if decode(&id.name).is_some() {
                match lookup(&id.name, bindings) {
                    BoundValue::StmtList(list) => {
                        out.extend(list.iter().cloned());
                        continue;
                    }
                    v => {
                        out.push(stmt_from_binding(v));
                        continue;
                    }
                }
            }
        }
        out.push(fill_stmt(s, bindings));
    }
    out
}

fn fill_stmt(s: &Stmt, bindings: &Bindings) -> Stmt {
    let kind = match &s.kind {
        StmtKind::Block(b) => StmtKind::Block(fill_stmt_list(b, bindings)),
        StmtKind::Expr(e) => StmtKind::Expr(fill_expr(e, bindings)),
        StmtKind::Assign { op, lhs, rhs } => {
            StmtKind::Assign { op: *op, lhs: fill_expr_list(lhs, bindings), rhs: fill_expr_list(rhs, bindings) }
        }
        StmtKind::Return(es) => StmtKind::Return(fill_expr_list(es, bindings)),
        StmtKind::Branch { kind, label } => StmtKind::Branch { kind: *kind, label: label.as_ref().map(|l| fill_ident(l, bindings)) },
        StmtKind::Labeled { label, stmt } => {
            StmtKind::Labeled { label: fill_ident(label, bindings), stmt: Box::new(fill_stmt(stmt, bindings)) }
        }
        StmtKind::Send { chan, value } => {
            StmtKind::Send { chan: fill_expr(chan, bindings), value: fill_expr(value, bindings) }
        }
        StmtKind::IncDec { x, is_inc } => StmtKind::IncDec { x: fill_expr(x, bindings), is_inc: *is_inc },
        StmtKind::Decl(d) => StmtKind::Decl(fill_decl(d, bindings)),
        StmtKind::Go(e) => StmtKind::Go(fill_expr(e, bindings)),
        StmtKind::Defer(e) => StmtKind::Defer(fill_expr(e, bindings)),
        StmtKind::If { init, cond, body, els } => StmtKind::If {
            init: init.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
            cond: fill_expr(cond, bindings),
            body: fill_stmt_list(body, bindings),
            els: els.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
        },
        StmtKind::For { init, cond, post, body } => StmtKind::For {
            init: init.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
            cond: cond.as_ref().map(|e| fill_expr(e, bindings)),
            post: post.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
            body: fill_stmt_list(body, bindings),
        },
        StmtKind::Range { key, value, define, x, body } => StmtKind::Range {
            key: key.as_ref().map(|e| fill_expr(e, bindings)),
            value: value.as_ref().map(|e| fill_expr(e, bindings)),
            define: *define,
            x: fill_expr(x, bindings),
            body: fill_stmt_list(body, bindings),
        },
        StmtKind::Switch { init, tag, cases } => StmtKind::Switch {
            init: init.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
            tag: tag.as_ref().map(|e| fill_expr(e, bindings)),
            cases: fill_cases(cases, bindings),
        },
        StmtKind::TypeSwitch { init, assign, x, cases } => StmtKind::TypeSwitch {
            init: init.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
            assign: assign.as_ref().map(|i| fill_ident(i, bindings)),
            x: fill_expr(x, bindings),
            cases: fill_cases(cases, bindings),
        },
        StmtKind::Select { comms } => StmtKind::Select {
            comms: comms
                .iter()
                .map(|c| crate::ast::CommClause {
                    comm: c.comm.as_ref().map(|s| Box::new(fill_stmt(s, bindings))),
                    body: fill_stmt_list(&c.body, bindings),
                })
                .collect(),
        },
        StmtKind::Empty => StmtKind::Empty,
    };
    Stmt { pos: s.pos, end: s.end, kind }
}

fn fill_cases(cases: &[crate::ast::CaseClause], bindings: &Bindings) -> Vec<crate::ast::CaseClause> {
    cases
        .iter()
        .map(|c| crate::ast::CaseClause { values: fill_expr_list(&c.values, bindings), body: fill_stmt_list(&c.body, bindings) })
        .collect()
}

fn fill_decl(d: &crate::ast::Decl, bindings: &Bindings) -> crate::ast::Decl {
    use crate::ast::Decl;
    match d {
        Decl::Import(s) => Decl::Import(fill_spec_list(s, bindings)),
        Decl::Var(s) => Decl::Var(fill_spec_list(s, bindings)),
        Decl::Const(s) => Decl::Const(fill_spec_list(s, bindings)),
        Decl::Type(s) => Decl::Type(fill_spec_list(s, bindings)),
        Decl::Func(f) => Decl::Func(Box::new(crate::ast::FuncDecl {
            name: fill_ident(&f.name, bindings),
            recv: f.recv.as_ref().map(|r| crate::ast::Field { names: fill_ident_list(&r.names, bindings), typ: fill_expr(&r.typ, bindings) }),
            typ: fill_expr(&f.typ, bindings),
            body: f.body.as_ref().map(|b| fill_stmt_list(b, bindings)),
        })),
    }
}

fn fill_spec_list(specs: &[crate::ast::Spec], bindings: &Bindings) -> Vec<crate::ast::Spec> {
    specs.iter().map(|s| fill_spec(s, bindings)).collect()
}

fn fill_spec(s: &crate::ast::Spec, bindings: &Bindings) -> crate::ast::Spec {
    use crate::ast::Spec;
    match s {
        Spec::Import { name, path, pos } => {
            Spec::Import { name: name.as_ref().map(|i| fill_ident(i, bindings)), path: path.clone(), pos: *pos }
        }
        Spec::Value { names, typ, values, pos } => Spec::Value {
            names: fill_ident_list(names, bindings),
            typ: typ.as_ref().map(|t| fill_expr(t, bindings)),
            values: fill_expr_list(values, bindings),
            pos: *pos,
        },
        Spec::Type { name, typ, pos } => Spec::Type { name: fill_ident(name, bindings), typ: fill_expr(typ, bindings), pos: *pos },
    }
}

// ── scrub: mark every position in a freshly built fragment as synthetic ────

fn scrub_expr(e: &mut Expr) {
    e.pos = NO_POS;
    e.end = NO_POS;
    match &mut e.kind {
        ExprKind::Ident(id) => scrub_ident(id),
        ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(t) = typ {
                scrub_expr(t);
            }
            elts.iter_mut().for_each(scrub_expr);
        }
        ExprKind::KeyValue { key, value } => {
            scrub_expr(key);
            scrub_expr(value);
        }
        ExprKind::FuncLit { typ, body } => {
            scrub_expr(typ);
            body.iter_mut().for_each(scrub_stmt);
        }
        ExprKind::Selector { x, sel } => {
            scrub_expr(x);
            scrub_ident(sel);
        }
        ExprKind::Index { x, index } => {
            scrub_expr(x);
            scrub_expr(index);
        }
        ExprKind::Slice { x, lo, hi, max } => {
            scrub_expr(x);
            [lo, hi, max].into_iter().flatten().for_each(|e| scrub_expr(e));
        }
        ExprKind::TypeAssert { x, typ } => {
            scrub_expr(x);
            if let Some(t) = typ {
                scrub_expr(t);
            }
        }
        ExprKind::Call { fun, args, .. } => {
            scrub_expr(fun);
            args.iter_mut().for_each(scrub_expr);
        }
        ExprKind::Star(x) | ExprKind::Paren(x) => scrub_expr(x),
        ExprKind::Unary { x, .. } => scrub_expr(x),
        ExprKind::Binary { x, y, .. } => {
            scrub_expr(x);
            scrub_expr(y);
        }
        ExprKind::ArrayType { len, elt } => {
            if let Some(l) = len {
                scrub_expr(l);
            }
            scrub_expr(elt);
        }
        ExprKind::StructType { fields } | ExprKind::InterfaceType { methods: fields } => {
            scrub_fields(fields);
        }
        ExprKind::FuncType { params, results } => {
            scrub_fields(params);
            scrub_fields(results);
        }
        ExprKind::MapType { key, value } => {
            scrub_expr(key);
            scrub_expr(value);
        }
        ExprKind::ChanType { value, .. } => scrub_expr(value),
    }
}

fn scrub_fields(fields: &mut [crate::ast::Field]) {
    for f in fields {
        f.names.iter_mut().for_each(scrub_ident);
        scrub_expr(&mut f.typ);
    }
}

fn scrub_ident(id: &mut Ident) {
    id.pos = NO_POS;
}

fn scrub_stmt(s: &mut Stmt) {
    s.pos = NO_POS;
    s.end = NO_POS;
    match &mut s.kind {
        StmtKind::Block(b) => b.iter_mut().for_each(scrub_stmt),
        StmtKind::Expr(e) => scrub_expr(e),
        StmtKind::Assign { lhs, rhs, .. } => {
            lhs.iter_mut().for_each(scrub_expr);
            rhs.iter_mut().for_each(scrub_expr);
        }
        StmtKind::Return(es) => es.iter_mut().for_each(scrub_expr),
        StmtKind::Branch { label, .. } => {
            if let Some(l) = label {
                scrub_ident(l);
            }
        }
        StmtKind::Labeled { label, stmt } => {
            scrub_ident(label);
            scrub_stmt(stmt);
        }
        StmtKind::Send { chan, value } => {
            scrub_expr(chan);
            scrub_expr(value);
        }
        StmtKind::IncDec { x, .. } => scrub_expr(x),
        StmtKind::Decl(d) => scrub_decl(d),
        StmtKind::Go(e) | StmtKind::Defer(e) => scrub_expr(e),
        StmtKind::If { init, cond, body, els } => {
            if let Some(i) = init {
                scrub_stmt(i);
            }
            scrub_expr(cond);
            body.iter_mut().for_each(scrub_stmt);
            if let Some(e) = els {
                scrub_stmt(e);
            }
        }
        StmtKind::For { init, cond, post, body } => {
            if let Some(i) = init {
                scrub_stmt(i);
            }
            if let Some(c) = cond {
                scrub_expr(c);
            }
            if let Some(p) = post {
                scrub_stmt(p);
            }
            body.iter_mut().for_each(scrub_stmt);
        }
        StmtKind::Range { key, value, x, body, .. } => {
            if let Some(k) = key {
                scrub_expr(k);
            }
            if let Some(v) = value {
                scrub_expr(v);
            }
            scrub_expr(x);
            body.iter_mut().for_each(scrub_stmt);
        }
        StmtKind::Switch { init, tag, cases } => {
            if let Some(i) = init {
                scrub_stmt(i);
            }
            if let Some(t) = tag {
                scrub_expr(t);
            }
            scrub_cases(cases);
        }
        StmtKind::TypeSwitch { init, assign, x, cases } => {
            if let Some(i) = init {
                scrub_stmt(i);
            }
            if let Some(a) = assign {
                scrub_ident(a);
            }
            scrub_expr(x);
            scrub_cases(cases);
        }
        StmtKind::Select { comms } => {
            for c in comms {
                if let Some(comm) = &mut c.comm {
                    scrub_stmt(comm);
                }
                c.body.iter_mut().for_each(scrub_stmt);
            }
        }
        StmtKind::Empty => {}
    }
}

fn scrub_cases(cases: &mut [crate::ast::CaseClause]) {
    for c in cases {
        c.values.iter_mut().for_each(scrub_expr);
        c.body.iter_mut().for_each(scrub_stmt);
    }
}

fn scrub_decl(d: &mut crate::ast::Decl) {
    use crate::ast::Decl;
    match d {
        Decl::Import(s) | Decl::Var(s) | Decl::Const(s) | Decl::Type(s) => scrub_specs(s),
        Decl::Func(f) => {
            scrub_ident(&mut f.name);
            if let Some(r) = &mut f.recv {
                r.names.iter_mut().for_each(scrub_ident);
                scrub_expr(&mut r.typ);
            }
            scrub_expr(&mut f.typ);
            if let Some(b) = &mut f.body {
                b.iter_mut().for_each(scrub_stmt);
            }
        }
    }
}

fn scrub_specs(specs: &mut [crate::ast::Spec]) {
    use crate::ast::Spec;
    for s in specs {
        match s {
            Spec::Import { name, pos, .. } => {
                if let Some(n) = name {
                    scrub_ident(n);
                }
                *pos = NO_POS;
            }
            Spec::Value { names, typ, values, pos } => {
                names.iter_mut().for_each(scrub_ident);
                if let Some(t) = typ {
                    scrub_expr(t);
                }
                values.iter_mut().for_each(scrub_expr);
                *pos = NO_POS;
            }
            Spec::Type { name, typ, pos } => {
                scrub_ident(name);
                scrub_expr(typ);
                *pos = NO_POS;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, Pos};
    use crate::wildcard::{encode, WildcardRegistry};

    fn wildcard_ident(id: u32, pos: Pos) -> Ident {
        Ident { name: encode(id), pos }
    }

    #[test]
    fn single_wildcard_expr_keeps_the_bound_values_real_position() {
        let mut reg = WildcardRegistry::new();
        let wid = reg.register(crate::wildcard::WildcardInfo { name: "x".to_string(), any: false, ..Default::default() });
        let mut bindings = Bindings::new();
        bindings.insert(
            "x".to_string(),
            BoundValue::Expr(Expr { pos: 99, end: 100, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "7".to_string() } }),
        );
        let replacement = Expr { pos: 1, end: 2, kind: ExprKind::Ident(wildcard_ident(wid, 1)) };
        let result = substitute_expr(&replacement, &bindings);
        assert_eq!(result.pos, 99);
        assert_eq!(result.end, 100);
        match result.kind {
            ExprKind::BasicLit { value, .. } => assert_eq!(value, "7"),
            other => panic!("expected BasicLit, got {other:?}"),
        }
    }

    #[test]
    fn synthetic_skeleton_around_a_bound_value_is_scrubbed() {
        let mut reg = WildcardRegistry::new();
        let wid = reg.register(crate::wildcard::WildcardInfo { name: "x".to_string(), any: false, ..Default::default() });
        let mut bindings = Bindings::new();
        bindings.insert(
            "x".to_string(),
            BoundValue::Expr(Expr { pos: 99, end: 100, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "7".to_string() } }),
        );
        let replacement = Expr {
            pos: 1,
            end: 5,
            kind: ExprKind::Paren(Box::new(Expr { pos: 2, end: 3, kind: ExprKind::Ident(wildcard_ident(wid, 2)) })),
        };
        let result = substitute_expr(&replacement, &bindings);
        assert_eq!(result.pos, NO_POS);
        match result.kind {
            ExprKind::Paren(inner) => {
                assert_eq!(inner.pos, 99);
                assert_eq!(inner.end, 100);
            }
            other => panic!("expected Paren, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "unbound wildcard")]
    fn missing_binding_panics_as_structural_impossibility() {
        let bindings = Bindings::new();
        let replacement = Expr { pos: 1, end: 2, kind: ExprKind::Ident(wildcard_ident(0, 1)) };
        substitute_expr(&replacement, &bindings);
    }

    #[test]
    fn variadic_binding_splices_into_call_args() {
        let mut reg = WildcardRegistry::new();
        let wid = reg.register(crate::wildcard::WildcardInfo { name: "args".to_string(), any: true, ..Default::default() });
        let mut bindings = Bindings::new();
        bindings.insert(
            "args".to_string(),
            BoundValue::ExprList(vec![
                Expr { pos: 1, end: 2, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "1".into() } },
                Expr { pos: 3, end: 4, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "2".into() } },
            ]),
        );
        let call = Expr {
            pos: 1,
            end: 10,
            kind: ExprKind::Call {
                fun: Box::new(Expr { pos: 1, end: 2, kind: ExprKind::Ident(Ident { name: "f".into(), pos: 1 }) }),
                args: vec![Expr { pos: 5, end: 6, kind: ExprKind::Ident(wildcard_ident(wid, 5)) }],
                has_ellipsis: false,
            },
        };
        let result = substitute_expr(&call, &bindings);
        match result.kind {
            ExprKind::Call { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected Call, got {other:?}"),
        }
    }
}

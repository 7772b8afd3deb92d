//! AST walker.
//!
//! Visits every node and every list-shaped child position of a subtree,
//! invoking a callback for each. The command interpreter (`command.rs`)
//! drives this to attempt a top-node unification at every visited position.

use crate::ast::{CaseClause, CommClause, Decl, Expr, ExprKind, File, Spec, Stmt, StmtKind};
use crate::node::{Node, NodeList};

/// Walk `root`, invoking `visit` on `root` itself, on every descendant node,
/// and on every list-shaped child position (so a variadic wildcard can bind
/// to the list as a whole before its elements are visited individually).
pub fn walk<'a>(root: Node<'a>, visit: &mut dyn FnMut(Node<'a>)) {
    visit(root);
    match root {
        Node::File(f) => walk_file(f, visit),
        Node::Decl(d) => walk_decl(d, visit),
        Node::Spec(s) => walk_spec(s, visit),
        Node::Stmt(s) => walk_stmt(s, visit),
        Node::Expr(e) => walk_expr(e, visit),
        Node::Ident(_) => {}
        Node::List(list) => walk_list(list, visit),
    }
}

/// Root-case sugar: when the candidate root handed to the command
/// interpreter is already a list, a bare variadic pattern (`$*a`) needs more
/// than the list's own species to see everything it could plausibly absorb,
/// so two extra views are offered alongside the native one. A `StmtList`
/// root (empty or not) also offers an `ExprList` view — a statement and its
/// underlying expression are indistinguishable to a bare `$*a` — built
/// without copying when representable: the empty list trivially, and a
/// single expression-statement by re-borrowing its inner expression.
/// Conversely a single-element `ExprList` root also offers that element
/// re-wrapped as a one-statement list containing an expression statement,
/// letting a variadic pattern see a lone expression from the statement
/// side too. Neither view is representable for a multi-element, mixed-kind
/// `StmtList` (there is no contiguous `Expr` slice to borrow), so those
/// stay native-species only.
pub fn walk_root<'a>(root: Node<'a>, visit: &mut dyn FnMut(Node<'_>)) {
    if let Node::List(NodeList::Stmt(stmts)) = root {
        visit(Node::List(NodeList::Expr(&[])));
        if let [Stmt { kind: StmtKind::Expr(e), .. }] = stmts {
            visit(Node::List(NodeList::Expr(std::slice::from_ref(e))));
        }
    }
    if let Node::List(NodeList::Expr([e])) = root {
        let wrapped = [Stmt { pos: e.pos, end: e.end, kind: StmtKind::Expr(e.clone()) }];
        visit(Node::List(NodeList::Stmt(&wrapped)));
    }
    walk(root, &mut |n| visit(n));
}

fn walk_list<'a>(list: NodeList<'a>, visit: &mut dyn FnMut(Node<'a>)) {
    for i in 0..list.len() {
        walk(list.at(i), visit);
    }
}

fn walk_file<'a>(f: &'a File, visit: &mut dyn FnMut(Node<'a>)) {
    for d in &f.decls {
        walk(Node::Decl(d), visit);
    }
}

fn walk_spec_list<'a>(specs: &'a [Spec], visit: &mut dyn FnMut(Node<'a>)) {
    visit(Node::List(NodeList::Spec(specs)));
    for s in specs {
        walk(Node::Spec(s), visit);
    }
}

fn walk_decl<'a>(d: &'a Decl, visit: &mut dyn FnMut(Node<'a>)) {
    match d {
        Decl::Import(specs) | Decl::Var(specs) | Decl::Const(specs) | Decl::Type(specs) => {
            walk_spec_list(specs, visit);
        }
        Decl::Func(f) => {
            if let Some(recv) = &f.recv {
                walk_ident_list(&recv.names, visit);
                walk(Node::Expr(&recv.typ), visit);
            }
            walk(Node::Expr(&f.typ), visit);
            if let Some(body) = &f.body {
                walk_stmt_list(body, visit);
            }
        }
    }
}

fn walk_spec<'a>(s: &'a Spec, visit: &mut dyn FnMut(Node<'a>)) {
    match s {
        Spec::Import { name, .. } => {
            if let Some(n) = name {
                walk(Node::Ident(n), visit);
            }
        }
        Spec::Value { names, typ, values, .. } => {
            walk_ident_list(names, visit);
            if let Some(t) = typ {
                walk(Node::Expr(t), visit);
            }
            walk_expr_list(values, visit);
        }
        Spec::Type { name, typ, .. } => {
            walk(Node::Ident(name), visit);
            walk(Node::Expr(typ), visit);
        }
    }
}

fn walk_ident_list<'a>(idents: &'a [crate::ast::Ident], visit: &mut dyn FnMut(Node<'a>)) {
    visit(Node::List(NodeList::Ident(idents)));
    for i in idents {
        walk(Node::Ident(i), visit);
    }
}

fn walk_expr_list<'a>(exprs: &'a [Expr], visit: &mut dyn FnMut(Node<'a>)) {
    visit(Node::List(NodeList::Expr(exprs)));
    for e in exprs {
        walk(Node::Expr(e), visit);
    }
}

fn walk_stmt_list<'a>(stmts: &'a [Stmt], visit: &mut dyn FnMut(Node<'a>)) {
    visit(Node::List(NodeList::Stmt(stmts)));
    for s in stmts {
        walk(Node::Stmt(s), visit);
    }
}

fn walk_field<'a>(f: &'a crate::ast::Field, visit: &mut dyn FnMut(Node<'a>)) {
    walk_ident_list(&f.names, visit);
    walk(Node::Expr(&f.typ), visit);
}

fn walk_stmt<'a>(s: &'a Stmt, visit: &mut dyn FnMut(Node<'a>)) {
    match &s.kind {
        StmtKind::Block(stmts) => walk_stmt_list(stmts, visit),
        StmtKind::Expr(e) => walk(Node::Expr(e), visit),
        StmtKind::Assign { lhs, rhs, .. } => {
            walk_expr_list(lhs, visit);
            walk_expr_list(rhs, visit);
        }
        StmtKind::Return(exprs) => walk_expr_list(exprs, visit),
        StmtKind::Branch { label, .. } => {
            if let Some(l) = label {
                walk(Node::Ident(l), visit);
            }
        }
        StmtKind::Labeled { label, stmt } => {
            walk(Node::Ident(label), visit);
            walk(Node::Stmt(stmt), visit);
        }
        StmtKind::Send { chan, value } => {
            walk(Node::Expr(chan), visit);
            walk(Node::Expr(value), visit);
        }
        StmtKind::IncDec { x, .. } => walk(Node::Expr(x), visit),
        StmtKind::Decl(decl) => walk(Node::Decl(decl), visit),
        StmtKind::Go(e) | StmtKind::Defer(e) => walk(Node::Expr(e), visit),
        StmtKind::If { init, cond, body, els } => {
            if let Some(init) = init {
                walk(Node::Stmt(init), visit);
            }
            walk(Node::Expr(cond), visit);
            walk_stmt_list(body, visit);
            if let Some(els) = els {
                walk(Node::Stmt(els), visit);
            }
        }
        StmtKind::For { init, cond, post, body } => {
            if let Some(init) = init {
                walk(Node::Stmt(init), visit);
            }
            if let Some(cond) = cond {
                walk(Node::Expr(cond), visit);
            }
            if let Some(post) = post {
                walk(Node::Stmt(post), visit);
            }
            walk_stmt_list(body, visit);
        }
        StmtKind::Range { key, value, x, body, .. } => {
            if let Some(k) = key {
                walk(Node::Expr(k), visit);
            }
            if let Some(v) = value {
                walk(Node::Expr(v), visit);
            }
            walk(Node::Expr(x), visit);
            walk_stmt_list(body, visit);
        }
        StmtKind::Switch { init, tag, cases } => {
            if let Some(init) = init {
                walk(Node::Stmt(init), visit);
            }
            if let Some(tag) = tag {
                walk(Node::Expr(tag), visit);
            }
            walk_cases(cases, visit);
        }
        StmtKind::TypeSwitch { init, assign, x, cases } => {
            if let Some(init) = init {
                walk(Node::Stmt(init), visit);
            }
            if let Some(a) = assign {
                walk(Node::Ident(a), visit);
            }
            walk(Node::Expr(x), visit);
            walk_cases(cases, visit);
        }
        StmtKind::Select { comms } => walk_comms(comms, visit),
        StmtKind::Empty => {}
    }
}

fn walk_cases<'a>(cases: &'a [CaseClause], visit: &mut dyn FnMut(Node<'a>)) {
    for c in cases {
        walk_expr_list(&c.values, visit);
        walk_stmt_list(&c.body, visit);
    }
}

fn walk_comms<'a>(comms: &'a [CommClause], visit: &mut dyn FnMut(Node<'a>)) {
    for c in comms {
        if let Some(comm) = &c.comm {
            walk(Node::Stmt(comm), visit);
        }
        walk_stmt_list(&c.body, visit);
    }
}

fn walk_expr<'a>(e: &'a Expr, visit: &mut dyn FnMut(Node<'a>)) {
    match &e.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(t) = typ {
                walk(Node::Expr(t), visit);
            }
            walk_expr_list(elts, visit);
        }
        ExprKind::KeyValue { key, value } => {
            walk(Node::Expr(key), visit);
            walk(Node::Expr(value), visit);
        }
        ExprKind::FuncLit { typ, body } => {
            walk(Node::Expr(typ), visit);
            walk_stmt_list(body, visit);
        }
        ExprKind::Selector { x, sel } => {
            walk(Node::Expr(x), visit);
            walk(Node::Ident(sel), visit);
        }
        ExprKind::Index { x, index } => {
            walk(Node::Expr(x), visit);
            walk(Node::Expr(index), visit);
        }
        ExprKind::Slice { x, lo, hi, max } => {
            walk(Node::Expr(x), visit);
            for part in [lo, hi, max] {
                if let Some(p) = part {
                    walk(Node::Expr(p), visit);
                }
            }
        }
        ExprKind::TypeAssert { x, typ } => {
            walk(Node::Expr(x), visit);
            if let Some(t) = typ {
                walk(Node::Expr(t), visit);
            }
        }
        ExprKind::Call { fun, args, .. } => {
            walk(Node::Expr(fun), visit);
            walk_expr_list(args, visit);
        }
        ExprKind::Star(x) => walk(Node::Expr(x), visit),
        ExprKind::Unary { x, .. } => walk(Node::Expr(x), visit),
        ExprKind::Binary { x, y, .. } => {
            walk(Node::Expr(x), visit);
            walk(Node::Expr(y), visit);
        }
        ExprKind::Paren(x) => walk(Node::Expr(x), visit),
        ExprKind::ArrayType { len, elt } => {
            if let Some(l) = len {
                walk(Node::Expr(l), visit);
            }
            walk(Node::Expr(elt), visit);
        }
        ExprKind::StructType { fields } | ExprKind::InterfaceType { methods: fields } => {
            for f in fields {
                walk_field(f, visit);
            }
        }
        ExprKind::FuncType { params, results } => {
            for f in params.iter().chain(results.iter()) {
                walk_field(f, visit);
            }
        }
        ExprKind::MapType { key, value } => {
            walk(Node::Expr(key), visit);
            walk(Node::Expr(value), visit);
        }
        ExprKind::ChanType { value, .. } => walk(Node::Expr(value), visit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, Ident};

    fn ident_expr(name: &str) -> Expr {
        Expr {
            pos: 1,
            end: 1 + name.len() as u32,
            kind: ExprKind::Ident(Ident { name: name.to_string(), pos: 1 }),
        }
    }

    #[test]
    fn visits_binary_operands() {
        let e = Expr {
            pos: 1,
            end: 5,
            kind: ExprKind::Binary {
                op: crate::ast::BinOp::Add,
                x: Box::new(ident_expr("a")),
                y: Box::new(ident_expr("b")),
            },
        };
        let mut count = 0;
        walk(Node::Expr(&e), &mut |_| count += 1);
        // binary + a + b = 3 nodes
        assert_eq!(count, 3);
    }

    #[test]
    fn visits_basic_lit_as_leaf() {
        let e = Expr {
            pos: 1,
            end: 2,
            kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "1".to_string() },
        };
        let mut count = 0;
        walk(Node::Expr(&e), &mut |_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn visits_call_args_as_list_then_elements() {
        let call = Expr {
            pos: 1,
            end: 10,
            kind: ExprKind::Call {
                fun: Box::new(ident_expr("f")),
                args: vec![ident_expr("a"), ident_expr("b")],
                has_ellipsis: false,
            },
        };
        let mut seen_list = false;
        let mut seen_elems = 0;
        walk(Node::Expr(&call), &mut |n| match n {
            Node::List(NodeList::Expr(_)) => seen_list = true,
            Node::Expr(e) => {
                if matches!(e.kind, ExprKind::Ident(_)) && e.pos != call.pos {
                    seen_elems += 1;
                }
            }
            _ => {}
        });
        assert!(seen_list);
        assert_eq!(seen_elems, 3); // fun + a + b
    }

    #[test]
    fn walk_root_offers_expr_list_view_of_singleton_stmt_list() {
        let stmts = vec![Stmt { pos: 1, end: 2, kind: StmtKind::Expr(ident_expr("x")) }];
        let mut seen_expr_list = false;
        walk_root(Node::List(NodeList::Stmt(&stmts)), &mut |n| {
            if let Node::List(NodeList::Expr(es)) = n {
                if es.len() == 1 {
                    seen_expr_list = true;
                }
            }
        });
        assert!(seen_expr_list);
    }

    #[test]
    fn walk_root_offers_empty_expr_list_view_of_empty_stmt_list() {
        let stmts: Vec<Stmt> = vec![];
        let mut seen_empty_expr_list = false;
        walk_root(Node::List(NodeList::Stmt(&stmts)), &mut |n| {
            if let Node::List(NodeList::Expr(es)) = n {
                if es.is_empty() {
                    seen_empty_expr_list = true;
                }
            }
        });
        assert!(seen_empty_expr_list);
    }

    #[test]
    fn walk_root_offers_stmt_list_view_of_singleton_expr_list() {
        let exprs = vec![ident_expr("x")];
        let mut seen_stmt_list = false;
        walk_root(Node::List(NodeList::Expr(&exprs)), &mut |n| {
            if let Node::List(NodeList::Stmt(ss)) = n {
                if ss.len() == 1 {
                    seen_stmt_list = true;
                }
            }
        });
        assert!(seen_stmt_list);
    }
}

//! Structural unifier.
//!
//! Recursively matches a pattern node against a target node, building up a
//! binding table as it goes. The current lexical scope and the binding
//! table are both threaded as explicit state rather than mutated through a
//! shared pointer: the scope changes only at block/function/case
//! boundaries, and threading it as a parameter keeps the recursion
//! borrow-checker-friendly and easy to reason about independent of call
//! order (see DESIGN.md).

use std::collections::HashMap;
use std::fmt;

use crate::ast::{
    AssignOp, BasicLitKind, CaseClause, CommClause, Decl, Expr, ExprKind, Field, FuncDecl, Ident,
    Spanned, Spec, Stmt, StmtKind,
};
use crate::listmatcher::{match_lists, wildcard_at};
use crate::node::{BoundValue, Node, NodeList};
use crate::typecheck::{ScopeId, ScopeTree, Ty, TypeInfo};
use crate::typeresolve::{ResolveError, TypeResolver};
use crate::wildcard::{decode, TypeOp, UnderlyingKind, WildcardInfo, WildcardRegistry, CASE_BODY_SENTINEL};

pub type Bindings = HashMap<String, BoundValue>;

/// A match attempt can fail outright (`Ok(false)`) or hit an unresolvable
/// type constraint, which is fatal for this attempt but not for the whole
/// pipeline: it surfaces as a pipeline-level error, not a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    Resolve(ResolveError),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Resolve(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<ResolveError> for MatchError {
    fn from(e: ResolveError) -> Self {
        MatchError::Resolve(e)
    }
}

pub type MResult<T> = Result<T, MatchError>;

/// Which of the aggressive-mode relaxations are active. The original tool
/// collapses these into one boolean flag; splitting them into a policy
/// struct lets a caller turn on exactly the relaxations it wants instead of
/// all-or-nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressivePolicy {
    /// A bare `nil` literal in the pattern matches any expression.
    pub nil_matches_any: bool,
    /// An assign statement's operator (`=` vs `:=` vs `+=`...) is ignored.
    pub assign_matches_value_spec: bool,
    /// A block-statement pattern also matches a single non-block statement,
    /// by comparing against a synthetic one-element statement list.
    pub block_matches_any_via_stmt_list: bool,
    /// A one-name, one-value `var`/`const` spec pattern also matches a
    /// single-assignment statement with the same name and value.
    pub bare_value_matches_one_name_spec: bool,
    /// A single-spec decl pattern also matches a bare spec appearing
    /// directly (e.g. as one element of a surrounding spec list).
    pub single_spec_matches_bare_spec: bool,
}

impl AggressivePolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        AggressivePolicy {
            nil_matches_any: true,
            assign_matches_value_spec: true,
            block_matches_any_via_stmt_list: true,
            bare_value_matches_one_name_spec: true,
            single_spec_matches_bare_spec: true,
        }
    }
}

pub struct Unifier<'a> {
    registry: &'a WildcardRegistry,
    type_info: &'a TypeInfo,
    scopes: &'a ScopeTree,
    policy: AggressivePolicy,
    bindings: Bindings,
}

impl<'a> Unifier<'a> {
    pub fn new(
        registry: &'a WildcardRegistry,
        type_info: &'a TypeInfo,
        scopes: &'a ScopeTree,
        policy: AggressivePolicy,
    ) -> Self {
        Unifier { registry, type_info, scopes, policy, bindings: Bindings::new() }
    }

    pub fn registry(&self) -> &'a WildcardRegistry {
        self.registry
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn restore(&mut self, snapshot: Bindings) {
        self.bindings = snapshot;
    }

    pub fn bind(&mut self, name: String, node: &Node<'_>) {
        if let Some(v) = BoundValue::from_node(node) {
            self.bindings.insert(name, v);
        }
    }

    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }

    /// Entry point for matching a whole pattern against a candidate target
    /// node, looking up the target's attached scope (falling back to the
    /// scope root for targets not covered by the scope tree, e.g. a bare
    /// sub-expression extracted for a recursive match attempt).
    pub fn match_at(&mut self, pattern: Node<'_>, target: Node<'_>) -> MResult<bool> {
        let scope = self.scopes.scope_of(target.pos()).unwrap_or_else(|| self.scopes.root());
        self.unify_node(pattern, target, scope)
    }

    pub fn unify_node(&mut self, pattern: Node<'_>, target: Node<'_>, scope: ScopeId) -> MResult<bool> {
        if let Some(id) = wildcard_at(pattern) {
            return self.unify_wildcard(id, target, scope);
        }

        if self.policy.bare_value_matches_one_name_spec {
            if let (Node::Spec(Spec::Value { names, typ: None, values, .. }), Node::Stmt(stmt)) =
                (pattern, target)
            {
                if let StmtKind::Assign { lhs, rhs, .. } = &stmt.kind {
                    if names.len() == 1 && values.len() == 1 && lhs.len() == 1 && rhs.len() == 1 {
                        if let ExprKind::Ident(tid) = &lhs[0].kind {
                            return Ok(self.unify_ident(&names[0], tid, scope)?
                                && self.unify_node(Node::Expr(&values[0]), Node::Expr(&rhs[0]), scope)?);
                        }
                    }
                }
            }
        }

        if self.policy.single_spec_matches_bare_spec {
            if let (Node::Decl(pd), Node::Spec(ts)) = (pattern, target) {
                let specs: &[Spec] = match pd {
                    Decl::Import(s) | Decl::Var(s) | Decl::Const(s) | Decl::Type(s) => s,
                    Decl::Func(_) => &[],
                };
                if specs.len() == 1 {
                    return self.unify_spec(&specs[0], ts, scope);
                }
            }
        }

        match (pattern, target) {
            (Node::File(p), Node::File(t)) => self.unify_file(p, t, scope),
            (Node::Decl(p), Node::Decl(t)) => self.unify_decl(p, t, scope),
            (Node::Spec(p), Node::Spec(t)) => self.unify_spec(p, t, scope),
            (Node::Stmt(p), Node::Stmt(t)) => self.unify_stmt(p, t, scope),
            (Node::Expr(p), Node::Expr(t)) => self.unify_expr(p, t, scope),
            (Node::Expr(p), Node::Stmt(t)) => {
                // A bare expression pattern at statement position matches an
                // expression-statement target transparently.
                if let StmtKind::Expr(te) = &t.kind {
                    self.unify_expr(p, te, scope)
                } else {
                    Ok(false)
                }
            }
            (Node::Ident(p), Node::Ident(t)) => Ok(p.name == t.name),
            (Node::List(p), Node::List(t)) => Ok(match_lists(self, scope, p, t, false)?.is_some()),
            _ => Ok(false),
        }
    }

    // ── wildcards ────────────────────────────────────────────────────────────

    /// `e` is nothing but a bare variadic wildcard identifier (`$*name`),
    /// the one shape that lets an if/for/switch header's init/cond-or-tag
    /// short-circuit against the target's whole header as a single list
    /// (see `unify_stmt`'s If/For/Switch arms).
    fn bare_any_wildcard(&self, e: &Expr) -> Option<u32> {
        wildcard_at(Node::Expr(e)).filter(|&id| self.registry.get(id).any)
    }

    fn unify_wildcard(&mut self, id: u32, target: Node<'_>, scope: ScopeId) -> MResult<bool> {
        let info = self.registry.get(id).clone();

        // A variadic wildcard encountered outside list-matching context (the
        // list matcher intercepts it before it ever reaches here) cannot
        // bind to a single node.
        if info.any {
            return Ok(false);
        }

        if info.is_discard() {
            return self.check_side_conditions(&info, target, scope);
        }

        if let Some(prior) = self.bindings.get(&info.name).cloned() {
            let prior_node = prior.as_node();
            return self.unify_node(prior_node, target, scope);
        }

        if !self.check_side_conditions(&info, target, scope)? {
            return Ok(false);
        }
        self.bind(info.name.clone(), &target);
        Ok(true)
    }

    fn check_side_conditions(&self, info: &WildcardInfo, target: Node<'_>, scope: ScopeId) -> MResult<bool> {
        if !info.name_rxs.is_empty() {
            match target.as_ident() {
                Some(id) if info.name_rxs.iter().all(|rx| rx.is_match(&id.name)) => {}
                _ => return Ok(false),
            }
        }

        if info.types.is_empty() && !info.comparable && !info.addressable && info.underlying.is_none() {
            return Ok(true);
        }

        let Some(expr) = target.as_expr() else {
            return Ok(false);
        };
        let tv = self.type_info.type_and_value_of(expr);
        let ty = tv.map(|tv| tv.ty.clone()).unwrap_or(Ty::Unknown);

        if info.addressable && !tv.map(|tv| tv.addressable).unwrap_or(false) {
            return Ok(false);
        }
        if info.comparable && !ty.is_comparable() {
            return Ok(false);
        }
        if let Some(uk) = info.underlying {
            if !underlying_matches(&ty, uk) {
                return Ok(false);
            }
        }
        if !info.types.is_empty() {
            let resolver = TypeResolver::new(self.scopes);
            for (op, constraint_expr) in &info.types {
                let constraint_ty = resolver.resolve(constraint_expr, scope)?;
                let ok = match op {
                    TypeOp::Type => ty.identical(&constraint_ty),
                    TypeOp::Asgn => ty.assignable_to(&constraint_ty),
                    TypeOp::Conv => ty.convertible_to(&constraint_ty),
                };
                if !ok {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn unify_ident(&mut self, p: &Ident, t: &Ident, scope: ScopeId) -> MResult<bool> {
        if let Some(id) = decode(&p.name) {
            return self.unify_wildcard(id, Node::Ident(t), scope);
        }
        Ok(p.name == t.name)
    }

    fn unify_optional_ident(&mut self, p: Option<&Ident>, t: Option<&Ident>, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (None, None) => Ok(true),
            (Some(p), Some(t)) => self.unify_ident(p, t, scope),
            _ => Ok(false),
        }
    }

    // ── lists ────────────────────────────────────────────────────────────────

    fn unify_expr_list(&mut self, p: &[Expr], t: &[Expr], scope: ScopeId) -> MResult<bool> {
        Ok(match_lists(self, scope, NodeList::Expr(p), NodeList::Expr(t), false)?.is_some())
    }

    fn unify_stmt_list(&mut self, p: &[Stmt], t: &[Stmt], scope: ScopeId) -> MResult<bool> {
        Ok(match_lists(self, scope, NodeList::Stmt(p), NodeList::Stmt(t), false)?.is_some())
    }

    fn unify_spec_list(&mut self, p: &[Spec], t: &[Spec], scope: ScopeId) -> MResult<bool> {
        Ok(match_lists(self, scope, NodeList::Spec(p), NodeList::Spec(t), false)?.is_some())
    }

    fn unify_optional_expr(&mut self, p: Option<&Expr>, t: Option<&Expr>, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (None, None) => Ok(true),
            (Some(p), Some(t)) => self.unify_node(Node::Expr(p), Node::Expr(t), scope),
            _ => Ok(false),
        }
    }

    fn unify_optional_stmt(&mut self, p: Option<&Stmt>, t: Option<&Stmt>, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (None, None) => Ok(true),
            (Some(p), Some(t)) => self.unify_node(Node::Stmt(p), Node::Stmt(t), scope),
            _ => Ok(false),
        }
    }

    fn unify_optional_stmt_list(&mut self, p: Option<&[Stmt]>, t: Option<&[Stmt]>, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (None, None) => Ok(true),
            (Some(p), Some(t)) => self.unify_stmt_list(p, t, scope),
            _ => Ok(false),
        }
    }

    fn unify_optional_field(&mut self, p: Option<&Field>, t: Option<&Field>, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (None, None) => Ok(true),
            (Some(p), Some(t)) => Ok(self.unify_node(
                Node::List(NodeList::Ident(&p.names)),
                Node::List(NodeList::Ident(&t.names)),
                scope,
            )? && self.unify_node(Node::Expr(&p.typ), Node::Expr(&t.typ), scope)?),
            _ => Ok(false),
        }
    }

    fn unify_fields(&mut self, p: &[Field], t: &[Field], scope: ScopeId) -> MResult<bool> {
        if p.len() != t.len() {
            return Ok(false);
        }
        for (pf, tf) in p.iter().zip(t) {
            if !self.unify_node(Node::List(NodeList::Ident(&pf.names)), Node::List(NodeList::Ident(&tf.names)), scope)? {
                return Ok(false);
            }
            if !self.unify_node(Node::Expr(&pf.typ), Node::Expr(&tf.typ), scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ── expressions ──────────────────────────────────────────────────────────

    fn unify_expr(&mut self, p: &Expr, t: &Expr, scope: ScopeId) -> MResult<bool> {
        if self.policy.nil_matches_any {
            if let ExprKind::BasicLit { kind: BasicLitKind::Nil, .. } = &p.kind {
                return Ok(true);
            }
        }

        match (&p.kind, &t.kind) {
            (ExprKind::Ident(pi), ExprKind::Ident(ti)) => Ok(pi.name == ti.name),
            (ExprKind::BasicLit { kind: pk, value: pv }, ExprKind::BasicLit { kind: tk, value: tv }) => {
                Ok(pk == tk && pv == tv)
            }
            (ExprKind::CompositeLit { typ: pt, elts: pe }, ExprKind::CompositeLit { typ: tt, elts: te }) => {
                Ok(self.unify_optional_expr(pt.as_deref(), tt.as_deref(), scope)?
                    && self.unify_expr_list(pe, te, scope)?)
            }
            (ExprKind::KeyValue { key: pk, value: pv }, ExprKind::KeyValue { key: tk, value: tv }) => Ok(self
                .unify_node(Node::Expr(pk), Node::Expr(tk), scope)?
                && self.unify_node(Node::Expr(pv), Node::Expr(tv), scope)?),
            (ExprKind::FuncLit { typ: pt, body: pb }, ExprKind::FuncLit { typ: tt, body: tb }) => Ok(self
                .unify_node(Node::Expr(pt), Node::Expr(tt), scope)?
                && self.unify_stmt_list(pb, tb, scope)?),
            (ExprKind::Selector { x: px, sel: ps }, ExprKind::Selector { x: tx, sel: ts }) => Ok(self
                .unify_node(Node::Expr(px), Node::Expr(tx), scope)?
                && self.unify_ident(ps, ts, scope)?),
            (ExprKind::Index { x: px, index: pi }, ExprKind::Index { x: tx, index: ti }) => Ok(self
                .unify_node(Node::Expr(px), Node::Expr(tx), scope)?
                && self.unify_node(Node::Expr(pi), Node::Expr(ti), scope)?),
            (
                ExprKind::Slice { x: px, lo: pl, hi: ph, max: pm },
                ExprKind::Slice { x: tx, lo: tl, hi: th, max: tm },
            ) => Ok(self.unify_node(Node::Expr(px), Node::Expr(tx), scope)?
                && self.unify_optional_expr(pl.as_deref(), tl.as_deref(), scope)?
                && self.unify_optional_expr(ph.as_deref(), th.as_deref(), scope)?
                && self.unify_optional_expr(pm.as_deref(), tm.as_deref(), scope)?),
            (ExprKind::TypeAssert { x: px, typ: pt }, ExprKind::TypeAssert { x: tx, typ: tt }) => Ok(self
                .unify_node(Node::Expr(px), Node::Expr(tx), scope)?
                && self.unify_optional_expr(pt.as_deref(), tt.as_deref(), scope)?),
            (
                ExprKind::Call { fun: pf, args: pa, has_ellipsis: pe },
                ExprKind::Call { fun: tf, args: ta, has_ellipsis: te },
            ) => {
                if pe != te {
                    return Ok(false);
                }
                Ok(self.unify_node(Node::Expr(pf), Node::Expr(tf), scope)? && self.unify_expr_list(pa, ta, scope)?)
            }
            (ExprKind::Star(p1), ExprKind::Star(t1)) => self.unify_node(Node::Expr(p1), Node::Expr(t1), scope),
            (ExprKind::Unary { op: po, x: px }, ExprKind::Unary { op: to, x: tx }) => {
                Ok(po == to && self.unify_node(Node::Expr(px), Node::Expr(tx), scope)?)
            }
            (ExprKind::Binary { op: po, x: px, y: py }, ExprKind::Binary { op: to, x: tx, y: ty }) => Ok(po == to
                && self.unify_node(Node::Expr(px), Node::Expr(tx), scope)?
                && self.unify_node(Node::Expr(py), Node::Expr(ty), scope)?),
            (ExprKind::ArrayType { len: pl, elt: pe }, ExprKind::ArrayType { len: tl, elt: te }) => Ok(self
                .unify_optional_expr(pl.as_deref(), tl.as_deref(), scope)?
                && self.unify_node(Node::Expr(pe), Node::Expr(te), scope)?),
            (ExprKind::StructType { fields: pf }, ExprKind::StructType { fields: tf }) => self.unify_fields(pf, tf, scope),
            (ExprKind::InterfaceType { methods: pm }, ExprKind::InterfaceType { methods: tm }) => {
                self.unify_fields(pm, tm, scope)
            }
            (
                ExprKind::FuncType { params: pp, results: pr },
                ExprKind::FuncType { params: tp, results: tr },
            ) => Ok(self.unify_fields(pp, tp, scope)? && self.unify_fields(pr, tr, scope)?),
            (ExprKind::MapType { key: pk, value: pv }, ExprKind::MapType { key: tk, value: tv }) => Ok(self
                .unify_node(Node::Expr(pk), Node::Expr(tk), scope)?
                && self.unify_node(Node::Expr(pv), Node::Expr(tv), scope)?),
            (ExprKind::ChanType { dir: pd, value: pv }, ExprKind::ChanType { dir: td, value: tv }) => {
                Ok(pd == td && self.unify_node(Node::Expr(pv), Node::Expr(tv), scope)?)
            }
            (ExprKind::Paren(p1), _) => self.unify_node(Node::Expr(p1), Node::Expr(t), scope),
            (_, ExprKind::Paren(t1)) => self.unify_node(Node::Expr(p), Node::Expr(t1), scope),
            _ => Ok(false),
        }
    }

    // ── statements ───────────────────────────────────────────────────────────

    fn unify_stmt(&mut self, p: &Stmt, t: &Stmt, scope: ScopeId) -> MResult<bool> {
        if self.policy.block_matches_any_via_stmt_list {
            if let StmtKind::Block(pb) = &p.kind {
                if !matches!(t.kind, StmtKind::Block(_)) {
                    let synthetic = std::slice::from_ref(t);
                    return self.unify_stmt_list(pb, synthetic, scope);
                }
            }
        }

        match (&p.kind, &t.kind) {
            (StmtKind::Block(pb), StmtKind::Block(tb)) => {
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                self.unify_stmt_list(pb, tb, child)
            }
            (StmtKind::Expr(pe), StmtKind::Expr(te)) => self.unify_node(Node::Expr(pe), Node::Expr(te), scope),
            (StmtKind::Assign { op: po, lhs: pl, rhs: pr }, StmtKind::Assign { op: to, lhs: tl, rhs: tr }) => {
                if po != to && !self.policy.assign_matches_value_spec {
                    return Ok(false);
                }
                Ok(self.unify_expr_list(pl, tl, scope)? && self.unify_expr_list(pr, tr, scope)?)
            }
            (StmtKind::Return(p1), StmtKind::Return(t1)) => self.unify_expr_list(p1, t1, scope),
            (StmtKind::Branch { kind: pk, label: pl }, StmtKind::Branch { kind: tk, label: tl }) => {
                Ok(pk == tk && self.unify_optional_ident(pl.as_ref(), tl.as_ref(), scope)?)
            }
            (StmtKind::Labeled { label: pl, stmt: ps }, StmtKind::Labeled { label: tl, stmt: ts }) => Ok(self
                .unify_ident(pl, tl, scope)?
                && self.unify_node(Node::Stmt(ps), Node::Stmt(ts), scope)?),
            (StmtKind::Send { chan: pc, value: pv }, StmtKind::Send { chan: tc, value: tv }) => Ok(self
                .unify_node(Node::Expr(pc), Node::Expr(tc), scope)?
                && self.unify_node(Node::Expr(pv), Node::Expr(tv), scope)?),
            (StmtKind::IncDec { x: px, is_inc: pi }, StmtKind::IncDec { x: tx, is_inc: ti }) => {
                Ok(pi == ti && self.unify_node(Node::Expr(px), Node::Expr(tx), scope)?)
            }
            (StmtKind::Decl(pd), StmtKind::Decl(td)) => self.unify_decl(pd, td, scope),
            (StmtKind::Go(p1), StmtKind::Go(t1)) => self.unify_node(Node::Expr(p1), Node::Expr(t1), scope),
            (StmtKind::Defer(p1), StmtKind::Defer(t1)) => self.unify_node(Node::Expr(p1), Node::Expr(t1), scope),
            (
                StmtKind::If { init: pi, cond: pc, body: pb, els: pe },
                StmtKind::If { init: ti, cond: tc, body: tb, els: te },
            ) => {
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                if pi.is_none() {
                    if self.bare_any_wildcard(pc).is_some() {
                        let synthetic = header_stmts(ti.as_deref(), Some(tc), None);
                        let pat_elem = Stmt { pos: pc.pos, end: pc.end, kind: StmtKind::Expr(pc.clone()) };
                        if !self.unify_stmt_list(std::slice::from_ref(&pat_elem), &synthetic, child)? {
                            return Ok(false);
                        }
                        return Ok(self.unify_stmt_list(pb, tb, child)?
                            && self.unify_optional_stmt(pe.as_deref(), te.as_deref(), scope)?);
                    }
                }
                Ok(self.unify_optional_stmt(pi.as_deref(), ti.as_deref(), child)?
                    && self.unify_node(Node::Expr(pc), Node::Expr(tc), child)?
                    && self.unify_stmt_list(pb, tb, child)?
                    && self.unify_optional_stmt(pe.as_deref(), te.as_deref(), scope)?)
            }
            (
                StmtKind::For { init: pi, cond: pc, post: pp, body: pb },
                StmtKind::For { init: ti, cond: tc, post: tp, body: tb },
            ) => {
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                if pi.is_none() && pp.is_none() {
                    if let Some(pc_expr) = pc {
                        if self.bare_any_wildcard(pc_expr).is_some() {
                            let synthetic = header_stmts(ti.as_deref(), tc.as_ref(), tp.as_deref());
                            let pat_elem =
                                Stmt { pos: pc_expr.pos, end: pc_expr.end, kind: StmtKind::Expr(pc_expr.clone()) };
                            if !self.unify_stmt_list(std::slice::from_ref(&pat_elem), &synthetic, child)? {
                                return Ok(false);
                            }
                            return self.unify_stmt_list(pb, tb, child);
                        }
                    }
                }
                Ok(self.unify_optional_stmt(pi.as_deref(), ti.as_deref(), child)?
                    && self.unify_optional_expr(pc.as_ref(), tc.as_ref(), child)?
                    && self.unify_optional_stmt(pp.as_deref(), tp.as_deref(), child)?
                    && self.unify_stmt_list(pb, tb, child)?)
            }
            (
                StmtKind::Range { key: pk, value: pv, define: pd, x: px, body: pb },
                StmtKind::Range { key: tk, value: tv, define: td, x: tx, body: tb },
            ) => {
                if pd != td {
                    return Ok(false);
                }
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                Ok(self.unify_optional_expr(pk.as_ref(), tk.as_ref(), child)?
                    && self.unify_optional_expr(pv.as_ref(), tv.as_ref(), child)?
                    && self.unify_node(Node::Expr(px), Node::Expr(tx), child)?
                    && self.unify_stmt_list(pb, tb, child)?)
            }
            (StmtKind::Switch { init: pi, tag: pt, cases: pc }, StmtKind::Switch { init: ti, tag: tt, cases: tc }) => {
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                if pi.is_none() {
                    if let Some(pt_expr) = pt {
                        if self.bare_any_wildcard(pt_expr).is_some() {
                            let synthetic = header_stmts(ti.as_deref(), tt.as_ref(), None);
                            let pat_elem =
                                Stmt { pos: pt_expr.pos, end: pt_expr.end, kind: StmtKind::Expr(pt_expr.clone()) };
                            if !self.unify_stmt_list(std::slice::from_ref(&pat_elem), &synthetic, child)? {
                                return Ok(false);
                            }
                            return self.unify_cases(pc, tc, child);
                        }
                    }
                }
                Ok(self.unify_optional_stmt(pi.as_deref(), ti.as_deref(), child)?
                    && self.unify_optional_expr(pt.as_ref(), tt.as_ref(), child)?
                    && self.unify_cases(pc, tc, child)?)
            }
            (
                StmtKind::TypeSwitch { init: pi, assign: pa, x: px, cases: pc },
                StmtKind::TypeSwitch { init: ti, assign: ta, x: tx, cases: tc },
            ) => {
                let child = self.scopes.scope_of(t.pos).unwrap_or(scope);
                Ok(self.unify_optional_stmt(pi.as_deref(), ti.as_deref(), child)?
                    && self.unify_optional_ident(pa.as_ref(), ta.as_ref(), child)?
                    && self.unify_node(Node::Expr(px), Node::Expr(tx), child)?
                    && self.unify_cases(pc, tc, child)?)
            }
            (StmtKind::Select { comms: pc }, StmtKind::Select { comms: tc }) => self.unify_comms(pc, tc, scope),
            (StmtKind::Empty, StmtKind::Empty) => Ok(true),
            _ => Ok(false),
        }
    }

    fn unify_cases(&mut self, p: &[CaseClause], t: &[CaseClause], scope: ScopeId) -> MResult<bool> {
        // A lone case whose values are a single variadic wildcard and whose
        // body is the case-body sentinel stands for "the rest of the case
        // list" — cases are not one of the four node-list species, so this
        // sugar is handled here rather than delegated to the list matcher.
        if p.len() == 1 && p[0].values.len() == 1 && is_case_body_sentinel(&p[0].body) {
            if let Some(id) = wildcard_at(Node::Expr(&p[0].values[0])) {
                if self.registry.get(id).any {
                    return Ok(true);
                }
            }
        }
        if p.len() != t.len() {
            return Ok(false);
        }
        for (pc, tc) in p.iter().zip(t) {
            if !self.unify_expr_list(&pc.values, &tc.values, scope)? {
                return Ok(false);
            }
            if !self.unify_stmt_list(&pc.body, &tc.body, scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn unify_comms(&mut self, p: &[CommClause], t: &[CommClause], scope: ScopeId) -> MResult<bool> {
        if p.len() != t.len() {
            return Ok(false);
        }
        for (pc, tc) in p.iter().zip(t) {
            if !self.unify_optional_stmt(pc.comm.as_deref(), tc.comm.as_deref(), scope)? {
                return Ok(false);
            }
            if !self.unify_stmt_list(&pc.body, &tc.body, scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ── declarations / specs ─────────────────────────────────────────────────

    fn unify_decl(&mut self, p: &Decl, t: &Decl, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (Decl::Import(ps), Decl::Import(ts)) => self.unify_spec_list(ps, ts, scope),
            (Decl::Var(ps), Decl::Var(ts)) => self.unify_spec_list(ps, ts, scope),
            (Decl::Const(ps), Decl::Const(ts)) => self.unify_spec_list(ps, ts, scope),
            (Decl::Type(ps), Decl::Type(ts)) => self.unify_spec_list(ps, ts, scope),
            (Decl::Func(pf), Decl::Func(tf)) => self.unify_func(pf, tf, scope),
            _ => Ok(false),
        }
    }

    fn unify_func(&mut self, p: &FuncDecl, t: &FuncDecl, scope: ScopeId) -> MResult<bool> {
        let child = self.scopes.scope_of(t.typ.pos()).unwrap_or(scope);
        Ok(self.unify_ident(&p.name, &t.name, scope)?
            && self.unify_optional_field(p.recv.as_ref(), t.recv.as_ref(), scope)?
            && self.unify_node(Node::Expr(&p.typ), Node::Expr(&t.typ), scope)?
            && self.unify_optional_stmt_list(p.body.as_deref(), t.body.as_deref(), child)?)
    }

    fn unify_spec(&mut self, p: &Spec, t: &Spec, scope: ScopeId) -> MResult<bool> {
        match (p, t) {
            (Spec::Import { name: pn, path: pp, .. }, Spec::Import { name: tn, path: tp, .. }) => {
                Ok(self.unify_optional_ident(pn.as_ref(), tn.as_ref(), scope)? && pp == tp)
            }
            (
                Spec::Value { names: pn, typ: pt, values: pv, .. },
                Spec::Value { names: tn, typ: tt, values: tv, .. },
            ) => Ok(self.unify_node(Node::List(NodeList::Ident(pn)), Node::List(NodeList::Ident(tn)), scope)?
                && self.unify_optional_expr(pt.as_ref(), tt.as_ref(), scope)?
                && self.unify_expr_list(pv, tv, scope)?),
            (Spec::Type { name: pn, typ: pt, .. }, Spec::Type { name: tn, typ: tt, .. }) => {
                Ok(self.unify_ident(pn, tn, scope)? && self.unify_node(Node::Expr(pt), Node::Expr(tt), scope)?)
            }
            _ => Ok(false),
        }
    }

    fn unify_decl_list(&mut self, p: &[Decl], t: &[Decl], scope: ScopeId) -> MResult<bool> {
        // `Decl` is not one of the four node-list species (there is no
        // reasonable variadic use case for matching a subset of a file's
        // top-level declarations), so file-level decls are compared
        // pairwise rather than through the list matcher.
        if p.len() != t.len() {
            return Ok(false);
        }
        for (pd, td) in p.iter().zip(t) {
            if !self.unify_decl(pd, td, scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn unify_file(&mut self, p: &crate::ast::File, t: &crate::ast::File, scope: ScopeId) -> MResult<bool> {
        Ok(self.unify_ident(&p.package, &t.package, scope)? && self.unify_decl_list(&p.decls, &t.decls, scope)?)
    }
}

/// Build the synthetic statement list an if/for/switch header short-circuit
/// matches its variadic wildcard against: the init statement (if any),
/// the cond/tag expression wrapped as an expression-statement, and the
/// post statement (if any, `for` only), in source order.
fn header_stmts(init: Option<&Stmt>, cond_or_tag: Option<&Expr>, post: Option<&Stmt>) -> Vec<Stmt> {
    let mut out = Vec::new();
    if let Some(i) = init {
        out.push(i.clone());
    }
    if let Some(c) = cond_or_tag {
        out.push(Stmt { pos: c.pos, end: c.end, kind: StmtKind::Expr(c.clone()) });
    }
    if let Some(p) = post {
        out.push(p.clone());
    }
    out
}

fn is_case_body_sentinel(body: &[Stmt]) -> bool {
    matches!(
        body,
        [Stmt { kind: StmtKind::Expr(Expr { kind: ExprKind::Ident(id), .. }), .. }]
            if id.name == CASE_BODY_SENTINEL
    )
}

fn underlying_matches(ty: &Ty, kind: UnderlyingKind) -> bool {
    matches!(
        (ty.underlying(), kind),
        (Ty::Basic(_), UnderlyingKind::Basic)
            | (Ty::Array(..), UnderlyingKind::Array)
            | (Ty::Slice(_), UnderlyingKind::Slice)
            | (Ty::Struct(_), UnderlyingKind::Struct)
            | (Ty::Interface, UnderlyingKind::Interface)
            | (Ty::Pointer(_), UnderlyingKind::Pointer)
            | (Ty::Func(..), UnderlyingKind::Func)
            | (Ty::Map(..), UnderlyingKind::Map)
            | (Ty::Chan(_), UnderlyingKind::Chan)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignOp, BasicLitKind};
    use crate::wildcard::WildcardRegistry;

    fn ident_expr(name: &str) -> Expr {
        Expr { pos: 1, end: 1 + name.len() as u32, kind: ExprKind::Ident(Ident { name: name.to_string(), pos: 1 }) }
    }

    fn int_lit(v: &str) -> Expr {
        Expr { pos: 1, end: 2, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: v.to_string() } }
    }

    fn env() -> (WildcardRegistry, TypeInfo, ScopeTree) {
        (WildcardRegistry::new(), TypeInfo::new(), ScopeTree::new())
    }

    #[test]
    fn identical_literal_matches() {
        let (reg, info, scopes) = env();
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        assert!(u.unify_node(Node::Expr(&int_lit("1")), Node::Expr(&int_lit("1")), scope).unwrap());
        assert!(!u.unify_node(Node::Expr(&int_lit("1")), Node::Expr(&int_lit("2")), scope).unwrap());
    }

    #[test]
    fn named_wildcard_binds_then_requires_consistency() {
        let mut reg = WildcardRegistry::new();
        let id = reg.register(WildcardInfo { name: "x".to_string(), any: false, ..Default::default() });
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let wc = ident_expr(&crate::wildcard::encode(id));

        assert!(u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("5")), scope).unwrap());
        // repeated occurrence must unify against the same binding
        assert!(u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("5")), scope).unwrap());
        assert!(!u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("6")), scope).unwrap());
    }

    #[test]
    fn discard_matches_anything_without_binding() {
        let mut reg = WildcardRegistry::new();
        let id = reg.register(WildcardInfo::discard(false));
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let wc = ident_expr(&crate::wildcard::encode(id));
        assert!(u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("1")), scope).unwrap());
        assert!(u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("2")), scope).unwrap());
        assert!(u.bindings().is_empty());
    }

    #[test]
    fn variadic_wildcard_outside_list_context_fails() {
        let mut reg = WildcardRegistry::new();
        let id = reg.register(WildcardInfo { name: "xs".to_string(), any: true, ..Default::default() });
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let wc = ident_expr(&crate::wildcard::encode(id));
        assert!(!u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("1")), scope).unwrap());
    }

    #[test]
    fn aggressive_nil_matches_any_expression() {
        let (reg, info, scopes) = env();
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::all());
        let scope = scopes.root();
        let nil = Expr { pos: 1, end: 4, kind: ExprKind::BasicLit { kind: BasicLitKind::Nil, value: "nil".to_string() } };
        assert!(u.unify_node(Node::Expr(&nil), Node::Expr(&int_lit("42")), scope).unwrap());

        let mut strict = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        assert!(!strict.unify_node(Node::Expr(&nil), Node::Expr(&int_lit("42")), scope).unwrap());
    }

    #[test]
    fn assign_operator_mismatch_fails_without_aggressive_mode() {
        let (reg, info, scopes) = env();
        let define = Stmt {
            pos: 1,
            end: 5,
            kind: StmtKind::Assign { op: AssignOp::Define, lhs: vec![ident_expr("x")], rhs: vec![int_lit("1")] },
        };
        let assign = Stmt {
            pos: 1,
            end: 5,
            kind: StmtKind::Assign { op: AssignOp::Assign, lhs: vec![ident_expr("x")], rhs: vec![int_lit("1")] },
        };
        let mut strict = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        assert!(!strict.unify_node(Node::Stmt(&define), Node::Stmt(&assign), scope).unwrap());

        let mut loose = Unifier::new(&reg, &info, &scopes, AggressivePolicy::all());
        assert!(loose.unify_node(Node::Stmt(&define), Node::Stmt(&assign), scope).unwrap());
    }

    #[test]
    fn if_header_short_circuit_matches_bare_any_cond_and_body() {
        let mut reg = WildcardRegistry::new();
        let cond_id = reg.register(WildcardInfo { name: "_".to_string(), any: true, ..Default::default() });
        let body_id = reg.register(WildcardInfo { name: "_".to_string(), any: true, ..Default::default() });
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let scope = scopes.root();

        let pattern = Stmt {
            pos: 0,
            end: 0,
            kind: StmtKind::If {
                init: None,
                cond: ident_expr(&crate::wildcard::encode(cond_id)),
                body: vec![Stmt { pos: 1, end: 2, kind: StmtKind::Expr(ident_expr(&crate::wildcard::encode(body_id))) }],
                els: None,
            },
        };
        let target = Stmt {
            pos: 0,
            end: 0,
            kind: StmtKind::If {
                init: None,
                cond: ident_expr("ok"),
                body: vec![Stmt { pos: 7, end: 11, kind: StmtKind::Expr(ident_expr("doit")) }],
                els: None,
            },
        };

        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        assert!(u.unify_node(Node::Stmt(&pattern), Node::Stmt(&target), scope).unwrap());
    }

    #[test]
    fn for_header_short_circuit_rejects_when_pattern_has_init() {
        let mut reg = WildcardRegistry::new();
        let cond_id = reg.register(WildcardInfo { name: "_".to_string(), any: true, ..Default::default() });
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let scope = scopes.root();

        let init_stmt = Stmt { pos: 1, end: 2, kind: StmtKind::Expr(ident_expr("i")) };
        let pattern = Stmt {
            pos: 0,
            end: 0,
            kind: StmtKind::For {
                init: Some(Box::new(init_stmt)),
                cond: Some(ident_expr(&crate::wildcard::encode(cond_id))),
                post: None,
                body: vec![],
            },
        };
        let target = Stmt {
            pos: 0,
            end: 0,
            kind: StmtKind::For { init: None, cond: Some(ident_expr("ok")), post: None, body: vec![] },
        };

        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        // pattern carries an init, so the header short-circuit must not fire
        // and the normal field-by-field comparison (which fails here: the
        // target has no init) takes over.
        assert!(!u.unify_node(Node::Stmt(&pattern), Node::Stmt(&target), scope).unwrap());
    }

    #[test]
    fn unresolvable_type_constraint_surfaces_as_error_not_panic() {
        let mut reg = WildcardRegistry::new();
        let id = reg.register(WildcardInfo {
            name: "x".to_string(),
            any: false,
            types: vec![(TypeOp::Type, ident_expr("TotallyUnknownType"))],
            ..Default::default()
        });
        let (info, scopes) = (TypeInfo::new(), ScopeTree::new());
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let wc = ident_expr(&crate::wildcard::encode(id));
        let result = u.unify_node(Node::Expr(&wc), Node::Expr(&int_lit("1")), scope);
        assert!(matches!(result, Err(MatchError::Resolve(_))));
    }
}

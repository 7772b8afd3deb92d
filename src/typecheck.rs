//! Minimal type checker / scope resolver.
//!
//! Type info and the scope chain are treated elsewhere as host-provided,
//! pure lookups (`typeOf`, `typeAndValueOf`, `scopeOf`). A complete repo
//! still needs something that produces them; this module is a best-effort
//! static pass, not a production type checker — it exists to give the
//! unifier's type side-conditions and the type resolver something real to
//! query. Generalised from a scope-aware name-collection walk that answers
//! "is this name used" into one that answers "what does this name resolve
//! to".

use std::collections::HashMap;

use crate::ast::{CaseClause, Decl, Expr, ExprKind, File, Pos, Spec, Stmt, StmtKind};

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Basic(String),
    Array(Box<Ty>, u64),
    Slice(Box<Ty>),
    Struct(Vec<(String, Ty)>),
    Interface,
    Pointer(Box<Ty>),
    Func(Vec<Ty>, Vec<Ty>),
    Map(Box<Ty>, Box<Ty>),
    Chan(Box<Ty>),
    /// A named type together with its underlying representation.
    Named(String, Box<Ty>),
    /// A package scope reached via a package-qualified identifier.
    Package(String),
    Unknown,
}

impl Ty {
    /// Strip `Named` wrappers to reach the underlying type category, used
    /// by the `underlying` wildcard constraint.
    pub fn underlying(&self) -> &Ty {
        match self {
            Ty::Named(_, inner) => inner.underlying(),
            other => other,
        }
    }

    pub fn is_comparable(&self) -> bool {
        match self.underlying() {
            Ty::Basic(_) | Ty::Pointer(_) | Ty::Interface | Ty::Chan(_) => true,
            Ty::Array(elt, _) => elt.is_comparable(),
            Ty::Struct(fields) => fields.iter().all(|(_, t)| t.is_comparable()),
            Ty::Slice(_) | Ty::Map(_, _) | Ty::Func(_, _) => false,
            Ty::Named(_, _) | Ty::Package(_) | Ty::Unknown => false,
        }
    }

    /// Structural identity used by the `type=` wildcard constraint.
    pub fn identical(&self, other: &Ty) -> bool {
        self == other
    }

    /// A conservative `assignable to` check: identical underlying shape, or
    /// either side is `Unknown`/`Interface` (treated permissively since this
    /// resolver does not implement full interface-satisfaction checking).
    pub fn assignable_to(&self, target: &Ty) -> bool {
        if self.identical(target) {
            return true;
        }
        matches!(target.underlying(), Ty::Interface | Ty::Unknown)
            || matches!(self.underlying(), Ty::Unknown)
            || self.underlying() == target.underlying()
    }

    /// A conservative `convertible to` check: same underlying category, or
    /// both basic (numeric/string conversions are always allowed between
    /// basic kinds in the object language).
    pub fn convertible_to(&self, target: &Ty) -> bool {
        if self.assignable_to(target) {
            return true;
        }
        matches!(
            (self.underlying(), target.underlying()),
            (Ty::Basic(_), Ty::Basic(_))
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeAndValue {
    pub ty: Ty,
    pub addressable: bool,
}

/// Expression type info keyed by the expression's `pos`. Positions are
/// unique within one parsed file, which is the only scope this resolver
/// operates over.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    by_pos: HashMap<Pos, TypeAndValue>,
}

impl TypeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pos: Pos, tv: TypeAndValue) {
        self.by_pos.insert(pos, tv);
    }

    pub fn type_of(&self, expr: &Expr) -> Option<&Ty> {
        self.by_pos.get(&expr.pos).map(|tv| &tv.ty)
    }

    pub fn type_and_value_of(&self, expr: &Expr) -> Option<&TypeAndValue> {
        self.by_pos.get(&expr.pos)
    }

    pub fn is_addressable(&self, expr: &Expr) -> bool {
        self.by_pos.get(&expr.pos).map(|tv| tv.addressable).unwrap_or(false)
    }
}

// ── Scopes ────────────────────────────────────────────────────────────────────

pub type ScopeId = usize;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub bindings: HashMap<String, Ty>,
    /// Set when this scope represents an imported package's exported scope.
    pub package_path: Option<String>,
}

/// A tree of lexical scopes, addressed by the `pos` of the scope-introducing
/// node (file, function type, block, if/for/switch/type-switch/case/comm,
/// range statement).
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    by_node: HashMap<Pos, ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut t = ScopeTree::default();
        t.scopes.push(Scope::default()); // universe/root scope, id 0
        t
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn new_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope { parent: Some(parent), ..Default::default() });
        id
    }

    pub fn bind(&mut self, scope: ScopeId, name: impl Into<String>, ty: Ty) {
        self.scopes[scope].bindings.insert(name.into(), ty);
    }

    pub fn attach(&mut self, node_pos: Pos, scope: ScopeId) {
        self.by_node.insert(node_pos, scope);
    }

    pub fn scope_of(&self, node_pos: Pos) -> Option<ScopeId> {
        self.by_node.get(&node_pos).copied()
    }

    /// Resolve `name` by walking from `scope` up through parents.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Ty> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = &self.scopes[id];
            if let Some(ty) = s.bindings.get(name) {
                return Some(ty);
            }
            cur = s.parent;
        }
        None
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }
}

// ── Minimal static pass ───────────────────────────────────────────────────────

/// Walk `file`, building a `ScopeTree` attached at every scope-introducing
/// node and a `TypeInfo` recording the type of every identifier expression
/// that resolves to a known binding. Anything this resolver cannot infer
/// (arithmetic result types, call return types, generic instantiation) is
/// left as `Ty::Unknown` rather than guessed.
pub fn check_file(file: &File) -> (ScopeTree, TypeInfo) {
    let mut scopes = ScopeTree::new();
    let mut info = TypeInfo::new();
    let file_scope = scopes.new_child(scopes.root());
    scopes.attach(file.pos(), file_scope);
    for decl in &file.decls {
        collect_decl(decl, &mut scopes, file_scope, &mut info);
    }
    (scopes, info)
}

use crate::ast::Spanned;

fn collect_decl(decl: &Decl, scopes: &mut ScopeTree, scope: ScopeId, info: &mut TypeInfo) {
    match decl {
        Decl::Var(specs) | Decl::Const(specs) => {
            for spec in specs {
                if let Spec::Value { names, typ, values, .. } = spec {
                    let declared = typ.as_ref().map(|t| resolve_type_expr(t, scopes, scope));
                    for (i, name) in names.iter().enumerate() {
                        let ty = declared
                            .clone()
                            .or_else(|| values.get(i).map(|_| Ty::Unknown))
                            .unwrap_or(Ty::Unknown);
                        scopes.bind(scope, name.name.clone(), ty);
                    }
                    for v in values {
                        annotate_expr(v, scopes, scope, info);
                    }
                }
            }
        }
        Decl::Type(specs) => {
            for spec in specs {
                if let Spec::Type { name, typ, .. } = spec {
                    let resolved = resolve_type_expr(typ, scopes, scope);
                    scopes.bind(scope, name.name.clone(), Ty::Named(name.name.clone(), Box::new(resolved)));
                }
            }
        }
        Decl::Import(specs) => {
            for spec in specs {
                if let Spec::Import { name, path, .. } = spec {
                    let bound = name
                        .as_ref()
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| package_short_name(path));
                    scopes.bind(scope, bound, Ty::Package(path.clone()));
                }
            }
        }
        Decl::Func(f) => {
            let fn_scope = scopes.new_child(scope);
            scopes.attach(f.typ.pos(), fn_scope);
            if let Some(recv) = &f.recv {
                for n in &recv.names {
                    scopes.bind(fn_scope, n.name.clone(), resolve_type_expr(&recv.typ, scopes, scope));
                }
            }
            if let ExprKind::FuncType { params, results: _ } = &f.typ.kind {
                for p in params {
                    let ty = resolve_type_expr(&p.typ, scopes, scope);
                    for n in &p.names {
                        scopes.bind(fn_scope, n.name.clone(), ty.clone());
                    }
                }
            }
            if let Some(body) = &f.body {
                collect_stmts(body, scopes, fn_scope, info);
            }
        }
    }
}

fn collect_stmts(stmts: &[Stmt], scopes: &mut ScopeTree, scope: ScopeId, info: &mut TypeInfo) {
    for s in stmts {
        collect_stmt(s, scopes, scope, info);
    }
}

fn collect_stmt(stmt: &Stmt, scopes: &mut ScopeTree, scope: ScopeId, info: &mut TypeInfo) {
    match &stmt.kind {
        StmtKind::Block(body) => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            collect_stmts(body, scopes, child, info);
        }
        StmtKind::Assign { lhs, rhs, op } => {
            for e in rhs {
                annotate_expr(e, scopes, scope, info);
            }
            if *op == crate::ast::AssignOp::Define {
                for l in lhs {
                    if let ExprKind::Ident(id) = &l.kind {
                        scopes.bind(scope, id.name.clone(), Ty::Unknown);
                    }
                }
            }
            for e in lhs {
                annotate_expr(e, scopes, scope, info);
            }
        }
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) | StmtKind::IncDec { x: e, .. } => {
            annotate_expr(e, scopes, scope, info);
        }
        StmtKind::Return(exprs) => {
            for e in exprs {
                annotate_expr(e, scopes, scope, info);
            }
        }
        StmtKind::Send { chan, value } => {
            annotate_expr(chan, scopes, scope, info);
            annotate_expr(value, scopes, scope, info);
        }
        StmtKind::Decl(d) => collect_decl(d, scopes, scope, info),
        StmtKind::Labeled { stmt, .. } => collect_stmt(stmt, scopes, scope, info),
        StmtKind::If { init, cond, body, els } => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            if let Some(init) = init {
                collect_stmt(init, scopes, child, info);
            }
            annotate_expr(cond, scopes, child, info);
            collect_stmts(body, scopes, child, info);
            if let Some(els) = els {
                collect_stmt(els, scopes, child, info);
            }
        }
        StmtKind::For { init, cond, post, body } => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            if let Some(init) = init {
                collect_stmt(init, scopes, child, info);
            }
            if let Some(cond) = cond {
                annotate_expr(cond, scopes, child, info);
            }
            if let Some(post) = post {
                collect_stmt(post, scopes, child, info);
            }
            collect_stmts(body, scopes, child, info);
        }
        StmtKind::Range { key, value, x, body, define } => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            annotate_expr(x, scopes, child, info);
            if *define {
                for e in [key, value].into_iter().flatten() {
                    if let ExprKind::Ident(id) = &e.kind {
                        scopes.bind(child, id.name.clone(), Ty::Unknown);
                    }
                }
            }
            collect_stmts(body, scopes, child, info);
        }
        StmtKind::Switch { init, tag, cases } => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            if let Some(init) = init {
                collect_stmt(init, scopes, child, info);
            }
            if let Some(tag) = tag {
                annotate_expr(tag, scopes, child, info);
            }
            collect_cases(cases, scopes, child, info);
        }
        StmtKind::TypeSwitch { init, assign, x, cases } => {
            let child = scopes.new_child(scope);
            scopes.attach(stmt.pos, child);
            if let Some(init) = init {
                collect_stmt(init, scopes, child, info);
            }
            annotate_expr(x, scopes, child, info);
            if let Some(a) = assign {
                scopes.bind(child, a.name.clone(), Ty::Unknown);
            }
            collect_cases(cases, scopes, child, info);
        }
        StmtKind::Select { comms } => {
            for c in comms {
                let child = scopes.new_child(scope);
                if let Some(comm) = &c.comm {
                    scopes.attach(comm.pos, child);
                    collect_stmt(comm, scopes, child, info);
                }
                collect_stmts(&c.body, scopes, child, info);
            }
        }
        StmtKind::Branch { .. } | StmtKind::Empty => {}
    }
}

fn collect_cases(cases: &[CaseClause], scopes: &mut ScopeTree, parent: ScopeId, info: &mut TypeInfo) {
    for c in cases {
        let child = scopes.new_child(parent);
        if let Some(first) = c.values.first() {
            scopes.attach(first.pos, child);
        }
        for v in &c.values {
            annotate_expr(v, scopes, child, info);
        }
        collect_stmts(&c.body, scopes, child, info);
    }
}

/// Record type info for `expr` and recurse into sub-expressions so every
/// identifier usage gets a best-effort type annotation.
fn annotate_expr(expr: &Expr, scopes: &ScopeTree, scope: ScopeId, info: &mut TypeInfo) {
    let (ty, addressable) = infer(expr, scopes, scope);
    info.record(expr.pos, TypeAndValue { ty, addressable });
    match &expr.kind {
        ExprKind::Selector { x, .. }
        | ExprKind::Index { x, .. }
        | ExprKind::TypeAssert { x, .. }
        | ExprKind::Star(x)
        | ExprKind::Unary { x, .. }
        | ExprKind::Paren(x) => annotate_expr(x, scopes, scope, info),
        ExprKind::Slice { x, lo, hi, max } => {
            annotate_expr(x, scopes, scope, info);
            for p in [lo, hi, max].into_iter().flatten() {
                annotate_expr(p, scopes, scope, info);
            }
        }
        ExprKind::Call { fun, args, .. } => {
            annotate_expr(fun, scopes, scope, info);
            for a in args {
                annotate_expr(a, scopes, scope, info);
            }
        }
        ExprKind::Binary { x, y, .. } => {
            annotate_expr(x, scopes, scope, info);
            annotate_expr(y, scopes, scope, info);
        }
        ExprKind::CompositeLit { elts, .. } => {
            for e in elts {
                annotate_expr(e, scopes, scope, info);
            }
        }
        ExprKind::KeyValue { key, value } => {
            annotate_expr(key, scopes, scope, info);
            annotate_expr(value, scopes, scope, info);
        }
        _ => {}
    }
}

fn infer(expr: &Expr, scopes: &ScopeTree, scope: ScopeId) -> (Ty, bool) {
    match &expr.kind {
        ExprKind::Ident(id) => {
            let ty = scopes.lookup(scope, &id.name).cloned().unwrap_or(Ty::Unknown);
            (ty, true)
        }
        ExprKind::BasicLit { kind, .. } => (
            Ty::Basic(
                match kind {
                    crate::ast::BasicLitKind::Int => "int",
                    crate::ast::BasicLitKind::Float => "float64",
                    crate::ast::BasicLitKind::String => "string",
                    crate::ast::BasicLitKind::Char => "rune",
                    crate::ast::BasicLitKind::Bool => "bool",
                    crate::ast::BasicLitKind::Nil => "nil",
                }
                .to_string(),
            ),
            false,
        ),
        ExprKind::Paren(x) => infer(x, scopes, scope),
        ExprKind::Star(x) => {
            let (inner, _) = infer(x, scopes, scope);
            (Ty::Pointer(Box::new(inner)), false)
        }
        ExprKind::Unary { op, x } => {
            let (inner, _) = infer(x, scopes, scope);
            if *op == crate::ast::UnaryOp::Recv {
                if let Ty::Chan(elt) = inner.underlying() {
                    return ((**elt).clone(), false);
                }
            }
            (inner, false)
        }
        ExprKind::Index { x, .. } => {
            let (inner, _) = infer(x, scopes, scope);
            match inner.underlying() {
                Ty::Slice(elt) | Ty::Array(elt, _) => ((**elt).clone(), true),
                Ty::Map(_, v) => ((**v).clone(), false),
                _ => (Ty::Unknown, false),
            }
        }
        ExprKind::Selector { x, .. } => {
            let (inner, _) = infer(x, scopes, scope);
            if let Ty::Package(_) = inner {
                (Ty::Unknown, true)
            } else {
                (Ty::Unknown, true)
            }
        }
        _ => (Ty::Unknown, false),
    }
}

fn package_short_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Resolve a parsed type expression (the object language reuses the
/// expression grammar for types) to a `Ty`, without package-import fallback.
/// The import-aware version with the standard-library short-name table
/// lives in `typeresolve.rs` since that fallback is specific to resolving a
/// *pattern's* type constraint, not to building the ambient scope tree for a
/// target file.
pub fn resolve_type_expr(expr: &Expr, scopes: &ScopeTree, scope: ScopeId) -> Ty {
    match &expr.kind {
        ExprKind::Ident(id) => scopes.lookup(scope, &id.name).cloned().unwrap_or_else(|| Ty::Basic(id.name.clone())),
        ExprKind::Star(inner) => Ty::Pointer(Box::new(resolve_type_expr(inner, scopes, scope))),
        ExprKind::ArrayType { len, elt } => {
            let elt_ty = resolve_type_expr(elt, scopes, scope);
            match len {
                Some(l) => {
                    let n = match &l.kind {
                        ExprKind::BasicLit { kind: crate::ast::BasicLitKind::Int, value } => {
                            value.parse::<u64>().unwrap_or(0)
                        }
                        _ => 0,
                    };
                    Ty::Array(Box::new(elt_ty), n)
                }
                None => Ty::Slice(Box::new(elt_ty)),
            }
        }
        ExprKind::StructType { fields } => Ty::Struct(
            fields
                .iter()
                .flat_map(|f| {
                    let ty = resolve_type_expr(&f.typ, scopes, scope);
                    f.names.iter().map(move |n| (n.name.clone(), ty.clone()))
                })
                .collect(),
        ),
        ExprKind::InterfaceType { .. } => Ty::Interface,
        ExprKind::FuncType { params, results } => Ty::Func(
            params.iter().map(|f| resolve_type_expr(&f.typ, scopes, scope)).collect(),
            results.iter().map(|f| resolve_type_expr(&f.typ, scopes, scope)).collect(),
        ),
        ExprKind::MapType { key, value } => Ty::Map(
            Box::new(resolve_type_expr(key, scopes, scope)),
            Box::new(resolve_type_expr(value, scopes, scope)),
        ),
        ExprKind::ChanType { value, .. } => Ty::Chan(Box::new(resolve_type_expr(value, scopes, scope))),
        ExprKind::Selector { x, sel } => {
            if let ExprKind::Ident(pkg) = &x.kind {
                Ty::Named(format!("{}.{}", pkg.name, sel.name), Box::new(Ty::Unknown))
            } else {
                Ty::Unknown
            }
        }
        _ => Ty::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, Ident};

    fn int_lit() -> Expr {
        Expr { pos: 1, end: 2, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: "1".into() } }
    }

    #[test]
    fn var_decl_binds_declared_type() {
        let file = File {
            package: Ident { name: "main".into(), pos: 1 },
            decls: vec![Decl::Var(vec![Spec::Value {
                names: vec![Ident { name: "x".into(), pos: 2 }],
                typ: Some(Expr { pos: 3, end: 4, kind: ExprKind::Ident(Ident { name: "int".into(), pos: 3 }) }),
                values: vec![int_lit()],
                pos: 2,
            }])],
        };
        let (scopes, _) = check_file(&file);
        let file_scope = scopes.scope_of(file.pos()).unwrap();
        assert_eq!(scopes.lookup(file_scope, "x"), Some(&Ty::Basic("int".to_string())));
    }

    #[test]
    fn underlying_strips_named_wrapper() {
        let t = Ty::Named("MyInt".into(), Box::new(Ty::Basic("int".into())));
        assert_eq!(t.underlying(), &Ty::Basic("int".into()));
    }

    #[test]
    fn struct_comparable_iff_fields_comparable() {
        let comparable = Ty::Struct(vec![("a".into(), Ty::Basic("int".into()))]);
        assert!(comparable.is_comparable());
        let not_comparable = Ty::Struct(vec![("a".into(), Ty::Slice(Box::new(Ty::Basic("int".into()))))]);
        assert!(!not_comparable.is_comparable());
    }
}

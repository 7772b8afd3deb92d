//! Type resolver.
//!
//! Resolves a pattern's type expression (the RHS of a `type=`/`asgn=`/
//! `conv=` wildcard constraint) against the current scope to a concrete
//! `Ty`, so the unifier can compare it against a target expression's
//! inferred type (`typecheck.rs`).

use std::fmt;

use crate::ast::{BasicLitKind, Expr, ExprKind};
use crate::typecheck::{ScopeId, ScopeTree, Ty};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    UnknownIdent(String),
    UnknownPackage(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownIdent(n) => write!(f, "cannot resolve type `{n}`"),
            ResolveError::UnknownPackage(p) => write!(f, "cannot resolve package `{p}`"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Fixed table mapping a short package name to its canonical standard
/// library import path, consulted when a bare package identifier in a
/// pattern's type constraint is not bound in the supplied scope. Exposed as
/// data, not code, so new entries don't require touching resolver logic.
pub const STD_SHORT_NAMES: &[(&str, &str)] = &[
    ("json", "encoding/json"),
    ("rand", "math/rand"),
    ("fmt", "fmt"),
    ("strings", "strings"),
    ("strconv", "strconv"),
    ("bytes", "bytes"),
    ("errors", "errors"),
    ("sort", "sort"),
    ("time", "time"),
    ("os", "os"),
    ("io", "io"),
    ("sync", "sync"),
    ("context", "context"),
    ("regexp", "regexp"),
    ("unicode", "unicode"),
    ("path", "path"),
    ("net", "net"),
    ("http", "net/http"),
    ("url", "net/url"),
    ("reflect", "reflect"),
];

fn std_fallback(short_name: &str) -> Option<&'static str> {
    STD_SHORT_NAMES
        .iter()
        .find(|(name, _)| *name == short_name)
        .map(|(_, path)| *path)
}

/// Resolves pattern type expressions against a scope tree, with standard
/// library short-name fallback for unresolved bare package identifiers.
pub struct TypeResolver<'a> {
    scopes: &'a ScopeTree,
}

impl<'a> TypeResolver<'a> {
    pub fn new(scopes: &'a ScopeTree) -> Self {
        TypeResolver { scopes }
    }

    pub fn resolve(&self, expr: &Expr, scope: ScopeId) -> Result<Ty, ResolveError> {
        match &expr.kind {
            ExprKind::Ident(id) => self.resolve_ident(&id.name, scope),
            ExprKind::Star(inner) => Ok(Ty::Pointer(Box::new(self.resolve(inner, scope)?))),
            ExprKind::ArrayType { len, elt } => {
                let elt_ty = self.resolve(elt, scope)?;
                match len {
                    None => Ok(Ty::Slice(Box::new(elt_ty))),
                    Some(l) => {
                        let n = match &l.kind {
                            ExprKind::BasicLit { kind: BasicLitKind::Int, value } => {
                                value.parse::<u64>().unwrap_or(0)
                            }
                            _ => 0,
                        };
                        Ok(Ty::Array(Box::new(elt_ty), n))
                    }
                }
            }
            ExprKind::Selector { x, sel } => {
                let pkg_name = match &x.kind {
                    ExprKind::Ident(id) => &id.name,
                    _ => return Err(ResolveError::UnknownPackage("<expr>".to_string())),
                };
                let pkg_scope_path = self.resolve_package(pkg_name, scope)?;
                // The resolver does not have the imported package's member
                // table available, so a selector into a resolved package
                // names a type without asserting its shape further.
                Ok(Ty::Named(format!("{pkg_scope_path}.{}", sel.name), Box::new(Ty::Unknown)))
            }
            ExprKind::MapType { key, value } => Ok(Ty::Map(
                Box::new(self.resolve(key, scope)?),
                Box::new(self.resolve(value, scope)?),
            )),
            ExprKind::ChanType { value, .. } => Ok(Ty::Chan(Box::new(self.resolve(value, scope)?))),
            ExprKind::StructType { fields } => {
                let mut resolved = Vec::new();
                for f in fields {
                    let ty = self.resolve(&f.typ, scope)?;
                    for n in &f.names {
                        resolved.push((n.name.clone(), ty.clone()));
                    }
                }
                Ok(Ty::Struct(resolved))
            }
            ExprKind::InterfaceType { .. } => Ok(Ty::Interface),
            ExprKind::FuncType { params, results } => {
                let mut p = Vec::new();
                for f in params {
                    p.push(self.resolve(&f.typ, scope)?);
                }
                let mut r = Vec::new();
                for f in results {
                    r.push(self.resolve(&f.typ, scope)?);
                }
                Ok(Ty::Func(p, r))
            }
            _ => Err(ResolveError::UnknownIdent("<non-type expression>".to_string())),
        }
    }

    fn resolve_ident(&self, name: &str, scope: ScopeId) -> Result<Ty, ResolveError> {
        if let Some(ty) = self.scopes.lookup(scope, name) {
            return Ok(ty.clone());
        }
        // Built-in basic type names are always resolvable even without an
        // explicit scope binding.
        if is_builtin_basic(name) {
            return Ok(Ty::Basic(name.to_string()));
        }
        Err(ResolveError::UnknownIdent(name.to_string()))
    }

    /// Resolve a bare package identifier to its import path, falling back
    /// to the standard-library short-name table when the scope has no
    /// matching import binding.
    fn resolve_package(&self, name: &str, scope: ScopeId) -> Result<String, ResolveError> {
        if let Some(Ty::Package(path)) = self.scopes.lookup(scope, name) {
            return Ok(path.clone());
        }
        std_fallback(name)
            .map(|p| p.to_string())
            .ok_or_else(|| ResolveError::UnknownPackage(name.to_string()))
    }
}

fn is_builtin_basic(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "string"
            | "int"
            | "int8"
            | "int16"
            | "int32"
            | "int64"
            | "uint"
            | "uint8"
            | "uint16"
            | "uint32"
            | "uint64"
            | "uintptr"
            | "float32"
            | "float64"
            | "byte"
            | "rune"
            | "error"
            | "any"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ident;

    fn ident(name: &str) -> Expr {
        Expr { pos: 1, end: 1 + name.len() as u32, kind: ExprKind::Ident(Ident { name: name.to_string(), pos: 1 }) }
    }

    #[test]
    fn resolves_builtin_basic_without_scope_binding() {
        let scopes = ScopeTree::new();
        let r = TypeResolver::new(&scopes);
        assert_eq!(r.resolve(&ident("int"), scopes.root()).unwrap(), Ty::Basic("int".to_string()));
    }

    #[test]
    fn unknown_identifier_fails_hard() {
        let scopes = ScopeTree::new();
        let r = TypeResolver::new(&scopes);
        assert!(r.resolve(&ident("Frobnicator"), scopes.root()).is_err());
    }

    #[test]
    fn std_short_name_fallback_resolves_package_selector() {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        let sel = Expr {
            pos: 1,
            end: 10,
            kind: ExprKind::Selector {
                x: Box::new(ident("json")),
                sel: Ident { name: "Marshaler".to_string(), pos: 6 },
            },
        };
        let r = TypeResolver::new(&scopes);
        let ty = r.resolve(&sel, root).unwrap();
        match ty {
            Ty::Named(path, _) => assert_eq!(path, "encoding/json.Marshaler"),
            other => panic!("expected Named, got {other:?}"),
        }
        let _ = &mut scopes; // scopes intentionally unmodified: fallback path
    }

    #[test]
    fn unmapped_package_fails_hard() {
        let scopes = ScopeTree::new();
        let sel = Expr {
            pos: 1,
            end: 10,
            kind: ExprKind::Selector {
                x: Box::new(ident("totallyunknownpkg")),
                sel: Ident { name: "X".to_string(), pos: 6 },
            },
        };
        let r = TypeResolver::new(&scopes);
        assert!(r.resolve(&sel, scopes.root()).is_err());
    }
}

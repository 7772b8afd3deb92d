//! Variadic list matcher.
//!
//! Non-recursive, backtracking match of two parallel node lists in the
//! presence of named variadic wildcards. Deliberately iterative with an
//! explicit stack rather than naive recursion, because a recursive
//! implementation risks unbounded depth on deeply nested variadics.

use crate::node::{Node, NodeList};
use crate::typecheck::ScopeId;
use crate::unifier::{Bindings, MatchError, MResult, Unifier};
use crate::wildcard::decode;

/// Detect whether `node` is a variadic or single wildcard occupying a list
/// position, regardless of which of the four species it belongs to. The
/// wildcard name is always carried on an identifier: a bare `Node::Ident`
/// for identifier-list elements, or an `ExprKind::Ident`/`StmtKind::Expr`
/// wrapping one for expression-list and statement-list elements.
pub fn wildcard_at(node: Node<'_>) -> Option<u32> {
    match node {
        Node::Ident(id) => decode(&id.name),
        Node::Expr(e) => match &e.kind {
            crate::ast::ExprKind::Ident(id) => decode(&id.name),
            _ => None,
        },
        Node::Stmt(s) => match &s.kind {
            crate::ast::StmtKind::Expr(e) => match &e.kind {
                crate::ast::ExprKind::Ident(id) => decode(&id.name),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

struct Frame {
    snapshot: Bindings,
    next1: usize,
    next2: usize,
    /// Pending-variadic state carried across the pop so `wouldMatch` still
    /// sees the wildcard it was accumulating when the frame was pushed.
    wild_name: Option<String>,
    wild_start: usize,
}

/// Match `pattern` against `target`. When `partial` is set, an unmatched
/// run at the start and/or end of `target` is permitted; the returned list
/// is the sub-slice of `target` that was actually consulted by the pattern.
pub fn match_lists<'t>(
    u: &mut Unifier,
    scope: ScopeId,
    pattern: NodeList<'_>,
    target: NodeList<'t>,
    partial: bool,
) -> MResult<Option<NodeList<'t>>> {
    let mut i1 = 0usize;
    let mut i2 = 0usize;
    let mut stack: Vec<Frame> = Vec::new();
    let mut partial_start = 0usize;
    let mut partial_end = target.len();
    let mut wild_name: Option<String> = None;
    let mut wild_start = 0usize;

    loop {
        if i1 >= pattern.len() && i2 >= target.len() {
            break;
        }

        if i1 < pattern.len() {
            let pat_elem = pattern.at(i1);
            let wildcard_id = wildcard_at(pat_elem);
            let info = wildcard_id.map(|id| u.registry().get(id));

            if let Some(info) = info.filter(|i| i.any) {
                let name = info.name.clone();
                if wild_name.as_deref() != Some(name.as_str()) {
                    wild_start = i2;
                    wild_name = Some(name);
                }
                stack.push(Frame {
                    snapshot: u.bindings().clone(),
                    next1: i1,
                    next2: i2 + 1,
                    wild_name: wild_name.clone(),
                    wild_start,
                });
                i1 += 1;
                continue;
            }

            if partial && i1 == 0 {
                partial_start = i2;
                stack.push(Frame {
                    snapshot: u.bindings().clone(),
                    next1: 0,
                    next2: i2 + 1,
                    wild_name: wild_name.clone(),
                    wild_start,
                });
            }

            if would_match(u, scope, &wild_name, wild_start, i2, target)? {
                if i2 < target.len() && u.unify_node(pat_elem, target.at(i2), scope)? {
                    i1 += 1;
                    i2 += 1;
                    wild_name = None;
                    continue;
                }
            }
            // fall through to restart
        } else if partial {
            // Pattern exhausted. Finalise a pending variadic and, if
            // partial matching is allowed, stop consuming target here.
            if would_match(u, scope, &wild_name, wild_start, i2, target)? {
                partial_end = i2;
                return Ok(Some(target.slice(partial_start, partial_end)));
            }
        }

        // restart: pop the most recent frame, or fail.
        match stack.pop() {
            Some(frame) => {
                u.restore(frame.snapshot);
                i1 = frame.next1;
                i2 = frame.next2;
                wild_name = frame.wild_name;
                wild_start = frame.wild_start;
            }
            None => return Ok(None),
        }
    }

    if would_match(u, scope, &wild_name, wild_start, i2, target)? {
        partial_end = if partial { i2 } else { partial_end };
        Ok(Some(target.slice(partial_start, partial_end)))
    } else {
        Ok(None)
    }
}

/// Close a pending variadic wildcard (if any) by binding it to
/// `target[wild_start..close_at]`, checking consistency against any prior
/// binding of the same name. Succeeds trivially when no wildcard is
/// pending, or when its name is `_`.
fn would_match(
    u: &mut Unifier,
    scope: ScopeId,
    wild_name: &Option<String>,
    wild_start: usize,
    close_at: usize,
    target: NodeList<'_>,
) -> MResult<bool> {
    let Some(name) = wild_name else {
        return Ok(true);
    };
    if name == "_" {
        return Ok(true);
    }
    let lo = wild_start.min(target.len());
    let hi = close_at.clamp(lo, target.len());
    let span = target.slice(lo, hi);
    let node = Node::List(span);
    if let Some(prior) = u.bindings().get(name).cloned() {
        let prior_node = prior.as_node();
        return u.unify_node(prior_node, node, scope);
    }
    u.bind(name.clone(), &node);
    Ok(true)
}

pub(crate) type ListMatchError = MatchError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, Expr, ExprKind, Ident};
    use crate::typecheck::{ScopeTree, TypeInfo};
    use crate::unifier::AggressivePolicy;
    use crate::wildcard::{WildcardInfo, WildcardRegistry};

    fn id_expr(name: &str) -> Expr {
        Expr { pos: 1, end: 1 + name.len() as u32, kind: ExprKind::Ident(Ident { name: name.to_string(), pos: 1 }) }
    }

    fn lit_expr(v: &str) -> Expr {
        Expr { pos: 1, end: 2, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: v.to_string() } }
    }

    fn wildcard_expr(reg: &mut WildcardRegistry, name: &str, any: bool) -> Expr {
        let id = reg.register(WildcardInfo { name: name.to_string(), any, ..Default::default() });
        id_expr(&crate::wildcard::encode(id))
    }

    fn make_unifier(reg: WildcardRegistry) -> (ScopeTree, TypeInfo, WildcardRegistry) {
        (ScopeTree::new(), TypeInfo::new(), reg)
    }

    #[test]
    fn prefix_and_suffix_wildcards_absorb_around_literal() {
        let mut reg = WildcardRegistry::new();
        let w1 = wildcard_expr(&mut reg, "_", true);
        let b = id_expr("b");
        let w2 = wildcard_expr(&mut reg, "_", true);
        let pattern = vec![w1, b, w2];

        let target = vec![id_expr("a"), id_expr("b"), id_expr("c")];

        let (scopes, info, reg) = make_unifier(reg);
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let result = match_lists(
            &mut u,
            scope,
            NodeList::Expr(&pattern),
            NodeList::Expr(&target),
            false,
        )
        .unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().len(), 3);
    }

    #[test]
    fn empty_pattern_matches_empty_target() {
        let reg = WildcardRegistry::new();
        let (scopes, info, reg) = make_unifier(reg);
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let pattern: Vec<Expr> = vec![];
        let target: Vec<Expr> = vec![];
        let result = match_lists(&mut u, scope, NodeList::Expr(&pattern), NodeList::Expr(&target), false).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn literal_mismatch_fails() {
        let reg = WildcardRegistry::new();
        let (scopes, info, reg) = make_unifier(reg);
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let pattern = vec![lit_expr("1")];
        let target = vec![lit_expr("2")];
        let result = match_lists(&mut u, scope, NodeList::Expr(&pattern), NodeList::Expr(&target), false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn partial_match_skips_leading_and_trailing_target_elements() {
        let reg = WildcardRegistry::new();
        let (scopes, info, reg) = make_unifier(reg);
        let mut u = Unifier::new(&reg, &info, &scopes, AggressivePolicy::none());
        let scope = scopes.root();
        let pattern = vec![id_expr("b")];
        let target = vec![id_expr("a"), id_expr("b"), id_expr("c")];
        let result = match_lists(&mut u, scope, NodeList::Expr(&pattern), NodeList::Expr(&target), true).unwrap();
        assert!(result.is_some());
        let matched = result.unwrap();
        assert_eq!(matched.len(), 1);
    }
}

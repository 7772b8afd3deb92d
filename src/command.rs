//! Command interpreter.
//!
//! A compiled pattern source is a left-to-right [`Pipeline`] of commands:
//! `x` finds every node in the target matching a pattern, `g` keeps only
//! the candidates that also contain a match of a second pattern somewhere
//! in their subtree, and `v` drops them. An empty pipeline passes its
//! input through unchanged.

use crate::ast::{Decl, Expr, File, Pos, Spanned, Spec, Stmt};
use crate::listmatcher::match_lists;
use crate::node::{Node, NodeList};
use crate::typecheck::{ScopeTree, TypeInfo};
use crate::unifier::{AggressivePolicy, Bindings, MResult, Unifier};
use crate::walker;
use crate::wildcard::WildcardRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `x <pattern>` — the base search.
    Find,
    /// `g <pattern>` — keep candidates whose subtree also matches.
    Grep,
    /// `v <pattern>` — drop candidates whose subtree also matches.
    Invert,
}

/// An owned, already-wildcard-encoded pattern fragment produced by the
/// pattern-source parser. A multi-statement fragment gets statement-list
/// treatment: it is matched against contiguous runs of a target statement
/// list via the list matcher with `partial = true`, rather than against a
/// single statement node.
#[derive(Debug, Clone)]
pub enum PatternFragment {
    Expr(Expr),
    Stmt(Stmt),
    StmtList(Vec<Stmt>),
    Decl(Decl),
    Spec(Spec),
}

impl PatternFragment {
    fn as_node(&self) -> Node<'_> {
        match self {
            PatternFragment::Expr(e) => Node::Expr(e),
            PatternFragment::Stmt(s) => Node::Stmt(s),
            PatternFragment::StmtList(s) => Node::List(NodeList::Stmt(s)),
            PatternFragment::Decl(d) => Node::Decl(d),
            PatternFragment::Spec(s) => Node::Spec(s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub fragment: PatternFragment,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    pub registry: WildcardRegistry,
}

/// One surviving match: its span in the source, and the wildcard bindings
/// captured by the `x` command that first found it.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub pos: Pos,
    pub end: Pos,
    pub bindings: Bindings,
}

struct Candidate<'a> {
    node: Node<'a>,
    bindings: Bindings,
}

/// Run `pipeline` against `file`, returning every surviving match. `None`
/// for a pattern span means the `Node::List` slice synthesised by a
/// statement-list match, which does not have a single borrowed `Pos`
/// field of its own — `NodeList::pos`/`end` cover that.
pub fn run<'a>(
    pipeline: &Pipeline,
    file: &'a File,
    type_info: &TypeInfo,
    scopes: &ScopeTree,
    policy: AggressivePolicy,
) -> MResult<Vec<MatchRecord>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    for cmd in &pipeline.commands {
        candidates = match cmd.kind {
            CommandKind::Find => find(file, cmd, &pipeline.registry, type_info, scopes, policy)?,
            CommandKind::Grep => filter(candidates, cmd, &pipeline.registry, type_info, scopes, policy, true)?,
            CommandKind::Invert => filter(candidates, cmd, &pipeline.registry, type_info, scopes, policy, false)?,
        };
    }

    let mut out: Vec<MatchRecord> =
        candidates.into_iter().map(|c| MatchRecord { pos: c.node.pos(), end: c.node.end(), bindings: c.bindings }).collect();
    dedup_by_span(&mut out);
    Ok(out)
}

fn find<'a>(
    file: &'a File,
    cmd: &Command,
    registry: &WildcardRegistry,
    type_info: &TypeInfo,
    scopes: &ScopeTree,
    policy: AggressivePolicy,
) -> MResult<Vec<Candidate<'a>>> {
    let mut out = Vec::new();
    let mut err = None;

    if let PatternFragment::StmtList(pat) = &cmd.fragment {
        walker::walk(Node::File(file), &mut |n| {
            if err.is_some() {
                return;
            }
            if let Node::List(NodeList::Stmt(body)) = n {
                let mut u = Unifier::new(registry, type_info, scopes, policy);
                let scope = scopes.scope_of(n.pos()).unwrap_or_else(|| scopes.root());
                match match_lists(&mut u, scope, NodeList::Stmt(pat), NodeList::Stmt(body), true) {
                    Ok(Some(matched)) => out.push(Candidate { node: Node::List(matched), bindings: u.into_bindings() }),
                    Ok(None) => {}
                    Err(e) => err = Some(e),
                }
            }
        });
    } else {
        walker::walk(Node::File(file), &mut |n| {
            if err.is_some() {
                return;
            }
            let mut u = Unifier::new(registry, type_info, scopes, policy);
            match u.match_at(cmd.fragment.as_node(), n) {
                Ok(true) => out.push(Candidate { node: n, bindings: u.into_bindings() }),
                Ok(false) => {}
                Err(e) => err = Some(e),
            }
        });
    }

    match err {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

fn filter<'a>(
    candidates: Vec<Candidate<'a>>,
    cmd: &Command,
    registry: &WildcardRegistry,
    type_info: &TypeInfo,
    scopes: &ScopeTree,
    policy: AggressivePolicy,
    keep_if_matched: bool,
) -> MResult<Vec<Candidate<'a>>> {
    let mut out = Vec::new();
    for cand in candidates {
        let mut matched_any = false;
        let mut err = None;
        walker::walk_root(cand.node, &mut |n| {
            if err.is_some() || matched_any {
                return;
            }
            let mut u = Unifier::new(registry, type_info, scopes, policy);
            match u.match_at(cmd.fragment.as_node(), n) {
                Ok(true) => matched_any = true,
                Ok(false) => {}
                Err(e) => err = Some(e),
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
        if matched_any == keep_if_matched {
            out.push(cand);
        }
    }
    Ok(out)
}

fn dedup_by_span(records: &mut Vec<MatchRecord>) {
    let mut seen = std::collections::HashSet::new();
    records.retain(|r| seen.insert((r.pos, r.end)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BasicLitKind, Decl, ExprKind, FuncDecl, Ident};

    fn lit(v: &str, pos: Pos) -> Expr {
        Expr { pos, end: pos + v.len() as Pos, kind: ExprKind::BasicLit { kind: BasicLitKind::Int, value: v.to_string() } }
    }

    fn file_with_return(v: &str) -> File {
        File {
            package: Ident { name: "main".to_string(), pos: 1 },
            decls: vec![Decl::Func(Box::new(FuncDecl {
                name: Ident { name: "f".to_string(), pos: 2 },
                recv: None,
                typ: Expr {
                    pos: 3,
                    end: 4,
                    kind: ExprKind::FuncType { params: vec![], results: vec![] },
                },
                body: Some(vec![Stmt {
                    pos: 5,
                    end: 5 + v.len() as Pos + 7,
                    kind: crate::ast::StmtKind::Return(vec![lit(v, 10)]),
                }]),
            }))],
        }
    }

    #[test]
    fn find_command_locates_matching_literal() {
        let file = file_with_return("42");
        let (scopes, info) = crate::typecheck::check_file(&file);
        let pipeline = Pipeline {
            commands: vec![Command { kind: CommandKind::Find, fragment: PatternFragment::Expr(lit("42", 10)) }],
            registry: WildcardRegistry::new(),
        };
        let results = run(&pipeline, &file, &info, &scopes, AggressivePolicy::none()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pos, 10);
    }

    #[test]
    fn find_command_dedups_by_span() {
        // A discard wildcard matches every visited node unconditionally, so
        // this counts distinct (pos, end) spans rather than exercising an
        // actual span collision. file_with_return("7") walks File(1,13),
        // Decl(2,13), FuncType(3,4), the body StmtList and its lone Return
        // stmt (both (5,13)), and the Return's ExprList and the literal
        // itself (both (10,11)) — 5 distinct spans once same-span pairs
        // collapse.
        let file = file_with_return("7");
        let (scopes, info) = crate::typecheck::check_file(&file);
        let mut reg = WildcardRegistry::new();
        let id = reg.register(crate::wildcard::WildcardInfo::discard(false));
        let wc = Expr {
            pos: 10,
            end: 11,
            kind: ExprKind::Ident(Ident { name: crate::wildcard::encode(id), pos: 10 }),
        };
        let pipeline = Pipeline {
            commands: vec![Command { kind: CommandKind::Find, fragment: PatternFragment::Expr(wc) }],
            registry: reg,
        };
        let results = run(&pipeline, &file, &info, &scopes, AggressivePolicy::none()).unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn empty_pipeline_returns_no_candidates_without_a_find() {
        let file = file_with_return("1");
        let (scopes, info) = crate::typecheck::check_file(&file);
        let pipeline = Pipeline::default();
        let results = run(&pipeline, &file, &info, &scopes, AggressivePolicy::none()).unwrap();
        assert!(results.is_empty());
    }
}

//! sculptor: structural pattern matching and rewriting for a statically
//! typed, C-family object language.
//!
//! The library crate exposes four operations: [`compile`] turns pattern
//! source text into a [`command::Pipeline`], [`run`] executes that pipeline
//! against a parsed file, [`substitute_match_expr`] rewrites one match's
//! bindings into a replacement expression template, and [`rewrite_match`]
//! carries that same substitution the rest of the way, splicing the result
//! back into a full file's tree. The CLI binary (`main.rs`) wires these
//! together with file discovery and parallel per-file execution.

pub mod ast;
pub mod command;
pub mod engine;
pub mod listmatcher;
pub mod location;
pub mod node;
pub mod objlang;
pub mod patternsrc;
pub mod rewrite;
pub mod splice;
pub mod substitute;
pub mod typecheck;
pub mod typeresolve;
pub mod unifier;
pub mod walker;
pub mod wildcard;

use anyhow::{Context, Result};

use crate::ast::File;
use crate::command::{MatchRecord, Pipeline};
use crate::typecheck::{check_file, ScopeTree, TypeInfo};
use crate::unifier::AggressivePolicy;

/// Parse an object-language source file.
pub fn parse_file(src: &str) -> Result<File> {
    objlang::parse_file(src).context("failed to parse object-language source")
}

/// Compile pattern-source text (the `x`/`g`/`v` command pipeline, including
/// any `$name` wildcards) into a runnable [`Pipeline`].
pub fn compile(pattern_source: &str) -> Result<Pipeline> {
    patternsrc::compile(pattern_source).context("failed to compile pattern source")
}

/// Analysis context for a single parsed file: its scope tree and resolved
/// type information, computed once and reused across every command run
/// against that file.
pub struct FileContext {
    pub file: File,
    pub scopes: ScopeTree,
    pub type_info: TypeInfo,
}

impl FileContext {
    pub fn new(file: File) -> Self {
        let (scopes, type_info) = check_file(&file);
        FileContext { file, scopes, type_info }
    }

    pub fn parse(src: &str) -> Result<Self> {
        Ok(FileContext::new(parse_file(src)?))
    }
}

/// Run `pipeline` against `ctx.file` under the given aggressive-mode
/// relaxations, returning every surviving match.
pub fn run(pipeline: &Pipeline, ctx: &FileContext, policy: AggressivePolicy) -> Result<Vec<MatchRecord>> {
    command::run(pipeline, &ctx.file, &ctx.type_info, &ctx.scopes, policy)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("unresolvable type constraint while matching")
}

/// Substitute `record`'s bindings into a replacement expression template,
/// returning the rewritten, position-scrubbed fragment as source text is
/// not produced here — callers that need re-printed source compose this
/// with their own printer; the core only produces the rewritten tree.
pub fn substitute_match_expr(record: &MatchRecord, replacement_source: &str, registry: &mut wildcard::WildcardRegistry) -> Result<ast::Expr> {
    let replacement = compile_replacement_expr(replacement_source, registry)?;
    Ok(substitute::substitute_expr(&replacement, &record.bindings))
}

/// Compile a replacement template into an expression once, so that rewriting
/// many matches with the same template does not reparse it per match (see
/// [`rewrite::render_edits`]).
pub fn compile_replacement_expr(replacement_source: &str, registry: &mut wildcard::WildcardRegistry) -> Result<ast::Expr> {
    match compile_replacement_fragment(replacement_source, registry)? {
        command::PatternFragment::Expr(e) => Ok(e),
        other => anyhow::bail!("replacement template is not an expression: {other:?}"),
    }
}

/// Compile a replacement template into whichever fragment shape it parses
/// as — expression, single statement, or statement list — so a Go-level
/// statement replacement doesn't have to be shoehorned into an expression.
pub fn compile_replacement_fragment(
    replacement_source: &str,
    registry: &mut wildcard::WildcardRegistry,
) -> Result<command::PatternFragment> {
    patternsrc::compile_replacement(replacement_source, registry).context("failed to compile replacement template")
}

/// Fill a compiled replacement fragment with `bindings`, producing a
/// [`splice::Replacement`] ready to be spliced into the original tree.
/// Fails if the fragment compiled to a declaration or spec shape, which the
/// splicer has no parent-slot support for (see `splice.rs`).
pub fn fill_replacement(fragment: &command::PatternFragment, bindings: &unifier::Bindings) -> Result<splice::Replacement> {
    match fragment {
        command::PatternFragment::Expr(e) => Ok(splice::Replacement::Expr(substitute::substitute_expr(e, bindings))),
        command::PatternFragment::Stmt(s) => Ok(splice::Replacement::Stmt(substitute::substitute_stmt(s, bindings))),
        command::PatternFragment::StmtList(s) => Ok(splice::Replacement::StmtList(substitute::substitute_stmt_list(s, bindings))),
        other => anyhow::bail!("replacement template is not a spliceable fragment: {other:?}"),
    }
}

/// Full C7 pipeline: compile `replacement_source`, fill it with `record`'s
/// bindings, and splice the result into `file` in place of the node
/// spanning `record.pos`..`record.end`, returning the rewritten file.
pub fn rewrite_match(
    file: &ast::File,
    record: &MatchRecord,
    replacement_source: &str,
    registry: &mut wildcard::WildcardRegistry,
) -> Result<ast::File> {
    let fragment = compile_replacement_fragment(replacement_source, registry)?;
    let replacement = fill_replacement(&fragment, &record.bindings)?;
    splice::splice_file(file, record.pos, record.end, replacement).map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_find_matches_a_call() {
        let ctx = FileContext::parse("package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n").unwrap();
        let pipeline = compile("x fmt.Println($x)").unwrap();
        let results = run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn end_to_end_grep_then_invert_partition_the_same_candidates() {
        let src = "package main\n\nfunc f() {\n\tfmt.Println(1)\n\tfmt.Println(nil)\n}\n";
        let ctx = FileContext::parse(src).unwrap();

        let kept = compile("x fmt.Println($x)\ng $x == nil").unwrap();
        let dropped = compile("x fmt.Println($x)\nv $x == nil").unwrap();

        let kept_results = run(&kept, &ctx, AggressivePolicy::none()).unwrap();
        let dropped_results = run(&dropped, &ctx, AggressivePolicy::none()).unwrap();
        assert_eq!(kept_results.len() + dropped_results.len(), 2);
    }

    #[test]
    fn substitution_rewrites_bound_wildcard() {
        let ctx = FileContext::parse("package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n").unwrap();
        let pipeline = compile("x fmt.Println($x)").unwrap();
        let mut results = run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        let record = results.pop().unwrap();
        let mut registry = pipeline.registry.clone();
        let rewritten = substitute_match_expr(&record, "$x", &mut registry).unwrap();
        match rewritten.kind {
            ast::ExprKind::BasicLit { value, .. } => assert_eq!(value, "1"),
            other => panic!("expected BasicLit, got {other:?}"),
        }
    }

    #[test]
    fn rewrite_match_splices_the_call_back_into_the_file() {
        let ctx = FileContext::parse("package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n").unwrap();
        let pipeline = compile("x fmt.Println($x)").unwrap();
        let mut results = run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        let record = results.pop().unwrap();
        let mut registry = pipeline.registry.clone();
        let rewritten = rewrite_match(&ctx.file, &record, "log.Printf(\"%v\", $x)", &mut registry).unwrap();
        match &rewritten.decls[0] {
            ast::Decl::Func(f) => match &f.body.as_ref().unwrap()[0].kind {
                ast::StmtKind::Expr(ast::Expr { kind: ast::ExprKind::Call { fun, args, .. }, .. }) => {
                    match &fun.kind {
                        ast::ExprKind::Selector { sel, .. } => assert_eq!(sel.name, "Printf"),
                        other => panic!("expected Selector, got {other:?}"),
                    }
                    assert_eq!(args.len(), 2);
                }
                other => panic!("expected Call stmt, got {other:?}"),
            },
            other => panic!("expected Func, got {other:?}"),
        }
    }

    #[test]
    fn rewrite_match_accepts_a_statement_shaped_replacement() {
        let ctx = FileContext::parse("package main\n\nfunc f() {\n\tx := 1\n}\n").unwrap();
        let pipeline = compile("x $x := 1").unwrap();
        let mut results = run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        let record = results.pop().unwrap();
        let mut registry = pipeline.registry.clone();
        let rewritten = rewrite_match(&ctx.file, &record, "$x := 2", &mut registry).unwrap();
        match &rewritten.decls[0] {
            ast::Decl::Func(f) => match &f.body.as_ref().unwrap()[0].kind {
                ast::StmtKind::Assign { rhs, .. } => match &rhs[0].kind {
                    ast::ExprKind::BasicLit { value, .. } => assert_eq!(value, "2"),
                    other => panic!("expected BasicLit, got {other:?}"),
                },
                other => panic!("expected Assign, got {other:?}"),
            },
            other => panic!("expected Func, got {other:?}"),
        }
    }
}

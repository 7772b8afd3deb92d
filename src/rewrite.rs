//! Turns a set of matches plus a replacement template into edited source
//! text — the external "pretty-printing of matches" collaborator the core
//! delegates away from itself. The core (`substitute.rs`) only rebuilds
//! the rewritten tree; this module prints it (`objlang::printer`) and
//! splices the printed text back into the original source.

use anyhow::Result;

use crate::command::{MatchRecord, PatternFragment};
use crate::objlang::{print_expr, print_stmt, print_stmt_list};
use crate::wildcard::WildcardRegistry;
use crate::{compile_replacement_fragment, substitute};

/// One span of `source` to replace with `text`.
pub struct Edit {
    pub pos: usize,
    pub end: usize,
    pub text: String,
}

/// Render the replacement text for every match in `records` against the
/// same compiled template, without reparsing the template per match. The
/// template may compile to an expression, a single statement, or a
/// statement list; each is printed with its own printer.
pub fn render_edits(records: &[MatchRecord], replacement_source: &str, registry: &WildcardRegistry) -> Result<Vec<Edit>> {
    let mut registry = registry.clone();
    let fragment = compile_replacement_fragment(replacement_source, &mut registry)?;

    Ok(records
        .iter()
        .map(|record| {
            let text = match &fragment {
                PatternFragment::Expr(e) => print_expr(&substitute::substitute_expr(e, &record.bindings)),
                PatternFragment::Stmt(s) => print_stmt(&substitute::substitute_stmt(s, &record.bindings)),
                PatternFragment::StmtList(s) => print_stmt_list(&substitute::substitute_stmt_list(s, &record.bindings)),
                other => anyhow::bail!("replacement template is not a printable fragment: {other:?}"),
            };
            Ok(Edit { pos: record.pos as usize, end: record.end as usize, text })
        })
        .collect::<Result<Vec<Edit>>>()?)
}

/// Apply non-overlapping `edits` to `source`, returning the rewritten text.
/// Edits are applied back-to-front by byte position so earlier offsets stay
/// valid as later ones are spliced in.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    let mut out = source.to_string();
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.pos.cmp(&a.pos));
    for edit in sorted {
        out.replace_range(edit.pos..edit.end, &edit.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, FileContext};
    use crate::unifier::AggressivePolicy;

    #[test]
    fn renders_and_applies_a_single_edit() {
        let src = "package main\n\nfunc f() {\n\tfmt.Println(old)\n}\n";
        let ctx = FileContext::parse(src).unwrap();
        let pipeline = compile("x fmt.Println($x)").unwrap();
        let records = crate::run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();

        let edits = render_edits(&records, "fmt.Println(new)", &pipeline.registry).unwrap();
        let rewritten = apply_edits(src, &edits);
        assert!(rewritten.contains("fmt.Println(new)"));
        assert!(!rewritten.contains("old"));
    }

    #[test]
    fn applies_multiple_edits_back_to_front() {
        let src = "package main\n\nfunc f() {\n\tfmt.Println(1)\n\tfmt.Println(2)\n}\n";
        let ctx = FileContext::parse(src).unwrap();
        let pipeline = compile("x fmt.Println($x)").unwrap();
        let records = crate::run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        assert_eq!(records.len(), 2);

        let edits = render_edits(&records, "fmt.Println($x + 1)", &pipeline.registry).unwrap();
        let rewritten = apply_edits(src, &edits);
        assert!(rewritten.contains("fmt.Println(1 + 1)"));
        assert!(rewritten.contains("fmt.Println(2 + 1)"));
    }

    #[test]
    fn renders_a_statement_shaped_replacement() {
        let src = "package main\n\nfunc f() {\n\tx := 1\n}\n";
        let ctx = FileContext::parse(src).unwrap();
        let pipeline = compile("x $x := 1").unwrap();
        let records = crate::run(&pipeline, &ctx, AggressivePolicy::none()).unwrap();
        assert_eq!(records.len(), 1);

        let edits = render_edits(&records, "$x := 2", &pipeline.registry).unwrap();
        let rewritten = apply_edits(src, &edits);
        assert!(rewritten.contains("x := 2"));
        assert!(!rewritten.contains("x := 1"));
    }
}

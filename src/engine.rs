//! Per-file pattern matching, parallelised across the discovered file set.
//!
//! Mirrors the shape of a two-pass `rayon` analysis: each file is parsed,
//! type-checked, and matched against the compiled pipeline independently, so
//! the whole file set is processed with one `par_iter` pass.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::command::{MatchRecord, Pipeline};
use crate::location::offset_to_line_col;
use crate::unifier::AggressivePolicy;
use crate::FileContext;

/// One surviving match, located within its file.
pub struct Match {
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub pos: u32,
    pub end: u32,
    pub snippet: String,
    pub record: MatchRecord,
}

/// Run `pipeline` against every file in `files`, collecting every surviving
/// match across the whole set. A single file that fails to parse or
/// type-check is reported as an error rather than silently skipped, since a
/// pattern-matching host operating on a partially read target would produce
/// misleading results.
pub fn run_on_files(pipeline: &Pipeline, files: &[PathBuf], policy: AggressivePolicy) -> Result<Vec<Match>> {
    let per_file: Vec<Result<Vec<Match>>> = files.par_iter().map(|path| run_on_file(pipeline, path, policy)).collect();

    let mut matches = Vec::new();
    for result in per_file {
        matches.extend(result?);
    }
    matches.sort_by(|a, b| a.file.cmp(&b.file).then(a.pos.cmp(&b.pos)));
    Ok(matches)
}

fn run_on_file(pipeline: &Pipeline, path: &PathBuf, policy: AggressivePolicy) -> Result<Vec<Match>> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path.to_string_lossy().to_string();

    let ctx = FileContext::parse(&source).with_context(|| format!("parsing {filename}"))?;
    let records = crate::run(pipeline, &ctx, policy).with_context(|| format!("matching {filename}"))?;

    Ok(records
        .into_iter()
        .map(|record| {
            let (line, col) = offset_to_line_col(record.pos as usize, &source);
            let snippet = source.get(record.pos as usize..record.end as usize).unwrap_or("").to_string();
            Match { file: filename.clone(), line, col, pos: record.pos, end: record.end, snippet, record }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_matches_in_a_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ol");
        fs::write(&path, "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n").unwrap();

        let pipeline = crate::compile("x fmt.Println($x)").unwrap();
        let matches = run_on_files(&pipeline, &[path], AggressivePolicy::none()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 4);
    }

    #[test]
    fn aggregates_matches_across_files_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.ol");
        let b = dir.path().join("b.ol");
        fs::write(&a, "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n").unwrap();
        fs::write(&b, "package main\n\nfunc f() {\n\tfmt.Println(2)\n}\n").unwrap();

        let pipeline = crate::compile("x fmt.Println($x)").unwrap();
        let matches = run_on_files(&pipeline, &[b, a], AggressivePolicy::none()).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].file < matches[1].file);
    }

    #[test]
    fn unparseable_file_is_an_error_not_a_skip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ol");
        fs::write(&path, "package (((\n").unwrap();

        let pipeline = crate::compile("x fmt.Println($x)").unwrap();
        assert!(run_on_files(&pipeline, &[path], AggressivePolicy::none()).is_err());
    }
}

mod banner;
mod cli;
mod discovery;

use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::process;

use cli::Cli;
use sculptor::engine::{self, Match};
use sculptor::unifier::AggressivePolicy;

fn main() {
    let cli = Cli::parse();

    // ── no paths → show animated welcome screen ───────────────────────────────
    if cli.paths.is_empty() {
        banner::show_welcome();
        return;
    }

    let exclude: Vec<String> = cli.exclude.clone().unwrap_or_default();

    // ── pattern pipeline ──────────────────────────────────────────────────────
    let pattern_source = match cli.pattern_source() {
        Ok(src) => src,
        Err(e) => fail(&e),
    };
    let pipeline = match sculptor::compile(&pattern_source) {
        Ok(p) => p,
        Err(e) => fail(&e),
    };

    // ── file discovery ────────────────────────────────────────────────────────
    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_file() {
            files.push(path.clone());
        } else {
            match discovery::discover_source_files(path, &exclude) {
                Ok(found) => files.extend(found),
                Err(e) => fail(&e),
            }
        }
    }

    let policy = if cli.aggressive { AggressivePolicy::all() } else { AggressivePolicy::none() };

    // ── matching ──────────────────────────────────────────────────────────────
    let matches = match engine::run_on_files(&pipeline, &files, policy) {
        Ok(m) => m,
        Err(e) => fail(&e),
    };

    // ── --replace / --write ───────────────────────────────────────────────────
    if let Some(ref replacement) = cli.replace {
        match apply_replacement(&matches, replacement, &pipeline.registry, cli.write) {
            Ok(()) => {}
            Err(e) => fail(&e),
        }
        if !cli.no_exit_code && !matches.is_empty() {
            process::exit(1);
        }
        return;
    }

    // ── output ────────────────────────────────────────────────────────────────
    if cli.json {
        print_json(&matches);
    } else {
        print_text(&matches);
    }

    // ── exit code ─────────────────────────────────────────────────────────────
    if !cli.no_exit_code && !matches.is_empty() {
        process::exit(1);
    }
}

fn fail(e: &anyhow::Error) -> ! {
    eprintln!("{}: {e:#}", "error".red().bold());
    process::exit(2);
}

fn print_text(matches: &[Match]) {
    for m in matches {
        println!(
            "{}:{}:{}: {}",
            m.file.cyan(),
            m.line,
            m.col,
            m.snippet.trim().lines().next().unwrap_or("")
        );
    }
    if matches.is_empty() {
        println!("{}", "No matches found".green());
    } else {
        let count = matches.len();
        println!("{}", format!("Found {count} match(es)").yellow().bold());
    }
}

fn print_json(matches: &[Match]) {
    let items: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| {
            json!({
                "file":    m.file,
                "line":    m.line,
                "col":     m.col,
                "pos":     m.pos,
                "end":     m.end,
                "snippet": m.snippet,
            })
        })
        .collect();

    let output = json!({
        "matches": items,
        "count":   matches.len(),
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).expect("serde_json::Value is always serialisable")
    );
}

/// Group `matches` by file, render the replacement once per group (sharing
/// the pipeline's wildcard registry across every match), and either write
/// the rewritten source back to disk (`write = true`) or print a unified
/// diff of what would change.
fn apply_replacement(matches: &[Match], replacement_source: &str, registry: &sculptor::wildcard::WildcardRegistry, write: bool) -> anyhow::Result<()> {
    use std::collections::BTreeMap;

    let mut by_file: BTreeMap<&str, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        by_file.entry(m.file.as_str()).or_default().push(m);
    }

    for (file, file_matches) in by_file {
        let source = fs::read_to_string(file)?;
        let records: Vec<_> = file_matches.iter().map(|m| m.record.clone()).collect();
        let edits = sculptor::rewrite::render_edits(&records, replacement_source, registry)?;

        if write {
            let rewritten = sculptor::rewrite::apply_edits(&source, &edits);
            fs::write(file, rewritten)?;
            println!("{} {}", "rewrote".green().bold(), file);
        } else {
            for (m, edit) in file_matches.iter().zip(&edits) {
                println!("{}:{}:{}", file.cyan(), m.line, m.col);
                println!("  {} {}", "-".red().bold(), m.snippet.trim());
                println!("  {} {}", "+".green().bold(), edit.text.trim());
            }
        }
    }
    Ok(())
}

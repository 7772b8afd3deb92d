//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sculptor",
    about = "Structural pattern matching and rewriting for a typed, C-family object language",
    version,
    long_about = "sculptor finds, filters, and rewrites structural patterns in object-language \
                  source: calls, statements, declarations, anything expressible as a fragment \
                  of the language's own grammar, with $name wildcards standing in for the parts \
                  you don't want to pin down.\n\n\
                  Run `sculptor` with no arguments to see an overview of the pattern syntax and usage."
)]
pub struct Cli {
    /// Paths to search (files or directories). Omit to see the welcome screen;
    /// pass `.` to search the current directory.
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// The pattern pipeline, given directly on the command line — a
    /// newline-separated sequence of `x`/`g`/`v` commands. Mutually
    /// exclusive with --pattern-file.
    #[arg(long, conflicts_with = "pattern_file")]
    pub pattern: Option<String>,

    /// Read the pattern pipeline from a file instead of --pattern.
    #[arg(long)]
    pub pattern_file: Option<PathBuf>,

    /// Rewrite every match using this replacement template (an expression
    /// referencing the same $name wildcards bound by --pattern), and write
    /// the rewritten fragment back out. Without --write, prints a diff
    /// instead of touching any file.
    #[arg(long)]
    pub replace: Option<String>,

    /// Apply --replace in place rather than printing a diff.
    #[arg(long, requires = "replace")]
    pub write: bool,

    /// Allow the aggressive-mode relaxations (literal/identifier coercions,
    /// composite-literal elision) documented for the unifier.
    #[arg(long)]
    pub aggressive: bool,

    /// Exclude directories or files whose path contains any of the given
    /// comma-separated names (e.g. --exclude tests,vendor). Hidden
    /// directories and well-known build-output directories are always
    /// excluded regardless of this flag.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Emit results as JSON instead of the default text format.
    #[arg(long)]
    pub json: bool,

    /// Exit with code 0 even when matches are found (useful in CI with --json).
    #[arg(long)]
    pub no_exit_code: bool,
}

impl Cli {
    /// Resolve the configured pattern source from either --pattern or
    /// --pattern-file. Exactly one of the two (or neither, an error) is
    /// expected — `conflicts_with` in the arg definitions above already
    /// rules out both being set.
    pub fn pattern_source(&self) -> anyhow::Result<String> {
        if let Some(ref text) = self.pattern {
            return Ok(text.clone());
        }
        if let Some(ref path) = self.pattern_file {
            return Ok(std::fs::read_to_string(path)?);
        }
        anyhow::bail!("no pattern given: pass --pattern or --pattern-file")
    }
}

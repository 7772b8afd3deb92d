//! File discovery: walk directory trees and collect object-language source
//! files (`.ol`).
//!
//! By default the walker:
//!  - Respects `.gitignore` (and `.ignore`) files at every level.
//!  - **Skips hidden entries** (names starting with `.`) — this covers
//!    `.git`, build caches, etc.
//!  - Always skips the well-known build-artifact directories listed in
//!    [`ALWAYS_EXCLUDE`] even if they are not hidden and not gitignored.
//!
//! Additional paths to exclude can be supplied by the caller via the
//! `exclude` parameter of [`discover_source_files`].

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "ol";

/// Directory names that are always excluded regardless of `.gitignore` or the
/// `--exclude` flag.
const ALWAYS_EXCLUDE: &[&str] = &[
    "build",
    "dist",
    "target",
    "vendor",
    ".git",
    ".hg",
    ".svn",
    "node_modules",
];

/// Discover all object-language source files reachable from `root`, excluding:
///
/// * Hidden directories / files (names starting with `.`)
/// * Entries matched by `.gitignore` / `.ignore` files
/// * The hardcoded [`ALWAYS_EXCLUDE`] directory names
/// * Any path whose components include a name listed in `exclude`
///
/// The returned paths are **not** guaranteed to be in any particular order.
pub fn discover_source_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .build();

    'entries: for entry in walker {
        let entry = entry?;

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }

        let path = entry.path();

        for component in path.components() {
            if let std::path::Component::Normal(name) = component {
                let name_str = name.to_string_lossy();
                if ALWAYS_EXCLUDE.contains(&name_str.as_ref()) {
                    continue 'entries;
                }
            }
        }

        if !exclude.is_empty() {
            for component in path.components() {
                if let std::path::Component::Normal(name) = component {
                    let name_str = name.to_string_lossy();
                    for pat in exclude {
                        if name_str == pat.as_str() || name_str.contains(pat.as_str()) {
                            continue 'entries;
                        }
                    }
                }
            }
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn discover(root: &Path) -> Vec<PathBuf> {
        discover_source_files(root, &[]).unwrap()
    }

    fn discover_ex(root: &Path, exclude: &[&str]) -> Vec<PathBuf> {
        let ex: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        discover_source_files(root, &ex).unwrap()
    }

    #[test]
    fn finds_source_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ol"), "package a").unwrap();
        fs::write(dir.path().join("b.txt"), "not source").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.ol"), "package a").unwrap();

        let files = discover(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == SOURCE_EXTENSION));
    }

    #[test]
    fn respects_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored_dir/\n").unwrap();
        fs::create_dir(dir.path().join("ignored_dir")).unwrap();
        fs::write(dir.path().join("ignored_dir/hidden.ol"), "package a").unwrap();
        fs::write(dir.path().join("main.ol"), "package a").unwrap();

        let files = discover(dir.path());
        assert_eq!(files.len(), 1, "gitignored file must be excluded");
        assert_eq!(files[0].file_name().unwrap(), "main.ol");
    }

    #[test]
    fn skips_hidden_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".hidden_dir")).unwrap();
        fs::write(dir.path().join(".hidden_dir/secret.ol"), "package a").unwrap();
        fs::write(dir.path().join("visible.ol"), "package a").unwrap();

        let files = discover(dir.path());
        assert_eq!(files.len(), 1, ".hidden_dir must be skipped");
        assert_eq!(files[0].file_name().unwrap(), "visible.ol");
    }

    #[test]
    fn skips_always_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("vendor/pkg")).unwrap();
        fs::write(dir.path().join("vendor/pkg/dep.ol"), "package a").unwrap();
        fs::write(dir.path().join("main.ol"), "package a").unwrap();

        let files = discover(dir.path());
        assert_eq!(files.len(), 1, "vendor/ must be skipped");
        assert_eq!(files[0].file_name().unwrap(), "main.ol");
    }

    #[test]
    fn caller_exclude_flag() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/test_foo.ol"), "package a").unwrap();
        fs::create_dir(dir.path().join("migrations")).unwrap();
        fs::write(dir.path().join("migrations/0001.ol"), "package a").unwrap();
        fs::write(dir.path().join("app.ol"), "package a").unwrap();

        let files = discover_ex(dir.path(), &["tests", "migrations"]);
        assert_eq!(files.len(), 1, "tests/ and migrations/ must be excluded");
        assert_eq!(files[0].file_name().unwrap(), "app.ol");
    }

    #[test]
    fn exclude_does_not_affect_other_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/test_foo.ol"), "package a").unwrap();
        fs::write(dir.path().join("app.ol"), "package a").unwrap();
        fs::write(dir.path().join("utils.ol"), "package a").unwrap();

        let files = discover_ex(dir.path(), &["tests"]);
        assert_eq!(files.len(), 2);
    }
}

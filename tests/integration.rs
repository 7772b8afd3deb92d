use std::path::PathBuf;
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

fn sculptor_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sculptor"))
}

struct TempSrc {
    dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

impl TempSrc {
    fn new() -> Self {
        Self { dir: tempfile::TempDir::new().unwrap(), files: Vec::new() }
    }

    fn file(&mut self, name: &str, content: &str) -> &mut Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        self.files.push(path);
        self
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap()
    }

    /// Run sculptor with the given extra args. Returns (stdout, stderr, exit_code).
    fn run(&self, pattern: &str, extra: &[&str]) -> (String, String, i32) {
        let mut cmd = Command::new(sculptor_bin());
        cmd.arg("--pattern").arg(pattern);
        for f in &self.files {
            cmd.arg(f);
        }
        for a in extra {
            cmd.arg(a);
        }
        let out = cmd.output().expect("failed to run sculptor");
        (
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
            out.status.code().unwrap_or(-1),
        )
    }

    fn run_no_exit(&self, pattern: &str, extra: &[&str]) -> String {
        let mut args = vec!["--no-exit-code"];
        args.extend_from_slice(extra);
        let (stdout, _, _) = self.run(pattern, &args);
        stdout
    }
}

// ── basic find ───────────────────────────────────────────────────────────────

#[test]
fn test_no_matches_reports_clean() {
    let mut t = TempSrc::new();
    t.file("clean.ol", "package main\n\nfunc f() {\n\tx := 1\n\t_ = x\n}\n");
    let out = t.run_no_exit("x $x.Close()", &[]);
    assert!(out.contains("No matches found"));
}

#[test]
fn test_exit_code_0_when_no_matches() {
    let mut t = TempSrc::new();
    t.file("clean.ol", "package main\n\nfunc f() {\n\tx := 1\n\t_ = x\n}\n");
    let (_, _, code) = t.run("x $x.Close()", &[]);
    assert_eq!(code, 0);
}

#[test]
fn test_exit_code_1_when_matches() {
    let mut t = TempSrc::new();
    t.file("bad.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let (_, _, code) = t.run("x fmt.Println($x)", &[]);
    assert_eq!(code, 1);
}

#[test]
fn test_no_exit_code_flag() {
    let mut t = TempSrc::new();
    t.file("bad.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let (_, _, code) = t.run("x fmt.Println($x)", &["--no-exit-code"]);
    assert_eq!(code, 0);
}

#[test]
fn test_match_count_in_summary() {
    let mut t = TempSrc::new();
    t.file(
        "bad.ol",
        "package main\n\nfunc f() {\n\tfmt.Println(1)\n\tfmt.Println(2)\n}\n",
    );
    let out = t.run_no_exit("x fmt.Println($x)", &[]);
    assert!(out.contains("Found 2 match(es)"), "got: {out}");
}

#[test]
fn test_output_format_file_line_col() {
    let mut t = TempSrc::new();
    t.file("f.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let out = t.run_no_exit("x fmt.Println($x)", &[]);
    let match_line = out.lines().find(|l| l.contains("fmt.Println")).expect("must have a match line");
    let colon_count = match_line.matches(':').count();
    assert!(colon_count >= 2, "format must be path:line:col: snippet, got: {match_line}");
}

// ── grep / invert ─────────────────────────────────────────────────────────────

#[test]
fn test_grep_narrows_to_matching_subtree() {
    let mut t = TempSrc::new();
    t.file(
        "f.ol",
        "package main\n\nfunc f() {\n\tfmt.Println(nil)\n\tfmt.Println(1)\n}\n",
    );
    let out = t.run_no_exit("x fmt.Println($x)\ng $x == nil", &[]);
    assert!(out.contains("Found 1 match(es)"), "got: {out}");
}

#[test]
fn test_invert_drops_matching_subtree() {
    let mut t = TempSrc::new();
    t.file(
        "f.ol",
        "package main\n\nfunc f() {\n\tfmt.Println(nil)\n\tfmt.Println(1)\n}\n",
    );
    let out = t.run_no_exit("x fmt.Println($x)\nv $x == nil", &[]);
    assert!(out.contains("Found 1 match(es)"), "got: {out}");
}

// ── --json output ─────────────────────────────────────────────────────────────

#[test]
fn test_json_output_is_valid_structure() {
    let mut t = TempSrc::new();
    t.file("f.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let out = t.run_no_exit("x fmt.Println($x)", &["--json"]);
    assert!(out.contains("\"matches\""), "must have matches key");
    assert!(out.contains("\"file\""));
    assert!(out.contains("\"line\""));
    assert!(out.contains("\"count\""));
    for line in out.lines() {
        assert_ne!(line.trim(), ",", "bare comma line detected — invalid JSON");
    }
}

#[test]
fn test_json_clean_file() {
    let mut t = TempSrc::new();
    t.file("clean.ol", "package main\n\nfunc f() {}\n");
    let out = t.run_no_exit("x fmt.Println($x)", &["--json"]);
    assert!(out.contains("\"matches\": []") || out.contains("\"count\": 0"));
}

// ── --exclude ──────────────────────────────────────────────────────────────────

#[test]
fn test_exclude_skips_named_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("vendor")).unwrap();
    std::fs::write(dir.path().join("vendor/v.ol"), "package main\n\nfunc f() { fmt.Println(1) }\n").unwrap();
    std::fs::write(dir.path().join("app.ol"), "package main\n\nfunc f() { fmt.Println(2) }\n").unwrap();

    let out = Command::new(sculptor_bin())
        .arg("--pattern")
        .arg("x fmt.Println($x)")
        .arg(dir.path())
        .arg("--no-exit-code")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    // vendor/ is always excluded regardless of --exclude.
    assert!(stdout.contains("Found 1 match(es)"), "got: {stdout}");
}

// ── --pattern-file ─────────────────────────────────────────────────────────────

#[test]
fn test_pattern_file() {
    let mut t = TempSrc::new();
    t.file("f.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let pattern_path = t.dir.path().join("pattern.txt");
    std::fs::write(&pattern_path, "x fmt.Println($x)\n").unwrap();

    let mut cmd = Command::new(sculptor_bin());
    cmd.arg("--pattern-file").arg(&pattern_path);
    for f in &t.files {
        cmd.arg(f);
    }
    cmd.arg("--no-exit-code");
    let out = cmd.output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found 1 match(es)"), "got: {stdout}");
}

// ── --replace / --write ───────────────────────────────────────────────────────

#[test]
fn test_replace_without_write_prints_diff_and_does_not_modify() {
    let mut t = TempSrc::new();
    t.file("f.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let out = t.run_no_exit("x fmt.Println($x)", &["--replace", "log.Print($x)"]);
    assert!(out.contains("log.Print"), "got: {out}");
    assert!(t.read("f.ol").contains("fmt.Println"), "file must be untouched without --write");
}

#[test]
fn test_replace_with_write_rewrites_file() {
    let mut t = TempSrc::new();
    t.file("f.ol", "package main\n\nfunc f() {\n\tfmt.Println(1)\n}\n");
    let _ = t.run_no_exit("x fmt.Println($x)", &["--replace", "log.Print($x)", "--write"]);
    let rewritten = t.read("f.ol");
    assert!(rewritten.contains("log.Print(1)"), "got: {rewritten}");
    assert!(!rewritten.contains("fmt.Println"));
}

// ── failure surface ────────────────────────────────────────────────────────────

#[test]
fn test_malformed_source_is_a_hard_error() {
    let mut t = TempSrc::new();
    t.file("broken.ol", "package (((\n");
    let (_, stderr, code) = t.run("x fmt.Println($x)", &["--no-exit-code"]);
    assert_ne!(code, 0, "a parse failure must not be silently skipped");
    assert!(!stderr.is_empty());
}

#[test]
fn test_no_paths_shows_welcome_and_exits_0() {
    let out = Command::new(sculptor_bin()).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.to_lowercase().contains("sculptor") || !stdout.is_empty());
}

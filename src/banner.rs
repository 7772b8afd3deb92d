//! Welcome screen shown when `sculptor` is invoked with no arguments.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::thread;
use std::time::Duration;

const LOGO: &[&str] = &[
    "███████╗ ██████╗██╗   ██╗██╗     ██████╗ ████████╗ ██████╗ ██████╗ ",
    "██╔════╝██╔════╝██║   ██║██║     ██╔══██╗╚══██╔══╝██╔═══██╗██╔══██╗",
    "███████╗██║     ██║   ██║██║     ██████╔╝   ██║   ██║   ██║██████╔╝",
    "╚════██║██║     ██║   ██║██║     ██╔═══╝    ██║   ██║   ██║██╔══██╗",
    "███████║╚██████╗╚██████╔╝███████╗██║        ██║   ╚██████╔╝██║  ██║",
    "╚══════╝ ╚═════╝ ╚═════╝ ╚══════╝╚═╝        ╚═╝    ╚═════╝ ╚═╝  ╚═╝",
];

const COMMAND_EXAMPLES: &[(&str, &str)] = &[
    ("x $x.Close()", "find every call matching `$x.Close()`"),
    ("x $x == nil\\ng !err", "chain a grep to narrow the match set"),
    ("x fmt.Println($x)\\nv $x == nil", "invert to drop nil-argument calls"),
    ("$x(type=error)", "constrain a wildcard to a resolved type"),
    ("$*_, b, $*_", "absorb a prefix and suffix around a literal"),
];

#[inline]
fn sleep(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

#[inline]
fn flush() {
    let _ = io::stdout().flush();
}

#[inline]
fn hide_cursor() {
    print!("\x1b[?25l");
    flush();
}

#[inline]
fn show_cursor() {
    print!("\x1b[?25h");
    flush();
}

macro_rules! pf {
    ($($arg:tt)*) => {{
        print!($($arg)*);
        flush();
    }};
}

/// Display the welcome screen. Animates when stdout is a TTY; falls back to
/// a plain static print otherwise (piped output, CI, `--no-color` envs).
pub fn show_welcome() {
    if io::stdout().is_terminal() {
        let _ = std::panic::catch_unwind(animated_welcome);
        show_cursor();
    } else {
        static_welcome();
    }
}

fn animated_welcome() {
    hide_cursor();

    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    for (i, frame) in frames.iter().enumerate() {
        pf!("\r  {}  {}", frame.cyan().bold(), "Loading patterns…".truecolor(120, 120, 120));
        sleep(if i < 3 { 90 } else { 55 });
    }
    pf!("\r{}\r", " ".repeat(60));
    println!();

    for (i, line) in LOGO.iter().enumerate() {
        let coloured = match i {
            0 | 5 => line.truecolor(40, 140, 200).bold(),
            1 | 4 => line.truecolor(60, 170, 220).bold(),
            _ => line.truecolor(90, 200, 240).bold(),
        };
        println!("  {coloured}");
        sleep(35);
    }
    println!();

    let version = env!("CARGO_PKG_VERSION");
    let tagline = format!("🪓  Structural pattern matching and rewriting  —  v{version}");
    pf!("  ");
    for ch in tagline.chars() {
        pf!("{}", ch.to_string().white().bold());
        sleep(15);
    }
    println!();
    println!();

    let rule = "─".repeat(70);
    println!("  {}", rule.truecolor(60, 60, 60));
    println!();
    sleep(60);

    println!("  {}", "Pattern examples".bold().underline());
    println!();
    for (pattern, desc) in COMMAND_EXAMPLES {
        pf!("    {} ", pattern.to_string().on_truecolor(40, 40, 40).cyan().bold());
        pf!("  {}", format!("# {desc}").truecolor(90, 90, 90));
        println!();
        sleep(50);
    }
    println!();

    println!("  {}", rule.truecolor(60, 60, 60));
    println!();
    sleep(40);

    println!("  {}", "Usage".bold().underline());
    println!();
    let cmds: &[(&str, &str)] = &[
        ("sculptor --pattern 'x $x.Close()' .", "search the current directory"),
        ("sculptor --pattern-file p.sculpt src/", "read the pipeline from a file"),
        ("sculptor --exclude tests,vendor ...", "skip directories by name"),
        ("sculptor --json ...", "emit structured JSON output"),
        ("sculptor --write --replace 'log.Printf(\"%v\", $x)' ...", "rewrite matches in place"),
        ("sculptor --no-exit-code ...", "always exit 0 (useful in CI)"),
    ];
    for (cmd, desc) in cmds {
        println!("    {}  {}", format!("{cmd:<46}").green().bold(), desc.truecolor(120, 120, 120));
        sleep(35);
    }
    println!();

    println!("  {}", rule.truecolor(60, 60, 60));
    println!();

    show_cursor();
}

fn static_welcome() {
    let version = env!("CARGO_PKG_VERSION");

    for line in LOGO {
        println!("  {line}");
    }
    println!();
    println!("  sculptor v{version}  —  structural pattern matching and rewriting");
    println!();
    println!("  Pattern examples:");
    for (pattern, desc) in COMMAND_EXAMPLES {
        println!("    {pattern}  # {desc}");
    }
    println!();
    println!("  Usage:  sculptor --pattern '<pipeline>' [PATH …] [OPTIONS]");
    println!("          sculptor --pattern 'x $x.Close()' .       find a pattern");
    println!("          sculptor --pattern-file p.sculpt src/     read pipeline from a file");
    println!("          sculptor --json                           JSON output");
    println!("          sculptor --help                           full help text");
    println!();
}

//! Pattern-source parser.
//!
//! Compiles a pattern-source string — a newline-separated sequence of
//! `x`/`g`/`v` commands, each holding a fragment of object-language syntax
//! peppered with wildcard markers (`$name`, `$*name`, `$_`, `$*_`, and
//! `$name(constraint, ...)`) — into a [`Pipeline`] ready for
//! [`crate::command::run`].
//!
//! Wildcard markers are not part of the object language's own grammar, so
//! this module rewrites them to the wire-format identifiers the rest of the
//! crate understands (`wildcard::encode`) before handing the text to the
//! object-language parser (`objlang`), then hands back a populated
//! [`WildcardRegistry`].

use std::fmt;

use regex::Regex;

use crate::ast::Expr;
use crate::command::{Command, CommandKind, Pipeline, PatternFragment};
use crate::objlang;
use crate::wildcard::{encode, TypeOp, UnderlyingKind, WildcardInfo, WildcardRegistry};

#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern error: {}", self.message)
    }
}

impl std::error::Error for PatternError {}

fn err(message: impl Into<String>) -> PatternError {
    PatternError { message: message.into() }
}

/// Compile a full pattern-source program into a command pipeline.
pub fn compile(source: &str) -> Result<Pipeline, PatternError> {
    let mut registry = WildcardRegistry::new();
    let mut commands = Vec::new();

    for raw_line in source.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (kind, rest) = split_command(line)?;
        let rewritten = rewrite_wildcards(rest, &mut registry)?;
        let fragment = parse_fragment(&rewritten)?;
        commands.push(Command { kind, fragment });
    }

    Ok(Pipeline { commands, registry })
}

/// Compile a standalone replacement template (the right-hand side of a
/// substitution), reusing the same wildcard names already registered by the
/// match pipeline so `$x` on both sides refers to the same binding.
pub fn compile_replacement(source: &str, registry: &mut WildcardRegistry) -> Result<PatternFragment, PatternError> {
    let rewritten = rewrite_wildcards(source.trim(), registry)?;
    parse_fragment(&rewritten)
}

fn split_command(line: &str) -> Result<(CommandKind, &str), PatternError> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    if rest.is_empty() {
        return Err(err(format!("command `{line}` is missing a pattern")));
    }
    let kind = match head {
        "x" => CommandKind::Find,
        "g" => CommandKind::Grep,
        "v" => CommandKind::Invert,
        other => return Err(err(format!("unknown command `{other}`, expected x/g/v"))),
    };
    Ok((kind, rest))
}

fn parse_fragment(src: &str) -> Result<PatternFragment, PatternError> {
    if let Ok(e) = objlang::parse_expr_only(src) {
        return Ok(PatternFragment::Expr(e));
    }
    if let Ok(s) = objlang::parse_stmt_only(src) {
        return Ok(PatternFragment::Stmt(s));
    }
    if let Ok(list) = objlang::parse_stmt_list_only(src) {
        if list.len() == 1 {
            return Ok(PatternFragment::Stmt(list.into_iter().next().unwrap()));
        }
        return Ok(PatternFragment::StmtList(list));
    }
    Err(err(format!("could not parse pattern fragment: {src}")))
}

// ── wildcard preprocessing ───────────────────────────────────────────────────

fn wildcard_token_re() -> Regex {
    Regex::new(r"\$(\*?)(_|[A-Za-z][A-Za-z0-9_]*)(\([^()]*\))?").expect("static wildcard pattern is valid")
}

fn rewrite_wildcards(src: &str, registry: &mut WildcardRegistry) -> Result<String, PatternError> {
    let re = wildcard_token_re();
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for caps in re.captures_iter(src) {
        let m = caps.get(0).unwrap();
        out.push_str(&src[last..m.start()]);
        last = m.end();

        let any = !caps.get(1).unwrap().as_str().is_empty();
        let name = caps.get(2).unwrap().as_str().to_string();
        let constraints = caps.get(3).map(|m| m.as_str());

        let info = match constraints {
            Some(text) => parse_constraints(&name, any, text)?,
            None => WildcardInfo { name, any, ..WildcardInfo::default() },
        };
        let id = registry.register(info);
        out.push_str(&encode(id));
    }
    out.push_str(&src[last..]);
    Ok(out)
}

/// Parse the constraint list inside `$name(...)`: a comma-separated list of
/// `type=T`, `asgn=T`, `conv=T`, `rx=/.../`, `comp`, `addr`, or one of the
/// underlying-category keywords (`basic`, `array`, `slice`, `struct`,
/// `interface`, `pointer`, `func`, `map`, `chan`).
fn parse_constraints(name: &str, any: bool, text: &str) -> Result<WildcardInfo, PatternError> {
    let inner = text.trim_start_matches('(').trim_end_matches(')');
    let mut info = WildcardInfo { name: name.to_string(), any, ..WildcardInfo::default() };

    for raw in split_top_level_commas(inner) {
        let item = raw.trim();
        if item.is_empty() {
            continue;
        }
        if let Some(rest) = item.strip_prefix("type=") {
            info.types.push((TypeOp::Type, parse_type_constraint(rest)?));
        } else if let Some(rest) = item.strip_prefix("asgn=") {
            info.types.push((TypeOp::Asgn, parse_type_constraint(rest)?));
        } else if let Some(rest) = item.strip_prefix("conv=") {
            info.types.push((TypeOp::Conv, parse_type_constraint(rest)?));
        } else if let Some(rest) = item.strip_prefix("rx=") {
            let pattern = rest.trim_matches('/');
            let rx = Regex::new(pattern).map_err(|e| err(format!("bad name regex `{pattern}`: {e}")))?;
            info.name_rxs.push(rx);
        } else if item == "comp" {
            info.comparable = true;
        } else if item == "addr" {
            info.addressable = true;
        } else if let Some(kind) = underlying_keyword(item) {
            info.underlying = Some(kind);
        } else {
            return Err(err(format!("unknown wildcard constraint `{item}` on ${name}")));
        }
    }
    Ok(info)
}

fn parse_type_constraint(text: &str) -> Result<Expr, PatternError> {
    objlang::parse_type_only(text.trim()).map_err(|e| err(format!("bad type constraint `{text}`: {e}")))
}

fn underlying_keyword(s: &str) -> Option<UnderlyingKind> {
    Some(match s {
        "basic" => UnderlyingKind::Basic,
        "array" => UnderlyingKind::Array,
        "slice" => UnderlyingKind::Slice,
        "struct" => UnderlyingKind::Struct,
        "interface" => UnderlyingKind::Interface,
        "pointer" => UnderlyingKind::Pointer,
        "func" => UnderlyingKind::Func,
        "map" => UnderlyingKind::Map,
        "chan" => UnderlyingKind::Chan,
        _ => return None,
    })
}

/// Split on commas that are not nested inside another pair of parentheses,
/// so `type=map[string]int` (which itself may contain no commas here, but
/// `type=func(int, int)` does) doesn't get split mid-type.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                out.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_single_find_command() {
        let pipeline = compile("x $x.Close()").unwrap();
        assert_eq!(pipeline.commands.len(), 1);
        assert_eq!(pipeline.commands[0].kind, CommandKind::Find);
        match &pipeline.commands[0].fragment {
            PatternFragment::Expr(_) => {}
            other => panic!("expected Expr fragment, got {other:?}"),
        }
    }

    #[test]
    fn compiles_find_grep_invert_pipeline() {
        let pipeline = compile("x $x.Close()\ng $x != nil\nv err == nil").unwrap();
        assert_eq!(pipeline.commands.len(), 3);
        assert_eq!(pipeline.commands[1].kind, CommandKind::Grep);
        assert_eq!(pipeline.commands[2].kind, CommandKind::Invert);
    }

    #[test]
    fn rejects_unknown_command_letter() {
        assert!(compile("q foo()").is_err());
    }

    #[test]
    fn parses_wildcard_with_type_constraint() {
        let pipeline = compile("x $x(type=int) + 1").unwrap();
        assert_eq!(pipeline.registry.get(0).name, "x");
        assert_eq!(pipeline.registry.get(0).types.len(), 1);
    }

    #[test]
    fn parses_variadic_discard_wildcard() {
        let pipeline = compile("x f($*_)").unwrap();
        assert!(pipeline.registry.get(0).any);
        assert_eq!(pipeline.registry.get(0).name, "_");
    }

    #[test]
    fn rejects_unknown_constraint_keyword() {
        assert!(compile("x $x(bogus)").is_err());
    }
}

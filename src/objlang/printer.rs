//! Prints an object-language AST fragment back to source text.
//!
//! Printing is the external collaborator the core delegates matching to: the
//! core only produces rewritten trees (`substitute.rs`); turning a rewritten
//! expression or statement back into text for `--write` is the CLI host's
//! job. This printer is not a general formatter — it reproduces a tree
//! faithfully enough to splice back into the original source, not to match
//! any particular house style.

use std::fmt::Write as _;

use crate::ast::{
    AssignOp, BasicLitKind, BinOp, BranchKind, CaseClause, ChanDir, CommClause, Expr, ExprKind,
    Field, Stmt, StmtKind, UnaryOp,
};

pub fn print_expr(e: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, e);
    out
}

pub fn print_stmt(s: &Stmt) -> String {
    let mut out = String::new();
    write_stmt(&mut out, s, 0);
    out
}

pub fn print_stmt_list(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for s in stmts {
        write_stmt(&mut out, s, 0);
        out.push('\n');
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn binop_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Quo => "/",
        BinOp::Rem => "%",
        BinOp::And => "&",
        BinOp::Or => "|",
        BinOp::Xor => "^",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::Land => "&&",
        BinOp::Lor => "||",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
    }
}

fn unop_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Pos => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::Xor => "^",
        UnaryOp::Recv => "<-",
    }
}

fn assignop_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Define => ":=",
        AssignOp::AddAssign => "+=",
        AssignOp::SubAssign => "-=",
        AssignOp::MulAssign => "*=",
        AssignOp::QuoAssign => "/=",
        AssignOp::RemAssign => "%=",
    }
}

fn write_exprs(out: &mut String, exprs: &[Expr], sep: &str) {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_expr(out, e);
    }
}

fn write_fields(out: &mut String, fields: &[Field], sep: &str) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        if !f.names.is_empty() {
            let names: Vec<&str> = f.names.iter().map(|n| n.name.as_str()).collect();
            out.push_str(&names.join(", "));
            out.push(' ');
        }
        write_expr(out, &f.typ);
    }
}

fn write_expr(out: &mut String, e: &Expr) {
    match &e.kind {
        ExprKind::Ident(id) => out.push_str(&id.name),
        ExprKind::BasicLit { kind, value } => match kind {
            BasicLitKind::String => {
                let _ = write!(out, "\"{value}\"");
            }
            BasicLitKind::Char => {
                let _ = write!(out, "'{value}'");
            }
            _ => out.push_str(value),
        },
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(t) = typ {
                write_expr(out, t);
            }
            out.push('{');
            write_exprs(out, elts, ", ");
            out.push('}');
        }
        ExprKind::KeyValue { key, value } => {
            write_expr(out, key);
            out.push_str(": ");
            write_expr(out, value);
        }
        ExprKind::FuncLit { typ, body } => {
            write_expr(out, typ);
            out.push_str(" {\n");
            for s in body {
                write_stmt(out, s, 1);
                out.push('\n');
            }
            out.push('}');
        }
        ExprKind::Selector { x, sel } => {
            write_expr(out, x);
            out.push('.');
            out.push_str(&sel.name);
        }
        ExprKind::Index { x, index } => {
            write_expr(out, x);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        ExprKind::Slice { x, lo, hi, max } => {
            write_expr(out, x);
            out.push('[');
            if let Some(lo) = lo {
                write_expr(out, lo);
            }
            out.push(':');
            if let Some(hi) = hi {
                write_expr(out, hi);
            }
            if let Some(max) = max {
                out.push(':');
                write_expr(out, max);
            }
            out.push(']');
        }
        ExprKind::TypeAssert { x, typ } => {
            write_expr(out, x);
            out.push_str(".(");
            match typ {
                Some(t) => write_expr(out, t),
                None => out.push_str("type"),
            }
            out.push(')');
        }
        ExprKind::Call { fun, args, has_ellipsis } => {
            write_expr(out, fun);
            out.push('(');
            write_exprs(out, args, ", ");
            if *has_ellipsis {
                out.push_str("...");
            }
            out.push(')');
        }
        ExprKind::Star(x) => {
            out.push('*');
            write_expr(out, x);
        }
        ExprKind::Unary { op, x } => {
            out.push_str(unop_str(*op));
            write_expr(out, x);
        }
        ExprKind::Binary { op, x, y } => {
            write_expr(out, x);
            let _ = write!(out, " {} ", binop_str(*op));
            write_expr(out, y);
        }
        ExprKind::Paren(x) => {
            out.push('(');
            write_expr(out, x);
            out.push(')');
        }
        ExprKind::ArrayType { len, elt } => {
            out.push('[');
            if let Some(len) = len {
                write_expr(out, len);
            }
            out.push(']');
            write_expr(out, elt);
        }
        ExprKind::StructType { fields } => {
            out.push_str("struct{ ");
            write_fields(out, fields, "; ");
            out.push_str(" }");
        }
        ExprKind::InterfaceType { methods } => {
            out.push_str("interface{ ");
            write_fields(out, methods, "; ");
            out.push_str(" }");
        }
        ExprKind::FuncType { params, results } => {
            out.push_str("func(");
            write_fields(out, params, ", ");
            out.push(')');
            if !results.is_empty() {
                out.push(' ');
                if results.len() > 1 {
                    out.push('(');
                }
                write_fields(out, results, ", ");
                if results.len() > 1 {
                    out.push(')');
                }
            }
        }
        ExprKind::MapType { key, value } => {
            out.push_str("map[");
            write_expr(out, key);
            out.push(']');
            write_expr(out, value);
        }
        ExprKind::ChanType { dir, value } => {
            match dir {
                ChanDir::Send => out.push_str("chan<- "),
                ChanDir::Recv => out.push_str("<-chan "),
                ChanDir::Both => out.push_str("chan "),
            }
            write_expr(out, value);
        }
    }
}

fn write_case_clauses(out: &mut String, cases: &[CaseClause], depth: usize) {
    for case in cases {
        indent(out, depth);
        if case.values.is_empty() {
            out.push_str("default:\n");
        } else {
            out.push_str("case ");
            write_exprs(out, &case.values, ", ");
            out.push_str(":\n");
        }
        for s in &case.body {
            write_stmt(out, s, depth + 1);
            out.push('\n');
        }
    }
}

fn write_comm_clauses(out: &mut String, comms: &[CommClause], depth: usize) {
    for comm in comms {
        indent(out, depth);
        match &comm.comm {
            Some(s) => {
                out.push_str("case ");
                write_stmt(out, s, 0);
                out.push_str(":\n");
            }
            None => out.push_str("default:\n"),
        }
        for s in &comm.body {
            write_stmt(out, s, depth + 1);
            out.push('\n');
        }
    }
}

fn write_stmt(out: &mut String, s: &Stmt, depth: usize) {
    indent(out, depth);
    match &s.kind {
        StmtKind::Block(body) => {
            out.push_str("{\n");
            for stmt in body {
                write_stmt(out, stmt, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        StmtKind::Expr(e) => write_expr(out, e),
        StmtKind::Assign { op, lhs, rhs } => {
            write_exprs(out, lhs, ", ");
            let _ = write!(out, " {} ", assignop_str(*op));
            write_exprs(out, rhs, ", ");
        }
        StmtKind::Return(values) => {
            out.push_str("return");
            if !values.is_empty() {
                out.push(' ');
                write_exprs(out, values, ", ");
            }
        }
        StmtKind::Branch { kind, label } => {
            out.push_str(match kind {
                BranchKind::Break => "break",
                BranchKind::Continue => "continue",
                BranchKind::Goto => "goto",
                BranchKind::Fallthrough => "fallthrough",
            });
            if let Some(label) = label {
                out.push(' ');
                out.push_str(&label.name);
            }
        }
        StmtKind::Labeled { label, stmt } => {
            let _ = write!(out, "{}:\n", label.name);
            write_stmt(out, stmt, depth);
        }
        StmtKind::Send { chan, value } => {
            write_expr(out, chan);
            out.push_str(" <- ");
            write_expr(out, value);
        }
        StmtKind::IncDec { x, is_inc } => {
            write_expr(out, x);
            out.push_str(if *is_inc { "++" } else { "--" });
        }
        StmtKind::Decl(_) => out.push_str("/* decl */"),
        StmtKind::Go(e) => {
            out.push_str("go ");
            write_expr(out, e);
        }
        StmtKind::Defer(e) => {
            out.push_str("defer ");
            write_expr(out, e);
        }
        StmtKind::If { init, cond, body, els } => {
            out.push_str("if ");
            if let Some(init) = init {
                write_stmt(out, init, 0);
                out.push_str("; ");
            }
            write_expr(out, cond);
            out.push_str(" {\n");
            for stmt in body {
                write_stmt(out, stmt, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
            if let Some(els) = els {
                out.push_str(" else ");
                match &els.kind {
                    StmtKind::Block(_) | StmtKind::If { .. } => {
                        let mut tail = String::new();
                        write_stmt(&mut tail, els, depth);
                        out.push_str(tail.trim_start());
                    }
                    _ => write_stmt(out, els, 0),
                }
            }
        }
        StmtKind::For { init, cond, post, body } => {
            out.push_str("for ");
            if init.is_some() || post.is_some() {
                if let Some(init) = init {
                    write_stmt(out, init, 0);
                }
                out.push_str("; ");
                if let Some(cond) = cond {
                    write_expr(out, cond);
                }
                out.push_str("; ");
                if let Some(post) = post {
                    write_stmt(out, post, 0);
                }
                out.push(' ');
            } else if let Some(cond) = cond {
                write_expr(out, cond);
                out.push(' ');
            }
            out.push_str("{\n");
            for stmt in body {
                write_stmt(out, stmt, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        StmtKind::Range { key, value, define, x, body } => {
            out.push_str("for ");
            if let Some(key) = key {
                write_expr(out, key);
                if let Some(value) = value {
                    out.push_str(", ");
                    write_expr(out, value);
                }
                out.push_str(if *define { " := " } else { " = " });
            }
            out.push_str("range ");
            write_expr(out, x);
            out.push_str(" {\n");
            for stmt in body {
                write_stmt(out, stmt, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        StmtKind::Switch { init, tag, cases } => {
            out.push_str("switch ");
            if let Some(init) = init {
                write_stmt(out, init, 0);
                out.push_str("; ");
            }
            if let Some(tag) = tag {
                write_expr(out, tag);
                out.push(' ');
            }
            out.push_str("{\n");
            write_case_clauses(out, cases, depth + 1);
            indent(out, depth);
            out.push('}');
        }
        StmtKind::TypeSwitch { init, assign, x, cases } => {
            out.push_str("switch ");
            if let Some(init) = init {
                write_stmt(out, init, 0);
                out.push_str("; ");
            }
            if let Some(name) = assign {
                let _ = write!(out, "{} := ", name.name);
            }
            write_expr(out, x);
            out.push_str(".(type) {\n");
            write_case_clauses(out, cases, depth + 1);
            indent(out, depth);
            out.push('}');
        }
        StmtKind::Select { comms } => {
            out.push_str("select {\n");
            write_comm_clauses(out, comms, depth + 1);
            indent(out, depth);
            out.push('}');
        }
        StmtKind::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objlang::parse_expr_only;

    fn roundtrip_shape(src: &str) -> String {
        let e = parse_expr_only(src).unwrap();
        print_expr(&e)
    }

    #[test]
    fn prints_a_call() {
        assert_eq!(roundtrip_shape("fmt.Println(1, 2)"), "fmt.Println(1, 2)");
    }

    #[test]
    fn prints_binary_expression() {
        assert_eq!(roundtrip_shape("a + b*c"), "a + b * c");
    }

    #[test]
    fn prints_index_and_selector() {
        assert_eq!(roundtrip_shape("a.b[0]"), "a.b[0]");
    }
}

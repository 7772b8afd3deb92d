//! AST types for the object language: a statically typed, C-family language
//! with packages, lexical scopes, and a typed expression grammar.
//!
//! Design goals:
//! - Fully recursive: every expression is a real node with child nodes, not
//!   a pre-collected shape, because the unifier (`unifier.rs`) recurses into
//!   sub-expressions componentwise.
//! - Positions are plain byte offsets (`Pos`) with a sentinel `NO_POS` used
//!   by the substituter for freshly synthesised fragments.
//! - Every node type derives `Clone` so the binding table (`unifier.rs`) can
//!   hold owned snapshots restored during backtracking (`listmatcher.rs`).

#![allow(dead_code)]

use std::fmt;

// ── Position ─────────────────────────────────────────────────────────────────

/// Byte offset of a token in the source file (1-indexed, like most
/// line/col reporting). `NO_POS` marks a synthesised node that has not yet
/// been assigned a real position (see `substitute::scrub_positions`).
pub type Pos = u32;

pub const NO_POS: Pos = 0;

/// Every node reports where it starts and where it ends.
pub trait Spanned {
    fn pos(&self) -> Pos;
    fn end(&self) -> Pos;
}

// ── Identifiers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Spanned for Ident {
    fn pos(&self) -> Pos {
        self.pos
    }
    fn end(&self) -> Pos {
        self.pos + self.name.len() as Pos
    }
}

// ── Operators / tokens ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Land,
    Lor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Xor,
    Recv, // `<-ch`
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,    // `=`
    Define,    // `:=`
    AddAssign, // `+=`
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Send,
    Recv,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicLitKind {
    Int,
    Float,
    String,
    Char,
    Bool,
    Nil,
}

// ── Expressions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Expr {
    pub pos: Pos,
    pub end: Pos,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(Ident),
    BasicLit {
        kind: BasicLitKind,
        value: String,
    },
    /// `T{Elts...}` — composite literal. `typ` is `None` for an elided type
    /// (e.g. nested literals inside an outer composite literal).
    CompositeLit {
        typ: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    /// `key: value` inside a composite literal.
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        typ: Box<Expr>, // FuncType
        body: Vec<Stmt>,
    },
    /// `x.sel`
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    /// `x[index]`
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    /// `x[lo:hi:max]`
    Slice {
        x: Box<Expr>,
        lo: Option<Box<Expr>>,
        hi: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`
    TypeAssert {
        x: Box<Expr>,
        typ: Option<Box<Expr>>,
    },
    /// `fun(args...)`. `has_ellipsis` records whether the call used `...`
    /// to spread the final argument; the unifier compares it as a plain
    /// equality check rather than componentwise structure.
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        has_ellipsis: bool,
    },
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
    },
    Binary {
        op: BinOp,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    Paren(Box<Expr>),

    // ── types (the object language reuses the expression grammar for types) ──
    ArrayType {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    StructType {
        fields: Vec<Field>,
    },
    InterfaceType {
        methods: Vec<Field>,
    },
    FuncType {
        params: Vec<Field>,
        results: Vec<Field>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
}

// A wildcard (`$name`, `$*name`, `$_`, `$*_`) is not a distinct `ExprKind` —
// the pattern parser (`patternsrc.rs`) encodes it as an ordinary
// `ExprKind::Ident`/`Ident` whose name is the wire-format text produced by
// `wildcard::encode`. This lets a wildcard occupy any position an ordinary
// identifier can (bare expression, identifier-list element, field name),
// and keeps the unifier's wildcard handling in one place (`unifier.rs`).

impl Spanned for Expr {
    fn pos(&self) -> Pos {
        self.pos
    }
    fn end(&self) -> Pos {
        self.end
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub typ: Expr,
}

// ── Statements ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Stmt {
    pub pos: Pos,
    pub end: Pos,
    pub kind: StmtKind,
}

impl Spanned for Stmt {
    fn pos(&self) -> Pos {
        self.pos
    }
    fn end(&self) -> Pos {
        self.end
    }
}

#[derive(Debug, Clone)]
pub struct CommClause {
    /// The send/receive statement, or `None` for the `default:` clause.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct CaseClause {
    /// Empty means the `default:` clause.
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Expr(Expr),
    Assign {
        op: AssignOp,
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
    },
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        is_inc: bool,
    },
    Decl(Decl),
    Go(Expr),
    Defer(Expr),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Vec<Stmt>,
        els: Option<Box<Stmt>>, // Block or another If
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        cases: Vec<CaseClause>,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        /// `name := x.(type)` binding, if present.
        assign: Option<Ident>,
        x: Expr,
        cases: Vec<CaseClause>,
    },
    Select {
        comms: Vec<CommClause>,
    },
    /// A statement the parser could not classify further.
    Empty,
}

// ── Declarations / specs ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub recv: Option<Field>,
    pub typ: Expr, // FuncType
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import {
        name: Option<Ident>,
        path: String,
        pos: Pos,
    },
    Value {
        names: Vec<Ident>,
        typ: Option<Expr>,
        values: Vec<Expr>,
        pos: Pos,
    },
    Type {
        name: Ident,
        typ: Expr,
        pos: Pos,
    },
}

impl Spanned for Spec {
    fn pos(&self) -> Pos {
        match self {
            Spec::Import { pos, .. } | Spec::Value { pos, .. } | Spec::Type { pos, .. } => *pos,
        }
    }
    fn end(&self) -> Pos {
        match self {
            Spec::Import { pos, path, .. } => pos + path.len() as Pos + 2,
            Spec::Value { values, names, .. } => values
                .last()
                .map(|v| v.end)
                .or_else(|| names.last().map(|n| n.end()))
                .unwrap_or(NO_POS),
            Spec::Type { typ, .. } => typ.end,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Decl {
    Import(Vec<Spec>),
    Var(Vec<Spec>),
    Const(Vec<Spec>),
    Type(Vec<Spec>),
    Func(Box<FuncDecl>),
}

impl Spanned for Decl {
    fn pos(&self) -> Pos {
        match self {
            Decl::Import(s) | Decl::Var(s) | Decl::Const(s) | Decl::Type(s) => {
                s.first().map(Spanned::pos).unwrap_or(NO_POS)
            }
            Decl::Func(f) => f.name.pos(),
        }
    }
    fn end(&self) -> Pos {
        match self {
            Decl::Import(s) | Decl::Var(s) | Decl::Const(s) | Decl::Type(s) => {
                s.last().map(Spanned::end).unwrap_or(NO_POS)
            }
            Decl::Func(f) => f
                .body
                .as_ref()
                .and_then(|b| b.last())
                .map(Spanned::end)
                .unwrap_or(f.typ.end),
        }
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct File {
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl Spanned for File {
    fn pos(&self) -> Pos {
        self.package.pos()
    }
    fn end(&self) -> Pos {
        self.decls
            .last()
            .map(Spanned::end)
            .unwrap_or(self.package.end())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

//! Uniform node view shared by the walker, unifier and list matcher.
//!
//! The object language's AST (`ast.rs`) is a family of distinct Rust types
//! (`Expr`, `Stmt`, `Decl`, `Spec`, `Ident`) plus four list-shaped child
//! positions. `Node` erases that distinction behind one enum so the walker,
//! unifier and list matcher can treat "a node" uniformly, and so that a
//! `NodeList` can itself be accepted as a first-class node (a bare wildcard
//! can bind to a whole list).

use crate::ast::{Decl, Expr, File, Ident, Pos, Spanned, Spec, Stmt};

/// A homogeneous slice of sibling nodes embedded inside a parent.
#[derive(Debug, Clone, Copy)]
pub enum NodeList<'a> {
    Expr(&'a [Expr]),
    Stmt(&'a [Stmt]),
    Ident(&'a [Ident]),
    Spec(&'a [Spec]),
}

impl<'a> NodeList<'a> {
    pub fn len(&self) -> usize {
        match self {
            NodeList::Expr(s) => s.len(),
            NodeList::Stmt(s) => s.len(),
            NodeList::Ident(s) => s.len(),
            NodeList::Spec(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, i: usize) -> Node<'a> {
        match self {
            NodeList::Expr(s) => Node::Expr(&s[i]),
            NodeList::Stmt(s) => Node::Stmt(&s[i]),
            NodeList::Ident(s) => Node::Ident(&s[i]),
            NodeList::Spec(s) => Node::Spec(&s[i]),
        }
    }

    pub fn slice(&self, lo: usize, hi: usize) -> NodeList<'a> {
        match self {
            NodeList::Expr(s) => NodeList::Expr(&s[lo..hi]),
            NodeList::Stmt(s) => NodeList::Stmt(&s[lo..hi]),
            NodeList::Ident(s) => NodeList::Ident(&s[lo..hi]),
            NodeList::Spec(s) => NodeList::Spec(&s[lo..hi]),
        }
    }

    /// Species tag used to reject cross-species rebinding of the same
    /// variadic wildcard name: a wildcard already bound against one species
    /// never matches against a different species later (see DESIGN.md).
    pub fn species(&self) -> ListSpecies {
        match self {
            NodeList::Expr(_) => ListSpecies::Expr,
            NodeList::Stmt(_) => ListSpecies::Stmt,
            NodeList::Ident(_) => ListSpecies::Ident,
            NodeList::Spec(_) => ListSpecies::Spec,
        }
    }

    /// Synthetic `pos` derived from the first element; `NO_POS` when empty.
    pub fn pos(&self) -> Pos {
        if self.is_empty() {
            crate::ast::NO_POS
        } else {
            self.at(0).pos()
        }
    }

    /// Synthetic `end` derived from the last element; `NO_POS` when empty.
    pub fn end(&self) -> Pos {
        let n = self.len();
        if n == 0 {
            crate::ast::NO_POS
        } else {
            self.at(n - 1).end()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSpecies {
    Expr,
    Stmt,
    Ident,
    Spec,
}

/// Any node the unifier can be asked to match, including a list view.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a File),
    Decl(&'a Decl),
    Spec(&'a Spec),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Ident(&'a Ident),
    List(NodeList<'a>),
}

impl<'a> Node<'a> {
    pub fn pos(&self) -> Pos {
        match self {
            Node::File(n) => n.pos(),
            Node::Decl(n) => n.pos(),
            Node::Spec(n) => n.pos(),
            Node::Stmt(n) => n.pos(),
            Node::Expr(n) => n.pos(),
            Node::Ident(n) => n.pos(),
            Node::List(l) => l.pos(),
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Node::File(n) => n.end(),
            Node::Decl(n) => n.end(),
            Node::Spec(n) => n.end(),
            Node::Stmt(n) => n.end(),
            Node::Expr(n) => n.end(),
            Node::Ident(n) => n.end(),
            Node::List(l) => l.end(),
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match self {
            Node::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&'a Ident> {
        match self {
            Node::Ident(i) => Some(i),
            Node::Expr(e) => match &e.kind {
                crate::ast::ExprKind::Ident(id) => Some(id),
                _ => None,
            },
            _ => None,
        }
    }
}

/// An owned snapshot of a matched node or node list, stored in the binding
/// table (`unifier::Bindings`) so it survives past the borrow of whichever
/// tree produced it, and so it can be spliced into a replacement fragment
/// by the substituter (`substitute.rs`).
#[derive(Debug, Clone)]
pub enum BoundValue {
    Expr(Expr),
    Stmt(Stmt),
    Ident(Ident),
    ExprList(Vec<Expr>),
    StmtList(Vec<Stmt>),
    IdentList(Vec<Ident>),
    SpecList(Vec<Spec>),
}

impl BoundValue {
    pub fn from_node(node: &Node<'_>) -> Option<BoundValue> {
        match node {
            Node::Expr(e) => Some(BoundValue::Expr((*e).clone())),
            Node::Stmt(s) => Some(BoundValue::Stmt((*s).clone())),
            Node::Ident(i) => Some(BoundValue::Ident((*i).clone())),
            Node::List(NodeList::Expr(s)) => Some(BoundValue::ExprList(s.to_vec())),
            Node::List(NodeList::Stmt(s)) => Some(BoundValue::StmtList(s.to_vec())),
            Node::List(NodeList::Ident(s)) => Some(BoundValue::IdentList(s.to_vec())),
            Node::List(NodeList::Spec(s)) => Some(BoundValue::SpecList(s.to_vec())),
            Node::File(_) | Node::Decl(_) | Node::Spec(_) => None,
        }
    }

    /// The list species this bound value would present as, if rebound as a
    /// variadic wildcard. `None` for non-list bindings.
    pub fn list_species(&self) -> Option<ListSpecies> {
        match self {
            BoundValue::ExprList(_) => Some(ListSpecies::Expr),
            BoundValue::StmtList(_) => Some(ListSpecies::Stmt),
            BoundValue::IdentList(_) => Some(ListSpecies::Ident),
            BoundValue::SpecList(_) => Some(ListSpecies::Spec),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Node<'_> {
        match self {
            BoundValue::Expr(e) => Node::Expr(e),
            BoundValue::Stmt(s) => Node::Stmt(s),
            BoundValue::Ident(i) => Node::Ident(i),
            BoundValue::ExprList(s) => Node::List(NodeList::Expr(s)),
            BoundValue::StmtList(s) => Node::List(NodeList::Stmt(s)),
            BoundValue::IdentList(s) => Node::List(NodeList::Ident(s)),
            BoundValue::SpecList(s) => Node::List(NodeList::Spec(s)),
        }
    }
}

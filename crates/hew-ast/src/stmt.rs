// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::expr::Expr;
use crate::pattern::Pattern;
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// `{ stmts }`; the span includes both braces.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `let pattern: T = init;`
    Let {
        pattern: Pattern,
        ty: Option<TypeExpr>,
        init: Expr,
    },
    /// `var name: T = init;`
    Var {
        name: String,
        ty: Option<TypeExpr>,
        init: Expr,
    },
    /// `target = value;`, `target += value;`, ...
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    /// `'label: for await pattern in iter { }`
    For {
        label: Option<String>,
        is_await: bool,
        pattern: Pattern,
        iter: Expr,
        body: Block,
    },
    /// `'label: while cond { }`
    While {
        label: Option<String>,
        cond: Expr,
        body: Block,
    },
    /// `'label: loop { }`
    Loop {
        label: Option<String>,
        body: Block,
    },
    /// `break 'label value;`
    Break {
        label: Option<String>,
        value: Option<Expr>,
    },
    /// `continue 'label;`
    Continue { label: Option<String> },
    /// `return value;`
    Return(Option<Expr>),
    /// Bare `{ }` in statement position
    Block(Block),
    /// Expression statement; `if`/`match` at statement level land here too
    Expr { expr: Expr, has_semi: bool },
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl Block {
    /// Value-producing trailing expression (no `;`), if any.
    pub fn tail(&self) -> Option<&Expr> {
        match self.stmts.last().map(|s| &s.kind) {
            Some(StmtKind::Expr { expr, has_semi: false }) => Some(expr),
            _ => None,
        }
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::pattern::Pattern;
use crate::stmt::Block;
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal
    Int(u64),
    /// Float literal
    Float(f64),
    /// String literal (escapes decoded)
    String(String),
    /// `f"hello {name}"`
    Interpolated(Vec<StringPart>),
    /// Boolean literal
    Bool(bool),
    /// `None`
    None,
    /// `250ms`, `5s`
    Duration(Duration),
    /// Identifier
    Ident(String),
    /// `self`
    SelfValue,
    /// `Color::Red`, `std::io::stdin`
    Path(Vec<String>),
    /// Binary operation, including `<-` sends
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a .. b`, `a ..= b`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    /// Prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `await fut`
    Await(Box<Expr>),
    /// Function call
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `obj.method(args)`
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `obj.field` or `tuple.0`
    Field {
        object: Box<Expr>,
        field: String,
    },
    /// `obj[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Postfix `?`
    Try(Box<Expr>),
    /// `Point { x: 1, y }`
    StructLit {
        path: Vec<String>,
        fields: Vec<FieldInit>,
    },
    /// `[1, 2, 3]`
    Array(Vec<Expr>),
    /// `[value; count]`
    ArrayRepeat {
        value: Box<Expr>,
        count: Box<Expr>,
    },
    /// `(a, b)` and `()`
    Tuple(Vec<Expr>),
    /// `(a)`
    Paren(Box<Expr>),
    /// `{ stmts }`
    Block(Block),
    /// `if` in both statement and expression position
    If {
        cond: Box<Expr>,
        then_branch: Block,
        /// Either another `If` or a `Block`
        else_branch: Option<Box<Expr>>,
    },
    /// `match` in both statement and expression position
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    /// `move (a, b: i32) -> i32 => body`
    Lambda(Lambda),
    /// `spawn Counter(0)` or `spawn (msg) => { ... }`
    Spawn(SpawnTarget),
    /// `select { ... }` / `race { ... }`
    Select {
        kind: SelectKind,
        arms: Vec<SelectArm>,
        timeout: Option<Box<TimeoutArm>>,
    },
    /// `join { a, b, c }`
    Join(Vec<Expr>),
    /// `scope { ... }`
    Scope(Block),
    /// `scope.launch { ... }`
    ScopeLaunch(Block),
    /// `scope.cancel()`
    ScopeCancel,
    /// `scope.is_cancelled()`
    ScopeIsCancelled,
    /// `cooperate`
    Cooperate,
    /// `yield value`
    Yield(Box<Expr>),
    /// `try { } catch err { }`
    TryCatch {
        body: Block,
        catch: Option<CatchClause>,
    },
    /// `unsafe { }`
    Unsafe(Block),
}

/// Literal text or a spliced expression inside an interpolated string.
#[derive(Debug, Clone)]
pub enum StringPart {
    Text(String),
    Expr(Expr),
}

/// A field initializer in a struct literal.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Duration literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub value: u64,
    pub unit: DurationUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
}

impl DurationUnit {
    pub fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "ns" => DurationUnit::Nanos,
            "us" => DurationUnit::Micros,
            "ms" => DurationUnit::Millis,
            "s" => DurationUnit::Seconds,
            "m" => DurationUnit::Minutes,
            "h" => DurationUnit::Hours,
            _ => return None,
        })
    }

    pub fn nanos_per_unit(self) -> u64 {
        match self {
            DurationUnit::Nanos => 1,
            DurationUnit::Micros => 1_000,
            DurationUnit::Millis => 1_000_000,
            DurationUnit::Seconds => 1_000_000_000,
            DurationUnit::Minutes => 60_000_000_000,
            DurationUnit::Hours => 3_600_000_000_000,
        }
    }
}

impl Duration {
    /// Total length in nanoseconds, `None` on overflow.
    pub fn as_nanos(&self) -> Option<u64> {
        self.value.checked_mul(self.unit.nanos_per_unit())
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Logical (`&&`/`and`, `||`/`or`)
    And,
    Or,
    /// `target <- message`
    Send,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

/// A match arm.
#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

/// A lambda parameter (`name` or `name: Type`).
#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub is_move: bool,
    pub params: Vec<LambdaParam>,
    pub ret_ty: Option<TypeExpr>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone)]
pub enum SpawnTarget {
    /// `spawn Worker<T>(args)`
    Actor {
        name: String,
        type_args: Vec<TypeExpr>,
        args: Vec<Expr>,
    },
    /// `spawn (msg: Msg) => { ... }`
    Lambda(Lambda),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    Select,
    Race,
}

/// `binding from source => body`
#[derive(Debug, Clone)]
pub struct SelectArm {
    pub binding: String,
    pub source: Expr,
    pub body: Expr,
    pub span: Span,
}

/// `after duration => body`
#[derive(Debug, Clone)]
pub struct TimeoutArm {
    pub duration: Expr,
    pub body: Expr,
    pub span: Span,
}

/// `catch [binding] { handler }`
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub binding: Option<String>,
    pub handler: Block,
    pub span: Span,
}

impl Expr {
    /// Expressions ending in a block; these may stand as statements without `;`.
    pub fn is_block_like(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Block(_)
                | ExprKind::If { .. }
                | ExprKind::Match { .. }
                | ExprKind::Select { .. }
                | ExprKind::Join(_)
                | ExprKind::Scope(_)
                | ExprKind::ScopeLaunch(_)
                | ExprKind::TryCatch { .. }
                | ExprKind::Unsafe(_)
        )
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern AST nodes.

use crate::expr::Expr;
use crate::{NodeId, Span};

/// A destructuring pattern (`let`, parameters, match arms).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: NodeId,
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// `_`
    Wildcard,
    /// `name`
    Ident(String),
    /// `Color::Red`
    Path(Vec<String>),
    /// Integer, float, string, bool or `None` literal (negative numbers allowed)
    Literal(Box<Expr>),
    /// `(a, b)`
    Tuple(Vec<Pattern>),
    /// `Point { x, y: 0 }`
    Struct {
        path: Vec<String>,
        fields: Vec<FieldPattern>,
    },
    /// `Some(x)`, `Shape::Circle(r)`
    Constructor {
        path: Vec<String>,
        args: Vec<Pattern>,
    },
    /// `a | b | c`, always flattened
    Or(Vec<Pattern>),
}

/// `field: pattern` inside a struct pattern; `pattern` is `None` for shorthand.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: String,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

impl Pattern {
    /// Names bound by this pattern, in source order.
    pub fn bindings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            PatternKind::Ident(name) => out.push(name),
            PatternKind::Tuple(items) | PatternKind::Constructor { args: items, .. } => {
                for item in items {
                    item.collect_bindings(out);
                }
            }
            PatternKind::Struct { fields, .. } => {
                for field in fields {
                    match &field.pattern {
                        Some(p) => p.collect_bindings(out),
                        None => out.push(&field.name),
                    }
                }
            }
            // Alternatives bind the same names; the first is representative.
            PatternKind::Or(alts) => {
                if let Some(first) = alts.first() {
                    first.collect_bindings(out);
                }
            }
            PatternKind::Wildcard | PatternKind::Path(_) | PatternKind::Literal(_) => {}
        }
    }
}

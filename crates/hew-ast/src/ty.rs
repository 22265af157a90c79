// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expression AST nodes.

use crate::{NodeId, Span};

/// A type as written in source.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub id: NodeId,
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// `i32`, `Vec<T>`, `net::Socket` - primitives are named types too
    Named {
        path: Vec<String>,
        args: Vec<TypeExpr>,
    },
    /// `()`
    Unit,
    /// `(A, B)`
    Tuple(Vec<TypeExpr>),
    /// `[T; N]`
    Array {
        elem: Box<TypeExpr>,
        len: u64,
    },
    /// `[T]`
    Slice(Box<TypeExpr>),
    /// `fn(A, B) -> R`
    Function {
        params: Vec<TypeExpr>,
        ret: Option<Box<TypeExpr>>,
    },
    /// `*const T`, `*mut T`, `*T`
    Pointer {
        mutability: Option<PointerMutability>,
        pointee: Box<TypeExpr>,
    },
    /// `dyn Display` or `dyn (Read + Write)`
    TraitObject(Vec<TraitBound>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMutability {
    Const,
    Mut,
}

/// `Name<Args>` in a bound list.
#[derive(Debug, Clone)]
pub struct TraitBound {
    pub name: String,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

/// `<T: Bound + Other, U>` entry.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TraitBound>,
    pub span: Span,
}

/// `where T: Bound + Other` entry.
#[derive(Debug, Clone)]
pub struct WherePredicate {
    pub ty: TypeExpr,
    pub bounds: Vec<TraitBound>,
    pub span: Span,
}

impl TypeExpr {
    /// Last path segment for named types (`Vec` for `std::Vec<T>`).
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Named { path, .. } => path.last().map(String::as_str),
            _ => None,
        }
    }
}

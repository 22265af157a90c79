// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for the Hew language.
//!
//! This crate defines the tokens and tree nodes shared between the lexer,
//! the parser, and diagnostics rendering. Every node owns its children and
//! carries a [`Span`] covering exactly its tokens.

pub mod span;
pub mod token;
pub mod ty;
pub mod pattern;
pub mod expr;
pub mod stmt;
pub mod item;

pub use span::{Span, LineMap};

/// Unique identifier for AST nodes.
///
/// Assigned in parse order; later passes key side tables by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

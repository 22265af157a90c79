// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the Hew language.
//!
//! Tokenizes source code into a lazy stream of tokens for the parser.
//! Whitespace and comments are kept as trivia tokens.

mod lexer;

pub use lexer::{tokenize, LexError, LexErrorKind, LexResult, Lexer};

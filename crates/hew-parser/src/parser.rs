// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.
//!
//! Grammar rules live in the child modules; this file holds token
//! navigation, speculation, nesting limits and error recovery.

mod expr;
mod item;
mod pattern;
mod stmt;
mod ty;

use hew_ast::token::{Keyword, Token, TokenKind};
use hew_ast::{NodeId, Span};
use tracing::debug;

use crate::context::ParseContext;
use crate::options::ParseOptions;

/// The parser for Hew source code.
///
/// Works on the significant tokens only. Whitespace and comments are split
/// off at construction and handed back by [`Parser::take_trivia`].
pub struct Parser {
    /// Significant tokens, always terminated by `Eof`.
    tokens: Vec<Token>,
    /// `newline_before[i]` is true when trivia between tokens `i - 1` and `i`
    /// contains a line break.
    newline_before: Vec<bool>,
    trivia: Vec<Token>,
    pos: usize,
    ctx: ParseContext,
    depth: usize,
    options: ParseOptions,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
    /// Set once the error budget is spent.
    halted: bool,
}

/// Parser position saved before a speculative parse.
#[derive(Clone, Copy)]
struct Snapshot {
    pos: usize,
    errors: usize,
    next_node_id: u32,
    ctx: ParseContext,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: ParseOptions) -> Self {
        let mut significant = Vec::with_capacity(tokens.len());
        let mut newline_before = Vec::with_capacity(tokens.len());
        let mut trivia = Vec::new();
        let mut saw_newline = false;
        let mut end = 0;

        for token in tokens {
            end = token.span.end;
            if token.is_trivia() {
                saw_newline |= token.text.contains('\n');
                trivia.push(token);
            } else {
                newline_before.push(saw_newline);
                saw_newline = false;
                significant.push(token);
            }
        }
        if !matches!(significant.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            newline_before.push(saw_newline);
            significant.push(Token::new(TokenKind::Eof, "", Span::empty(end)));
        }

        Self {
            tokens: significant,
            newline_before,
            trivia,
            pos: 0,
            ctx: ParseContext::NONE,
            depth: 0,
            options,
            errors: Vec::new(),
            next_node_id: 0,
            halted: false,
        }
    }

    /// Errors recorded so far, in the order they were found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Whitespace, comments and unknown bytes, in source order.
    pub fn take_trivia(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.trivia)
    }

    /// True once every significant token has been consumed.
    pub fn at_eof(&self) -> bool {
        self.at_end()
    }

    pub(crate) fn expected_end_of_input(&self) -> ParseError {
        self.error_expected("end of input")
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    // =========================================================================
    // Error Handling
    // =========================================================================

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        if self.halted {
            return false;
        }
        self.errors.push(error);
        if self.errors.len() >= self.options.max_errors {
            debug!(max_errors = self.options.max_errors, "error budget spent, skipping to end");
            self.halted = true;
        }
        !self.halted
    }

    /// Jump to end of input once the error budget is spent.
    fn skip_to_end(&mut self) {
        self.pos = self.tokens.len() - 1;
    }

    /// Skip to next item after error.
    fn synchronize(&mut self) {
        let start = self.pos;
        let mut brace_depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            break;
                        }
                    }
                }
                TokenKind::Semi if brace_depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Kw(kw) if brace_depth == 0 && kw.starts_item() => break,
                _ => {
                    self.advance();
                }
            }
        }
        debug!(skipped = self.pos - start, resume = %self.current().text, "synchronized to item");
    }

    /// Skip to the next member of an item body.
    ///
    /// Consumes a `;` or a braced group at the body's level; stops before
    /// the body's closing `}` or a member keyword.
    fn synchronize_member(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    let closes_brace = self.check(&TokenKind::RBrace);
                    if depth == 0 {
                        if closes_brace {
                            break;
                        }
                    } else {
                        depth -= 1;
                        if depth == 0 && closes_brace {
                            self.advance();
                            break;
                        }
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Kw(kw) if depth == 0 && kw.starts_member() => break,
                _ => {}
            }
            self.advance();
        }
        debug!(skipped = self.pos - start, "synchronized to member");
    }

    /// `{ member* }` for item bodies. A failing member is recorded and
    /// skipped; the rest of the body still parses.
    fn parse_members(&mut self, mut member: impl FnMut(&mut Self) -> Result<(), ParseError>) -> Result<(), ParseError> {
        self.expect(&TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.halted {
                self.skip_to_closing_brace();
                break;
            }
            let before = self.pos;
            if let Err(e) = member(self) {
                if !self.record_error(e) {
                    self.skip_to_closing_brace();
                    break;
                }
                self.synchronize_member();
                if self.pos == before {
                    self.advance();
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(())
    }

    /// Synchronize within a block - skip to the next statement boundary.
    ///
    /// Consumes a `;` at the current nesting level; stops before the
    /// enclosing `}` or a statement keyword.
    fn synchronize_in_block(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        if self.check(&TokenKind::RBrace) {
                            break;
                        }
                    } else {
                        depth -= 1;
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Kw(kw) if depth == 0 && kw.starts_statement() => break,
                _ => {}
            }
            self.advance();
        }
        debug!(skipped = self.pos - start, "synchronized within block");
    }

    /// Skip to the closing brace of a block.
    fn skip_to_closing_brace(&mut self) {
        let mut depth = 1;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Error for the current token when `expected` was wanted.
    fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        // `pos` never moves past the trailing Eof.
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return its span.
    fn advance(&mut self) -> Span {
        let span = self.current().span;
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    /// Start offset of the current token.
    fn start(&self) -> usize {
        self.current().span.start
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span.end,
            None => self.current().span.start,
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn check_kw(&self, kw: Keyword) -> bool {
        matches!(self.current_kind(), TokenKind::Kw(k) if *k == kw)
    }

    /// Context-sensitive word that lexes as an identifier (`from`, `init`, ...).
    fn check_soft(&self, word: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(name) if name == word)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_kw(&mut self, kw: Keyword) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_soft(&mut self, word: &str) -> bool {
        if self.check_soft(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.display_name()))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<Span, ParseError> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kw.display_name()))
        }
    }

    fn expect_soft(&mut self, word: &str) -> Result<Span, ParseError> {
        if self.check_soft(word) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&format!("'{word}'")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(self.error_expected("a string")),
        }
    }

    fn expect_int(&mut self) -> Result<u64, ParseError> {
        match self.current_kind() {
            TokenKind::Int(n) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            _ => Err(self.error_expected("an integer")),
        }
    }

    /// Statement terminator.
    ///
    /// A `;` left out before a line break, a `}` or end of input is recorded
    /// once and treated as present so parsing can carry on.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.match_token(&TokenKind::Semi) {
            return Ok(());
        }
        let at_boundary = self.newline_before.get(self.pos).copied().unwrap_or(false)
            || self.check(&TokenKind::RBrace)
            || self.at_end();
        if !at_boundary {
            return Err(self.error_expected("';'"));
        }
        let error = ParseError::missing(self.prev_end(), self.current_kind());
        debug!(offset = self.prev_end(), "inserted missing ';'");
        self.record_error(error);
        Ok(())
    }

    // =========================================================================
    // Context, speculation and nesting
    // =========================================================================

    /// Run `f` with `ctx` in effect, restoring the previous context after.
    fn with_context<T>(
        &mut self,
        ctx: ParseContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.ctx;
        self.ctx = ctx;
        let result = f(self);
        self.ctx = saved;
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            errors: self.errors.len(),
            next_node_id: self.next_node_id,
            ctx: self.ctx,
            depth: self.depth,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.pos = snapshot.pos;
        self.errors.truncate(snapshot.errors);
        self.next_node_id = snapshot.next_node_id;
        self.ctx = snapshot.ctx;
        self.depth = snapshot.depth;
    }

    /// Speculatively run `f`; on failure every effect is undone.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.restore(snapshot);
                None
            }
        }
    }

    /// Run `f` one nesting level deeper, failing once `max_depth` is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::too_deep(self.current().span, self.options.max_depth));
        }
        self.depth += 1;
        let result = crate::stack::ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }
}

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that cannot appear here.
    UnexpectedToken,
    /// Input ended, or a terminator was left out.
    MissingToken,
    /// Nesting exceeded the configured maximum.
    TooDeep,
    /// A clause that may appear once appeared twice.
    Duplicate,
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
    pub note: Option<String>,
}

impl ParseError {
    pub(crate) fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        let kind = if matches!(found, TokenKind::Eof) {
            ParseErrorKind::MissingToken
        } else {
            ParseErrorKind::UnexpectedToken
        };
        Self { kind, span, message, hint, note: None }
    }

    /// A `;` that was left out and has been assumed at `offset`.
    fn missing(offset: usize, found: &TokenKind) -> Self {
        Self {
            kind: ParseErrorKind::MissingToken,
            span: Span::empty(offset),
            message: format!("Expected ';' before {}", found.display_name()),
            hint: Some("end statements with ';'".to_string()),
            note: Some("inserted missing ';'".to_string()),
        }
    }

    fn too_deep(span: Span, max_depth: usize) -> Self {
        Self {
            kind: ParseErrorKind::TooDeep,
            span,
            message: format!("Nesting exceeds the limit of {max_depth} levels"),
            hint: Some("split the expression into smaller parts".to_string()),
            note: None,
        }
    }

    fn duplicate(what: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Duplicate,
            span,
            message: format!("Only one {what} is allowed"),
            hint: None,
            note: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "'{'" => format!("Expected '{{' to start block, found {}", found.display_name()),
        "'}'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '{' - missing '}'".to_string()
            } else {
                format!("Expected '}}' to close block, found {}", found.display_name())
            }
        }
        "')'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '(' - missing ')'".to_string()
            } else {
                format!("Expected ')', found {}", found.display_name())
            }
        }
        "']'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '[' - missing ']'".to_string()
            } else {
                format!("Expected ']', found {}", found.display_name())
            }
        }
        "a name" => format!("Expected name, found {}", found.display_name()),
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_lexer::tokenize;

    fn parser(src: &str) -> Parser {
        Parser::new(tokenize(src).tokens)
    }

    #[test]
    fn trivia_is_split_off() {
        let mut p = parser("let /* c */ x\n= 1;");
        let kinds: Vec<_> = p.tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(kinds.len(), 6);
        assert_eq!(kinds[5], TokenKind::Eof);
        assert_eq!(p.newline_before, vec![false, false, true, false, false, false]);
        let trivia = p.take_trivia();
        assert_eq!(trivia.len(), 5);
    }

    #[test]
    fn eof_is_appended_without_lexer() {
        let p = Parser::new(Vec::new());
        assert!(p.at_end());
        assert_eq!(p.current().span, Span::empty(0));
    }

    #[test]
    fn try_parse_restores_state() {
        let mut p = parser("a b c");
        let before = p.snapshot();
        let result: Option<()> = p.try_parse(|p| {
            p.advance();
            p.next_id();
            p.record_error(p.error_expected("x"));
            Err(p.error_expected("y"))
        });
        assert!(result.is_none());
        assert_eq!(p.pos, before.pos);
        assert_eq!(p.next_node_id, before.next_node_id);
        assert!(p.errors.is_empty());
    }

    #[test]
    fn nested_stops_at_max_depth() {
        let mut p = Parser::with_options(Vec::new(), ParseOptions::default().max_depth(2));
        let result = p.nested(|p| p.nested(|p| p.nested(|_| Ok(()))));
        let err = result.unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep);
        assert_eq!(p.depth, 0);
    }

    #[test]
    fn error_budget_halts() {
        let mut p = Parser::with_options(Vec::new(), ParseOptions::default().max_errors(2));
        let e = p.error_expected("x");
        assert!(p.record_error(e.clone()));
        assert!(!p.record_error(e.clone()));
        assert!(!p.record_error(e));
        assert_eq!(p.errors().len(), 2);
    }

    #[test]
    fn expected_messages() {
        let e = ParseError::expected("')'", &TokenKind::Eof, Span::empty(3));
        assert_eq!(e.message, "Unclosed '(' - missing ')'");
        assert_eq!(e.kind, ParseErrorKind::MissingToken);
        let e = ParseError::expected("':'", &TokenKind::Eq, Span::new(1, 2));
        assert_eq!(e.message, "Expected ':', found '='");
        assert_eq!(e.hint.as_deref(), Some("use ':' for types, '=' for values"));
    }
}

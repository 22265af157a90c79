// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement and block parsing.

use hew_ast::stmt::{AssignOp, Block, Stmt, StmtKind};
use hew_ast::token::{Keyword, TokenKind};

use super::{ParseError, Parser};
use crate::context::ParseContext;

impl Parser {
    /// Parse `{ stmts }` with error recovery inside the braces.
    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(|p| {
            let start = p.start();
            p.expect(&TokenKind::LBrace)?;
            let stmts = p.with_context(ParseContext::NONE, |p| Ok(p.parse_block_body()))?;
            p.expect(&TokenKind::RBrace)?;
            Ok(Block { stmts, span: p.span_from(start) })
        })
    }

    /// Statements up to (not including) the closing `}`.
    fn parse_block_body(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.halted {
                self.skip_to_closing_brace();
                break;
            }
            let before = self.pos;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    // Record error but stay within the block
                    if !self.record_error(e) {
                        // Too many errors - skip to closing brace
                        self.skip_to_closing_brace();
                        break;
                    }
                    self.synchronize_in_block();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        stmts
    }

    /// Parse a statement.
    pub(super) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();

        // `'outer: loop { }`
        let label = if let TokenKind::Label(name) = self.current_kind().clone() {
            self.advance();
            self.expect(&TokenKind::Colon)?;
            if !(self.check_kw(Keyword::Loop) || self.check_kw(Keyword::For) || self.check_kw(Keyword::While)) {
                return Err(self.error_expected("'loop', 'for' or 'while' after a label"));
            }
            Some(name)
        } else {
            None
        };

        let kind = match self.current_kind() {
            TokenKind::Kw(Keyword::Let) => self.parse_let()?,
            TokenKind::Kw(Keyword::Var) => self.parse_var()?,
            TokenKind::Kw(Keyword::For) => self.parse_for(label)?,
            TokenKind::Kw(Keyword::While) => {
                self.advance();
                let cond = self.parse_condition()?;
                let body = self.parse_block()?;
                StmtKind::While { label, cond, body }
            }
            TokenKind::Kw(Keyword::Loop) => {
                self.advance();
                let body = self.parse_block()?;
                StmtKind::Loop { label, body }
            }
            TokenKind::Kw(Keyword::Break) => {
                self.advance();
                let label = self.parse_opt_label();
                let value = if self.at_stmt_end() { None } else { Some(self.parse_expr()?) };
                self.expect_semi()?;
                StmtKind::Break { label, value }
            }
            TokenKind::Kw(Keyword::Continue) => {
                self.advance();
                let label = self.parse_opt_label();
                self.expect_semi()?;
                StmtKind::Continue { label }
            }
            TokenKind::Kw(Keyword::Return) => {
                self.advance();
                let value = if self.at_stmt_end() { None } else { Some(self.parse_expr()?) };
                self.expect_semi()?;
                StmtKind::Return(value)
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            _ if self.at_block_like_expr() => {
                let expr = self.parse_block_like_expr()?;
                let has_semi = self.match_token(&TokenKind::Semi);
                StmtKind::Expr { expr, has_semi }
            }
            _ => self.parse_expr_stmt()?,
        };

        Ok(Stmt { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `let pattern [: T] = init;`
    fn parse_let(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_kw(Keyword::Let)?;
        let pattern = self.parse_pattern()?;
        let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(&TokenKind::Eq)?;
        let init = self.parse_expr()?;
        self.expect_semi()?;
        Ok(StmtKind::Let { pattern, ty, init })
    }

    /// `var name [: T] = init;`
    fn parse_var(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_kw(Keyword::Var)?;
        let name = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(&TokenKind::Eq)?;
        let init = self.parse_expr()?;
        self.expect_semi()?;
        Ok(StmtKind::Var { name, ty, init })
    }

    /// `for [await] pattern in iter { }`
    fn parse_for(&mut self, label: Option<String>) -> Result<StmtKind, ParseError> {
        self.expect_kw(Keyword::For)?;
        let is_await = self.match_kw(Keyword::Await);
        let pattern = self.parse_pattern()?;
        self.expect_kw(Keyword::In)?;
        let iter = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(StmtKind::For { label, is_await, pattern, iter, body })
    }

    /// Expression statement or assignment.
    fn parse_expr_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let expr = self.parse_expr()?;

        if let Some(op) = self.assign_op() {
            self.advance();
            let value = self.parse_expr()?;
            self.expect_semi()?;
            return Ok(StmtKind::Assign { target: expr, op, value });
        }

        if self.match_token(&TokenKind::Semi) {
            return Ok(StmtKind::Expr { expr, has_semi: true });
        }
        // Tail expression, or an expression that already ends in a block.
        if self.check(&TokenKind::RBrace) || expr.is_block_like() {
            return Ok(StmtKind::Expr { expr, has_semi: false });
        }
        self.expect_semi()?;
        Ok(StmtKind::Expr { expr, has_semi: true })
    }

    fn assign_op(&self) -> Option<AssignOp> {
        Some(match self.current_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::ModAssign,
            _ => return None,
        })
    }

    fn parse_opt_label(&mut self) -> Option<String> {
        match self.current_kind().clone() {
            TokenKind::Label(name) => {
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// Nothing more belongs to the statement: `;`, `}` or end of input.
    fn at_stmt_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof)
    }
}

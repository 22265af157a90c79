// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression parsing.
//!
//! Binary operators use Pratt parsing with the binding powers below; higher
//! binds tighter. Left-associative operators bind their right side one step
//! tighter, right-associative ones (`<-`, ranges) at the same power.

use hew_ast::expr::{
    BinOp, CatchClause, Duration, DurationUnit, Expr, ExprKind, FieldInit, Lambda, LambdaParam, MatchArm,
    SelectArm, SelectKind, SpawnTarget, StringPart, TimeoutArm, UnaryOp,
};
use hew_ast::token::{FStringPart, Keyword, Token, TokenKind};
use hew_ast::ty::TypeExpr;
use hew_ast::Span;
use tracing::trace;

use super::{ParseError, Parser};
use crate::context::ParseContext;

const SEND: u8 = 1;
const OR: u8 = 3;
const AND: u8 = 5;
const EQUALITY: u8 = 7;
const COMPARISON: u8 = 9;
const RANGE: u8 = 11;
const ADDITIVE: u8 = 13;
const MULTIPLICATIVE: u8 = 15;
const UNARY: u8 = 17;
const POSTFIX: u8 = 19;
const FIELD: u8 = 20;

impl Parser {
    /// Parse an expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    /// Parse an expression whose operators all bind at least `min_bp`.
    pub fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_expr_bp_inner(min_bp))
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp() {
                if bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs)?;
                continue;
            }

            let Some((l_bp, r_bp)) = self.infix_bp() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            let op = self.current_kind().clone();
            self.advance();
            let rhs = self.parse_expr_bp(r_bp)?;
            let span = lhs.span.to(rhs.span);

            let kind = match op {
                TokenKind::DotDot | TokenKind::DotDotEq => ExprKind::Range {
                    start: Box::new(lhs),
                    end: Box::new(rhs),
                    inclusive: matches!(op, TokenKind::DotDotEq),
                },
                _ => ExprKind::Binary { op: binop(&op), left: Box::new(lhs), right: Box::new(rhs) },
            };
            lhs = Expr { id: self.next_id(), kind, span };
        }

        Ok(lhs)
    }

    /// Expression with struct literals disabled: `if`/`while`/`match`/`for` heads.
    pub(super) fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        let ctx = self.ctx.with(ParseContext::NO_STRUCT_LIT);
        self.with_context(ctx, |p| p.parse_expr())
    }

    /// Expression inside brackets or braces, where every form is allowed again.
    fn parse_enclosed_expr(&mut self) -> Result<Expr, ParseError> {
        self.with_context(ParseContext::NONE, |p| p.parse_expr())
    }

    /// Expression with lambdas disabled: guards and select sources, where
    /// `=>` belongs to the arm.
    fn parse_arm_head_expr(&mut self) -> Result<Expr, ParseError> {
        let ctx = self.ctx.with(ParseContext::NO_LAMBDA);
        self.with_context(ctx, |p| p.parse_expr())
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        let bp = match self.current_kind() {
            TokenKind::LArrow => (SEND, SEND),
            TokenKind::PipePipe | TokenKind::Kw(Keyword::Or) => (OR, OR + 1),
            TokenKind::AmpAmp | TokenKind::Kw(Keyword::And) => (AND, AND + 1),
            TokenKind::EqEq | TokenKind::BangEq => (EQUALITY, EQUALITY + 1),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => (COMPARISON, COMPARISON + 1),
            TokenKind::DotDot | TokenKind::DotDotEq => (RANGE, RANGE),
            TokenKind::Plus | TokenKind::Minus => (ADDITIVE, ADDITIVE + 1),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (MULTIPLICATIVE, MULTIPLICATIVE + 1),
            _ => return None,
        };
        Some(bp)
    }

    fn postfix_bp(&self) -> Option<u8> {
        match self.current_kind() {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::Question => Some(POSTFIX),
            TokenKind::Dot => Some(FIELD),
            _ => None,
        }
    }

    // =========================================================================
    // Prefix forms
    // =========================================================================

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let kind = match self.current_kind().clone() {
            TokenKind::Int(value) => {
                self.advance();
                match self.duration_suffix() {
                    Some(unit) => {
                        self.advance();
                        ExprKind::Duration(Duration { value, unit })
                    }
                    None => ExprKind::Int(value),
                }
            }
            TokenKind::Float(f) => {
                self.advance();
                ExprKind::Float(f)
            }
            TokenKind::Str(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::FString(parts) => {
                self.advance();
                ExprKind::Interpolated(self.parse_interpolation(parts)?)
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Bool(b)
            }
            TokenKind::Kw(Keyword::None) => {
                self.advance();
                ExprKind::None
            }
            TokenKind::Kw(Keyword::SelfValue) => {
                self.advance();
                ExprKind::SelfValue
            }
            TokenKind::Kw(Keyword::Cooperate) => {
                self.advance();
                ExprKind::Cooperate
            }
            TokenKind::Ident(_) => return self.parse_path_expr(),
            TokenKind::LParen => return self.parse_paren_or_lambda(),
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LBrace => ExprKind::Block(self.parse_block()?),
            TokenKind::Minus | TokenKind::Bang => {
                let op = if self.check(&TokenKind::Minus) { UnaryOp::Neg } else { UnaryOp::Not };
                self.advance();
                let operand = self.parse_expr_bp(UNARY)?;
                ExprKind::Unary { op, operand: Box::new(operand) }
            }
            TokenKind::Kw(Keyword::Await) => {
                self.advance();
                ExprKind::Await(Box::new(self.parse_expr_bp(UNARY)?))
            }
            TokenKind::Kw(Keyword::Yield) => {
                self.advance();
                ExprKind::Yield(Box::new(self.parse_expr()?))
            }
            TokenKind::Kw(Keyword::If) => return self.parse_if(),
            TokenKind::Kw(Keyword::Match) => return self.parse_match(),
            TokenKind::Kw(Keyword::Move) => {
                let lambda = self.parse_lambda()?;
                ExprKind::Lambda(lambda)
            }
            TokenKind::Kw(Keyword::Spawn) => return self.parse_spawn(),
            TokenKind::Kw(Keyword::Select) => return self.parse_select(SelectKind::Select),
            TokenKind::Kw(Keyword::Race) => return self.parse_select(SelectKind::Race),
            TokenKind::Kw(Keyword::Join) => return self.parse_join(),
            TokenKind::Kw(Keyword::Scope) => return self.parse_scope(),
            TokenKind::Kw(Keyword::Try) => return self.parse_try_catch(),
            TokenKind::Kw(Keyword::Unsafe) => {
                self.advance();
                ExprKind::Unsafe(self.parse_block()?)
            }
            _ => return Err(self.error_expected("expression")),
        };

        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// Unit directly attached to the integer just consumed (`250ms`).
    fn duration_suffix(&self) -> Option<DurationUnit> {
        match self.current_kind() {
            TokenKind::Ident(unit) if self.current().span.start == self.prev_end() => {
                DurationUnit::from_suffix(unit)
            }
            _ => None,
        }
    }

    /// Literal duration such as `30s`.
    pub(super) fn parse_duration(&mut self) -> Result<Duration, ParseError> {
        let value = match self.current_kind() {
            TokenKind::Int(n) => *n,
            _ => return Err(self.error_expected("duration")),
        };
        self.advance();
        match self.duration_suffix() {
            Some(unit) => {
                self.advance();
                Ok(Duration { value, unit })
            }
            None => Err(self.error_expected("duration")),
        }
    }

    fn parse_interpolation(&mut self, parts: Vec<FStringPart>) -> Result<Vec<StringPart>, ParseError> {
        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                FStringPart::Text { value, .. } => out.push(StringPart::Text(value)),
                FStringPart::Splice { tokens, span } => out.push(StringPart::Expr(self.parse_splice(tokens, span)?)),
            }
        }
        Ok(out)
    }

    /// Parse the tokens of one `{ expr }` splice with a nested parser that
    /// shares node ids, nesting depth and the error list.
    fn parse_splice(&mut self, tokens: Vec<Token>, span: Span) -> Result<Expr, ParseError> {
        let mut inner = Parser::with_options(tokens, self.options);
        if let Some(eof) = inner.tokens.last_mut() {
            eof.span = Span::empty(span.end);
        }
        inner.next_node_id = self.next_node_id;
        inner.depth = self.depth;

        let result = inner.parse_expr().and_then(|expr| {
            if inner.at_end() {
                Ok(expr)
            } else {
                Err(inner.error_expected("'}'"))
            }
        });

        self.next_node_id = inner.next_node_id;
        for error in inner.take_errors() {
            self.record_error(error);
        }
        result
    }

    /// `name`, `a::b::c`, or a struct literal `Name { field: value }`.
    fn parse_path_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let mut path = self.parse_path()?;

        if self.check(&TokenKind::LBrace) && self.ctx.allows_struct_lit() && self.at_struct_lit_body() {
            let fields = self.parse_field_inits()?;
            return Ok(Expr {
                id: self.next_id(),
                kind: ExprKind::StructLit { path, fields },
                span: self.span_from(start),
            });
        }

        let kind = if path.len() == 1 {
            ExprKind::Ident(path.remove(0))
        } else {
            ExprKind::Path(path)
        };
        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// After `Name`, is `{` the start of a field list: `{}`, `{ a: ...`,
    /// `{ a, ...` or `{ a }`?
    fn at_struct_lit_body(&self) -> bool {
        match self.peek(1) {
            TokenKind::RBrace => true,
            TokenKind::Ident(_) => matches!(self.peek(2), TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace),
            _ => false,
        }
    }

    fn parse_field_inits(&mut self) -> Result<Vec<FieldInit>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        self.with_context(ParseContext::NONE, |p| {
            let mut fields = Vec::new();
            while !p.check(&TokenKind::RBrace) {
                let start = p.start();
                let name_span = p.current().span;
                let name = p.expect_ident()?;
                let value = if p.match_token(&TokenKind::Colon) {
                    p.parse_expr()?
                } else {
                    // `Point { x }` is `Point { x: x }`
                    Expr { id: p.next_id(), kind: ExprKind::Ident(name.clone()), span: name_span }
                };
                fields.push(FieldInit { name, value, span: p.span_from(start) });
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RBrace)?;
            Ok(fields)
        })
    }

    /// `(`: lambda, unit, parenthesized expression or tuple.
    fn parse_paren_or_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();

        if self.ctx.allows_lambda() {
            if let Some((params, ret_ty)) = self.try_parse(|p| p.parse_lambda_head()) {
                trace!(offset = start, "lambda head committed");
                let body = self.parse_expr()?;
                let lambda = Lambda { is_move: false, params, ret_ty, body: Box::new(body) };
                return Ok(Expr { id: self.next_id(), kind: ExprKind::Lambda(lambda), span: self.span_from(start) });
            }
            trace!(offset = start, "not a lambda, parsing parenthesized expression");
        }

        self.advance();
        let kind = self.with_context(ParseContext::NONE, |p| {
            if p.match_token(&TokenKind::RParen) {
                return Ok(ExprKind::Tuple(Vec::new()));
            }
            let first = p.parse_expr()?;
            if !p.match_token(&TokenKind::Comma) {
                p.expect(&TokenKind::RParen)?;
                return Ok(ExprKind::Paren(Box::new(first)));
            }
            let mut elems = vec![first];
            while !p.check(&TokenKind::RParen) {
                elems.push(p.parse_expr()?);
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RParen)?;
            Ok(ExprKind::Tuple(elems))
        })?;

        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `(a, b: T) -> R =>`, up to and including the arrow.
    fn parse_lambda_head(&mut self) -> Result<(Vec<LambdaParam>, Option<TypeExpr>), ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let start = self.start();
            let name = self.expect_ident()?;
            let ty = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(LambdaParam { name, ty, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        let ret_ty = if self.match_token(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&TokenKind::FatArrow)?;
        Ok((params, ret_ty))
    }

    /// Lambda in a position where nothing else can appear: `[move] (params) => body`.
    fn parse_lambda(&mut self) -> Result<Lambda, ParseError> {
        let is_move = self.match_kw(Keyword::Move);
        let (params, ret_ty) = self.parse_lambda_head()?;
        let body = self.parse_expr()?;
        Ok(Lambda { is_move, params, ret_ty, body: Box::new(body) })
    }

    /// `[a, b]` or `[value; count]`
    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LBracket)?;
        let kind = self.with_context(ParseContext::NONE, |p| {
            if p.match_token(&TokenKind::RBracket) {
                return Ok(ExprKind::Array(Vec::new()));
            }
            let first = p.parse_expr()?;
            if p.match_token(&TokenKind::Semi) {
                let count = p.parse_expr()?;
                p.expect(&TokenKind::RBracket)?;
                return Ok(ExprKind::ArrayRepeat { value: Box::new(first), count: Box::new(count) });
            }
            let mut elems = vec![first];
            while p.match_token(&TokenKind::Comma) {
                if p.check(&TokenKind::RBracket) {
                    break;
                }
                elems.push(p.parse_expr()?);
            }
            p.expect(&TokenKind::RBracket)?;
            Ok(ExprKind::Array(elems))
        })?;
        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    // =========================================================================
    // Postfix forms
    // =========================================================================

    fn parse_postfix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let start = lhs.span.start;
        let kind = match self.current_kind().clone() {
            TokenKind::LParen => {
                let args = self.parse_args()?;
                ExprKind::Call { func: Box::new(lhs), args }
            }
            TokenKind::LBracket => {
                self.advance();
                let index = self.parse_enclosed_expr()?;
                self.expect(&TokenKind::RBracket)?;
                ExprKind::Index { object: Box::new(lhs), index: Box::new(index) }
            }
            TokenKind::Question => {
                self.advance();
                ExprKind::Try(Box::new(lhs))
            }
            TokenKind::Dot => {
                self.advance();
                return self.parse_member(lhs);
            }
            _ => return Err(self.error_expected("expression")),
        };
        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// After `.`: field, method call, or tuple index.
    fn parse_member(&mut self, object: Expr) -> Result<Expr, ParseError> {
        let start = object.span.start;
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                let kind = if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::MethodCall { object: Box::new(object), method: name, args }
                } else {
                    ExprKind::Field { object: Box::new(object), field: name }
                };
                Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
            }
            TokenKind::Int(_) => {
                let field = self.current().text.clone();
                self.advance();
                let kind = ExprKind::Field { object: Box::new(object), field };
                Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
            }
            // `t.0.1` lexes its indices as one float
            TokenKind::Float(_) => {
                let token = self.current().clone();
                let Some((first, second)) = token.text.split_once('.') else {
                    return Err(self.error_expected("field name"));
                };
                self.advance();
                let inner_span = Span::new(start, token.span.start + first.len());
                let inner = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field { object: Box::new(object), field: first.to_string() },
                    span: inner_span,
                };
                let kind = ExprKind::Field { object: Box::new(inner), field: second.to_string() };
                Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
            }
            _ => Err(self.error_expected("field name")),
        }
    }

    /// `(a, b, c)`
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        self.with_context(ParseContext::NONE, |p| {
            let mut args = Vec::new();
            while !p.check(&TokenKind::RParen) {
                args.push(p.parse_expr()?);
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RParen)?;
            Ok(args)
        })
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::If)?;
        let cond = self.parse_condition()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_kw(Keyword::Else) {
            if self.check_kw(Keyword::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block_expr()?))
            }
        } else {
            None
        };

        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::If { cond: Box::new(cond), then_branch, else_branch },
            span: self.span_from(start),
        })
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Match)?;
        let scrutinee = self.parse_condition()?;
        self.expect(&TokenKind::LBrace)?;

        let arms = self.with_context(ParseContext::NONE, |p| {
            let mut arms = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                arms.push(p.parse_match_arm()?);
            }
            Ok(arms)
        })?;
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::Match { scrutinee: Box::new(scrutinee), arms },
            span: self.span_from(start),
        })
    }

    /// `pattern [if guard] => body [,]`
    fn parse_match_arm(&mut self) -> Result<MatchArm, ParseError> {
        let start = self.start();
        let pattern = self.parse_pattern()?;
        let guard = if self.match_kw(Keyword::If) {
            Some(self.parse_arm_head_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::FatArrow)?;
        let body = self.parse_arm_body()?;
        let span = self.span_from(start);
        self.match_token(&TokenKind::Comma);
        Ok(MatchArm { pattern, guard, body, span })
    }

    /// Arm body: a block stands alone; anything else is a full expression.
    fn parse_arm_body(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LBrace) {
            self.parse_block_expr()
        } else {
            self.parse_expr()
        }
    }

    fn parse_block_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let block = self.parse_block()?;
        Ok(Expr { id: self.next_id(), kind: ExprKind::Block(block), span: self.span_from(start) })
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    /// `spawn Actor<T>(args)` or `spawn [move] (params) => body`
    fn parse_spawn(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Spawn)?;

        let target = if self.check_kw(Keyword::Move) || self.check(&TokenKind::LParen) {
            SpawnTarget::Lambda(self.parse_lambda()?)
        } else {
            let name = self.expect_ident()?;
            let type_args = self.parse_opt_type_args()?;
            let args = self.parse_args()?;
            SpawnTarget::Actor { name, type_args, args }
        };

        Ok(Expr { id: self.next_id(), kind: ExprKind::Spawn(target), span: self.span_from(start) })
    }

    /// `select { x from rx => body, after 1s => body }`; `race` shares the grammar.
    fn parse_select(&mut self, kind: SelectKind) -> Result<Expr, ParseError> {
        let start = self.start();
        self.advance();
        self.expect(&TokenKind::LBrace)?;

        let (arms, timeout) = self.with_context(ParseContext::NONE, |p| {
            let mut arms = Vec::new();
            let mut timeout: Option<Box<TimeoutArm>> = None;
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                let arm_start = p.start();
                if p.check_soft("after") && !matches!(p.peek(1), TokenKind::Ident(w) if w == "from") {
                    let keyword_span = p.advance();
                    let duration = p.parse_arm_head_expr()?;
                    p.expect(&TokenKind::FatArrow)?;
                    let body = p.parse_arm_body()?;
                    let arm = TimeoutArm { duration, body, span: p.span_from(arm_start) };
                    if timeout.is_some() {
                        p.record_error(ParseError::duplicate("'after' arm", keyword_span));
                    } else {
                        timeout = Some(Box::new(arm));
                    }
                } else {
                    let binding = p.expect_ident()?;
                    p.expect_soft("from")?;
                    let source = p.parse_arm_head_expr()?;
                    p.expect(&TokenKind::FatArrow)?;
                    let body = p.parse_arm_body()?;
                    arms.push(SelectArm { binding, source, body, span: p.span_from(arm_start) });
                }
                if !p.match_token(&TokenKind::Comma) && !p.check(&TokenKind::RBrace) {
                    return Err(p.error_expected("',' or '}'"));
                }
            }
            Ok((arms, timeout))
        })?;
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::Select { kind, arms, timeout },
            span: self.span_from(start),
        })
    }

    /// `join { a, b, c }`
    fn parse_join(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Join)?;
        self.expect(&TokenKind::LBrace)?;
        let exprs = self.with_context(ParseContext::NONE, |p| {
            let mut exprs = vec![p.parse_expr()?];
            while p.match_token(&TokenKind::Comma) {
                if p.check(&TokenKind::RBrace) {
                    break;
                }
                exprs.push(p.parse_expr()?);
            }
            Ok(exprs)
        })?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr { id: self.next_id(), kind: ExprKind::Join(exprs), span: self.span_from(start) })
    }

    /// `scope { }`, `scope.launch { }`, `scope.cancel()`, `scope.is_cancelled()`
    fn parse_scope(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Scope)?;

        let kind = if self.check(&TokenKind::LBrace) {
            ExprKind::Scope(self.parse_block()?)
        } else if self.match_token(&TokenKind::Dot) {
            match self.current_kind() {
                TokenKind::Ident(name) if name == "launch" => {
                    self.advance();
                    ExprKind::ScopeLaunch(self.parse_block()?)
                }
                TokenKind::Ident(name) if name == "cancel" || name == "is_cancelled" => {
                    let cancel = name == "cancel";
                    self.advance();
                    self.expect(&TokenKind::LParen)?;
                    self.expect(&TokenKind::RParen)?;
                    if cancel {
                        ExprKind::ScopeCancel
                    } else {
                        ExprKind::ScopeIsCancelled
                    }
                }
                _ => return Err(self.error_expected("'launch', 'cancel' or 'is_cancelled'")),
            }
        } else {
            return Err(self.error_expected("'{' or '.'"));
        };

        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `try { } [catch [name] { }]`
    fn parse_try_catch(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Try)?;
        let body = self.parse_block()?;

        let catch = if self.check_kw(Keyword::Catch) {
            let catch_start = self.start();
            self.advance();
            let binding = match self.current_kind() {
                TokenKind::Ident(_) => Some(self.expect_ident()?),
                _ => None,
            };
            let handler = self.parse_block()?;
            Some(CatchClause { binding, handler, span: self.span_from(catch_start) })
        } else {
            None
        };

        Ok(Expr { id: self.next_id(), kind: ExprKind::TryCatch { body, catch }, span: self.span_from(start) })
    }

    /// Current token begins an expression that ends in a block and may stand
    /// as a statement without `;`.
    pub(super) fn at_block_like_expr(&self) -> bool {
        match self.current_kind() {
            TokenKind::Kw(
                Keyword::If
                | Keyword::Match
                | Keyword::Select
                | Keyword::Race
                | Keyword::Join
                | Keyword::Unsafe
                | Keyword::Try,
            ) => true,
            TokenKind::Kw(Keyword::Scope) => match self.peek(1) {
                TokenKind::LBrace => true,
                TokenKind::Dot => matches!(self.peek(2), TokenKind::Ident(name) if name == "launch"),
                _ => false,
            },
            _ => false,
        }
    }

    /// Block-like expression in statement position, without trailing operators.
    pub(super) fn parse_block_like_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_prefix())
    }
}

fn binop(kind: &TokenKind) -> BinOp {
    match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::BangEq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::AmpAmp | TokenKind::Kw(Keyword::And) => BinOp::And,
        TokenKind::PipePipe | TokenKind::Kw(Keyword::Or) => BinOp::Or,
        // `infix_bp` only admits the operators above and `<-`
        _ => BinOp::Send,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_lexer::tokenize;

    fn expr(src: &str) -> Expr {
        let mut p = Parser::new(tokenize(src).tokens);
        let e = p.parse_expr().unwrap();
        assert!(p.at_end(), "trailing input in {src:?}");
        assert!(p.errors().is_empty(), "errors in {src:?}: {:?}", p.errors());
        e
    }

    /// S-expression rendering for precedence checks.
    fn sexp(e: &Expr) -> String {
        match &e.kind {
            ExprKind::Int(n) => n.to_string(),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Binary { op, left, right } => format!("({op:?} {} {})", sexp(left), sexp(right)),
            ExprKind::Range { start, end, inclusive } => {
                format!("({} {} {})", if *inclusive { "..=" } else { ".." }, sexp(start), sexp(end))
            }
            ExprKind::Unary { op, operand } => format!("({op:?} {})", sexp(operand)),
            ExprKind::Await(inner) => format!("(await {})", sexp(inner)),
            ExprKind::Paren(inner) => sexp(inner),
            ExprKind::Call { func, args } => {
                let args: Vec<_> = args.iter().map(sexp).collect();
                format!("(call {} [{}])", sexp(func), args.join(" "))
            }
            ExprKind::MethodCall { object, method, .. } => format!("(method {} {method})", sexp(object)),
            ExprKind::Field { object, field } => format!("(. {} {field})", sexp(object)),
            ExprKind::Index { object, index } => format!("(index {} {})", sexp(object), sexp(index)),
            ExprKind::Try(inner) => format!("(? {})", sexp(inner)),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(sexp(&expr("1 + 2 * 3")), "(Add 1 (Mul 2 3))");
        assert_eq!(sexp(&expr("1 - 2 - 3")), "(Sub (Sub 1 2) 3)");
        assert_eq!(sexp(&expr("a || b && c")), "(Or a (And b c))");
        assert_eq!(sexp(&expr("a or b and c")), "(Or a (And b c))");
        assert_eq!(sexp(&expr("a == b < c")), "(Eq a (Lt b c))");
        assert_eq!(sexp(&expr("-a * b")), "(Mul (Neg a) b)");
        assert_eq!(sexp(&expr("!f()")), "(Not (call f []))");
    }

    #[test]
    fn send_and_range_are_right_associative() {
        assert_eq!(sexp(&expr("a <- b <- c")), "(Send a (Send b c))");
        assert_eq!(sexp(&expr("1 .. 2 .. 3")), "(.. 1 (.. 2 3))");
        assert_eq!(sexp(&expr("0 ..= n + 1")), "(..= 0 (Add n 1))");
        assert_eq!(sexp(&expr("pid <- x + 1")), "(Send pid (Add x 1))");
    }

    #[test]
    fn postfix_chain() {
        assert_eq!(sexp(&expr("a.b().c[0]?")), "(? (index (. (method a b) c) 0))");
        assert_eq!(sexp(&expr("await f.x")), "(await (. f x))");
    }

    #[test]
    fn tuple_indices() {
        assert_eq!(sexp(&expr("t.0")), "(. t 0)");
        assert_eq!(sexp(&expr("t.0.1")), "(. (. t 0) 1)");
        let e = expr("t.0.1");
        match &e.kind {
            ExprKind::Field { object, .. } => assert_eq!(object.span, Span::new(0, 3)),
            other => panic!("expected field, got {other:?}"),
        }
    }

    #[test]
    fn durations_need_adjacent_units() {
        assert!(matches!(
            expr("250ms").kind,
            ExprKind::Duration(Duration { value: 250, unit: DurationUnit::Millis })
        ));
        assert!(matches!(expr("2h").kind, ExprKind::Duration(d) if d.as_nanos() == Some(7_200_000_000_000)));
        let mut p = Parser::new(tokenize("5 s").tokens);
        assert!(matches!(p.parse_expr().unwrap().kind, ExprKind::Int(5)));
        assert!(!p.at_end());
    }

    #[test]
    fn lambda_versus_parens() {
        assert!(matches!(expr("(a, b) => a + b").kind, ExprKind::Lambda(ref l) if l.params.len() == 2));
        assert!(matches!(expr("(a + b)").kind, ExprKind::Paren(_)));
        assert!(matches!(expr("(a)").kind, ExprKind::Paren(_)));
        assert!(matches!(expr("(a,)").kind, ExprKind::Tuple(ref e) if e.len() == 1));
        assert!(matches!(expr("()").kind, ExprKind::Tuple(ref e) if e.is_empty()));
        assert!(matches!(expr("() => 1").kind, ExprKind::Lambda(ref l) if l.params.is_empty()));
        assert!(matches!(
            expr("(x: i32) -> i32 => x * 2").kind,
            ExprKind::Lambda(Lambda { ret_ty: Some(_), .. })
        ));
        assert!(matches!(expr("move (x) => x").kind, ExprKind::Lambda(Lambda { is_move: true, .. })));
    }

    #[test]
    fn failed_speculation_leaves_no_trace() {
        let mut p = Parser::new(tokenize("(a, b + 1)").tokens);
        let e = p.parse_expr().unwrap();
        assert!(matches!(e.kind, ExprKind::Tuple(ref t) if t.len() == 2));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn struct_literals_and_conditions() {
        assert!(matches!(
            expr("Point { x: 1, y }").kind,
            ExprKind::StructLit { ref fields, .. } if fields.len() == 2
        ));
        assert!(matches!(expr("Empty {}").kind, ExprKind::StructLit { .. }));
        let e = expr("if ready { go() } else { wait() }");
        match e.kind {
            ExprKind::If { cond, else_branch, .. } => {
                assert!(matches!(cond.kind, ExprKind::Ident(ref n) if n == "ready"));
                assert!(else_branch.is_some());
            }
            other => panic!("expected if, got {other:?}"),
        }
        let e = expr("if (Point { x: 1 }) == p { 1 } else { 2 }");
        assert!(matches!(e.kind, ExprKind::If { .. }));
    }

    #[test]
    fn bare_name_before_block_is_not_a_struct_literal() {
        match expr("if x { y }").kind {
            ExprKind::If { cond, then_branch, else_branch } => {
                assert!(matches!(cond.kind, ExprKind::Ident(ref n) if n == "x"));
                assert_eq!(then_branch.stmts.len(), 1);
                assert!(matches!(then_branch.tail().map(|e| &e.kind), Some(ExprKind::Ident(n)) if n == "y"));
                assert!(else_branch.is_none());
            }
            other => panic!("expected if, got {other:?}"),
        }
        match expr("match x { y => 1 }").kind {
            ExprKind::Match { scrutinee, arms } => {
                assert!(matches!(scrutinee.kind, ExprKind::Ident(ref n) if n == "x"));
                assert_eq!(arms.len(), 1);
                assert!(matches!(arms[0].body.kind, ExprKind::Int(1)));
            }
            other => panic!("expected match, got {other:?}"),
        }
        // outside a condition the same tokens are a struct literal
        assert!(matches!(expr("x { y }").kind, ExprKind::StructLit { ref fields, .. } if fields.len() == 1));
    }

    #[test]
    fn match_arms_with_guards_and_lambda_bodies() {
        let e = expr("match v { Some(x) if x > 0 => x, None => { 0 } _ => (y) => y }");
        match e.kind {
            ExprKind::Match { arms, .. } => {
                assert_eq!(arms.len(), 3);
                assert!(arms[0].guard.is_some());
                assert!(matches!(arms[1].body.kind, ExprKind::Block(_)));
                assert!(matches!(arms[2].body.kind, ExprKind::Lambda(_)));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn spawn_forms() {
        assert!(matches!(
            expr("spawn Counter<i32>(0, 1)").kind,
            ExprKind::Spawn(SpawnTarget::Actor { ref type_args, ref args, .. }) if type_args.len() == 1 && args.len() == 2
        ));
        assert!(matches!(
            expr("spawn move (msg) => handle(msg)").kind,
            ExprKind::Spawn(SpawnTarget::Lambda(Lambda { is_move: true, .. }))
        ));
    }

    #[test]
    fn select_and_race() {
        let e = expr("select { m from inbox.recv() => m, t from ticks => { t }, after 1s => None }");
        match e.kind {
            ExprKind::Select { kind, arms, timeout } => {
                assert_eq!(kind, SelectKind::Select);
                assert_eq!(arms.len(), 2);
                assert_eq!(arms[0].binding, "m");
                let timeout = timeout.unwrap();
                assert!(matches!(timeout.duration.kind, ExprKind::Duration(_)));
            }
            other => panic!("expected select, got {other:?}"),
        }
        assert!(matches!(expr("race { a from x => a }").kind, ExprKind::Select { kind: SelectKind::Race, .. }));
    }

    #[test]
    fn second_after_arm_is_reported() {
        let mut p = Parser::new(tokenize("select { after 1s => 1, after 2s => 2 }").tokens);
        let e = p.parse_expr().unwrap();
        assert!(matches!(e.kind, ExprKind::Select { timeout: Some(_), .. }));
        assert_eq!(p.errors().len(), 1);
        assert_eq!(p.errors()[0].kind, crate::ParseErrorKind::Duplicate);
    }

    #[test]
    fn join_scope_try_unsafe() {
        assert!(matches!(expr("join { a(), b(), }").kind, ExprKind::Join(ref e) if e.len() == 2));
        assert!(matches!(expr("scope { cooperate }").kind, ExprKind::Scope(_)));
        assert!(matches!(expr("scope.launch { work() }").kind, ExprKind::ScopeLaunch(_)));
        assert!(matches!(expr("scope.cancel()").kind, ExprKind::ScopeCancel));
        assert!(matches!(expr("scope.is_cancelled()").kind, ExprKind::ScopeIsCancelled));
        assert!(matches!(
            expr("try { risky() } catch e { log(e) }").kind,
            ExprKind::TryCatch { catch: Some(CatchClause { binding: Some(_), .. }), .. }
        ));
        assert!(matches!(expr("try { risky() }").kind, ExprKind::TryCatch { catch: None, .. }));
        assert!(matches!(expr("unsafe { ptr() }").kind, ExprKind::Unsafe(_)));
    }

    #[test]
    fn arrays() {
        assert!(matches!(expr("[1, 2, 3,]").kind, ExprKind::Array(ref e) if e.len() == 3));
        assert!(matches!(expr("[0; 16]").kind, ExprKind::ArrayRepeat { .. }));
        assert!(matches!(expr("[]").kind, ExprKind::Array(ref e) if e.is_empty()));
    }

    #[test]
    fn interpolated_strings() {
        let e = expr(r#"f"x = {x + 1}, y = {y}""#);
        match e.kind {
            ExprKind::Interpolated(parts) => {
                assert_eq!(parts.len(), 4);
                assert!(matches!(&parts[0], StringPart::Text(t) if t == "x = "));
                match &parts[1] {
                    StringPart::Expr(inner) => {
                        assert_eq!(sexp(inner), "(Add x 1)");
                        assert_eq!(inner.span, Span::new(7, 12));
                    }
                    other => panic!("expected splice, got {other:?}"),
                }
            }
            other => panic!("expected interpolation, got {other:?}"),
        }
    }

    #[test]
    fn node_ids_are_unique() {
        let e = expr("f(a, b) + g[c]");
        let mut ids = Vec::new();
        fn walk(e: &Expr, ids: &mut Vec<u32>) {
            ids.push(e.id.0);
            match &e.kind {
                ExprKind::Binary { left, right, .. } => {
                    walk(left, ids);
                    walk(right, ids);
                }
                ExprKind::Call { func, args } => {
                    walk(func, ids);
                    args.iter().for_each(|a| walk(a, ids));
                }
                ExprKind::Index { object, index } => {
                    walk(object, ids);
                    walk(index, ids);
                }
                _ => {}
            }
        }
        walk(&e, &mut ids);
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, 8);
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern parsing for `let`, `for` and match arms.

use hew_ast::expr::{Expr, ExprKind, UnaryOp};
use hew_ast::pattern::{FieldPattern, Pattern, PatternKind};
use hew_ast::token::{Keyword, TokenKind};

use super::{ParseError, Parser};

impl Parser {
    /// Parse a pattern, including `a | b` alternatives.
    pub(super) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.nested(|p| {
            let start = p.start();
            let first = p.parse_single_pattern()?;
            if !p.check(&TokenKind::Pipe) {
                return Ok(first);
            }

            let mut alts = Vec::new();
            push_alternative(&mut alts, first);
            while p.match_token(&TokenKind::Pipe) {
                let alt = p.parse_single_pattern()?;
                push_alternative(&mut alts, alt);
            }
            Ok(Pattern { id: p.next_id(), kind: PatternKind::Or(alts), span: p.span_from(start) })
        })
    }

    fn parse_single_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.start();
        let kind = match self.current_kind().clone() {
            TokenKind::Ident(name) if name == "_" => {
                self.advance();
                PatternKind::Wildcard
            }
            TokenKind::Ident(_) => {
                let path = self.parse_path()?;
                if self.match_token(&TokenKind::LParen) {
                    let args = self.parse_pattern_list(&TokenKind::RParen)?;
                    PatternKind::Constructor { path, args }
                } else if self.check(&TokenKind::LBrace) {
                    let fields = self.parse_field_patterns()?;
                    PatternKind::Struct { path, fields }
                } else if path.len() == 1 {
                    let mut path = path;
                    PatternKind::Ident(path.remove(0))
                } else {
                    PatternKind::Path(path)
                }
            }
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Bool(_)
            | TokenKind::Kw(Keyword::None) => PatternKind::Literal(Box::new(self.parse_literal_pattern()?)),
            TokenKind::Minus if matches!(self.peek(1), TokenKind::Int(_) | TokenKind::Float(_)) => {
                self.advance();
                let operand = self.parse_literal_pattern()?;
                let neg = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(operand) },
                    span: self.span_from(start),
                };
                PatternKind::Literal(Box::new(neg))
            }
            TokenKind::LParen => {
                self.advance();
                if self.match_token(&TokenKind::RParen) {
                    PatternKind::Tuple(Vec::new())
                } else {
                    let first = self.parse_pattern()?;
                    if !self.match_token(&TokenKind::Comma) {
                        // `(p)` only groups
                        self.expect(&TokenKind::RParen)?;
                        return Ok(first);
                    }
                    let mut elems = vec![first];
                    elems.extend(self.parse_pattern_list(&TokenKind::RParen)?);
                    PatternKind::Tuple(elems)
                }
            }
            _ => return Err(self.error_expected("pattern")),
        };

        Ok(Pattern { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// A single literal token as an expression.
    fn parse_literal_pattern(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let kind = match self.current_kind().clone() {
            TokenKind::Int(n) => ExprKind::Int(n),
            TokenKind::Float(f) => ExprKind::Float(f),
            TokenKind::Str(s) => ExprKind::String(s),
            TokenKind::Bool(b) => ExprKind::Bool(b),
            TokenKind::Kw(Keyword::None) => ExprKind::None,
            _ => return Err(self.error_expected("pattern")),
        };
        self.advance();
        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// Comma-separated patterns up to and including `close`.
    fn parse_pattern_list(&mut self, close: &TokenKind) -> Result<Vec<Pattern>, ParseError> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.parse_pattern()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    /// `{ x, y: pattern }`
    fn parse_field_patterns(&mut self) -> Result<Vec<FieldPattern>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.start();
            let name = self.expect_ident()?;
            let pattern = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_pattern()?)
            } else {
                None
            };
            fields.push(FieldPattern { name, pattern, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(fields)
    }
}

/// Flatten nested or-patterns into one list.
fn push_alternative(alts: &mut Vec<Pattern>, pattern: Pattern) {
    match pattern.kind {
        PatternKind::Or(inner) => alts.extend(inner),
        _ => alts.push(pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_lexer::tokenize;

    fn pat(src: &str) -> Pattern {
        let mut p = Parser::new(tokenize(src).tokens);
        let pat = p.parse_pattern().unwrap();
        assert!(p.at_end(), "trailing input in {src:?}");
        pat
    }

    #[test]
    fn simple_patterns() {
        assert!(matches!(pat("_").kind, PatternKind::Wildcard));
        assert!(matches!(pat("x").kind, PatternKind::Ident(ref n) if n == "x"));
        assert!(matches!(pat("Color::Red").kind, PatternKind::Path(ref p) if p.len() == 2));
        assert!(matches!(pat("None").kind, PatternKind::Literal(_)));
        assert!(matches!(pat("-1").kind, PatternKind::Literal(_)));
    }

    #[test]
    fn constructor_and_struct() {
        let p = pat("Some((a, _))");
        match p.kind {
            PatternKind::Constructor { path, args } => {
                assert_eq!(path, vec!["Some"]);
                assert!(matches!(args[0].kind, PatternKind::Tuple(ref t) if t.len() == 2));
            }
            other => panic!("expected constructor, got {other:?}"),
        }
        let p = pat("Point { x, y: 0 }");
        assert_eq!(p.bindings(), vec!["x"]);
    }

    #[test]
    fn or_patterns_are_flat() {
        let p = pat("1 | (2 | 3) | 4");
        match p.kind {
            PatternKind::Or(alts) => assert_eq!(alts.len(), 4),
            other => panic!("expected or-pattern, got {other:?}"),
        }
    }
}

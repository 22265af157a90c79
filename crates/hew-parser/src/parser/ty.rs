// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expressions, generic parameters and where clauses.

use hew_ast::token::{Keyword, TokenKind};
use hew_ast::ty::{PointerMutability, TraitBound, TypeExpr, TypeKind, TypeParam, WherePredicate};

use super::{ParseError, Parser};

impl Parser {
    /// Parse a type annotation.
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.nested(|p| p.parse_type_inner())
    }

    fn parse_type_inner(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.start();
        let kind = match self.current_kind() {
            TokenKind::Ident(_) => {
                let path = self.parse_path()?;
                let args = self.parse_opt_type_args()?;
                TypeKind::Named { path, args }
            }
            TokenKind::LParen => {
                self.advance();
                if self.match_token(&TokenKind::RParen) {
                    TypeKind::Unit
                } else {
                    let first = self.parse_type()?;
                    if !self.match_token(&TokenKind::Comma) {
                        // `(T)` is just `T`
                        self.expect(&TokenKind::RParen)?;
                        return Ok(first);
                    }
                    let mut elems = vec![first];
                    while !self.check(&TokenKind::RParen) {
                        elems.push(self.parse_type()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    TypeKind::Tuple(elems)
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let elem = Box::new(self.parse_type()?);
                let kind = if self.match_token(&TokenKind::Semi) {
                    let len = self.expect_int()?;
                    TypeKind::Array { elem, len }
                } else {
                    TypeKind::Slice(elem)
                };
                self.expect(&TokenKind::RBracket)?;
                kind
            }
            TokenKind::Kw(Keyword::Fn) => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let mut params = Vec::new();
                while !self.check(&TokenKind::RParen) {
                    params.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
                let ret = if self.match_token(&TokenKind::Arrow) {
                    Some(Box::new(self.parse_type()?))
                } else {
                    None
                };
                TypeKind::Function { params, ret }
            }
            TokenKind::Star => {
                self.advance();
                let mutability = if self.match_kw(Keyword::Const) {
                    Some(PointerMutability::Const)
                } else if self.match_soft("mut") {
                    Some(PointerMutability::Mut)
                } else {
                    None
                };
                let pointee = Box::new(self.parse_type()?);
                TypeKind::Pointer { mutability, pointee }
            }
            TokenKind::Kw(Keyword::Dyn) => {
                self.advance();
                let bounds = if self.match_token(&TokenKind::LParen) {
                    let bounds = self.parse_bounds()?;
                    self.expect(&TokenKind::RParen)?;
                    bounds
                } else {
                    vec![self.parse_bound()?]
                };
                TypeKind::TraitObject(bounds)
            }
            _ => return Err(self.error_expected("type")),
        };

        Ok(TypeExpr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `a::b::c`
    pub(super) fn parse_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = vec![self.expect_ident()?];
        while self.check(&TokenKind::ColonColon) && matches!(self.peek(1), TokenKind::Ident(_)) {
            self.advance();
            path.push(self.expect_ident()?);
        }
        Ok(path)
    }

    /// `<A, B>` if present, else empty.
    pub(super) fn parse_opt_type_args(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        if !self.match_token(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut args = Vec::new();
        while !self.check(&TokenKind::Gt) {
            args.push(self.parse_type()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(args)
    }

    /// `Name<Args>`
    pub(super) fn parse_bound(&mut self) -> Result<TraitBound, ParseError> {
        let start = self.start();
        let name = self.parse_path()?.join("::");
        let args = self.parse_opt_type_args()?;
        Ok(TraitBound { name, args, span: self.span_from(start) })
    }

    /// `A + B<T> + C`
    pub(super) fn parse_bounds(&mut self) -> Result<Vec<TraitBound>, ParseError> {
        let mut bounds = vec![self.parse_bound()?];
        while self.match_token(&TokenKind::Plus) {
            bounds.push(self.parse_bound()?);
        }
        Ok(bounds)
    }

    /// `<T, U: Bound + Other>` if present, else empty.
    pub(super) fn parse_opt_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        if !self.match_token(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        while !self.check(&TokenKind::Gt) {
            let start = self.start();
            let name = self.expect_ident()?;
            let bounds = if self.match_token(&TokenKind::Colon) {
                self.parse_bounds()?
            } else {
                Vec::new()
            };
            params.push(TypeParam { name, bounds, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(params)
    }

    /// `where T: A + B, U: C` if present, else empty.
    pub(super) fn parse_opt_where_clause(&mut self) -> Result<Vec<WherePredicate>, ParseError> {
        if !self.match_kw(Keyword::Where) {
            return Ok(Vec::new());
        }
        let mut predicates = Vec::new();
        loop {
            let start = self.start();
            let ty = self.parse_type()?;
            self.expect(&TokenKind::Colon)?;
            let bounds = self.parse_bounds()?;
            predicates.push(WherePredicate { ty, bounds, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) || self.check(&TokenKind::LBrace) {
                break;
            }
        }
        Ok(predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_lexer::tokenize;

    fn ty(src: &str) -> TypeExpr {
        let mut p = Parser::new(tokenize(src).tokens);
        let ty = p.parse_type().unwrap();
        assert!(p.at_end(), "trailing input in {src:?}");
        ty
    }

    #[test]
    fn named_with_args() {
        let t = ty("std::Map<string, Vec<i32>>");
        match t.kind {
            TypeKind::Named { path, args } => {
                assert_eq!(path, vec!["std", "Map"]);
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].name(), Some("Vec"));
            }
            other => panic!("expected named type, got {other:?}"),
        }
    }

    #[test]
    fn unit_tuple_and_grouping() {
        assert!(matches!(ty("()").kind, TypeKind::Unit));
        assert!(matches!(ty("(i32, bool)").kind, TypeKind::Tuple(ref e) if e.len() == 2));
        assert!(matches!(ty("(i32,)").kind, TypeKind::Tuple(ref e) if e.len() == 1));
        assert_eq!(ty("(i32)").name(), Some("i32"));
    }

    #[test]
    fn arrays_and_slices() {
        assert!(matches!(ty("[u8; 16]").kind, TypeKind::Array { len: 16, .. }));
        assert!(matches!(ty("[u8]").kind, TypeKind::Slice(_)));
    }

    #[test]
    fn function_pointer_and_dyn() {
        assert!(matches!(ty("fn(i32, i32) -> bool").kind, TypeKind::Function { ref params, ret: Some(_) } if params.len() == 2));
        assert!(matches!(
            ty("*mut u8").kind,
            TypeKind::Pointer { mutability: Some(PointerMutability::Mut), .. }
        ));
        assert!(matches!(
            ty("*const u8").kind,
            TypeKind::Pointer { mutability: Some(PointerMutability::Const), .. }
        ));
        assert!(matches!(ty("*u8").kind, TypeKind::Pointer { mutability: None, .. }));
        assert!(matches!(ty("dyn (Read + Write)").kind, TypeKind::TraitObject(ref b) if b.len() == 2));
        assert!(matches!(ty("dyn Display").kind, TypeKind::TraitObject(ref b) if b.len() == 1));
    }

    #[test]
    fn type_params_and_where() {
        let mut p = Parser::new(tokenize("<T: Send + Into<U>, U> where T: Clone, U: Copy {").tokens);
        let params = p.parse_opt_type_params().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].bounds.len(), 2);
        assert_eq!(params[0].bounds[1].name, "Into");
        let preds = p.parse_opt_where_clause().unwrap();
        assert_eq!(preds.len(), 2);
        assert!(p.check(&TokenKind::LBrace));
    }
}

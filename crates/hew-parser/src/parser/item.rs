// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Top-level declarations.

use hew_ast::item::{
    ActorDecl, ActorInit, ActorMember, ChildSpec, ConstDecl, EnumDecl, ExternBlock, ExternFn, FieldDecl, FnDecl,
    FnFlavor, ImplDecl, ImplItem, ImportDecl, ImportSpec, Item, ItemKind, MailboxDecl, OverflowFallback,
    OverflowPolicy, Param, Program, RestartBudget, RestartPolicy, RestartSpec, RestartStrategy, StructDecl,
    SupervisorDecl, SupervisorMember, TraitDecl, TraitItem, TypeAliasDecl, Variant, VariantKind, Visibility,
    WireAttr, WireDecl, WireField, WireKind, WireMember, WireType,
};
use hew_ast::token::{Keyword, TokenKind};
use hew_ast::ty::{TraitBound, TypeKind, TypeParam, WherePredicate};
use hew_ast::Span;
use tracing::debug;

use super::{ParseError, Parser};

/// Primitive wire field types.
const WIRE_PRIMITIVES: &[&str] = &[
    "u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "f32", "f64", "bool", "bytes", "string",
];

/// Whether a function must carry a body.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FnBody {
    Required,
    Optional,
}

impl Parser {
    /// Parse a whole source unit. Errors are collected, never returned.
    pub fn parse_program(&mut self) -> Program {
        let mut items = Vec::new();

        while !self.at_end() {
            if self.halted {
                self.skip_to_end();
                break;
            }
            let before = self.pos;
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    if !self.record_error(e) {
                        self.skip_to_end();
                        break;
                    }
                    self.synchronize();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        let end = self.current().span.end;
        Program { items, span: Span::new(0, end) }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        let start = self.start();
        let vis = self.parse_visibility();
        debug!(offset = start, token = %self.current().text, "parse_item");

        let kind = match self.current_kind() {
            TokenKind::Kw(Keyword::Import) => ItemKind::Import(self.parse_import()?),
            TokenKind::Kw(Keyword::Const) => ItemKind::Const(self.parse_const()?),
            TokenKind::Kw(Keyword::Type) => self.parse_type_item()?,
            TokenKind::Kw(Keyword::Struct) => {
                self.advance();
                ItemKind::Struct(self.parse_struct_rest()?)
            }
            TokenKind::Kw(Keyword::Enum) => ItemKind::Enum(self.parse_enum()?),
            TokenKind::Kw(Keyword::Wire) => ItemKind::Wire(self.parse_wire()?),
            TokenKind::Kw(Keyword::Trait) => ItemKind::Trait(self.parse_trait()?),
            TokenKind::Kw(Keyword::Impl) => ItemKind::Impl(self.parse_impl()?),
            TokenKind::Kw(Keyword::Fn | Keyword::Gen | Keyword::Async) => {
                ItemKind::Fn(self.parse_fn(FnBody::Required)?)
            }
            TokenKind::Kw(Keyword::Extern) => ItemKind::Extern(self.parse_extern()?),
            TokenKind::Kw(Keyword::Actor) => ItemKind::Actor(self.parse_actor()?),
            TokenKind::Kw(Keyword::Supervisor) => ItemKind::Supervisor(self.parse_supervisor()?),
            _ => return Err(self.expected_item()),
        };

        Ok(Item { id: self.next_id(), vis, kind, span: self.span_from(start) })
    }

    fn expected_item(&self) -> ParseError {
        let error = self.error_expected("item");
        match self.current_kind() {
            TokenKind::Ident(word) => match crate::hints::suggest_item_keyword(word) {
                Some(keyword) => error.with_hint(format!("did you mean '{keyword}'?")),
                None => error,
            },
            _ => error,
        }
    }

    /// `pub`, `pub(package)`, `pub(super)` or nothing.
    fn parse_visibility(&mut self) -> Visibility {
        if !self.match_kw(Keyword::Pub) {
            return Visibility::Private;
        }
        if self.check(&TokenKind::LParen) && matches!(self.peek(2), TokenKind::RParen) {
            let restricted = match self.peek(1) {
                TokenKind::Ident(scope) if scope == "package" => Some(Visibility::Package),
                TokenKind::Ident(scope) if scope == "super" => Some(Visibility::Super),
                _ => None,
            };
            if let Some(vis) = restricted {
                self.advance();
                self.advance();
                self.advance();
                return vis;
            }
        }
        Visibility::Public
    }

    // =========================================================================
    // Imports, constants, type declarations
    // =========================================================================

    /// `import a::b;`, `import a::b::{x, y};`, `import a::b::*;`
    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        self.expect_kw(Keyword::Import)?;
        let mut path = vec![self.expect_ident()?];
        let mut spec = ImportSpec::Module;

        while self.match_token(&TokenKind::ColonColon) {
            match self.current_kind() {
                TokenKind::Star => {
                    self.advance();
                    spec = ImportSpec::Glob;
                    break;
                }
                TokenKind::LBrace => {
                    self.advance();
                    let mut names = vec![self.expect_ident()?];
                    while self.match_token(&TokenKind::Comma) {
                        if self.check(&TokenKind::RBrace) {
                            break;
                        }
                        names.push(self.expect_ident()?);
                    }
                    self.expect(&TokenKind::RBrace)?;
                    spec = ImportSpec::Names(names);
                    break;
                }
                _ => path.push(self.expect_ident()?),
            }
        }

        self.expect_semi()?;
        Ok(ImportDecl { path, spec })
    }

    /// `const NAME: Type = value;`
    fn parse_const(&mut self) -> Result<ConstDecl, ParseError> {
        self.expect_kw(Keyword::Const)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect_semi()?;
        Ok(ConstDecl { name, ty, value })
    }

    /// `type Name<T> = Other;` is an alias; `type Name<T> [where] { fields }`
    /// declares a struct.
    fn parse_type_item(&mut self) -> Result<ItemKind, ParseError> {
        self.expect_kw(Keyword::Type)?;
        if self.check(&TokenKind::Ident(String::new())) {
            let after_params = self.skip_angle_group(1);
            if matches!(self.peek(after_params), TokenKind::LBrace | TokenKind::Kw(Keyword::Where)) {
                return Ok(ItemKind::Struct(self.parse_struct_rest()?));
            }
        }

        let name = self.expect_ident()?;
        let type_params = self.parse_opt_type_params()?;
        if !self.match_token(&TokenKind::Eq) {
            return Err(self.error_expected("'=' or '{'"));
        }
        let ty = self.parse_type()?;
        self.expect_semi()?;
        Ok(ItemKind::TypeAlias(TypeAliasDecl { name, type_params, ty }))
    }

    /// Offset past a balanced `<...>` group starting at `peek(offset)`, or
    /// `offset` itself when there is none.
    fn skip_angle_group(&self, offset: usize) -> usize {
        if !matches!(self.peek(offset), TokenKind::Lt) {
            return offset;
        }
        let mut depth = 0usize;
        let mut i = offset;
        loop {
            match self.peek(i) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                TokenKind::Eof | TokenKind::LBrace | TokenKind::Semi | TokenKind::Eq => return i,
                _ => {}
            }
            i += 1;
        }
    }

    /// After `struct`/`type`: `Name<T> [where ...] { fields }`
    fn parse_struct_rest(&mut self) -> Result<StructDecl, ParseError> {
        let name = self.expect_ident()?;
        let type_params = self.parse_opt_type_params()?;
        let where_clause = self.parse_opt_where_clause()?;
        let fields = self.parse_field_decls()?;
        Ok(StructDecl { name, type_params, where_clause, fields })
    }

    /// `{ [var] name: Type [,|;] ... }`
    fn parse_field_decls(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.start();
            let is_var = self.match_kw(Keyword::Var);
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl { is_var, name, ty, span: self.span_from(start) });
            self.eat_member_separator();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(fields)
    }

    /// Optional `,` or `;` after a member.
    fn eat_member_separator(&mut self) {
        if !self.match_token(&TokenKind::Comma) {
            self.match_token(&TokenKind::Semi);
        }
    }

    fn parse_enum(&mut self) -> Result<EnumDecl, ParseError> {
        self.expect_kw(Keyword::Enum)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_opt_type_params()?;
        let where_clause = self.parse_opt_where_clause()?;
        self.expect(&TokenKind::LBrace)?;
        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            variants.push(self.parse_variant()?);
            self.eat_member_separator();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(EnumDecl { name, type_params, where_clause, variants })
    }

    /// `Name`, `Name(T, U)` or `Name { field: T }`
    fn parse_variant(&mut self) -> Result<Variant, ParseError> {
        let start = self.start();
        let name = self.expect_ident()?;
        let kind = match self.current_kind() {
            TokenKind::LParen => {
                self.advance();
                let mut types = Vec::new();
                while !self.check(&TokenKind::RParen) {
                    types.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
                VariantKind::Tuple(types)
            }
            TokenKind::LBrace => VariantKind::Struct(self.parse_field_decls()?),
            _ => VariantKind::Unit,
        };
        Ok(Variant { name, kind, span: self.span_from(start) })
    }

    // =========================================================================
    // Wire types
    // =========================================================================

    /// `wire struct Name { field: u32 @1 optional; }` / `wire enum Name { A, B }`
    fn parse_wire(&mut self) -> Result<WireDecl, ParseError> {
        self.expect_kw(Keyword::Wire)?;
        let kind = if self.match_kw(Keyword::Struct) {
            WireKind::Struct
        } else if self.match_kw(Keyword::Enum) {
            WireKind::Enum
        } else {
            return Err(self.error_expected("'struct' or 'enum'"));
        };
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.start();
            let member = if self.check_soft("reserved") && matches!(self.peek(1), TokenKind::LParen) {
                self.advance();
                let tags = self.parse_tag_list()?;
                WireMember::Reserved { tags, span: self.span_from(start) }
            } else if matches!(self.peek(1), TokenKind::Colon) {
                WireMember::Field(self.parse_wire_field()?)
            } else {
                WireMember::Variant(self.parse_variant()?)
            };
            members.push(member);
            self.eat_member_separator();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(WireDecl { kind, name, members })
    }

    /// `name: Type [@tag] [attrs...]`; duplicate tags are left to later passes.
    fn parse_wire_field(&mut self) -> Result<WireField, ParseError> {
        let start = self.start();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_wire_type()?;
        let tag = if self.match_token(&TokenKind::At) { Some(self.expect_int()?) } else { None };

        let mut attrs = Vec::new();
        loop {
            let attr = match self.current_kind() {
                TokenKind::Ident(word) if word == "optional" => WireAttr::Optional,
                TokenKind::Ident(word) if word == "deprecated" => WireAttr::Deprecated,
                TokenKind::Ident(word) if word == "default" => {
                    self.advance();
                    self.expect(&TokenKind::LParen)?;
                    let value = self.parse_expr()?;
                    self.expect(&TokenKind::RParen)?;
                    attrs.push(WireAttr::Default(value));
                    continue;
                }
                TokenKind::Ident(word) if word == "reserved" => {
                    self.advance();
                    attrs.push(WireAttr::Reserved(self.parse_tag_list()?));
                    continue;
                }
                _ => break,
            };
            self.advance();
            attrs.push(attr);
        }

        Ok(WireField { name, ty, tag, attrs, span: self.span_from(start) })
    }

    fn parse_wire_type(&mut self) -> Result<WireType, ParseError> {
        let name = match self.current_kind() {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.error_expected("wire type")),
        };
        self.advance();
        if name == "list" && self.match_token(&TokenKind::LBracket) {
            let inner = self.parse_wire_type()?;
            self.expect(&TokenKind::RBracket)?;
            return Ok(WireType::List(Box::new(inner)));
        }
        if WIRE_PRIMITIVES.contains(&name.as_str()) {
            Ok(WireType::Primitive(name))
        } else {
            Ok(WireType::Named(name))
        }
    }

    /// `(1, 2, 3)`
    fn parse_tag_list(&mut self) -> Result<Vec<u64>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut tags = vec![self.expect_int()?];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            tags.push(self.expect_int()?);
        }
        self.expect(&TokenKind::RParen)?;
        Ok(tags)
    }

    // =========================================================================
    // Traits and impls
    // =========================================================================

    fn parse_trait(&mut self) -> Result<TraitDecl, ParseError> {
        self.expect_kw(Keyword::Trait)?;
        let name = self.expect_ident()?;
        let type_params = self.parse_opt_type_params()?;
        let supertraits = if self.match_token(&TokenKind::Colon) { self.parse_bounds()? } else { Vec::new() };
        let where_clause = self.parse_opt_where_clause()?;

        let mut items = Vec::new();
        self.parse_members(|p| {
            if p.check_kw(Keyword::Type) {
                let start = p.start();
                p.advance();
                let name = p.expect_ident()?;
                let bounds = if p.match_token(&TokenKind::Colon) { p.parse_bounds()? } else { Vec::new() };
                let default = if p.match_token(&TokenKind::Eq) { Some(p.parse_type()?) } else { None };
                p.expect_semi()?;
                items.push(TraitItem::AssocType { name, bounds, default, span: p.span_from(start) });
            } else {
                items.push(TraitItem::Method(p.parse_fn(FnBody::Optional)?));
            }
            Ok(())
        })?;
        Ok(TraitDecl { name, type_params, supertraits, where_clause, items })
    }

    /// `impl<T> Trait<A> for Type where ... { }` or inherent `impl Type { }`
    fn parse_impl(&mut self) -> Result<ImplDecl, ParseError> {
        self.expect_kw(Keyword::Impl)?;
        let type_params = self.parse_opt_type_params()?;
        let first = self.parse_type()?;

        let (trait_ref, self_ty) = if self.match_kw(Keyword::For) {
            let trait_ref = match first.kind {
                TypeKind::Named { path, args } => TraitBound { name: path.join("::"), args, span: first.span },
                _ => {
                    return Err(ParseError::expected("trait name", &TokenKind::Kw(Keyword::For), first.span)
                        .with_hint("only named traits can be implemented"));
                }
            };
            (Some(trait_ref), self.parse_type()?)
        } else {
            (None, first)
        };

        let where_clause = self.parse_opt_where_clause()?;

        let mut items = Vec::new();
        self.parse_members(|p| {
            if p.check_kw(Keyword::Type) {
                let start = p.start();
                p.advance();
                let name = p.expect_ident()?;
                p.expect(&TokenKind::Eq)?;
                let ty = p.parse_type()?;
                p.expect_semi()?;
                items.push(ImplItem::AssocType { name, ty, span: p.span_from(start) });
            } else {
                items.push(ImplItem::Method(p.parse_fn(FnBody::Required)?));
            }
            Ok(())
        })?;
        Ok(ImplDecl { type_params, trait_ref, self_ty, where_clause, items })
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `[async] [gen] fn ...`
    fn parse_fn(&mut self, body: FnBody) -> Result<FnDecl, ParseError> {
        let start = self.start();
        let is_async = self.match_kw(Keyword::Async);
        let is_gen = self.match_kw(Keyword::Gen);
        let flavor = match (is_async, is_gen) {
            (false, false) => FnFlavor::Plain,
            (false, true) => FnFlavor::Gen,
            (true, false) => FnFlavor::Async,
            (true, true) => FnFlavor::AsyncGen,
        };
        self.expect_kw(Keyword::Fn)?;
        self.parse_fn_rest(start, flavor, body)
    }

    /// After `fn`: `name<T>(params) [-> T] [where ...] (body | ;)`
    fn parse_fn_rest(&mut self, start: usize, flavor: FnFlavor, body: FnBody) -> Result<FnDecl, ParseError> {
        let name = self.expect_ident()?;
        let type_params = self.parse_opt_type_params()?;
        let (params, _) = self.parse_params(false)?;
        let ret_ty = if self.match_token(&TokenKind::Arrow) { Some(self.parse_type()?) } else { None };
        if flavor.is_generator() && ret_ty.is_none() {
            return Err(self
                .error_expected("'->'")
                .with_hint("generators declare what they yield: gen fn name() -> T"));
        }
        let where_clause = self.parse_opt_where_clause()?;

        let body = if body == FnBody::Optional && self.check(&TokenKind::Semi) {
            self.advance();
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(FnDecl {
            flavor,
            name,
            type_params,
            params,
            ret_ty,
            where_clause,
            body,
            span: self.span_from(start),
        })
    }

    /// `(self, name: Type, ...)`; with `allow_variadic`, a trailing `...`
    /// is accepted and reported in the second value.
    fn parse_params(&mut self, allow_variadic: bool) -> Result<(Vec<Param>, bool), ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;
        while !self.check(&TokenKind::RParen) {
            if allow_variadic && self.match_token(&TokenKind::DotDotDot) {
                variadic = true;
                break;
            }
            let start = self.start();
            let (name, ty) = if self.match_kw(Keyword::SelfValue) {
                let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
                ("self".to_string(), ty)
            } else {
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                (name, Some(self.parse_type()?))
            };
            params.push(Param { name, ty, span: self.span_from(start) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok((params, variadic))
    }

    /// `extern "C" { fn name(params) [-> T]; }`
    fn parse_extern(&mut self) -> Result<ExternBlock, ParseError> {
        self.expect_kw(Keyword::Extern)?;
        let abi = self.expect_string()?;

        let mut fns = Vec::new();
        self.parse_members(|p| {
            let start = p.start();
            p.expect_kw(Keyword::Fn)?;
            let name = p.expect_ident()?;
            let (params, mut is_variadic) = p.parse_params(true)?;
            let ret_ty = if p.match_token(&TokenKind::Arrow) { Some(p.parse_type()?) } else { None };
            if p.match_token(&TokenKind::DotDotDot) {
                is_variadic = true;
            }
            p.expect_semi()?;
            fns.push(ExternFn { name, params, ret_ty, is_variadic, span: p.span_from(start) });
            Ok(())
        })?;
        Ok(ExternBlock { abi, fns })
    }

    // =========================================================================
    // Actors and supervisors
    // =========================================================================

    fn parse_actor(&mut self) -> Result<ActorDecl, ParseError> {
        self.expect_kw(Keyword::Actor)?;
        let name = self.expect_ident()?;
        let type_params: Vec<TypeParam> = self.parse_opt_type_params()?;
        let bounds = if self.match_token(&TokenKind::Colon) { self.parse_bounds()? } else { Vec::new() };
        let where_clause: Vec<WherePredicate> = self.parse_opt_where_clause()?;

        let mut init: Option<ActorInit> = None;
        let mut members = Vec::new();
        self.parse_members(|p| {
            let start = p.start();
            match p.current_kind() {
                TokenKind::Ident(word) if word == "init" && matches!(p.peek(1), TokenKind::LParen) => {
                    let keyword_span = p.advance();
                    let (params, _) = p.parse_params(false)?;
                    let body = p.parse_block()?;
                    let decl = ActorInit { params, body, span: p.span_from(start) };
                    if init.is_some() {
                        p.record_error(ParseError::duplicate("'init' block per actor", keyword_span));
                    } else {
                        init = Some(decl);
                    }
                }
                TokenKind::Kw(Keyword::Let | Keyword::Var) => {
                    let is_var = p.check_kw(Keyword::Var);
                    p.advance();
                    let name = p.expect_ident()?;
                    p.expect(&TokenKind::Colon)?;
                    let ty = p.parse_type()?;
                    let value = if p.match_token(&TokenKind::Eq) { Some(p.parse_expr()?) } else { None };
                    p.expect_semi()?;
                    members.push(ActorMember::Field { is_var, name, ty, init: value, span: p.span_from(start) });
                }
                TokenKind::Kw(Keyword::Mailbox) => members.push(ActorMember::Mailbox(p.parse_mailbox()?)),
                TokenKind::Ident(word) if word == "receive" => {
                    p.advance();
                    let flavor = if p.match_kw(Keyword::Gen) { FnFlavor::Gen } else { FnFlavor::Plain };
                    p.expect_kw(Keyword::Fn)?;
                    members.push(ActorMember::Receive(p.parse_fn_rest(start, flavor, FnBody::Required)?));
                }
                TokenKind::Kw(Keyword::Fn | Keyword::Gen | Keyword::Async) => {
                    members.push(ActorMember::Method(p.parse_fn(FnBody::Required)?));
                }
                _ => return Err(p.error_expected("actor member")),
            }
            Ok(())
        })?;

        Ok(ActorDecl { name, type_params, bounds, where_clause, init, members })
    }

    /// `mailbox 100 [overflow policy];`
    fn parse_mailbox(&mut self) -> Result<MailboxDecl, ParseError> {
        let start = self.start();
        self.expect_kw(Keyword::Mailbox)?;
        let capacity = self.expect_int()?;
        let overflow = if self.match_soft("overflow") { Some(self.parse_overflow_policy()?) } else { None };
        self.expect_semi()?;
        Ok(MailboxDecl { capacity, overflow, span: self.span_from(start) })
    }

    fn parse_overflow_policy(&mut self) -> Result<OverflowPolicy, ParseError> {
        let word = match self.current_kind() {
            TokenKind::Ident(word) => word.clone(),
            _ => return Err(self.error_expected("overflow policy")),
        };

        if word == "coalesce" {
            self.advance();
            self.expect(&TokenKind::LParen)?;
            let reducer = self.expect_ident()?;
            self.expect(&TokenKind::RParen)?;
            let fallback = if self.match_soft("fallback") { Some(self.parse_overflow_fallback()?) } else { None };
            return Ok(OverflowPolicy::Coalesce { reducer, fallback });
        }

        match OverflowFallback::from_name(&word) {
            Some(simple) => {
                self.advance();
                Ok(match simple {
                    OverflowFallback::Block => OverflowPolicy::Block,
                    OverflowFallback::DropNew => OverflowPolicy::DropNew,
                    OverflowFallback::DropOld => OverflowPolicy::DropOld,
                    OverflowFallback::Fail => OverflowPolicy::Fail,
                })
            }
            None => Err(self.error_expected("overflow policy")),
        }
    }

    /// Policy after `fallback`; `coalesce` cannot nest.
    fn parse_overflow_fallback(&mut self) -> Result<OverflowFallback, ParseError> {
        let fallback = match self.current_kind() {
            TokenKind::Ident(word) => OverflowFallback::from_name(word),
            _ => None,
        };
        match fallback {
            Some(fallback) => {
                self.advance();
                Ok(fallback)
            }
            None => Err(self.error_expected("fallback policy")),
        }
    }

    fn parse_supervisor(&mut self) -> Result<SupervisorDecl, ParseError> {
        self.expect_kw(Keyword::Supervisor)?;
        let name = self.expect_ident()?;

        let mut members = Vec::new();
        self.parse_members(|p| {
            let start = p.start();
            // `child: 3` is an ordinary field named `child`
            if p.check_soft("child") && !matches!(p.peek(1), TokenKind::Colon) {
                members.push(SupervisorMember::Child(p.parse_child_spec()?));
            } else {
                let name = p.expect_ident()?;
                p.expect(&TokenKind::Colon)?;
                let value = p.parse_expr()?;
                members.push(SupervisorMember::Field { name, value, span: p.span_from(start) });
                p.eat_member_separator();
            }
            Ok(())
        })?;
        Ok(SupervisorDecl { name, members })
    }

    /// `child name: Actor [restart(policy) [budget(n, window)] [strategy(s)]];`
    fn parse_child_spec(&mut self) -> Result<ChildSpec, ParseError> {
        let start = self.start();
        self.expect_soft("child")?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let actor = self.expect_ident()?;

        let restart = if self.match_soft("restart") {
            let policy = self.parse_named_arg("restart policy", RestartPolicy::from_name)?;
            let budget = if self.match_soft("budget") {
                self.expect(&TokenKind::LParen)?;
                let max_restarts = self.expect_int()?;
                self.expect(&TokenKind::Comma)?;
                let window = self.parse_duration()?;
                self.expect(&TokenKind::RParen)?;
                Some(RestartBudget { max_restarts, window })
            } else {
                None
            };
            let strategy = if self.match_soft("strategy") {
                Some(self.parse_named_arg("restart strategy", RestartStrategy::from_name)?)
            } else {
                None
            };
            Some(RestartSpec { policy, budget, strategy })
        } else {
            None
        };

        self.expect_semi()?;
        Ok(ChildSpec { name, actor, restart, span: self.span_from(start) })
    }

    /// `(word)` where `word` must map through `from_name`.
    fn parse_named_arg<T>(&mut self, what: &str, from_name: fn(&str) -> Option<T>) -> Result<T, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let value = match self.current_kind() {
            TokenKind::Ident(word) => from_name(word),
            _ => None,
        };
        let Some(value) = value else {
            return Err(self.error_expected(what));
        };
        self.advance();
        self.expect(&TokenKind::RParen)?;
        Ok(value)
    }
}

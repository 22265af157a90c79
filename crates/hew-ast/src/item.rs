// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Top-level and nested declarations.

use crate::expr::{Duration, Expr};
use crate::stmt::Block;
use crate::ty::{TraitBound, TypeExpr, TypeParam, WherePredicate};
use crate::{NodeId, Span};

/// A whole compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
    pub span: Span,
}

/// A declaration with its visibility.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: NodeId,
    pub vis: Visibility,
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    /// `pub`
    Public,
    /// `pub(package)`
    Package,
    /// `pub(super)`
    Super,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Import(ImportDecl),
    Const(ConstDecl),
    TypeAlias(TypeAliasDecl),
    /// `struct Name { }` and `type Name { }`
    Struct(StructDecl),
    Enum(EnumDecl),
    Wire(WireDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    Fn(FnDecl),
    Extern(ExternBlock),
    Actor(ActorDecl),
    Supervisor(SupervisorDecl),
}

impl ItemKind {
    /// Declared name, if the item has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ItemKind::Const(d) => Some(&d.name),
            ItemKind::TypeAlias(d) => Some(&d.name),
            ItemKind::Struct(d) => Some(&d.name),
            ItemKind::Enum(d) => Some(&d.name),
            ItemKind::Wire(d) => Some(&d.name),
            ItemKind::Trait(d) => Some(&d.name),
            ItemKind::Fn(d) => Some(&d.name),
            ItemKind::Actor(d) => Some(&d.name),
            ItemKind::Supervisor(d) => Some(&d.name),
            ItemKind::Import(_) | ItemKind::Impl(_) | ItemKind::Extern(_) => None,
        }
    }
}

// ---- imports / consts / aliases ----

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: Vec<String>,
    pub spec: ImportSpec,
}

#[derive(Debug, Clone)]
pub enum ImportSpec {
    /// `import std::net`
    Module,
    /// `import std::net::{a, b}`
    Names(Vec<String>),
    /// `import std::net::*`
    Glob,
}

#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeExpr,
}

// ---- structs / enums ----

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub where_clause: Vec<WherePredicate>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub is_var: bool,
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub where_clause: Vec<WherePredicate>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub kind: VariantKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum VariantKind {
    Unit,
    Tuple(Vec<TypeExpr>),
    Struct(Vec<FieldDecl>),
}

// ---- wire ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Struct,
    Enum,
}

#[derive(Debug, Clone)]
pub struct WireDecl {
    pub kind: WireKind,
    pub name: String,
    pub members: Vec<WireMember>,
}

#[derive(Debug, Clone)]
pub enum WireMember {
    Field(WireField),
    Variant(Variant),
    /// `reserved(3, 4);` at member level
    Reserved { tags: Vec<u64>, span: Span },
}

/// `name: Type @tag attrs...;`
#[derive(Debug, Clone)]
pub struct WireField {
    pub name: String,
    pub ty: WireType,
    pub tag: Option<u64>,
    pub attrs: Vec<WireAttr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum WireType {
    /// `u8`..`u64`, `i8`..`i64`, `f32`, `f64`, `bool`, `bytes`, `string`
    Primitive(String),
    Named(String),
    /// `list[T]`
    List(Box<WireType>),
}

#[derive(Debug, Clone)]
pub enum WireAttr {
    Optional,
    Deprecated,
    Default(Expr),
    Reserved(Vec<u64>),
}

impl WireField {
    pub fn is_optional(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, WireAttr::Optional))
    }
}

// ---- traits / impls ----

#[derive(Debug, Clone)]
pub struct TraitDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub supertraits: Vec<TraitBound>,
    pub where_clause: Vec<WherePredicate>,
    pub items: Vec<TraitItem>,
}

#[derive(Debug, Clone)]
pub enum TraitItem {
    /// Signature only (`body: None`) or with a default body
    Method(FnDecl),
    /// `type Item: Bound = Default;`
    AssocType {
        name: String,
        bounds: Vec<TraitBound>,
        default: Option<TypeExpr>,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct ImplDecl {
    pub type_params: Vec<TypeParam>,
    /// `None` for an inherent impl
    pub trait_ref: Option<TraitBound>,
    pub self_ty: TypeExpr,
    pub where_clause: Vec<WherePredicate>,
    pub items: Vec<ImplItem>,
}

#[derive(Debug, Clone)]
pub enum ImplItem {
    Method(FnDecl),
    AssocType {
        name: String,
        ty: TypeExpr,
        span: Span,
    },
}

// ---- functions ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FnFlavor {
    #[default]
    Plain,
    /// `gen fn`
    Gen,
    /// `async fn`
    Async,
    /// `async gen fn`
    AsyncGen,
}

impl FnFlavor {
    pub fn is_generator(self) -> bool {
        matches!(self, FnFlavor::Gen | FnFlavor::AsyncGen)
    }
}

/// A function declaration, also used for trait/impl methods and actor handlers.
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub flavor: FnFlavor,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    /// For generators this is the yield type.
    pub ret_ty: Option<TypeExpr>,
    pub where_clause: Vec<WherePredicate>,
    /// `None` for a `;`-terminated signature
    pub body: Option<Block>,
    pub span: Span,
}

/// `name: Type`; `ty` is `None` only for a bare `self`.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

// ---- extern ----

#[derive(Debug, Clone)]
pub struct ExternBlock {
    pub abi: String,
    pub fns: Vec<ExternFn>,
}

#[derive(Debug, Clone)]
pub struct ExternFn {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_ty: Option<TypeExpr>,
    pub is_variadic: bool,
    pub span: Span,
}

// ---- actors ----

#[derive(Debug, Clone)]
pub struct ActorDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub bounds: Vec<TraitBound>,
    pub where_clause: Vec<WherePredicate>,
    pub init: Option<ActorInit>,
    pub members: Vec<ActorMember>,
}

/// `init(params) { body }`
#[derive(Debug, Clone)]
pub struct ActorInit {
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ActorMember {
    /// `let|var name: Type [= expr];`
    Field {
        is_var: bool,
        name: String,
        ty: TypeExpr,
        init: Option<Expr>,
        span: Span,
    },
    Mailbox(MailboxDecl),
    /// `receive [gen] fn`
    Receive(FnDecl),
    Method(FnDecl),
}

/// `mailbox N [overflow policy];`
#[derive(Debug, Clone)]
pub struct MailboxDecl {
    pub capacity: u64,
    pub overflow: Option<OverflowPolicy>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverflowPolicy {
    Block,
    DropNew,
    DropOld,
    Fail,
    /// `coalesce(reducer) [fallback policy]`
    Coalesce {
        reducer: String,
        fallback: Option<OverflowFallback>,
    },
}

/// Policies allowed after `fallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowFallback {
    Block,
    DropNew,
    DropOld,
    Fail,
}

impl OverflowFallback {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "block" => OverflowFallback::Block,
            "drop_new" => OverflowFallback::DropNew,
            "drop_old" => OverflowFallback::DropOld,
            "fail" => OverflowFallback::Fail,
            _ => return None,
        })
    }
}

// ---- supervisors ----

#[derive(Debug, Clone)]
pub struct SupervisorDecl {
    pub name: String,
    pub members: Vec<SupervisorMember>,
}

#[derive(Debug, Clone)]
pub enum SupervisorMember {
    Child(ChildSpec),
    /// `name: expr;`
    Field {
        name: String,
        value: Expr,
        span: Span,
    },
}

/// `child name: Actor [restart(...) [budget(...)] [strategy(...)]];`
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub name: String,
    pub actor: String,
    pub restart: Option<RestartSpec>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartSpec {
    pub policy: RestartPolicy,
    pub budget: Option<RestartBudget>,
    pub strategy: Option<RestartStrategy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Permanent,
    Transient,
    Temporary,
}

/// At most `max_restarts` within `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartBudget {
    pub max_restarts: u64,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStrategy {
    OneForOne,
    OneForAll,
    RestForOne,
}

impl RestartPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "permanent" => RestartPolicy::Permanent,
            "transient" => RestartPolicy::Transient,
            "temporary" => RestartPolicy::Temporary,
            _ => return None,
        })
    }
}

impl RestartStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "one_for_one" => RestartStrategy::OneForOne,
            "one_for_all" => RestartStrategy::OneForAll,
            "rest_for_one" => RestartStrategy::RestForOne,
            _ => return None,
        })
    }
}

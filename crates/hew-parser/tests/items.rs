// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration-level parsing: actors, supervisors, wire types, traits and friends.

use hew_ast::expr::{DurationUnit, ExprKind};
use hew_ast::item::{
    ActorMember, FnFlavor, ImplItem, Item, ItemKind, OverflowFallback, OverflowPolicy, RestartPolicy,
    RestartStrategy, SupervisorMember, TraitItem, VariantKind, WireAttr, WireMember, WireType,
};
use hew_ast::ty::TypeKind;
use hew_parser::parse_source;
use pretty_assertions::assert_eq;

fn items(src: &str) -> Vec<Item> {
    let result = parse_source(src);
    assert!(result.is_ok(), "Parse errors in {src:?}: {:?}", result.errors);
    result.program.items
}

fn single(src: &str) -> ItemKind {
    let mut items = items(src);
    assert_eq!(items.len(), 1, "expected one item in {src:?}");
    items.remove(0).kind
}

#[test]
fn actor_with_every_member_kind() {
    let src = r#"
actor Counter<T: Send>: Service where T: Clone {
    var count: i32 = 0;
    let name: string;
    mailbox 100 overflow coalesce(merge) fallback drop_old;

    init(start: i32) {
        self.count = start;
    }

    receive fn increment(by: i32) {
        self.count += by;
    }

    receive gen fn drain() -> T {
        yield self.count;
    }

    fn current(self) -> i32 {
        self.count
    }
}
"#;
    let ItemKind::Actor(actor) = single(src) else {
        panic!("expected actor");
    };
    assert_eq!(actor.name, "Counter");
    assert_eq!(actor.type_params.len(), 1);
    assert_eq!(actor.bounds[0].name, "Service");
    assert_eq!(actor.where_clause.len(), 1);
    assert_eq!(actor.init.as_ref().map(|i| i.params.len()), Some(1));
    assert_eq!(actor.members.len(), 6);

    match &actor.members[2] {
        ActorMember::Mailbox(mailbox) => {
            assert_eq!(mailbox.capacity, 100);
            assert_eq!(
                mailbox.overflow,
                Some(OverflowPolicy::Coalesce {
                    reducer: "merge".to_string(),
                    fallback: Some(OverflowFallback::DropOld),
                })
            );
        }
        other => panic!("expected mailbox, got {other:?}"),
    }
    assert!(matches!(&actor.members[0], ActorMember::Field { is_var: true, init: Some(_), .. }));
    assert!(matches!(&actor.members[1], ActorMember::Field { is_var: false, init: None, .. }));
    assert!(matches!(&actor.members[3], ActorMember::Receive(f) if f.flavor == FnFlavor::Plain));
    assert!(matches!(&actor.members[4], ActorMember::Receive(f) if f.flavor == FnFlavor::Gen));
    assert!(matches!(&actor.members[5], ActorMember::Method(_)));
}

#[test]
fn simple_overflow_policies() {
    for (word, expected) in [
        ("block", OverflowPolicy::Block),
        ("drop_new", OverflowPolicy::DropNew),
        ("drop_old", OverflowPolicy::DropOld),
        ("fail", OverflowPolicy::Fail),
    ] {
        let src = format!("actor A {{ mailbox 8 overflow {word}; }}");
        let ItemKind::Actor(actor) = single(&src) else {
            panic!("expected actor");
        };
        match &actor.members[0] {
            ActorMember::Mailbox(m) => assert_eq!(m.overflow.as_ref(), Some(&expected)),
            other => panic!("expected mailbox, got {other:?}"),
        }
    }
}

#[test]
fn coalesce_cannot_fall_back_to_coalesce() {
    let result = parse_source("actor A { mailbox 8 overflow coalesce(f) fallback coalesce(g); }");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().contains("fallback policy"));
}

#[test]
fn second_init_is_reported_once() {
    let result = parse_source("actor A { init() {} init() {} }");
    assert_eq!(result.errors.len(), 1);
    let ItemKind::Actor(actor) = &result.program.items[0].kind else {
        panic!("expected actor");
    };
    assert!(actor.init.is_some());
}

#[test]
fn supervisor_children_and_fields() {
    let src = r#"
supervisor App {
    strategy: one_for_all,
    max_restarts: 5;
    child: 3
    child db: Database restart(permanent) budget(5, 30s) strategy(rest_for_one);
    child cache: Cache;
}
"#;
    let ItemKind::Supervisor(sup) = single(src) else {
        panic!("expected supervisor");
    };
    assert_eq!(sup.members.len(), 5);
    assert!(matches!(&sup.members[2], SupervisorMember::Field { name, .. } if name == "child"));

    let SupervisorMember::Child(db) = &sup.members[3] else {
        panic!("expected child spec");
    };
    assert_eq!(db.name, "db");
    assert_eq!(db.actor, "Database");
    let restart = db.restart.as_ref().unwrap();
    assert_eq!(restart.policy, RestartPolicy::Permanent);
    let budget = restart.budget.unwrap();
    assert_eq!(budget.max_restarts, 5);
    assert_eq!(budget.window.unit, DurationUnit::Seconds);
    assert_eq!(budget.window.value, 30);
    assert_eq!(restart.strategy, Some(RestartStrategy::RestForOne));

    assert!(matches!(&sup.members[4], SupervisorMember::Child(c) if c.restart.is_none()));
}

#[test]
fn wire_struct_fields() {
    let src = r#"
wire struct User {
    name: string @1;
    email: string @2 optional deprecated;
    tags: list[string] @3 default([]);
    id: u32 @1 optional;
    reserved(7, 8);
    owner: Account @9 reserved(10)
}
"#;
    let ItemKind::Wire(wire) = single(src) else {
        panic!("expected wire declaration");
    };
    assert_eq!(wire.members.len(), 6);

    let fields: Vec<_> = wire
        .members
        .iter()
        .filter_map(|m| match m {
            WireMember::Field(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[1].attrs.len(), 2);
    assert!(fields[1].is_optional());
    assert!(matches!(&fields[2].ty, WireType::List(inner) if matches!(**inner, WireType::Primitive(ref p) if p == "string")));
    assert!(matches!(fields[2].attrs[0], WireAttr::Default(_)));
    // duplicate tags are accepted here
    assert_eq!(fields[3].tag, Some(1));
    assert!(fields[3].is_optional());
    assert!(matches!(&fields[4].ty, WireType::Named(n) if n == "Account"));
    assert!(matches!(&fields[4].attrs[0], WireAttr::Reserved(tags) if tags == &[10]));
    assert!(matches!(&wire.members[4], WireMember::Reserved { tags, .. } if tags == &[7, 8]));
}

#[test]
fn wire_enum_variants() {
    let ItemKind::Wire(wire) = single("wire enum Status { Active, Suspended(string), Gone { at: u64 } }") else {
        panic!("expected wire declaration");
    };
    assert_eq!(wire.members.len(), 3);
    assert!(matches!(&wire.members[1], WireMember::Variant(v) if matches!(v.kind, VariantKind::Tuple(_))));
    assert!(matches!(&wire.members[2], WireMember::Variant(v) if matches!(v.kind, VariantKind::Struct(_))));
}

#[test]
fn type_keyword_declares_alias_or_struct() {
    let items = items("type Id = u64;\ntype Pair<T> = (T, T);\ntype Point { x: f64, y: f64 }\ntype Boxed<T> where T: Clone { v: T }");
    assert!(matches!(&items[0].kind, ItemKind::TypeAlias(a) if a.name == "Id"));
    assert!(matches!(&items[1].kind, ItemKind::TypeAlias(a) if matches!(a.ty.kind, TypeKind::Tuple(_))));
    assert!(matches!(&items[2].kind, ItemKind::Struct(s) if s.fields.len() == 2));
    assert!(matches!(&items[3].kind, ItemKind::Struct(s) if s.where_clause.len() == 1));
}

#[test]
fn struct_and_enum_declarations() {
    let items = items(
        "struct Point<T> { var x: T; y: T }\nenum Shape { Circle(f64), Rect { w: f64, h: f64 }, Empty }",
    );
    let ItemKind::Struct(s) = &items[0].kind else {
        panic!("expected struct");
    };
    assert!(s.fields[0].is_var);
    assert!(!s.fields[1].is_var);
    let ItemKind::Enum(e) = &items[1].kind else {
        panic!("expected enum");
    };
    assert_eq!(e.variants.len(), 3);
    assert!(matches!(e.variants[2].kind, VariantKind::Unit));
}

#[test]
fn traits_and_impls() {
    let src = r#"
trait Shape: Display + Send {
    type Unit: Copy = f64;
    fn area(self) -> f64;
    fn describe(self) -> string { "shape" }
}

impl<T> Shape for Circle<T> where T: Float {
    type Unit = T;
    fn area(self) -> f64 { 3.14 * self.r * self.r }
}

impl Circle {
    fn new(r: f64) -> Circle { Circle { r } }
}
"#;
    let items = items(src);
    let ItemKind::Trait(t) = &items[0].kind else {
        panic!("expected trait");
    };
    assert_eq!(t.supertraits.len(), 2);
    assert!(matches!(&t.items[0], TraitItem::AssocType { default: Some(_), bounds, .. } if bounds.len() == 1));
    assert!(matches!(&t.items[1], TraitItem::Method(f) if f.body.is_none()));
    assert!(matches!(&t.items[2], TraitItem::Method(f) if f.body.is_some()));

    let ItemKind::Impl(imp) = &items[1].kind else {
        panic!("expected impl");
    };
    assert_eq!(imp.trait_ref.as_ref().map(|t| t.name.as_str()), Some("Shape"));
    assert_eq!(imp.self_ty.name(), Some("Circle"));
    assert_eq!(imp.where_clause.len(), 1);
    assert!(matches!(imp.items[0], ImplItem::AssocType { .. }));

    let ItemKind::Impl(inherent) = &items[2].kind else {
        panic!("expected impl");
    };
    assert!(inherent.trait_ref.is_none());
}

#[test]
fn function_flavors() {
    let items = items(
        "fn a() {}\ngen fn b() -> i32 { yield 1; }\nasync fn c() {}\nasync gen fn d() -> i32 { yield 2; }",
    );
    let flavors: Vec<_> = items
        .iter()
        .map(|i| match &i.kind {
            ItemKind::Fn(f) => f.flavor,
            other => panic!("expected fn, got {other:?}"),
        })
        .collect();
    assert_eq!(flavors, vec![FnFlavor::Plain, FnFlavor::Gen, FnFlavor::Async, FnFlavor::AsyncGen]);
}

#[test]
fn generator_without_yield_type_is_an_error() {
    let result = parse_source("gen fn numbers() { yield 1; }");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().contains("'->'"));
}

#[test]
fn extern_blocks() {
    let ItemKind::Extern(ext) = single(r#"extern "C" { fn printf(fmt: *const u8, ...) -> i32; fn abort(); }"#) else {
        panic!("expected extern block");
    };
    assert_eq!(ext.abi, "C");
    assert_eq!(ext.fns.len(), 2);
    assert!(ext.fns[0].is_variadic);
    assert!(!ext.fns[1].is_variadic);
}

#[test]
fn const_items() {
    let ItemKind::Const(c) = single("const TIMEOUT: Duration = 250ms;") else {
        panic!("expected const");
    };
    assert_eq!(c.name, "TIMEOUT");
    assert!(matches!(c.value.kind, ExprKind::Duration(_)));
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error recovery: every test checks both the reported errors and how much of
//! the tree survives them.

use hew_ast::item::{ActorMember, ImplItem, ItemKind, SupervisorMember, TraitItem};
use hew_ast::stmt::StmtKind;
use hew_parser::{parse_source, parse_source_with, ParseErrorKind, ParseOptions, ParseResult, SyntaxError};

/// Kinds of the parser errors, in order. Lex errors are not expected here.
fn parse_error_kinds(result: &ParseResult) -> Vec<ParseErrorKind> {
    result
        .errors
        .iter()
        .map(|e| match e {
            SyntaxError::Parse(e) => e.kind,
            SyntaxError::Lex(e) => panic!("unexpected lex error: {e}"),
        })
        .collect()
}

fn item_names(result: &ParseResult) -> Vec<&str> {
    result.program.items.iter().filter_map(|i| i.kind.name()).collect()
}

fn fn_body_len(result: &ParseResult, name: &str) -> usize {
    result
        .program
        .items
        .iter()
        .find_map(|i| match &i.kind {
            ItemKind::Fn(f) if f.name == name => f.body.as_ref().map(|b| b.stmts.len()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function named {name}"))
}

#[test]
fn missing_semicolon_at_line_end_is_one_error() {
    let result = parse_source("fn main() {\n    let a = 1\n    let b = a + 1\n    b\n}\n");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::MissingToken, ParseErrorKind::MissingToken]);
    assert_eq!(fn_body_len(&result, "main"), 3);

    let SyntaxError::Parse(first) = &result.errors[0] else {
        panic!("expected parse error");
    };
    assert_eq!(first.note.as_deref(), Some("inserted missing ';'"));
    // right after `1`, before the line break
    assert_eq!(first.span.start, "fn main() {\n    let a = 1".len());
}

#[test]
fn missing_semicolon_before_closing_brace() {
    let result = parse_source("fn f() { return 1 }");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::MissingToken]);
    assert_eq!(fn_body_len(&result, "f"), 1);
}

#[test]
fn bad_statement_keeps_the_rest_of_the_block() {
    let result = parse_source("fn f() { let x = ; let y = 2; y }");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken]);
    assert!(result.errors[0].to_string().contains("expression"));
    assert_eq!(fn_body_len(&result, "f"), 2);
}

#[test]
fn bad_item_synchronizes_to_the_next_item() {
    let src = "fn a() { let = ; }\nstruct S { x: }\nfn b() {}\n";
    let result = parse_source(src);
    assert_eq!(result.errors.len(), 2, "errors: {:?}", result.errors);
    assert_eq!(item_names(&result), vec!["a", "b"]);
}

#[test]
fn stray_tokens_between_items() {
    let result = parse_source("fn a() {}\n) ) 42\nfn b() {}");
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert!(result.errors[0].to_string().starts_with("Expected item"));
    assert_eq!(item_names(&result), vec!["a", "b"]);
}

#[test]
fn equals_instead_of_colon_gets_a_hint() {
    let result = parse_source("struct Point { x = f64 }");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].hint(), Some("use ':' for types, '=' for values"));
}

#[test]
fn unclosed_block_at_end_of_input() {
    let result = parse_source("fn main() {\n    let x = 1;\n");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::MissingToken]);
    assert_eq!(result.errors[0].to_string(), "Unclosed '{' - missing '}'");
}

#[test]
fn error_budget_caps_reports() {
    let src = "fn f() { let = 1; }\n".repeat(30);
    let result = parse_source_with(&src, ParseOptions::default().max_errors(5));
    assert_eq!(result.errors.len(), 5);

    let unlimited = parse_source(&src);
    assert_eq!(unlimited.errors.len(), ParseOptions::default().max_errors);
}

#[test]
fn deep_parentheses_hit_the_nesting_limit_once() {
    let nested = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    let src = format!("fn main() {{ let x = {nested}; let y = 2; }}");
    let result = parse_source_with(&src, ParseOptions::default().max_depth(32));
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::TooDeep]);
    // the `let y` after the runaway expression still parses
    assert_eq!(fn_body_len(&result, "main"), 1);
}

#[test]
fn deep_blocks_hit_the_nesting_limit_once() {
    let src = format!("fn main() {{ {}{} x(); }}", "{".repeat(100), "}".repeat(100));
    let result = parse_source_with(&src, ParseOptions::default().max_depth(16));
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::TooDeep]);
    assert_eq!(fn_body_len(&result, "main"), 2);
}

#[test]
fn nesting_up_to_the_default_limit_parses() {
    let parens = format!("{}1{}", "(".repeat(240), ")".repeat(240));
    let result = parse_source(&format!("fn main() {{ let x = {parens}; }}"));
    assert!(result.is_ok(), "errors: {:?}", result.errors);

    let ifs = format!("{}{}", "if x { ".repeat(120), "} ".repeat(120));
    let result = parse_source(&format!("fn main() {{ {ifs}}}"));
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(fn_body_len(&result, "main"), 1);
}

#[test]
fn runaway_nesting_under_default_options_reports_once() {
    let nested = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let result = parse_source(&format!("fn main() {{ let x = {nested}; let y = 2; }}"));
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::TooDeep]);

    let blocks = format!("fn main() {{ {}{} }}", "{".repeat(3000), "}".repeat(3000));
    let result = parse_source(&blocks);
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::TooDeep]);
}

#[test]
fn nesting_within_the_limit_is_fine() {
    let nested = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let result = parse_source_with(&format!("const X: i32 = {nested};"), ParseOptions::default().max_depth(64));
    assert!(result.is_ok(), "errors: {:?}", result.errors);
}

#[test]
fn statement_recovery_stops_at_keywords() {
    let result = parse_source("fn f() {\n    x y z\n    return 1;\n}");
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    let ItemKind::Fn(f) = &result.program.items[0].kind else {
        panic!("expected fn");
    };
    let body = f.body.as_ref().unwrap();
    assert!(matches!(body.stmts.last().map(|s| &s.kind), Some(StmtKind::Return(Some(_)))));
}

#[test]
fn lex_errors_do_not_stop_parsing() {
    let result = parse_source("fn a() { let c = 1 # 2; }\nfn b() {}");
    assert!(result.errors.iter().any(|e| matches!(e, SyntaxError::Lex(_))));
    assert_eq!(item_names(&result), vec!["a", "b"]);
}

#[test]
fn bad_actor_member_keeps_the_actor() {
    let result = parse_source("actor A {\n    mailbox x;\n    fn helper() {}\n}\nfn main() {}");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken]);
    assert_eq!(item_names(&result), vec!["A", "main"]);

    let ItemKind::Actor(actor) = &result.program.items[0].kind else {
        panic!("expected actor");
    };
    let methods: Vec<_> = actor
        .members
        .iter()
        .filter_map(|m| match m {
            ActorMember::Method(f) => Some(f.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(methods, vec!["helper"]);
}

#[test]
fn bad_trait_method_keeps_the_rest_of_the_trait() {
    let result = parse_source("trait T { fn a(self) -> ; fn b(self); }");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken]);
    assert_eq!(item_names(&result), vec!["T"]);

    let ItemKind::Trait(t) = &result.program.items[0].kind else {
        panic!("expected trait");
    };
    let names: Vec<_> = t
        .items
        .iter()
        .filter_map(|i| match i {
            TraitItem::Method(f) => Some(f.name.as_str()),
            TraitItem::AssocType { .. } => None,
        })
        .collect();
    assert_eq!(names, vec!["b"]);
}

#[test]
fn bad_impl_method_skips_its_body() {
    let src = "impl Counter {\n    fn a(self) { 1 }\n    fn b(self, x) { x }\n    fn c(self) {}\n}";
    let result = parse_source(src);
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken]);

    let ItemKind::Impl(imp) = &result.program.items[0].kind else {
        panic!("expected impl");
    };
    let names: Vec<_> = imp
        .items
        .iter()
        .filter_map(|i| match i {
            ImplItem::Method(f) => Some(f.name.as_str()),
            ImplItem::AssocType { .. } => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn bad_child_spec_keeps_the_next_child() {
    let result = parse_source("supervisor S {\n    child a: A restart(sometimes);\n    child b: B;\n}");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken]);

    let ItemKind::Supervisor(sup) = &result.program.items[0].kind else {
        panic!("expected supervisor");
    };
    let children: Vec<_> = sup
        .members
        .iter()
        .filter_map(|m| match m {
            SupervisorMember::Child(c) => Some(c.name.as_str()),
            SupervisorMember::Field { .. } => None,
        })
        .collect();
    assert_eq!(children, vec!["b"]);
}

#[test]
fn item_recovery_stops_after_semicolon() {
    let result = parse_source("const A: i32 = ;\nfoo bar;\nfn b() {}");
    assert_eq!(parse_error_kinds(&result), vec![ParseErrorKind::UnexpectedToken, ParseErrorKind::UnexpectedToken]);
    assert!(result.errors[1].to_string().starts_with("Expected item"));
    assert_eq!(item_names(&result), vec!["b"]);
}

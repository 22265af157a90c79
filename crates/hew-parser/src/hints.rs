// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use hew_ast::token::{Keyword, TokenKind};

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Colon hints
        ("':'", TokenKind::Eq) => Some("use ':' for types, '=' for values"),
        ("':'", _) => Some("syntax: name: Type"),

        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),

        // Parentheses hints
        ("'('", _) => Some("parameter and argument lists need parentheses"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("')'", _) => None,

        // Bracket hints
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("']'", _) => None,

        // Generic angle bracket
        ("'>'", _) => Some("close the generic parameter list with '>'"),

        ("'=>'", TokenKind::Arrow) => Some("arms use '=>', return types use '->'"),
        ("'=>'", _) => Some("separate the pattern from the arm body with '=>'"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Name/identifier hints
        ("a name", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("a name", TokenKind::Kw(_)) => Some("keywords can't be used as names"),
        ("a name", _) => Some("names start with a letter or '_'"),

        // String hints
        ("a string", _) => Some("expected a quoted string like \"C\""),

        // Type hints
        ("type", _) => Some("try a type like 'i32', 'string', or a struct name"),
        ("wire type", _) => Some("wire fields use primitives, named wire types or list[T]"),

        // Pattern hints
        ("pattern", _) => Some("try a name, literal, or constructor like Some(x)"),

        // Item hints
        ("item", _) => Some("start with 'fn', 'struct', 'enum', 'actor', 'import', etc."),
        ("actor member", _) => {
            Some("actors contain 'init', 'let'/'var' fields, 'mailbox', 'receive fn' and 'fn'")
        }

        ("overflow policy", _) => Some("one of block, drop_new, drop_old, fail, coalesce(fn)"),
        ("fallback policy", _) => Some("a coalesce fallback is one of block, drop_new, drop_old, fail"),
        ("duration", _) => Some("durations are an integer with a unit: ns, us, ms, s, m, h"),

        // Statement terminator
        ("';'", _) => Some("end statements with ';'"),

        _ => None,
    }
}

/// Closest item keyword to a misspelled word, e.g. `fun` -> `fn`.
pub fn suggest_item_keyword(word: &str) -> Option<&'static str> {
    let max_distance = (word.len() / 3).max(1);
    Keyword::ALL
        .iter()
        .filter(|kw| kw.starts_item())
        .map(|kw| kw.as_str())
        .map(|kw| (kw, edit_distance(word, kw)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(kw, _)| kw)
}

/// Levenshtein distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

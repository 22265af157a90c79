// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Hew language.
//!
//! Transforms a token stream into an abstract syntax tree. Syntax errors are
//! collected rather than returned: the parser recovers at statement and item
//! boundaries and always produces a tree.

mod context;
mod hints;
mod options;
mod parser;
mod stack;

pub use options::ParseOptions;
pub use parser::{ParseError, ParseErrorKind, Parser};

use hew_ast::expr::Expr;
use hew_ast::item::Program;
use hew_ast::token::Token;
use hew_ast::Span;
use hew_lexer::LexError;

/// Any error found while turning source text into a tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(e) => e.span,
            SyntaxError::Parse(e) => e.span,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            SyntaxError::Lex(e) => e.hint.as_deref(),
            SyntaxError::Parse(e) => e.hint.as_deref(),
        }
    }
}

/// Result of parsing a source unit.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    /// Lexer and parser errors, ordered by start offset.
    pub errors: Vec<SyntaxError>,
    /// Whitespace and comments, for tools that rebuild source text.
    pub trivia: Vec<Token>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lex and parse a whole source unit with default limits.
pub fn parse_source(source: &str) -> ParseResult {
    parse_source_with(source, ParseOptions::default())
}

pub fn parse_source_with(source: &str, options: ParseOptions) -> ParseResult {
    let lexed = hew_lexer::tokenize(source);
    let mut parser = Parser::with_options(lexed.tokens, options);
    let program = parser.parse_program();

    let errors = merge_errors(lexed.errors, parser.take_errors(), options.max_errors);
    ParseResult { program, errors, trivia: parser.take_trivia() }
}

/// Parse a single expression; the whole input must be consumed.
pub fn parse_expression(source: &str) -> Result<Expr, Vec<SyntaxError>> {
    let lexed = hew_lexer::tokenize(source);
    let mut parser = Parser::new(lexed.tokens);
    let result = parser.parse_expr();

    let mut parse_errors = parser.take_errors();
    let expr = match result {
        Ok(expr) if parser.at_eof() => Some(expr),
        Ok(_) => {
            parse_errors.push(parser.expected_end_of_input());
            None
        }
        Err(e) => {
            parse_errors.push(e);
            None
        }
    };

    let errors = merge_errors(lexed.errors, parse_errors, ParseOptions::default().max_errors);
    match expr {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(errors),
    }
}

fn merge_errors(lex: Vec<LexError>, parse: Vec<ParseError>, max_errors: usize) -> Vec<SyntaxError> {
    let mut errors: Vec<SyntaxError> = lex.into_iter().map(SyntaxError::Lex).collect();
    errors.extend(parse.into_iter().map(SyntaxError::Parse));
    errors.sort_by_key(|e| e.span().start);
    errors.truncate(max_errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_ast::expr::ExprKind;
    use hew_ast::item::{ImportSpec, ItemKind, Visibility};

    fn parse(src: &str) -> ParseResult {
        let result = parse_source(src);
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        result
    }

    #[test]
    fn parse_imports() {
        let result = parse("import std::net;\nimport std::io::{read, write,};\nimport app::*;");
        assert_eq!(result.program.items.len(), 3);

        let specs: Vec<_> = result
            .program
            .items
            .iter()
            .map(|item| match &item.kind {
                ItemKind::Import(imp) => (imp.path.join("::"), imp.spec.clone()),
                other => panic!("Expected import, got {other:?}"),
            })
            .collect();
        assert_eq!(specs[0].0, "std::net");
        assert!(matches!(specs[0].1, ImportSpec::Module));
        assert_eq!(specs[1].0, "std::io");
        assert!(matches!(&specs[1].1, ImportSpec::Names(names) if names == &["read", "write"]));
        assert!(matches!(specs[2].1, ImportSpec::Glob));
    }

    #[test]
    fn parse_import_empty_braces_error() {
        let result = parse_source("import std::{};");
        assert_eq!(result.errors.len(), 1);
        assert!(result.program.items.is_empty());
    }

    #[test]
    fn visibility_modifiers() {
        let result = parse("pub fn a() {}\npub(package) fn b() {}\npub(super) const C: i32 = 1;\nfn d() {}");
        let vis: Vec<_> = result.program.items.iter().map(|i| i.vis).collect();
        assert_eq!(vis, vec![Visibility::Public, Visibility::Package, Visibility::Super, Visibility::Private]);
    }

    #[test]
    fn errors_are_sorted_and_mixed() {
        let result = parse_source("fn main() { let s = \"open; }\nfn other() { let = 1; }");
        assert!(!result.is_ok());
        let starts: Vec<_> = result.errors.iter().map(|e| e.span().start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert!(result.errors.iter().any(|e| matches!(e, SyntaxError::Lex(_))));
    }

    #[test]
    fn misspelled_keyword_gets_a_hint() {
        let result = parse_source("fun main() {}");
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].hint(), Some("did you mean 'fn'?"));
    }

    #[test]
    fn expression_entry_point() {
        let expr = parse_expression("a + b * 2").unwrap();
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
        let errors = parse_expression("a +").unwrap_err();
        assert_eq!(errors.len(), 1);
        let errors = parse_expression("a b").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_source() {
        let result = parse("");
        assert!(result.program.items.is_empty());
        assert_eq!(result.program.span, Span::new(0, 0));
    }
}

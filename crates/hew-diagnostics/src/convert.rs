// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from front-end error types to `Diagnostic`.
//!
//! Every error the lexer or parser can produce maps to exactly one code.

use hew_lexer::{LexError, LexErrorKind};
use hew_parser::{ParseError, ParseErrorKind, SyntaxError};

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match &self.kind {
            LexErrorKind::UnexpectedChar(_) => ("E0001", "unexpected character"),
            LexErrorKind::UnterminatedString => ("E0002", "string starts here"),
            LexErrorKind::InvalidEscape(_) => ("E0003", "invalid escape"),
            LexErrorKind::InvalidNumber => ("E0004", "invalid number"),
            LexErrorKind::UnterminatedBlockComment => ("E0005", "comment starts here"),
            LexErrorKind::UnterminatedInterpolation => ("E0006", "interpolation starts here"),
        };

        let mut diag = Diagnostic::error(self.message()).with_code(code).with_primary(self.span, label);

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match self.kind {
            ParseErrorKind::UnexpectedToken => ("E0100", "unexpected token"),
            ParseErrorKind::MissingToken => ("E0101", "expected here"),
            ParseErrorKind::TooDeep => ("E0102", "nested too deeply"),
            ParseErrorKind::Duplicate => ("E0103", "second occurrence"),
        };

        let mut diag = Diagnostic::error(&self.message).with_code(code).with_primary(self.span, label);

        if let Some(ref note) = self.note {
            diag = diag.with_note(note.as_str());
        }
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
            // An inserted terminator is an empty span at the insertion point
            if self.kind == ParseErrorKind::MissingToken && self.span.is_empty() && self.note.is_some() {
                diag = diag.with_suggestion(self.span, ";");
            }
        }

        diag
    }
}

impl ToDiagnostic for SyntaxError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SyntaxError::Lex(e) => e.to_diagnostic(),
            SyntaxError::Parse(e) => e.to_diagnostic(),
        }
    }
}

/// Lex and parse `source`, returning its diagnostics in source order.
pub fn diagnose(source: &str) -> Vec<Diagnostic> {
    hew_parser::parse_source(source).errors.iter().map(ToDiagnostic::to_diagnostic).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hew_ast::Span;
    use pretty_assertions::assert_eq;

    fn codes(source: &str) -> Vec<String> {
        diagnose(source).into_iter().filter_map(|d| d.code.map(|c| c.0)).collect()
    }

    #[test]
    fn lexer_codes() {
        assert_eq!(codes("fn main() { let x = 1 # 2; }"), vec!["E0001", "E0100"]);
        assert_eq!(codes("const S: string = \"open;\n"), vec!["E0002", "E0101"]);
        assert_eq!(codes(r#"const S: string = "a\q";"#), vec!["E0003"]);
        assert_eq!(codes("const N: u8 = 0x;"), vec!["E0004"]);
        assert_eq!(codes("fn f() {} /* open"), vec!["E0005"]);
    }

    #[test]
    fn parser_codes() {
        assert_eq!(codes("fn f() { let = 1; }"), vec!["E0100"]);
        assert_eq!(codes("fn f() {"), vec!["E0101"]);
        assert_eq!(codes("actor A { init() {} init() {} }"), vec!["E0103"]);
    }

    #[test]
    fn too_deep_has_its_own_code() {
        let error = SyntaxError::Parse(ParseError {
            kind: ParseErrorKind::TooDeep,
            span: Span::new(4, 5),
            message: "Nesting exceeds the limit of 8 levels".to_string(),
            hint: None,
            note: None,
        });
        let diag = error.to_diagnostic();
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0102"));
        assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
    }

    #[test]
    fn inserted_semicolon_carries_a_fix() {
        let diags = diagnose("fn main() {\n    let x = 1\n}");
        assert_eq!(diags.len(), 1);
        let diag = &diags[0];
        assert_eq!(diag.notes, vec!["inserted missing ';'".to_string()]);
        let help = diag.help.as_ref().unwrap();
        let fix = help.suggestion.as_ref().unwrap();
        assert_eq!(fix.replacement, ";");
        assert_eq!(fix.span, Span::empty("fn main() {\n    let x = 1".len()));
    }

    #[test]
    fn hint_becomes_help() {
        let diags = diagnose("fun main() {}");
        assert_eq!(diags[0].help.as_ref().map(|h| h.message.as_str()), Some("did you mean 'fn'?"));
        assert!(diags[0].help.as_ref().unwrap().suggestion.is_none());
    }

    #[test]
    fn clean_source_has_no_diagnostics() {
        assert!(diagnose("fn main() { let x = 1; }").is_empty());
    }
}

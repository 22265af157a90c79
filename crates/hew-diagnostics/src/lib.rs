// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostics for the Hew front end.
//!
//! Lexer and parser errors stay plain data; this crate turns them into a
//! [`Diagnostic`] through [`ToDiagnostic`] and renders them for terminals
//! ([`formatter`]) or tools ([`json`]).

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

pub use convert::diagnose;
pub use formatter::DiagnosticFormatter;

use hew_ast::Span;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A compiler diagnostic with rich context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<Help>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

/// How a label should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Primary error location (red underline).
    Primary,
    /// Related location (yellow/blue underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error code like E0100.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// Actionable help attached to a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Help {
    pub message: String,
    pub suggestion: Option<CodeSuggestion>,
}

/// A concrete code change suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSuggestion {
    pub span: Span,
    pub replacement: String,
}

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            style,
            message: Some(msg.into()),
        });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(Help {
            message: help.into(),
            suggestion: None,
        });
        self
    }

    pub fn with_suggestion(mut self, span: Span, replacement: impl Into<String>) -> Self {
        if let Some(ref mut help) = self.help {
            help.suggestion = Some(CodeSuggestion {
                span,
                replacement: replacement.into(),
            });
        }
        self
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a compiler error into a rich diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

/// Format every diagnostic for `source`, separated by blank lines.
pub fn render(diagnostics: &[Diagnostic], source: &str, file_name: &str) -> String {
    let formatter = DiagnosticFormatter::new(source).with_file_name(file_name);
    diagnostics.iter().map(|d| formatter.format(d)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_labels_and_help() {
        let diag = Diagnostic::error("Expected ';'")
            .with_code("E0101")
            .with_secondary(Span::new(0, 3), "statement starts here")
            .with_primary(Span::new(7, 7), "expected ';'")
            .with_note("inserted missing ';'")
            .with_help("end statements with ';'")
            .with_suggestion(Span::new(7, 7), ";");

        assert!(diag.is_error());
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0101"));
        assert_eq!(diag.primary_span(), Some(Span::new(7, 7)));
        assert_eq!(diag.notes, vec!["inserted missing ';'".to_string()]);
        let help = diag.help.unwrap();
        assert_eq!(help.suggestion.map(|s| s.replacement), Some(";".to_string()));
    }

    #[test]
    fn suggestion_needs_help_first() {
        let diag = Diagnostic::warning("unused").with_suggestion(Span::new(0, 1), "x");
        assert!(diag.help.is_none());
        assert!(!diag.is_error());
        assert_eq!(diag.primary_span(), None);
    }

    #[test]
    fn render_points_at_each_line() {
        colored::control::set_override(false);
        let source = "fn a() { let = 1; }\nfn b() { let = 2; }";
        let out = render(&diagnose(source), source, "two.hew");
        assert!(out.contains("--> two.hew:1:"), "{out}");
        assert!(out.contains("--> two.hew:2:"), "{out}");
        assert!(out.contains("\n\nerror[E0100]"), "{out}");
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for editors and other tools.
//!
//! Each diagnostic carries 1-based line/column positions next to the raw byte
//! offsets, the source line it points into, and the edited line when a fix is
//! attached.

use hew_ast::{LineMap, Span};
use serde::Serialize;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// All diagnostics for one source file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Bumped when the shape of the report changes.
    pub version: u32,
    pub file: String,
    /// True when no diagnostic is an error.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// "Lexical" or "Syntax", from the code registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<JsonSuggestion>,
}

#[derive(Debug, Serialize)]
pub struct SourceLocation {
    #[serde(flatten)]
    pub position: LineCol,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub role: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
}

/// Line/column pair (1-based) plus the byte offset it came from.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonSuggestion {
    pub span: Span,
    pub replacement: String,
    /// The source line with the replacement applied.
    pub result_line: String,
}

struct SourceIndex<'a> {
    source: &'a str,
    lines: LineMap,
}

impl SourceIndex<'_> {
    fn position(&self, offset: usize) -> LineCol {
        let (line, column) = self.lines.offset_to_line_col(offset);
        LineCol { line: line as usize, column: column as usize, byte_offset: offset }
    }

    fn line(&self, line: usize) -> &str {
        self.lines.line_text(self.source, line as u32).unwrap_or("")
    }
}

/// Convert diagnostics for `file` into a report.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let index = SourceIndex { source, lines: LineMap::new(source) };

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: diagnostics.iter().map(|d| to_json_diagnostic(d, &index, &registry)).collect(),
        error_count,
        warning_count,
    }
}

fn to_json_diagnostic(diag: &Diagnostic, index: &SourceIndex<'_>, registry: &ErrorCodeRegistry) -> JsonDiagnostic {
    let code = diag.code.as_ref().map(|c| c.0.clone());
    let category = code.as_deref().and_then(|c| registry.get(c)).map(|info| info.category.to_string());

    let location = diag.primary_span().map(|span| {
        let position = index.position(span.start);
        let source_line = index.line(position.line).to_string();
        SourceLocation { position, source_line }
    });

    let labels = diag
        .labels
        .iter()
        .map(|l| JsonLabel {
            role: l.style,
            message: l.message.clone(),
            start: index.position(l.span.start),
            end: index.position(l.span.end),
        })
        .collect();

    let suggestion = diag.help.as_ref().and_then(|h| h.suggestion.as_ref()).map(|s| {
        let at = index.position(s.span.start);
        let line = index.line(at.line);
        let prefix_end = (at.column - 1).min(line.len());
        let suffix_start = (prefix_end + s.span.len()).min(line.len());
        let result_line = format!(
            "{}{}{}",
            line.get(..prefix_end).unwrap_or(line),
            s.replacement,
            line.get(suffix_start..).unwrap_or("")
        );
        JsonSuggestion { span: s.span, replacement: s.replacement.clone(), result_line }
    });

    JsonDiagnostic {
        severity: diag.severity,
        code,
        category,
        message: diag.message.clone(),
        location,
        labels,
        notes: diag.notes.clone(),
        help: diag.help.as_ref().map(|h| h.message.clone()),
        suggestion,
    }
}

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn report_for_missing_semicolon() {
        let source = "fn main() {\n    let x = 1\n    x\n}\n";
        let report = to_json_report(&diagnose(source), source, "main.hew");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);

        let diag = &report.diagnostics[0];
        assert_eq!(diag.code.as_deref(), Some("E0101"));
        assert_eq!(diag.category.as_deref(), Some("Syntax"));
        let location = diag.location.as_ref().unwrap();
        assert_eq!(location.position, LineCol { line: 2, column: 14, byte_offset: 25 });
        assert_eq!(location.source_line, "    let x = 1");
        assert_eq!(diag.suggestion.as_ref().unwrap().result_line, "    let x = 1;");
    }

    #[test]
    fn serialized_shape() {
        let source = "fn f() { let x = 1 # 2; }";
        let report = to_json_report(&diagnose(source), source, "f.hew");
        let value: Value = serde_json::from_str(&to_json_string(&report)).unwrap();

        let first = &value["diagnostics"][0];
        assert_eq!(first["severity"], json!("error"));
        assert_eq!(first["code"], json!("E0001"));
        assert_eq!(first["category"], json!("Lexical"));
        assert_eq!(first["location"]["line"], json!(1));
        assert_eq!(first["location"]["column"], json!(20));
        assert_eq!(first["labels"][0]["role"], json!("primary"));
        assert!(first.get("suggestion").is_none());
    }

    #[test]
    fn clean_source_succeeds() {
        let report = to_json_report(&[], "fn main() {}", "main.hew");
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.warning_count, 0);
    }
}

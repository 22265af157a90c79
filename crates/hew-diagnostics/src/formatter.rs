// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded error output in the familiar rustc shape:
//!
//! ```text
//! error[E0101]: Expected ';' before 'let'
//!   --> counter.hew:3:14
//!    |
//!  3 |     let x = 1
//!    |              ^ expected here
//!    |
//!    = note: inserted missing ';'
//!    = help: end statements with ';'
//!    |
//!  3 |     let x = 1;
//!    |              ~
//! ```

use std::collections::BTreeMap;

use colored::Colorize;
use hew_ast::LineMap;

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, file_name: None, line_map: LineMap::new(source) }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(location) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        };

        let (line, col) = self.offset_to_line_col(location.start);
        let file = self.file_name.unwrap_or("<source>");
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);
        let blank_gutter = format!("{} {}", " ".repeat(gutter_width), "|".blue());

        out.push_str(&blank_gutter);
        out.push('\n');

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            if matches!(prev_line_num, Some(prev) if annotated_line.line_num > prev + 1) {
                out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
            }
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width,
            ));
            self.format_annotations(&mut out, annotated_line, gutter_width);
            prev_line_num = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&blank_gutter);
            out.push('\n');
        }
        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        match diagnostic.code {
            Some(ref code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.as_str().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        for note in &diagnostic.notes {
            out.push_str(&format!("{} {} {}: {}\n", " ".repeat(gutter_width), "=".cyan(), "note".cyan().bold(), note));
        }
        if let Some(ref help) = diagnostic.help {
            self.format_help(out, help, gutter_width);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter_width: usize) {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            " ".repeat(gutter_width),
            "=".cyan(),
            "help".cyan().bold(),
            help.message
        ));

        let Some(ref suggestion) = help.suggestion else {
            return;
        };
        let (line, col) = self.offset_to_line_col(suggestion.span.start);
        let Some(source_line) = self.get_line(line) else {
            return;
        };

        // Splice the replacement into the line it edits
        let prefix_end = (col - 1).min(source_line.len());
        let suffix_start = (prefix_end + suggestion.span.len()).min(source_line.len());
        let prefix = source_line.get(..prefix_end).unwrap_or(source_line);
        let suffix = source_line.get(suffix_start..).unwrap_or("");

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "|".blue()));
        out.push_str(&format!(
            "{:>width$} {} {}{}{}\n",
            line.to_string().blue().bold(),
            "|".blue(),
            prefix,
            suggestion.replacement.green(),
            suffix,
            width = gutter_width,
        ));
        out.push_str(&format!(
            "{} {} {}{}\n",
            " ".repeat(gutter_width),
            "|".blue(),
            " ".repeat(prefix_end),
            "~".repeat(suggestion.replacement.len().max(1)).green(),
        ));
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.offset_to_line_col(label.span.end);
            let text = self.get_line(line_num).unwrap_or("");

            // Multi-line spans underline the rest of their first line
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            lines
                .entry(line_num)
                .or_insert_with(|| AnnotatedLine { line_num, text: text.to_string(), annotations: Vec::new() })
                .annotations
                .push(Annotation {
                    col_start,
                    col_end: col_end.max(col_start + 1),
                    style: label.style,
                    message: label.message.clone(),
                });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, annotated_line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = annotated_line.annotations.iter().collect();
        sorted.sort_by_key(|a| (a.style.cmp_priority(), a.col_start));

        let width = sorted.iter().map(|a| a.col_end).max().unwrap_or(0).max(annotated_line.text.len() + 1);
        let mut underline = vec![' '; width];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            for slot in &mut underline[ann.col_start - 1..ann.col_end - 1] {
                *slot = ch;
            }
            if let Some(ref msg) = ann.message {
                messages.push((ann.col_start, ann.style, msg.as_str()));
            }
        }

        let underline: String = underline.iter().collect::<String>().trim_end().to_string();
        let gutter = format!("{} {}", " ".repeat(gutter_width), "|".blue());

        // Rightmost label first so the connectors do not cross
        messages.sort_by(|a, b| b.0.cmp(&a.0));

        match messages.as_slice() {
            [] => out.push_str(&format!("{} {}\n", gutter, color_underline(&underline))),
            [(_, style, msg)] => {
                out.push_str(&format!("{} {} {}\n", gutter, color_underline(&underline), style_message(*style, msg)))
            }
            _ => {
                out.push_str(&format!("{} {}\n", gutter, color_underline(&underline)));
                for (col, style, msg) in &messages {
                    let pipe = match style {
                        LabelStyle::Primary => "|".red().bold().to_string(),
                        LabelStyle::Secondary => "|".blue().to_string(),
                    };
                    out.push_str(&format!(
                        "{} {}{} {}\n",
                        gutter,
                        " ".repeat(col - 1),
                        pipe,
                        style_message(*style, msg)
                    ));
                }
            }
        }
    }

    /// Convert byte offset to (line, col), both 1-based.
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    /// Get source line text by 1-based line number.
    fn get_line(&self, line_num: usize) -> Option<&str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

impl LabelStyle {
    fn cmp_priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current: Option<char> = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose;
    use hew_ast::Span;
    use pretty_assertions::assert_eq;

    fn plain(source: &str, diagnostic: &Diagnostic) -> String {
        colored::control::set_override(false);
        DiagnosticFormatter::new(source).with_file_name("main.hew").format(diagnostic)
    }

    #[test]
    fn inserted_semicolon() {
        let source = "fn main() {\n    let x = 1\n    let y = 2;\n}\n";
        let diags = diagnose(source);
        assert_eq!(diags.len(), 1);
        let expected = "\
error[E0101]: Expected ';' before 'let'
  --> main.hew:2:14
   |
 2 |     let x = 1
   |              ^ expected here
   |
   = note: inserted missing ';'
   = help: end statements with ';'
   |
 2 |     let x = 1;
   |              ~
";
        assert_eq!(plain(source, &diags[0]), expected);
    }

    #[test]
    fn underline_covers_the_token() {
        let source = "fun main() {}";
        let diags = diagnose(source);
        let out = plain(source, &diags[0]);
        assert!(out.starts_with("error[E0100]: Expected item, found a name\n"), "{out}");
        assert!(out.contains(" 1 | fun main() {}\n   | ^^^ unexpected token\n"), "{out}");
        assert!(out.contains("= help: did you mean 'fn'?"), "{out}");
    }

    #[test]
    fn secondary_labels_get_connectors() {
        let source = "let a = b + c;";
        let diag = Diagnostic::error("mismatched operands")
            .with_primary(Span::new(12, 13), "this one")
            .with_secondary(Span::new(8, 9), "and this one");
        let out = plain(source, &diag);
        assert!(out.contains("   |         -   ^\n"), "{out}");
        assert!(out.contains("   |             | this one\n"), "{out}");
        assert!(out.contains("   |         | and this one\n"), "{out}");
    }

    #[test]
    fn no_labels_means_no_source() {
        let diag = Diagnostic::warning("nothing to point at").with_note("just a note");
        let out = plain("", &diag);
        assert_eq!(out, "warning: nothing to point at\n   = note: just a note\n");
    }
}

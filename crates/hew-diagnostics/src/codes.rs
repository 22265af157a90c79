// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0100, etc.) to titles and categories for
//! display and for tools reading the JSON report.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("unexpected character", Lexical),
                "E0002" => ("unterminated string literal", Lexical),
                "E0003" => ("invalid escape sequence", Lexical),
                "E0004" => ("invalid number literal", Lexical),
                "E0005" => ("unterminated block comment", Lexical),
                "E0006" => ("unterminated interpolation", Lexical),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax),
                "E0101" => ("expected token not found", Syntax),
                "E0102" => ("nesting too deep", Syntax),
                "E0103" => ("duplicate clause", Syntax),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// All codes, sorted.
    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        let mut infos: Vec<_> = self.codes.values().collect();
        infos.sort_by_key(|info| info.code);
        infos.into_iter()
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser configuration.

/// Limits applied to a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Errors recorded before the parser gives up and skips to end of input.
    pub max_errors: usize,
    /// Deepest allowed nesting of expressions, blocks, types and patterns.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_errors: 20,
            max_depth: 256,
        }
    }
}

impl ParseOptions {
    pub fn max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parse context flags for context-sensitive parsing.
//!
//! Some constructs are ambiguous without knowing where they appear. The
//! parser threads a small set of flags through recursive calls and restores
//! them on the way out, instead of keeping global mode switches.

/// Context flags for parsing. Combine with [`ParseContext::with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseContext(u8);

impl ParseContext {
    /// No special context.
    pub const NONE: Self = Self(0);

    /// `Name {` opens the following block, not a struct literal.
    /// Set while parsing `if`/`while` conditions, `match` scrutinees and
    /// `for` iterables.
    pub const NO_STRUCT_LIT: Self = Self(1 << 0);

    /// `(...) =>` is not a lambda: the arrow belongs to an enclosing arm.
    /// Set for match guards and select arm sources.
    pub const NO_LAMBDA: Self = Self(1 << 1);

    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[inline]
    pub const fn allows_struct_lit(self) -> bool {
        !self.has(Self::NO_STRUCT_LIT)
    }

    #[inline]
    pub const fn allows_lambda(self) -> bool {
        !self.has(Self::NO_LAMBDA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let ctx = ParseContext::NONE.with(ParseContext::NO_STRUCT_LIT);
        assert!(!ctx.allows_struct_lit());
        assert!(ctx.allows_lambda());

        let both = ctx.with(ParseContext::NO_LAMBDA);
        assert!(!both.allows_lambda());
        assert!(!both.allows_struct_lit());
        assert_eq!(ParseContext::NONE.with(ParseContext::NO_LAMBDA).with(ParseContext::NO_STRUCT_LIT), both);
        assert_eq!(ParseContext::default(), ParseContext::NONE);
    }
}

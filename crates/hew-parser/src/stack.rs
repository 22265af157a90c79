// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Stack safety for recursive parsing.
//!
//! Every nesting level goes through [`ensure_sufficient_stack`], so input
//! nested right up to `ParseOptions::max_depth` cannot overflow the thread's
//! stack.

const RED_ZONE: usize = 100 * 1024; // 100KB
const STACK_PER_RECURSION: usize = 1024 * 1024; // 1MB

/// Grow the stack if less than the red zone remains, then run `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

//! Bit-packed error codes.
//!
//! A code is a `u32` combining a category with modifier flags in the low
//! bits, so callers can test "is this an indentation error" and "is the
//! input merely incomplete" without a lookup table. The incomplete nibble
//! is what interactive hosts inspect to decide whether to keep prompting
//! for more input.

use std::fmt;

/// A bit-packed diagnostic code.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// The statement is syntactically valid so far but unfinished
    /// (e.g. the suite after `if x:` has not been entered yet).
    pub const INCOMPLETE_STATEMENT: ErrorCode = ErrorCode(0x0001);
    /// A single token is unfinished (e.g. an open triple-quoted string
    /// or a trailing line continuation).
    pub const INCOMPLETE_TOKEN: ErrorCode = ErrorCode(0x0002);
    /// Mask covering every "more input could fix this" modifier.
    pub const INCOMPLETE_MASK: u32 = 0x000F;

    /// The span is unreliable; renderers should not draw a caret.
    pub const NO_CARET: ErrorCode = ErrorCode(0x0010);

    /// Generic syntax error.
    pub const SYNTAX_ERROR: ErrorCode = ErrorCode(0x0020);
    /// Indentation structure error. Subsumes `SYNTAX_ERROR`.
    pub const INDENTATION_ERROR: ErrorCode = ErrorCode(0x0040 | 0x0020);
    /// Inconsistent tab/space usage. Subsumes `INDENTATION_ERROR`.
    pub const TAB_ERROR: ErrorCode = ErrorCode(0x0080 | 0x0040 | 0x0020);

    /// Bits below the category field (modifiers).
    const MODIFIER_MASK: u32 = 0x001F;

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(bits: u32) -> Self {
        ErrorCode(bits)
    }

    /// Combine with modifier flags.
    #[inline]
    #[must_use]
    pub const fn with(self, modifier: ErrorCode) -> Self {
        ErrorCode(self.0 | modifier.0)
    }

    /// The category with modifiers stripped.
    #[inline]
    pub const fn category(self) -> ErrorCode {
        ErrorCode(self.0 & !Self::MODIFIER_MASK)
    }

    /// True when more input could turn this into valid code.
    #[inline]
    pub const fn is_incomplete(self) -> bool {
        self.0 & Self::INCOMPLETE_MASK != 0
    }

    /// True when the incompleteness is inside a single token.
    #[inline]
    pub const fn is_incomplete_token(self) -> bool {
        self.0 & Self::INCOMPLETE_TOKEN.0 != 0
    }

    /// True when a statement is cut off between tokens.
    #[inline]
    pub const fn is_incomplete_statement(self) -> bool {
        self.0 & Self::INCOMPLETE_STATEMENT.0 != 0
    }

    #[inline]
    pub const fn suppresses_caret(self) -> bool {
        self.0 & Self::NO_CARET.0 != 0
    }

    /// True for indentation and tab errors.
    #[inline]
    pub const fn is_indentation(self) -> bool {
        self.0 & 0x0040 != 0
    }

    /// Exception class the interpreter would raise for this code.
    pub const fn kind_name(self) -> &'static str {
        if self.0 & 0x0080 != 0 {
            "TabError"
        } else if self.0 & 0x0040 != 0 {
            "IndentationError"
        } else {
            "SyntaxError"
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({:#06x}, {})", self.0, self.kind_name())
    }
}

//! Language version and `from __future__` option flags.

use bitflags::bitflags;
use std::fmt;

/// The Python language versions the tokenizer and parser can target.
///
/// Ordered and comparable: `version >= PythonVersion::V30` gates
/// 3.x-only constructs, `version.is_2x()` gates legacy ones.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PythonVersion {
    V24,
    V25,
    V26,
    V27,
    V30,
    V31,
    V32,
    V33,
    V34,
    V35,
    V36,
    V37,
}

impl PythonVersion {
    /// The newest supported grammar; what stub-file mode forces.
    pub const LATEST: PythonVersion = PythonVersion::V37;

    /// True for the 2.x generation.
    #[inline]
    pub fn is_2x(self) -> bool {
        self < PythonVersion::V30
    }

    /// True for the 3.x generation.
    #[inline]
    pub fn is_3x(self) -> bool {
        self >= PythonVersion::V30
    }

    /// Version display text, e.g. `3.5`.
    pub fn as_str(self) -> &'static str {
        match self {
            PythonVersion::V24 => "2.4",
            PythonVersion::V25 => "2.5",
            PythonVersion::V26 => "2.6",
            PythonVersion::V27 => "2.7",
            PythonVersion::V30 => "3.0",
            PythonVersion::V31 => "3.1",
            PythonVersion::V32 => "3.2",
            PythonVersion::V33 => "3.3",
            PythonVersion::V34 => "3.4",
            PythonVersion::V35 => "3.5",
            PythonVersion::V36 => "3.6",
            PythonVersion::V37 => "3.7",
        }
    }

    /// Whether `with`/`as` are hard keywords (2.6+, or 2.5 with the
    /// `with_statement` future).
    #[inline]
    pub fn has_with_statement(self) -> bool {
        self >= PythonVersion::V26
    }

    /// Whether `_` digit separators are accepted in numeric literals.
    #[inline]
    pub fn supports_underscore_literals(self) -> bool {
        self >= PythonVersion::V36
    }

    /// Whether `async`/`await` are recognized (as soft keywords).
    #[inline]
    pub fn supports_async_await(self) -> bool {
        self >= PythonVersion::V35
    }

    /// Whether f-string literals are accepted.
    #[inline]
    pub fn supports_fstrings(self) -> bool {
        self >= PythonVersion::V36
    }

    /// Whether `u'...'` prefixes are accepted (2.x always; reintroduced
    /// in 3.3).
    #[inline]
    pub fn supports_unicode_prefix(self) -> bool {
        self.is_2x() || self >= PythonVersion::V33
    }

    /// Whether `b'...'` prefixes are accepted (2.6+).
    #[inline]
    pub fn supports_bytes_prefix(self) -> bool {
        self >= PythonVersion::V26
    }

    /// Whether the `@` matrix-multiplication operator is accepted.
    #[inline]
    pub fn supports_matmul(self) -> bool {
        self >= PythonVersion::V35
    }

    /// Whether `yield from` is accepted.
    #[inline]
    pub fn supports_yield_from(self) -> bool {
        self >= PythonVersion::V33
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Feature flags activated by `from __future__ import ...`.
    ///
    /// Process-wide immutable after the future-statement prologue is
    /// parsed; checked by both tokenizer (keyword gating) and parser.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct FutureOptions: u16 {
        /// `print` is a function, not a statement keyword.
        const PRINT_FUNCTION = 1 << 0;
        /// Unprefixed string literals are text, not bytes (2.x).
        const UNICODE_LITERALS = 1 << 1;
        /// `/` is true division.
        const TRUE_DIVISION = 1 << 2;
        /// Implicit relative imports are disabled.
        const ABSOLUTE_IMPORT = 1 << 3;
        /// `with` statement enabled on 2.5.
        const WITH_STATEMENT = 1 << 4;
        /// Generator/annotations futures accepted as no-ops.
        const NESTED_SCOPES = 1 << 5;
        const GENERATORS = 1 << 6;
        const GENERATOR_STOP = 1 << 7;
        const ANNOTATIONS = 1 << 8;
    }
}

impl FutureOptions {
    /// Futures implied by the language version itself.
    pub fn from_version(version: PythonVersion) -> Self {
        let mut options = FutureOptions::empty();
        if version.is_3x() {
            options |= FutureOptions::PRINT_FUNCTION
                | FutureOptions::UNICODE_LITERALS
                | FutureOptions::TRUE_DIVISION
                | FutureOptions::ABSOLUTE_IMPORT
                | FutureOptions::WITH_STATEMENT;
        } else if version.has_with_statement() {
            options |= FutureOptions::WITH_STATEMENT;
        }
        options
    }

    /// Resolve a `__future__` feature name. Returns `None` for unknown
    /// features.
    pub fn from_feature_name(name: &str) -> Option<Self> {
        Some(match name {
            "print_function" => FutureOptions::PRINT_FUNCTION,
            "unicode_literals" => FutureOptions::UNICODE_LITERALS,
            "division" => FutureOptions::TRUE_DIVISION,
            "absolute_import" => FutureOptions::ABSOLUTE_IMPORT,
            "with_statement" => FutureOptions::WITH_STATEMENT,
            "nested_scopes" => FutureOptions::NESTED_SCOPES,
            "generators" => FutureOptions::GENERATORS,
            "generator_stop" => FutureOptions::GENERATOR_STOP,
            "annotations" => FutureOptions::ANNOTATIONS,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(PythonVersion::V27 < PythonVersion::V30);
        assert!(PythonVersion::V27.is_2x());
        assert!(PythonVersion::V35.is_3x());
        assert!(PythonVersion::V35.supports_async_await());
        assert!(!PythonVersion::V34.supports_async_await());
        assert!(PythonVersion::V36.supports_underscore_literals());
        assert!(!PythonVersion::V35.supports_underscore_literals());
    }

    #[test]
    fn unicode_prefix_gap() {
        // u'...' vanished in 3.0-3.2 and came back in 3.3
        assert!(PythonVersion::V27.supports_unicode_prefix());
        assert!(!PythonVersion::V32.supports_unicode_prefix());
        assert!(PythonVersion::V33.supports_unicode_prefix());
    }

    #[test]
    fn implied_futures() {
        let v3 = FutureOptions::from_version(PythonVersion::V36);
        assert!(v3.contains(FutureOptions::PRINT_FUNCTION));
        assert!(v3.contains(FutureOptions::TRUE_DIVISION));

        let v25 = FutureOptions::from_version(PythonVersion::V25);
        assert!(!v25.contains(FutureOptions::WITH_STATEMENT));
        let v26 = FutureOptions::from_version(PythonVersion::V26);
        assert!(v26.contains(FutureOptions::WITH_STATEMENT));
    }

    #[test]
    fn feature_name_lookup() {
        assert_eq!(
            FutureOptions::from_feature_name("print_function"),
            Some(FutureOptions::PRINT_FUNCTION)
        );
        assert_eq!(FutureOptions::from_feature_name("braces"), None);
    }
}

//! Tokenizer configuration.

use pylon_diagnostic::Severity;
use pylon_ir::{FutureOptions, PythonVersion, TokenKind, TokenTag};

/// Trigger policy for grouping recovery.
///
/// When an unclosed `(`/`[`/`{` swallows a newline and the next line
/// starts with one of these keywords, the tokenizer concludes the
/// grouping was never meant to continue, zeroes the depths, and replays
/// the swallowed newline. The default set is the statement-only
/// keywords; expression-legal ones (`if`, `else`, `for`, `lambda`,
/// `yield`, `import`, `from`) are excluded because they routinely
/// appear inside groupings (ternaries, comprehensions). Hosts with
/// different tolerance can add or remove triggers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupingRecoveryKeywords {
    bits: u128,
}

impl GroupingRecoveryKeywords {
    /// No triggers: recovery disabled.
    pub const NONE: GroupingRecoveryKeywords = GroupingRecoveryKeywords { bits: 0 };

    const DEFAULT_TRIGGERS: &'static [TokenTag] = &[
        TokenTag::Assert,
        TokenTag::Break,
        TokenTag::Class,
        TokenTag::Continue,
        TokenTag::Def,
        TokenTag::Del,
        TokenTag::Elif,
        TokenTag::Except,
        TokenTag::Exec,
        TokenTag::Finally,
        TokenTag::Global,
        TokenTag::Nonlocal,
        TokenTag::Pass,
        TokenTag::Print,
        TokenTag::Raise,
        TokenTag::Return,
        TokenTag::Try,
        TokenTag::While,
        TokenTag::With,
    ];

    pub fn standard() -> Self {
        let mut set = Self::NONE;
        for &tag in Self::DEFAULT_TRIGGERS {
            set = set.with_trigger(tag);
        }
        set
    }

    #[must_use]
    pub fn with_trigger(self, tag: TokenTag) -> Self {
        GroupingRecoveryKeywords {
            bits: self.bits | (1u128 << (tag as u8)),
        }
    }

    #[must_use]
    pub fn without_trigger(self, tag: TokenTag) -> Self {
        GroupingRecoveryKeywords {
            bits: self.bits & !(1u128 << (tag as u8)),
        }
    }

    pub fn triggers(self, kind: &TokenKind) -> bool {
        self.bits & (1u128 << kind.discriminant_index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl Default for GroupingRecoveryKeywords {
    fn default() -> Self {
        Self::standard()
    }
}

/// Tokenizer configuration.
#[derive(Clone, Debug)]
pub struct TokenizerOptions {
    /// Target language version; gates keywords, prefixes and number
    /// forms.
    pub version: PythonVersion,
    /// `from __future__` flags in effect (updated mid-parse by the
    /// parser when it processes future imports).
    pub future: FutureOptions,
    /// Capture exact whitespace, emit `Nl` and `Comment` tokens, and
    /// track per-level indent text. Round-trip tooling turns this on.
    pub verbatim: bool,
    /// Severity for inconsistent tab/space indentation.
    pub indentation_inconsistency: Severity,
    /// Grouping-recovery trigger policy.
    pub grouping_recovery: GroupingRecoveryKeywords,
    /// Interactive (REPL) input: blank lines at depth zero still emit
    /// `NEWLINE`, and EOF mid-construct means "needs more input".
    pub interactive: bool,
}

impl TokenizerOptions {
    pub fn new(version: PythonVersion) -> Self {
        TokenizerOptions {
            version,
            future: FutureOptions::from_version(version),
            verbatim: false,
            indentation_inconsistency: Severity::Warning,
            grouping_recovery: GroupingRecoveryKeywords::standard(),
            interactive: false,
        }
    }

    #[must_use]
    pub fn verbatim(mut self, on: bool) -> Self {
        self.verbatim = on;
        self
    }

    #[must_use]
    pub fn interactive(mut self, on: bool) -> Self {
        self.interactive = on;
        self
    }
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self::new(PythonVersion::LATEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_triggers_are_statement_only() {
        let set = GroupingRecoveryKeywords::standard();
        assert!(set.triggers(&TokenKind::Return));
        assert!(set.triggers(&TokenKind::Def));
        assert!(set.triggers(&TokenKind::Exec));
        // Expression-legal keywords must not trigger by default.
        assert!(!set.triggers(&TokenKind::If));
        assert!(!set.triggers(&TokenKind::For));
        assert!(!set.triggers(&TokenKind::Lambda));
        assert!(!set.triggers(&TokenKind::Yield));
        assert!(!set.triggers(&TokenKind::Import));
    }

    #[test]
    fn trigger_set_is_configurable() {
        let set = GroupingRecoveryKeywords::standard()
            .with_trigger(TokenTag::Import)
            .without_trigger(TokenTag::Print);
        assert!(set.triggers(&TokenKind::Import));
        assert!(!set.triggers(&TokenKind::Print));
        assert!(GroupingRecoveryKeywords::NONE.is_empty());
    }
}

//! Error recovery token sets.
//!
//! Bitset membership over `TokenTag` discriminants: all token kinds fit
//! in a `u128`, so set operations are single bitwise instructions. The
//! parser recovers from a bad statement by skipping to a token that
//! ends the logical line or plausibly starts the next statement.

use pylon_ir::{TokenKind, TokenTag};

/// A set of token tags backed by a `u128` bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        TokenSet(0)
    }

    /// Add a tag (builder form, usable in const initializers).
    #[inline]
    #[must_use]
    pub const fn with(self, tag: TokenTag) -> Self {
        TokenSet(self.0 | (1u128 << tag as u8))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        TokenSet(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: &TokenKind) -> bool {
        self.contains_tag(kind.tag())
    }

    #[inline]
    pub const fn contains_tag(&self, tag: TokenTag) -> bool {
        (self.0 & (1u128 << tag as u8)) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Tokens that can only open a statement. Recovery stops here.
pub const STATEMENT_START: TokenSet = TokenSet::new()
    .with(TokenTag::Assert)
    .with(TokenTag::Async)
    .with(TokenTag::At)
    .with(TokenTag::Break)
    .with(TokenTag::Class)
    .with(TokenTag::Continue)
    .with(TokenTag::Def)
    .with(TokenTag::Del)
    .with(TokenTag::Exec)
    .with(TokenTag::For)
    .with(TokenTag::From)
    .with(TokenTag::Global)
    .with(TokenTag::If)
    .with(TokenTag::Import)
    .with(TokenTag::Nonlocal)
    .with(TokenTag::Pass)
    .with(TokenTag::Print)
    .with(TokenTag::Raise)
    .with(TokenTag::Return)
    .with(TokenTag::Try)
    .with(TokenTag::While)
    .with(TokenTag::With);

/// Tokens that terminate the current logical line.
pub const STATEMENT_END: TokenSet = TokenSet::new()
    .with(TokenTag::Newline)
    .with(TokenTag::Semicolon)
    .with(TokenTag::Dedent)
    .with(TokenTag::EndOfFile);

/// Tokens that can begin an expression. Used where the grammar has an
/// optional expression (`return`, slice bounds, bare `raise`).
pub const EXPRESSION_START: TokenSet = TokenSet::new()
    .with(TokenTag::Name)
    .with(TokenTag::Int)
    .with(TokenTag::BigInt)
    .with(TokenTag::Float)
    .with(TokenTag::Complex)
    .with(TokenTag::Str)
    .with(TokenTag::Bytes)
    .with(TokenTag::IncompleteStr)
    .with(TokenTag::TrueKw)
    .with(TokenTag::FalseKw)
    .with(TokenTag::NoneKw)
    .with(TokenTag::Ellipsis)
    .with(TokenTag::Not)
    .with(TokenTag::Lambda)
    .with(TokenTag::Yield)
    .with(TokenTag::Await)
    .with(TokenTag::Async)
    .with(TokenTag::Plus)
    .with(TokenTag::Minus)
    .with(TokenTag::Tilde)
    .with(TokenTag::Star)
    .with(TokenTag::LParen)
    .with(TokenTag::LBracket)
    .with(TokenTag::LBrace)
    .with(TokenTag::Backquote);

//! Token kinds for Python source.
//!
//! The tokenizer produces one `Token` per call; the parser buffers at most
//! two of them as lookahead. Constant tokens carry their decoded value
//! (escape processing and numeric conversion already applied); the exact
//! source image of any token is recovered by slicing the source with the
//! token's span.

use std::fmt;
use std::hash::Hash;

use bitflags::bitflags;
use num_bigint::BigInt;

use crate::{Name, NewlineKind, Span};

bitflags! {
    /// Prefix and quote properties of a string literal token.
    ///
    /// Also used by the tokenizer's incomplete-string resume state: the
    /// flags are all that is needed to continue scanning when more input
    /// arrives.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct StringFlags: u8 {
        /// `r` prefix: escapes left verbatim.
        const RAW = 1 << 0;
        /// `u` prefix (or 3.x default): text string.
        const UNICODE = 1 << 1;
        /// `b` prefix: byte string.
        const BYTES = 1 << 2;
        /// `f` prefix: formatted string.
        const FORMATTED = 1 << 3;
        /// Triple-quoted (multi-line).
        const TRIPLE = 1 << 4;
        /// Delimited by `'` rather than `"`.
        const SINGLE_QUOTE = 1 << 5;
    }
}

/// Plain discriminant tags for `TokenKind`, the single source of truth
/// for `discriminant_index()`. All values are < 128 so token sets fit in
/// a u128 bitset.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum TokenTag {
    // Literals (0-6)
    Name = 0,
    Int,
    BigInt,
    Float,
    Complex,
    Str,
    Bytes,

    // Keywords (7-43)
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Exec,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
    TrueKw,
    FalseKw,
    NoneKw,

    // Operators (44-79)
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    At,
    LeftShift,
    RightShift,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    NotEq,
    LessGreater,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    SlashSlashAssign,
    PercentAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    PowAssign,
    MatMulAssign,
    Arrow,

    // Delimiters (80-91)
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Semicolon,
    Backquote,

    // Structural (92-99)
    Newline,
    Nl,
    Indent,
    Dedent,
    Comment,
    EndOfFile,
    Error,
    IncompleteStr,
}

/// Token kinds for Python.
///
/// Float and complex literals store f64 bits as u64 for Eq/Hash.
/// String, comment and identifier text use interned `Name`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// Identifier (interned). Soft keywords (`async`/`await` in contexts
    /// where they are not reserved) also arrive as `Name`.
    Name(Name),
    /// Integer literal fitting an i64: `42`, `0o17`, `1_000`
    Int(i64),
    /// Integer literal past i64, or an explicit 2.x `L` suffix.
    BigInt(Box<BigInt>),
    /// Float literal, stored as bits: `3.14`, `1e10`
    Float(u64),
    /// Imaginary literal, stored as the imaginary part's bits: `2j`
    Complex(u64),
    /// Text string literal (decoded, interned).
    Str { value: Name, flags: StringFlags },
    /// Byte string literal (decoded).
    Bytes { value: Vec<u8>, flags: StringFlags },

    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Exec,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
    TrueKw,
    FalseKw,
    NoneKw,

    Plus,             // +
    Minus,            // -
    Star,             // *
    StarStar,         // **
    Slash,            // /
    SlashSlash,       // //
    Percent,          // %
    At,               // @
    LeftShift,        // <<
    RightShift,       // >>
    Ampersand,        // &
    Pipe,             // |
    Caret,            // ^
    Tilde,            // ~
    Less,             // <
    Greater,          // >
    LessEq,           // <=
    GreaterEq,        // >=
    EqEq,             // ==
    NotEq,            // !=
    LessGreater,      // <> (2.x)
    Assign,           // =
    PlusAssign,       // +=
    MinusAssign,      // -=
    StarAssign,       // *=
    SlashAssign,      // /=
    SlashSlashAssign, // //=
    PercentAssign,    // %=
    AndAssign,        // &=
    OrAssign,         // |=
    XorAssign,        // ^=
    LeftShiftAssign,  // <<=
    RightShiftAssign, // >>=
    PowAssign,        // **=
    MatMulAssign,     // @= (3.5+)
    Arrow,            // ->

    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Colon,     // :
    Dot,       // .
    Ellipsis,  // ...
    Semicolon, // ;
    Backquote, // ` (2.x repr)

    /// Logical end of statement.
    Newline(NewlineKind),
    /// Non-logical newline (inside grouping), emitted only when comment
    /// and line-join capture is on.
    Nl(NewlineKind),
    Indent,
    Dedent,
    /// Comment text without the leading `#` (interned); emitted only when
    /// comment capture is on.
    Comment(Name),
    EndOfFile,
    /// Malformed input; the message is interned. Scanning continues after
    /// the bad character(s).
    Error(Name),
    /// A string literal cut off by end of input. The flags let the
    /// tokenizer resume scanning when more input arrives.
    IncompleteStr(StringFlags),
}

impl TokenKind {
    /// Stable discriminant index, for bitset membership tests.
    pub const fn discriminant_index(&self) -> u8 {
        self.tag() as u8
    }

    /// The payload-free tag for this kind.
    pub const fn tag(&self) -> TokenTag {
        match self {
            Self::Name(_) => TokenTag::Name,
            Self::Int(_) => TokenTag::Int,
            Self::BigInt(_) => TokenTag::BigInt,
            Self::Float(_) => TokenTag::Float,
            Self::Complex(_) => TokenTag::Complex,
            Self::Str { .. } => TokenTag::Str,
            Self::Bytes { .. } => TokenTag::Bytes,

            Self::And => TokenTag::And,
            Self::As => TokenTag::As,
            Self::Assert => TokenTag::Assert,
            Self::Async => TokenTag::Async,
            Self::Await => TokenTag::Await,
            Self::Break => TokenTag::Break,
            Self::Class => TokenTag::Class,
            Self::Continue => TokenTag::Continue,
            Self::Def => TokenTag::Def,
            Self::Del => TokenTag::Del,
            Self::Elif => TokenTag::Elif,
            Self::Else => TokenTag::Else,
            Self::Except => TokenTag::Except,
            Self::Exec => TokenTag::Exec,
            Self::Finally => TokenTag::Finally,
            Self::For => TokenTag::For,
            Self::From => TokenTag::From,
            Self::Global => TokenTag::Global,
            Self::If => TokenTag::If,
            Self::Import => TokenTag::Import,
            Self::In => TokenTag::In,
            Self::Is => TokenTag::Is,
            Self::Lambda => TokenTag::Lambda,
            Self::Nonlocal => TokenTag::Nonlocal,
            Self::Not => TokenTag::Not,
            Self::Or => TokenTag::Or,
            Self::Pass => TokenTag::Pass,
            Self::Print => TokenTag::Print,
            Self::Raise => TokenTag::Raise,
            Self::Return => TokenTag::Return,
            Self::Try => TokenTag::Try,
            Self::While => TokenTag::While,
            Self::With => TokenTag::With,
            Self::Yield => TokenTag::Yield,
            Self::TrueKw => TokenTag::TrueKw,
            Self::FalseKw => TokenTag::FalseKw,
            Self::NoneKw => TokenTag::NoneKw,

            Self::Plus => TokenTag::Plus,
            Self::Minus => TokenTag::Minus,
            Self::Star => TokenTag::Star,
            Self::StarStar => TokenTag::StarStar,
            Self::Slash => TokenTag::Slash,
            Self::SlashSlash => TokenTag::SlashSlash,
            Self::Percent => TokenTag::Percent,
            Self::At => TokenTag::At,
            Self::LeftShift => TokenTag::LeftShift,
            Self::RightShift => TokenTag::RightShift,
            Self::Ampersand => TokenTag::Ampersand,
            Self::Pipe => TokenTag::Pipe,
            Self::Caret => TokenTag::Caret,
            Self::Tilde => TokenTag::Tilde,
            Self::Less => TokenTag::Less,
            Self::Greater => TokenTag::Greater,
            Self::LessEq => TokenTag::LessEq,
            Self::GreaterEq => TokenTag::GreaterEq,
            Self::EqEq => TokenTag::EqEq,
            Self::NotEq => TokenTag::NotEq,
            Self::LessGreater => TokenTag::LessGreater,
            Self::Assign => TokenTag::Assign,
            Self::PlusAssign => TokenTag::PlusAssign,
            Self::MinusAssign => TokenTag::MinusAssign,
            Self::StarAssign => TokenTag::StarAssign,
            Self::SlashAssign => TokenTag::SlashAssign,
            Self::SlashSlashAssign => TokenTag::SlashSlashAssign,
            Self::PercentAssign => TokenTag::PercentAssign,
            Self::AndAssign => TokenTag::AndAssign,
            Self::OrAssign => TokenTag::OrAssign,
            Self::XorAssign => TokenTag::XorAssign,
            Self::LeftShiftAssign => TokenTag::LeftShiftAssign,
            Self::RightShiftAssign => TokenTag::RightShiftAssign,
            Self::PowAssign => TokenTag::PowAssign,
            Self::MatMulAssign => TokenTag::MatMulAssign,
            Self::Arrow => TokenTag::Arrow,

            Self::LParen => TokenTag::LParen,
            Self::RParen => TokenTag::RParen,
            Self::LBracket => TokenTag::LBracket,
            Self::RBracket => TokenTag::RBracket,
            Self::LBrace => TokenTag::LBrace,
            Self::RBrace => TokenTag::RBrace,
            Self::Comma => TokenTag::Comma,
            Self::Colon => TokenTag::Colon,
            Self::Dot => TokenTag::Dot,
            Self::Ellipsis => TokenTag::Ellipsis,
            Self::Semicolon => TokenTag::Semicolon,
            Self::Backquote => TokenTag::Backquote,

            Self::Newline(_) => TokenTag::Newline,
            Self::Nl(_) => TokenTag::Nl,
            Self::Indent => TokenTag::Indent,
            Self::Dedent => TokenTag::Dedent,
            Self::Comment(_) => TokenTag::Comment,
            Self::EndOfFile => TokenTag::EndOfFile,
            Self::Error(_) => TokenTag::Error,
            Self::IncompleteStr(_) => TokenTag::IncompleteStr,
        }
    }

    /// True for any reserved-word token.
    pub const fn is_keyword(&self) -> bool {
        let tag = self.tag() as u8;
        tag >= TokenTag::And as u8 && tag <= TokenTag::NoneKw as u8
    }

    /// True for tokens that end a logical line or the input.
    pub const fn ends_statement(&self) -> bool {
        matches!(self, Self::Newline(_) | Self::Semicolon | Self::EndOfFile)
    }

    /// True for augmented-assignment operators (`+=` ... `@=`).
    pub const fn is_aug_assign(&self) -> bool {
        let tag = self.tag() as u8;
        tag >= TokenTag::PlusAssign as u8 && tag <= TokenTag::MatMulAssign as u8
    }

    /// Fixed source text for keyword/operator/delimiter tokens.
    /// `None` for tokens whose image depends on the source.
    pub const fn static_image(&self) -> Option<&'static str> {
        Some(match self {
            Self::And => "and",
            Self::As => "as",
            Self::Assert => "assert",
            Self::Async => "async",
            Self::Await => "await",
            Self::Break => "break",
            Self::Class => "class",
            Self::Continue => "continue",
            Self::Def => "def",
            Self::Del => "del",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Except => "except",
            Self::Exec => "exec",
            Self::Finally => "finally",
            Self::For => "for",
            Self::From => "from",
            Self::Global => "global",
            Self::If => "if",
            Self::Import => "import",
            Self::In => "in",
            Self::Is => "is",
            Self::Lambda => "lambda",
            Self::Nonlocal => "nonlocal",
            Self::Not => "not",
            Self::Or => "or",
            Self::Pass => "pass",
            Self::Print => "print",
            Self::Raise => "raise",
            Self::Return => "return",
            Self::Try => "try",
            Self::While => "while",
            Self::With => "with",
            Self::Yield => "yield",
            Self::TrueKw => "True",
            Self::FalseKw => "False",
            Self::NoneKw => "None",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::StarStar => "**",
            Self::Slash => "/",
            Self::SlashSlash => "//",
            Self::Percent => "%",
            Self::At => "@",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::Ampersand => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::LessGreater => "<>",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::SlashSlashAssign => "//=",
            Self::PercentAssign => "%=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
            Self::LeftShiftAssign => "<<=",
            Self::RightShiftAssign => ">>=",
            Self::PowAssign => "**=",
            Self::MatMulAssign => "@=",
            Self::Arrow => "->",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Ellipsis => "...",
            Self::Semicolon => ";",
            Self::Backquote => "`",
            _ => return None,
        })
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "Name({name:?})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::BigInt(v) => write!(f, "BigInt({v})"),
            Self::Float(bits) => write!(f, "Float({})", f64::from_bits(*bits)),
            Self::Complex(bits) => write!(f, "Complex({}j)", f64::from_bits(*bits)),
            Self::Str { value, flags } => write!(f, "Str({value:?}, {flags:?})"),
            Self::Bytes { value, flags } => write!(f, "Bytes({} bytes, {flags:?})", value.len()),
            Self::Newline(kind) => write!(f, "Newline({kind:?})"),
            Self::Nl(kind) => write!(f, "Nl({kind:?})"),
            Self::Comment(name) => write!(f, "Comment({name:?})"),
            Self::Error(name) => write!(f, "Error({name:?})"),
            Self::IncompleteStr(flags) => write!(f, "IncompleteStr({flags:?})"),
            other => match other.static_image() {
                Some(image) => write!(f, "`{image}`"),
                None => write!(f, "{:?}", other.tag()),
            },
        }
    }
}

/// A token with its source span.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Stable discriminant index, for bitset membership tests.
    #[inline]
    pub fn tag(&self) -> TokenTag {
        self.kind.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_fit_in_u128_bitset() {
        assert!((TokenTag::IncompleteStr as u8) < 128);
    }

    #[test]
    fn keyword_range() {
        assert!(TokenKind::And.is_keyword());
        assert!(TokenKind::NoneKw.is_keyword());
        assert!(TokenKind::Yield.is_keyword());
        assert!(!TokenKind::Plus.is_keyword());
        assert!(!TokenKind::Name(Name::EMPTY).is_keyword());
    }

    #[test]
    fn aug_assign_range() {
        assert!(TokenKind::PlusAssign.is_aug_assign());
        assert!(TokenKind::MatMulAssign.is_aug_assign());
        assert!(!TokenKind::Assign.is_aug_assign());
        assert!(!TokenKind::EqEq.is_aug_assign());
    }

    #[test]
    fn static_images() {
        assert_eq!(TokenKind::Def.static_image(), Some("def"));
        assert_eq!(TokenKind::SlashSlashAssign.static_image(), Some("//="));
        assert_eq!(TokenKind::Int(1).static_image(), None);
    }

    #[test]
    fn float_bits_hashable() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TokenKind::Float(1.5f64.to_bits()));
        set.insert(TokenKind::Float(1.5f64.to_bits()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn statement_enders() {
        assert!(TokenKind::Newline(NewlineKind::LineFeed).ends_statement());
        assert!(TokenKind::EndOfFile.ends_statement());
        assert!(!TokenKind::Indent.ends_statement());
    }
}

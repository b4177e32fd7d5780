//! Python tokenizer.
//!
//! Turns decoded source text into a token stream with Python's
//! indentation structure (`Indent`/`Dedent`), logical newlines, and
//! version-gated keywords, string prefixes and number forms. Built for
//! static analysis: malformed input always produces a token plus a
//! diagnostic, never a halt.
//!
//! Typical batch use:
//!
//! ```
//! use pylon_diagnostic::CollectingSink;
//! use pylon_ir::{PythonVersion, SharedInterner, TokenKind};
//! use pylon_lexer::{tokenize, TokenizerOptions};
//!
//! let interner = SharedInterner::new();
//! let mut sink = CollectingSink::new();
//! let options = TokenizerOptions::new(PythonVersion::V37);
//! let tokens = tokenize("x = 1\n", &interner, &options, &mut sink);
//! assert!(matches!(tokens[2].kind, TokenKind::Int(1)));
//! assert!(!sink.has_errors());
//! ```
//!
//! Raw bytes go through [`decode_python_source`] first, which applies
//! BOM sniffing and PEP-263 magic-comment resolution and reports any
//! encoding problems through the sink.

mod keywords;
mod literal;
mod numbers;
mod options;
mod strings;
mod tokenizer;

pub use keywords::lookup as keyword_lookup;
pub use literal::{
    parse_bytes, parse_float, parse_imaginary, parse_int, parse_string, IntValue, LiteralError,
};
pub use options::{GroupingRecoveryKeywords, TokenizerOptions};
pub use tokenizer::{CommentCallback, IncompleteString, Tokenizer, TokenizerSnapshot};

use pylon_diagnostic::{Diagnostic, ErrorCode, ErrorSink, Severity};
use pylon_ir::{NewlineTable, PythonVersion, SharedInterner, Span, Token, TokenKind};
use pylon_lexer_core::{decode_source, Codec, DecodedSource, EncodingIssueKind, SourceBuffer};

/// Source-file default encoding when no BOM or magic comment says
/// otherwise: ASCII for 2.x, UTF-8 for 3.x.
pub fn default_codec(version: PythonVersion) -> Codec {
    if version.is_2x() {
        Codec::Ascii
    } else {
        Codec::Utf8
    }
}

/// Decode raw source bytes, reporting encoding problems as
/// diagnostics. Decoding is best-effort: the returned text is always
/// usable, with U+FFFD standing in for undecodable bytes.
pub fn decode_python_source(
    bytes: &[u8],
    version: PythonVersion,
    sink: &mut dyn ErrorSink,
) -> DecodedSource {
    let decoded = decode_source(bytes, default_codec(version));
    for issue in &decoded.issues {
        let span = Span::new(issue.pos, issue.pos + issue.len);
        match issue.kind {
            EncodingIssueKind::UnsupportedBom => {
                sink.report(Diagnostic::new(
                    "UTF-16 encoded source is not supported",
                    span,
                    ErrorCode::SYNTAX_ERROR,
                    Severity::FatalError,
                ));
            }
            EncodingIssueKind::BomCodecConflict => {
                sink.report(Diagnostic::new(
                    "file has both Unicode marker and PEP-263 file encoding.  \
                     You must use \"utf-8\" as the encoding name when a BOM is present.",
                    span,
                    ErrorCode::SYNTAX_ERROR,
                    Severity::FatalError,
                ));
            }
            EncodingIssueKind::UnknownCodecName => {
                let name = decoded
                    .magic_comment
                    .as_ref()
                    .map_or("<unknown>", |m| m.name.as_str());
                sink.report(Diagnostic::new(
                    format!("unknown encoding: {name}"),
                    span,
                    ErrorCode::SYNTAX_ERROR,
                    Severity::Warning,
                ));
            }
            EncodingIssueKind::MalformedBytes => {
                sink.report(Diagnostic::new(
                    format!(
                        "could not decode source bytes with '{}' encoding",
                        decoded.codec.name()
                    ),
                    span,
                    ErrorCode::SYNTAX_ERROR,
                    Severity::FatalError,
                ));
            }
        }
    }
    decoded
}

/// Tokenize a whole decoded source in one call. Convenience wrapper
/// for hosts that want the full stream; the parser drives
/// [`Tokenizer`] directly instead.
pub fn tokenize(
    source: &str,
    interner: &SharedInterner,
    options: &TokenizerOptions,
    sink: &mut dyn ErrorSink,
) -> Vec<Token> {
    let buffer = SourceBuffer::new(source);
    let mut tokenizer = Tokenizer::new(&buffer, interner.clone(), options.clone());
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token(sink);
        let done = matches!(token.kind, TokenKind::EndOfFile);
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

/// Like [`tokenize`], also returning the newline table built while
/// scanning.
pub fn tokenize_with_lines(
    source: &str,
    interner: &SharedInterner,
    options: &TokenizerOptions,
    sink: &mut dyn ErrorSink,
) -> (Vec<Token>, NewlineTable) {
    let buffer = SourceBuffer::new(source);
    let mut tokenizer = Tokenizer::new(&buffer, interner.clone(), options.clone());
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token(sink);
        let done = matches!(token.kind, TokenKind::EndOfFile);
        tokens.push(token);
        if done {
            return (tokens, tokenizer.into_newline_table());
        }
    }
}

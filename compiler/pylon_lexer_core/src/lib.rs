//! Pylon Lexer Core - Low-Level Scanning Layer
//!
//! Standalone foundation for the Python tokenizer, with zero `pylon_*`
//! dependencies so external tools (highlighters, encoding probes) can
//! use it directly:
//!
//! - [`encoding`]: BOM sniffing, PEP-263 magic comment detection, codec
//!   alias resolution, and strict-then-lossy decoding to UTF-8 text.
//! - [`SourceBuffer`]: sentinel-terminated buffer over decoded text for
//!   zero-bounds-check scanning.
//! - [`Cursor`]: `Copy` byte cursor with memchr-accelerated skip
//!   helpers for string bodies and comments.
//!
//! The stateful tokenizer itself lives in `pylon_lexer`; this crate
//! knows nothing about tokens.

pub mod encoding;

mod cursor;
mod source_buffer;

pub use cursor::Cursor;
pub use encoding::{
    decode_source, find_magic_comment, normalize_codec_name, resolve_codec, sniff_bom, Bom, Codec,
    DecodedSource, EncodingIssue, EncodingIssueKind, MagicComment,
};
pub use source_buffer::SourceBuffer;

//! Sentinel-terminated source buffer for zero-bounds-check scanning.
//!
//! The buffer guarantees a `0x00` sentinel byte after the decoded source
//! text, allowing the scanner to detect EOF without explicit bounds
//! checking. The total buffer size is rounded up to the next 64-byte
//! boundary, which also provides safe padding for `peek()` and `peek2()`
//! near the end of the buffer.
//!
//! Construction happens *after* encoding resolution: the input here is
//! already-decoded UTF-8 text. The only byte-level issue left to detect
//! is interior NUL characters, which the tokenizer reports as errors.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Sentinel-terminated buffer over decoded source text.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: `[source_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// Length of the actual source content (excludes sentinel and padding).
    source_len: u32,
    /// Offsets of interior NUL bytes found during construction.
    interior_nulls: Vec<u32>,
}

impl SourceBuffer {
    /// Create a new sentinel-terminated buffer from decoded source text.
    ///
    /// # File Size
    ///
    /// Sources larger than `u32::MAX` bytes (~4 GiB) are accepted but
    /// `source_len` saturates; the integration layer rejects oversized
    /// files upstream.
    pub fn new(source: &str) -> Self {
        let source_bytes = source.as_bytes();
        let source_len = source_bytes.len();

        // Round up to the next 64-byte boundary. The minimum is source
        // + 3 zero bytes, so `peek()` and `peek2()` stay in bounds even
        // when the cursor sits on the sentinel.
        let padded_len = (source_len + 3 + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        // Zero-filled allocation; the sentinel and padding are already 0x00.
        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(source_bytes);

        let mut interior_nulls = Vec::new();
        let mut offset = 0;
        while let Some(pos) = memchr::memchr(0, &source_bytes[offset..]) {
            let absolute = offset + pos;
            if let Ok(p) = u32::try_from(absolute) {
                interior_nulls.push(p);
            }
            offset = absolute + 1;
        }

        Self {
            buf,
            source_len: u32::try_from(source_len).unwrap_or(u32::MAX),
            interior_nulls,
        }
    }

    /// Returns the source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// The source text.
    #[allow(
        unsafe_code,
        reason = "buffer constructed from &str; prefix is valid UTF-8"
    )]
    pub fn as_str(&self) -> &str {
        // SAFETY: `buf[..source_len]` is a byte-for-byte copy of the `&str`
        // passed to `new()`.
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Create a [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len)
    }

    /// Length of the source content in bytes (excludes sentinel and padding).
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Returns `true` if the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    /// Offsets of interior NUL bytes found during construction.
    ///
    /// The integration layer converts these into diagnostics.
    pub fn interior_nulls(&self) -> &[u32] {
        &self.interior_nulls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let buf = SourceBuffer::new("");
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
        assert!(buf.as_bytes().is_empty());
        assert!(buf.interior_nulls().is_empty());
        // Sentinel present at index 0.
        assert!(buf.cursor().is_eof());
    }

    #[test]
    fn ascii_source() {
        let buf = SourceBuffer::new("x = 1");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.as_bytes(), b"x = 1");
        assert_eq!(buf.as_str(), "x = 1");
        assert!(buf.interior_nulls().is_empty());
    }

    #[test]
    fn buffer_is_cache_line_padded() {
        for len in [0, 1, 10, 63, 64, 65, 127, 128, 1000] {
            let source: String = "x".repeat(len);
            let buf = SourceBuffer::new(&source);
            let mut c = buf.cursor();
            c.advance_n(buf.len());
            // peek/peek2 land in padding and read zero.
            assert_eq!(c.peek(), 0);
            assert_eq!(c.peek2(), 0);
        }
    }

    #[test]
    fn detects_interior_nulls() {
        let buf = SourceBuffer::new("\0ab\0c\0");
        assert_eq!(buf.interior_nulls(), &[0, 3, 5]);
    }

    #[test]
    fn cursor_starts_at_zero() {
        let buf = SourceBuffer::new("print");
        let cursor = buf.cursor();
        assert_eq!(cursor.pos(), 0);
        assert_eq!(cursor.current(), b'p');
    }
}

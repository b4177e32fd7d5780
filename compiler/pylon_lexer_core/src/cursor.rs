//! Zero-cost cursor over a sentinel-terminated buffer.
//!
//! The cursor advances through the buffer byte-by-byte. EOF is detected
//! when the current byte equals the sentinel (`0x00`) and the position
//! has reached or exceeded the source length. No explicit bounds checking
//! is performed in the common case -- the sentinel guarantees safe
//! termination.
//!
//! # Interior Null Bytes
//!
//! If the source contains interior null bytes (U+0000), the cursor
//! distinguishes them from EOF by comparing `pos` against `source_len`.
//! A null at `pos < source_len` is an interior null (error token);
//! a null at `pos >= source_len` is the sentinel (EOF).

/// Returns the earliest (minimum) of two optional positions.
///
/// Used by the memchr-based scanning methods to combine results from
/// separate memchr calls when we need more needles than `memchr3`
/// supports.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Zero-cost cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
/// The cursor is [`Copy`], enabling cheap state snapshots for the
/// tokenizer's one-token lookback and for interactive re-scans.
///
/// # Invariant
///
/// `buf` must be sentinel-terminated: `buf[source_len] == 0x00`, and all
/// bytes after `source_len` are `0x00` (cache-line padding). This is
/// guaranteed by [`SourceBuffer`](crate::SourceBuffer) construction.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (source + sentinel + padding).
    buf: &'a [u8],
    /// Current read position (byte index into `buf`).
    pos: u32,
    /// Length of actual source content (excludes sentinel and padding).
    source_len: u32,
}

/// Size assertion: Cursor should be <= 24 bytes on 64-bit platforms.
/// &[u8] = 16 (fat pointer), u32 = 4, u32 = 4 => 24 bytes.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0 over a sentinel-terminated buffer.
    ///
    /// # Contract
    ///
    /// `buf[source_len]` must be `0x00` (sentinel). All bytes after the
    /// sentinel must also be `0x00` (padding). This is guaranteed by
    /// `SourceBuffer::new()`.
    pub(crate) fn new(buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[source_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            pos: 0,
            source_len,
        }
    }

    /// Returns the byte at the current position.
    ///
    /// Returns `0x00` when at EOF (the sentinel byte). Interior null bytes
    /// also return `0x00`; use [`is_eof()`](Self::is_eof) to distinguish.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// Returns the byte one position ahead of current.
    ///
    /// Safe to call at any position: the sentinel and cache-line padding
    /// guarantee valid reads beyond the source content.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf[self.pos as usize + 1]
    }

    /// Returns the byte two positions ahead of current.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.buf[self.pos as usize + 2]
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance the cursor by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Rewind the cursor to an earlier position.
    ///
    /// Used by the number scanner's one-token lookback (`1else`) and by
    /// grouping recovery when a swallowed newline must be replayed.
    #[inline]
    pub fn rewind_to(&mut self, pos: u32) {
        debug_assert!(pos <= self.pos, "rewind must move backwards");
        self.pos = pos;
    }

    /// Returns `true` if the cursor has reached EOF.
    ///
    /// EOF is when the current byte is the sentinel (`0x00`) and the
    /// position is at or past the source length. This distinguishes
    /// EOF from interior null bytes.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0 && self.pos >= self.source_len
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source content (excludes sentinel and padding).
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Extract a source substring as `&str`.
    ///
    /// # Contract
    ///
    /// `start..end` must fall within the source content (`end <= source_len`)
    /// and on valid UTF-8 character boundaries. This is guaranteed when
    /// `start` and `end` come from the scanner's token boundary tracking,
    /// since the source was decoded to `&str` before buffering.
    #[allow(
        unsafe_code,
        reason = "from_utf8_unchecked on source originally validated as &str"
    )]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(
            end <= self.source_len,
            "slice end {end} exceeds source length {}",
            self.source_len
        );
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        // SAFETY: The source buffer was constructed from `&str` (valid UTF-8).
        // The scanner ensures start..end falls on character boundaries within
        // the source content.
        unsafe { std::str::from_utf8_unchecked(&self.buf[start as usize..end as usize]) }
    }

    /// Extract a source substring from `start` to the current position.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// # Contract
    ///
    /// `pred(0)` must return `false`. This is true for all standard byte
    /// classification predicates (`is_ascii_alphanumeric`, etc.).
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.buf[self.pos as usize]) {
            self.pos += 1;
        }
    }

    /// Returns the number of bytes in the UTF-8 character starting with `byte`.
    ///
    /// - `0xC0..=0xDF`: 2 bytes
    /// - `0xE0..=0xEF`: 3 bytes
    /// - `0xF0..=0xF7`: 4 bytes
    /// - Everything else (ASCII, continuation, invalid): 1 byte
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Decode the full `char` at the current position.
    ///
    /// Returns `None` at EOF.
    pub fn current_char(&self) -> Option<char> {
        if self.is_eof() {
            return None;
        }
        let width = Self::utf8_char_width(self.current()) as usize;
        let end = (self.pos as usize + width).min(self.source_len as usize);
        std::str::from_utf8(&self.buf[self.pos as usize..end])
            .ok()
            .and_then(|s| s.chars().next())
    }

    /// Advance the cursor past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }

    /// Advance to the next `\n` or `\r` byte or EOF using SIMD-accelerated
    /// search. Used by the comment scanner to skip comment bodies.
    ///
    /// Scans only within source content (not into sentinel/padding).
    /// If no newline found, positions cursor at EOF sentinel.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        if let Some(offset) = memchr::memchr2(b'\n', b'\r', remaining) {
            self.pos += offset as u32;
        } else {
            self.pos = self.source_len;
        }
    }

    /// Advance past ordinary single-line string content to the next
    /// interesting byte. Returns the byte found, or 0 for EOF.
    ///
    /// "Interesting" bytes: the quote character, `\`, `\n`, `\r`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_string_delim(&mut self, quote: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        // Nearest of quote, backslash, or \n; \r is rare but must be caught.
        let primary = memchr::memchr3(quote, b'\\', b'\n', remaining);
        let cr = memchr::memchr(b'\r', remaining);

        let offset = earliest_of(primary, cr);

        if let Some(off) = offset {
            self.pos += off as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.source_len;
            0 // EOF sentinel
        }
    }

    /// Advance past triple-quoted string content to the next interesting
    /// byte. Returns the byte found, or 0 for EOF.
    ///
    /// Newlines are legal inside triple-quoted strings but the caller
    /// still records them in its line table, so the scan stops at the
    /// quote character, `\`, `\n` and `\r`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_triple_delim(&mut self, quote: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        let primary = memchr::memchr3(quote, b'\\', b'\n', remaining);
        let cr = memchr::memchr(b'\r', remaining);

        if let Some(off) = earliest_of(primary, cr) {
            self.pos += off as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.source_len;
            0
        }
    }

    /// Advance past horizontal whitespace (spaces and tabs).
    ///
    /// The sentinel byte (`0x00`) naturally terminates scanning since it
    /// is neither space nor tab.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        loop {
            let b = self.buf[self.pos as usize];
            if b == b' ' || b == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

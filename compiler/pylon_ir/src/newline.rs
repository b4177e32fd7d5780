//! Newline-offset table for offset → line/column resolution.
//!
//! The tokenizer records the end offset of every physical line it crosses;
//! diagnostics resolve raw byte offsets to 1-based line/column pairs by
//! binary search over that table.

/// The style of a physical line terminator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NewlineKind {
    /// `\n`
    LineFeed,
    /// `\r\n`
    CarriageReturnLineFeed,
    /// `\r`
    CarriageReturn,
    /// End of file with no trailing terminator.
    None,
}

impl NewlineKind {
    /// Byte length of the terminator.
    #[inline]
    pub const fn len(self) -> u32 {
        match self {
            NewlineKind::LineFeed | NewlineKind::CarriageReturn => 1,
            NewlineKind::CarriageReturnLineFeed => 2,
            NewlineKind::None => 0,
        }
    }

    /// True when this kind has zero length.
    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, NewlineKind::None)
    }

    /// The terminator's source text.
    pub const fn as_str(self) -> &'static str {
        match self {
            NewlineKind::LineFeed => "\n",
            NewlineKind::CarriageReturnLineFeed => "\r\n",
            NewlineKind::CarriageReturn => "\r",
            NewlineKind::None => "",
        }
    }
}

/// A 1-based line/column position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Strictly-increasing offsets of the first byte *after* each newline.
///
/// Invariant: offsets are strictly increasing. `push` enforces this in
/// debug builds; the tokenizer only appends as it advances.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NewlineTable {
    offsets: Vec<u32>,
}

impl NewlineTable {
    /// Create an empty table.
    pub fn new() -> Self {
        NewlineTable {
            offsets: Vec::new(),
        }
    }

    /// Build a table by scanning source text once.
    pub fn from_source(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut offsets = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
                    i += 1;
                }
                b'\r' => {
                    let skip = if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    offsets.push(u32::try_from(i + skip).unwrap_or(u32::MAX));
                    i += skip;
                }
                _ => i += 1,
            }
        }
        NewlineTable { offsets }
    }

    /// Record a line break. `offset_after` is the offset of the first byte
    /// following the terminator.
    #[inline]
    pub fn push(&mut self, offset_after: u32) {
        debug_assert!(
            self.offsets.last().map_or(true, |&last| offset_after > last),
            "newline offsets must be strictly increasing"
        );
        self.offsets.push(offset_after);
    }

    /// Number of recorded line breaks.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when no line break has been recorded.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Resolve an absolute byte offset to a 1-based line/column.
    ///
    /// Columns count bytes from the line start; callers needing character
    /// columns can re-measure the line slice themselves.
    pub fn line_col(&self, offset: u32) -> LineCol {
        match self.offsets.binary_search(&offset) {
            // Exactly at a line start
            Ok(idx) => LineCol {
                line: u32::try_from(idx + 2).unwrap_or(u32::MAX),
                column: 1,
            },
            Err(idx) => {
                let line_start = if idx == 0 { 0 } else { self.offsets[idx - 1] };
                LineCol {
                    line: u32::try_from(idx + 1).unwrap_or(u32::MAX),
                    column: offset - line_start + 1,
                }
            }
        }
    }

    /// The recorded offsets, for bulk export.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_resolution() {
        // "ab\ncd\n\nx"
        let table = NewlineTable::from_source("ab\ncd\n\nx");
        assert_eq!(table.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(table.line_col(1), LineCol { line: 1, column: 2 });
        assert_eq!(table.line_col(3), LineCol { line: 2, column: 1 });
        assert_eq!(table.line_col(4), LineCol { line: 2, column: 2 });
        assert_eq!(table.line_col(6), LineCol { line: 3, column: 1 });
        assert_eq!(table.line_col(7), LineCol { line: 4, column: 1 });
    }

    #[test]
    fn crlf_counts_as_one_break() {
        let table = NewlineTable::from_source("a\r\nb\rc");
        assert_eq!(table.len(), 2);
        assert_eq!(table.line_col(3), LineCol { line: 2, column: 1 });
        assert_eq!(table.line_col(5), LineCol { line: 3, column: 1 });
    }

    #[test]
    fn empty_source() {
        let table = NewlineTable::from_source("");
        assert!(table.is_empty());
        assert_eq!(table.line_col(0), LineCol { line: 1, column: 1 });
    }

    #[test]
    fn newline_kind_lengths() {
        assert_eq!(NewlineKind::LineFeed.len(), 1);
        assert_eq!(NewlineKind::CarriageReturnLineFeed.len(), 2);
        assert_eq!(NewlineKind::CarriageReturn.len(), 1);
        assert_eq!(NewlineKind::None.len(), 0);
        assert_eq!(NewlineKind::CarriageReturnLineFeed.as_str(), "\r\n");
    }
}

//! Source encoding resolution (PEP 263).
//!
//! A Python source file declares its encoding through a UTF-8 BOM, a
//! magic `# coding: <name>` comment on line 1 or 2, or neither (the
//! caller's default applies). This module sniffs the BOM, finds the
//! magic comment, resolves the declared name through the codec alias
//! table, and decodes the raw bytes to a `String`.
//!
//! Decoding is strict-then-lossy: the first malformed byte sequence is
//! recorded as an [`EncodingIssue`] with its exact byte offset, then the
//! input is re-decoded with replacement characters so a best-effort
//! parse can continue. The integration layer (`pylon_lexer`) converts
//! issues to diagnostics with spans and messages.

use encoding_rs::{DecoderResult, Encoding};

/// A resolved codec.
///
/// `Ascii` and `Latin1` are handled in-crate: the WHATWG `latin1` label
/// means windows-1252, which differs from Python's latin-1 in the
/// `0x80..=0x9F` range, and `encoding_rs` has no strict ASCII decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Codec {
    Utf8,
    Ascii,
    Latin1,
    External(&'static Encoding),
}

impl Codec {
    /// Canonical (normalized) codec name.
    pub fn name(self) -> &'static str {
        match self {
            Codec::Utf8 => "utf-8",
            Codec::Ascii => "ascii",
            Codec::Latin1 => "latin-1",
            Codec::External(enc) => enc.name(),
        }
    }

    /// True for the names that coexist with a UTF-8 BOM.
    pub fn is_utf8(self) -> bool {
        matches!(self, Codec::Utf8)
    }
}

/// Byte order mark found at the start of the input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bom {
    /// `EF BB BF` — consumed, implies utf-8.
    Utf8,
    /// `FF FE` — unsupported as a source encoding marker.
    Utf16Le,
    /// `FE FF` — unsupported as a source encoding marker.
    Utf16Be,
}

impl Bom {
    pub fn len(self) -> u32 {
        match self {
            Bom::Utf8 => 3,
            Bom::Utf16Le | Bom::Utf16Be => 2,
        }
    }
}

/// Sniff a BOM from the first bytes of the input.
pub fn sniff_bom(bytes: &[u8]) -> Option<Bom> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some(Bom::Utf8),
        [0xFF, 0xFE, ..] => Some(Bom::Utf16Le),
        [0xFE, 0xFF, ..] => Some(Bom::Utf16Be),
        _ => None,
    }
}

/// A `# coding: <name>` magic comment found on line 1 or 2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MagicComment {
    /// The declared name, verbatim (not normalized).
    pub name: String,
    /// Byte offset of the name within the scanned slice.
    pub name_start: u32,
    /// 1 or 2.
    pub line: u32,
}

impl MagicComment {
    pub fn name_end(&self) -> u32 {
        self.name_start + u32::try_from(self.name.len()).unwrap_or(0)
    }
}

/// Scan the first two lines for a PEP-263 magic comment.
///
/// The comment must be the first thing on its line (`#` at column 0)
/// and contain `coding[:=]` followed by an optionally space-padded
/// codec name.
pub fn find_magic_comment(bytes: &[u8]) -> Option<MagicComment> {
    let mut line_start = 0usize;
    for line_no in 1..=2u32 {
        let rel_end = memchr::memchr2(b'\n', b'\r', &bytes[line_start..]);
        let line_end = rel_end.map_or(bytes.len(), |i| line_start + i);
        let line = &bytes[line_start..line_end];

        if line.first() == Some(&b'#') {
            if let Some((name, offset)) = scan_coding(line) {
                return Some(MagicComment {
                    name,
                    name_start: u32::try_from(line_start + offset).unwrap_or(u32::MAX),
                    line: line_no,
                });
            }
        }

        if line_end >= bytes.len() {
            break;
        }
        line_start = line_end + 1;
        if bytes[line_end] == b'\r' && bytes.get(line_start) == Some(&b'\n') {
            line_start += 1;
        }
    }
    None
}

/// Find `coding[:=]\s*([-\w.]+)` within one comment line.
///
/// Returns the raw name and its byte offset within the line. Matching
/// inside longer words is intentional: `# -*- encoding: utf-8 -*-`
/// declares through the `coding:` suffix.
fn scan_coding(line: &[u8]) -> Option<(String, usize)> {
    for found in memchr::memmem::find_iter(line, b"coding") {
        let mut i = found + b"coding".len();
        match line.get(i) {
            Some(b':' | b'=') => i += 1,
            _ => continue,
        }
        while matches!(line.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let name_start = i;
        while matches!(
            line.get(i),
            Some(b'-' | b'_' | b'.' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9')
        ) {
            i += 1;
        }
        if i > name_start {
            let name = String::from_utf8_lossy(&line[name_start..i]).into_owned();
            return Some((name, name_start));
        }
    }
    None
}

/// Normalize a codec name the way the `codecs` module does: lowercase,
/// with `-` and spaces folded to `_`. Dots are preserved
/// (`ANSI_X3.4-1968` → `ansi_x3.4_1968`).
pub fn normalize_codec_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Resolve a *normalized* codec name through the alias table.
///
/// Covers the CPython alias sets for the encodings that appear in real
/// source files; everything else is unknown and falls back to the
/// caller's default with a warning.
pub fn resolve_codec(normalized: &str) -> Option<Codec> {
    use encoding_rs::*;

    Some(match normalized {
        "utf_8" | "utf8" | "u8" | "utf" | "utf_8_sig" => Codec::Utf8,

        "ascii" | "us_ascii" | "us" | "646" | "cp367" | "ibm367" | "csascii" | "iso646_us"
        | "ansi_x3.4_1968" | "ansi_x3_4_1968" | "ansi_x3.4_1986" | "iso_ir_6" => Codec::Ascii,

        "latin_1" | "latin1" | "latin" | "l1" | "iso_8859_1" | "iso8859_1" | "iso8859" | "8859"
        | "cp819" | "819" | "ibm819" | "iso_8859_1_1987" | "iso_ir_100" | "csisolatin1" => {
            Codec::Latin1
        }

        "utf_16" | "utf16" | "u16" | "utf_16_le" | "utf_16le" => Codec::External(UTF_16LE),
        "utf_16_be" | "utf_16be" => Codec::External(UTF_16BE),

        "cp1250" | "windows_1250" => Codec::External(WINDOWS_1250),
        "cp1251" | "windows_1251" => Codec::External(WINDOWS_1251),
        "cp1252" | "windows_1252" => Codec::External(WINDOWS_1252),
        "cp1253" | "windows_1253" => Codec::External(WINDOWS_1253),
        "cp1254" | "windows_1254" => Codec::External(WINDOWS_1254),
        "cp1255" | "windows_1255" => Codec::External(WINDOWS_1255),
        "cp1256" | "windows_1256" => Codec::External(WINDOWS_1256),
        "cp1257" | "windows_1257" => Codec::External(WINDOWS_1257),
        "cp1258" | "windows_1258" => Codec::External(WINDOWS_1258),

        "iso_8859_2" | "iso8859_2" | "latin_2" | "latin2" | "l2" => Codec::External(ISO_8859_2),
        "iso_8859_3" | "iso8859_3" | "latin_3" | "latin3" | "l3" => Codec::External(ISO_8859_3),
        "iso_8859_4" | "iso8859_4" | "latin_4" | "latin4" | "l4" => Codec::External(ISO_8859_4),
        "iso_8859_5" | "iso8859_5" | "cyrillic" => Codec::External(ISO_8859_5),
        "iso_8859_6" | "iso8859_6" | "arabic" => Codec::External(ISO_8859_6),
        "iso_8859_7" | "iso8859_7" | "greek" | "greek8" => Codec::External(ISO_8859_7),
        "iso_8859_8" | "iso8859_8" | "hebrew" => Codec::External(ISO_8859_8),
        "iso_8859_10" | "iso8859_10" | "latin_6" | "latin6" | "l6" => Codec::External(ISO_8859_10),
        "iso_8859_13" | "iso8859_13" | "latin_7" | "latin7" | "l7" => Codec::External(ISO_8859_13),
        "iso_8859_14" | "iso8859_14" | "latin_8" | "latin8" | "l8" => Codec::External(ISO_8859_14),
        "iso_8859_15" | "iso8859_15" | "latin_9" | "latin9" | "l9" => Codec::External(ISO_8859_15),
        "iso_8859_16" | "iso8859_16" | "latin_10" | "latin10" | "l10" => {
            Codec::External(ISO_8859_16)
        }

        "koi8_r" => Codec::External(KOI8_R),
        "koi8_u" => Codec::External(KOI8_U),

        "gb2312" | "gbk" | "cp936" | "936" | "ms936" | "chinese" | "euc_cn" | "euccn"
        | "eucgb2312_cn" | "gb2312_1980" | "gb2312_80" | "iso_ir_58" => Codec::External(GBK),
        "gb18030" => Codec::External(GB18030),

        "big5" | "big5_tw" | "csbig5" | "cp950" | "big5_hkscs" | "hkscs" => Codec::External(BIG5),

        "shift_jis" | "sjis" | "s_jis" | "shiftjis" | "cp932" | "932" | "ms932" | "mskanji"
        | "ms_kanji" => Codec::External(SHIFT_JIS),
        "euc_jp" | "eucjp" | "ujis" | "u_jis" => Codec::External(EUC_JP),
        "euc_kr" | "euckr" | "korean" | "ksc5601" | "ks_c_5601" | "cp949" | "949" | "uhc" => {
            Codec::External(EUC_KR)
        }

        _ => return None,
    })
}

/// Encoding issue detected during resolution or decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingIssue {
    pub kind: EncodingIssueKind,
    /// Byte position in the raw input where the issue was found.
    pub pos: u32,
    /// Byte length of the problematic sequence.
    pub len: u32,
}

/// Kind of encoding issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingIssueKind {
    /// UTF-16 LE/BE BOM at the start. Not a supported source encoding.
    UnsupportedBom,
    /// A BOM and a PEP-263 name other than utf-8 both present. Fatal;
    /// decoding proceeds as utf-8.
    BomCodecConflict,
    /// Magic comment names a codec the alias table cannot resolve.
    /// Decoding proceeds with the default codec.
    UnknownCodecName,
    /// A byte sequence the codec cannot decode. Decoding continues
    /// lossily after the report.
    MalformedBytes,
}

/// The result of encoding resolution and decoding.
#[derive(Clone, Debug)]
pub struct DecodedSource {
    /// The decoded text, possibly with replacement characters.
    pub text: String,
    /// The codec actually used.
    pub codec: Codec,
    /// BOM found at the start of the input, if any.
    pub bom: Option<Bom>,
    /// Magic comment, if one was found. Offsets are relative to the
    /// raw input (BOM included).
    pub magic_comment: Option<MagicComment>,
    /// Issues recorded during resolution and decoding, in byte order.
    pub issues: Vec<EncodingIssue>,
}

impl DecodedSource {
    pub fn bom_len(&self) -> u32 {
        self.bom.map_or(0, Bom::len)
    }
}

/// Resolve the encoding of `bytes` and decode to text.
///
/// `default` applies when neither a BOM nor a magic comment decides
/// (ascii under Python 2 defaults, utf-8 under Python 3).
pub fn decode_source(bytes: &[u8], default: Codec) -> DecodedSource {
    let bom = sniff_bom(bytes);
    let mut issues = Vec::new();

    // UTF-16 input cannot hold an ASCII-compatible magic comment; report
    // and decode best-effort so the caller still gets text.
    if let Some(wide @ (Bom::Utf16Le | Bom::Utf16Be)) = bom {
        issues.push(EncodingIssue {
            kind: EncodingIssueKind::UnsupportedBom,
            pos: 0,
            len: wide.len(),
        });
        let enc = match wide {
            Bom::Utf16Le => encoding_rs::UTF_16LE,
            _ => encoding_rs::UTF_16BE,
        };
        let body = &bytes[wide.len() as usize..];
        let (text, _) = enc.decode_without_bom_handling(body);
        return DecodedSource {
            text: text.into_owned(),
            codec: Codec::External(enc),
            bom,
            magic_comment: None,
            issues,
        };
    }

    let bom_len = bom.map_or(0, Bom::len);
    let body = &bytes[bom_len as usize..];

    let magic_comment = find_magic_comment(body).map(|mut m| {
        m.name_start += bom_len;
        m
    });

    let codec = match &magic_comment {
        Some(magic) => {
            let resolved = resolve_codec(&normalize_codec_name(&magic.name));
            if bom.is_some() && resolved != Some(Codec::Utf8) {
                // Both a Unicode marker and a PEP-263 declaration: the
                // name must be utf-8. The BOM wins.
                issues.push(EncodingIssue {
                    kind: EncodingIssueKind::BomCodecConflict,
                    pos: magic.name_start,
                    len: u32::try_from(magic.name.len()).unwrap_or(0),
                });
                Codec::Utf8
            } else {
                match resolved {
                    Some(codec) => codec,
                    None => {
                        issues.push(EncodingIssue {
                            kind: EncodingIssueKind::UnknownCodecName,
                            pos: magic.name_start,
                            len: u32::try_from(magic.name.len()).unwrap_or(0),
                        });
                        default
                    }
                }
            }
        }
        None if bom.is_some() => Codec::Utf8,
        None => default,
    };

    let text = decode_with(codec, body, bom_len, &mut issues);

    DecodedSource {
        text,
        codec,
        bom,
        magic_comment,
        issues,
    }
}

/// Decode `body` with `codec`, recording the first malformed sequence.
fn decode_with(codec: Codec, body: &[u8], offset: u32, issues: &mut Vec<EncodingIssue>) -> String {
    match codec {
        Codec::Utf8 => match std::str::from_utf8(body) {
            Ok(text) => text.to_owned(),
            Err(err) => {
                let pos = u32::try_from(err.valid_up_to()).unwrap_or(u32::MAX);
                let len = err.error_len().and_then(|l| u32::try_from(l).ok()).unwrap_or(1);
                issues.push(EncodingIssue {
                    kind: EncodingIssueKind::MalformedBytes,
                    pos: offset + pos,
                    len,
                });
                String::from_utf8_lossy(body).into_owned()
            }
        },
        Codec::Ascii => {
            if let Some(pos) = body.iter().position(|&b| b > 0x7F) {
                issues.push(EncodingIssue {
                    kind: EncodingIssueKind::MalformedBytes,
                    pos: offset + u32::try_from(pos).unwrap_or(u32::MAX),
                    len: 1,
                });
            }
            body.iter()
                .map(|&b| if b <= 0x7F { b as char } else { '\u{FFFD}' })
                .collect()
        }
        // Latin-1 maps every byte 1:1 to U+00..U+FF; it cannot fail.
        Codec::Latin1 => body.iter().map(|&b| b as char).collect(),
        Codec::External(enc) => {
            if let Some(pos) = first_malformed_offset(enc, body) {
                issues.push(EncodingIssue {
                    kind: EncodingIssueKind::MalformedBytes,
                    pos: offset + u32::try_from(pos).unwrap_or(u32::MAX),
                    len: 1,
                });
            }
            let (text, _) = enc.decode_without_bom_handling(body);
            text.into_owned()
        }
    }
}

/// Byte offset of the first sequence `enc` cannot decode, if any.
fn first_malformed_offset(enc: &'static Encoding, bytes: &[u8]) -> Option<usize> {
    let mut decoder = enc.new_decoder_without_bom_handling();
    let mut out = String::new();
    let mut total = 0usize;
    loop {
        out.clear();
        out.reserve(4096);
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[total..], &mut out, true);
        total += read;
        match result {
            DecoderResult::InputEmpty => return None,
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(seq_len, extra) => {
                return Some(total - seq_len as usize - extra as usize);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization() {
        assert_eq!(normalize_codec_name("UTF-8"), "utf_8");
        assert_eq!(normalize_codec_name("ISO 8859-1"), "iso_8859_1");
        assert_eq!(normalize_codec_name("ANSI_X3.4-1968"), "ansi_x3.4_1968");
    }

    #[test]
    fn alias_resolution() {
        assert_eq!(resolve_codec("utf8"), Some(Codec::Utf8));
        assert_eq!(resolve_codec("latin1"), Some(Codec::Latin1));
        assert_eq!(resolve_codec("us_ascii"), Some(Codec::Ascii));
        assert_eq!(
            resolve_codec("windows_1252"),
            Some(Codec::External(encoding_rs::WINDOWS_1252))
        );
        assert_eq!(
            resolve_codec("sjis"),
            Some(Codec::External(encoding_rs::SHIFT_JIS))
        );
        assert_eq!(resolve_codec("klingon"), None);
    }

    #[test]
    fn magic_comment_emacs_style() {
        let src = b"# -*- coding: latin-1 -*-\nx = 1\n";
        let magic = find_magic_comment(src).unwrap();
        assert_eq!(magic.name, "latin-1");
        assert_eq!(magic.line, 1);
        assert_eq!(
            &src[magic.name_start as usize..magic.name_end() as usize],
            b"latin-1"
        );
    }

    #[test]
    fn magic_comment_on_line_two() {
        let src = b"#!/usr/bin/env python\n# vim: set fileencoding=koi8-r :\n";
        let magic = find_magic_comment(src).unwrap();
        assert_eq!(magic.name, "koi8-r");
        assert_eq!(magic.line, 2);
    }

    #[test]
    fn magic_comment_not_on_line_three() {
        let src = b"x = 1\ny = 2\n# coding: latin-1\n";
        assert_eq!(find_magic_comment(src), None);
    }

    #[test]
    fn magic_comment_requires_leading_hash() {
        let src = b"x = 1  # coding: latin-1\n";
        assert_eq!(find_magic_comment(src), None);
    }

    #[test]
    fn decode_plain_utf8() {
        let src = decode_source("x = 'caf\u{e9}'\n".as_bytes(), Codec::Utf8);
        assert_eq!(src.codec, Codec::Utf8);
        assert!(src.issues.is_empty());
        assert_eq!(src.text, "x = 'caf\u{e9}'\n");
    }

    #[test]
    fn utf8_bom_consumed() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"x = 1\n");
        let src = decode_source(&bytes, Codec::Ascii);
        assert_eq!(src.bom, Some(Bom::Utf8));
        assert_eq!(src.codec, Codec::Utf8);
        assert_eq!(src.text, "x = 1\n");
        assert!(src.issues.is_empty());
    }

    #[test]
    fn bom_with_conflicting_declaration() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"# coding: latin-1\nx = 1\n");
        let src = decode_source(&bytes, Codec::Utf8);
        assert_eq!(src.codec, Codec::Utf8);
        assert_eq!(src.issues.len(), 1);
        assert_eq!(src.issues[0].kind, EncodingIssueKind::BomCodecConflict);
        // Issue points at the declared name, past the BOM.
        assert_eq!(src.issues[0].pos, 3 + 10);
    }

    #[test]
    fn bom_with_utf8_declaration_is_fine() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"# coding: utf-8\n");
        let src = decode_source(&bytes, Codec::Utf8);
        assert!(src.issues.is_empty());
        assert_eq!(src.codec, Codec::Utf8);
    }

    #[test]
    fn unknown_codec_falls_back_to_default() {
        let src = decode_source(b"# coding: ebcdic-ancient\nx\n", Codec::Utf8);
        assert_eq!(src.codec, Codec::Utf8);
        assert_eq!(src.issues.len(), 1);
        assert_eq!(src.issues[0].kind, EncodingIssueKind::UnknownCodecName);
    }

    #[test]
    fn latin1_decodes_high_bytes() {
        let src = decode_source(b"# coding: latin-1\ns = '\xe9'\n", Codec::Utf8);
        assert_eq!(src.codec, Codec::Latin1);
        assert!(src.issues.is_empty());
        assert!(src.text.contains('\u{e9}'));
    }

    #[test]
    fn malformed_utf8_reports_offset_then_degrades() {
        let src = decode_source(b"x = 1\n\xFF\xFEy = 2\n", Codec::Utf8);
        assert_eq!(src.issues.len(), 1);
        assert_eq!(src.issues[0].kind, EncodingIssueKind::MalformedBytes);
        assert_eq!(src.issues[0].pos, 6);
        assert!(src.text.contains('\u{FFFD}'));
        assert!(src.text.contains("y = 2"));
    }

    #[test]
    fn ascii_default_rejects_high_bytes() {
        let src = decode_source(b"s = '\xe9'\n", Codec::Ascii);
        assert_eq!(src.issues.len(), 1);
        assert_eq!(src.issues[0].pos, 5);
        assert!(src.text.contains('\u{FFFD}'));
    }

    #[test]
    fn utf16_bom_is_unsupported_but_decoded() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "x=1\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let src = decode_source(&bytes, Codec::Utf8);
        assert_eq!(src.bom, Some(Bom::Utf16Le));
        assert_eq!(src.issues[0].kind, EncodingIssueKind::UnsupportedBom);
        assert_eq!(src.text, "x=1\n");
    }
}

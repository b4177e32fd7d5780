//! Literal decoding: escape processing and numeric conversion.
//!
//! Pure functions shared by the tokenizer and by hosts that need to
//! decode literal text without a full parse (doc processors, constant
//! folders). Everything returns `Result`; nothing here panics on
//! malformed input.

use num_bigint::BigInt;
use thiserror::Error;

/// Errors from literal decoding.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LiteralError {
    #[error("invalid integer literal")]
    InvalidInteger,
    #[error("invalid float literal")]
    InvalidFloat,
    #[error("invalid imaginary literal")]
    InvalidImaginary,
    #[error("bytes can only contain ASCII literal characters")]
    NonAsciiBytes,
    #[error("unicode escape out of range")]
    EscapeOutOfRange,
}

/// A decoded integer: machine-width when it fits, arbitrary precision
/// otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntValue {
    Small(i64),
    Big(BigInt),
}

/// Decode the body of a text string literal (delimiters already
/// stripped).
///
/// `is_raw` leaves escapes verbatim; `allow_unicode_escapes` enables
/// `\uHHHH`/`\UHHHHHHHH` (always for 3.x text strings, for `u`-prefixed
/// strings in 2.x, and — unusually — still inside `ur''` raw strings).
/// `normalize_line_endings` collapses CR and CRLF to LF.
pub fn parse_string(
    raw: &str,
    is_raw: bool,
    allow_unicode_escapes: bool,
    normalize_line_endings: bool,
) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' if normalize_line_endings => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\\' => {
                if is_raw && !(allow_unicode_escapes && matches!(chars.peek(), Some('u' | 'U'))) {
                    // Raw: backslash and next char kept verbatim. The
                    // ur'' form still decodes \u escapes.
                    out.push('\\');
                    if let Some(next) = chars.next() {
                        push_maybe_normalized(&mut out, next, &mut chars, normalize_line_endings);
                    }
                    continue;
                }
                match chars.next() {
                    None => out.push('\\'),
                    Some('\n') => {}
                    Some('\r') => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                    }
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some('a') => out.push('\u{7}'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('v') => out.push('\u{b}'),
                    Some(d @ '0'..='7') => {
                        let value = read_octal(d, &mut chars);
                        match char::from_u32(value) {
                            Some(c) => out.push(c),
                            None => return Err(LiteralError::EscapeOutOfRange),
                        }
                    }
                    Some('x') => match read_hex(&mut chars, 2) {
                        Some(value) => match char::from_u32(value) {
                            Some(c) => out.push(c),
                            None => return Err(LiteralError::EscapeOutOfRange),
                        },
                        // Fewer than two hex digits: escape left verbatim.
                        None => out.push_str("\\x"),
                    },
                    Some('u') if allow_unicode_escapes => match read_hex(&mut chars, 4) {
                        Some(value) => match char::from_u32(value) {
                            Some(c) => out.push(c),
                            None => return Err(LiteralError::EscapeOutOfRange),
                        },
                        None => out.push_str("\\u"),
                    },
                    Some('U') if allow_unicode_escapes => match read_hex(&mut chars, 8) {
                        Some(value) => match char::from_u32(value) {
                            Some(c) => out.push(c),
                            None => return Err(LiteralError::EscapeOutOfRange),
                        },
                        None => out.push_str("\\U"),
                    },
                    // Unknown escape: kept verbatim, backslash included.
                    Some(other) => {
                        out.push('\\');
                        push_maybe_normalized(&mut out, other, &mut chars, normalize_line_endings);
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Decode the body of a bytes literal. Non-ASCII source characters are
/// rejected; `\u`/`\U` are not escapes in bytes and stay verbatim.
pub fn parse_bytes(
    raw: &str,
    is_raw: bool,
    normalize_line_endings: bool,
) -> Result<Vec<u8>, LiteralError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            c if !c.is_ascii() => return Err(LiteralError::NonAsciiBytes),
            '\r' if normalize_line_endings => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(b'\n');
            }
            '\\' => {
                if is_raw {
                    out.push(b'\\');
                    match chars.next() {
                        Some(c) if c.is_ascii() => out.push(c as u8),
                        Some(_) => return Err(LiteralError::NonAsciiBytes),
                        None => {}
                    }
                    continue;
                }
                match chars.next() {
                    None => out.push(b'\\'),
                    Some('\n') => {}
                    Some('\r') => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                    }
                    Some('\\') => out.push(b'\\'),
                    Some('\'') => out.push(b'\''),
                    Some('"') => out.push(b'"'),
                    Some('a') => out.push(7),
                    Some('b') => out.push(8),
                    Some('f') => out.push(12),
                    Some('n') => out.push(b'\n'),
                    Some('r') => out.push(b'\r'),
                    Some('t') => out.push(b'\t'),
                    Some('v') => out.push(11),
                    #[allow(clippy::cast_possible_truncation)]
                    Some(d @ '0'..='7') => {
                        let value = read_octal(d, &mut chars);
                        out.push((value & 0xFF) as u8);
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    Some('x') => match read_hex(&mut chars, 2) {
                        Some(value) => out.push(value as u8),
                        None => out.extend_from_slice(b"\\x"),
                    },
                    Some(other) if other.is_ascii() => {
                        out.push(b'\\');
                        out.push(other as u8);
                    }
                    Some(_) => return Err(LiteralError::NonAsciiBytes),
                }
            }
            other => out.push(other as u8),
        }
    }

    Ok(out)
}

fn push_maybe_normalized(
    out: &mut String,
    ch: char,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    normalize: bool,
) {
    if normalize && ch == '\r' {
        if chars.peek() == Some(&'\n') {
            chars.next();
        }
        out.push('\n');
    } else {
        out.push(ch);
    }
}

/// Consume up to two more octal digits after the first.
fn read_octal(first: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u32 {
    let mut value = first as u32 - '0' as u32;
    for _ in 0..2 {
        match chars.peek() {
            Some(&d @ '0'..='7') => {
                value = value * 8 + (d as u32 - '0' as u32);
                chars.next();
            }
            _ => break,
        }
    }
    value
}

/// Consume exactly `count` hex digits, or `None` consuming nothing, so
/// a truncated escape stays verbatim in the output.
fn read_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: u32) -> Option<u32> {
    let mut probe = chars.clone();
    let mut value = 0u32;
    for _ in 0..count {
        let digit = probe.next().and_then(|c| c.to_digit(16))?;
        // \U escapes can overflow u32; saturate and let the
        // char::from_u32 check reject it.
        value = value.saturating_mul(16).saturating_add(digit);
    }
    for _ in 0..count {
        chars.next();
    }
    Some(value)
}

/// Parse an integer literal body in the given base (2-36, or 0 to
/// auto-detect a `0x`/`0o`/`0b` prefix). Underscores are skipped;
/// values past `i64` promote to `BigInt`.
pub fn parse_int(text: &str, base: u32) -> Result<IntValue, LiteralError> {
    let text = text.trim();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (base, digits) = if base == 0 {
        match rest.as_bytes() {
            [b'0', b'x' | b'X', ..] => (16, &rest[2..]),
            [b'0', b'o' | b'O', ..] => (8, &rest[2..]),
            [b'0', b'b' | b'B', ..] => (2, &rest[2..]),
            _ => (10, rest),
        }
    } else if (2..=36).contains(&base) {
        // Tolerate an explicit matching prefix.
        match (base, rest.as_bytes()) {
            (16, [b'0', b'x' | b'X', ..])
            | (8, [b'0', b'o' | b'O', ..])
            | (2, [b'0', b'b' | b'B', ..]) => (base, &rest[2..]),
            _ => (base, rest),
        }
    } else {
        return Err(LiteralError::InvalidInteger);
    };

    let mut small: Option<i64> = Some(0);
    let mut big = BigInt::from(0);
    let mut seen_digit = false;

    for ch in digits.chars() {
        if ch == '_' {
            continue;
        }
        let digit = ch.to_digit(base).ok_or(LiteralError::InvalidInteger)?;
        seen_digit = true;
        if let Some(acc) = small {
            small = acc
                .checked_mul(i64::from(base))
                .and_then(|v| v.checked_add(i64::from(digit)));
            if small.is_none() {
                big = BigInt::from(acc);
            }
        }
        if small.is_none() {
            big = big * base + digit;
        }
    }

    if !seen_digit {
        return Err(LiteralError::InvalidInteger);
    }

    Ok(match small {
        Some(v) => IntValue::Small(if negative { -v } else { v }),
        None => IntValue::Big(if negative { -big } else { big }),
    })
}

/// Parse a float literal body. Accepts `nan`, `inf`/`infinity` with
/// optional sign; underscores are stripped; overflow goes to signed
/// infinity; negative zero is preserved.
pub fn parse_float(text: &str) -> Result<f64, LiteralError> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let body = lower.strip_prefix(['+', '-']).unwrap_or(&lower);
    match body {
        "nan" => return Ok(f64::NAN),
        "inf" | "infinity" => {
            return Ok(if lower.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            })
        }
        _ => {}
    }
    // Rust's parser already yields signed infinity on overflow.
    cleaned.parse::<f64>().map_err(|_| LiteralError::InvalidFloat)
}

/// Parse an imaginary literal body: a numeric part with a trailing
/// `j`/`J`. Returns the imaginary component (the real part is zero).
pub fn parse_imaginary(text: &str) -> Result<f64, LiteralError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_suffix(['j', 'J'])
        .ok_or(LiteralError::InvalidImaginary)?;
    if body.is_empty() {
        return Err(LiteralError::InvalidImaginary);
    }
    parse_float(body).map_err(|_| LiteralError::InvalidImaginary)
}

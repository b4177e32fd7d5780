//! Number literal scanning.
//!
//! Extends [`Tokenizer`]; `next_token` dispatches here for a leading
//! digit or a `.` followed by a digit. Version differences handled
//! here: `0o`/`0b` prefixes from 2.6, legacy `0777` octal in 2.x only,
//! the `l`/`L` long suffix in 2.x only, underscore separators from 3.6.
//!
//! A trailing `e` only opens an exponent when a digit (or signed digit)
//! actually follows, so `1else` lexes as `1` then the keyword.

use num_bigint::BigInt;
use pylon_diagnostic::{Diagnostic, ErrorCode, ErrorSink, Severity};
use pylon_ir::{PythonVersion, Span, Token, TokenKind};

use crate::literal::{self, IntValue};
use crate::tokenizer::Tokenizer;

impl Tokenizer<'_> {
    pub(crate) fn scan_number(&mut self, start: u32, sink: &mut dyn ErrorSink) -> Token {
        if self.cursor.current() == b'.' {
            return self.scan_fraction(start, true, sink);
        }

        if self.cursor.current() == b'0' {
            match self.cursor.peek() {
                b'x' | b'X' => return self.scan_radix(start, 16, sink),
                b'o' | b'O' if self.options.version >= PythonVersion::V26 => {
                    return self.scan_radix(start, 8, sink);
                }
                b'b' | b'B' if self.options.version >= PythonVersion::V26 => {
                    return self.scan_radix(start, 2, sink);
                }
                _ => {}
            }
        }

        let valid = self.eat_digit_run(10, false, sink);
        match self.cursor.current() {
            b'.' => self.scan_fraction(start, valid, sink),
            b'e' | b'E' if self.exponent_follows() => {
                let valid = valid & self.eat_exponent(sink);
                self.finish_float_or_imaginary(start, valid, sink)
            }
            b'j' | b'J' => {
                self.cursor.advance();
                self.imaginary_token(start, valid, sink)
            }
            b'l' | b'L' => self.long_suffix(start, valid, sink),
            _ => self.integer_token(start, valid, sink),
        }
    }

    /// Fractional part, cursor on the `.`.
    fn scan_fraction(&mut self, start: u32, valid: bool, sink: &mut dyn ErrorSink) -> Token {
        self.cursor.advance();
        let mut valid = valid & self.eat_digit_run(10, false, sink);
        if matches!(self.cursor.current(), b'e' | b'E') && self.exponent_follows() {
            valid &= self.eat_exponent(sink);
        }
        self.finish_float_or_imaginary(start, valid, sink)
    }

    fn finish_float_or_imaginary(
        &mut self,
        start: u32,
        valid: bool,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        if matches!(self.cursor.current(), b'j' | b'J') {
            self.cursor.advance();
            return self.imaginary_token(start, valid, sink);
        }
        if !valid {
            return self.number_error(start, "invalid decimal literal", sink);
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        match literal::parse_float(text) {
            Ok(value) => self.finish(TokenKind::Float(value.to_bits()), start),
            Err(_) => self.number_error(start, "invalid decimal literal", sink),
        }
    }

    fn imaginary_token(&mut self, start: u32, valid: bool, sink: &mut dyn ErrorSink) -> Token {
        if !valid {
            return self.number_error(start, "invalid imaginary literal", sink);
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        match literal::parse_imaginary(text) {
            Ok(value) => self.finish(TokenKind::Complex(value.to_bits()), start),
            Err(_) => self.number_error(start, "invalid imaginary literal", sink),
        }
    }

    fn integer_token(&mut self, start: u32, valid: bool, sink: &mut dyn ErrorSink) -> Token {
        if !valid {
            return self.number_error(start, "invalid decimal literal", sink);
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        let bytes = text.as_bytes();
        let leading_zero = bytes.len() > 1 && bytes[0] == b'0';

        if leading_zero
            && self.options.version.is_3x()
            && bytes.iter().any(|&b| b != b'0' && b != b'_')
        {
            // 3.x dropped implicit octal; only 0o is accepted.
            return self.number_error(start, "invalid token", sink);
        }

        let base = if leading_zero && self.options.version.is_2x() {
            8
        } else {
            10
        };
        match literal::parse_int(text, base) {
            Ok(IntValue::Small(v)) => self.finish(TokenKind::Int(v), start),
            Ok(IntValue::Big(v)) => self.finish(TokenKind::BigInt(Box::new(v)), start),
            Err(_) => self.number_error(start, "invalid decimal literal", sink),
        }
    }

    /// 2.x `123L` long literal; always a big integer token so the
    /// int/long distinction survives for the consumer.
    fn long_suffix(&mut self, start: u32, valid: bool, sink: &mut dyn ErrorSink) -> Token {
        let digits_end = self.cursor.pos();
        self.cursor.advance();
        if self.options.version.is_3x() {
            return self.number_error(start, "invalid token", sink);
        }
        if !valid {
            return self.number_error(start, "invalid decimal literal", sink);
        }
        let text = self.cursor.slice(start, digits_end);
        let bytes = text.as_bytes();
        let base = if bytes.len() > 1 && bytes[0] == b'0' { 8 } else { 10 };
        match literal::parse_int(text, base) {
            Ok(IntValue::Small(v)) => self.finish(TokenKind::BigInt(Box::new(BigInt::from(v))), start),
            Ok(IntValue::Big(v)) => self.finish(TokenKind::BigInt(Box::new(v)), start),
            Err(_) => self.number_error(start, "invalid decimal literal", sink),
        }
    }

    /// `0x`/`0o`/`0b` literal, cursor on the leading `0`.
    fn scan_radix(&mut self, start: u32, base: u32, sink: &mut dyn ErrorSink) -> Token {
        self.cursor.advance_n(2);
        let mut valid = self.eat_digit_run(base, true, sink);

        // Digits past the base (0b12, 0o9) are part of this token, not
        // the start of the next.
        if self.cursor.current().is_ascii_digit() {
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
            valid = false;
        }

        let digits_end = self.cursor.pos();
        let long = matches!(self.cursor.current(), b'l' | b'L');
        if long {
            self.cursor.advance();
            if self.options.version.is_3x() {
                return self.number_error(start, "invalid token", sink);
            }
        }
        if !valid {
            return self.number_error(start, "invalid number literal", sink);
        }

        let text = self.cursor.slice(start, digits_end);
        match literal::parse_int(text, base) {
            Ok(IntValue::Small(v)) if long => {
                self.finish(TokenKind::BigInt(Box::new(BigInt::from(v))), start)
            }
            Ok(IntValue::Small(v)) => self.finish(TokenKind::Int(v), start),
            Ok(IntValue::Big(v)) => self.finish(TokenKind::BigInt(Box::new(v)), start),
            Err(_) => self.number_error(start, "invalid number literal", sink),
        }
    }

    /// Consume digits of `base` plus underscore separators. Returns
    /// false when an underscore is doubled, trailing, or opens the run
    /// (`1._4`, `1e_5`); a run after a radix prefix may open with one
    /// (`0x_ff`). Underscores are consumed on every version so the
    /// literal stays one token; before 3.6 each run reports a
    /// version-gate diagnostic instead.
    fn eat_digit_run(
        &mut self,
        base: u32,
        after_radix_prefix: bool,
        sink: &mut dyn ErrorSink,
    ) -> bool {
        let underscores = self.options.version.supports_underscore_literals();
        let mut valid = true;
        let mut prev_underscore = false;
        let mut at_start = true;
        let mut gate_reported = false;
        loop {
            let b = self.cursor.current();
            if b.is_ascii_alphanumeric() && char::from(b).to_digit(base).is_some() {
                prev_underscore = false;
                at_start = false;
                self.cursor.advance();
            } else if b == b'_' {
                if !underscores && !gate_reported {
                    gate_reported = true;
                    let pos = self.cursor.pos();
                    sink.report(Diagnostic::new(
                        "underscores in numeric literals require Python 3.6 or greater",
                        Span::new(pos, pos + 1),
                        ErrorCode::SYNTAX_ERROR,
                        Severity::FatalError,
                    ));
                }
                if prev_underscore || (at_start && !after_radix_prefix) {
                    valid = false;
                }
                prev_underscore = true;
                at_start = false;
                self.cursor.advance();
            } else {
                break;
            }
        }
        if prev_underscore {
            valid = false;
        }
        valid
    }

    /// True when the `e`/`E` under the cursor really opens an exponent.
    fn exponent_follows(&self) -> bool {
        match self.cursor.peek() {
            b'0'..=b'9' => true,
            b'+' | b'-' => self.cursor.peek2().is_ascii_digit(),
            _ => false,
        }
    }

    fn eat_exponent(&mut self, sink: &mut dyn ErrorSink) -> bool {
        self.cursor.advance();
        if matches!(self.cursor.current(), b'+' | b'-') {
            self.cursor.advance();
        }
        self.eat_digit_run(10, false, sink)
    }

    fn number_error(&mut self, start: u32, message: &str, sink: &mut dyn ErrorSink) -> Token {
        sink.report(Diagnostic::new(
            message,
            Span::new(start, self.cursor.pos()),
            ErrorCode::SYNTAX_ERROR,
            Severity::FatalError,
        ));
        self.finish(self.error_kind(message), start)
    }
}

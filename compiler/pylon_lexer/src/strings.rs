//! String literal and identifier scanning.
//!
//! Lives in its own file but extends [`Tokenizer`]; `next_token`
//! dispatches here for quote characters and for identifier-start bytes
//! (which may turn out to be a string prefix like `rb'...'`).
//!
//! Unterminated strings are the one place the tokenizer keeps resume
//! state: an interactive host that sees an `IncompleteStr` token can
//! grow the buffer and resume from the string's first byte.

use pylon_diagnostic::{Diagnostic, ErrorCode, ErrorSink, Severity};
use pylon_ir::{Span, StringFlags, Token, TokenKind};

use crate::tokenizer::{
    is_name_continue_byte, is_name_continue_char, is_name_start_char, IncompleteString, Tokenizer,
};
use crate::{keywords, literal};

#[inline]
fn is_quote(b: u8) -> bool {
    b == b'\'' || b == b'"'
}

impl Tokenizer<'_> {
    /// Entry point for identifier-start bytes. `r`, `b`, `u`, `f` (and
    /// their two-letter combinations) immediately followed by a quote
    /// open a prefixed string; anything else is a name or keyword.
    pub(crate) fn scan_name_or_prefixed_string(
        &mut self,
        start: u32,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        if self.cursor.current().is_ascii() {
            if let Some(flags) = self.try_string_prefix() {
                return self.scan_string(start, flags, sink);
            }
        }
        self.scan_name(start, sink)
    }

    /// Consume a string prefix if the next 1-2 letters plus a quote
    /// form one under the configured version. Leaves the cursor on the
    /// quote.
    fn try_string_prefix(&mut self) -> Option<StringFlags> {
        let v = self.options.version;
        let c0 = self.cursor.current().to_ascii_lowercase();
        let c1 = self.cursor.peek();
        let c2 = self.cursor.peek2();

        if is_quote(c1) {
            let extra = match c0 {
                b'r' => StringFlags::RAW,
                b'b' if v.supports_bytes_prefix() => StringFlags::BYTES,
                b'u' if v.supports_unicode_prefix() => StringFlags::UNICODE,
                b'f' if v.supports_fstrings() => StringFlags::FORMATTED | StringFlags::UNICODE,
                _ => return None,
            };
            self.cursor.advance();
            return Some(self.combine_prefix(extra));
        }

        if is_quote(c2) {
            let extra = match (c0, c1.to_ascii_lowercase()) {
                (b'r', b'b') | (b'b', b'r') if v.supports_bytes_prefix() => {
                    StringFlags::RAW | StringFlags::BYTES
                }
                (b'r', b'f') | (b'f', b'r') if v.supports_fstrings() => {
                    StringFlags::RAW | StringFlags::FORMATTED | StringFlags::UNICODE
                }
                // `ur''` existed in 2.x only; 3.3 brought back `u''`
                // without the raw combination.
                (b'u', b'r') if v.is_2x() && v.supports_unicode_prefix() => {
                    StringFlags::RAW | StringFlags::UNICODE
                }
                _ => return None,
            };
            self.cursor.advance_n(2);
            return Some(self.combine_prefix(extra));
        }

        None
    }

    fn combine_prefix(&self, extra: StringFlags) -> StringFlags {
        let mut flags = self.default_string_flags() | extra;
        if flags.contains(StringFlags::BYTES) {
            flags.remove(StringFlags::UNICODE);
        }
        flags
    }

    /// Scan a string starting at the opening quote. `flags` carries the
    /// prefix; quote style and triple-ness are added here.
    pub(crate) fn scan_string(
        &mut self,
        start: u32,
        mut flags: StringFlags,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        let quote = self.cursor.current();
        if quote == b'\'' {
            flags |= StringFlags::SINGLE_QUOTE;
        }
        self.cursor.advance();

        if self.cursor.current() == quote && self.cursor.peek() == quote {
            self.cursor.advance_n(2);
            flags |= StringFlags::TRIPLE;
            return self.scan_triple_body(start, quote, flags, sink);
        }
        self.scan_single_body(start, quote, flags, sink)
    }

    fn scan_single_body(
        &mut self,
        start: u32,
        quote: u8,
        flags: StringFlags,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        let body_start = self.cursor.pos();
        loop {
            match self.cursor.skip_to_string_delim(quote) {
                q if q == quote => {
                    let body_end = self.cursor.pos();
                    self.cursor.advance();
                    return self.cook(start, body_start, body_end, flags, sink);
                }
                b'\\' => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        // Backslash-newline continues the string on the
                        // next physical line.
                        b'\r' => {
                            self.cursor.advance();
                            if self.cursor.current() == b'\n' {
                                self.cursor.advance();
                            }
                            self.record_newline(self.cursor.pos());
                        }
                        b'\n' => {
                            self.cursor.advance();
                            self.record_newline(self.cursor.pos());
                        }
                        0 if self.cursor.is_eof() => {
                            return self.incomplete(start, flags, sink);
                        }
                        _ => self.cursor.advance_char(),
                    }
                }
                b'\n' | b'\r' => {
                    let message = "NEWLINE in single-quoted string";
                    sink.report(Diagnostic::new(
                        message,
                        Span::new(start, self.cursor.pos()),
                        ErrorCode::SYNTAX_ERROR,
                        Severity::FatalError,
                    ));
                    // Leave the newline for the next token so the
                    // statement still terminates.
                    return self.finish(self.error_kind(message), start);
                }
                _ => return self.incomplete(start, flags, sink),
            }
        }
    }

    fn scan_triple_body(
        &mut self,
        start: u32,
        quote: u8,
        flags: StringFlags,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        let body_start = self.cursor.pos();
        loop {
            match self.cursor.skip_to_triple_delim(quote) {
                q if q == quote => {
                    if self.cursor.peek() == quote && self.cursor.peek2() == quote {
                        let body_end = self.cursor.pos();
                        self.cursor.advance_n(3);
                        return self.cook(start, body_start, body_end, flags, sink);
                    }
                    self.cursor.advance();
                }
                b'\\' => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        b'\r' => {
                            self.cursor.advance();
                            if self.cursor.current() == b'\n' {
                                self.cursor.advance();
                            }
                            self.record_newline(self.cursor.pos());
                        }
                        b'\n' => {
                            self.cursor.advance();
                            self.record_newline(self.cursor.pos());
                        }
                        0 if self.cursor.is_eof() => {
                            return self.incomplete(start, flags, sink);
                        }
                        _ => self.cursor.advance_char(),
                    }
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.record_newline(self.cursor.pos());
                }
                b'\n' => {
                    self.cursor.advance();
                    self.record_newline(self.cursor.pos());
                }
                _ => return self.incomplete(start, flags, sink),
            }
        }
    }

    /// End of input inside a string: record resume state and emit an
    /// `IncompleteStr` token.
    fn incomplete(&mut self, start: u32, flags: StringFlags, sink: &mut dyn ErrorSink) -> Token {
        let message = if flags.contains(StringFlags::TRIPLE) {
            "EOF while scanning triple-quoted string"
        } else {
            "EOF in single-quoted string"
        };
        sink.report(Diagnostic::new(
            message,
            Span::new(start, self.cursor.pos()),
            ErrorCode::SYNTAX_ERROR
                .with(ErrorCode::INCOMPLETE_TOKEN)
                .with(ErrorCode::NO_CARET),
            Severity::FatalError,
        ));
        self.state.incomplete_string = Some(IncompleteString { flags, start });
        self.finish(TokenKind::IncompleteStr(flags), start)
    }

    /// Decode the scanned body into a `Str` or `Bytes` token.
    fn cook(
        &mut self,
        start: u32,
        body_start: u32,
        body_end: u32,
        flags: StringFlags,
        sink: &mut dyn ErrorSink,
    ) -> Token {
        self.state.incomplete_string = None;
        let body = self.cursor.slice(body_start, body_end);
        let is_raw = flags.contains(StringFlags::RAW);

        // Only an explicit `b` prefix produces a `Bytes` token. A 2.x
        // unprefixed string is also a byte string semantically, but its
        // value stays as text; the missing UNICODE flag records the
        // distinction for the consumer.
        if flags.contains(StringFlags::BYTES) {
            match literal::parse_bytes(body, is_raw, true) {
                Ok(value) => return self.finish(TokenKind::Bytes { value, flags }, start),
                Err(err) => return self.literal_error(start, &err.to_string(), sink),
            }
        }

        // 2.x plain strings decode the classic escapes but keep \u
        // verbatim; unicode strings (and all 3.x strings) decode \u.
        // `ur''` is the odd one out: raw, yet \u still decodes.
        let allow_unicode_escapes = flags.contains(StringFlags::UNICODE);
        match literal::parse_string(body, is_raw, allow_unicode_escapes, true) {
            Ok(value) => {
                let value = self.intern(&value);
                self.finish(TokenKind::Str { value, flags }, start)
            }
            Err(err) => self.literal_error(start, &err.to_string(), sink),
        }
    }

    fn literal_error(&mut self, start: u32, message: &str, sink: &mut dyn ErrorSink) -> Token {
        sink.report(Diagnostic::new(
            message,
            Span::new(start, self.cursor.pos()),
            ErrorCode::SYNTAX_ERROR,
            Severity::FatalError,
        ));
        self.finish(self.error_kind(message), start)
    }

    // === Names ===========================================================

    fn scan_name(&mut self, start: u32, sink: &mut dyn ErrorSink) -> Token {
        let mut ascii_only = true;
        loop {
            let b = self.cursor.current();
            if is_name_continue_byte(b) {
                self.cursor.advance();
                continue;
            }
            if b >= 0x80 {
                let Some(c) = self.cursor.current_char() else {
                    break;
                };
                let valid = if self.cursor.pos() == start {
                    is_name_start_char(c)
                } else {
                    is_name_continue_char(c)
                };
                if !valid {
                    break;
                }
                ascii_only = false;
                self.cursor.advance_char();
                continue;
            }
            break;
        }

        if self.cursor.pos() == start {
            self.cursor.advance_char();
            let message = "invalid character in identifier";
            sink.report(Diagnostic::new(
                message,
                Span::new(start, self.cursor.pos()),
                ErrorCode::SYNTAX_ERROR,
                Severity::FatalError,
            ));
            return self.finish(self.error_kind(message), start);
        }

        let text = self.cursor.slice(start, self.cursor.pos());

        if !ascii_only && self.options.version.is_2x() {
            let message = "invalid character in identifier";
            sink.report(Diagnostic::new(
                message,
                Span::new(start, self.cursor.pos()),
                ErrorCode::SYNTAX_ERROR,
                Severity::FatalError,
            ));
            return self.finish(self.error_kind(message), start);
        }

        if ascii_only {
            if let Some(kind) = keywords::lookup(text, self.options.version, self.options.future) {
                if self.grouping_recovery_fires(&kind, start) {
                    return self.recover_grouping(start, sink);
                }
                return self.finish(kind, start);
            }
        }

        let name = self.intern(text);
        self.finish(TokenKind::Name(name), start)
    }
}

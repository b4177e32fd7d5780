//! The stateful tokenizer.
//!
//! Pull-driven: the parser calls [`Tokenizer::next_token`] and buffers
//! at most two tokens of lookahead. All tokenizer state is
//! value-semantic and snapshottable, which is what lets interactive
//! hosts re-feed a growing buffer and resume mid-construct.
//!
//! # Indentation
//!
//! A stack of indent levels (width plus the exact whitespace text for
//! the consistency check). Tabs advance the width to the next multiple
//! of 8, form feeds reset it to 0. Comparing a new line's indentation
//! against the stack produces `Indent`/`Dedent` tokens through the
//! pending-dedent counter (`-1` encodes a pending `Indent`).
//! Blank and comment-only lines never touch the stack.
//!
//! # Grouping recovery
//!
//! Inside an open `(`/`[`/`{`, newlines are swallowed. When the first
//! token after a swallowed newline is a statement-only keyword, the
//! grouping can't be real: depths are zeroed, the newline is replayed
//! as a `Newline` token, and the keyword is re-scanned on the next
//! call. The trigger set is a configurable policy table
//! ([`GroupingRecoveryKeywords`](crate::GroupingRecoveryKeywords)).

use std::mem;

use pylon_diagnostic::{Diagnostic, ErrorCode, ErrorSink, Severity};
use pylon_ir::{
    FutureOptions, Name, NewlineKind, NewlineTable, SharedInterner, Span, StringFlags, Token,
    TokenKind,
};
use pylon_lexer_core::{Cursor, SourceBuffer};
use smallvec::SmallVec;

use crate::TokenizerOptions;

/// The interpreter refuses deeper nesting; so do we.
pub(crate) const MAX_INDENT: usize = 80;

/// One level of the indentation stack.
#[derive(Clone, Debug, PartialEq, Eq)]
struct IndentLevel {
    width: u32,
    /// Exact whitespace, for the tab/space consistency check.
    text: String,
}

/// Resume record for a string literal cut off by end of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncompleteString {
    /// Quote char, triple-ness and prefix flags; everything needed to
    /// rescan once more input arrives.
    pub flags: StringFlags,
    /// Offset of the string token's first byte (prefix included).
    pub start: u32,
}

/// Record of a newline swallowed inside an open grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
struct GroupingRecovery {
    newline_kind: NewlineKind,
    /// Offset of the swallowed newline.
    newline_start: u32,
    /// Measured indentation of the following line.
    spaces: u32,
    indent_text: String,
    /// Offset of the first token after the newline; recovery fires only
    /// for that token.
    token_start: u32,
}

/// Snapshottable tokenizer state.
#[derive(Clone, Debug)]
pub struct TokenizerState {
    indents: SmallVec<[IndentLevel; 8]>,
    /// Negative one encodes a pending `Indent`; positive values count
    /// pending `Dedent`s.
    pending_dedents: i32,
    indent_span: Span,
    paren_depth: u32,
    bracket_depth: u32,
    brace_depth: u32,
    at_line_start: bool,
    last_newline: bool,
    eof_unwound: bool,
    pub(crate) incomplete_string: Option<IncompleteString>,
    grouping_recovery: Option<GroupingRecovery>,
    cur_whitespace: String,
    next_whitespace: String,
}

impl Default for TokenizerState {
    fn default() -> Self {
        let mut indents = SmallVec::new();
        indents.push(IndentLevel {
            width: 0,
            text: String::new(),
        });
        TokenizerState {
            indents,
            pending_dedents: 0,
            indent_span: Span::DUMMY,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
            at_line_start: true,
            last_newline: true,
            eof_unwound: false,
            incomplete_string: None,
            grouping_recovery: None,
            cur_whitespace: String::new(),
            next_whitespace: String::new(),
        }
    }
}

/// A saved tokenizer position, for interactive re-feeding.
#[derive(Clone, Debug)]
pub struct TokenizerSnapshot {
    pub(crate) state: TokenizerState,
    pub(crate) pos: u32,
}

/// Per-comment callback: `(span, text_without_hash)`.
pub type CommentCallback<'a> = Box<dyn FnMut(Span, &str) + 'a>;

/// The tokenizer. One instance per source buffer; single-threaded.
pub struct Tokenizer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) interner: SharedInterner,
    pub(crate) options: TokenizerOptions,
    pub(crate) state: TokenizerState,
    newlines: NewlineTable,
    comment_callback: Option<CommentCallback<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(buffer: &'a SourceBuffer, interner: SharedInterner, options: TokenizerOptions) -> Self {
        Tokenizer {
            cursor: buffer.cursor(),
            interner,
            options,
            state: TokenizerState::default(),
            newlines: NewlineTable::default(),
            comment_callback: None,
        }
    }

    /// Recreate a tokenizer over a grown buffer from a snapshot.
    ///
    /// The new buffer must start with the bytes the snapshot was taken
    /// over. If the snapshot recorded an incomplete string, scanning
    /// resumes from the string's start.
    pub fn resume(
        buffer: &'a SourceBuffer,
        interner: SharedInterner,
        options: TokenizerOptions,
        snapshot: TokenizerSnapshot,
    ) -> Self {
        let mut cursor = buffer.cursor();
        let target = snapshot
            .state
            .incomplete_string
            .map_or(snapshot.pos, |inc| inc.start)
            .min(buffer.len());
        cursor.advance_n(target);
        let mut state = snapshot.state;
        state.incomplete_string = None;
        state.eof_unwound = false;
        Tokenizer {
            cursor,
            interner,
            options,
            state,
            newlines: NewlineTable::default(),
            comment_callback: None,
        }
    }

    pub fn snapshot(&self) -> TokenizerSnapshot {
        TokenizerSnapshot {
            state: self.state.clone(),
            pos: self.cursor.pos(),
        }
    }

    pub fn set_comment_callback(&mut self, callback: CommentCallback<'a>) {
        self.comment_callback = Some(callback);
    }

    /// Combined open-grouping depth.
    pub fn grouping_depth(&self) -> u32 {
        self.state.paren_depth + self.state.bracket_depth + self.state.brace_depth
    }

    /// Exact whitespace preceding the most recent token (verbatim mode
    /// only; empty otherwise).
    pub fn preceding_whitespace(&self) -> &str {
        &self.state.cur_whitespace
    }

    /// Resume record if the last token was an incomplete string.
    pub fn incomplete_string(&self) -> Option<IncompleteString> {
        self.state.incomplete_string
    }

    /// Newline offsets seen so far.
    pub fn newline_table(&self) -> &NewlineTable {
        &self.newlines
    }

    pub fn into_newline_table(self) -> NewlineTable {
        self.newlines
    }

    /// The parser updates future flags when it processes
    /// `from __future__ import` (e.g. `print_function` stops `print`
    /// from lexing as a keyword).
    pub fn set_future_options(&mut self, future: FutureOptions) {
        self.options.future = future;
    }

    pub fn version(&self) -> pylon_ir::PythonVersion {
        self.options.version
    }

    /// Produce the next token. Never panics; malformed input comes back
    /// as `Error`/`IncompleteStr` tokens with diagnostics through the
    /// sink.
    pub fn next_token(&mut self, sink: &mut dyn ErrorSink) -> Token {
        loop {
            if self.state.pending_dedents != 0 {
                return self.emit_pending_indentation();
            }

            if self.state.at_line_start {
                self.measure_line_indentation(sink);
                continue;
            }

            let ws_start = self.cursor.pos();
            self.cursor.eat_whitespace();
            if self.options.verbatim && self.cursor.pos() > ws_start {
                let ws = self.cursor.slice(ws_start, self.cursor.pos()).to_owned();
                self.state.next_whitespace.push_str(&ws);
            }

            let start = self.cursor.pos();
            let b = self.cursor.current();

            match b {
                0 if self.cursor.is_eof() => {
                    if let Some(token) = self.handle_eof() {
                        return token;
                    }
                    continue;
                }
                0 => {
                    self.cursor.advance();
                    sink.report(Diagnostic::new(
                        "source code cannot contain null bytes",
                        Span::new(start, start + 1),
                        ErrorCode::SYNTAX_ERROR,
                        Severity::FatalError,
                    ));
                    return self.finish(self.error_kind("source code cannot contain null bytes"), start);
                }
                b'\n' | b'\r' => {
                    if let Some(token) = self.handle_newline(start) {
                        return token;
                    }
                    continue;
                }
                b'\\' => {
                    if let Some(token) = self.handle_line_continuation(start, sink) {
                        return token;
                    }
                    continue;
                }
                b'#' => {
                    if let Some(token) = self.handle_comment(start) {
                        return token;
                    }
                    continue;
                }
                b'0'..=b'9' => return self.scan_number(start, sink),
                b'.' => {
                    if self.cursor.peek().is_ascii_digit() {
                        return self.scan_number(start, sink);
                    }
                    if self.cursor.peek() == b'.' && self.cursor.peek2() == b'.' {
                        self.cursor.advance_n(3);
                        return self.finish(TokenKind::Ellipsis, start);
                    }
                    self.cursor.advance();
                    return self.finish(TokenKind::Dot, start);
                }
                b'\'' | b'"' => {
                    let flags = self.default_string_flags();
                    return self.scan_string(start, flags, sink);
                }
                _ => {
                    if is_name_start_byte(b) {
                        return self.scan_name_or_prefixed_string(start, sink);
                    }
                    if b >= 0x80 {
                        return self.scan_name_or_prefixed_string(start, sink);
                    }
                    return self.scan_operator(start, sink);
                }
            }
        }
    }

    // === Token assembly ==================================================

    pub(crate) fn finish(&mut self, kind: TokenKind, start: u32) -> Token {
        if self.options.verbatim {
            self.state.cur_whitespace = mem::take(&mut self.state.next_whitespace);
        }
        // Comments do not make a line logical; a comment-only line must
        // still read as blank to the newline that follows it.
        if !matches!(
            kind,
            TokenKind::Newline(_) | TokenKind::Nl(_) | TokenKind::Comment(_)
        ) {
            self.state.last_newline = false;
        }
        Token::new(kind, Span::new(start, self.cursor.pos()))
    }

    pub(crate) fn error_kind(&self, message: &str) -> TokenKind {
        TokenKind::Error(self.interner.intern(message))
    }

    pub(crate) fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn emit_pending_indentation(&mut self) -> Token {
        // Indentation tokens own no text; the previous token already
        // reported whatever sits in the whitespace buffer.
        self.state.cur_whitespace.clear();
        let span = if self.state.indent_span == Span::DUMMY {
            Span::point(self.cursor.pos())
        } else {
            self.state.indent_span
        };
        self.state.indent_span = Span::DUMMY;
        if self.state.pending_dedents < 0 {
            self.state.pending_dedents = 0;
            self.state.last_newline = false;
            Token::new(TokenKind::Indent, span)
        } else {
            self.state.pending_dedents -= 1;
            self.state.last_newline = false;
            Token::new(TokenKind::Dedent, Span::point(span.start))
        }
    }

    // === Indentation =====================================================

    /// Measure the indentation at a line start and compare it against
    /// the stack. Blank lines, comment-only lines and EOF leave the
    /// stack untouched.
    fn measure_line_indentation(&mut self, sink: &mut dyn ErrorSink) {
        let ws_start = self.cursor.pos();
        let spaces = self.eat_indentation();
        let text = self.cursor.slice_from(ws_start).to_owned();

        self.state.at_line_start = false;
        if self.options.verbatim && !text.is_empty() {
            self.state.next_whitespace.push_str(&text);
        }

        match self.cursor.current() {
            // Blank or comment-only line: no indent comparison.
            b'#' | b'\n' | b'\r' => {}
            0 if self.cursor.is_eof() => {}
            _ if self.grouping_depth() > 0 => {}
            _ => {
                self.set_indent(spaces, &text, Span::new(ws_start, self.cursor.pos()), sink);
            }
        }
    }

    /// Consume spaces/tabs/form feeds, returning the effective width.
    fn eat_indentation(&mut self) -> u32 {
        let mut spaces = 0u32;
        loop {
            match self.cursor.current() {
                b' ' => spaces += 1,
                b'\t' => spaces = (spaces / 8 + 1) * 8,
                0x0C => spaces = 0,
                _ => return spaces,
            }
            self.cursor.advance();
        }
    }

    pub(crate) fn set_indent(
        &mut self,
        spaces: u32,
        text: &str,
        span: Span,
        sink: &mut dyn ErrorSink,
    ) {
        let top_width = self.top_indent_width();
        if spaces == top_width {
            self.check_indent_consistency(text, span, sink);
        } else if spaces > top_width {
            if self.state.indents.len() >= MAX_INDENT {
                sink.report(Diagnostic::new(
                    "too many levels of indentation",
                    span,
                    ErrorCode::INDENTATION_ERROR,
                    Severity::FatalError,
                ));
                return;
            }
            self.state.indents.push(IndentLevel {
                width: spaces,
                text: text.to_owned(),
            });
            self.state.pending_dedents = -1;
            self.state.indent_span = span;
        } else {
            while self.top_indent_width() > spaces && self.state.indents.len() > 1 {
                self.state.indents.pop();
                self.state.pending_dedents += 1;
            }
            self.state.indent_span = span;
            if self.top_indent_width() != spaces {
                sink.report(Diagnostic::new(
                    "unindent does not match any outer indentation level",
                    span,
                    ErrorCode::INDENTATION_ERROR,
                    Severity::FatalError,
                ));
            } else {
                self.check_indent_consistency(text, span, sink);
            }
        }
    }

    fn top_indent_width(&self) -> u32 {
        self.state.indents.last().map_or(0, |level| level.width)
    }

    /// Compare the common prefix of the new indent text against the
    /// recorded one, character by character. A tab-vs-space mismatch is
    /// the classic "looks aligned in one editor, not in another" bug.
    fn check_indent_consistency(&mut self, text: &str, span: Span, sink: &mut dyn ErrorSink) {
        let severity = self.options.indentation_inconsistency;
        if severity == Severity::Ignore {
            return;
        }
        let Some(level) = self.state.indents.last() else {
            return;
        };
        let mismatch = level
            .text
            .bytes()
            .zip(text.bytes())
            .any(|(recorded, new)| recorded != new);
        if mismatch {
            sink.report(Diagnostic::new(
                "inconsistent whitespace",
                span,
                ErrorCode::TAB_ERROR,
                severity,
            ));
        }
    }

    // === Newlines ========================================================

    pub(crate) fn record_newline(&mut self, offset_after: u32) {
        // Interactive re-scans can revisit newlines already recorded.
        let already_seen = self
            .newlines
            .offsets()
            .last()
            .map_or(false, |&last| offset_after <= last);
        if !already_seen {
            self.newlines.push(offset_after);
        }
    }

    fn read_newline_kind(&mut self) -> NewlineKind {
        match self.cursor.current() {
            b'\r' if self.cursor.peek() == b'\n' => {
                self.cursor.advance_n(2);
                NewlineKind::CarriageReturnLineFeed
            }
            b'\r' => {
                self.cursor.advance();
                NewlineKind::CarriageReturn
            }
            _ => {
                self.cursor.advance();
                NewlineKind::LineFeed
            }
        }
    }

    /// Handle a newline outside a string. Returns `None` when the
    /// newline is swallowed (inside grouping, or a blank line in
    /// non-verbatim batch mode).
    fn handle_newline(&mut self, start: u32) -> Option<Token> {
        let kind = self.read_newline_kind();
        self.record_newline(self.cursor.pos());

        if self.grouping_depth() > 0 {
            // Swallowed. Measure the next line's indentation so the
            // recovery record can replay it if a statement keyword
            // follows.
            let ws_start = self.cursor.pos();
            let spaces = self.eat_indentation();
            let indent_text = self.cursor.slice_from(ws_start).to_owned();
            if self.options.verbatim {
                self.state.next_whitespace.push_str(kind.as_str());
                self.state.next_whitespace.push_str(&indent_text);
            }
            if !self.options.grouping_recovery.is_empty() {
                self.state.grouping_recovery = Some(GroupingRecovery {
                    newline_kind: kind,
                    newline_start: start,
                    spaces,
                    indent_text,
                    token_start: self.cursor.pos(),
                });
            }
            if self.options.verbatim {
                return Some(self.finish(TokenKind::Nl(kind), start));
            }
            return None;
        }

        self.state.at_line_start = true;

        if self.state.last_newline {
            // Blank line: non-logical.
            if self.options.interactive {
                return Some(self.finish(TokenKind::Newline(kind), start));
            }
            if self.options.verbatim {
                return Some(self.finish(TokenKind::Nl(kind), start));
            }
            return None;
        }

        self.state.last_newline = true;
        Some(self.finish(TokenKind::Newline(kind), start))
    }

    /// Fired when a trigger keyword is the first token after a newline
    /// swallowed by an unclosed grouping: zero the depths, restore the
    /// indentation, replay the newline. The keyword is re-scanned on
    /// the next call.
    pub(crate) fn recover_grouping(&mut self, start: u32, sink: &mut dyn ErrorSink) -> Token {
        let Some(recovery) = self.state.grouping_recovery.take() else {
            // Caller checked; placate control flow without panicking.
            return self.finish(TokenKind::Newline(NewlineKind::None), start);
        };
        self.state.paren_depth = 0;
        self.state.bracket_depth = 0;
        self.state.brace_depth = 0;

        let span = Span::new(
            recovery.newline_start + recovery.newline_kind.len(),
            recovery.token_start,
        );
        self.set_indent(recovery.spaces, &recovery.indent_text, span, sink);

        // Rewind so the trigger keyword is scanned again.
        self.cursor.rewind_to(recovery.token_start);
        self.state.last_newline = true;

        Token::new(
            TokenKind::Newline(recovery.newline_kind),
            Span::new(
                recovery.newline_start,
                recovery.newline_start + recovery.newline_kind.len(),
            ),
        )
    }

    pub(crate) fn grouping_recovery_fires(&self, kind: &TokenKind, token_start: u32) -> bool {
        self.grouping_depth() > 0
            && self.options.grouping_recovery.triggers(kind)
            && self
                .state
                .grouping_recovery
                .as_ref()
                .is_some_and(|r| r.token_start == token_start)
    }

    // === Line continuation ==============================================

    fn handle_line_continuation(&mut self, start: u32, sink: &mut dyn ErrorSink) -> Option<Token> {
        match self.cursor.peek() {
            b'\n' | b'\r' => {
                self.cursor.advance();
                let kind = self.read_newline_kind();
                self.record_newline(self.cursor.pos());
                if self.options.verbatim {
                    self.state.next_whitespace.push('\\');
                    self.state.next_whitespace.push_str(kind.as_str());
                }
                None
            }
            0 if self.cursor.pos() + 1 >= self.cursor.source_len() => {
                self.cursor.advance();
                sink.report(Diagnostic::new(
                    "unexpected end of file after line continuation character",
                    Span::new(start, self.cursor.pos()),
                    ErrorCode::SYNTAX_ERROR
                        .with(ErrorCode::INCOMPLETE_TOKEN)
                        .with(ErrorCode::NO_CARET),
                    Severity::FatalError,
                ));
                Some(self.finish(
                    self.error_kind("unexpected end of file after line continuation character"),
                    start,
                ))
            }
            _ => {
                self.cursor.advance();
                sink.report(Diagnostic::new(
                    "unexpected character after line continuation character",
                    Span::new(start, self.cursor.pos() + 1),
                    ErrorCode::SYNTAX_ERROR,
                    Severity::FatalError,
                ));
                Some(self.finish(
                    self.error_kind("unexpected character after line continuation character"),
                    start,
                ))
            }
        }
    }

    // === Comments ========================================================

    fn handle_comment(&mut self, start: u32) -> Option<Token> {
        self.cursor.advance();
        self.cursor.eat_until_newline_or_eof();
        let text = self.cursor.slice(start + 1, self.cursor.pos()).to_owned();
        let span = Span::new(start, self.cursor.pos());
        if let Some(callback) = self.comment_callback.as_mut() {
            callback(span, &text);
        }
        if self.options.verbatim {
            let name = self.interner.intern(&text);
            return Some(self.finish(TokenKind::Comment(name), start));
        }
        None
    }

    // === EOF =============================================================

    /// EOF protocol: one implied `Newline` if the last line had
    /// content, then outstanding `Dedent`s, then `EndOfFile` forever.
    fn handle_eof(&mut self) -> Option<Token> {
        if !self.state.eof_unwound {
            let implied = !self.state.last_newline;
            self.state.last_newline = true;
            self.state.eof_unwound = true;
            self.unwind_indents();
            if implied {
                return Some(self.finish(TokenKind::Newline(NewlineKind::None), self.cursor.pos()));
            }
            if self.state.pending_dedents > 0 {
                return None;
            }
        }
        Some(self.finish(TokenKind::EndOfFile, self.cursor.pos()))
    }

    fn unwind_indents(&mut self) {
        while self.state.indents.len() > 1 {
            self.state.indents.pop();
            self.state.pending_dedents += 1;
        }
    }

    // === Operators =======================================================

    fn scan_operator(&mut self, start: u32, sink: &mut dyn ErrorSink) -> Token {
        let b = self.cursor.current();
        let p = self.cursor.peek();
        let p2 = self.cursor.peek2();

        // Longest-match first.
        let (kind, len) = match (b, p, p2) {
            (b'*', b'*', b'=') => (TokenKind::PowAssign, 3),
            (b'/', b'/', b'=') => (TokenKind::SlashSlashAssign, 3),
            (b'<', b'<', b'=') => (TokenKind::LeftShiftAssign, 3),
            (b'>', b'>', b'=') => (TokenKind::RightShiftAssign, 3),

            (b'*', b'*', _) => (TokenKind::StarStar, 2),
            (b'/', b'/', _) => (TokenKind::SlashSlash, 2),
            (b'<', b'<', _) => (TokenKind::LeftShift, 2),
            (b'>', b'>', _) => (TokenKind::RightShift, 2),
            (b'+', b'=', _) => (TokenKind::PlusAssign, 2),
            (b'-', b'=', _) => (TokenKind::MinusAssign, 2),
            (b'-', b'>', _) => (TokenKind::Arrow, 2),
            (b'*', b'=', _) => (TokenKind::StarAssign, 2),
            (b'/', b'=', _) => (TokenKind::SlashAssign, 2),
            (b'%', b'=', _) => (TokenKind::PercentAssign, 2),
            (b'&', b'=', _) => (TokenKind::AndAssign, 2),
            (b'|', b'=', _) => (TokenKind::OrAssign, 2),
            (b'^', b'=', _) => (TokenKind::XorAssign, 2),
            (b'<', b'=', _) => (TokenKind::LessEq, 2),
            (b'>', b'=', _) => (TokenKind::GreaterEq, 2),
            (b'=', b'=', _) => (TokenKind::EqEq, 2),
            (b'!', b'=', _) => (TokenKind::NotEq, 2),
            (b'<', b'>', _) => (TokenKind::LessGreater, 2),
            (b'@', b'=', _) if self.options.version.supports_matmul() => {
                (TokenKind::MatMulAssign, 2)
            }

            (b'+', ..) => (TokenKind::Plus, 1),
            (b'-', ..) => (TokenKind::Minus, 1),
            (b'*', ..) => (TokenKind::Star, 1),
            (b'/', ..) => (TokenKind::Slash, 1),
            (b'%', ..) => (TokenKind::Percent, 1),
            (b'@', ..) => (TokenKind::At, 1),
            (b'&', ..) => (TokenKind::Ampersand, 1),
            (b'|', ..) => (TokenKind::Pipe, 1),
            (b'^', ..) => (TokenKind::Caret, 1),
            (b'~', ..) => (TokenKind::Tilde, 1),
            (b'<', ..) => (TokenKind::Less, 1),
            (b'>', ..) => (TokenKind::Greater, 1),
            (b'=', ..) => (TokenKind::Assign, 1),
            (b',', ..) => (TokenKind::Comma, 1),
            (b':', ..) => (TokenKind::Colon, 1),
            (b';', ..) => (TokenKind::Semicolon, 1),
            (b'`', ..) => (TokenKind::Backquote, 1),

            (b'(', ..) => {
                self.state.paren_depth += 1;
                (TokenKind::LParen, 1)
            }
            (b')', ..) => {
                self.state.paren_depth = self.state.paren_depth.saturating_sub(1);
                (TokenKind::RParen, 1)
            }
            (b'[', ..) => {
                self.state.bracket_depth += 1;
                (TokenKind::LBracket, 1)
            }
            (b']', ..) => {
                self.state.bracket_depth = self.state.bracket_depth.saturating_sub(1);
                (TokenKind::RBracket, 1)
            }
            (b'{', ..) => {
                self.state.brace_depth += 1;
                (TokenKind::LBrace, 1)
            }
            (b'}', ..) => {
                self.state.brace_depth = self.state.brace_depth.saturating_sub(1);
                (TokenKind::RBrace, 1)
            }

            _ => {
                self.cursor.advance_char();
                let message = "invalid character in source";
                sink.report(Diagnostic::new(
                    message,
                    Span::new(start, self.cursor.pos()),
                    ErrorCode::SYNTAX_ERROR,
                    Severity::FatalError,
                ));
                return self.finish(self.error_kind(message), start);
            }
        };

        self.cursor.advance_n(len);
        self.finish(kind, start)
    }

    pub(crate) fn default_string_flags(&self) -> StringFlags {
        let mut flags = StringFlags::empty();
        if self.options.version.is_3x()
            || self.options.future.contains(FutureOptions::UNICODE_LITERALS)
        {
            flags |= StringFlags::UNICODE;
        }
        flags
    }
}

/// ASCII identifier start: letter or underscore.
#[inline]
pub(crate) fn is_name_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// ASCII identifier continuation.
#[inline]
pub(crate) fn is_name_continue_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Non-ASCII identifier start, per the Unicode identifier categories
/// plus the small Other_ID_Start allow-list.
pub(crate) fn is_name_start_char(c: char) -> bool {
    c == '_'
        || c.is_alphabetic()
        || matches!(c, '\u{1885}' | '\u{1886}' | '\u{2118}' | '\u{212E}' | '\u{309B}' | '\u{309C}')
}

/// Non-ASCII identifier continuation, plus the Other_ID_Continue
/// allow-list.
pub(crate) fn is_name_continue_char(c: char) -> bool {
    is_name_start_char(c)
        || c.is_numeric()
        || matches!(c, '\u{00B7}' | '\u{0387}' | '\u{1369}'..='\u{1371}' | '\u{19DA}')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use pylon_diagnostic::CollectingSink;
    use pylon_ir::{PythonVersion as V, TokenTag};

    use super::*;
    use crate::tokenize;

    fn lex(source: &str, version: V) -> (Vec<Token>, CollectingSink) {
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let options = TokenizerOptions::new(version);
        let tokens = tokenize(source, &interner, &options, &mut sink);
        (tokens, sink)
    }

    fn tags(source: &str, version: V) -> Vec<TokenTag> {
        lex(source, version).0.iter().map(|t| t.kind.tag()).collect()
    }

    #[test]
    fn simple_assignment() {
        let (tokens, sink) = lex("x = 1\n", V::V37);
        assert_eq!(
            tokens.iter().map(|t| t.kind.tag()).collect::<Vec<_>>(),
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::Int,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
        assert!(matches!(tokens[2].kind, TokenKind::Int(1)));
        assert_eq!(tokens[2].span, Span::new(4, 5));
        assert!(!sink.has_errors());
    }

    #[test]
    fn indent_dedent_pairs() {
        assert_eq!(
            tags("if x:\n    y\nz\n", V::V37),
            vec![
                TokenTag::If,
                TokenTag::Name,
                TokenTag::Colon,
                TokenTag::Newline,
                TokenTag::Indent,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::Dedent,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn implied_newline_then_dedents_at_eof() {
        assert_eq!(
            tags("if x:\n    y", V::V37),
            vec![
                TokenTag::If,
                TokenTag::Name,
                TokenTag::Colon,
                TokenTag::Newline,
                TokenTag::Indent,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::Dedent,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn blank_and_comment_lines_skip_indent_tracking() {
        let (tokens, sink) = lex("if x:\n\n    # note\n    y\n", V::V37);
        let tags: Vec<_> = tokens.iter().map(|t| t.kind.tag()).collect();
        assert_eq!(
            tags,
            vec![
                TokenTag::If,
                TokenTag::Name,
                TokenTag::Colon,
                TokenTag::Newline,
                TokenTag::Indent,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::Dedent,
                TokenTag::EndOfFile,
            ]
        );
        assert!(!sink.has_errors());
    }

    #[test]
    fn verbatim_whitespace_reassembles_the_source() {
        let source = "# intro\r\n\r\nif x:\r\n    y = 1  \r\nz = 2  # note\r\n";
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let mut options = TokenizerOptions::new(V::V37);
        options.verbatim = true;
        let buffer = SourceBuffer::new(source);
        let mut tokenizer = Tokenizer::new(&buffer, interner, options);
        let mut rebuilt = String::new();
        loop {
            let token = tokenizer.next_token(&mut sink);
            rebuilt.push_str(tokenizer.preceding_whitespace());
            // An indent's text reaches the next token as preceding
            // whitespace; its span would count the bytes twice.
            if !matches!(token.kind, TokenKind::Indent) {
                rebuilt.push_str(&source[token.span.to_range()]);
            }
            if matches!(token.kind, TokenKind::EndOfFile) {
                break;
            }
        }
        assert_eq!(rebuilt, source);
        assert!(!sink.has_errors());
    }

    #[test]
    fn tab_advances_to_next_multiple_of_eight() {
        // Tab then eight spaces land on the same level; the consistency
        // check still flags the texture difference.
        let (_, sink) = lex("if x:\n\ty\n        z\n", V::V37);
        assert!(!sink.has_errors());
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.diagnostics()[0].message.contains("inconsistent whitespace"));
    }

    #[test]
    fn unindent_mismatch_is_reported() {
        let (_, sink) = lex("if x:\n        y\n  z\n", V::V37);
        assert!(sink.has_errors());
        let diag = sink.first_error().unwrap();
        assert_eq!(
            diag.message,
            "unindent does not match any outer indentation level"
        );
        assert_eq!(diag.code.kind_name(), "IndentationError");
    }

    #[test]
    fn groupings_swallow_newlines() {
        assert_eq!(
            tags("(1,\n 2)\n", V::V37),
            vec![
                TokenTag::LParen,
                TokenTag::Int,
                TokenTag::Comma,
                TokenTag::Int,
                TokenTag::RParen,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn grouping_recovery_replays_newline_before_statement_keyword() {
        assert_eq!(
            tags("x = (1,\nreturn y\n", V::V37),
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::LParen,
                TokenTag::Int,
                TokenTag::Comma,
                TokenTag::Newline,
                TokenTag::Return,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn expression_keywords_do_not_trigger_recovery() {
        // `if` is expression-legal (ternary), so the newline stays
        // swallowed and the grouping stays open.
        assert_eq!(
            tags("x = (1\nif y else 2)\n", V::V37),
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::LParen,
                TokenTag::Int,
                TokenTag::If,
                TokenTag::Name,
                TokenTag::Else,
                TokenTag::Int,
                TokenTag::RParen,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn line_continuation_joins_lines() {
        assert_eq!(
            tags("x = 1 + \\\n 2\n", V::V37),
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::Int,
                TokenTag::Plus,
                TokenTag::Int,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn stray_char_after_continuation() {
        let (tokens, sink) = lex("x = \\y\n", V::V37);
        assert!(sink.has_errors());
        assert_eq!(
            sink.first_error().unwrap().message,
            "unexpected character after line continuation character"
        );
        assert!(tokens.iter().any(|t| t.kind.tag() == TokenTag::Error));
    }

    #[test]
    fn interactive_blank_line_emits_newline() {
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let options = TokenizerOptions::new(V::V37).interactive(true);
        let tokens = tokenize("\n", &interner, &options, &mut sink);
        assert_eq!(
            tokens.iter().map(|t| t.kind.tag()).collect::<Vec<_>>(),
            vec![TokenTag::Newline, TokenTag::EndOfFile]
        );
    }

    #[test]
    fn verbatim_mode_keeps_comments_and_blank_lines() {
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let options = TokenizerOptions::new(V::V37).verbatim(true);
        let tokens = tokenize("x = 1  # note\n\ny\n", &interner, &options, &mut sink);
        let tags: Vec<_> = tokens.iter().map(|t| t.kind.tag()).collect();
        assert_eq!(
            tags,
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::Int,
                TokenTag::Comment,
                TokenTag::Newline,
                TokenTag::Nl,
                TokenTag::Name,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
    }

    #[test]
    fn comment_callback_sees_text() {
        let buffer = SourceBuffer::new("x  # type: ignore\n");
        let interner = SharedInterner::new();
        let mut collected = Vec::new();
        let mut tokenizer =
            Tokenizer::new(&buffer, interner, TokenizerOptions::new(V::V37));
        tokenizer.set_comment_callback(Box::new(|span, text| {
            collected.push((span, text.to_owned()));
        }));
        let mut sink = CollectingSink::new();
        loop {
            if matches!(tokenizer.next_token(&mut sink).kind, TokenKind::EndOfFile) {
                break;
            }
        }
        drop(tokenizer);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].1, " type: ignore");
        assert_eq!(collected[0].0, Span::new(3, 17));
    }

    #[test]
    fn newline_in_single_quoted_string() {
        let (tokens, sink) = lex("s = 'abc\ndef'\n", V::V37);
        assert!(sink.has_errors());
        assert_eq!(
            sink.first_error().unwrap().message,
            "NEWLINE in single-quoted string"
        );
        assert!(tokens.iter().any(|t| t.kind.tag() == TokenTag::Error));
    }

    #[test]
    fn incomplete_triple_quoted_string_resumes() {
        let interner = SharedInterner::new();
        let options = TokenizerOptions::new(V::V37);
        let first = SourceBuffer::new("s = '''ab");
        let mut tokenizer = Tokenizer::new(&first, interner.clone(), options.clone());
        let mut sink = CollectingSink::new();
        let mut last = tokenizer.next_token(&mut sink);
        while !matches!(last.kind, TokenKind::IncompleteStr(_)) {
            last = tokenizer.next_token(&mut sink);
        }
        assert!(tokenizer.incomplete_string().is_some());
        let diag = sink.first_error().unwrap();
        assert!(diag.code.is_incomplete_token());
        let snapshot = tokenizer.snapshot();

        let grown = SourceBuffer::new("s = '''ab'''\n");
        let mut resumed = Tokenizer::resume(&grown, interner.clone(), options, snapshot);
        let mut sink2 = CollectingSink::new();
        let token = resumed.next_token(&mut sink2);
        match token.kind {
            TokenKind::Str { value, flags } => {
                assert_eq!(interner.lookup(value), "ab");
                assert!(flags.contains(StringFlags::TRIPLE));
            }
            other => panic!("expected string, got {other:?}"),
        }
        assert!(!sink2.has_errors());
    }

    #[test]
    fn string_values_are_cooked() {
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let options = TokenizerOptions::new(V::V37);
        let tokens = tokenize("a = 'x\\ny'\nb = r'x\\ty'\n", &interner, &options, &mut sink);
        let strings: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Str { value, .. } => Some(interner.lookup(value)),
                _ => None,
            })
            .collect();
        assert_eq!(strings, vec!["x\ny", "x\\ty"]);
        assert!(!sink.has_errors());
    }

    #[test]
    fn bytes_literal() {
        let (tokens, sink) = lex("b'hi\\x00'\n", V::V37);
        match &tokens[0].kind {
            TokenKind::Bytes { value, flags } => {
                assert_eq!(value.as_slice(), b"hi\x00");
                assert!(flags.contains(StringFlags::BYTES));
                assert!(!flags.contains(StringFlags::UNICODE));
            }
            other => panic!("expected bytes, got {other:?}"),
        }
        assert!(!sink.has_errors());
    }

    #[test]
    fn fstring_prefix_gated_to_36() {
        let (tokens, _) = lex("f'{x}'\n", V::V37);
        assert!(matches!(
            tokens[0].kind,
            TokenKind::Str { flags, .. } if flags.contains(StringFlags::FORMATTED)
        ));
        // Before 3.6, `f` is just a name.
        let (tokens, _) = lex("f'{x}'\n", V::V35);
        assert_eq!(tokens[0].kind.tag(), TokenTag::Name);
        assert_eq!(tokens[1].kind.tag(), TokenTag::Str);
    }

    #[test]
    fn number_forms() {
        let (tokens, sink) = lex("0xff\n0b101\n0o17\n10_000\n1e3\n2j\n", V::V37);
        let values: Vec<&TokenKind> = tokens
            .iter()
            .map(|t| &t.kind)
            .filter(|k| !matches!(k, TokenKind::Newline(_) | TokenKind::EndOfFile))
            .collect();
        assert!(matches!(values[0], TokenKind::Int(255)));
        assert!(matches!(values[1], TokenKind::Int(5)));
        assert!(matches!(values[2], TokenKind::Int(15)));
        assert!(matches!(values[3], TokenKind::Int(10_000)));
        assert_eq!(values[4], &TokenKind::Float(1000.0f64.to_bits()));
        assert_eq!(values[5], &TokenKind::Complex(2.0f64.to_bits()));
        assert!(!sink.has_errors());
    }

    #[test]
    fn huge_integer_promotes_to_bigint() {
        let (tokens, sink) = lex("123456789012345678901234567890\n", V::V37);
        assert_eq!(tokens[0].kind.tag(), TokenTag::BigInt);
        assert!(!sink.has_errors());
    }

    #[test]
    fn legacy_octal_split_by_version() {
        let (tokens, sink) = lex("017\n", V::V27);
        assert!(matches!(tokens[0].kind, TokenKind::Int(15)));
        assert!(!sink.has_errors());

        let (tokens, sink) = lex("017\n", V::V37);
        assert_eq!(tokens[0].kind.tag(), TokenTag::Error);
        assert!(sink.has_errors());
    }

    #[test]
    fn long_suffix_is_2x_only() {
        let (tokens, sink) = lex("5L\n", V::V27);
        assert_eq!(tokens[0].kind.tag(), TokenTag::BigInt);
        assert!(!sink.has_errors());

        let (_, sink) = lex("5L\n", V::V37);
        assert!(sink.has_errors());
    }

    #[test]
    fn point_adjacent_underscore_is_rejected() {
        let (tokens, sink) = lex("1._4\n", V::V37);
        assert_eq!(tokens[0].kind.tag(), TokenTag::Error);
        assert!(sink.has_errors());
    }

    #[test]
    fn underscore_may_follow_a_radix_prefix() {
        let (tokens, sink) = lex("0x_ff\n", V::V37);
        assert!(matches!(tokens[0].kind, TokenKind::Int(255)));
        assert!(!sink.has_errors());
    }

    #[test]
    fn digit_separators_before_36_stay_one_token() {
        let (tokens, sink) = lex("1_000_000\n", V::V35);
        assert!(matches!(tokens[0].kind, TokenKind::Int(1_000_000)));
        assert_eq!(tokens[1].kind.tag(), TokenTag::Newline);
        assert_eq!(
            sink.first_error().unwrap().message,
            "underscores in numeric literals require Python 3.6 or greater"
        );
    }

    #[test]
    fn digit_then_keyword_without_space() {
        // The `e` of `else` must not open an exponent.
        assert_eq!(
            tags("x = 1 if y else 2\n", V::V37),
            vec![
                TokenTag::Name,
                TokenTag::Assign,
                TokenTag::Int,
                TokenTag::If,
                TokenTag::Name,
                TokenTag::Else,
                TokenTag::Int,
                TokenTag::Newline,
                TokenTag::EndOfFile,
            ]
        );
        assert_eq!(
            tags("[1else]\n", V::V37)[1..3],
            [TokenTag::Int, TokenTag::Else]
        );
    }

    #[test]
    fn print_keyword_only_in_2x() {
        assert_eq!(tags("print x\n", V::V27)[0], TokenTag::Print);
        assert_eq!(tags("print(x)\n", V::V37)[0], TokenTag::Name);
    }

    #[test]
    fn matmul_operator_from_35() {
        assert_eq!(tags("a @ b\n", V::V35)[1], TokenTag::At);
        assert_eq!(tags("a @= b\n", V::V35)[1], TokenTag::MatMulAssign);
        // 3.4: `@=` splits into decorator-at then assign.
        assert_eq!(
            tags("a @= b\n", V::V34)[1..3],
            [TokenTag::At, TokenTag::Assign]
        );
    }

    #[test]
    fn newline_table_records_physical_lines() {
        let interner = SharedInterner::new();
        let mut sink = CollectingSink::new();
        let options = TokenizerOptions::new(V::V37);
        let (_, table) = crate::tokenize_with_lines("a\nb\r\nc\n", &interner, &options, &mut sink);
        assert_eq!(table.offsets(), &[2, 5, 7]);
    }
}

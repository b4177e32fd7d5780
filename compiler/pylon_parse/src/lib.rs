//! Recursive-descent Python parser.
//!
//! Drives [`pylon_lexer::Tokenizer`] with one committed token plus one
//! peek slot, building a flat [`AstArena`] tree. Built for static
//! analysis: every diagnostic goes through an
//! [`ErrorSink`](pylon_diagnostic::ErrorSink) and the parse always
//! finishes, leaving `Error` placeholder nodes where recovery skipped
//! input.
//!
//! ```
//! use pylon_diagnostic::CollectingSink;
//! use pylon_ir::{PythonVersion, SharedInterner};
//! use pylon_parse::{parse_module, ParserOptions};
//!
//! let interner = SharedInterner::new();
//! let mut sink = CollectingSink::new();
//! let options = ParserOptions::new(PythonVersion::V37);
//! let parsed = parse_module("x = 1\n", &interner, &options, &mut sink);
//! assert_eq!(parsed.body().len(), 1);
//! assert!(!sink.has_errors());
//! ```
//!
//! Interactive hosts use [`parse_interactive`], which distinguishes
//! "syntactically wrong" from "just needs more input" by inspecting the
//! incomplete bits of the collected error codes.

mod context;
mod grammar;
mod recovery;
mod verbatim;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

pub use recovery::{TokenSet, EXPRESSION_START, STATEMENT_END, STATEMENT_START};
pub use verbatim::{AttributeBag, NodeAttributes};

use pylon_diagnostic::{Diagnostic, ErrorCode, ErrorSink, Severity};
use pylon_ir::{
    AstArena, Constant, Expr, ExprId, ExprKind, FutureOptions, Module, Name, NewlineTable, NodeId,
    PythonVersion, SharedInterner, Span, Stmt, StmtId, StmtKind, Token, TokenKind, TokenTag,
};
use pylon_lexer::{GroupingRecoveryKeywords, Tokenizer, TokenizerOptions};
use pylon_lexer_core::SourceBuffer;

use crate::context::ParseContext;

/// Parser configuration.
#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// Target language version; gates grammar forms and keywords.
    pub version: PythonVersion,
    /// `from __future__` flags assumed before parsing begins (stub files
    /// and REPL sessions carry flags across inputs).
    pub future: FutureOptions,
    /// Record exact whitespace in an [`AttributeBag`].
    pub verbatim: bool,
    /// Severity for inconsistent tab/space indentation.
    pub indentation_inconsistency: Severity,
    /// Tokenizer grouping-recovery trigger policy.
    pub grouping_recovery: GroupingRecoveryKeywords,
    /// Interactive (REPL) input.
    pub interactive: bool,
    /// Class name to mangle `__private` names with at top level, as if
    /// the whole input were inside `class <prefix>:` (used when parsing
    /// fragments that live in a class body).
    pub private_prefix: Option<Box<str>>,
    /// Type stub (`.pyi`) input: always parse with the newest grammar,
    /// whatever `version` says.
    pub stub_file: bool,
}

impl ParserOptions {
    pub fn new(version: PythonVersion) -> Self {
        ParserOptions {
            version,
            future: FutureOptions::from_version(version),
            verbatim: false,
            indentation_inconsistency: Severity::Warning,
            grouping_recovery: GroupingRecoveryKeywords::standard(),
            interactive: false,
            private_prefix: None,
            stub_file: false,
        }
    }

    #[must_use]
    pub fn verbatim(mut self, on: bool) -> Self {
        self.verbatim = on;
        self
    }

    #[must_use]
    pub fn interactive(mut self, on: bool) -> Self {
        self.interactive = on;
        self
    }

    #[must_use]
    pub fn private_prefix(mut self, class_name: &str) -> Self {
        self.private_prefix = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn stub_file(mut self, on: bool) -> Self {
        self.stub_file = on;
        self
    }

    /// The version the grammar actually follows (stub files always get
    /// the newest one).
    fn effective_version(&self) -> PythonVersion {
        if self.stub_file {
            PythonVersion::LATEST
        } else {
            self.version
        }
    }

    fn tokenizer_options(&self) -> TokenizerOptions {
        let version = self.effective_version();
        let mut options = TokenizerOptions::new(version);
        options.future = self.future | FutureOptions::from_version(version);
        options.verbatim = self.verbatim;
        options.indentation_inconsistency = self.indentation_inconsistency;
        options.grouping_recovery = self.grouping_recovery;
        options.interactive = self.interactive;
        options
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new(PythonVersion::LATEST)
    }
}

/// The result of one parse: tree, arena, line table, resolved future
/// flags and (in verbatim mode) the formatting side table.
pub struct ParsedModule {
    pub module: Module,
    pub arena: AstArena,
    pub newlines: NewlineTable,
    /// Future flags after processing any `from __future__` imports.
    pub future: FutureOptions,
    pub attributes: Option<AttributeBag>,
}

impl ParsedModule {
    /// Top-level statement ids.
    pub fn body(&self) -> &[StmtId] {
        self.arena.stmt_list(self.module.body)
    }
}

/// Outcome of [`parse_interactive`].
pub enum InteractiveParse {
    /// The input is a complete, valid program.
    Complete(Box<ParsedModule>),
    /// Every error says "more input could fix this" — keep prompting.
    Incomplete,
    /// The input is wrong and no amount of further input helps.
    Invalid(Box<ParsedModule>),
}

impl InteractiveParse {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, InteractiveParse::Incomplete)
    }
}

/// Parse a whole decoded source text.
pub fn parse_module(
    source: &str,
    interner: &SharedInterner,
    options: &ParserOptions,
    sink: &mut dyn ErrorSink,
) -> ParsedModule {
    let _guard = tracing::debug_span!("parse_module", bytes = source.len()).entered();
    let buffer = SourceBuffer::new(source);
    let parser = Parser::new(&buffer, interner.clone(), options.clone(), sink);
    parser.parse()
}

/// Parse one REPL input, classifying errors into wrong vs. unfinished.
pub fn parse_interactive(
    source: &str,
    interner: &SharedInterner,
    options: &ParserOptions,
    sink: &mut dyn ErrorSink,
) -> InteractiveParse {
    let _guard = tracing::debug_span!("parse_interactive", bytes = source.len()).entered();
    let options = options.clone().interactive(true);
    let mut collector = pylon_diagnostic::CollectingSink::new();
    let parsed = {
        let buffer = SourceBuffer::new(source);
        let parser = Parser::new(&buffer, interner.clone(), options, &mut collector);
        parser.parse()
    };

    let mut any_error = false;
    let mut all_incomplete = true;
    for diagnostic in collector.diagnostics() {
        if diagnostic.is_error() {
            any_error = true;
            if !diagnostic.code.is_incomplete() {
                all_incomplete = false;
            }
        }
    }
    for diagnostic in collector.into_diagnostics() {
        sink.report(diagnostic);
    }

    if !any_error {
        InteractiveParse::Complete(Box::new(parsed))
    } else if all_incomplete {
        InteractiveParse::Incomplete
    } else {
        InteractiveParse::Invalid(Box::new(parsed))
    }
}

/// One buffered token with the whitespace that preceded it (verbatim
/// mode only; empty otherwise).
struct Entry {
    token: Token,
    whitespace: Box<str>,
}

/// The parser. Owns the tokenizer and the arena being built; reports
/// through the borrowed sink.
pub struct Parser<'a> {
    source: &'a str,
    tokenizer: Tokenizer<'a>,
    interner: SharedInterner,
    sink: &'a mut dyn ErrorSink,
    options: ParserOptions,
    pub(crate) arena: AstArena,
    pub(crate) context: ParseContext,
    future: FutureOptions,
    attributes: Option<AttributeBag>,
    /// Text of consumed structural tokens (statement newlines, dedent
    /// comments) waiting to join the next statement's preceding
    /// whitespace. Verbatim mode only; stays empty otherwise.
    carry: String,
    current: Entry,
    lookahead: Option<Entry>,
    /// End offset of the most recently consumed text-owning token
    /// (newline and indentation tokens do not move it).
    last_end: u32,
    /// True until a statement other than a docstring or a future import
    /// has been parsed.
    allow_future_import: bool,
    future_name: Name,
    /// Mangling class name for names outside any `class` statement.
    private_prefix: Option<Name>,
}

impl<'a> Parser<'a> {
    pub fn new(
        buffer: &'a SourceBuffer,
        interner: SharedInterner,
        options: ParserOptions,
        sink: &'a mut dyn ErrorSink,
    ) -> Self {
        let mut tokenizer = Tokenizer::new(buffer, interner.clone(), options.tokenizer_options());
        let source = buffer.as_str();
        let current = fetch_entry(&mut tokenizer, &mut *sink, source, options.verbatim);
        let attributes = options.verbatim.then(AttributeBag::new);
        let future = options.future | FutureOptions::from_version(options.effective_version());
        let future_name = interner.intern("__future__");
        let private_prefix = options
            .private_prefix
            .as_deref()
            .map(|prefix| interner.intern(prefix));
        Parser {
            source,
            tokenizer,
            interner,
            sink,
            options,
            arena: AstArena::new(),
            context: ParseContext::default(),
            future,
            attributes,
            carry: String::new(),
            current,
            lookahead: None,
            last_end: 0,
            allow_future_import: true,
            future_name,
            private_prefix,
        }
    }

    /// Forward a per-comment callback to the tokenizer. Call this right
    /// after [`Parser::new`]: the constructor fetches one token ahead,
    /// so a comment preceding the first token is not replayed.
    pub fn set_comment_callback(&mut self, callback: pylon_lexer::CommentCallback<'a>) {
        self.tokenizer.set_comment_callback(callback);
    }

    /// Parse the whole input as a module.
    pub fn parse(mut self) -> ParsedModule {
        let mut body = Vec::new();
        loop {
            match self.tag() {
                TokenTag::EndOfFile => break,
                TokenTag::Newline => {
                    self.bump();
                }
                TokenTag::Indent => {
                    self.indentation_error(self.span(), "unexpected indent");
                    self.bump();
                }
                TokenTag::Dedent => {
                    self.bump();
                }
                _ => {
                    let stmt = self.parse_statement();
                    self.note_prologue(&body, stmt);
                    body.push(stmt);
                }
            }
        }
        if let Some(bag) = self.attributes.as_mut() {
            self.carry.push_str(&self.current.whitespace);
            bag.set_trailing(std::mem::take(&mut self.carry));
        }
        let span = Span::new(0, self.current.token.span.end);
        let body = self.arena.alloc_stmt_list(body);
        ParsedModule {
            module: Module { body, span },
            arena: self.arena,
            newlines: self.tokenizer.into_newline_table(),
            future: self.future,
            attributes: self.attributes,
        }
    }

    /// Future imports must form the module prologue: only a docstring or
    /// other future imports may precede them.
    fn note_prologue(&mut self, body: &[StmtId], stmt: StmtId) {
        if !self.allow_future_import {
            return;
        }
        let keeps_prologue = match &self.arena.stmt(stmt).kind {
            StmtKind::FromImport { module, .. } => {
                module.dots == 0
                    && module.path.len == 1
                    && self.arena.name_list(module.path) == [self.future_name]
            }
            StmtKind::Expr { value } => {
                body.is_empty()
                    && matches!(
                        self.arena.expr(*value).kind,
                        ExprKind::Constant(Constant::Str(_))
                    )
            }
            _ => false,
        };
        if !keeps_prologue {
            self.allow_future_import = false;
        }
    }

    // --- token plumbing ---

    fn fetch(&mut self) -> Entry {
        let verbatim = self.options.verbatim;
        fetch_entry(&mut self.tokenizer, &mut *self.sink, self.source, verbatim)
    }

    #[inline]
    pub(crate) fn tag(&self) -> TokenTag {
        self.current.token.tag()
    }

    #[inline]
    pub(crate) fn at(&self, tag: TokenTag) -> bool {
        self.tag() == tag
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.current.token.span
    }

    #[inline]
    pub(crate) fn kind(&self) -> &TokenKind {
        &self.current.token.kind
    }

    #[inline]
    pub(crate) fn last_end(&self) -> u32 {
        self.last_end
    }

    /// Tag of the token after the current one.
    pub(crate) fn peek(&mut self) -> TokenTag {
        if self.lookahead.is_none() {
            let entry = self.fetch();
            self.lookahead = Some(entry);
        }
        match &self.lookahead {
            Some(entry) => entry.token.tag(),
            None => TokenTag::EndOfFile,
        }
    }

    /// Consume and return the current token.
    pub(crate) fn bump(&mut self) -> Token {
        let next = match self.lookahead.take() {
            Some(entry) => entry,
            None => self.fetch(),
        };
        let previous = std::mem::replace(&mut self.current, next);
        // Newlines, indents and dedents own no statement text: spans
        // stop at the last real token, and in verbatim mode their bytes
        // ride along to the next statement's preceding-whitespace stamp.
        match previous.token.kind {
            TokenKind::Newline(_) => {
                if self.options.verbatim {
                    self.carry.push_str(&previous.whitespace);
                    self.carry
                        .push_str(&self.source[previous.token.span.to_range()]);
                }
            }
            TokenKind::Indent | TokenKind::Dedent => {
                if self.options.verbatim {
                    self.carry.push_str(&previous.whitespace);
                }
            }
            _ => self.last_end = previous.token.span.end,
        }
        previous.token
    }

    pub(crate) fn eat(&mut self, tag: TokenTag) -> bool {
        if self.at(tag) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `tag` or report `unexpected token '...'`.
    pub(crate) fn expect(&mut self, tag: TokenTag) -> bool {
        if self.eat(tag) {
            return true;
        }
        let found = self.token_image();
        self.syntax_error(self.span(), format!("unexpected token '{found}'"));
        false
    }

    /// Display text for the current token, for error messages.
    pub(crate) fn token_image(&self) -> String {
        let kind = &self.current.token.kind;
        if let Some(image) = kind.static_image() {
            return image.to_owned();
        }
        match kind {
            TokenKind::Newline(_) | TokenKind::Nl(_) => "<newline>".to_owned(),
            TokenKind::Indent => "<indent>".to_owned(),
            TokenKind::Dedent => "<dedent>".to_owned(),
            TokenKind::EndOfFile => "<eof>".to_owned(),
            TokenKind::IncompleteStr(_) => "<incomplete string>".to_owned(),
            _ => self.source[self.current.token.span.to_range()].to_owned(),
        }
    }

    // --- diagnostics ---

    fn error_with(&mut self, span: Span, message: String, base: ErrorCode) {
        let mut code = base;
        // At end of input, or with a grouping still open, the statement
        // is cut off rather than wrong; interactive hosts prompt for
        // more input instead of rejecting.
        if matches!(self.current.token.kind, TokenKind::EndOfFile)
            || self.tokenizer.grouping_depth() > 0
        {
            code = code
                .with(ErrorCode::INCOMPLETE_STATEMENT)
                .with(ErrorCode::NO_CARET);
        }
        self.sink
            .report(Diagnostic::new(message, span, code, Severity::FatalError));
    }

    pub(crate) fn syntax_error(&mut self, span: Span, message: impl Into<String>) {
        self.error_with(span, message.into(), ErrorCode::SYNTAX_ERROR);
    }

    pub(crate) fn indentation_error(&mut self, span: Span, message: impl Into<String>) {
        self.error_with(span, message.into(), ErrorCode::INDENTATION_ERROR);
    }

    // --- arena helpers ---

    pub(crate) fn add_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    pub(crate) fn add_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    pub(crate) fn error_expr(&mut self, span: Span) -> ExprId {
        self.add_expr(ExprKind::Error, span)
    }

    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    pub(crate) fn stmt_span(&self, id: StmtId) -> Span {
        self.arena.stmt(id).span
    }

    // --- misc ---

    pub(crate) fn version(&self) -> PythonVersion {
        self.options.effective_version()
    }

    pub(crate) fn allows_future_import(&self) -> bool {
        self.allow_future_import
    }

    pub(crate) fn is_future_module(&self, name: Name) -> bool {
        name == self.future_name
    }

    /// Merge newly processed future flags and push them down to the
    /// tokenizer, which re-gates keywords mid-stream.
    pub(crate) fn add_future(&mut self, flag: FutureOptions) {
        self.future |= flag;
        self.tokenizer.set_future_options(self.future);
    }

    pub(crate) fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub(crate) fn intern_owned(&self, text: String) -> Name {
        self.interner.intern_owned(text)
    }

    pub(crate) fn lookup(&self, name: Name) -> &'static str {
        self.interner.lookup_static(name)
    }

    /// Whitespace recorded for the current token (verbatim mode).
    pub(crate) fn current_whitespace(&self) -> Box<str> {
        self.current.whitespace.clone()
    }

    /// Everything between the previous statement's last token and the
    /// current one: carried structural-token text plus the current
    /// token's own recorded whitespace.
    pub(crate) fn take_preceding(&mut self) -> Box<str> {
        if self.carry.is_empty() {
            return self.current_whitespace();
        }
        let mut whitespace = std::mem::take(&mut self.carry);
        whitespace.push_str(&self.current.whitespace);
        whitespace.into_boxed_str()
    }

    pub(crate) fn stamp_preceding(&mut self, id: StmtId, whitespace: Box<str>) {
        if let Some(bag) = self.attributes.as_mut() {
            bag.set_preceding(id, whitespace);
        }
    }

    pub(crate) fn mark_alt_form(&mut self, id: impl Into<NodeId>) {
        if let Some(bag) = self.attributes.as_mut() {
            bag.mark_alt_form(id);
        }
    }

    pub(crate) fn mark_missing_terminator(&mut self, id: impl Into<NodeId>) {
        if let Some(bag) = self.attributes.as_mut() {
            bag.mark_missing_terminator(id);
        }
    }
}

/// Pull the next grammar-visible token, folding `Nl` and `Comment`
/// tokens (verbatim mode) into the preceding-whitespace string.
fn fetch_entry(
    tokenizer: &mut Tokenizer<'_>,
    sink: &mut dyn ErrorSink,
    source: &str,
    verbatim: bool,
) -> Entry {
    let mut whitespace = String::new();
    loop {
        let token = tokenizer.next_token(sink);
        if verbatim {
            whitespace.push_str(tokenizer.preceding_whitespace());
        }
        match token.kind {
            TokenKind::Nl(_) | TokenKind::Comment(_) => {
                if verbatim {
                    whitespace.push_str(&source[token.span.to_range()]);
                }
            }
            _ => {
                return Entry {
                    token,
                    whitespace: whitespace.into_boxed_str(),
                }
            }
        }
    }
}

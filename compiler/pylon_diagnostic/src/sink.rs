//! Error sinks.
//!
//! The tokenizer and parser report through an `ErrorSink` rather than
//! returning `Result` per production, so one bad token never aborts the
//! parse. Hosts either collect everything (`CollectingSink`) or swallow
//! reports when only the tree matters (`NullSink`).

use pylon_ir::Span;

use crate::{Diagnostic, ErrorCode, Severity};

/// Receiver for tokenizer/parser diagnostics.
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, message: impl Into<String>, span: Span, code: ErrorCode)
    where
        Self: Sized,
    {
        self.report(Diagnostic::new(message, span, code, Severity::Error));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span, code: ErrorCode)
    where
        Self: Sized,
    {
        self.report(Diagnostic::new(message, span, code, Severity::Warning));
    }
}

/// Discards every report.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Accumulates reports in order, dropping `Ignore`-severity ones.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// First error-severity diagnostic, if any.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Ignore => return,
            Severity::Warning => self.warning_count += 1,
            Severity::Error | Severity::FatalError => self.error_count += 1,
        }
        self.diagnostics.push(diagnostic);
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

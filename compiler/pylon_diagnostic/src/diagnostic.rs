use std::fmt;

use pylon_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// Hosts configure per-condition severities (e.g. inconsistent
/// indentation may be ignored, warned about, or treated as an error);
/// `Ignore` lets the sink drop the report entirely.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Ignore,
    Warning,
    Error,
    /// Blocks consumers from treating the surrounding construct as
    /// usable. The parse itself still runs to completion.
    FatalError,
}

impl Severity {
    #[inline]
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ignore => write!(f, "ignore"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::FatalError => write!(f, "fatal error"),
        }
    }
}

/// One reported problem: message, location, packed code, severity.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub code: ErrorCode,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        message: impl Into<String>,
        span: Span,
        code: ErrorCode,
        severity: Severity,
    ) -> Self {
        Diagnostic {
            message: message.into(),
            span,
            code,
            severity,
        }
    }

    /// Shorthand for an error-severity syntax error.
    pub fn syntax_error(message: impl Into<String>, span: Span) -> Self {
        Self::new(message, span, ErrorCode::SYNTAX_ERROR, Severity::Error)
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}..{})",
            self.severity, self.message, self.span.start, self.span.end
        )
    }
}

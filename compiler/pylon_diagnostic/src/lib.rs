//! Pylon Diagnostics - Error Reporting for the Python Parser
//!
//! Diagnostics carry a message, a byte span, a bit-packed [`ErrorCode`]
//! and a [`Severity`]. Codes pack category and modifier bits so hosts
//! can classify a report (syntax vs. indentation vs. tab error, complete
//! vs. needs-more-input) without string matching.

mod diagnostic;
mod error_code;
mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use sink::{CollectingSink, ErrorSink, NullSink};

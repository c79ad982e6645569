//! Diagnostic system for formatting conflict reports.
//!
//! Formatting never fails because two layout rules disagree; instead the
//! engine abandons the offending rule and reports what happened:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary range (which block could not be laid out)
//! - Secondary ranges (the chain of blocks that caused it)
//! - Attachments (the document text, for reproducing the problem)

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Attachment, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};

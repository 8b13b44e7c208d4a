//! # Envelope Errors

use std::borrow::Cow;

/// Framing failures. Messages describe the structural problem only, never payload bytes.
#[sfetch_derive::sfetch_error]
pub enum EnvelopeError {
    /// Truncated input, overrunning or oversized length prefix, unknown version or trailing bytes.
    #[error("Malformed envelope{}: {message}", format_context(.context))]
    Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal envelope error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

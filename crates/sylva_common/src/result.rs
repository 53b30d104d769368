//! Result and error types for internal invariant violations.

/// The result type for operations that can only fail because of a bug.
///
/// `Err` means the forest bookkeeping found itself in an inconsistent state
/// (for example a unit in the sequence without an ordinal). User problems such
/// as unresolvable load paths are reported as diagnostics and never surface here.
pub type SylvaResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Sylva, not a problem with user input.
///
/// Continuing after one of these could corrupt the declaration index, so
/// callers are expected to stop using the affected forest.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

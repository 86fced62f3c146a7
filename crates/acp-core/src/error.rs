//! # Error Types
//!
//! Construction and accounting errors for the core newtypes. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Errors raised when building or advancing core values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Cache keys must contain at least one character.
    #[error("cache key must not be empty")]
    EmptyKey,

    /// Cache keys are path-derived and must not keep a leading separator.
    #[error("cache key must not begin with '/': {0:?}")]
    LeadingSeparator(String),

    /// A chunk window of zero bytes can never make progress.
    #[error("chunk window must be at least one byte")]
    ZeroWindow,

    /// A range was applied to a cursor that is not positioned at its start.
    #[error("byte range starts at {found} but upload cursor is at {expected}")]
    CursorMismatch {
        /// Current cursor position.
        expected: u64,
        /// Start offset of the rejected range.
        found: u64,
    },
}

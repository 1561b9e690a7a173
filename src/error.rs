//! Error types for the repage library.

use thiserror::Error;

/// Result type alias for reflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reflowing a page.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter was out of range or malformed.
    ///
    /// Covers undersized viewports, negative top space, non-positive
    /// device rects, and focus byte strings that fail to decode.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The source page has not completed content parsing.
    #[error("source page content has not been parsed")]
    NotParsed,

    /// A layout-derived query was made before layout completed.
    #[error("page has not been laid out")]
    NotLaidOut,

    /// A one-shot operation was started (or stepped) after it finished.
    #[error("operation already finished")]
    AlreadyFinished,

    /// An allocation failed while building working state.
    ///
    /// The owning instance is left in its prior valid state.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// An internal invariant was violated. Surfaced, never retried.
    #[error("internal error: {0}")]
    Internal(String),

    /// The external renderer reported a failure.
    #[error("renderer error: {0}")]
    Render(String),
}

impl Error {
    /// Build an `InvalidParameter` error from anything displayable.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory(err.to_string())
    }
}

//! Error types for servicemock.

use crate::verify::{UnexpectedRequestMessage, VerifyErrorMessage};
use thiserror::Error;

/// Result type alias for servicemock operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in servicemock.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more expected requests were never made.
    #[error("{0}")]
    Verification(VerifyErrorMessage),

    /// A request arrived that no expectation matches.
    #[error("{0}")]
    UnexpectedRequest(UnexpectedRequestMessage),

    /// Status line could not be parsed as `<code> <reason>`.
    #[error("invalid status line: {0}")]
    InvalidStatusLine(String),

    /// Failed to bind to address.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// Failed to encode or decode JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

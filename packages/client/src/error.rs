//! Error types for the long-polling chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or the response could not be read
    #[error("Connection error: {0}")]
    ConnectionError(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Polling kept failing
    #[error("Gave up after {0} consecutive poll failures")]
    PollFailed(u32),
}

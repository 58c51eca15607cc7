//! Domain layer errors.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Client ID is empty
    #[error("client_id must not be empty")]
    ClientIdEmpty,

    /// Client ID is too long
    #[error("client_id must be at most {max} characters (got {actual})")]
    ClientIdTooLong { max: usize, actual: usize },

    /// Room name is empty
    #[error("room must not be empty")]
    RoomNameEmpty,

    /// Room name is too long
    #[error("room must be at most {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    /// Sender name is empty
    #[error("sender must not be empty")]
    SenderEmpty,

    /// Sender name is too long
    #[error("sender must be at most {max} characters (got {actual})")]
    SenderTooLong { max: usize, actual: usize },

    /// Message text is empty
    #[error("Message text cannot be empty")]
    MessageTextEmpty,

    /// Message text is too long
    #[error("Message text must be at most {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    /// History limit is out of range
    #[error("limit must be between {min} and {max} (got {actual})")]
    HistoryLimitOutOfRange { min: usize, max: usize, actual: i64 },

    /// Value contains characters that are not allowed
    #[error("{field} contains forbidden characters")]
    ForbiddenCharacters { field: &'static str },
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Storage is in an unusable state
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Mailbox errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MailboxError {
    /// The receiving session has already ended
    #[error("Mailbox closed")]
    Closed,
}

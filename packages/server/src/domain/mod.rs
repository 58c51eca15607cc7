//! Domain layer for the long-polling chat server.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod mailbox;
pub mod marker;
pub mod registry;
pub mod repository;
pub mod stats;
pub mod value_object;

pub use entity::{DEFAULT_HISTORY_CAPACITY, Message, RoomHistory};
pub use error::{MailboxError, RepositoryError, ValueObjectError};
pub use mailbox::{
    MailboxReceiver, MailboxSender, SessionHandle, SessionId, WaitingSession, mailbox,
};
pub use marker::LastSeen;
pub use registry::{RegistrationGuard, SessionRegistry};
pub use repository::{CatchUp, RoomRepository};
#[cfg(test)]
pub use repository::MockRoomRepository;
pub use stats::{StatsRecorder, StatsSnapshot};
pub use value_object::{
    ClientId, DEFAULT_ROOM, HistoryLimit, MessageId, MessageText, RoomName, SenderName, Sequence,
    Timestamp,
};

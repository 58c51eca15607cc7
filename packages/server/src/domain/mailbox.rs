//! Per-session mailboxes and the waiting session they belong to.
//!
//! A mailbox is an unbounded single-consumer queue. The sending half is held
//! by the session registry for fan-out; the receiving half stays with the poll
//! call that created it. Pushing never blocks, and a receiver wakes as soon as
//! something is pushed.

use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    entity::Message,
    error::MailboxError,
    value_object::{ClientId, RoomName, Timestamp},
};

/// Identifier of one waiting session (one in-flight poll call)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Create a connected mailbox pair
pub fn mailbox() -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MailboxSender { tx }, MailboxReceiver { rx })
}

/// Sending half of a mailbox, cloned into fan-out snapshots
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MailboxSender {
    /// Enqueue a copy of `message` without waiting for the consumer
    pub fn push(&self, message: Message) -> Result<(), MailboxError> {
        self.tx.send(message).map_err(|_| MailboxError::Closed)
    }
}

/// Receiving half of a mailbox, owned by the poll call
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl MailboxReceiver {
    /// Wait for the first message, then drain everything already queued.
    ///
    /// Returns `None` once every sender is gone and the queue is empty.
    pub async fn recv_batch(&mut self) -> Option<Vec<Message>> {
        let first = self.rx.recv().await?;
        let mut batch = vec![first];
        batch.extend(self.drain());
        Some(batch)
    }

    /// Take whatever is queued right now without waiting
    pub fn drain(&mut self) -> Vec<Message> {
        let mut drained = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            drained.push(message);
        }
        drained
    }
}

/// One in-flight poll call waiting for messages in a room
#[derive(Debug, Clone)]
pub struct WaitingSession {
    pub session_id: SessionId,
    pub client_id: ClientId,
    pub room: RoomName,
    pub mailbox: MailboxSender,
    pub created_at: Timestamp,
}

impl WaitingSession {
    pub fn new(
        client_id: ClientId,
        room: RoomName,
        mailbox: MailboxSender,
        created_at: Timestamp,
    ) -> Self {
        Self {
            session_id: SessionId::generate(),
            client_id,
            room,
            mailbox,
            created_at,
        }
    }
}

/// Handle returned by registration, used to deregister exactly that session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub session_id: SessionId,
    pub room: RoomName,
}

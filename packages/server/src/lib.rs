//! Long-polling chat server library.
//!
//! Clients hold a poll request open until a message arrives in their room or
//! the poll times out; senders append to a bounded per-room history and wake
//! every waiting poller of that room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

//! UseCase layer
//!
//! ビジネスロジックの手続きを表現する層。
//! Domain の trait にのみ依存し、具体的な実装（インメモリ等）には依存しない。

pub mod disconnect_client;
pub mod error;
pub mod get_history;
pub mod get_stats;
pub mod poll_messages;
pub mod send_message;

pub use disconnect_client::DisconnectClientUseCase;
pub use error::{DisconnectClientError, GetHistoryError, PollError, SendMessageError};
pub use get_history::{GetHistoryUseCase, History};
pub use get_stats::{GetStatsUseCase, RoomActivity};
pub use poll_messages::{PollConfig, PollMessagesUseCase, PollOutcome, PollRequest, PollResult};
pub use send_message::SendMessageUseCase;

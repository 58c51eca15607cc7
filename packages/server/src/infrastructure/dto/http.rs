//! HTTP API request/response DTOs.
//!
//! Shared with the CLI client, which deserializes the same shapes.

use serde::{Deserialize, Serialize};

/// Query parameters of `GET /api/poll`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollQuery {
    pub client_id: Option<String>,
    pub room: Option<String>,
    /// Sequence number or message id of the last message seen
    #[serde(alias = "last_seen")]
    pub last_message_id: Option<String>,
    /// Requested wait in seconds; values out of range are clamped, not rejected
    pub timeout: Option<i64>,
}

/// Query parameters of `GET /api/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub room: Option<String>,
    pub limit: Option<i64>,
}

/// Body of `POST /api/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub sender: String,
    pub text: String,
    pub room: Option<String>,
}

/// A message as exposed on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender: String,
    pub text: String,
    /// Seconds since the epoch
    pub timestamp: f64,
    pub room: String,
    pub sequence: u64,
}

/// Terminal status of a poll call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Success,
    Timeout,
}

/// Response of `GET /api/poll`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponseDto {
    pub messages: Vec<MessageDto>,
    pub status: PollStatus,
    pub timed_out: bool,
}

/// Response of `POST /api/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponseDto {
    /// Always `"sent"`
    pub status: String,
    pub message_id: String,
    pub timestamp: f64,
    pub sequence: u64,
}

/// Response of `GET /api/history`, oldest message first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponseDto {
    pub messages: Vec<MessageDto>,
    pub count: usize,
    pub room: String,
}

/// Response of `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponseDto {
    pub active_clients: usize,
    pub total_messages: u64,
    pub rooms: Vec<String>,
    pub timestamp: f64,
}

/// Response of `DELETE /api/client/{client_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisconnectResponseDto {
    /// Always `"disconnected"`
    pub status: String,
    pub client_id: String,
    /// Number of waiting sessions that were evicted
    pub sessions: usize,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponseDto {
    /// Always `"healthy"`
    pub status: String,
    pub timestamp: f64,
    pub active_clients: usize,
}

/// Error body for 4xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

//! HTTP access to the chat server.

use std::time::Duration;

use kairan_server::infrastructure::dto::http::{
    DisconnectResponseDto, ErrorResponseDto, HistoryResponseDto, PollResponseDto,
    SendMessageRequest, SendMessageResponseDto,
};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Seconds the client asks the server to hold a poll open
pub const POLL_TIMEOUT_SECS: u64 = 25;

/// Extra time allowed for the server to answer after the poll timeout
const POLL_GRACE_SECS: u64 = 10;

/// Timeout of the short, non-poll requests
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Thin wrapper around the server's HTTP API for one client in one room
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    room: String,
}

impl ChatApi {
    pub fn new(base_url: &str, client_id: &str, room: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            room: room.to_string(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Wait for messages newer than `last_seen` (a sequence number, 0 for none)
    pub async fn poll(&self, last_seen: u64) -> Result<PollResponseDto, ClientError> {
        let query = [
            ("client_id", self.client_id.clone()),
            ("room", self.room.clone()),
            ("timeout", POLL_TIMEOUT_SECS.to_string()),
            ("last_seen", last_seen.to_string()),
        ];

        let request = self
            .http
            .get(self.url("/api/poll"))
            .query(&query)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + POLL_GRACE_SECS));
        call(request).await
    }

    /// Post a message to the room as this client
    pub async fn send(&self, text: &str) -> Result<SendMessageResponseDto, ClientError> {
        let body = SendMessageRequest {
            sender: self.client_id.clone(),
            text: text.to_string(),
            room: Some(self.room.clone()),
        };
        let request = self
            .http
            .post(self.url("/api/send"))
            .json(&body)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        call(request).await
    }

    /// Most recent messages of the room, oldest first
    pub async fn history(&self, limit: u32) -> Result<HistoryResponseDto, ClientError> {
        let request = self
            .http
            .get(self.url("/api/history"))
            .query(&[("room", self.room.clone()), ("limit", limit.to_string())])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        call(request).await
    }

    /// Release any poll of this client still parked on the server
    pub async fn disconnect(&self) -> Result<DisconnectResponseDto, ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/client/{}", self.client_id)))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        call(request).await
    }
}

async fn call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull the `error` field out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponseDto>(body)
        .map(|dto| dto.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        // テスト項目: ベース URL 末尾のスラッシュは取り除かれる
        // given (前提条件):
        let base_url = "http://127.0.0.1:8000/";

        // when (操作):
        let api = ChatApi::new(base_url, "alice", "general");

        // then (期待する結果):
        assert_eq!(api.url("/api/poll"), "http://127.0.0.1:8000/api/poll");
        assert_eq!(api.client_id(), "alice");
        assert_eq!(api.room(), "general");
    }

    #[test]
    fn test_error_message_from_json_body() {
        // テスト項目: JSON のエラーボディから error フィールドが取り出される
        // given (前提条件):
        let body = r#"{"error":"Message text cannot be empty"}"#;

        // when (操作):
        let message = error_message(body);

        // then (期待する結果):
        assert_eq!(message, "Message text cannot be empty");
    }

    #[test]
    fn test_error_message_from_plain_body() {
        // テスト項目: JSON でないボディはそのまま使われる
        // given (前提条件):
        let body = "Failed to deserialize query string\n";

        // when (操作):
        let message = error_message(body);

        // then (期待する結果):
        assert_eq!(message, "Failed to deserialize query string");
    }
}

//! HTTP API endpoint handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        DisconnectResponseDto, ErrorResponseDto, HealthResponseDto, HistoryQuery,
        HistoryResponseDto, PollQuery, PollResponseDto, SendMessageRequest,
        SendMessageResponseDto, StatsResponseDto,
    },
    ui::state::AppState,
    usecase::{PollRequest, SendMessageError},
};
use kairan_shared::time::get_epoch_secs;

/// 4xx/5xx response with a JSON `{"error": ...}` body
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponseDto {
            error: error.to_string(),
        }),
    )
}

/// Malformed query strings and bodies get the same `{"error": ...}` shape
fn rejection_error(body_text: String) -> ApiError {
    tracing::warn!("Rejected malformed request: {}", body_text);
    api_error(StatusCode::BAD_REQUEST, body_text)
}

/// Requested wait as a duration; negative values become zero and are then
/// raised to the configured minimum
fn requested_timeout(secs: i64) -> Duration {
    Duration::from_secs(u64::try_from(secs).unwrap_or(0))
}

/// Long-poll for messages newer than `last_message_id`
pub async fn poll_messages(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<PollResponseDto>, ApiError> {
    let Query(query) = query.map_err(|e| rejection_error(e.body_text()))?;
    let Some(client_id) = query.client_id else {
        return Err(api_error(StatusCode::BAD_REQUEST, "client_id is required"));
    };

    let request = PollRequest {
        client_id: client_id.clone(),
        room: query.room,
        last_seen: query.last_message_id,
        timeout: query.timeout.map(requested_timeout),
    };

    match state.poll_messages_usecase.execute(request).await {
        Ok(result) => {
            tracing::info!(
                client_id = %client_id,
                outcome = ?result.outcome,
                messages = result.messages.len(),
                "poll finished"
            );
            Ok(Json(result.into()))
        }
        Err(e) => {
            tracing::warn!("Rejected poll from '{}': {}", client_id, e);
            Err(api_error(StatusCode::BAD_REQUEST, e))
        }
    }
}

/// Append a message to a room and wake its waiting pollers
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    request: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponseDto>, ApiError> {
    let Json(request) = request.map_err(|e| rejection_error(e.body_text()))?;
    match state
        .send_message_usecase
        .execute(request.sender, request.text, request.room)
        .await
    {
        Ok(message) => Ok(Json(message.into())),
        Err(e @ SendMessageError::Validation(_)) => {
            tracing::warn!("Rejected message: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, e))
        }
        Err(e @ SendMessageError::Repository(_)) => {
            tracing::error!("Failed to send message: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Most recent messages of a room, oldest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponseDto>, ApiError> {
    let Query(query) = query.map_err(|e| rejection_error(e.body_text()))?;
    let history = state
        .get_history_usecase
        .execute(query.room, query.limit)
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    // Domain Model から DTO への変換
    Ok(Json(HistoryResponseDto {
        count: history.messages.len(),
        room: history.room.into_string(),
        messages: history.messages.into_iter().map(Into::into).collect(),
    }))
}

/// Usage counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponseDto> {
    Json(state.get_stats_usecase.execute().into())
}

/// Evict every waiting session of a client
pub async fn disconnect_client(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Json<DisconnectResponseDto>, ApiError> {
    let sessions = state
        .disconnect_client_usecase
        .execute(client_id.clone())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    Ok(Json(DisconnectResponseDto {
        status: "disconnected".to_string(),
        client_id,
        sessions,
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        status: "healthy".to_string(),
        timestamp: get_epoch_secs(),
        active_clients: state.get_stats_usecase.active_clients(),
    })
}

//! Conversion logic from domain entities to DTOs.

use crate::domain::{Message, StatsSnapshot};
use crate::infrastructure::dto::http as dto;
use crate::usecase::{PollOutcome, PollResult};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Message> for dto::MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.to_string(),
            sender: model.sender.into_string(),
            text: model.text.into_string(),
            timestamp: model.timestamp.as_epoch_secs(),
            room: model.room.into_string(),
            sequence: model.sequence.value(),
        }
    }
}

impl From<Message> for dto::SendMessageResponseDto {
    fn from(model: Message) -> Self {
        Self {
            status: "sent".to_string(),
            message_id: model.id.to_string(),
            timestamp: model.timestamp.as_epoch_secs(),
            sequence: model.sequence.value(),
        }
    }
}

impl From<PollResult> for dto::PollResponseDto {
    fn from(result: PollResult) -> Self {
        let (status, timed_out) = match result.outcome {
            PollOutcome::Delivered | PollOutcome::CaughtUp => (dto::PollStatus::Success, false),
            PollOutcome::TimedOut | PollOutcome::Evicted => (dto::PollStatus::Timeout, true),
        };
        Self {
            messages: result.messages.into_iter().map(Into::into).collect(),
            status,
            timed_out,
        }
    }
}

impl From<StatsSnapshot> for dto::StatsResponseDto {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            active_clients: snapshot.active_clients,
            total_messages: snapshot.total_messages,
            rooms: snapshot.rooms.into_iter().map(|r| r.into_string()).collect(),
            timestamp: snapshot.timestamp.as_epoch_secs(),
        }
    }
}

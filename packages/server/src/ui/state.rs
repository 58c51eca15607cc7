//! Server state shared by the HTTP handlers.

use std::sync::Arc;

use crate::usecase::{
    DisconnectClientUseCase, GetHistoryUseCase, GetStatsUseCase, PollMessagesUseCase,
    SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// PollMessagesUseCase（ロングポーリングのユースケース）
    pub poll_messages_usecase: Arc<PollMessagesUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
    /// GetStatsUseCase（利用統計取得のユースケース）
    pub get_stats_usecase: Arc<GetStatsUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
}

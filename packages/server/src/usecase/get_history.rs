//! UseCase: 履歴取得処理

use std::sync::Arc;

use crate::domain::{HistoryLimit, Message, RoomName, RoomRepository};

use super::error::GetHistoryError;

/// ルームの直近履歴
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub room: RoomName,
    /// 古い順（最新が末尾）
    pub messages: Vec<Message>,
}

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    /// Repository（ルーム履歴の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetHistoryUseCase {
    /// 新しい GetHistoryUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 直近 `limit` 件（デフォルト 20、1〜100）を古い順に返す
    ///
    /// 存在しないルームは空の履歴として扱う。
    pub async fn execute(
        &self,
        room: Option<String>,
        limit: Option<i64>,
    ) -> Result<History, GetHistoryError> {
        let room = RoomName::or_default(room)?;
        let limit = limit.map(HistoryLimit::new).transpose()?.unwrap_or_default();

        let messages = self.repository.recent(&room, limit.value()).await;
        Ok(History { room, messages })
    }
}

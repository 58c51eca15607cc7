//! UseCase: 利用統計の取得（Stats Aggregator）

use std::sync::Arc;

use kairan_shared::time::get_epoch_millis;

use crate::domain::{
    RoomName, RoomRepository, SessionRegistry, StatsRecorder, StatsSnapshot, Timestamp,
};

/// 履歴を持つルームごとの待機中セッション数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomActivity {
    pub room: RoomName,
    pub waiting: usize,
}

/// 利用統計取得のユースケース
pub struct GetStatsUseCase {
    /// Repository（ルーム履歴の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// SessionRegistry（待機中セッションの抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// StatsRecorder（利用統計の抽象化）
    stats: Arc<dyn StatsRecorder>,
}

impl GetStatsUseCase {
    /// 新しい GetStatsUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        Self {
            repository,
            registry,
            stats,
        }
    }

    /// 現在の統計を返す
    ///
    /// 各値はそれぞれ個別に読み取るため、値同士の整合性は保証しない。
    pub fn execute(&self) -> StatsSnapshot {
        StatsSnapshot {
            active_clients: self.registry.count(),
            total_messages: self.stats.total_messages(),
            rooms: self.stats.rooms(),
            timestamp: Timestamp::new(get_epoch_millis()),
        }
    }

    /// 現在待機中のセッション数
    pub fn active_clients(&self) -> usize {
        self.registry.count()
    }

    /// 履歴を持つルームそれぞれの待機中セッション数（ルーム名昇順）
    pub async fn room_activity(&self) -> Vec<RoomActivity> {
        self.repository
            .room_names()
            .await
            .into_iter()
            .map(|room| RoomActivity {
                waiting: self.registry.count_in(&room),
                room,
            })
            .collect()
    }
}

//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ルーム名 → `RoomHistory` の HashMap をインメモリ DB として使用します。
//!
//! ロックは二段構成です：
//!
//! ```text
//! RwLock<HashMap<RoomName, Arc<Mutex<RoomHistory>>>>
//!   └─ 外側: ルームの作成時のみ write、それ以外は read
//!   └─ 内側: ルームごとの Mutex。append と読み取りはここで直列化される
//! ```
//!
//! プロセス再起動で履歴はすべて失われます（永続化なし）。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use kairan_shared::time::{Clock, SystemClock};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    CatchUp, DEFAULT_HISTORY_CAPACITY, Message, MessageId, MessageText, RepositoryError,
    RoomHistory, RoomName, RoomRepository, SenderName, Sequence, Timestamp,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// ルームごとの履歴
    rooms: RwLock<HashMap<RoomName, Arc<Mutex<RoomHistory>>>>,
    /// 1 ルームあたりの保持件数
    capacity: usize,
    /// メッセージのタイムスタンプ取得用
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// 時計を差し替えて作成（テスト用）
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            capacity,
            clock,
        }
    }

    /// 既存ルームの履歴を取得
    async fn get(&self, room: &RoomName) -> Option<Arc<Mutex<RoomHistory>>> {
        self.rooms.read().await.get(room).cloned()
    }

    /// ルームの履歴を取得、存在しなければ作成
    async fn get_or_create(&self, room: &RoomName) -> Arc<Mutex<RoomHistory>> {
        if let Some(history) = self.get(room).await {
            return history;
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.clone())
            .or_insert_with(|| {
                tracing::debug!("Room '{}' created", room);
                Arc::new(Mutex::new(RoomHistory::with_capacity(
                    room.clone(),
                    self.capacity,
                )))
            })
            .clone()
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn append(
        &self,
        room: &RoomName,
        sender: SenderName,
        text: MessageText,
    ) -> Result<Message, RepositoryError> {
        let history = self.get_or_create(room).await;
        let mut history = history.lock().await;
        let timestamp = Timestamp::new(self.clock.now_millis());
        Ok(history.append(MessageId::generate(), sender, text, timestamp))
    }

    async fn recent(&self, room: &RoomName, limit: usize) -> Vec<Message> {
        let Some(history) = self.get(room).await else {
            return Vec::new();
        };
        let history = history.lock().await;
        history.recent(limit)
    }

    async fn after(&self, room: &RoomName, last_sequence: Sequence) -> Vec<Message> {
        let Some(history) = self.get(room).await else {
            return Vec::new();
        };
        let history = history.lock().await;
        history.after(last_sequence)
    }

    async fn catch_up(&self, room: &RoomName, last_sequence: Sequence) -> CatchUp {
        match self.get(room).await {
            Some(history) => {
                let history = history.lock().await;
                CatchUp {
                    messages: history.after(last_sequence),
                    head: history.head(),
                }
            }
            None => CatchUp {
                messages: Vec::new(),
                head: Sequence::ZERO,
            },
        }
    }

    async fn resolve_message_id(&self, room: &RoomName, id: &MessageId) -> Option<Sequence> {
        let history = self.get(room).await?;
        let history = history.lock().await;
        history.find_sequence(id)
    }

    async fn room_names(&self) -> Vec<RoomName> {
        let mut names: Vec<RoomName> = self.rooms.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

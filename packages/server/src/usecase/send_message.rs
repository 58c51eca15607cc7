//! UseCase: メッセージ送信処理（Broadcast Dispatcher）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 入力検証、履歴への追加、待機中セッションへのファンアウト、統計の更新
//!
//! ### なぜこのテストが必要か
//! - 検証エラー時に状態が一切変更されないことを保証
//! - 送信前から待機しているセッションに、ちょうど 1 回ずつ届くことを保証
//! - 同一ルームへの並行送信で、各 Mailbox が シーケンス順に受け取ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中セッションへのファンアウト
//! - 異常系：空の sender / text、不正な room、Repository の失敗
//! - エッジケース：待機中セッションなし、受信側が閉じた Mailbox

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use tokio::sync::Mutex;

use crate::domain::{
    Message, MessageText, RoomName, RoomRepository, SenderName, SessionRegistry, StatsRecorder,
};

use super::error::SendMessageError;

/// ルームごとの送信レーン
///
/// append とファンアウトを同じレーン内で行うことで、
/// 各 Mailbox にはシーケンス順にメッセージが積まれる。
#[derive(Default)]
struct SendLanes {
    lanes: StdMutex<HashMap<RoomName, Arc<Mutex<()>>>>,
}

impl SendLanes {
    fn lane(&self, room: &RoomName) -> Arc<Mutex<()>> {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(room.clone())
            .or_default()
            .clone()
    }
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（ルーム履歴の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// SessionRegistry（待機中セッションの抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// StatsRecorder（利用統計の抽象化）
    stats: Arc<dyn StatsRecorder>,
    lanes: SendLanes,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        Self {
            repository,
            registry,
            stats,
            lanes: SendLanes::default(),
        }
    }

    /// メッセージ送信を実行
    ///
    /// 待機中の受信者が読み取るのを待たずに返る。
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者名（前後の空白は除去される）
    /// * `text` - メッセージ本文（前後の空白は除去される）
    /// * `room` - 送信先ルーム（`None` の場合 "general"）
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - ID・シーケンス番号・タイムスタンプが確定したメッセージ
    /// * `Err(SendMessageError)` - 検証エラー、または履歴への追加失敗
    pub async fn execute(
        &self,
        sender: String,
        text: String,
        room: Option<String>,
    ) -> Result<Message, SendMessageError> {
        // 1. 入力検証（状態を変更する前に行う）
        let sender = SenderName::new(sender)?;
        let text = MessageText::new(text)?;
        let room = RoomName::or_default(room)?;

        let lane = self.lanes.lane(&room);
        let message = {
            let _serialized = lane.lock().await;

            // 2. 履歴に追加してシーケンス番号を確定
            let message = self.repository.append(&room, sender, text).await?;

            // 3. 待機中セッションへファンアウト
            let delivered = self.fan_out(&message);

            tracing::info!(
                room = %message.room,
                sequence = %message.sequence,
                sender = %message.sender.as_str(),
                delivered,
                "message broadcast"
            );
            message
        };

        // 4. 統計を更新
        self.stats.record_message(&message.room);

        Ok(message)
    }

    /// ルームの有効な Mailbox すべてにコピーを積み、届いた数を返す
    fn fan_out(&self, message: &Message) -> usize {
        let mut delivered = 0;
        for mailbox in self.registry.active_sessions(&message.room) {
            // 受信側が直前に終了していても送信は失敗扱いにしない
            match mailbox.push(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!("Skipping mailbox in room '{}': {}", message.room, e),
            }
        }
        delivered
    }
}

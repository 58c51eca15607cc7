//! UseCase: ロングポーリング（Wait Coordinator）
//!
//! 1 回の poll 呼び出しの状態遷移：
//!
//! ```text
//! INIT → CATCHUP_CHECK ─┬─ (未読あり) ───────────────→ RETURN_IMMEDIATE
//!                       └─ (未読なし) → REGISTERED ─┬─ WOKEN → DRAIN → RETURN
//!                                                   └─ TIMED_OUT ───→ RETURN
//! ```
//!
//! REGISTERED に入った後は、成功・タイムアウト・呼び出し側のキャンセルの
//! いずれでも `RegistrationGuard` の `Drop` で登録解除される。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PollMessagesUseCase::execute() メソッド
//! - キャッチアップ判定、待機、起床時のまとめ取り、タイムアウト、登録解除
//!
//! ### なぜこのテストが必要か
//! - 待機中の poll は他の poll / send を一切ブロックしてはならない
//! - どの終了経路でもセッションが Registry に残ってはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中に送信されたメッセージで起床
//! - タイムアウト：何も送信されない
//! - キャッチアップ：古いマーカーでの即時応答、最新マーカーでの待機
//! - キャンセル：待機中に呼び出し側が切断

use std::{sync::Arc, time::Duration};

use kairan_shared::time::get_epoch_millis;
use tokio::time::Instant;

use crate::domain::{
    ClientId, LastSeen, Message, RegistrationGuard, RoomName, RoomRepository, Sequence,
    SessionRegistry, Timestamp, WaitingSession, mailbox,
};

use super::error::PollError;

/// poll の待機時間に関する設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// 待機時間の下限
    pub min_timeout: Duration,
    /// 待機時間の上限
    pub max_timeout: Duration,
    /// 待機時間が指定されなかった場合の値
    pub default_timeout: Duration,
    /// マーカーなしの poll に即時返す直近メッセージ数（0 で無効）
    pub initial_backlog: usize,
}

impl PollConfig {
    /// 設定を作成
    ///
    /// 下限と上限が逆転している場合は入れ替え、デフォルト値は範囲内に収める。
    pub fn new(
        min_timeout: Duration,
        max_timeout: Duration,
        default_timeout: Duration,
        initial_backlog: usize,
    ) -> Self {
        let (min_timeout, max_timeout) = if min_timeout <= max_timeout {
            (min_timeout, max_timeout)
        } else {
            (max_timeout, min_timeout)
        };
        Self {
            min_timeout,
            max_timeout,
            default_timeout: default_timeout.clamp(min_timeout, max_timeout),
            initial_backlog,
        }
    }

    /// 要求された待機時間を範囲内に丸める（範囲外でもエラーにはしない）
    pub fn clamp(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_timeout)
            .clamp(self.min_timeout, self.max_timeout)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(5),
            Duration::from_secs(60),
            Duration::from_secs(25),
            0,
        )
    }
}

/// poll の入力
#[derive(Debug, Clone, Default)]
pub struct PollRequest {
    pub client_id: String,
    pub room: Option<String>,
    /// シーケンス番号またはメッセージ ID
    pub last_seen: Option<String>,
    pub timeout: Option<Duration>,
}

/// poll の終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// 待機せずに未読を返した
    CaughtUp,
    /// 待機中に配信されたメッセージで起床した
    Delivered,
    /// 何も届かずにタイムアウトした
    TimedOut,
    /// 待機中にセッションが Registry から外された
    Evicted,
}

/// poll の結果
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    /// シーケンス昇順
    pub messages: Vec<Message>,
    pub outcome: PollOutcome,
}

impl PollResult {
    fn caught_up(messages: Vec<Message>) -> Self {
        Self {
            messages,
            outcome: PollOutcome::CaughtUp,
        }
    }

    fn delivered(messages: Vec<Message>) -> Self {
        Self {
            messages,
            outcome: PollOutcome::Delivered,
        }
    }

    fn empty(outcome: PollOutcome) -> Self {
        Self {
            messages: Vec::new(),
            outcome,
        }
    }

    /// タイムアウト相当の結果か
    pub fn timed_out(&self) -> bool {
        matches!(self.outcome, PollOutcome::TimedOut | PollOutcome::Evicted)
    }
}

/// キャッチアップ判定の結果
enum CatchUpCheck {
    /// すぐに返せる未読がある
    Ready(Vec<Message>),
    /// 待機が必要。`head` より新しいメッセージだけが配信対象
    Wait { head: Sequence },
}

/// ロングポーリングのユースケース
pub struct PollMessagesUseCase {
    /// Repository（ルーム履歴の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// SessionRegistry（待機中セッションの抽象化）
    registry: Arc<dyn SessionRegistry>,
    config: PollConfig,
}

impl PollMessagesUseCase {
    /// 新しい PollMessagesUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        config: PollConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            config,
        }
    }

    /// poll を実行
    ///
    /// 未読があれば即座に返し、なければ新しいメッセージが届くか
    /// タイムアウトするまで呼び出し元だけを待機させる。
    ///
    /// # Returns
    ///
    /// * `Ok(PollResult)` - 未読・配信・タイムアウトのいずれか
    /// * `Err(PollError)` - client_id / room が不正
    pub async fn execute(&self, request: PollRequest) -> Result<PollResult, PollError> {
        let client_id = ClientId::new(request.client_id)?;
        let room = RoomName::or_default(request.room)?;

        let timeout = self.config.clamp(request.timeout);
        if request.timeout.is_some_and(|requested| requested != timeout) {
            tracing::debug!(
                client_id = %client_id,
                requested = ?request.timeout,
                clamped = ?timeout,
                "poll timeout clamped"
            );
        }
        let deadline = Instant::now() + timeout;

        // 1. CATCHUP_CHECK
        let last_seen = LastSeen::parse(request.last_seen.as_deref());
        let head = match self.check_catch_up(&room, last_seen).await {
            CatchUpCheck::Ready(messages) => return Ok(PollResult::caught_up(messages)),
            CatchUpCheck::Wait { head } => head,
        };

        // 2. REGISTER
        let (tx, mut rx) = mailbox();
        let session = WaitingSession::new(
            client_id.clone(),
            room.clone(),
            tx,
            Timestamp::new(get_epoch_millis()),
        );
        let guard = RegistrationGuard::register(self.registry.clone(), session);

        // a send that landed between the catch-up check and registration never
        // reached this mailbox
        let missed = self.repository.after(&room, head).await;
        if !missed.is_empty() {
            return Ok(PollResult::caught_up(missed));
        }

        // 3. SUSPEND
        loop {
            match tokio::time::timeout_at(deadline, rx.recv_batch()).await {
                // 4. WOKEN → DRAIN
                Ok(Some(batch)) => {
                    let mut messages: Vec<Message> =
                        batch.into_iter().filter(|m| m.sequence > head).collect();
                    if messages.is_empty() {
                        continue;
                    }
                    messages.sort_by_key(|m| m.sequence);
                    return Ok(PollResult::delivered(messages));
                }
                // 5. TIMED_OUT
                Err(_) => return Ok(PollResult::empty(PollOutcome::TimedOut)),
                Ok(None) => {
                    tracing::warn!(
                        client_id = %client_id,
                        session_id = %guard.handle().session_id,
                        room = %room,
                        "mailbox closed while waiting, answering as timeout"
                    );
                    return Ok(PollResult::empty(PollOutcome::Evicted));
                }
            }
        }
        // 6. guard dropped here on every path
    }

    /// マーカーから未読を判定する
    ///
    /// - シーケンス番号: それより新しい保持中メッセージ（保持範囲より古ければ全件）
    /// - メッセージ ID: 保持中なら同上、見つからなければ未読なし
    /// - マーカーなし: `initial_backlog` 件まで直近のメッセージ
    /// - 不正なマーカー: 未読なし
    async fn check_catch_up(&self, room: &RoomName, last_seen: LastSeen) -> CatchUpCheck {
        let since = match last_seen {
            LastSeen::Sequence(sequence) => sequence,
            LastSeen::MessageId(id) => match self.repository.resolve_message_id(room, &id).await {
                Some(sequence) => sequence,
                None => {
                    tracing::debug!("Marker '{}' not in room '{}' history", id, room);
                    Sequence::MAX
                }
            },
            LastSeen::Nothing if self.config.initial_backlog > 0 => Sequence::ZERO,
            LastSeen::Nothing | LastSeen::Malformed => Sequence::MAX,
        };

        let catch_up = self.repository.catch_up(room, since).await;
        if catch_up.messages.is_empty() {
            return CatchUpCheck::Wait {
                head: catch_up.head,
            };
        }

        let mut messages = catch_up.messages;
        if matches!(last_seen, LastSeen::Nothing) {
            let skip = messages.len().saturating_sub(self.config.initial_backlog);
            messages.drain(..skip);
        }
        CatchUpCheck::Ready(messages)
    }
}

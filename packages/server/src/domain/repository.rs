//! Repository trait 定義
//!
//! ドメイン層が必要とするルーム履歴へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Message, MessageId, MessageText, RepositoryError, RoomName, SenderName, Sequence,
};

/// `catch_up` の結果
///
/// `head` は `messages` と同じロック区間で読んだ最新シーケンス番号。
#[derive(Debug, Clone, PartialEq)]
pub struct CatchUp {
    pub messages: Vec<Message>,
    pub head: Sequence,
}

/// Room Repository trait
///
/// ルームごとの有界なメッセージ履歴（Room State）へのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// 同一ルームへの `append` は直列化され、同じシーケンス番号が二度振られることはない。
/// 読み取り系は `append` と並行に実行でき、構築途中のメッセージを観測しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 次のシーケンス番号を割り当ててメッセージを追加
    async fn append(
        &self,
        room: &RoomName,
        sender: SenderName,
        text: MessageText,
    ) -> Result<Message, RepositoryError>;

    /// 最新 `limit` 件をシーケンス昇順で取得
    async fn recent(&self, room: &RoomName, limit: usize) -> Vec<Message>;

    /// `last_sequence` より新しい保持中のメッセージを昇順で取得
    async fn after(&self, room: &RoomName, last_sequence: Sequence) -> Vec<Message>;

    /// `after` と最新シーケンス番号を一度に取得
    async fn catch_up(&self, room: &RoomName, last_sequence: Sequence) -> CatchUp;

    /// 保持中のメッセージ ID からシーケンス番号を解決
    async fn resolve_message_id(&self, room: &RoomName, id: &MessageId) -> Option<Sequence>;

    /// 履歴を持つルーム名の一覧
    async fn room_names(&self) -> Vec<RoomName>;
}

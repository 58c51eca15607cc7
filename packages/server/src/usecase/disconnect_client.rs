//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 指定クライアントの待機中セッションを Registry から外す処理
//!
//! ### なぜこのテストが必要か
//! - 切断されたクライアントの poll がタイムアウト扱いで即座に終わることを保証
//! - 他のクライアントのセッションに影響しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中セッションを持つクライアントの切断
//! - エッジケース：待機中セッションのないクライアントの切断（0 件）
//! - 異常系：空の client_id
//! - サーバー停止：全クライアントの一括切断

use std::sync::Arc;

use crate::domain::{ClientId, SessionRegistry};

use super::error::DisconnectClientError;

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// SessionRegistry（待機中セッションの抽象化）
    registry: Arc<dyn SessionRegistry>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// クライアント切断を実行
    ///
    /// 外されたセッションの Mailbox は閉じられ、待機中の poll は
    /// タイムアウト相当の結果で返る。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 外したセッション数（0 もあり得る）
    /// * `Err(DisconnectClientError)` - client_id が不正
    pub fn execute(&self, client_id: String) -> Result<usize, DisconnectClientError> {
        let client_id = ClientId::try_from(client_id)?;
        let evicted = self.registry.deregister_client(&client_id);

        tracing::info!(client_id = %client_id, sessions = evicted, "client disconnected");
        Ok(evicted)
    }

    /// 全クライアントの待機中セッションを外す（サーバー停止時）
    ///
    /// 待機中の poll はタイムアウト相当の結果ですぐに返る。
    pub fn disconnect_all(&self) -> usize {
        let evicted = self.registry.deregister_all();

        tracing::info!(sessions = evicted, "all waiting sessions released");
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MailboxReceiver, RoomName, Timestamp, ValueObjectError, WaitingSession, mailbox},
        infrastructure::registry::InMemorySessionRegistry,
    };

    fn register(registry: &InMemorySessionRegistry, client_id: &str) -> MailboxReceiver {
        let (tx, rx) = mailbox();
        registry.register(WaitingSession::new(
            ClientId::new(client_id.to_string()).unwrap(),
            RoomName::default(),
            tx,
            Timestamp::new(0),
        ));
        rx
    }

    #[tokio::test]
    async fn test_disconnect_client_evicts_only_that_client() {
        // テスト項目: 指定クライアントのセッションだけが外され、その Mailbox は閉じる
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let mut alice_first = register(&registry, "alice");
        let _alice_second = register(&registry, "alice");
        let _bob = register(&registry, "bob");
        let usecase = DisconnectClientUseCase::new(registry.clone());

        // when (操作):
        let result = usecase.execute("alice".to_string());

        // then (期待する結果):
        assert_eq!(result, Ok(2));
        assert_eq!(registry.count(), 1);
        assert_eq!(alice_first.recv_batch().await, None);
    }

    #[test]
    fn test_disconnect_client_without_sessions() {
        // テスト項目: 待機中セッションのないクライアントの切断は 0 件で成功する
        // given (前提条件):
        let usecase = DisconnectClientUseCase::new(Arc::new(InMemorySessionRegistry::new()));

        // when (操作):
        let result = usecase.execute("ghost".to_string());

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }

    #[test]
    fn test_disconnect_client_rejects_empty_id() {
        // テスト項目: 空の client_id は検証エラーになる
        // given (前提条件):
        let usecase = DisconnectClientUseCase::new(Arc::new(InMemorySessionRegistry::new()));

        // when (操作):
        let result = usecase.execute("   ".to_string());

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DisconnectClientError::Validation(ValueObjectError::ClientIdEmpty))
        );
    }

    #[tokio::test]
    async fn test_disconnect_all_releases_every_client() {
        // テスト項目: 一括切断で全クライアントのセッションが外され、Mailbox が閉じる
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let mut alice = register(&registry, "alice");
        let mut bob = register(&registry, "bob");
        let usecase = DisconnectClientUseCase::new(registry.clone());

        // when (操作):
        let evicted = usecase.disconnect_all();

        // then (期待する結果):
        assert_eq!(evicted, 2);
        assert_eq!(registry.count(), 0);
        assert_eq!(alice.recv_batch().await, None);
        assert_eq!(bob.recv_batch().await, None);
    }
}

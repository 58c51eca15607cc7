//! インメモリ Session Registry 実装
//!
//! ## 責務
//!
//! - 待機中セッション（poll 呼び出し 1 回分）の Mailbox をルームごとに保持
//! - ファンアウト時に、ルームの Mailbox 一覧のスナップショットを提供
//!
//! ## 設計ノート
//!
//! 登録解除は `RegistrationGuard` の `Drop` から呼ばれるため、
//! `tokio::sync::Mutex` ではなく `std::sync::Mutex` を使用します。
//! ロックを保持したまま `.await` することはありません。

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::domain::{
    ClientId, MailboxSender, RoomName, SessionHandle, SessionId, SessionRegistry, WaitingSession,
};

type Sessions = HashMap<RoomName, HashMap<SessionId, WaitingSession>>;

/// インメモリ Session Registry 実装
#[derive(Default)]
pub struct InMemorySessionRegistry {
    /// Key: ルーム名, Value: セッション ID → 待機中セッション
    sessions: Mutex<Sessions>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        // a panicking holder cannot leave the map half-updated
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn register(&self, session: WaitingSession) -> SessionHandle {
        let handle = SessionHandle {
            session_id: session.session_id,
            room: session.room.clone(),
        };

        tracing::debug!(
            session_id = %session.session_id,
            client_id = %session.client_id,
            room = %session.room,
            "session registered"
        );

        self.lock()
            .entry(session.room.clone())
            .or_default()
            .insert(session.session_id, session);

        handle
    }

    fn deregister(&self, handle: &SessionHandle) -> bool {
        let mut sessions = self.lock();
        let Some(room_sessions) = sessions.get_mut(&handle.room) else {
            return false;
        };

        let removed = room_sessions.remove(&handle.session_id).is_some();
        if room_sessions.is_empty() {
            sessions.remove(&handle.room);
        }
        removed
    }

    fn active_sessions(&self, room: &RoomName) -> Vec<MailboxSender> {
        self.lock()
            .get(room)
            .map(|room_sessions| {
                room_sessions
                    .values()
                    .map(|session| session.mailbox.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn count(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    fn count_in(&self, room: &RoomName) -> usize {
        self.lock().get(room).map_or(0, HashMap::len)
    }

    fn deregister_client(&self, client_id: &ClientId) -> usize {
        let mut sessions = self.lock();
        let mut removed = 0;

        for room_sessions in sessions.values_mut() {
            let before = room_sessions.len();
            room_sessions.retain(|_, session| &session.client_id != client_id);
            removed += before - room_sessions.len();
        }
        sessions.retain(|_, room_sessions| !room_sessions.is_empty());

        if removed > 0 {
            tracing::debug!(
                client_id = %client_id,
                sessions = removed,
                "client sessions evicted"
            );
        }
        removed
    }

    fn deregister_all(&self) -> usize {
        let removed: usize = {
            let mut sessions = self.lock();
            let removed = sessions.values().map(HashMap::len).sum();
            sessions.clear();
            removed
        };

        if removed > 0 {
            tracing::debug!(sessions = removed, "all sessions evicted");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, mailbox};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 登録・登録解除・スナップショット取得・件数
    // - 登録解除の冪等性
    // - 同じ client_id の複数セッションが独立して共存すること
    //
    // 【なぜこのテストが必要か】
    // - 登録解除漏れはセッションのリークに直結する
    // - ファンアウト対象の正しさはこのスナップショットに依存している
    // ========================================

    fn session(client_id: &str, room: &str) -> (WaitingSession, crate::domain::MailboxReceiver) {
        let (tx, rx) = mailbox();
        let session = WaitingSession::new(
            ClientId::new(client_id.to_string()).unwrap(),
            RoomName::new(room.to_string()).unwrap(),
            tx,
            Timestamp::new(0),
        );
        (session, rx)
    }

    fn room(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    #[test]
    fn test_register_and_count() {
        // テスト項目: 登録したセッションがルームごとに数えられる
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (alice, _rx1) = session("alice", "general");
        let (bob, _rx2) = session("bob", "general");
        let (carol, _rx3) = session("carol", "dev");

        // when (操作):
        registry.register(alice);
        registry.register(bob);
        registry.register(carol);

        // then (期待する結果):
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.count_in(&room("general")), 2);
        assert_eq!(registry.count_in(&room("dev")), 1);
        assert_eq!(registry.active_sessions(&room("general")).len(), 2);
        assert!(registry.active_sessions(&room("random")).is_empty());
    }

    #[test]
    fn test_deregister_is_idempotent() {
        // テスト項目: 同じハンドルで二度登録解除してもエラーにならない
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (alice, _rx) = session("alice", "general");
        let handle = registry.register(alice);

        // when (操作):
        let first = registry.deregister(&handle);
        let second = registry.deregister(&handle);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_same_client_sessions_are_independent() {
        // テスト項目: 同じ client_id の複数セッションはそれぞれ独立して登録・解除される
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (first, _rx1) = session("alice", "general");
        let (second, _rx2) = session("alice", "general");
        let first_handle = registry.register(first);
        registry.register(second);

        // when (操作):
        registry.deregister(&first_handle);

        // then (期待する結果):
        assert_eq!(registry.count_in(&room("general")), 1);
    }

    #[tokio::test]
    async fn test_snapshot_senders_deliver_to_mailbox() {
        // テスト項目: スナップショットの送信側から Mailbox にメッセージが届く
        // given (前提条件):
        use crate::domain::{MessageId, MessageText, RoomHistory, SenderName};
        let registry = InMemorySessionRegistry::new();
        let (alice, mut rx) = session("alice", "general");
        registry.register(alice);
        let message = RoomHistory::new(room("general")).append(
            MessageId::generate(),
            SenderName::new("bob".to_string()).unwrap(),
            MessageText::new("hello".to_string()).unwrap(),
            Timestamp::new(0),
        );

        // when (操作):
        for tx in registry.active_sessions(&room("general")) {
            tx.push(message.clone()).unwrap();
        }

        // then (期待する結果):
        assert_eq!(rx.recv_batch().await, Some(vec![message]));
    }

    #[tokio::test]
    async fn test_deregister_client_closes_mailboxes() {
        // テスト項目: クライアント単位の登録解除で、そのクライアントの全セッションが閉じられる
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (general, mut general_rx) = session("alice", "general");
        let (dev, _dev_rx) = session("alice", "dev");
        let (bob, _bob_rx) = session("bob", "general");
        registry.register(general);
        registry.register(dev);
        registry.register(bob);

        // when (操作):
        let removed = registry.deregister_client(&ClientId::new("alice".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(removed, 2);
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.count_in(&room("dev")), 0);
        // the registry held the only sender, so the waiting side observes closure
        assert_eq!(general_rx.recv_batch().await, None);
    }

    #[tokio::test]
    async fn test_deregister_all_closes_every_mailbox() {
        // テスト項目: 全セッションの登録解除で、すべてのルームの Mailbox が閉じられる
        // given (前提条件):
        let registry = InMemorySessionRegistry::new();
        let (general, mut general_rx) = session("alice", "general");
        let (dev, mut dev_rx) = session("bob", "dev");
        registry.register(general);
        registry.register(dev);

        // when (操作):
        let removed = registry.deregister_all();

        // then (期待する結果):
        assert_eq!(removed, 2);
        assert_eq!(registry.count(), 0);
        assert_eq!(general_rx.recv_batch().await, None);
        assert_eq!(dev_rx.recv_batch().await, None);
        assert_eq!(registry.deregister_all(), 0);
    }
}

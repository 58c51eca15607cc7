//! Session registry trait and its scoped registration guard.

use std::sync::Arc;

use super::{
    mailbox::{MailboxSender, SessionHandle, WaitingSession},
    value_object::{ClientId, RoomName},
};

/// Session Registry trait
///
/// ルームごとに、待機中のセッションとその Mailbox を管理する。
/// `Drop` からも登録解除できるよう、すべてのメソッドは同期的。
pub trait SessionRegistry: Send + Sync {
    /// セッションを登録し、登録解除用のハンドルを返す
    fn register(&self, session: WaitingSession) -> SessionHandle;

    /// 指定セッションを登録解除（冪等）
    ///
    /// 実際に削除した場合 `true` を返す。
    fn deregister(&self, handle: &SessionHandle) -> bool;

    /// ファンアウト用に、ルームの有効な Mailbox のスナップショットを取得
    fn active_sessions(&self, room: &RoomName) -> Vec<MailboxSender>;

    /// 全ルームの待機中セッション数
    fn count(&self) -> usize;

    /// 指定ルームの待機中セッション数
    fn count_in(&self, room: &RoomName) -> usize;

    /// クライアントの待機中セッションをすべて登録解除し、その件数を返す
    ///
    /// 登録解除された Mailbox は閉じられ、待機中の poll は起床する。
    fn deregister_client(&self, client_id: &ClientId) -> usize;

    /// 全ルームの待機中セッションを登録解除し、その件数を返す
    ///
    /// サーバー停止時に、待機中の poll をすべて即座に起床させるために使う。
    fn deregister_all(&self) -> usize;
}

/// RAII guard that deregisters its session on drop.
///
/// Dropping happens on every exit path of the owning poll call, including
/// when the call's future is cancelled mid-wait.
pub struct RegistrationGuard {
    registry: Arc<dyn SessionRegistry>,
    handle: SessionHandle,
}

impl RegistrationGuard {
    /// Register `session` and arm the guard
    pub fn register(registry: Arc<dyn SessionRegistry>, session: WaitingSession) -> Self {
        let handle = registry.register(session);
        Self { registry, handle }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        if self.registry.deregister(&self.handle) {
            tracing::debug!(
                session_id = %self.handle.session_id,
                room = %self.handle.room,
                "session deregistered"
            );
        }
    }
}

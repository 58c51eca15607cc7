//! Usage statistics.

use super::value_object::{RoomName, Timestamp};

/// Point-in-time view of the usage counters.
///
/// Fields are read individually; no cross-field atomicity.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub active_clients: usize,
    pub total_messages: u64,
    pub rooms: Vec<RoomName>,
    pub timestamp: Timestamp,
}

/// Stats Recorder trait
///
/// 送信の度に Dispatcher から呼ばれ、累積メッセージ数と送信先ルームを記録する。
pub trait StatsRecorder: Send + Sync {
    /// 送信成功 1 件を記録
    fn record_message(&self, room: &RoomName);

    /// 累積メッセージ数
    fn total_messages(&self) -> u64;

    /// これまでに送信されたことのあるルーム名（昇順）
    fn rooms(&self) -> Vec<RoomName>;
}

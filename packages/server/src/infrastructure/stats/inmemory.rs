//! Atomic counters plus a set of room names.

use std::{
    collections::BTreeSet,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::domain::{RoomName, StatsRecorder};

#[derive(Default)]
pub struct InMemoryStatsRecorder {
    total_messages: AtomicU64,
    rooms: Mutex<BTreeSet<RoomName>>,
}

impl InMemoryStatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsRecorder for InMemoryStatsRecorder {
    fn record_message(&self, room: &RoomName) {
        self.total_messages.fetch_add(1, Ordering::Relaxed);

        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        if !rooms.contains(room) {
            rooms.insert(room.clone());
        }
    }

    fn total_messages(&self) -> u64 {
        self.total_messages.load(Ordering::Relaxed)
    }

    fn rooms(&self) -> Vec<RoomName> {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_message_counts_and_dedupes_rooms() {
        // テスト項目: メッセージ数は累積し、ルーム名は重複なく昇順で記録される
        // given (前提条件):
        let stats = InMemoryStatsRecorder::new();
        let general = RoomName::new("general".to_string()).unwrap();
        let dev = RoomName::new("dev".to_string()).unwrap();

        // when (操作):
        stats.record_message(&general);
        stats.record_message(&dev);
        stats.record_message(&general);

        // then (期待する結果):
        assert_eq!(stats.total_messages(), 3);
        assert_eq!(stats.rooms(), vec![dev, general]);
    }
}

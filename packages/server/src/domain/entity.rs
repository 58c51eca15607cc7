//! Entities: the immutable `Message` and the per-room `RoomHistory`.

use std::collections::VecDeque;

use serde::Serialize;

use super::value_object::{MessageId, MessageText, RoomName, SenderName, Sequence, Timestamp};

/// Default number of messages retained per room
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// A chat message. Built once by [`RoomHistory::append`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub room: RoomName,
    pub sender: SenderName,
    pub text: MessageText,
    pub sequence: Sequence,
    pub timestamp: Timestamp,
}

/// Bounded, sequence-ordered history of one room.
///
/// Invariants:
/// - sequences are unique and strictly increasing in append order
/// - `messages` is sorted by sequence ascending
/// - `messages.len() <= capacity`
#[derive(Debug, Clone)]
pub struct RoomHistory {
    pub name: RoomName,
    messages: VecDeque<Message>,
    next_sequence: Sequence,
    capacity: usize,
}

impl RoomHistory {
    pub fn new(name: RoomName) -> Self {
        Self::with_capacity(name, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history retaining at most `capacity` messages (minimum 1)
    pub fn with_capacity(name: RoomName, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            messages: VecDeque::with_capacity(capacity),
            next_sequence: Sequence::new(1),
            capacity,
        }
    }

    /// Append a new message, evicting the oldest entry when over capacity
    pub fn append(
        &mut self,
        id: MessageId,
        sender: SenderName,
        text: MessageText,
        timestamp: Timestamp,
    ) -> Message {
        let sequence = self.next_sequence;
        self.next_sequence = sequence.next();

        let message = Message {
            id,
            room: self.name.clone(),
            sender,
            text,
            sequence,
            timestamp,
        };

        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }

        message
    }

    /// Up to `limit` most recent messages, ascending by sequence
    pub fn recent(&self, limit: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(limit);
        self.messages.iter().skip(skip).cloned().collect()
    }

    /// Retained messages with a sequence strictly greater than `last_sequence`
    ///
    /// A marker older than the oldest retained entry yields the whole history.
    pub fn after(&self, last_sequence: Sequence) -> Vec<Message> {
        // history is sorted, so everything past the partition point qualifies
        let start = self
            .messages
            .partition_point(|m| m.sequence <= last_sequence);
        self.messages.range(start..).cloned().collect()
    }

    /// Latest assigned sequence, `Sequence::ZERO` for an empty room
    pub fn head(&self) -> Sequence {
        Sequence::new(self.next_sequence.value() - 1)
    }

    /// Sequence of a retained message, if it is still in the history
    pub fn find_sequence(&self, id: &MessageId) -> Option<Sequence> {
        self.messages
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    fn append_text(history: &mut RoomHistory, text: &str) -> Message {
        history.append(
            MessageId::generate(),
            SenderName::new("alice".to_string()).unwrap(),
            MessageText::new(text.to_string()).unwrap(),
            Timestamp::new(1_000),
        )
    }

    fn sequences(messages: &[Message]) -> Vec<u64> {
        messages.iter().map(|m| m.sequence.value()).collect()
    }

    #[test]
    fn test_append_assigns_increasing_sequences() {
        // テスト項目: 追加したメッセージに 1 から連番のシーケンス番号が振られる
        // given (前提条件):
        let mut history = RoomHistory::new(room("general"));

        // when (操作):
        let first = append_text(&mut history, "one");
        let second = append_text(&mut history, "two");

        // then (期待する結果):
        assert_eq!(first.sequence, Sequence::new(1));
        assert_eq!(second.sequence, Sequence::new(2));
        assert_eq!(first.room.as_str(), "general");
        assert_eq!(history.head(), Sequence::new(2));
    }

    #[test]
    fn test_append_evicts_oldest_over_capacity() {
        // テスト項目: 容量を超えると最も古いメッセージから削除される
        // given (前提条件):
        let mut history = RoomHistory::with_capacity(room("general"), 3);

        // when (操作):
        for i in 0..5 {
            append_text(&mut history, &format!("message {}", i));
        }

        // then (期待する結果):
        assert_eq!(sequences(&history.recent(10)), vec![3, 4, 5]);
    }

    #[test]
    fn test_history_holds_min_of_sends_and_capacity_without_gaps() {
        // テスト項目: N 件送信後の履歴は min(N, 容量) 件で、昇順かつ欠番なし
        // given (前提条件):
        let capacity = 100;

        for n in [0usize, 1, 99, 100, 101, 250] {
            let mut history = RoomHistory::with_capacity(room("general"), capacity);

            // when (操作):
            for i in 0..n {
                append_text(&mut history, &format!("m{}", i));
            }

            // then (期待する結果):
            let all = history.recent(capacity);
            assert_eq!(all.len(), n.min(capacity));
            assert!(all.windows(2).all(|w| w[1].sequence.value() == w[0].sequence.value() + 1));
            if let Some(last) = all.last() {
                assert_eq!(last.sequence.value(), n as u64);
            }
        }
    }

    #[test]
    fn test_recent_returns_tail_ascending() {
        // テスト項目: recent は最新 limit 件を昇順で返す
        // given (前提条件):
        let mut history = RoomHistory::new(room("general"));
        for i in 0..10 {
            append_text(&mut history, &format!("m{}", i));
        }

        // when (操作):
        let recent = history.recent(3);

        // then (期待する結果):
        assert_eq!(sequences(&recent), vec![8, 9, 10]);
    }

    #[test]
    fn test_after_returns_strictly_newer_messages() {
        // テスト項目: after は指定シーケンスより新しいメッセージのみを返す
        // given (前提条件):
        let mut history = RoomHistory::new(room("general"));
        for i in 0..5 {
            append_text(&mut history, &format!("m{}", i));
        }

        // when (操作):
        let newer = history.after(Sequence::new(3));
        let none = history.after(Sequence::new(5));
        let beyond = history.after(Sequence::new(42));

        // then (期待する結果):
        assert_eq!(sequences(&newer), vec![4, 5]);
        assert!(none.is_empty());
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_after_older_than_retained_returns_everything() {
        // テスト項目: 保持範囲より古いシーケンスを指定すると保持中の全件が返る
        // given (前提条件):
        let mut history = RoomHistory::with_capacity(room("general"), 3);
        for i in 0..6 {
            append_text(&mut history, &format!("m{}", i));
        }

        // when (操作):
        let result = history.after(Sequence::new(1));

        // then (期待する結果):
        assert_eq!(sequences(&result), vec![4, 5, 6]);
    }

    #[test]
    fn test_find_sequence_only_for_retained_messages() {
        // テスト項目: 保持中のメッセージ ID のみシーケンスを引ける
        // given (前提条件):
        let mut history = RoomHistory::with_capacity(room("general"), 2);
        let evicted = append_text(&mut history, "old");
        append_text(&mut history, "mid");
        let latest = append_text(&mut history, "new");

        // when (操作):
        let found = history.find_sequence(&latest.id);
        let missing = history.find_sequence(&evicted.id);

        // then (期待する結果):
        assert_eq!(found, Some(Sequence::new(3)));
        assert_eq!(missing, None);
    }

    #[test]
    fn test_empty_history_head_is_zero() {
        // テスト項目: 空のルームの head は 0
        // given (前提条件):
        let history = RoomHistory::new(room("dev"));

        // when (操作):
        let head = history.head();

        // then (期待する結果):
        assert_eq!(head, Sequence::ZERO);
        assert!(history.recent(10).is_empty());
    }
}

//! Caller-supplied "last seen" markers.

use super::value_object::{MessageId, Sequence};

/// What a polling caller claims to have seen last.
///
/// A decimal integer is read as a room sequence number; a UUID is read as a
/// message id; anything else is malformed and means "no catch-up".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastSeen {
    /// No marker supplied
    Nothing,
    Sequence(Sequence),
    MessageId(MessageId),
    Malformed,
}

impl LastSeen {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::Nothing;
        };
        if raw.is_empty() {
            return Self::Nothing;
        }
        if let Ok(value) = raw.parse::<u64>() {
            return Self::Sequence(Sequence::new(value));
        }
        match MessageId::parse(raw) {
            Some(id) => Self::MessageId(id),
            None => Self::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_kinds() {
        // テスト項目: マーカー文字列が種類ごとに解釈される
        // given (前提条件):
        let id = MessageId::generate();
        let id_text = id.to_string();

        // when (操作):
        let nothing = LastSeen::parse(None);
        let blank = LastSeen::parse(Some("  "));
        let sequence = LastSeen::parse(Some("42"));
        let message_id = LastSeen::parse(Some(&id_text));
        let malformed = LastSeen::parse(Some("yesterday"));
        let negative = LastSeen::parse(Some("-1"));

        // then (期待する結果):
        assert_eq!(nothing, LastSeen::Nothing);
        assert_eq!(blank, LastSeen::Nothing);
        assert_eq!(sequence, LastSeen::Sequence(Sequence::new(42)));
        assert_eq!(message_id, LastSeen::MessageId(id));
        assert_eq!(malformed, LastSeen::Malformed);
        assert_eq!(negative, LastSeen::Malformed);
    }
}

//! Value objects.
//!
//! Every value object validates its input on construction, so a value that
//! exists is always well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Default room name used when a caller does not specify one
pub const DEFAULT_ROOM: &str = "general";

const MAX_CLIENT_ID_LEN: usize = 64;
const MAX_ROOM_NAME_LEN: usize = 64;
const MAX_SENDER_LEN: usize = 64;
const MAX_MESSAGE_TEXT_LEN: usize = 4000;

/// Trim the input and check length and character rules shared by the name types.
fn validate_name(
    value: &str,
    max: usize,
    field: &'static str,
    allow_inner_whitespace: bool,
) -> Result<String, NameRule> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NameRule::Empty);
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(NameRule::TooLong(len));
    }
    let forbidden = trimmed
        .chars()
        .any(|c| c.is_control() || (!allow_inner_whitespace && c.is_whitespace()));
    if forbidden {
        return Err(NameRule::Forbidden(field));
    }
    Ok(trimmed.to_string())
}

enum NameRule {
    Empty,
    TooLong(usize),
    Forbidden(&'static str),
}

/// Client identifier supplied by a polling caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_name(&value, MAX_CLIENT_ID_LEN, "client_id", true)
            .map(Self)
            .map_err(|rule| match rule {
                NameRule::Empty => ValueObjectError::ClientIdEmpty,
                NameRule::TooLong(actual) => ValueObjectError::ClientIdTooLong {
                    max: MAX_CLIENT_ID_LEN,
                    actual,
                },
                NameRule::Forbidden(field) => ValueObjectError::ForbiddenCharacters { field },
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room name, the scope of fan-out and history
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_name(&value, MAX_ROOM_NAME_LEN, "room", false)
            .map(Self)
            .map_err(|rule| match rule {
                NameRule::Empty => ValueObjectError::RoomNameEmpty,
                NameRule::TooLong(actual) => ValueObjectError::RoomNameTooLong {
                    max: MAX_ROOM_NAME_LEN,
                    actual,
                },
                NameRule::Forbidden(field) => ValueObjectError::ForbiddenCharacters { field },
            })
    }

    /// Build a room name from an optional caller input, falling back to [`DEFAULT_ROOM`]
    pub fn or_default(value: Option<String>) -> Result<Self, ValueObjectError> {
        match value {
            Some(value) => Self::new(value),
            None => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self(DEFAULT_ROOM.to_string())
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a message author
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderName(String);

impl SenderName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_name(&value, MAX_SENDER_LEN, "sender", true)
            .map(Self)
            .map_err(|rule| match rule {
                NameRule::Empty => ValueObjectError::SenderEmpty,
                NameRule::TooLong(actual) => ValueObjectError::SenderTooLong {
                    max: MAX_SENDER_LEN,
                    actual,
                },
                NameRule::Forbidden(field) => ValueObjectError::ForbiddenCharacters { field },
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Message body, stored trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_MESSAGE_TEXT_LEN {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MAX_MESSAGE_TEXT_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Number of history entries requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimit(usize);

impl HistoryLimit {
    pub const MIN: usize = 1;
    pub const MAX: usize = 100;
    pub const DEFAULT: usize = 20;

    pub fn new(value: i64) -> Result<Self, ValueObjectError> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            return Err(ValueObjectError::HistoryLimitOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: value,
            });
        }
        Ok(Self(value as usize))
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Globally unique message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its textual form, `None` when malformed
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-room message sequence number. The first message of a room is 1, so
/// `Sequence::ZERO` means "nothing seen yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sequence(u64);

impl Sequence {
    pub const ZERO: Sequence = Sequence(0);
    pub const MAX: Sequence = Sequence(u64::MAX);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Fractional seconds since the epoch, the wire representation
    pub fn as_epoch_secs(&self) -> f64 {
        kairan_shared::time::millis_to_epoch_secs(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_is_trimmed() {
        // テスト項目: ClientId は前後の空白が除去される
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let result = ClientId::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_client_id_rejects_blank() {
        // テスト項目: 空白のみの ClientId はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = ClientId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::ClientIdEmpty));
    }

    #[test]
    fn test_room_name_rejects_inner_whitespace() {
        // テスト項目: 空白を含むルーム名はエラーになる
        // given (前提条件):
        let raw = "dev room".to_string();

        // when (操作):
        let result = RoomName::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::ForbiddenCharacters { field: "room" })
        );
    }

    #[test]
    fn test_room_name_rejects_too_long() {
        // テスト項目: 65 文字のルーム名はエラーになる
        // given (前提条件):
        let raw = "r".repeat(65);

        // when (操作):
        let result = RoomName::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::RoomNameTooLong {
                max: 64,
                actual: 65
            })
        );
    }

    #[test]
    fn test_room_name_defaults_to_general() {
        // テスト項目: ルーム名が指定されない場合 "general" になる
        // given (前提条件):
        let raw = None;

        // when (操作):
        let result = RoomName::or_default(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), DEFAULT_ROOM);
    }

    #[test]
    fn test_sender_allows_inner_whitespace() {
        // テスト項目: 送信者名には途中の空白を含められる
        // given (前提条件):
        let raw = "Alice Smith".to_string();

        // when (操作):
        let result = SenderName::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "Alice Smith");
    }

    #[test]
    fn test_sender_rejects_control_characters() {
        // テスト項目: 制御文字を含む送信者名はエラーになる
        // given (前提条件):
        let raw = "ali\u{0007}ce".to_string();

        // when (操作):
        let result = SenderName::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::ForbiddenCharacters { field: "sender" })
        );
    }

    #[test]
    fn test_message_text_is_trimmed() {
        // テスト項目: メッセージ本文は前後の空白が除去されて保存される
        // given (前提条件):
        let raw = "\n  hi there \t".to_string();

        // when (操作):
        let result = MessageText::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "hi there");
    }

    #[test]
    fn test_message_text_rejects_whitespace_only() {
        // テスト項目: 空白のみのメッセージ本文はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = MessageText::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MessageTextEmpty));
    }

    #[test]
    fn test_history_limit_bounds() {
        // テスト項目: 履歴の件数指定は 1〜100 の範囲のみ受け付ける
        // given (前提条件):
        let values = [0, 1, 100, 101, -3];

        // when (操作):
        let results: Vec<bool> = values
            .iter()
            .map(|v| HistoryLimit::new(*v).is_ok())
            .collect();

        // then (期待する結果):
        assert_eq!(results, vec![false, true, true, false, false]);
        assert_eq!(HistoryLimit::default().value(), 20);
    }

    #[test]
    fn test_message_id_parse() {
        // テスト項目: UUID 形式の文字列のみ MessageId として解釈される
        // given (前提条件):
        let id = MessageId::generate();

        // when (操作):
        let parsed = MessageId::parse(&id.to_string());
        let malformed = MessageId::parse("not-a-uuid");

        // then (期待する結果):
        assert_eq!(parsed, Some(id));
        assert_eq!(malformed, None);
    }

    #[test]
    fn test_timestamp_as_epoch_secs() {
        // テスト項目: Timestamp がミリ秒から秒に変換される
        // given (前提条件):
        let timestamp = Timestamp::new(2_500);

        // when (操作):
        let secs = timestamp.as_epoch_secs();

        // then (期待する結果):
        assert!((secs - 2.5).abs() < f64::EPSILON);
    }
}

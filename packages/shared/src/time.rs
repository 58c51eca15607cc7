//! Time-related utilities with clock abstraction for testability.
//!
//! Timestamps are kept as Unix epoch milliseconds internally and exposed on
//! the wire as fractional seconds since the epoch.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_epoch_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Get current Unix timestamp as fractional seconds
pub fn get_epoch_secs() -> f64 {
    millis_to_epoch_secs(get_epoch_millis())
}

/// Convert Unix milliseconds to fractional seconds since the epoch
pub fn millis_to_epoch_secs(timestamp_millis: i64) -> f64 {
    timestamp_millis as f64 / 1000.0
}

/// Convert fractional seconds since the epoch to Unix milliseconds
pub fn epoch_secs_to_millis(timestamp_secs: f64) -> i64 {
    (timestamp_secs * 1000.0).round() as i64
}

/// Convert Unix timestamp (milliseconds) to local RFC 3339 format
///
/// Returns `None` when the timestamp is out of chrono's representable range.
pub fn timestamp_to_local_rfc3339(timestamp_millis: i64) -> Option<String> {
    let utc: DateTime<Utc> = Utc.timestamp_millis_opt(timestamp_millis).single()?;
    Some(utc.with_timezone(&Local).to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        // テスト項目: SystemClock が 0 以外のタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp > 0);
    }

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // テスト項目: SystemClock が呼び出すたびに減少しないタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let timestamp2 = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp2 >= timestamp1);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        // テスト項目: FixedClock が固定されたタイムスタンプを返す
        // given (前提条件):
        let fixed_time = 1234567890123;
        let clock = FixedClock::new(fixed_time);

        // when (操作):
        let timestamp1 = clock.now_millis();
        let timestamp2 = clock.now_millis();

        // then (期待する結果):
        assert_eq!(timestamp1, fixed_time);
        assert_eq!(timestamp2, fixed_time);
    }

    #[test]
    fn test_millis_to_epoch_secs_keeps_fraction() {
        // テスト項目: ミリ秒が小数部付きの秒に変換される
        // given (前提条件):
        let millis = 1672498800123;

        // when (操作):
        let secs = millis_to_epoch_secs(millis);

        // then (期待する結果):
        assert!((secs - 1672498800.123).abs() < 1e-6);
        assert_eq!(epoch_secs_to_millis(secs), millis);
    }

    #[test]
    fn test_timestamp_to_local_rfc3339_format() {
        // テスト項目: タイムスタンプがローカル時刻の RFC 3339 形式に変換される
        // given (前提条件):
        // 2023-01-01 12:00:00 UTC in milliseconds
        let timestamp = 1672574400000;

        // when (操作):
        let result = timestamp_to_local_rfc3339(timestamp);

        // then (期待する結果):
        let result = result.unwrap();
        assert!(result.starts_with("2023-01-0"));
        assert!(result.contains('T'));
    }

    #[test]
    fn test_timestamp_to_local_rfc3339_out_of_range() {
        // テスト項目: 表現できないタイムスタンプは None になる
        // given (前提条件):
        let timestamp = i64::MAX;

        // when (操作):
        let result = timestamp_to_local_rfc3339(timestamp);

        // then (期待する結果):
        assert!(result.is_none());
    }
}

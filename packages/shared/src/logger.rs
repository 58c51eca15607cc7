//! Logging setup utilities for the long-polling chat application.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Filters are set for the Kairan library crates and the calling binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "kairan-server", "kairan-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use kairan_shared::logger::setup_logger;
///
/// setup_logger("kairan-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let mut directives: Vec<String> = ["kairan_shared", "kairan_server", "kairan_client"]
        .iter()
        .map(|krate| format!("{}={}", krate, default_log_level))
        .collect();

    let binary_target = binary_name.replace('-', "_");
    if !directives
        .iter()
        .any(|d| d.starts_with(&format!("{}=", binary_target)))
    {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }

    // request spans from tower-http
    directives.push(format!("tower_http={}", default_log_level));

    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_contains_library_crates() {
        // テスト項目: デフォルトフィルタにライブラリクレートのディレクティブが含まれる
        // given (前提条件):
        let binary_name = "server-bin";

        // when (操作):
        let filter = default_filter(binary_name, "info");

        // then (期待する結果):
        assert!(filter.contains("kairan_server=info"));
        assert!(filter.contains("kairan_shared=info"));
        assert!(filter.contains("server_bin=info"));
        assert!(filter.contains("tower_http=info"));
    }

    #[test]
    fn test_default_filter_does_not_duplicate_crate_named_binary() {
        // テスト項目: バイナリ名がライブラリクレート名と同じ場合、ディレクティブが重複しない
        // given (前提条件):
        let binary_name = "kairan-server";

        // when (操作):
        let filter = default_filter(binary_name, "debug");

        // then (期待する結果):
        assert_eq!(filter.matches("kairan_server=debug").count(), 1);
    }
}

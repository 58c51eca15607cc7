//! Client execution logic with retry support.

use std::time::Duration;

use crate::{api::ChatApi, error::ClientError, session::run_client_session};

pub(crate) const MAX_RETRY_ATTEMPTS: u32 = 5;
pub(crate) const RETRY_INTERVAL_SECS: u64 = 5;

/// Number of history entries shown when the session starts
const INITIAL_HISTORY: u32 = 10;

/// Consecutive failure counter shared by the connect and poll loops
#[derive(Debug)]
pub(crate) struct RetryCounter {
    failures: u32,
    max_attempts: u32,
}

impl RetryCounter {
    pub(crate) fn new(max_attempts: u32) -> Self {
        Self {
            failures: 0,
            max_attempts,
        }
    }

    /// Record a failure; returns `false` once the attempts are used up
    pub(crate) fn record_failure(&mut self) -> bool {
        self.failures += 1;
        self.failures < self.max_attempts
    }

    pub(crate) fn reset(&mut self) {
        self.failures = 0;
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }

    /// 1-based number of the next attempt
    pub(crate) fn next_attempt(&self) -> u32 {
        self.failures + 1
    }
}

/// Run the long-polling client with retry logic
pub async fn run_client(
    url: String,
    client_id: String,
    room: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ChatApi::new(&url, &client_id, &room);
    let mut retry = RetryCounter::new(MAX_RETRY_ATTEMPTS);

    let history = loop {
        tracing::info!(
            "Attempting to reach {} as '{}' (attempt {}/{})",
            url,
            client_id,
            retry.next_attempt(),
            MAX_RETRY_ATTEMPTS
        );

        match api.history(INITIAL_HISTORY).await {
            Ok(history) => break history,
            Err(e @ ClientError::Rejected { .. }) => {
                // the server is up but refuses this room; retrying will not help
                return Err(Box::new(e));
            }
            Err(e) => {
                tracing::warn!("Server unreachable: {}", e);
                if !retry.record_failure() {
                    tracing::error!(
                        "Failed to reach the server after {} attempts. Exiting.",
                        MAX_RETRY_ATTEMPTS
                    );
                    return Err(Box::new(e));
                }

                tracing::info!(
                    "Retrying in {} seconds... (attempt {}/{})",
                    RETRY_INTERVAL_SECS,
                    retry.next_attempt(),
                    MAX_RETRY_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RETRY_INTERVAL_SECS)).await;
            }
        }
    };

    tracing::info!("Connected to chat server!");
    run_client_session(api, history).await?;
    tracing::info!("Client session ended normally");

    Ok(())
}

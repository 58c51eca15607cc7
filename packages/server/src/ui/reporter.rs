//! Periodic activity report.
//!
//! Logs the usage counters at a fixed interval until the server shuts down.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

use crate::usecase::GetStatsUseCase;

/// Handle to a running activity reporter
pub struct ActivityReporter {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ActivityReporter {
    /// Start reporting every `interval`
    pub fn spawn(stats: Arc<GetStatsUseCase>, interval: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // 初回の即時 tick は読み飛ばす

            loop {
                tokio::select! {
                    _ = ticker.tick() => report(&stats).await,
                    _ = stopped.changed() => {
                        tracing::debug!("Stopping activity reporter");
                        break;
                    }
                }
            }
        });

        Self { stop, task }
    }

    /// Stop the reporter and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("Activity reporter ended abnormally: {}", e);
        }
    }
}

async fn report(stats: &GetStatsUseCase) {
    let snapshot = stats.execute();
    tracing::info!(
        active_clients = snapshot.active_clients,
        total_messages = snapshot.total_messages,
        rooms = snapshot.rooms.len(),
        "activity report"
    );

    for activity in stats.room_activity().await {
        if activity.waiting > 0 {
            tracing::debug!(room = %activity.room, waiting = activity.waiting, "room activity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        registry::InMemorySessionRegistry, repository::InMemoryRoomRepository,
        stats::InMemoryStatsRecorder,
    };

    #[tokio::test(start_paused = true)]
    async fn test_reporter_stops_on_shutdown() {
        // テスト項目: shutdown を呼ぶとレポートタスクが終了する
        // given (前提条件):
        let stats = Arc::new(GetStatsUseCase::new(
            Arc::new(InMemoryRoomRepository::default()),
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(InMemoryStatsRecorder::new()),
        ));
        let reporter = ActivityReporter::spawn(stats, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(3)).await;

        // when (操作):
        let result = tokio::time::timeout(Duration::from_secs(1), reporter.shutdown()).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}

//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    DisconnectClientUseCase, GetHistoryUseCase, GetStatsUseCase, PollMessagesUseCase,
    SendMessageUseCase,
};

use super::{
    handler::{
        disconnect_client, get_history, get_stats, health_check, poll_messages, send_message,
    },
    reporter::ActivityReporter,
    signal::shutdown_signal,
    state::AppState,
};

/// Listener and background task settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// The port number to bind to (e.g., 8000)
    pub port: u16,
    /// Interval of the activity report log, `None` disables it
    pub report_interval: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            report_interval: Some(Duration::from_secs(60)),
        }
    }
}

/// Build the HTTP router over the given state
///
/// Exposed so that tests can serve it on an ephemeral port.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/poll", get(poll_messages))
        .route("/api/send", post(send_message))
        .route("/api/history", get(get_history))
        .route("/api/stats", get(get_stats))
        .route("/api/client/{client_id}", delete(disconnect_client))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Long-polling chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     poll_messages_usecase,
///     send_message_usecase,
///     get_history_usecase,
///     get_stats_usecase,
///     disconnect_client_usecase,
/// );
/// server.run(ServerConfig::default()).await?;
/// ```
pub struct Server {
    /// PollMessagesUseCase（ロングポーリングのユースケース）
    poll_messages_usecase: Arc<PollMessagesUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    get_history_usecase: Arc<GetHistoryUseCase>,
    /// GetStatsUseCase（利用統計取得のユースケース）
    get_stats_usecase: Arc<GetStatsUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    disconnect_client_usecase: Arc<DisconnectClientUseCase>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        poll_messages_usecase: Arc<PollMessagesUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_history_usecase: Arc<GetHistoryUseCase>,
        get_stats_usecase: Arc<GetStatsUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    ) -> Self {
        Self {
            poll_messages_usecase,
            send_message_usecase,
            get_history_usecase,
            get_stats_usecase,
            disconnect_client_usecase,
        }
    }

    /// Run the long-polling chat server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Poll endpoint: http://{}/api/poll", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, config.report_interval, shutdown_signal())
            .await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Parked polls are released as soon as `shutdown` resolves, then the
    /// in-flight requests are drained.
    pub async fn serve<F>(
        self,
        listener: tokio::net::TcpListener,
        report_interval: Option<Duration>,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app_state = Arc::new(AppState {
            poll_messages_usecase: self.poll_messages_usecase,
            send_message_usecase: self.send_message_usecase,
            get_history_usecase: self.get_history_usecase,
            get_stats_usecase: self.get_stats_usecase.clone(),
            disconnect_client_usecase: self.disconnect_client_usecase.clone(),
        });
        let app = build_router(app_state);

        let reporter =
            report_interval.map(|interval| ActivityReporter::spawn(self.get_stats_usecase, interval));

        // Start the server
        tracing::info!(
            "Long-polling chat server listening on {}",
            listener.local_addr()?
        );

        let disconnect_client_usecase = self.disconnect_client_usecase;
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                disconnect_client_usecase.disconnect_all();
            })
            .await;

        if let Some(reporter) = reporter {
            reporter.shutdown().await;
        }
        served?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

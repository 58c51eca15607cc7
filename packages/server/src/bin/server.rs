//! Long-polling chat server.
//!
//! Clients long-poll `/api/poll` for new messages and post to `/api/send`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kairan-server
//! cargo run --bin kairan-server -- --host 0.0.0.0 --port 3000 --max-poll-timeout 30
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use kairan_server::{
    infrastructure::{
        registry::InMemorySessionRegistry, repository::InMemoryRoomRepository,
        stats::InMemoryStatsRecorder,
    },
    ui::{Server, ServerConfig},
    usecase::{
        DisconnectClientUseCase, GetHistoryUseCase, GetStatsUseCase, PollConfig,
        PollMessagesUseCase, SendMessageUseCase,
    },
};
use kairan_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kairan-server")]
#[command(about = "Long-polling chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// Number of messages retained per room
    #[arg(long, default_value = "100")]
    history_capacity: usize,

    /// Shortest poll wait in seconds
    #[arg(long, default_value = "5")]
    min_poll_timeout: u64,

    /// Longest poll wait in seconds
    #[arg(long, default_value = "60")]
    max_poll_timeout: u64,

    /// Poll wait in seconds when the client does not ask for one
    #[arg(long, default_value = "25")]
    default_poll_timeout: u64,

    /// Recent messages returned to a poll without a last seen marker
    #[arg(long, default_value = "0")]
    initial_backlog: usize,

    /// Seconds between activity reports (0 disables)
    #[arg(long, default_value = "60")]
    report_interval: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository / Registry / StatsRecorder
    // 2. UseCases
    // 3. Server

    // 1. Create in-memory state
    let repository = Arc::new(InMemoryRoomRepository::new(args.history_capacity));
    let registry = Arc::new(InMemorySessionRegistry::new());
    let stats = Arc::new(InMemoryStatsRecorder::new());

    // 2. Create UseCases
    let poll_config = PollConfig::new(
        Duration::from_secs(args.min_poll_timeout),
        Duration::from_secs(args.max_poll_timeout),
        Duration::from_secs(args.default_poll_timeout),
        args.initial_backlog,
    );
    tracing::info!(
        "Poll timeout {:?} (range {:?}..={:?}), history capacity {}",
        poll_config.default_timeout,
        poll_config.min_timeout,
        poll_config.max_timeout,
        args.history_capacity
    );
    let poll_messages_usecase = Arc::new(PollMessagesUseCase::new(
        repository.clone(),
        registry.clone(),
        poll_config,
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        registry.clone(),
        stats.clone(),
    ));
    let get_history_usecase = Arc::new(GetHistoryUseCase::new(repository.clone()));
    let get_stats_usecase = Arc::new(GetStatsUseCase::new(
        repository.clone(),
        registry.clone(),
        stats.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(registry.clone()));

    // 3. Create and run the server
    let server = Server::new(
        poll_messages_usecase,
        send_message_usecase,
        get_history_usecase,
        get_stats_usecase,
        disconnect_client_usecase,
    );
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        report_interval: (args.report_interval > 0)
            .then(|| Duration::from_secs(args.report_interval)),
    };
    if let Err(e) = server.run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

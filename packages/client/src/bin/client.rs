//! Long-polling chat client with retry support.
//!
//! Polls a chat server for new messages in one room and sends lines typed at
//! the prompt. Retries when the server is unreachable (max 5 attempts with a
//! 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kairan-client -- --client-id Alice
//! cargo run --bin kairan-client -- -c Bob --room dev
//! ```

use clap::Parser;

use kairan_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kairan-client")]
#[command(about = "Long-polling chat client", long_about = None)]
struct Args {
    /// Client ID, also used as the sender name
    #[arg(short = 'c', long)]
    client_id: String,

    /// Chat server base URL
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = "general")]
    room: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = kairan_client::run_client(args.url, args.client_id, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

//! Long-polling client session management.

use std::time::Duration;

use kairan_server::infrastructure::dto::http::{HistoryResponseDto, MessageDto};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::{
    api::ChatApi,
    error::ClientError,
    formatter::MessageFormatter,
    runner::{MAX_RETRY_ATTEMPTS, RETRY_INTERVAL_SECS, RetryCounter},
    ui::redisplay_prompt,
};

/// Run the client session until the user exits or polling gives up
pub async fn run_client_session(
    api: ChatApi,
    history: HistoryResponseDto,
) -> Result<(), ClientError> {
    let client_id = api.client_id().to_string();

    print!("{}", MessageFormatter::format_history(api.room(), &history.messages));
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        client_id
    );

    // Spawn a task that keeps one poll open at all times
    let last_seen = initial_marker(&history.messages);
    let mut poll_task = tokio::spawn(poll_loop(api.clone(), last_seen));

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let client_id_for_prompt = client_id.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", client_id_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to post each input line
    let api_for_write = api.clone();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let formatted = match api_for_write.send(&line).await {
                Ok(sent) => MessageFormatter::format_sent_confirmation(sent.timestamp),
                Err(e) => {
                    tracing::warn!("Failed to send message: {}", e);
                    MessageFormatter::format_send_failure(&e.to_string())
                }
            };
            print!("{}", formatted);
            redisplay_prompt(api_for_write.client_id());
        }
    });

    // If any one of the tasks completes, abort the other
    let result = tokio::select! {
        poll_result = &mut poll_task => {
            write_task.abort();
            match poll_result {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Poll task failed: {}", e);
                    Ok(())
                }
            }
        }
        _ = &mut write_task => {
            poll_task.abort();
            Ok(())
        }
    };

    // Release the poll still parked on the server
    match api.disconnect().await {
        Ok(response) => tracing::debug!("Disconnected ({} waiting sessions)", response.sessions),
        Err(e) => tracing::warn!("Failed to notify disconnect: {}", e),
    }

    result
}

/// Poll forever, printing other participants' messages
///
/// Returns only when the server stays unreachable for too many attempts.
async fn poll_loop(api: ChatApi, mut last_seen: u64) -> Result<(), ClientError> {
    let mut retry = RetryCounter::new(MAX_RETRY_ATTEMPTS);

    loop {
        match api.poll(last_seen).await {
            Ok(response) => {
                retry.reset();
                if let Some(sequence) = latest_sequence(&response.messages) {
                    last_seen = last_seen.max(sequence);
                }
                for message in visible_messages(&response.messages, api.client_id()) {
                    print!("{}", MessageFormatter::format_chat_message(message));
                    redisplay_prompt(api.client_id());
                }
            }
            Err(e) => {
                tracing::warn!("Poll failed: {}", e);
                if !retry.record_failure() {
                    tracing::error!(
                        "Poll failed {} times in a row. Exiting.",
                        retry.failures()
                    );
                    return Err(ClientError::PollFailed(retry.failures()));
                }
                tracing::info!(
                    "Retrying poll in {} seconds... (attempt {}/{})",
                    RETRY_INTERVAL_SECS,
                    retry.next_attempt(),
                    MAX_RETRY_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RETRY_INTERVAL_SECS)).await;
            }
        }
    }
}

fn latest_sequence(messages: &[MessageDto]) -> Option<u64> {
    messages.iter().map(|m| m.sequence).max()
}

/// Marker of the first poll; an empty room has head 0
fn initial_marker(history: &[MessageDto]) -> u64 {
    latest_sequence(history).unwrap_or(0)
}

/// Messages worth printing: own messages are already confirmed on send
fn visible_messages<'a>(
    messages: &'a [MessageDto],
    client_id: &'a str,
) -> impl Iterator<Item = &'a MessageDto> {
    messages.iter().filter(move |m| m.sender != client_id)
}

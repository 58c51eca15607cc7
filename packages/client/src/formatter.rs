//! Message formatting utilities for client display.

use kairan_server::infrastructure::dto::http::MessageDto;
use kairan_shared::time::{epoch_secs_to_millis, timestamp_to_local_rfc3339};

const SEPARATOR: &str = "------------------------------------------------------------";
const HEAVY_SEPARATOR: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the session banner with the recent history of the room
    ///
    /// # Arguments
    ///
    /// * `room` - The room the client joined
    /// * `history` - Recent messages, oldest first
    pub fn format_history(room: &str, history: &[MessageDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", HEAVY_SEPARATOR));
        output.push_str(&format!("Room: {}\n", room));

        if history.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in history {
                output.push_str(&format!(
                    "[{}] @{}: {}\n",
                    format_time(message.timestamp),
                    message.sender,
                    message.text
                ));
            }
        }

        output.push_str(&format!("{}\n", HEAVY_SEPARATOR));
        output
    }

    /// Format a chat message received through polling
    pub fn format_chat_message(message: &MessageDto) -> String {
        format!(
            "\n\n{sep}\n@{}: {}\nsent at {}\n{sep}\n",
            message.sender,
            message.text,
            format_time(message.timestamp),
            sep = SEPARATOR
        )
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `sent_at` - Seconds since the epoch, as returned by the server
    pub fn format_sent_confirmation(sent_at: f64) -> String {
        format!("sent at {}\n", format_time(sent_at))
    }

    /// Format a send failure
    pub fn format_send_failure(error: &str) -> String {
        format!("\n! message not sent: {}\n", error)
    }
}

fn format_time(epoch_secs: f64) -> String {
    timestamp_to_local_rfc3339(epoch_secs_to_millis(epoch_secs))
        .unwrap_or_else(|| "unknown time".to_string())
}

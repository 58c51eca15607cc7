//! HTTP request handlers.

mod http;

pub use http::{
    disconnect_client, get_history, get_stats, health_check, poll_messages, send_message,
};

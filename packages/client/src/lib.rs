//! Long-polling chat client.
//!
//! Keeps one poll open against the server while lines typed at the prompt
//! are posted as messages.

mod api;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use api::ChatApi;
pub use error::ClientError;
pub use runner::run_client;

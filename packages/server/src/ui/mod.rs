//! Long-polling chat server implementation.

mod handler;
mod reporter;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerConfig, build_router};

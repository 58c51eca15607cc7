//! Utilities shared by the Kairan server and client.

pub mod logger;
pub mod time;

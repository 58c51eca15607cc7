//! Stats recorder implementations.

pub mod inmemory;

pub use inmemory::InMemoryStatsRecorder;

//! Infrastructure layer: in-memory implementations of the domain traits and
//! the HTTP DTOs.

pub mod dto;
pub mod registry;
pub mod repository;
pub mod stats;

//! Domain layer for the village portal backend.
//!
//! This crate contains:
//! - Domain models (letter requests, letter field schemas, content entities)
//! - Store and verifier traits implemented by outer crates
//! - Business logic services (auth gate, letter workflow, content store)

pub mod error;
pub mod models;
pub mod services;
pub mod store;

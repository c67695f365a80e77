//! Shared utilities and common types for the village portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Slug derivation for content titles
//! - Indonesian identity and phone number validation
//! - Rupiah and Indonesian calendar date formatting

pub mod format;
pub mod slug;
pub mod validation;

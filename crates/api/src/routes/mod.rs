//! HTTP route handlers.

pub mod content;
pub mod health;
pub mod layanan;
mod params;
pub mod public;

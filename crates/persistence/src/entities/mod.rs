//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod content_entity;
pub mod letter_request;

pub use content_entity::ContentEntityRow;
pub use letter_request::LetterRequestEntity;

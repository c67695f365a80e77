//! Repository implementations for database operations.

pub mod content;
pub mod letter_request;

pub use content::ContentRepository;
pub use letter_request::LetterRequestRepository;

use domain::store::StoreError;

/// Maps a driver error into the domain store error.
pub(crate) fn store_error(error: sqlx::Error) -> StoreError {
    tracing::error!(error = %error, "Database query failed");
    StoreError::Backend(error.to_string())
}

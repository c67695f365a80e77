//! Parsing of path segments, query values and JSON bodies shared by handlers.

use axum::body::Bytes;
use domain::error::FieldError;
use domain::models::{ContentKind, LetterType};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// Unknown letter types are reported as missing routes.
pub fn letter_type(segment: &str) -> Result<LetterType, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown letter type '{}'", segment)))
}

pub fn content_kind(segment: &str) -> Result<ContentKind, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown content type '{}'", segment)))
}

/// Parses a record id supplied as a query value or path segment.
pub fn record_id(value: Option<&str>) -> Result<Uuid, ApiError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FieldError::new("id", "id is required"))?;
    Uuid::parse_str(value).map_err(|_| FieldError::new("id", "id must be a valid UUID").into())
}

/// Deserializes a JSON body, reporting malformed input as a 400.
pub fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

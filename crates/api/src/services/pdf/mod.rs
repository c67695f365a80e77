//! PDF rendering for letters and budget snapshots.
//!
//! Rendering is a pure function of the record, the village letterhead and
//! the render date, so the same inputs always yield identical bytes.

mod budget;
mod layout;
mod letter;

use chrono::{Duration, NaiveDate, Utc};
use domain::models::LetterRequest;
use shared::slug::slugify;
use thiserror::Error;

pub use budget::render_budget;
pub use letter::render_letter;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("Amount out of range in {0}")]
    AmountOverflow(&'static str),

    #[error("PDF encoding failed: {0}")]
    Pdf(String),
}

/// Today's date in Western Indonesian Time (UTC+7), stamped on documents.
pub fn render_date() -> NaiveDate {
    (Utc::now() + Duration::hours(7)).date_naive()
}

/// Attachment file name for a rendered letter.
pub fn letter_file_name(request: &LetterRequest) -> String {
    let subject = slugify(request.fields.subject_name());
    if subject.is_empty() {
        format!("{}-{}.pdf", request.letter_type.as_str(), request.id)
    } else {
        format!("{}-{}.pdf", request.letter_type.as_str(), subject)
    }
}

/// Attachment file name for a rendered budget.
pub fn budget_file_name(slug: &str) -> String {
    format!("apbdes-{}.pdf", slug)
}

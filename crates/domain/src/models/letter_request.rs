//! Letter request domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::FieldError;
use crate::models::{LetterFields, LetterType};

/// Lifecycle state of a letter request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "finish", alias = "finished")]
    Finished,
}

impl LetterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterStatus::Pending => "pending",
            LetterStatus::Finished => "finish",
        }
    }

    /// Parses a stored status value.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(LetterStatus::Pending),
            "finish" => Some(LetterStatus::Finished),
            _ => None,
        }
    }
}

impl std::fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status filter accepted by the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Pending,
    Finished,
    All,
}

impl StatusFilter {
    /// Parses the `status` query value; an absent filter means `All`.
    pub fn parse(value: Option<&str>) -> Result<Self, FieldError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("all") => Ok(StatusFilter::All),
            Some("pending") => Ok(StatusFilter::Pending),
            Some("finish") | Some("finished") => Ok(StatusFilter::Finished),
            Some(other) => Err(FieldError::new(
                "status",
                format!("Unknown status filter '{}': expected pending, finish or all", other),
            )),
        }
    }

    pub fn as_status(&self) -> Option<LetterStatus> {
        match self {
            StatusFilter::Pending => Some(LetterStatus::Pending),
            StatusFilter::Finished => Some(LetterStatus::Finished),
            StatusFilter::All => None,
        }
    }
}

/// One citizen application for a government letter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterRequest {
    pub id: Uuid,
    pub letter_type: LetterType,
    pub status: LetterStatus,
    pub document_number: String,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "nomorWhatsApp")]
    pub contact_phone: String,
    pub fields: LetterFields,
}

/// A validated submission ready to be persisted.
///
/// Only [`NewLetterRequest::pending`] constructs one, so every stored record
/// starts as `Pending` with an empty document number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLetterRequest {
    letter_type: LetterType,
    fields: LetterFields,
    contact_phone: String,
    submitted_at: DateTime<Utc>,
}

impl NewLetterRequest {
    pub fn pending(fields: LetterFields, contact_phone: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            letter_type: fields.letter_type(),
            fields,
            contact_phone,
            submitted_at,
        }
    }

    pub fn letter_type(&self) -> LetterType {
        self.letter_type
    }

    pub fn fields(&self) -> &LetterFields {
        &self.fields
    }

    pub fn contact_phone(&self) -> &str {
        &self.contact_phone
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn status(&self) -> LetterStatus {
        LetterStatus::Pending
    }

    pub fn document_number(&self) -> &str {
        ""
    }

    /// Materializes the stored record once the store has assigned an id.
    pub fn into_record(self, id: Uuid) -> LetterRequest {
        LetterRequest {
            id,
            letter_type: self.letter_type,
            status: LetterStatus::Pending,
            document_number: String::new(),
            submitted_at: self.submitted_at,
            updated_at: self.submitted_at,
            contact_phone: self.contact_phone,
            fields: self.fields,
        }
    }
}

/// Public submission as received from the citizen form.
#[derive(Debug, Clone)]
pub struct LetterSubmission {
    pub letter_type: LetterType,
    pub fields: serde_json::Value,
    pub contact_phone: Option<String>,
    pub anti_automation_token: Option<String>,
    pub remote_ip: Option<String>,
}

/// Admin mutation: only the document number and status may change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LetterRequestUpdate {
    #[validate(length(max = 100, message = "Document number must be at most 100 characters"))]
    pub document_number: Option<String>,
    pub status: Option<LetterStatus>,
}

impl LetterRequestUpdate {
    pub fn is_empty(&self) -> bool {
        self.document_number.is_none() && self.status.is_none()
    }
}

/// Response body of a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLetterResponse {
    pub id: Uuid,
}

/// Aggregate of pending requests, for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PendingCount {
    Single {
        #[serde(rename = "letterType")]
        letter_type: LetterType,
        count: i64,
    },
    Summary {
        total: i64,
        types: BTreeMap<LetterType, i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::letter_fields::fixtures::birth_json;

    #[test]
    fn test_status_serialization_uses_wire_names() {
        assert_eq!(serde_json::to_string(&LetterStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&LetterStatus::Finished).unwrap(), "\"finish\"");
        let parsed: LetterStatus = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(parsed, LetterStatus::Finished);
    }

    #[test]
    fn test_status_from_db() {
        assert_eq!(LetterStatus::from_db("pending"), Some(LetterStatus::Pending));
        assert_eq!(LetterStatus::from_db("finish"), Some(LetterStatus::Finished));
        assert_eq!(LetterStatus::from_db("archived"), None);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(StatusFilter::parse(None).unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("pending")).unwrap(), StatusFilter::Pending);
        assert_eq!(StatusFilter::parse(Some("FINISH")).unwrap(), StatusFilter::Finished);
        assert_eq!(StatusFilter::parse(Some("all")).unwrap(), StatusFilter::All);

        let err = StatusFilter::parse(Some("rejected")).unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn test_new_letter_request_starts_pending() {
        let fields = LetterFields::parse(LetterType::BirthStatement, birth_json()).unwrap();
        let now = Utc::now();
        let new = NewLetterRequest::pending(fields, "081234567890".to_string(), now);
        assert_eq!(new.status(), LetterStatus::Pending);
        assert_eq!(new.document_number(), "");

        let record = new.into_record(Uuid::new_v4());
        assert_eq!(record.status, LetterStatus::Pending);
        assert_eq!(record.document_number, "");
        assert_eq!(record.letter_type, LetterType::BirthStatement);
        assert_eq!(record.submitted_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_letter_request_serialization() {
        let fields = LetterFields::parse(LetterType::BirthStatement, birth_json()).unwrap();
        let record = NewLetterRequest::pending(fields, "081234567890".to_string(), Utc::now())
            .into_record(Uuid::nil());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["letterType"], "surat-keterangan-kelahiran");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["documentNumber"], "");
        assert_eq!(json["nomorWhatsApp"], "081234567890");
        assert_eq!(json["fields"]["namaBayi"], "Ahmad Fauzi");
    }

    #[test]
    fn test_update_deserialization() {
        let update: LetterRequestUpdate =
            serde_json::from_str(r#"{"documentNumber": "470/12/2025", "status": "finish"}"#).unwrap();
        assert_eq!(update.document_number.as_deref(), Some("470/12/2025"));
        assert_eq!(update.status, Some(LetterStatus::Finished));
        assert!(!update.is_empty());
        assert!(LetterRequestUpdate::default().is_empty());
    }

    #[test]
    fn test_pending_count_serialization() {
        let mut types = BTreeMap::new();
        types.insert(LetterType::BirthStatement, 2);
        types.insert(LetterType::DeathStatement, 1);
        let summary = PendingCount::Summary { total: 3, types };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["types"]["surat-keterangan-kelahiran"], 2);

        let single = PendingCount::Single {
            letter_type: LetterType::CrowdPermit,
            count: 4,
        };
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["letterType"], "surat-izin-keramaian");
        assert_eq!(json["count"], 4);
    }
}

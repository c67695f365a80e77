//! Letter request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{LetterFields, LetterRequest, LetterStatus, LetterType};
use domain::store::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the letter_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct LetterRequestEntity {
    pub id: Uuid,
    pub letter_type: String,
    pub status: String,
    pub document_number: String,
    pub contact_phone: String,
    pub fields: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LetterRequestEntity> for LetterRequest {
    type Error = StoreError;

    fn try_from(entity: LetterRequestEntity) -> Result<Self, Self::Error> {
        let letter_type: LetterType = entity
            .letter_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("letter request {}: {}", entity.id, e)))?;
        let status = LetterStatus::from_db(&entity.status).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "letter request {}: unknown status '{}'",
                entity.id, entity.status
            ))
        })?;
        let fields = LetterFields::from_stored(letter_type, entity.fields)
            .map_err(|e| StoreError::Corrupt(format!("letter request {}: {}", entity.id, e)))?;

        Ok(Self {
            id: entity.id,
            letter_type,
            status,
            document_number: entity.document_number,
            submitted_at: entity.submitted_at,
            updated_at: entity.updated_at,
            contact_phone: entity.contact_phone,
            fields,
        })
    }
}

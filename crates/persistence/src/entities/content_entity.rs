//! Content entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ContentEntity, ContentKind, ContentPayload};
use domain::store::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the content_entities table.
#[derive(Debug, Clone, FromRow)]
pub struct ContentEntityRow {
    pub id: Uuid,
    pub entity_type: String,
    pub slug: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentEntityRow> for ContentEntity {
    type Error = StoreError;

    fn try_from(row: ContentEntityRow) -> Result<Self, Self::Error> {
        let kind: ContentKind = row
            .entity_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("content {}: {}", row.id, e)))?;
        let payload = ContentPayload::from_stored(kind, row.payload)
            .map_err(|e| StoreError::Corrupt(format!("content {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            entity_type: kind,
            slug: row.slug,
            payload,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

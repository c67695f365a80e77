//! Content entity management and the public read projections.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::FieldError;
use crate::models::{merge_patch, ContentEntity, ContentKind, ContentPayload, NewContentEntity};
use crate::services::auth_gate::AdminIdentity;
use crate::store::{ContentChanges, ContentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Content not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Admin CRUD over content entities.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Every entity of `kind`, unpublished ones included.
    pub async fn list(&self, _admin: &AdminIdentity, kind: ContentKind) -> ContentResult<Vec<ContentEntity>> {
        Ok(self.store.list(kind, None).await?)
    }

    pub async fn get(&self, _admin: &AdminIdentity, kind: ContentKind, id: Uuid) -> ContentResult<ContentEntity> {
        self.store
            .find_by_id(kind, id)
            .await?
            .ok_or(ContentError::NotFound)
    }

    pub async fn create(
        &self,
        admin: &AdminIdentity,
        kind: ContentKind,
        payload: serde_json::Value,
    ) -> ContentResult<ContentEntity> {
        let payload = ContentPayload::parse(kind, payload).map_err(ContentError::Validation)?;
        let entity = self
            .store
            .insert(NewContentEntity::new(payload, Utc::now()))
            .await?;

        tracing::info!(
            admin = %admin.email(),
            entity_type = %kind,
            entity_id = %entity.id,
            slug = ?entity.slug,
            "Content created"
        );
        Ok(entity)
    }

    /// Shallow-merges `patch` over the stored payload and re-validates it.
    ///
    /// The slug is recomputed only when the patch carries the title field.
    pub async fn update(
        &self,
        admin: &AdminIdentity,
        kind: ContentKind,
        id: Uuid,
        patch: serde_json::Value,
    ) -> ContentResult<ContentEntity> {
        let existing = self
            .store
            .find_by_id(kind, id)
            .await?
            .ok_or(ContentError::NotFound)?;

        let merged = merge_patch(&existing.payload.to_value(), &patch)
            .map_err(|e| ContentError::Validation(vec![e]))?;
        let payload = ContentPayload::parse(kind, merged).map_err(ContentError::Validation)?;

        let title_changed = kind
            .slug_source_field()
            .is_some_and(|field| patch.get(field).is_some());
        let slug = if title_changed {
            payload.derive_slug()
        } else {
            existing.slug
        };

        let changes = ContentChanges {
            slug,
            payload,
            updated_at: Utc::now(),
        };
        let updated = self
            .store
            .update(kind, id, changes)
            .await?
            .ok_or(ContentError::NotFound)?;

        tracing::info!(
            admin = %admin.email(),
            entity_type = %kind,
            entity_id = %id,
            "Content updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, admin: &AdminIdentity, kind: ContentKind, id: Uuid) -> ContentResult<()> {
        if !self.store.delete(kind, id).await? {
            return Err(ContentError::NotFound);
        }
        tracing::info!(
            admin = %admin.email(),
            entity_type = %kind,
            entity_id = %id,
            "Content deleted"
        );
        Ok(())
    }
}

/// Read-only views for anonymous visitors.
///
/// Store failures are logged and degrade to empty results.
#[derive(Clone)]
pub struct PublicContent {
    store: Arc<dyn ContentStore>,
}

impl PublicContent {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Published entities, most recent first, at most `limit` of them.
    pub async fn list_published(&self, kind: ContentKind, limit: Option<usize>) -> Vec<ContentEntity> {
        // unpublished news must be filtered before the limit applies
        let store_limit = match kind {
            ContentKind::News => None,
            _ => limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX)),
        };

        match self.store.list(kind, store_limit).await {
            Ok(entities) => entities
                .into_iter()
                .filter(|e| e.payload.is_published())
                .take(limit.unwrap_or(usize::MAX))
                .collect(),
            Err(e) => {
                tracing::warn!(entity_type = %kind, error = %e, "Public listing degraded to empty");
                Vec::new()
            }
        }
    }

    /// The most recent published entity carrying `slug`, if any.
    pub async fn get_by_slug(&self, kind: ContentKind, slug: &str) -> Option<ContentEntity> {
        match self.store.find_by_slug(kind, slug).await {
            Ok(entity) => entity.filter(|e| e.payload.is_published()),
            Err(e) => {
                tracing::warn!(entity_type = %kind, slug = %slug, error = %e, "Public lookup degraded to none");
                None
            }
        }
    }
}

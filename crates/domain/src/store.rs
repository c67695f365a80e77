//! Store traits implemented by the persistence layer.
//!
//! Services depend on these traits only, so the backing database client is
//! constructed once at startup and injected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    ContentEntity, ContentKind, ContentPayload, LetterRequest, LetterRequestUpdate, LetterStatus,
    LetterType, NewContentEntity, NewLetterRequest,
};

/// Errors surfaced by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Stored document is corrupt: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for letter requests.
#[async_trait]
pub trait LetterRequestStore: Send + Sync {
    /// Creates a record and returns it with its assigned id.
    async fn insert(&self, request: NewLetterRequest) -> StoreResult<LetterRequest>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<LetterRequest>>;

    /// Lists records of one type, most recently submitted first.
    async fn list(
        &self,
        letter_type: LetterType,
        status: Option<LetterStatus>,
    ) -> StoreResult<Vec<LetterRequest>>;

    /// Applies the mutable fields and refreshes `updated_at`.
    ///
    /// Returns `None` when no record has this id.
    async fn update(
        &self,
        id: Uuid,
        update: &LetterRequestUpdate,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<LetterRequest>>;

    /// Hard-deletes a record. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_pending(&self, letter_type: LetterType) -> StoreResult<i64>;

    /// Cheap connectivity check used by health probes.
    async fn ping(&self) -> StoreResult<()>;
}

/// Replacement values for an existing content entity.
#[derive(Debug, Clone)]
pub struct ContentChanges {
    pub slug: Option<String>,
    pub payload: ContentPayload,
    pub updated_at: DateTime<Utc>,
}

/// Persistence for content entities, one collection per [`ContentKind`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Lists entities of one kind, most recently created first.
    async fn list(&self, kind: ContentKind, limit: Option<i64>) -> StoreResult<Vec<ContentEntity>>;

    async fn find_by_id(&self, kind: ContentKind, id: Uuid) -> StoreResult<Option<ContentEntity>>;

    /// Returns the most recently created entity carrying `slug`.
    async fn find_by_slug(&self, kind: ContentKind, slug: &str) -> StoreResult<Option<ContentEntity>>;

    async fn insert(&self, entity: NewContentEntity) -> StoreResult<ContentEntity>;

    async fn update(
        &self,
        kind: ContentKind,
        id: Uuid,
        changes: ContentChanges,
    ) -> StoreResult<Option<ContentEntity>>;

    async fn delete(&self, kind: ContentKind, id: Uuid) -> StoreResult<bool>;
}

//! Content entity repository for database operations.

use async_trait::async_trait;
use domain::models::{ContentEntity, ContentKind, NewContentEntity};
use domain::store::{ContentChanges, ContentStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::ContentEntityRow;
use crate::metrics::{QueryTimer, CONTENT_ENTITIES};

const COLUMNS: &str = "id, entity_type, slug, payload, created_at, updated_at";

/// Repository for content entity database operations.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Creates a new ContentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for ContentRepository {
    async fn list(&self, kind: ContentKind, limit: Option<i64>) -> StoreResult<Vec<ContentEntity>> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "list");
        let result = sqlx::query_as::<_, ContentEntityRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM content_entities
            WHERE entity_type = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(kind.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        result
            .map_err(store_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn find_by_id(&self, kind: ContentKind, id: Uuid) -> StoreResult<Option<ContentEntity>> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "find_by_id");
        let result = sqlx::query_as::<_, ContentEntityRow>(&format!(
            "SELECT {COLUMNS} FROM content_entities WHERE entity_type = $1 AND id = $2"
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.map(TryInto::try_into).transpose()
    }

    async fn find_by_slug(&self, kind: ContentKind, slug: &str) -> StoreResult<Option<ContentEntity>> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "find_by_slug");
        let result = sqlx::query_as::<_, ContentEntityRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM content_entities
            WHERE entity_type = $1 AND slug = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(kind.as_str())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, entity: NewContentEntity) -> StoreResult<ContentEntity> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "insert");
        let result = sqlx::query_as::<_, ContentEntityRow>(&format!(
            r#"
            INSERT INTO content_entities (entity_type, slug, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(entity.kind.as_str())
        .bind(entity.slug.as_deref())
        .bind(entity.payload.to_value())
        .bind(entity.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.try_into()
    }

    async fn update(
        &self,
        kind: ContentKind,
        id: Uuid,
        changes: ContentChanges,
    ) -> StoreResult<Option<ContentEntity>> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "update");
        let result = sqlx::query_as::<_, ContentEntityRow>(&format!(
            r#"
            UPDATE content_entities
            SET slug = $3, payload = $4, updated_at = $5
            WHERE entity_type = $1 AND id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(kind.as_str())
        .bind(id)
        .bind(changes.slug.as_deref())
        .bind(changes.payload.to_value())
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, kind: ContentKind, id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new(CONTENT_ENTITIES, "delete");
        let result = sqlx::query("DELETE FROM content_entities WHERE entity_type = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);

        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }
}

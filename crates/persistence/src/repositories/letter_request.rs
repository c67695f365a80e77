//! Letter request repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{LetterRequest, LetterRequestUpdate, LetterStatus, LetterType, NewLetterRequest};
use domain::store::{LetterRequestStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::LetterRequestEntity;
use crate::metrics::{QueryTimer, LETTER_REQUESTS};

const COLUMNS: &str = "id, letter_type, status, document_number, contact_phone, fields, submitted_at, updated_at";

/// Repository for letter request database operations.
#[derive(Clone)]
pub struct LetterRequestRepository {
    pool: PgPool,
}

impl LetterRequestRepository {
    /// Creates a new LetterRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LetterRequestStore for LetterRequestRepository {
    async fn insert(&self, request: NewLetterRequest) -> StoreResult<LetterRequest> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "insert");
        let result = sqlx::query_as::<_, LetterRequestEntity>(&format!(
            r#"
            INSERT INTO letter_requests
                (letter_type, status, document_number, contact_phone, fields, submitted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.letter_type().as_str())
        .bind(request.status().as_str())
        .bind(request.document_number())
        .bind(request.contact_phone())
        .bind(request.fields().to_value())
        .bind(request.submitted_at())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<LetterRequest>> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "find_by_id");
        let result = sqlx::query_as::<_, LetterRequestEntity>(&format!(
            "SELECT {COLUMNS} FROM letter_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.map(TryInto::try_into).transpose()
    }

    async fn list(
        &self,
        letter_type: LetterType,
        status: Option<LetterStatus>,
    ) -> StoreResult<Vec<LetterRequest>> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "list");
        let result = sqlx::query_as::<_, LetterRequestEntity>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM letter_requests
            WHERE letter_type = $1
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY submitted_at DESC, id DESC
            "#
        ))
        .bind(letter_type.as_str())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        result
            .map_err(store_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn update(
        &self,
        id: Uuid,
        update: &LetterRequestUpdate,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<LetterRequest>> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "update");
        let result = sqlx::query_as::<_, LetterRequestEntity>(&format!(
            r#"
            UPDATE letter_requests
            SET document_number = COALESCE($2, document_number),
                status = COALESCE($3, status),
                updated_at = $4
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.document_number.as_deref())
        .bind(update.status.map(|s| s.as_str()))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(store_error)?.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "delete");
        let result = sqlx::query("DELETE FROM letter_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);

        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    async fn count_pending(&self, letter_type: LetterType) -> StoreResult<i64> {
        let timer = QueryTimer::new(LETTER_REQUESTS, "count_pending");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM letter_requests
            WHERE letter_type = $1 AND status = $2
            "#,
        )
        .bind(letter_type.as_str())
        .bind(LetterStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);

        Ok(result.map_err(store_error)?.0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

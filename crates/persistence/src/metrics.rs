//! Store metrics: query latency per table and operation, pool occupancy.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

pub const LETTER_REQUESTS: &str = "letter_requests";
pub const CONTENT_ENTITIES: &str = "content_entities";

/// Publishes connection pool occupancy. Called periodically by the
/// maintenance job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("store_pool_connections", "state" => "active").set(size.saturating_sub(idle) as f64);
    gauge!("store_pool_connections", "state" => "idle").set(idle as f64);
    gauge!("store_pool_max_connections").set(pool.options().get_max_connections() as f64);
}

/// Times one store query.
///
/// ```ignore
/// let timer = QueryTimer::new(LETTER_REQUESTS, "find_by_id");
/// let result = sqlx::query_as::<_, LetterRequestEntity>(..).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
#[must_use = "a timer records nothing until finished"]
pub struct QueryTimer {
    table: &'static str,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(table: &'static str, operation: &'static str) -> Self {
        Self {
            table,
            operation,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time labelled with the query outcome.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        histogram!(
            "store_query_duration_seconds",
            "table" => self.table,
            "operation" => self.operation,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if result.is_err() {
            counter!(
                "store_query_errors_total",
                "table" => self.table,
                "operation" => self.operation
            )
            .increment(1);
        }
    }
}

//! Maintenance jobs: connection pool gauges and rate limiter pruning.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::scheduler::Job;
use crate::middleware::RateLimiterState;

/// Records database connection pool gauges.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}

/// Drops per-client limiter state that no longer affects decisions.
pub struct PruneRateLimiterJob {
    limiter: Arc<RateLimiterState>,
}

impl PruneRateLimiterJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for PruneRateLimiterJob {
    fn name(&self) -> &'static str {
        "prune_rate_limiter"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(300)
    }

    async fn execute(&self) -> Result<(), String> {
        let before = self.limiter.tracked_clients();
        self.limiter.prune();
        tracing::debug!(
            before,
            after = self.limiter.tracked_clients(),
            "Pruned submission rate limiter"
        );
        Ok(())
    }
}

//! Periodic maintenance tasks running beside the HTTP server.

mod maintenance;
mod scheduler;

pub use maintenance::{PoolMetricsJob, PruneRateLimiterJob};
pub use scheduler::{Job, JobScheduler};

//! Anti-automation verification seam.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    #[error("Anti-automation token rejected: {0}")]
    Rejected(String),

    #[error("Anti-automation score {score} below threshold {threshold}")]
    LowScore { score: f64, threshold: f64 },

    #[error("Anti-automation verification is not configured")]
    Misconfigured,

    #[error("Anti-automation service unavailable: {0}")]
    Unavailable(String),
}

/// Verifies a challenge-response token with an external service.
///
/// Implementations make exactly one call and never retry.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<(), CaptchaError>;
}

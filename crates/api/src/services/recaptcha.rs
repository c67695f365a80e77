//! reCAPTCHA verification for public submissions.

use async_trait::async_trait;
use domain::services::{CaptchaError, CaptchaVerifier};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::RecaptchaConfig;

/// siteverify response body.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies tokens with the reCAPTCHA siteverify endpoint.
///
/// One request per token; failures are never retried.
pub struct RecaptchaVerifier {
    client: Client,
    config: RecaptchaConfig,
}

impl RecaptchaVerifier {
    pub fn new(config: RecaptchaConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn evaluate(&self, body: SiteVerifyResponse) -> Result<(), CaptchaError> {
        if !body.success {
            let codes = if body.error_codes.is_empty() {
                "unknown".to_string()
            } else {
                body.error_codes.join(",")
            };
            return Err(CaptchaError::Rejected(codes));
        }

        if let (Some(threshold), Some(score)) = (self.config.min_score, body.score) {
            if score < threshold {
                return Err(CaptchaError::LowScore { score, threshold });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<(), CaptchaError> {
        if self.config.secret_key.is_empty() {
            tracing::error!("reCAPTCHA secret key is not configured");
            return Err(CaptchaError::Misconfigured);
        }

        let mut form = vec![
            ("secret", self.config.secret_key.as_str()),
            ("response", token),
        ];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CaptchaError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CaptchaError::Unavailable(format!("HTTP {}", response.status())));
        }

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| CaptchaError::Unavailable(format!("Invalid response: {}", e)))?;

        tracing::debug!(success = body.success, score = ?body.score, "reCAPTCHA verification result");
        self.evaluate(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn verifier(secret: &str, min_score: Option<f64>) -> RecaptchaVerifier {
        RecaptchaVerifier::new(RecaptchaConfig {
            secret_key: secret.to_string(),
            verify_url: "http://127.0.0.1:1/siteverify".to_string(),
            min_score,
            timeout_secs: 1,
        })
        .unwrap()
    }

    fn response(json: &str) -> SiteVerifyResponse {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_missing_secret_is_misconfigured() {
        let err = verifier("", None).verify("token", None).await.unwrap_err();
        assert!(matches!(err, CaptchaError::Misconfigured));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let err = verifier("secret", None)
            .verify("token", Some("10.0.0.1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptchaError::Unavailable(_)));
    }

    #[test]
    fn test_rejected_carries_error_codes() {
        let err = verifier("secret", None)
            .evaluate(response(r#"{"success":false,"error-codes":["timeout-or-duplicate"]}"#))
            .unwrap_err();
        assert!(matches!(err, CaptchaError::Rejected(ref c) if c == "timeout-or-duplicate"));
    }

    #[test]
    fn test_score_threshold() {
        let v = verifier("secret", Some(0.5));
        assert_ok!(v.evaluate(response(r#"{"success":true,"score":0.9}"#)));
        let err = assert_err!(v.evaluate(response(r#"{"success":true,"score":0.1}"#)));
        assert!(matches!(err, CaptchaError::LowScore { .. }));
        // v2 checkbox responses carry no score
        assert_ok!(v.evaluate(response(r#"{"success":true}"#)));
    }
}

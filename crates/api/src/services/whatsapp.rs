//! WhatsApp notifications for finished letters.

use async_trait::async_trait;
use domain::services::{LetterFinishedNotice, NotificationResult, NotificationService};
use reqwest::{Client, Url};
use serde::Serialize;
use shared::validation::normalize_phone_number;
use std::time::Duration;

use crate::config::{NotificationConfig, NotificationProvider};

/// Builds a `wa.me` click-to-chat link carrying the notice message.
pub fn click_to_chat_link(notice: &LetterFinishedNotice, country_code: &str) -> Option<Url> {
    let target = normalize_phone_number(&notice.contact_phone, country_code);
    if target.is_empty() {
        return None;
    }
    Url::parse_with_params(
        &format!("https://wa.me/{}", target),
        &[("text", notice.message())],
    )
    .ok()
}

/// Logs a click-to-chat link for office staff instead of sending.
pub struct LogWhatsAppNotifier {
    country_code: String,
}

impl LogWhatsAppNotifier {
    pub fn new(country_code: String) -> Self {
        Self { country_code }
    }
}

#[async_trait]
impl NotificationService for LogWhatsAppNotifier {
    async fn send_letter_finished(&self, notice: LetterFinishedNotice) -> NotificationResult {
        match click_to_chat_link(&notice, &self.country_code) {
            Some(link) => {
                tracing::info!(
                    request_id = %notice.request_id,
                    letter_type = %notice.letter_type,
                    link = %link,
                    "Letter finished; WhatsApp link ready"
                );
                NotificationResult::Sent
            }
            None => NotificationResult::Failed("Contact phone has no digits".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    target: &'a str,
    message: &'a str,
}

/// Sends notices through an HTTP WhatsApp gateway.
pub struct GatewayWhatsAppNotifier {
    client: Client,
    url: String,
    token: String,
    country_code: String,
}

impl GatewayWhatsAppNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.gateway_url.clone(),
            token: config.gateway_token.clone(),
            country_code: config.country_code.clone(),
        })
    }
}

#[async_trait]
impl NotificationService for GatewayWhatsAppNotifier {
    async fn send_letter_finished(&self, notice: LetterFinishedNotice) -> NotificationResult {
        let target = normalize_phone_number(&notice.contact_phone, &self.country_code);
        let message = notice.message();

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, &self.token)
            .json(&GatewayMessage {
                target: &target,
                message: &message,
            })
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(request_id = %notice.request_id, "WhatsApp gateway accepted message");
                NotificationResult::Sent
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                NotificationResult::Failed(format!("Gateway returned {}: {}", status, body))
            }
            Err(e) => NotificationResult::Failed(e.to_string()),
        }
    }
}

/// Notification service used while notifications are switched off.
pub struct DisabledNotifier;

#[async_trait]
impl NotificationService for DisabledNotifier {
    async fn send_letter_finished(&self, _notice: LetterFinishedNotice) -> NotificationResult {
        NotificationResult::Skipped
    }
}

/// Builds the notifier selected by configuration.
pub fn build_notifier(
    config: &NotificationConfig,
) -> Result<std::sync::Arc<dyn NotificationService>, reqwest::Error> {
    if !config.enabled {
        return Ok(std::sync::Arc::new(DisabledNotifier));
    }
    Ok(match config.provider {
        NotificationProvider::Log => {
            std::sync::Arc::new(LogWhatsAppNotifier::new(config.country_code.clone()))
        }
        NotificationProvider::Gateway => std::sync::Arc::new(GatewayWhatsAppNotifier::new(config)?),
    })
}

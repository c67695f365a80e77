//! Citizen notification when a letter is ready.

use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::LetterType;

/// Notice sent to the applicant once a letter is finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterFinishedNotice {
    pub request_id: Uuid,
    pub letter_type: LetterType,
    pub document_number: String,
    pub applicant_name: String,
    /// Phone number as submitted; providers normalise it.
    pub contact_phone: String,
}

impl LetterFinishedNotice {
    /// Message text delivered to the applicant.
    pub fn message(&self) -> String {
        let number = if self.document_number.trim().is_empty() {
            String::new()
        } else {
            format!(" dengan nomor {}", self.document_number.trim())
        };
        format!(
            "Yth. {}, {}{} telah selesai diproses dan dapat diambil di kantor desa.",
            self.applicant_name,
            self.letter_type.descriptor().display_name,
            number
        )
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    Sent,
    /// Notifications are disabled by configuration.
    Skipped,
    /// Sending failed; the caller only logs this.
    Failed(String),
}

#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_letter_finished(&self, notice: LetterFinishedNotice) -> NotificationResult;
}

/// Notification service that records notices instead of sending them.
#[derive(Debug, Default)]
pub struct MockNotificationService {
    simulate_failure: bool,
    sent: Mutex<Vec<LetterFinishedNotice>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails every send.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notices received so far.
    pub fn sent(&self) -> Vec<LetterFinishedNotice> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_letter_finished(&self, notice: LetterFinishedNotice) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(request_id = %notice.request_id, "Mock notification service simulating failure");
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            request_id = %notice.request_id,
            letter_type = %notice.letter_type,
            "Mock: Would send letter_finished notification"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice);
        }
        NotificationResult::Sent
    }
}

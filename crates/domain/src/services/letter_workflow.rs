//! Letter request workflow: public intake and admin moderation.
//!
//! Submission is public. Every other operation takes an [`AdminIdentity`],
//! which only the auth gate can produce, so unauthenticated callers cannot
//! reach the store.

use chrono::Utc;
use shared::validation::validate_phone_number;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;
use validator::Validate;

use crate::error::{collect_field_errors, FieldError};
use crate::models::{
    LetterFields, LetterRequest, LetterRequestUpdate, LetterStatus, LetterSubmission, LetterType,
    NewLetterRequest, PendingCount, StatusFilter,
};
use crate::services::auth_gate::AdminIdentity;
use crate::services::captcha::CaptchaVerifier;
use crate::services::notification::{LetterFinishedNotice, NotificationResult, NotificationService};
use crate::store::{LetterRequestStore, StoreError};

/// Wire name of the contact phone field.
pub const CONTACT_PHONE_FIELD: &str = "nomorWhatsApp";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Anti-automation verification failed")]
    AntiAutomationFailed,

    #[error("Letter request not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldError> for WorkflowError {
    fn from(error: FieldError) -> Self {
        WorkflowError::Validation(vec![error])
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Orchestrates letter requests over an injected store.
#[derive(Clone)]
pub struct LetterWorkflow {
    store: Arc<dyn LetterRequestStore>,
    captcha: Arc<dyn CaptchaVerifier>,
    notifier: Arc<dyn NotificationService>,
}

impl LetterWorkflow {
    pub fn new(
        store: Arc<dyn LetterRequestStore>,
        captcha: Arc<dyn CaptchaVerifier>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            store,
            captcha,
            notifier,
        }
    }

    /// Validates, verifies and persists a citizen submission.
    ///
    /// Field validation runs before the anti-automation call, and both run
    /// before anything is written.
    pub async fn submit(&self, submission: LetterSubmission) -> WorkflowResult<LetterRequest> {
        let LetterSubmission {
            letter_type,
            fields,
            contact_phone,
            anti_automation_token,
            remote_ip,
        } = submission;

        let mut errors = Vec::new();
        let fields = match LetterFields::parse(letter_type, fields) {
            Ok(fields) => Some(fields),
            Err(e) => {
                errors.extend(e);
                None
            }
        };

        let phone = contact_phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        match &phone {
            None => errors.push(FieldError::new(CONTACT_PHONE_FIELD, "WhatsApp number is required")),
            Some(p) => {
                if let Err(e) = validate_phone_number(p) {
                    let message = e
                        .message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid phone number".to_string());
                    errors.push(FieldError::new(CONTACT_PHONE_FIELD, message));
                }
            }
        }

        let (Some(fields), Some(phone), true) = (fields, phone, errors.is_empty()) else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(WorkflowError::Validation(errors));
        };

        let token = anti_automation_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::warn!(letter_type = %letter_type, "Submission without anti-automation token");
                WorkflowError::AntiAutomationFailed
            })?;

        self.captcha
            .verify(token, remote_ip.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(letter_type = %letter_type, error = %e, "Anti-automation verification failed");
                WorkflowError::AntiAutomationFailed
            })?;

        let record = self
            .store
            .insert(NewLetterRequest::pending(fields, phone, Utc::now()))
            .await?;

        tracing::info!(
            request_id = %record.id,
            letter_type = %record.letter_type,
            "Letter request submitted"
        );

        Ok(record)
    }

    /// Lists requests of one type, most recent first.
    pub async fn list(
        &self,
        admin: &AdminIdentity,
        letter_type: LetterType,
        filter: StatusFilter,
    ) -> WorkflowResult<Vec<LetterRequest>> {
        let records = self.store.list(letter_type, filter.as_status()).await?;
        tracing::debug!(
            admin = %admin.email(),
            letter_type = %letter_type,
            count = records.len(),
            "Listed letter requests"
        );
        Ok(records)
    }

    /// Fetches one request; a record of another type counts as missing.
    pub async fn get(
        &self,
        _admin: &AdminIdentity,
        letter_type: LetterType,
        id: Uuid,
    ) -> WorkflowResult<LetterRequest> {
        self.find_of_type(letter_type, id).await
    }

    /// Sets the document number and/or status and refreshes `updated_at`.
    ///
    /// Any status change is accepted, including Finished back to Pending.
    /// Moving a record to Finished notifies the applicant.
    pub async fn update(
        &self,
        admin: &AdminIdentity,
        letter_type: LetterType,
        id: Uuid,
        mut update: LetterRequestUpdate,
    ) -> WorkflowResult<LetterRequest> {
        update
            .validate()
            .map_err(|e| WorkflowError::Validation(collect_field_errors(&e)))?;
        if let Some(number) = update.document_number.as_mut() {
            *number = number.trim().to_string();
        }

        let existing = self.find_of_type(letter_type, id).await?;

        let updated = self
            .store
            .update(id, &update, Utc::now())
            .await?
            .ok_or(WorkflowError::NotFound)?;

        tracing::info!(
            admin = %admin.email(),
            request_id = %id,
            letter_type = %letter_type,
            status = %updated.status,
            document_number = %updated.document_number,
            "Letter request updated"
        );

        match (existing.status, updated.status) {
            (LetterStatus::Pending, LetterStatus::Finished) => self.notify_finished(&updated).await,
            (LetterStatus::Finished, LetterStatus::Pending) => {
                tracing::warn!(
                    admin = %admin.email(),
                    request_id = %id,
                    "Letter request moved from finish back to pending"
                );
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Hard-deletes a request.
    pub async fn delete(
        &self,
        admin: &AdminIdentity,
        letter_type: LetterType,
        id: Uuid,
    ) -> WorkflowResult<()> {
        self.find_of_type(letter_type, id).await?;
        if !self.store.delete(id).await? {
            return Err(WorkflowError::NotFound);
        }

        tracing::info!(
            admin = %admin.email(),
            request_id = %id,
            letter_type = %letter_type,
            "Letter request deleted"
        );
        Ok(())
    }

    /// Counts pending requests for one type, or for every type concurrently.
    ///
    /// One failed per-type query fails the whole aggregate.
    pub async fn count_pending(
        &self,
        _admin: &AdminIdentity,
        letter_type: Option<LetterType>,
    ) -> WorkflowResult<PendingCount> {
        if let Some(letter_type) = letter_type {
            let count = self.store.count_pending(letter_type).await?;
            return Ok(PendingCount::Single { letter_type, count });
        }

        let mut tasks = JoinSet::new();
        for letter_type in LetterType::ALL {
            let store = Arc::clone(&self.store);
            tasks.spawn(async move { (letter_type, store.count_pending(letter_type).await) });
        }

        let mut types = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (letter_type, result) =
                joined.map_err(|e| StoreError::Backend(format!("pending count task failed: {}", e)))?;
            types.insert(letter_type, result?);
        }

        let total = types.values().sum();
        Ok(PendingCount::Summary { total, types })
    }

    async fn find_of_type(&self, letter_type: LetterType, id: Uuid) -> WorkflowResult<LetterRequest> {
        match self.store.find_by_id(id).await? {
            Some(record) if record.letter_type == letter_type => Ok(record),
            _ => Err(WorkflowError::NotFound),
        }
    }

    async fn notify_finished(&self, record: &LetterRequest) {
        let notice = LetterFinishedNotice {
            request_id: record.id,
            letter_type: record.letter_type,
            document_number: record.document_number.clone(),
            applicant_name: record.fields.subject_name().to_string(),
            contact_phone: record.contact_phone.clone(),
        };

        match self.notifier.send_letter_finished(notice).await {
            NotificationResult::Sent => {
                tracing::info!(request_id = %record.id, "Applicant notified of finished letter");
            }
            NotificationResult::Skipped => {
                tracing::debug!(request_id = %record.id, "Finished-letter notification skipped");
            }
            NotificationResult::Failed(reason) => {
                tracing::warn!(
                    request_id = %record.id,
                    reason = %reason,
                    "Failed to notify applicant of finished letter"
                );
            }
        }
    }
}

//! Letter request ("layanan surat") endpoint handlers.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{
    LetterRequestUpdate, LetterSubmission, StatusFilter, SubmitLetterResponse,
};
use domain::services::{WorkflowError, CONTACT_PHONE_FIELD};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

use super::params;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::middleware::client_ip;
use crate::middleware::metrics::{
    record_anti_automation_rejected, record_document_rendered, record_letter_status,
    record_letter_submitted,
};
use crate::services::pdf::{letter_file_name, render_date, render_letter};

/// Body key carrying the anti-automation token.
pub const ANTI_AUTOMATION_FIELD: &str = "recaptchaToken";

#[derive(Debug, Default, Deserialize)]
pub struct LetterQuery {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountQuery {
    pub letter_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Submit a letter request.
///
/// POST /api/layanan/:letter_type
pub async fn submit_letter(
    State(state): State<AppState>,
    Path(letter_type): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitLetterResponse>), ApiError> {
    let letter_type = params::letter_type(&letter_type)?;

    let mut fields = match params::json_body::<serde_json::Value>(&body)? {
        serde_json::Value::Object(map) => map,
        _ => return Err(ApiError::Validation("Request body must be a JSON object".into())),
    };
    let contact_phone = take_string(&mut fields, CONTACT_PHONE_FIELD);
    let anti_automation_token = take_string(&mut fields, ANTI_AUTOMATION_FIELD);

    let submission = LetterSubmission {
        letter_type,
        fields: serde_json::Value::Object(fields),
        contact_phone,
        anti_automation_token,
        remote_ip: client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr)),
    };

    let record = state.letters.submit(submission).await.map_err(|e| {
        if matches!(e, WorkflowError::AntiAutomationFailed) {
            record_anti_automation_rejected(letter_type);
        }
        ApiError::from(e)
    })?;
    record_letter_submitted(letter_type);

    Ok((StatusCode::CREATED, Json(SubmitLetterResponse { id: record.id })))
}

/// Removes a string value from the body; non-string values are dropped.
fn take_string(fields: &mut serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(serde_json::Value::String(value)) => Some(value),
        _ => None,
    }
}

/// List requests of a type, or fetch one when `id` is given.
///
/// GET /api/admin/layanan/:letter_type?status=pending|finish|all&id=<uuid>
pub async fn list_letters(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(letter_type): Path<String>,
    Query(query): Query<LetterQuery>,
) -> Result<Response, ApiError> {
    let letter_type = params::letter_type(&letter_type)?;

    if query.id.is_some() {
        let id = params::record_id(query.id.as_deref())?;
        let record = state.letters.get(&admin, letter_type, id).await?;
        return Ok(Json(record).into_response());
    }

    let filter = StatusFilter::parse(query.status.as_deref())?;
    let records = state.letters.list(&admin, letter_type, filter).await?;
    Ok(Json(records).into_response())
}

/// Set the document number and/or status of a request.
///
/// PUT /api/admin/layanan/:letter_type?id=<uuid>
pub async fn update_letter(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(letter_type): Path<String>,
    Query(query): Query<LetterQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let letter_type = params::letter_type(&letter_type)?;
    let id = params::record_id(query.id.as_deref())?;
    let update: LetterRequestUpdate = params::json_body(&body)?;
    let status_changed = update.status.is_some();

    let updated = state.letters.update(&admin, letter_type, id, update).await?;
    if status_changed {
        record_letter_status(letter_type, updated.status);
    }

    Ok(Json(updated).into_response())
}

/// Hard-delete a request.
///
/// DELETE /api/admin/layanan/:letter_type?id=<uuid>
pub async fn delete_letter(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(letter_type): Path<String>,
    Query(query): Query<LetterQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let letter_type = params::letter_type(&letter_type)?;
    let id = params::record_id(query.id.as_deref())?;

    state.letters.delete(&admin, letter_type, id).await?;

    Ok(Json(DeleteResponse { id, deleted: true }))
}

/// Pending counts for one type, or for every type with a total.
///
/// GET /api/admin/layanan/pending-count?letterType=<slug>
pub async fn pending_count(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PendingCountQuery>,
) -> Result<Response, ApiError> {
    let letter_type = query
        .letter_type
        .as_deref()
        .map(params::letter_type)
        .transpose()?;

    let counts = state.letters.count_pending(&admin, letter_type).await?;
    Ok(Json(counts).into_response())
}

/// Download a request rendered as a PDF letter.
///
/// GET /api/admin/layanan/:letter_type/pdf?id=<uuid>
pub async fn letter_pdf(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(letter_type): Path<String>,
    Query(query): Query<LetterQuery>,
) -> Result<Response, ApiError> {
    let letter_type = params::letter_type(&letter_type)?;
    let id = params::record_id(query.id.as_deref())?;

    let record = state.letters.get(&admin, letter_type, id).await?;
    let bytes = render_letter(&record, &state.config.village, render_date())?;
    record_document_rendered("letter");

    tracing::info!(
        admin = %admin.email(),
        request_id = %id,
        letter_type = %letter_type,
        "Letter rendered"
    );

    Ok(pdf_response(bytes, &letter_file_name(&record)))
}

pub(crate) fn pdf_response(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_string_removes_key() {
        let mut fields = json!({"nama": "Budi", "nomorWhatsApp": "081234567890", "recaptchaToken": 5})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(
            take_string(&mut fields, CONTACT_PHONE_FIELD).as_deref(),
            Some("081234567890")
        );
        assert_eq!(take_string(&mut fields, ANTI_AUTOMATION_FIELD), None);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response(b"%PDF-1.5".to_vec(), "surat.pdf");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"surat.pdf\""
        );
    }
}

//! Admin CRUD over content entities.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::ContentEntity;
use uuid::Uuid;

use super::layanan::DeleteResponse;
use super::params;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;

/// GET /api/admin/:entity_type
pub async fn list_content(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
) -> Result<Json<Vec<ContentEntity>>, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    Ok(Json(state.content.list(&admin, kind).await?))
}

/// GET /api/admin/:entity_type/:id
pub async fn get_content(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<ContentEntity>, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let id = params::record_id(Some(id.as_str()))?;
    Ok(Json(state.content.get(&admin, kind, id).await?))
}

/// Create an entity; the slug is derived from its title or name.
///
/// POST /api/admin/:entity_type
pub async fn create_content(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ContentEntity>), ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let payload: serde_json::Value = params::json_body(&body)?;

    let entity = state.content.create(&admin, kind, payload).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// Partially update an entity.
///
/// PUT /api/admin/:entity_type/:id
pub async fn update_content(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ContentEntity>, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let id = params::record_id(Some(id.as_str()))?;
    let patch: serde_json::Value = params::json_body(&body)?;

    Ok(Json(state.content.update(&admin, kind, id, patch).await?))
}

/// DELETE /api/admin/:entity_type/:id
pub async fn delete_content(
    AdminAuth(admin): AdminAuth,
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let id: Uuid = params::record_id(Some(id.as_str()))?;

    state.content.delete(&admin, kind, id).await?;
    Ok(Json(DeleteResponse { id, deleted: true }))
}

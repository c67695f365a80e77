//! Public read projections over published content.
//!
//! These handlers never fail on store errors: the service degrades to an
//! empty list or a missing entity.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{ContentKind, ContentPayload};
use serde::Deserialize;

use super::layanan::pdf_response;
use super::params;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_document_rendered;
use crate::services::pdf::{budget_file_name, render_budget, render_date};

pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=60, stale-while-revalidate=300";

#[derive(Debug, Default, Deserialize)]
pub struct PublicListQuery {
    pub limit: Option<usize>,
}

fn cached(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(PUBLIC_CACHE_CONTROL),
    );
    response
}

/// Published entities of a type, most recent first.
///
/// GET /api/public/:entity_type?limit=N
pub async fn list_published(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    Query(query): Query<PublicListQuery>,
) -> Result<Response, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let entities = state.public_content.list_published(kind, query.limit).await;
    Ok(cached(Json(entities).into_response()))
}

/// GET /api/public/:entity_type/:slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path((entity_type, slug)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    let entity = state
        .public_content
        .get_by_slug(kind, &slug)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No {} with slug '{}'", kind, slug)))?;
    Ok(cached(Json(entity).into_response()))
}

/// Download a published budget snapshot as a PDF.
///
/// GET /api/public/apbdes/:slug/pdf
pub async fn budget_pdf(
    State(state): State<AppState>,
    Path((entity_type, slug)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = params::content_kind(&entity_type)?;
    if kind != ContentKind::Budget {
        return Err(ApiError::NotFound(format!("No document for {}", kind)));
    }

    let entity = state
        .public_content
        .get_by_slug(kind, &slug)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No budget with slug '{}'", slug)))?;
    let ContentPayload::Budget(budget) = &entity.payload else {
        return Err(ApiError::Internal(format!(
            "Entity {} stored as apbdes carries another payload",
            entity.id
        )));
    };

    let bytes = render_budget(budget, &state.config.village, render_date())?;
    record_document_rendered("budget");

    Ok(cached(pdf_response(bytes, &budget_file_name(&slug))))
}

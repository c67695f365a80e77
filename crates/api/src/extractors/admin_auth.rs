//! Admin bearer-token extractor.
//!
//! Every admin handler takes [`AdminAuth`] as its first extractor, so the auth
//! gate runs before any query parsing, body validation or store access.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use domain::services::AdminIdentity;

use crate::app::AppState;
use crate::error::ApiError;

/// An admitted admin caller.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AdminIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // a missing or non-Bearer header is treated as no credential
        let credential = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = credential.as_ref().map(|TypedHeader(auth)| auth.token());

        let identity = state.auth_gate.verify_admin(token).await?;
        Ok(AdminAuth(identity))
    }
}

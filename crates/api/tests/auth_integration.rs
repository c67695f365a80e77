//! Admin authentication boundary tests.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

const ADMIN_ROUTES: [&str; 4] = [
    "/api/admin/layanan/surat-keterangan-kelahiran",
    "/api/admin/layanan/pending-count",
    "/api/admin/berita",
    "/api/admin/layanan/surat-keterangan-kelahiran/pdf?id=00000000-0000-0000-0000-000000000000",
];

#[tokio::test]
async fn test_missing_credential_is_unauthorized_without_store_access() {
    let app = TestApp::new();
    for uri in ADMIN_ROUTES {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.json()["error"], "unauthorized");
    }
    assert_eq!(app.letters.calls(), 0);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app.get(ADMIN_BIRTH, Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let expired = identity_token(ADMIN_EMAIL, -600);
    let response = app.get(ADMIN_BIRTH, Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.letters.calls(), 0);
}

#[tokio::test]
async fn test_verified_non_admin_is_forbidden_without_store_access() {
    let app = TestApp::new();
    let token = identity_token("warga@gmail.com", 3600);

    let response = app.get(ADMIN_BIRTH, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "forbidden");

    let response = app
        .put(
            &format!("{}?id=00000000-0000-0000-0000-000000000000", ADMIN_BIRTH),
            json!({"status": "finish"}),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post("/api/admin/berita", json!({"title": "Hoaks"}), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.letters.calls(), 0);
}

#[tokio::test]
async fn test_unverified_admin_email_is_forbidden() {
    let app = TestApp::new();
    let token = signed_identity_token(ADMIN_EMAIL, 3600, false);

    let response = app.get(ADMIN_BIRTH, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "forbidden");
    assert_eq!(app.letters.calls(), 0);
}

#[tokio::test]
async fn test_allow_list_is_case_insensitive() {
    let app = TestApp::new();
    let token = identity_token("SEKDES@Sukamaju.Desa.ID", 3600);
    let response = app.get(ADMIN_BIRTH, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_auth_is_checked_before_letter_type() {
    let app = TestApp::new();
    let response = app.get("/api/admin/layanan/surat-sakti", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .get("/api/admin/layanan/surat-sakti", Some(&admin_token()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_submission_needs_no_credential() {
    let app = TestApp::new();
    submit(&app, BIRTH, birth_submission()).await;
    assert_eq!(app.letters.len(), 1);
}

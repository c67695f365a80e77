//! Content management and public projection tests.

mod common;

use axum::http::{header, StatusCode};
use common::*;
use serde_json::{json, Value};
use village_portal_api::routes::public::PUBLIC_CACHE_CONTROL;

fn news(title: &str) -> Value {
    json!({
        "title": title,
        "content": "Warga bergotong royong membersihkan saluran irigasi.",
        "author": "Admin Desa"
    })
}

async fn create(app: &TestApp, kind: &str, body: Value) -> Value {
    let response = app
        .post(&format!("/api/admin/{}", kind), body, Some(&admin_token()))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "body: {:?}", response.json());
    response.json()
}

#[tokio::test]
async fn test_create_news_derives_slug() {
    let app = TestApp::new();
    let entity = create(&app, "berita", news("Gotong Royong: Bersih Kali!")).await;

    assert_eq!(entity["entityType"], "berita");
    assert_eq!(entity["slug"], "gotong-royong-bersih-kali");
    assert_eq!(entity["title"], "Gotong Royong: Bersih Kali!");
    assert_eq!(entity["published"], true);
    assert!(entity["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let app = TestApp::new();
    let response = app
        .post("/api/admin/berita", json!({"title": ""}), Some(&admin_token()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let json = response.json();
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"content"));
}

#[tokio::test]
async fn test_public_listing_is_published_only_and_cached() {
    let app = TestApp::new();
    create(&app, "berita", news("Musyawarah Desa 2025")).await;
    let mut draft = news("Rencana Pembangunan Jalan");
    draft["published"] = json!(false);
    create(&app, "berita", draft).await;
    create(&app, "berita", news("Posyandu Balita Mawar")).await;

    let response = app.get("/api/public/berita", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CACHE_CONTROL], PUBLIC_CACHE_CONTROL);

    let listed = response.json();
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Posyandu Balita Mawar", "Musyawarah Desa 2025"]);

    let limited = app.get("/api/public/berita?limit=1", None).await.json();
    assert_eq!(limited.as_array().unwrap().len(), 1);
    assert_eq!(limited[0]["title"], "Posyandu Balita Mawar");

    // Admin listing includes the draft
    let all = app.get("/api/admin/berita", Some(&admin_token())).await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_by_slug_hides_unpublished() {
    let app = TestApp::new();
    create(&app, "berita", news("Musyawarah Desa 2025")).await;
    let mut draft = news("Rencana Pembangunan Jalan");
    draft["published"] = json!(false);
    create(&app, "berita", draft).await;

    let response = app.get("/api/public/berita/musyawarah-desa-2025", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["title"], "Musyawarah Desa 2025");

    let response = app
        .get("/api/public/berita/rencana-pembangunan-jalan", None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_update_changes_slug() {
    let app = TestApp::new();
    let token = admin_token();
    let entity = create(&app, "berita", news("Musyawarah Desa")).await;
    let uri = format!("/api/admin/berita/{}", entity["id"].as_str().unwrap());

    // A patch without the title keeps the slug
    let response = app.put(&uri, json!({"author": "Sekdes"}), Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json();
    assert_eq!(updated["slug"], "musyawarah-desa");
    assert_eq!(updated["author"], "Sekdes");
    assert_eq!(updated["title"], "Musyawarah Desa");

    let response = app
        .put(&uri, json!({"title": "Musyawarah Desa Khusus"}), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["slug"], "musyawarah-desa-khusus");

    let old = app.get("/api/public/berita/musyawarah-desa", None).await;
    assert_eq!(old.status, StatusCode::NOT_FOUND);
    let new = app.get("/api/public/berita/musyawarah-desa-khusus", None).await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_content() {
    let app = TestApp::new();
    let token = admin_token();
    let entity = create(&app, "berita", news("Musyawarah Desa")).await;
    let uri = format!("/api/admin/berita/{}", entity["id"].as_str().unwrap());

    assert_eq!(app.delete(&uri, Some(&token)).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&token)).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, Some(&token)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entity_is_scoped_to_its_kind() {
    let app = TestApp::new();
    let entity = create(&app, "berita", news("Musyawarah Desa")).await;
    let uri = format!("/api/admin/umkm/{}", entity["id"].as_str().unwrap());
    assert_eq!(
        app.get(&uri, Some(&admin_token())).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_public_reads_degrade_when_store_fails() {
    let app = TestApp::new();
    create(&app, "berita", news("Musyawarah Desa")).await;
    app.content.set_failing(true);

    let response = app.get("/api/public/berita", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
    assert_eq!(response.headers[header::CACHE_CONTROL], PUBLIC_CACHE_CONTROL);

    let response = app.get("/api/public/berita/musyawarah-desa", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Admin reads surface the failure
    let response = app.get("/api/admin/berita", Some(&admin_token())).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_content_kind_is_not_found() {
    let app = TestApp::new();
    assert_eq!(
        app.get("/api/public/pengumuman", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/admin/pengumuman", Some(&admin_token())).await.status,
        StatusCode::NOT_FOUND
    );
}

//! Signed asset route and service-level endpoints.
//!
//! Run with: `cargo test -p tubely-api --test assets_test`

mod helpers;

use helpers::{fake_mp4, setup_test_app, token_for, TEST_BASE_URL};
use uuid::Uuid;

/// Upload a video and return the path+query of its signed URL.
async fn uploaded_asset_path(app: &helpers::TestApp, bytes: Vec<u8>) -> String {
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let response = app
        .upload(&video.id.to_string(), &token_for(owner), "video/mp4", bytes)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let url = body["video_url"].as_str().expect("video_url is set");
    let rest = url
        .strip_prefix(TEST_BASE_URL)
        .expect("url starts with the asset base");
    format!("/assets{}", rest)
}

#[tokio::test]
async fn test_signed_url_serves_object() {
    let app = setup_test_app().await;
    let bytes = fake_mp4(2048);
    let path = uploaded_asset_path(&app, bytes.clone()).await;

    let response = app.client().get(&path).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "video/mp4");
    assert_eq!(response.header("content-length"), bytes.len().to_string());
    assert_eq!(response.as_bytes().to_vec(), bytes);
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let app = setup_test_app().await;
    let path = uploaded_asset_path(&app, fake_mp4(256)).await;

    let (base, _) = path.split_once("signature=").expect("signature present");
    let tampered = format!("{}signature=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", base);
    let response = app.client().get(&tampered).await;
    assert_eq!(response.status_code(), 401);

    let (key_path, _) = path.split_once('?').expect("query present");
    let response = app.client().get(key_path).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_signature_is_bound_to_key() {
    let app = setup_test_app().await;
    let path = uploaded_asset_path(&app, fake_mp4(256)).await;

    let (_, query) = path.split_once('?').expect("query present");
    let response = app
        .client()
        .get(&format!("/assets/landscape/ffffffffffffffff.mp4?{}", query))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec: serde_json::Value = response.json();
    assert!(spec["paths"]["/api/videos/{video_id}/video"].is_object());
}

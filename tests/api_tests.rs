use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestRequest, TestServer};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower_http::services::ServeDir;

use wearwhat_api::{
    db::MemoryDocumentStore,
    error::AppResult,
    models::ChatMessage,
    routes::{create_router, AppState, AppStateBuilder},
    services::{
        auth::SessionKeys,
        blob::LocalBlobStore,
        imaging::HttpImageFetcher,
        providers::ChatProvider,
        tagging::Tagger,
    },
};

struct TestApp {
    server: TestServer,
    media: TempDir,
}

/// Serves the media directory on a real loopback port so composites can
/// download uploaded outfit photos over HTTP.
async fn spawn_media_server(dir: &Path) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().nest_service("/media", ServeDir::new(dir.to_path_buf()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn builder(media: &TempDir) -> AppStateBuilder {
    let base_url = spawn_media_server(media.path()).await;
    AppState::builder(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(LocalBlobStore::new(media.path(), base_url)),
        Arc::new(HttpImageFetcher::new(Duration::from_secs(5)).unwrap()),
        SessionKeys::new("test-secret", 3600),
    )
}

async fn create_test_app() -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let state = builder(&media).await.build().unwrap();
    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        media,
    }
}

fn png(color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(120, 160, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn authed(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::COOKIE,
        HeaderValue::from_str(&format!("auth_token={}", token)).unwrap(),
    )
}

async fn signup_and_login(server: &TestServer, email: &str) -> String {
    server
        .post("/auth/signup")
        .json(&json!({"username": "sam", "email": email, "password": "hunter22"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/auth/login")
        .json(&json!({"email": email, "password": "hunter22"}))
        .await;
    response.assert_status_ok();
    response.cookie("auth_token").value().to_string()
}

async fn upload(server: &TestServer, token: &str, color: [u8; 3]) -> String {
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(png(color))
            .file_name("item.png")
            .mime_type("image/png"),
    );
    let response = authed(server.post("/outfit/upload-outfit"), token)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["outfit_id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn current_plan(server: &TestServer, token: &str) -> Value {
    let response = authed(server.get("/weekly/plan"), token).await;
    response.assert_status_ok();
    response.json::<Value>()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "healthy"}));

    app.server.get("/").await.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app().await;
    let response = app
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-42"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-42");
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let app = create_test_app().await;

    app.server
        .post("/auth/signup")
        .json(&json!({"username": "", "email": "a@example.com", "password": "pw"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    signup_and_login(&app.server, "a@example.com").await;

    let response = app
        .server
        .post("/auth/signup")
        .json(&json!({"username": "other", "email": "A@Example.com", "password": "pw"}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = create_test_app().await;
    signup_and_login(&app.server, "b@example.com").await;

    app.server
        .post("/auth/login")
        .json(&json!({"email": "b@example.com", "password": "wrong"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post("/auth/login")
        .json(&json!({"email": "nobody@example.com", "password": "hunter22"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_cookie() {
    let app = create_test_app().await;

    let response = app.server.get("/outfit/get-outfits").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({"error": "No auth cookie"}));

    let response = authed(app.server.get("/weekly/plan"), "garbage").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({"error": "Invalid token"}));
}

#[tokio::test]
async fn test_session_and_logout() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "c@example.com").await;

    let response = authed(app.server.get("/auth/session"), &token).await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["email"], "c@example.com");
    assert_eq!(session["username"], "sam");

    let response = authed(app.server.post("/auth/logout"), &token).await;
    response.assert_status_ok();
    let set_cookie = response.header("set-cookie");
    assert!(set_cookie.to_str().unwrap().starts_with("auth_token="));
}

#[tokio::test]
async fn test_create_plan_with_empty_wardrobe() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "d@example.com").await;

    let response = authed(app.server.put("/weekly/create-plan"), &token)
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "error": "No outfits found in wardrobe. Please add some outfits first."
    }));

    let plan = current_plan(&app.server, &token).await;
    assert_eq!(plan, json!({"weekly_plans": []}));
}

#[tokio::test]
async fn test_upload_tags_and_lists_outfit() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "e@example.com").await;

    let outfit_id = upload(&app.server, &token, [200, 30, 30]).await;

    let response = authed(app.server.get("/outfit/get-outfits"), &token).await;
    response.assert_status_ok();
    let outfits = response.json::<Value>()["outfits"].clone();
    assert_eq!(outfits.as_array().unwrap().len(), 1);

    let outfit = &outfits[0];
    assert_eq!(outfit["outfit_id"], outfit_id.as_str());
    assert!(outfit["tags"]["categoryGroup"].is_string());
    assert!(outfit["tags"]["category"].is_string());
    assert!(outfit["tags"]["color"].is_string());

    let image_id = outfit["image_id"].as_str().unwrap();
    assert!(app.media.path().join(image_id).exists());
}

/// Always picks the first label of every attribute
struct FirstLabelTagger;

impl Tagger for FirstLabelTagger {
    fn label(
        &self,
        _image: &image::DynamicImage,
        _attribute: &str,
        labels: &[String],
    ) -> Option<String> {
        labels.first().cloned()
    }

    fn name(&self) -> &'static str {
        "first-label"
    }
}

#[tokio::test]
async fn test_upload_uses_injected_tagger() {
    let media = tempfile::tempdir().unwrap();
    let state = builder(&media)
        .await
        .with_tagger(Arc::new(FirstLabelTagger))
        .build()
        .unwrap();
    let server = TestServer::new(create_router(state)).unwrap();
    let token = signup_and_login(&server, "tagger@example.com").await;

    upload(&server, &token, [10, 10, 10]).await;
    upload(&server, &token, [240, 240, 240]).await;

    let response = authed(server.get("/outfit/get-outfits"), &token).await;
    let outfits = response.json::<Value>()["outfits"].clone();
    let outfits = outfits.as_array().unwrap();
    assert_eq!(outfits.len(), 2);
    for outfit in outfits {
        assert_eq!(outfit["tags"]["color"], "White");
    }
    assert_eq!(outfits[0]["tags"], outfits[1]["tags"]);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "f@example.com").await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    authed(app.server.post("/outfit/upload-outfit"), &token)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"not really a png".to_vec())
            .file_name("broken.png")
            .mime_type("image/png"),
    );
    authed(app.server.post("/outfit/upload-outfit"), &token)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let form = MultipartForm::new().add_text("note", "no file here");
    authed(app.server.post("/outfit/upload-outfit"), &token)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weekly_plan_generation() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "g@example.com").await;

    let mut wardrobe = HashSet::new();
    for i in 0..6u8 {
        wardrobe.insert(upload(&app.server, &token, [i * 40, 100, 150]).await);
    }

    let response = authed(app.server.put("/weekly/create-plan"), &token)
        .json(&json!({}))
        .await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["result"], true);
    let plan_id = created["plan_id"].as_str().unwrap().to_string();

    let plans = current_plan(&app.server, &token).await;
    let plans = plans["weekly_plans"].as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["plan_id"], plan_id.as_str());

    let daily = plans[0]["daily_plans"].as_object().unwrap();
    let keys: Vec<&str> = daily.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["day1", "day2", "day3"]);

    for day in daily.values() {
        let ids: Vec<&str> = day["outfit_ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|id| id.as_str().unwrap())
            .collect();
        assert!((3..=5).contains(&ids.len()));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        assert!(ids.iter().all(|id| wardrobe.contains(*id)));
        assert!(day["image_url"].as_str().unwrap().contains("/media/"));
        assert!(day["temperature"].is_null());
    }
}

#[tokio::test]
async fn test_regenerating_replaces_plan() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "h@example.com").await;
    upload(&app.server, &token, [10, 10, 10]).await;
    upload(&app.server, &token, [90, 90, 90]).await;

    let mut last_id = String::new();
    for _ in 0..2 {
        let response = authed(app.server.put("/weekly/create-plan"), &token)
            .json(&json!({"latitude": 52.5, "longitude": 13.4}))
            .await;
        response.assert_status_ok();
        last_id = response.json::<Value>()["plan_id"]
            .as_str()
            .unwrap()
            .to_string();
    }

    let plans = current_plan(&app.server, &token).await;
    let plans = plans["weekly_plans"].as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["plan_id"], last_id.as_str());

    // Small wardrobe: every day uses the whole wardrobe
    for day in plans[0]["daily_plans"].as_object().unwrap().values() {
        assert_eq!(day["outfit_ids"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_deleted_outfits_drop_out_of_plan() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "i@example.com").await;
    let outfit_id = upload(&app.server, &token, [1, 2, 3]).await;

    authed(app.server.put("/weekly/create-plan"), &token)
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = authed(app.server.delete("/outfit/delete-outfit"), &token)
        .add_query_param("outfit_id", &outfit_id)
        .await;
    response.assert_status_ok();

    let plans = current_plan(&app.server, &token).await;
    for day in plans["weekly_plans"][0]["daily_plans"]
        .as_object()
        .unwrap()
        .values()
    {
        assert!(day["outfit_ids"].as_array().unwrap().is_empty());
    }

    authed(app.server.delete("/outfit/delete-outfit"), &token)
        .add_query_param("outfit_id", &outfit_id)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_outfit_tags() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "j@example.com").await;
    let outfit_id = upload(&app.server, &token, [5, 5, 5]).await;

    authed(app.server.put("/outfit/update-outfit"), &token)
        .json(&json!({"outfit_id": outfit_id, "tags": {"color": "Black"}}))
        .await
        .assert_status_ok();

    let response = authed(app.server.get("/outfit/get-outfits"), &token).await;
    let outfits: Value = response.json();
    assert_eq!(outfits["outfits"][0]["tags"], json!({"color": "Black"}));

    authed(app.server.put("/outfit/update-outfit"), &token)
        .json(&json!({"outfit_id": "missing", "tags": {}}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wardrobes_are_isolated() {
    let app = create_test_app().await;
    let owner = signup_and_login(&app.server, "owner@example.com").await;
    let other = signup_and_login(&app.server, "other@example.com").await;
    let outfit_id = upload(&app.server, &owner, [50, 60, 70]).await;

    authed(app.server.delete("/outfit/delete-outfit"), &other)
        .add_query_param("outfit_id", &outfit_id)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = authed(app.server.get("/outfit/get-outfits"), &other).await;
    assert_eq!(response.json::<Value>()["outfits"], json!([]));
}

#[tokio::test]
async fn test_suggest_outfit() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "k@example.com").await;

    authed(app.server.post("/outfit/suggest-outfit"), &token)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    for i in 0..4u8 {
        upload(&app.server, &token, [i, i, i]).await;
    }

    let response = authed(app.server.post("/outfit/suggest-outfit"), &token)
        .json(&json!({"temperature": 18.0}))
        .await;
    response.assert_status_ok();
    let suggestion: Value = response.json();
    let count = suggestion["outfits"].as_array().unwrap().len();
    assert!((3..=4).contains(&count));
    assert!(suggestion["composite_image_url"].is_string());
}

#[tokio::test]
async fn test_delete_account_removes_everything() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "l@example.com").await;
    upload(&app.server, &token, [9, 9, 9]).await;

    authed(app.server.delete("/auth/account"), &token)
        .await
        .assert_status_ok();

    let response = authed(app.server.get("/auth/session"), &token).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({"error": "User not found"}));

    let remaining = std::fs::read_dir(app.media.path()).unwrap().count();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_chat_without_provider_is_server_error() {
    let app = create_test_app().await;
    let token = signup_and_login(&app.server, "m@example.com").await;

    authed(app.server.post("/chat/outfit-chat"), &token)
        .json(&json!({"message": "What goes with jeans?"}))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

struct EchoChat;

#[async_trait::async_trait]
impl ChatProvider for EchoChat {
    async fn complete(&self, messages: &[ChatMessage], temperature: f64) -> AppResult<String> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(format!("{} messages at {}: {}", messages.len(), temperature, last))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

#[tokio::test]
async fn test_chat_passes_context_and_temperature() {
    let media = tempfile::tempdir().unwrap();
    let state = builder(&media)
        .await
        .with_chat(Arc::new(EchoChat))
        .build()
        .unwrap();
    let server = TestServer::new(create_router(state)).unwrap();
    let token = signup_and_login(&server, "n@example.com").await;

    let response = authed(server.post("/chat/outfit-chat"), &token)
        .json(&json!({
            "message": "Rainy day ideas?",
            "temperature": 0.2,
            "context": {"city": "Berlin"}
        }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "response": "3 messages at 0.2: Rainy day ideas?",
        "image_urls": null,
        "result": true,
        "message": "Response generated"
    }));
}

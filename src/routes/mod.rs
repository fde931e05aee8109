use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware, REQUEST_ID_HEADER};

pub mod auth;
pub mod chat;
pub mod outfits;
pub mod state;
pub mod weekly;

pub use state::{AppState, AppStateBuilder};

/// Largest accepted outfit photo upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin.as_deref());
    let media_dir = state.media_dir.clone();
    let state = Arc::new(state);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/outfit", outfit_routes())
        .nest("/weekly", weekly_routes())
        .nest("/chat", chat_routes())
        .with_state(state);

    if let Some(dir) = media_dir {
        router = router.nest_service("/media", ServeDir::new(dir));
    }

    // Outermost first: the request id exists before the trace span opens
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(cors),
    )
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/session", get(auth::session))
        .route("/logout", post(auth::logout))
        .route("/account", delete(auth::delete_account))
}

fn outfit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload-outfit",
            post(outfits::upload_outfit).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/get-outfits", get(outfits::get_outfits))
        .route("/update-outfit", put(outfits::update_outfit))
        .route("/delete-outfit", delete(outfits::delete_outfit))
        .route("/suggest-outfit", post(outfits::suggest_outfit))
}

fn weekly_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-plan", put(weekly::create_plan))
        .route("/plan", get(weekly::get_plan))
}

fn chat_routes() -> Router<Arc<AppState>> {
    Router::new().route("/outfit-chat", post(chat::outfit_chat))
}

/// Credentialed CORS for a single configured origin
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => layer.allow_origin(origin).allow_credentials(true),
        None => layer,
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the WearWhat API" }))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

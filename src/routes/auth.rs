use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use uuid::Uuid;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::{AuthUser, AUTH_COOKIE},
    models::{LoginRequest, ResultResponse, SessionResponse, SignUpRequest, SignUpResponse, User},
    services::auth::{hash_password, verify_password},
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_response(user: &User, message: &str) -> SessionResponse {
    SessionResponse {
        user_id: user.user_id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        message: message.to_string(),
    }
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE).path("/").build()
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    let username = request.username.trim().to_string();
    let email = normalize_email(&request.email);

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username, email and password are required".to_string(),
        ));
    }

    let user = User {
        user_id: Uuid::new_v4().to_string(),
        username,
        email,
        password: hash_password(request.password).await?,
        created_at: Utc::now(),
    };
    state.users.create(&user).await?;

    tracing::info!(user_id = %user.user_id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: user.user_id,
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, user.password.clone()).await? {
        tracing::info!(user_id = %user.user_id, "Login rejected");
        return Err(invalid());
    }

    let token = state.sessions.issue(&user.user_id)?;
    let cookie = Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.cookie_secure);

    tracing::info!(user_id = %user.user_id, "User logged in");

    Ok((jar.add(cookie), Json(session_response(&user, "Login successful"))))
}

/// GET /auth/session
pub async fn session(AuthUser(user): AuthUser) -> Json<SessionResponse> {
    Json(session_response(&user, "Session valid"))
}

/// POST /auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ResultResponse>) {
    (
        jar.remove(removal_cookie()),
        Json(ResultResponse::ok("Logged out successfully")),
    )
}

/// DELETE /auth/account: removes the user with their plans, outfits and images
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ResultResponse>)> {
    let user_id = user.user_id();

    let plans = state.plans.delete_plans(user_id).await?;
    let outfits = state.outfits.delete_wardrobe(user_id).await?;

    for image_id in outfits.iter().filter_map(|o| o.image_id.as_deref()) {
        if let Err(e) = state.blobs.delete(image_id).await {
            tracing::warn!(error = %e, image_id = %image_id, "Failed to delete outfit image");
        }
    }

    state.users.delete(user_id).await?;

    tracing::info!(
        user_id = %user_id,
        plans = plans,
        outfits = outfits.len(),
        "Account deleted"
    );

    Ok((
        jar.remove(removal_cookie()),
        Json(ResultResponse::ok("Account deleted successfully")),
    ))
}

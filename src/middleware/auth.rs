use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::{
    error::AppError,
    models::User,
    routes::AppState,
    services::auth::TokenError,
};

pub const AUTH_COOKIE: &str = "auth_token";

/// The authenticated caller, resolved from the `auth_token` cookie.
///
/// The user id doubles as the wardrobe id.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| AppError::Unauthorized("No auth cookie".to_string()))?;

        let user_id = state.sessions.verify(&token).map_err(|e| match e {
            TokenError::Expired => AppError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid => AppError::Unauthorized("Invalid token".to_string()),
        })?;

        let user = state
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        tracing::Span::current().record("user_id", tracing::field::display(&user.user_id));

        Ok(AuthUser(user))
    }
}

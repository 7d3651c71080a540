//! API handlers for the Libris HTTP surface

pub mod accounts;
pub mod books;
pub mod health;
pub mod openapi;
pub mod pages;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

use crate::{error::AppError, models::user::SessionClaims, AppState};

/// Name of the session cookie set at login/signup
pub const SESSION_COOKIE: &str = "session";

/// Extractor for the authenticated principal. The session token is read
/// from the session cookie or from a Bearer header; requests without a
/// valid token are sent back to the login entry point.
pub struct AuthenticatedUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| session_cookie(parts))
            .ok_or_else(|| AppError::Authentication("Login required".to_string()))?;

        let claims = SessionClaims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired session".to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_string)
}

fn session_cookie(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

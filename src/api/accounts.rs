//! Account lifecycle endpoints: signup, login, logout

use axum::{
    extract::State,
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, SignupRequest},
};

use super::SESSION_COOKIE;

/// Prompt payload served at the login entry point
#[derive(Serialize, ToSchema)]
pub struct LoginPrompt {
    pub detail: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// Login entry point; unauthenticated requests are redirected here
#[utoipa::path(
    get,
    path = "/login/",
    tag = "accounts",
    responses(
        (status = 200, description = "Login prompt", body = LoginPrompt)
    )
)]
pub async fn login_prompt() -> Json<LoginPrompt> {
    Json(LoginPrompt {
        detail: "Authentication required. Submit username and password to this endpoint."
            .to_string(),
    })
}

/// Sign up: creates a non-staff, non-superuser account and immediately
/// establishes a session
#[utoipa::path(
    post,
    path = "/signup/",
    tag = "accounts",
    request_body = SignupRequest,
    responses(
        (status = 303, description = "Account created, session established, redirected home"),
        (status = 400, description = "Invalid submission")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> AppResult<(CookieJar, Redirect)> {
    let (token, _user) = state.services.accounts.signup(request).await?;
    Ok((jar.add(session_cookie(token)), Redirect::to("/")))
}

/// Log in and establish a session
#[utoipa::path(
    post,
    path = "/login/",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Session established, redirected home"),
        (status = 400, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Redirect)> {
    let (token, user) = state.services.accounts.login(request).await?;

    tracing::info!("User {} logged in", user.username);
    Ok((jar.add(session_cookie(token)), Redirect::to("/")))
}

/// Log out: clears the session cookie
#[utoipa::path(
    post,
    path = "/logout/",
    tag = "accounts",
    responses(
        (status = 303, description = "Session cleared, redirected to login")
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(expired_session_cookie()), Redirect::to("/login/"))
}

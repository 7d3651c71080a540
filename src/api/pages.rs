//! Home and about pages

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::AuthenticatedUser;

/// Home payload for the authenticated principal
#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    pub username: String,
    pub is_staff: bool,
}

/// Static service information
#[derive(Serialize, ToSchema)]
pub struct AboutResponse {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Home page (requires authentication)
#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses(
        (status = 200, description = "Identity of the logged-in user", body = HomeResponse),
        (status = 303, description = "Not authenticated, redirected to login")
    )
)]
pub async fn home(AuthenticatedUser(claims): AuthenticatedUser) -> Json<HomeResponse> {
    Json(HomeResponse {
        username: claims.sub,
        is_staff: claims.is_staff,
    })
}

/// Static informational page
#[utoipa::path(
    get,
    path = "/about/",
    tag = "pages",
    responses(
        (status = 200, description = "Service information", body = AboutResponse)
    )
)]
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "Libris".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "A library catalog: books, copies, authors, categories and publishers."
            .to_string(),
    })
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, books, health, pages};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library Catalog Server API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Pages
        pages::home,
        pages::about,
        // Books
        books::list_books,
        books::get_book,
        books::new_book_context,
        books::create_book,
        books::edit_book_context,
        books::update_book,
        books::delete_book_context,
        books::delete_book,
        // Accounts
        accounts::signup,
        accounts::login_prompt,
        accounts::login,
        accounts::logout,
        // Health
        health::health_check,
        health::readiness_check,
    ),
    components(
        schemas(
            // Pages
            pages::HomeResponse,
            pages::AboutResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetail,
            crate::models::book::BookListResponse,
            crate::models::book::BookFormContext,
            crate::models::book::Category,
            crate::models::book::Publisher,
            crate::models::author::Author,
            crate::models::book_copy::BookCopy,
            crate::models::book_copy::CopyType,
            crate::models::book_copy::AvailabilityStatus,
            crate::forms::BookForm,
            crate::forms::CopyForm,
            // Accounts
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            accounts::LoginPrompt,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::FieldErrors,
        )
    ),
    tags(
        (name = "pages", description = "Home and about pages"),
        (name = "books", description = "Catalog browsing, search and management"),
        (name = "accounts", description = "Account lifecycle"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

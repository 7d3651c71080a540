//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    forms::BookForm,
    models::book::{Book, BookDetail, BookFormContext, BookListResponse, BookQuery},
};

use super::AuthenticatedUser;

/// List books, optionally filtered by a free-text query
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(
        ("q" = Option<String>, Query, description = "Search in title, author, category and publisher names")
    ),
    responses(
        (status = 200, description = "List of books", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookListResponse>> {
    let books = state.services.catalog.search_books(query.q.as_deref()).await?;
    let total = books.len() as i64;

    Ok(Json(BookListResponse { books, total }))
}

/// Get book details with copy-count aggregates
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.services.catalog.get_book(id).await?;
    Ok(Json(detail))
}

/// Form context for creating a book (staff only)
#[utoipa::path(
    get,
    path = "/books/create/",
    tag = "books",
    responses(
        (status = 200, description = "Selectable authors, categories and publishers", body = BookFormContext),
        (status = 303, description = "Not authenticated, redirected to login"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn new_book_context(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BookFormContext>> {
    claims.require_staff()?;

    let context = state.services.catalog.form_context(None).await?;
    Ok(Json(context))
}

/// Create a new book (staff only)
#[utoipa::path(
    post,
    path = "/books/create/",
    tag = "books",
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid submission"),
        (status = 303, description = "Not authenticated, redirected to login"),
        (status = 403, description = "Staff privileges required"),
        (status = 409, description = "Duplicate copy number")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_book(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Form context for editing a book (staff only)
#[utoipa::path(
    get,
    path = "/books/{id}/edit/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Form context plus the current book", body = BookFormContext),
        (status = 303, description = "Not authenticated, redirected to login"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn edit_book_context(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormContext>> {
    claims.require_staff()?;

    let context = state.services.catalog.form_context(Some(id)).await?;
    Ok(Json(context))
}

/// Update an existing book (staff only)
#[utoipa::path(
    post,
    path = "/books/{id}/edit/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid submission"),
        (status = 303, description = "Not authenticated, redirected to login"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Duplicate copy number")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> AppResult<Json<Book>> {
    claims.require_staff()?;

    let updated = state.services.catalog.update_book(id, form).await?;
    Ok(Json(updated))
}

/// Deletion confirmation payload (staff only)
#[utoipa::path(
    get,
    path = "/books/{id}/delete/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to be deleted", body = Book),
        (status = 303, description = "Not authenticated, redirected to login"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_context(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_staff()?;

    let book = state.services.catalog.get_book_plain(id).await?;
    Ok(Json(book))
}

/// Delete a book and its copies (staff only); redirects to the listing
#[utoipa::path(
    post,
    path = "/books/{id}/delete/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Book deleted, redirected to the listing"),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    claims.require_staff()?;

    state.services.catalog.delete_book(id).await?;
    Ok(Redirect::to("/books/"))
}

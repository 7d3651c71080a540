//! Book model and related catalog types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::author::Author;
use super::book_copy::BookCopy;

/// Category record, matched by exact name in the get-or-create path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub category_name: String,
}

/// Publisher record. A book references at most one publisher; deleting a
/// publisher clears the reference without touching the book.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub email: String,
}

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub publisher_id: Option<i32>,
    pub publication_date: NaiveDate,
    pub description: Option<String>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub authors: Vec<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub categories: Vec<Category>,
    #[sqlx(skip)]
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[sqlx(skip)]
    #[serde(default)]
    pub copies: Vec<BookCopy>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub publication_date: NaiveDate,
    pub publisher_name: Option<String>,
    pub nb_copies: i64,
    pub nb_available: i64,
}

/// Book detail payload: the full book plus copy-count aggregates,
/// partitioned by availability status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub total_copies: i64,
    pub available_copies: i64,
    pub reference_only_copies: i64,
    pub unavailable_copies: i64,
}

/// Copy-count aggregates for one book
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CopyCounts {
    pub total: i64,
    pub available: i64,
    pub reference_only: i64,
    pub unavailable: i64,
}

/// Listing query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Free-text search over title, author names, category and publisher names
    pub q: Option<String>,
}

/// Selectable records for the book form (plus the book itself when editing)
#[derive(Debug, Serialize, ToSchema)]
pub struct BookFormContext {
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub publishers: Vec<Publisher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Listing response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<BookSummary>,
    pub total: i64,
}

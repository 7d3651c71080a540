//! Catalog management service

use crate::{
    error::AppResult,
    forms::BookForm,
    models::book::{Book, BookDetail, BookFormContext, BookSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books, optionally filtered by a free-text query
    pub async fn search_books(&self, query: Option<&str>) -> AppResult<Vec<BookSummary>> {
        self.repository.books.search(query).await
    }

    /// Get a book with its relations and copy-count aggregates
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;
        let counts = self.repository.books.copy_counts(id).await?;

        Ok(BookDetail {
            book,
            total_copies: counts.total,
            available_copies: counts.available,
            reference_only_copies: counts.reference_only,
            unavailable_copies: counts.unavailable,
        })
    }

    /// Get a book without aggregates (edit and delete confirmation payloads)
    pub async fn get_book_plain(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Selectable authors/categories/publishers for the book form; includes
    /// the book itself when editing.
    pub async fn form_context(&self, book_id: Option<i32>) -> AppResult<BookFormContext> {
        let book = match book_id {
            Some(id) => Some(self.repository.books.get_by_id(id).await?),
            None => None,
        };

        Ok(BookFormContext {
            authors: self.repository.books.list_authors().await?,
            categories: self.repository.books.list_categories().await?,
            publishers: self.repository.books.list_publishers().await?,
            book,
        })
    }

    /// Create a book from a raw submission. The whole submission (copy
    /// collection included) is validated before anything is written.
    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        let data = form.validated()?;
        let book = self.repository.books.save(None, &data).await?;

        tracing::info!(
            "Book {} created with {} author(s), {} categorie(s), {} copie(s)",
            book.id,
            book.authors.len(),
            book.categories.len(),
            book.copies.len()
        );
        Ok(book)
    }

    /// Update a book from a raw submission. Author/category links are
    /// replaced wholesale with the submitted sets.
    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        // Surface not-found before validation errors
        self.repository.books.get_by_id(id).await?;

        let data = form.validated()?;
        self.repository.books.save(Some(id), &data).await
    }

    /// Delete a book and, by cascade, its copies
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}

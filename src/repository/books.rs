//! Books repository for database operations.
//!
//! The save path runs publisher creation, the book upsert, author/category
//! set resolution and the copy collection inside one transaction, so a
//! failure partway rolls everything back.

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    forms::{AuthorName, BookData, CopyChange},
    models::{
        author::Author,
        book::{Book, BookSummary, Category, CopyCounts, Publisher},
        book_copy::BookCopy,
    },
};

/// Map store integrity failures onto the request taxonomy: duplicate keys
/// are conflicts, dangling selected ids are validation failures.
fn integrity_error(e: sqlx::Error, unique: &str, reference: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::Conflict(unique.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::Validation(reference.to_string());
        }
    }
    AppError::Database(e)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get a book by id with authors, categories, publisher and copies loaded
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>(
            "SELECT id, title, publisher_id, publication_date, description FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        book.authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.first_name, a.last_name
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.category_name
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.publisher = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address, email FROM publishers WHERE id = $1",
        )
        .bind(book.publisher_id)
        .fetch_optional(&self.pool)
        .await?;

        book.copies = sqlx::query_as::<_, BookCopy>(
            r#"
            SELECT id, book_id, copy_number, copy_type, availability_status
            FROM book_copies
            WHERE book_id = $1
            ORDER BY copy_number
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(book)
    }

    /// Copy-count aggregates for one book, partitioned by availability
    pub async fn copy_counts(&self, book_id: i32) -> AppResult<CopyCounts> {
        let counts = sqlx::query_as::<_, CopyCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE availability_status = 'Available') AS available,
                   COUNT(*) FILTER (WHERE availability_status = 'Reference Only') AS reference_only,
                   COUNT(*) FILTER (WHERE availability_status = 'Unavailable') AS unavailable
            FROM book_copies
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// List books, optionally filtered by a free-text query over title,
    /// author first/last name, category name and publisher name. EXISTS
    /// subqueries keep each book in the result at most once.
    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<BookSummary>> {
        let books = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, BookSummary>(
                    r#"
                    SELECT b.id, b.title, b.publication_date,
                           p.name AS publisher_name,
                           COALESCE((SELECT COUNT(*) FROM book_copies c
                                     WHERE c.book_id = b.id), 0) AS nb_copies,
                           COALESCE((SELECT COUNT(*) FROM book_copies c
                                     WHERE c.book_id = b.id
                                       AND c.availability_status = 'Available'), 0) AS nb_available
                    FROM books b
                    LEFT JOIN publishers p ON p.id = b.publisher_id
                    WHERE b.title ILIKE $1
                       OR EXISTS (SELECT 1 FROM book_authors ba
                                  JOIN authors a ON a.id = ba.author_id
                                  WHERE ba.book_id = b.id
                                    AND (a.first_name ILIKE $1 OR a.last_name ILIKE $1))
                       OR EXISTS (SELECT 1 FROM book_categories bc
                                  JOIN categories c ON c.id = bc.category_id
                                  WHERE bc.book_id = b.id AND c.category_name ILIKE $1)
                       OR p.name ILIKE $1
                    ORDER BY b.id
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, BookSummary>(
                    r#"
                    SELECT b.id, b.title, b.publication_date,
                           p.name AS publisher_name,
                           COALESCE((SELECT COUNT(*) FROM book_copies c
                                     WHERE c.book_id = b.id), 0) AS nb_copies,
                           COALESCE((SELECT COUNT(*) FROM book_copies c
                                     WHERE c.book_id = b.id
                                       AND c.availability_status = 'Available'), 0) AS nb_available
                    FROM books b
                    LEFT JOIN publishers p ON p.id = b.publisher_id
                    ORDER BY b.id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(books)
    }

    // =========================================================================
    // FORM CONTEXT
    // =========================================================================

    /// All authors, for the selection list of the book form
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name FROM authors ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    /// All categories, for the selection list of the book form
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, category_name FROM categories ORDER BY category_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// All publishers, for the selection list of the book form
    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address, email FROM publishers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(publishers)
    }

    // =========================================================================
    // SAVE (create / update)
    // =========================================================================

    /// Persist a validated submission as one unit: inline publisher, the
    /// book's scalar fields, the full author/category sets (explicit
    /// selections unioned with get-or-create results, replacing any prior
    /// links wholesale) and the copy collection.
    pub async fn save(&self, book_id: Option<i32>, data: &BookData) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        // An inline publisher is always created fresh and wins over any
        // explicit selection.
        let publisher_id = match &data.new_publisher {
            Some(publisher) => Some(
                sqlx::query_scalar::<_, i32>(
                    "INSERT INTO publishers (name, address, email) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(&publisher.name)
                .bind(&publisher.address)
                .bind(&publisher.email)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => data.publisher_id,
        };

        let id = match book_id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE books
                    SET title = $1, publisher_id = $2, publication_date = $3, description = $4
                    WHERE id = $5
                    "#,
                )
                .bind(&data.title)
                .bind(publisher_id)
                .bind(data.publication_date)
                .bind(&data.description)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| integrity_error(e, "Duplicate book", "Unknown publisher id"))?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Book with id {} not found", id)));
                }
                id
            }
            None => sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO books (title, publisher_id, publication_date, description)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&data.title)
            .bind(publisher_id)
            .bind(data.publication_date)
            .bind(&data.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| integrity_error(e, "Duplicate book", "Unknown publisher id"))?,
        };

        // Final author set: explicit selections unioned with get-or-create
        // results; duplicates collapse.
        let mut author_ids: Vec<i32> = Vec::new();
        for &author_id in &data.author_ids {
            if !author_ids.contains(&author_id) {
                author_ids.push(author_id);
            }
        }
        for name in &data.new_authors {
            let author_id = Self::ensure_author(&mut tx, name).await?;
            if !author_ids.contains(&author_id) {
                author_ids.push(author_id);
            }
        }
        Self::replace_book_authors(&mut tx, id, &author_ids).await?;

        let mut category_ids: Vec<i32> = Vec::new();
        for &category_id in &data.category_ids {
            if !category_ids.contains(&category_id) {
                category_ids.push(category_id);
            }
        }
        for name in &data.new_categories {
            let category_id = Self::ensure_category(&mut tx, name).await?;
            if !category_ids.contains(&category_id) {
                category_ids.push(category_id);
            }
        }
        Self::replace_book_categories(&mut tx, id, &category_ids).await?;

        Self::apply_copies(&mut tx, id, &data.copies).await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Fetch an author by exact (first_name, last_name) or insert one.
    /// A concurrent identical insert is absorbed by the unique index: the
    /// conflicting insert returns no row and the winner is re-read.
    async fn ensure_author(
        tx: &mut Transaction<'_, Postgres>,
        name: &AuthorName,
    ) -> AppResult<i32> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM authors WHERE first_name = $1 AND last_name = $2",
        )
        .bind(&name.first_name)
        .bind(&name.last_name)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let inserted: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO authors (first_name, last_name) VALUES ($1, $2)
            ON CONFLICT (first_name, last_name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&name.first_name)
        .bind(&name.last_name)
        .fetch_optional(&mut **tx)
        .await?;

        match inserted {
            Some(id) => Ok(id),
            None => sqlx::query_scalar(
                "SELECT id FROM authors WHERE first_name = $1 AND last_name = $2",
            )
            .bind(&name.first_name)
            .bind(&name.last_name)
            .fetch_one(&mut **tx)
            .await
            .map_err(Into::into),
        }
    }

    /// Fetch a category by exact name or insert one; same race handling as
    /// [`Self::ensure_author`].
    async fn ensure_category(tx: &mut Transaction<'_, Postgres>, name: &str) -> AppResult<i32> {
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM categories WHERE category_name = $1")
                .bind(name)
                .fetch_optional(&mut **tx)
                .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let inserted: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO categories (category_name) VALUES ($1)
            ON CONFLICT (category_name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

        match inserted {
            Some(id) => Ok(id),
            None => sqlx::query_scalar("SELECT id FROM categories WHERE category_name = $1")
                .bind(name)
                .fetch_one(&mut **tx)
                .await
                .map_err(Into::into),
        }
    }

    /// Replace all author links for a book: delete existing rows then insert
    /// the new set.
    async fn replace_book_authors(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        author_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        for author_id in author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(author_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| integrity_error(e, "Duplicate author link", "Unknown author id"))?;
        }

        Ok(())
    }

    /// Replace all category links for a book: delete existing rows then
    /// insert the new set.
    async fn replace_book_categories(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        category_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        for category_id in category_ids {
            sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(category_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    integrity_error(e, "Duplicate category link", "Unknown category id")
                })?;
        }

        Ok(())
    }

    /// Apply the copy collection, scoped to this book: deletions first so
    /// freed copy numbers can be reused by new entries, then updates, then
    /// inserts. A (book, copy_number) collision surfaces as a conflict.
    async fn apply_copies(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        copies: &[CopyChange],
    ) -> AppResult<()> {
        for change in copies.iter().filter(|c| c.delete) {
            if let Some(copy_id) = change.id {
                sqlx::query("DELETE FROM book_copies WHERE id = $1 AND book_id = $2")
                    .bind(copy_id)
                    .bind(book_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }

        for change in copies.iter().filter(|c| !c.delete) {
            match change.id {
                Some(copy_id) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE book_copies
                        SET copy_number = $1, copy_type = $2, availability_status = $3
                        WHERE id = $4 AND book_id = $5
                        "#,
                    )
                    .bind(change.copy_number)
                    .bind(change.copy_type)
                    .bind(change.availability_status)
                    .bind(copy_id)
                    .bind(book_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| {
                        integrity_error(
                            e,
                            "A copy with this number already exists for this book",
                            "Unknown book id",
                        )
                    })?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::NotFound(format!(
                            "Copy {} not found for book {}",
                            copy_id, book_id
                        )));
                    }
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO book_copies (book_id, copy_number, copy_type, availability_status)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(book_id)
                    .bind(change.copy_number)
                    .bind(change.copy_type)
                    .bind(change.availability_status)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| {
                        integrity_error(
                            e,
                            "A copy with this number already exists for this book",
                            "Unknown book id",
                        )
                    })?;
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book; its copies and junction rows go with it (cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}

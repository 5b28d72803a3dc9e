//! Book repository.
//!
//! The listing query is assembled dynamically with `QueryBuilder`: every
//! filter is optional and they compose with AND. Author links live in the
//! `book_authors` table and are always loaded with explicit queries, never
//! implicitly.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use chapterhouse_core::{AuthorId, BookId, BookOrder, GenreId, Patch, PublisherId};

use super::{RepositoryError, map_unique_violation};
use crate::models::Book;

const BOOK_COLUMNS: &str = "book_id, title, description, price, publication_year, pages, isbn, \
                            cover_image, genre_id, publisher_id";

const ISBN_TAKEN: &str = "book with this isbn already exists";

/// Filters for the catalog listing. All fields compose with AND.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match on the title.
    pub q: Option<String>,
    pub genre_id: Option<GenreId>,
    pub author_id: Option<AuthorId>,
    pub publisher_id: Option<PublisherId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub order_by: Option<BookOrder>,
    pub skip: i64,
    pub limit: i64,
}

/// Input for creating a book. References are already resolved to IDs.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub genre_id: Option<GenreId>,
    pub publisher_id: Option<PublisherId>,
}

/// Column-level changes for a book update.
///
/// `Patch` fields distinguish "leave unchanged" from "set to NULL";
/// `author_ids` of `Some` replaces the whole author set.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Patch<String>,
    pub price: Option<Decimal>,
    pub publication_year: Patch<i32>,
    pub pages: Patch<i32>,
    pub isbn: Patch<String>,
    pub cover_image: Patch<String>,
    pub genre_id: Patch<GenreId>,
    pub publisher_id: Patch<PublisherId>,
    pub author_ids: Option<Vec<AuthorId>>,
}

impl BookChanges {
    /// Whether any scalar column of the `books` row changes.
    #[must_use]
    pub const fn has_column_changes(&self) -> bool {
        self.title.is_some()
            || self.price.is_some()
            || self.description.is_present()
            || self.publication_year.is_present()
            || self.pages.is_present()
            || self.isbn.is_present()
            || self.cover_image.is_present()
            || self.genre_id.is_present()
            || self.publisher_id.is_present()
    }
}

/// Repository for book database operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List books matching the filter, paginated.
    ///
    /// An empty result is a success, never an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE TRUE"
        ));

        if let Some(q) = &filter.q {
            qb.push(" AND title ILIKE ");
            qb.push_bind(format!("%{q}%"));
        }
        if let Some(genre_id) = filter.genre_id {
            qb.push(" AND genre_id = ");
            qb.push_bind(genre_id);
        }
        if let Some(publisher_id) = filter.publisher_id {
            qb.push(" AND publisher_id = ");
            qb.push_bind(publisher_id);
        }
        if let Some(author_id) = filter.author_id {
            // EXISTS instead of a join: a book stays a single row no matter
            // how many authors it has, which keeps offset pagination stable
            qb.push(
                " AND EXISTS (SELECT 1 FROM book_authors ba \
                 WHERE ba.book_id = books.book_id AND ba.author_id = ",
            );
            qb.push_bind(author_id);
            qb.push(")");
        }
        if let Some(min_price) = filter.min_price {
            qb.push(" AND price >= ");
            qb.push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND price <= ");
            qb.push_bind(max_price);
        }
        if let Some(min_year) = filter.min_year {
            qb.push(" AND publication_year >= ");
            qb.push_bind(min_year);
        }
        if let Some(max_year) = filter.max_year {
            qb.push(" AND publication_year <= ");
            qb.push_bind(max_year);
        }

        qb.push(order_clause(filter.order_by));
        qb.push(" LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.skip);

        let query = qb.build_query_as::<Book>();
        let books = query.fetch_all(self.pool).await?;

        Ok(books)
    }

    /// Get a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE book_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(book)
    }

    /// Get the author IDs linked to a book, ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn author_ids_for_book(&self, id: BookId) -> Result<Vec<AuthorId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, AuthorId>(
            "SELECT author_id FROM book_authors WHERE book_id = $1 ORDER BY author_id ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Get the author links for a set of books in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn author_ids_for_books(
        &self,
        ids: &[BookId],
    ) -> Result<Vec<(BookId, AuthorId)>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let links = sqlx::query_as::<_, (BookId, AuthorId)>(
            "SELECT book_id, author_id FROM book_authors
             WHERE book_id = ANY($1)
             ORDER BY book_id ASC, author_id ASC",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(links)
    }

    /// Create a book together with its author links.
    ///
    /// Author IDs that don't exist are silently dropped; duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ISBN already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        input: &NewBook,
        author_ids: &[AuthorId],
    ) -> Result<(Book, Vec<AuthorId>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, description, price, publication_year, pages, isbn, \
                                cover_image, genre_id, publisher_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.publication_year)
        .bind(input.pages)
        .bind(&input.isbn)
        .bind(&input.cover_image)
        .bind(input.genre_id)
        .bind(input.publisher_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, ISBN_TAKEN))?;

        let authors = set_authors(&mut tx, book.book_id, author_ids).await?;

        tx.commit().await?;

        Ok((book, authors))
    }

    /// Apply a partial update to a book.
    ///
    /// Returns `None` if the book doesn't exist. When `author_ids` is
    /// present, the author set is fully replaced, not merged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new ISBN already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: BookId,
        changes: BookChanges,
    ) -> Result<Option<(Book, Vec<AuthorId>)>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE book_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let has_column_changes = changes.has_column_changes();
        let book = if has_column_changes {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE books SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(title) = changes.title {
                    sep.push("title = ");
                    sep.push_bind_unseparated(title);
                }
                if let Some(price) = changes.price {
                    sep.push("price = ");
                    sep.push_bind_unseparated(price);
                }
                push_patch(&mut sep, "description", changes.description);
                push_patch(&mut sep, "publication_year", changes.publication_year);
                push_patch(&mut sep, "pages", changes.pages);
                push_patch(&mut sep, "isbn", changes.isbn);
                push_patch(&mut sep, "cover_image", changes.cover_image);
                push_patch(&mut sep, "genre_id", changes.genre_id);
                push_patch(&mut sep, "publisher_id", changes.publisher_id);
            }
            qb.push(" WHERE book_id = ");
            qb.push_bind(id);
            qb.push(format!(" RETURNING {BOOK_COLUMNS}"));

            let query = qb.build_query_as::<Book>();
            query
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_unique_violation(e, ISBN_TAKEN))?
        } else {
            existing
        };

        let authors = match changes.author_ids {
            Some(ids) => set_authors(&mut tx, id, &ids).await?,
            None => {
                sqlx::query_scalar::<_, AuthorId>(
                    "SELECT author_id FROM book_authors WHERE book_id = $1 ORDER BY author_id ASC",
                )
                .bind(id)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(Some((book, authors)))
    }

    /// Delete a book. Author links and cart lines cascade; order items do
    /// not - they are immutable history, so a purchased book can't be
    /// deleted.
    ///
    /// # Returns
    ///
    /// Returns `true` if the book was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if existing orders reference the
    /// book. Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "book is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Record the public path of an uploaded cover image.
    ///
    /// Returns `None` if the book doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_cover(
        &self,
        id: BookId,
        cover_image: &str,
    ) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET cover_image = $1 WHERE book_id = $2 RETURNING {BOOK_COLUMNS}"
        ))
        .bind(cover_image)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(book)
    }
}

/// Replace a book's author set and return the resulting IDs.
///
/// Unknown author IDs are dropped (the insert selects from `authors`), so the
/// returned set reflects what is actually linked.
async fn set_authors(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    book_id: BookId,
    author_ids: &[AuthorId],
) -> Result<Vec<AuthorId>, RepositoryError> {
    sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    if !author_ids.is_empty() {
        let raw: Vec<i32> = author_ids.iter().map(|id| id.as_i32()).collect();
        sqlx::query(
            "INSERT INTO book_authors (book_id, author_id)
             SELECT $1, a.author_id FROM authors a WHERE a.author_id = ANY($2)
             ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(raw)
        .execute(&mut **tx)
        .await?;
    }

    let linked = sqlx::query_scalar::<_, AuthorId>(
        "SELECT author_id FROM book_authors WHERE book_id = $1 ORDER BY author_id ASC",
    )
    .bind(book_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(linked)
}

/// Append `column = value` / `column = NULL` for a present patch field.
fn push_patch<'args, T>(
    sep: &mut sqlx::query_builder::Separated<'_, 'args, Postgres, &'static str>,
    column: &'static str,
    patch: Patch<T>,
) where
    T: 'args + Send + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    match patch {
        Patch::Absent => {}
        Patch::Null => {
            sep.push(column);
            sep.push_unseparated(" = NULL");
        }
        Patch::Value(value) => {
            sep.push(column);
            sep.push_unseparated(" = ");
            sep.push_bind_unseparated(value);
        }
    }
}

/// ORDER BY clause for a listing; unset means natural (insertion) order.
const fn order_clause(order: Option<BookOrder>) -> &'static str {
    match order {
        None => " ORDER BY book_id ASC",
        Some(BookOrder::PriceAsc) => " ORDER BY price ASC, book_id ASC",
        Some(BookOrder::PriceDesc) => " ORDER BY price DESC, book_id ASC",
        Some(BookOrder::YearAsc) => " ORDER BY publication_year ASC, book_id ASC",
        Some(BookOrder::YearDesc) => " ORDER BY publication_year DESC, book_id ASC",
        Some(BookOrder::TitleAsc) => " ORDER BY title ASC, book_id ASC",
        Some(BookOrder::TitleDesc) => " ORDER BY title DESC, book_id ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_defaults_to_natural_order() {
        assert_eq!(order_clause(None), " ORDER BY book_id ASC");
    }

    #[test]
    fn test_order_clause_covers_every_sort() {
        assert_eq!(
            order_clause(Some(BookOrder::PriceDesc)),
            " ORDER BY price DESC, book_id ASC"
        );
        assert_eq!(
            order_clause(Some(BookOrder::YearAsc)),
            " ORDER BY publication_year ASC, book_id ASC"
        );
        assert_eq!(
            order_clause(Some(BookOrder::TitleDesc)),
            " ORDER BY title DESC, book_id ASC"
        );
    }

    #[test]
    fn test_has_column_changes() {
        assert!(!BookChanges::default().has_column_changes());

        let authors_only = BookChanges {
            author_ids: Some(vec![AuthorId::new(1)]),
            ..BookChanges::default()
        };
        assert!(!authors_only.has_column_changes());

        let clears_isbn = BookChanges {
            isbn: Patch::Null,
            ..BookChanges::default()
        };
        assert!(clears_isbn.has_column_changes());
    }
}

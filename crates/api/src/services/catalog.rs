//! Catalog service: book listing, lookup, and admin-side mutation.
//!
//! Genre, publisher, and authors may be supplied by ID or by name. Names go
//! through find-or-create resolution against the natural key, so repeated
//! creation with the same name reuses the same row.

use rust_decimal::Decimal;
use sqlx::PgPool;

use chapterhouse_core::{AuthorId, BookId, GenreId, Patch, PublisherId};

use crate::db::books::{BookChanges, BookFilter, NewBook};
use crate::db::{
    AuthorRepository, BookRepository, GenreRepository, PublisherRepository, RepositoryError,
};
use crate::error::{AppError, Result};
use crate::models::Book;

/// A book with its linked author IDs.
#[derive(Debug, Clone)]
pub struct BookWithAuthors {
    pub book: Book,
    pub author_ids: Vec<AuthorId>,
}

/// Input for creating a book.
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub genre_id: Option<GenreId>,
    pub genre_name: Option<String>,
    pub publisher_id: Option<PublisherId>,
    pub publisher_name: Option<String>,
    pub author_ids: Vec<AuthorId>,
    pub author_names: Vec<String>,
}

/// Partial update of a book.
///
/// Only present fields change; `Patch::Null` on a reference clears it.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub description: Patch<String>,
    pub price: Option<Decimal>,
    pub publication_year: Patch<i32>,
    pub pages: Patch<i32>,
    pub isbn: Patch<String>,
    pub cover_image: Patch<String>,
    pub genre_id: Patch<GenreId>,
    pub genre_name: Option<String>,
    pub publisher_id: Patch<PublisherId>,
    pub publisher_name: Option<String>,
    pub author_ids: Option<Vec<AuthorId>>,
    pub author_names: Option<Vec<String>>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    books: BookRepository<'a>,
    genres: GenreRepository<'a>,
    publishers: PublisherRepository<'a>,
    authors: AuthorRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            books: BookRepository::new(pool),
            genres: GenreRepository::new(pool),
            publishers: PublisherRepository::new(pool),
            authors: AuthorRepository::new(pool),
        }
    }

    /// List books matching the filter, each with its author IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookWithAuthors>> {
        let books = self.books.list(filter).await?;

        let ids: Vec<BookId> = books.iter().map(|b| b.book_id).collect();
        let links = self.books.author_ids_for_books(&ids).await?;

        Ok(books
            .into_iter()
            .map(|book| {
                let author_ids = links
                    .iter()
                    .filter(|(book_id, _)| *book_id == book.book_id)
                    .map(|(_, author_id)| *author_id)
                    .collect();
                BookWithAuthors { book, author_ids }
            })
            .collect())
    }

    /// Get a book by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn get_book(&self, id: BookId) -> Result<Option<BookWithAuthors>> {
        let Some(book) = self.books.get(id).await? else {
            return Ok(None);
        };
        let author_ids = self.books.author_ids_for_book(id).await?;

        Ok(Some(BookWithAuthors { book, author_ids }))
    }

    /// Create a book, resolving any names to dictionary rows.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a negative price or duplicate ISBN.
    pub async fn create_book(&self, input: BookInput) -> Result<BookWithAuthors> {
        validate_price(input.price)?;

        let genre_id = match input.genre_id {
            Some(id) => Some(id),
            None => self.resolve_genre(input.genre_name.as_deref()).await?,
        };
        let publisher_id = match input.publisher_id {
            Some(id) => Some(id),
            None => {
                self.resolve_publisher(input.publisher_name.as_deref())
                    .await?
            }
        };
        let author_ids = self
            .resolve_authors(input.author_ids, &input.author_names)
            .await?;

        let new_book = NewBook {
            title: input.title,
            description: input.description,
            price: input.price,
            publication_year: input.publication_year,
            pages: input.pages,
            isbn: input.isbn,
            cover_image: input.cover_image,
            genre_id,
            publisher_id,
        };

        let (book, author_ids) = self.books.create(&new_book, &author_ids).await?;

        Ok(BookWithAuthors { book, author_ids })
    }

    /// Apply a partial update to a book.
    ///
    /// Returns `None` if the book doesn't exist. The author set is fully
    /// replaced whenever `author_ids` or `author_names` is present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a negative price or duplicate ISBN.
    pub async fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Option<BookWithAuthors>> {
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        let genre_id = match (&patch.genre_id, patch.genre_name.as_deref()) {
            (Patch::Absent, Some(name)) => self
                .resolve_genre(Some(name))
                .await?
                .map_or(Patch::Absent, Patch::Value),
            _ => patch.genre_id,
        };
        let publisher_id = match (&patch.publisher_id, patch.publisher_name.as_deref()) {
            (Patch::Absent, Some(name)) => self
                .resolve_publisher(Some(name))
                .await?
                .map_or(Patch::Absent, Patch::Value),
            _ => patch.publisher_id,
        };

        let author_ids = if patch.author_ids.is_some() || patch.author_names.is_some() {
            let resolved = self
                .resolve_authors(
                    patch.author_ids.unwrap_or_default(),
                    patch.author_names.as_deref().unwrap_or_default(),
                )
                .await?;
            Some(resolved)
        } else {
            None
        };

        let changes = BookChanges {
            title: patch.title,
            description: patch.description,
            price: patch.price,
            publication_year: patch.publication_year,
            pages: patch.pages,
            isbn: patch.isbn,
            cover_image: patch.cover_image,
            genre_id,
            publisher_id,
            author_ids,
        };

        let updated = self.books.update(id, changes).await?;

        Ok(updated.map(|(book, author_ids)| BookWithAuthors { book, author_ids }))
    }

    /// Delete a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn delete_book(&self, id: BookId) -> Result<bool> {
        Ok(self.books.delete(id).await?)
    }

    // =========================================================================
    // Find-or-create resolution
    // =========================================================================

    /// Resolve a genre name to an ID, creating the genre on a miss.
    async fn resolve_genre(&self, name: Option<&str>) -> Result<Option<GenreId>> {
        let Some(name) = trimmed(name) else {
            return Ok(None);
        };

        if let Some(genre) = self.genres.get_by_name(name).await? {
            return Ok(Some(genre.genre_id));
        }

        match self.genres.create(name).await {
            Ok(genre) => Ok(Some(genre.genre_id)),
            // Lost a creation race: the row exists now, look it up again
            Err(RepositoryError::Conflict(_)) => Ok(self
                .genres
                .get_by_name(name)
                .await?
                .map(|genre| genre.genre_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Resolve a publisher name to an ID, creating the publisher on a miss.
    async fn resolve_publisher(&self, name: Option<&str>) -> Result<Option<PublisherId>> {
        let Some(name) = trimmed(name) else {
            return Ok(None);
        };

        if let Some(publisher) = self.publishers.get_by_name(name).await? {
            return Ok(Some(publisher.publisher_id));
        }

        match self.publishers.create(name).await {
            Ok(publisher) => Ok(Some(publisher.publisher_id)),
            Err(RepositoryError::Conflict(_)) => Ok(self
                .publishers
                .get_by_name(name)
                .await?
                .map(|publisher| publisher.publisher_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Resolve author names to IDs and append them to the explicit ID list.
    ///
    /// Blank names (after trim) are skipped.
    async fn resolve_authors(
        &self,
        ids: Vec<AuthorId>,
        names: &[String],
    ) -> Result<Vec<AuthorId>> {
        let mut resolved = ids;
        for name in names {
            let Some(name) = trimmed(Some(name)) else {
                continue;
            };
            let author = match self.authors.get_by_name(name).await? {
                Some(author) => author,
                None => self.authors.create(name).await?,
            };
            resolved.push(author.author_id);
        }

        Ok(resolved)
    }
}

/// Trim a name, mapping blank results to `None`.
fn trimmed(name: Option<&str>) -> Option<&str> {
    let name = name?.trim();
    if name.is_empty() { None } else { Some(name) }
}

/// Book prices must be non-negative.
fn validate_price(price: Decimal) -> Result<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("price must be non-negative".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  Tolstoy ")), Some("Tolstoy"));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from(100)).is_ok());
        assert!(validate_price(Decimal::from(-1)).is_err());
    }
}

//! Catalog row types: genres, authors, publishers, and books.

use rust_decimal::Decimal;

use chapterhouse_core::{AuthorId, BookId, GenreId, PublisherId};

/// A book genre (unique name).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Genre {
    pub genre_id: GenreId,
    pub name: String,
}

/// A book author.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Author {
    pub author_id: AuthorId,
    pub full_name: String,
}

/// A publisher (unique name).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Publisher {
    pub publisher_id: PublisherId,
    pub name: String,
}

/// A catalog book.
///
/// Authors are linked through the `book_authors` table and loaded by a
/// separate repository query; the row itself carries only scalar columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub description: Option<String>,
    /// Non-negative unit price.
    pub price: Decimal,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    /// Unique when present.
    pub isbn: Option<String>,
    /// Public path of the uploaded cover image, if any.
    pub cover_image: Option<String>,
    pub genre_id: Option<GenreId>,
    pub publisher_id: Option<PublisherId>,
}

//! Catalog route handlers.
//!
//! Listing and detail are public; create/update/delete are admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use chapterhouse_core::{AuthorId, BookId, BookOrder, GenreId, Patch, PublisherId};

use crate::db::books::BookFilter;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::catalog::{BookInput, BookPatch, BookWithAuthors, CatalogService};
use crate::state::AppState;

/// Catalog listing query parameters. Filters compose with AND.
#[derive(Debug, Deserialize)]
pub struct BookListQuery {
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
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    100
}

impl From<BookListQuery> for BookFilter {
    fn from(query: BookListQuery) -> Self {
        Self {
            q: query.q,
            genre_id: query.genre_id,
            author_id: query.author_id,
            publisher_id: query.publisher_id,
            min_price: query.min_price,
            max_price: query.max_price,
            min_year: query.min_year,
            max_year: query.max_year,
            order_by: query.order_by,
            skip: query.skip.max(0),
            limit: query.limit.max(0),
        }
    }
}

/// Public view of a book.
#[derive(Debug, Serialize)]
pub struct BookRead {
    pub book_id: BookId,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub genre_id: Option<GenreId>,
    pub publisher_id: Option<PublisherId>,
    pub author_ids: Vec<AuthorId>,
}

impl From<BookWithAuthors> for BookRead {
    fn from(entry: BookWithAuthors) -> Self {
        let book = entry.book;
        Self {
            book_id: book.book_id,
            title: book.title,
            description: book.description,
            price: book.price,
            publication_year: book.publication_year,
            pages: book.pages,
            isbn: book.isbn,
            cover_image: book.cover_image,
            genre_id: book.genre_id,
            publisher_id: book.publisher_id,
            author_ids: entry.author_ids,
        }
    }
}

/// Book creation payload.
///
/// Genre, publisher, and authors may be given by ID or by name; names are
/// resolved with find-or-create.
#[derive(Debug, Deserialize)]
pub struct BookCreateRequest {
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
    #[serde(default)]
    pub author_ids: Vec<AuthorId>,
    #[serde(default)]
    pub author_names: Vec<String>,
}

/// Book update payload.
///
/// Only fields present in the JSON change; `null` clears nullable fields.
#[derive(Debug, Deserialize, Default)]
pub struct BookUpdateRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub publication_year: Patch<i32>,
    #[serde(default)]
    pub pages: Patch<i32>,
    #[serde(default)]
    pub isbn: Patch<String>,
    #[serde(default)]
    pub cover_image: Patch<String>,
    #[serde(default)]
    pub genre_id: Patch<GenreId>,
    pub genre_name: Option<String>,
    #[serde(default)]
    pub publisher_id: Patch<PublisherId>,
    pub publisher_name: Option<String>,
    pub author_ids: Option<Vec<AuthorId>>,
    pub author_names: Option<Vec<String>>,
}

/// GET /api/books - List books with filters, sorting, and pagination.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Vec<BookRead>>> {
    let filter = BookFilter::from(query);
    let books = CatalogService::new(state.pool()).list_books(&filter).await?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// GET /api/books/{book_id} - Book detail.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(book_id): Path<BookId>,
) -> Result<Json<BookRead>> {
    let book = CatalogService::new(state.pool())
        .get_book(book_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_owned()))?;

    Ok(Json(book.into()))
}

/// POST /api/books - Create a book (admin).
#[instrument(skip(state, _admin, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<BookCreateRequest>,
) -> Result<impl IntoResponse> {
    let input = BookInput {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        publication_year: payload.publication_year,
        pages: payload.pages,
        isbn: payload.isbn,
        cover_image: payload.cover_image,
        genre_id: payload.genre_id,
        genre_name: payload.genre_name,
        publisher_id: payload.publisher_id,
        publisher_name: payload.publisher_name,
        author_ids: payload.author_ids,
        author_names: payload.author_names,
    };

    let book = CatalogService::new(state.pool()).create_book(input).await?;

    Ok((StatusCode::CREATED, Json(BookRead::from(book))))
}

/// PUT /api/books/{book_id} - Partially update a book (admin).
#[instrument(skip(state, _admin, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(book_id): Path<BookId>,
    Json(payload): Json<BookUpdateRequest>,
) -> Result<Json<BookRead>> {
    let patch = BookPatch {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        publication_year: payload.publication_year,
        pages: payload.pages,
        isbn: payload.isbn,
        cover_image: payload.cover_image,
        genre_id: payload.genre_id,
        genre_name: payload.genre_name,
        publisher_id: payload.publisher_id,
        publisher_name: payload.publisher_name,
        author_ids: payload.author_ids,
        author_names: payload.author_names,
    };

    let book = CatalogService::new(state.pool())
        .update_book(book_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_owned()))?;

    Ok(Json(book.into()))
}

/// DELETE /api/books/{book_id} - Delete a book (admin).
#[instrument(skip(state, _admin))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(book_id): Path<BookId>,
) -> Result<StatusCode> {
    let deleted = CatalogService::new(state.pool()).delete_book(book_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Book not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

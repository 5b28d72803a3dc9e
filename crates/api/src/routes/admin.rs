//! Admin route handlers.
//!
//! Everything here sits behind the `RequireAdmin` extractor: dictionary
//! CRUD, user administration, order status transitions, and cover uploads.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use chapterhouse_core::{AuthorId, BookId, GenreId, OrderId, PublisherId, UserId};

use crate::db::BookRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::books::BookRead;
use crate::routes::dicts::{AuthorRead, GenreRead, PublisherRead};
use crate::routes::orders::OrderRead;
use crate::routes::users::UserRead;
use crate::services::admin::AdminService;
use crate::services::catalog::BookWithAuthors;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Maximum decoded size of an uploaded cover image.
const MAX_COVER_BYTES: usize = 5 * 1024 * 1024;

/// Dictionary create/update payload (genres and publishers).
#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub name: String,
}

/// Author create/update payload.
#[derive(Debug, Deserialize)]
pub struct AuthorPayload {
    pub full_name: String,
}

/// Admin flag update payload.
#[derive(Debug, Deserialize)]
pub struct UserAdminUpdate {
    pub is_admin: bool,
}

/// Order status update payload. Status is a free-form string.
#[derive(Debug, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

/// Base64 cover upload payload.
#[derive(Debug, Deserialize)]
pub struct BookCoverUpload {
    pub filename: Option<String>,
    /// Base64-encoded image data.
    pub content: String,
}

// =============================================================================
// Genres
// =============================================================================

/// GET /api/admin/genres - List genres.
#[instrument(skip(state, _admin))]
pub async fn list_genres(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<GenreRead>>> {
    let genres = AdminService::new(state.pool()).list_genres().await?;
    Ok(Json(genres.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/genres - Create a genre.
#[instrument(skip(state, _admin))]
pub async fn create_genre(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse> {
    let genre = AdminService::new(state.pool())
        .create_genre(&payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(GenreRead::from(genre))))
}

/// PUT /api/admin/genres/{genre_id} - Rename a genre.
#[instrument(skip(state, _admin))]
pub async fn update_genre(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(genre_id): Path<GenreId>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<GenreRead>> {
    let genre = AdminService::new(state.pool())
        .update_genre(genre_id, &payload.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Genre not found".to_owned()))?;

    Ok(Json(genre.into()))
}

/// DELETE /api/admin/genres/{genre_id} - Delete a genre.
#[instrument(skip(state, _admin))]
pub async fn delete_genre(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(genre_id): Path<GenreId>,
) -> Result<StatusCode> {
    let deleted = AdminService::new(state.pool()).delete_genre(genre_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Genre not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Authors
// =============================================================================

/// GET /api/admin/authors - List authors.
#[instrument(skip(state, _admin))]
pub async fn list_authors(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AuthorRead>>> {
    let authors = AdminService::new(state.pool()).list_authors().await?;
    Ok(Json(authors.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/authors - Create an author.
#[instrument(skip(state, _admin))]
pub async fn create_author(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<AuthorPayload>,
) -> Result<impl IntoResponse> {
    let author = AdminService::new(state.pool())
        .create_author(&payload.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthorRead::from(author))))
}

/// PUT /api/admin/authors/{author_id} - Rename an author.
#[instrument(skip(state, _admin))]
pub async fn update_author(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(author_id): Path<AuthorId>,
    Json(payload): Json<AuthorPayload>,
) -> Result<Json<AuthorRead>> {
    let author = AdminService::new(state.pool())
        .update_author(author_id, &payload.full_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found".to_owned()))?;

    Ok(Json(author.into()))
}

/// DELETE /api/admin/authors/{author_id} - Delete an author.
#[instrument(skip(state, _admin))]
pub async fn delete_author(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(author_id): Path<AuthorId>,
) -> Result<StatusCode> {
    let deleted = AdminService::new(state.pool())
        .delete_author(author_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Author not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Publishers
// =============================================================================

/// GET /api/admin/publishers - List publishers.
#[instrument(skip(state, _admin))]
pub async fn list_publishers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<PublisherRead>>> {
    let publishers = AdminService::new(state.pool()).list_publishers().await?;
    Ok(Json(publishers.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/publishers - Create a publisher.
#[instrument(skip(state, _admin))]
pub async fn create_publisher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse> {
    let publisher = AdminService::new(state.pool())
        .create_publisher(&payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(PublisherRead::from(publisher))))
}

/// PUT /api/admin/publishers/{publisher_id} - Rename a publisher.
#[instrument(skip(state, _admin))]
pub async fn update_publisher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(publisher_id): Path<PublisherId>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<PublisherRead>> {
    let publisher = AdminService::new(state.pool())
        .update_publisher(publisher_id, &payload.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Publisher not found".to_owned()))?;

    Ok(Json(publisher.into()))
}

/// DELETE /api/admin/publishers/{publisher_id} - Delete a publisher.
#[instrument(skip(state, _admin))]
pub async fn delete_publisher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(publisher_id): Path<PublisherId>,
) -> Result<StatusCode> {
    let deleted = AdminService::new(state.pool())
        .delete_publisher(publisher_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Publisher not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Users
// =============================================================================

/// GET /api/admin/users - List users, newest first.
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserRead>>> {
    let users = AdminService::new(state.pool()).list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// PATCH /api/admin/users/{user_id} - Toggle a user's admin flag.
#[instrument(skip(state, _admin))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<UserId>,
    Json(payload): Json<UserAdminUpdate>,
) -> Result<Json<UserRead>> {
    let user = AdminService::new(state.pool())
        .set_user_admin(user_id, payload.is_admin)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(user.into()))
}

// =============================================================================
// Orders
// =============================================================================

/// GET /api/admin/orders - List every order, newest first.
#[instrument(skip(state, _admin))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderRead>>> {
    let orders = OrderService::new(state.pool()).list_all().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/orders/{order_id} - Any order's detail.
#[instrument(skip(state, _admin))]
pub async fn get_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderRead>> {
    let order = OrderService::new(state.pool())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order.into()))
}

/// PATCH /api/admin/orders/{order_id}/status - Overwrite an order's status.
#[instrument(skip(state, _admin))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<OrderStatusUpdate>,
) -> Result<Json<OrderRead>> {
    let order = OrderService::new(state.pool())
        .set_status(order_id, &payload.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order.into()))
}

// =============================================================================
// Cover upload
// =============================================================================

/// POST /api/admin/books/{book_id}/cover - Upload a base64 cover image.
///
/// Malformed base64 and payloads over 5 MiB are rejected before anything is
/// written to disk.
#[instrument(skip(state, _admin, payload))]
pub async fn upload_book_cover(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(book_id): Path<BookId>,
    Json(payload): Json<BookCoverUpload>,
) -> Result<Json<BookRead>> {
    let books = BookRepository::new(state.pool());
    if books.get(book_id).await?.is_none() {
        return Err(AppError::NotFound("Book not found".to_owned()));
    }

    let bytes = BASE64
        .decode(payload.content.as_bytes())
        .map_err(|_| AppError::BadRequest("invalid base64 payload".to_owned()))?;
    if bytes.len() > MAX_COVER_BYTES {
        return Err(AppError::BadRequest(
            "cover image exceeds the 5 MiB limit".to_owned(),
        ));
    }

    let filename = format!(
        "book_{}_{}{}",
        book_id,
        Uuid::new_v4().simple(),
        cover_extension(payload.filename.as_deref())
    );

    let covers_dir = &state.config().covers_dir;
    tokio::fs::create_dir_all(covers_dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create covers dir: {e}")))?;
    tokio::fs::write(covers_dir.join(&filename), &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store cover: {e}")))?;

    let public_path = format!("/static/covers/{filename}");
    let book = books
        .set_cover(book_id, &public_path)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_owned()))?;
    let author_ids = books.author_ids_for_book(book_id).await?;

    Ok(Json(BookRead::from(BookWithAuthors { book, author_ids })))
}

/// File extension for a stored cover, taken from the uploaded filename.
///
/// Only short alphanumeric extensions are honored; anything else falls back
/// to `.jpg`.
fn cover_extension(filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    ext.map_or_else(|| ".jpg".to_owned(), |ext| format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_extension_from_filename() {
        assert_eq!(cover_extension(Some("cover.PNG")), ".png");
        assert_eq!(cover_extension(Some("photo.jpeg")), ".jpeg");
    }

    #[test]
    fn test_cover_extension_defaults_to_jpg() {
        assert_eq!(cover_extension(None), ".jpg");
        assert_eq!(cover_extension(Some("noextension")), ".jpg");
        assert_eq!(cover_extension(Some("weird.ex!t")), ".jpg");
        assert_eq!(cover_extension(Some("too.longextension1")), ".jpg");
    }
}

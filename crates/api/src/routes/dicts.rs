//! Public dictionary route handlers.
//!
//! Read-only listings used by the storefront to populate filters and forms.
//! Mutation lives under `/api/admin`.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use chapterhouse_core::{AuthorId, GenreId, PublisherId};

use crate::error::Result;
use crate::models::{Author, Genre, Publisher};
use crate::services::admin::AdminService;
use crate::state::AppState;

/// Public view of a genre.
#[derive(Debug, Serialize)]
pub struct GenreRead {
    pub genre_id: GenreId,
    pub name: String,
}

impl From<Genre> for GenreRead {
    fn from(genre: Genre) -> Self {
        Self {
            genre_id: genre.genre_id,
            name: genre.name,
        }
    }
}

/// Public view of an author.
#[derive(Debug, Serialize)]
pub struct AuthorRead {
    pub author_id: AuthorId,
    pub full_name: String,
}

impl From<Author> for AuthorRead {
    fn from(author: Author) -> Self {
        Self {
            author_id: author.author_id,
            full_name: author.full_name,
        }
    }
}

/// Public view of a publisher.
#[derive(Debug, Serialize)]
pub struct PublisherRead {
    pub publisher_id: PublisherId,
    pub name: String,
}

impl From<Publisher> for PublisherRead {
    fn from(publisher: Publisher) -> Self {
        Self {
            publisher_id: publisher.publisher_id,
            name: publisher.name,
        }
    }
}

/// GET /api/dicts/genres - List genres.
#[instrument(skip(state))]
pub async fn list_genres(State(state): State<AppState>) -> Result<Json<Vec<GenreRead>>> {
    let genres = AdminService::new(state.pool()).list_genres().await?;
    Ok(Json(genres.into_iter().map(Into::into).collect()))
}

/// GET /api/dicts/authors - List authors.
#[instrument(skip(state))]
pub async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<AuthorRead>>> {
    let authors = AdminService::new(state.pool()).list_authors().await?;
    Ok(Json(authors.into_iter().map(Into::into).collect()))
}

/// GET /api/dicts/publishers - List publishers.
#[instrument(skip(state))]
pub async fn list_publishers(State(state): State<AppState>) -> Result<Json<Vec<PublisherRead>>> {
    let publishers = AdminService::new(state.pool()).list_publishers().await?;
    Ok(Json(publishers.into_iter().map(Into::into).collect()))
}

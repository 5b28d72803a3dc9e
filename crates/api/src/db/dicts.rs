//! Dictionary repositories: genres, authors, publishers.
//!
//! The three dictionaries share the same CRUD surface plus a lookup by
//! natural key (`get_by_name`), which backs the catalog's find-or-create
//! resolution.

use sqlx::PgPool;

use chapterhouse_core::{AuthorId, GenreId, PublisherId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Author, Genre, Publisher};

/// Repository for genre database operations.
pub struct GenreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GenreRepository<'a> {
    /// Create a new genre repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all genres by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Genre>, RepositoryError> {
        let genres =
            sqlx::query_as::<_, Genre>("SELECT genre_id, name FROM genres ORDER BY name ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(genres)
    }

    /// Get a genre by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: GenreId) -> Result<Option<Genre>, RepositoryError> {
        let genre =
            sqlx::query_as::<_, Genre>("SELECT genre_id, name FROM genres WHERE genre_id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(genre)
    }

    /// Get a genre by its unique name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Genre>, RepositoryError> {
        let genre = sqlx::query_as::<_, Genre>("SELECT genre_id, name FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(genre)
    }

    /// Create a genre.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str) -> Result<Genre, RepositoryError> {
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING genre_id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "genre with this name already exists"))?;

        Ok(genre)
    }

    /// Rename a genre. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: GenreId, name: &str) -> Result<Option<Genre>, RepositoryError> {
        let genre = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE genre_id = $2 RETURNING genre_id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "genre with this name already exists"))?;

        Ok(genre)
    }

    /// Delete a genre.
    ///
    /// # Returns
    ///
    /// Returns `true` if the genre was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: GenreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for author database operations.
pub struct AuthorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorRepository<'a> {
    /// Create a new author repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all authors by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Author>, RepositoryError> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT author_id, full_name FROM authors ORDER BY full_name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(authors)
    }

    /// Get an author by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AuthorId) -> Result<Option<Author>, RepositoryError> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT author_id, full_name FROM authors WHERE author_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(author)
    }

    /// Get an author by full name.
    ///
    /// Author names are not unique; the oldest match wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, full_name: &str) -> Result<Option<Author>, RepositoryError> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT author_id, full_name FROM authors
             WHERE full_name = $1
             ORDER BY author_id ASC
             LIMIT 1",
        )
        .bind(full_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(author)
    }

    /// Create an author.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, full_name: &str) -> Result<Author, RepositoryError> {
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (full_name) VALUES ($1) RETURNING author_id, full_name",
        )
        .bind(full_name)
        .fetch_one(self.pool)
        .await?;

        Ok(author)
    }

    /// Rename an author. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: AuthorId,
        full_name: &str,
    ) -> Result<Option<Author>, RepositoryError> {
        let author = sqlx::query_as::<_, Author>(
            "UPDATE authors SET full_name = $1 WHERE author_id = $2
             RETURNING author_id, full_name",
        )
        .bind(full_name)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(author)
    }

    /// Delete an author.
    ///
    /// # Returns
    ///
    /// Returns `true` if the author was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: AuthorId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM authors WHERE author_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for publisher database operations.
pub struct PublisherRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PublisherRepository<'a> {
    /// Create a new publisher repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all publishers by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Publisher>, RepositoryError> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT publisher_id, name FROM publishers ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(publishers)
    }

    /// Get a publisher by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PublisherId) -> Result<Option<Publisher>, RepositoryError> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "SELECT publisher_id, name FROM publishers WHERE publisher_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(publisher)
    }

    /// Get a publisher by its unique name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Publisher>, RepositoryError> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "SELECT publisher_id, name FROM publishers WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(publisher)
    }

    /// Create a publisher.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str) -> Result<Publisher, RepositoryError> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (name) VALUES ($1) RETURNING publisher_id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "publisher with this name already exists"))?;

        Ok(publisher)
    }

    /// Rename a publisher. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: PublisherId,
        name: &str,
    ) -> Result<Option<Publisher>, RepositoryError> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "UPDATE publishers SET name = $1 WHERE publisher_id = $2
             RETURNING publisher_id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "publisher with this name already exists"))?;

        Ok(publisher)
    }

    /// Delete a publisher.
    ///
    /// # Returns
    ///
    /// Returns `true` if the publisher was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PublisherId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM publishers WHERE publisher_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

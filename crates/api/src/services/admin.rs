//! Admin service: dictionary CRUD and user administration.
//!
//! Everything here runs behind the `RequireAdmin` extractor; the service
//! itself trusts the injected identity and only applies data rules.

use sqlx::PgPool;

use chapterhouse_core::{AuthorId, GenreId, PublisherId, UserId};

use crate::db::{AuthorRepository, GenreRepository, PublisherRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Author, Genre, Publisher, User};

/// Admin service.
pub struct AdminService<'a> {
    genres: GenreRepository<'a>,
    authors: AuthorRepository<'a>,
    publishers: PublisherRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            genres: GenreRepository::new(pool),
            authors: AuthorRepository::new(pool),
            publishers: PublisherRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Genres
    // =========================================================================

    /// List all genres.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        Ok(self.genres.list().await?)
    }

    /// Create a genre.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank or duplicate name.
    pub async fn create_genre(&self, name: &str) -> Result<Genre> {
        let name = required_name(name)?;
        Ok(self.genres.create(name).await?)
    }

    /// Rename a genre. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank or duplicate name.
    pub async fn update_genre(&self, id: GenreId, name: &str) -> Result<Option<Genre>> {
        let name = required_name(name)?;
        Ok(self.genres.update(id, name).await?)
    }

    /// Delete a genre.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn delete_genre(&self, id: GenreId) -> Result<bool> {
        Ok(self.genres.delete(id).await?)
    }

    // =========================================================================
    // Authors
    // =========================================================================

    /// List all authors.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        Ok(self.authors.list().await?)
    }

    /// Create an author.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank name.
    pub async fn create_author(&self, full_name: &str) -> Result<Author> {
        let full_name = required_name(full_name)?;
        Ok(self.authors.create(full_name).await?)
    }

    /// Rename an author. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank name.
    pub async fn update_author(&self, id: AuthorId, full_name: &str) -> Result<Option<Author>> {
        let full_name = required_name(full_name)?;
        Ok(self.authors.update(id, full_name).await?)
    }

    /// Delete an author.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn delete_author(&self, id: AuthorId) -> Result<bool> {
        Ok(self.authors.delete(id).await?)
    }

    // =========================================================================
    // Publishers
    // =========================================================================

    /// List all publishers.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_publishers(&self) -> Result<Vec<Publisher>> {
        Ok(self.publishers.list().await?)
    }

    /// Create a publisher.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank or duplicate name.
    pub async fn create_publisher(&self, name: &str) -> Result<Publisher> {
        let name = required_name(name)?;
        Ok(self.publishers.create(name).await?)
    }

    /// Rename a publisher. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank or duplicate name.
    pub async fn update_publisher(
        &self,
        id: PublisherId,
        name: &str,
    ) -> Result<Option<Publisher>> {
        let name = required_name(name)?;
        Ok(self.publishers.update(id, name).await?)
    }

    /// Delete a publisher.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn delete_publisher(&self, id: PublisherId) -> Result<bool> {
        Ok(self.publishers.delete(id).await?)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.list_all().await?)
    }

    /// Set or clear a user's admin flag. Returns `None` if the user doesn't
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn set_user_admin(&self, id: UserId, is_admin: bool) -> Result<Option<User>> {
        Ok(self.users.set_admin(id, is_admin).await?)
    }
}

/// Dictionary names must be non-blank; surrounding whitespace is trimmed.
fn required_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_owned()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("  Fiction ").expect("valid"), "Fiction");
        assert!(required_name("   ").is_err());
        assert!(required_name("").is_err());
    }
}

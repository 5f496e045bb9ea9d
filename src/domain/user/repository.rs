//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
///
/// Every read only sees live rows; soft-deleted rows behave as if absent.
/// Lookup misses are reported as `DomainError::NotFound` and unique-value
/// collisions as `DuplicateEmail` / `DuplicateUsername`, so callers can tell
/// them apart from `Storage` failures.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Insert a new user; the store assigns id and timestamps
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Get a live user by id
    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError>;

    /// Get a live user by exact (case-sensitive) email
    async fn get_by_email(&self, email: &str) -> Result<User, DomainError>;

    /// Get a live user by exact username
    async fn get_by_username(&self, username: &str) -> Result<User, DomainError>;

    /// Persist username, email and password hash of an existing live user.
    ///
    /// Refreshes `updated_at` and returns the stored row. Fails with
    /// `NotFound` when no live row has `user.id()`; never inserts.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Soft-delete a user. Returns whether a live row was marked; deleting a
    /// missing or already deleted id is not an error.
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// Live users in id order, skipping `offset` and returning at most `limit`
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<User>, DomainError>;
}

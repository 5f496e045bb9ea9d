//! User service for user lifecycle management

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::{DomainError, OptionalExt};

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request for a partial user update
///
/// `None` and empty strings both leave the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Outward view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// User service for lifecycle management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Create a new user
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        if self
            .repository
            .get_by_email(&request.email)
            .await
            .optional()?
            .is_some()
        {
            return Err(DomainError::duplicate_email(request.email));
        }

        if self
            .repository
            .get_by_username(&request.username)
            .await
            .optional()?
            .is_some()
        {
            return Err(DomainError::duplicate_username(request.username));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        // The store's unique indexes still reject a create that raced past the checks above
        let user = self
            .repository
            .create(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        Ok(UserResponse::from(&user))
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: UserId) -> Result<UserResponse, DomainError> {
        let user = self.repository.get_by_id(id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Apply the supplied fields of `request` to an existing user
    pub async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError> {
        let mut user = self.repository.get_by_id(id).await?;

        if let Some(username) = supplied(request.username) {
            if username != user.username() {
                let holder = self.repository.get_by_username(&username).await.optional()?;

                if holder.is_some_and(|other| other.id() != id) {
                    return Err(DomainError::duplicate_username(username));
                }

                user.set_username(username);
            }
        }

        if let Some(email) = supplied(request.email) {
            if email != user.email() {
                let holder = self.repository.get_by_email(&email).await.optional()?;

                if holder.is_some_and(|other| other.id() != id) {
                    return Err(DomainError::duplicate_email(email));
                }

                user.set_email(email);
            }
        }

        let updated = self.repository.update(&user).await?;

        Ok(UserResponse::from(&updated))
    }

    /// Soft-delete a user; deleting an absent user is not an error
    pub async fn delete_user(&self, id: UserId) -> Result<(), DomainError> {
        self.repository.delete(id).await?;
        Ok(())
    }

    /// List live users in id order
    pub async fn list_users(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<UserResponse>, DomainError> {
        let users = self.repository.list(limit, offset).await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }
}

fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

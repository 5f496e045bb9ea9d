//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::{
    CreateUserRequest, PasswordHasher, UpdateUserRequest, UserResponse, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError>;
    async fn get_user(&self, id: UserId) -> Result<UserResponse, DomainError>;
    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError>;
    async fn delete_user(&self, id: UserId) -> Result<(), DomainError>;
    async fn list_users(&self, limit: usize, offset: usize)
        -> Result<Vec<UserResponse>, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        UserService::create_user(self, request).await
    }

    async fn get_user(&self, id: UserId) -> Result<UserResponse, DomainError> {
        UserService::get_user(self, id).await
    }

    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError> {
        UserService::update_user(self, id, request).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), DomainError> {
        UserService::delete_user(self, id).await
    }

    async fn list_users(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<UserResponse>, DomainError> {
        UserService::list_users(self, limit, offset).await
    }
}

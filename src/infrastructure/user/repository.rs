//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{DeletionState, NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Rows are kept in id order and never removed; deletes only flip the
/// deletion state. Writes hold the lock across the uniqueness check and the
/// write.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

impl StoreState {
    fn live(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_deleted())
    }

    fn live_by_id(&self, id: UserId) -> Option<&User> {
        self.users.get(&id.value()).filter(|u| !u.is_deleted())
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.live()
            .any(|u| u.email() == email && Some(u.id()) != except)
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.live()
            .any(|u| u.username() == username && Some(u.id()) != except)
    }
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rows
    pub async fn count(&self) -> usize {
        self.state.read().await.live().count()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().await;

        if state.email_taken(&user.email, None) {
            return Err(DomainError::duplicate_email(user.email));
        }

        if state.username_taken(&user.username, None) {
            return Err(DomainError::duplicate_username(user.username));
        }

        state.last_id += 1;
        let id = UserId::new(state.last_id);
        let now = Utc::now();
        let created = User::from_parts(id, user, now, now, DeletionState::Active);

        state.users.insert(id.value(), created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError> {
        let state = self.state.read().await;

        state
            .live_by_id(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let state = self.state.read().await;

        state
            .live()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User with email '{}' not found", email)))
    }

    async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        let state = self.state.read().await;

        state
            .live()
            .find(|u| u.username() == username)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("User with username '{}' not found", username))
            })
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        let id = user.id();

        if state.live_by_id(id).is_none() {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        if state.username_taken(user.username(), Some(id)) {
            return Err(DomainError::duplicate_username(user.username()));
        }

        if state.email_taken(user.email(), Some(id)) {
            return Err(DomainError::duplicate_email(user.email()));
        }

        let stored = state
            .users
            .get_mut(&id.value())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        stored.set_username(user.username());
        stored.set_email(user.email());
        stored.set_password_hash(user.password_hash());
        stored.touch(Utc::now());

        Ok(stored.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;

        match state.users.get_mut(&id.value()) {
            Some(user) if !user.is_deleted() => {
                user.mark_deleted(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<User>, DomainError> {
        let state = self.state.read().await;

        Ok(state.live().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_monotonic_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("alice", "a@x.com")).await.unwrap();
        let second = repo.create(new_user("bob", "b@x.com")).await.unwrap();

        assert_eq!(first.id(), UserId::new(1));
        assert_eq!(second.id(), UserId::new(2));
        assert_eq!(first.created_at(), first.updated_at());
        assert!(!first.is_deleted());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("testuser", "test@example.com")).await.unwrap();

        let retrieved = repo.get_by_id(created.id()).await.unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.password_hash(), "hashed_password");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let repo = InMemoryUserRepository::new();

        let result = repo.get_by_id(UserId::new(999)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_by_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("testuser", "test@example.com")).await.unwrap();

        let found = repo.get_by_email("test@example.com").await.unwrap();
        assert_eq!(found.username(), "testuser");

        let result = repo.get_by_email("TEST@EXAMPLE.COM").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("testuser", "test@example.com")).await.unwrap();

        let found = repo.get_by_username("testuser").await.unwrap();
        assert_eq!(found.email(), "test@example.com");

        let result = repo.get_by_username("nonexistent").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("user1", "test@example.com")).await.unwrap();

        let result = repo.create(new_user("user2", "test@example.com")).await;
        assert!(matches!(result, Err(DomainError::DuplicateEmail { .. })));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("testuser", "user1@example.com")).await.unwrap();

        let result = repo.create(new_user("testuser", "user2@example.com")).await;
        assert!(matches!(result, Err(DomainError::DuplicateUsername { .. })));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_deleted_row_frees_unique_values() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("testuser", "test@example.com")).await.unwrap();

        repo.delete(first.id()).await.unwrap();

        let second = repo.create(new_user("testuser", "test@example.com")).await.unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("testuser", "test@example.com")).await.unwrap();
        let created_at = user.created_at();

        user.set_username("newusername");
        let updated = repo.update(&user).await.unwrap();

        assert_eq!(updated.username(), "newusername");
        assert_eq!(updated.email(), "test@example.com");
        assert_eq!(updated.created_at(), created_at);
        assert!(updated.updated_at() >= created_at);

        assert!(repo.get_by_username("testuser").await.is_err());
        assert!(repo.get_by_username("newusername").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_id_does_not_upsert() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = repo.create(new_user("ghost", "ghost@example.com")).await.unwrap();
        repo.delete(ghost.id()).await.unwrap();

        ghost.set_username("revived");
        let result = repo.update(&ghost).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_update_username_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("user1", "user1@example.com")).await.unwrap();
        let mut user2 = repo.create(new_user("user2", "user2@example.com")).await.unwrap();

        user2.set_username("user1");

        let result = repo.update(&user2).await;
        assert!(matches!(result, Err(DomainError::DuplicateUsername { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_idempotent() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("testuser", "test@example.com")).await.unwrap();

        assert!(repo.delete(user.id()).await.unwrap());
        assert!(!repo.delete(user.id()).await.unwrap());
        assert!(!repo.delete(UserId::new(999)).await.unwrap());

        assert!(repo.get_by_id(user.id()).await.is_err());
        assert!(repo.get_by_email("test@example.com").await.is_err());

        let state = repo.state.read().await;
        assert!(state.users.get(&user.id().value()).unwrap().is_deleted());
    }

    #[tokio::test]
    async fn test_list_pagination_in_insertion_order() {
        let repo = InMemoryUserRepository::new();

        for i in 1..=10 {
            repo.create(new_user(&format!("user{}", i), &format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let page = repo.list(5, 5).await.unwrap();
        let names: Vec<&str> = page.iter().map(|u| u.username()).collect();
        assert_eq!(names, vec!["user6", "user7", "user8", "user9", "user10"]);

        let beyond = repo.list(10, 50).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_list_excludes_deleted() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("a", "a@example.com")).await.unwrap();
        let b = repo.create(new_user("b", "b@example.com")).await.unwrap();
        let c = repo.create(new_user("c", "c@example.com")).await.unwrap();

        repo.delete(b.id()).await.unwrap();

        let ids: Vec<UserId> = repo.list(10, 0).await.unwrap().iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec![a.id(), c.id()]);
    }
}

//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a row is live or soft-deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionState {
    #[default]
    Active,
    Deleted { at: DateTime<Utc> },
}

impl DeletionState {
    /// Build from the nullable `deleted_at` column
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Self::Deleted { at },
            None => Self::Active,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Insert payload for a user that has no id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Persistent user record
///
/// Not `Serialize`. Outward representations are built by the user service
/// as `UserResponse`, which omits the password hash and deletion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deletion: DeletionState,
}

impl User {
    /// Rebuild a user from stored state
    pub fn from_parts(
        id: UserId,
        new_user: NewUser,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deletion: DeletionState,
    ) -> Self {
        Self {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at,
            updated_at,
            deletion,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deletion.is_deleted()
    }

    // Mutators

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
    }

    /// Mark the row as soft-deleted at `at`
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deletion = DeletionState::Deleted { at };
    }

    /// Refresh `updated_at`; stores call this when persisting a mutation
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(id: i64, username: &str) -> User {
        let now = Utc::now();
        User::from_parts(
            UserId::new(id),
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hashed_password".to_string(),
            },
            now,
            now,
            DeletionState::Active,
        )
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::new(42).to_string(), "42");
        assert_eq!(UserId::new(7).value(), 7);
    }

    #[test]
    fn test_user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_deletion_state_column_mapping() {
        let at = Utc::now();

        assert_eq!(DeletionState::from_deleted_at(None), DeletionState::Active);
        assert_eq!(
            DeletionState::from_deleted_at(Some(at)),
            DeletionState::Deleted { at }
        );
        assert!(DeletionState::Deleted { at }.is_deleted());
        assert!(!DeletionState::Active.is_deleted());
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user(1, "alice");

        assert_eq!(user.id(), UserId::new(1));
        assert_eq!(user.username(), "alice");
        assert_eq!(user.email(), "alice@example.com");
        assert_eq!(user.password_hash(), "hashed_password");
        assert!(!user.is_deleted());
    }

    #[test]
    fn test_mutators_keep_other_fields() {
        let mut user = create_test_user(1, "alice");

        user.set_username("alicia");
        assert_eq!(user.username(), "alicia");
        assert_eq!(user.email(), "alice@example.com");

        user.set_email("alicia@example.com");
        assert_eq!(user.email(), "alicia@example.com");
        assert_eq!(user.password_hash(), "hashed_password");
    }

    #[test]
    fn test_mark_deleted() {
        let mut user = create_test_user(1, "alice");
        let at = Utc::now();

        user.mark_deleted(at);
        assert!(user.is_deleted());
        assert_eq!(user.deletion, DeletionState::Deleted { at });
    }
}

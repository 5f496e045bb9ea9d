//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::user::{DeletionState, NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::migrations::{EMAIL_UNIQUE_INDEX, USERNAME_UNIQUE_INDEX};

/// PostgreSQL implementation of UserRepository
///
/// Uniqueness is enforced by partial unique indexes over live rows; their
/// violations come back as `DuplicateEmail` / `DuplicateUsername`.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username, &user.email, "create"))?;

        row_to_user(&row)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!(
                "User with email '{}' not found",
                email
            ))),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!(
                "User with username '{}' not found",
                username
            ))),
        }
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, username, email, password_hash,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(user.id().value())
        .bind(user.username())
        .bind(user.email())
        .bind(user.password_hash())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.username(), user.email(), "update"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            ))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_sql_count(limit))
        .bind(to_sql_count(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::with_capacity(rows.len());

        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(users)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: i64 = row.try_get("id").map_err(read)?;
    let username: String = row.try_get("username").map_err(read)?;
    let email: String = row.try_get("email").map_err(read)?;
    let password_hash: String = row.try_get("password_hash").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;
    let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at").map_err(read)?;

    Ok(User::from_parts(
        UserId::new(id),
        NewUser {
            username,
            email,
            password_hash,
        },
        created_at,
        updated_at,
        DeletionState::from_deleted_at(deleted_at),
    ))
}

fn map_write_error(e: sqlx::Error, username: &str, email: &str, action: &str) -> DomainError {
    let duplicate = e
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| db.constraint())
        .and_then(|constraint| duplicate_for_constraint(constraint, username, email));

    duplicate.unwrap_or_else(|| DomainError::storage(format!("Failed to {} user: {}", action, e)))
}

fn duplicate_for_constraint(constraint: &str, username: &str, email: &str) -> Option<DomainError> {
    match constraint {
        USERNAME_UNIQUE_INDEX => Some(DomainError::duplicate_username(username)),
        EMAIL_UNIQUE_INDEX => Some(DomainError::duplicate_email(email)),
        _ => None,
    }
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::domain::DomainError;

/// Partial unique index over live usernames
pub const USERNAME_UNIQUE_INDEX: &str = "idx_users_username_active";

/// Partial unique index over live emails
pub const EMAIL_UNIQUE_INDEX: &str = "idx_users_email_active";

/// Advisory lock key shared by every migrator on the same database
const MIGRATION_LOCK_KEY: i64 = 0x7573_6572_735f_6d67;

const LOCK_SQL: &str = "SELECT pg_advisory_xact_lock($1)";

const APPLIED_SQL: &str = "SELECT EXISTS (SELECT 1 FROM _migrations WHERE version = $1)";

const RECORD_SQL: &str =
    "INSERT INTO _migrations (version, description) VALUES ($1, $2) ON CONFLICT (version) DO NOTHING";

/// Represents a database migration
///
/// `up` holds exactly one SQL statement.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version, applied in ascending order
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// PostgreSQL migrator that records applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        let failed =
            |e: sqlx::Error| DomainError::storage(format!("Failed to create migrations table: {}", e));

        let mut tx = self.pool.begin().await.map_err(failed)?;

        sqlx::query(LOCK_SQL)
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

        tx.commit().await.map_err(failed)
    }

    /// Applies every migration in `migrations` that is not yet recorded.
    ///
    /// Each migration and its bookkeeping row commit in one transaction that
    /// holds a database-wide advisory lock, so concurrent migrators apply
    /// each version once. Returns the number of migrations applied by this call.
    pub async fn run(&self, migrations: &[Migration]) -> Result<usize, DomainError> {
        let applied = self.applied_versions().await?;
        let mut count = 0;

        for migration in migrations {
            if applied.contains(&migration.version) {
                continue;
            }

            if self.apply(migration).await? {
                info!(
                    version = migration.version,
                    description = %migration.description,
                    "Applied migration"
                );
                count += 1;
            } else {
                debug!(version = migration.version, "Migration applied by another instance");
            }
        }

        Ok(count)
    }

    /// Returns `false` when another migrator recorded the version first
    async fn apply(&self, migration: &Migration) -> Result<bool, DomainError> {
        let failed = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to run migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(failed)?;

        sqlx::query(LOCK_SQL)
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

        let already_applied: bool = sqlx::query_scalar(APPLIED_SQL)
            .bind(migration.version)
            .fetch_one(&mut *tx)
            .await
            .map_err(failed)?;

        if already_applied {
            tx.rollback().await.map_err(failed)?;
            return Ok(false);
        }

        sqlx::query(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

        let recorded = sqlx::query(RECORD_SQL)
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

        tx.commit().await.map_err(failed)?;

        Ok(recorded.rows_affected() > 0)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }

    /// Returns all applied migration versions
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get applied migrations: {}", e)))
    }
}

/// Schema of the user store
pub fn user_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                deleted_at TIMESTAMPTZ NULL
            )
            "#,
        ),
        Migration::new(
            2,
            "Unique live usernames",
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON users (username) WHERE deleted_at IS NULL",
                USERNAME_UNIQUE_INDEX
            ),
        ),
        Migration::new(
            3,
            "Unique live emails",
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON users (email) WHERE deleted_at IS NULL",
                EMAIL_UNIQUE_INDEX
            ),
        ),
        Migration::new(
            4,
            "Index users by deletion time",
            "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)",
        ),
    ]
}

/// Applies the user schema to `pool`
pub async fn run_user_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone())
        .run(&user_migrations())
        .await
}

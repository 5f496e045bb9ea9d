//! User Service
//!
//! A user-management REST service with:
//! - Create, read, partial update and soft delete of user records
//! - Uniqueness of username and email among live users
//! - Argon2 password hashing
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use crate::config::StorageBackend;
use infrastructure::storage::{run_user_migrations, PostgresConfig};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService,
};
use tracing::info;

/// Create the application state with the storage backend named in `config`
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher = Arc::new(Argon2Hasher::new());

    let state = match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory user storage");

            let repository = Arc::new(InMemoryUserRepository::new());
            AppState::new(Arc::new(UserService::new(repository, hasher)))
        }
        StorageBackend::Postgres => {
            let pool = PostgresConfig::from_database_config(&config.database)?
                .connect()
                .await?;
            info!("Connected to PostgreSQL user storage");

            if config.database.run_migrations {
                let applied = run_user_migrations(&pool).await?;
                info!(applied, "User schema is up to date");
            }

            let repository = Arc::new(PostgresUserRepository::new(pool));
            AppState::new(Arc::new(UserService::new(repository, hasher)))
        }
    };

    Ok(state)
}

//! Migrate command - applies the user schema and exits

use tracing::info;

use crate::infrastructure::storage::{run_user_migrations, PostgresConfig, PostgresMigrator};

/// Apply pending migrations to `database.url`
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let pool = PostgresConfig::from_database_config(&config.database)?
        .connect()
        .await?;

    let applied = run_user_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool.clone()).current_version().await?;

    info!(applied, version = ?version, "Migrations complete");

    pool.close().await;

    Ok(())
}

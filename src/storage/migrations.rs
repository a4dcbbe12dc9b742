// storage/migrations.rs
// Schema creation

use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Runs the SQL migrations in the `migrations/` directory.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    log::debug!("Schema migrations applied");
    Ok(())
}

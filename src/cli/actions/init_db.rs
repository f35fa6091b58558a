use crate::db;
use anyhow::{Context, Result};
use tracing::info;

/// Execute the init-db action against a fresh database.
///
/// The schema script drops and recreates the declared tables, so running it
/// against a populated database destroys data.
///
/// # Errors
/// Returns an error if the database cannot be opened or the schema fails to
/// apply.
pub async fn execute(dsn: &str) -> Result<()> {
    db::init_schema(dsn)
        .await
        .context("Failed to initialize the database schema")?;

    info!("Database schema created");

    Ok(())
}

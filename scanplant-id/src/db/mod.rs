//! Database access for the identification service

pub mod plants;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to scanplant.db in the data directory, creating it if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize service tables
///
/// Creates the plants table if it doesn't exist.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id TEXT PRIMARY KEY,
            image_data TEXT NOT NULL,
            scientific_name TEXT NOT NULL,
            common_name TEXT NOT NULL DEFAULT '',
            latitude REAL,
            longitude REAL,
            city TEXT NOT NULL DEFAULT '',
            location_name TEXT NOT NULL DEFAULT '',
            wiki_description TEXT NOT NULL DEFAULT '',
            family TEXT NOT NULL DEFAULT '',
            genus TEXT NOT NULL DEFAULT '',
            care_instructions TEXT NOT NULL DEFAULT '',
            enhanced_description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            owner_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (plants)");

    Ok(())
}

//! Database initialization
//!
//! Creates the database on first run and brings the schema up to date.
//! All create statements are `IF NOT EXISTS`, so initialization is
//! idempotent and safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize the database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers while a refresh task writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent). Public so tests can apply the schema
/// to an in-memory pool.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_routes_table(pool).await?;
    create_faa_prefroutes_table(pool).await?;
    create_crossings_table(pool).await?;
    create_enroute_table(pool).await?;
    create_procedure_tables(pool).await?;
    create_settings_table(pool).await?;
    init_default_settings(pool).await?;
    Ok(())
}

/// Locally curated preferred routes
async fn create_routes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS routes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            route TEXT NOT NULL,
            altitude TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Bulk-imported FAA preferred route table
async fn create_faa_prefroutes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS faa_prefroutes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            orig TEXT NOT NULL DEFAULT '',
            route_string TEXT NOT NULL DEFAULT '',
            dest TEXT NOT NULL DEFAULT '',
            hours TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL DEFAULT '',
            area TEXT NOT NULL DEFAULT '',
            altitude TEXT NOT NULL DEFAULT '',
            aircraft TEXT NOT NULL DEFAULT '',
            direction TEXT NOT NULL DEFAULT '',
            seq INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Boundary crossing restrictions
async fn create_crossings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS crossings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            destination TEXT NOT NULL,
            bdry_fix TEXT NOT NULL DEFAULT '',
            restriction TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            artcc TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Enroute qualifier rules
async fn create_enroute_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS enroute (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            field TEXT NOT NULL,
            qualifier TEXT NOT NULL DEFAULT '',
            areas TEXT NOT NULL DEFAULT '',
            rule TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// STAR and DP route expansions (same shape, two tables)
async fn create_procedure_tables(pool: &SqlitePool) -> Result<()> {
    for table in ["star_rte", "sid_rte"] {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                procedure_code TEXT NOT NULL DEFAULT '',
                transition_code TEXT NOT NULL DEFAULT '',
                route_name TEXT NOT NULL DEFAULT '',
                point_seq INTEGER NOT NULL DEFAULT 0,
                point TEXT NOT NULL DEFAULT '',
                arpt_rwy_assoc TEXT NOT NULL DEFAULT ''
            )",
            table
        ))
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Key/value settings
async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Seed settings that must exist. An empty shared secret disables API
/// authentication until an operator sets one.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES ('api_shared_secret', '')")
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM routes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        let secret: String =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'api_shared_secret'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(secret, "");
    }
}

//! API shared secret management
//!
//! Mutating endpoints are protected by a bearer shared secret stored in
//! the database settings table. An empty secret disables auth checking
//! entirely, which keeps zero-config startup working until an operator
//! sets one.

use crate::Result;
use sqlx::SqlitePool;

/// Settings key holding the API shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Load the API shared secret from the settings table.
///
/// Returns the empty string (auth disabled) when the row is missing.
pub async fn load_shared_secret(pool: &SqlitePool) -> Result<String> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SHARED_SECRET_KEY)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(value,)| value).unwrap_or_default())
}

/// Store the API shared secret
pub async fn set_shared_secret(pool: &SqlitePool, secret: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(SHARED_SECRET_KEY)
    .bind(secret)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_schema;

    #[tokio::test]
    async fn missing_secret_defaults_to_disabled() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(load_shared_secret(&pool).await.unwrap(), "");
    }

    #[tokio::test]
    async fn secret_round_trips() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        set_shared_secret(&pool, "hunter2").await.unwrap();
        assert_eq!(load_shared_secret(&pool).await.unwrap(), "hunter2");
    }
}

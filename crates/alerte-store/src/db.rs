//! Database abstraction over SQLite via sqlx.

use std::path::Path;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use tracing::debug;

use crate::error::StoreError;
use crate::migrations::run_migrations;
use crate::models::CredentialRow;

/// Fixed id of the single logical credential row.
pub const CREDENTIAL_ROW_ID: i64 = 1;

/// Durable fallback tier for the credential cache. Cheap to clone (the pool
/// is an Arc internally).
#[derive(Clone)]
pub struct CredentialDb {
    pool: SqlitePool,
}

impl CredentialDb {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically.
    ///
    /// WAL journal mode and foreign-key enforcement are configured at
    /// connection time here — NOT inside a migration, because SQLite forbids
    /// changing `journal_mode` inside a transaction and sqlx wraps every
    /// migration in one.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts).await?;
        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Replace the credential row wholesale, stamping a fresh `updated_at`.
    pub async fn replace(&self, token: &str, user_email: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO credentials (id, token, user_email, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(CREDENTIAL_ROW_ID)
        .bind(token)
        .bind(user_email)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        debug!("credential row replaced");
        Ok(())
    }

    /// Fetch the credential row, if one has ever been written.
    pub async fn fetch(&self) -> Result<Option<CredentialRow>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, token, user_email, updated_at FROM credentials WHERE id = ?",
        )
        .bind(CREDENTIAL_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete the credential row. Deleting an absent row is not an error.
    pub async fn delete(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credentials WHERE id = ?")
            .bind(CREDENTIAL_ROW_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

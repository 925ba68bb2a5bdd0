//! Database row models — these map to/from SQL rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: i64,
    /// Opaque bearer token.
    pub token: String,
    /// Identity associated with the token. Empty when the token was written
    /// without one (tolerated degraded state).
    pub user_email: String,
    /// Unix milliseconds of the last full-row replace.
    pub updated_at: i64,
}

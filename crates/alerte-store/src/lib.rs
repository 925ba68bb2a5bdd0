//! alerte-store — durable credential fallback for MonAlerte
//!
//! SQLite-backed lowest tier of the credential cache. It holds a single
//! logical row `{token, user_email, updated_at}` addressed by a fixed id,
//! so a token survives reinstalls of the OS keychain entry and is still
//! readable by older code paths that query the table directly. Values are
//! stored as plaintext columns for exactly that reason: other readers must
//! not need an internal-only encoding.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on first open.

pub mod db;
pub mod error;
pub mod migrations;
pub mod models;

pub use db::{CredentialDb, CREDENTIAL_ROW_ID};
pub use error::StoreError;
pub use models::CredentialRow;

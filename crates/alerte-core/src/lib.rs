//! alerte-core — non-UI core of the MonAlerte safety app.
//!
//! The centerpiece is [`credentials::CredentialCache`], a tiered store for
//! the authentication token and the associated user email:
//!
//! 1. in-process memory (owned by the cache),
//! 2. the OS keychain ([`secure_store`]),
//! 3. a durable SQLite row (`alerte-store`),
//! 4. a read-only settings-file fallback for pre-cache installations.
//!
//! Reads promote hits upward; writes fan out best-effort; tier failures are
//! logged and never surfaced. [`watch`] carries the typed watch-mode safety
//! toggles, persisted through the same settings file.

pub mod credentials;
pub mod paths;
pub mod secure_store;
pub mod settings_store;
pub mod watch;

pub use credentials::{CacheStats, CredentialCache, EMAIL_KEY, TOKEN_KEY};
pub use secure_store::{KeyringSecureStore, MemorySecureStore, SecureStore};
pub use settings_store::SettingsStore;
pub use watch::WatchSettings;

//! Tiered credential cache: memory → OS keychain → SQLite row, with a
//! read-only settings-file fallback for installations that predate the
//! cache.
//!
//! Reads walk the tiers in priority order and promote a hit upward, so the
//! next read in the same process is served from memory. Writes fan out to
//! every tier independently; a tier that fails to persist is logged and
//! skipped, never rolled back. No error crosses this API — the only
//! negative outcome a caller can observe is `None`.
//!
//! All public operations are serialized by one lock held for the full
//! duration of the call, nested store I/O included. Without that, a
//! concurrent save and get could interleave their tier operations and the
//! reader would see a half-updated tier set.

use std::collections::HashMap;
use std::sync::Arc;

use alerte_store::CredentialDb;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::secure_store::SecureStore;
use crate::settings_store::SettingsStore;

/// Canonical key under which the bearer token lives in every tier.
pub const TOKEN_KEY: &str = "jwt_token";
/// Side-channel key for the identity associated with the token.
pub const EMAIL_KEY: &str = "user_email";

/// Diagnostic snapshot of the in-memory tier. No side effects.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    pub has_token: bool,
    pub has_email: bool,
}

/// Tiered read/write/clear store for the authentication token and the
/// associated user email. Clone to share; all clones serialize on the same
/// lock.
#[derive(Clone)]
pub struct CredentialCache {
    secure: Arc<dyn SecureStore>,
    db: CredentialDb,
    settings: Arc<SettingsStore>,
    memory: Arc<Mutex<HashMap<String, String>>>,
}

impl CredentialCache {
    pub fn new(
        secure: Arc<dyn SecureStore>,
        db: CredentialDb,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            secure,
            db,
            settings,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Read a value through the tiers. Returns `None` only when every tier
    /// reports absent (an empty string counts as absent).
    pub async fn get_token(&self, key: &str) -> Option<String> {
        let mut memory = self.memory.lock().await;
        self.get_locked(&mut memory, key).await
    }

    async fn get_locked(&self, memory: &mut HashMap<String, String>, key: &str) -> Option<String> {
        if let Some(value) = memory.get(key) {
            if !value.is_empty() {
                return Some(value.clone());
            }
        }

        // Tier 2: keychain. Errors fall through to the next tier.
        match self.secure.retrieve(key).await {
            Ok(Some(value)) if !value.is_empty() => {
                memory.insert(key.to_string(), value.clone());
                return Some(value);
            }
            Ok(_) => {}
            Err(e) => warn!("secure store read failed for {key}: {e:#}"),
        }

        // Tier 3: durable row, restricted to the canonical token key.
        if key == TOKEN_KEY {
            match self.db.fetch().await {
                Ok(Some(row)) if !row.token.is_empty() => {
                    let token = row.token;
                    self.promote(memory, key, &token).await;
                    return Some(token);
                }
                Ok(_) => {}
                Err(e) => warn!("credential db read failed: {e}"),
            }
        }

        None
    }

    /// Copy a lower-tier hit into memory and, best effort, into the
    /// keychain so future reads stop before the durable tiers.
    async fn promote(&self, memory: &mut HashMap<String, String>, key: &str, value: &str) {
        memory.insert(key.to_string(), value.to_string());
        if let Err(e) = self.secure.store(key, value).await {
            warn!("secure store promotion failed for {key}: {e:#}");
        }
    }

    /// Fan a write out to every tier: memory first (cannot fail), then the
    /// keychain, then the durable row when `key` is the canonical token key.
    /// Tier writes are independent best-effort — a failed tier is logged and
    /// the others stand.
    ///
    /// A non-empty `user_email` is written as a side-channel value under
    /// [`EMAIL_KEY`]; its persistence is not required for the primary write
    /// to count as successful.
    pub async fn save_token(&self, key: &str, value: &str, user_email: &str) {
        let mut memory = self.memory.lock().await;
        memory.insert(key.to_string(), value.to_string());
        if !user_email.is_empty() {
            memory.insert(EMAIL_KEY.to_string(), user_email.to_string());
        }

        if let Err(e) = self.secure.store(key, value).await {
            warn!("secure store write failed for {key}: {e:#}");
        }
        if !user_email.is_empty() {
            if let Err(e) = self.secure.store(EMAIL_KEY, user_email).await {
                warn!("secure store write failed for {EMAIL_KEY}: {e:#}");
            }
        }

        if key == TOKEN_KEY {
            if let Err(e) = self.db.replace(value, user_email).await {
                warn!("credential db write failed: {e}");
            }
        }
    }

    /// Read the email side-channel through the tiers. A token without an
    /// email is a valid degraded state; this returns `None` then and no
    /// repair is attempted.
    pub async fn get_user_email(&self) -> Option<String> {
        let mut memory = self.memory.lock().await;
        if let Some(value) = memory.get(EMAIL_KEY) {
            if !value.is_empty() {
                return Some(value.clone());
            }
        }

        match self.secure.retrieve(EMAIL_KEY).await {
            Ok(Some(value)) if !value.is_empty() => {
                memory.insert(EMAIL_KEY.to_string(), value.clone());
                return Some(value);
            }
            Ok(_) => {}
            Err(e) => warn!("secure store read failed for {EMAIL_KEY}: {e:#}"),
        }

        match self.db.fetch().await {
            Ok(Some(row)) if !row.user_email.is_empty() => {
                memory.insert(EMAIL_KEY.to_string(), row.user_email.clone());
                Some(row.user_email)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("credential db read failed: {e}");
                None
            }
        }
    }

    /// Empty every tier. Deletes are best effort: a tier that fails to
    /// clear will be overwritten by the next save anyway, so partial
    /// failure still counts as success.
    pub async fn clear_all(&self) {
        let mut memory = self.memory.lock().await;
        memory.clear();

        for key in [TOKEN_KEY, EMAIL_KEY] {
            if let Err(e) = self.secure.remove(key).await {
                warn!("secure store delete failed for {key}: {e:#}");
            }
        }

        if let Err(e) = self.db.delete().await {
            warn!("credential db delete failed: {e}");
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let memory = self.memory.lock().await;
        let mut keys: Vec<String> = memory.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: memory.len(),
            keys,
            has_token: memory.get(TOKEN_KEY).is_some_and(|v| !v.is_empty()),
            has_email: memory.get(EMAIL_KEY).is_some_and(|v| !v.is_empty()),
        }
    }

    /// Populate memory from the lower tiers once at session start so the
    /// first real read is served from memory.
    ///
    /// Installations that predate the cache carried the token in the plain
    /// settings file. When no cache tier has a token, the legacy value is
    /// migrated in here as an ordinary write; the settings file itself is
    /// never written or cleared by this component.
    pub async fn warmup(&self) {
        let mut memory = self.memory.lock().await;
        let mut token = self.get_locked(&mut memory, TOKEN_KEY).await;

        if token.is_none() {
            if let Some(legacy) = self
                .settings
                .get_string(TOKEN_KEY)
                .filter(|v| !v.is_empty())
            {
                debug!("migrating legacy settings-file token into the cache");
                self.promote(&mut memory, TOKEN_KEY, &legacy).await;
                if let Err(e) = self.db.replace(&legacy, "").await {
                    warn!("credential db write failed: {e}");
                }
                token = Some(legacy);
            }
        }
        debug!(found = token.is_some(), "credential cache warmed up");

        if !memory.contains_key(EMAIL_KEY) {
            match self.secure.retrieve(EMAIL_KEY).await {
                Ok(Some(value)) if !value.is_empty() => {
                    memory.insert(EMAIL_KEY.to_string(), value);
                }
                Ok(_) => {}
                Err(e) => warn!("secure store read failed for {EMAIL_KEY}: {e:#}"),
            }
        }
    }
}

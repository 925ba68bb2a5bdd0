//! OS keychain integration for the encrypted credential tier.
//! - Windows: Credential Manager
//! - macOS/iOS: Keychain
//! - Linux: Secret Service (GNOME Keyring / KWallet)
//!
//! Every call may fail on platform-level trouble (locked keychain, missing
//! dbus session). The credential cache catches those failures at the tier
//! boundary, so implementations here just report them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use keyring::Entry;
use parking_lot::Mutex;

/// Key→string encrypted persistence with platform keychain semantics.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn store(&self, key: &str, value: &str) -> Result<()>;
    /// `Ok(None)` when no entry exists under `key`.
    async fn retrieve(&self, key: &str) -> Result<Option<String>>;
    /// Removing an absent entry is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
    /// Remove every entry this store manages.
    async fn clear(&self) -> Result<()>;
}

/// Secure store backed by the OS keychain.
///
/// Keychains cannot enumerate entries per service, so the store is told at
/// construction which keys it manages; `clear` walks that fixed set.
pub struct KeyringSecureStore {
    service: String,
    managed_keys: Vec<String>,
}

impl KeyringSecureStore {
    pub fn new(service: impl Into<String>, managed_keys: &[&str]) -> Self {
        Self {
            service: service.into(),
            managed_keys: managed_keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|e| anyhow!("keyring init: {e}"))
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| anyhow!("store {key}: {e}"))
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(anyhow!("load {key}: {e}")),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow!("delete {key}: {e}")),
        }
    }

    async fn clear(&self) -> Result<()> {
        for key in &self.managed_keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// In-memory secure store for tests and headless environments.
///
/// `set_fail_all(true)` makes every call error, simulating an unavailable
/// keychain for the fallback tests.
#[derive(Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<String, String>>,
    fail_all: AtomicBool,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(anyhow!("secure store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check_available()?;
        self.entries.lock().clear();
        Ok(())
    }
}

//! Session glue: the account service on one side, the credential cache on
//! the other. This is the only place that decides what happens to the
//! cached credential on login, logout and app start — the cache itself only
//! reports presence or absence.

use std::fs;
use std::sync::Arc;

use alerte_core::credentials::{CredentialCache, EMAIL_KEY, TOKEN_KEY};
use alerte_core::paths;
use alerte_core::secure_store::KeyringSecureStore;
use alerte_core::settings_store::SettingsStore;
use alerte_store::CredentialDb;
use anyhow::{Context, Result};
use tracing::info;

use crate::client::{AuthApi, AuthClient, RegisterRequest};

/// Keychain service name shared by every MonAlerte credential entry.
const KEYCHAIN_SERVICE: &str = "com.monalerte.alerte";

pub struct Session {
    api: Arc<dyn AuthApi>,
    cache: CredentialCache,
}

impl Session {
    pub fn new(api: Arc<dyn AuthApi>, cache: CredentialCache) -> Self {
        Self { api, cache }
    }

    /// Wire up a session against the platform stores in their default
    /// locations. The cache is always constructed — callers never fall back
    /// to manual tier-by-tier reads.
    pub async fn bootstrap(base_url: &str) -> Result<Self> {
        let data = paths::data_dir()?;
        fs::create_dir_all(&data).context("create data directory")?;

        let db = CredentialDb::open(&paths::credential_db_path()?)
            .await
            .context("open credential db")?;
        let secure = Arc::new(KeyringSecureStore::new(
            KEYCHAIN_SERVICE,
            &[TOKEN_KEY, EMAIL_KEY],
        ));
        let settings = Arc::new(SettingsStore::open(paths::settings_path()?));
        let cache = CredentialCache::new(secure, db, settings);

        let api = Arc::new(AuthClient::new(base_url)?);
        Ok(Self::new(api, cache))
    }

    /// Log in and persist the credential pair through every cache tier.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let res = self.api.login(email, password).await?;
        self.cache.save_token(TOKEN_KEY, &res.token, email).await;
        info!("session established for {email}");
        Ok(())
    }

    /// Register a new account; a successful registration logs the user in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<()> {
        let res = self.api.register(req).await?;
        self.cache.save_token(TOKEN_KEY, &res.token, &req.email).await;
        info!("account registered for {}", req.email);
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.api.request_password_reset(email).await
    }

    /// Restore a prior session at app start. Returns the cached token when
    /// one survives in any tier.
    pub async fn restore(&self) -> Option<String> {
        self.cache.warmup().await;
        self.cache.get_token(TOKEN_KEY).await
    }

    /// Forget the credential everywhere. What "logged out" means for the UI
    /// is the caller's decision.
    pub async fn logout(&self) {
        self.cache.clear_all().await;
        info!("session cleared");
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }
}

//! Plain JSON key-value settings file.
//!
//! The credential cache consults this store strictly read-only, as a
//! compatibility fallback for installations that predate the tiered cache
//! and still carry a token in the old settings file. Everything else in the
//! app (watch-mode toggles included) reads and writes it normally.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use parking_lot::RwLock;

pub struct SettingsStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl SettingsStore {
    /// Open the settings file, starting empty when it is missing or
    /// unparsable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.values.read())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

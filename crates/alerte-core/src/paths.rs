use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "com";
pub const APP_ORG: &str = "monalerte";
pub const APP_NAME: &str = "alerte";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("cannot determine data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn credential_db_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("credentials.db"))
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("settings.json"))
}

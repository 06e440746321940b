use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::errors::IntakeError;
use crate::utils::app_data_dir;

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CANONICAL_PATH: &str = "/forms/Cash-Buyer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of a deployed restore endpoint; local drafts are used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_url: Option<String>,
    /// Bound on the restore fetch; timeouts degrade to "nothing to restore".
    pub fetch_timeout_secs: u64,
    pub canonical_form_path: String,
    /// Stable local session identity keying one-time drafts.
    pub session_key: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            restore_url: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            canonical_form_path: DEFAULT_CANONICAL_PATH.into(),
            session_key: Uuid::new_v4(),
            session_cookie: None,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, IntakeError> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, IntakeError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, IntakeError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, IntakeError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Loads the config, persisting a freshly generated default on first run
    /// so the session key stays stable across invocations.
    pub fn load_or_create(&self) -> Result<Config, IntakeError> {
        if self.path.exists() {
            return self.load();
        }
        let config = Config::default();
        self.save(&config)?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), IntakeError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), IntakeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_default_when_missing() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.canonical_form_path, DEFAULT_CANONICAL_PATH);
    }

    #[test]
    fn load_or_create_pins_session_key() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let first = manager.load_or_create().unwrap();
        let second = manager.load_or_create().unwrap();
        assert_eq!(first.session_key, second.session_key);
    }

    #[test]
    fn save_round_trips() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.restore_url = Some("https://example.test/api/cbForm/restore".into());
        config.fetch_timeout_secs = 9;
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.restore_url, config.restore_url);
        assert_eq!(loaded.fetch_timeout_secs, 9);
        assert_eq!(loaded.session_key, config.session_key);
    }
}

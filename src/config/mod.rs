use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{errors::AppError, utils::ensure_dir};

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Default delay between the last field edit and the autosave write.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 500;
/// Default delay after which the host's notice surface hides a notice.
pub const DEFAULT_NOTICE_AUTOHIDE_MS: u64 = 5000;

/// Tunable runtime settings.
///
/// The two durations are deliberately configuration, not contract: hosts may
/// shorten the debounce for kiosk use or stretch the auto-hide for screen
/// readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub autosave_debounce_ms: u64,
    pub notice_autohide_ms: u64,
    /// File name of the persisted draft inside the app data directory.
    pub draft_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            notice_autohide_ms: DEFAULT_NOTICE_AUTOHIDE_MS,
            draft_file: "business_application.json".into(),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, AppError> {
        Self::from_base(crate::utils::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, AppError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, AppError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, AppError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
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

fn write_atomic(path: &Path, data: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
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
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        let config = manager.load().expect("load config");
        assert_eq!(config.autosave_debounce_ms, DEFAULT_AUTOSAVE_DEBOUNCE_MS);
        assert_eq!(config.draft_file, "business_application.json");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        let config = Config {
            autosave_debounce_ms: 250,
            notice_autohide_ms: 8000,
            draft_file: "draft.json".into(),
        };
        manager.save(&config).expect("save config");
        let loaded = manager.load().expect("load config");
        assert_eq!(loaded.autosave_debounce_ms, 250);
        assert_eq!(loaded.notice_autohide_ms, 8000);
        assert_eq!(loaded.draft_file, "draft.json");
    }
}

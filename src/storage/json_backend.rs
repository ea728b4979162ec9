use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{errors::AppError, form::draft::DraftSnapshot, utils::ensure_dir};

use super::{DraftStore, Result};

const TMP_SUFFIX: &str = "tmp";

/// Stores the draft as a single pretty-printed JSON file under the app data
/// directory.
#[derive(Debug, Clone)]
pub struct JsonDraftStore {
    path: PathBuf,
}

impl JsonDraftStore {
    pub fn new(root: Option<PathBuf>, file_name: &str) -> Result<Self> {
        let base = root.unwrap_or_else(crate::utils::app_data_dir);
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(file_name),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, "business_application.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftStore for JsonDraftStore {
    fn save(&self, draft: &DraftSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(draft)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
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

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

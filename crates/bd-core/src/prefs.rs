use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const APP_DIR: &str = "bulk-denoiser";
pub const PREFS_FILE: &str = "preferences.json";

/// Key holding the directory the last batch of inputs was picked from.
pub const KEY_INPUT_FOLDER: &str = "input_folder";

/// Flat string key-value preferences persisted as JSON.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No config directory for this platform")?;
        Ok(base.join(APP_DIR).join(PREFS_FILE))
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::open(Self::default_path()?))
    }

    /// A missing or unreadable file yields an empty store; nothing is written until `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// Stored input folder if it still exists, otherwise the home directory.
    pub fn last_input_dir(&self) -> Option<PathBuf> {
        self.get(KEY_INPUT_FOLDER)
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .or_else(dirs::home_dir)
    }

    pub fn set_last_input_dir(&mut self, dir: &Path) -> Result<()> {
        self.set(KEY_INPUT_FOLDER, dir.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join(PREFS_FILE);

        let mut store = PreferenceStore::open(&path);
        assert_eq!(store.get(KEY_INPUT_FOLDER), None);
        store.set_last_input_dir(tmp.path()).unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.last_input_dir(), Some(tmp.path().to_path_buf()));
        assert_eq!(reopened.get("theme"), Some("dark"));
        assert_eq!(reopened.iter().count(), 2);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(PREFS_FILE);
        fs::write(&path, "{ not json").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn vanished_input_folder_is_not_returned() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = PreferenceStore::open(tmp.path().join(PREFS_FILE));
        let gone = tmp.path().join("deleted");
        store.set(KEY_INPUT_FOLDER, gone.to_string_lossy()).unwrap();

        assert_ne!(store.last_input_dir(), Some(gone));
    }
}

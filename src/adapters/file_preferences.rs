//! File-backed preference store.
//!
//! Preferences live in `~/.agentdeck/preferences.json` as a flat JSON object
//! of string values.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::traits::{PreferenceError, PreferenceStore};

const PREFERENCES_DIR: &str = ".agentdeck";
const PREFERENCES_FILE: &str = "preferences.json";

/// JSON file preference store.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FilePreferences {
    /// Store in the user's home directory.
    pub fn new() -> Result<Self, PreferenceError> {
        let home = dirs::home_dir().ok_or(PreferenceError::NoConfigDir)?;
        Ok(Self::at(home.join(PREFERENCES_DIR).join(PREFERENCES_FILE)))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, values)?;
        writer.flush()?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                warn!("Ignoring unreadable preferences at {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // A corrupt file is replaced rather than blocking every write
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FilePreferences {
        FilePreferences::at(temp_dir.path().join(PREFERENCES_DIR).join(PREFERENCES_FILE))
    }

    #[test]
    fn test_missing_file_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_set_creates_directory_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.set("theme", "dark").unwrap();
        assert!(store.path().exists());

        let reopened = store_in(&temp_dir);
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_set_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.set("theme", "dark").unwrap();
        store.set("agent", "oracle_agent").unwrap();
        store.set("theme", "light").unwrap();

        assert_eq!(store.get("theme").as_deref(), Some("light"));
        assert_eq!(store.get("agent").as_deref(), Some("oracle_agent"));
    }

    #[test]
    fn test_corrupt_file_reads_none_and_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}

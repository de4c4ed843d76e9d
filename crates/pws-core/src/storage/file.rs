use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StoreError;

/// Key/value store persisted as a single JSON object on disk.
///
/// Every lookup re-reads the file, so values written by another process
/// (or another store over the same path) are visible immediately.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        // Write aside and rename so readers never see a half-written file
        let tmp = self.tmp_path();
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, keys: &[&str], f: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                // An unreadable file is replaced rather than left half-valid
                warn!(error = %e, path = ?self.path, "Discarding unreadable storage file");
                BTreeMap::new()
            }
        };
        f(&mut entries);
        if let Err(e) = self.write_entries(&entries) {
            warn!(error = %e, keys = ?keys, path = ?self.path, "Failed to write storage file");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(error = %e, path = ?self.path, "Failed to read storage file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.set_many(&[(key, value)]);
    }

    fn remove(&self, key: &str) {
        self.remove_many(&[key]);
    }

    fn set_many(&self, entries: &[(&str, &str)]) {
        let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
        debug!(keys = ?keys, "Storing values");
        self.update(&keys, |stored| {
            for (key, value) in entries {
                stored.insert(key.to_string(), value.to_string());
            }
        });
    }

    fn remove_many(&self, keys: &[&str]) {
        debug!(keys = ?keys, "Removing values");
        self.update(keys, |stored| {
            for key in keys {
                stored.remove(*key);
            }
        });
    }
}

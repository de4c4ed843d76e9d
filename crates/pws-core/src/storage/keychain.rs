use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use tracing::warn;

use super::KeyValueStore;
use crate::error::StoreError;

/// Key/value store backed by the OS keychain, one entry per key.
///
/// Entries are created once per key and reused, so every operation on a key
/// goes through the same credential handle.
pub struct KeyringStore {
    service: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn with_entry<T>(
        &self,
        key: &str,
        f: impl FnOnce(&Entry) -> keyring::Result<T>,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = match entries.entry(key.to_string()) {
            std::collections::hash_map::Entry::Occupied(slot) => slot.into_mut(),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Entry::new(&self.service, key)?)
            }
        };
        Ok(f(entry)?)
    }

    fn try_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
    }

    fn try_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry| entry.set_password(value))
    }

    fn try_remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        self.try_get(key).unwrap_or_else(|e| {
            warn!(error = %e, key = key, "Failed to read from keychain");
            None
        })
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            warn!(error = %e, key = key, "Failed to store value in keychain");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            warn!(error = %e, key = key, "Failed to delete keychain entry");
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) {
        for (index, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.try_set(key, value) {
                warn!(error = %e, key = *key, "Failed to store value in keychain, removing the batch");
                // Drop every key of the batch, including ones already written
                for (written, _) in &entries[..index] {
                    self.remove(written);
                }
                self.remove(key);
                return;
            }
        }
    }
}

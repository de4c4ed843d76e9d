//! Durable key/value backends for session persistence.
//!
//! This module provides:
//! - `KeyValueStore`: the synchronous get/set/remove contract the session
//!   store is written against
//! - `MemoryStore`: in-process map, used by tests and the `memory` backend
//! - `FileStore`: a JSON object on disk, re-read on every lookup and
//!   replaced atomically on every write
//! - `KeyringStore`: one OS keychain entry per key
//!
//! The contract is infallible: backends log write failures instead of
//! returning them, and a missing value is simply `None`.

pub mod file;
pub mod keychain;
pub mod memory;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// Synchronous, process-wide string key/value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the current value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str);

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);

    /// Store several values together. Backends that can write them in one
    /// step override this so a failure never leaves only some of them stored.
    fn set_many(&self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Remove several keys together
    fn remove_many(&self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}

//! Durable record of who is logged in.
//!
//! A session is the pair of `token` and `username` values held in a
//! `KeyValueStore`. It is authenticated only when both keys are present;
//! a store holding just one of them reads as logged out.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::storage::KeyValueStore;

/// Durable key holding the server-issued token
pub const TOKEN_KEY: &str = "token";

/// Durable key holding the username the token was issued to
pub const USERNAME_KEY: &str = "username";

/// Read/write access to the persisted session.
///
/// Nothing is cached: every call goes to the backing store, so changes made
/// through another `SessionStore` over the same backend show up on the next read.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    // Held across each operation's read/write pair
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Check if both the token and the username are stored
    pub fn is_authenticated(&self) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.get(TOKEN_KEY).is_some() && self.store.get(USERNAME_KEY).is_some()
    }

    /// Get the stored username. Does not imply a full session.
    pub fn current_username(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.get(USERNAME_KEY)
    }

    /// Record a new session, replacing any previous one
    pub fn establish(&self, token: &str, username: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.set_many(&[(TOKEN_KEY, token), (USERNAME_KEY, username)]);
        debug!(username = username, "Session established");
    }

    /// Remove the session. Safe to call when logged out.
    pub fn clear(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove_many(&[TOKEN_KEY, USERNAME_KEY]);
        debug!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// Store that only accepts batched writes, recording each batch
    #[derive(Default)]
    struct BatchOnlyStore {
        inner: MemoryStore,
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl KeyValueStore for BatchOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, _value: &str) {
            panic!("unbatched write of {}", key);
        }

        fn remove(&self, key: &str) {
            panic!("unbatched removal of {}", key);
        }

        fn set_many(&self, entries: &[(&str, &str)]) {
            self.batches
                .lock()
                .expect("batches lock")
                .push(entries.iter().map(|(key, _)| key.to_string()).collect());
            self.inner.set_many(entries);
        }

        fn remove_many(&self, keys: &[&str]) {
            self.batches
                .lock()
                .expect("batches lock")
                .push(keys.iter().map(|key| key.to_string()).collect());
            self.inner.remove_many(keys);
        }
    }

    fn new_store() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        let session = SessionStore::new(backend.clone());
        (backend, session)
    }

    #[test]
    fn test_establish_then_clear() {
        let (_, session) = new_store();
        assert!(!session.is_authenticated());

        session.establish("abc", "alice");
        assert!(session.is_authenticated());

        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_on_empty_store_is_noop() {
        let (backend, session) = new_store();
        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(backend.get(TOKEN_KEY), None);
        assert_eq!(backend.get(USERNAME_KEY), None);
    }

    #[test]
    fn test_current_username_after_establish() {
        let (_, session) = new_store();
        assert_eq!(session.current_username(), None);

        session.establish("abc", "alice");
        assert_eq!(session.current_username().as_deref(), Some("alice"));
    }

    #[test]
    fn test_establish_overwrites_previous_session() {
        let (backend, session) = new_store();
        session.establish("abc", "alice");
        session.establish("xyz", "bob");

        assert_eq!(session.current_username().as_deref(), Some("bob"));
        assert_eq!(backend.get(TOKEN_KEY).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_partial_state_is_not_authenticated() {
        let (backend, session) = new_store();

        backend.set(USERNAME_KEY, "alice");
        assert!(!session.is_authenticated());
        // Username is still reported verbatim
        assert_eq!(session.current_username().as_deref(), Some("alice"));

        backend.remove(USERNAME_KEY);
        backend.set(TOKEN_KEY, "abc");
        assert!(!session.is_authenticated());
        assert_eq!(session.current_username(), None);
    }

    #[test]
    fn test_changes_through_other_store_are_observed() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = SessionStore::new(backend.clone());
        let second = SessionStore::new(backend);

        first.establish("abc", "alice");
        assert!(second.is_authenticated());

        second.clear();
        assert!(!first.is_authenticated());
    }

    #[test]
    fn test_establish_and_clear_write_both_keys_in_one_batch() {
        let backend = Arc::new(BatchOnlyStore::default());
        let session = SessionStore::new(backend.clone());

        session.establish("abc", "alice");
        assert!(session.is_authenticated());

        session.clear();
        assert!(!session.is_authenticated());

        let both = vec![TOKEN_KEY.to_string(), USERNAME_KEY.to_string()];
        assert_eq!(*backend.batches.lock().expect("batches lock"), vec![both.clone(), both]);
    }
}

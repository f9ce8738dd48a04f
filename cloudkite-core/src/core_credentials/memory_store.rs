//! In-memory secure backend for tests and ephemeral profiles

use super::secure::{SecureBackend, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Helper to convert poison errors into StorageError
fn handle_poison<T>(_err: PoisonError<T>) -> StorageError {
    StorageError::Backend("Lock poisoned: a thread panicked while holding the lock".to_string())
}

type NamespaceMap = HashMap<String, HashMap<String, String>>;

/// In-memory secure backend (non-persistent, nothing is actually encrypted)
#[derive(Clone, Default)]
pub struct MemorySecureStore {
    namespaces: Arc<RwLock<NamespaceMap>>,
}

impl MemorySecureStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureBackend for MemorySecureStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .namespaces
            .read()
            .map_err(handle_poison)?
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn put(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        _encrypt: bool,
    ) -> Result<(), StorageError> {
        self.namespaces
            .write()
            .map_err(handle_poison)?
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if let Some(entries) = self
            .namespaces
            .write()
            .map_err(handle_poison)?
            .get_mut(namespace)
        {
            entries.remove(key);
        }
        Ok(())
    }

    fn remove_namespace(&self, namespace: &str) -> Result<(), StorageError> {
        self.namespaces
            .write()
            .map_err(handle_poison)?
            .remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySecureStore::new();

        store.put("server-a", "username", "alice", true).unwrap();
        assert_eq!(
            store.get("server-a", "username").unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(store.get("server-a", "password").unwrap(), None);
    }

    #[test]
    fn test_memory_store_namespace_isolation() {
        let store = MemorySecureStore::new();

        store.put("server-a", "username", "alice", true).unwrap();
        store.put("server-b", "username", "bob", true).unwrap();

        assert_eq!(
            store.get("server-a", "username").unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(
            store.get("server-b", "username").unwrap(),
            Some("bob".to_string())
        );
    }

    #[test]
    fn test_memory_store_remove_namespace() {
        let store = MemorySecureStore::new();

        store.put("server-a", "username", "alice", true).unwrap();
        store.put("server-a", "password", "s3cret", true).unwrap();
        store.remove_namespace("server-a").unwrap();

        assert_eq!(store.get("server-a", "username").unwrap(), None);
        assert_eq!(store.get("server-a", "password").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_key_is_ok() {
        let store = MemorySecureStore::new();
        store.remove("server-a", "username").unwrap();
        store.remove_namespace("server-a").unwrap();
    }
}

//! Secure backend abstraction
//!
//! A secure backend is an encrypted key-value store addressed by hierarchical
//! namespaces. Each server identity owns one namespace, derived from its
//! identifier via [`encode_server_id`]; namespaces for different identifiers
//! are disjoint.

use thiserror::Error;

/// Errors raised by a secure backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstract secure key-value store
///
/// Implementations must tolerate concurrent access; callers treat every
/// method as fallible and latch themselves off the backend on the first
/// failure (see [`CredentialStore`](super::CredentialStore)).
pub trait SecureBackend: Send + Sync {
    /// Read a value, or `None` if the key has never been written
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value; `encrypt` requests encryption at rest
    fn put(&self, namespace: &str, key: &str, value: &str, encrypt: bool)
        -> Result<(), StorageError>;

    /// Remove a single key; removing an absent key is not an error
    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Remove a namespace and everything stored under it
    fn remove_namespace(&self, namespace: &str) -> Result<(), StorageError>;
}

/// Encode a server identifier into a namespace path segment.
///
/// Slash is the namespace separator in hierarchical backends, so it must not
/// appear verbatim in a single segment. Backslash is the escape character and
/// is escaped first.
pub fn encode_server_id(server_id: &str) -> String {
    server_id.replace('\\', "\\\\").replace('/', "\\2f")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain_id_unchanged() {
        assert_eq!(encode_server_id("my-server"), "my-server");
    }

    #[test]
    fn test_encode_escapes_slashes() {
        assert_eq!(
            encode_server_id("https://api.example.com/v2"),
            "https:\\2f\\2fapi.example.com\\2fv2"
        );
    }

    #[test]
    fn test_encode_escapes_backslashes() {
        assert_eq!(encode_server_id("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_encode_distinct_ids_stay_distinct() {
        // "a/b" must not collide with an id that already contains the escape
        assert_ne!(encode_server_id("a/b"), encode_server_id("a\\2fb"));
    }
}

//! File-based secure backend with encryption at rest
//!
//! One file per namespace, holding a JSON map of key/value pairs.
//!
//! Encrypted File Format:
//! ```text
//! [Magic: 8 bytes "CKCS0001"]
//! [Version: 1 byte]
//! [Salt: 16 bytes]
//! [Nonce: 12 bytes]
//! [Ciphertext + AEAD tag: variable]
//! ```

use super::secure::{SecureBackend, StorageError};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Argon2, Params};
use rand::RngCore;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Magic header for encrypted namespace files
const MAGIC_HEADER: &[u8; 8] = b"CKCS0001";

/// Marker header for unencrypted namespace files
const RAW_HEADER: &[u8; 8] = b"CKCS_RAW";

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// Salt length for Argon2 KDF (16 bytes = 128 bits)
const SALT_LEN: usize = 16;

/// Nonce length for AES-GCM (12 bytes = 96 bits)
const NONCE_LEN: usize = 12;

/// Header size: magic(8) + version(1) + salt(16) + nonce(12) = 37 bytes
const HEADER_SIZE: usize = 8 + 1 + SALT_LEN + NONCE_LEN;

/// File-based secure backend.
///
/// When a passphrase is configured, every namespace file is encrypted with
/// AES-256-GCM under a key derived via Argon2id; without one, files carry an
/// unencrypted marker format. The per-value `encrypt` flag is honored at file
/// granularity: it is a request, satisfied whenever a passphrase is present.
pub struct FileSecureStore {
    /// Directory where namespace files are stored
    base_path: PathBuf,
    /// Encryption passphrase (kept for re-encryption on write)
    passphrase: Option<String>,
    /// Serializes read-modify-write cycles on namespace files
    io_lock: Mutex<()>,
}

impl FileSecureStore {
    /// Create a new file store rooted at the given directory
    pub fn new(base_path: PathBuf, passphrase: Option<&str>) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;

        Ok(FileSecureStore {
            base_path,
            passphrase: passphrase.map(|s| s.to_string()),
            io_lock: Mutex::new(()),
        })
    }

    /// Path of the file backing a namespace. Namespaces are hex-encoded so
    /// escape characters from encoded server ids stay filesystem-safe.
    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.cred", hex::encode(namespace.as_bytes())))
    }

    fn load_namespace(&self, namespace: &str) -> Result<HashMap<String, String>, StorageError> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read(&path)?;
        let plaintext = self.decrypt(&raw)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn store_namespace(
        &self,
        namespace: &str,
        entries: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let plaintext = serde_json::to_vec(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let data = self.encrypt(&plaintext)?;

        // Write atomically: temp file in the same directory, then rename
        let path = self.namespace_path(namespace);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, data)?;
        fs::rename(temp_path, path)?;
        Ok(())
    }

    /// Encrypt data with AES-256-GCM.
    ///
    /// Returns: [magic][version][salt][nonce][ciphertext+tag]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        if let Some(passphrase) = &self.passphrase {
            let mut salt = [0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);

            let key = derive_key(passphrase, &salt)?;

            let mut nonce_bytes = [0u8; NONCE_LEN];
            rand::thread_rng().fill_bytes(&mut nonce_bytes);
            let nonce = Nonce::from_slice(&nonce_bytes);

            let cipher = Aes256Gcm::new_from_slice(&key)
                .map_err(|e| StorageError::Encryption(format!("Invalid key: {}", e)))?;

            let ciphertext = cipher
                .encrypt(nonce, data)
                .map_err(|e| StorageError::Encryption(format!("Encryption failed: {}", e)))?;

            let mut result = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
            result.extend_from_slice(MAGIC_HEADER);
            result.push(FORMAT_VERSION);
            result.extend_from_slice(&salt);
            result.extend_from_slice(&nonce_bytes);
            result.extend_from_slice(&ciphertext);

            Ok(result)
        } else {
            // No passphrase: marker header plus plaintext
            let mut result = Vec::with_capacity(9 + data.len());
            result.extend_from_slice(RAW_HEADER);
            result.push(FORMAT_VERSION);
            result.extend_from_slice(data);
            Ok(result)
        }
    }

    /// Decrypt data written by [`encrypt`](Self::encrypt)
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        if data.len() < 9 {
            return Err(StorageError::Decryption("File too short".to_string()));
        }

        if &data[0..8] == RAW_HEADER {
            if self.passphrase.is_some() {
                return Err(StorageError::Decryption(
                    "Encrypted store expected, found unencrypted file".to_string(),
                ));
            }
            return Ok(data[9..].to_vec());
        }

        if &data[0..8] != MAGIC_HEADER {
            return Err(StorageError::Decryption("Invalid magic header".to_string()));
        }

        let version = data[8];
        if version != FORMAT_VERSION {
            return Err(StorageError::Decryption(format!(
                "Unsupported version: {}",
                version
            )));
        }

        // 16 is the minimum AEAD tag size
        if data.len() < HEADER_SIZE + 16 {
            return Err(StorageError::Decryption("Truncated file".to_string()));
        }

        let Some(passphrase) = &self.passphrase else {
            return Err(StorageError::Decryption(
                "Passphrase required to decrypt".to_string(),
            ));
        };

        let salt = &data[9..9 + SALT_LEN];
        let nonce_bytes = &data[9 + SALT_LEN..9 + SALT_LEN + NONCE_LEN];
        let nonce = Nonce::from_slice(nonce_bytes);
        let ciphertext = &data[HEADER_SIZE..];

        let key = derive_key(passphrase, salt)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| StorageError::Decryption(format!("Invalid key: {}", e)))?;

        // AEAD tag mismatch = wrong passphrase or corrupted file
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| StorageError::InvalidPassphrase)
    }
}

impl SecureBackend for FileSecureStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load_namespace(namespace)?.get(key).cloned())
    }

    fn put(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        _encrypt: bool,
    ) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load_namespace(namespace)?;
        entries.insert(key.to_string(), value.to_string());
        self.store_namespace(namespace, &entries)
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load_namespace(namespace)?;
        if entries.remove(key).is_some() {
            self.store_namespace(namespace, &entries)?;
        }
        Ok(())
    }

    fn remove_namespace(&self, namespace: &str) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.namespace_path(namespace);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Derive a 256-bit encryption key from a passphrase using Argon2id
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Vec<u8>, StorageError> {
    let params = Params::new(
        19 * 1024, // 19 MiB memory cost
        2,         // 2 iterations
        1,         // 1 thread (for determinism)
        Some(32),  // 32-byte output (256 bits for AES-256)
    )
    .map_err(|e| StorageError::Encryption(format!("Invalid Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = vec![0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| StorageError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get_roundtrip_encrypted() {
        let temp_dir = TempDir::new().unwrap();
        let store =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123")).unwrap();

        store.put("server-a", "username", "alice", true).unwrap();
        store.put("server-a", "password", "s3cret", true).unwrap();

        assert_eq!(
            store.get("server-a", "username").unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(
            store.get("server-a", "password").unwrap(),
            Some("s3cret".to_string())
        );
        assert_eq!(store.get("server-a", "token").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopening_the_store() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store =
                FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123"))
                    .unwrap();
            store.put("server-a", "username", "alice", true).unwrap();
        }

        let reopened =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123")).unwrap();
        assert_eq!(
            reopened.get("server-a", "username").unwrap(),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_namespace_isolation() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecureStore::new(temp_dir.path().to_path_buf(), None).unwrap();

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
    fn test_remove_namespace_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecureStore::new(temp_dir.path().to_path_buf(), None).unwrap();

        store.put("server-a", "username", "alice", true).unwrap();
        let path = store.namespace_path("server-a");
        assert!(path.exists());

        store.remove_namespace("server-a").unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("server-a", "username").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_namespace_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecureStore::new(temp_dir.path().to_path_buf(), None).unwrap();
        store.remove_namespace("never-written").unwrap();
    }

    #[test]
    fn test_wrong_passphrase() {
        let temp_dir = TempDir::new().unwrap();
        let store1 =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("correct_passphrase"))
                .unwrap();
        store1.put("server-a", "username", "alice", true).unwrap();

        let store2 =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("wrong_passphrase")).unwrap();
        let result = store2.get("server-a", "username");
        match result {
            Err(StorageError::InvalidPassphrase) => {}
            other => panic!("Expected InvalidPassphrase, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_ciphertext_fails_aead_check() {
        let temp_dir = TempDir::new().unwrap();
        let store =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123")).unwrap();
        store.put("server-a", "username", "alice", true).unwrap();

        let path = store.namespace_path("server-a");
        let mut raw = fs::read(&path).unwrap();
        let mid = HEADER_SIZE + 2;
        raw[mid] ^= 0xFF;
        fs::write(&path, &raw).unwrap();

        match store.get("server-a", "username") {
            Err(StorageError::InvalidPassphrase) => {}
            other => panic!("Expected InvalidPassphrase for corrupted data, got {:?}", other),
        }
    }

    #[test]
    fn test_unencrypted_mode_uses_raw_marker() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecureStore::new(temp_dir.path().to_path_buf(), None).unwrap();

        store.put("server-a", "username", "alice", true).unwrap();
        assert_eq!(
            store.get("server-a", "username").unwrap(),
            Some("alice".to_string())
        );

        let raw = fs::read(store.namespace_path("server-a")).unwrap();
        assert_eq!(&raw[0..8], RAW_HEADER);
    }

    #[test]
    fn test_encrypted_store_rejects_unencrypted_file() {
        let temp_dir = TempDir::new().unwrap();
        let store1 = FileSecureStore::new(temp_dir.path().to_path_buf(), None).unwrap();
        store1.put("server-a", "username", "alice", true).unwrap();

        let store2 =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123")).unwrap();
        match store2.get("server-a", "username") {
            Err(StorageError::Decryption(msg)) => assert!(msg.contains("unencrypted")),
            other => panic!("Expected Decryption error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_file() {
        let temp_dir = TempDir::new().unwrap();
        let store =
            FileSecureStore::new(temp_dir.path().to_path_buf(), Some("passphrase123")).unwrap();
        store.put("server-a", "username", "alice", true).unwrap();

        let path = store.namespace_path("server-a");
        let raw = fs::read(&path).unwrap();
        fs::write(&path, &raw[0..10]).unwrap();

        match store.get("server-a", "username") {
            Err(StorageError::Decryption(msg)) => {
                assert!(msg.contains("Truncated") || msg.contains("too short"));
            }
            other => panic!("Expected Decryption error for truncated file, got {:?}", other),
        }
    }
}

//! Credential resolution and secure storage
//!
//! Each IDE server definition owns one [`CredentialStore`], which lazily
//! loads its username/password pair from a [`SecureBackend`] namespace and
//! keeps serving cached values if the backend ever fails.

mod file_store;
mod memory_store;
mod secure;
mod store;

pub use file_store::FileSecureStore;
pub use memory_store::MemorySecureStore;
pub use secure::{encode_server_id, SecureBackend, StorageError};
pub use store::CredentialStore;

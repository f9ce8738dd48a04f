//! Per-server credential store
//!
//! Holds one server's username/password pair, lazily initialized from a
//! [`SecureBackend`] and cached in memory for the lifetime of the store. The
//! backend is treated as unreliable: the first storage fault permanently
//! disables it for this store and every later access falls back to whatever
//! is already cached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::secure::{encode_server_id, SecureBackend, StorageError};

const KEY_USERNAME: &str = "username";
const KEY_PASSWORD: &str = "password";

/// In-memory credential state, zeroized when the store is dropped
#[derive(Zeroize, ZeroizeOnDrop)]
struct CredentialState {
    initialized: bool,
    server_id: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Credential store bound to a single server identity
///
/// Safe to share across worker threads: initialization runs exactly once
/// under the state mutex, and the disable latch is a lone atomic flag.
pub struct CredentialStore {
    backend: Arc<dyn SecureBackend>,
    state: Mutex<CredentialState>,
    disabled: AtomicBool,
}

impl CredentialStore {
    /// Create a store for the given server identifier.
    ///
    /// `server_id` may be `None` for a server that has not been saved yet;
    /// the store binds to an identifier on the first [`flush`](Self::flush).
    pub fn new(backend: Arc<dyn SecureBackend>, server_id: Option<String>) -> Self {
        CredentialStore {
            backend,
            // Spelled out field by field: ZeroizeOnDrop implements Drop, so
            // struct-update syntax cannot move out of a default instance
            state: Mutex::new(CredentialState {
                initialized: false,
                server_id,
                username: None,
                password: None,
            }),
            disabled: AtomicBool::new(false),
        }
    }

    /// The currently bound server identifier.
    ///
    /// Pure accessor: does not trigger initialization or touch the backend.
    pub fn server_id(&self) -> Option<String> {
        self.lock_state().server_id.clone()
    }

    /// The cached username, loading it from the backend on first access
    pub fn username(&self) -> Option<String> {
        let mut state = self.lock_state();
        self.initialize_locked(&mut state);
        state.username.clone()
    }

    /// The cached password, loading it from the backend on first access
    pub fn password(&self) -> Option<String> {
        let mut state = self.lock_state();
        self.initialize_locked(&mut state);
        state.password.clone()
    }

    /// Overwrite the in-memory username; nothing is persisted until `flush`
    pub fn set_username(&self, username: Option<String>) {
        let mut state = self.lock_state();
        // Initialize first so a pending lazy load cannot clobber the new value
        self.initialize_locked(&mut state);
        state.username = username;
    }

    /// Overwrite the in-memory password; nothing is persisted until `flush`
    pub fn set_password(&self, password: Option<String>) {
        let mut state = self.lock_state();
        self.initialize_locked(&mut state);
        state.password = password;
    }

    /// Persist the cached credentials under `new_server_id`.
    ///
    /// When the store was bound to a different identifier, that identifier's
    /// entire namespace is removed first so a renamed server leaves no stale
    /// credentials behind. Returns `true` only if the write to the new
    /// namespace succeeded; `false` means the backend is disabled or failed,
    /// which callers must treat as "not persisted", not as an error.
    pub fn flush(&self, new_server_id: &str) -> bool {
        let mut state = self.lock_state();

        if let Some(old_id) = state.server_id.clone() {
            if old_id != new_server_id {
                self.initialize_locked(&mut state);
                if !self.disabled.load(Ordering::Acquire) {
                    if let Err(err) = self.backend.remove_namespace(&encode_server_id(&old_id)) {
                        self.disable_backend(&old_id, &err);
                    }
                }
            }
        }

        state.server_id = Some(new_server_id.to_string());

        if self.disabled.load(Ordering::Acquire) {
            return false;
        }

        let namespace = encode_server_id(new_server_id);
        let entries = [
            (KEY_USERNAME, state.username.clone()),
            (KEY_PASSWORD, state.password.clone()),
        ];
        for (key, value) in entries {
            let result = match &value {
                Some(value) => self.backend.put(&namespace, key, value, true),
                None => self.backend.remove(&namespace, key),
            };
            if let Err(err) = result {
                self.disable_backend(new_server_id, &err);
                return false;
            }
        }
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, CredentialState> {
        // A poisoned lock still holds coherent credential state; recover it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One-time lazy load of both properties. The flag is set before the
    /// reads so a failing backend is never retried on later calls.
    fn initialize_locked(&self, state: &mut CredentialState) {
        if state.initialized {
            return;
        }
        state.initialized = true;
        state.username = self.read_property(state.server_id.as_deref(), KEY_USERNAME);
        state.password = self.read_property(state.server_id.as_deref(), KEY_PASSWORD);
    }

    fn read_property(&self, server_id: Option<&str>, key: &str) -> Option<String> {
        let server_id = server_id?;
        if self.disabled.load(Ordering::Acquire) {
            return None;
        }
        match self.backend.get(&encode_server_id(server_id), key) {
            Ok(value) => value,
            Err(err) => {
                self.disable_backend(server_id, &err);
                None
            }
        }
    }

    /// Latch the store off the backend. Compare-and-set keeps the diagnostic
    /// to a single entry no matter how many threads race on a failing backend.
    fn disable_backend(&self, server_id: &str, err: &StorageError) {
        if self
            .disabled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            error!(
                server_id,
                error = %err,
                "Unexpected error while accessing secure storage for server"
            );
        }
    }
}

//! Type definitions for cloud servers, spaces, and applications

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credentials handed to the operations client for one call.
///
/// Derived from a [`CredentialStore`](crate::core_credentials::CredentialStore)
/// by the IDE layer; the resolver never persists them, and the plaintext is
/// wiped when the value drops.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct CloudCredentials {
    pub username: String,
    pub password: String,
}

impl CloudCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        CloudCredentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// One space discovered from the platform, with its remote identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRecord {
    pub org_name: String,
    pub space_name: String,
    pub space_id: Uuid,
}

/// An org/space name pair as known locally, resolved or not.
///
/// `space` is `None` until resolution succeeds; once present the binding is
/// treated as immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceBinding {
    pub org_name: String,
    pub space_name: String,
    pub space: Option<SpaceRecord>,
}

impl SpaceBinding {
    /// An unresolved binding carrying only the locally-configured names
    pub fn new(org_name: impl Into<String>, space_name: impl Into<String>) -> Self {
        SpaceBinding {
            org_name: org_name.into(),
            space_name: space_name.into(),
            space: None,
        }
    }

    /// A fully resolved binding built from a discovered record
    pub fn resolved(record: SpaceRecord) -> Self {
        SpaceBinding {
            org_name: record.org_name.clone(),
            space_name: record.space_name.clone(),
            space: Some(record),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.space.is_some()
    }
}

/// A deployed application as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    pub space_id: Option<Uuid>,
    pub uris: Vec<String>,
}

/// Local configuration of one cloud server definition.
///
/// `space == None` means the server does not use org/space partitioning at
/// all, which makes space resolution inapplicable rather than an error.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    pub url: String,
    pub space: Option<SpaceBinding>,
}

impl ServerHandle {
    pub fn new(url: impl Into<String>, space: Option<SpaceBinding>) -> Self {
        ServerHandle {
            url: url.into(),
            space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_credentials_zeroize_on_drop() {
        // Ensure the secret-wiping impls stay in place
        fn assert_zeroizing<T: Zeroize + ZeroizeOnDrop>() {}
        assert_zeroizing::<CloudCredentials>();
    }

    #[test]
    fn test_new_binding_is_unresolved() {
        let binding = SpaceBinding::new("org1", "dev");
        assert!(!binding.is_resolved());
        assert_eq!(binding.org_name, "org1");
        assert_eq!(binding.space_name, "dev");
    }

    #[test]
    fn test_resolved_binding_carries_names_from_record() {
        let record = SpaceRecord {
            org_name: "org1".to_string(),
            space_name: "dev".to_string(),
            space_id: Uuid::new_v4(),
        };
        let binding = SpaceBinding::resolved(record.clone());
        assert!(binding.is_resolved());
        assert_eq!(binding.org_name, "org1");
        assert_eq!(binding.space, Some(record));
    }

    #[test]
    fn test_space_record_serde() {
        let record = SpaceRecord {
            org_name: "org1".to_string(),
            space_name: "dev".to_string(),
            space_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SpaceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}

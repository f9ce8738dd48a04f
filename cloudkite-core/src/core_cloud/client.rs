//! Operations client abstraction
//!
//! The platform's REST client library is external; the resolver only needs
//! authenticate/list operations on a client bound to one URL and one set of
//! credentials.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{AppRecord, CloudCredentials, SpaceRecord};

/// Errors surfaced by an operations client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failure reported by the platform itself, including rejected
    /// authentication. `validation` carries the platform's friendlier
    /// validation text when the response included one.
    #[error("{message}")]
    Cloud {
        message: String,
        validation: Option<String>,
    },

    /// Opaque runtime fault from the client library. Transport and response
    /// parsing failures arrive here with an `std::io::Error` in the chain.
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

/// Client for one (url, credentials) pair
#[async_trait]
pub trait OperationsClient: Send + Sync {
    /// Perform the authentication handshake
    async fn authenticate(&self) -> Result<(), ClientError>;

    /// List the spaces visible to the authenticated account
    async fn list_spaces(&self) -> Result<Vec<SpaceRecord>, ClientError>;

    /// List applications. A client that was not bound to a specific space
    /// reports applications across all orgs and spaces of the account.
    async fn list_applications(&self) -> Result<Vec<AppRecord>, ClientError>;
}

/// Builds an operations client per resolution call
pub trait ClientFactory: Send + Sync {
    fn create_client(
        &self,
        url: &str,
        credentials: &CloudCredentials,
    ) -> Arc<dyn OperationsClient>;
}

//! Cloud space resolution workflow
//!
//! Given a server's URL, credentials, and a possibly partial org/space
//! binding, authenticate against the platform, discover the live topology,
//! and reconcile the binding against it. Every operation builds its own
//! client and catalog; nothing is shared between concurrent calls.

use std::sync::Arc;

use tracing::error;

use super::catalog::OrgSpaceCatalog;
use super::client::{ClientError, ClientFactory};
use super::error::ResolveError;
use super::login::{LoginHandler, LoginPolicy};
use super::progress::ProgressReporter;
use super::types::{AppRecord, CloudCredentials, ServerHandle, SpaceBinding};

/// Resolves a server's configured cloud space against the live platform
pub struct SpaceResolver {
    server: ServerHandle,
    credentials: CloudCredentials,
    factory: Arc<dyn ClientFactory>,
    login_policy: LoginPolicy,
}

impl SpaceResolver {
    pub fn new(
        server: ServerHandle,
        credentials: CloudCredentials,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        SpaceResolver {
            server,
            credentials,
            factory,
            login_policy: LoginPolicy::default(),
        }
    }

    /// Override the default login retry budget
    pub fn with_login_policy(mut self, policy: LoginPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    /// Resolve the server's configured org/space pair.
    ///
    /// Returns `Ok(None)` when the server does not use org/space partitioning
    /// (resolution is inapplicable, not an error). A binding that already
    /// carries its remote record is returned unchanged without any network
    /// access. Otherwise the platform is queried; a missing space is a hard
    /// failure because the server has declared it expects one.
    pub async fn resolve_space(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<SpaceBinding>, ResolveError> {
        let Some(binding) = &self.server.space else {
            return Ok(None);
        };
        if binding.is_resolved() {
            return Ok(Some(binding.clone()));
        }

        self.discover_and_match(binding, progress)
            .await
            .map_err(ResolveError::normalized)
    }

    /// Discover the full org/space topology visible to these credentials.
    ///
    /// `Ok(None)` means the platform reported no spaces at all.
    pub async fn orgs_and_spaces(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<OrgSpaceCatalog>, ResolveError> {
        self.discover(progress).await.map_err(ResolveError::normalized)
    }

    /// List applications across all orgs and spaces of the account.
    ///
    /// The client is created without a space binding, so the listing is not
    /// scoped to any single space.
    pub async fn list_all_applications(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<AppRecord>, ResolveError> {
        self.fetch_applications(progress)
            .await
            .map_err(ResolveError::normalized)
    }

    async fn discover_and_match(
        &self,
        binding: &SpaceBinding,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<SpaceBinding>, ResolveError> {
        let catalog = self.discover(progress).await?;
        let record = catalog
            .as_ref()
            .and_then(|catalog| catalog.find_space(&binding.org_name, &binding.space_name));

        match record {
            Some(record) => Ok(Some(SpaceBinding::resolved(record.clone()))),
            None => Err(ResolveError::SpaceNotFound {
                url: self.server.url.clone(),
            }),
        }
    }

    async fn discover(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<OrgSpaceCatalog>, ResolveError> {
        let client = self.factory.create_client(&self.server.url, &self.credentials);
        LoginHandler::new(client.as_ref(), &self.server.url)
            .login(&self.login_policy, progress)
            .await?;

        progress.begin_phase("Resolving list of cloud organizations and spaces");
        let spaces = client.list_spaces().await.map_err(reclassify_io_fault)?;
        Ok(OrgSpaceCatalog::from_records(spaces))
    }

    async fn fetch_applications(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<AppRecord>, ResolveError> {
        let client = self.factory.create_client(&self.server.url, &self.credentials);
        LoginHandler::new(client.as_ref(), &self.server.url)
            .login(&self.login_policy, progress)
            .await?;

        progress.begin_phase("Retrieving list of applications");
        client
            .list_applications()
            .await
            .map_err(reclassify_io_fault)
    }
}

/// Turn a listing failure into the resolution layer's error.
///
/// The client library wraps response-parsing failures in an opaque runtime
/// fault with an I/O error in the chain; those are communication problems
/// from the user's perspective and collapse to the canonical message.
/// Anything else is re-raised verbatim.
fn reclassify_io_fault(err: ClientError) -> ResolveError {
    match err {
        ClientError::Runtime(err) => {
            if let Some(cause) = io_cause(&err) {
                error!(error = %cause, "Parse error from server response");
                ResolveError::Communication
            } else {
                ResolveError::Internal(err)
            }
        }
        other => other.into(),
    }
}

/// First `std::io::Error` anywhere in the fault's cause chain
fn io_cause(err: &anyhow::Error) -> Option<&std::io::Error> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<std::io::Error>())
}

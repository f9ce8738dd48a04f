//! Cloud space resolution
//!
//! Orchestrates authentication and org/space discovery against the remote
//! platform and reconciles the result with locally-configured server
//! properties. The platform client itself is external; see
//! [`client::OperationsClient`].

pub mod catalog;
pub mod client;
pub mod error;
pub mod login;
pub mod progress;
pub mod resolver;
pub mod types;

pub use catalog::OrgSpaceCatalog;
pub use client::{ClientError, ClientFactory, OperationsClient};
pub use error::ResolveError;
pub use login::{LoginHandler, LoginPolicy};
pub use progress::{NoProgress, ProgressReporter};
pub use resolver::SpaceResolver;
pub use types::{AppRecord, CloudCredentials, ServerHandle, SpaceBinding, SpaceRecord};

//! Authentication handshake with bounded retry

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::client::OperationsClient;
use super::error::ResolveError;
use super::progress::ProgressReporter;

/// Retry budget for the login handshake.
///
/// Total blocking time is bounded by `attempts * retry_interval`; callers
/// that need a tighter bound supply their own policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPolicy {
    /// Maximum authentication attempts
    pub attempts: u32,

    /// Pause between attempts
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        LoginPolicy {
            attempts: 5,
            retry_interval: Duration::from_millis(5000),
        }
    }
}

/// Drives the authentication handshake against one client
pub struct LoginHandler<'a> {
    client: &'a dyn OperationsClient,
    url: &'a str,
}

impl<'a> LoginHandler<'a> {
    pub fn new(client: &'a dyn OperationsClient, url: &'a str) -> Self {
        LoginHandler { client, url }
    }

    /// Authenticate, retrying failed attempts within the policy's budget.
    ///
    /// Cancellation is cooperative: the progress reporter is polled before
    /// each attempt, not during one.
    pub async fn login(
        &self,
        policy: &LoginPolicy,
        progress: &dyn ProgressReporter,
    ) -> Result<(), ResolveError> {
        progress.begin_phase("Logging in to server");

        let attempts = policy.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            if progress.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            match self.client.authenticate().await {
                Ok(()) => {
                    debug!(url = self.url, attempt, "authenticated");
                    return Ok(());
                }
                Err(err) if attempt >= attempts => {
                    return Err(ResolveError::from(err));
                }
                Err(err) => {
                    warn!(url = self.url, attempt, error = %err, "authentication attempt failed, retrying");
                }
            }
            sleep(policy.retry_interval).await;
        }
    }
}

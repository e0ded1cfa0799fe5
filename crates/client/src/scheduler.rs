//! Proactive access-token renewal.
//!
//! A background task renews the access token on a fixed period (four minutes
//! by default, comfortably inside a five-minute token lifetime) so that
//! requests rarely see a 401 at all. The reactive refresh-on-401 path in the
//! client remains the fallback; this task is an optimization, not a
//! correctness requirement.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::error::ClientError;

/// Handle for the background refresh task.
///
/// Dropping the scheduler stops the task.
#[derive(Debug)]
pub struct RefreshScheduler {
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Spawn a task that refreshes the token every `period`.
    ///
    /// The first renewal happens one full period after start, not
    /// immediately; the token that produced the session is still fresh.
    /// The task exits on its own when the session ends.
    #[must_use]
    #[instrument(skip(client))]
    pub fn start(client: ApiClient, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick of an interval fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match client.refresh_access_token().await {
                    Ok(()) => debug!("scheduled token refresh succeeded"),
                    Err(ClientError::SessionExpired) => {
                        warn!("session ended, stopping scheduled refresh");
                        break;
                    }
                    Err(err) => {
                        // Refresh failures other than an expired session are
                        // transient (e.g. network); keep the schedule going.
                        warn!(error = %err, "scheduled token refresh failed");
                    }
                }
            }
        });
        Self { handle }
    }

    /// Stop the background task.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

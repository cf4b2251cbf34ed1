//! Coordinated shutdown for the server's background tasks.

use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long the binary waits for tasks to drain before giving up.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the cancellation token every background task watches.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Create a handle with a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token for a task to watch.
    #[must_use]
    pub fn signal(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fire the token. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fire the token and wait for the given tasks to finish, up to a
    /// timeout. Tasks still running afterwards are left to die with the
    /// process.
    pub async fn drain(&self, tasks: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        self.trigger();
        let deadline = timeout.unwrap_or(DRAIN_TIMEOUT);
        let task_count = tasks.len();
        info!(task_count, "waiting for background tasks to stop");
        match tokio::time::timeout(deadline, join_all(tasks)).await {
            Ok(results) => {
                let panicked = results.iter().filter(|result| result.is_err()).count();
                if panicked > 0 {
                    warn!(panicked, "some background tasks did not stop cleanly");
                } else {
                    info!("all background tasks stopped");
                }
            }
            Err(_) => {
                warn!(
                    timeout_secs = deadline.as_secs(),
                    "shutdown timed out with tasks still running"
                );
            }
        }
    }
}

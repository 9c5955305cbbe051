//! Graceful shutdown management

use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Manages graceful shutdown for long-running processes
///
/// Monitors receive child tokens, so cancelling the manager stops every
/// poller started from it while a single monitor can still be stopped alone.
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = signal::ctrl_c() => {
                    if result.is_ok() {
                        info!("");
                        info!("Received shutdown signal (Ctrl+C)");
                        info!("Shutting down gracefully...");
                        token.cancel();
                    }
                }
                _ = token.cancelled() => {}
            }
        });
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Trigger shutdown
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Token cancelled together with this manager
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Wait until shutdown is triggered
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Sleep for a duration, but wake early if shutdown is triggered
    ///
    /// Returns `false` when woken by shutdown.
    pub async fn interruptible_sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.token.cancelled() => false,
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

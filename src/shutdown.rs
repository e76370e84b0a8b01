use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Turns Ctrl-C into cooperative cancellation of running operations.
///
/// Commands that are already running are left to finish; the orchestrator
/// stops before its next external call.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token on the first SIGINT. Must be called inside a tokio runtime.
    pub fn install_signal_handler(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        info!("Interrupt received, cancelling after the current command");
                        token.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                },
                _ = token.cancelled() => {}
            }
        });
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

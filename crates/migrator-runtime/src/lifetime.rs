use tokio_util::sync::CancellationToken;

/// Stop signal from a run-to-completion job to its host process.
///
/// The runner calls [`HostLifetime::stop_application`] once it has finished, whether
/// the run succeeded or failed; the host waits on [`HostLifetime::stopped`] and then
/// releases its resources.
#[derive(Debug, Clone, Default)]
pub struct HostLifetime {
    stop: CancellationToken,
}

impl HostLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an orderly stop. Calling it more than once has no further effect.
    pub fn stop_application(&self) {
        if !self.stop.is_cancelled() {
            tracing::debug!("Host stop requested");
        }
        self.stop.cancel();
    }

    /// Check if a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Wait until a stop is requested.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }
}

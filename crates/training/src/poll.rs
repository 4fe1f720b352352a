//! Waiting for a kernel run to finish.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{KernelStatus, TrainingError};

/// Anything that can report a kernel's run status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn status(&self, kernel_ref: &str) -> Result<KernelStatus, TrainingError>;
}

/// Polling cadence for [`wait_for_completion`].
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// Give up after this long. `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_wait: None,
        }
    }
}

/// Poll `source` until the kernel reaches a terminal status.
///
/// The status is checked immediately, then once per `interval`. Returns the
/// terminal status (which may be `error`), [`TrainingError::Timeout`] once
/// `max_wait` has passed, or [`TrainingError::Cancelled`] when `cancel`
/// fires. Status errors end the wait.
pub async fn wait_for_completion<S: StatusSource + ?Sized>(
    source: &S,
    kernel_ref: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<KernelStatus, TrainingError> {
    let start = Instant::now();
    let deadline = config.max_wait.map(|max| start + max);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(TrainingError::Cancelled(kernel_ref.to_string())),
            result = source.status(kernel_ref) => result?,
        };

        tracing::debug!(kernel = %kernel_ref, attempt, status = %status.status, "Polled kernel status");
        if status.is_terminal() {
            tracing::info!(
                kernel = %kernel_ref,
                status = %status.status,
                elapsed_secs = start.elapsed().as_secs(),
                "Kernel run finished",
            );
            return Ok(status);
        }

        let mut wake = Instant::now() + config.interval;
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(TrainingError::Timeout {
                    slug: kernel_ref.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                });
            }
            wake = wake.min(deadline);
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(TrainingError::Cancelled(kernel_ref.to_string())),
            _ = tokio::time::sleep_until(wake) => {}
        }
    }
}

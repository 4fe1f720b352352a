//! Follows a pushed training kernel until its run ends.

use std::sync::Arc;

use hive_training::{wait_for_completion, KaggleApi, PollConfig, TrainingError};
use tokio_util::sync::CancellationToken;

/// Poll `kernel` and log how its run ended.
pub async fn run(api: Arc<KaggleApi>, kernel: String, poll: PollConfig, cancel: CancellationToken) {
    tracing::info!(
        kernel = %kernel,
        interval_secs = poll.interval.as_secs(),
        max_wait_secs = poll.max_wait.map(|d| d.as_secs()),
        "Watching training kernel",
    );

    match wait_for_completion(api.as_ref(), &kernel, &poll, &cancel).await {
        Ok(status) if status.is_complete() => {
            tracing::info!(kernel = %kernel, "Training kernel completed");
        }
        Ok(status) => {
            tracing::warn!(
                kernel = %kernel,
                status = %status.status,
                failure = status.failure_message.as_deref().unwrap_or_default(),
                "Training kernel failed",
            );
        }
        Err(TrainingError::Cancelled(_)) => {
            tracing::info!(kernel = %kernel, "Stopped watching training kernel");
        }
        Err(e) => {
            tracing::error!(kernel = %kernel, error = %e, "Training kernel watch aborted");
        }
    }
}

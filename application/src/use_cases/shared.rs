//! Shared utilities for use cases.
//!
//! Cancellation checks and cancellable waits used by the panel pipeline.

use crate::use_cases::run_panel::RunPanelError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunPanelError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunPanelError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunPanelError::Cancelled);
    }
    Ok(())
}

/// Run `future` to completion unless the token fires first.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Result<F::Output, RunPanelError> {
    check_cancelled(token)?;
    if let Some(token) = token {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RunPanelError::Cancelled),
            output = future => Ok(output),
        }
    } else {
        Ok(future.await)
    }
}

/// Sleep for `wait`, aborting early on cancellation.
pub(crate) async fn cancellable_sleep(
    token: &Option<CancellationToken>,
    wait: Duration,
) -> Result<(), RunPanelError> {
    if wait.is_zero() {
        return check_cancelled(token);
    }
    cancellable(token, tokio::time::sleep(wait)).await
}

//! Non-propagating execution for cleanup paths

use launchpad_errors::Error;
use std::future::Future;

/// Run a cleanup operation whose failure must never replace a build's real
/// outcome.
///
/// The suppression is deliberate and centralized here: retention sweeps,
/// marker releases, and post-deploy removals go through this wrapper so an
/// empty `catch` never hides in pipeline code.
pub async fn best_effort<F>(operation: &str, fut: F)
where
    F: Future<Output = Result<(), Error>>,
{
    if let Err(err) = fut.await {
        tracing::debug!(operation, error = %err, "cleanup failure suppressed");
    }
}

use crate::config::RetryPolicy;
use crate::error::SignalingError;
use std::future::Future;
use tracing::warn;

/// Runs `op` until it succeeds, fails with a non-transient error, or the policy
/// runs out of attempts. Backoff doubles between attempts up to `max_backoff`.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, SignalingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SignalingError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.initial_backoff();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    what, attempt, max_attempts, e, backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(policy.max_backoff());
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

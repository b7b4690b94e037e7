use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use medichat_core::ProviderError;

/// Retry a provider call with the given backoff delays.
///
/// Makes `delays.len() + 1` attempts at most, sleeping `delays[i]` after
/// the i-th failure. Only retryable errors (connectivity, transient
/// request failures) are retried; a permission rejection or malformed
/// response is returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    delays: &[Duration],
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    let attempts = delays.len() + 1;
    for (i, delay) in delays.iter().enumerate() {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() => {
                warn!(
                    "request failed (attempt {}/{attempts}): {e}. Retrying after {:?}...",
                    i + 1,
                    delay
                );
                sleep(*delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    operation().await
}

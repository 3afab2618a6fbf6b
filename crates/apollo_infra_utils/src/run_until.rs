use std::future::Future;
use std::time::Duration;

/// Polls `condition` every `interval` until it returns `Some(value)` or `max_attempts` have been
/// made, whichever comes first. Returns the produced value, or `None` on exhaustion.
pub async fn run_until<T, Fut, F>(
    interval: Duration,
    max_attempts: usize,
    mut condition: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..max_attempts {
        if let Some(value) = condition().await {
            return Some(value);
        }
        if attempt + 1 < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    None
}

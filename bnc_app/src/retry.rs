use std::future::Future;

use bnc_http::Outcome;
use tracing::warn;

/// Run `op` until it stops warning, sleeping for each warning's hint in between
///
/// At most `max_attempts` calls are made (at least one). Success and errors are
/// returned immediately; when attempts run out the last warning is returned.
pub async fn with_retries<T, F, Fut>(max_attempts: u32, mut op: F) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Outcome::Warning(warning) if attempt < max_attempts => {
                warn!(attempt, max_attempts, kind = ?warning.kind, retry_after = ?warning.retry_after, "{}", warning.message);
                tokio::time::sleep(warning.retry_after).await;
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

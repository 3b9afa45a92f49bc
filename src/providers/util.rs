use crate::core::source::{SourceError, SourceKind};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("countryfx/", env!("CARGO_PKG_VERSION"));
const RETRY_DELAY_MS: u64 = 500;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error of the last attempt
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay_ms: u64) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// GETs `url` and returns the body of a successful response.
pub(crate) async fn fetch_body(
    origin: SourceKind,
    url: &str,
    timeout: Duration,
    retries: usize,
) -> Result<String, SourceError> {
    let to_source_error = |e: reqwest::Error| SourceError::from_reqwest(origin, timeout, e);

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(to_source_error)?;

    debug!("Requesting {} data from {}", origin, url);
    let response = with_retry(|| async { client.get(url).send().await }, retries, RETRY_DELAY_MS)
        .await
        .map_err(to_source_error)?;

    if !response.status().is_success() {
        return Err(SourceError::Transport {
            origin,
            detail: format!("HTTP error: {}", response.status()),
        });
    }

    response.text().await.map_err(to_source_error)
}

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async request on transport failures (connect errors, timeouts).
///
/// Any other error, including a response decoding failure, is returned
/// immediately. Total attempts are `1 + retries`.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                let transient = err.is_connect() || err.is_timeout();
                if !transient || attempt > retries {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retries_connection_failures() {
        // Nothing listens on port 1
        let client = reqwest::Client::new();
        let attempts = AtomicUsize::new(0);

        let result = with_retry(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                client.get("http://127.0.0.1:1/").send()
            },
            2,
            1,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_successful_request_is_not_retried() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = mock_server.uri();
        let response = with_retry(|| client.get(&url).send(), 3, 1).await.unwrap();
        assert!(response.status().is_success());
    }
}

//! Page fetching with bounded, fixed-delay retry.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use timeline_shared::{Result, TimelineError};

/// User-Agent string for source page requests.
const USER_AGENT: &str = concat!("TimelineBuilder/", env!("CARGO_PKG_VERSION"));

/// Something that can turn a URL into a page body.
///
/// The production implementation is [`HttpFetcher`]; tests substitute
/// counting or failing fakes.
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` once and return the body as text.
    ///
    /// Non-success statuses surface as [`TimelineError::HttpStatus`] so the
    /// caller can classify them with [`TimelineError::is_transient`].
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Plain `reqwest` GET fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| TimelineError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TimelineError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TimelineError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TimelineError::Network(format!("{url}: body read failed: {e}")))
    }
}

/// Fetch `url`, retrying transient failures after a fixed `delay`.
///
/// At most `max_attempts` requests are made. Exhausting them is reported as
/// a [`TimelineError::Network`] error naming the last failure; permanent
/// failures (e.g. 404) are returned straight away without retrying.
pub async fn fetch_with_retry<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    max_attempts: u32,
    delay: Duration,
) -> Result<String> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                return Err(TimelineError::Network(format!(
                    "giving up on {url} after {max_attempts} attempts: {e}"
                )));
            }
            Err(e) => {
                warn!(
                    %url,
                    attempt,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

//! Page fetching with a politeness throttle.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the crawler can be driven by any
//! page source:
//! - [`PageFetcher`]: Core trait, URL in, HTML out
//! - [`HttpFetcher`]: `reqwest` client with the `over18` cookie PTT requires
//! - [`ThrottledFetcher`]: Decorator that spaces request starts apart
//!
//! # Throttling
//!
//! Every request start waits until at least `delay + random_jitter` has
//! passed since the previous start. The gate is shared by all in-flight
//! requests, so widening the crawl concurrency never raises the request rate
//! against the site. Failed requests are not retried.

use crate::config::CrawlerConfig;
use crate::error::{FetchFailure, Result as CrawlResult};
use rand::{Rng, rng};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};

/// Trait for async page retrieval.
pub trait PageFetcher {
    /// Fetch `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure>;
}

/// HTTP implementation of [`PageFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and user agent.
    ///
    /// The `over18=1` cookie is sent with every request; without it
    /// age-gated boards answer with a confirmation page instead of content.
    ///
    /// # Errors
    ///
    /// [`CrawlError::Client`](crate::error::CrawlError::Client) when the
    /// client cannot be built, e.g. for a user agent that is not a valid
    /// header value.
    pub fn new(config: &CrawlerConfig) -> CrawlResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("over18=1"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let t0 = std::time::Instant::now();
        let transport = |source| FetchFailure::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "Non-OK response");
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that enforces a minimum interval between request starts of any
/// [`PageFetcher`] implementation.
///
/// ```text
/// next_start >= previous_start + delay + random_jitter(0..=jitter)
/// ```
pub struct ThrottledFetcher<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Minimum spacing between two request starts.
    delay: Duration,
    /// Upper bound of the random extra spacing.
    jitter: Duration,
    /// Start time of the most recent request; the lock is the gate.
    last_start: Mutex<Option<Instant>>,
}

impl<T> ThrottledFetcher<T>
where
    T: PageFetcher,
{
    /// Create a new throttle around an existing [`PageFetcher`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let http = HttpFetcher::new(&config)?;
    /// let fetcher = ThrottledFetcher::new(http, Duration::from_millis(500), Duration::from_millis(100));
    /// ```
    pub fn new(inner: T, delay: Duration, jitter: Duration) -> Self {
        Self {
            inner,
            delay,
            jitter,
            last_start: Mutex::new(None),
        }
    }

    /// Wait for this request's turn and record its start.
    async fn wait_turn(&self) {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let jitter_ms: u64 = if self.jitter.is_zero() {
                0
            } else {
                rng().random_range(0..=self.jitter.as_millis() as u64)
            };
            let next = previous + self.delay + Duration::from_millis(jitter_ms);
            sleep_until(next).await;
        }
        *last_start = Some(Instant::now());
    }
}

impl<T> fmt::Debug for ThrottledFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledFetcher")
            .field("delay", &self.delay)
            .field("jitter", &self.jitter)
            .finish()
    }
}

impl<T> PageFetcher for ThrottledFetcher<T>
where
    T: PageFetcher,
{
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        self.wait_turn().await;
        self.inner.fetch(url).await
    }
}

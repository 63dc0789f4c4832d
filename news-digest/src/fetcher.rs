use crate::types::{DigestError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Shared HTTP client for every source adapter.
///
/// Requests to the same host are spaced by `min_request_interval_ms`, and
/// transient failures (network errors, 5xx, 429) are retried with
/// exponential backoff up to `max_retries` times.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rate_limiter: RwLock<HashMap<String, Instant>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: RwLock::new(HashMap::new()),
        })
    }

    /// Fetch a URL and return the body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get_with_retries(url).await?;

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_body_size_mb {
                return Err(DigestError::Parse(format!(
                    "Response from {} too large: {}MB",
                    url, size_mb
                )));
            }
        }

        let content = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, content.len());
        Ok(content)
    }

    /// Fetch a URL and decode the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let content = self.fetch_text(url).await?;
        let value = serde_json::from_str(&content)?;
        Ok(value)
    }

    async fn get_with_retries(&self, url: &str) -> Result<Response> {
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: retry_delay,
            initial_interval: retry_delay,
            max_interval: retry_delay * 32,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;
        loop {
            self.apply_rate_limit(url).await?;

            let error = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error = DigestError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    };
                    if !is_transient(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => DigestError::Http(e),
            };

            if attempt >= self.config.max_retries {
                warn!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    attempt + 1,
                    error
                );
                return Err(error);
            }
            attempt += 1;

            match backoff.next_backoff() {
                Some(delay) => {
                    info!("Attempt {} failed for {}, retrying in {:?}", attempt, url, delay);
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            }
        }
    }

    /// Wait until the host of `url` has been left alone for the configured
    /// interval, then record this request.
    async fn apply_rate_limit(&self, url: &str) -> Result<()> {
        let parsed_url = Url::parse(url)?;
        let host = match parsed_url.port() {
            Some(port) => format!("{}:{}", parsed_url.host_str().unwrap_or(""), port),
            None => parsed_url.host_str().unwrap_or("").to_string(),
        };
        let min_interval = Duration::from_millis(self.config.min_request_interval_ms);

        let mut rate_limiter = self.rate_limiter.write().await;
        if let Some(last_request) = rate_limiter.get(&host) {
            let elapsed = last_request.elapsed();
            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                debug!("Rate limiting {}: waiting {:?}", host, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        rate_limiter.insert(host, Instant::now());

        Ok(())
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/*!
 * JSON retrieval with exponential backoff.
 *
 * A `BackoffFetcher` issues GET requests through a `JsonSource` and retries
 * failed attempts after `initial_delay * 2^attempt` plus up to one second of
 * random jitter. Sleeping goes through the `Sleeper` trait so the schedule
 * can be observed without waiting in tests.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::FetchError;

/// Anything that can turn a URL into a decoded JSON document
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Perform one GET request; every error is treated as retryable
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Suspends the current task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// JSON source backed by a single reused reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    client: Client,
}

impl ReqwestSource {
    /// Wrap an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the given request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cijsubs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl JsonSource for ReqwestSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let response = response.error_for_status()?;

        response.json::<Value>()
            .await
            .with_context(|| format!("Failed to decode JSON from {}", url))
    }
}

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_retries: u32,
    /// Delay before the second attempt, before jitter
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self { max_retries, initial_delay }
    }

    /// Number of GET requests made before giving up; never zero
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay after the failed zero-based `attempt`, with a fixed jitter in seconds
    pub fn delay_with_jitter(&self, attempt: u32, jitter_secs: f64) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * 2f64.powi(exponent) + jitter_secs;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Delay after the failed zero-based `attempt`, with random jitter in [0, 1) seconds
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = rand::rng().random_range(0.0..1.0);
        self.delay_with_jitter(attempt, jitter)
    }
}

/// Fetches JSON documents, retrying transient failures
#[derive(Debug)]
pub struct BackoffFetcher<S, Z> {
    source: S,
    sleeper: Z,
    policy: RetryPolicy,
}

impl<S: JsonSource, Z: Sleeper> BackoffFetcher<S, Z> {
    pub fn new(source: S, sleeper: Z, policy: RetryPolicy) -> Self {
        Self { source, sleeper, policy }
    }

    /// Fetch `url`, retrying until the policy is exhausted
    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            match self.source.get_json(url).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Fetched {} after {} attempts", url, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    let cause = format!("{:#}", e);
                    if attempt + 1 >= attempts {
                        return Err(FetchError { attempts, cause });
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!("Attempt {} failed. Retrying in {:.2} seconds...", attempt + 1, delay.as_secs_f64());
                    debug!("Attempt {} on {} failed with: {}", attempt + 1, url, cause);
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

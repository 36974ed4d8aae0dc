use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;

use super::ScraperConfig;
use crate::error::ScrapeError;

/// One HTTP GET of a page body. Any error is a transport failure.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, String>;
}

pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP error: {}", status));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

/// Cancels backoff sleeps when the sender flips to `true`.
///
/// A dropped sender counts as "never interrupted".
#[derive(Clone)]
pub struct Interrupt(watch::Receiver<bool>);

impl Interrupt {
    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self(receiver)
    }

    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    /// Resolves once the interrupt has been raised.
    pub async fn fired(&self) {
        let mut receiver = self.0.clone();
        if receiver.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Fetches a page with bounded retries and exponential backoff.
#[derive(Clone)]
pub struct FetchClient {
    source: Arc<dyn PageSource>,
    retry_max: u32,
    retry_delay: Duration,
    interrupt: Interrupt,
}

impl FetchClient {
    pub fn new(source: Arc<dyn PageSource>, config: &ScraperConfig, interrupt: Interrupt) -> Self {
        Self {
            source,
            retry_max: config.retry_max.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            interrupt,
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry_max {
            match self.source.get(url).await {
                Ok(body) => {
                    tracing::info!("Fetched {} on attempt {}/{}", url, attempt, self.retry_max);
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!("Attempt {}/{} for {} failed: {}", attempt, self.retry_max, url, e);
                    last_error = e;
                }
            }

            if attempt == self.retry_max {
                break;
            }

            let delay = self.backoff_delay(attempt);
            tracing::warn!("Retry {}/{} for {}. Waiting {:?}", attempt + 1, self.retry_max, url, delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.interrupt.fired() => {
                    tracing::warn!("Backoff for {} interrupted, giving up", url);
                    return Err(ScrapeError::Interrupted);
                }
            }
        }

        Err(ScrapeError::Transport {
            attempts: self.retry_max,
            reason: last_error,
        })
    }
}

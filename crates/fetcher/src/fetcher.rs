use std::sync::Arc;
use std::time::Duration;

use articlecrawler_core::error::PipelineError;
use articlecrawler_core::types::{FetchJob, FetchResult};
use articlecrawler_limiter::DomainLimiter;
use reqwest::Client;
use tracing::{debug, warn};

/// How often to re-poll the domain limiter while waiting for a token.
const RATE_LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Per-request timeout, independent of the overall retry loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Response bodies larger than this are treated as a fetch failure rather
/// than read unbounded into memory.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Ceiling on the exponential backoff sleep between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_backoff: Duration,
    pub max_retries: u32,
}

/// HTTP GET with per-domain rate limiting and bounded exponential backoff.
pub struct Fetcher {
    client: Client,
    limiter: Arc<DomainLimiter>,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(limiter: Arc<DomainLimiter>, config: FetcherConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            limiter,
            config,
        })
    }

    /// Run one job through the rate limiter and the retry loop to a terminal
    /// outcome. Returns `None` if the shutdown signal fires before a terminal
    /// outcome is reached — the job is abandoned silently, per spec.
    pub async fn fetch(
        &self,
        job: FetchJob,
        shutdown: &mut tokio::sync::broadcast::Receiver<()>,
    ) -> Option<FetchResult> {
        let host = DomainLimiter::host_key(job.url.as_str());

        loop {
            if self.limiter.allow(&host) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(RATE_LIMIT_POLL_INTERVAL) => {}
                _ = shutdown.recv() => return None,
            }
        }

        let max_retries = self.config.max_retries.max(1);
        let mut backoff = self.config.base_backoff;
        let mut last_error: Option<PipelineError> = None;

        for attempt in 1..=max_retries {
            match self.attempt(&job).await {
                Ok(result) => return Some(result),
                Err(e) => {
                    warn!(url = %job.url, attempt, max_retries, error = %e, "fetch attempt failed");
                    last_error = Some(e);
                    // Every failed attempt, including the last, is followed by a
                    // backoff sleep (matches the original's unconditional
                    // post-attempt sleep; see SPEC_FULL.md S3).
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = shutdown.recv() => return None,
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    if attempt == max_retries {
                        break;
                    }
                }
            }
        }

        Some(FetchResult::err(
            job.url,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| PipelineError::FetchExhausted.to_string()),
        ))
    }

    /// A single GET attempt. 4xx and 5xx are both treated as retryable
    /// failures here, matching current behavior (see DESIGN.md).
    async fn attempt(&self, job: &FetchJob) -> Result<FetchResult, PipelineError> {
        debug!(url = %job.url, "fetching");
        let resp = self.client.get(job.url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::Timeout(REQUEST_TIMEOUT.as_secs())
            } else {
                PipelineError::Network(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        if !(200..400).contains(&status) {
            return Err(PipelineError::Network(format!("http status {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        if body.len() > MAX_BODY_BYTES {
            return Err(PipelineError::BodyTooLarge {
                size: body.len(),
                max: MAX_BODY_BYTES,
            });
        }

        Ok(FetchResult::ok(job.url.clone(), body.to_vec(), status))
    }
}

//! HTTP client that posts chunks to the bulk-ingest endpoint with retry.

use std::time::Duration;

use crate::error::SubmitError;
use crate::reader::Record;
use crate::retry::RetryPolicy;

/// Path of the bulk-ingest endpoint, relative to the service base URL.
pub const BULK_PATH: &str = "/items/bulk/";

/// Submits chunks of records to the ingest service.
///
/// Cheap to clone: the inner `reqwest::Client` shares one connection pool.
#[derive(Debug, Clone)]
pub struct BulkClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl BulkClient {
    /// Build a client for the service at `base_url`.
    ///
    /// `request_timeout` bounds each individual attempt; `None` leaves
    /// attempts unbounded in wall-clock time.
    pub fn new(
        base_url: &str,
        retry: RetryPolicy,
        request_timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: bulk_endpoint(base_url),
            retry,
        })
    }

    /// Full URL chunks are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Submit one chunk, retrying with exponential backoff.
    ///
    /// Returns `true` on the first 2xx response and `false` once every
    /// attempt has failed. Failures are logged, never returned.
    pub async fn submit(&self, chunk: usize, records: &[Record]) -> bool {
        let attempts = self.retry.attempts;

        for attempt in 1..=attempts {
            match self.try_submit(records).await {
                Ok(()) => {
                    tracing::info!(chunk, rows = records.len(), attempt, "Chunk accepted");
                    return true;
                }
                Err(e) if attempt < attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        chunk,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Chunk submit failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        chunk,
                        rows = records.len(),
                        attempts,
                        error = %e,
                        "Chunk submit failed after all retries"
                    );
                }
            }
        }

        false
    }

    /// Execute a single POST and check the response status.
    async fn try_submit(&self, records: &[Record]) -> Result<(), SubmitError> {
        let response = self.http.post(&self.endpoint).json(records).send().await?;
        if !response.status().is_success() {
            return Err(SubmitError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Join `base_url` and [`BULK_PATH`] without doubling the slash.
fn bulk_endpoint(base_url: &str) -> String {
    format!("{}{BULK_PATH}", base_url.trim_end_matches('/'))
}

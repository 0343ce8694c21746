//! Drives a full load: read chunks, submit them concurrently, wait for all.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use revingest_core::revision::missing_fields;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::BulkClient;
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::reader::TsvChunkReader;

/// Read buffer for the source file.
const READ_BUFFER_BYTES: usize = 1 << 20;

/// Chunking and concurrency settings for one load.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub chunk_size: NonZeroUsize,
    /// `None` submits every chunk as soon as it is read.
    pub max_in_flight: Option<NonZeroUsize>,
}

impl From<&LoaderConfig> for LoadOptions {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            max_in_flight: config.max_in_flight,
        }
    }
}

/// What a finished load reports.
///
/// There is no per-chunk outcome here: chunks that exhausted their retries
/// are only visible in the logs and in the service's row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Chunks submitted (successfully or not).
    pub chunks: usize,
    /// Data rows read from the source.
    pub rows: usize,
    /// Wall-clock time from opening the source to the last submit finishing.
    pub elapsed: Duration,
}

/// Load the configured file into the configured service.
pub async fn run(config: &LoaderConfig) -> Result<LoadReport, LoaderError> {
    let file = tokio::fs::File::open(&config.source).await?;
    let reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);
    let client = BulkClient::new(&config.base_url, config.retry.clone(), config.request_timeout)?;

    tracing::info!(
        source = %config.source.display(),
        endpoint = client.endpoint(),
        chunk_size = config.chunk_size.get(),
        attempts = config.retry.attempts,
        max_in_flight = ?config.max_in_flight,
        "Starting load"
    );

    load(reader, client, LoadOptions::from(config)).await
}

/// Stream `source` in chunks and submit each one through `client`.
///
/// Every chunk is spawned as its own task on the current runtime as soon as
/// it is read. With `max_in_flight` set, reading pauses until a submit slot
/// frees up. Returns once every submit has finished; a chunk that failed all
/// of its attempts does not stop the others or fail the load.
pub async fn load<R>(
    source: R,
    client: BulkClient,
    options: LoadOptions,
) -> Result<LoadReport, LoaderError>
where
    R: AsyncBufRead + Unpin,
{
    let started = Instant::now();

    let Some(mut reader) = TsvChunkReader::new(source, options.chunk_size).await? else {
        tracing::warn!("Source has no header row, nothing to submit");
        return Ok(LoadReport {
            chunks: 0,
            rows: 0,
            elapsed: started.elapsed(),
        });
    };

    let missing = missing_fields(reader.header());
    if !missing.is_empty() {
        tracing::warn!(
            ?missing,
            "Header lacks revision fields, the service will reject these rows"
        );
    }

    let limiter = options
        .max_in_flight
        .map(|n| Arc::new(Semaphore::new(n.get())));
    let client = Arc::new(client);
    let mut tasks = JoinSet::new();
    let mut chunks = 0usize;
    let mut rows = 0usize;

    while let Some(chunk) = reader.next_chunk().await? {
        let permit = match &limiter {
            Some(semaphore) => Some(Arc::clone(semaphore).acquire_owned().await?),
            None => None,
        };

        chunks += 1;
        rows += chunk.len();
        tracing::debug!(chunk = chunks, rows = chunk.len(), "Submitting chunk");

        let client = Arc::clone(&client);
        let index = chunks;
        tasks.spawn(async move {
            let _permit = permit;
            client.submit(index, &chunk).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined?;
    }

    let report = LoadReport {
        chunks,
        rows,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        chunks = report.chunks,
        rows = report.rows,
        elapsed_secs = report.elapsed.as_secs_f64(),
        "Load finished"
    );
    Ok(report)
}

//! Error types for the bulk loader.

/// A single bulk-submit attempt failed. Always retried, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status code.
    #[error("Service returned HTTP {0}")]
    HttpStatus(u16),
}

/// A failure that aborts the whole load.
///
/// Submit failures are deliberately absent: they are retried and then
/// swallowed by [`crate::client::BulkClient::submit`].
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Concurrency limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),

    #[error("Submit task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::LoaderError;
use crate::retry::RetryPolicy;

/// Default service location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default rows per bulk submit.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(100_000) {
    Some(n) => n,
    None => panic!("chunk size must be non-zero"),
};

/// Loader configuration assembled from CLI arguments and environment
/// variables.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// TSV file to load.
    pub source: PathBuf,
    /// Base URL of the ingest service.
    pub base_url: String,
    /// Rows per bulk submit.
    pub chunk_size: NonZeroUsize,
    /// Backoff policy applied to every chunk.
    pub retry: RetryPolicy,
    /// Cap on concurrent submits. `None` submits every chunk at once.
    pub max_in_flight: Option<NonZeroUsize>,
    /// Per-attempt HTTP timeout. `None` means no client-side deadline.
    pub request_timeout: Option<Duration>,
}

impl LoaderConfig {
    /// Load configuration from the process arguments and environment.
    ///
    /// | Source                        | Default                  |
    /// |-------------------------------|--------------------------|
    /// | 1st argument or `LOADER_FILE` | required                 |
    /// | `LOADER_BASE_URL`             | `http://localhost:8000`  |
    /// | `LOADER_CHUNK_SIZE`           | `100000`                 |
    /// | `LOADER_RETRY_ATTEMPTS`       | `5`                      |
    /// | `LOADER_RETRY_INITIAL_MS`     | `100`                    |
    /// | `LOADER_RETRY_MAX_MS`         | `30000`                  |
    /// | `LOADER_MAX_IN_FLIGHT`        | unset (unbounded)        |
    /// | `LOADER_REQUEST_TIMEOUT_SECS` | unset (no timeout)       |
    pub fn from_env_and_args<I>(args: I) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = String>,
    {
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env_and_args`] with an injectable variable source.
    pub fn from_lookup<I, F>(args: I, lookup: F) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let source = args
            .into_iter()
            .next()
            .or_else(|| lookup("LOADER_FILE"))
            .map(PathBuf::from)
            .ok_or_else(|| {
                LoaderError::Config(
                    "source file required: pass it as the first argument or set LOADER_FILE".into(),
                )
            })?;

        let base_url = lookup("LOADER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let chunk_size = parse_var::<NonZeroUsize>(&lookup, "LOADER_CHUNK_SIZE")?
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        let defaults = RetryPolicy::default();
        let attempts =
            parse_var::<u32>(&lookup, "LOADER_RETRY_ATTEMPTS")?.unwrap_or(defaults.attempts);
        if attempts == 0 {
            return Err(LoaderError::Config(
                "LOADER_RETRY_ATTEMPTS must be at least 1".into(),
            ));
        }
        let retry = RetryPolicy {
            attempts,
            initial_delay: parse_var::<u64>(&lookup, "LOADER_RETRY_INITIAL_MS")?
                .map_or(defaults.initial_delay, Duration::from_millis),
            max_delay: parse_var::<u64>(&lookup, "LOADER_RETRY_MAX_MS")?
                .map_or(defaults.max_delay, Duration::from_millis),
            ..defaults
        };

        let max_in_flight = parse_var::<NonZeroUsize>(&lookup, "LOADER_MAX_IN_FLIGHT")?;

        let request_timeout = parse_var::<u64>(&lookup, "LOADER_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        Ok(Self {
            source,
            base_url,
            chunk_size,
            retry,
            max_in_flight,
            request_timeout,
        })
    }
}

/// Parse an optional variable, reporting the key and raw value on failure.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, LoaderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| LoaderError::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn config(args: &[&str], vars: &[(&str, &str)]) -> Result<LoaderConfig, LoaderError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoaderConfig::from_lookup(args.iter().map(|a| a.to_string()), |key| {
            vars.get(key).cloned()
        })
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&["revisions.tsv"], &[]).unwrap();
        assert_eq!(cfg.source, PathBuf::from("revisions.tsv"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(cfg.retry.attempts, 5);
        assert!(cfg.max_in_flight.is_none());
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn source_falls_back_to_env() {
        let cfg = config(&[], &[("LOADER_FILE", "/data/training.tsv")]).unwrap();
        assert_eq!(cfg.source, PathBuf::from("/data/training.tsv"));
    }

    #[test]
    fn argument_wins_over_env() {
        let cfg = config(&["a.tsv"], &[("LOADER_FILE", "b.tsv")]).unwrap();
        assert_eq!(cfg.source, PathBuf::from("a.tsv"));
    }

    #[test]
    fn missing_source_is_an_error() {
        assert_matches!(config(&[], &[]), Err(LoaderError::Config(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(
            &["x.tsv"],
            &[
                ("LOADER_BASE_URL", "http://ingest:9000"),
                ("LOADER_CHUNK_SIZE", "500"),
                ("LOADER_RETRY_ATTEMPTS", "3"),
                ("LOADER_RETRY_INITIAL_MS", "10"),
                ("LOADER_RETRY_MAX_MS", "50"),
                ("LOADER_MAX_IN_FLIGHT", "4"),
                ("LOADER_REQUEST_TIMEOUT_SECS", "60"),
            ],
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://ingest:9000");
        assert_eq!(cfg.chunk_size.get(), 500);
        assert_eq!(cfg.retry.attempts, 3);
        assert_eq!(cfg.retry.initial_delay, Duration::from_millis(10));
        assert_eq!(cfg.retry.max_delay, Duration::from_millis(50));
        assert_eq!(cfg.max_in_flight.map(NonZeroUsize::get), Some(4));
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = config(&["x.tsv"], &[("LOADER_CHUNK_SIZE", "0")]).unwrap_err();
        assert!(err.to_string().contains("LOADER_CHUNK_SIZE"));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert_matches!(
            config(&["x.tsv"], &[("LOADER_RETRY_ATTEMPTS", "0")]),
            Err(LoaderError::Config(_))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_matches!(
            config(&["x.tsv"], &[("LOADER_MAX_IN_FLIGHT", "many")]),
            Err(LoaderError::Config(_))
        );
    }
}

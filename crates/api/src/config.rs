/// Default request body cap: 256 MiB, enough for a 100 000-row bulk batch.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 256 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Per-request timeout in seconds. `None` disables the timeout layer.
    pub request_timeout_secs: Option<u64>,
    /// Maximum accepted request body size in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            request_timeout_secs: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `HOST`                 | `0.0.0.0`        |
    /// | `PORT`                 | `8000`           |
    /// | `REQUEST_TIMEOUT_SECS` | unset (disabled) |
    /// | `BODY_LIMIT_BYTES`     | `268435456`      |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port: u16 = std::env::var("PORT")
            .map(|v| v.parse().expect("PORT must be a valid u16"))
            .unwrap_or(defaults.port);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS").ok().map(|v| {
            v.parse::<u64>()
                .expect("REQUEST_TIMEOUT_SECS must be a valid u64")
        });

        let body_limit_bytes: usize = std::env::var("BODY_LIMIT_BYTES")
            .map(|v| v.parse().expect("BODY_LIMIT_BYTES must be a valid usize"))
            .unwrap_or(defaults.body_limit_bytes);

        Self {
            host,
            port,
            request_timeout_secs,
            body_limit_bytes,
        }
    }
}

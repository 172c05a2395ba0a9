//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `DESK_HOST` - Bind address (default: 127.0.0.1)
//! - `DESK_PORT` - Listen port (default: 5000)
//! - `DESK_BASE_URL` - Public URL of the server (default: <http://localhost:5000>)
//! - `DESK_CORS_ORIGINS` - Comma-separated origins allowed to call the API, or `*` (default: `*`)
//! - `CLASSIFIER_URL` - Image classification inference endpoint
//! - `CLASSIFIER_API_KEY` - Bearer token for the inference endpoint
//! - `CLASSIFIER_TIMEOUT_SECS` - Timeout for classification and URL fetches (default: 30)
//! - `ANALYZE_MAX_UPLOAD_BYTES` - Largest accepted image upload or download (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the server
    pub base_url: String,
    /// Browser origins allowed to call the API cross-site
    pub cors_origins: CorsOrigins,
    /// Image analysis configuration
    pub analyze: AnalyzeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Origins allowed by the CORS layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    /// Any origin (`*`).
    #[default]
    Any,
    /// Only these origins, serialised as `scheme://host[:port]`.
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse `*` or a comma-separated list of origins.
    ///
    /// An empty value means any origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if an entry is not an http(s) origin.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.is_empty() || value == "*" {
            return Ok(Self::Any);
        }

        let invalid = |entry: &str, reason: String| {
            ConfigError::InvalidEnvVar(
                "DESK_CORS_ORIGINS".to_string(),
                format!("{entry}: {reason}"),
            )
        };

        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let url = Url::parse(entry).map_err(|e| invalid(entry, e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(invalid(entry, "origin must be http or https".to_string()));
                }
                Ok(url.origin().ascii_serialization())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

/// Image analysis configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AnalyzeConfig {
    /// Inference endpoint; `None` disables classification
    pub classifier_url: Option<Url>,
    /// Bearer token sent to the inference endpoint
    pub classifier_api_key: Option<SecretString>,
    /// Timeout applied to classification calls and image downloads
    pub timeout: Duration,
    /// Largest image accepted from an upload or a download
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AnalyzeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzeConfig")
            .field("classifier_url", &self.classifier_url.as_ref().map(Url::as_str))
            .field(
                "classifier_api_key",
                &self.classifier_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            classifier_url: None,
            classifier_api_key: None,
            timeout: Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AnalyzeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let classifier_url = get_optional_env("CLASSIFIER_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("CLASSIFIER_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let classifier_api_key = get_optional_env("CLASSIFIER_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "CLASSIFIER_API_KEY") {
                tracing::warn!("CLASSIFIER_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });

        let timeout_secs = get_env_or_default(
            "CLASSIFIER_TIMEOUT_SECS",
            &DEFAULT_CLASSIFIER_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CLASSIFIER_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let max_upload_bytes = get_env_or_default(
            "ANALYZE_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )
        .parse::<usize>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("ANALYZE_MAX_UPLOAD_BYTES".to_string(), e.to_string())
        })?;

        Ok(Self {
            classifier_url,
            classifier_api_key,
            timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("DESK_DATABASE_URL")?;
        let host = get_env_or_default("DESK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DESK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DESK_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DESK_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("DESK_BASE_URL", "http://localhost:5000");
        let cors_origins = CorsOrigins::parse(&get_env_or_default("DESK_CORS_ORIGINS", "*"))?;

        let analyze = AnalyzeConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origins,
            analyze,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

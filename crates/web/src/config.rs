//! User Directory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults reproduce the stock setup
//! against the public JSONPlaceholder directory.
//!
//! - `USER_DIRECTORY_HOST` - Bind address (default: 127.0.0.1)
//! - `USER_DIRECTORY_PORT` - Listen port (default: 3000)
//! - `USER_DIRECTORY_SOURCE_URL` - Remote user collection
//!   (default: <https://jsonplaceholder.typicode.com/users>)
//! - `USER_DIRECTORY_FETCH_TIMEOUT_SECS` - Remote fetch timeout (default: 10)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default remote collection.
pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/users";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_FETCH_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote endpoint serving the user collection
    pub source_url: Url,
    /// Upper bound on a single remote fetch
    pub fetch_timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var::<IpAddr>(
            "USER_DIRECTORY_HOST",
            &get_or_default("USER_DIRECTORY_HOST", DEFAULT_HOST),
        )?;
        let port = parse_var::<u16>(
            "USER_DIRECTORY_PORT",
            &get_or_default("USER_DIRECTORY_PORT", DEFAULT_PORT),
        )?;
        let source_url = parse_source_url(&get_or_default(
            "USER_DIRECTORY_SOURCE_URL",
            DEFAULT_SOURCE_URL,
        ))?;
        let timeout_secs = parse_var::<u64>(
            "USER_DIRECTORY_FETCH_TIMEOUT_SECS",
            &get_or_default("USER_DIRECTORY_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "USER_DIRECTORY_FETCH_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host,
            port,
            source_url,
            fetch_timeout: Duration::from_secs(timeout_secs),
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a local instance reading from `source_url`.
    ///
    /// Binds to an ephemeral port on loopback; used by tests.
    #[must_use]
    pub fn local(source_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            source_url,
            fetch_timeout: Duration::from_secs(5),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable in the error.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// The source must be an absolute http(s) URL.
fn parse_source_url(value: &str) -> Result<Url, ConfigError> {
    let url = parse_var::<Url>("USER_DIRECTORY_SOURCE_URL", value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            "USER_DIRECTORY_SOURCE_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DirectoryConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DirectoryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.source_url.as_str(), DEFAULT_SOURCE_URL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("USER_DIRECTORY_HOST", "0.0.0.0"),
            ("USER_DIRECTORY_PORT", "8080"),
            ("USER_DIRECTORY_SOURCE_URL", "http://localhost:9000/people"),
            ("USER_DIRECTORY_FETCH_TIMEOUT_SECS", "3"),
            ("LOG_FORMAT", "json"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.source_url.path(), "/people");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("USER_DIRECTORY_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "USER_DIRECTORY_PORT"));
    }

    #[test]
    fn test_source_url_must_be_http() {
        let err = config_from(&[("USER_DIRECTORY_SOURCE_URL", "ftp://example.com/users")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, msg) if msg.contains("ftp")));

        assert!(config_from(&[("USER_DIRECTORY_SOURCE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(config_from(&[("USER_DIRECTORY_FETCH_TIMEOUT_SECS", "0")]).is_err());
    }
}

//! Configuration management
//!
//! Settings come from the environment first; the CLI overrides individual
//! fields before [`Config::client_config`] validates them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::transport::{ClientConfig, TlsIdentity};

/// API endpoint
pub const ENV_ENDPOINT: &str = "SPINNAKER_API";
/// Client certificate (PEM)
pub const ENV_CLIENT_CERT: &str = "SPINNAKER_CLIENT_CERT";
/// Client key (PEM)
pub const ENV_CLIENT_KEY: &str = "SPINNAKER_CLIENT_KEY";
/// Bearer token
pub const ENV_IAP_TOKEN: &str = "SPINNAKER_IAP_TOKEN";
/// Session cookie value
pub const ENV_API_SESSION: &str = "SPINNAKER_API_SESSION";
/// Per-call HTTP timeout, in seconds
pub const ENV_CLIENT_TIMEOUT: &str = "SPINNAKER_CLIENT_TIMEOUT";
/// Task poll timeout, in seconds
pub const ENV_TASK_TIMEOUT: &str = "DECKHAND_TASK_TIMEOUT";
/// Log level
pub const ENV_LOG: &str = "DECKHAND_LOG";

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No endpoint was configured
    #[error("API endpoint is required (set SPINNAKER_API or --endpoint)")]
    MissingEndpoint,

    /// The endpoint is not a URL
    #[error("invalid API endpoint: {value}")]
    InvalidEndpoint {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// Only one of certificate and key was given
    #[error("cert path and key path must be defined together")]
    IncompleteIdentity,

    /// A configured file does not exist
    #[error("{name} does not exist: {}", path.display())]
    MissingFile {
        /// Setting name.
        name: &'static str,
        /// Configured path.
        path: PathBuf,
    },

    /// A setting could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API endpoint
    pub endpoint: Option<String>,
    /// Client certificate (PEM)
    pub cert_path: Option<PathBuf>,
    /// Client key (PEM)
    pub key_path: Option<PathBuf>,
    /// Bearer token
    #[serde(skip_serializing)]
    pub iap_token: Option<String>,
    /// Session cookie value
    #[serde(skip_serializing)]
    pub api_session: Option<String>,
    /// Skip server certificate verification
    pub insecure: bool,
    /// Per-call HTTP timeout, in seconds
    pub client_timeout_secs: u64,
    /// Task poll timeout, in seconds
    pub task_timeout_secs: u64,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            cert_path: None,
            key_path: None,
            iap_token: None,
            api_session: None,
            insecure: false,
            client_timeout_secs: 60,
            task_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("cert_path", &self.cert_path)
            .field("key_path", &self.key_path)
            .field("iap_token", &self.iap_token.as_ref().map(|_| "<redacted>"))
            .field("api_session", &self.api_session.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .field("client_timeout_secs", &self.client_timeout_secs)
            .field("task_timeout_secs", &self.task_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Reads the process environment
    ///
    /// # Errors
    ///
    /// Fails on unparsable timeouts or an unknown log level.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let client_timeout_secs = match get(ENV_CLIENT_TIMEOUT) {
            Some(value) => parse_seconds(ENV_CLIENT_TIMEOUT, &value)?,
            None => defaults.client_timeout_secs,
        };
        let task_timeout_secs = match get(ENV_TASK_TIMEOUT) {
            Some(value) => parse_seconds(ENV_TASK_TIMEOUT, &value)?,
            None => defaults.task_timeout_secs,
        };
        let log_level = match get(ENV_LOG) {
            Some(level) => validate_log_level(ENV_LOG, &level)?,
            None => defaults.log_level,
        };

        let config = Self {
            endpoint: get(ENV_ENDPOINT),
            cert_path: get(ENV_CLIENT_CERT).map(PathBuf::from),
            key_path: get(ENV_CLIENT_KEY).map(PathBuf::from),
            iap_token: get(ENV_IAP_TOKEN),
            api_session: get(ENV_API_SESSION),
            insecure: defaults.insecure,
            client_timeout_secs,
            task_timeout_secs,
            log_level,
        };
        Ok(config)
    }

    /// Deadline for asynchronous tasks
    ///
    /// # Errors
    ///
    /// Fails when the timeout is zero.
    pub fn task_timeout(&self) -> Result<Duration, ConfigError> {
        positive("task timeout", self.task_timeout_secs)
    }

    /// Validates the connection settings and builds a [`ClientConfig`]
    ///
    /// # Errors
    ///
    /// - the endpoint is missing or not a URL
    /// - only one of certificate and key is set, or either file is missing
    /// - the client timeout is zero
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let raw = self.endpoint.as_deref().ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            source,
        })?;

        let mut client = ClientConfig::new(endpoint)
            .with_accept_invalid_certs(self.insecure)
            .with_request_timeout(positive("client timeout", self.client_timeout_secs)?);

        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => {
                require_file("cert path", cert)?;
                require_file("key path", key)?;
                client = client.with_identity(TlsIdentity::new(cert, key));
            }
            (None, None) => {}
            _ => return Err(ConfigError::IncompleteIdentity),
        }

        if let Some(token) = &self.iap_token {
            client = client.with_bearer_token(token.clone());
        }
        if let Some(session) = &self.api_session {
            client = client.with_session(session.clone());
        }

        Ok(client)
    }
}

fn parse_seconds(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn positive(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn validate_log_level(key: &'static str, level: &str) -> Result<String, ConfigError> {
    let level = level.trim().to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(ConfigError::InvalidValue { key, value: level })
    }
}

fn require_file(name: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::MissingFile {
            name,
            path: path.to_path_buf(),
        })
    }
}

//! Client configuration.
//!
//! # Design
//! `ClientConfig` is an explicit, immutable value handed to
//! `HttpClient::new`; there is no process-wide default instance. It can be
//! built in code with the `with_*` methods or loaded with
//! [`ClientConfig::load`], which layers a TOML file and `FETCH_*` environment
//! variables over the defaults.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Prefix of the environment variables read by [`ClientConfig::load`].
pub const ENV_PREFIX: &str = "FETCH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid client configuration: {0}")]
    Invalid(String),

    #[error("failed to load client configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Settings shared by every request a client issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin prepended to relative paths.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Headers sent when a request does not bring its own.
    #[serde(default = "default_headers")]
    pub default_headers: Vec<(String, String)>,

    #[serde(rename = "timeout_ms", with = "millis", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: default_headers(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add or replace one default header. Names compare case-insensitively.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Replace the default headers wholesale.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from defaults, an optional TOML file and the
    /// environment, later sources overriding earlier ones.
    ///
    /// Recognised variables are `FETCH_BASE_URL` and `FETCH_TIMEOUT_MS`.
    /// A `path` that does not exist is skipped.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ClientConfig::default()));
        if let Some(path) = path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
                tracing::debug!(path = %path.display(), "loaded client config file");
            } else {
                tracing::debug!(path = %path.display(), "client config file not found, skipping");
            }
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&["base_url", "timeout_ms"]));

        let config: ClientConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        if let Some(base) = &self.base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "base url must start with http:// or https://, got {base:?}"
                )));
            }
        }
        Ok(())
    }
}

fn default_headers() -> Vec<(String, String)> {
    vec![("Content-Type".to_string(), "application/json".to_string())]
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

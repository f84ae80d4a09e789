//! Configuration types for the remote background removal service

use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default remove.bg endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Header carrying the API credential
pub const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";

/// File stem used for downloaded results
pub const DEFAULT_DOWNLOAD_STEM: &str = "image-sans-fond";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

/// Environment variable overriding the endpoint
pub const ENDPOINT_ENV: &str = "REMOVE_BG_ENDPOINT";

/// API credential for the removal service
///
/// The key is redacted from `Debug` and `Display` output and is never
/// serialized back out of a [`ServiceConfig`].
///
/// Surrounding whitespace is stripped, so keys pasted with a trailing
/// newline still form a valid header value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        Self(key.trim().to_string())
    }

    /// Raw key value, for building the request header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Configuration for the remote background removal service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Endpoint receiving the multipart POST
    pub endpoint: String,

    /// API credential (from environment or config file, never from source)
    #[serde(skip_serializing)]
    pub api_key: Option<ApiKey>,

    /// Header name carrying the API key
    pub api_key_header: String,

    /// Request timeout in seconds (None = wait on the transport)
    pub timeout_secs: Option<u64>,

    /// File stem for downloaded results
    pub download_stem: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout_secs: None,
            download_stem: DEFAULT_DOWNLOAD_STEM.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use remote_bgremove::ServiceConfig;
    ///
    /// let config = ServiceConfig::builder()
    ///     .api_key("test-key")
    ///     .timeout_secs(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.timeout_secs, Some(30));
    /// ```
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Default location of the user configuration file
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("remote-bgremove").join("config.json"))
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BgRemovalError::file_io_error("read config file", path, &e))?;
        serde_json::from_str(&content).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply environment overrides (`REMOVE_BG_API_KEY`, `REMOVE_BG_ENDPOINT`)
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            log::debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = Some(ApiKey::new(key));
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|e| !e.trim().is_empty()) {
            log::debug!("Using endpoint from {}: {}", ENDPOINT_ENV, endpoint);
            self.endpoint = endpoint.trim().to_string();
        }
        self
    }

    /// Resolve the effective configuration: defaults, then the config file
    /// (explicit path, else the default location if present), then the
    /// environment.
    pub fn resolve(explicit_file: Option<&Path>) -> Result<Self> {
        let config = Self::load_layers(explicit_file)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge defaults, the config file and the environment without validating
    ///
    /// For callers that apply further overrides (command-line flags) and
    /// validate the final result themselves.
    pub fn load_layers(explicit_file: Option<&Path>) -> Result<Self> {
        let base = match explicit_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Loading config from {}", path.display());
                    Self::from_file(path)?
                },
                None => Self::default(),
            },
        };
        Ok(base.with_env_overrides())
    }

    /// Validate all configuration parameters
    ///
    /// A missing API key is not an error here; the HTTP backend refuses to
    /// start without one.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|_| {
            BgRemovalError::config_value_error("endpoint", &self.endpoint, "an http(s) URL")
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BgRemovalError::config_value_error(
                "endpoint",
                &self.endpoint,
                "an http(s) URL",
            ));
        }

        if self.api_key_header.trim().is_empty() {
            return Err(BgRemovalError::invalid_config(
                "API key header name must not be empty",
            ));
        }

        if self.api_key.as_ref().is_some_and(ApiKey::is_blank) {
            return Err(BgRemovalError::invalid_config("API key must not be blank"));
        }

        if self.download_stem.trim().is_empty() {
            return Err(BgRemovalError::invalid_config(
                "download file stem must not be empty",
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err(BgRemovalError::config_value_error(
                "timeout",
                0,
                "at least 1 second",
            ));
        }

        Ok(())
    }

    /// The API key, or a configuration error explaining how to supply one
    pub fn require_api_key(&self) -> Result<&ApiKey> {
        self.api_key.as_ref().ok_or_else(|| {
            BgRemovalError::invalid_config(format!(
                "No API key configured. Set {} or add \"api_key\" to the config file.",
                API_KEY_ENV
            ))
        })
    }
}

/// Builder for `ServiceConfig`
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Set the service endpoint
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the API key
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.api_key = Some(ApiKey::new(key));
        self
    }

    /// Set the API key header name
    #[must_use]
    pub fn api_key_header<S: Into<String>>(mut self, header: S) -> Self {
        self.config.api_key_header = header.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    /// Set the download file stem
    #[must_use]
    pub fn download_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.config.download_stem = stem.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

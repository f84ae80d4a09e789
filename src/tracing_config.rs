//! Structured logging setup and shared span/event helpers
//!
//! The library never installs a subscriber; it only emits through the
//! `spans` and `events` helpers below (and the `log` macros, which
//! `tracing-subscriber` picks up). Binaries call [`init_cli_tracing`] or
//! build a [`TracingConfig`] themselves.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "REMOVE_BG_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Colored, human-readable lines
    #[default]
    Console,
    /// Plain lines without ANSI colors, for CI logs and pipes
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

impl TracingFormat {
    /// Parse a format name (`console`, `compact`, `json`)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "console" | "pretty" => Some(Self::Console),
            "compact" | "plain" => Some(Self::Compact),
            #[cfg(feature = "tracing-json")]
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Subscriber settings for binaries
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// 0: info, 1: debug, 2+: trace (HTTP client internals included)
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Raw filter directives; replaces the verbosity mapping when set
    pub directives: Option<String>,
}

impl TracingConfig {
    #[must_use]
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    /// Settings for `verbosity`, refined by `RUST_LOG` and `REMOVE_BG_LOG_FORMAT`
    #[must_use]
    pub fn from_env(verbosity: u8) -> Self {
        Self::from_lookup(verbosity, |name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(verbosity: u8, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(verbosity);
        if let Some(directives) = lookup("RUST_LOG").filter(|d| !d.trim().is_empty()) {
            config = config.with_directives(directives);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|name| TracingFormat::from_name(&name)) {
            config = config.with_format(format);
        }
        config
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directives<S: Into<String>>(mut self, directives: S) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Filter directives in effect
    ///
    /// Verbosity raises this crate's level; the HTTP stack stays at `warn`
    /// until `-vv` so request bodies don't flood debug output.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        if let Some(directives) = &self.directives {
            return directives.clone();
        }
        let (own, http) = match self.verbosity {
            0 => ("info", "warn"),
            1 => ("debug", "warn"),
            _ => ("trace", "debug"),
        };
        format!(
            "{}={},reqwest={},hyper={},warn",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            own,
            http,
            http
        )
    }

    /// Install the global subscriber (stderr)
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directives())?;
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console | TracingFormat::Compact => {
                let layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(self.format == TracingFormat::Console)
                    .with_target(self.verbosity > 1)
                    .compact();
                registry.with(layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(layer).try_init()?;
            },
        }

        Ok(())
    }
}

/// Install CLI logging and tag the run with a fresh id
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    TracingConfig::from_env(verbosity).init()?;
    tracing::debug!(run_id = %uuid::Uuid::new_v4(), "remote-bgremove started");
    Ok(())
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// One request to the removal service
    pub fn removal_request(remover: &str, file_name: &str) -> Span {
        tracing::span!(Level::INFO, "removal_request", remover = %remover, file_name = %file_name)
    }

    pub fn transparency_check(encoded_bytes: usize) -> Span {
        tracing::span!(Level::DEBUG, "transparency_check", encoded_bytes)
    }

    /// Writing a processed result to disk
    pub fn file_saving(destination: &std::path::Path) -> Span {
        tracing::span!(
            Level::DEBUG,
            "file_saving",
            destination = %destination.display()
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use crate::error::BgRemovalError;
    use tracing::{error, info};

    /// User-facing progress line
    pub fn progress(message: &str, emoji: &str) {
        info!("{} {}", emoji, message);
    }

    /// A removal request that produced a result
    pub fn removal_completed(file_name: &str, result_bytes: usize, duration_ms: u64) {
        info!(
            file_name = %file_name,
            result_bytes,
            duration_ms,
            "✅ Background removed"
        );
    }

    /// A removal request that failed, with its classification
    pub fn removal_failed(file_name: &str, error: &BgRemovalError) {
        error!(
            file_name = %file_name,
            kind = ?error.failure_kind(),
            status = ?error.status(),
            error = %error,
            "❌ Background removal failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BgRemovalError;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_verbosity_scopes_crate_level() {
        let quiet = TracingConfig::new(0).filter_directives();
        assert!(quiet.starts_with("remote_bgremove=info,"));
        assert!(quiet.contains("reqwest=warn"));

        let debug = TracingConfig::new(1).filter_directives();
        assert!(debug.starts_with("remote_bgremove=debug,"));
        assert!(debug.contains("reqwest=warn"));

        let trace = TracingConfig::new(5).filter_directives();
        assert!(trace.starts_with("remote_bgremove=trace,"));
        assert!(trace.contains("hyper=debug"));
    }

    #[test]
    fn test_rust_log_replaces_verbosity() {
        let config = TracingConfig::from_lookup(2, lookup(&[("RUST_LOG", "reqwest=trace")]));
        assert_eq!(config.filter_directives(), "reqwest=trace");

        let blank = TracingConfig::from_lookup(0, lookup(&[("RUST_LOG", "  ")]));
        assert!(blank.directives.is_none());
    }

    #[test]
    fn test_format_from_env() {
        let config = TracingConfig::from_lookup(0, lookup(&[(LOG_FORMAT_ENV, "compact")]));
        assert_eq!(config.format, TracingFormat::Compact);

        let unknown = TracingConfig::from_lookup(0, lookup(&[(LOG_FORMAT_ENV, "yaml")]));
        assert_eq!(unknown.format, TracingFormat::Console);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(TracingFormat::from_name("Pretty"), Some(TracingFormat::Console));
        assert_eq!(TracingFormat::from_name("plain"), Some(TracingFormat::Compact));
        assert_eq!(TracingFormat::from_name("xml"), None);
    }

    #[test]
    fn test_helpers_without_subscriber() {
        let _guard = spans::removal_request("mock", "photo.png").entered();
        events::progress("working", "🔄");
        events::removal_completed("photo.png", 1024, 12);
        events::removal_failed("photo.png", &BgRemovalError::transport(Some(403), "forbidden"));
    }
}

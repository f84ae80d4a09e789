//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::ServiceConfig;
use anyhow::{Context, Result};

/// Convert CLI arguments to a validated `ServiceConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the effective configuration for a command line
    ///
    /// Flags take precedence over the environment, which takes precedence
    /// over the config file.
    pub(crate) fn from_cli(cli: &Cli) -> Result<ServiceConfig> {
        let config = ServiceConfig::load_layers(cli.config.as_deref())
            .context("Failed to load service configuration")?;
        Self::apply_overrides(config, cli)
    }

    fn apply_overrides(mut config: ServiceConfig, cli: &Cli) -> Result<ServiceConfig> {
        if let Some(endpoint) = &cli.endpoint {
            log::debug!("Using endpoint from command line: {}", endpoint);
            config.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_secs = Some(timeout);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("remote-bgremove").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "photo.png",
            "--endpoint",
            "http://localhost:9000/removebg",
            "--timeout",
            "15",
        ]);
        let config = CliConfigBuilder::apply_overrides(ServiceConfig::default(), &cli).unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/removebg");
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_defaults_are_kept_without_flags() {
        let cli = parse(&["photo.png"]);
        let config = CliConfigBuilder::apply_overrides(ServiceConfig::default(), &cli).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let cli = parse(&["photo.png", "--timeout", "0"]);
        assert!(CliConfigBuilder::apply_overrides(ServiceConfig::default(), &cli).is_err());

        let cli = parse(&["photo.png", "--endpoint", "ftp://example.com"]);
        assert!(CliConfigBuilder::apply_overrides(ServiceConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"download_stem": "cutout", "timeout_secs": 20}"#).unwrap();

        let cli = parse(&["photo.png", "--config", path.to_str().unwrap(), "--timeout", "5"]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.download_stem, "cutout");
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_flags_replace_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 0, "endpoint": "ftp://bad"}"#).unwrap();
        let config_arg = path.to_str().unwrap();

        let cli = parse(&[
            "photo.png",
            "--config",
            config_arg,
            "--timeout",
            "5",
            "--endpoint",
            "http://localhost:9/x",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.endpoint, "http://localhost:9/x");

        // Without replacements the file values are still rejected
        let cli = parse(&["photo.png", "--config", config_arg, "--endpoint", "http://localhost:9/x"]);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_input_optional_with_show_config() {
        let cli = parse(&["--show-config"]);
        assert!(cli.input.is_none());
        assert!(Cli::try_parse_from(["remote-bgremove"]).is_err());
    }
}

//! Remote background removal CLI
//!
//! Command-line front end driving a [`RemovalSession`] for a single image.

use super::config::CliConfigBuilder;
use crate::{
    backends::RemoveBgBackend,
    services::{
        ConsoleProgressReporter, ImageIOService, ProgressReporter, SpinnerProgressReporter,
    },
    session::RemovalSession,
    tracing_config::{events, init_cli_tracing, spans},
    types::OperationState,
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use tracing::Instrument;

/// Remove image backgrounds through a remote service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "remote-bgremove")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file
    #[arg(value_name = "INPUT", required_unless_present = "show_config")]
    pub input: Option<PathBuf>,

    /// Output file or directory [default: ./<download name>]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// JSON configuration file [default: <config dir>/remote-bgremove/config.json]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the service endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run the transparency check only and exit
    #[arg(long)]
    pub check_only: bool,

    /// Send the image even if it already looks transparent
    #[arg(long)]
    pub force: bool,

    /// Print the effective configuration (API key redacted) and exit
    #[arg(long)]
    pub show_config: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    run(cli).await
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    if cli.show_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to render configuration")?
        );
        println!(
            "api_key: {}",
            if config.api_key.is_some() { "set" } else { "not set" }
        );
        return Ok(());
    }

    let input = cli
        .input
        .as_deref()
        .context("An input image is required")?;

    let image = ImageIOService::load_selected_image(input)
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let mut session = RemovalSession::from_config(&config);
    session.select_image(image);

    let already_transparent = match session.check_transparency() {
        Ok(transparent) => transparent,
        Err(e) => {
            warn!("Transparency check failed, continuing: {}", e);
            false
        },
    };

    if cli.check_only {
        if already_transparent {
            println!("{}: transparent (background likely already removed)", input.display());
        } else {
            println!("{}: opaque", input.display());
        }
        return Ok(());
    }

    if already_transparent && !cli.force {
        events::progress(
            "Image already has transparency; use --force to send it anyway",
            "ℹ️",
        );
        return Ok(());
    }

    let backend = RemoveBgBackend::new(&config).context("Background removal service unavailable")?;
    info!("Removing background from {}", input.display());

    // Spinner redraws would interleave with verbose log lines
    let reporter: Box<dyn ProgressReporter> = if cli.verbose > 0 {
        Box::new(ConsoleProgressReporter::new(cli.verbose > 1))
    } else {
        Box::new(SpinnerProgressReporter::new())
    };
    let mut session = session.with_progress_reporter(reporter);
    let state = session.remove_background(&backend).await?.clone();

    match state {
        OperationState::Success => {
            let result = session
                .result()
                .context("Service reported success without a result")?;
            let target = cli.output.as_deref();
            let span = spans::file_saving(&ImageIOService::resolve_output_path(target, result));
            let written = ImageIOService::save_result(result, target)
                .instrument(span)
                .await
                .context("Failed to save result")?;
            println!("{}", written.display());
            Ok(())
        },
        OperationState::Failed(failure) => {
            log::debug!("Failure detail: {}", failure.detail);
            anyhow::bail!("{}", failure.message)
        },
        other => anyhow::bail!("Unexpected session state after removal: {}", other),
    }
}

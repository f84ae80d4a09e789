#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Remote Background Removal
//!
//! Upload an image to a remove.bg-compatible HTTP service and get the image
//! back with its background removed.
//!
//! ## Features
//!
//! - **Session state**: [`RemovalSession`] tracks the selected image, its
//!   preview, the processed result and the `Idle → Loading → Success/Failed`
//!   state of one workflow, with no global state
//! - **Transparency heuristic**: [`transparency::has_transparency`] flags
//!   images that already contain transparent pixels
//! - **Injectable service**: the [`BackgroundRemover`] trait with an HTTP
//!   implementation ([`RemoveBgBackend`]) and a scripted mock
//! - **Injected credentials**: the API key comes from `REMOVE_BG_API_KEY` or
//!   a config file, never from source
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use remote_bgremove::{
//!     ImageIOService, RemovalSession, RemoveBgBackend, ServiceConfig,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::resolve(None)?;
//! let backend = RemoveBgBackend::new(&config)?;
//!
//! let mut session = RemovalSession::from_config(&config);
//! session.select_image(ImageIOService::load_selected_image("photo.png").await?);
//! session.check_transparency()?;
//!
//! if session.can_remove() {
//!     session.remove_background(&backend).await?;
//! }
//! if let Some(message) = session.error_message() {
//!     eprintln!("{}", message);
//! } else if let Some(result) = session.result() {
//!     ImageIOService::save_result(result, None).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, spinner and tracing subscriber setup
//! - `webp-support` (default): WebP sniffing and decoding
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod remover;
pub mod services;
pub mod session;
pub mod tracing_config;
pub mod transparency;
pub mod types;

use std::path::Path;

// Public API exports
pub use backends::{MockBehavior, MockRemover, RemoveBgBackend};
pub use config::{ApiKey, ServiceConfig, ServiceConfigBuilder};
pub use error::{BgRemovalError, FailureKind, Result};
pub use remover::BackgroundRemover;
pub use services::{
    ConsoleProgressReporter, FormatService, ImageIOService, NoOpProgressReporter, ProcessingStage,
    ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use session::{RemovalSession, RemovalTicket};
pub use transparency::{detect_transparency, has_transparency, image_has_transparency};
pub use types::{
    Failure, HandleTracker, ImageHandle, OperationState, PreviewHandle, ProcessedResult,
    SelectedImage,
};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{events, spans, TracingConfig, TracingFormat};

/// Remove the background of an in-memory image
///
/// One-shot API for callers that want the service error itself rather than
/// session state: builds an HTTP backend from `config` and returns the
/// processed bytes.
///
/// # Examples
/// ```rust,no_run
/// use remote_bgremove::{remove_background_from_bytes, ServiceConfig};
///
/// # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
/// let config = ServiceConfig::resolve(None)?;
/// let png = remove_background_from_bytes("upload.jpg", upload, &config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_bytes(
    file_name: &str,
    image_bytes: Vec<u8>,
    config: &ServiceConfig,
) -> Result<Vec<u8>> {
    let image = SelectedImage::from_bytes(file_name, image_bytes)?;
    let backend = RemoveBgBackend::new(config)?;
    backend.remove_background(&image).await
}

/// Remove the background of an image file
pub async fn remove_background_from_file<P: AsRef<Path>>(
    path: P,
    config: &ServiceConfig,
) -> Result<Vec<u8>> {
    let image = ImageIOService::load_selected_image(path).await?;
    let backend = RemoveBgBackend::new(config)?;
    backend.remove_background(&image).await
}

//! Image I/O operations service
//!
//! This module separates file I/O operations from the session logic,
//! making the system more testable and maintainable.

use crate::{
    error::{BgRemovalError, Result},
    types::{ProcessedResult, SelectedImage},
};
use std::path::{Path, PathBuf};

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load a file from disk as a [`SelectedImage`]
    ///
    /// # Arguments
    /// * `path` - Path to the image file
    ///
    /// # Returns
    /// * `Ok(SelectedImage)` - File read and recognized as an image
    /// * `Err(BgRemovalError)` - File missing, unreadable, empty or not an image
    ///
    /// # Examples
    /// ```rust,no_run
    /// use remote_bgremove::services::ImageIOService;
    ///
    /// # async fn example() -> remote_bgremove::Result<()> {
    /// let image = ImageIOService::load_selected_image("photo.png").await?;
    /// println!("{} ({})", image.file_name(), image.mime_type());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_selected_image<P: AsRef<Path>>(path: P) -> Result<SelectedImage> {
        let path_ref = path.as_ref();

        let data = tokio::fs::read(path_ref)
            .await
            .map_err(|e| BgRemovalError::file_io_error("read image file", path_ref, &e))?;

        let file_name = path_ref
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_ref.display().to_string());

        log::debug!(
            "Loaded {} ({} bytes) from {}",
            file_name,
            data.len(),
            path_ref.display()
        );

        SelectedImage::from_bytes(file_name, data)
    }

    /// Where a result should be written
    ///
    /// An existing directory (or no target at all, meaning the current
    /// directory) receives the result under its download name; any other
    /// path is used as-is.
    #[must_use]
    pub fn resolve_output_path(target: Option<&Path>, result: &ProcessedResult) -> PathBuf {
        match target {
            Some(path) if path.is_dir() => path.join(result.download_name()),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(result.download_name()),
        }
    }

    /// Write a processed result to disk
    ///
    /// # Returns
    /// The path actually written.
    pub async fn save_result(result: &ProcessedResult, target: Option<&Path>) -> Result<PathBuf> {
        let output_path = Self::resolve_output_path(target, result);

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                BgRemovalError::file_io_error("create output directory", parent, &e)
            })?;
        }

        tokio::fs::write(&output_path, result.bytes())
            .await
            .map_err(|e| BgRemovalError::file_io_error("write result", &output_path, &e))?;

        log::info!(
            "Saved {} ({} bytes) to {}",
            result.download_name(),
            result.bytes().len(),
            output_path.display()
        );
        Ok(output_path)
    }
}

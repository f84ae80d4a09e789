//! Background removal service abstraction

use crate::{error::Result, types::SelectedImage};
use async_trait::async_trait;

/// A service that removes the background of an image
///
/// Implementations receive the selected image and return the processed
/// image bytes. The HTTP implementation lives in
/// [`crate::backends::RemoveBgBackend`]; tests substitute
/// [`crate::backends::test_utils::MockRemover`].
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Send the image to the service and return the processed bytes
    ///
    /// # Errors
    /// - `BgRemovalError::Transport` for network failures and non-success
    ///   HTTP responses
    /// - `BgRemovalError::UnexpectedResponse` for unusable success payloads
    async fn remove_background(&self, image: &SelectedImage) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: BackgroundRemover + ?Sized> BackgroundRemover for Box<T> {
    async fn remove_background(&self, image: &SelectedImage) -> Result<Vec<u8>> {
        (**self).remove_background(image).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: BackgroundRemover + ?Sized> BackgroundRemover for std::sync::Arc<T> {
    async fn remove_background(&self, image: &SelectedImage) -> Result<Vec<u8>> {
        (**self).remove_background(image).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

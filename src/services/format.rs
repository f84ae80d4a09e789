//! Image format sniffing and naming service
//!
//! Keeps format detection and file naming rules out of the session logic.

use image::ImageFormat;

/// Service for identifying image payloads and naming downloads
pub struct FormatService;

impl FormatService {
    /// Identify an image format from its magic bytes
    ///
    /// # Examples
    /// ```rust
    /// use remote_bgremove::services::FormatService;
    /// use image::ImageFormat;
    ///
    /// let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    /// assert_eq!(FormatService::sniff(&png), Some(ImageFormat::Png));
    /// assert_eq!(FormatService::sniff(b"plain text"), None);
    /// ```
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// File extension (without the dot) used when saving a result
    ///
    /// Unknown payloads are named as PNG, the format the service returns by
    /// default.
    #[must_use]
    pub fn extension(format: Option<ImageFormat>) -> &'static str {
        match format {
            Some(ImageFormat::Jpeg) => "jpg",
            Some(ImageFormat::WebP) => "webp",
            Some(ImageFormat::Tiff) => "tiff",
            Some(ImageFormat::Gif) => "gif",
            Some(ImageFormat::Bmp) => "bmp",
            _ => "png",
        }
    }

    /// MIME type of a sniffed payload
    #[must_use]
    pub fn mime_type(format: Option<ImageFormat>) -> &'static str {
        match format {
            Some(format) => format.to_mime_type(),
            None => "application/octet-stream",
        }
    }

    /// Download file name: `<stem>.<extension>`
    ///
    /// # Examples
    /// ```rust
    /// use remote_bgremove::services::FormatService;
    /// use image::ImageFormat;
    ///
    /// assert_eq!(
    ///     FormatService::download_file_name("image-sans-fond", Some(ImageFormat::Png)),
    ///     "image-sans-fond.png"
    /// );
    /// ```
    #[must_use]
    pub fn download_file_name(stem: &str, format: Option<ImageFormat>) -> String {
        format!("{}.{}", stem, Self::extension(format))
    }

    /// Whether a `Content-Type` header value denotes an image
    ///
    /// Parameters such as `; charset=...` are ignored.
    #[must_use]
    pub fn is_image_content_type(content_type: &str) -> bool {
        content_type
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|mime| mime.to_ascii_lowercase().starts_with("image/"))
    }
}

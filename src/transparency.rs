//! Transparency heuristic
//!
//! Guesses whether an image already had its background removed by looking
//! for any pixel that is not fully opaque. This is advisory only: images with
//! partial transparency for unrelated reasons are reported as transparent, and
//! an opaque image is never reported as transparent whatever its background.

use crate::error::Result;
use image::DynamicImage;

/// Alpha value of a fully opaque pixel
pub const OPAQUE_ALPHA: u8 = 255;

/// Bytes per RGBA8 pixel
const RGBA_STRIDE: usize = 4;

/// Offset of the alpha sample inside an RGBA8 pixel
const ALPHA_OFFSET: usize = 3;

/// Whether any pixel of an RGBA8 buffer is not fully opaque
///
/// Inspects every 4th byte starting at offset 3. An empty buffer is
/// considered opaque; trailing bytes that do not form a full pixel are
/// ignored.
///
/// ```rust
/// use remote_bgremove::transparency::has_transparency;
///
/// assert!(!has_transparency(&[10, 20, 30, 255]));
/// assert!(has_transparency(&[10, 20, 30, 255, 0, 0, 0, 128]));
/// ```
#[must_use]
pub fn has_transparency(rgba: &[u8]) -> bool {
    has_transparency_below(rgba, OPAQUE_ALPHA)
}

/// Whether any pixel of an RGBA8 buffer has an alpha below `threshold`
#[must_use]
pub fn has_transparency_below(rgba: &[u8], threshold: u8) -> bool {
    rgba.chunks_exact(RGBA_STRIDE)
        .filter_map(|pixel| pixel.get(ALPHA_OFFSET))
        .any(|&alpha| alpha < threshold)
}

/// Run the heuristic on a decoded image
///
/// Images whose color type carries no alpha channel are opaque by
/// construction and skip the pixel scan.
#[must_use]
pub fn image_has_transparency(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        log::trace!(
            "Color type {:?} has no alpha channel, treating as opaque",
            image.color()
        );
        return false;
    }
    let rgba = image.to_rgba8();
    has_transparency(rgba.as_raw())
}

/// Decode encoded image bytes and run the heuristic
pub fn detect_transparency(encoded: &[u8]) -> Result<bool> {
    let image = image::load_from_memory(encoded)?;
    let transparent = image_has_transparency(&image);
    log::debug!(
        "Transparency check on {}x{} image: {}",
        image.width(),
        image.height(),
        transparent
    );
    Ok(transparent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_single_opaque_pixel() {
        assert!(!has_transparency(&[0, 0, 0, 255]));
    }

    #[test]
    fn test_fully_opaque_buffers() {
        for pixels in [1usize, 2, 7, 64, 1000] {
            let buffer: Vec<u8> = (0..pixels)
                .flat_map(|i| [(i % 256) as u8, 17, 200, 255])
                .collect();
            assert!(!has_transparency(&buffer), "{} opaque pixels", pixels);
        }
    }

    #[test]
    fn test_any_translucent_pixel() {
        let mut buffer = vec![255u8; 4 * 50];
        buffer[4 * 37 + 3] = 254;
        assert!(has_transparency(&buffer));

        buffer[4 * 37 + 3] = 0;
        assert!(has_transparency(&buffer));
    }

    #[test]
    fn test_only_alpha_samples_are_inspected() {
        // Low color values must not be mistaken for alpha
        let buffer = [0u8, 0, 0, 255, 1, 2, 3, 255];
        assert!(!has_transparency(&buffer));
    }

    #[test]
    fn test_empty_and_partial_buffers() {
        assert!(!has_transparency(&[]));
        // Incomplete trailing pixel is ignored
        assert!(!has_transparency(&[0, 0, 0, 255, 0, 0, 0]));
    }

    #[test]
    fn test_custom_threshold() {
        let buffer = [0u8, 0, 0, 200];
        assert!(has_transparency_below(&buffer, 255));
        assert!(!has_transparency_below(&buffer, 200));
        assert!(!has_transparency_below(&buffer, 0));
    }

    #[test]
    fn test_image_without_alpha_channel() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255])));
        assert!(!image_has_transparency(&image));
    }

    #[test]
    fn test_rgba_image_with_cutout() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([10, 120, 30, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        assert!(image_has_transparency(&DynamicImage::ImageRgba8(image)));
    }

    #[test]
    fn test_detect_from_encoded_png() {
        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        assert!(!detect_transparency(&encode_png(&opaque)).unwrap());

        let mut cutout = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        cutout.put_pixel(3, 3, Rgba([1, 2, 3, 10]));
        let cutout = DynamicImage::ImageRgba8(cutout);
        assert!(detect_transparency(&encode_png(&cutout)).unwrap());
    }

    #[test]
    fn test_detect_rejects_garbage() {
        assert!(detect_transparency(b"definitely not an image").is_err());
    }
}

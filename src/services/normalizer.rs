// Image normalization for OCR input
//
// Phone photos arrive rotated, oversized, and low-contrast. This module
// re-encodes them into the one canonical form the recognizer sees:
// orientation-corrected, capped resolution, grayscale, contrast-stretched
// PNG. Best-effort only — the orchestrator falls back to the raw upload
// bytes when normalization fails.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, GrayImage, ImageFormat};
use tracing::debug;

use crate::core::errors::{NormalizeError, NormalizeResult};
use crate::core::types::NormalizedImage;

/// Normalize raw upload bytes on a blocking thread.
///
/// Decoding, resizing and re-encoding are CPU-intensive and would stall
/// the async runtime if run inline.
pub async fn normalize(bytes: Vec<u8>, max_dimension: u32) -> NormalizeResult<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalize_sync(&bytes, max_dimension))
        .await
        .map_err(|e| NormalizeError::TaskFailed(e.to_string()))?
}

/// Synchronous normalization pipeline: orient, downscale, grayscale,
/// stretch contrast, encode PNG.
pub fn normalize_sync(bytes: &[u8], max_dimension: u32) -> NormalizeResult<NormalizedImage> {
    let decoded = image::load_from_memory(bytes).map_err(NormalizeError::InvalidImage)?;

    let oriented = apply_orientation(decoded, read_exif_orientation(bytes));

    // Downscale only; upscaling adds no information for OCR.
    let (w, h) = (oriented.width(), oriented.height());
    let bounded = if w.max(h) > max_dimension {
        debug!("downscaling {}x{} to fit {}px", w, h, max_dimension);
        oriented.resize(max_dimension, max_dimension, FilterType::CatmullRom)
    } else {
        oriented
    };

    let gray = stretch_contrast(bounded.into_luma8());

    let mut png_bytes = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(NormalizeError::EncodeFailed)?;

    Ok(NormalizedImage { bytes: png_bytes })
}

/// Read EXIF orientation tag (0x0112) from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply an EXIF orientation transform.
///
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Linear contrast stretch over the occupied luma range.
fn stretch_contrast(mut img: GrayImage) -> GrayImage {
    let (mut min, mut max) = (u8::MAX, u8::MIN);
    for pixel in img.pixels() {
        min = min.min(pixel.0[0]);
        max = max.max(pixel.0[0]);
    }

    // Uniform image, nothing to stretch
    if max <= min {
        return img;
    }

    let range = (max - min) as f32;
    for pixel in img.pixels_mut() {
        let v = (pixel.0[0] - min) as f32 / range;
        pixel.0[0] = (v * 255.0).round() as u8;
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 130, 140, 255]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_normalize_produces_png() {
        let result = normalize(png_bytes(64, 32), 1600).await.unwrap();
        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
        // PNG magic
        assert_eq!(&result.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_caps_longer_dimension() {
        let result = normalize_sync(&png_bytes(400, 100), 200).unwrap();
        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 50);
    }

    #[test]
    fn test_never_upscales() {
        let result = normalize_sync(&png_bytes(40, 20), 1600).unwrap();
        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn test_rejects_undecodable_bytes() {
        let result = normalize_sync(b"definitely not an image", 1600);
        assert!(matches!(result, Err(NormalizeError::InvalidImage(_))));
    }

    #[test]
    fn test_contrast_stretch_expands_range() {
        let mut img = GrayImage::from_pixel(4, 1, Luma([100]));
        img.put_pixel(0, 0, Luma([150]));

        let stretched = stretch_contrast(img);
        assert_eq!(stretched.get_pixel(0, 0).0[0], 255);
        assert_eq!(stretched.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_contrast_stretch_uniform_image_untouched() {
        let img = GrayImage::from_pixel(3, 3, Luma([42]));
        let stretched = stretch_contrast(img);
        assert!(stretched.pixels().all(|p| p.0[0] == 42));
    }
}

//! Image encoding: flattened `RgbImage` → JPEG bytes.
//!
//! Quality is configured as a fraction in `[0, 1]`, the way image APIs on
//! the web express it; the `image` crate's encoder wants a 1–100 integer.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

/// Map a `[0, 1]` quality to the encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a rendered page as a baseline JPEG.
pub fn encode_jpeg(img: &RgbImage, quality: f32) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
        encoder.encode_image(img)?;
    }

    debug!(
        "Encoded {}x{} image → {} bytes JPEG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn quality_mapping() {
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(1.7), 100);
    }

    #[test]
    fn encode_small_image() {
        let img = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        let jpeg = encode_jpeg(&img, 0.92).expect("encode should succeed");
        // SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).expect("valid JPEG");
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
        let low = encode_jpeg(&img, 0.5).unwrap();
        let high = encode_jpeg(&img, 1.0).unwrap();
        assert!(high.len() >= low.len());
    }
}

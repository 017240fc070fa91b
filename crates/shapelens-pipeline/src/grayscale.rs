//! Image decoding, input validation and grayscale conversion.
//!
//! Decoding raw bytes is a convenience for front ends; every analysis
//! entry point takes an already-decoded [`DynamicImage`] and starts by
//! reducing it to a single intensity channel here.

use image::{DynamicImage, GrayImage, Luma};

use crate::types::{AnalysisError, Dimensions, InvalidImage};

/// Luminance weights for R, G and B (ITU-R BT.601).
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Decode raw image bytes (PNG, JPEG, BMP, WebP).
///
/// # Errors
///
/// Returns [`InvalidImage::EmptyInput`] if `bytes` is empty and
/// [`InvalidImage::Decode`] if the format is unrecognized or the data is
/// corrupt, both wrapped in [`AnalysisError::InvalidImage`].
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
    if bytes.is_empty() {
        return Err(InvalidImage::EmptyInput.into());
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Reject images without pixels.
///
/// # Errors
///
/// Returns [`InvalidImage::ZeroDimensions`] if width or height is zero.
pub fn validate(image: &DynamicImage) -> Result<Dimensions, AnalysisError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(InvalidImage::ZeroDimensions { width, height }.into());
    }
    Ok(Dimensions { width, height })
}

/// Convert to a single intensity channel.
///
/// Grayscale inputs pass through unchanged (alpha is dropped). Color
/// inputs are reduced with [`LUMA_WEIGHTS`], rounded to the nearest
/// integer.
#[must_use = "returns the grayscale image"]
pub fn to_intensity(image: &DynamicImage) -> GrayImage {
    if !image.color().has_color() {
        return image.to_luma8();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = LUMA_WEIGHTS[2].mul_add(
            f64::from(b),
            LUMA_WEIGHTS[0].mul_add(f64::from(r), LUMA_WEIGHTS[1] * f64::from(g)),
        );
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = luma.round().clamp(0.0, 255.0) as u8;
        Luma([value])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidImage(InvalidImage::EmptyInput))
        ));
    }

    #[test]
    fn corrupt_bytes_returns_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidImage(InvalidImage::Decode(_)))
        ));
    }

    #[test]
    fn valid_png_decodes() {
        let img = image::RgbaImage::from_fn(17, 31, |_, _| image::Rgba([128, 64, 32, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded.width(), 17);
        assert_eq!(decoded.height(), 31);
    }

    #[test]
    fn zero_dimensions_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 5));
        assert!(matches!(
            validate(&img),
            Err(AnalysisError::InvalidImage(InvalidImage::ZeroDimensions {
                width: 0,
                height: 5
            }))
        ));
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(5, 0));
        assert!(validate(&img).is_err());
    }

    #[test]
    fn validate_reports_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(3, 4));
        assert_eq!(
            validate(&img).unwrap(),
            Dimensions {
                width: 3,
                height: 4
            }
        );
    }

    #[test]
    fn gray_input_passes_through() {
        let gray = GrayImage::from_fn(4, 4, |x, y| Luma([u8::try_from(x * 16 + y).unwrap()]));
        let out = to_intensity(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(out, gray);
    }

    #[test]
    fn color_uses_fixed_weights() {
        let rgb = image::RgbImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgb([255, 0, 0]),
            1 => image::Rgb([0, 255, 0]),
            _ => image::Rgb([0, 0, 255]),
        });
        let out = to_intensity(&DynamicImage::ImageRgb8(rgb));
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(out.get_pixel(0, 0).0[0], 76);
        assert_eq!(out.get_pixel(1, 0).0[0], 150);
        assert_eq!(out.get_pixel(2, 0).0[0], 29);
    }

    #[test]
    fn white_stays_white() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let out = to_intensity(&DynamicImage::ImageRgb8(rgb));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }
}

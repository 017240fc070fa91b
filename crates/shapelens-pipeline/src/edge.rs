//! Binary mask production: gradient edges or a global intensity cutoff.
//!
//! Two sibling modes feed contour tracing:
//!
//! - [`canny`]: gradient magnitude with hysteresis, for shape detection.
//! - [`threshold`] / [`threshold_inverted`]: a fixed cutoff, for the
//!   symmetry and curve completion paths.
//!
//! Every function returns a new 0/255 image; the input is never touched.

use image::GrayImage;
use imageproc::contrast::ThresholdType;

/// Minimum allowed hysteresis threshold.
///
/// A low threshold of zero makes every pixel with any gradient a
/// candidate edge, flooding the mask with noise.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges with gradient hysteresis.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge. Pixels
/// with gradient magnitude at or above `high_threshold` seed edges;
/// those at or above `low_threshold` extend an edge they touch.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    crate::canny::canny(image, low, high)
}

/// Global cutoff: pixels strictly brighter than `cutoff` become 255,
/// everything else 0.
#[must_use = "returns the binary mask"]
pub fn threshold(image: &GrayImage, cutoff: u8) -> GrayImage {
    imageproc::contrast::threshold(image, cutoff, ThresholdType::Binary)
}

/// Global cutoff with inverted polarity: pixels at or below `cutoff`
/// (dark strokes) become 255, everything else 0.
#[must_use = "returns the binary mask"]
pub fn threshold_inverted(image: &GrayImage, cutoff: u8) -> GrayImage {
    imageproc::contrast::threshold(image, cutoff, ThresholdType::BinaryInverted)
}

//! Curve completion: bridge small gaps in dark strokes and solidify the
//! regions they enclose.

use image::GrayImage;
use imageproc::distance_transform::Norm;

use crate::config::CompletionConfig;
use crate::contour::{RetrievalMode, find_contours};
use crate::edge::threshold_inverted;
use crate::mask::{bitwise_and, bitwise_not, bitwise_or, fill_contours};
use crate::types::Dimensions;

/// Morphological closing with a square structuring element.
///
/// Repeating a `k x k` dilation `n` times and then the matching erosion
/// `n` times equals one closing with Chebyshev radius
/// `n * (k / 2)`, which is what [`CompletionConfig::reach`] reports.
#[must_use = "returns the closed mask"]
pub fn close(mask: &GrayImage, config: &CompletionConfig) -> GrayImage {
    let reach = u8::try_from(config.reach()).unwrap_or(u8::MAX);
    if reach == 0 {
        return mask.clone();
    }
    imageproc::morphology::close(mask, Norm::LInf, reach)
}

/// Complete curves in an already-smoothed grayscale image.
///
/// 1. Inverse threshold: dark strokes become foreground.
/// 2. Closing bridges gaps up to about twice the closing reach.
/// 3. Every outermost closed region is filled solid.
/// 4. The filled regions are merged with the stroke mask, the union is
///    inverted, and the result gates the smoothed intensities.
///
/// Completed regions come out black; everything else keeps its smoothed
/// intensity.
#[must_use = "returns the completed image"]
pub fn complete(smoothed: &GrayImage, config: &CompletionConfig) -> GrayImage {
    let strokes = threshold_inverted(smoothed, config.threshold);
    let closed = close(&strokes, config);

    let contours = find_contours(&closed, RetrievalMode::External);
    log::debug!("completion: {} closed region(s)", contours.len());

    let dimensions = Dimensions {
        width: smoothed.width(),
        height: smoothed.height(),
    };
    let filled = fill_contours(dimensions, &contours);
    let union = bitwise_or(&filled, &strokes);
    bitwise_and(&bitwise_not(&union), smoothed)
}

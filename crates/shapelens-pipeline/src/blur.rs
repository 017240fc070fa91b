//! Gaussian smoothing for noise reduction before thresholding or
//! gradient computation.
//!
//! Wraps [`imageproc::filter::separable_filter_equal`] with a small odd
//! 1D kernel applied along both axes. Edge pixels are extended outward.

use image::GrayImage;

use crate::config::SmoothingConfig;

/// Build a normalised 1D Gaussian kernel of odd length `size`.
///
/// With a non-positive `sigma`, kernels of length 1, 3, 5 and 7 use the
/// fixed binomial-like taps (`[1 4 6 4 1] / 16` for length 5). Other
/// lengths derive sigma as `0.3 * ((size - 1) / 2 - 1) + 0.8` and sample
/// the Gaussian.
#[must_use = "returns the kernel taps"]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => {
                return vec![
                    0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
                ];
            }
            _ => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3f32.mul_add(((size - 1) as f32).mul_add(0.5, -1.0), 0.8)
    };

    #[allow(clippy::cast_possible_wrap)]
    let half = (size / 2) as i32;
    let scale = -0.5 / (sigma * sigma);
    #[allow(clippy::cast_precision_loss)]
    let taps: Vec<f32> = (-half..=half)
        .map(|i| ((i * i) as f32 * scale).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Smooth a grayscale image with a separable Gaussian kernel.
///
/// A kernel size of 1 returns the image unchanged.
#[must_use = "returns the smoothed image"]
pub fn smooth(image: &GrayImage, config: &SmoothingConfig) -> GrayImage {
    if config.kernel_size <= 1 {
        return image.clone();
    }
    let kernel = gaussian_kernel(config.kernel_size, config.sigma);
    imageproc::filter::separable_filter_equal(image, &kernel)
}

//! Gradient edge detection with non-maximum suppression and hysteresis.
//!
//! Follows `imageproc::edges::canny` from `imageproc 0.26.0` with three
//! differences:
//!
//! 1. **No internal blur.** Callers smooth with [`crate::blur::smooth`]
//!    first.
//!
//! 2. **Border-safe hysteresis.** Neighbor coordinates are checked
//!    against the image bounds before access. Upstream computes `nx - 1`
//!    on `u32` and panics when the search reaches column or row 0
//!    (<https://github.com/image-rs/imageproc/issues/705>).
//!
//! 3. **All 8 neighbors.** Upstream hysteresis omits north and
//!    north-east (<https://github.com/image-rs/imageproc/pull/746>).

use std::f32::consts::PI;

use image::{GrayImage, Luma};
use imageproc::definitions::{HasBlack, HasWhite, Image};
use imageproc::filter::filter_clamped;
use imageproc::kernel;

/// Produce a binary edge mask (255 = edge) from an already-smoothed
/// grayscale image.
///
/// Expects `low_threshold <= high_threshold`; see
/// [`crate::edge::canny`] for the clamping wrapper.
#[must_use = "returns the binary edge mask"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = image.dimensions();

    // 1. Intensity of gradients.
    let gx: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_VERTICAL_3X3);
    let magnitude: Image<Luma<f32>> = Image::from_fn(width, height, |x, y| {
        let h = f32::from(gx.get_pixel(x, y)[0]);
        let v = f32::from(gy.get_pixel(x, y)[0]);
        Luma([h.hypot(v)])
    });

    // 2. Non-maximum suppression (thin edges to one ridge).
    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);

    // 3. Hysteresis to keep weak edges only when attached to strong ones.
    hysteresis(&thinned, low_threshold, high_threshold)
}

/// Gradient direction quantised to one of four axes through a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Axis {
    fn of(gx: f32, gy: f32) -> Self {
        let mut angle = gy.atan2(gx) * (180.0 / PI);
        if angle < 0.0 {
            angle += 180.0;
        }
        if !(22.5..157.5).contains(&angle) {
            Self::Horizontal
        } else if angle < 67.5 {
            Self::Diagonal
        } else if angle < 112.5 {
            Self::Vertical
        } else {
            Self::AntiDiagonal
        }
    }

    /// Offsets of the two neighbors along the gradient direction.
    const fn neighbors(self) -> [(i32, i32); 2] {
        match self {
            Self::Horizontal => [(-1, 0), (1, 0)],
            Self::Diagonal => [(1, 1), (-1, -1)],
            Self::Vertical => [(0, -1), (0, 1)],
            Self::AntiDiagonal => [(-1, 1), (1, -1)],
        }
    }
}

/// Keep only pixels that are local maxima along their gradient
/// direction. The one-pixel image border is always suppressed.
fn non_maximum_suppression(
    g: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (width, height) = g.dimensions();
    let mut out = Image::from_pixel(width, height, Luma([0.0]));
    if width < 3 || height < 3 {
        return out;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let axis = Axis::of(f32::from(gx.get_pixel(x, y)[0]), f32::from(gy.get_pixel(x, y)[0]));
            let pixel = g.get_pixel(x, y)[0];
            let is_max = axis.neighbors().iter().all(|&(dx, dy)| {
                let nx = x.saturating_add_signed(dx);
                let ny = y.saturating_add_signed(dy);
                pixel >= g.get_pixel(nx, ny)[0]
            });
            if is_max {
                out.put_pixel(x, y, Luma([pixel]));
            }
        }
    }
    out
}

/// Non-recursive flood from strong edges through weak ones.
fn hysteresis(input: &Image<Luma<f32>>, low_thresh: f32, high_thresh: f32) -> GrayImage {
    let (width, height) = input.dimensions();
    let mut out = Image::from_pixel(width, height, Luma::black());
    if width < 3 || height < 3 {
        return out;
    }
    let mut stack = Vec::new();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if input.get_pixel(x, y)[0] < high_thresh || out.get_pixel(x, y)[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma::white());
            stack.push((x, y));
            while let Some((nx, ny)) = stack.pop() {
                let neighbors = [
                    (nx + 1, ny),
                    (nx + 1, ny + 1),
                    (nx, ny + 1),
                    (nx.wrapping_sub(1), ny.wrapping_sub(1)),
                    (nx.wrapping_sub(1), ny),
                    (nx.wrapping_sub(1), ny + 1),
                    (nx, ny.wrapping_sub(1)),
                    (nx + 1, ny.wrapping_sub(1)),
                ];
                for (mx, my) in neighbors {
                    // wrapping_sub at 0 lands on u32::MAX, caught here too.
                    if mx >= width || my >= height {
                        continue;
                    }
                    if input.get_pixel(mx, my)[0] >= low_thresh && out.get_pixel(mx, my)[0] == 0 {
                        out.put_pixel(mx, my, Luma::white());
                        stack.push((mx, my));
                    }
                }
            }
        }
    }
    out
}

//! Binary mask arithmetic and contour filling.
//!
//! Masks are [`GrayImage`]s holding 0 or 255. The bitwise helpers work on
//! arbitrary intensities too, which is how a mask gates a grayscale image.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::map::{map_pixels, map_pixels2};
use imageproc::point::Point as PolygonPoint;

use crate::types::{Contour, Dimensions};

/// Per-pixel bitwise OR. Both images must have the same dimensions.
#[must_use = "returns the combined image"]
pub fn bitwise_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_pixels2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p.0[0] | q.0[0]]))
}

/// Per-pixel bitwise AND. Both images must have the same dimensions.
#[must_use = "returns the combined image"]
pub fn bitwise_and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_pixels2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p.0[0] & q.0[0]]))
}

/// Per-pixel bitwise NOT.
#[must_use = "returns the inverted image"]
pub fn bitwise_not(image: &GrayImage) -> GrayImage {
    map_pixels(image, |p: Luma<u8>| Luma([!p.0[0]]))
}

/// Render every contour as a solid region (interior and boundary = 255)
/// on a black canvas of the given size.
#[must_use = "returns the filled mask"]
pub fn fill_contours(dimensions: Dimensions, contours: &[Contour]) -> GrayImage {
    let mut canvas = GrayImage::new(dimensions.width, dimensions.height);
    for contour in contours {
        fill_contour(&mut canvas, contour);
    }
    canvas
}

fn fill_contour(canvas: &mut GrayImage, contour: &Contour) {
    let mut polygon: Vec<PolygonPoint<i32>> = contour
        .points()
        .iter()
        .map(|p| PolygonPoint::new(p.x, p.y))
        .collect();
    // The polygon routine rejects an explicitly closed loop.
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, &polygon, Luma([255]));
    }

    // Boundary pixels are always part of the region, even where the
    // polygon has zero width.
    let (width, height) = canvas.dimensions();
    for p in contour.points() {
        if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y))
            && x < width
            && y < height
        {
            canvas.put_pixel(x, y, Luma([255]));
        }
    }
}

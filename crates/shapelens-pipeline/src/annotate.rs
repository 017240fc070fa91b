//! Drawing polygon outlines and centroid markers onto RGB copies.
//!
//! Every function here returns a new image and leaves its input alone.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{BresenhamLineIter, draw_filled_circle_mut, draw_line_segment_mut};

use crate::config::{OutlineStyle, SymmetryConfig};
use crate::types::{Contour, PixelPoint, ShapeRecord, SymmetryRecord};

/// Draw a closed polyline with the given stroke.
///
/// Strokes wider than one pixel are stamped as filled discs along each
/// segment.
pub fn draw_closed_outline(canvas: &mut RgbImage, vertices: &[PixelPoint], style: &OutlineStyle) {
    let color = Rgb(style.color);
    if let [only] = vertices {
        stamp(canvas, *only, style.thickness, color);
        return;
    }
    for (a, b) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
        draw_segment(canvas, *a, *b, style.thickness, color);
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_segment(canvas: &mut RgbImage, a: PixelPoint, b: PixelPoint, thickness: u32, color: Rgb<u8>) {
    let start = (a.x as f32, a.y as f32);
    let end = (b.x as f32, b.y as f32);
    if thickness <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }
    for (x, y) in BresenhamLineIter::new(start, end) {
        stamp(canvas, PixelPoint::new(x, y), thickness, color);
    }
}

fn stamp(canvas: &mut RgbImage, at: PixelPoint, thickness: u32, color: Rgb<u8>) {
    let radius = i32::try_from(thickness / 2).unwrap_or(i32::MAX);
    draw_filled_circle_mut(canvas, (at.x, at.y), radius, color);
}

/// Copy `base` and outline every classified polygon on it.
#[must_use = "returns the annotated image"]
pub fn render_shapes(base: &RgbImage, records: &[ShapeRecord], style: &OutlineStyle) -> RgbImage {
    let mut canvas = base.clone();
    for record in records {
        draw_closed_outline(&mut canvas, &record.vertices, style);
    }
    canvas
}

/// Convert a mask to RGB, outline every contour on it and mark each
/// evaluated centroid with a filled disc.
///
/// Markers sit at the centroid truncated toward zero.
#[must_use = "returns the annotated image"]
pub fn render_symmetry(
    mask: &GrayImage,
    contours: &[Contour],
    records: &[SymmetryRecord],
    config: &SymmetryConfig,
) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(mask.clone()).to_rgb8();
    for contour in contours {
        draw_closed_outline(&mut canvas, contour.points(), &config.outline);
    }
    for record in records {
        let at = marker_position(record);
        draw_filled_circle_mut(
            &mut canvas,
            (at.x, at.y),
            config.marker_radius,
            Rgb(config.marker_color),
        );
    }
    canvas
}

/// Integer pixel for a record's centroid, truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn marker_position(record: &SymmetryRecord) -> PixelPoint {
    let c = record.result.centroid;
    PixelPoint::new(c.x as i32, c.y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GREEN;
    use crate::types::{BorderKind, Label, Point, Shape, SymmetryResult};

    fn square() -> Vec<PixelPoint> {
        vec![
            PixelPoint::new(5, 5),
            PixelPoint::new(5, 15),
            PixelPoint::new(15, 15),
            PixelPoint::new(15, 5),
        ]
    }

    #[test]
    fn thin_outline_is_closed() {
        let mut canvas = RgbImage::new(20, 20);
        let style = OutlineStyle {
            color: GREEN,
            thickness: 1,
        };
        draw_closed_outline(&mut canvas, &square(), &style);
        // Closing segment from the last vertex back to the first.
        assert_eq!(canvas.get_pixel(10, 5).0, GREEN);
        assert_eq!(canvas.get_pixel(5, 10).0, GREEN);
        assert_eq!(canvas.get_pixel(10, 10).0, [0, 0, 0]);
    }

    #[test]
    fn thick_outline_spreads_beyond_the_line() {
        let mut canvas = RgbImage::new(20, 20);
        draw_closed_outline(&mut canvas, &square(), &OutlineStyle::default());
        assert_eq!(canvas.get_pixel(10, 4).0, GREEN);
        assert_eq!(canvas.get_pixel(10, 6).0, GREEN);
        assert_eq!(canvas.get_pixel(10, 10).0, [0, 0, 0]);
    }

    #[test]
    fn render_shapes_leaves_base_untouched() {
        let base = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        let record = ShapeRecord {
            shape: Shape::Square,
            vertices: square(),
            contour: 0,
            perimeter: 40.0,
            label: Label {
                text: "Square".to_string(),
                anchor: PixelPoint::new(5, -5),
            },
        };
        let out = render_shapes(&base, &[record], &OutlineStyle::default());
        assert!(base.pixels().all(|p| p.0 == [255, 255, 255]));
        assert_eq!(out.get_pixel(5, 10).0, GREEN);
    }

    #[test]
    fn symmetry_marker_is_drawn_at_truncated_centroid() {
        let mask = GrayImage::new(30, 30);
        let contour = Contour::new(square(), BorderKind::Outer, None);
        let record = SymmetryRecord {
            contour: 0,
            result: SymmetryResult {
                centroid: Point::new(10.9, 10.2),
                symmetric: true,
            },
        };
        assert_eq!(marker_position(&record), PixelPoint::new(10, 10));
        let config = SymmetryConfig::default();
        let out = render_symmetry(&mask, &[contour], &[record], &config);
        assert_eq!(out.get_pixel(10, 10).0, config.marker_color);
        assert_eq!(out.get_pixel(5, 14).0, GREEN);
        assert_eq!(out.get_pixel(25, 25).0, [0, 0, 0]);
    }
}

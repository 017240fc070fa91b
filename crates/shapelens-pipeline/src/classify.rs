//! Polygon classification by vertex count.

use crate::config::ShapeConfig;
use crate::simplify::approximate_closed;
use crate::types::{BoundingBox, Contour, Label, PixelPoint, Shape, ShapeRecord};

/// Name a simplified polygon.
///
/// Three vertices make a triangle, five a pentagon, six a hexagon. Four
/// vertices make a square when the bounding box aspect ratio is within
/// `square_tolerance` of 1, otherwise a rectangle. Anything else,
/// including degenerate loops with fewer than three vertices, is called a
/// circle.
#[must_use]
pub fn classify(vertices: &[PixelPoint], square_tolerance: f64) -> Shape {
    match vertices.len() {
        3 => Shape::Triangle,
        4 => match BoundingBox::of(vertices) {
            Some(bbox)
                if (1.0 - square_tolerance..=1.0 + square_tolerance)
                    .contains(&bbox.aspect_ratio()) =>
            {
                Shape::Square
            }
            _ => Shape::Rectangle,
        },
        5 => Shape::Pentagon,
        6 => Shape::Hexagon,
        _ => Shape::Circle,
    }
}

/// Simplify one contour and classify the result.
///
/// The simplification tolerance is `epsilon_fraction` of the contour's
/// closed perimeter. The label sits `label_offset` pixels above the first
/// vertex.
#[must_use]
pub fn describe(index: usize, contour: &Contour, config: &ShapeConfig) -> ShapeRecord {
    let perimeter = contour.perimeter();
    let vertices = approximate_closed(contour.points(), config.epsilon_fraction * perimeter);
    let shape = classify(&vertices, config.square_tolerance);
    let anchor = vertices
        .first()
        .copied()
        .unwrap_or_default()
        .offset(0, -config.label_offset);
    ShapeRecord {
        shape,
        vertices,
        contour: index,
        perimeter,
        label: Label {
            text: shape.name().to_string(),
            anchor,
        },
    }
}

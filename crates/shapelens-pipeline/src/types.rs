//! Shared types for the shapelens analysis pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// single-channel results without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference annotated
/// results without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `DynamicImage`, the decoded input accepted by every entry
/// operation.
pub use image::DynamicImage;

/// A 2D point in continuous image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An integer pixel coordinate.
///
/// Signed so that annotation anchors may sit above or left of the image
/// (e.g. a label offset upward from a point on the top row).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a continuous [`Point`] at the pixel center.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Return this point shifted by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Whether a traced border separates a region from the background
/// surrounding it or from a hole inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    /// Boundary between a foreground region and the background around it.
    Outer,
    /// Boundary between a foreground region and a background hole it encloses.
    Hole,
}

/// One closed boundary loop traced from a binary mask.
///
/// Points are in traversal order; the last point connects back to the
/// first. `parent` indexes the enclosing border in the same contour list
/// (`None` for borders that touch the background surrounding the image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<PixelPoint>,
    kind: BorderKind,
    parent: Option<usize>,
}

impl Contour {
    /// Create a contour from its points, border kind and parent index.
    #[must_use]
    pub const fn new(points: Vec<PixelPoint>, kind: BorderKind, parent: Option<usize>) -> Self {
        Self {
            points,
            kind,
            parent,
        }
    }

    /// The boundary points in traversal order.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Outer border or hole border.
    #[must_use]
    pub const fn kind(&self) -> BorderKind {
        self.kind
    }

    /// Index of the enclosing contour, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Closed perimeter: sum of distances between consecutive points,
    /// including the closing segment from the last point to the first.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        closed_perimeter(&self.points)
    }

    pub(crate) const fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }
}

/// Closed perimeter of a point loop.
#[must_use]
pub fn closed_perimeter(points: &[PixelPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.to_point().distance(b.to_point()))
        .sum()
}

/// Inclusive axis-aligned pixel bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left-most column.
    pub x: i32,
    /// Top-most row.
    pub y: i32,
    /// Number of columns covered (`max_x - min_x + 1`).
    pub width: u32,
    /// Number of rows covered (`max_y - min_y + 1`).
    pub height: u32,
}

impl BoundingBox {
    /// Bounding box of a set of pixel points, or `None` if empty.
    #[must_use]
    pub fn of(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x.abs_diff(min_x) + 1,
            height: max_y.abs_diff(min_y) + 1,
        })
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Whether a continuous point lies within the box expanded by `margin`.
    #[must_use]
    pub fn contains(&self, p: Point, margin: f64) -> bool {
        let right = f64::from(self.x) + f64::from(self.width) - 1.0;
        let bottom = f64::from(self.y) + f64::from(self.height) - 1.0;
        p.x >= f64::from(self.x) - margin
            && p.x <= right + margin
            && p.y >= f64::from(self.y) - margin
            && p.y <= bottom + margin
    }
}

/// Shape label assigned to a simplified polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Three vertices.
    Triangle,
    /// Four vertices with a near-unit bounding-box aspect ratio.
    Square,
    /// Four vertices otherwise.
    Rectangle,
    /// Five vertices.
    Pentagon,
    /// Six vertices.
    Hexagon,
    /// Any other vertex count: smooth curves, noisy or irregular outlines.
    Circle,
}

impl Shape {
    /// Human-readable label text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Triangle => "Triangle",
            Self::Square => "Square",
            Self::Rectangle => "Rectangle",
            Self::Pentagon => "Pentagon",
            Self::Hexagon => "Hexagon",
            Self::Circle => "Circle",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A text annotation for the front end to render.
///
/// Glyph rasterisation is left to the caller; the pipeline only decides
/// what to say and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Text to render.
    pub text: String,
    /// Baseline-left anchor in image coordinates.
    pub anchor: PixelPoint,
}

/// A classified polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Assigned label.
    pub shape: Shape,
    /// Simplified vertex loop, a subset of the source contour's points.
    pub vertices: Vec<PixelPoint>,
    /// Index of the source contour in [`ShapeDetection::contours`].
    pub contour: usize,
    /// Closed perimeter of the source contour.
    pub perimeter: f64,
    /// Shape name anchored above the first vertex.
    pub label: Label,
}

/// Centroid and symmetry verdict for one contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryResult {
    /// Area-weighted centroid of the contour polygon.
    pub centroid: Point,
    /// Whether every mirrored point pair lies within tolerance.
    pub symmetric: bool,
}

/// A [`SymmetryResult`] tied to the contour it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryRecord {
    /// Index of the contour in [`SymmetryDetection::contours`].
    pub contour: usize,
    /// Centroid and verdict.
    pub result: SymmetryResult,
}

/// Output of [`crate::detect_shapes`].
#[derive(Debug, Clone)]
pub struct ShapeDetection {
    /// Copy of the input with every polygon outline drawn on it.
    pub annotated: RgbImage,
    /// Contours that were classified, in discovery order.
    pub contours: Vec<Contour>,
    /// One record per contour, in the same order.
    pub records: Vec<ShapeRecord>,
}

impl ShapeDetection {
    /// Shape labels in contour discovery order, duplicates preserved.
    #[must_use]
    pub fn shapes(&self) -> Vec<Shape> {
        self.records.iter().map(|r| r.shape).collect()
    }

    /// Shape names in contour discovery order, duplicates preserved.
    #[must_use]
    pub fn shape_names(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.shape.name()).collect()
    }

    /// Text labels for the front end, one per record.
    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label.clone()).collect()
    }
}

/// Output of [`crate::find_symmetry`].
#[derive(Debug, Clone)]
pub struct SymmetryDetection {
    /// RGB copy of the thresholded mask with outlines, centroid markers
    /// drawn on it.
    pub annotated: RgbImage,
    /// External contours of the thresholded mask, in discovery order.
    pub contours: Vec<Contour>,
    /// One record per contour with non-zero area.
    pub records: Vec<SymmetryRecord>,
    /// "Symmetric" labels for the front end.
    pub labels: Vec<Label>,
}

/// Output of [`crate::analyze`]: all three views of one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Shape detection view.
    pub shapes: ShapeDetection,
    /// Symmetry view.
    pub symmetry: SymmetryDetection,
    /// Curve completion view.
    pub completed: GrayImage,
    /// Input dimensions.
    pub dimensions: Dimensions,
}

/// Why an input image was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InvalidImage {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The image has no pixels.
    #[error("image has zero width or height ({width}x{height})")]
    ZeroDimensions {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },

    /// Failed to decode the input bytes.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors that can occur during analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The input image cannot be analyzed.
    #[error("invalid image: {0}")]
    InvalidImage(#[from] InvalidImage),

    /// Analysis configuration is invalid.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

impl From<image::ImageError> for AnalysisError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidImage(InvalidImage::Decode(err))
    }
}

/// A contour that was skipped rather than analyzed.
///
/// Never fatal: the offending contour is dropped and analysis continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DegenerateContour {
    /// Fewer than three boundary points.
    #[error("contour has {0} point(s), need at least 3")]
    TooFewPoints(usize),

    /// The boundary encloses no area.
    #[error("contour encloses zero area")]
    ZeroArea,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pixel_point_offset_and_conversion() {
        let p = PixelPoint::new(4, 0).offset(0, -10);
        assert_eq!(p, PixelPoint::new(4, -10));
        assert_eq!(p.to_point(), Point::new(4.0, -10.0));
    }

    #[test]
    fn closed_perimeter_includes_closing_segment() {
        let square = [
            PixelPoint::new(0, 0),
            PixelPoint::new(0, 10),
            PixelPoint::new(10, 10),
            PixelPoint::new(10, 0),
        ];
        assert!((closed_perimeter(&square) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn closed_perimeter_of_tiny_loops() {
        assert!(closed_perimeter(&[]).abs() < f64::EPSILON);
        assert!(closed_perimeter(&[PixelPoint::new(3, 3)]).abs() < f64::EPSILON);
        // Two points: out and back.
        let two = [PixelPoint::new(0, 0), PixelPoint::new(3, 4)];
        assert!((closed_perimeter(&two) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let bbox = BoundingBox::of(&[
            PixelPoint::new(2, 3),
            PixelPoint::new(11, 3),
            PixelPoint::new(6, 7),
        ])
        .unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 2,
                y: 3,
                width: 10,
                height: 5
            }
        );
        assert!((bbox.aspect_ratio() - 2.0).abs() < f64::EPSILON);
        assert!(bbox.contains(Point::new(11.0, 7.0), 0.0));
        assert!(!bbox.contains(Point::new(11.5, 7.0), 0.0));
        assert!(bbox.contains(Point::new(11.5, 7.0), 1.0));
    }

    #[test]
    fn bounding_box_of_empty_is_none() {
        assert!(BoundingBox::of(&[]).is_none());
    }

    #[test]
    fn shape_names_match_display() {
        for shape in [
            Shape::Triangle,
            Shape::Square,
            Shape::Rectangle,
            Shape::Pentagon,
            Shape::Hexagon,
            Shape::Circle,
        ] {
            assert_eq!(shape.to_string(), shape.name());
        }
    }

    #[test]
    fn error_display() {
        let err = AnalysisError::from(InvalidImage::ZeroDimensions {
            width: 0,
            height: 12,
        });
        assert_eq!(
            err.to_string(),
            "invalid image: image has zero width or height (0x12)"
        );
        let err = AnalysisError::from(InvalidImage::EmptyInput);
        assert_eq!(err.to_string(), "invalid image: input image data is empty");
        assert_eq!(
            DegenerateContour::TooFewPoints(2).to_string(),
            "contour has 2 point(s), need at least 3"
        );
    }

    #[test]
    fn shape_record_serde_round_trip() {
        let record = ShapeRecord {
            shape: Shape::Pentagon,
            vertices: vec![PixelPoint::new(1, 2), PixelPoint::new(3, 4)],
            contour: 7,
            perimeter: 12.5,
            label: Label {
                text: "Pentagon".to_string(),
                anchor: PixelPoint::new(1, -8),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ShapeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}

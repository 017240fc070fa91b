//! Area-weighted centroids and a mirrored-pair symmetry heuristic.
//!
//! The centroid is the first-order moment of the polygon through the
//! contour's pixel centers, computed with exact integer cross products.
//!
//! The symmetry test pairs point `i` with point `(n - i) mod n` along the
//! traversal and requires both coordinates of every pair to agree within
//! a tolerance. This compares the two walks away from the start pixel in
//! opposite directions; it holds for thin or compact outlines whose walks
//! stay close together. Points are not reflected about the centroid.

use crate::types::{DegenerateContour, PixelPoint, Point, SymmetryResult};

/// Signed double area and first moments of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Moments {
    /// Twice the signed area.
    double_area: i64,
    /// Six times the signed area times the centroid x.
    sum_x: i64,
    /// Six times the signed area times the centroid y.
    sum_y: i64,
}

impl Moments {
    fn of(points: &[PixelPoint]) -> Self {
        let mut moments = Self {
            double_area: 0,
            sum_x: 0,
            sum_y: 0,
        };
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            let (x0, y0) = (i64::from(a.x), i64::from(a.y));
            let (x1, y1) = (i64::from(b.x), i64::from(b.y));
            let cross = x0 * y1 - x1 * y0;
            moments.double_area += cross;
            moments.sum_x += (x0 + x1) * cross;
            moments.sum_y += (y0 + y1) * cross;
        }
        moments
    }
}

/// Area-weighted centroid of the polygon through `points`.
///
/// Orientation does not matter: the signed area cancels.
///
/// # Errors
///
/// Returns [`DegenerateContour::TooFewPoints`] for fewer than three
/// points and [`DegenerateContour::ZeroArea`] when the polygon encloses
/// no area (e.g. a one-pixel-wide line traced out and back).
pub fn centroid(points: &[PixelPoint]) -> Result<Point, DegenerateContour> {
    if points.len() < 3 {
        return Err(DegenerateContour::TooFewPoints(points.len()));
    }
    let moments = Moments::of(points);
    if moments.double_area == 0 {
        return Err(DegenerateContour::ZeroArea);
    }
    #[allow(clippy::cast_precision_loss)]
    let (area, sum_x, sum_y) = (
        moments.double_area as f64,
        moments.sum_x as f64,
        moments.sum_y as f64,
    );
    Ok(Point::new(sum_x / (3.0 * area), sum_y / (3.0 * area)))
}

/// Whether every mirrored pair `(i, (n - i) mod n)` differs by at most
/// `tolerance` on both axes. Stops at the first failing pair.
#[must_use]
pub fn is_symmetric(points: &[PixelPoint], tolerance: i32) -> bool {
    let n = points.len();
    (1..n).all(|i| {
        let a = points[i];
        let b = points[n - i];
        (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
    })
}

/// Centroid and symmetry verdict for one contour.
///
/// # Errors
///
/// Propagates [`centroid`] errors; such contours are skipped by callers.
pub fn evaluate(points: &[PixelPoint], tolerance: i32) -> Result<SymmetryResult, DegenerateContour> {
    Ok(SymmetryResult {
        centroid: centroid(points)?,
        symmetric: is_symmetric(points, tolerance),
    })
}

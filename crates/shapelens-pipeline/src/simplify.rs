//! Closed-polygon simplification using the Ramer-Douglas-Peucker
//! algorithm.
//!
//! A traced contour is a closed loop with no natural endpoints, so the
//! loop is first split at two far-apart points and each half is
//! simplified with ordinary RDP. A second pass then removes any vertex
//! that sits within tolerance of the chord joining its neighbors.

use crate::types::{PixelPoint, Point};

/// Number of farthest-point hops used to pick the split pair.
const SPLIT_ITERATIONS: usize = 3;

/// Simplify a closed point loop.
///
/// Returns a subset of `points` in loop order, starting from the kept
/// point with the lowest index. Every removed point lies within
/// `epsilon` of the polygon edge that replaced it, and no kept vertex
/// lies within `epsilon` of the chord joining its neighbors unless the
/// polygon is already down to three vertices.
///
/// Loops with fewer than 3 points are returned unchanged. A loop whose
/// points all lie within `epsilon` of each other collapses to a single
/// point.
#[must_use = "returns the simplified vertex loop"]
pub fn approximate_closed(points: &[PixelPoint], epsilon: f64) -> Vec<PixelPoint> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let Some((a, b)) = split_pair(points, epsilon) else {
        return vec![points[0]];
    };

    // Rotate so the loop starts at `a` and close it by repeating `a`.
    let ring: Vec<Point> = (0..=n).map(|i| points[(a + i) % n].to_point()).collect();
    let split = (b + n - a) % n;

    let mut kept = vec![false; n + 1];
    kept[0] = true;
    kept[split] = true;
    rdp_recurse(&ring, 0, split, epsilon, &mut kept);
    rdp_recurse(&ring, split, n, epsilon, &mut kept);

    let mut indices: Vec<usize> = (0..n).filter(|&i| kept[i]).map(|i| (a + i) % n).collect();
    indices.sort_unstable();
    let vertices: Vec<PixelPoint> = indices.into_iter().map(|i| points[i]).collect();
    drop_flat_vertices(vertices, epsilon)
}

/// Pick two loop indices far apart from each other by repeatedly
/// hopping to the farthest point. `None` when the whole loop fits
/// within `epsilon`.
fn split_pair(points: &[PixelPoint], epsilon: f64) -> Option<(usize, usize)> {
    let (mut start, mut end) = (0, 0);
    for _ in 0..SPLIT_ITERATIONS {
        let origin = points[start].to_point();
        let mut max_dist_sq = 0.0;
        for (i, p) in points.iter().enumerate() {
            let d = origin.distance_squared(p.to_point());
            if d > max_dist_sq {
                max_dist_sq = d;
                end = i;
            }
        }
        if max_dist_sq <= epsilon * epsilon {
            return None;
        }
        (start, end) = (end, start);
    }
    Some((end, start))
}

/// Repeatedly remove the first vertex closer than `epsilon` to the chord
/// between its neighbors, stopping at three vertices.
fn drop_flat_vertices(mut vertices: Vec<PixelPoint>, epsilon: f64) -> Vec<PixelPoint> {
    while vertices.len() > 3 {
        let n = vertices.len();
        let flat = (0..n).find(|&i| {
            let prev = vertices[(i + n - 1) % n].to_point();
            let next = vertices[(i + 1) % n].to_point();
            perpendicular_distance(vertices[i].to_point(), prev, next) < epsilon
        });
        match flat {
            Some(i) => {
                vertices.remove(i);
            }
            None => break,
        }
    }
    vertices
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

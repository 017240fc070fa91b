//! Contour tracing: extract closed boundary loops from a binary mask.
//!
//! This module defines the [`ContourTracer`] trait for pluggable tracing
//! algorithms and the [`ContourTracerKind`] enum for selecting one at
//! runtime.
//!
//! # Border following
//!
//! The only tracer is Suzuki-Abe topological border following via
//! [`imageproc::contours::find_contours`]. The mask is first framed with
//! one background pixel on every side so that foreground touching the
//! image edge still starts an outer border; coordinates are shifted back
//! afterwards. Borders come out in raster order of their starting pixel,
//! each with its kind (outer or hole) and the index of its enclosing
//! border.
//!
//! Outer borders are traversed counter-clockwise on screen (down the
//! left side first), starting at their top-left pixel.

use image::GrayImage;
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};

use crate::types::{BorderKind, BoundingBox, Contour, DegenerateContour, PixelPoint};

/// Which borders to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalMode {
    /// Every border with its full nesting hierarchy.
    #[default]
    Tree,
    /// Only outermost outer borders (no enclosing border). Nested
    /// regions and holes are discarded.
    External,
}

/// How many boundary pixels a traced contour keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourApproximation {
    /// Every boundary pixel.
    None,
    /// Only the end points of horizontal, vertical and diagonal runs.
    #[default]
    Simple,
}

impl ContourApproximation {
    /// Apply this approximation to a traced contour.
    #[must_use = "returns the approximated contour"]
    pub fn apply(self, contour: Contour) -> Contour {
        match self {
            Self::None => contour,
            Self::Simple => {
                let points = compress_runs(contour.points());
                Contour::new(points, contour.kind(), contour.parent())
            }
        }
    }
}

/// Keep the start point and every point where the step direction
/// changes. The loop is treated as closed, so the last point is compared
/// against the step back to the start.
#[must_use = "returns the compressed points"]
pub fn compress_runs(points: &[PixelPoint]) -> Vec<PixelPoint> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let delta = |a: PixelPoint, b: PixelPoint| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            i == 0 || delta(prev, here) != delta(here, next)
        })
        .map(|i| points[i])
        .collect()
}

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContourTracerKind {
    /// Suzuki-Abe topological border following.
    #[default]
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (non-zero = foreground).
/// Output: closed contours in discovery order. Contours with fewer than
/// three points are dropped and parent indices refer to the returned
/// list.
pub trait ContourTracer {
    /// Trace contours in the given binary mask.
    fn trace(&self, mask: &GrayImage, mode: RetrievalMode) -> Vec<Contour>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &GrayImage, mode: RetrievalMode) -> Vec<Contour> {
        match *self {
            Self::BorderFollowing => {
                let borders = trace_border_following(mask);
                let borders = match mode {
                    RetrievalMode::Tree => borders,
                    RetrievalMode::External => {
                        let keep: Vec<bool> = borders
                            .iter()
                            .map(|c| c.kind() == BorderKind::Outer && c.parent().is_none())
                            .collect();
                        reindex(borders, &keep)
                    }
                };
                retain_traceable(borders)
            }
        }
    }
}

/// Trace every border of `mask` with the default tracer.
#[must_use = "returns the traced contours"]
pub fn find_contours(mask: &GrayImage, mode: RetrievalMode) -> Vec<Contour> {
    ContourTracerKind::default().trace(mask, mode)
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`
/// on a background-framed copy of `mask`.
///
/// Returns every border, including single-pixel ones, in image
/// coordinates with parent indices into the returned list.
fn trace_border_following(mask: &GrayImage) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    image::imageops::replace(&mut framed, mask, 1, 1);

    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(&framed);

    contours
        .into_iter()
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| PixelPoint::new(p.x - 1, p.y - 1))
                .collect();
            let kind = match c.border_type {
                BorderType::Outer => BorderKind::Outer,
                BorderType::Hole => BorderKind::Hole,
            };
            Contour::new(points, kind, c.parent)
        })
        .collect()
}

/// Drop contours with fewer than three points and rewire parents to the
/// nearest surviving ancestor.
fn retain_traceable(contours: Vec<Contour>) -> Vec<Contour> {
    let keep: Vec<bool> = contours
        .iter()
        .map(|c| {
            if c.len() >= 3 {
                return true;
            }
            if !c.is_empty() {
                log::debug!("dropping contour: {}", DegenerateContour::TooFewPoints(c.len()));
            }
            false
        })
        .collect();
    reindex(contours, &keep)
}

/// Keep the contours flagged in `keep`, re-parenting each survivor to its
/// nearest surviving ancestor.
fn reindex(contours: Vec<Contour>, keep: &[bool]) -> Vec<Contour> {
    let mut new_index = vec![None; contours.len()];
    let mut next = 0;
    for (i, &k) in keep.iter().enumerate() {
        if k {
            new_index[i] = Some(next);
            next += 1;
        }
    }

    let parents: Vec<Option<usize>> = contours.iter().map(Contour::parent).collect();
    let surviving_ancestor = |mut parent: Option<usize>| {
        while let Some(p) = parent {
            if let Some(mapped) = new_index[p] {
                return Some(mapped);
            }
            parent = parents[p];
        }
        None
    };

    contours
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(mut c, _)| {
            let parent = surviving_ancestor(c.parent());
            c.set_parent(parent);
            c
        })
        .collect()
}

/// Chebyshev distance within which a hole border counts as the inner
/// face of its parent's stroke.
pub const STROKE_FACE_REACH: u32 = 3;

/// Fold the inner face of thin strokes into the outer face.
///
/// An edge map draws each boundary as a band a pixel or two wide, and
/// border following yields both an outer border and a hole border for
/// it. A hole whose every point lies within `reach` (Chebyshev) of its
/// outer parent's points is such an inner face and is removed; its
/// children are re-parented to the outer border.
#[must_use = "returns the merged contours"]
pub fn merge_stroke_faces(contours: Vec<Contour>, reach: u32) -> Vec<Contour> {
    let keep: Vec<bool> = contours
        .iter()
        .map(|c| {
            let Some(parent) = c.parent().and_then(|p| contours.get(p)) else {
                return true;
            };
            !(c.kind() == BorderKind::Hole
                && parent.kind() == BorderKind::Outer
                && hugs(c.points(), parent.points(), reach))
        })
        .collect();
    let merged = keep.iter().filter(|k| !**k).count();
    if merged > 0 {
        log::debug!("merged {merged} stroke face(s)");
    }
    reindex(contours, &keep)
}

/// Whether every point of `inner` lies within `reach` of some point of
/// `outer`.
fn hugs(inner: &[PixelPoint], outer: &[PixelPoint], reach: u32) -> bool {
    let Some(bbox) = BoundingBox::of(outer) else {
        return false;
    };
    #[allow(clippy::cast_possible_wrap)]
    let r = reach as i32;
    let origin = PixelPoint::new(bbox.x - r, bbox.y - r);
    let width = bbox.width as usize + 2 * reach as usize;
    let height = bbox.height as usize + 2 * reach as usize;
    let mut near = vec![false; width * height];

    let cell = |p: PixelPoint| -> Option<usize> {
        let x = usize::try_from(p.x - origin.x).ok()?;
        let y = usize::try_from(p.y - origin.y).ok()?;
        (x < width && y < height).then_some(y * width + x)
    };

    for p in outer {
        for dy in -r..=r {
            for dx in -r..=r {
                if let Some(i) = cell(p.offset(dx, dy)) {
                    near[i] = true;
                }
            }
        }
    }
    inner.iter().all(|&p| cell(p).is_some_and(|i| near[i]))
}

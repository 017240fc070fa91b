//! Tunable parameters for the three analysis operations.
//!
//! Every numeric constant the algorithms depend on lives here as a named
//! field with a documented default. Defaults are also exposed as
//! associated constants so front ends (e.g. CLI flag defaults) cannot
//! silently diverge from the pipeline.

use serde::{Deserialize, Serialize};

use crate::contour::ContourApproximation;
use crate::types::AnalysisError;

/// An RGB color for annotation drawing.
pub type Color = [u8; 3];

/// Highlight green used for outlines.
pub const GREEN: Color = [0, 255, 0];

/// Marker red used for centroid dots.
pub const RED: Color = [255, 0, 0];

/// Gaussian smoothing applied after grayscale conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Side length of the square kernel. Must be odd. `1` disables
    /// smoothing.
    pub kernel_size: u32,

    /// Gaussian sigma. Non-positive values derive sigma from
    /// `kernel_size` (for the default 5-tap kernel this is the binomial
    /// `[1 4 6 4 1] / 16`).
    pub sigma: f32,
}

impl SmoothingConfig {
    /// Default kernel side length.
    pub const DEFAULT_KERNEL_SIZE: u32 = 5;
    /// Default sigma (derive from kernel size).
    pub const DEFAULT_SIGMA: f32 = 0.0;

    /// No smoothing at all.
    pub const NONE: Self = Self {
        kernel_size: 1,
        sigma: 0.0,
    };

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "smoothing kernel size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        if !self.sigma.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "smoothing sigma must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kernel_size: Self::DEFAULT_KERNEL_SIZE,
            sigma: Self::DEFAULT_SIGMA,
        }
    }
}

/// How polygon outlines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub thickness: u32,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            color: GREEN,
            thickness: 2,
        }
    }
}

/// Parameters for [`crate::detect_shapes`].
///
/// # Canny threshold invariants
///
/// Both thresholds are clamped to at least
/// [`edge::MIN_THRESHOLD`](crate::edge::MIN_THRESHOLD) and `canny_low` is
/// clamped to at most `canny_high` inside [`crate::edge::canny`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Smoothing before gradient computation.
    pub smoothing: SmoothingConfig,

    /// Hysteresis low threshold: weak edges are kept only when connected
    /// to a strong edge.
    pub canny_low: f32,

    /// Hysteresis high threshold: gradient magnitudes at or above this
    /// value seed edges.
    pub canny_high: f32,

    /// Simplification tolerance as a fraction of each contour's perimeter.
    pub epsilon_fraction: f64,

    /// Half-width of the aspect-ratio band that counts as square:
    /// `w / h` in `[1 - square_tolerance, 1 + square_tolerance]`.
    pub square_tolerance: f64,

    /// Classify each closed edge curve once by folding the inner face of
    /// a thin edge stroke into its outer face.
    pub merge_stroke_faces: bool,

    /// Outline drawing style.
    pub outline: OutlineStyle,

    /// Vertical distance from a polygon's first vertex up to its label.
    pub label_offset: i32,
}

impl ShapeConfig {
    /// Default hysteresis low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default hysteresis high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default simplification tolerance (2% of the perimeter).
    pub const DEFAULT_EPSILON_FRACTION: f64 = 0.02;
    /// Default square aspect-ratio band half-width.
    pub const DEFAULT_SQUARE_TOLERANCE: f64 = 0.05;
    /// Default label offset above the first vertex.
    pub const DEFAULT_LABEL_OFFSET: i32 = 10;

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.smoothing.validate()?;
        if !self.canny_low.is_finite() || !self.canny_high.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "canny thresholds must be finite".to_string(),
            ));
        }
        if !self.epsilon_fraction.is_finite() || self.epsilon_fraction < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "epsilon fraction must be non-negative, got {}",
                self.epsilon_fraction
            )));
        }
        if !self.square_tolerance.is_finite() || !(0.0..1.0).contains(&self.square_tolerance) {
            return Err(AnalysisError::InvalidConfig(format!(
                "square tolerance must be in [0, 1), got {}",
                self.square_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            epsilon_fraction: Self::DEFAULT_EPSILON_FRACTION,
            square_tolerance: Self::DEFAULT_SQUARE_TOLERANCE,
            merge_stroke_faces: true,
            outline: OutlineStyle::default(),
            label_offset: Self::DEFAULT_LABEL_OFFSET,
        }
    }
}

/// Parameters for [`crate::find_symmetry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryConfig {
    /// Smoothing before thresholding. Off by default: symmetry works on
    /// the raw intensities.
    pub smoothing: SmoothingConfig,

    /// Global cutoff: intensities strictly above become foreground.
    pub threshold: u8,

    /// Largest allowed per-axis difference between mirrored points.
    pub tolerance: i32,

    /// Which boundary points are paired. The default keeps only the end
    /// points of straight and diagonal runs.
    pub approximation: ContourApproximation,

    /// Outline drawing style.
    pub outline: OutlineStyle,

    /// Centroid marker radius.
    pub marker_radius: i32,

    /// Centroid marker color.
    pub marker_color: Color,

    /// Offset from the centroid to the "Symmetric" label anchor.
    pub label_offset: (i32, i32),
}

impl SymmetryConfig {
    /// Default global cutoff.
    pub const DEFAULT_THRESHOLD: u8 = 127;
    /// Default mirrored-pair tolerance in pixels.
    pub const DEFAULT_TOLERANCE: i32 = 10;
    /// Default centroid marker radius.
    pub const DEFAULT_MARKER_RADIUS: i32 = 5;
    /// Default label offset from the centroid.
    pub const DEFAULT_LABEL_OFFSET: (i32, i32) = (-30, -10);

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.smoothing.validate()?;
        if self.tolerance < 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "symmetry tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::NONE,
            threshold: Self::DEFAULT_THRESHOLD,
            tolerance: Self::DEFAULT_TOLERANCE,
            approximation: ContourApproximation::Simple,
            outline: OutlineStyle::default(),
            marker_radius: Self::DEFAULT_MARKER_RADIUS,
            marker_color: RED,
            label_offset: Self::DEFAULT_LABEL_OFFSET,
        }
    }
}

/// Parameters for [`crate::complete_curves`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Smoothing before thresholding.
    pub smoothing: SmoothingConfig,

    /// Global cutoff: intensities at or below become foreground
    /// (inverted polarity, dark strokes on a light background).
    pub threshold: u8,

    /// Side length of the square structuring element. Must be odd.
    pub kernel_size: u32,

    /// How many times dilation (then erosion) is applied.
    pub iterations: u32,
}

impl CompletionConfig {
    /// Default global cutoff.
    pub const DEFAULT_THRESHOLD: u8 = 127;
    /// Default structuring element side length.
    pub const DEFAULT_KERNEL_SIZE: u32 = 5;
    /// Default closing iteration count.
    pub const DEFAULT_ITERATIONS: u32 = 3;

    /// Chebyshev radius covered by the full closing: each iteration grows
    /// a region by half the structuring element.
    #[must_use]
    pub const fn reach(&self) -> u32 {
        self.iterations * (self.kernel_size / 2)
    }

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.smoothing.validate()?;
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "structuring element size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        if self.iterations == 0 {
            return Err(AnalysisError::InvalidConfig(
                "closing needs at least one iteration".to_string(),
            ));
        }
        if u8::try_from(self.reach()).is_err() {
            return Err(AnalysisError::InvalidConfig(format!(
                "closing reach {} exceeds 255 pixels",
                self.reach()
            )));
        }
        Ok(())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            threshold: Self::DEFAULT_THRESHOLD,
            kernel_size: Self::DEFAULT_KERNEL_SIZE,
            iterations: Self::DEFAULT_ITERATIONS,
        }
    }
}

/// Parameters for [`crate::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Shape detection parameters.
    pub shapes: ShapeConfig,
    /// Symmetry parameters.
    pub symmetry: SymmetryConfig,
    /// Curve completion parameters.
    pub completion: CompletionConfig,
}

impl AnalysisConfig {
    /// Check every sub-configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError::InvalidConfig`] found.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.shapes.validate()?;
        self.symmetry.validate()?;
        self.completion.validate()
    }
}

//! shapelens-pipeline: geometric analysis of a single still image (sans-IO).
//!
//! Three independent views of one decoded image:
//!
//! - [`detect_shapes`]: grayscale -> smoothing -> gradient edges ->
//!   contour tracing -> polygon simplification -> classification.
//! - [`find_symmetry`]: grayscale -> global threshold -> outer contours ->
//!   run compression -> centroid and mirrored-pair symmetry test.
//! - [`complete_curves`]: grayscale -> smoothing -> inverse threshold ->
//!   closing -> region fill -> recombination with the smoothed image.
//!
//! [`analyze`] runs all three. This crate has **no I/O dependencies**: it
//! takes an in-memory [`DynamicImage`] and returns new buffers plus
//! structured records. File handling lives in the `shapelens` binary.

pub mod annotate;
pub mod blur;
pub mod canny;
pub mod classify;
pub mod complete;
pub mod config;
pub mod contour;
pub mod edge;
pub mod grayscale;
pub mod mask;
pub mod simplify;
pub mod symmetry;
pub mod types;

pub use config::{
    AnalysisConfig, CompletionConfig, OutlineStyle, ShapeConfig, SmoothingConfig, SymmetryConfig,
};
pub use contour::{ContourApproximation, ContourTracer, ContourTracerKind, RetrievalMode};
pub use grayscale::decode;
pub use types::{
    Analysis, AnalysisError, BorderKind, BoundingBox, Contour, DegenerateContour, Dimensions,
    DynamicImage, GrayImage, InvalidImage, Label, PixelPoint, Point, RgbImage, Shape,
    ShapeDetection, ShapeRecord, SymmetryDetection, SymmetryRecord, SymmetryResult,
};

/// Outline and classify every closed edge curve in `image`.
///
/// # Steps
///
/// 1. Validate and convert to grayscale
/// 2. Gaussian smoothing
/// 3. Gradient edge detection with hysteresis
/// 4. Hierarchical contour tracing
/// 5. Optional merge of stroke faces
/// 6. Closed RDP simplification and classification per contour
/// 7. Outlines drawn onto an RGB copy of the input
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidImage`] for an image without pixels and
/// [`AnalysisError::InvalidConfig`] if `config` fails validation.
pub fn detect_shapes(
    image: &DynamicImage,
    config: &ShapeConfig,
) -> Result<ShapeDetection, AnalysisError> {
    config.validate()?;
    grayscale::validate(image)?;

    let gray = grayscale::to_intensity(image);
    let smoothed = blur::smooth(&gray, &config.smoothing);
    let edges = edge::canny(&smoothed, config.canny_low, config.canny_high);

    let contours = contour::find_contours(&edges, RetrievalMode::Tree);
    log::debug!("shapes: traced {} contour(s)", contours.len());
    let contours = if config.merge_stroke_faces {
        contour::merge_stroke_faces(contours, contour::STROKE_FACE_REACH)
    } else {
        contours
    };

    let records: Vec<ShapeRecord> = contours
        .iter()
        .enumerate()
        .map(|(i, c)| classify::describe(i, c, config))
        .collect();
    log::debug!("shapes: classified {} polygon(s)", records.len());

    let annotated = annotate::render_shapes(&image.to_rgb8(), &records, &config.outline);
    Ok(ShapeDetection {
        annotated,
        contours,
        records,
    })
}

/// Compute centroids and the mirrored-pair symmetry verdict for every
/// outermost region of the thresholded image.
///
/// Contours are reduced with [`SymmetryConfig::approximation`] before
/// pairing, so with the default only run end points take part.
///
/// Contours enclosing zero area are skipped and get no record.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidImage`] for an image without pixels and
/// [`AnalysisError::InvalidConfig`] if `config` fails validation.
pub fn find_symmetry(
    image: &DynamicImage,
    config: &SymmetryConfig,
) -> Result<SymmetryDetection, AnalysisError> {
    config.validate()?;
    grayscale::validate(image)?;

    let gray = grayscale::to_intensity(image);
    let smoothed = blur::smooth(&gray, &config.smoothing);
    let mask = edge::threshold(&smoothed, config.threshold);
    let contours: Vec<Contour> = contour::find_contours(&mask, RetrievalMode::External)
        .into_iter()
        .map(|c| config.approximation.apply(c))
        .collect();

    let mut records = Vec::new();
    for (i, c) in contours.iter().enumerate() {
        match symmetry::evaluate(c.points(), config.tolerance) {
            Ok(result) => records.push(SymmetryRecord {
                contour: i,
                result,
            }),
            Err(reason) => log::debug!("symmetry: skipping contour {i}: {reason}"),
        }
    }
    log::debug!(
        "symmetry: {} of {} contour(s) evaluated",
        records.len(),
        contours.len()
    );

    let (dx, dy) = config.label_offset;
    let labels = records
        .iter()
        .filter(|r| r.result.symmetric)
        .map(|r| Label {
            text: "Symmetric".to_string(),
            anchor: annotate::marker_position(r).offset(dx, dy),
        })
        .collect();

    let annotated = annotate::render_symmetry(&mask, &contours, &records, config);
    Ok(SymmetryDetection {
        annotated,
        contours,
        records,
        labels,
    })
}

/// Close short gaps in dark outlines and darken the regions they enclose.
///
/// Returns a single-channel image with the input's dimensions.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidImage`] for an image without pixels and
/// [`AnalysisError::InvalidConfig`] if `config` fails validation.
pub fn complete_curves(
    image: &DynamicImage,
    config: &CompletionConfig,
) -> Result<GrayImage, AnalysisError> {
    config.validate()?;
    grayscale::validate(image)?;

    let gray = grayscale::to_intensity(image);
    let smoothed = blur::smooth(&gray, &config.smoothing);
    Ok(complete::complete(&smoothed, config))
}

/// Run all three analyses on one image.
///
/// With the `rayon` feature the three branches run in parallel; the
/// results are identical either way.
///
/// # Errors
///
/// Returns the first error from validation or any branch.
pub fn analyze(image: &DynamicImage, config: &AnalysisConfig) -> Result<Analysis, AnalysisError> {
    config.validate()?;
    let dimensions = grayscale::validate(image)?;

    #[cfg(feature = "rayon")]
    let (shapes, (symmetry, completed)) = rayon::join(
        || detect_shapes(image, &config.shapes),
        || {
            rayon::join(
                || find_symmetry(image, &config.symmetry),
                || complete_curves(image, &config.completion),
            )
        },
    );

    #[cfg(not(feature = "rayon"))]
    let (shapes, (symmetry, completed)) = (
        detect_shapes(image, &config.shapes),
        (
            find_symmetry(image, &config.symmetry),
            complete_curves(image, &config.completion),
        ),
    );

    Ok(Analysis {
        shapes: shapes?,
        symmetry: symmetry?,
        completed: completed?,
        dimensions,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Luma;

    /// White filled square on black, like a scanned cut-out.
    fn square_image() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(100, 100, |x, y| {
            if (30..70).contains(&x) && (30..70).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        }))
    }

    #[test]
    fn detect_shapes_on_square() {
        let result = detect_shapes(&square_image(), &ShapeConfig::default()).unwrap();
        assert_eq!(result.shapes(), vec![Shape::Square]);
        assert_eq!(result.annotated.dimensions(), (100, 100));
        assert_eq!(result.labels().len(), 1);
        assert_eq!(result.records[0].contour, 0);
    }

    #[test]
    fn stroke_faces_are_classified_separately_when_merge_is_off() {
        let config = ShapeConfig {
            merge_stroke_faces: false,
            ..ShapeConfig::default()
        };
        let result = detect_shapes(&square_image(), &config).unwrap();
        assert!(result.records.len() >= 2);
        assert_eq!(result.contours[0].kind(), BorderKind::Outer);
        assert!(result.contours.iter().any(|c| c.kind() == BorderKind::Hole));
    }

    #[test]
    fn uniform_image_has_no_shapes() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 40, Luma([128])));
        let result = detect_shapes(&img, &ShapeConfig::default()).unwrap();
        assert!(result.records.is_empty());
        let symmetry = find_symmetry(&img, &SymmetryConfig::default()).unwrap();
        // 128 > 127: the whole frame is one region.
        assert_eq!(symmetry.contours.len(), 1);
        assert_eq!(symmetry.records.len(), 1);
    }

    #[test]
    fn square_centroid_is_its_center() {
        let result = find_symmetry(&square_image(), &SymmetryConfig::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        let c = result.records[0].result.centroid;
        assert!((c.x - 49.5).abs() < 1e-9 && (c.y - 49.5).abs() < 1e-9);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CompletionConfig {
            kernel_size: 4,
            ..CompletionConfig::default()
        };
        let result = complete_curves(&square_image(), &config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn analyze_matches_individual_operations() {
        let img = square_image();
        let config = AnalysisConfig::default();
        let all = analyze(&img, &config).unwrap();
        assert_eq!(
            all.dimensions,
            Dimensions {
                width: 100,
                height: 100
            }
        );
        let shapes = detect_shapes(&img, &config.shapes).unwrap();
        assert_eq!(all.shapes.records, shapes.records);
        assert_eq!(all.shapes.annotated, shapes.annotated);
        let completed = complete_curves(&img, &config.completion).unwrap();
        assert_eq!(all.completed, completed);
    }

    #[test]
    fn analyze_rejects_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            analyze(&img, &AnalysisConfig::default()),
            Err(AnalysisError::InvalidImage(InvalidImage::ZeroDimensions { .. }))
        ));
    }
}

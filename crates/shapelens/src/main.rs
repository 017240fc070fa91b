//! shapelens: detect shapes, annotate symmetry and complete curves in an
//! image file.
//!
//! Reads one image, runs the selected analyses and writes each derived
//! view as a PNG next to the chosen output prefix. A report of the shape
//! and symmetry records goes to stdout, either human-readable or as JSON.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin shapelens -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to see per-stage counts and skipped contours.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use shapelens_pipeline::{
    AnalysisConfig, AnalysisError, CompletionConfig, ContourApproximation, Dimensions, GrayImage,
    Label, RgbImage, ShapeConfig, ShapeRecord, SmoothingConfig, SymmetryConfig, SymmetryRecord,
};

/// Geometric analysis of a single still image.
///
/// Outlines and classifies polygons, marks centroids and reflective
/// symmetry, and closes small gaps in dark line art.
#[derive(Parser)]
#[command(name = "shapelens", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Analyses to run. Repeat to select several; all run by default.
    #[arg(long = "op", value_enum)]
    ops: Vec<Op>,

    /// Directory for the derived PNGs.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// File name prefix for the derived PNGs (defaults to the input stem).
    #[arg(long)]
    prefix: Option<String>,

    /// Skip writing images; only print the report.
    #[arg(long)]
    no_write: bool,

    /// Gaussian kernel size for shape detection and curve completion.
    #[arg(long, default_value_t = SmoothingConfig::DEFAULT_KERNEL_SIZE)]
    blur_kernel: u32,

    /// Gaussian sigma; zero or negative derives it from the kernel size.
    #[arg(long, default_value_t = SmoothingConfig::DEFAULT_SIGMA, allow_hyphen_values = true)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = ShapeConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = ShapeConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Simplification tolerance as a fraction of each contour's perimeter.
    #[arg(long, default_value_t = ShapeConfig::DEFAULT_EPSILON_FRACTION)]
    epsilon_fraction: f64,

    /// Allowed deviation of a quadrilateral's aspect ratio from 1 for it
    /// to count as a square.
    #[arg(long, default_value_t = ShapeConfig::DEFAULT_SQUARE_TOLERANCE)]
    square_tolerance: f64,

    /// Classify both faces of a thick edge stroke instead of merging them.
    #[arg(long)]
    no_merge_stroke_faces: bool,

    /// Global threshold for symmetry analysis.
    #[arg(long, default_value_t = SymmetryConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Per-axis pixel tolerance for mirrored point pairs.
    #[arg(long, default_value_t = SymmetryConfig::DEFAULT_TOLERANCE)]
    symmetry_tolerance: i32,

    /// Pair every boundary pixel in the symmetry test instead of only the
    /// end points of straight runs.
    #[arg(long)]
    pixel_contours: bool,

    /// Global threshold for curve completion (dark strokes at or below).
    #[arg(long, default_value_t = CompletionConfig::DEFAULT_THRESHOLD)]
    completion_threshold: u8,

    /// Closing structuring element side length (odd).
    #[arg(long, default_value_t = CompletionConfig::DEFAULT_KERNEL_SIZE)]
    close_kernel: u32,

    /// Closing iteration count.
    #[arg(long, default_value_t = CompletionConfig::DEFAULT_ITERATIONS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    close_iterations: u32,

    /// Output the report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Full analysis config as a JSON string.
    ///
    /// When provided, all other analysis parameter flags are ignored.
    /// The JSON must be a valid `AnalysisConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Analysis selection.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Op {
    /// Polygon outlines and shape labels.
    Shapes,
    /// Centroids and reflective symmetry.
    Symmetry,
    /// Gap closing and region completion.
    Completion,
}

/// Build an [`AnalysisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<AnalysisConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let smoothing = SmoothingConfig {
        kernel_size: cli.blur_kernel,
        sigma: cli.blur_sigma,
    };
    Ok(AnalysisConfig {
        shapes: ShapeConfig {
            smoothing,
            canny_low: cli.canny_low,
            canny_high: cli.canny_high,
            epsilon_fraction: cli.epsilon_fraction,
            square_tolerance: cli.square_tolerance,
            merge_stroke_faces: !cli.no_merge_stroke_faces,
            ..ShapeConfig::default()
        },
        symmetry: SymmetryConfig {
            threshold: cli.threshold,
            tolerance: cli.symmetry_tolerance,
            approximation: if cli.pixel_contours {
                ContourApproximation::None
            } else {
                ContourApproximation::Simple
            },
            ..SymmetryConfig::default()
        },
        completion: CompletionConfig {
            smoothing,
            threshold: cli.completion_threshold,
            kernel_size: cli.close_kernel,
            iterations: cli.close_iterations,
        },
    })
}

/// Everything printed for one run.
#[derive(Default, Serialize)]
struct Report {
    image: PathBuf,
    dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shapes: Option<ShapesReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    symmetry: Option<SymmetryReport>,
    outputs: Vec<PathBuf>,
}

#[derive(Serialize)]
struct ShapesReport {
    names: Vec<&'static str>,
    records: Vec<ShapeRecord>,
}

#[derive(Serialize)]
struct SymmetryReport {
    contours: usize,
    records: Vec<SymmetryRecord>,
    labels: Vec<Label>,
}

impl Report {
    fn text(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = write!(out, "Image: {}", self.image.display());
        if let Some(d) = self.dimensions {
            let _ = write!(out, " ({}x{})", d.width, d.height);
        }
        out.push('\n');

        if let Some(ref shapes) = self.shapes {
            let _ = writeln!(out, "\nShapes ({}):", shapes.records.len());
            for (i, r) in shapes.records.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {i:>3}  {:<10} vertices={:<3} perimeter={:.1}",
                    r.shape.name(),
                    r.vertices.len(),
                    r.perimeter,
                );
            }
        }

        if let Some(ref symmetry) = self.symmetry {
            let _ = writeln!(
                out,
                "\nSymmetry ({} of {} contour(s) evaluated):",
                symmetry.records.len(),
                symmetry.contours,
            );
            for r in &symmetry.records {
                let c = r.result.centroid;
                let _ = writeln!(
                    out,
                    "  {:>3}  centroid=({:.1}, {:.1}) {}",
                    r.contour,
                    c.x,
                    c.y,
                    if r.result.symmetric {
                        "symmetric"
                    } else {
                        "asymmetric"
                    },
                );
            }
        }

        if !self.outputs.is_empty() {
            out.push_str("\nWrote:\n");
            for path in &self.outputs {
                let _ = writeln!(out, "  {}", path.display());
            }
        }
        out
    }
}

/// Derived views produced by one run, ready to be written.
#[derive(Default)]
struct Views {
    shapes: Option<RgbImage>,
    symmetry: Option<RgbImage>,
    completed: Option<GrayImage>,
}

fn run(
    image: &shapelens_pipeline::DynamicImage,
    config: &AnalysisConfig,
    ops: &[Op],
    report: &mut Report,
) -> Result<Views, AnalysisError> {
    let mut views = Views::default();

    if [Op::Shapes, Op::Symmetry, Op::Completion]
        .iter()
        .all(|op| ops.contains(op))
    {
        let analysis = shapelens_pipeline::analyze(image, config)?;
        report.dimensions = Some(analysis.dimensions);
        report.shapes = Some(ShapesReport {
            names: analysis.shapes.shape_names(),
            records: analysis.shapes.records,
        });
        report.symmetry = Some(SymmetryReport {
            contours: analysis.symmetry.contours.len(),
            records: analysis.symmetry.records,
            labels: analysis.symmetry.labels,
        });
        views.shapes = Some(analysis.shapes.annotated);
        views.symmetry = Some(analysis.symmetry.annotated);
        views.completed = Some(analysis.completed);
        return Ok(views);
    }

    report.dimensions = Some(Dimensions {
        width: image.width(),
        height: image.height(),
    });
    if ops.contains(&Op::Shapes) {
        let detection = shapelens_pipeline::detect_shapes(image, &config.shapes)?;
        report.shapes = Some(ShapesReport {
            names: detection.shape_names(),
            records: detection.records,
        });
        views.shapes = Some(detection.annotated);
    }
    if ops.contains(&Op::Symmetry) {
        let detection = shapelens_pipeline::find_symmetry(image, &config.symmetry)?;
        report.symmetry = Some(SymmetryReport {
            contours: detection.contours.len(),
            records: detection.records,
            labels: detection.labels,
        });
        views.symmetry = Some(detection.annotated);
    }
    if ops.contains(&Op::Completion) {
        views.completed = Some(shapelens_pipeline::complete_curves(
            image,
            &config.completion,
        )?);
    }
    Ok(views)
}

fn output_path(dir: &Path, prefix: &str, view: &str) -> PathBuf {
    dir.join(format!("{prefix}-{view}.png"))
}

fn write_views(views: &Views, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, String> {
    let mut written = Vec::new();
    let mut save = |view: &str, result: &dyn Fn(&Path) -> image::ImageResult<()>| {
        let path = output_path(dir, prefix, view);
        result(&path).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
        Ok::<(), String>(())
    };

    if let Some(ref img) = views.shapes {
        save("shapes", &|p: &Path| img.save(p))?;
    }
    if let Some(ref img) = views.symmetry {
        save("symmetry", &|p: &Path| img.save(p))?;
    }
    if let Some(ref img) = views.completed {
        save("completed", &|p: &Path| img.save(p))?;
    }
    Ok(written)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("config: {config:?}");

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let image = match shapelens_pipeline::decode(&image_bytes) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let ops = if cli.ops.is_empty() {
        vec![Op::Shapes, Op::Symmetry, Op::Completion]
    } else {
        cli.ops.clone()
    };

    let mut report = Report {
        image: cli.image_path.clone(),
        ..Report::default()
    };
    let views = match run(&image, &config, &ops, &mut report) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Analysis error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !cli.no_write {
        let prefix = cli.prefix.clone().unwrap_or_else(|| {
            cli.image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("shapelens")
                .to_string()
        });
        match write_views(&views, &cli.output_dir, &prefix) {
            Ok(paths) => report.outputs = paths,
            Err(msg) => {
                eprintln!("{msg}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report.text());
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shapelens").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = parse(&["in.png"]);
        assert_eq!(config_from_cli(&cli).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn flags_reach_the_config() {
        let cli = parse(&[
            "in.png",
            "--canny-low",
            "20",
            "--no-merge-stroke-faces",
            "--symmetry-tolerance",
            "4",
            "--close-iterations",
            "5",
            "--pixel-contours",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.shapes.canny_low - 20.0).abs() < f32::EPSILON);
        assert!(!config.shapes.merge_stroke_faces);
        assert_eq!(config.symmetry.tolerance, 4);
        assert_eq!(config.completion.iterations, 5);
        assert_eq!(config.symmetry.approximation, ContourApproximation::None);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "in.png",
            "--canny-low",
            "20",
            "--config-json",
            r#"{"completion": {"iterations": 2}}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.completion.iterations, 2);
        assert!(
            (config.shapes.canny_low - ShapeConfig::DEFAULT_CANNY_LOW).abs() < f32::EPSILON
        );
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli = parse(&["in.png", "--config-json", "{"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("--config-json"));
    }

    #[test]
    fn ops_are_repeatable() {
        let cli = parse(&["in.png", "--op", "shapes", "--op", "completion"]);
        assert!(cli.ops == vec![Op::Shapes, Op::Completion]);
    }

    #[test]
    fn output_names_use_prefix_and_view() {
        assert_eq!(
            output_path(Path::new("out"), "scan", "shapes"),
            Path::new("out").join("scan-shapes.png")
        );
    }

    #[test]
    fn single_op_run_fills_only_its_view() {
        let image = shapelens_pipeline::DynamicImage::ImageLuma8(GrayImage::from_pixel(
            16,
            16,
            image::Luma([200]),
        ));
        let mut report = Report::default();
        let views = run(&image, &AnalysisConfig::default(), &[Op::Completion], &mut report)
            .unwrap();
        assert!(views.completed.is_some());
        assert!(views.shapes.is_none() && views.symmetry.is_none());
        assert!(report.shapes.is_none());
        assert_eq!(
            report.dimensions,
            Some(Dimensions {
                width: 16,
                height: 16
            })
        );
    }
}

//! Synthetic test images shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

pub const WHITE: Luma<u8> = Luma([255]);
pub const BLACK: Luma<u8> = Luma([0]);

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// White filled polygon on a black canvas.
pub fn filled_polygon(width: u32, height: u32, vertices: &[(i32, i32)]) -> DynamicImage {
    let mut canvas = GrayImage::from_pixel(width, height, BLACK);
    let polygon: Vec<Point<i32>> = vertices.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut canvas, &polygon, WHITE);
    DynamicImage::ImageLuma8(canvas)
}

/// Axis-aligned filled rectangle spanning `[x0, x1) x [y0, y1)`.
pub fn filled_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            WHITE
        } else {
            BLACK
        }
    }))
}

/// Regular polygon with `sides` vertices, the first pointing straight up.
#[allow(clippy::cast_possible_truncation)]
pub fn regular_polygon(
    width: u32,
    height: u32,
    sides: u32,
    center: (f64, f64),
    radius: f64,
) -> DynamicImage {
    let vertices: Vec<(i32, i32)> = (0..sides)
        .map(|i| {
            let angle = 2.0 * PI * f64::from(i) / f64::from(sides) - PI / 2.0;
            (
                (center.0 + radius * angle.cos()).round() as i32,
                (center.1 + radius * angle.sin()).round() as i32,
            )
        })
        .collect();
    filled_polygon(width, height, &vertices)
}

/// White filled disk on a black canvas.
pub fn filled_disk(width: u32, height: u32, center: (i32, i32), radius: i32) -> DynamicImage {
    let mut canvas = GrayImage::from_pixel(width, height, BLACK);
    draw_filled_circle_mut(&mut canvas, center, radius, WHITE);
    DynamicImage::ImageLuma8(canvas)
}

/// Dark ring of the given radius and half-width on white, with every
/// pixel for which `gap` returns true left white.
#[allow(clippy::cast_precision_loss)]
pub fn dark_ring(
    size: u32,
    radius: f64,
    half_width: f64,
    gap: impl Fn(u32, u32) -> bool,
) -> DynamicImage {
    let center = f64::from(size) / 2.0;
    DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        let on_ring = (dx.hypot(dy) - radius).abs() <= half_width;
        if on_ring && !gap(x, y) { BLACK } else { WHITE }
    }))
}

/// Encode as PNG, the way a front end would hand bytes over.
pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding should succeed");
    bytes
}

/// Every zero-sized shape an image buffer can have.
pub fn empty_images() -> Vec<DynamicImage> {
    vec![
        DynamicImage::ImageLuma8(GrayImage::new(0, 0)),
        DynamicImage::ImageLuma8(GrayImage::new(0, 12)),
        DynamicImage::ImageRgb8(image::RgbImage::new(12, 0)),
    ]
}

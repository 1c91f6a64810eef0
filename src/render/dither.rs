//! # Dithering
//!
//! Converts continuous-tone images to the strict black/white a label printer
//! can reproduce. Used for image elements; barcodes and text are already
//! two-tone and go through a plain threshold.
//!
//! ## Algorithms
//!
//! | Method | Speed | Quality | Artifacts |
//! |--------|-------|---------|-----------|
//! | None (threshold) | Fastest | Poor on photos | Banding |
//! | Bayer 8x8 | Fast | Good | Regular pattern |
//! | Floyd-Steinberg | Slower | Best | Noise, worms |
//!
//! Floyd-Steinberg is the default for images: small logos on labels keep
//! their edges and mid-tones come out as stipple rather than solid blocks.

use image::GrayImage;

use crate::raster::Bitmap;
use crate::raster::bitmap::DEFAULT_THRESHOLD;

/// Bayer 8x8 dithering matrix (values 0-63).
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitheringAlgorithm {
    /// Fixed threshold at mid-gray.
    None,
    /// Ordered dithering with [`BAYER8`].
    Bayer,
    /// Error diffusion (7/16, 3/16, 5/16, 1/16).
    #[default]
    FloydSteinberg,
}

/// Parse a dithering algorithm name.
pub fn parse_dither_algorithm(s: &str) -> Option<DitheringAlgorithm> {
    match s.to_lowercase().as_str() {
        "bayer" => Some(DitheringAlgorithm::Bayer),
        "floyd-steinberg" | "floyd_steinberg" | "fs" => Some(DitheringAlgorithm::FloydSteinberg),
        "none" | "threshold" => Some(DitheringAlgorithm::None),
        _ => None,
    }
}

/// Bayer threshold for a pixel position, in (0, 1).
///
/// `(value + 0.5) / 64` keeps full black always printing and full white
/// never printing.
#[inline]
pub fn threshold(x: u32, y: u32) -> f32 {
    let matrix_value = BAYER8[(y & 7) as usize][(x & 7) as usize];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Intensity of a luma value: 0.0 = white, 1.0 = black.
#[inline]
fn intensity(luma: u8) -> f32 {
    1.0 - luma as f32 / 255.0
}

/// Reduce a grayscale image to a bi-level bitmap.
pub fn dither(gray: &GrayImage, algorithm: DitheringAlgorithm) -> Bitmap {
    match algorithm {
        DitheringAlgorithm::None => Bitmap::from_luma(gray, DEFAULT_THRESHOLD),
        DitheringAlgorithm::Bayer => Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
            intensity(gray.get_pixel(x, y)[0]) > threshold(x, y)
        }),
        DitheringAlgorithm::FloydSteinberg => floyd_steinberg(gray),
    }
}

fn floyd_steinberg(gray: &GrayImage) -> Bitmap {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let mut buffer: Vec<f32> = gray.pixels().map(|p| intensity(p[0])).collect();
    let mut out = Bitmap::new(gray.width(), gray.height());

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = buffer[idx];
            let black = old >= 0.5;
            if black {
                out.set(x as u32, y as u32, true);
            }
            let err = old - if black { 1.0 } else { 0.0 };

            if x + 1 < width {
                buffer[idx + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < height {
                if x > 0 {
                    buffer[idx + width - 1] += err * 3.0 / 16.0;
                }
                buffer[idx + width] += err * 5.0 / 16.0;
                if x + 1 < width {
                    buffer[idx + width + 1] += err / 16.0;
                }
            }
        }
    }

    out
}

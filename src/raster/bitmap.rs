//! Packed 1-bit raster.
//!
//! Rows are packed MSB-first, `ceil(width / 8)` bytes per row, with a set bit
//! meaning a black dot. This is the same layout printer raster commands use,
//! so a `Bitmap` is strict bi-level by construction: anything converted into
//! one has already been forced to black or white.

use image::{GrayImage, Luma, imageops::FilterType};

/// Luma values below this are black when thresholding.
pub const DEFAULT_THRESHOLD: u8 = 128;

#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("black", &self.count_black())
            .finish()
    }
}

impl Bitmap {
    /// All-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let width_bytes = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0u8; width_bytes * height as usize],
        }
    }

    /// Build a bitmap from a predicate returning `true` for black.
    pub fn from_fn<F>(width: u32, height: u32, mut is_black: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut bitmap = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if is_black(x, y) {
                    bitmap.set(x, y, true);
                }
            }
        }
        bitmap
    }

    /// Threshold a grayscale image: luma below `threshold` becomes black.
    pub fn from_luma(gray: &GrayImage, threshold: u8) -> Self {
        Self::from_fn(gray.width(), gray.height(), |x, y| {
            gray.get_pixel(x, y)[0] < threshold
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes per packed row.
    pub fn width_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Packed rows, top to bottom.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// One packed row.
    pub fn row(&self, y: u32) -> &[u8] {
        let wb = self.width_bytes();
        let start = y as usize * wb;
        &self.data[start..start + wb]
    }

    /// Pixel lookup; out-of-range reads as white.
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte_idx = y as usize * self.width_bytes() + x as usize / 8;
        let bit_idx = 7 - (x % 8);
        (self.data[byte_idx] >> bit_idx) & 1 == 1
    }

    /// Set one pixel. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte_idx = y as usize * self.width_bytes() + x as usize / 8;
        let bit_idx = 7 - (x % 8);
        if black {
            self.data[byte_idx] |= 1 << bit_idx;
        } else {
            self.data[byte_idx] &= !(1 << bit_idx);
        }
    }

    pub fn count_black(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Expand to an 8-bit grayscale image (black = 0, white = 255).
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_black(x, y) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }

    /// Nearest-neighbour resize. The result stays strict bi-level.
    pub fn resize(&self, width: u32, height: u32) -> Bitmap {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() || width == 0 || height == 0 {
            return Bitmap::new(width, height);
        }
        let resized = image::imageops::resize(&self.to_luma(), width, height, FilterType::Nearest);
        Bitmap::from_luma(&resized, DEFAULT_THRESHOLD)
    }
}

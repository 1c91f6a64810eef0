//! The label canvas.
//!
//! A white bi-level grid owned by a single render. The only mutation is
//! [`Canvas::blit`], an overwrite paste: every source pixel, black or white,
//! replaces the canvas pixel under it. There is no blending, so when elements
//! overlap the one painted last wins.

use super::bitmap::Bitmap;

#[derive(Debug, Clone)]
pub struct Canvas {
    bitmap: Bitmap,
}

impl Canvas {
    /// All-white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bitmap: Bitmap::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Paste `src` with its top-left corner at `(x, y)`.
    ///
    /// Offsets may be negative or past the edge; only the overlapping pixels
    /// are touched.
    pub fn blit(&mut self, src: &Bitmap, x: i64, y: i64) {
        let cw = self.width() as i64;
        let ch = self.height() as i64;

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(src.width() as i64).min(cw);
        let y1 = y.saturating_add(src.height() as i64).min(ch);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for cy in y0..y1 {
            let sy = (cy - y) as u32;
            for cx in x0..x1 {
                let sx = (cx - x) as u32;
                self.bitmap.set(cx as u32, cy as u32, src.is_black(sx, sy));
            }
        }
    }

    /// Read-only view of the pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Freeze the canvas into its final raster.
    pub fn finish(self) -> Bitmap {
        self.bitmap
    }
}

//! # Bi-level Raster
//!
//! - [`bitmap`]: packed 1-bit pixel buffer
//! - [`canvas`]: the label canvas and its overwrite `blit`
//! - [`bmp`]: uncompressed 1-bit BMP serialization

pub mod bitmap;
pub mod bmp;
pub mod canvas;

pub use bitmap::Bitmap;
pub use canvas::Canvas;

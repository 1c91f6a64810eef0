//! # Rendering Module
//!
//! Turns a [`LabelSpec`] into a finished bi-level label raster.
//!
//! ## Modules
//!
//! - [`layout`]: layout descriptors and bounding boxes
//! - [`dither`]: grayscale → bi-level conversion for image elements
//!
//! ## Pipeline
//!
//! ```text
//! LabelSpec ──► LabelGeometry ──► white Canvas
//!                                    │
//!      for each element, in order:   ▼
//!        text    → FontResolver → rasterize ─┐
//!        barcode → BarcodeEncoder ───────────┼─► blit (overwrite, clipped)
//!        image   → decode → scale → dither ──┘
//!                                    │
//!                                    ▼
//!                     RenderedLabel (bitmap + boxes) ──► BMP
//! ```
//!
//! Only [`LabelError::Configuration`] and
//! [`LabelError::UnsupportedSymbology`] abort a render. Anything else that
//! goes wrong with one element is logged, the element gets a zero bounding
//! box, and the remaining elements are still painted.
//!
//! ## Usage Example
//!
//! ```no_run
//! use labelpress::render::{LabelRenderer, LabelSpec, LayoutElement};
//!
//! let spec = LabelSpec::new(100.0, 29.0, 300.0)
//!     .with(LayoutElement::text(10, 10, "LOT 42", 40))
//!     .with(LayoutElement::barcode(10, 80, "10114847068", "code128"));
//!
//! let label = LabelRenderer::new().render(&spec)?;
//! label.save("label.bmp")?;
//! # Ok::<(), labelpress::LabelError>(())
//! ```

pub mod dither;
pub mod layout;

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, imageops::FilterType};
use tracing::{debug, warn};

use crate::barcode::{BarcodeEncoder, Symbology};
use crate::error::LabelError;
use crate::font::{FontResolver, FontSource, SystemFonts};
use crate::raster::{Bitmap, Canvas, bmp};
use crate::units::LabelGeometry;
use dither::DitheringAlgorithm;
pub use layout::{BoundingBox, ImageSource, LabelSpec, LayoutElement};

/// A finished label: the final raster plus where each element landed.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub geometry: LabelGeometry,
    pub bitmap: Bitmap,
    /// One box per input element, in input order.
    pub boxes: Vec<BoundingBox>,
}

impl RenderedLabel {
    /// Serialize as an uncompressed 1-bit BMP.
    pub fn to_bmp(&self) -> Vec<u8> {
        bmp::encode(&self.bitmap, self.geometry.dpi)
    }

    /// Write the BMP to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LabelError> {
        std::fs::write(path.as_ref(), self.to_bmp())?;
        Ok(())
    }
}

/// Paints layout elements onto a label canvas.
pub struct LabelRenderer<S = SystemFonts> {
    fonts: FontResolver<S>,
    dithering: DitheringAlgorithm,
}

impl LabelRenderer<SystemFonts> {
    pub fn new() -> Self {
        Self::with_fonts(FontResolver::new())
    }
}

impl Default for LabelRenderer<SystemFonts> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FontSource> LabelRenderer<S> {
    pub fn with_fonts(fonts: FontResolver<S>) -> Self {
        Self {
            fonts,
            dithering: DitheringAlgorithm::default(),
        }
    }

    /// Override the dithering used for image elements.
    pub fn dithering(mut self, algorithm: DitheringAlgorithm) -> Self {
        self.dithering = algorithm;
        self
    }

    pub fn fonts(&self) -> &FontResolver<S> {
        &self.fonts
    }

    /// Render `spec` to a finished label.
    pub fn render(&self, spec: &LabelSpec) -> Result<RenderedLabel, LabelError> {
        let geometry = spec.geometry()?;
        let barcodes = BarcodeEncoder::new(geometry.dpi)?;
        let mut canvas = Canvas::new(geometry.width_px, geometry.height_px);
        let mut boxes = Vec::with_capacity(spec.elements.len());

        debug!(
            width_px = geometry.width_px,
            height_px = geometry.height_px,
            elements = spec.elements.len(),
            "rendering label"
        );

        for (index, element) in spec.elements.iter().enumerate() {
            let (x, y) = element.origin();
            match self.paint(element, &barcodes) {
                Ok(raster) => {
                    canvas.blit(&raster, x, y);
                    boxes.push(BoundingBox::new(x, y, raster.width(), raster.height()));
                }
                Err(e) if e.is_fatal_to_render() => return Err(e),
                Err(e) => {
                    warn!(index, kind = element.kind(), error = %e, "skipping element");
                    boxes.push(BoundingBox::empty(x, y));
                }
            }
        }

        Ok(RenderedLabel {
            geometry,
            bitmap: canvas.finish(),
            boxes,
        })
    }

    /// Render `spec` and write the BMP to `path`.
    pub fn render_to_file(
        &self,
        spec: &LabelSpec,
        path: impl AsRef<Path>,
    ) -> Result<RenderedLabel, LabelError> {
        let label = self.render(spec)?;
        label.save(path)?;
        Ok(label)
    }

    /// Produce one element's own raster.
    fn paint(&self, element: &LayoutElement, barcodes: &BarcodeEncoder) -> Result<Bitmap, LabelError> {
        match element {
            LayoutElement::Text {
                content,
                font_size_px,
                font_family,
                ..
            } => {
                if *font_size_px == 0 {
                    return Err(LabelError::ElementRender(format!(
                        "font size must be positive for {:?}",
                        content
                    )));
                }
                let font = self.fonts.resolve(font_family, *font_size_px as f32);
                Ok(font.rasterize(content))
            }
            LayoutElement::Barcode {
                payload,
                symbology,
                width_px,
                height_px,
                x,
                y,
            } => {
                let symbology: Symbology = symbology.parse()?;
                let (raster, _) = barcodes.encode(payload, symbology, *width_px, *height_px, *x, *y)?;
                Ok(raster)
            }
            LayoutElement::Image {
                source,
                width_px,
                height_px,
                ..
            } => {
                let decoded = load_image(source)?;
                Ok(prepare_image(&decoded, *width_px, *height_px, self.dithering))
            }
        }
    }
}

/// Read and decode an image element's data.
pub fn load_image(source: &ImageSource) -> Result<DynamicImage, LabelError> {
    let decoded = match source {
        ImageSource::Path(path) => image::open(path)
            .map_err(|e| LabelError::Image(format!("{}: {}", path.display(), e)))?,
        ImageSource::Bytes(bytes) => {
            image::load_from_memory(bytes).map_err(|e| LabelError::Image(e.to_string()))?
        }
    };
    Ok(decoded)
}

/// Target size for an image. One dimension keeps the aspect ratio, both
/// stretch, neither keeps the source size. The derived dimension truncates.
pub fn scaled_size(src_width: u32, src_height: u32, width_px: Option<u32>, height_px: Option<u32>) -> (u32, u32) {
    let width_px = width_px.filter(|&w| w > 0);
    let height_px = height_px.filter(|&h| h > 0);
    match (width_px, height_px) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) if src_width > 0 => {
            let ratio = w as f64 / src_width as f64;
            (w, (src_height as f64 * ratio) as u32)
        }
        (None, Some(h)) if src_height > 0 => {
            let ratio = h as f64 / src_height as f64;
            ((src_width as f64 * ratio) as u32, h)
        }
        _ => (src_width, src_height),
    }
}

/// Flatten onto white, scale, and dither to bi-level.
pub fn prepare_image(
    img: &DynamicImage,
    width_px: Option<u32>,
    height_px: Option<u32>,
    algorithm: DitheringAlgorithm,
) -> Bitmap {
    let rgba = img.to_rgba8();
    let gray = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        let alpha = a as f32 / 255.0;
        Luma([(luma * alpha + 255.0 * (1.0 - alpha)).round() as u8])
    });

    let (width, height) = scaled_size(gray.width(), gray.height(), width_px, height_px);
    if width == 0 || height == 0 {
        return Bitmap::new(0, 0);
    }
    let gray = if (width, height) == gray.dimensions() {
        gray
    } else {
        image::imageops::resize(&gray, width, height, FilterType::Triangle)
    };

    dither::dither(&gray, algorithm)
}

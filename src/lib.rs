//! # labelpress - Label Rendering and TSPL Printing
//!
//! labelpress renders label designs (text, barcodes, images at pixel
//! positions) onto a strict black/white raster sized from the physical label
//! and printer resolution, and sends the result to TSC network label
//! printers over raw TCP. It provides:
//!
//! - **Rendering**: millimeter-accurate canvases, font fallback, barcodes
//! - **Raster output**: 1-bit BMP the printer stores and places
//! - **Protocol**: TSPL command builders with length-framed downloads
//! - **Transport**: cached async TCP links per printer
//!
//! ## Quick Start
//!
//! ```no_run
//! use labelpress::{
//!     printer::{Endpoint, PrinterManager},
//!     render::{LabelRenderer, LabelSpec, LayoutElement},
//! };
//!
//! # async fn demo() -> Result<(), labelpress::LabelError> {
//! // 100 × 29 mm label on a 300 dpi printer
//! let spec = LabelSpec::new(100.0, 29.0, 300.0)
//!     .with(LayoutElement::text(10, 10, "Olive oil 1L", 40))
//!     .with(LayoutElement::barcode(10, 80, "10114847068", "code128"));
//!
//! let label = LabelRenderer::new().render(&spec)?;
//!
//! let printers = PrinterManager::new();
//! let endpoint: Endpoint = "192.168.1.200".parse()?;
//! printers.print_raster(&endpoint, &label.to_bmp(), 100.0, 29.0).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`units`] | Millimeter ⇄ pixel conversion |
//! | [`font`] | Font family resolution and text rasterization |
//! | [`barcode`] | Code 128 / EAN-13 / Code 39 symbols |
//! | [`raster`] | 1-bit bitmaps, the label canvas, BMP output |
//! | [`render`] | Layout descriptors and the label renderer |
//! | [`protocol`] | TSPL command builders |
//! | [`printer`] | Printer addresses, links and the connection cache |
//! | [`editor`] | Label editor payload conversion |
//! | [`store`] | Persistence seam for printers and saved designs |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Tested with:
//! - TSC TE310 (300 DPI, 100 × 29 mm labels, Ethernet)
//!
//! Other printers that accept TSPL on port 9100 should work with the
//! matching label stock settings.

pub mod barcode;
pub mod editor;
pub mod error;
pub mod font;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod render;
pub mod store;
pub mod units;

// Re-exports for convenience
pub use error::LabelError;
pub use printer::{Endpoint, PrinterManager};
pub use render::{LabelRenderer, LabelSpec, LayoutElement, RenderedLabel};

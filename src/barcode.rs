//! # Barcode Encoding
//!
//! Linear barcode symbols rendered straight to a bi-level [`Bitmap`].
//!
//! Physical sizing is in millimeters and converted at the encoder's dpi:
//!
//! ```text
//!            ┌── quiet zone (10 modules) ──┐
//!  module    │▌▌ ▌ ▌▌▌ ▌▌ ▌ ▌▌▌ ▌▌ ▌▌ ▌▌▌│   bar height = module height
//!  width     └─────────────────────────────┘
//!
//!  no width requested   → module width 0.33 mm
//!  width_px requested   → module width 0.20 mm, then nearest-neighbour
//!                         horizontal resize to exactly width_px
//!  height_px requested  → module height = px_to_mm(height_px)
//!  no height requested  → module height 15 mm
//! ```
//!
//! Supported symbologies: Code 128 (character set B), EAN-13, Code 39.

use std::fmt;
use std::str::FromStr;

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean13::EAN13;

use crate::error::LabelError;
use crate::raster::Bitmap;
use crate::render::BoundingBox;
use crate::units;

/// Module width used when the caller does not ask for a specific width.
pub const DEFAULT_MODULE_WIDTH_MM: f64 = 0.33;
/// Thinner module width used when the symbol will be resized to a width.
pub const NARROW_MODULE_WIDTH_MM: f64 = 0.2;
/// Bar height used when the caller does not ask for a specific height.
pub const DEFAULT_MODULE_HEIGHT_MM: f64 = 15.0;
/// White modules on each side of the symbol.
pub const QUIET_ZONE_MODULES: u32 = 10;

/// A barcode encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Code128,
    Ean13,
    Code39,
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Code128 => write!(f, "code128"),
            Symbology::Ean13 => write!(f, "ean13"),
            Symbology::Code39 => write!(f, "code39"),
        }
    }
}

impl FromStr for Symbology {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code128" | "code-128" => Ok(Symbology::Code128),
            "ean13" | "ean-13" => Ok(Symbology::Ean13),
            "code39" | "code-39" => Ok(Symbology::Code39),
            _ => Err(LabelError::UnsupportedSymbology(s.to_string())),
        }
    }
}

impl Symbology {
    /// Encode `payload` to modules (`true` = bar).
    pub fn modules(&self, payload: &str) -> Result<Vec<bool>, LabelError> {
        let encoded = match self {
            Symbology::Code128 => {
                // Character set B covers all printable ASCII
                let prefixed = format!("\u{0181}{}", payload);
                Code128::new(&prefixed)
                    .map_err(|e| barcode_error(*self, payload, e))?
                    .encode()
            }
            Symbology::Ean13 => {
                let digits = ean13_digits(payload)?;
                EAN13::new(&digits)
                    .map_err(|e| barcode_error(*self, payload, e))?
                    .encode()
            }
            Symbology::Code39 => Code39::new(payload.to_uppercase())
                .map_err(|e| barcode_error(*self, payload, e))?
                .encode(),
        };
        Ok(encoded.into_iter().map(|m| m == 1).collect())
    }
}

fn barcode_error(symbology: Symbology, payload: &str, e: barcoders::error::Error) -> LabelError {
    LabelError::Barcode(format!("{} cannot encode {:?}: {:?}", symbology, payload, e))
}

/// First 12 digits of an EAN-13 payload. The check digit, if supplied, is
/// dropped and recomputed by the encoder.
fn ean13_digits(payload: &str) -> Result<String, LabelError> {
    let payload = payload.trim();
    if !payload.chars().all(|c| c.is_ascii_digit()) || !(12..=13).contains(&payload.len()) {
        return Err(LabelError::Barcode(format!(
            "ean13 needs 12 or 13 digits, got {:?}",
            payload
        )));
    }
    Ok(payload[..12].to_string())
}

/// Barcode renderer for one printer resolution.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeEncoder {
    dpi: f64,
}

impl BarcodeEncoder {
    pub fn new(dpi: f64) -> Result<Self, LabelError> {
        units::dots_per_mm(dpi)?;
        Ok(Self { dpi })
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Render `payload` and report where it lands when placed at `(x, y)`.
    ///
    /// `Some(0)` for either dimension is treated as not requested.
    pub fn encode(
        &self,
        payload: &str,
        symbology: Symbology,
        width_px: Option<u32>,
        height_px: Option<u32>,
        x: i64,
        y: i64,
    ) -> Result<(Bitmap, BoundingBox), LabelError> {
        let width_px = width_px.filter(|&w| w > 0);
        let height_px = height_px.filter(|&h| h > 0);

        let modules = symbology.modules(payload)?;

        let module_width_mm = if width_px.is_some() {
            NARROW_MODULE_WIDTH_MM
        } else {
            DEFAULT_MODULE_WIDTH_MM
        };
        let module_height_mm = match height_px {
            Some(h) => units::px_to_mm(h as f64, self.dpi)?,
            None => DEFAULT_MODULE_HEIGHT_MM,
        };

        let module_px = units::mm_to_px(module_width_mm, self.dpi)?.max(1) as u32;
        let bar_height = units::mm_to_px(module_height_mm, self.dpi)?.max(1) as u32;

        let quiet = QUIET_ZONE_MODULES * module_px;
        let symbol_width = quiet * 2 + modules.len() as u32 * module_px;
        let bitmap = Bitmap::from_fn(symbol_width, bar_height, |px, _| {
            px >= quiet
                && modules
                    .get(((px - quiet) / module_px) as usize)
                    .copied()
                    .unwrap_or(false)
        });

        let bitmap = match width_px {
            Some(w) => bitmap.resize(w, bitmap.height()),
            None => bitmap,
        };

        let bbox = BoundingBox::new(x, y, bitmap.width(), bitmap.height());
        Ok((bitmap, bbox))
    }
}

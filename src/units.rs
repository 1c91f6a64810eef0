//! # Unit Conversion
//!
//! Millimeter ⇄ pixel conversion at a given printer resolution.
//!
//! ```text
//! dots_per_mm = dpi / 25.4
//! px          = round(mm * dots_per_mm)
//! mm          = px / dots_per_mm          (unrounded)
//!
//! For a 300 dpi TSC TE310 and 100 × 29 mm stock:
//!   dots_per_mm ≈ 11.81
//!   100 mm → 1181 px
//!    29 mm →  343 px
//! ```
//!
//! `px_to_mm` is deliberately left unrounded: it feeds the barcode module
//! height, where a rounded millimeter value would drift by whole pixels.

use crate::error::LabelError;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

fn check_dpi(dpi: f64) -> Result<(), LabelError> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(LabelError::Configuration(format!(
            "dpi must be positive, got {}",
            dpi
        )));
    }
    Ok(())
}

/// Printer dots per millimeter at `dpi`.
pub fn dots_per_mm(dpi: f64) -> Result<f64, LabelError> {
    check_dpi(dpi)?;
    Ok(dpi / MM_PER_INCH)
}

/// Convert millimeters to whole pixels, rounding to nearest.
///
/// ## Example
///
/// ```
/// use labelpress::units::mm_to_px;
///
/// assert_eq!(mm_to_px(100.0, 300.0).unwrap(), 1181);
/// assert_eq!(mm_to_px(29.0, 300.0).unwrap(), 343);
/// ```
pub fn mm_to_px(mm: f64, dpi: f64) -> Result<i64, LabelError> {
    check_dpi(dpi)?;
    if !mm.is_finite() {
        return Err(LabelError::Configuration(format!(
            "length must be finite, got {}",
            mm
        )));
    }
    Ok((mm * dpi / MM_PER_INCH).round() as i64)
}

/// Convert pixels to millimeters without rounding.
pub fn px_to_mm(px: f64, dpi: f64) -> Result<f64, LabelError> {
    Ok(px / dots_per_mm(dpi)?)
}

/// Validated physical label size and its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl LabelGeometry {
    /// Validate the physical parameters and compute the pixel size.
    ///
    /// Fails with [`LabelError::Configuration`] if any parameter is
    /// non-positive or if a dimension rounds down to zero pixels.
    pub fn new(width_mm: f64, height_mm: f64, dpi: f64) -> Result<Self, LabelError> {
        check_dpi(dpi)?;
        for (name, value) in [("width_mm", width_mm), ("height_mm", height_mm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LabelError::Configuration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let width_px = mm_to_px(width_mm, dpi)?;
        let height_px = mm_to_px(height_mm, dpi)?;
        if width_px <= 0 || height_px <= 0 {
            return Err(LabelError::Configuration(format!(
                "label {}x{} mm is smaller than one dot at {} dpi",
                width_mm, height_mm, dpi
            )));
        }
        if width_px > u32::MAX as i64 || height_px > u32::MAX as i64 {
            return Err(LabelError::Configuration(format!(
                "label {}x{} mm is too large at {} dpi",
                width_mm, height_mm, dpi
            )));
        }

        Ok(Self {
            width_mm,
            height_mm,
            dpi,
            width_px: width_px as u32,
            height_px: height_px as u32,
        })
    }
}

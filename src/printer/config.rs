//! # Printer Configuration
//!
//! Network addresses of label printers and the physical label stock they
//! are loaded with.
//!
//! ## Label Stock Presets
//!
//! | Preset | Size | Resolution |
//! |--------|------|------------|
//! | TE310_100X29 | 100 × 29 mm | 300 DPI |
//! | TE200_50X25 | 50 × 25 mm | 203 DPI |
//! | TE200_100X150 | 100 × 150 mm | 203 DPI |
//!
//! ## Usage
//!
//! ```
//! use labelpress::printer::{Endpoint, LabelStock, PrinterEndpoint};
//!
//! let endpoint: Endpoint = "192.168.1.200".parse().unwrap();
//! assert_eq!(endpoint.port, 9100);
//!
//! let printer = PrinterEndpoint::new(endpoint, LabelStock::TE310_100X29);
//! let geometry = printer.geometry().unwrap();
//! assert_eq!((geometry.width_px, geometry.height_px), (1181, 343));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::units::LabelGeometry;

/// Raw TCP printing port used by TSC (and most other) network printers.
pub const DEFAULT_PORT: u16 = 9100;

/// Where a printer listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address or host name.
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Endpoint on [`DEFAULT_PORT`].
    pub fn from_host(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = LabelError;

    /// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || LabelError::Configuration(format!("invalid printer address: {:?}", s));
        let parse_port = |p: &str| p.parse::<u16>().map_err(|_| invalid());

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail.strip_prefix(':') {
                Some(port) => (host, parse_port(port)?),
                None if tail.is_empty() => (host, DEFAULT_PORT),
                None => return Err(invalid()),
            }
        } else {
            match s.split_once(':') {
                Some((host, port)) if !port.contains(':') => (host, parse_port(port)?),
                Some(_) => (s, DEFAULT_PORT),
                None => (s, DEFAULT_PORT),
            }
        };

        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(Self::new(host, port))
    }
}

/// # Label Stock
///
/// Physical label size and the printhead resolution it is printed at.
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// width_px    = round(width_mm * dots_per_mm)
///
/// For TE310_100X29:
///   dots_per_mm = 300 / 25.4 ≈ 11.81
///   width_px    = round(100 * 11.81) = 1181
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStock {
    /// Human-readable name
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: f64,
}

impl LabelStock {
    /// TSC TE310, 300 DPI, 100 × 29 mm labels.
    pub const TE310_100X29: Self = Self {
        name: "TSC TE310 100x29",
        width_mm: 100.0,
        height_mm: 29.0,
        dpi: 300.0,
    };

    /// TSC TE200, 203 DPI, 50 × 25 mm labels.
    pub const TE200_50X25: Self = Self {
        name: "TSC TE200 50x25",
        width_mm: 50.0,
        height_mm: 25.0,
        dpi: 203.0,
    };

    /// TSC TE200, 203 DPI, 100 × 150 mm shipping labels.
    pub const TE200_100X150: Self = Self {
        name: "TSC TE200 100x150",
        width_mm: 100.0,
        height_mm: 150.0,
        dpi: 203.0,
    };

    /// Widest printable area of the TE-series print head.
    pub const MAX_WIDTH_MM: f64 = 105.7;

    pub const PRESETS: &'static [LabelStock] =
        &[Self::TE310_100X29, Self::TE200_50X25, Self::TE200_100X150];

    /// Look up a preset by name, case-insensitively, ignoring spaces.
    pub fn by_name(name: &str) -> Option<Self> {
        let key = |s: &str| s.to_lowercase().replace([' ', '_', '-'], "");
        let wanted = key(name);
        Self::PRESETS.iter().copied().find(|p| key(p.name) == wanted)
    }

    pub fn geometry(&self) -> Result<LabelGeometry, LabelError> {
        LabelGeometry::new(self.width_mm, self.height_mm, self.dpi)
    }
}

impl Default for LabelStock {
    fn default() -> Self {
        Self::TE310_100X29
    }
}

/// A printer address together with the stock it prints on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterEndpoint {
    pub endpoint: Endpoint,
    pub dpi: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PrinterEndpoint {
    pub fn new(endpoint: Endpoint, stock: LabelStock) -> Self {
        Self {
            endpoint,
            dpi: stock.dpi,
            width_mm: stock.width_mm,
            height_mm: stock.height_mm,
        }
    }

    /// Validated size of the stock, failing if it exceeds the print head.
    pub fn geometry(&self) -> Result<LabelGeometry, LabelError> {
        if self.width_mm > LabelStock::MAX_WIDTH_MM {
            return Err(LabelError::Configuration(format!(
                "label width {} mm exceeds printable width {} mm",
                self.width_mm,
                LabelStock::MAX_WIDTH_MM
            )));
        }
        LabelGeometry::new(self.width_mm, self.height_mm, self.dpi)
    }
}

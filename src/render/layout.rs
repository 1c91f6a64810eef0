//! Layout descriptors: what goes on a label and where.
//!
//! ```json
//! {
//!   "width_mm": 100, "height_mm": 29, "dpi": 300,
//!   "elements": [
//!     { "type": "text", "x": 10, "y": 10, "content": "LOT 42", "font_size_px": 40 },
//!     { "type": "barcode", "x": 10, "y": 80, "payload": "10114847068", "height_px": 100 },
//!     { "type": "image", "x": 900, "y": 20, "source": "logo.png", "width_px": 200 }
//!   ]
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::units::LabelGeometry;

/// A label design: physical size, resolution, and elements in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: f64,
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
}

impl LabelSpec {
    pub fn new(width_mm: f64, height_mm: f64, dpi: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            dpi,
            elements: Vec::new(),
        }
    }

    /// Append an element (builder style).
    pub fn with(mut self, element: LayoutElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn geometry(&self) -> Result<LabelGeometry, LabelError> {
        LabelGeometry::new(self.width_mm, self.height_mm, self.dpi)
    }

    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        serde_json::from_str(json)
            .map_err(|e| LabelError::Configuration(format!("invalid label layout: {}", e)))
    }
}

/// One positioned element. `x`/`y` are canvas pixels, origin top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    Text {
        x: i64,
        y: i64,
        #[serde(alias = "text")]
        content: String,
        #[serde(alias = "font_size")]
        font_size_px: u32,
        #[serde(default = "default_font_family")]
        font_family: String,
    },
    Barcode {
        x: i64,
        y: i64,
        #[serde(alias = "data")]
        payload: String,
        #[serde(default = "default_symbology", alias = "barcode_type")]
        symbology: String,
        #[serde(default)]
        width_px: Option<u32>,
        #[serde(default)]
        height_px: Option<u32>,
    },
    Image {
        x: i64,
        y: i64,
        #[serde(alias = "image_path")]
        source: ImageSource,
        #[serde(default)]
        width_px: Option<u32>,
        #[serde(default)]
        height_px: Option<u32>,
    },
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_symbology() -> String {
    "code128".to_string()
}

impl LayoutElement {
    pub fn text(x: i64, y: i64, content: impl Into<String>, font_size_px: u32) -> Self {
        LayoutElement::Text {
            x,
            y,
            content: content.into(),
            font_size_px,
            font_family: default_font_family(),
        }
    }

    pub fn barcode(x: i64, y: i64, payload: impl Into<String>, symbology: impl Into<String>) -> Self {
        LayoutElement::Barcode {
            x,
            y,
            payload: payload.into(),
            symbology: symbology.into(),
            width_px: None,
            height_px: None,
        }
    }

    pub fn image(x: i64, y: i64, source: ImageSource) -> Self {
        LayoutElement::Image {
            x,
            y,
            source,
            width_px: None,
            height_px: None,
        }
    }

    pub fn origin(&self) -> (i64, i64) {
        match self {
            LayoutElement::Text { x, y, .. }
            | LayoutElement::Barcode { x, y, .. }
            | LayoutElement::Image { x, y, .. } => (*x, *y),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutElement::Text { .. } => "text",
            LayoutElement::Barcode { .. } => "barcode",
            LayoutElement::Image { .. } => "image",
        }
    }
}

/// Where image data comes from: a file path (JSON string) or raw encoded
/// bytes (JSON array of numbers).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            ImageSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
        }
    }
}

/// Region an element occupies on the canvas, `x1`/`y1` exclusive.
///
/// Skipped elements get the zero box `(x, y, x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BoundingBox {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width as i64),
            y1: y.saturating_add(height as i64),
        }
    }

    pub fn empty(x: i64, y: i64) -> Self {
        Self::new(x, y, 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 == self.x0 || self.y1 == self.y0
    }

    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }
}

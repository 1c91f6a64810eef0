//! # Editor Layout Format
//!
//! The label editor UI sends its design grouped by item kind, with
//! camelCase fields and fractional positions:
//!
//! ```json
//! {
//!   "textItems":    [{ "content": "Product", "x": 10, "y": 12.5, "fontSize": 32 }],
//!   "valueItems":   [{ "content": "Olive oil 1L", "x": 200, "y": 12, "fontFamily": "Times" }],
//!   "iconItems":    [{ "iconFile": "data:image/png;base64,iVBOR...", "x": 900, "y": 10, "width": 120 }],
//!   "barcodeItems": [{ "data": "8690000000001", "x": 10, "y": 120, "format": "ean13", "height": 100 }]
//! }
//! ```
//!
//! [`EditorLayout::into_label_spec`] flattens this into a [`LabelSpec`] in
//! the order texts, values, icons, barcodes. Items with empty content are
//! dropped; so are icons whose data is not valid base64.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LabelError;
use crate::render::{ImageSource, LabelSpec, LayoutElement};

/// Font size used when a text item does not specify one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorLayout {
    #[serde(default)]
    pub text_items: Vec<TextItem>,
    #[serde(default)]
    pub value_items: Vec<TextItem>,
    #[serde(default)]
    pub icon_items: Vec<IconItem>,
    #[serde(default)]
    pub barcode_items: Vec<BarcodeItem>,
}

/// A fixed caption or a variable value; both render as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconItem {
    /// Base64 image data, optionally as a `data:` URL.
    #[serde(default)]
    pub icon_file: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeItem {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

fn coord(v: f64) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

/// Pixel size; non-positive or non-finite means "not given".
fn dimension(v: Option<f64>) -> Option<u32> {
    v.filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round().min(u32::MAX as f64) as u32)
}

/// Decode icon data, accepting a bare base64 string or a `data:` URL.
pub fn decode_icon(data: &str) -> Result<Vec<u8>, LabelError> {
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| LabelError::Image(format!("icon is not valid base64: {}", e)))
}

impl EditorLayout {
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        serde_json::from_str(json)
            .map_err(|e| LabelError::Configuration(format!("invalid editor layout: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self.text_items.is_empty()
            && self.value_items.is_empty()
            && self.icon_items.is_empty()
            && self.barcode_items.is_empty()
    }

    /// Flatten into a renderable spec for a label of the given size.
    pub fn into_label_spec(self, width_mm: f64, height_mm: f64, dpi: f64) -> LabelSpec {
        let mut spec = LabelSpec::new(width_mm, height_mm, dpi);

        for item in self.text_items.into_iter().chain(self.value_items) {
            if item.content.is_empty() {
                continue;
            }
            let font_size = item.font_size.unwrap_or(DEFAULT_FONT_SIZE);
            spec.elements.push(LayoutElement::Text {
                x: coord(item.x),
                y: coord(item.y),
                content: item.content,
                font_size_px: if font_size.is_finite() && font_size > 0.0 {
                    font_size.round() as u32
                } else {
                    0
                },
                font_family: item.font_family.unwrap_or_else(|| "Arial".to_string()),
            });
        }

        for (index, item) in self.icon_items.into_iter().enumerate() {
            if item.icon_file.is_empty() {
                continue;
            }
            match decode_icon(&item.icon_file) {
                Ok(bytes) => spec.elements.push(LayoutElement::Image {
                    x: coord(item.x),
                    y: coord(item.y),
                    source: ImageSource::Bytes(bytes),
                    width_px: dimension(item.width),
                    height_px: dimension(item.height),
                }),
                Err(e) => warn!(index, error = %e, "dropping icon"),
            }
        }

        for item in self.barcode_items {
            if item.data.is_empty() {
                continue;
            }
            spec.elements.push(LayoutElement::Barcode {
                x: coord(item.x),
                y: coord(item.y),
                payload: item.data,
                symbology: item.format.unwrap_or_else(|| "code128".to_string()),
                width_px: dimension(item.width),
                height_px: dimension(item.height),
            });
        }

        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversion_order_and_defaults() {
        let layout = EditorLayout::from_json(
            r#"{
                "barcodeItems": [{ "data": "123456", "x": 10, "y": 120 }],
                "iconItems": [{ "iconFile": "data:image/png;base64,AAEC", "x": 900.4, "y": 9.6, "width": 120 }],
                "valueItems": [{ "content": "Olive oil", "x": 200, "y": 12, "fontFamily": "Times" }],
                "textItems": [{ "content": "Product", "x": 10.5, "y": 12.4, "fontSize": 32 }]
            }"#,
        )
        .unwrap();

        let spec = layout.into_label_spec(100.0, 29.0, 300.0);
        assert_eq!(
            spec.elements,
            vec![
                LayoutElement::Text {
                    x: 11,
                    y: 12,
                    content: "Product".into(),
                    font_size_px: 32,
                    font_family: "Arial".into(),
                },
                LayoutElement::Text {
                    x: 200,
                    y: 12,
                    content: "Olive oil".into(),
                    font_size_px: 12,
                    font_family: "Times".into(),
                },
                LayoutElement::Image {
                    x: 900,
                    y: 10,
                    source: ImageSource::Bytes(vec![0, 1, 2]),
                    width_px: Some(120),
                    height_px: None,
                },
                LayoutElement::Barcode {
                    x: 10,
                    y: 120,
                    payload: "123456".into(),
                    symbology: "code128".into(),
                    width_px: None,
                    height_px: None,
                },
            ]
        );
    }

    #[test]
    fn test_empty_items_are_skipped() {
        let layout = EditorLayout {
            text_items: vec![TextItem::default()],
            icon_items: vec![IconItem::default()],
            barcode_items: vec![BarcodeItem::default()],
            ..Default::default()
        };
        assert!(layout.into_label_spec(50.0, 25.0, 203.0).elements.is_empty());
    }

    #[test]
    fn test_bad_icon_is_dropped() {
        let layout = EditorLayout {
            icon_items: vec![IconItem {
                icon_file: "%%% not base64 %%%".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(layout.into_label_spec(50.0, 25.0, 203.0).elements.is_empty());
    }

    #[test]
    fn test_decode_icon_forms() {
        assert_eq!(decode_icon("AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_icon("data:image/bmp;base64,AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_icon("AA\nEC").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_size_means_unset() {
        assert_eq!(dimension(Some(0.0)), None);
        assert_eq!(dimension(Some(-5.0)), None);
        assert_eq!(dimension(Some(f64::NAN)), None);
        assert_eq!(dimension(Some(99.6)), Some(100));
        assert_eq!(dimension(None), None);
    }
}

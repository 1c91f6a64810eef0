//! # Error Types
//!
//! This module defines error types used throughout the labelpress library.
//!
//! Only a few of these ever abort a render: [`LabelError::Configuration`] and
//! [`LabelError::UnsupportedSymbology`]. The element-level variants are
//! produced by the individual element painters and recovered by the renderer,
//! which logs them and leaves the element's region blank.

use thiserror::Error;

/// Main error type for labelpress operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Non-positive or non-finite dpi / label dimensions
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Barcode symbology that has no encoder
    #[error("Unsupported symbology: {0}")]
    UnsupportedSymbology(String),

    /// Payload rejected by a supported symbology
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// A single layout element could not be painted
    #[error("Element render error: {0}")]
    ElementRender(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Printer unreachable, refused, or reset mid-transfer
    #[error("Connection error: {0}")]
    Connection(String),

    /// Value that cannot be placed into a TSPL command line
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Storage collaborator failure
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    /// Whether this error must stop a render instead of being recovered
    /// per element.
    pub fn is_fatal_to_render(&self) -> bool {
        matches!(
            self,
            LabelError::Configuration(_) | LabelError::UnsupportedSymbology(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(LabelError::Configuration("dpi".into()).is_fatal_to_render());
        assert!(LabelError::UnsupportedSymbology("qr".into()).is_fatal_to_render());
        assert!(!LabelError::Image("bad png".into()).is_fatal_to_render());
        assert!(!LabelError::Barcode("bad digits".into()).is_fatal_to_render());
    }

    #[test]
    fn test_display() {
        let err = LabelError::UnsupportedSymbology("qr".into());
        assert_eq!(err.to_string(), "Unsupported symbology: qr");
    }
}

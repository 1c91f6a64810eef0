//! # TSPL Command Builders
//!
//! TSPL is the line-oriented ASCII command language of TSC label printers.
//! Every command is one line terminated by `\n`; arguments are separated by
//! commas and string arguments are double-quoted.
//!
//! ## Binary Segment
//!
//! The only binary data on the wire is the file download, length-framed so
//! the printer knows where the raw bytes stop:
//!
//! ```text
//! DOWNLOAD "LABEL.BMP",4286,<4286 raw bytes>\n
//! ```
//!
//! [`download`] is the single place that frame is produced, so the declared
//! length is always the payload length.
//!
//! ## Quoting
//!
//! TSPL has no escape sequence inside quotes. Values that go into a quoted
//! argument are therefore validated rather than escaped: a `"` or any control
//! character (including CR and LF) is rejected with
//! [`LabelError::InvalidCommand`].

use std::fmt;

use crate::error::LabelError;

/// Line terminator for every command.
pub const EOL: u8 = b'\n';

/// Longest accepted printer file name.
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// Font used by [`text`]: the printer's built-in 12×20 font.
pub const TEXT_FONT: &str = "2";

// ============================================================================
// ARGUMENT VALIDATION
// ============================================================================

/// A file name in printer memory, e.g. `LABEL.BMP`.
///
/// Uppercased on construction; 1–32 characters from `A-Z 0-9 . _ -`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetName(String);

impl AssetName {
    pub fn new(name: &str) -> Result<Self, LabelError> {
        let upper = name.to_ascii_uppercase();
        if upper.is_empty() || upper.len() > MAX_ASSET_NAME_LEN {
            return Err(LabelError::InvalidCommand(format!(
                "asset name must be 1-{} characters, got {:?}",
                MAX_ASSET_NAME_LEN, name
            )));
        }
        if let Some(bad) = upper
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')))
        {
            return Err(LabelError::InvalidCommand(format!(
                "asset name {:?} contains {:?}",
                name, bad
            )));
        }
        Ok(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that `value` can sit between double quotes on one command line.
pub fn validate_text(value: &str) -> Result<(), LabelError> {
    if let Some(bad) = value.chars().find(|&c| c == '"' || c.is_control()) {
        return Err(LabelError::InvalidCommand(format!(
            "text {:?} contains {:?}, which cannot be sent inside a quoted argument",
            value, bad
        )));
    }
    Ok(())
}

/// Millimeter value as TSPL expects it: no trailing `.0`, at most 2
/// decimals.
pub fn format_mm(mm: f64) -> String {
    let rounded = (mm * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

fn check_mm(name: &str, mm: f64) -> Result<(), LabelError> {
    if !mm.is_finite() || mm <= 0.0 {
        return Err(LabelError::Configuration(format!(
            "{} must be positive, got {}",
            name, mm
        )));
    }
    Ok(())
}

fn line(command: String) -> Vec<u8> {
    let mut out = command.into_bytes();
    out.push(EOL);
    out
}

// ============================================================================
// SETUP COMMANDS
// ============================================================================

/// # Label Size (SIZE)
///
/// `SIZE <w> mm,<h> mm` sets the label stock dimensions.
pub fn size(width_mm: f64, height_mm: f64) -> Vec<u8> {
    line(format!("SIZE {} mm,{} mm", format_mm(width_mm), format_mm(height_mm)))
}

/// # Print Direction (DIRECTION)
///
/// `1` prints with the label top leaving the printer first.
pub fn direction(direction: u8) -> Vec<u8> {
    line(format!("DIRECTION {}", direction))
}

/// # Clear Image Buffer (CLS)
pub fn cls() -> Vec<u8> {
    line("CLS".to_string())
}

// ============================================================================
// CONTENT COMMANDS
// ============================================================================

/// # Place Stored Bitmap (PUTBMP)
pub fn put_bmp(x: u32, y: u32, name: &AssetName) -> Vec<u8> {
    line(format!("PUTBMP {},{},\"{}\"", x, y, name))
}

/// # Printer-Font Text (TEXT)
///
/// `TEXT x,y,"2",0,1,1,"<text>"`: built-in font 2, no rotation, 1× scale.
pub fn text(x: u32, y: u32, value: &str) -> Result<Vec<u8>, LabelError> {
    validate_text(value)?;
    Ok(line(format!(
        "TEXT {},{},\"{}\",0,1,1,\"{}\"",
        x, y, TEXT_FONT, value
    )))
}

// ============================================================================
// OUTPUT COMMANDS
// ============================================================================

/// # Print (PRINT)
///
/// `PRINT <sets>` or, with copies, `PRINT <sets>,<copies>`.
pub fn print(sets: u32, copies: Option<u32>) -> Vec<u8> {
    match copies {
        Some(c) => line(format!("PRINT {},{}", sets, c)),
        None => line(format!("PRINT {}", sets)),
    }
}

// ============================================================================
// FILE DOWNLOAD
// ============================================================================

/// # Download File (DOWNLOAD)
///
/// Frames `payload` as a file named `name` in printer memory. The declared
/// length is computed here from the payload itself.
///
/// ## Example
///
/// ```
/// use labelpress::protocol::tspl::{AssetName, download};
///
/// let name = AssetName::new("logo.bmp").unwrap();
/// assert_eq!(download(&name, b"BM"), b"DOWNLOAD \"LOGO.BMP\",2,BM\n");
/// ```
pub fn download(name: &AssetName, payload: &[u8]) -> Vec<u8> {
    let header = format!("DOWNLOAD \"{}\",{},", name, payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len() + 1);
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out.push(EOL);
    out
}

// ============================================================================
// JOBS
// ============================================================================

/// Command block that prints a previously downloaded bitmap once.
///
/// ```text
/// SIZE 100 mm,29 mm
/// DIRECTION 1
/// CLS
/// PUTBMP 0,0,"LABEL.BMP"
/// PRINT 1
/// ```
pub fn raster_job(name: &AssetName, width_mm: f64, height_mm: f64) -> Result<Vec<u8>, LabelError> {
    check_mm("width_mm", width_mm)?;
    check_mm("height_mm", height_mm)?;

    let mut out = Vec::new();
    out.extend(size(width_mm, height_mm));
    out.extend(direction(1));
    out.extend(cls());
    out.extend(put_bmp(0, 0, name));
    out.extend(print(1, None));
    Ok(out)
}

/// Command block that prints one line of text in the printer's own font.
pub fn text_job(value: &str, x: u32, y: u32, width_mm: f64, height_mm: f64) -> Result<Vec<u8>, LabelError> {
    check_mm("width_mm", width_mm)?;
    check_mm("height_mm", height_mm)?;
    let text_line = text(x, y, value)?;

    let mut out = Vec::new();
    out.extend(size(width_mm, height_mm));
    out.extend(direction(1));
    out.extend(cls());
    out.extend(text_line);
    out.extend(print(1, Some(1)));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> AssetName {
        AssetName::new(s).unwrap()
    }

    #[test]
    fn test_download_length_matches_payload() {
        for len in [0usize, 1, 9, 10, 62, 4286, 65_537] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let frame = download(&name("LABEL.BMP"), &payload);

            let header = format!("DOWNLOAD \"LABEL.BMP\",{},", len);
            assert!(frame.starts_with(header.as_bytes()), "len {}", len);
            assert_eq!(&frame[header.len()..frame.len() - 1], &payload[..]);
            assert_eq!(frame.last(), Some(&b'\n'));
            assert_eq!(frame.len(), header.len() + len + 1);
        }
    }

    #[test]
    fn test_download_binary_payload_untouched() {
        // Newlines and quotes inside the payload are data, not syntax
        let payload = b"\n\"\r\0\xff";
        let frame = download(&name("X"), payload);
        assert_eq!(frame, b"DOWNLOAD \"X\",5,\n\"\r\0\xff\n".to_vec());
    }

    #[test]
    fn test_raster_job() {
        let job = raster_job(&name("LABEL.BMP"), 100.0, 29.0).unwrap();
        assert_eq!(
            String::from_utf8(job).unwrap(),
            "SIZE 100 mm,29 mm\nDIRECTION 1\nCLS\nPUTBMP 0,0,\"LABEL.BMP\"\nPRINT 1\n"
        );
    }

    #[test]
    fn test_text_job() {
        let job = text_job("LOT 42", 10, 10, 100.0, 20.0).unwrap();
        assert_eq!(
            String::from_utf8(job).unwrap(),
            "SIZE 100 mm,20 mm\nDIRECTION 1\nCLS\nTEXT 10,10,\"2\",0,1,1,\"LOT 42\"\nPRINT 1,1\n"
        );
    }

    #[test]
    fn test_text_injection_rejected() {
        for bad in [
            "a\"b",
            "line\nPRINT 100",
            "cr\r",
            "tab\t",
            "\u{7f}",
            "\"\nDOWNLOAD \"EVIL\",1,x",
        ] {
            let err = text_job(bad, 0, 0, 50.0, 25.0).unwrap_err();
            assert!(matches!(err, LabelError::InvalidCommand(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_text_allows_unicode_and_punctuation() {
        assert!(text(0, 0, "Çay 100g, %5 İndirim: 'ok'").is_ok());
    }

    #[test]
    fn test_asset_name_rules() {
        assert_eq!(name("label.bmp").as_str(), "LABEL.BMP");
        assert_eq!(name("A_1-2.BMP").as_str(), "A_1-2.BMP");
        for bad in ["", "   ", "A\"B", "A B", "LOGO\n", &"X".repeat(33)] {
            assert!(
                matches!(AssetName::new(bad), Err(LabelError::InvalidCommand(_))),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_format_mm() {
        assert_eq!(format_mm(100.0), "100");
        assert_eq!(format_mm(29.0), "29");
        assert_eq!(format_mm(105.7), "105.7");
        assert_eq!(format_mm(50.25), "50.25");
        assert_eq!(format_mm(12.3456), "12.35");
    }

    #[test]
    fn test_job_rejects_bad_size() {
        assert!(matches!(
            raster_job(&name("L"), 0.0, 29.0),
            Err(LabelError::Configuration(_))
        ));
        assert!(matches!(
            text_job("x", 0, 0, 100.0, f64::NAN),
            Err(LabelError::Configuration(_))
        ));
    }
}

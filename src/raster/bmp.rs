//! # Monochrome BMP Encoding
//!
//! Serializes a [`Bitmap`] as an uncompressed 1-bit Windows BMP, the format
//! TSPL printers accept for `DOWNLOAD` + `PUTBMP`.
//!
//! ## Layout
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0 | 14 | `BITMAPFILEHEADER` (`"BM"`, file size, pixel offset = 62) |
//! | 14 | 40 | `BITMAPINFOHEADER` (1 bpp, `BI_RGB`, 2 colors) |
//! | 54 | 8 | Palette: index 0 = black, index 1 = white |
//! | 62 | … | Rows bottom-up, each padded to 4 bytes |
//!
//! The palette makes a 0 bit black and a 1 bit white, so the packed rows of a
//! `Bitmap` (1 = black) are written inverted.

use super::bitmap::Bitmap;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const PALETTE_LEN: u32 = 8;

/// Offset of the pixel array.
pub const PIXEL_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;

/// Bytes per stored row: one bit per pixel, padded to a 4-byte boundary.
pub fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(32) * 4
}

/// Encode `bitmap` as a 1-bit BMP.
///
/// `dpi` is recorded in the header's pixels-per-meter fields; printers ignore
/// it but image viewers use it for physical size.
pub fn encode(bitmap: &Bitmap, dpi: f64) -> Vec<u8> {
    let width = bitmap.width();
    let height = bitmap.height();
    let stride = row_stride(width);
    let image_size = (stride * height as usize) as u32;
    let file_size = PIXEL_OFFSET + image_size;
    let pixels_per_meter = (dpi * 1000.0 / 25.4).round() as i32;

    let mut out = Vec::with_capacity(file_size as usize);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&PIXEL_OFFSET.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes()); // positive = bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&1u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&pixels_per_meter.to_le_bytes());
    out.extend_from_slice(&pixels_per_meter.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes()); // colors used
    out.extend_from_slice(&2u32.to_le_bytes()); // colors important

    // Palette (B, G, R, reserved)
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);

    for y in (0..height).rev() {
        let row = bitmap.row(y);
        let start = out.len();
        out.extend(row.iter().map(|b| !b));
        // Padding bits/bytes are white
        out.resize(start + stride, 0xFF);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_row_stride() {
        assert_eq!(row_stride(1), 4);
        assert_eq!(row_stride(32), 4);
        assert_eq!(row_stride(33), 8);
        assert_eq!(row_stride(1181), 148);
    }

    #[test]
    fn test_header_fields() {
        let bmp = encode(&Bitmap::new(1181, 343), 300.0);
        assert_eq!(&bmp[0..2], b"BM");
        assert_eq!(u32_at(&bmp, 2) as usize, bmp.len());
        assert_eq!(u32_at(&bmp, 10), 62);
        assert_eq!(u32_at(&bmp, 18), 1181);
        assert_eq!(u32_at(&bmp, 22), 343);
        assert_eq!(u16::from_le_bytes([bmp[28], bmp[29]]), 1);
        assert_eq!(bmp.len(), 62 + 148 * 343);
    }

    #[test]
    fn test_rows_are_bottom_up_and_inverted() {
        // 2x2: top-left black only
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.set(0, 0, true);
        let bmp = encode(&bitmap, 203.0);
        let pixels = &bmp[PIXEL_OFFSET as usize..];
        // First stored row is the bottom row: all white
        assert_eq!(&pixels[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        // Second stored row is the top row: first bit 0 (black)
        assert_eq!(&pixels[4..8], &[0x7F, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decodes_with_image_crate() {
        let bitmap = Bitmap::from_fn(37, 11, |x, y| x == y || x == 36);
        let bytes = encode(&bitmap, 300.0);
        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (37, 11));
        for y in 0..11 {
            for x in 0..37 {
                let black = decoded.get_pixel(x, y)[0] < 128;
                assert_eq!(black, bitmap.is_black(x, y), "pixel ({}, {})", x, y);
            }
        }
    }
}

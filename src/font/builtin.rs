//! Built-in bitmap font, the last step of the fallback chain.
//!
//! Uses Spleen 12×24, compiled into the binary, so text always renders even
//! on a machine with no font files at all. The size is fixed.

use spleen_font::{FONT_12X24, PSF2Font};

use crate::raster::Bitmap;

pub const GLYPH_WIDTH: u32 = 12;
pub const GLYPH_HEIGHT: u32 = 24;

/// Render `text` with the built-in font. `\n` starts a new line.
pub fn rasterize(text: &str) -> Bitmap {
    let lines: Vec<&str> = text.split('\n').collect();
    let columns = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    if columns == 0 {
        return Bitmap::new(0, 0);
    }

    let mut out = Bitmap::new(columns * GLYPH_WIDTH, lines.len() as u32 * GLYPH_HEIGHT);
    let Ok(mut spleen) = PSF2Font::new(FONT_12X24) else {
        return out;
    };

    for (line_idx, line) in lines.iter().enumerate() {
        let origin_y = line_idx as u32 * GLYPH_HEIGHT;
        for (col, ch) in line.chars().enumerate() {
            let origin_x = col as u32 * GLYPH_WIDTH;
            if ch == ' ' {
                continue;
            }
            let utf8 = ch.to_string();
            match spleen.glyph_for_utf8(utf8.as_bytes()) {
                Some(glyph) => {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if on && (col_x as u32) < GLYPH_WIDTH && (row_y as u32) < GLYPH_HEIGHT {
                                out.set(origin_x + col_x as u32, origin_y + row_y as u32, true);
                            }
                        }
                    }
                }
                None => draw_box(&mut out, origin_x, origin_y),
            }
        }
    }

    out
}

/// Box outline for characters the font does not cover.
fn draw_box(out: &mut Bitmap, origin_x: u32, origin_y: u32) {
    for x in 0..GLYPH_WIDTH {
        out.set(origin_x + x, origin_y, true);
        out.set(origin_x + x, origin_y + GLYPH_HEIGHT - 1, true);
    }
    for y in 0..GLYPH_HEIGHT {
        out.set(origin_x, origin_y + y, true);
        out.set(origin_x + GLYPH_WIDTH - 1, origin_y + y, true);
    }
}

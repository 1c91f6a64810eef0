//! Outline (TrueType/OpenType) text rendering via ab_glyph.
//!
//! Glyph coverage is accumulated into an f32 buffer exactly like an
//! anti-aliased render, then cut at 50 % so the output is bi-level.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};

use crate::raster::Bitmap;

/// Coverage at or above this is a black dot.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// Render `text` at `size_px` (em height in pixels). `\n` starts a new line.
///
/// The result is as wide as the longest line's advance and as tall as the
/// font's line height times the line count; the first baseline sits at the
/// font's ascent.
pub fn rasterize(font: &FontArc, size_px: f32, text: &str) -> Bitmap {
    let scale = PxScale::from(size_px);
    let scaled = font.as_scaled(scale);

    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let line_advance = (ascent - descent + scaled.line_gap()).ceil().max(1.0);

    // Layout: compute glyph positions
    let mut glyphs = Vec::new();
    let mut max_width = 0.0f32;
    let lines: Vec<&str> = text.split('\n').collect();

    for (line_idx, line) in lines.iter().enumerate() {
        let baseline_y = ascent + line_idx as f32 * line_advance;
        let mut caret_x = 0.0f32;
        let mut previous = None;
        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push(glyph_id.with_scale_and_position(scale, ab_glyph::point(caret_x, baseline_y)));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
        max_width = max_width.max(caret_x);
    }

    let width = max_width.ceil() as usize;
    let last_line_height = (ascent - descent).ceil();
    let height = ((lines.len() - 1) as f32 * line_advance + last_line_height).max(0.0) as usize;
    if width == 0 || height == 0 {
        return Bitmap::new(0, 0);
    }

    let mut coverage = vec![0.0f32; width * height];

    // Rasterize each glyph
    for glyph in glyphs {
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, c| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    let idx = y as usize * width + x as usize;
                    coverage[idx] = (coverage[idx] + c).min(1.0);
                }
            });
        }
    }

    Bitmap::from_fn(width as u32, height as u32, |x, y| {
        coverage[y as usize * width + x as usize] >= COVERAGE_THRESHOLD
    })
}

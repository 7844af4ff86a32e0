//! Minimal bitmap text rendering.
//!
//! Glyphs are a compact embedded 5x7 pixel font, scaled to the requested
//! size. This stands in for platform text shaping in previews and tests;
//! lowercase letters fold to their uppercase forms.

use cutreel_composition::TextAlign;

use crate::color::Rgba;
use crate::surface::Surface;

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;

/// Draw a line of text centered vertically on `y` (middle baseline).
/// `x` is interpreted per `align`: the center, left, or right edge of the
/// rendered line.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    surface: &mut Surface,
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    font_weight: u32,
    color: Rgba,
    align: TextAlign,
    stroke: Option<(Rgba, f64)>,
    opacity: f64,
) {
    if text.is_empty() || font_size <= 0.0 {
        return;
    }
    let scale = font_size / GLYPH_ROWS as f64;
    let advance = (GLYPH_COLS + 1) as f64 * scale;
    let line_width = advance * text.chars().count() as f64 - scale;

    let origin_x = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - line_width / 2.0,
        TextAlign::Right => x - line_width,
    };
    let top = y - GLYPH_ROWS as f64 * scale / 2.0;
    let bold = font_weight >= 600;

    if let Some((stroke_color, stroke_width)) = stroke {
        if stroke_width > 0.0 {
            let w = stroke_width;
            for (ox, oy) in [
                (-w, -w),
                (0.0, -w),
                (w, -w),
                (-w, 0.0),
                (w, 0.0),
                (-w, w),
                (0.0, w),
                (w, w),
            ] {
                draw_pass(
                    surface,
                    text,
                    origin_x + ox,
                    top + oy,
                    scale,
                    advance,
                    bold,
                    stroke_color,
                    opacity,
                );
            }
        }
    }

    draw_pass(
        surface, text, origin_x, top, scale, advance, bold, color, opacity,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_pass(
    surface: &mut Surface,
    text: &str,
    origin_x: f64,
    top: f64,
    scale: f64,
    advance: f64,
    bold: bool,
    color: Rgba,
    opacity: f64,
) {
    // Bold widens each glyph pixel instead of double striking.
    let pixel_w = if bold { scale * 1.25 } else { scale };
    for (i, c) in text.chars().enumerate() {
        let glyph = glyph_for(c);
        let glyph_x = origin_x + i as f64 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (0b10000 >> col) != 0 {
                    surface.fill_rect(
                        glyph_x + col as f64 * scale,
                        top + row as f64 * scale,
                        pixel_w,
                        scale,
                        color,
                        opacity,
                    );
                }
            }
        }
    }
}

/// 5x7 glyph rows, bit 4 is the leftmost column.
fn glyph_for(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        ';' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '#' => [0b01010, 0b11111, 0b01010, 0b01010, 0b01010, 0b11111, 0b01010],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        // Unknown characters render as a hollow box.
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_x_range(surface: &Surface) -> Option<(u32, u32)> {
        let mut min = None;
        let mut max = None;
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                if surface.pixel(x, y) != Rgba::BLACK {
                    min = Some(min.map_or(x, |m: u32| m.min(x)));
                    max = Some(max.map_or(x, |m: u32| m.max(x)));
                }
            }
        }
        min.zip(max)
    }

    #[test]
    fn draws_something_for_plain_text() {
        let mut surface = Surface::new(100, 40);
        surface.clear(Rgba::BLACK);
        draw_text(
            &mut surface,
            "Hi",
            50.0,
            20.0,
            21.0,
            400,
            Rgba::WHITE,
            TextAlign::Center,
            None,
            1.0,
        );
        assert!(painted_x_range(&surface).is_some());
    }

    #[test]
    fn center_alignment_straddles_the_anchor() {
        let mut surface = Surface::new(200, 40);
        surface.clear(Rgba::BLACK);
        draw_text(
            &mut surface,
            "AAAA",
            100.0,
            20.0,
            14.0,
            400,
            Rgba::WHITE,
            TextAlign::Center,
            None,
            1.0,
        );
        let (min, max) = painted_x_range(&surface).unwrap();
        assert!(min < 100 && max > 100);
        let center = (min + max) as f64 / 2.0;
        assert!((center - 100.0).abs() < 4.0);
    }

    #[test]
    fn left_and_right_alignment_sit_on_opposite_sides() {
        let mut left = Surface::new(200, 40);
        left.clear(Rgba::BLACK);
        draw_text(
            &mut left,
            "AB",
            100.0,
            20.0,
            14.0,
            400,
            Rgba::WHITE,
            TextAlign::Left,
            None,
            1.0,
        );
        let (lmin, _) = painted_x_range(&left).unwrap();
        assert!(lmin >= 100);

        let mut right = Surface::new(200, 40);
        right.clear(Rgba::BLACK);
        draw_text(
            &mut right,
            "AB",
            100.0,
            20.0,
            14.0,
            400,
            Rgba::WHITE,
            TextAlign::Right,
            None,
            1.0,
        );
        let (_, rmax) = painted_x_range(&right).unwrap();
        assert!(rmax <= 100);
    }

    #[test]
    fn stroke_paints_outside_the_fill() {
        let mut plain = Surface::new(60, 40);
        plain.clear(Rgba::BLACK);
        draw_text(
            &mut plain,
            "O",
            30.0,
            20.0,
            21.0,
            400,
            Rgba::WHITE,
            TextAlign::Center,
            None,
            1.0,
        );
        let (pmin, pmax) = painted_x_range(&plain).unwrap();

        let mut stroked = Surface::new(60, 40);
        stroked.clear(Rgba::BLACK);
        draw_text(
            &mut stroked,
            "O",
            30.0,
            20.0,
            21.0,
            400,
            Rgba::WHITE,
            TextAlign::Center,
            Some((Rgba::opaque(255, 0, 0), 2.0)),
            1.0,
        );
        let (smin, smax) = painted_x_range(&stroked).unwrap();
        assert!(smin < pmin && smax > pmax);
    }
}

//! Tiny 3x5 block font for HUD, menu and editor status text.

use super::surface::{Rgba, ScreenRect, Surface};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let advance = (GLYPH_WIDTH as u32 + 1) * scale;
    (text.chars().count() as u32 * advance).saturating_sub(scale)
}

pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT as u32 * scale
}

/// Draws `text` with its top-left at `(x, y)`. Lowercase letters use the
/// uppercase shapes; characters without a shape draw as `?`.
pub fn draw_text(surface: &mut dyn Surface, x: i32, y: i32, scale: u32, color: Rgba, text: &str) {
    if scale == 0 {
        return;
    }
    let step = scale as i32;
    let mut pen_x = x;
    for ch in text.chars() {
        let bits = glyph_bits(ch.to_ascii_uppercase());
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
                if bits & (1 << shift) != 0 {
                    surface.fill_rect(
                        ScreenRect::new(pen_x + col * step, y + row * step, scale, scale),
                        color,
                    );
                }
            }
        }
        pen_x += (GLYPH_WIDTH + 1) * step;
    }
}

pub fn draw_text_centered(
    surface: &mut dyn Surface,
    center_x: i32,
    y: i32,
    scale: u32,
    color: Rgba,
    text: &str,
) {
    let x = center_x - (text_width(text, scale) / 2) as i32;
    draw_text(surface, x, y, scale, color, text);
}

/// Rows top to bottom, three bits per row, most significant bit leftmost.
fn glyph_bits(ch: char) -> u16 {
    match ch {
        ' ' => 0,
        '!' => 0b010_010_010_000_010,
        '%' => 0b101_001_010_100_101,
        '(' => 0b001_010_010_010_001,
        ')' => 0b100_010_010_010_100,
        '*' => 0b000_101_010_101_000,
        '+' => 0b000_010_111_010_000,
        ',' => 0b000_000_000_010_100,
        '-' => 0b000_000_111_000_000,
        '.' => 0b000_000_000_000_010,
        '/' => 0b001_001_010_100_100,
        '0' => 0b111_101_101_101_111,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_010_010_010,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        ':' => 0b000_010_000_010_000,
        ';' => 0b000_010_000_010_100,
        '<' => 0b001_010_100_010_001,
        '=' => 0b000_111_000_111_000,
        '>' => 0b100_010_001_010_100,
        '?' => 0b111_001_011_000_010,
        'A' => 0b010_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b111_100_100_100_111,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_110_100_111,
        'F' => 0b111_100_110_100_100,
        'G' => 0b111_100_101_101_111,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b111_001_001_101_111,
        'K' => 0b101_101_110_101_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_111_101_101,
        'N' => 0b101_111_111_111_101,
        'O' => 0b111_101_101_101_111,
        'P' => 0b110_101_110_100_100,
        'Q' => 0b111_101_101_111_001,
        'R' => 0b110_101_110_101_101,
        'S' => 0b111_100_111_001_111,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_111,
        'V' => 0b101_101_101_101_010,
        'W' => 0b101_101_111_111_101,
        'X' => 0b101_101_010_101_101,
        'Y' => 0b101_101_010_010_010,
        'Z' => 0b111_001_010_100_111,
        '[' => 0b110_100_100_100_110,
        ']' => 0b011_001_001_001_011,
        '_' => 0b000_000_000_000_111,
        _ => 0b111_001_011_000_010,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::surface::testing::{DrawCall, RecordingSurface};

    #[test]
    fn one_glyph_fills_one_rect_per_lit_pixel() {
        let mut surface = RecordingSurface::new(100, 100);
        draw_text(&mut surface, 10, 20, 2, [1, 2, 3, 255], "1");
        // '1' lights 1 + 2 + 1 + 1 + 3 pixels.
        assert_eq!(surface.calls.len(), 8);
        assert_eq!(
            surface.calls[0],
            DrawCall::Fill(ScreenRect::new(12, 20, 2, 2), [1, 2, 3, 255])
        );
    }

    #[test]
    fn lowercase_matches_uppercase_and_space_draws_nothing() {
        assert_eq!(glyph_bits('a'.to_ascii_uppercase()), glyph_bits('A'));
        let mut surface = RecordingSurface::new(10, 10);
        draw_text(&mut surface, 0, 0, 1, [0, 0, 0, 255], "   ");
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn width_accounts_for_spacing() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("A", 3), 9);
        assert_eq!(text_width("AB", 3), 21);
        assert_eq!(text_height(4), 20);
    }
}

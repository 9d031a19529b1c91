//! Tiny 5x7 bitmap font for the score and the frame statistics
//!
//! Covers digits, the handful of capitals the overlays spell out, and some
//! punctuation. Lowercase is folded to uppercase; anything else is blank.

use super::PixelBuffer;

/// Advance per character, including one column of spacing
pub const GLYPH_WIDTH: u32 = 6;
/// Line height, including one row of spacing
pub const GLYPH_HEIGHT: u32 = 8;

const ROWS: usize = 7;

/// Rows top to bottom; bit 4 is the leftmost column
fn glyph(c: char) -> [u8; ROWS] {
    match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => [0; ROWS],
    }
}

/// Draw `text` with each font pixel blown up to a `scale` x `scale` block
pub fn draw_text_scaled(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    text: &str,
    scale: u32,
    r: u8,
    g: u8,
    b: u8,
) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for c in text.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..5 {
                if bits & (0x10 >> col) != 0 {
                    buffer.fill_rect(
                        pen_x + (col * scale) as i32,
                        y + (row as u32 * scale) as i32,
                        scale,
                        scale,
                        r,
                        g,
                        b,
                    );
                }
            }
        }
        pen_x += (GLYPH_WIDTH * scale) as i32;
    }
}

pub fn draw_text(buffer: &mut PixelBuffer, x: i32, y: i32, text: &str, r: u8, g: u8, b: u8) {
    draw_text_scaled(buffer, x, y, text, 1, r, g, b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_one() {
        let mut buf = PixelBuffer::with_size(12, 8);
        draw_text(&mut buf, 0, 0, "1", 255, 255, 255);
        // Top row of '1' is a single pixel in the middle column
        assert_eq!(buf.get_pixel(2, 0), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
        // Bottom row spans three columns
        assert_eq!(buf.get_pixel(1, 6), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(3, 6), Some((255, 255, 255)));
    }

    #[test]
    fn test_scaled_blocks_and_lowercase() {
        let mut buf = PixelBuffer::with_size(24, 16);
        draw_text_scaled(&mut buf, 0, 0, "l", 2, 7, 7, 7);
        // 'L' left column, scaled: pixels (0..2, 0..14)
        assert_eq!(buf.get_pixel(1, 1), Some((7, 7, 7)));
        assert_eq!(buf.get_pixel(1, 13), Some((7, 7, 7)));
        assert_eq!(buf.get_pixel(2, 1), Some((0, 0, 0)));
    }

    #[test]
    fn test_overlay_letters_have_glyphs() {
        for c in "SCOREFPSMINAXMS".chars() {
            assert!(glyph(c).iter().any(|row| *row != 0), "no glyph for {}", c);
        }
    }

    #[test]
    fn test_unknown_glyph_is_blank() {
        let mut buf = PixelBuffer::with_size(6, 8);
        draw_text(&mut buf, 0, 0, "#", 255, 0, 0);
        assert!(buf.as_bytes().chunks_exact(4).all(|px| px[3] == 0));
    }
}

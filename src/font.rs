/// Tiny 3x5 bitmap font for marker labels.
/// Covers digits, the letters in "id" and the few symbols a label needs.
use image::{Rgb, RgbImage};

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

pub fn draw_text_line(img: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>, scale: u32) {
    let advance = ((GLYPH_W + 1) * scale) as i32;
    let mut cx = x;
    for c in text.chars() {
        draw_char(img, cx, y, c, color, scale);
        cx += advance;
    }
}

pub fn measure_text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * (GLYPH_W + 1) * scale
}

pub fn text_height(scale: u32) -> u32 {
    GLYPH_H * scale
}

fn glyph(c: char) -> [u8; 5] {
    // One row per entry, bit 2 is the leftmost column
    match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '=' => [0x0, 0x7, 0x0, 0x7, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7],
    }
}

fn draw_char(img: &mut RgbImage, x: i32, y: i32, c: char, color: Rgb<u8>, scale: u32) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let scale = scale as i32;

    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..GLYPH_W as i32 {
            if (bits >> (2 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as i32 * scale + dy;
                    if px >= 0 && px < w && py >= 0 && py < h {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

//! Pixel drawing helpers for the chart renderer

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

/// Side of one unscaled glyph cell in pixels
pub const GLYPH_SIZE: i64 = 8;

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
    pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
    pub const LEGEND_EDGE: Rgb<u8> = Rgb([204, 204, 204]);
}

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left to right
    Horizontal,
    /// Bottom to top, rotated a quarter turn counter-clockwise
    Vertical,
}

/// Blend `color` over the pixel at `(x, y)` with opacity `alpha`.
/// Coordinates outside the image are ignored.
pub fn blend_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f64) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let blended = (1.0 - alpha) * pixel.0[c] as f64 + alpha * color.0[c] as f64;
        pixel.0[c] = blended.round() as u8;
    }
}

/// Draw a filled square of half-width `radius` centered on `(x, y)`
pub fn draw_dot(img: &mut RgbImage, x: i64, y: i64, radius: i64, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            blend_pixel(img, x + dx, y + dy, color, 1.0);
        }
    }
}

/// Draw a filled disc, blended with opacity `alpha`
pub fn draw_disc(img: &mut RgbImage, x: i64, y: i64, radius: i64, color: Rgb<u8>, alpha: f64) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                blend_pixel(img, x + dx, y + dy, color, alpha);
            }
        }
    }
}

/// Draw a line of the given thickness between two points (Bresenham)
pub fn draw_line(
    img: &mut RgbImage,
    (x1, y1): (i64, i64),
    (x2, y2): (i64, i64),
    thickness: i64,
    color: Rgb<u8>,
) {
    let radius = (thickness / 2).max(0);
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    let (mut x, mut y) = (x1, y1);
    loop {
        draw_dot(img, x, y, radius, color);

        if x == x2 && y == y2 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a horizontal line from `x1` to `x2` at `y`
pub fn draw_horizontal_line(img: &mut RgbImage, y: i64, x1: i64, x2: i64, thickness: i64, color: Rgb<u8>) {
    draw_line(img, (x1.min(x2), y), (x1.max(x2), y), thickness, color);
}

/// Draw a vertical line from `y1` to `y2` at `x`
pub fn draw_vertical_line(img: &mut RgbImage, x: i64, y1: i64, y2: i64, thickness: i64, color: Rgb<u8>) {
    draw_line(img, (x, y1.min(y2)), (x, y1.max(y2)), thickness, color);
}

/// Draw a dashed horizontal line with `dash` pixels on, `gap` pixels off
#[allow(clippy::too_many_arguments)]
pub fn draw_dashed_horizontal_line(
    img: &mut RgbImage,
    y: i64,
    x1: i64,
    x2: i64,
    thickness: i64,
    dash: i64,
    gap: i64,
    color: Rgb<u8>,
) {
    let (start, end) = (x1.min(x2), x1.max(x2));
    let period = (dash + gap).max(1);
    let mut x = start;
    while x <= end {
        let dash_end = (x + dash.max(1) - 1).min(end);
        draw_horizontal_line(img, y, x, dash_end, thickness, color);
        x += period;
    }
}

/// Draw a rectangle outline
pub fn draw_rect_outline(img: &mut RgbImage, left: i64, top: i64, right: i64, bottom: i64, color: Rgb<u8>) {
    draw_horizontal_line(img, top, left, right, 1, color);
    draw_horizontal_line(img, bottom, left, right, 1, color);
    draw_vertical_line(img, left, top, bottom, 1, color);
    draw_vertical_line(img, right, top, bottom, 1, color);
}

/// Fill the rectangle spanning `left..=right`, `top..=bottom`
pub fn fill_rect(img: &mut RgbImage, left: i64, top: i64, right: i64, bottom: i64, color: Rgb<u8>) {
    for y in top..=bottom {
        for x in left..=right {
            blend_pixel(img, x, y, color, 1.0);
        }
    }
}

/// Advance of `text` in pixels along its direction at `scale`
pub fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH_SIZE * scale.max(1)
}

/// Draw `text` with the 8x8 bitmap font, each glyph pixel a `scale`-sided
/// square. `(x, y)` is the top-left corner of the text's bounding box.
/// Characters without a glyph advance the cursor and leave a blank cell.
pub fn draw_text(
    img: &mut RgbImage,
    x: i64,
    y: i64,
    text: &str,
    scale: i64,
    color: Rgb<u8>,
    orientation: Orientation,
) {
    let scale = scale.max(1);
    let length = text_width(text, scale);

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        for (gy, row) in glyph.iter().enumerate() {
            for gx in 0..GLYPH_SIZE {
                if *row & (1u8 << gx) == 0 {
                    continue;
                }
                let u = (i as i64 * GLYPH_SIZE + gx) * scale;
                let v = gy as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        let (px, py) = match orientation {
                            Orientation::Horizontal => (x + u + sx, y + v + sy),
                            Orientation::Vertical => (x + v + sy, y + length - 1 - (u + sx)),
                        };
                        blend_pixel(img, px, py, color, 1.0);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_pixel() {
        let mut img = RgbImage::from_pixel(2, 2, colors::WHITE);
        blend_pixel(&mut img, 0, 0, colors::BLACK, 0.5);
        assert_eq!(*img.get_pixel(0, 0), Rgb([128, 128, 128]));

        // Out of bounds is a no-op
        blend_pixel(&mut img, -1, 5, colors::BLACK, 1.0);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut img = RgbImage::from_pixel(10, 10, colors::WHITE);
        draw_line(&mut img, (1, 1), (8, 6), 1, colors::BLACK);
        assert_eq!(*img.get_pixel(1, 1), colors::BLACK);
        assert_eq!(*img.get_pixel(8, 6), colors::BLACK);
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut img = RgbImage::from_pixel(20, 3, colors::WHITE);
        draw_dashed_horizontal_line(&mut img, 1, 0, 19, 1, 4, 4, colors::RED);

        assert_eq!(*img.get_pixel(0, 1), colors::RED);
        assert_eq!(*img.get_pixel(3, 1), colors::RED);
        assert_eq!(*img.get_pixel(5, 1), colors::WHITE);
        assert_eq!(*img.get_pixel(8, 1), colors::RED);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("Spin", 1), 32);
        assert_eq!(text_width("Spin", 3), 96);
        assert_eq!(text_width("", 2), 0);
    }

    #[test]
    fn test_draw_text_stays_in_its_box() {
        let mut img = RgbImage::from_pixel(40, 20, colors::WHITE);
        draw_text(&mut img, 2, 3, "Hi", 1, colors::BLACK, Orientation::Horizontal);

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == colors::BLACK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| (2..18).contains(&x) && (3..11).contains(&y)));
    }

    #[test]
    fn test_vertical_text_is_rotated() {
        let mut img = RgbImage::from_pixel(20, 40, colors::WHITE);
        draw_text(&mut img, 1, 2, "Hi", 2, colors::BLACK, Orientation::Vertical);

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == colors::BLACK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        // 16 px wide, 32 px tall box
        assert!(inked.iter().all(|&(x, y)| (1..17).contains(&x) && (2..34).contains(&y)));
        // The first glyph sits at the bottom
        assert!(inked.iter().any(|&(_, y)| y >= 18));
    }

    #[test]
    fn test_fill_rect() {
        let mut img = RgbImage::from_pixel(5, 5, colors::WHITE);
        fill_rect(&mut img, 1, 1, 3, 2, colors::RED);
        assert_eq!(img.pixels().filter(|p| **p == colors::RED).count(), 6);
    }
}

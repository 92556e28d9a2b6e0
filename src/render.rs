use crate::types::LineRect;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0xcc, 255]);
const STROKE_WIDTH: u32 = 2;

/// Copy of `image` with every line outlined
pub fn draw_lines(image: &DynamicImage, lines: &[LineRect]) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    for line in lines {
        for inset in 0..STROKE_WIDTH {
            if line.w <= 2 * inset || line.h <= 2 * inset {
                break;
            }
            let rect = Rect::at((line.x + inset) as i32, (line.y + inset) as i32)
                .of_size(line.w - 2 * inset, line.h - 2 * inset);
            draw_hollow_rect_mut(&mut canvas, rect, STROKE_COLOR);
        }
    }
    canvas
}

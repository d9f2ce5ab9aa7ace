use crate::app::collision::Rectangle;
use crate::app::sprites::Sprite;
use crate::app::units::{game_to_pixel, Vec2};

use super::{GraphicsSink, RenderError, CLEAR_COLOR};

/// CPU-side RGBA frame. The window renderer draws through the same helpers
/// into its surface buffer.
#[derive(Debug, Clone)]
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    frame: Vec<u8>,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = &self.frame[offset..offset + 4];
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl GraphicsSink for SoftwareCanvas {
    fn clear(&mut self) {
        clear_frame(&mut self.frame, CLEAR_COLOR);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2) {
        blit_sprite(&mut self.frame, self.width, self.height, sprite, top_left);
    }

    fn fill_rect(&mut self, rect: Rectangle, color: [u8; 4]) {
        fill_rect_clipped(&mut self.frame, self.width, self.height, rect, color);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

pub(super) fn clear_frame(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

/// Copies the sprite's source rectangle with 1-bit alpha: fully transparent
/// texels are skipped, everything else overwrites.
pub(super) fn blit_sprite(frame: &mut [u8], width: u32, height: u32, sprite: &Sprite, top_left: Vec2) {
    let source = sprite.source();
    let sheet = sprite.sheet();
    let origin_x = game_to_pixel(top_left.x);
    let origin_y = game_to_pixel(top_left.y);
    for dy in 0..source.height {
        let y = origin_y + dy as i32;
        if y < 0 || y >= height as i32 {
            continue;
        }
        for dx in 0..source.width {
            let x = origin_x + dx as i32;
            if x < 0 || x >= width as i32 {
                continue;
            }
            let Some(texel) = sheet.pixel(source.x + dx, source.y + dy) else {
                continue;
            };
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(frame, width as usize, x, y, texel);
        }
    }
}

pub(super) fn fill_rect_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: Rectangle,
    color: [u8; 4],
) {
    let left = game_to_pixel(rect.left()).max(0);
    let top = game_to_pixel(rect.top()).max(0);
    let right = game_to_pixel(rect.right()).min(width as i32);
    let bottom = game_to_pixel(rect.bottom()).min(height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(target) = frame.get_mut(byte_offset..byte_offset + 4) {
        target.copy_from_slice(&color);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::sprites::{PixelRect, SpriteSheet};

    fn two_by_two_sprite() -> Sprite {
        let rgba = vec![
            255, 0, 0, 255, 0, 0, 0, 0, //
            0, 255, 0, 255, 0, 0, 255, 255,
        ];
        let sheet = Arc::new(SpriteSheet::from_rgba("quad", 2, 2, rgba).expect("sheet"));
        Sprite::new(sheet, PixelRect::new(0, 0, 2, 2)).expect("sprite")
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = SoftwareCanvas::new(3, 2);
        canvas.clear();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(canvas.pixel(x, y), Some(CLEAR_COLOR));
            }
        }
    }

    #[test]
    fn blit_skips_transparent_texels() {
        let mut canvas = SoftwareCanvas::new(4, 4);
        canvas.clear();
        canvas.draw_sprite(&two_by_two_sprite(), Vec2::new(1.0, 1.0));

        assert_eq!(canvas.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(2, 1), Some(CLEAR_COLOR));
        assert_eq!(canvas.pixel(1, 2), Some([0, 255, 0, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 255, 255]));
    }

    #[test]
    fn blit_clips_at_frame_edges() {
        let mut canvas = SoftwareCanvas::new(2, 2);
        canvas.clear();
        canvas.draw_sprite(&two_by_two_sprite(), Vec2::new(-1.0, 1.0));

        assert_eq!(canvas.pixel(0, 1), Some(CLEAR_COLOR));
        assert_eq!(canvas.pixel(0, 0), Some(CLEAR_COLOR));
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let mut canvas = SoftwareCanvas::new(4, 4);
        canvas.clear();
        canvas.fill_rect(Rectangle::new(2.0, -3.0, 10.0, 5.0), [9, 9, 9, 255]);

        assert_eq!(canvas.pixel(3, 1), Some([9, 9, 9, 255]));
        assert_eq!(canvas.pixel(1, 1), Some(CLEAR_COLOR));
        assert_eq!(canvas.pixel(3, 2), Some(CLEAR_COLOR));
    }
}

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::collision::Rectangle;
use crate::app::sprites::Sprite;
use crate::app::units::Vec2;

use super::canvas::{blit_sprite, clear_frame, fill_rect_clipped};
use super::{GraphicsSink, RenderError, CLEAR_COLOR};

/// Window-backed sink. The logical buffer stays at screen resolution and the
/// surface scales it to whatever size the window has.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(window: &'static Window, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(buffer_width, buffer_height, surface)?;
        Ok(Self {
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels
            .resize_surface(width, height)
            .map_err(RenderError::Resize)
    }
}

impl GraphicsSink for Renderer {
    fn clear(&mut self) {
        clear_frame(self.pixels.frame_mut(), CLEAR_COLOR);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2) {
        blit_sprite(
            self.pixels.frame_mut(),
            self.buffer_width,
            self.buffer_height,
            sprite,
            top_left,
        );
    }

    fn fill_rect(&mut self, rect: Rectangle, color: [u8; 4]) {
        fill_rect_clipped(
            self.pixels.frame_mut(),
            self.buffer_width,
            self.buffer_height,
            rect,
            color,
        );
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.pixels.render().map_err(RenderError::Present)
    }
}

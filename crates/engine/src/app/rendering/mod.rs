mod canvas;
mod renderer;

use thiserror::Error;

use super::collision::Rectangle;
use super::sprites::{PixelRect, Sprite};
use super::units::Vec2;

pub use canvas::SoftwareCanvas;
pub use renderer::Renderer;

pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
    #[error("failed to resize render surface: {0}")]
    Resize(#[source] pixels::TextureError),
}

/// Drawing surface handed to entities. Positions are in game units.
pub trait GraphicsSink {
    fn clear(&mut self);
    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2);
    fn fill_rect(&mut self, rect: Rectangle, color: [u8; 4]);
    fn present(&mut self) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Sprite {
        sheet_key: String,
        source: PixelRect,
        top_left: Vec2,
    },
    FillRect {
        rect: Rectangle,
        color: [u8; 4],
    },
    Present,
}

/// Headless sink that keeps every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<DrawOp>,
    pub sprites: Vec<(String, PixelRect, Vec2)>,
    pub presented_frames: u32,
}

impl GraphicsSink for RecordingSink {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2) {
        let sheet_key = sprite.sheet().key().to_string();
        self.sprites
            .push((sheet_key.clone(), sprite.source(), top_left));
        self.ops.push(DrawOp::Sprite {
            sheet_key,
            source: sprite.source(),
            top_left,
        });
    }

    fn fill_rect(&mut self, rect: Rectangle, color: [u8; 4]) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presented_frames = self.presented_frames.saturating_add(1);
        self.ops.push(DrawOp::Present);
        Ok(())
    }
}

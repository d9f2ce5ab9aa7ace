use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use super::units::{Facing, Tile, TILE_SIZE};

const PLACEHOLDER_SHEET_SIZE_PX: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("invalid sprite key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("failed to open sprite sheet {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite sheet {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "sprite source {source_rect:?} lies outside sheet '{key}' ({sheet_width}x{sheet_height})"
    )]
    SourceOutOfBounds {
        key: String,
        source_rect: PixelRect,
        sheet_width: u32,
        sheet_height: u32,
    },
    #[error("sprite sheet '{key}' has {actual} bytes of pixel data, expected {expected}")]
    BufferSize {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[error("animated sprite '{key}' needs at least one frame and a non-zero fps")]
    EmptyAnimation { key: String },
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

/// Source rectangle inside a sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One tile-sized cell at the given tile column/row.
    pub fn tile(column: Tile, row: Tile) -> Self {
        let size = TILE_SIZE as u32;
        Self::new(column * size, row * size, size, size)
    }

    fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= height)
    }
}

#[derive(Debug)]
pub struct SpriteSheet {
    key: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    placeholder: bool,
}

impl SpriteSheet {
    pub fn from_rgba(
        key: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, SpriteError> {
        let key = key.into();
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SpriteError::BufferSize {
                key,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            key,
            width,
            height,
            rgba,
            placeholder: false,
        })
    }

    /// Checkerboard of tile-sized cells tinted per key and per row, so the
    /// distinct rows of a missing sheet stay distinguishable on screen.
    fn placeholder(key: &str) -> Self {
        let size = PLACEHOLDER_SHEET_SIZE_PX;
        let tile = TILE_SIZE as u32;
        let seed = key
            .bytes()
            .fold(0x811c_9dc5u32, |hash, byte| (hash ^ byte as u32).wrapping_mul(0x0100_0193));
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let row = y / tile;
                let inset = x % tile >= 4 && x % tile < tile - 4 && y % tile >= 4 && y % tile < tile - 4;
                if !inset {
                    rgba.extend_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                let tint = seed.rotate_left(row * 5);
                rgba.extend_from_slice(&[
                    96 | (tint & 0x7f) as u8,
                    96 | ((tint >> 8) & 0x7f) as u8,
                    96 | ((tint >> 16) & 0x7f) as u8,
                    255,
                ]);
            }
        }
        Self {
            key: key.to_string(),
            width: size,
            height: size,
            rgba,
            placeholder: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// A sub-rectangle of a shared sheet. Cloning shares the sheet.
#[derive(Debug, Clone)]
pub struct Sprite {
    sheet: Arc<SpriteSheet>,
    source: PixelRect,
}

impl Sprite {
    pub fn new(sheet: Arc<SpriteSheet>, source: PixelRect) -> Result<Self, SpriteError> {
        if !source.fits_within(sheet.width, sheet.height) {
            return Err(SpriteError::SourceOutOfBounds {
                key: sheet.key.clone(),
                source_rect: source,
                sheet_width: sheet.width,
                sheet_height: sheet.height,
            });
        }
        Ok(Self { sheet, source })
    }

    pub fn sheet(&self) -> &SpriteSheet {
        &self.sheet
    }

    pub fn source(&self) -> PixelRect {
        self.source
    }

    pub fn shares_sheet_with(&self, other: &Sprite) -> bool {
        Arc::ptr_eq(&self.sheet, &other.sheet)
    }
}

/// Horizontal strip of equally sized frames advanced at a fixed rate.
#[derive(Debug, Clone)]
pub struct AnimatedSprite {
    frames: Vec<Sprite>,
    frame_time: Duration,
    elapsed_in_frame: Duration,
    current_frame: usize,
}

impl AnimatedSprite {
    pub fn new(
        sheet: Arc<SpriteSheet>,
        first_frame: PixelRect,
        num_frames: u32,
        fps: u32,
    ) -> Result<Self, SpriteError> {
        if num_frames == 0 || fps == 0 {
            return Err(SpriteError::EmptyAnimation {
                key: sheet.key.clone(),
            });
        }
        let frames = (0..num_frames)
            .map(|index| {
                let source = PixelRect {
                    x: first_frame.x + index * first_frame.width,
                    ..first_frame
                };
                Sprite::new(Arc::clone(&sheet), source)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            frames,
            frame_time: Duration::from_secs_f64(1.0 / fps as f64),
            elapsed_in_frame: Duration::ZERO,
            current_frame: 0,
        })
    }

    pub fn update(&mut self, elapsed: Duration) {
        self.elapsed_in_frame = self.elapsed_in_frame.saturating_add(elapsed);
        while self.elapsed_in_frame >= self.frame_time {
            self.elapsed_in_frame -= self.frame_time;
            self.current_frame = (self.current_frame + 1) % self.frames.len();
        }
    }

    pub fn current(&self) -> &Sprite {
        &self.frames[self.current_frame]
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// One value per [`Facing`], fully populated at construction so a lookup by
/// facing cannot miss.
#[derive(Debug, Clone)]
pub struct FacingTable<T> {
    entries: [T; Facing::COUNT],
}

impl<T> FacingTable<T> {
    pub fn try_build<E>(mut build: impl FnMut(Facing) -> Result<T, E>) -> Result<Self, E> {
        let left = build(Facing::Left)?;
        let right = build(Facing::Right)?;
        Ok(Self {
            entries: [left, right],
        })
    }

    pub fn get(&self, facing: Facing) -> &T {
        &self.entries[facing.index()]
    }

    pub fn get_mut(&mut self, facing: Facing) -> &mut T {
        &mut self.entries[facing.index()]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }
}

/// Loads and caches sprite sheets from `<sprite_root>/<key>.png`. Missing
/// files fall back to a generated placeholder; malformed files are errors.
#[derive(Debug)]
pub struct SpriteLibrary {
    sprite_root: PathBuf,
    sheets: HashMap<String, Arc<SpriteSheet>>,
    warned_missing_keys: HashSet<String>,
}

impl SpriteLibrary {
    pub fn new(sprite_root: impl Into<PathBuf>) -> Self {
        Self {
            sprite_root: sprite_root.into(),
            sheets: HashMap::new(),
            warned_missing_keys: HashSet::new(),
        }
    }

    pub fn sheet(&mut self, key: &str) -> Result<Arc<SpriteSheet>, SpriteError> {
        if let Some(sheet) = self.sheets.get(key) {
            return Ok(Arc::clone(sheet));
        }

        validate_sprite_key(key).map_err(|source| SpriteError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        let path = self.sprite_root.join(format!("{key}.png"));
        let sheet = if path.is_file() {
            let sheet = load_sheet(key, &path)?;
            debug!(
                sprite_key = key,
                width = sheet.width,
                height = sheet.height,
                "sprite_sheet_loaded"
            );
            sheet
        } else {
            if self.warned_missing_keys.insert(key.to_string()) {
                warn!(
                    sprite_key = key,
                    path = %path.display(),
                    "sprite_sheet_missing_using_placeholder"
                );
            }
            SpriteSheet::placeholder(key)
        };

        let sheet = Arc::new(sheet);
        self.sheets.insert(key.to_string(), Arc::clone(&sheet));
        Ok(sheet)
    }

    pub fn sprite(&mut self, key: &str, source: PixelRect) -> Result<Sprite, SpriteError> {
        Sprite::new(self.sheet(key)?, source)
    }

    pub fn animated(
        &mut self,
        key: &str,
        first_frame: PixelRect,
        num_frames: u32,
        fps: u32,
    ) -> Result<AnimatedSprite, SpriteError> {
        AnimatedSprite::new(self.sheet(key)?, first_frame, num_frames, fps)
    }

    pub fn cached_sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

fn load_sheet(key: &str, path: &Path) -> Result<SpriteSheet, SpriteError> {
    let reader = ImageReader::open(path).map_err(|source| SpriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| SpriteError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    SpriteSheet::from_rgba(key, image.width(), image.height(), image.into_raw())
}

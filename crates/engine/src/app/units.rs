use std::f32::consts::PI;

/// Continuous simulation distance. One tile is `TILE_SIZE` game units.
pub type Game = f32;
/// Whole-tile distance used by level layout and screen configuration.
pub type Tile = u32;
/// Screen distance after conversion for the renderer.
pub type Pixel = i32;
pub type Degrees = f32;
pub type Radians = f32;

pub const TILE_SIZE: Game = 32.0;
pub const HALF_TILE: Game = TILE_SIZE / 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: Game,
    pub y: Game,
}

impl Vec2 {
    pub const fn new(x: Game, y: Game) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub const COUNT: usize = 2;
    pub const ALL: [Facing; Facing::COUNT] = [Facing::Left, Facing::Right];

    pub const fn index(self) -> usize {
        match self {
            Facing::Left => 0,
            Facing::Right => 1,
        }
    }
}

pub const fn tile_to_game(tiles: Tile) -> Game {
    tiles as Game * TILE_SIZE
}

pub const fn tile_to_pixel(tiles: Tile) -> Pixel {
    tiles as Pixel * TILE_SIZE as Pixel
}

pub fn game_to_pixel(game: Game) -> Pixel {
    game.round() as Pixel
}

pub fn game_to_tile(game: Game) -> Tile {
    if game <= 0.0 {
        return 0;
    }
    (game / TILE_SIZE) as Tile
}

pub fn degrees_to_radians(degrees: Degrees) -> Radians {
    degrees * PI / 180.0
}

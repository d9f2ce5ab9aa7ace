/// Fixed test level: a solid floor row plus a short staircase of ledges.
pub(crate) struct TestMap {
    width_tiles: Tile,
    height_tiles: Tile,
    solid: Vec<bool>,
    wall_sprite: Sprite,
}

impl TestMap {
    pub(crate) fn new(sprites: &mut SpriteLibrary, screen: ScreenConfig) -> Result<Self, SpriteError> {
        let wall_sprite = sprites.sprite(MAP_TILE_SPRITE_KEY, PixelRect::tile(1, 0))?;
        let mut map = Self {
            width_tiles: screen.width_tiles,
            height_tiles: screen.height_tiles,
            solid: vec![false; (screen.width_tiles * screen.height_tiles) as usize],
            wall_sprite,
        };
        for column in 0..screen.width_tiles {
            map.set_solid(column, FLOOR_ROW);
        }
        for (column, row) in [(5, 10), (4, 9), (3, 8), (2, 7), (3, 10)] {
            map.set_solid(column, row);
        }
        Ok(map)
    }

    fn set_solid(&mut self, column: Tile, row: Tile) {
        if let Some(index) = self.index(column, row) {
            self.solid[index] = true;
        }
    }

    fn index(&self, column: Tile, row: Tile) -> Option<usize> {
        (column < self.width_tiles && row < self.height_tiles)
            .then(|| (row * self.width_tiles + column) as usize)
    }

    pub(crate) fn is_solid(&self, column: Tile, row: Tile) -> bool {
        self.index(column, row)
            .is_some_and(|index| self.solid[index])
    }

    /// First solid tile strictly overlapping `rect`, scanning row-major.
    pub(crate) fn first_collision(&self, rect: &Rectangle) -> Option<Rectangle> {
        let first_column = game_to_tile(rect.left());
        let last_column = game_to_tile(rect.right());
        let first_row = game_to_tile(rect.top());
        let last_row = game_to_tile(rect.bottom());
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                if !self.is_solid(column, row) {
                    continue;
                }
                let tile = Rectangle::new(tile_to_game(column), tile_to_game(row), TILE_SIZE, TILE_SIZE);
                if tile.collides_with(rect) {
                    return Some(tile);
                }
            }
        }
        None
    }
}

impl MapLayer for TestMap {
    fn draw_background(&self, graphics: &mut dyn GraphicsSink) {
        graphics.fill_rect(
            Rectangle::new(
                0.0,
                0.0,
                tile_to_game(self.width_tiles),
                tile_to_game(self.height_tiles),
            ),
            MAP_BACKDROP_COLOR,
        );
    }

    fn draw(&self, graphics: &mut dyn GraphicsSink) {
        for row in 0..self.height_tiles {
            for column in 0..self.width_tiles {
                if self.is_solid(column, row) {
                    graphics.draw_sprite(
                        &self.wall_sprite,
                        Vec2::new(tile_to_game(column), tile_to_game(row)),
                    );
                }
            }
        }
    }
}

use std::time::Duration;

use cave_engine::units::{game_to_tile, tile_to_game, Game, Tile, HALF_TILE, TILE_SIZE};
use cave_engine::{
    DamageEvent, DamageVolume, Facing, FacingTable, FlyingEnemy, GameWorld, GraphicsSink,
    HorizontalIntent, JumpIntent, LookIntent, MapLayer, PixelRect, PlayerEntity, PlayerIntents,
    Rectangle, ScreenConfig, Sprite, SpriteError, SpriteLibrary, Timer, Vec2,
};
use tracing::{debug, info};

// Velocities are game units per millisecond, accelerations per ms squared.
const WALKING_ACCELERATION: f32 = 0.000_830_078_12;
const AIR_ACCELERATION: f32 = 0.000_312_5;
const FRICTION: f32 = 0.000_498_046_87;
const MAX_SPEED_X: f32 = 0.158_593_75;
const GRAVITY: f32 = 0.000_781_25;
const JUMP_GRAVITY: f32 = 0.000_312_5;
const MAX_SPEED_Y: f32 = 0.299_804_687_5;
const JUMP_SPEED: f32 = 0.25;
const DAMAGE_HOP_SPEED: f32 = JUMP_SPEED / 1.5;

const PLAYER_COLLISION_INSET_X: Game = 6.0;
const PLAYER_DAMAGE_INSET_Y: Game = 8.0;
const PLAYER_MAX_HEALTH: u32 = 3;
const INVINCIBLE_TIME: Duration = Duration::from_millis(3000);
const INVINCIBLE_FLASH_PERIOD_MS: u128 = 50;

const PLAYER_SPRITE_KEY: &str = "my_char";
const STAND_FRAME_COLUMN: Tile = 0;
const LOOK_UP_FRAME_COLUMN: Tile = 3;
const LOOK_DOWN_FRAME_COLUMN: Tile = 6;
const LEFT_FACING_ROW: Tile = 0;
const RIGHT_FACING_ROW: Tile = 1;

const MAP_TILE_SPRITE_KEY: &str = "stage/prt_cave";
const MAP_BACKDROP_COLOR: [u8; 4] = [28, 44, 92, 255];
const FLOOR_ROW: Tile = 11;
const HUD_ORIGIN: Vec2 = Vec2::new(16.0, 16.0);
const HUD_CELL_SIZE: Game = 12.0;
const HUD_CELL_GAP: Game = 4.0;
const HUD_EMPTY_COLOR: [u8; 4] = [60, 0, 0, 255];
const HUD_FULL_COLOR: [u8; 4] = [220, 40, 40, 255];

const ENEMY_SPAWN_COLUMN: Tile = 7;

include!("map.rs");
include!("player.rs");

/// Player at the screen centre, the flying enemy a few tiles to its left, and
/// the test map underneath.
pub(crate) fn build_world(
    sprites: &mut SpriteLibrary,
    screen: ScreenConfig,
) -> Result<GameWorld<Player, TestMap>, SpriteError> {
    let map = TestMap::new(sprites, screen)?;
    let player = Player::new(
        sprites,
        Vec2::new(
            tile_to_game(screen.width_tiles / 2),
            tile_to_game(screen.height_tiles / 2),
        ),
    )?;
    let enemy = FlyingEnemy::new(
        sprites,
        Vec2::new(
            tile_to_game(ENEMY_SPAWN_COLUMN) + HALF_TILE,
            tile_to_game(screen.height_tiles / 2 + 1) + HALF_TILE,
        ),
    )?;
    info!(
        player_x = player.position().x,
        player_y = player.position().y,
        enemy_x = enemy.position().x,
        enemy_y = enemy.position().y,
        "world_spawned"
    );
    Ok(GameWorld::new(player, enemy, map))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}

use std::time::Duration;

use tracing::warn;

use super::collision::{DamageVolume, Rectangle};
use super::rendering::GraphicsSink;
use super::sprites::{AnimatedSprite, FacingTable, PixelRect, SpriteError, SpriteLibrary};
use super::units::{Degrees, Facing, Game, Vec2, HALF_TILE, TILE_SIZE};

pub const FLYING_ENEMY_SPRITE_KEY: &str = "npc/cemetery";
const FULL_TURN_DEGREES: Degrees = 360.0;
const FLY_FRAME_COLUMN: u32 = 2;
const FLY_FRAME_COUNT: u32 = 3;
const FLY_FPS: u32 = 13;
const LEFT_FACING_ROW: u32 = 2;
const RIGHT_FACING_ROW: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyingEnemyConfig {
    pub angular_velocity_degrees_per_second: Degrees,
    pub flight_amplitude: Game,
    pub damage_width: Game,
    pub damage_height: Game,
}

impl Default for FlyingEnemyConfig {
    fn default() -> Self {
        Self {
            angular_velocity_degrees_per_second: 120.0,
            flight_amplitude: 5.0 * HALF_TILE,
            damage_width: TILE_SIZE,
            damage_height: TILE_SIZE,
        }
    }
}

/// Bat-like enemy that bobs around a fixed horizontal centre line and always
/// turns to face its target. It has no terminal state.
#[derive(Debug, Clone)]
pub struct FlyingEnemy {
    config: FlyingEnemyConfig,
    position: Vec2,
    center_y: Game,
    facing: Facing,
    phase_angle: Degrees,
    completed_turns: u64,
    sprites: FacingTable<AnimatedSprite>,
}

impl FlyingEnemy {
    pub fn new(sprites: &mut SpriteLibrary, spawn_center: Vec2) -> Result<Self, SpriteError> {
        Self::with_config(sprites, spawn_center, FlyingEnemyConfig::default())
    }

    pub fn with_config(
        sprites: &mut SpriteLibrary,
        spawn_center: Vec2,
        config: FlyingEnemyConfig,
    ) -> Result<Self, SpriteError> {
        let table = FacingTable::try_build(|facing| {
            let row = match facing {
                Facing::Left => LEFT_FACING_ROW,
                Facing::Right => RIGHT_FACING_ROW,
            };
            sprites.animated(
                FLYING_ENEMY_SPRITE_KEY,
                PixelRect::tile(FLY_FRAME_COLUMN, row),
                FLY_FRAME_COUNT,
                FLY_FPS,
            )
        })?;
        Ok(Self::from_parts(spawn_center, config, table))
    }

    pub fn from_parts(
        spawn_center: Vec2,
        mut config: FlyingEnemyConfig,
        sprites: FacingTable<AnimatedSprite>,
    ) -> Self {
        // Phase only moves forward.
        let rate = config.angular_velocity_degrees_per_second;
        if rate.is_nan() || rate < 0.0 {
            warn!(angular_velocity = rate, "flying_enemy_rate_clamped");
            config.angular_velocity_degrees_per_second = 0.0;
        }
        Self {
            config,
            position: spawn_center,
            center_y: spawn_center.y,
            facing: Facing::Right,
            phase_angle: 0.0,
            completed_turns: 0,
            sprites,
        }
    }

    pub fn update(&mut self, elapsed: Duration, target_x: Game) {
        self.advance_phase(elapsed);
        self.position.y = flight_height(self.center_y, self.config.flight_amplitude, self.phase_angle);
        self.facing = facing_toward(self.position.x, target_x);
        for animation in self.sprites.iter_mut() {
            animation.update(elapsed);
        }
    }

    fn advance_phase(&mut self, elapsed: Duration) {
        let advanced =
            self.phase_angle + self.config.angular_velocity_degrees_per_second * elapsed.as_secs_f32();
        let turns = (advanced / FULL_TURN_DEGREES).floor();
        self.completed_turns = self.completed_turns.saturating_add(turns as u64);
        self.phase_angle = advanced - turns * FULL_TURN_DEGREES;
    }

    pub fn draw(&self, graphics: &mut dyn GraphicsSink) {
        let top_left = Vec2::new(self.position.x - HALF_TILE, self.position.y - HALF_TILE);
        graphics.draw_sprite(self.sprites.get(self.facing).current(), top_left);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn center_y(&self) -> Game {
        self.center_y
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Phase within the current turn, in `[0, 360)`.
    pub fn phase_angle(&self) -> Degrees {
        self.phase_angle
    }

    /// Phase accumulated over the enemy's lifetime; never decreases.
    pub fn total_phase_degrees(&self) -> f64 {
        self.completed_turns as f64 * FULL_TURN_DEGREES as f64 + self.phase_angle as f64
    }

    pub fn current_sprite_frame(&self) -> usize {
        self.sprites.get(self.facing).current_frame()
    }
}

impl DamageVolume for FlyingEnemy {
    fn damage_volume(&self) -> Rectangle {
        Rectangle::centered_on(
            self.position,
            self.config.damage_width,
            self.config.damage_height,
        )
    }
}

/// Instantaneous flip at the crossing point; no hysteresis band.
pub fn facing_toward(own_x: Game, target_x: Game) -> Facing {
    if target_x < own_x {
        Facing::Left
    } else {
        Facing::Right
    }
}

fn flight_height(center_y: Game, amplitude: Game, phase: Degrees) -> Game {
    center_y + amplitude * super::units::degrees_to_radians(phase).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::RecordingSink;

    fn enemy_at(x: Game, y: Game) -> FlyingEnemy {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut library = SpriteLibrary::new(dir.path());
        FlyingEnemy::new(&mut library, Vec2::new(x, y)).expect("enemy")
    }

    #[test]
    fn faces_target_on_either_side() {
        let mut enemy = enemy_at(100.0, 100.0);

        enemy.update(Duration::from_millis(16), 50.0);
        assert_eq!(enemy.facing(), Facing::Left);

        enemy.update(Duration::from_millis(16), 150.0);
        assert_eq!(enemy.facing(), Facing::Right);
    }

    #[test]
    fn target_exactly_overhead_faces_right() {
        assert_eq!(facing_toward(100.0, 100.0), Facing::Right);
        assert_eq!(facing_toward(100.0, 99.99), Facing::Left);
    }

    #[test]
    fn horizontal_position_stays_at_spawn() {
        let mut enemy = enemy_at(224.0, 272.0);
        for target in [0.0, 500.0, 224.0, -80.0] {
            enemy.update(Duration::from_millis(40), target);
            assert_eq!(enemy.position().x, 224.0);
        }
    }

    #[test]
    fn vertical_motion_follows_sine_of_phase() {
        let mut enemy = enemy_at(100.0, 200.0);
        let amplitude = FlyingEnemyConfig::default().flight_amplitude;

        // 120 deg/s for 750ms lands on the crest at 90 degrees.
        enemy.update(Duration::from_millis(750), 0.0);
        assert!((enemy.phase_angle() - 90.0).abs() < 1e-3);
        assert!((enemy.position().y - (200.0 + amplitude)).abs() < 1e-3);

        enemy.update(Duration::from_millis(1500), 0.0);
        assert!((enemy.phase_angle() - 270.0).abs() < 1e-3);
        assert!((enemy.position().y - (200.0 - amplitude)).abs() < 1e-3);
        assert_eq!(enemy.center_y(), 200.0);
    }

    #[test]
    fn phase_wraps_but_lifetime_total_keeps_growing() {
        let mut enemy = enemy_at(0.0, 0.0);
        let mut previous_total = enemy.total_phase_degrees();
        for _ in 0..40 {
            enemy.update(Duration::from_millis(83), 0.0);
            let total = enemy.total_phase_degrees();
            assert!(total >= previous_total);
            assert!((0.0..FULL_TURN_DEGREES).contains(&enemy.phase_angle()));
            previous_total = total;
        }
        // 40 * 83ms * 120deg/s = 398.4 degrees.
        assert!((previous_total - 398.4).abs() < 1e-2);
    }

    #[test]
    fn identical_inputs_produce_identical_state() {
        let mut first = enemy_at(100.0, 100.0);
        let mut second = enemy_at(100.0, 100.0);
        for (elapsed_ms, target) in [(16u64, 40.0), (83, 180.0), (33, 100.0), (5, 99.0)] {
            first.update(Duration::from_millis(elapsed_ms), target);
            second.update(Duration::from_millis(elapsed_ms), target);
            assert_eq!(first.position(), second.position());
            assert_eq!(first.facing(), second.facing());
        }
    }

    #[test]
    fn damage_volume_is_centred_on_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut library = SpriteLibrary::new(dir.path());
        let config = FlyingEnemyConfig {
            damage_width: 10.0,
            damage_height: 10.0,
            ..FlyingEnemyConfig::default()
        };
        let enemy =
            FlyingEnemy::with_config(&mut library, Vec2::new(100.0, 100.0), config).expect("enemy");

        assert_eq!(enemy.damage_volume(), Rectangle::new(95.0, 95.0, 10.0, 10.0));
    }

    #[test]
    fn draw_uses_sprite_row_for_current_facing() {
        let mut enemy = enemy_at(100.0, 100.0);
        let mut sink = RecordingSink::default();

        enemy.update(Duration::ZERO, 0.0);
        enemy.draw(&mut sink);
        enemy.update(Duration::ZERO, 300.0);
        enemy.draw(&mut sink);

        let rows: Vec<u32> = sink
            .sprites
            .iter()
            .map(|(_, source, _)| source.y / TILE_SIZE as u32)
            .collect();
        assert_eq!(rows, vec![LEFT_FACING_ROW, RIGHT_FACING_ROW]);
        assert_eq!(sink.sprites[0].2, Vec2::new(100.0 - HALF_TILE, 100.0 - HALF_TILE));
    }

    #[test]
    fn hidden_facing_animation_keeps_running() {
        let mut enemy = enemy_at(100.0, 100.0);
        enemy.update(Duration::from_millis(16), 200.0);
        assert_eq!(enemy.facing(), Facing::Right);

        for _ in 0..10 {
            enemy.update(Duration::from_millis(16), 0.0);
        }
        assert_eq!(enemy.facing(), Facing::Left);
        let left_frame = enemy.current_sprite_frame();

        enemy.update(Duration::ZERO, 200.0);
        assert_eq!(enemy.facing(), Facing::Right);
        // 176ms at 13 fps is two full frames.
        assert_eq!(left_frame, 2);
        assert_eq!(enemy.current_sprite_frame(), left_frame);
    }

    #[test]
    fn negative_rate_is_clamped_so_phase_never_decreases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut library = SpriteLibrary::new(dir.path());
        let config = FlyingEnemyConfig {
            angular_velocity_degrees_per_second: -120.0,
            ..FlyingEnemyConfig::default()
        };
        let mut enemy =
            FlyingEnemy::with_config(&mut library, Vec2::new(0.0, 50.0), config).expect("enemy");

        for _ in 0..10 {
            enemy.update(Duration::from_millis(83), 0.0);
            assert_eq!(enemy.total_phase_degrees(), 0.0);
            assert_eq!(enemy.position().y, 50.0);
        }
    }

    #[test]
    fn wing_animation_advances_with_time() {
        let mut enemy = enemy_at(100.0, 100.0);
        assert_eq!(enemy.current_sprite_frame(), 0);

        enemy.update(Duration::from_millis(80), 200.0);
        assert_eq!(enemy.current_sprite_frame(), 1);
    }
}

mod collision;
mod enemy;
mod frame_clock;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod simulation;
mod sprites;
mod timer;
pub mod units;

pub use collision::{DamageVolume, Rectangle};
pub use enemy::{facing_toward, FlyingEnemy, FlyingEnemyConfig, FLYING_ENEMY_SPRITE_KEY};
pub use frame_clock::FrameClock;
pub use input::{InputKey, KeyboardState};
pub use loop_runner::{
    run_app, run_app_with_metrics, AppError, LoopConfig, ScreenConfig, DEFAULT_MAX_FRAME_DELTA,
    DEFAULT_TARGET_FPS, SLOW_FRAME_ENV_VAR,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    DrawOp, GraphicsSink, RecordingSink, RenderError, Renderer, SoftwareCanvas, CLEAR_COLOR,
};
pub use simulation::{
    detect_damage, Attacker, DamageEvent, GameLoop, GameWorld, HorizontalIntent, IterationReport,
    JumpIntent, LookIntent, MapLayer, PlayerEntity, PlayerIntents, RunState,
};
pub use sprites::{
    validate_sprite_key, AnimatedSprite, FacingTable, PixelRect, Sprite, SpriteError,
    SpriteKeyError, SpriteLibrary, SpriteSheet,
};
pub use timer::Timer;
pub use units::{Facing, Vec2};

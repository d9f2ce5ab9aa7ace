use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::collision::{DamageVolume, Rectangle};
use super::enemy::FlyingEnemy;
use super::frame_clock::FrameClock;
use super::input::{InputKey, KeyboardState};
use super::rendering::{GraphicsSink, RenderError};
use super::units::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalIntent {
    MoveLeft,
    MoveRight,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookIntent {
    Up,
    Down,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpIntent {
    Start,
    Stop,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIntents {
    pub horizontal: HorizontalIntent,
    pub look: LookIntent,
    pub jump: JumpIntent,
}

impl PlayerIntents {
    /// Opposite directions held together cancel to the neutral intent.
    pub fn from_keys(keys: &KeyboardState) -> Self {
        let horizontal = match (keys.is_held(InputKey::Left), keys.is_held(InputKey::Right)) {
            (true, false) => HorizontalIntent::MoveLeft,
            (false, true) => HorizontalIntent::MoveRight,
            _ => HorizontalIntent::Stop,
        };
        let look = match (keys.is_held(InputKey::Up), keys.is_held(InputKey::Down)) {
            (true, false) => LookIntent::Up,
            (false, true) => LookIntent::Down,
            _ => LookIntent::Horizontal,
        };
        let jump = if keys.was_pressed(InputKey::Jump) {
            JumpIntent::Start
        } else if keys.was_released(InputKey::Jump) {
            JumpIntent::Stop
        } else {
            JumpIntent::None
        };
        Self {
            horizontal,
            look,
            jump,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attacker {
    FlyingEnemy,
}

/// Raised when an attacker's damage volume overlaps the defender's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub attacker: Attacker,
    pub attacker_volume: Rectangle,
    pub defender_volume: Rectangle,
}

pub fn detect_damage(
    attacker: Attacker,
    attacker_body: &impl DamageVolume,
    defender_body: &impl DamageVolume,
) -> Option<DamageEvent> {
    let attacker_volume = attacker_body.damage_volume();
    let defender_volume = defender_body.damage_volume();
    attacker_volume
        .collides_with(&defender_volume)
        .then_some(DamageEvent {
            attacker,
            attacker_volume,
            defender_volume,
        })
}

pub trait MapLayer {
    fn draw_background(&self, graphics: &mut dyn GraphicsSink);
    fn draw(&self, graphics: &mut dyn GraphicsSink);
}

/// The player as seen by the loop. Movement, physics, and the damage
/// policy (cooldowns, invincibility) live behind this boundary.
pub trait PlayerEntity<M>: DamageVolume {
    fn apply_intents(&mut self, intents: PlayerIntents);
    fn update(&mut self, elapsed: Duration, map: &M);
    fn draw(&self, graphics: &mut dyn GraphicsSink);
    fn draw_hud(&self, graphics: &mut dyn GraphicsSink);
    fn center_x(&self) -> Game;
    fn take_damage(&mut self, event: &DamageEvent);
}

pub struct GameWorld<P, M> {
    player: P,
    enemy: FlyingEnemy,
    map: M,
}

impl<P, M> GameWorld<P, M>
where
    P: PlayerEntity<M>,
    M: MapLayer,
{
    pub fn new(player: P, enemy: FlyingEnemy, map: M) -> Self {
        Self { player, enemy, map }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn enemy(&self) -> &FlyingEnemy {
        &self.enemy
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn apply_intents(&mut self, intents: PlayerIntents) {
        self.player.apply_intents(intents);
    }

    /// Player first, then the enemy reading the player's current x, then a
    /// single collision check.
    pub fn update(&mut self, elapsed: Duration) -> Option<DamageEvent> {
        self.player.update(elapsed, &self.map);
        self.enemy.update(elapsed, self.player.center_x());

        let event = detect_damage(Attacker::FlyingEnemy, &self.enemy, &self.player)?;
        debug!(attacker = ?event.attacker, "damage_event");
        self.player.take_damage(&event);
        Some(event)
    }

    /// Back-to-front: background, enemy, player, foreground, HUD.
    pub fn draw(&self, graphics: &mut dyn GraphicsSink) -> Result<(), RenderError> {
        graphics.clear();
        self.map.draw_background(graphics);
        self.enemy.draw(graphics);
        self.player.draw(graphics);
        self.map.draw(graphics);
        self.player.draw_hud(graphics);
        graphics.present()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    ShuttingDown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub step: Duration,
    pub raw_delta: Duration,
    pub clamped: bool,
    pub damage: Option<DamageEvent>,
    pub run_state: RunState,
}

/// Owns input, clock, and world for one run. Drive it with
/// [`GameLoop::begin_frame`], key records, then [`GameLoop::iterate`].
pub struct GameLoop<P, M> {
    keys: KeyboardState,
    clock: FrameClock,
    world: GameWorld<P, M>,
    run_state: RunState,
}

impl<P, M> GameLoop<P, M>
where
    P: PlayerEntity<M>,
    M: MapLayer,
{
    pub fn new(world: GameWorld<P, M>, clock: FrameClock) -> Self {
        Self {
            keys: KeyboardState::default(),
            clock,
            world,
            run_state: RunState::Running,
        }
    }

    pub fn world(&self) -> &GameWorld<P, M> {
        &self.world
    }

    pub fn keys(&self) -> &KeyboardState {
        &self.keys
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn begin_frame(&mut self) {
        self.begin_frame_at(Instant::now());
    }

    pub fn begin_frame_at(&mut self, now: Instant) {
        self.keys.begin_frame();
        self.clock.begin_frame_at(now);
    }

    pub fn record_key(&mut self, key: InputKey, is_down: bool) {
        self.keys.record(key, is_down);
    }

    /// External quit (window close). Takes effect once the current iteration
    /// has finished.
    pub fn request_shutdown(&mut self, reason: &'static str) {
        if self.run_state == RunState::Running {
            info!(reason, "shutdown_requested");
        }
        self.run_state = RunState::ShuttingDown;
    }

    pub fn iterate(&mut self, graphics: &mut dyn GraphicsSink) -> Result<IterationReport, RenderError> {
        self.iterate_at(Instant::now(), graphics)
    }

    /// One full iteration: intents, clamped update, collision, draw. A quit
    /// press never aborts mid-frame; it stops the next iteration instead.
    pub fn iterate_at(
        &mut self,
        now: Instant,
        graphics: &mut dyn GraphicsSink,
    ) -> Result<IterationReport, RenderError> {
        if self.keys.quit_pressed() {
            self.request_shutdown("quit_key");
        }

        self.world.apply_intents(PlayerIntents::from_keys(&self.keys));

        let step = self.clock.tick_at(now);
        let damage = self.world.update(step);
        self.world.draw(graphics)?;

        Ok(IterationReport {
            step,
            raw_delta: self.clock.last_raw_delta(),
            clamped: self.clock.last_tick_was_clamped(),
            damage,
            run_state: self.run_state,
        })
    }

    pub fn pace(&self) {
        self.clock.pace();
    }
}

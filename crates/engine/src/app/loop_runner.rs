use std::env;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::{resolve_app_paths, StartupError};

use super::frame_clock::FrameClock;
use super::input::InputKey;
use super::metrics::MetricsAccumulator;
use super::simulation::{GameLoop, GameWorld, MapLayer, PlayerEntity, RunState};
use super::sprites::{SpriteError, SpriteLibrary};
use super::units::{tile_to_pixel, Tile};
use super::{MetricsHandle, Renderer};

pub const SLOW_FRAME_ENV_VAR: &str = "CAVE_SLOW_FRAME_MS";

/// Screen size in tiles, fixed for the whole run and passed to whoever needs
/// it at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenConfig {
    pub width_tiles: Tile,
    pub height_tiles: Tile,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width_tiles: 20,
            height_tiles: 15,
        }
    }
}

impl ScreenConfig {
    pub fn width_px(&self) -> u32 {
        tile_to_pixel(self.width_tiles).max(1) as u32
    }

    pub fn height_px(&self) -> u32 {
        tile_to_pixel(self.height_tiles).max(1) as u32
    }
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub screen: ScreenConfig,
    pub target_fps: u32,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
}

pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(5 * 1000 / 60);

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Cave Story".to_string(),
            screen: ScreenConfig::default(),
            target_fps: DEFAULT_TARGET_FPS,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to build world: {0}")]
    BuildWorld(#[from] SpriteError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app<P, M, F>(config: LoopConfig, build_world: F) -> Result<(), AppError>
where
    P: PlayerEntity<M> + 'static,
    M: MapLayer + 'static,
    F: FnOnce(&mut SpriteLibrary, ScreenConfig) -> Result<GameWorld<P, M>, SpriteError>,
{
    run_app_with_metrics(config, build_world, MetricsHandle::default())
}

pub fn run_app_with_metrics<P, M, F>(
    config: LoopConfig,
    build_world: F,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError>
where
    P: PlayerEntity<M> + 'static,
    M: MapLayer + 'static,
    F: FnOnce(&mut SpriteLibrary, ScreenConfig) -> Result<GameWorld<P, M>, SpriteError>,
{
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        sprite_dir = %app_paths.sprite_dir.display(),
        "startup"
    );

    let mut sprites = SpriteLibrary::new(&app_paths.sprite_dir);
    let world = build_world(&mut sprites, config.screen)?;
    info!(
        cached_sheets = sprites.cached_sheet_count(),
        "world_built"
    );

    let target_fps = normalize_target_fps(config.target_fps);
    let max_frame_delta = normalize_non_zero_duration(config.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    info!(
        target_fps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        width_tiles = config.screen.width_tiles,
        height_tiles = config.screen.height_tiles,
        "loop_config"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.screen.width_px() as f64,
                config.screen.height_px() as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let mut renderer = Renderer::new(window, config.screen.width_px(), config.screen.height_px())
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut game = GameLoop::new(world, FrameClock::new(target_fps, max_frame_delta));
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    game.begin_frame();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    game.request_shutdown("window_close");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(key) = InputKey::from_physical_key(event.physical_key) {
                        game.record_key(key, event.state == ElementState::Pressed);
                    }
                }
                WindowEvent::RedrawRequested => {
                    if game.run_state() == RunState::ShuttingDown {
                        window_target.exit();
                        return;
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Explicit debug perturbation only; this is not the pacing sleep.
                        thread::sleep(slow_frame_delay);
                    }

                    let report = match game.iterate(&mut renderer) {
                        Ok(report) => report,
                        Err(error) => {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                            return;
                        }
                    };
                    metrics_accumulator.record_iteration(&report);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            clamped_frames = snapshot.clamped_frames,
                            damage_events = snapshot.damage_events,
                            "loop_metrics"
                        );
                    }

                    if report.run_state == RunState::ShuttingDown {
                        window_target.exit();
                        return;
                    }

                    // Single pacing point; events arriving after this belong to
                    // the next iteration.
                    game.pace();
                    game.begin_frame();
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn normalize_target_fps(target_fps: u32) -> u32 {
    if target_fps == 0 {
        DEFAULT_TARGET_FPS
    } else {
        target_fps
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    parse_slow_frame_delay(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn parse_slow_frame_delay(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

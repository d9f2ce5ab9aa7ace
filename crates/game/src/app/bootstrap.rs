use cave_engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{self, ConfigError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Cave Story Startup ===");

    let config = config::load_loop_config()?;
    info!(
        title = %config.window_title,
        target_fps = config.target_fps,
        max_frame_delta_ms = config.max_frame_delta.as_millis() as u64,
        width_tiles = config.screen.width_tiles,
        height_tiles = config.screen.height_tiles,
        "config_loaded"
    );

    Ok(AppWiring { config })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

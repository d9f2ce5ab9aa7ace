use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cave_engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "CAVE_CONFIG";

/// Optional overrides read from the JSON file named by `CAVE_CONFIG`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GameConfigFile {
    target_fps: Option<u32>,
    max_frame_delta_ms: Option<u64>,
    window_title: Option<String>,
    metrics_log_interval_ms: Option<u64>,
    slow_frame_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config '{path}' at {at}: {source}")]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn load_loop_config() -> Result<LoopConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => load_loop_config_from(Path::new(&path)),
        None => Ok(LoopConfig::default()),
    }
}

pub(crate) fn load_loop_config_from(path: &Path) -> Result<LoopConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_config_file(path, &raw)?;
    Ok(apply_overrides(LoopConfig::default(), file))
}

fn parse_config_file(path: &Path, raw: &str) -> Result<GameConfigFile, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            at: if at.is_empty() { ".".to_string() } else { at },
            source: error.into_inner(),
        }
    })
}

fn apply_overrides(mut config: LoopConfig, file: GameConfigFile) -> LoopConfig {
    if let Some(target_fps) = file.target_fps {
        config.target_fps = target_fps;
    }
    if let Some(ms) = file.max_frame_delta_ms {
        config.max_frame_delta = Duration::from_millis(ms);
    }
    if let Some(title) = file.window_title {
        config.window_title = title;
    }
    if let Some(ms) = file.metrics_log_interval_ms {
        config.metrics_log_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = file.slow_frame_ms {
        config.simulated_slow_frame_ms = ms;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_engine::{DEFAULT_MAX_FRAME_DELTA, DEFAULT_TARGET_FPS};

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cave.json");
        fs::write(&path, contents).expect("write config");
        (dir, path)
    }

    #[test]
    fn empty_object_keeps_defaults() {
        let (_dir, path) = write_config("{}");
        let config = load_loop_config_from(&path).expect("config");
        assert_eq!(config.target_fps, DEFAULT_TARGET_FPS);
        assert_eq!(config.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
        assert_eq!(config.window_title, "Cave Story");
    }

    #[test]
    fn present_fields_override_defaults() {
        let (_dir, path) = write_config(
            r#"{
                "target_fps": 30,
                "max_frame_delta_ms": 100,
                "window_title": "Bat Cave",
                "metrics_log_interval_ms": 250,
                "slow_frame_ms": 12
            }"#,
        );
        let config = load_loop_config_from(&path).expect("config");
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.max_frame_delta, Duration::from_millis(100));
        assert_eq!(config.window_title, "Bat Cave");
        assert_eq!(config.metrics_log_interval, Duration::from_millis(250));
        assert_eq!(config.simulated_slow_frame_ms, 12);
        assert_eq!(config.screen.width_tiles, 20);
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let (_dir, path) = write_config(r#"{ "target_fps": "fast" }"#);
        let err = load_loop_config_from(&path).expect_err("type mismatch");
        match err {
            ConfigError::Parse { at, .. } => assert_eq!(at, "target_fps"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let (_dir, path) = write_config(r#"{ "tile_size": 16 }"#);
        assert!(matches!(
            load_loop_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_loop_config_from(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}

//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Timeline and canvas interaction tuning.
    pub interaction: InteractionDefaults,

    /// Playback engine tuning.
    pub playback: PlaybackDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Interaction tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionDefaults {
    /// Snap capture distance on the timeline, in screen pixels.
    pub snap_threshold_px: f64,

    /// Corner handle hit radius on the canvas, in screen pixels.
    pub handle_px: f64,

    /// Minimum element size during canvas resize, in screen pixels.
    pub min_element_px: f64,

    /// Maximum number of undo snapshots retained.
    pub history_depth: usize,
}

/// Playback tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackDefaults {
    /// Tolerated drift between audio elements and the clock before a
    /// corrective seek is issued, in seconds.
    pub resync_tolerance: f64,

    /// Minimum interval between corrective audio seeks, in seconds.
    pub resync_interval: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cutreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionDefaults::default(),
            playback: PlaybackDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for InteractionDefaults {
    fn default() -> Self {
        Self {
            snap_threshold_px: 8.0,
            handle_px: 8.0,
            min_element_px: 20.0,
            history_depth: 50,
        }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            resync_tolerance: 0.1,
            resync_interval: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cutreel").join("config.json")
}

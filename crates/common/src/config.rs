//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CamflowError, CamflowResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Motion extraction settings.
    pub analysis: AnalysisDefaults,

    /// Zoom detection thresholds.
    pub zoom: ZoomDefaults,

    /// Pan detection thresholds.
    pub pan: PanDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults for the extraction stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    /// Width of the centered analysis crop (pixels).
    pub crop_width: usize,

    /// Height of the centered analysis crop (pixels).
    pub crop_height: usize,

    /// Block edge length for the block-matching flow engine.
    pub block_size: usize,

    /// Maximum displacement searched per block (pixels).
    pub search_range: usize,

    /// Number of samples in the preview rolling average.
    pub preview_window: usize,
}

/// Defaults for zoom segmentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoomDefaults {
    pub min_zoom_in: f64,
    pub min_magnitude: f64,
    pub min_duration_secs: f64,
    pub pad_before_secs: f64,
    pub pad_after_secs: f64,
}

/// Defaults for pan segmentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanDefaults {
    pub desired_angle: f64,
    pub angle_thresh: f64,
    pub desired_magnitude: f64,
    pub magnitude_thresh: f64,

    /// Exclusive zoom-factor band a pan frame must sit in. `None` disables the gate.
    pub zoom_band: Option<(f64, f64)>,

    pub min_run_frames: u32,
    pub max_tolerated_bad_frames: u32,

    /// Reset the bad-frame counter whenever a run opens.
    pub reset_bad_frames_per_run: bool,

    /// Emit a still-open run when the stream ends.
    pub finalize_open_run_at_end: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camflow=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            crop_width: 300,
            crop_height: 300,
            block_size: 10,
            search_range: 12,
            preview_window: 10,
        }
    }
}

impl Default for ZoomDefaults {
    fn default() -> Self {
        Self {
            min_zoom_in: 0.92,
            min_magnitude: 5.0,
            min_duration_secs: 0.3,
            pad_before_secs: 0.1,
            pad_after_secs: 0.0,
        }
    }
}

impl Default for PanDefaults {
    fn default() -> Self {
        Self {
            desired_angle: 180.0,
            angle_thresh: 10.0,
            desired_magnitude: 20.0,
            magnitude_thresh: 10.0,
            zoom_band: Some((0.4, 0.7)),
            min_run_frames: 10,
            max_tolerated_bad_frames: 0,
            reset_bad_frames_per_run: true,
            finalize_open_run_at_end: false,
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

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// A file that exists but cannot be read or parsed yields the defaults
    /// together with the error, so it can be reported once logging is up.
    pub fn load() -> (Self, Option<CamflowError>) {
        Self::load_from(&config_file_path())
    }

    /// [`AppConfig::load`] for an explicit path.
    pub fn load_from(path: &Path) -> (Self, Option<CamflowError>) {
        match Self::try_load_from(path) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Read and parse the config at `path`.
    ///
    /// `Ok(None)` when no file exists; unreadable or invalid files are
    /// reported as [`CamflowError::Config`].
    pub fn try_load_from(path: &Path) -> CamflowResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            CamflowError::config(format!("failed to read config at {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map(Some).map_err(|e| {
            CamflowError::config(format!("failed to parse config at {}: {e}", path.display()))
        })
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("camflow").join("config.json")
}

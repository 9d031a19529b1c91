//! Exhibit configuration
//!
//! Everything tunable lives in one JSON file. Every field has a default, so
//! a missing file or a partial one is fine. Geometry is checked by
//! [`Config::validate`] before anything is drawn.

use crate::assets::{Extent, ManifestEntry};
use crate::display::Rgb;
use crate::plot::{
    positive_step, DomainRange, FunctionKind, GeometryError, ReferenceCurve, TrackerSettings,
    TrackerStyle,
};
use serde::Deserialize;
use std::f64::consts::TAU;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file looked up in the working directory
pub const CONFIG_FILE: &str = "carplot.json";
/// Environment variable overriding [`CONFIG_FILE`]
pub const CONFIG_ENV: &str = "CARPLOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid geometry: {0}")]
    Invalid(#[from] GeometryError),
    #[error("at least one reference curve must be configured")]
    NoCurves,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub assets: AssetsConfig,
    pub tracker: TrackerConfig,
    pub scoring: ScoringConfig,
    pub curves: Vec<CurveConfig>,
    pub input: InputConfig,
    pub log: LogConfig,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub fullscreen: bool,
    /// Window size when not fullscreen
    pub viewport: (u32, u32),
    pub target_fps: u32,
    /// Start with the frame statistics overlay visible
    pub show_fps: bool,
    pub score_position: (i32, i32),
    pub score_scale: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub directory: PathBuf,
    /// Manifest name (file stem) of the picture curves are drawn on
    pub grid_asset: String,
    pub manifest: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_step: f64,
    pub y_step: f64,
    pub max_history_for_score: usize,
    pub line_width: i32,
    pub marker_radius: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Mean squared error that scores 0
    pub max_error: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurveConfig {
    pub function: FunctionKind,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    #[serde(default = "default_sample_step")]
    pub sample_step: f64,
    #[serde(default = "default_curve_color")]
    pub color: Rgb,
    #[serde(default = "default_curve_width")]
    pub line_width: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelMode {
    /// Deflection past the dead zone nudges one step per frame
    Discrete,
    /// Axis position maps straight onto the y range
    Absolute,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub joystick_index: u32,
    pub axis: u32,
    pub dead_zone: f32,
    pub mode: WheelMode,
    pub invert: bool,
    pub reconnect_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// env_logger filter, overridden by RUST_LOG
    pub level: String,
    /// Rotating log files go here; stderr when unset
    pub directory: Option<PathBuf>,
    pub file_name: String,
    pub max_bytes: u64,
    pub max_backups: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Frame fill under the assets
    pub background: Rgb,
    pub score_text: Rgb,
    pub trail: Rgb,
    pub window_bar: Rgb,
}

fn default_sample_step() -> f64 {
    1.0
}

fn default_curve_color() -> Rgb {
    (255, 0, 0)
}

fn default_curve_width() -> i32 {
    3
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Car Plot".to_string(),
            fullscreen: true,
            viewport: (800, 600),
            target_fps: 60,
            show_fps: false,
            score_position: (10, 10),
            score_scale: 4,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            grid_asset: "grid".to_string(),
            manifest: vec![
                ManifestEntry::new(
                    "background.png",
                    (Extent::Full, Extent::Full),
                    (Extent::Pixels(0), Extent::Pixels(0)),
                ),
                ManifestEntry::new(
                    "grid.png",
                    (Extent::Percent(70.0), Extent::Percent(70.0)),
                    (Extent::Percent(15.0), Extent::Percent(15.0)),
                ),
            ],
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            x_range: (0.0, 1000.0),
            y_range: (-300.0, 300.0),
            x_step: 1.0,
            y_step: 10.0,
            max_history_for_score: 300,
            line_width: 3,
            marker_radius: 5,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { max_error: 100_000.0 }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            joystick_index: 0,
            axis: 0,
            dead_zone: 0.15,
            mode: WheelMode::Discrete,
            invert: false,
            reconnect_interval_ms: 1000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_name: "carplot.log".to_string(),
            max_bytes: 1024 * 1024,
            max_backups: 5,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: (255, 255, 255),
            score_text: (0, 0, 0),
            trail: (0, 0, 255),
            window_bar: (128, 128, 128),
        }
    }
}

/// Sine, falling ramp, flat line, slow cosine; all over the default tracker domain
fn default_curves() -> Vec<CurveConfig> {
    let curve = |function: FunctionKind| CurveConfig {
        function,
        x_range: (0.0, 1000.0),
        y_range: (-300.0, 300.0),
        sample_step: 2.0,
        color: default_curve_color(),
        line_width: default_curve_width(),
    };
    vec![
        curve(FunctionKind::Sine {
            amplitude: 200.0,
            frequency: TAU / 500.0,
            phase: 0.0,
            offset: 0.0,
        }),
        curve(FunctionKind::Linear {
            slope: -0.4,
            intercept: 200.0,
        }),
        curve(FunctionKind::Constant { value: 100.0 }),
        curve(FunctionKind::Cosine {
            amplitude: 150.0,
            frequency: TAU / 1000.0,
            phase: 0.0,
            offset: 0.0,
        }),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            assets: AssetsConfig::default(),
            tracker: TrackerConfig::default(),
            scoring: ScoringConfig::default(),
            curves: default_curves(),
            input: InputConfig::default(),
            log: LogConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl Config {
    /// `$CARPLOT_CONFIG`, else `carplot.json` in the working directory
    pub fn locate() -> PathBuf {
        std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load `path`, falling back to defaults when it does not exist.
    /// Returns whether the file was found.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<(Self, bool), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, true)),
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok((Self::default(), false))
            },
            Err(e) => Err(e),
        }
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings, GeometryError> {
        let t = &self.tracker;
        TrackerSettings::new(
            DomainRange::try_from(t.x_range)?,
            DomainRange::try_from(t.y_range)?,
            t.x_step,
            t.y_step,
            t.max_history_for_score,
        )
    }

    pub fn tracker_style(&self) -> TrackerStyle {
        TrackerStyle {
            trail: self.colors.trail,
            window_bar: self.colors.window_bar,
            line_width: self.tracker.line_width.max(1),
            marker_radius: self.tracker.marker_radius.max(0),
            ..TrackerStyle::default()
        }
    }

    pub fn max_error(&self) -> Result<f64, GeometryError> {
        positive_step("max_error", self.scoring.max_error)
    }

    pub fn build_curves(&self) -> Result<Vec<ReferenceCurve>, ConfigError> {
        if self.curves.is_empty() {
            return Err(ConfigError::NoCurves);
        }
        self.curves
            .iter()
            .map(|c| -> Result<ReferenceCurve, ConfigError> {
                let curve = ReferenceCurve::new(
                    c.function.clone(),
                    DomainRange::try_from(c.x_range)?,
                    DomainRange::try_from(c.y_range)?,
                    c.sample_step,
                )?;
                Ok(curve.with_style(c.color, c.line_width))
            })
            .collect()
    }

    /// Check every precondition the exhibit relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker_settings()?;
        self.max_error()?;
        self.build_curves()?;
        positive_step("target_fps", self.display.target_fps as f64)?;
        Ok(())
    }
}

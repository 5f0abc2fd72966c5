use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::scene::{ScaleZone, WalkableArea};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub pathfinding: PathfindingConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathfindingConfig {
    #[serde(default = "default_allow_diagonal")]
    pub allow_diagonal: bool,
}

/// Tuning for [`MovementController`](crate::movement::MovementController)
#[derive(Debug, Clone, Deserialize)]
pub struct MovementConfig {
    /// Walking speed in world units per second for newly spawned actors
    #[serde(default = "default_speed")]
    pub default_speed: f32,
    /// Remaining distance at which the final target counts as reached
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold: f32,
    /// Remaining distance at which an intermediate waypoint counts as reached
    #[serde(default = "default_waypoint_threshold")]
    pub waypoint_threshold: f32,
    /// Longer frames are clamped to this many seconds
    #[serde(default = "default_max_delta_time")]
    pub max_delta_time: f32,
    /// Minimum horizontal delta before facing is re-evaluated
    #[serde(default = "default_direction_threshold")]
    pub direction_threshold: f32,
    #[serde(default = "default_world_min")]
    pub world_min: f32,
    #[serde(default = "default_world_max")]
    pub world_max: f32,
    #[serde(default = "default_max_waypoints")]
    pub max_waypoints: usize,
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_max_size")]
    pub max_size: f32,
    /// Ticks without progress before a walk is abandoned
    #[serde(default = "default_max_stalled_ticks")]
    pub max_stalled_ticks: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub scale_zones: Vec<ScaleZone>,
    #[serde(default)]
    pub walkable_areas: Vec<WalkableArea>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
    #[serde(default = "default_show_path")]
    pub show_path: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_cols() -> i32 { 40 }
fn default_rows() -> i32 { 30 }
fn default_cell_size() -> f32 { 20.0 }
fn default_allow_diagonal() -> bool { true }
fn default_speed() -> f32 { 120.0 }
fn default_arrival_threshold() -> f32 { 2.0 }
fn default_waypoint_threshold() -> f32 { 8.0 }
fn default_max_delta_time() -> f32 { 0.1 }
fn default_direction_threshold() -> f32 { 1.0 }
fn default_world_min() -> f32 { -100_000.0 }
fn default_world_max() -> f32 { 100_000.0 }
fn default_max_waypoints() -> usize { 4096 }
fn default_max_speed() -> f32 { 10_000.0 }
fn default_max_size() -> f32 { 10_000.0 }
fn default_max_stalled_ticks() -> u32 { 30 }
fn default_window_title() -> String { "Scene Navigation Demo".to_string() }
fn default_bg_r() -> u8 { 30 }
fn default_bg_g() -> u8 { 30 }
fn default_bg_b() -> u8 { 30 }
fn default_show_path() -> bool { true }
fn default_log_level() -> String { "info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: default_allow_diagonal(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            arrival_threshold: default_arrival_threshold(),
            waypoint_threshold: default_waypoint_threshold(),
            max_delta_time: default_max_delta_time(),
            direction_threshold: default_direction_threshold(),
            world_min: default_world_min(),
            world_max: default_world_max(),
            max_waypoints: default_max_waypoints(),
            max_speed: default_max_speed(),
            max_size: default_max_size(),
            max_stalled_ticks: default_max_stalled_ticks(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
            show_path: default_show_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            pathfinding: PathfindingConfig::default(),
            movement: MovementConfig::default(),
            scene: SceneConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MovementConfig {
    /// Replace values the controller cannot work with by their defaults, logging each one
    pub fn sanitized(mut self) -> Self {
        let defaults = MovementConfig::default();

        self.default_speed = positive_or("default_speed", self.default_speed, defaults.default_speed);
        self.arrival_threshold = positive_or("arrival_threshold", self.arrival_threshold, defaults.arrival_threshold);
        self.waypoint_threshold = positive_or("waypoint_threshold", self.waypoint_threshold, defaults.waypoint_threshold);
        self.max_delta_time = positive_or("max_delta_time", self.max_delta_time, defaults.max_delta_time);
        self.max_speed = positive_or("max_speed", self.max_speed, defaults.max_speed);
        self.max_size = positive_or("max_size", self.max_size, defaults.max_size);

        if !self.direction_threshold.is_finite() || self.direction_threshold < 0.0 {
            warn!("movement.direction_threshold = {} is invalid, using {}", self.direction_threshold, defaults.direction_threshold);
            self.direction_threshold = defaults.direction_threshold;
        }
        if !(self.world_min.is_finite() && self.world_max.is_finite() && self.world_min < self.world_max) {
            warn!(
                "movement world bounds {}..{} are invalid, using {}..{}",
                self.world_min, self.world_max, defaults.world_min, defaults.world_max
            );
            self.world_min = defaults.world_min;
            self.world_max = defaults.world_max;
        }
        if self.max_waypoints == 0 {
            warn!("movement.max_waypoints = 0 is invalid, using {}", defaults.max_waypoints);
            self.max_waypoints = defaults.max_waypoints;
        }
        if self.max_stalled_ticks == 0 {
            warn!("movement.max_stalled_ticks = 0 is invalid, using {}", defaults.max_stalled_ticks);
            self.max_stalled_ticks = defaults.max_stalled_ticks;
        }

        self
    }
}

fn positive_or(name: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("movement.{} = {} is invalid, using {}", name, value, default);
        default
    }
}

impl Config {
    /// Load configuration from `config.toml`, or use defaults if the file is missing or broken
    pub fn load() -> Self {
        if !Path::new(DEFAULT_CONFIG_PATH).exists() {
            info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
            return Config::default();
        }

        match Self::load_from(DEFAULT_CONFIG_PATH) {
            Ok(config) => {
                info!("Loaded configuration from {}", DEFAULT_CONFIG_PATH);
                config
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(contents)?;
        config.movement = config.movement.sanitized();
        Ok(config)
    }
}

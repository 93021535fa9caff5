use crate::cherry;
use crate::ghost::GhostColor;
use crate::grid;
use crate::pathfinding::{Position, SearchAlgorithm, RANDOM_WALK_MAX_ITERATIONS};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub race: RaceConfig,
    #[serde(default = "default_ghosts")]
    pub ghosts: Vec<GhostConfig>,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_path")]
    pub path: String,
    #[serde(default = "default_template_rows")]
    pub template_rows: Vec<i32>,
    #[serde(default = "default_wall_probability")]
    pub wall_probability: f64,
    #[serde(default = "default_fallback_size")]
    pub fallback_rows: i32,
    #[serde(default = "default_fallback_size")]
    pub fallback_cols: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaceConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
    #[serde(default = "default_random_walk_max_iterations")]
    pub random_walk_max_iterations: usize,
    #[serde(default = "default_cherry_max_attempts")]
    pub cherry_max_attempts: usize,
    #[serde(default = "default_cherry_fallback_x")]
    pub cherry_fallback_x: i32,
    #[serde(default = "default_cherry_fallback_y")]
    pub cherry_fallback_y: i32,
    #[serde(default = "default_max_reposition_rounds")]
    pub max_reposition_rounds: usize,
    /// Fixed RNG seed; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhostConfig {
    pub name: String,
    pub color: GhostColor,
    pub start_x: i32,
    pub start_y: i32,
    pub algorithm: SearchAlgorithm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_enable_command_log")]
    pub enable_command_log: bool,
}

// Default values
fn default_map_path() -> String { "maps/default.txt".to_string() }
fn default_template_rows() -> Vec<i32> { grid::DEFAULT_TEMPLATE_ROWS.to_vec() }
fn default_wall_probability() -> f64 { grid::DEFAULT_WALL_PROBABILITY }
fn default_fallback_size() -> i32 { grid::FALLBACK_SIZE }
fn default_tick_rate_hz() -> f64 { 10.0 }
fn default_random_walk_max_iterations() -> usize { RANDOM_WALK_MAX_ITERATIONS }
fn default_cherry_max_attempts() -> usize { cherry::DEFAULT_MAX_ATTEMPTS }
fn default_cherry_fallback_x() -> i32 { cherry::DEFAULT_FALLBACK.x }
fn default_cherry_fallback_y() -> i32 { cherry::DEFAULT_FALLBACK.y }
fn default_max_reposition_rounds() -> usize { 50 }
fn default_tile_size() -> f32 { 16.0 }
fn default_bg_r() -> u8 { 240 }
fn default_bg_g() -> u8 { 240 }
fn default_bg_b() -> u8 { 255 }
fn default_enable_command_log() -> bool { true }

fn default_ghosts() -> Vec<GhostConfig> {
    vec![
        GhostConfig::new("Cyan", GhostColor::Cyan, 15, 16, SearchAlgorithm::Bfs),
        GhostConfig::new("Pink", GhostColor::Pink, 16, 17, SearchAlgorithm::Dfs),
        GhostConfig::new("Orange", GhostColor::Orange, 17, 16, SearchAlgorithm::Dijkstra),
    ]
}

impl GhostConfig {
    pub fn new(name: &str, color: GhostColor, start_x: i32, start_y: i32, algorithm: SearchAlgorithm) -> Self {
        Self {
            name: name.to_string(),
            color,
            start_x,
            start_y,
            algorithm,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_x, self.start_y)
    }
}

impl RaceConfig {
    pub fn cherry_fallback(&self) -> Position {
        Position::new(self.cherry_fallback_x, self.cherry_fallback_y)
    }

    /// Seconds between ticks
    pub fn tick_interval(&self) -> f64 {
        if self.tick_rate_hz > 0.0 {
            1.0 / self.tick_rate_hz
        } else {
            1.0 / default_tick_rate_hz()
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            path: default_map_path(),
            template_rows: default_template_rows(),
            wall_probability: default_wall_probability(),
            fallback_rows: default_fallback_size(),
            fallback_cols: default_fallback_size(),
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            random_walk_max_iterations: default_random_walk_max_iterations(),
            cherry_max_attempts: default_cherry_max_attempts(),
            cherry_fallback_x: default_cherry_fallback_x(),
            cherry_fallback_y: default_cherry_fallback_y(),
            max_reposition_rounds: default_max_reposition_rounds(),
            seed: None,
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_command_log: default_enable_command_log(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            race: RaceConfig::default(),
            ghosts: default_ghosts(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, or use defaults if it doesn't exist
    pub fn load() -> Self {
        Self::load_or_default("config.toml")
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No {} found, using default configuration", path.display());
            return Config::default();
        }

        match Self::load_from(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{} ({})", e, path.display());
                log::warn!("Using default configuration");
                Config::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

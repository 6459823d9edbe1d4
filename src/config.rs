//! Configuration management (`<config dir>/config.toml`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entities::{Canvas, Rules};
use crate::error::ConfigError;
use crate::input::KeyBindings;

pub const DEFAULT_PLAYER_NAME: &str = "Player 1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub keys: KeyBindings,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Product switches; the defaults reproduce the classic survival rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub shield_pickup_ms: u64,
    #[serde(default)]
    pub draw_power_ups: bool,
    #[serde(default)]
    pub win_wave: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_name() -> String { DEFAULT_PLAYER_NAME.to_string() }
fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_volume() -> f32 { 0.5 }
fn default_fps() -> u32 { 60 }

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { name: default_name() }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: default_width(), height: default_height() }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { volume: default_volume() }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl CanvasConfig {
    /// Both sides finite and positive.
    pub fn is_valid(&self) -> bool {
        [self.width, self.height].iter().all(|v| v.is_finite() && *v > 0.0)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas { width: self.width, height: self.height }
    }
}

impl RulesConfig {
    pub fn rules(&self) -> Rules {
        Rules {
            shield_pickup_ms: self.shield_pickup_ms,
            draw_power_ups: self.draw_power_ups,
            win_wave: self.win_wave,
        }
    }
}

/// Trimmed display name, falling back to the default when blank.
pub fn player_name(raw: &str) -> String {
    match raw.trim() {
        "" => DEFAULT_PLAYER_NAME.to_string(),
        name => name.to_string(),
    }
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "survival-shooter", "survival-shooter")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "survival-shooter", "survival-shooter")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.sanitized())
}

impl Config {
    /// Replace values the game cannot run with by their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.canvas.is_valid() {
            tracing::warn!(
                width = self.canvas.width,
                height = self.canvas.height,
                "invalid canvas size, using default"
            );
            self.canvas = CanvasConfig::default();
        }
        self
    }
}

/// Load the user config, falling back to defaults when it is missing or broken.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    load_from(&path).unwrap_or_else(|e| {
        tracing::warn!("{}, using defaults", e);
        Config::default()
    })
}

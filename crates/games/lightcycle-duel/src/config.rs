use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lightcycle_core::game_trait::GameConfig;
use lightcycle_core::player::PlayerSlot;

use crate::arena::{Extent, SpawnPoint, default_spawn_points};
use crate::input::{KeyBinding, default_key_bindings};

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "LIGHTCYCLE_DUEL_CONFIG";
/// Config file consulted when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/duel.toml";

/// What happens when a player collects an effect that is already running on
/// its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReacquirePolicy {
    /// Push the expiry out; the multiplier is not applied a second time.
    #[default]
    Refresh,
    /// Apply the mutation again and push the expiry out. Only one revert runs
    /// at expiry, so the extra application outlives the effect until the next
    /// round reset.
    Compound,
}

/// Data-driven configuration for the duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Grid cell edge in pixels. One tick moves a cycle one cell at speed 1.
    pub cell_size: i32,
    /// Token pickup box edge in pixels.
    pub token_scale: i32,
    /// Simulation ticks per second at speed multiplier 1.
    pub base_speed: f32,
    /// Lifetime of every timed effect, in milliseconds.
    pub effect_duration_ms: u64,
    /// Round wins needed to take the match.
    pub score_to_win: u32,
    /// Viewport size; the canvas is this rounded down to whole cells.
    pub viewport_width: i32,
    pub viewport_height: i32,
    /// Spawn position and heading, indexed by slot.
    pub spawn_points: [SpawnPoint; 2],
    pub reacquire: ReacquirePolicy,
    /// Seed for token placement. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub key_bindings: BTreeMap<String, KeyBinding>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            cell_size: 10,
            token_scale: 40,
            base_speed: 8.0,
            effect_duration_ms: 5_000,
            score_to_win: 5,
            viewport_width: 800,
            viewport_height: 600,
            spawn_points: default_spawn_points(),
            reacquire: ReacquirePolicy::default(),
            rng_seed: None,
            key_bindings: default_key_bindings(),
        }
    }
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    UnknownOverride(String),
    InvalidCellSize(i32),
    InvalidTokenScale(i32),
    InvalidBaseSpeed(f32),
    ZeroScoreToWin,
    ViewportTooSmall { width: i32, height: i32 },
    SpawnOffGrid { slot: PlayerSlot, x: i32, y: i32 },
    SpawnOutOfBounds { slot: PlayerSlot, x: i32, y: i32 },
    SpawnOverlap { x: i32, y: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(m) => write!(f, "config parse error: {m}"),
            Self::UnknownOverride(key) => write!(f, "unknown config override '{key}'"),
            Self::InvalidCellSize(size) => {
                write!(f, "cell_size must be a positive even number, got {size}")
            },
            Self::InvalidTokenScale(scale) => {
                write!(f, "token_scale must be positive, got {scale}")
            },
            Self::InvalidBaseSpeed(speed) => {
                write!(f, "base_speed must be a positive tick rate, got {speed}")
            },
            Self::ZeroScoreToWin => write!(f, "score_to_win must be at least 1"),
            Self::ViewportTooSmall { width, height } => {
                write!(f, "viewport {width}x{height} is smaller than one cell")
            },
            Self::SpawnOffGrid { slot, x, y } => {
                write!(f, "{slot} spawn ({x}, {y}) is not on the cell grid")
            },
            Self::SpawnOutOfBounds { slot, x, y } => {
                write!(f, "{slot} spawn ({x}, {y}) lies outside the canvas")
            },
            Self::SpawnOverlap { x, y } => write!(f, "both players spawn at ({x}, {y})"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl DuelConfig {
    /// Load config from the environment or a TOML file, falling back to
    /// defaults. Files that fail to parse or validate are skipped.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && let Some(config) = Self::load_file(&path)
        {
            return config;
        }
        Self::load_file(DEFAULT_CONFIG_PATH).unwrap_or_default()
    }

    fn load_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match Self::from_toml_str(&contents) {
            Ok(config) => {
                tracing::info!(path, "Loaded duel config");
                Some(config)
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring invalid duel config");
                None
            },
        }
    }

    /// Parse and validate a TOML document. Missing fields keep defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Merge per-session overrides onto this config. Keys must name existing
    /// fields.
    pub fn with_overrides(&self, game_config: &GameConfig) -> Result<Self, ConfigError> {
        if game_config.custom.is_empty() {
            return Ok(self.clone());
        }
        let mut value =
            serde_json::to_value(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let serde_json::Value::Object(fields) = &mut value {
            for (key, override_value) in &game_config.custom {
                if !fields.contains_key(key) {
                    return Err(ConfigError::UnknownOverride(key.clone()));
                }
                fields.insert(key.clone(), override_value.clone());
            }
        }
        let merged: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size <= 0 || self.cell_size % 2 != 0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.token_scale <= 0 {
            return Err(ConfigError::InvalidTokenScale(self.token_scale));
        }
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(ConfigError::InvalidBaseSpeed(self.base_speed));
        }
        if self.score_to_win == 0 {
            return Err(ConfigError::ZeroScoreToWin);
        }
        if self.viewport_width < self.cell_size || self.viewport_height < self.cell_size {
            return Err(ConfigError::ViewportTooSmall {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }

        let extent = self.extent();
        for slot in PlayerSlot::ALL {
            let spawn = &self.spawn_points[slot.index()];
            if spawn.x % self.cell_size != 0 || spawn.y % self.cell_size != 0 {
                return Err(ConfigError::SpawnOffGrid {
                    slot,
                    x: spawn.x,
                    y: spawn.y,
                });
            }
            if !extent.contains(spawn.x, spawn.y) {
                return Err(ConfigError::SpawnOutOfBounds {
                    slot,
                    x: spawn.x,
                    y: spawn.y,
                });
            }
        }
        let [one, two] = &self.spawn_points;
        if one.x == two.x && one.y == two.y {
            return Err(ConfigError::SpawnOverlap { x: one.x, y: one.y });
        }
        Ok(())
    }

    /// Playable canvas: the viewport rounded down to a whole number of cells.
    pub fn extent(&self) -> Extent {
        Extent::from_viewport(self.viewport_width, self.viewport_height, self.cell_size)
    }

    pub fn effect_duration(&self) -> Duration {
        Duration::from_millis(self.effect_duration_ms)
    }
}

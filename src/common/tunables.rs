//! Tunable gameplay constants.
//!
//! Defaults reproduce the shipped balance. The full app overlays them with
//! `assets/tunables.json` when that file exists; any field may be omitted.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Visible area in pixels. The player is kept at its centre.
    pub viewport: [f32; 2],
    /// Size of one world-grid cell in pixels.
    pub cell_size: [f32; 2],
    pub player_size: f32,
    pub player_speed: f32,
    pub player_hp: i32,
    /// Minimum time between two contact-damage hits on the player.
    pub player_damage_interval: f32,
    pub coin_lifetime: f32,
    pub fire_lifetime: f32,
    pub arsonist_interval: f32,
    pub aid_kit_heal: i32,
    pub spawner_rearm: f32,
    pub straight_bullet_lifetime: f32,
    pub homing_bullet_lifetime: f32,
    /// How many ticks a bus event survives after the tick it was emitted in.
    pub event_retention_ticks: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            viewport: [1000.0, 600.0],
            cell_size: [2000.0, 1000.0],
            player_size: 75.0,
            player_speed: 500.0,
            player_hp: 100,
            player_damage_interval: 0.5,
            coin_lifetime: 5.0,
            fire_lifetime: 3.0,
            arsonist_interval: 0.1,
            aid_kit_heal: 10,
            spawner_rearm: 1.0,
            straight_bullet_lifetime: 1.0,
            homing_bullet_lifetime: 3.0,
            event_retention_ticks: 1,
        }
    }
}

impl Tunables {
    /// Load overrides from a JSON file. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no tunables at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let tunables: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        if tunables.cell_size.iter().any(|v| *v <= 0.0) {
            return Err(ConfigError::Invalid("cell_size must be positive"));
        }
        Ok(tunables)
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        Vec2::from(self.viewport)
    }

    #[inline]
    pub fn cell(&self) -> Vec2 {
        Vec2::from(self.cell_size)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read tunables: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed tunables: {e}"),
            ConfigError::Invalid(why) => write!(f, "invalid tunables: {why}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

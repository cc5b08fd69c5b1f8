//! User settings
//!
//! The only setting the engines themselves consume is the speed multiplier;
//! the rest is driver-side preference. Persisted as a JSON file next to the
//! binary.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Allowed range for the global speed multiplier
pub const SPEED_MIN: f32 = 0.75;
pub const SPEED_MAX: f32 = 1.25;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Global simulation speed multiplier, clamped to [0.75, 1.25]
    pub speed_multiplier: f32,
    /// Seed override for deterministic replays (None = derive from clock)
    pub seed: Option<u64>,
    /// Log per-run summaries at info level
    pub log_summaries: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            seed: None,
            log_summaries: true,
        }
    }
}

impl Settings {
    /// Speed multiplier clamped to the supported range
    pub fn effective_speed(&self) -> f32 {
        self.speed_multiplier.clamp(SPEED_MIN, SPEED_MAX)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings file: {e}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

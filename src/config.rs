// src/config.rs - Engine tuning knobs

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config format: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cache capacity must be greater than zero")]
    ZeroCacheCapacity,
    #[error("row geometry must be positive (row_height={row_height}, visible_rows={visible_rows})")]
    BadRowGeometry { row_height: f32, visible_rows: f32 },
}

/// Tuning parameters for an [`Autocomplete`](crate::engine::Autocomplete)
/// instance. All of these are tunables, not correctness knobs: the engine's
/// ordering guarantees hold for any valid values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Quiet window in milliseconds before a pending query actually fires.
    pub debounce_ms: u64,
    /// Maximum number of search terms kept in the result cache.
    pub cache_capacity: usize,
    /// Pixel height of one dropdown row, for scroll-into-view math.
    pub row_height: f32,
    /// How many rows the dropdown viewport shows (fractional rows allowed).
    pub visible_rows: f32,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            cache_capacity: 128,
            row_height: 41.0,
            visible_rows: 5.5,
        }
    }
}

impl AutocompleteConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AutocompleteConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable values up front so a bad configuration fails at
    /// construction time instead of on some later keystroke.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.row_height <= 0.0 || self.visible_rows <= 0.0 {
            return Err(ConfigError::BadRowGeometry {
                row_height: self.row_height,
                visible_rows: self.visible_rows,
            });
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

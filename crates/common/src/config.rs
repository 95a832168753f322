//! Configuration model for a simulation session.
//!
//! Every section has defaults, so a partial JSON document (or none at all)
//! still yields a usable configuration. Values are checked when the kernel
//! and renderer are constructed from them, not here.

use crate::types::Rgba;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    pub grid: GridConfig,
    pub palette: PaletteConfig,
    pub tick: TickConfig,
}

/// Grid geometry in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space center of the grid.
    pub position: Vec2,
    /// World-space extent of the grid.
    pub size: Vec2,
    /// Edge length of one square cell.
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::new(32.0, 18.0),
            cell_size: 0.25,
        }
    }
}

/// Cell colors and how fast dead cells fade out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub alive: Rgba,
    pub dead: Rgba,
    /// Color units per second a dead cell moves toward `dead`.
    pub fade_speed: f32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            alive: Rgba::new(0.2, 1.0, 0.45, 1.0),
            dead: Rgba::new(0.04, 0.04, 0.07, 1.0),
            fade_speed: 1.5,
        }
    }
}

/// Generation timer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Seconds between generations.
    pub interval: f32,
    pub start_paused: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: 0.1,
            start_paused: false,
        }
    }
}

impl LifeConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        serde_json::to_writer_pretty(std::fs::File::create(path)?, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = LifeConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, LifeConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = LifeConfig::from_json_str(r#"{ "grid": { "cell_size": 0.5 } }"#).unwrap();
        assert_eq!(cfg.grid.cell_size, 0.5);
        assert_eq!(cfg.grid.size, GridConfig::default().size);
        assert_eq!(cfg.tick, TickConfig::default());
    }

    #[test]
    fn vec2_fields_parse_as_arrays() {
        let cfg = LifeConfig::from_json_str(
            r#"{ "grid": { "position": [1.0, -2.0], "size": [4.0, 4.0] } }"#,
        )
        .unwrap();
        assert_eq!(cfg.grid.position, Vec2::new(1.0, -2.0));
        assert_eq!(cfg.grid.size, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = LifeConfig::from_json_str("{ grid: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("life.json");
        let mut cfg = LifeConfig::default();
        cfg.tick.start_paused = true;
        cfg.save(&path).unwrap();

        let loaded = LifeConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LifeConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

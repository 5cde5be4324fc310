//! Algorithm configuration file
//!
//! Default offsets and slopes for the algorithms, stored as RON. Fields that
//! are missing from a file get their default value.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Offsets used by the phreatic line builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhreaticLineConfig {
    /// Drop of point B below the river level
    pub b_offset: f64,
    /// Drop of point C below the river level
    pub c_offset: f64,
    /// Depth of point E below the surface for clay embankments
    pub e_offset: f64,
    /// Drop of point B below the river level for a sand embankment on clay
    pub sand_b_offset: f64,
    /// Part of the head difference between river and surface used as depth
    /// of point E for sand embankments
    pub sand_e_fraction: f64,
    /// Depth of point D below the surface, interpolated between C and E if
    /// not set
    pub d_offset: Option<f64>,
    /// Minimum distance between the phreatic line and the surface
    pub surface_clearance: f64,
    /// Height of the aquifer reference line above the top of the aquifer
    pub penetration_length: f64,
}

impl Default for PhreaticLineConfig {
    fn default() -> Self {
        Self {
            b_offset: 1.0,
            c_offset: 1.5,
            e_offset: 0.1,
            sand_b_offset: 0.5,
            sand_e_fraction: 0.1,
            d_offset: None,
            surface_clearance: 0.01,
            penetration_length: 1.0,
        }
    }
}

/// Default slopes of a berm, as horizontal distance per unit height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BermConfig {
    pub slope_top: f64,
    pub slope_bottom: f64,
}

impl Default for BermConfig {
    fn default() -> Self {
        Self {
            slope_top: 20.0,
            slope_bottom: 3.0,
        }
    }
}

/// Settings for adding fill material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Fill polygons with a smaller area are dropped
    pub min_area: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self { min_area: 0.01 }
    }
}

/// Configuration of all algorithms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub phreatic_line: PhreaticLineConfig,
    pub berm: BermConfig,
    pub fill: FillConfig,
}

impl AlgorithmConfig {
    /// Save the configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize the configuration to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load the configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: AlgorithmConfig =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        tracing::info!("Loaded algorithm configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load the configuration from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        let content =
            std::str::from_utf8(data).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlgorithmConfig::default();
        assert_eq!(config.phreatic_line.b_offset, 1.0);
        assert_eq!(config.phreatic_line.c_offset, 1.5);
        assert_eq!(config.phreatic_line.d_offset, None);
        assert_eq!(config.fill.min_area, 0.01);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config =
            AlgorithmConfig::from_bytes(b"(phreatic_line: (c_offset: 2.0, d_offset: Some(0.5)))")
                .unwrap();
        assert_eq!(config.phreatic_line.c_offset, 2.0);
        assert_eq!(config.phreatic_line.d_offset, Some(0.5));
        assert_eq!(config.phreatic_line.b_offset, 1.0);
        assert_eq!(config.berm, BermConfig::default());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("algorithms.ron");

        let mut config = AlgorithmConfig::default();
        config.berm.slope_top = 15.0;
        config.save(&path).unwrap();

        let loaded = AlgorithmConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            AlgorithmConfig::from_bytes(b"(berm: 3)"),
            Err(ConfigError::Deserialize(_))
        ));
        assert!(matches!(
            AlgorithmConfig::load("/nonexistent/algorithms.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}

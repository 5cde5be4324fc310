//! Soil parameters

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a soil code that is not part of a collection
#[derive(Debug, Clone, Error)]
#[error("Unknown soil code '{0}'")]
pub struct UnknownSoilCode(pub String);

/// Basic parameters of a soil type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soil {
    pub code: String,
    /// Display color as hex string (#rrggbb)
    pub color: String,
    /// Unit weight above the phreatic line
    pub y_dry: f64,
    /// Unit weight below the phreatic line
    pub y_sat: f64,
    pub cohesion: f64,
    pub friction_angle: f64,
}

impl Soil {
    pub fn new(
        code: impl Into<String>,
        color: impl Into<String>,
        y_dry: f64,
        y_sat: f64,
        cohesion: f64,
        friction_angle: f64,
    ) -> Self {
        Self {
            code: code.into(),
            color: color.into(),
            y_dry,
            y_sat,
            cohesion,
            friction_angle,
        }
    }
}

/// Set of soils addressed by their code, with optional aliases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilCollection {
    soils: Vec<Soil>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

impl Default for SoilCollection {
    /// Generic soils including the `top_material` and `bottom_material` fill
    /// codes
    fn default() -> Self {
        Self {
            soils: vec![
                Soil::new("preexcavated", "#54575c", 14.0, 14.0, 2.0, 20.0),
                Soil::new("unknown", "#696969", 14.0, 14.0, 2.0, 20.0),
                Soil::new("top_material", "#696969", 15.0, 15.0, 2.0, 22.0),
                Soil::new("bottom_material", "#808080", 17.0, 19.0, 0.0, 30.0),
                Soil::new("peat", "#786926", 10.0, 10.0, 1.5, 17.5),
                Soil::new("organic_clay", "#a3de2f", 14.0, 14.0, 2.0, 20.0),
                Soil::new("clay", "#3c6318", 15.0, 15.0, 5.0, 25.0),
                Soil::new("silty_clay", "#596b15", 15.0, 15.0, 3.0, 25.0),
                Soil::new("silty_sand", "#9fa12d", 16.0, 18.0, 1.0, 27.5),
                Soil::new("sand", "#e6e876", 17.0, 19.0, 0.0, 30.0),
                Soil::new("dense_sand", "#fcf403", 19.0, 21.0, 0.0, 35.0),
            ],
            aliases: HashMap::new(),
        }
    }
}

impl SoilCollection {
    /// Create a collection without any soils
    pub fn empty() -> Self {
        Self {
            soils: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// All soils in the collection
    pub fn soils(&self) -> &[Soil] {
        &self.soils
    }

    /// Add a soil, replacing an existing soil with the same code
    pub fn add(&mut self, soil: Soil) {
        self.soils.retain(|s| s.code != soil.code);
        self.soils.push(soil);
    }

    /// Let `alias` refer to an existing soil code
    pub fn add_alias(
        &mut self,
        alias: impl Into<String>,
        soilcode: &str,
    ) -> Result<(), UnknownSoilCode> {
        if !self.soils.iter().any(|s| s.code == soilcode) {
            return Err(UnknownSoilCode(soilcode.to_string()));
        }
        let alias = alias.into();
        if !alias.is_empty() {
            self.aliases.entry(alias).or_insert_with(|| soilcode.to_string());
        }
        Ok(())
    }

    /// Get a soil by code or alias
    pub fn get(&self, soilcode: &str) -> Option<&Soil> {
        let code = self
            .aliases
            .get(soilcode)
            .map(String::as_str)
            .unwrap_or(soilcode);
        self.soils.iter().find(|s| s.code == code)
    }

    /// Check if a soil code or alias is known
    pub fn has_soilcode(&self, soilcode: &str) -> bool {
        self.get(soilcode).is_some()
    }

    /// Like [`SoilCollection::has_soilcode`] but as a result
    pub fn require(&self, soilcode: &str) -> Result<&Soil, UnknownSoilCode> {
        self.get(soilcode)
            .ok_or_else(|| UnknownSoilCode(soilcode.to_string()))
    }

    /// Soil codes in the collection
    pub fn codes(&self) -> Vec<&str> {
        self.soils.iter().map(|s| s.code.as_str()).collect()
    }
}

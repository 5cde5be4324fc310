//! Material layout regimes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a material layout that is not known
#[derive(Debug, Clone, Error)]
#[error("Unknown material layout '{0}'")]
pub struct UnknownMaterialLayout(pub String);

/// Classification of the embankment material and its foundation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialLayoutRegime {
    ClayEmbankmentOnClay,
    SandEmbankmentOnClay,
    ClayEmbankmentOnSand,
    SandEmbankmentOnSand,
}

impl MaterialLayoutRegime {
    pub const ALL: [MaterialLayoutRegime; 4] = [
        Self::ClayEmbankmentOnClay,
        Self::SandEmbankmentOnClay,
        Self::ClayEmbankmentOnSand,
        Self::SandEmbankmentOnSand,
    ];

    /// Numeric code used in stored waternet settings
    pub fn code(&self) -> i32 {
        match self {
            Self::ClayEmbankmentOnClay => 10,
            Self::SandEmbankmentOnClay => 11,
            Self::ClayEmbankmentOnSand => 12,
            Self::SandEmbankmentOnSand => 13,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, UnknownMaterialLayout> {
        Self::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| UnknownMaterialLayout(code.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClayEmbankmentOnClay => "clay_embankment_on_clay",
            Self::SandEmbankmentOnClay => "sand_embankment_on_clay",
            Self::ClayEmbankmentOnSand => "clay_embankment_on_sand",
            Self::SandEmbankmentOnSand => "sand_embankment_on_sand",
        }
    }

    /// Whether the embankment is made of sand
    pub fn sand_embankment(&self) -> bool {
        matches!(self, Self::SandEmbankmentOnClay | Self::SandEmbankmentOnSand)
    }

    /// Whether the foundation is a sand aquifer
    pub fn has_aquifer(&self) -> bool {
        matches!(self, Self::ClayEmbankmentOnSand | Self::SandEmbankmentOnSand)
    }
}

impl fmt::Display for MaterialLayoutRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MaterialLayoutRegime {
    type Err = UnknownMaterialLayout;

    /// Accepts the label or the numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code);
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.label() == lower)
            .ok_or_else(|| UnknownMaterialLayout(s.to_string()))
    }
}

//! Soil layers

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A horizontal slice of a single material between two levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Top level of the layer
    pub top: f64,
    /// Bottom level of the layer
    pub bottom: f64,
    /// Material code of the layer
    pub soilcode: String,
}

impl SoilLayer {
    /// Create a new soil layer
    pub fn new(top: f64, bottom: f64, soilcode: impl Into<String>) -> Self {
        Self {
            top,
            bottom,
            soilcode: soilcode.into(),
        }
    }

    /// Height of the layer (top minus bottom)
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Level halfway between top and bottom
    pub fn mid(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Check if the level z lies within the layer (boundaries included)
    pub fn contains(&self, z: f64) -> bool {
        self.bottom <= z && z <= self.top
    }

    /// Corner points of the rectangle this layer spans between left and right
    ///
    /// Order is top left, top right, bottom right, bottom left.
    pub fn to_points(&self, left: f64, right: f64) -> Vec<Point> {
        vec![
            Point::new(left, self.top),
            Point::new(right, self.top),
            Point::new(right, self.bottom),
            Point::new(left, self.bottom),
        ]
    }
}

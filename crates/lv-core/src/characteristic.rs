//! Characteristic points
//!
//! Named x locations on a cross-section such as the embankment toe or the
//! edges of a ditch. A point that is not defined is stored as NaN and is
//! never silently used as zero, [`CharacteristicPoints::require`] turns it
//! into an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of a characteristic point, ordered from water side to land side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacteristicPointType {
    EmbankmentToeWaterSide,
    EmbankmentTopWaterSide,
    EmbankmentTopLandSide,
    ShoulderBaseLandSide,
    EmbankmentToeLandSide,
    DitchEmbankmentSide,
    DitchBottomEmbankmentSide,
    DitchBottomLandSide,
    DitchLandSide,
}

impl CharacteristicPointType {
    /// All point types
    pub const ALL: [CharacteristicPointType; 9] = [
        Self::EmbankmentToeWaterSide,
        Self::EmbankmentTopWaterSide,
        Self::EmbankmentTopLandSide,
        Self::ShoulderBaseLandSide,
        Self::EmbankmentToeLandSide,
        Self::DitchEmbankmentSide,
        Self::DitchBottomEmbankmentSide,
        Self::DitchBottomLandSide,
        Self::DitchLandSide,
    ];

    /// The four ditch points from embankment side to land side
    pub const DITCH: [CharacteristicPointType; 4] = [
        Self::DitchEmbankmentSide,
        Self::DitchBottomEmbankmentSide,
        Self::DitchBottomLandSide,
        Self::DitchLandSide,
    ];

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmbankmentToeWaterSide => "embankment toe water side",
            Self::EmbankmentTopWaterSide => "embankment top water side",
            Self::EmbankmentTopLandSide => "embankment top land side",
            Self::ShoulderBaseLandSide => "shoulder base land side",
            Self::EmbankmentToeLandSide => "embankment toe land side",
            Self::DitchEmbankmentSide => "ditch embankment side",
            Self::DitchBottomEmbankmentSide => "ditch bottom embankment side",
            Self::DitchBottomLandSide => "ditch bottom land side",
            Self::DitchLandSide => "ditch land side",
        }
    }
}

impl fmt::Display for CharacteristicPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a characteristic point that is needed but not defined
#[derive(Debug, Clone, Error)]
#[error("Characteristic point '{0}' is not defined")]
pub struct MissingCharacteristicPoint(pub CharacteristicPointType);

/// A characteristic point, `x` is NaN when the point is not defined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicPoint {
    pub point_type: CharacteristicPointType,
    pub x: f64,
}

impl CharacteristicPoint {
    pub fn new(point_type: CharacteristicPointType, x: f64) -> Self {
        Self { point_type, x }
    }

    /// An undefined point of the given type
    pub fn invalid(point_type: CharacteristicPointType) -> Self {
        Self {
            point_type,
            x: f64::NAN,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
    }

    /// The x coordinate if the point is defined
    pub fn x(&self) -> Option<f64> {
        self.is_valid().then_some(self.x)
    }
}

/// The characteristic points of a cross-section
///
/// Only defined points are stored, asking for any other type gives an
/// invalid point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicPoints {
    points: BTreeMap<CharacteristicPointType, f64>,
}

impl CharacteristicPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [`CharacteristicPoints::set`]
    pub fn with(mut self, point_type: CharacteristicPointType, x: f64) -> Self {
        self.set(point_type, x);
        self
    }

    /// Set the x of a point, a non finite x removes the point
    pub fn set(&mut self, point_type: CharacteristicPointType, x: f64) {
        if x.is_finite() {
            self.points.insert(point_type, x);
        } else {
            self.points.remove(&point_type);
        }
    }

    pub fn unset(&mut self, point_type: CharacteristicPointType) {
        self.points.remove(&point_type);
    }

    pub fn get(&self, point_type: CharacteristicPointType) -> CharacteristicPoint {
        match self.points.get(&point_type) {
            Some(x) => CharacteristicPoint::new(point_type, *x),
            None => CharacteristicPoint::invalid(point_type),
        }
    }

    /// The x of a point that has to be defined
    pub fn require(
        &self,
        point_type: CharacteristicPointType,
    ) -> Result<f64, MissingCharacteristicPoint> {
        self.points
            .get(&point_type)
            .copied()
            .ok_or(MissingCharacteristicPoint(point_type))
    }

    pub fn is_valid(&self, point_type: CharacteristicPointType) -> bool {
        self.points.contains_key(&point_type)
    }

    /// All points, invalid ones included, ordered from water side to land side
    pub fn all(&self) -> Vec<CharacteristicPoint> {
        CharacteristicPointType::ALL
            .iter()
            .map(|t| self.get(*t))
            .collect()
    }

    /// Defined points
    pub fn iter(&self) -> impl Iterator<Item = CharacteristicPoint> + '_ {
        self.points
            .iter()
            .map(|(t, x)| CharacteristicPoint::new(*t, *x))
    }

    /// Copy with every x transformed
    pub fn map_x(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self.points.iter().map(|(t, x)| (*t, f(*x))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharacteristicPointType::*;

    #[test]
    fn test_invalid_point_is_nan() {
        let points = CharacteristicPoints::new().with(EmbankmentToeLandSide, 30.0);
        assert!(points.get(EmbankmentToeLandSide).is_valid());
        let missing = points.get(ShoulderBaseLandSide);
        assert!(!missing.is_valid());
        assert!(missing.x.is_nan());
        assert_eq!(missing.x(), None);
    }

    #[test]
    fn test_require() {
        let points = CharacteristicPoints::new().with(EmbankmentTopLandSide, 20.0);
        assert_eq!(points.require(EmbankmentTopLandSide).unwrap(), 20.0);
        let err = points.require(DitchLandSide).unwrap_err();
        assert_eq!(err.to_string(), "Characteristic point 'ditch land side' is not defined");
    }

    #[test]
    fn test_set_nan_removes_point() {
        let mut points = CharacteristicPoints::new().with(DitchLandSide, 50.0);
        points.set(DitchLandSide, f64::NAN);
        assert!(!points.is_valid(DitchLandSide));
        assert_eq!(points.iter().count(), 0);
        assert_eq!(points.all().len(), 9);
    }

    #[test]
    fn test_map_x() {
        let points = CharacteristicPoints::new()
            .with(EmbankmentToeWaterSide, 10.0)
            .with(EmbankmentToeLandSide, 30.0)
            .map_x(|x| x + 5.0);
        assert_eq!(points.require(EmbankmentToeWaterSide).unwrap(), 15.0);
        assert_eq!(points.require(EmbankmentToeLandSide).unwrap(), 35.0);
    }
}

//! Levee Cross-Section Model
//!
//! This crate provides:
//! - Planar geometry primitives and polyline intersections
//! - One dimensional soil profiles and rows of profiles
//! - Soil polygons and soil parameters
//! - Characteristic points and material layout regimes
//! - Cross-sections with derived surface, per-x queries and stage copies
//! - A store trait for reading and writing cross-sections

pub mod characteristic;
pub mod constants;
pub mod crosssection;
pub mod geometry;
pub mod regime;
pub mod soil;

// Re-exports for convenience
pub use characteristic::{
    CharacteristicPoint, CharacteristicPointType, CharacteristicPoints, MissingCharacteristicPoint,
};
pub use crosssection::{
    CrossSection, CrossSectionError, CrossSectionResult, CrossSectionStore, HeadLine, IdMap,
    MemoryStore, PHREATIC_LINE_LABEL, Waternet, WaternetSettings,
};
pub use geometry::{GeometryError, GeometryResult, Point, Polyline};
pub use regime::{MaterialLayoutRegime, UnknownMaterialLayout};
pub use soil::{
    Profile1D, ProfileError, ProfileResult, ProfileRow, Soil, SoilCollection, SoilLayer,
    SoilPolygon, UnknownSoilCode,
};

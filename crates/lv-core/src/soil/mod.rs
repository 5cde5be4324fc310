//! Stratigraphy
//!
//! Soil layers stacked into one dimensional profiles, profiles composed into
//! rows and the polygons derived from them.

mod collection;
mod layer;
mod polygon;
mod profile;
mod row;

pub use collection::{Soil, SoilCollection, UnknownSoilCode};
pub use layer::SoilLayer;
pub use polygon::{SoilPolygon, cut_above, subtract_region};
pub use profile::Profile1D;
pub use row::ProfileRow;

use thiserror::Error;

use crate::geometry::GeometryError;

/// Errors raised while building or editing profiles
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    #[error("Gap between layers: {0}")]
    Gap(String),

    #[error("Invalid layer height: {0}")]
    Height(String),

    #[error("Profile has no layers")]
    Empty,

    #[error("Cutting between {top} and {bottom} leaves no layers")]
    EmptyCut { top: f64, bottom: f64 },

    #[error("Profile starts at x={left} but the row ends at x={right}")]
    Continuity { left: f64, right: f64 },

    #[error("A fill material for the {0} of the profile is required")]
    MissingFillMaterial(&'static str),

    #[error("Invalid profile string '{0}'")]
    Parse(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

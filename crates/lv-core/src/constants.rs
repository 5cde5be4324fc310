//! Global constants for lv-core

/// Number of decimals used when rounding computed coordinates
pub const COORDINATE_DECIMALS: i32 = 3;

/// Tolerance used when comparing coordinates that went through rounding
pub const COORDINATE_TOLERANCE: f64 = 1e-6;

/// Smallest horizontal step between two generated points on a line
pub const MIN_DX: f64 = 0.01;

/// Height added above the geometry when building the region that is cut away
/// above a crosssection line
pub const EXCESS_REGION_MARGIN: f64 = 1.0;

/// Polygons with an area below this value are considered slivers
pub const MIN_POLYGON_AREA: f64 = 1e-6;

//! Geometry Primitives
//!
//! Points, polylines and the intersection routines everything else in the
//! crate is built on. Coordinates are planar (x to the right, z up) and
//! computed points are rounded to [`COORDINATE_DECIMALS`] so that results of
//! successive steps can be compared for equality.

mod intersect;
mod region;

pub use intersect::{line_polyline_intersections, polyline_polyline_intersections};
pub use region::{polygon_area, polygon_contains, union_boundary};
pub(crate) use region::{excess_region, from_geo_polygon, to_geo_polygon};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{COORDINATE_DECIMALS, COORDINATE_TOLERANCE};

/// Geometry-related errors
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    #[error("Polyline needs at least {required} points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("Geometry is not connected, the union consists of {0} separate polygons")]
    Disconnected(usize),

    #[error("Geometry is empty")]
    Empty,
}

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// A point in the (x, z) plane of a cross-section
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, increasing from the water side to the land side
    pub x: f64,
    /// Vertical coordinate, increasing upwards
    pub z: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Copy of this point rounded to the coordinate precision
    pub fn rounded(self) -> Self {
        Self::new(round_to(self.x, COORDINATE_DECIMALS), round_to(self.z, COORDINATE_DECIMALS))
    }

    /// Check if two points are equal within the coordinate tolerance
    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= COORDINATE_TOLERANCE
            && (self.z - other.z).abs() <= COORDINATE_TOLERANCE
    }

    /// Convert to a glam vector (x, z) -> (x, y)
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.z)
    }

    /// Copy of this point moved vertically
    pub fn offset_z(self, dz: f64) -> Self {
        Self::new(self.x, self.z + dz)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, z): (f64, f64)) -> Self {
        Self::new(x, z)
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(p: Point) -> Self {
        geo::coord! { x: p.x, y: p.z }
    }
}

/// An ordered, open sequence of points
pub type Polyline = Vec<Point>;

/// Round a value to the given number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Linear interpolation of z at x on the line through p1 and p2
///
/// For a vertical line the z of `p1` is returned.
pub fn interpolate_z(p1: Point, p2: Point, x: f64) -> f64 {
    if (p2.x - p1.x).abs() < f64::EPSILON {
        return p1.z;
    }
    p1.z + (x - p1.x) / (p2.x - p1.x) * (p2.z - p1.z)
}

/// Get z on a polyline at x using the first segment that spans x
pub fn polyline_z_at(polyline: &[Point], x: f64) -> Option<f64> {
    polyline.windows(2).find_map(|w| {
        let (p1, p2) = (w[0], w[1]);
        let (min_x, max_x) = (p1.x.min(p2.x), p1.x.max(p2.x));
        (min_x - COORDINATE_TOLERANCE <= x && x <= max_x + COORDINATE_TOLERANCE)
            .then(|| interpolate_z(p1, p2, x))
    })
}

/// Sort points on x (then z) and remove duplicates
pub fn sort_and_dedup(points: &mut Vec<Point>) {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.z.total_cmp(&b.z)));
    points.dedup_by(|a, b| a.approx_eq(b));
}

/// Remove consecutive duplicate points from a polyline
pub fn remove_consecutive_duplicates(points: &mut Vec<Point>) {
    points.dedup_by(|a, b| a.approx_eq(b));
}

/// Bounding (min, max) values of the x and z coordinates of a set of points
///
/// Returns None for an empty slice
pub fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    Some(points.iter().fold((*first, *first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.z.min(p.z)),
            Point::new(max.x.max(p.x), max.z.max(p.z)),
        )
    }))
}

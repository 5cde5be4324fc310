//! Soil polygons

use geo::{Area, BooleanOps, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MIN_POLYGON_AREA;
use crate::geometry::{
    GeometryError, GeometryResult, Point, bounds, excess_region, from_geo_polygon, polygon_area,
    polygon_contains, to_geo_polygon,
};

/// A closed region of a single soil in the cross-section
///
/// The ring is stored without repeating the first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilPolygon {
    /// Unique identifier
    pub id: Uuid,
    /// Points of the ring
    pub points: Vec<Point>,
    /// Soil code of the material
    pub soilcode: String,
}

impl SoilPolygon {
    /// Create a new polygon with a fresh id
    pub fn new(points: Vec<Point>, soilcode: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            soilcode: soilcode.into(),
        }
    }

    /// Area of the polygon
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Check if a point lies inside or on the border of the polygon
    pub fn contains(&self, point: Point) -> bool {
        polygon_contains(&self.points, point)
    }

    /// Leftmost x of the polygon
    pub fn left(&self) -> Option<f64> {
        bounds(&self.points).map(|(min, _)| min.x)
    }

    /// Rightmost x of the polygon
    pub fn right(&self) -> Option<f64> {
        bounds(&self.points).map(|(_, max)| max.x)
    }

    /// Highest z of the polygon
    pub fn top(&self) -> Option<f64> {
        bounds(&self.points).map(|(_, max)| max.z)
    }

    /// Lowest z of the polygon
    pub fn bottom(&self) -> Option<f64> {
        bounds(&self.points).map(|(min, _)| min.z)
    }

    /// Copy with every x coordinate transformed, keeping the id
    pub fn map_x(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            id: self.id,
            points: self.points.iter().map(|p| Point::new(f(p.x), p.z)).collect(),
            soilcode: self.soilcode.clone(),
        }
    }
}

/// Remove a region from every polygon
///
/// A polygon that is split by the region yields several polygons with the
/// same soil code, a polygon inside the region disappears. Only the first
/// resulting piece keeps the original id.
pub fn subtract_region(polygons: &[SoilPolygon], region: &[Point]) -> Vec<SoilPolygon> {
    subtract_geo_region(polygons, &to_geo_polygon(region))
}

fn subtract_geo_region(polygons: &[SoilPolygon], region: &Polygon<f64>) -> Vec<SoilPolygon> {
    let region = MultiPolygon::new(vec![region.clone()]);
    let mut result = Vec::new();

    for polygon in polygons {
        let subject = MultiPolygon::new(vec![to_geo_polygon(&polygon.points)]);
        let remaining = subject.difference(&region);
        let mut first = true;
        for piece in remaining.0.iter().filter(|p| p.unsigned_area() > MIN_POLYGON_AREA) {
            let points = from_geo_polygon(piece);
            if points.len() < 3 {
                continue;
            }
            let id = if first { polygon.id } else { Uuid::new_v4() };
            first = false;
            result.push(SoilPolygon {
                id,
                points,
                soilcode: polygon.soilcode.clone(),
            });
        }
    }

    result
}

/// Remove everything above `line` from the polygons
///
/// The line is extended horizontally to the extent of the polygons when it
/// is shorter.
pub fn cut_above(polygons: &[SoilPolygon], line: &[Point]) -> GeometryResult<Vec<SoilPolygon>> {
    if line.len() < 2 {
        return Err(GeometryError::TooFewPoints {
            required: 2,
            actual: line.len(),
        });
    }

    let all_points: Vec<Point> = polygons
        .iter()
        .flat_map(|p| p.points.iter().copied())
        .chain(line.iter().copied())
        .collect();
    let (min, max) = bounds(&all_points).ok_or(GeometryError::Empty)?;

    let region = excess_region(line, min.x, max.x, max.z);
    let result = subtract_geo_region(polygons, &region);
    tracing::debug!(
        "Cut {} polygons above line, {} remain",
        polygons.len(),
        result.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::SoilLayer;
    use approx::assert_relative_eq;

    fn layer(top: f64, bottom: f64, code: &str) -> SoilPolygon {
        SoilPolygon::new(SoilLayer::new(top, bottom, code).to_points(0.0, 10.0), code)
    }

    #[test]
    fn test_polygon_bounds() {
        let p = layer(0.0, -2.0, "clay");
        assert_eq!(p.left(), Some(0.0));
        assert_eq!(p.right(), Some(10.0));
        assert_eq!(p.top(), Some(0.0));
        assert_eq!(p.bottom(), Some(-2.0));
        assert!(p.contains(Point::new(5.0, -1.0)));
    }

    #[test]
    fn test_cut_above_horizontal_line() {
        let polygons = vec![layer(0.0, -2.0, "clay"), layer(-2.0, -5.0, "sand")];
        let line = vec![Point::new(0.0, -1.0), Point::new(10.0, -1.0)];
        let result = cut_above(&polygons, &line).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, polygons[0].id);
        assert_relative_eq!(result[0].area(), 10.0);
        assert_relative_eq!(result[1].area(), 30.0);
    }

    #[test]
    fn test_cut_above_removes_polygon() {
        let polygons = vec![layer(0.0, -2.0, "clay"), layer(-2.0, -5.0, "sand")];
        let line = vec![Point::new(0.0, -3.0), Point::new(10.0, -3.0)];
        let result = cut_above(&polygons, &line).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].soilcode, "sand");
    }

    #[test]
    fn test_cut_above_splits_polygon() {
        // a line that dips below the top of the layer twice and rises above it
        // in the middle splits the layer into two pieces
        let polygons = vec![layer(0.0, -2.0, "clay")];
        let line = vec![
            Point::new(0.0, -1.0),
            Point::new(4.0, -1.0),
            Point::new(5.0, -3.0),
            Point::new(6.0, -1.0),
            Point::new(10.0, -1.0),
        ];
        let result = cut_above(&polygons, &line).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.soilcode == "clay"));
        assert_ne!(result[0].id, result[1].id);
    }

    #[test]
    fn test_cut_above_short_line() {
        assert!(matches!(
            cut_above(&[layer(0.0, -1.0, "clay")], &[Point::new(0.0, 0.0)]),
            Err(GeometryError::TooFewPoints { .. })
        ));
    }

    #[test]
    fn test_subtract_region() {
        let polygons = vec![layer(0.0, -2.0, "clay")];
        let hole = vec![
            Point::new(2.0, 1.0),
            Point::new(4.0, 1.0),
            Point::new(4.0, -1.0),
            Point::new(2.0, -1.0),
        ];
        let result = subtract_region(&polygons, &hole);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result[0].area(), 16.0);
    }
}

//! Polygon regions backed by `geo`

use geo::algorithm::orient::{Direction, Orient};
use geo::{Area, BooleanOps, Intersects, LineString, MultiPolygon, Polygon};

use super::{GeometryError, GeometryResult, Point, remove_consecutive_duplicates};
use crate::constants::EXCESS_REGION_MARGIN;

pub(crate) fn to_geo_polygon(points: &[Point]) -> Polygon<f64> {
    let coords: Vec<geo::Coord<f64>> = points.iter().map(|p| (*p).into()).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Exterior ring of a geo polygon as rounded points without the closing point
pub(crate) fn from_geo_polygon(polygon: &Polygon<f64>) -> Vec<Point> {
    let mut points: Vec<Point> = polygon
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y).rounded())
        .collect();
    remove_consecutive_duplicates(&mut points);
    if points.len() > 1 && points[0].approx_eq(&points[points.len() - 1]) {
        points.pop();
    }
    points
}

/// The region between `line` and a horizontal line `EXCESS_REGION_MARGIN`
/// above `top`, spanning `left` to `right`
///
/// The line is extended horizontally to `left` and `right` if it is shorter.
pub(crate) fn excess_region(line: &[Point], left: f64, right: f64, top: f64) -> Polygon<f64> {
    let mut boundary = line.to_vec();
    if let Some(first) = boundary.first().copied() {
        if first.x > left {
            boundary.insert(0, Point::new(left, first.z));
        }
    }
    if let Some(last) = boundary.last().copied() {
        if last.x < right {
            boundary.push(Point::new(right, last.z));
        }
    }

    let z = top + EXCESS_REGION_MARGIN;
    let mut ring = vec![Point::new(left, z), Point::new(right, z)];
    ring.extend(boundary.into_iter().rev());
    to_geo_polygon(&ring)
}

/// Unsigned area of the polygon formed by the given points
pub fn polygon_area(points: &[Point]) -> f64 {
    to_geo_polygon(points).unsigned_area()
}

/// Check if a point lies inside or on the boundary of a polygon
pub fn polygon_contains(points: &[Point], point: Point) -> bool {
    to_geo_polygon(points).intersects(&geo::Point::new(point.x, point.z))
}

/// Outer boundary of the union of the given polygons
///
/// The boundary is returned clockwise and rounded. Fails if there is nothing
/// to merge or if the polygons do not form one connected region.
pub fn union_boundary(polygons: &[Vec<Point>]) -> GeometryResult<Vec<Point>> {
    let mut iter = polygons.iter().filter(|p| p.len() >= 3);
    let first = iter.next().ok_or(GeometryError::Empty)?;

    let mut union = MultiPolygon::new(vec![to_geo_polygon(first)]);
    for points in iter {
        union = union.union(&MultiPolygon::new(vec![to_geo_polygon(points)]));
    }

    match union.0.len() {
        0 => Err(GeometryError::Empty),
        1 => {
            let merged = union.0[0].orient(Direction::Reversed);
            Ok(from_geo_polygon(&merged))
        }
        n => Err(GeometryError::Disconnected(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(left: f64, right: f64, top: f64, bottom: f64) -> Vec<Point> {
        vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ]
    }

    #[test]
    fn test_polygon_area() {
        assert_relative_eq!(polygon_area(&rect(0.0, 10.0, 0.0, -2.0)), 20.0);
    }

    #[test]
    fn test_polygon_contains() {
        let r = rect(0.0, 10.0, 0.0, -2.0);
        assert!(polygon_contains(&r, Point::new(5.0, -1.0)));
        assert!(polygon_contains(&r, Point::new(0.0, -1.0)));
        assert!(!polygon_contains(&r, Point::new(11.0, -1.0)));
    }

    #[test]
    fn test_union_boundary_of_stacked_layers() {
        let layers = vec![rect(0.0, 10.0, 0.0, -2.0), rect(0.0, 10.0, -2.0, -5.0)];
        let boundary = union_boundary(&layers).unwrap();
        assert_relative_eq!(polygon_area(&boundary), 50.0);
        assert!(boundary.iter().any(|p| p.approx_eq(&Point::new(0.0, 0.0))));
        assert!(boundary.iter().any(|p| p.approx_eq(&Point::new(10.0, -5.0))));
    }

    #[test]
    fn test_union_boundary_disconnected() {
        let layers = vec![rect(0.0, 10.0, 0.0, -2.0), rect(20.0, 30.0, 0.0, -2.0)];
        assert!(matches!(
            union_boundary(&layers),
            Err(GeometryError::Disconnected(2))
        ));
        assert!(matches!(union_boundary(&[]), Err(GeometryError::Empty)));
    }

    #[test]
    fn test_excess_region_extends_line() {
        let line = vec![Point::new(2.0, 0.0), Point::new(8.0, 0.0)];
        let region = excess_region(&line, 0.0, 10.0, 0.0);
        // 10 wide, EXCESS_REGION_MARGIN high
        assert_relative_eq!(region.unsigned_area(), 10.0 * EXCESS_REGION_MARGIN);
    }
}

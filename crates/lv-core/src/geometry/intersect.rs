//! Line / polyline intersections

use glam::DVec2;

use super::{Point, sort_and_dedup};
use crate::constants::COORDINATE_TOLERANCE;

/// Relative tolerance for the parallel test of two segments
const PARALLEL_EPSILON: f64 = 1e-12;

/// Tolerance on the segment parameters (0..1) of an intersection
const PARAMETER_EPSILON: f64 = 1e-9;

/// Outcome of intersecting two segments
#[derive(Debug, Clone, Copy, PartialEq)]
enum SegmentHit {
    None,
    Point(DVec2),
    /// Collinear segments sharing a stretch of non-zero length
    Overlap(DVec2, DVec2),
}

fn intersect_segments(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> SegmentHit {
    let r = p2 - p1;
    let s = q2 - q1;
    let rr = r.length_squared();
    let ss = s.length_squared();
    if rr == 0.0 || ss == 0.0 {
        return SegmentHit::None;
    }

    let qp = q1 - p1;
    let denom = r.perp_dot(s);

    if denom.abs() <= PARALLEL_EPSILON * rr.sqrt() * ss.sqrt() {
        // parallel, only collinear segments can touch
        if qp.perp_dot(r).abs() > PARALLEL_EPSILON.sqrt() * rr.sqrt() * qp.length().max(1.0) {
            return SegmentHit::None;
        }
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        if lo > hi + PARAMETER_EPSILON {
            return SegmentHit::None;
        }
        let a = p1 + r * lo;
        let b = p1 + r * hi;
        if a.distance(b) <= COORDINATE_TOLERANCE {
            return SegmentHit::Point(a);
        }
        return SegmentHit::Overlap(a, b);
    }

    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    let range = -PARAMETER_EPSILON..=1.0 + PARAMETER_EPSILON;
    if range.contains(&t) && range.contains(&u) {
        SegmentHit::Point(p1 + r * t.clamp(0.0, 1.0))
    } else {
        SegmentHit::None
    }
}

fn point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a) <= COORDINATE_TOLERANCE;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t) <= 1e-3
}

/// Find all intersections between the segment `start`-`end` and a polyline
///
/// Collinear stretches contribute their two end points. The result is
/// rounded to the coordinate precision and sorted on x; no intersection
/// gives an empty list.
pub fn line_polyline_intersections(start: Point, end: Point, polyline: &[Point]) -> Vec<Point> {
    let (p1, p2) = (start.as_dvec2(), end.as_dvec2());
    let mut result = Vec::new();

    for w in polyline.windows(2) {
        match intersect_segments(p1, p2, w[0].as_dvec2(), w[1].as_dvec2()) {
            SegmentHit::None => {}
            SegmentHit::Point(p) => result.push(Point::from(p).rounded()),
            SegmentHit::Overlap(a, b) => {
                result.push(Point::from(a).rounded());
                result.push(Point::from(b).rounded());
            }
        }
    }

    sort_and_dedup(&mut result);
    result
}

/// Find the crossings between two polylines
///
/// Points where the lines run on top of each other are not crossings and are
/// left out. A point that is a vertex of `line1` is only reported if it is
/// also a vertex of `line2`, so shared end points are not mistaken for
/// crossings. As a consequence a polyline intersected with itself gives no
/// points at all. Results are rounded and sorted on x.
pub fn polyline_polyline_intersections(line1: &[Point], line2: &[Point]) -> Vec<Point> {
    let mut hits = Vec::new();
    let mut overlaps = Vec::new();

    for a in line1.windows(2) {
        for b in line2.windows(2) {
            match intersect_segments(
                a[0].as_dvec2(),
                a[1].as_dvec2(),
                b[0].as_dvec2(),
                b[1].as_dvec2(),
            ) {
                SegmentHit::None => {}
                SegmentHit::Point(p) => hits.push(p),
                SegmentHit::Overlap(s, e) => overlaps.push((s, e)),
            }
        }
    }

    let vertices1: Vec<Point> = line1.iter().map(|p| p.rounded()).collect();
    let vertices2: Vec<Point> = line2.iter().map(|p| p.rounded()).collect();
    let is_vertex = |vertices: &[Point], p: &Point| vertices.iter().any(|v| v.approx_eq(p));

    let mut result: Vec<Point> = hits
        .into_iter()
        .filter(|p| !overlaps.iter().any(|(s, e)| point_on_segment(*p, *s, *e)))
        .map(|p| Point::from(p).rounded())
        .filter(|p| !is_vertex(&vertices1, p) || is_vertex(&vertices2, p))
        .collect();

    sort_and_dedup(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 5.0),
            Point::new(25.0, 5.0),
            Point::new(35.0, 0.0),
            Point::new(50.0, 0.0),
        ]
    }

    #[test]
    fn test_line_polyline_two_crossings() {
        let result =
            line_polyline_intersections(Point::new(0.0, 2.5), Point::new(50.0, 2.5), &surface());
        assert_eq!(result, vec![Point::new(15.0, 2.5), Point::new(30.0, 2.5)]);
    }

    #[test]
    fn test_line_polyline_no_crossing() {
        let result =
            line_polyline_intersections(Point::new(0.0, 8.0), Point::new(50.0, 8.0), &surface());
        assert!(result.is_empty());
    }

    #[test]
    fn test_line_polyline_overlap_gives_end_points() {
        let result =
            line_polyline_intersections(Point::new(0.0, 5.0), Point::new(50.0, 5.0), &surface());
        assert_eq!(result, vec![Point::new(20.0, 5.0), Point::new(25.0, 5.0)]);
    }

    #[test]
    fn test_line_polyline_rounding() {
        let line = vec![Point::new(0.0, 0.0), Point::new(3.0, 1.0)];
        let result = line_polyline_intersections(Point::new(1.0, -1.0), Point::new(1.0, 1.0), &line);
        assert_eq!(result, vec![Point::new(1.0, 0.333)]);
    }

    #[test]
    fn test_polyline_polyline_sorted_on_x() {
        let line = vec![Point::new(50.0, 1.0), Point::new(0.0, 1.0)];
        let result = polyline_polyline_intersections(&line, &surface());
        assert_eq!(result, vec![Point::new(12.0, 1.0), Point::new(33.0, 1.0)]);
    }

    #[test]
    fn test_polyline_with_itself_is_empty() {
        let s = surface();
        assert!(polyline_polyline_intersections(&s, &s).is_empty());

        let single = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(polyline_polyline_intersections(&single, &single).is_empty());
    }

    #[test]
    fn test_shared_end_point_is_excluded() {
        // line1 ends on the surface in a point that is not a surface vertex
        let line1 = vec![Point::new(15.0, 6.0), Point::new(15.0, 2.5)];
        assert!(polyline_polyline_intersections(&line1, &surface()).is_empty());

        // but a shared end point that is also a vertex of line2 is kept
        let line1 = vec![Point::new(10.0, 3.0), Point::new(10.0, 0.0)];
        assert_eq!(
            polyline_polyline_intersections(&line1, &surface()),
            vec![Point::new(10.0, 0.0)]
        );
    }

    #[test]
    fn test_polyline_polyline_disjoint() {
        let line = vec![Point::new(0.0, 10.0), Point::new(50.0, 10.0)];
        assert!(polyline_polyline_intersections(&line, &surface()).is_empty());
    }
}

//! Berm builder
//!
//! A berm is a wedge of fill material placed against the land side slope.
//! The top of the berm follows the top slope from where it meets the levee
//! down to its top right corner, from there the bottom slope runs down to
//! the surface. An irregular surface can be crossed more than once, which
//! gives one fill polygon per pair of crossings.

use glam::DVec2;
use lv_core::constants::MIN_POLYGON_AREA;
use lv_core::geometry::{
    interpolate_z, polygon_area, remove_consecutive_duplicates, sort_and_dedup,
};
use lv_core::{CharacteristicPointType, CrossSection, Point, SoilPolygon};
use serde::{Deserialize, Serialize};

use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult, check_soilcode};
use crate::config::BermConfig;

const OPERATION: &str = "Berm";

/// Where the top right corner of the berm goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BermTarget {
    /// Height above the toe and width of the berm top
    Size { width: f64, height: f64 },
    /// Fixed top right corner
    TopRight(Point),
}

/// Builds a berm against the land side of the levee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Berm {
    pub soilcode: String,
    /// Horizontal distance per unit height of the berm top
    pub slope_top: f64,
    /// Horizontal distance per unit height of the berm side
    pub slope_bottom: f64,
    pub target: BermTarget,
    /// The berm is anchored at this point
    pub toe: CharacteristicPointType,
}

/// The fill polygons and corners of a berm
#[derive(Debug, Clone, PartialEq)]
pub struct BermResult {
    pub polygons: Vec<SoilPolygon>,
    /// Where the berm top meets the surface
    pub top_left: Point,
    pub top_right: Point,
    /// Where the berm side meets the surface
    pub bottom_right: Point,
}

impl BermResult {
    /// Total area of the fill
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(SoilPolygon::area).sum()
    }
}

/// Point at x on the line through `from` that drops 1 per `slope` to the right
fn along_slope(from: DVec2, x: f64, slope: f64) -> DVec2 {
    DVec2::new(x, from.y - (x - from.x) / slope)
}

/// Move a rounded crossing vertically onto the nearest surface segment
fn snap_to_surface(surface: &[Point], point: Point) -> Point {
    surface
        .windows(2)
        .filter(|w| w[0].x.min(w[1].x) <= point.x && point.x <= w[0].x.max(w[1].x))
        .map(|w| {
            if (w[1].x - w[0].x).abs() > f64::EPSILON {
                Point::new(point.x, interpolate_z(w[0], w[1], point.x))
            } else {
                let (low, high) = (w[0].z.min(w[1].z), w[0].z.max(w[1].z));
                Point::new(point.x, point.z.clamp(low, high))
            }
        })
        .min_by(|p, q| (p.z - point.z).abs().total_cmp(&(q.z - point.z).abs()))
        .unwrap_or(point)
}

impl Berm {
    pub fn new(soilcode: impl Into<String>, target: BermTarget) -> Self {
        Self::with_config(soilcode, target, &BermConfig::default())
    }

    /// Create a berm with the slopes from the configuration
    pub fn with_config(soilcode: impl Into<String>, target: BermTarget, config: &BermConfig) -> Self {
        Self {
            soilcode: soilcode.into(),
            slope_top: config.slope_top,
            slope_bottom: config.slope_bottom,
            target,
            toe: CharacteristicPointType::EmbankmentToeLandSide,
        }
    }

    pub fn with_slopes(mut self, slope_top: f64, slope_bottom: f64) -> Self {
        self.slope_top = slope_top;
        self.slope_bottom = slope_bottom;
        self
    }

    pub fn with_toe(mut self, toe: CharacteristicPointType) -> Self {
        self.toe = toe;
        self
    }

    /// Build the berm and add it to a copy of the cross-section
    pub fn apply(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        let result = self.execute(crosssection)?;
        Ok(crosssection.with_layers_added(result.polygons)?)
    }

    /// The polygons between the berm outline and the surface
    fn fill_polygons(
        &self,
        crosssection: &CrossSection,
        outline: [Point; 3],
    ) -> AlgorithmResult<Vec<SoilPolygon>> {
        let [top_left, top_right, bottom_right] = outline;

        let mut hits = crosssection.surface_intersections(&outline);
        for corner in [top_left, bottom_right] {
            let corner = corner.rounded();
            if !hits.iter().any(|h| h.approx_eq(&corner)) {
                hits.push(corner);
            }
        }
        sort_and_dedup(&mut hits);
        let hits: Vec<Point> = hits
            .into_iter()
            .map(|p| snap_to_surface(crosssection.surface(), p))
            .collect();

        if hits.len() % 2 != 0 {
            return Err(AlgorithmError::infeasible(
                OPERATION,
                format!(
                    "the berm crosses the surface {} times, the berm cannot be closed",
                    hits.len()
                ),
            ));
        }

        let mut polygons = Vec::with_capacity(hits.len() / 2);
        for pair in hits.chunks_exact(2) {
            let (a, b) = (pair[0], pair[1]);
            let mut points = vec![a];
            if top_right.x > a.x && top_right.x < b.x {
                points.push(top_right);
            }
            points.push(b);
            points.extend(crosssection.surface_points_between(a.x, b.x).into_iter().rev());
            remove_consecutive_duplicates(&mut points);

            if points.len() < 3 || polygon_area(&points) <= MIN_POLYGON_AREA {
                tracing::warn!("Skipping empty berm polygon between x={} and x={}", a.x, b.x);
                continue;
            }
            polygons.push(SoilPolygon::new(points, self.soilcode.clone()));
        }
        Ok(polygons)
    }
}

impl Algorithm for Berm {
    type Output = BermResult;

    fn name(&self) -> &str {
        "Berm"
    }

    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()> {
        check_soilcode(crosssection, &self.soilcode)?;

        if !(self.slope_top > 0.0 && self.slope_bottom > 0.0) {
            return Err(AlgorithmError::InvalidParameter(format!(
                "berm slopes must be positive, got {} and {}",
                self.slope_top, self.slope_bottom
            )));
        }

        let xt = crosssection.characteristic_points().require(self.toe)?;
        if xt < crosssection.left() || xt > crosssection.right() {
            return Err(AlgorithmError::InvalidParameter(format!(
                "{} at x={xt} lies outside the cross-section",
                self.toe
            )));
        }

        match self.target {
            BermTarget::Size { width, height } => {
                if !(width > 0.0) || !(height >= 0.0) {
                    return Err(AlgorithmError::InvalidParameter(format!(
                        "berm width must be positive and height not negative, got {width} and {height}"
                    )));
                }
            }
            BermTarget::TopRight(point) => {
                if !(point.x > xt && point.x < crosssection.right()) {
                    return Err(AlgorithmError::InvalidParameter(format!(
                        "berm top right corner at x={} must lie between {} and the right side",
                        point.x, self.toe
                    )));
                }
            }
        }
        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<BermResult> {
        let (left, right) = (crosssection.left(), crosssection.right());
        let xt = crosssection.characteristic_points().require(self.toe)?;
        let toe = DVec2::new(xt, crosssection.z_at(xt)?);

        let anchor = match self.target {
            BermTarget::Size { height, .. } => toe + DVec2::new(0.0, height),
            BermTarget::TopRight(point) => along_slope(point.as_dvec2(), xt, self.slope_top),
        };

        // top of the berm over the full width
        let top_line = [
            Point::from(along_slope(anchor, left, self.slope_top)),
            Point::from(along_slope(anchor, right, self.slope_top)),
        ];
        let top_left = crosssection
            .surface_intersections(&top_line)
            .into_iter()
            .rfind(|p| p.x < toe.x)
            .ok_or_else(|| {
                AlgorithmError::infeasible(
                    OPERATION,
                    format!("the berm top does not meet the surface left of x={xt}"),
                )
            })?;

        let top_right = match self.target {
            BermTarget::Size { width, .. } => Point::from(along_slope(
                top_left.as_dvec2(),
                top_left.x + width,
                self.slope_top,
            )),
            BermTarget::TopRight(point) => point,
        };

        let side = [
            top_right,
            Point::from(along_slope(top_right.as_dvec2(), right, self.slope_bottom)),
        ];
        let bottom_right = crosssection
            .surface_intersections(&side)
            .first()
            .copied()
            .ok_or_else(|| {
                AlgorithmError::infeasible(
                    OPERATION,
                    "the berm side does not meet the surface".to_string(),
                )
            })?;

        tracing::debug!(
            "Berm corners {:?}, {:?}, {:?}",
            top_left,
            top_right,
            bottom_right
        );

        let polygons = self.fill_polygons(crosssection, [top_left, top_right, bottom_right])?;
        tracing::info!("Created berm with {} polygon(s)", polygons.len());

        Ok(BermResult {
            polygons,
            top_left,
            top_right,
            bottom_right,
        })
    }
}

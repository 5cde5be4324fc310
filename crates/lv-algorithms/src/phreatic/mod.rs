//! Phreatic line builder
//!
//! Builds the phreatic line through a levee from the river level and the
//! polder level. The line runs through a fixed sequence of points:
//!
//! - A: where the river level meets the outer slope
//! - B: below the embankment top on the water side
//! - C: below the embankment top on the land side
//! - D: below the shoulder, or halfway between C and E
//! - E: below the embankment toe on the land side
//! - F: where the line reaches the polder level
//!
//! Which formulas are used for B, C and E depends on the material layout of
//! the levee. Between A and E the line is kept below the surface.

mod formulas;
mod series;

pub use series::{PhreaticLineSeries, SeriesEntry, SeriesResult, SkippedLevel};

use lv_core::constants::{COORDINATE_TOLERANCE, MIN_DX};
use lv_core::geometry::{interpolate_z, line_polyline_intersections, polyline_z_at};
use lv_core::{CharacteristicPointType, CrossSection, MaterialLayoutRegime, Point};
use serde::{Deserialize, Serialize};

use self::formulas::{FormulaSet, Levels};
use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult, check_soilcode};
use crate::config::PhreaticLineConfig;

const OPERATION: &str = "Phreatic line";

/// Label of the head line in the aquifer
pub const AQUIFER_HEAD_LINE_LABEL: &str = "Head line aquifer";

/// Label of the line the aquifer head line applies to
pub const AQUIFER_REFERENCE_LINE_LABEL: &str = "Reference line aquifer";

/// Input for the head lines in a sand aquifer below the levee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AquiferInput {
    /// Hydraulic head in the aquifer on the land side
    pub hydraulic_head: f64,
    /// Soil code of the aquifer layer
    pub soilcode: String,
}

/// Builds a phreatic line for a cross-section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhreaticLine {
    pub river_level: f64,
    pub polder_level: f64,
    /// Material layout, taken from the cross-section if not set
    pub regime: Option<MaterialLayoutRegime>,
    pub config: PhreaticLineConfig,
    pub aquifer: Option<AquiferInput>,
}

/// The points that define the phreatic line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub d: Point,
    pub e: Point,
    pub f: Point,
}

/// Head lines in the aquifer
#[derive(Debug, Clone, PartialEq)]
pub struct AquiferLines {
    pub head_line: Vec<Point>,
    pub reference_line: Vec<Point>,
}

/// Output of the phreatic line builder
#[derive(Debug, Clone, PartialEq)]
pub struct PhreaticLineResult {
    pub regime: MaterialLayoutRegime,
    /// The phreatic line from left to right
    pub points: Vec<Point>,
    pub landmarks: Landmarks,
    pub aquifer: Option<AquiferLines>,
}

impl PhreaticLineResult {
    /// Copy of the cross-section with the lines of this result
    pub fn apply_to(&self, crosssection: &CrossSection) -> CrossSection {
        let mut result = crosssection.with_phreatic_line(self.points.clone());
        if let Some(aquifer) = &self.aquifer {
            result = result
                .with_head_line(AQUIFER_HEAD_LINE_LABEL, aquifer.head_line.clone())
                .with_head_line(AQUIFER_REFERENCE_LINE_LABEL, aquifer.reference_line.clone());
        }
        result
    }
}

impl PhreaticLine {
    /// Create a builder with the default offsets
    pub fn new(river_level: f64, polder_level: f64) -> Self {
        Self {
            river_level,
            polder_level,
            regime: None,
            config: PhreaticLineConfig::default(),
            aquifer: None,
        }
    }

    pub fn with_regime(mut self, regime: MaterialLayoutRegime) -> Self {
        self.regime = Some(regime);
        self
    }

    pub fn with_config(mut self, config: PhreaticLineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_aquifer(mut self, hydraulic_head: f64, soilcode: impl Into<String>) -> Self {
        self.aquifer = Some(AquiferInput {
            hydraulic_head,
            soilcode: soilcode.into(),
        });
        self
    }

    /// Build the line and add it to a copy of the cross-section
    pub fn apply(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        Ok(self.execute(crosssection)?.apply_to(crosssection))
    }

    fn regime(&self, crosssection: &CrossSection) -> AlgorithmResult<MaterialLayoutRegime> {
        self.regime
            .or(crosssection.material_layout())
            .ok_or(AlgorithmError::MissingMaterialLayout)
    }

    /// Points A to F
    fn landmarks(
        &self,
        crosssection: &CrossSection,
        regime: MaterialLayoutRegime,
    ) -> AlgorithmResult<Landmarks> {
        let points = crosssection.characteristic_points();
        let x_top_water = points.require(CharacteristicPointType::EmbankmentTopWaterSide)?;
        let x_top_land = points.require(CharacteristicPointType::EmbankmentTopLandSide)?;
        let x_toe = points.require(CharacteristicPointType::EmbankmentToeLandSide)?;
        let polder = self.polder_level;

        let river_line = [
            Point::new(crosssection.left(), self.river_level),
            Point::new(crosssection.right(), self.river_level),
        ];
        let a = crosssection
            .surface_intersections(&river_line)
            .first()
            .copied()
            .ok_or_else(|| {
                AlgorithmError::infeasible(
                    OPERATION,
                    format!("the river level {} does not intersect the surface", self.river_level),
                )
            })?;

        let levels = Levels {
            river: self.river_level,
            surface_at_toe: crosssection.z_at(x_toe)?,
            config: &self.config,
        };
        let formulas = FormulaSet::for_regime(regime);

        let mut e = Point::new(x_toe, (formulas.e_level)(&levels));
        if e.z < polder {
            tracing::debug!("Point E raised from {:.3} to the polder level {}", e.z, polder);
            e.z = polder;
        }

        let bx = if x_top_water > a.x {
            x_top_water
        } else {
            (a.x + x_top_land) / 2.0
        };
        let b = Point::new(bx, (formulas.b_level)(&levels, a, e, bx));
        let c = Point::new(x_top_land, (formulas.c_level)(&levels, a, b, e, x_top_land));
        if c.z < polder {
            return Err(AlgorithmError::infeasible(
                OPERATION,
                format!("point C at {:.3} lies below the polder level {}", c.z, polder),
            ));
        }

        let dx = points
            .get(CharacteristicPointType::ShoulderBaseLandSide)
            .x()
            .filter(|x| *x > c.x && *x < e.x)
            .unwrap_or((c.x + e.x) / 2.0);
        let dz = match self.config.d_offset {
            Some(offset) => crosssection.z_at(dx)? - offset,
            None => interpolate_z(c, e, dx),
        };
        let d = Point::new(dx, dz.clamp(polder, c.z));
        if d.z != dz {
            tracing::debug!("Point D clamped from {:.3} to {:.3}", dz, d.z);
        }

        // E may not be above D
        if e.z > d.z {
            tracing::debug!("Point E lowered from {:.3} to {:.3}", e.z, d.z);
            e.z = d.z;
        }

        let f = self.point_f(crosssection, d, e)?;

        let landmarks = Landmarks { a, b, c, d, e, f };
        let xs = [a.x, b.x, c.x, d.x, e.x, f.x];
        if xs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AlgorithmError::infeasible(
                OPERATION,
                format!("points A to F are not ordered from left to right: {landmarks:?}"),
            ));
        }
        Ok(landmarks)
    }

    /// Point F on the polder level, at the ditch if there is one
    fn point_f(&self, crosssection: &CrossSection, d: Point, e: Point) -> AlgorithmResult<Point> {
        let polder = self.polder_level;
        let right = crosssection.right();

        if let Some(ditch) = crosssection.ditch_points()? {
            let hits = line_polyline_intersections(
                Point::new(e.x, polder),
                Point::new(right, polder),
                &ditch,
            );
            if let Some(hit) = hits.into_iter().find(|p| p.x > e.x) {
                return Ok(hit);
            }
        }

        // extend the line from D through E down to the polder level
        let mut fx = if d.z > e.z && e.z > polder {
            e.x + (e.z - polder) * (e.x - d.x) / (d.z - e.z)
        } else if e.z > polder {
            right
        } else {
            e.x + MIN_DX
        };
        if fx <= e.x {
            fx = e.x + MIN_DX;
        }
        if fx > right - MIN_DX {
            fx = right - MIN_DX;
        }
        Ok(Point::new(fx, polder))
    }

    /// The full line with the part between A and E kept below the surface
    fn assemble(&self, crosssection: &CrossSection, landmarks: &Landmarks) -> Vec<Point> {
        let Landmarks { a, b, c, d, e, f } = *landmarks;
        let (left, right) = (crosssection.left(), crosssection.right());

        let mut base = Vec::with_capacity(8);
        if a.x > left {
            base.push(Point::new(left, self.river_level));
        }
        base.extend([a, b, c, d, e, f]);
        if f.x < right {
            base.push(Point::new(right, self.polder_level));
        }

        let between_a_and_e =
            |x: f64| x > a.x + COORDINATE_TOLERANCE && x < e.x - COORDINATE_TOLERANCE;

        let mut xs: Vec<f64> = crosssection.surface().iter().map(|p| p.x).collect();
        xs.extend(crosssection.surface_intersections(&[a, e]).iter().map(|p| p.x));
        let a_to_e: Vec<Point> = base
            .iter()
            .copied()
            .filter(|p| p.x >= a.x && p.x <= e.x)
            .collect();
        xs.extend(crosssection.surface_intersections(&a_to_e).iter().map(|p| p.x));

        let mut line = base.clone();
        for x in xs.into_iter().filter(|x| between_a_and_e(*x)) {
            if let Some(z) = polyline_z_at(&base, x) {
                line.push(Point::new(x, z));
            }
        }

        let clearance = self.config.surface_clearance;
        for p in line.iter_mut().filter(|p| between_a_and_e(p.x)) {
            if let Some(surface) = crosssection.surface_levels_at(p.x).last() {
                let limit = surface - clearance;
                if p.z > limit {
                    p.z = limit;
                }
            }
        }

        let mut line: Vec<Point> = line.into_iter().map(Point::rounded).collect();
        line.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.z.total_cmp(&q.z)));
        // keep the lowest point on equal x
        line.dedup_by(|p, q| (p.x - q.x).abs() <= COORDINATE_TOLERANCE);
        line
    }

    /// Head line and reference line in the aquifer
    fn aquifer_lines(
        &self,
        crosssection: &CrossSection,
        input: &AquiferInput,
    ) -> AlgorithmResult<AquiferLines> {
        let x_toe = crosssection
            .characteristic_points()
            .require(CharacteristicPointType::EmbankmentToeLandSide)?;
        let (left, right) = (crosssection.left(), crosssection.right());

        let mut head_line = vec![
            Point::new(left, self.river_level),
            Point::new(x_toe, input.hydraulic_head),
            Point::new(right, input.hydraulic_head),
        ];
        head_line.dedup_by(|p, q| p.approx_eq(q));

        let mut xs: Vec<f64> = crosssection.surface().iter().map(|p| p.x).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|p, q| (*p - *q).abs() <= COORDINATE_TOLERANCE);

        let mut reference_line = Vec::with_capacity(xs.len());
        for x in xs {
            let profile = crosssection.profile_at(x)?;
            if let Some(layer) = profile.layers().iter().find(|l| l.soilcode == input.soilcode) {
                reference_line
                    .push(Point::new(x, layer.top + self.config.penetration_length).rounded());
            }
        }

        if reference_line.len() < 2 {
            return Err(AlgorithmError::infeasible(
                OPERATION,
                format!("aquifer layer '{}' not found below the surface", input.soilcode),
            ));
        }

        Ok(AquiferLines {
            head_line,
            reference_line,
        })
    }
}

impl Algorithm for PhreaticLine {
    type Output = PhreaticLineResult;

    fn name(&self) -> &str {
        "PhreaticLine"
    }

    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()> {
        if !self.river_level.is_finite() || !self.polder_level.is_finite() {
            return Err(AlgorithmError::InvalidParameter(
                "water levels must be finite".into(),
            ));
        }
        if self.river_level <= self.polder_level {
            return Err(AlgorithmError::InvalidParameter(format!(
                "river level {} must be above polder level {}",
                self.river_level, self.polder_level
            )));
        }

        let regime = self.regime(crosssection)?;

        let points = crosssection.characteristic_points();
        let x_top_water = points.require(CharacteristicPointType::EmbankmentTopWaterSide)?;
        let x_top_land = points.require(CharacteristicPointType::EmbankmentTopLandSide)?;
        let x_toe = points.require(CharacteristicPointType::EmbankmentToeLandSide)?;
        if !(x_top_water < x_top_land && x_top_land < x_toe) {
            return Err(AlgorithmError::InvalidParameter(format!(
                "embankment points must be ordered from water side to land side, got {x_top_water}, {x_top_land}, {x_toe}"
            )));
        }
        if x_top_water < crosssection.left() || x_toe > crosssection.right() {
            return Err(AlgorithmError::InvalidParameter(format!(
                "embankment toe at x={x_toe} lies outside the cross-section"
            )));
        }

        if let Some(aquifer) = &self.aquifer {
            if !regime.has_aquifer() {
                return Err(AlgorithmError::UnsupportedLayout {
                    operation: "Aquifer head line",
                    regime,
                });
            }
            check_soilcode(crosssection, &aquifer.soilcode)?;
        }

        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<PhreaticLineResult> {
        let regime = self.regime(crosssection)?;
        let landmarks = self.landmarks(crosssection, regime)?;
        tracing::debug!("Phreatic line landmarks for {}: {:?}", regime, landmarks);

        let points = self.assemble(crosssection, &landmarks);
        let aquifer = match &self.aquifer {
            Some(input) => Some(self.aquifer_lines(crosssection, input)?),
            None => None,
        };

        tracing::info!(
            "Created phreatic line with {} points for river level {} and polder level {}",
            points.len(),
            self.river_level,
            self.polder_level
        );

        Ok(PhreaticLineResult {
            regime,
            points,
            landmarks,
            aquifer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lv_core::{CharacteristicPoints, SoilCollection, SoilPolygon};

    /// Clay levee on sand, crest from 40 to 45 at level 20, toe at 65
    fn levee() -> CrossSection {
        let clay = SoilPolygon::new(
            vec![
                Point::new(0.0, 10.0),
                Point::new(20.0, 10.0),
                Point::new(40.0, 20.0),
                Point::new(45.0, 20.0),
                Point::new(65.0, 10.0),
                Point::new(80.0, 10.0),
                Point::new(80.0, 5.0),
                Point::new(0.0, 5.0),
            ],
            "clay",
        );
        let sand = SoilPolygon::new(
            vec![
                Point::new(0.0, 5.0),
                Point::new(80.0, 5.0),
                Point::new(80.0, -5.0),
                Point::new(0.0, -5.0),
            ],
            "sand",
        );
        CrossSection::new("levee", vec![clay, sand], SoilCollection::default())
            .unwrap()
            .with_characteristic_points(
                CharacteristicPoints::new()
                    .with(CharacteristicPointType::EmbankmentTopWaterSide, 40.0)
                    .with(CharacteristicPointType::EmbankmentTopLandSide, 45.0)
                    .with(CharacteristicPointType::EmbankmentToeLandSide, 65.0),
            )
    }

    #[test]
    fn test_clay_on_clay_landmarks() {
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let result = PhreaticLine::new(18.0, 8.0).execute(&cs).unwrap();
        let lm = result.landmarks;

        assert_eq!(lm.a, Point::new(36.0, 18.0));
        assert_eq!(lm.b, Point::new(40.0, 17.0));
        assert_eq!(lm.c, Point::new(45.0, 16.5));
        assert_relative_eq!(lm.d.x, 55.0);
        assert_relative_eq!(lm.d.z, 13.2, epsilon = 1e-9);
        assert_relative_eq!(lm.e.z, 9.9, epsilon = 1e-9);
        assert_relative_eq!(lm.f.z, 8.0);
        assert!(lm.f.x > lm.e.x && lm.f.x < 80.0);

        assert_eq!(result.points.first(), Some(&Point::new(0.0, 18.0)));
        assert_eq!(result.points.last(), Some(&Point::new(80.0, 8.0)));
    }

    fn with_d_offset(offset: f64) -> PhreaticLine {
        PhreaticLine::new(18.0, 8.0).with_config(PhreaticLineConfig {
            d_offset: Some(offset),
            ..PhreaticLineConfig::default()
        })
    }

    #[test]
    fn test_d_clamped_to_c() {
        // the surface at D (x=55) is 15, an offset of -3 asks for 18
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let lm = with_d_offset(-3.0).execute(&cs).unwrap().landmarks;

        assert_relative_eq!(lm.d.x, 55.0);
        assert_relative_eq!(lm.d.z, lm.c.z);
        assert_relative_eq!(lm.e.z, 9.9, epsilon = 1e-9);
        assert!(lm.e.z <= lm.d.z);
        assert!(lm.f.x > lm.e.x);
    }

    #[test]
    fn test_d_clamped_to_polder_level() {
        // an offset of 12 puts D at 3, below the polder level of 8
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let lm = with_d_offset(12.0).execute(&cs).unwrap().landmarks;

        assert_relative_eq!(lm.d.z, 8.0);
        assert!(lm.d.z <= lm.c.z);
        // E follows D down to the polder level
        assert_relative_eq!(lm.e.z, 8.0);
        assert_relative_eq!(lm.f.z, 8.0);
        assert!(lm.f.x > lm.e.x && lm.f.x < 80.0);
    }

    #[test]
    fn test_e_raised_to_polder_level() {
        // E would be 9.9, the polder level is 12
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let lm = PhreaticLine::new(18.0, 12.0).execute(&cs).unwrap().landmarks;

        assert_relative_eq!(lm.e.z, 12.0);
        assert!(lm.d.z >= 12.0 && lm.d.z <= lm.c.z);
        assert!(lm.e.z <= lm.d.z);
        assert_relative_eq!(lm.f.z, 12.0);
        assert!(lm.f.x > lm.e.x);
    }

    #[test]
    fn test_missing_layout() {
        let err = PhreaticLine::new(18.0, 8.0).execute(&levee()).unwrap_err();
        assert!(matches!(err, AlgorithmError::MissingMaterialLayout));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_missing_characteristic_point() {
        let mut points = levee().characteristic_points().clone();
        points.unset(CharacteristicPointType::EmbankmentTopWaterSide);
        let cs = levee()
            .with_characteristic_points(points)
            .with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let err = PhreaticLine::new(18.0, 8.0).execute(&cs).unwrap_err();
        assert!(matches!(err, AlgorithmError::MissingCharacteristicPoint(_)));
    }

    #[test]
    fn test_river_level_above_levee() {
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let err = PhreaticLine::new(25.0, 8.0).execute(&cs).unwrap_err();
        assert!(matches!(err, AlgorithmError::Infeasible { .. }));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_f_at_ditch() {
        let points = levee()
            .characteristic_points()
            .clone()
            .with(CharacteristicPointType::DitchEmbankmentSide, 68.0)
            .with(CharacteristicPointType::DitchBottomEmbankmentSide, 70.0)
            .with(CharacteristicPointType::DitchBottomLandSide, 72.0)
            .with(CharacteristicPointType::DitchLandSide, 74.0);
        let cs = levee()
            .with_characteristic_points(points)
            .with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);

        // the ditch points lie on the flat surface at level 10, a polder level
        // of 10 crosses the ditch polyline at its first point
        let result = PhreaticLine::new(18.0, 10.0).execute(&cs).unwrap();
        assert_eq!(result.landmarks.f, Point::new(68.0, 10.0));
    }

    #[test]
    fn test_aquifer_requires_aquifer_layout() {
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay);
        let err = PhreaticLine::new(18.0, 8.0)
            .with_aquifer(12.0, "sand")
            .execute(&cs)
            .unwrap_err();
        assert!(matches!(err, AlgorithmError::UnsupportedLayout { .. }));
    }

    #[test]
    fn test_aquifer_lines() {
        let cs = levee().with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnSand);
        let result = PhreaticLine::new(18.0, 8.0)
            .with_aquifer(12.0, "sand")
            .execute(&cs)
            .unwrap();
        let aquifer = result.aquifer.clone().unwrap();
        assert_eq!(
            aquifer.head_line,
            vec![
                Point::new(0.0, 18.0),
                Point::new(65.0, 12.0),
                Point::new(80.0, 12.0)
            ]
        );
        assert!(aquifer.reference_line.iter().all(|p| p.z == 6.0));

        let updated = result.apply_to(&cs);
        assert_eq!(updated.head_lines().len(), 3);
        assert!(updated.phreatic_line().is_some());
    }

    #[test]
    fn test_apply_replaces_phreatic_line() {
        let cs = levee().with_material_layout(MaterialLayoutRegime::SandEmbankmentOnSand);
        let first = PhreaticLine::new(18.0, 8.0).apply(&cs).unwrap();
        let second = PhreaticLine::new(17.0, 8.0).apply(&first).unwrap();
        assert_eq!(second.head_lines().len(), 1);
        assert_eq!(
            second.phreatic_line().unwrap().id,
            first.phreatic_line().unwrap().id
        );
        assert_eq!(second.phreatic_line().unwrap().points[0].z, 17.0);
    }
}

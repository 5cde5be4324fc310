//! Phreatic lines for a range of river levels

use lv_core::CrossSection;
use lv_core::constants::COORDINATE_DECIMALS;
use lv_core::geometry::round_to;

use super::{PhreaticLine, PhreaticLineResult};
use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult};

/// A phreatic line for one river level
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub river_level: f64,
    pub result: PhreaticLineResult,
}

/// A river level without a phreatic line
#[derive(Debug, Clone)]
pub struct SkippedLevel {
    pub river_level: f64,
    pub error: AlgorithmError,
}

/// The phreatic lines that could be built and the levels that failed
#[derive(Debug, Clone)]
pub struct SeriesResult {
    pub entries: Vec<SeriesEntry>,
    pub skipped: Vec<SkippedLevel>,
}

/// Builds a phreatic line for every river level from `min_level` up to and
/// including `max_level`
///
/// A level that fails is logged and skipped. The series only fails when no
/// level gives a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PhreaticLineSeries {
    /// Polder level, offsets, layout and aquifer of every line
    pub template: PhreaticLine,
    pub min_level: f64,
    pub max_level: f64,
    pub step: f64,
}

impl PhreaticLineSeries {
    pub fn new(template: PhreaticLine, min_level: f64, max_level: f64, step: f64) -> Self {
        Self {
            template,
            min_level,
            max_level,
            step,
        }
    }

    /// River levels of the series
    pub fn levels(&self) -> Vec<f64> {
        if !(self.step > 0.0) || self.min_level > self.max_level {
            return Vec::new();
        }
        let count = ((self.max_level - self.min_level) / self.step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| round_to(self.min_level + i as f64 * self.step, COORDINATE_DECIMALS))
            .collect()
    }

    fn builder(&self, river_level: f64) -> PhreaticLine {
        PhreaticLine {
            river_level,
            ..self.template.clone()
        }
    }
}

impl Algorithm for PhreaticLineSeries {
    type Output = SeriesResult;

    fn name(&self) -> &str {
        "PhreaticLineSeries"
    }

    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()> {
        if !(self.step > 0.0) {
            return Err(AlgorithmError::InvalidParameter(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if !(self.min_level <= self.max_level) {
            return Err(AlgorithmError::InvalidParameter(format!(
                "minimum river level {} is above maximum river level {}",
                self.min_level, self.max_level
            )));
        }
        self.builder(self.min_level).check_input(crosssection)
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<SeriesResult> {
        let levels = self.levels();
        let mut entries = Vec::with_capacity(levels.len());
        let mut skipped = Vec::new();
        for river_level in levels {
            match self.builder(river_level).run(crosssection) {
                Ok(result) => entries.push(SeriesEntry {
                    river_level,
                    result,
                }),
                Err(error) => {
                    tracing::warn!("No phreatic line for river level {}: {}", river_level, error);
                    skipped.push(SkippedLevel { river_level, error });
                }
            }
        }

        if entries.is_empty() {
            return Err(AlgorithmError::infeasible(
                "Phreatic line series",
                format!(
                    "no phreatic line for any river level from {} to {}",
                    self.min_level, self.max_level
                ),
            ));
        }
        tracing::info!(
            "Created {} phreatic lines, skipped {} river levels",
            entries.len(),
            skipped.len()
        );
        Ok(SeriesResult { entries, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_core::{
        CharacteristicPointType, CharacteristicPoints, MaterialLayoutRegime, Point,
        SoilCollection, SoilPolygon,
    };

    fn levee() -> CrossSection {
        let clay = SoilPolygon::new(
            vec![
                Point::new(0.0, 10.0),
                Point::new(20.0, 10.0),
                Point::new(40.0, 20.0),
                Point::new(45.0, 20.0),
                Point::new(65.0, 10.0),
                Point::new(80.0, 10.0),
                Point::new(80.0, 0.0),
                Point::new(0.0, 0.0),
            ],
            "clay",
        );
        CrossSection::new("levee", vec![clay], SoilCollection::default())
            .unwrap()
            .with_characteristic_points(
                CharacteristicPoints::new()
                    .with(CharacteristicPointType::EmbankmentTopWaterSide, 40.0)
                    .with(CharacteristicPointType::EmbankmentTopLandSide, 45.0)
                    .with(CharacteristicPointType::EmbankmentToeLandSide, 65.0),
            )
            .with_material_layout(MaterialLayoutRegime::ClayEmbankmentOnClay)
    }

    #[test]
    fn test_levels_include_max() {
        let series = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 15.0, 16.0, 0.25);
        assert_eq!(series.levels(), vec![15.0, 15.25, 15.5, 15.75, 16.0]);

        let series = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 15.0, 16.0, 0.3);
        assert_eq!(series.levels(), vec![15.0, 15.3, 15.6, 15.9]);
    }

    #[test]
    fn test_series() {
        let series = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 15.0, 18.0, 1.0);
        let result = series.execute(&levee()).unwrap();
        assert_eq!(result.entries.len(), 4);
        assert!(result.skipped.is_empty());
        for entry in &result.entries {
            assert_eq!(entry.result.landmarks.a.z, entry.river_level);
            assert_eq!(entry.result.points[0].z, entry.river_level);
        }
    }

    #[test]
    fn test_levels_above_crest_are_skipped() {
        // the river levels 20.5 and 21.5 lie above the crest at 20
        let series = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 16.5, 21.5, 1.0);
        let result = series.execute(&levee()).unwrap();

        let built: Vec<f64> = result.entries.iter().map(|e| e.river_level).collect();
        assert_eq!(built, vec![16.5, 17.5, 18.5, 19.5]);
        let skipped: Vec<f64> = result.skipped.iter().map(|s| s.river_level).collect();
        assert_eq!(skipped, vec![20.5, 21.5]);
        assert!(
            result
                .skipped
                .iter()
                .all(|s| matches!(s.error, AlgorithmError::Infeasible { .. }))
        );
    }

    #[test]
    fn test_series_without_any_line_fails() {
        let series = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 21.0, 23.0, 1.0);
        let err = series.execute(&levee()).unwrap_err();
        assert!(matches!(err, AlgorithmError::Infeasible { .. }));
    }

    #[test]
    fn test_invalid_series() {
        let cs = levee();
        let zero_step = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 15.0, 18.0, 0.0);
        assert!(matches!(
            zero_step.execute(&cs),
            Err(AlgorithmError::InvalidParameter(_))
        ));
        let reversed = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 18.0, 15.0, 1.0);
        assert!(matches!(
            reversed.execute(&cs),
            Err(AlgorithmError::InvalidParameter(_))
        ));
        let below_polder = PhreaticLineSeries::new(PhreaticLine::new(0.0, 8.0), 7.0, 18.0, 1.0);
        assert!(matches!(
            below_polder.execute(&cs),
            Err(AlgorithmError::InvalidParameter(_))
        ));
    }
}

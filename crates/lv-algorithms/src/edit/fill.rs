use lv_core::soil::subtract_region;
use lv_core::{CrossSection, Point, SoilPolygon};
use serde::{Deserialize, Serialize};

use super::check_line;
use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult, check_soilcode};
use crate::config::FillConfig;

/// Fill the space between the surface and a line with one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Top of the fill
    pub line: Vec<Point>,
    pub soilcode: String,
    /// Fill polygons with a smaller area are dropped
    pub min_area: f64,
}

impl Fill {
    pub fn new(line: Vec<Point>, soilcode: impl Into<String>) -> Self {
        Self::with_config(line, soilcode, &FillConfig::default())
    }

    pub fn with_config(line: Vec<Point>, soilcode: impl Into<String>, config: &FillConfig) -> Self {
        Self {
            line,
            soilcode: soilcode.into(),
            min_area: config.min_area,
        }
    }

    /// The fill polygons without changing the cross-section
    pub fn polygons(&self, crosssection: &CrossSection) -> Vec<SoilPolygon> {
        let (Some(first), Some(last)) = (self.line.first(), self.line.last()) else {
            return Vec::new();
        };
        let bottom = crosssection.bottom();

        let mut region = self.line.clone();
        region.push(Point::new(last.x, bottom));
        region.push(Point::new(first.x, bottom));

        let below_line = SoilPolygon::new(region, self.soilcode.clone());
        subtract_region(&[below_line], crosssection.boundary())
            .into_iter()
            .filter(|p| p.area() > self.min_area)
            .map(|p| SoilPolygon::new(p.points, self.soilcode.clone()))
            .collect()
    }
}

impl Algorithm for Fill {
    type Output = CrossSection;

    fn name(&self) -> &str {
        "Fill"
    }

    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()> {
        check_soilcode(crosssection, &self.soilcode)?;
        check_line(&self.line)?;
        let (first, last) = (self.line[0].x, self.line[self.line.len() - 1].x);
        if first < crosssection.left() || last > crosssection.right() {
            return Err(AlgorithmError::InvalidParameter(format!(
                "fill line from x={first} to x={last} exceeds the cross-section"
            )));
        }
        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        let polygons = self.polygons(crosssection);
        if polygons.is_empty() {
            tracing::info!("Fill line lies below the surface, nothing to fill");
            return Ok(crosssection.clone());
        }
        tracing::info!("Adding {} fill polygon(s) of '{}'", polygons.len(), self.soilcode);
        Ok(crosssection.with_layers_added(polygons)?)
    }
}

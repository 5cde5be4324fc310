use lv_core::soil::subtract_region;
use lv_core::{CrossSection, Point};
use serde::{Deserialize, Serialize};

use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult};

/// Remove a band of soil that follows the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excavation {
    /// Center of the excavation
    pub x: f64,
    pub depth: f64,
    pub width: f64,
}

impl Excavation {
    pub fn new(x: f64) -> Self {
        Self {
            x,
            depth: 1.0,
            width: 5.0,
        }
    }

    pub fn with_size(mut self, width: f64, depth: f64) -> Self {
        self.width = width;
        self.depth = depth;
        self
    }

    fn extent(&self) -> (f64, f64) {
        (self.x - self.width / 2.0, self.x + self.width / 2.0)
    }

    /// Region above the bottom of the excavation
    fn region(&self, crosssection: &CrossSection) -> AlgorithmResult<Vec<Point>> {
        let (x1, x2) = self.extent();
        let z1 = crosssection.z_at(x1)?;
        let z2 = crosssection.z_at(x2)?;
        let top = crosssection.top() + 1.0;

        let mut region = vec![
            Point::new(x1, top),
            Point::new(x2, top),
            Point::new(x2, z2 - self.depth),
        ];
        region.extend(
            crosssection
                .surface_points_between(x1, x2)
                .into_iter()
                .rev()
                .map(|p| p.offset_z(-self.depth)),
        );
        region.push(Point::new(x1, z1 - self.depth));
        Ok(region)
    }
}

impl Algorithm for Excavation {
    type Output = CrossSection;

    fn name(&self) -> &str {
        "Excavation"
    }

    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()> {
        if !(self.depth > 0.0 && self.width > 0.0) {
            return Err(AlgorithmError::InvalidParameter(format!(
                "excavation depth and width must be positive, got {} and {}",
                self.depth, self.width
            )));
        }
        let (x1, x2) = self.extent();
        if x1 < crosssection.left() || x2 > crosssection.right() {
            return Err(AlgorithmError::InvalidParameter(format!(
                "excavation from x={x1} to x={x2} exceeds the cross-section"
            )));
        }
        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        let region = self.region(crosssection)?;
        let layers = subtract_region(crosssection.layers(), &region);
        tracing::debug!("Excavation at x={} leaves {} layers", self.x, layers.len());
        Ok(crosssection.with_layers(layers)?)
    }
}

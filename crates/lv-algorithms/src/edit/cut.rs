use lv_core::soil::cut_above;
use lv_core::{CrossSection, Point};
use serde::{Deserialize, Serialize};

use super::check_line;
use crate::algorithm::{Algorithm, AlgorithmResult};

/// Remove all soil above a line
///
/// The line is extended horizontally to the sides of the cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub line: Vec<Point>,
}

impl Cut {
    pub fn new(line: Vec<Point>) -> Self {
        Self { line }
    }
}

impl Algorithm for Cut {
    type Output = CrossSection;

    fn name(&self) -> &str {
        "Cut"
    }

    fn check_input(&self, _crosssection: &CrossSection) -> AlgorithmResult<()> {
        check_line(&self.line)
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        let layers = cut_above(crosssection.layers(), &self.line)?;
        tracing::debug!(
            "Cut left {} of {} layers",
            layers.len(),
            crosssection.layers().len()
        );
        Ok(crosssection.with_layers(layers)?)
    }
}

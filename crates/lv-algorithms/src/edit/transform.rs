use lv_core::CrossSection;
use serde::{Deserialize, Serialize};

use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmResult};

/// Move the cross-section horizontally
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub dx: f64,
}

impl Algorithm for Shift {
    type Output = CrossSection;

    fn name(&self) -> &str {
        "Shift"
    }

    fn check_input(&self, _crosssection: &CrossSection) -> AlgorithmResult<()> {
        if !self.dx.is_finite() {
            return Err(AlgorithmError::InvalidParameter(format!(
                "shift must be finite, got {}",
                self.dx
            )));
        }
        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        Ok(crosssection.map_x(|x| x + self.dx)?)
    }
}

/// Swap the water side and the land side
///
/// The cross-section keeps its extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Mirror;

impl Algorithm for Mirror {
    type Output = CrossSection;

    fn name(&self) -> &str {
        "Mirror"
    }

    fn check_input(&self, _crosssection: &CrossSection) -> AlgorithmResult<()> {
        Ok(())
    }

    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<CrossSection> {
        let (left, right) = (crosssection.left(), crosssection.right());
        Ok(crosssection.map_x(|x| right - (x - left))?)
    }
}

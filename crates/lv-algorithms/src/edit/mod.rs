//! Geometry edits
//!
//! Algorithms that return a changed copy of a cross-section: removing soil
//! above a line, filling up to a line, excavating along the surface and
//! moving or mirroring the whole geometry.

mod cut;
mod excavation;
mod fill;
mod transform;

pub use cut::Cut;
pub use excavation::Excavation;
pub use fill::Fill;
pub use transform::{Mirror, Shift};

use lv_core::Point;

use crate::algorithm::{AlgorithmError, AlgorithmResult};

/// Check that a line has at least two points ordered from left to right
fn check_line(line: &[Point]) -> AlgorithmResult<()> {
    if line.len() < 2 {
        return Err(AlgorithmError::InvalidParameter(format!(
            "a line needs at least 2 points, got {}",
            line.len()
        )));
    }
    if line.windows(2).any(|w| !(w[0].x < w[1].x)) {
        return Err(AlgorithmError::InvalidParameter(
            "line points must be ordered from left to right".into(),
        ));
    }
    Ok(())
}

//! Levee Cross-Section Algorithms
//!
//! Builders and edits that work on a [`lv_core::CrossSection`]:
//! - Phreatic line for a river and polder level, per material layout
//! - Phreatic lines for a series of river levels
//! - Berm of fill material against the land side slope
//! - Cut, fill, excavation, shift and mirror edits
//!
//! Every algorithm implements [`Algorithm`], which checks the input before
//! any geometry is computed.

pub mod algorithm;
pub mod berm;
pub mod config;
pub mod edit;
pub mod phreatic;

pub use algorithm::{Algorithm, AlgorithmError, AlgorithmResult};
pub use berm::{Berm, BermResult, BermTarget};
pub use config::{AlgorithmConfig, BermConfig, ConfigError, FillConfig, PhreaticLineConfig};
pub use edit::{Cut, Excavation, Fill, Mirror, Shift};
pub use phreatic::{
    AQUIFER_HEAD_LINE_LABEL, AQUIFER_REFERENCE_LINE_LABEL, AquiferInput, AquiferLines, Landmarks,
    PhreaticLine, PhreaticLineResult, PhreaticLineSeries, SeriesEntry, SeriesResult,
    SkippedLevel,
};

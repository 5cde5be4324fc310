//! Algorithm trait and errors

use lv_core::{
    CrossSection, CrossSectionError, GeometryError, MaterialLayoutRegime,
    MissingCharacteristicPoint, ProfileError, UnknownSoilCode,
};
use thiserror::Error;

/// Algorithm-related errors
#[derive(Debug, Clone, Error)]
pub enum AlgorithmError {
    #[error(transparent)]
    MissingCharacteristicPoint(#[from] MissingCharacteristicPoint),

    #[error(transparent)]
    UnknownSoilCode(#[from] UnknownSoilCode),

    #[error("No material layout is set")]
    MissingMaterialLayout,

    #[error("{operation} is not available for material layout '{regime}'")]
    UnsupportedLayout {
        operation: &'static str,
        regime: MaterialLayoutRegime,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{operation} failed: {reason}")]
    Infeasible {
        operation: &'static str,
        reason: String,
    },

    #[error("Cross-section error: {0}")]
    CrossSection(#[from] CrossSectionError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

impl AlgorithmError {
    pub fn infeasible(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Infeasible {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether the error is caused by invalid input rather than by the
    /// geometry
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::MissingCharacteristicPoint(_)
            | Self::UnknownSoilCode(_)
            | Self::MissingMaterialLayout
            | Self::UnsupportedLayout { .. }
            | Self::InvalidParameter(_) => true,
            Self::CrossSection(e) => matches!(
                e,
                CrossSectionError::MissingCharacteristicPoint(_)
                    | CrossSectionError::UnknownSoilCode(_)
                    | CrossSectionError::UnknownMaterialLayout(_)
                    | CrossSectionError::OutsideGeometry { .. }
            ),
            Self::Infeasible { .. } | Self::Profile(_) | Self::Geometry(_) => false,
        }
    }
}

/// Result type for algorithms
pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// An algorithm that builds something on a cross-section
///
/// [`Algorithm::execute`] checks the input before any geometry is computed.
pub trait Algorithm {
    /// What the algorithm produces
    type Output;

    /// Name used in log messages
    fn name(&self) -> &str;

    /// Validate the parameters against the cross-section
    fn check_input(&self, crosssection: &CrossSection) -> AlgorithmResult<()>;

    /// Compute the output, assumes the input has been checked
    fn run(&self, crosssection: &CrossSection) -> AlgorithmResult<Self::Output>;

    /// Check the input and run
    fn execute(&self, crosssection: &CrossSection) -> AlgorithmResult<Self::Output> {
        tracing::debug!("Running {} on '{}'", self.name(), crosssection.name);
        if let Err(e) = self.check_input(crosssection) {
            tracing::warn!("Invalid input for {}: {}", self.name(), e);
            return Err(e);
        }
        let result = self.run(crosssection);
        if let Err(e) = &result {
            tracing::warn!("{} failed: {}", self.name(), e);
        }
        result
    }
}

/// Fails with an input error if the soil code is not known to the cross-section
pub(crate) fn check_soilcode(crosssection: &CrossSection, soilcode: &str) -> AlgorithmResult<()> {
    if crosssection.soils().has_soilcode(soilcode) {
        Ok(())
    } else {
        Err(UnknownSoilCode(soilcode.to_string()).into())
    }
}

//! Persistence of cross-sections
//!
//! The [`CrossSectionStore`] trait is the seam to whatever holds the
//! cross-section data. [`MemoryStore`] keeps everything in memory.

use serde::{Deserialize, Serialize};

use super::{CrossSection, CrossSectionResult, Waternet};
use crate::characteristic::CharacteristicPoints;
use crate::regime::MaterialLayoutRegime;
use crate::soil::{SoilCollection, SoilPolygon};

/// Settings that drive the construction of the waternet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaternetSettings {
    /// Stored material layout code, see [`MaterialLayoutRegime::code`]
    pub material_layout_code: Option<i32>,
    pub characteristic_points: CharacteristicPoints,
}

/// Source and destination of cross-section data
pub trait CrossSectionStore: Send + Sync {
    // ========== Read Methods ==========

    fn read_layers(&self) -> CrossSectionResult<Vec<SoilPolygon>>;

    fn read_soils(&self) -> CrossSectionResult<SoilCollection>;

    fn read_waternet(&self) -> CrossSectionResult<Waternet>;

    fn read_settings(&self) -> CrossSectionResult<WaternetSettings>;

    // ========== Write Methods ==========

    /// Replace all layers
    fn write_layers(&mut self, layers: &[SoilPolygon]) -> CrossSectionResult<()>;

    fn write_soils(&mut self, soils: &SoilCollection) -> CrossSectionResult<()>;

    /// Replace all head lines
    fn write_waternet(&mut self, waternet: &Waternet) -> CrossSectionResult<()>;

    fn write_settings(&mut self, settings: &WaternetSettings) -> CrossSectionResult<()>;
}

/// A store that keeps its data in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub layers: Vec<SoilPolygon>,
    pub soils: SoilCollection,
    pub waternet: Waternet,
    pub settings: WaternetSettings,
}

impl CrossSectionStore for MemoryStore {
    fn read_layers(&self) -> CrossSectionResult<Vec<SoilPolygon>> {
        Ok(self.layers.clone())
    }

    fn read_soils(&self) -> CrossSectionResult<SoilCollection> {
        Ok(self.soils.clone())
    }

    fn read_waternet(&self) -> CrossSectionResult<Waternet> {
        Ok(self.waternet.clone())
    }

    fn read_settings(&self) -> CrossSectionResult<WaternetSettings> {
        Ok(self.settings.clone())
    }

    fn write_layers(&mut self, layers: &[SoilPolygon]) -> CrossSectionResult<()> {
        self.layers = layers.to_vec();
        Ok(())
    }

    fn write_soils(&mut self, soils: &SoilCollection) -> CrossSectionResult<()> {
        self.soils = soils.clone();
        Ok(())
    }

    fn write_waternet(&mut self, waternet: &Waternet) -> CrossSectionResult<()> {
        self.waternet = waternet.clone();
        Ok(())
    }

    fn write_settings(&mut self, settings: &WaternetSettings) -> CrossSectionResult<()> {
        self.settings = settings.clone();
        Ok(())
    }
}

impl CrossSection {
    /// Read a cross-section from a store
    ///
    /// An unknown material layout code is an error.
    pub fn from_store(
        name: impl Into<String>,
        store: &dyn CrossSectionStore,
    ) -> CrossSectionResult<Self> {
        let settings = store.read_settings()?;
        let material_layout = settings
            .material_layout_code
            .map(MaterialLayoutRegime::from_code)
            .transpose()?;

        let mut crosssection = CrossSection::new(name, store.read_layers()?, store.read_soils()?)?;
        crosssection.characteristic_points = settings.characteristic_points;
        crosssection.material_layout = material_layout;
        crosssection.waternet = store.read_waternet()?;

        tracing::info!(
            "Read cross-section '{}' with {} layers",
            crosssection.name,
            crosssection.layers.len()
        );
        Ok(crosssection)
    }

    /// Write this cross-section to a store
    pub fn write_to(&self, store: &mut dyn CrossSectionStore) -> CrossSectionResult<()> {
        store.write_layers(&self.layers)?;
        store.write_soils(&self.soils)?;
        store.write_waternet(&self.waternet)?;
        store.write_settings(&WaternetSettings {
            material_layout_code: self.material_layout.map(|r| r.code()),
            characteristic_points: self.characteristic_points.clone(),
        })?;
        Ok(())
    }
}

//! Cross-sections
//!
//! A [`CrossSection`] is the set of soil polygons of a levee together with
//! the soils, characteristic points, material layout and head lines that
//! belong to it. The outer boundary and the surface are derived from the
//! polygons whenever they change, so they are always consistent with the
//! layers.

mod stage;
mod store;

pub use stage::IdMap;
pub use store::{CrossSectionStore, MemoryStore, WaternetSettings};

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::characteristic::{CharacteristicPointType, CharacteristicPoints, MissingCharacteristicPoint};
use crate::constants::COORDINATE_TOLERANCE;
use crate::geometry::{
    GeometryError, Point, bounds, line_polyline_intersections, polyline_polyline_intersections,
    union_boundary,
};
use crate::regime::{MaterialLayoutRegime, UnknownMaterialLayout};
use crate::soil::{
    Profile1D, ProfileError, ProfileRow, SoilCollection, SoilLayer, SoilPolygon, UnknownSoilCode,
};

/// Label given to a phreatic line that is created from scratch
pub const PHREATIC_LINE_LABEL: &str = "Phreatic line";

/// Cross-section related errors
#[derive(Debug, Clone, Error)]
pub enum CrossSectionError {
    #[error("Cross-section has no layers")]
    NoLayers,

    #[error("No surface found at x={0}")]
    NoSurfaceAt(f64),

    #[error("x={x} lies outside the cross-section [{left}, {right}]")]
    OutsideGeometry { x: f64, left: f64, right: f64 },

    #[error(transparent)]
    UnknownSoilCode(#[from] UnknownSoilCode),

    #[error(transparent)]
    MissingCharacteristicPoint(#[from] MissingCharacteristicPoint),

    #[error(transparent)]
    UnknownMaterialLayout(#[from] UnknownMaterialLayout),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Result type for cross-section operations
pub type CrossSectionResult<T> = Result<T, CrossSectionError>;

/// A polyline with a water head, for instance the phreatic line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadLine {
    pub id: Uuid,
    pub label: String,
    pub points: Vec<Point>,
}

impl HeadLine {
    /// Create a new head line with a fresh id
    pub fn new(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            points,
        }
    }
}

/// Head lines of a cross-section, one of them may be the phreatic line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waternet {
    pub head_lines: Vec<HeadLine>,
    pub phreatic_line_id: Option<Uuid>,
}

impl Waternet {
    pub fn phreatic_line(&self) -> Option<&HeadLine> {
        let id = self.phreatic_line_id?;
        self.head_lines.iter().find(|h| h.id == id)
    }

    pub fn head_line(&self, label: &str) -> Option<&HeadLine> {
        self.head_lines.iter().find(|h| h.label == label)
    }
}

/// Serialization format, the derived outline is not stored
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CrossSectionData {
    name: String,
    layers: Vec<SoilPolygon>,
    soils: SoilCollection,
    #[serde(default)]
    characteristic_points: CharacteristicPoints,
    #[serde(default)]
    material_layout: Option<MaterialLayoutRegime>,
    #[serde(default)]
    waternet: Waternet,
}

impl TryFrom<CrossSectionData> for CrossSection {
    type Error = CrossSectionError;

    fn try_from(data: CrossSectionData) -> Result<Self, Self::Error> {
        let mut crosssection = CrossSection::new(data.name, data.layers, data.soils)?;
        crosssection.characteristic_points = data.characteristic_points;
        crosssection.material_layout = data.material_layout;
        crosssection.waternet = data.waternet;
        Ok(crosssection)
    }
}

/// Soil polygons of a levee with everything needed to build on them
#[derive(Debug, Clone)]
pub struct CrossSection {
    /// Name of the cross-section
    pub name: String,
    layers: Vec<SoilPolygon>,
    soils: SoilCollection,
    characteristic_points: CharacteristicPoints,
    material_layout: Option<MaterialLayoutRegime>,
    waternet: Waternet,
    /// Outer boundary of all layers, clockwise
    boundary: Vec<Point>,
    /// Boundary from the top left to the top right point
    surface: Vec<Point>,
}

impl Serialize for CrossSection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let data = CrossSectionData {
            name: self.name.clone(),
            layers: self.layers.clone(),
            soils: self.soils.clone(),
            characteristic_points: self.characteristic_points.clone(),
            material_layout: self.material_layout,
            waternet: self.waternet.clone(),
        };
        data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CrossSection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = CrossSectionData::deserialize(deserializer)?;
        CrossSection::try_from(data).map_err(serde::de::Error::custom)
    }
}

impl CrossSection {
    /// Create a cross-section from soil polygons
    ///
    /// Every polygon must use a soil code of `soils` and together the
    /// polygons must form one connected region.
    pub fn new(
        name: impl Into<String>,
        layers: Vec<SoilPolygon>,
        soils: SoilCollection,
    ) -> CrossSectionResult<Self> {
        let (boundary, surface) = derive_outline(&layers, &soils)?;
        Ok(Self {
            name: name.into(),
            layers,
            soils,
            characteristic_points: CharacteristicPoints::default(),
            material_layout: None,
            waternet: Waternet::default(),
            boundary,
            surface,
        })
    }

    /// Create a cross-section from a row of profiles
    ///
    /// See [`ProfileRow::to_polygons`] for the meaning of the arguments.
    pub fn from_profile_row(
        name: impl Into<String>,
        row: &ProfileRow,
        crosssection: Option<&[Point]>,
        fill_top: Option<&str>,
        fill_bottom: Option<&str>,
        soils: SoilCollection,
    ) -> CrossSectionResult<Self> {
        let layers = row.to_polygons(crosssection, fill_top, fill_bottom)?;
        Self::new(name, layers, soils)
    }

    /// Create a cross-section from a single profile between its left and right
    pub fn from_profile(
        name: impl Into<String>,
        profile: &Profile1D,
        soils: SoilCollection,
    ) -> CrossSectionResult<Self> {
        Self::new(name, profile.to_polygons(), soils)
    }

    /// Set the characteristic points
    pub fn with_characteristic_points(mut self, points: CharacteristicPoints) -> Self {
        self.characteristic_points = points;
        self
    }

    /// Set the material layout
    pub fn with_material_layout(mut self, regime: MaterialLayoutRegime) -> Self {
        self.material_layout = Some(regime);
        self
    }

    // ============== File IO ==============

    /// Save the cross-section to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> CrossSectionResult<()> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| CrossSectionError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize the cross-section to RON bytes
    pub fn to_bytes(&self) -> CrossSectionResult<Vec<u8>> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| CrossSectionError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load a cross-section from a RON file
    pub fn load(path: impl AsRef<Path>) -> CrossSectionResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CrossSectionError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| CrossSectionError::Deserialize(e.to_string()))
    }

    /// Load a cross-section from RON bytes
    pub fn from_bytes(data: &[u8]) -> CrossSectionResult<Self> {
        let content =
            std::str::from_utf8(data).map_err(|e| CrossSectionError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| CrossSectionError::Deserialize(e.to_string()))
    }

    // ============== Accessors ==============

    pub fn layers(&self) -> &[SoilPolygon] {
        &self.layers
    }

    pub fn soils(&self) -> &SoilCollection {
        &self.soils
    }

    pub fn characteristic_points(&self) -> &CharacteristicPoints {
        &self.characteristic_points
    }

    /// The x of a characteristic point that has to be defined
    pub fn require_point(&self, point_type: CharacteristicPointType) -> CrossSectionResult<f64> {
        Ok(self.characteristic_points.require(point_type)?)
    }

    pub fn material_layout(&self) -> Option<MaterialLayoutRegime> {
        self.material_layout
    }

    pub fn waternet(&self) -> &Waternet {
        &self.waternet
    }

    pub fn head_lines(&self) -> &[HeadLine] {
        &self.waternet.head_lines
    }

    pub fn phreatic_line(&self) -> Option<&HeadLine> {
        self.waternet.phreatic_line()
    }

    /// Outer boundary of all layers, clockwise
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// Top of the boundary from the leftmost to the rightmost point
    pub fn surface(&self) -> &[Point] {
        &self.surface
    }

    pub fn left(&self) -> f64 {
        self.extent().0.x
    }

    pub fn right(&self) -> f64 {
        self.extent().1.x
    }

    pub fn top(&self) -> f64 {
        self.extent().1.z
    }

    pub fn bottom(&self) -> f64 {
        self.extent().0.z
    }

    fn extent(&self) -> (Point, Point) {
        // the boundary is never empty once constructed
        bounds(&self.boundary).unwrap_or_default()
    }

    /// Check if any layer or the soil collection uses the soil code
    pub fn has_soilcode(&self, soilcode: &str) -> bool {
        self.soils.has_soilcode(soilcode) || self.layers.iter().any(|l| l.soilcode == soilcode)
    }

    // ============== Queries ==============

    /// Levels where a vertical line at x crosses the surface, highest first
    pub fn surface_levels_at(&self, x: f64) -> Vec<f64> {
        let start = Point::new(x, self.top() + 1.0);
        let end = Point::new(x, self.bottom() - 1.0);
        let mut levels: Vec<f64> = line_polyline_intersections(start, end, &self.surface)
            .into_iter()
            .map(|p| p.z)
            .collect();
        levels.reverse();
        levels
    }

    /// Level of the top of the soil at x
    pub fn z_at(&self, x: f64) -> CrossSectionResult<f64> {
        self.profile_at(x)?
            .top()
            .ok_or(CrossSectionError::NoSurfaceAt(x))
    }

    /// The stratigraphy below x
    ///
    /// On the boundary between two polygons the polygon that comes later in
    /// the list of layers wins.
    pub fn profile_at(&self, x: f64) -> CrossSectionResult<Profile1D> {
        let (left, right) = (self.left(), self.right());
        if x < left - COORDINATE_TOLERANCE || x > right + COORDINATE_TOLERANCE {
            return Err(CrossSectionError::OutsideGeometry { x, left, right });
        }

        let start = Point::new(x, self.top() + 1.0);
        let end = Point::new(x, self.bottom() - 1.0);

        let mut layers = Vec::new();
        for polygon in &self.layers {
            let mut ring = polygon.points.clone();
            if let Some(first) = ring.first().copied() {
                ring.push(first);
            }
            let levels: Vec<f64> = line_polyline_intersections(start, end, &ring)
                .into_iter()
                .map(|p| p.z)
                .collect();
            for w in levels.windows(2) {
                let (bottom, top) = (w[0], w[1]);
                if top - bottom > COORDINATE_TOLERANCE
                    && polygon.contains(Point::new(x, (top + bottom) / 2.0))
                {
                    layers.push(SoilLayer::new(top, bottom, polygon.soilcode.clone()));
                }
            }
        }

        if layers.is_empty() {
            return Err(CrossSectionError::NoSurfaceAt(x));
        }

        layers.sort_by(|a, b| b.top.total_cmp(&a.top));
        let mut profile = Profile1D::new(x, x);
        for layer in layers {
            profile.insert(layer, false)?;
        }
        Ok(profile)
    }

    /// Soil code of the layer containing the point
    pub fn soilcode_at(&self, x: f64, z: f64) -> Option<&str> {
        let point = Point::new(x, z);
        self.layers
            .iter()
            .rev()
            .find(|l| l.contains(point))
            .map(|l| l.soilcode.as_str())
    }

    /// Crossings of a polyline with the surface
    pub fn surface_intersections(&self, polyline: &[Point]) -> Vec<Point> {
        polyline_polyline_intersections(polyline, &self.surface)
    }

    /// Surface points strictly between left and right
    pub fn surface_points_between(&self, left: f64, right: f64) -> Vec<Point> {
        self.surface
            .iter()
            .filter(|p| p.x > left && p.x < right)
            .copied()
            .collect()
    }

    /// The four ditch points from embankment side to land side
    ///
    /// Returns None unless all four ditch points are defined.
    pub fn ditch_points(&self) -> CrossSectionResult<Option<Vec<Point>>> {
        let xs: Option<Vec<f64>> = CharacteristicPointType::DITCH
            .iter()
            .map(|t| self.characteristic_points.get(*t).x())
            .collect();
        let Some(xs) = xs else {
            return Ok(None);
        };
        let points = xs
            .into_iter()
            .map(|x| Ok(Point::new(x, self.z_at(x)?)))
            .collect::<CrossSectionResult<Vec<Point>>>()?;
        Ok(Some(points))
    }

    pub fn has_ditch(&self) -> bool {
        CharacteristicPointType::DITCH
            .iter()
            .all(|t| self.characteristic_points.is_valid(*t))
    }

    // ============== Edits ==============

    /// Copy with the layers replaced
    pub fn with_layers(&self, layers: Vec<SoilPolygon>) -> CrossSectionResult<Self> {
        let (boundary, surface) = derive_outline(&layers, &self.soils)?;
        Ok(Self {
            layers,
            boundary,
            surface,
            ..self.clone()
        })
    }

    /// Copy with extra layers added on top of the existing ones
    pub fn with_layers_added(&self, layers: Vec<SoilPolygon>) -> CrossSectionResult<Self> {
        let mut all = self.layers.clone();
        all.extend(layers);
        self.with_layers(all)
    }

    /// Copy with the given phreatic line
    ///
    /// An existing phreatic line keeps its id, otherwise a new head line is
    /// added.
    pub fn with_phreatic_line(&self, points: Vec<Point>) -> Self {
        let mut result = self.clone();
        let existing = result
            .waternet
            .phreatic_line_id
            .and_then(|id| result.waternet.head_lines.iter_mut().find(|h| h.id == id));
        match existing {
            Some(line) => line.points = points,
            None => {
                let line = HeadLine::new(PHREATIC_LINE_LABEL, points);
                result.waternet.phreatic_line_id = Some(line.id);
                result.waternet.head_lines.push(line);
            }
        }
        result
    }

    /// Copy with a head line set by label
    pub fn with_head_line(&self, label: &str, points: Vec<Point>) -> Self {
        let mut result = self.clone();
        match result.waternet.head_lines.iter_mut().find(|h| h.label == label) {
            Some(line) => line.points = points,
            None => result.waternet.head_lines.push(HeadLine::new(label, points)),
        }
        result
    }

    /// Copy with every x coordinate transformed
    ///
    /// Head lines are kept ordered from left to right.
    pub fn map_x(&self, f: impl Fn(f64) -> f64) -> CrossSectionResult<Self> {
        let layers: Vec<SoilPolygon> = self.layers.iter().map(|l| l.map_x(&f)).collect();
        let mut result = self.with_layers(layers)?;
        result.characteristic_points = self.characteristic_points.map_x(&f);
        for line in &mut result.waternet.head_lines {
            for p in &mut line.points {
                p.x = f(p.x);
            }
            if line.points.first().zip(line.points.last()).is_some_and(|(a, b)| a.x > b.x) {
                line.points.reverse();
            }
        }
        Ok(result)
    }
}

/// Boundary and surface of a set of layers
fn derive_outline(
    layers: &[SoilPolygon],
    soils: &SoilCollection,
) -> CrossSectionResult<(Vec<Point>, Vec<Point>)> {
    if layers.is_empty() {
        return Err(CrossSectionError::NoLayers);
    }
    for layer in layers {
        soils.require(&layer.soilcode)?;
    }

    let rings: Vec<Vec<Point>> = layers.iter().map(|l| l.points.clone()).collect();
    let boundary = union_boundary(&rings)?;
    let surface = surface_from_boundary(&boundary);
    Ok((boundary, surface))
}

/// Walk the clockwise boundary from the highest leftmost point to the
/// highest rightmost point
fn surface_from_boundary(boundary: &[Point]) -> Vec<Point> {
    let Some((min, max)) = bounds(boundary) else {
        return Vec::new();
    };

    let highest_at = |x: f64| {
        boundary
            .iter()
            .enumerate()
            .filter(|(_, p)| (p.x - x).abs() <= COORDINATE_TOLERANCE)
            .max_by(|a, b| a.1.z.total_cmp(&b.1.z))
            .map(|(i, _)| i)
    };

    let (Some(start), Some(end)) = (highest_at(min.x), highest_at(max.x)) else {
        return Vec::new();
    };

    let n = boundary.len();
    let mut surface = Vec::new();
    let mut i = start;
    loop {
        surface.push(boundary[i]);
        if i == end {
            break;
        }
        i = (i + 1) % n;
    }
    surface
}

//! One dimensional soil profiles

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{ProfileError, ProfileResult, SoilLayer, SoilPolygon};

/// A vertical stack of soil layers valid between `left` and `right`
///
/// Layers are ordered from top to bottom. After every mutation the stack is
/// merged so that adjacent layers never share a soil code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile1D {
    /// Left boundary of the profile
    pub left: f64,
    /// Right boundary of the profile
    pub right: f64,
    layers: Vec<SoilLayer>,
}

impl Profile1D {
    /// Create an empty profile between left and right
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left,
            right,
            layers: Vec::new(),
        }
    }

    /// Create a profile from layers ordered top to bottom
    ///
    /// The layers are validated and merged.
    pub fn from_layers(left: f64, right: f64, layers: Vec<SoilLayer>) -> ProfileResult<Self> {
        let mut profile = Self {
            left,
            right,
            layers,
        };
        profile.validate()?;
        profile.merge();
        Ok(profile)
    }

    /// Parse a profile from its short notation
    ///
    /// The format is `top,bottom1,code1,bottom2,code2,...`, each layer starts
    /// at the bottom of the previous one. The extent of the profile is left
    /// at zero, use [`Profile1D::with_extent`] to set it.
    pub fn from_short_string(s: &str) -> ProfileResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() < 3 || parts.len() % 2 == 0 {
            return Err(ProfileError::Parse(s.to_string()));
        }

        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| ProfileError::Parse(s.to_string()))
        };

        let mut top = parse(parts[0])?;
        let mut layers = Vec::with_capacity(parts.len() / 2);
        for pair in parts[1..].chunks_exact(2) {
            let bottom = parse(pair[0])?;
            if pair[1].is_empty() {
                return Err(ProfileError::Parse(s.to_string()));
            }
            layers.push(SoilLayer::new(top, bottom, pair[1]));
            top = bottom;
        }

        Self::from_layers(0.0, 0.0, layers)
    }

    /// Short notation of this profile, see [`Profile1D::from_short_string`]
    pub fn to_short_string(&self) -> String {
        let Some(top) = self.top() else {
            return String::new();
        };
        let mut s = format!("{top}");
        for layer in &self.layers {
            let _ = write!(s, ",{},{}", layer.bottom, layer.soilcode);
        }
        s
    }

    /// Set the horizontal extent of the profile
    pub fn with_extent(mut self, left: f64, right: f64) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    // ============== Accessors ==============

    /// Layers ordered from top to bottom
    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the profile has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Top of the first layer
    pub fn top(&self) -> Option<f64> {
        self.layers.first().map(|l| l.top)
    }

    /// Bottom of the last layer
    pub fn bottom(&self) -> Option<f64> {
        self.layers.last().map(|l| l.bottom)
    }

    /// Total height of the profile, zero when empty
    pub fn height(&self) -> f64 {
        match (self.top(), self.bottom()) {
            (Some(top), Some(bottom)) => top - bottom,
            _ => 0.0,
        }
    }

    /// Horizontal center of the profile
    pub fn mid(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Width of the profile
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Soil code of the layer that contains level z
    ///
    /// On a layer boundary the upper layer wins.
    pub fn soilcode_at(&self, z: f64) -> Option<&str> {
        self.layers
            .iter()
            .find(|l| l.contains(z))
            .map(|l| l.soilcode.as_str())
    }

    /// Unique soil codes in order of appearance
    pub fn soilcodes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for layer in &self.layers {
            if !codes.contains(&layer.soilcode.as_str()) {
                codes.push(&layer.soilcode);
            }
        }
        codes
    }

    /// Check that all layers have a positive height and connect to each other
    pub fn validate(&self) -> ProfileResult<()> {
        for layer in &self.layers {
            if layer.height() <= 0.0 {
                return Err(ProfileError::Height(format!(
                    "layer '{}' from {} to {} has no positive height",
                    layer.soilcode, layer.top, layer.bottom
                )));
            }
        }
        for w in self.layers.windows(2) {
            if w[0].bottom != w[1].top {
                return Err(ProfileError::Gap(format!(
                    "bottom of '{}' at {} does not match top of '{}' at {}",
                    w[0].soilcode, w[0].bottom, w[1].soilcode, w[1].top
                )));
            }
        }
        Ok(())
    }

    // ============== Layer Operations ==============

    /// Insert a layer into the stack
    ///
    /// Existing layers are trimmed where they overlap the new layer. A layer
    /// that spans the new layer completely is split into the part above and
    /// the part below it. With `check` enabled a layer that does not touch the
    /// current stack is rejected.
    pub fn insert(&mut self, layer: SoilLayer, check: bool) -> ProfileResult<()> {
        if layer.height() <= 0.0 {
            return Err(ProfileError::Height(format!(
                "cannot insert layer '{}' from {} to {}",
                layer.soilcode, layer.top, layer.bottom
            )));
        }

        if check {
            if let (Some(top), Some(bottom)) = (self.top(), self.bottom()) {
                if layer.bottom > top || layer.top < bottom {
                    return Err(ProfileError::Gap(format!(
                        "layer from {} to {} does not touch the profile from {} to {}",
                        layer.top, layer.bottom, top, bottom
                    )));
                }
            }
        }

        let mut layers = Vec::with_capacity(self.layers.len() + 2);
        for existing in self.layers.drain(..) {
            if existing.top > layer.top {
                layers.push(SoilLayer::new(
                    existing.top,
                    existing.bottom.max(layer.top),
                    existing.soilcode.clone(),
                ));
            }
            if existing.bottom < layer.bottom {
                layers.push(SoilLayer::new(
                    existing.top.min(layer.bottom),
                    existing.bottom,
                    existing.soilcode,
                ));
            }
        }
        layers.push(layer);
        layers.retain(|l| l.height() > 0.0);
        layers.sort_by(|a, b| b.top.total_cmp(&a.top));

        self.layers = layers;
        self.merge();
        Ok(())
    }

    /// Combine adjacent layers with the same soil code
    pub fn merge(&mut self) {
        let mut merged: Vec<SoilLayer> = Vec::with_capacity(self.layers.len());
        for layer in self.layers.drain(..) {
            match merged.last_mut() {
                Some(last) if last.soilcode == layer.soilcode => last.bottom = layer.bottom,
                _ => merged.push(layer),
            }
        }
        self.layers = merged;
    }

    /// Remove all layers thinner than `minimum_height`
    ///
    /// The thinnest offending layer is removed first. A top or bottom layer is
    /// absorbed by its only neighbour, any other layer is split at its middle
    /// between the layers above and below. This repeats until every layer is
    /// at least `minimum_height` thick. The top and bottom of the profile do
    /// not change.
    ///
    /// A thin boundary layer is removed even when its neighbour is thick
    /// enough, so `0,-2,clay,-5,peat,-10,sand` with a minimum of 3 becomes
    /// `0,-5,peat,-10,sand` rather than staying unchanged.
    pub fn apply_minimum_height(&mut self, minimum_height: f64) -> ProfileResult<()> {
        if self.height() < minimum_height {
            return Err(ProfileError::Height(format!(
                "profile height {} is less than the minimum layer height {}",
                self.height(),
                minimum_height
            )));
        }

        while let Some(index) = self.thinnest_below(minimum_height) {
            let last = self.layers.len() - 1;
            if index == 0 {
                self.layers[1].top = self.layers[0].top;
            } else if index == last {
                self.layers[last - 1].bottom = self.layers[last].bottom;
            } else {
                let mid = self.layers[index].mid();
                self.layers[index - 1].bottom = mid;
                self.layers[index + 1].top = mid;
            }
            self.layers.remove(index);
            self.merge();
        }

        Ok(())
    }

    /// Index of the thinnest layer below the given height, only if there is
    /// more than one layer
    fn thinnest_below(&self, height: f64) -> Option<usize> {
        if self.layers.len() < 2 {
            return None;
        }
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.height() < height)
            .min_by(|a, b| a.1.height().total_cmp(&b.1.height()))
            .map(|(i, _)| i)
    }

    /// Part of the profile between `top` and `bottom`
    pub fn cut(&self, top: f64, bottom: f64) -> ProfileResult<Profile1D> {
        if top <= bottom {
            return Err(ProfileError::Height(format!(
                "cut top {top} must be above cut bottom {bottom}"
            )));
        }

        let layers: Vec<SoilLayer> = self
            .layers
            .iter()
            .filter_map(|l| {
                let t = l.top.min(top);
                let b = l.bottom.max(bottom);
                (t > b).then(|| SoilLayer::new(t, b, l.soilcode.clone()))
            })
            .collect();

        if layers.is_empty() {
            return Err(ProfileError::EmptyCut { top, bottom });
        }

        Ok(Profile1D {
            left: self.left,
            right: self.right,
            layers,
        })
    }

    /// Add a layer on top of the profile up to level `top`
    pub fn add_top_layer(&mut self, top: f64, soilcode: &str) -> ProfileResult<()> {
        let current = self.top().ok_or(ProfileError::Empty)?;
        if top <= current {
            return Err(ProfileError::Height(format!(
                "new top {top} must be above the profile top {current}"
            )));
        }
        self.layers
            .insert(0, SoilLayer::new(top, current, soilcode));
        self.merge();
        Ok(())
    }

    /// Add a layer below the profile down to level `bottom`
    pub fn add_bottom_layer(&mut self, bottom: f64, soilcode: &str) -> ProfileResult<()> {
        let current = self.bottom().ok_or(ProfileError::Empty)?;
        if bottom >= current {
            return Err(ProfileError::Height(format!(
                "new bottom {bottom} must be below the profile bottom {current}"
            )));
        }
        self.layers.push(SoilLayer::new(current, bottom, soilcode));
        self.merge();
        Ok(())
    }

    /// Lay the layers of another profile over this one
    ///
    /// The other profile must touch this profile, its layers replace the
    /// overlapping parts of this profile.
    pub fn add_profile(&mut self, other: &Profile1D) -> ProfileResult<()> {
        if let (Some(top), Some(bottom), Some(other_top), Some(other_bottom)) =
            (self.top(), self.bottom(), other.top(), other.bottom())
        {
            if other_bottom > top || other_top < bottom {
                return Err(ProfileError::Gap(format!(
                    "profile from {other_top} to {other_bottom} does not touch the profile from {top} to {bottom}"
                )));
            }
        }
        for layer in &other.layers {
            self.insert(layer.clone(), false)?;
        }
        Ok(())
    }

    /// Rename soil codes, codes not in the map are kept
    pub fn rename(&mut self, names: &HashMap<String, String>) {
        for layer in &mut self.layers {
            if let Some(name) = names.get(&layer.soilcode) {
                layer.soilcode = name.clone();
            }
        }
        self.merge();
    }

    /// One rectangular polygon per layer spanning the profile extent
    pub fn to_polygons(&self) -> Vec<SoilPolygon> {
        self.layers
            .iter()
            .map(|l| SoilPolygon::new(l.to_points(self.left, self.right), l.soilcode.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> Profile1D {
        Profile1D::from_layers(
            0.0,
            10.0,
            vec![
                SoilLayer::new(0.0, -2.0, "clay"),
                SoilLayer::new(-2.0, -5.0, "peat"),
                SoilLayer::new(-5.0, -10.0, "sand"),
            ],
        )
        .unwrap()
    }

    fn assert_contiguous(p: &Profile1D) {
        for w in p.layers().windows(2) {
            assert_eq!(w[0].bottom, w[1].top);
            assert_ne!(w[0].soilcode, w[1].soilcode);
        }
    }

    #[test]
    fn test_from_layers_rejects_gap() {
        let result = Profile1D::from_layers(
            0.0,
            1.0,
            vec![
                SoilLayer::new(0.0, -1.0, "clay"),
                SoilLayer::new(-2.0, -3.0, "sand"),
            ],
        );
        assert!(matches!(result, Err(ProfileError::Gap(_))));
    }

    #[test]
    fn test_short_string() {
        let p = Profile1D::from_short_string("0,-2,clay,-5,peat,-10,sand").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.top(), Some(0.0));
        assert_eq!(p.bottom(), Some(-10.0));
        assert_eq!(p.to_short_string(), "0,-2,clay,-5,peat,-10,sand");

        assert!(Profile1D::from_short_string("0,-2").is_err());
        assert!(Profile1D::from_short_string("0,x,clay").is_err());
        assert!(Profile1D::from_short_string("0,1,clay").is_err());
    }

    #[test]
    fn test_insert_trims_neighbours() {
        let mut p = profile();
        p.insert(SoilLayer::new(-1.0, -3.0, "sand"), true).unwrap();
        assert_eq!(p.to_short_string(), "0,-1,clay,-3,sand,-5,peat,-10,sand");
        assert_contiguous(&p);
    }

    #[test]
    fn test_insert_splits_spanning_layer() {
        let mut p = profile();
        p.insert(SoilLayer::new(-6.0, -7.0, "clay"), true).unwrap();
        assert_eq!(
            p.to_short_string(),
            "0,-2,clay,-5,peat,-6,sand,-7,clay,-10,sand"
        );
    }

    #[test]
    fn test_insert_merges_same_code() {
        let mut p = profile();
        p.insert(SoilLayer::new(-2.0, -5.0, "clay"), true).unwrap();
        assert_eq!(p.to_short_string(), "0,-5,clay,-10,sand");
    }

    #[test]
    fn test_insert_gap_check() {
        let mut p = profile();
        let layer = SoilLayer::new(5.0, 2.0, "fill");
        assert!(matches!(
            p.insert(layer.clone(), true),
            Err(ProfileError::Gap(_))
        ));
        // touching the top is allowed
        p.insert(SoilLayer::new(2.0, 0.0, "fill"), true).unwrap();
        assert_eq!(p.top(), Some(2.0));

        let mut empty = Profile1D::new(0.0, 1.0);
        empty.insert(layer, true).unwrap();
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_insert_covering_everything() {
        let mut p = profile();
        p.insert(SoilLayer::new(1.0, -11.0, "fill"), false).unwrap();
        assert_eq!(p.to_short_string(), "1,-11,fill");
    }

    #[test]
    fn test_merge() {
        let mut p = Profile1D::new(0.0, 1.0);
        p.layers = vec![
            SoilLayer::new(0.0, -1.0, "clay"),
            SoilLayer::new(-1.0, -2.0, "clay"),
            SoilLayer::new(-2.0, -3.0, "sand"),
            SoilLayer::new(-3.0, -4.0, "clay"),
        ];
        p.merge();
        assert_eq!(p.to_short_string(), "0,-2,clay,-3,sand,-4,clay");
        assert_contiguous(&p);
    }

    #[test]
    fn test_minimum_height_without_violations() {
        let mut p = profile();
        p.apply_minimum_height(2.0).unwrap();
        assert_eq!(p, profile());
    }

    #[test]
    fn test_minimum_height_top_layer_donates() {
        // clay (2.0) is thinner than 3.0 and has only peat as neighbour
        let mut p = profile();
        p.apply_minimum_height(3.0).unwrap();
        assert_eq!(p.to_short_string(), "0,-5,peat,-10,sand");
    }

    #[test]
    fn test_minimum_height_middle_layer_splits() {
        let mut p = Profile1D::from_short_string("0,-3,clay,-4,peat,-10,sand").unwrap();
        p.apply_minimum_height(2.0).unwrap();
        assert_eq!(p.to_short_string(), "0,-3.5,clay,-10,sand");
    }

    #[test]
    fn test_minimum_height_bottom_layer_donates() {
        let mut p = Profile1D::from_short_string("0,-5,clay,-5.5,sand").unwrap();
        p.apply_minimum_height(1.0).unwrap();
        assert_eq!(p.to_short_string(), "0,-5.5,clay");
    }

    #[test]
    fn test_minimum_height_property() {
        let mut p = Profile1D::from_short_string(
            "2,1.8,a,1.0,b,0.9,c,-0.5,d,-0.6,e,-3.0,f,-3.2,g,-6,h",
        )
        .unwrap();
        let (top, bottom) = (p.top(), p.bottom());
        p.apply_minimum_height(0.5).unwrap();
        assert!(p.layers().iter().all(|l| l.height() >= 0.5));
        assert_eq!(p.top(), top);
        assert_eq!(p.bottom(), bottom);
        assert_contiguous(&p);
    }

    #[test]
    fn test_minimum_height_too_thin_profile() {
        let mut p = profile();
        assert!(matches!(
            p.apply_minimum_height(11.0),
            Err(ProfileError::Height(_))
        ));
        assert!(Profile1D::new(0.0, 1.0).apply_minimum_height(0.5).is_err());
    }

    #[test]
    fn test_cut() {
        let p = profile().cut(-1.0, -6.0).unwrap();
        assert_eq!(p.to_short_string(), "-1,-2,clay,-5,peat,-6,sand");
        assert_eq!(p.left, 0.0);
        assert_eq!(p.right, 10.0);

        assert!(matches!(
            profile().cut(5.0, 1.0),
            Err(ProfileError::EmptyCut { .. })
        ));
        assert!(profile().cut(-5.0, -1.0).is_err());
    }

    #[test]
    fn test_add_top_and_bottom_layer() {
        let mut p = profile();
        p.add_top_layer(1.5, "fill").unwrap();
        p.add_bottom_layer(-12.0, "sand").unwrap();
        assert_eq!(p.to_short_string(), "1.5,0,fill,-2,clay,-5,peat,-12,sand");
        assert!(p.add_top_layer(1.5, "fill").is_err());
        assert!(p.add_bottom_layer(-11.0, "sand").is_err());
        assert!(matches!(
            Profile1D::new(0.0, 1.0).add_top_layer(1.0, "fill"),
            Err(ProfileError::Empty)
        ));
    }

    #[test]
    fn test_add_profile() {
        let mut p = profile();
        let other = Profile1D::from_short_string("1,-1,fill").unwrap();
        p.add_profile(&other).unwrap();
        assert_eq!(p.to_short_string(), "1,-1,fill,-2,clay,-5,peat,-10,sand");

        let far = Profile1D::from_short_string("10,5,fill").unwrap();
        assert!(matches!(p.add_profile(&far), Err(ProfileError::Gap(_))));
    }

    #[test]
    fn test_rename_merges() {
        let mut p = profile();
        let names = HashMap::from([("peat".to_string(), "clay".to_string())]);
        p.rename(&names);
        assert_eq!(p.to_short_string(), "0,-5,clay,-10,sand");
    }

    #[test]
    fn test_soilcode_at() {
        let p = profile();
        assert_eq!(p.soilcode_at(-1.0), Some("clay"));
        assert_eq!(p.soilcode_at(-2.0), Some("clay"));
        assert_eq!(p.soilcode_at(-7.0), Some("sand"));
        assert_eq!(p.soilcode_at(1.0), None);
        assert_eq!(p.soilcodes(), vec!["clay", "peat", "sand"]);
    }

    #[test]
    fn test_to_polygons() {
        let polygons = profile().to_polygons();
        assert_eq!(polygons.len(), 3);
        assert_relative_eq!(polygons[1].area(), 30.0);
        assert_eq!(polygons[2].soilcode, "sand");
    }
}

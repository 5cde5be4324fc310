//! Rows of profiles

use serde::{Deserialize, Serialize};

use super::{Profile1D, ProfileError, ProfileResult, SoilPolygon, cut_above};
use crate::constants::COORDINATE_TOLERANCE;
use crate::geometry::{GeometryError, Point, bounds};

/// Profiles placed next to each other from left to right
///
/// Each profile starts where the previous one ends and all profiles share
/// the same top and bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    profiles: Vec<Profile1D>,
}

impl ProfileRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles in the row from left to right
    pub fn profiles(&self) -> &[Profile1D] {
        &self.profiles
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the row has no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Left boundary of the first profile
    pub fn left(&self) -> Option<f64> {
        self.profiles.first().map(|p| p.left)
    }

    /// Right boundary of the last profile
    pub fn right(&self) -> Option<f64> {
        self.profiles.last().map(|p| p.right)
    }

    /// Highest top of all profiles
    pub fn top(&self) -> Option<f64> {
        self.profiles
            .iter()
            .filter_map(Profile1D::top)
            .max_by(f64::total_cmp)
    }

    /// Lowest bottom of all profiles
    pub fn bottom(&self) -> Option<f64> {
        self.profiles
            .iter()
            .filter_map(Profile1D::bottom)
            .min_by(f64::total_cmp)
    }

    /// Sorted unique soil codes of all profiles
    pub fn soilcodes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .profiles
            .iter()
            .flat_map(|p| p.layers().iter().map(|l| l.soilcode.clone()))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Append a profile on the right side of the row
    ///
    /// The profile must start where the row ends. If its top is above the
    /// top of the row the existing profiles are raised with `fill_top`, if it
    /// is below the new profile is raised. Bottoms are matched the same way
    /// with `fill_bottom`. Nothing changes when a required fill material is
    /// missing.
    pub fn append(
        &mut self,
        mut profile: Profile1D,
        fill_top: Option<&str>,
        fill_bottom: Option<&str>,
    ) -> ProfileResult<()> {
        let (Some(top), Some(bottom)) = (profile.top(), profile.bottom()) else {
            return Err(ProfileError::Empty);
        };

        let (Some(row_right), Some(row_top), Some(row_bottom)) =
            (self.right(), self.top(), self.bottom())
        else {
            self.profiles.push(profile);
            return Ok(());
        };

        if (profile.left - row_right).abs() > COORDINATE_TOLERANCE {
            return Err(ProfileError::Continuity {
                left: profile.left,
                right: row_right,
            });
        }

        if top != row_top && fill_top.is_none() {
            return Err(ProfileError::MissingFillMaterial("top"));
        }
        if bottom != row_bottom && fill_bottom.is_none() {
            return Err(ProfileError::MissingFillMaterial("bottom"));
        }

        if let Some(fill) = fill_top {
            if top > row_top {
                for existing in &mut self.profiles {
                    if existing.top().is_some_and(|t| t < top) {
                        existing.add_top_layer(top, fill)?;
                    }
                }
            } else if top < row_top {
                profile.add_top_layer(row_top, fill)?;
            }
        }

        if let Some(fill) = fill_bottom {
            if bottom < row_bottom {
                for existing in &mut self.profiles {
                    if existing.bottom().is_some_and(|b| b > bottom) {
                        existing.add_bottom_layer(bottom, fill)?;
                    }
                }
            } else if bottom > row_bottom {
                profile.add_bottom_layer(row_bottom, fill)?;
            }
        }

        self.profiles.push(profile);
        Ok(())
    }

    /// Convert the row to soil polygons
    ///
    /// Without a crosssection every layer of every profile becomes a
    /// rectangle. With a crosssection the profiles are first padded to the
    /// top and bottom of the crosssection with the fill materials and
    /// everything above the crosssection is removed, a layer can end up as
    /// zero, one or more polygons.
    pub fn to_polygons(
        &self,
        crosssection: Option<&[Point]>,
        fill_top: Option<&str>,
        fill_bottom: Option<&str>,
    ) -> ProfileResult<Vec<SoilPolygon>> {
        let Some(line) = crosssection else {
            return Ok(self.profiles.iter().flat_map(Profile1D::to_polygons).collect());
        };

        if line.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                required: 2,
                actual: line.len(),
            }
            .into());
        }
        let (min, max) = bounds(line).ok_or(GeometryError::Empty)?;

        for profile in &self.profiles {
            if profile.top().is_some_and(|t| t < max.z) && fill_top.is_none() {
                return Err(ProfileError::MissingFillMaterial("top"));
            }
            if profile.bottom().is_some_and(|b| b > min.z) && fill_bottom.is_none() {
                return Err(ProfileError::MissingFillMaterial("bottom"));
            }
        }

        let mut padded = self.profiles.clone();
        for profile in &mut padded {
            if profile.top().is_some_and(|t| t < max.z) {
                let fill = fill_top.ok_or(ProfileError::MissingFillMaterial("top"))?;
                profile.add_top_layer(max.z, fill)?;
            }
            if profile.bottom().is_some_and(|b| b > min.z) {
                let fill = fill_bottom.ok_or(ProfileError::MissingFillMaterial("bottom"))?;
                profile.add_bottom_layer(min.z, fill)?;
            }
        }

        let layers: Vec<SoilPolygon> = padded.iter().flat_map(Profile1D::to_polygons).collect();
        Ok(cut_above(&layers, line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_contains;

    fn profile(s: &str, left: f64, right: f64) -> Profile1D {
        Profile1D::from_short_string(s).unwrap().with_extent(left, right)
    }

    fn row() -> ProfileRow {
        let mut row = ProfileRow::new();
        row.append(profile("0,-2,clay,-10,sand", 0.0, 10.0), None, None)
            .unwrap();
        row.append(profile("0,-4,peat,-10,sand", 10.0, 25.0), None, None)
            .unwrap();
        row
    }

    #[test]
    fn test_append_continuity() {
        let mut row = row();
        let result = row.append(profile("0,-10,sand", 30.0, 40.0), None, None);
        assert!(matches!(result, Err(ProfileError::Continuity { .. })));
        assert_eq!(row.len(), 2);

        row.append(profile("0,-10,sand", 25.0, 40.0), None, None)
            .unwrap();
        for w in row.profiles().windows(2) {
            assert_eq!(w[0].right, w[1].left);
        }
        assert_eq!(row.left(), Some(0.0));
        assert_eq!(row.right(), Some(40.0));
    }

    #[test]
    fn test_append_higher_profile_raises_row() {
        let mut row = row();
        row.append(profile("2,-10,clay", 25.0, 30.0), Some("fill"), None)
            .unwrap();
        assert_eq!(row.top(), Some(2.0));
        assert!(row.profiles().iter().all(|p| p.top() == Some(2.0)));
        assert_eq!(row.profiles()[0].layers()[0].soilcode, "fill");
    }

    #[test]
    fn test_append_lower_profile_is_padded() {
        let mut row = row();
        row.append(profile("-1,-8,clay", 25.0, 30.0), Some("fill"), Some("sand"))
            .unwrap();
        let last = &row.profiles()[2];
        assert_eq!(last.top(), Some(0.0));
        assert_eq!(last.bottom(), Some(-10.0));
        assert_eq!(last.to_short_string(), "0,-1,fill,-8,clay,-10,sand");
    }

    #[test]
    fn test_append_missing_fill_leaves_row_untouched() {
        let mut row = row();
        let before = row.clone();
        let result = row.append(profile("2,-12,clay", 25.0, 30.0), Some("fill"), None);
        assert!(matches!(
            result,
            Err(ProfileError::MissingFillMaterial("bottom"))
        ));
        assert_eq!(row, before);
    }

    #[test]
    fn test_soilcodes() {
        assert_eq!(row().soilcodes(), vec!["clay", "peat", "sand"]);
    }

    #[test]
    fn test_to_polygons_without_crosssection() {
        let row = row();
        let polygons = row.to_polygons(None, None, None).unwrap();
        assert_eq!(polygons.len(), 4);

        // the material at any point inside a profile matches the profile
        for profile in row.profiles() {
            for z in [-0.5, -3.0, -7.5] {
                let x = profile.mid();
                let code = polygons
                    .iter()
                    .find(|p| polygon_contains(&p.points, Point::new(x, z)))
                    .map(|p| p.soilcode.as_str());
                assert_eq!(code, profile.soilcode_at(z));
            }
        }
    }

    #[test]
    fn test_to_polygons_with_crosssection() {
        let row = row();
        let crosssection = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 3.0),
            Point::new(15.0, 3.0),
            Point::new(25.0, -1.0),
        ];

        assert!(matches!(
            row.to_polygons(Some(&crosssection), None, None),
            Err(ProfileError::MissingFillMaterial("top"))
        ));

        let polygons = row
            .to_polygons(Some(&crosssection), Some("fill"), None)
            .unwrap();
        assert!(polygons.iter().any(|p| p.soilcode == "fill"));
        assert!(
            polygons
                .iter()
                .all(|p| p.top().is_some_and(|t| t <= 3.0 + 1e-9))
        );
        // nothing above the line at the right side
        assert!(
            !polygons
                .iter()
                .any(|p| p.contains(Point::new(24.0, -0.2)))
        );
    }
}

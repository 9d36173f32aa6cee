//! Processing regions and their split policy

use std::fmt;

use geo::{Area, CoordsIter, Intersects, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vector::BoundingBox;

/// Which half of a split parent a region is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitRole {
    /// Not produced by a split
    #[default]
    None,
    East,
    West,
    North,
    South,
}

impl SplitRole {
    /// Suffix appended to the parent name, `None` for unsplit regions
    pub fn label(&self) -> Option<&'static str> {
        match self {
            SplitRole::None => None,
            SplitRole::East => Some("East"),
            SplitRole::West => Some("West"),
            SplitRole::North => Some("North"),
            SplitRole::South => Some("South"),
        }
    }
}

impl fmt::Display for SplitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("none"))
    }
}

/// Bounding-box axis a region is bisected along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitAxis {
    /// Cut at the longitude midpoint into west and east halves
    #[default]
    Longitude,
    /// Cut at the latitude midpoint into south and north halves
    Latitude,
}

impl SplitAxis {
    /// Roles of the (lower, upper) halves along this axis
    pub fn roles(&self) -> (SplitRole, SplitRole) {
        match self {
            SplitAxis::Longitude => (SplitRole::West, SplitRole::East),
            SplitAxis::Latitude => (SplitRole::South, SplitRole::North),
        }
    }
}

/// Declarative split decision attached to a region when the catalog is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitPolicy {
    pub needs_split: bool,
    pub axis: SplitAxis,
}

impl SplitPolicy {
    pub fn split_along(axis: SplitAxis) -> Self {
        Self { needs_split: true, axis }
    }

    pub fn keep() -> Self {
        Self::default()
    }
}

/// A named processing region.
///
/// Regions are immutable once built: the catalog creates them, the region
/// splitter derives sub-regions from them, and nothing mutates either
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    geometry: MultiPolygon<f64>,
    parent_state: String,
    split_role: SplitRole,
    /// Coordinate of the cut line along the split axis, for split products
    cut: Option<f64>,
    /// Geometry the split product was cut from
    parent_geometry: Option<MultiPolygon<f64>>,
    policy: SplitPolicy,
}

impl Region {
    /// Create a top-level region. Its parent state is its own name.
    ///
    /// Fails with `InvalidGeometry` for empty, non-finite or zero-area
    /// geometries.
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Result<Self> {
        let name = name.into();
        validate_geometry(&name, &geometry)?;
        Ok(Self {
            parent_state: name.clone(),
            name,
            geometry,
            split_role: SplitRole::None,
            cut: None,
            parent_geometry: None,
            policy: SplitPolicy::keep(),
        })
    }

    /// Create a top-level region from a single polygon
    pub fn from_polygon(name: impl Into<String>, polygon: Polygon<f64>) -> Result<Self> {
        Self::new(name, MultiPolygon::new(vec![polygon]))
    }

    /// Create the `role` half of `parent`, named `"<parent> <Role>"`.
    ///
    /// `cut` is the x (west/east) or y (south/north) coordinate of the line
    /// the parent was cut along. Sub-regions never need a further split.
    pub fn sub_region(parent: &Region, role: SplitRole, cut: f64, geometry: MultiPolygon<f64>) -> Result<Self> {
        let name = match role.label() {
            Some(label) => format!("{} {}", parent.name, label),
            None => parent.name.clone(),
        };
        validate_geometry(&name, &geometry)?;
        Ok(Self {
            name,
            geometry,
            parent_state: parent.parent_state.clone(),
            split_role: role,
            cut: role.label().map(|_| cut),
            parent_geometry: role.label().map(|_| parent.geometry.clone()),
            policy: SplitPolicy::keep(),
        })
    }

    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn parent_state(&self) -> &str {
        &self.parent_state
    }

    pub fn split_role(&self) -> SplitRole {
        self.split_role
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Cut line coordinate of a split product
    pub fn cut(&self) -> Option<f64> {
        self.cut
    }

    /// Geometry a split product was cut from
    pub fn parent_geometry(&self) -> Option<&MultiPolygon<f64>> {
        self.parent_geometry.as_ref()
    }

    /// Whether the point belongs to the region, boundary included.
    ///
    /// Split products test the parent geometry and the side of the cut,
    /// so the two halves never share a point: the cut line itself goes to
    /// the west or south half.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let on_side = match (self.split_role, self.cut) {
            (SplitRole::West, Some(cut)) => x <= cut,
            (SplitRole::East, Some(cut)) => x > cut,
            (SplitRole::South, Some(cut)) => y <= cut,
            (SplitRole::North, Some(cut)) => y > cut,
            _ => true,
        };
        let geometry = self.parent_geometry.as_ref().unwrap_or(&self.geometry);
        on_side && geometry.intersects(&Point::new(x, y))
    }

    /// Bounding box of the region geometry
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::of(&self.geometry).ok_or_else(|| Error::InvalidGeometry {
            region: self.name.clone(),
            reason: "geometry has no coordinates".into(),
        })
    }

    /// Unsigned planar area in map units squared
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }
}

fn validate_geometry(name: &str, geometry: &MultiPolygon<f64>) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidGeometry {
        region: name.to_string(),
        reason: reason.to_string(),
    };

    if geometry.coords_count() == 0 {
        return Err(invalid("geometry has no coordinates"));
    }
    if !geometry.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        return Err(invalid("non-finite coordinates"));
    }
    let area = geometry.unsigned_area();
    if area.is_nan() || area <= 0.0 {
        return Err(invalid("zero area"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon<f64> {
        BoundingBox::new(min, min, max, max).to_polygon()
    }

    #[test]
    fn test_new_region_is_its_own_parent() {
        let region = Region::from_polygon("Ohio", square(0.0, 2.0)).unwrap();
        assert_eq!(region.parent_state(), "Ohio");
        assert_eq!(region.split_role(), SplitRole::None);
        assert!(!region.policy().needs_split);
        assert!((region.area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_geometries_rejected() {
        let empty = Region::new("Nowhere", MultiPolygon::new(vec![]));
        assert!(matches!(empty, Err(Error::InvalidGeometry { .. })));

        let flat = Region::from_polygon("Line", BoundingBox::new(0.0, 0.0, 1.0, 0.0).to_polygon());
        assert!(matches!(flat, Err(Error::InvalidGeometry { .. })));

        let nan = Region::from_polygon("Bad", square(0.0, f64::NAN));
        assert!(matches!(nan, Err(Error::InvalidGeometry { .. })));
    }

    #[test]
    fn test_sub_region_naming() {
        let parent = Region::from_polygon("Texas", square(0.0, 2.0))
            .unwrap()
            .with_policy(SplitPolicy::split_along(SplitAxis::Longitude));
        let east = Region::sub_region(
            &parent,
            SplitRole::East,
            1.0,
            MultiPolygon::new(vec![BoundingBox::new(1.0, 0.0, 2.0, 2.0).to_polygon()]),
        )
        .unwrap();

        assert_eq!(east.name(), "Texas East");
        assert_eq!(east.parent_state(), "Texas");
        assert_eq!(east.split_role(), SplitRole::East);
        assert!(!east.policy().needs_split);
        assert_eq!(east.cut(), Some(1.0));
    }

    #[test]
    fn test_cut_line_belongs_to_lower_half() {
        let parent = Region::from_polygon("Texas", square(0.0, 2.0)).unwrap();
        let half = |role, min_x, max_x| {
            Region::sub_region(
                &parent,
                role,
                1.0,
                MultiPolygon::new(vec![BoundingBox::new(min_x, 0.0, max_x, 2.0).to_polygon()]),
            )
            .unwrap()
        };
        let west = half(SplitRole::West, 0.0, 1.0);
        let east = half(SplitRole::East, 1.0, 2.0);

        assert!(west.contains_point(1.0, 0.5));
        assert!(!east.contains_point(1.0, 0.5));
        assert!(east.contains_point(1.5, 0.5));
        assert!(!west.contains_point(1.5, 0.5));
        assert!(parent.contains_point(1.0, 0.5));
        assert!(!parent.contains_point(2.5, 0.5));
        assert_eq!(parent.cut(), None);
        assert_eq!(east.parent_geometry(), Some(parent.geometry()));

        let north = Region::sub_region(
            &parent,
            SplitRole::North,
            1.0,
            MultiPolygon::new(vec![BoundingBox::new(0.0, 1.0, 2.0, 2.0).to_polygon()]),
        )
        .unwrap();
        assert!(!north.contains_point(0.5, 1.0));
        assert!(north.contains_point(1.0, 1.5));
        assert!(!north.contains_point(1.0, 2.5));
    }

    #[test]
    fn test_axis_roles() {
        assert_eq!(SplitAxis::Longitude.roles(), (SplitRole::West, SplitRole::East));
        assert_eq!(SplitAxis::Latitude.roles(), (SplitRole::South, SplitRole::North));
    }
}

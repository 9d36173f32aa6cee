//! Region bisection
//!
//! An oversized region is cut once at the midpoint of its bounding box,
//! along the axis named by its split policy. Each half is the
//! intersection of the region geometry with one half of the box. The
//! halves share the cut line exactly; their outer sides are widened by
//! the tolerance so boundary vertices of the region are never trimmed.

use geo::{Area, BooleanOps, MultiPolygon};
use tracing::debug;

use terracomp_core::vector::{BoundingBox, Region, SplitAxis, SplitRole};
use terracomp_core::{Error, Result};

/// Parameters for region splitting
#[derive(Debug, Clone, Copy)]
pub struct SplitParams {
    /// Boundary snapping tolerance in map units
    pub tolerance: f64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

/// Decompose a region according to its split policy.
///
/// Regions whose policy does not ask for a split come back unchanged as a
/// single `(region, SplitRole::None)` entry. Split regions come back as
/// the (lower, upper) halves along the policy axis: west then east, or
/// south then north.
///
/// # Errors
/// `AlreadySplit` when asked to split a region that is itself a split
/// product, `InvalidGeometry` when the region or one of its halves is
/// degenerate.
pub fn split_region(region: &Region, params: &SplitParams) -> Result<Vec<(Region, SplitRole)>> {
    let policy = region.policy();
    if !policy.needs_split {
        return Ok(vec![(region.clone(), SplitRole::None)]);
    }
    if region.split_role() != SplitRole::None {
        return Err(Error::AlreadySplit(region.name().to_string()));
    }
    if !params.tolerance.is_finite() || params.tolerance < 0.0 {
        return Err(Error::InvalidParameter {
            name: "tolerance",
            value: params.tolerance.to_string(),
            reason: "must be finite and non-negative".into(),
        });
    }

    let bbox = region.bounding_box()?;
    let (lower_box, upper_box, cut) = halves(&bbox, policy.axis, params.tolerance);
    let (lower_role, upper_role) = policy.axis.roles();

    let lower = region.geometry().intersection(&lower_box);
    let upper = region.geometry().intersection(&upper_box);
    debug!(
        region = region.name(),
        axis = ?policy.axis,
        lower_area = lower.unsigned_area(),
        upper_area = upper.unsigned_area(),
        "split region"
    );

    Ok(vec![
        (Region::sub_region(region, lower_role, cut, lower)?, lower_role),
        (Region::sub_region(region, upper_role, cut, upper)?, upper_role),
    ])
}

/// Lower and upper half-boxes of `bbox` along `axis`, and the cut coordinate
fn halves(bbox: &BoundingBox, axis: SplitAxis, tolerance: f64) -> (MultiPolygon<f64>, MultiPolygon<f64>, f64) {
    let outer = bbox.expand(tolerance);
    let (mid_x, mid_y) = bbox.center();

    let (lower, upper, cut) = match axis {
        SplitAxis::Longitude => (
            BoundingBox::new(outer.min_x, outer.min_y, mid_x, outer.max_y),
            BoundingBox::new(mid_x, outer.min_y, outer.max_x, outer.max_y),
            mid_x,
        ),
        SplitAxis::Latitude => (
            BoundingBox::new(outer.min_x, outer.min_y, outer.max_x, mid_y),
            BoundingBox::new(outer.min_x, mid_y, outer.max_x, outer.max_y),
            mid_y,
        ),
    };
    (
        MultiPolygon::new(vec![lower.to_polygon()]),
        MultiPolygon::new(vec![upper.to_polygon()]),
        cut,
    )
}

/// How far two sub-regions are from partitioning their parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionCheck {
    /// Area covered by both halves
    pub overlap_area: f64,
    /// Area of the parent covered by neither half
    pub gap_area: f64,
}

impl PartitionCheck {
    /// Whether both overlap and gap stay within `tolerance`
    pub fn within(&self, tolerance: f64) -> bool {
        self.overlap_area <= tolerance && self.gap_area <= tolerance
    }
}

/// Measure overlap and gap between two halves of `parent`
pub fn verify_partition(parent: &Region, a: &Region, b: &Region) -> PartitionCheck {
    let overlap = a.geometry().intersection(b.geometry());
    let union = a.geometry().union(b.geometry());
    let gap = parent.geometry().difference(&union);
    PartitionCheck {
        overlap_area: overlap.unsigned_area(),
        gap_area: gap.unsigned_area(),
    }
}

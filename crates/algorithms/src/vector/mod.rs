//! Vector operations on processing regions
//!
//! - Split: bisect an oversized region at its bounding-box midpoint
//! - Clip: mask raster cells whose centers fall outside a geometry or region

mod clip;
mod split;

pub use clip::{clip_to_geometry, clip_to_region};
pub use split::{PartitionCheck, SplitParams, split_region, verify_partition};

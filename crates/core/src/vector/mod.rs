//! Vector types: bounding boxes and processing regions

mod bbox;
mod region;

pub use bbox::BoundingBox;
pub use region::{Region, SplitAxis, SplitPolicy, SplitRole};

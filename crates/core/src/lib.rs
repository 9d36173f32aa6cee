//! # Terracomp Core
//!
//! Core types shared by the terracomp crates:
//! - `Raster<T>`: generic georeferenced grid with NaN / sentinel no-data
//! - `GeoTransform` and `CRS`
//! - `Scene` and `TimeSeries`: multi-band acquisitions ordered in time
//! - `Region`: named processing geometry with its split policy
//! - `ArchiveQuery`: what the scene archive is asked for

pub mod archive;
pub mod crs;
pub mod error;
pub mod raster;
pub mod scene;
pub mod vector;

pub use archive::ArchiveQuery;
pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use scene::{QUALITY_BAND, RawBand, Scene, TimeSeries};
pub use vector::{BoundingBox, Region, SplitAxis, SplitPolicy, SplitRole};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::scene::{RawBand, Scene, TimeSeries};
    pub use crate::vector::{BoundingBox, Region, SplitAxis, SplitPolicy, SplitRole};
}

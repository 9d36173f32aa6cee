//! # Terracomp Algorithms
//!
//! Raster and geometry algorithms of the composite pipeline.
//!
//! ## Algorithm Categories
//!
//! - **imagery**: Cloud masking and the eight spectral indices
//! - **temporal**: Windowed smoothing and yearly median composites
//! - **vector**: Region bisection and clipping to region geometry

pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod temporal;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        EviParams, SaviParams, SpectralIndex, augment, compute_index, mask_scene, validity_mask,
    };
    pub use crate::temporal::{Composite, SmoothingParams, composite, smooth};
    pub use crate::vector::{SplitParams, clip_to_geometry, clip_to_region, split_region, verify_partition};
    pub use terracomp_core::prelude::*;
}

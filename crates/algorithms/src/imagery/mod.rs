//! Per-scene imagery algorithms
//!
//! - Cloud mask: drop pixels flagged as cloud or cirrus in the quality bitmask
//! - Spectral indices: NDVI, EVI, SAVI, NDWI, BSI, NDBI, MNDWI, NBR
//! - Augment: append all eight index bands to a scene

mod augment;
mod cloud_mask;
mod indices;

pub use augment::augment;
pub use cloud_mask::{CIRRUS_BIT, CLOUD_BIT, apply_mask, is_clear, mask_scene, validity_mask};
pub use indices::{
    EviParams, SaviParams, SpectralIndex, bsi, compute_index, evi, mndwi, nbr, ndbi, ndvi, ndwi,
    normalized_difference, savi,
};

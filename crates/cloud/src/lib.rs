//! # Terracomp Cloud
//!
//! STAC encoding for the scene archive.
//!
//! Archive queries are encoded as STAC Item Search bodies
//! ([`StacSearchParams`]) and search responses are decoded into
//! [`SceneManifest`]s: acquisition time, scene-level cloud cover and one
//! asset href per band the pipeline reads. Fetching and decoding the
//! rasters themselves is the archive's business.

pub mod error;
pub mod manifest;
pub mod stac_models;

pub use error::{CloudError, Result};
pub use manifest::{SceneManifest, manifests_for};
pub use stac_models::{CloudCoverQuery, LessThan, StacAsset, StacItem, StacItemCollection, StacSearchParams};

//! Time-series algorithms
//!
//! - Smoothing: windowed mean over irregularly spaced acquisitions
//! - Composite: per-year per-pixel median of every index band

mod composite;
mod smoothing;

pub use composite::{Composite, composite, pixel_median};
pub use smoothing::{SmoothingParams, smooth, window_members};

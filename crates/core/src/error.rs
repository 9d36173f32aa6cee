//! Error types for terracomp

use thiserror::Error;

/// Main error type for raster, scene and region operations.
///
/// These are input errors: they surface when the failing operation is
/// built and abort the region they belong to. Numeric edge cases
/// (division by zero, empty windows) never show up here, they become
/// NaN no-data instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Band '{band}' missing from scene acquired {date}")]
    MissingBand { band: String, date: String },

    #[error("Band '{band}' is not on the scene grid: {reason}")]
    GridMismatch { band: String, reason: String },

    #[error("Scene acquired {0} has no quality bitmask")]
    MissingQuality(String),

    #[error("Invalid geometry for region '{region}': {reason}")]
    InvalidGeometry { region: String, reason: String },

    #[error("Region '{0}' is already a split product and cannot be split again")]
    AlreadySplit(String),

    #[error("Time series is empty")]
    EmptySeries,

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for terracomp core operations
pub type Result<T> = std::result::Result<T, Error>;

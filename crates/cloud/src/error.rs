//! Error types for STAC encoding and decoding.

use thiserror::Error;

/// Errors produced while talking STAC to the scene archive.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("item {item}: invalid datetime '{value}'")]
    InvalidDatetime { item: String, value: String },

    #[error("item {item}: missing datetime")]
    MissingDatetime { item: String },

    #[error("item {item}: missing asset for band {asset}")]
    MissingAsset { item: String, asset: String },

    #[error("core error: {0}")]
    Core(#[from] terracomp_core::Error),
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;

//! Error types for pipeline orchestration.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors of one pipeline run or one (region, year) unit of work.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("region '{0}' not found in the catalog")]
    UnknownRegion(String),

    #[error("regions {first:?} and {second:?} both export as '{sanitized}'")]
    NameCollision {
        first: String,
        second: String,
        sanitized: String,
    },

    #[error("export label '{0}' planned more than once")]
    DuplicateExport(String),

    #[error("execution engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("STAC error: {0}")]
    Cloud(#[from] terracomp_cloud::CloudError),

    #[error("{0}")]
    Core(#[from] terracomp_core::Error),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

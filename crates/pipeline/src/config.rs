//! Pipeline configuration.
//!
//! Every knob of a run lives in one immutable [`PipelineConfig`]: the
//! region list, the year and season ranges, archive filtering, smoothing,
//! the declarative split table and the export destination. All fields have
//! defaults, so a JSON override only needs the values it changes.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use terracomp_algorithms::temporal::SmoothingParams;
use terracomp_algorithms::vector::SplitParams;
use terracomp_core::{ArchiveQuery, CRS, Region, SplitAxis, SplitPolicy};

/// Errors that can occur during configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

/// A region that is always bisected, and along which axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OversizedRegion {
    pub name: String,
    pub axis: SplitAxis,
}

impl OversizedRegion {
    pub fn new(name: impl Into<String>, axis: SplitAxis) -> Self {
        Self { name: name.into(), axis }
    }
}

/// Export destination and materialization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Logical destination folder shared by every export
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Ground resolution in map units per pixel
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Ceiling on the number of pixels one export may produce
    #[serde(default = "default_max_pixels")]
    pub max_pixels: f64,
    /// Projected CRS of every export
    #[serde(default = "default_crs_epsg")]
    pub crs_epsg: u32,
}

fn default_folder() -> String {
    "Indices_Exports".to_string()
}

fn default_scale() -> f64 {
    10.0
}

fn default_max_pixels() -> f64 {
    1e13
}

fn default_crs_epsg() -> u32 {
    5070
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            scale: default_scale(),
            max_pixels: default_max_pixels(),
            crs_epsg: default_crs_epsg(),
        }
    }
}

impl ExportSettings {
    pub fn crs(&self) -> CRS {
        CRS::from_epsg(self.crs_epsg)
    }
}

/// Complete configuration of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Region names to look up in the catalog
    #[serde(default)]
    pub regions: Vec<String>,

    /// First processing year (inclusive)
    #[serde(default = "default_first_year")]
    pub first_year: i32,

    /// Last processing year (inclusive)
    #[serde(default = "default_last_year")]
    pub last_year: i32,

    /// First month of the seasonal window (1-12)
    #[serde(default = "default_season_start_month")]
    pub season_start_month: u32,

    /// Last month of the seasonal window, included through its last day
    #[serde(default = "default_season_end_month")]
    pub season_end_month: u32,

    /// Scene-level cloud cover ceiling in percent (exclusive)
    #[serde(default = "default_max_cloud_percent")]
    pub max_cloud_percent: f64,

    /// Temporal smoothing window in days
    #[serde(default = "default_smoothing_window_days")]
    pub smoothing_window_days: f64,

    /// Regions bisected before processing
    #[serde(default = "default_oversized")]
    pub oversized: Vec<OversizedRegion>,

    /// Boundary snapping tolerance of the splitter, in degrees
    #[serde(default = "default_split_tolerance")]
    pub split_tolerance: f64,

    /// Archive collection scenes are drawn from
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default)]
    pub export: ExportSettings,

    /// Process (region, year) pairs concurrently
    #[serde(default)]
    pub fan_out: bool,
}

fn default_first_year() -> i32 {
    2016
}

fn default_last_year() -> i32 {
    2024
}

fn default_season_start_month() -> u32 {
    5
}

fn default_season_end_month() -> u32 {
    10
}

fn default_max_cloud_percent() -> f64 {
    30.0
}

fn default_smoothing_window_days() -> f64 {
    20.0
}

fn default_oversized() -> Vec<OversizedRegion> {
    vec![
        OversizedRegion::new("California", SplitAxis::Latitude),
        OversizedRegion::new("Texas", SplitAxis::Longitude),
        OversizedRegion::new("Montana", SplitAxis::Longitude),
    ]
}

fn default_split_tolerance() -> f64 {
    1e-9
}

fn default_collection() -> String {
    "sentinel-2-l1c".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            first_year: default_first_year(),
            last_year: default_last_year(),
            season_start_month: default_season_start_month(),
            season_end_month: default_season_end_month(),
            max_cloud_percent: default_max_cloud_percent(),
            smoothing_window_days: default_smoothing_window_days(),
            oversized: default_oversized(),
            split_tolerance: default_split_tolerance(),
            collection: default_collection(),
            export: ExportSettings::default(),
            fan_out: false,
        }
    }
}

impl PipelineConfig {
    /// Default configuration over the given regions
    pub fn with_regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse a JSON document over the defaults and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_year > self.last_year {
            return Err(invalid(
                "first_year",
                format!("{} is after last_year {}", self.first_year, self.last_year),
            ));
        }
        for (key, month) in [
            ("season_start_month", self.season_start_month),
            ("season_end_month", self.season_end_month),
        ] {
            if !(1..=12).contains(&month) {
                return Err(invalid(key, format!("{month} is not a month")));
            }
        }
        if self.season_start_month > self.season_end_month {
            return Err(invalid(
                "season_start_month",
                "season must not wrap around the year end",
            ));
        }
        if !(self.max_cloud_percent > 0.0 && self.max_cloud_percent <= 100.0) {
            return Err(invalid("max_cloud_percent", "must be in (0, 100]"));
        }
        if !(self.smoothing_window_days.is_finite() && self.smoothing_window_days > 0.0) {
            return Err(invalid("smoothing_window_days", "must be a positive number of days"));
        }
        if !(self.split_tolerance.is_finite() && (0.0..1.0).contains(&self.split_tolerance)) {
            return Err(invalid("split_tolerance", "must be in [0, 1) degrees"));
        }
        if self.collection.is_empty() {
            return Err(ConfigError::MissingRequired("collection".into()));
        }
        if self.export.folder.is_empty() {
            return Err(ConfigError::MissingRequired("export.folder".into()));
        }
        if !(self.export.scale.is_finite() && self.export.scale > 0.0) {
            return Err(invalid("export.scale", "must be positive"));
        }
        if self.export.max_pixels.is_nan() || self.export.max_pixels < 1.0 {
            return Err(invalid("export.max_pixels", "must be at least one pixel"));
        }
        Ok(())
    }

    /// Processing years in increasing order
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// First and last day (inclusive) of the seasonal window in `year`
    pub fn season(&self, year: i32) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        let start = NaiveDate::from_ymd_opt(year, self.season_start_month, 1)
            .ok_or_else(|| invalid("season_start_month", format!("no such date in {year}")))?;
        let end = last_day_of_month(year, self.season_end_month)
            .ok_or_else(|| invalid("season_end_month", format!("no such date in {year}")))?;
        Ok((start, end))
    }

    /// Split policy for a region name, from the oversized table
    pub fn split_policy_for(&self, name: &str) -> SplitPolicy {
        self.oversized
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| SplitPolicy::split_along(entry.axis))
            .unwrap_or_else(SplitPolicy::keep)
    }

    /// Archive query covering `region` in the season of `year`
    pub fn archive_query(&self, region: &Region, year: i32) -> crate::Result<ArchiveQuery> {
        let (start, end) = self.season(year)?;
        Ok(ArchiveQuery {
            collection: self.collection.clone(),
            bbox: region.bounding_box()?,
            start,
            end,
            max_cloud_percent: self.max_cloud_percent,
        })
    }

    pub fn smoothing_params(&self) -> SmoothingParams {
        SmoothingParams {
            window_days: self.smoothing_window_days,
        }
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            tolerance: self.split_tolerance,
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

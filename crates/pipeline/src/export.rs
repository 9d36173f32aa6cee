//! Export planning.
//!
//! One export unit per (region, year, index). Labels follow a fixed
//! contract, `Indices_<INDEX>_<Region_Name>_<year>`, and every unit carries
//! the same destination folder, scale, pixel ceiling and projection.

use std::collections::{BTreeMap, HashSet};

use geo::MultiPolygon;

use terracomp_algorithms::imagery::SpectralIndex;
use terracomp_algorithms::temporal::Composite;
use terracomp_core::{CRS, Raster, Region};

use crate::config::ExportSettings;
use crate::error::{PipelineError, Result};

/// Region name as it appears in export labels: spaces become underscores
pub fn sanitize_region_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Destination label of one export unit
pub fn export_label(index: SpectralIndex, region_name: &str, year: i32) -> String {
    format!("Indices_{}_{}_{}", index.name(), sanitize_region_name(region_name), year)
}

/// Materialization request handed to the execution engine
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub raster: Raster<f32>,
    pub label: String,
    pub folder: String,
    /// Map units per pixel
    pub scale: f64,
    pub max_pixels: f64,
    /// Footprint the export is restricted to
    pub region: MultiPolygon<f64>,
    pub crs: CRS,
}

/// One (region, year, index) export with its request
#[derive(Debug, Clone, PartialEq)]
pub struct ExportUnit {
    pub region_name: String,
    pub year: i32,
    pub index: SpectralIndex,
    pub request: ExportRequest,
}

impl ExportUnit {
    pub fn label(&self) -> &str {
        &self.request.label
    }
}

/// Plan the export units of one composite, in [`SpectralIndex::ALL`] order.
///
/// Fails with `MissingBand` when the composite lacks an index layer.
pub fn plan_exports(composite: &Composite, region: &Region, settings: &ExportSettings) -> Result<Vec<ExportUnit>> {
    SpectralIndex::ALL
        .into_iter()
        .map(|index| -> Result<ExportUnit> {
            let raster = composite.layer(index).ok_or_else(|| terracomp_core::Error::MissingBand {
                band: index.name().to_string(),
                date: composite.year.to_string(),
            })?;
            Ok(ExportUnit {
                region_name: composite.region_name.clone(),
                year: composite.year,
                index,
                request: ExportRequest {
                    raster: raster.clone(),
                    label: export_label(index, &composite.region_name, composite.year),
                    folder: settings.folder.clone(),
                    scale: settings.scale,
                    max_pixels: settings.max_pixels,
                    region: region.geometry().clone(),
                    crs: settings.crs(),
                },
            })
        })
        .collect()
}

/// Reject region lists whose names collide once sanitized.
///
/// `"New York"` and `"New_York"` would write the same labels.
pub fn check_region_names<'a, I>(names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for name in names {
        let sanitized = sanitize_region_name(name);
        if let Some(first) = seen.get(&sanitized) {
            return Err(PipelineError::NameCollision {
                first: first.to_string(),
                second: name.to_string(),
                sanitized,
            });
        }
        seen.insert(sanitized, name);
    }
    Ok(())
}

/// Reject plans where two units share a label
pub fn check_unique_labels(units: &[ExportUnit]) -> Result<()> {
    let mut seen = HashSet::with_capacity(units.len());
    for unit in units {
        if !seen.insert(unit.label()) {
            return Err(PipelineError::DuplicateExport(unit.label().to_string()));
        }
    }
    Ok(())
}

//! Run orchestration.
//!
//! A run is planned first and submitted second. Planning loads and splits
//! the regions, then turns every (region, year) pair into eight export
//! units; it is deterministic and has no side effects beyond logging.
//! Submission hands the planned units to the execution engine.
//!
//! Each (region, year) pair depends only on its own inputs. A failing pair
//! is recorded and its siblings still complete.

use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use terracomp_algorithms::imagery::{augment, mask_scene};
use terracomp_algorithms::temporal::{composite, smooth};
use terracomp_algorithms::vector::split_region;
use terracomp_cloud::CloudError;
use terracomp_core::{Region, TimeSeries};

use crate::archive::SceneArchive;
use crate::catalog::{RegionCatalog, load_regions};
use crate::config::PipelineConfig;
use crate::engine::{ExecutionEngine, SubmitReport, submit_all};
use crate::error::{PipelineError, Result};
use crate::export::{ExportUnit, check_region_names, check_unique_labels, plan_exports};

/// Something that went wrong for one region, or one region in one year
#[derive(Debug)]
pub struct RunFailure {
    pub region: String,
    /// `None` when the region failed before any year was processed
    pub year: Option<i32>,
    pub error: PipelineError,
}

/// Every export unit of a run, plus what could not be planned
#[derive(Debug, Default)]
pub struct RunPlan {
    pub units: Vec<ExportUnit>,
    pub failures: Vec<RunFailure>,
}

/// Outcome of a planned and submitted run
#[derive(Debug, Default)]
pub struct RunReport {
    pub failures: Vec<RunFailure>,
    pub submission: SubmitReport,
}

/// Mask, augment, smooth and composite one region in one year, then plan
/// its eight exports.
pub fn process_region_year(
    region: &Region,
    year: i32,
    archive: &dyn SceneArchive,
    config: &PipelineConfig,
) -> Result<Vec<ExportUnit>> {
    let query = config.archive_query(region, year)?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let body = serde_json::to_string(&archive.search_request(&query)).map_err(CloudError::from)?;
        debug!(region = region.name(), year, search = %body, "archive search");
    }

    let raw = archive.query(&query)?;
    let prepared = raw
        .iter()
        .map(|scene| augment(&mask_scene(scene)?))
        .collect::<terracomp_core::Result<Vec<_>>>()?;
    let smoothed = smooth(&TimeSeries::new(prepared), config.smoothing_params())?;
    let composite = composite(&smoothed, region, year)?;

    info!(region = region.name(), year, scenes = raw.len(), "composited region-year");
    plan_exports(&composite, region, &config.export)
}

/// Plan a whole run: load and split the configured regions, then process
/// every (sub-region, year) pair.
///
/// # Errors
/// Only run-wide problems fail the run: an invalid config, sub-region
/// names that collide in export labels, or duplicate labels in the plan.
/// Per-region and per-year problems are listed in [`RunPlan::failures`].
pub fn plan_run(catalog: &dyn RegionCatalog, archive: &dyn SceneArchive, config: &PipelineConfig) -> Result<RunPlan> {
    config.validate()?;
    let mut plan = RunPlan::default();

    let loaded = load_regions(catalog, config);
    plan.failures.extend(loaded.failures.into_iter().map(|(region, error)| RunFailure {
        region,
        year: None,
        error,
    }));

    let split_params = config.split_params();
    let mut targets = Vec::new();
    for region in &loaded.regions {
        match split_region(region, &split_params) {
            Ok(parts) => targets.extend(parts.into_iter().map(|(sub, _)| sub)),
            Err(err) => {
                warn!(region = region.name(), error = %err, "region not split");
                plan.failures.push(RunFailure {
                    region: region.name().to_string(),
                    year: None,
                    error: err.into(),
                });
            }
        }
    }
    check_region_names(targets.iter().map(|r| r.name()))?;

    let jobs: Vec<(&Region, i32)> = targets
        .iter()
        .flat_map(|region| config.years().map(move |year| (region, year)))
        .collect();
    info!(regions = targets.len(), jobs = jobs.len(), "planning run");

    for ((region, year), outcome) in jobs.iter().zip(run_jobs(&jobs, archive, config)) {
        match outcome {
            Ok(units) => plan.units.extend(units),
            Err(error) => {
                warn!(region = region.name(), year, error = %error, "region-year failed");
                plan.failures.push(RunFailure {
                    region: region.name().to_string(),
                    year: Some(*year),
                    error,
                });
            }
        }
    }

    check_unique_labels(&plan.units)?;
    Ok(plan)
}

fn run_jobs(jobs: &[(&Region, i32)], archive: &dyn SceneArchive, config: &PipelineConfig) -> Vec<Result<Vec<ExportUnit>>> {
    #[cfg(feature = "parallel")]
    if config.fan_out {
        return jobs
            .par_iter()
            .map(|&(region, year)| process_region_year(region, year, archive, config))
            .collect();
    }

    jobs.iter()
        .map(|&(region, year)| process_region_year(region, year, archive, config))
        .collect()
}

/// Plan a run and submit every planned unit.
///
/// Returning means every unit was handed off or recorded as a failure. It
/// says nothing about whether the exports themselves succeed.
pub fn run(
    catalog: &dyn RegionCatalog,
    archive: &dyn SceneArchive,
    engine: &dyn ExecutionEngine,
    config: &PipelineConfig,
) -> Result<RunReport> {
    let plan = plan_run(catalog, archive, config)?;
    let submission = submit_all(engine, plan.units);
    info!(
        submitted = submission.submitted_count(),
        failed = plan.failures.len() + submission.failures.len(),
        "run submitted"
    );
    Ok(RunReport {
        failures: plan.failures,
        submission,
    })
}

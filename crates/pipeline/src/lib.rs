//! # Terracomp Pipeline
//!
//! Multi-year, multi-index composites per region.
//!
//! For every configured region (bisected first when its split policy says
//! so) and every processing year, the seasonal scenes are cloud masked,
//! augmented with eight spectral indices, smoothed in time and reduced to a
//! per-pixel median composite. Each (region, year, index) becomes one
//! export unit handed to the execution engine.
//!
//! ```no_run
//! use terracomp_pipeline::{ChannelEngine, InMemoryArchive, InMemoryCatalog, PipelineConfig, run};
//!
//! let config = PipelineConfig::with_regions(["New York"]);
//! let (engine, requests) = ChannelEngine::unbounded();
//! let report = run(&InMemoryCatalog::new(), &InMemoryArchive::new(), &engine, &config)?;
//! for request in requests.try_iter() {
//!     println!("{}", request.label);
//! }
//! # let _ = report;
//! # Ok::<(), terracomp_pipeline::PipelineError>(())
//! ```

pub mod archive;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod pipeline;

pub use archive::{ArchivedScene, InMemoryArchive, SceneArchive};
pub use catalog::{InMemoryCatalog, LoadedRegions, RegionCatalog, load_regions};
pub use config::{ConfigError, ExportSettings, OversizedRegion, PipelineConfig};
pub use engine::{ChannelEngine, ExecutionEngine, SubmitReport, submit_all};
pub use error::{PipelineError, Result};
pub use export::{
    ExportRequest, ExportUnit, check_region_names, check_unique_labels, export_label, plan_exports,
    sanitize_region_name,
};
pub use pipeline::{RunFailure, RunPlan, RunReport, plan_run, process_region_year, run};

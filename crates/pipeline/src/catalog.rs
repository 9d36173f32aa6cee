//! Region catalog collaborator.
//!
//! The catalog maps region names to geometries. Loading resolves each
//! configured name once and attaches the split policy from the config, so
//! nothing downstream compares region names to decide whether to split.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use tracing::{info, warn};

use terracomp_core::Region;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Source of region geometries
pub trait RegionCatalog: Send + Sync {
    /// Geometry of a named region, `None` when the catalog has no such name
    fn geometry(&self, name: &str) -> Option<MultiPolygon<f64>>;
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    regions: BTreeMap<String, MultiPolygon<f64>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, geometry: MultiPolygon<f64>) {
        self.regions.insert(name.into(), geometry);
    }

    pub fn with_region(mut self, name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        self.insert(name, geometry);
        self
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionCatalog for InMemoryCatalog {
    fn geometry(&self, name: &str) -> Option<MultiPolygon<f64>> {
        self.regions.get(name).cloned()
    }
}

/// Result of resolving the configured region names
#[derive(Debug, Default)]
pub struct LoadedRegions {
    /// Regions in configuration order, split policy attached
    pub regions: Vec<Region>,
    /// Names that could not be loaded, with the reason
    pub failures: Vec<(String, PipelineError)>,
}

/// Resolve every configured region name against the catalog.
///
/// A missing name or an invalid geometry fails that region only; the
/// others still load.
pub fn load_regions(catalog: &dyn RegionCatalog, config: &PipelineConfig) -> LoadedRegions {
    let mut loaded = LoadedRegions::default();

    for name in &config.regions {
        let region = catalog
            .geometry(name)
            .ok_or_else(|| PipelineError::UnknownRegion(name.clone()))
            .and_then(|geometry| Region::new(name.as_str(), geometry).map_err(PipelineError::from));

        match region {
            Ok(region) => {
                let policy = config.split_policy_for(name);
                info!(region = %name, needs_split = policy.needs_split, "loaded region");
                loaded.regions.push(region.with_policy(policy));
            }
            Err(err) => {
                warn!(region = %name, error = %err, "region not loaded");
                loaded.failures.push((name.clone(), err));
            }
        }
    }
    loaded
}

//! Scene archive collaborator.
//!
//! The archive answers an [`ArchiveQuery`] with the raw scenes over a
//! region's bounding box in one season. Spatial, temporal and scene-level
//! cloud filtering happen on the archive side.

use terracomp_cloud::StacSearchParams;
use terracomp_core::{ArchiveQuery, BoundingBox, Scene, TimeSeries};
use tracing::debug;

use crate::error::Result;

/// Source of raw multi-band scenes
pub trait SceneArchive: Send + Sync {
    /// Scenes matching `query`, in acquisition order
    fn query(&self, query: &ArchiveQuery) -> Result<TimeSeries>;

    /// STAC Item Search body equivalent to `query`
    fn search_request(&self, query: &ArchiveQuery) -> StacSearchParams {
        StacSearchParams::from(query)
    }
}

/// One archived scene with the metadata the archive filters on
#[derive(Debug, Clone)]
pub struct ArchivedScene {
    pub collection: String,
    pub footprint: BoundingBox,
    pub cloud_percent: f64,
    pub scene: Scene,
}

/// Archive held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    scenes: Vec<ArchivedScene>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scene: ArchivedScene) {
        self.scenes.push(scene);
    }

    pub fn with_scene(mut self, scene: ArchivedScene) -> Self {
        self.push(scene);
        self
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl SceneArchive for InMemoryArchive {
    fn query(&self, query: &ArchiveQuery) -> Result<TimeSeries> {
        let matched: TimeSeries = self
            .scenes
            .iter()
            .filter(|s| s.collection == query.collection)
            .filter(|s| s.footprint.intersects(&query.bbox))
            .filter(|s| query.covers_date(s.scene.date()))
            .filter(|s| query.accepts_cloud_cover(s.cloud_percent))
            .map(|s| s.scene.clone())
            .collect();
        debug!(
            collection = %query.collection,
            start = %query.start,
            end = %query.end,
            matched = matched.len(),
            "archive query"
        );
        Ok(matched)
    }
}

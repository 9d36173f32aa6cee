//! Append the derived index bands to a scene

use crate::imagery::indices::{SpectralIndex, compute_index};
use crate::maybe_rayon::*;
use terracomp_core::scene::Scene;
use terracomp_core::Result;

/// Return a copy of `scene` with one extra band per [`SpectralIndex`],
/// named after the index (`"NDVI"`, `"EVI"`, ...).
///
/// The input bands are copied through unchanged. The eight formulas are
/// independent and are evaluated concurrently.
pub fn augment(scene: &Scene) -> Result<Scene> {
    let computed: Vec<(SpectralIndex, _)> = SpectralIndex::ALL
        .into_par_iter()
        .map(|index| compute_index(index, scene).map(|raster| (index, raster)))
        .collect::<Result<Vec<_>>>()?;

    let mut augmented = scene.clone();
    for (index, raster) in computed {
        augmented.insert_band(index.name(), raster)?;
    }
    Ok(augmented)
}

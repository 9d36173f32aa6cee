//! Yearly median composites
//!
//! One composite per (region, year): for every spectral index, the
//! per-pixel median across the smoothed series, clipped to the region and
//! cast to `f32`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::imagery::SpectralIndex;
use crate::maybe_rayon::*;
use crate::vector::clip_to_region;
use terracomp_core::raster::Raster;
use terracomp_core::scene::TimeSeries;
use terracomp_core::vector::Region;
use terracomp_core::{Error, Result};

/// Per-index median rasters of one region and year
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub region_name: String,
    pub year: i32,
    pub layers: BTreeMap<SpectralIndex, Raster<f32>>,
}

impl Composite {
    /// Layer of one index
    pub fn layer(&self, index: SpectralIndex) -> Option<&Raster<f32>> {
        self.layers.get(&index)
    }
}

/// Reduce a smoothed series to a clipped single-precision median composite.
///
/// Every scene must carry all eight index bands. NaN contributions are
/// ignored by the median; a pixel with no valid value stays NaN, as does
/// every pixel outside the region.
///
/// # Errors
/// `EmptySeries` for an empty series, `MissingBand` when a scene lacks an
/// index band, `SizeMismatch` when scenes are on different grids.
pub fn composite(series: &TimeSeries, region: &Region, year: i32) -> Result<Composite> {
    if series.is_empty() {
        return Err(Error::EmptySeries);
    }
    debug!(region = region.name(), year, scenes = series.len(), "compositing");

    let layers = SpectralIndex::ALL
        .into_par_iter()
        .map(|index| -> Result<(SpectralIndex, Raster<f32>)> {
            let stack = series
                .iter()
                .map(|scene| scene.band(index.name()))
                .collect::<Result<Vec<_>>>()?;
            let median = pixel_median(&stack)?;
            let clipped = clip_to_region(&median, region)?;
            Ok((index, clipped.cast::<f32>()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Composite {
        region_name: region.name().to_string(),
        year,
        layers: layers.into_iter().collect(),
    })
}

/// Per-pixel median of the valid values across `layers`.
///
/// With an even number of valid values the median is the mean of the two
/// middle ones. The result does not depend on the order of `layers`.
pub fn pixel_median(layers: &[&Raster<f64>]) -> Result<Raster<f64>> {
    let first = layers.first().ok_or(Error::EmptySeries)?;
    for layer in &layers[1..] {
        first.check_same_shape(*layer)?;
    }

    let (rows, cols) = first.shape();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut values = Vec::with_capacity(layers.len());
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                values.clear();
                for layer in layers {
                    // SAFETY: row < rows and col < cols, shapes checked above
                    let v = unsafe { layer.get_unchecked(row, col) };
                    if !layer.is_nodata(v) {
                        values.push(v);
                    }
                }
                *out = median_of(&mut values);
            }
            row_data
        })
        .collect();

    let mut output = first.like_from_vec(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

fn median_of(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

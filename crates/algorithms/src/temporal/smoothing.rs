//! Temporal smoothing over an irregularly sampled series
//!
//! For each scene acquired at `t`, every scene of the series acquired in
//! `[t - W/2, t + W/2]` (inclusive, fractional days) is averaged per pixel
//! into one resampled scene stamped `t`. The output has one scene per
//! input scene.
//!
//! Because the series is ordered, window bounds only move forward as `t`
//! advances, so membership is found with two cursors instead of a full
//! scan per scene. The mean itself is taken directly over the members.

use std::ops::Range;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::maybe_rayon::*;
use terracomp_core::raster::Raster;
use terracomp_core::scene::{Scene, TimeSeries};
use terracomp_core::{Error, Result};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parameters for temporal smoothing
#[derive(Debug, Clone, Copy)]
pub struct SmoothingParams {
    /// Full window width in days. The half-width is `window_days / 2`,
    /// without rounding.
    pub window_days: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self { window_days: 20.0 }
    }
}

/// Index range of the scenes inside each scene's window.
///
/// `result[i]` covers exactly the scenes whose acquisition time lies within
/// `window_days / 2` of scene `i`. Every range contains `i` itself.
pub fn window_members(timestamps: &[DateTime<Utc>], window_days: f64) -> Vec<Range<usize>> {
    let half_ms = window_days / 2.0 * MILLIS_PER_DAY;
    let offset_ms = |from: DateTime<Utc>, to: DateTime<Utc>| (to - from).num_milliseconds() as f64;

    let mut ranges = Vec::with_capacity(timestamps.len());
    let mut lo = 0;
    let mut hi = 0;

    for (i, &center) in timestamps.iter().enumerate() {
        while offset_ms(timestamps[lo], center) > half_ms {
            lo += 1;
        }
        hi = hi.max(i + 1);
        while hi < timestamps.len() && offset_ms(center, timestamps[hi]) <= half_ms {
            hi += 1;
        }
        ranges.push(lo..hi);
    }
    ranges
}

/// Smooth a time series with a centered moving-window mean.
///
/// Every band of each anchor scene is averaged over the window members.
/// Masked (NaN) contributions are skipped; a pixel with no valid member
/// value is NaN. An empty series smooths to an empty series. Output scenes
/// carry the anchor's acquisition time and no quality band.
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite window, `MissingBand`
/// when a window member lacks a band its anchor has, `SizeMismatch` when
/// members are on different grids.
pub fn smooth(series: &TimeSeries, params: SmoothingParams) -> Result<TimeSeries> {
    if !params.window_days.is_finite() || params.window_days < 0.0 {
        return Err(Error::InvalidParameter {
            name: "window_days",
            value: params.window_days.to_string(),
            reason: "must be a finite, non-negative number of days".into(),
        });
    }

    let scenes = series.scenes();
    let windows = window_members(&series.timestamps(), params.window_days);
    debug!(
        scenes = scenes.len(),
        window_days = params.window_days,
        "smoothing time series"
    );

    let smoothed = windows
        .par_iter()
        .enumerate()
        .map(|(i, members)| resample_at(&scenes[i], &scenes[members.clone()]))
        .collect::<Result<Vec<_>>>()?;

    Ok(TimeSeries::new(smoothed))
}

fn resample_at(anchor: &Scene, members: &[Scene]) -> Result<Scene> {
    let mut out = Scene::resampled(anchor.acquired());
    for name in anchor.band_names() {
        let layers = members
            .iter()
            .map(|scene| scene.band(name))
            .collect::<Result<Vec<_>>>()?;
        out.insert_band(name, pixel_mean(&layers)?)?;
    }
    Ok(out)
}

/// Per-pixel mean of the valid values across `layers`
fn pixel_mean(layers: &[&Raster<f64>]) -> Result<Raster<f64>> {
    let first = layers
        .first()
        .ok_or_else(|| Error::Algorithm("pixel mean of zero layers".into()))?;
    for layer in &layers[1..] {
        first.check_same_shape(*layer)?;
    }

    let (rows, cols) = first.shape();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut count = 0usize;
                for layer in layers {
                    // SAFETY: row < rows and col < cols, shapes checked above
                    let v = unsafe { layer.get_unchecked(row, col) };
                    if !layer.is_nodata(v) {
                        sum += v;
                        count += 1;
                    }
                }
                if count > 0 {
                    *out = sum / count as f64;
                }
            }
            row_data
        })
        .collect();

    let mut output = first.like_from_vec(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

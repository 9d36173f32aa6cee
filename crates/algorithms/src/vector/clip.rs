//! Clipping rasters to region geometry
//!
//! A cell is kept when its center lies inside the geometry or on its
//! boundary. Every other cell becomes NaN, as does every cell that was
//! already no-data. Clipping to a [`Region`] uses its own membership rule,
//! under which the two halves of a split region never share a cell.

use geo::{Intersects, MultiPolygon, Point};

use crate::maybe_rayon::*;
use terracomp_core::Result;
use terracomp_core::raster::Raster;
use terracomp_core::vector::{BoundingBox, Region};

/// Set every cell whose center falls outside `geometry` to NaN.
///
/// The output keeps the input's grid, transform and CRS. An empty geometry
/// masks the whole raster.
pub fn clip_to_geometry(raster: &Raster<f64>, geometry: &MultiPolygon<f64>) -> Result<Raster<f64>> {
    clip_where(raster, BoundingBox::of(geometry), |x, y| {
        geometry.intersects(&Point::new(x, y))
    })
}

/// Set every cell whose center is not in `region` to NaN.
///
/// Membership follows [`Region::contains_point`], so the two halves of a
/// split region never both keep a cell.
pub fn clip_to_region(raster: &Raster<f64>, region: &Region) -> Result<Raster<f64>> {
    let footprint = region.parent_geometry().unwrap_or(region.geometry());
    clip_where(raster, BoundingBox::of(footprint), |x, y| region.contains_point(x, y))
}

fn clip_where<F>(raster: &Raster<f64>, bbox: Option<BoundingBox>, inside: F) -> Result<Raster<f64>>
where
    F: Fn(f64, f64) -> bool + Sync + Send,
{
    let (rows, cols) = raster.shape();
    let Some(bbox) = bbox else {
        return Ok(raster.map(|_| f64::NAN));
    };

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let (x, y) = raster.pixel_to_geo(col, row);
                if bbox.contains_point(x, y) && inside(x, y) {
                    // SAFETY: row < rows and col < cols
                    let v = unsafe { raster.get_unchecked(row, col) };
                    if !raster.is_nodata(v) {
                        *out = v;
                    }
                }
            }
            row_data
        })
        .collect();

    let mut output = raster.like_from_vec(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

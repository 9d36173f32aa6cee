//! Quality-bitmask cloud masking
//!
//! A pixel is clear when neither the opaque-cloud bit (10) nor the cirrus
//! bit (11) of the quality band is set. Masked pixels become NaN in every
//! reflectance band; they are never zeroed.

use crate::maybe_rayon::*;
use terracomp_core::raster::Raster;
use terracomp_core::scene::Scene;
use terracomp_core::Result;

/// Quality bit flagging opaque clouds
pub const CLOUD_BIT: u16 = 10;
/// Quality bit flagging cirrus
pub const CIRRUS_BIT: u16 = 11;

const CLOUD_OR_CIRRUS: u16 = (1 << CLOUD_BIT) | (1 << CIRRUS_BIT);

/// Whether a quality value marks a clear pixel
#[inline]
pub fn is_clear(qa: u16) -> bool {
    qa & CLOUD_OR_CIRRUS == 0
}

/// Per-pixel validity from a quality bitmask: 1 = clear, 0 = masked.
///
/// Quality pixels equal to the band's no-data sentinel are masked too.
pub fn validity_mask(quality: &Raster<u16>) -> Raster<u8> {
    let nodata = quality.nodata();
    quality.map(|qa| {
        if nodata == Some(qa) || !is_clear(qa) {
            0
        } else {
            1
        }
    })
}

/// Set every masked pixel of `band` to NaN.
///
/// The output's no-data is NaN. Cells holding the band's own no-data
/// sentinel become NaN as well, whatever their quality value.
///
/// # Arguments
/// * `band` - Reflectance band
/// * `mask` - Validity mask from [`validity_mask`], same shape as `band`
pub fn apply_mask(band: &Raster<f64>, mask: &Raster<u8>) -> Result<Raster<f64>> {
    band.check_same_shape(mask)?;

    let (rows, cols) = band.shape();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                // SAFETY: row < rows and col < cols, shapes checked above
                let valid = unsafe { mask.get_unchecked(row, col) } != 0;
                if !valid {
                    continue;
                }
                let v = unsafe { band.get_unchecked(row, col) };
                if !band.is_nodata(v) {
                    *out = v;
                }
            }
            row_data
        })
        .collect();

    let mut output = band.like_from_vec(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Mask cloudy and cirrus pixels in every band of a scene.
///
/// The quality band itself is carried over untouched. Fails only when the
/// scene has no quality band or a band is off the scene grid.
pub fn mask_scene(scene: &Scene) -> Result<Scene> {
    let quality = scene.quality()?;
    let mask = validity_mask(quality);

    let mut masked = Scene::new(scene.acquired(), quality.clone());
    for (name, band) in scene.bands() {
        masked.insert_band(name, apply_mask(band, &mask)?)?;
    }
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::augment;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use terracomp_core::{Error, GeoTransform, RawBand};

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    fn quality(values: Vec<u16>, rows: usize, cols: usize) -> Raster<u16> {
        let mut r = Raster::from_vec(values, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_is_clear_bits() {
        assert!(is_clear(0));
        assert!(is_clear(1 << 9));
        assert!(is_clear(1 << 12));
        assert!(!is_clear(1 << 10));
        assert!(!is_clear(1 << 11));
        assert!(!is_clear((1 << 10) | (1 << 11)));
    }

    #[test]
    fn test_validity_mask() {
        let qa = quality(vec![0, 1024, 2048, 3072, 512, 0], 2, 3);
        let mask = validity_mask(&qa);
        let got: Vec<u8> = mask.data().iter().copied().collect();
        assert_eq!(got, vec![1, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_quality_nodata_is_masked() {
        let mut qa = quality(vec![0, 65535], 1, 2);
        qa.set_nodata(Some(65535));
        let mask = validity_mask(&qa);
        assert_eq!(mask.get(0, 0).unwrap(), 1);
        assert_eq!(mask.get(0, 1).unwrap(), 0);
    }

    #[test]
    fn test_mask_scene_sets_nan_not_zero() {
        let acquired = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let scene = Scene::new(acquired, quality(vec![0, 1024, 2048, 0], 2, 2))
            .with_band("B4", make_band(2, 2, 0.2))
            .unwrap()
            .with_band("B8", make_band(2, 2, 0.6))
            .unwrap();

        let masked = mask_scene(&scene).unwrap();
        for name in ["B4", "B8"] {
            let band = masked.band(name).unwrap();
            assert!(!band.get(0, 0).unwrap().is_nan());
            assert!(band.get(0, 1).unwrap().is_nan());
            assert!(band.get(1, 0).unwrap().is_nan());
            assert!(!band.get(1, 1).unwrap().is_nan());
        }
        assert_eq!(masked.quality().unwrap(), scene.quality().unwrap());
        assert_eq!(masked.acquired(), acquired);
    }

    #[test]
    fn test_band_nodata_survives_masking() {
        let acquired = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let mut red = make_band(2, 2, 0.1);
        red.set_nodata(Some(-9999.0));
        red.set(0, 0, -9999.0).unwrap();
        let mut scene = Scene::new(acquired, quality(vec![0; 4], 2, 2));
        for band in RawBand::ALL {
            let raster = if band == RawBand::Red { red.clone() } else { make_band(2, 2, 0.3) };
            scene.insert_band(band.name(), raster).unwrap();
        }

        let masked = mask_scene(&scene).unwrap();
        let masked_red = masked.raw(RawBand::Red).unwrap();
        assert!(masked_red.get(0, 0).unwrap().is_nan());
        assert_eq!(masked_red.get(1, 1).unwrap(), 0.1);
        assert_eq!(masked_red.valid_count(), 3);

        let ndvi = augment(&masked).unwrap();
        let ndvi = ndvi.band("NDVI").unwrap();
        assert!(ndvi.get(0, 0).unwrap().is_nan());
        assert!((ndvi.get(1, 1).unwrap() - 0.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_flagged_pixels_are_never_valid(qa in prop::collection::vec(any::<u16>(), 16)) {
            let acquired = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
            let scene = Scene::new(acquired, quality(qa.clone(), 4, 4))
                .with_band("B8", make_band(4, 4, 0.4))
                .unwrap();

            let masked = mask_scene(&scene).unwrap();
            let band = masked.band("B8").unwrap();
            for (flags, v) in qa.iter().zip(band.data().iter()) {
                let flagged = flags & ((1 << CLOUD_BIT) | (1 << CIRRUS_BIT)) != 0;
                prop_assert_eq!(v.is_nan(), flagged);
            }
        }
    }

    #[test]
    fn test_mask_scene_requires_quality() {
        let acquired = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let scene = Scene::resampled(acquired).with_band("B4", make_band(2, 2, 0.2)).unwrap();
        assert!(matches!(mask_scene(&scene), Err(Error::MissingQuality(_))));
    }
}

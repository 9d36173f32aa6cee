//! Scenes and time series
//!
//! A [`Scene`] is one multi-band acquisition: named `f64` reflectance
//! bands on a shared grid plus the `u16` quality bitmask the cloud mask
//! reads. A [`TimeSeries`] is an acquisition-ordered list of scenes for
//! one region and one processing window.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::crs::CRS;
use crate::raster::{GeoTransform, Raster};

/// Name of the quality bitmask band
pub const QUALITY_BAND: &str = "QA60";

/// Raw reflectance bands the index formulas read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawBand {
    Blue,
    Green,
    Red,
    Nir,
    /// Shortwave infrared, ~1.6 µm
    Swir1,
    /// Shortwave infrared, ~2.2 µm
    Swir2,
}

impl RawBand {
    pub const ALL: [RawBand; 6] = [
        RawBand::Blue,
        RawBand::Green,
        RawBand::Red,
        RawBand::Nir,
        RawBand::Swir1,
        RawBand::Swir2,
    ];

    /// Archive band name (Sentinel-2 MSI numbering)
    pub fn name(&self) -> &'static str {
        match self {
            RawBand::Blue => "B2",
            RawBand::Green => "B3",
            RawBand::Red => "B4",
            RawBand::Nir => "B8",
            RawBand::Swir1 => "B11",
            RawBand::Swir2 => "B12",
        }
    }
}

impl fmt::Display for RawBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One multi-band acquisition.
///
/// Every band shares the grid (shape, transform and CRS) of the first
/// raster added, the quality band when present. Resampled scenes produced by smoothing carry no quality
/// band.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    acquired: DateTime<Utc>,
    bands: BTreeMap<String, Raster<f64>>,
    quality: Option<Raster<u16>>,
}

impl Scene {
    /// Create a raw scene from its quality bitmask
    pub fn new(acquired: DateTime<Utc>, quality: Raster<u16>) -> Self {
        Self {
            acquired,
            bands: BTreeMap::new(),
            quality: Some(quality),
        }
    }

    /// Create a scene with no quality band
    pub fn resampled(acquired: DateTime<Utc>) -> Self {
        Self {
            acquired,
            bands: BTreeMap::new(),
            quality: None,
        }
    }

    /// Builder form of [`Scene::insert_band`]
    pub fn with_band(mut self, name: impl Into<String>, raster: Raster<f64>) -> Result<Self> {
        self.insert_band(name, raster)?;
        Ok(self)
    }

    /// Add or replace a band.
    ///
    /// Fails with `SizeMismatch` when the raster has another shape and with
    /// `GridMismatch` when it has another transform or CRS.
    pub fn insert_band(&mut self, name: impl Into<String>, raster: Raster<f64>) -> Result<()> {
        let name = name.into();
        if let Some(((rows, cols), transform, crs)) = self.grid() {
            if raster.shape() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: raster.rows(),
                    ac: raster.cols(),
                });
            }
            if *raster.transform() != transform {
                return Err(Error::GridMismatch {
                    band: name,
                    reason: format!("transform {:?}, scene has {:?}", raster.transform(), transform),
                });
            }
            if let (Some(expected), Some(actual)) = (crs, raster.crs())
                && *actual != expected
            {
                return Err(Error::GridMismatch {
                    band: name,
                    reason: format!("CRS {actual}, scene has {expected}"),
                });
            }
        }
        self.bands.insert(name, raster);
        Ok(())
    }

    pub fn acquired(&self) -> DateTime<Utc> {
        self.acquired
    }

    /// Acquisition calendar date (UTC)
    pub fn date(&self) -> NaiveDate {
        self.acquired.date_naive()
    }

    /// Look up a band by name
    pub fn band(&self, name: &str) -> Result<&Raster<f64>> {
        self.bands.get(name).ok_or_else(|| Error::MissingBand {
            band: name.to_string(),
            date: self.date().to_string(),
        })
    }

    /// Look up a raw reflectance band
    pub fn raw(&self, band: RawBand) -> Result<&Raster<f64>> {
        self.band(band.name())
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.bands.contains_key(name)
    }

    /// Band names in sorted order
    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    pub fn bands(&self) -> impl Iterator<Item = (&str, &Raster<f64>)> {
        self.bands.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// The quality bitmask
    pub fn quality(&self) -> Result<&Raster<u16>> {
        self.quality
            .as_ref()
            .ok_or_else(|| Error::MissingQuality(self.date().to_string()))
    }

    /// Grid shape shared by every band, if the scene has any raster
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.grid().map(|(shape, _, _)| shape)
    }

    fn grid(&self) -> Option<((usize, usize), GeoTransform, Option<CRS>)> {
        match &self.quality {
            Some(q) => Some((q.shape(), *q.transform(), q.crs().copied())),
            None => self
                .bands
                .values()
                .next()
                .map(|b| (b.shape(), *b.transform(), b.crs().copied())),
        }
    }
}

/// Acquisition-ordered scenes for one region and processing window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    scenes: Vec<Scene>,
}

impl TimeSeries {
    /// Build a series, ordering scenes by acquisition time.
    ///
    /// The sort is stable: scenes acquired at the same instant keep their
    /// relative input order.
    pub fn new(mut scenes: Vec<Scene>) -> Self {
        scenes.sort_by_key(Scene::acquired);
        Self { scenes }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scene> {
        self.scenes.iter()
    }

    /// Acquisition timestamps in series order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.scenes.iter().map(Scene::acquired).collect()
    }

    pub fn into_scenes(self) -> Vec<Scene> {
        self.scenes
    }
}

impl FromIterator<Scene> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Scene>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Scene;
    type IntoIter = std::slice::Iter<'a, Scene>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, day, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_band_lookup() {
        let scene = Scene::new(at(1), Raster::new(2, 2))
            .with_band(RawBand::Red.name(), Raster::filled(2, 2, 0.1))
            .unwrap();

        assert!(scene.raw(RawBand::Red).is_ok());
        match scene.raw(RawBand::Nir) {
            Err(Error::MissingBand { band, date }) => {
                assert_eq!(band, "B8");
                assert_eq!(date, "2021-06-01");
            }
            other => panic!("expected MissingBand, got {:?}", other),
        }
    }

    #[test]
    fn test_band_grid_must_match() {
        let mut scene = Scene::new(at(1), Raster::new(2, 2));
        let err = scene.insert_band("B4", Raster::filled(3, 2, 0.1));
        assert!(matches!(err, Err(Error::SizeMismatch { .. })));
        assert_eq!(scene.band_count(), 0);
    }

    #[test]
    fn test_band_transform_must_match() {
        let mut a = Raster::filled(2, 2, 0.1);
        a.set_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0));
        let mut b = Raster::filled(2, 2, 0.4);
        b.set_transform(GeoTransform::new(500.0, 900.0, 1.0, -1.0));

        let scene = Scene::resampled(at(1)).with_band("B4", a.clone()).unwrap();
        let err = scene.clone().with_band("B8", b);
        assert!(matches!(err, Err(Error::GridMismatch { band, .. }) if band == "B8"));
        assert!(scene.with_band("B8", a).is_ok());
    }

    #[test]
    fn test_band_crs_must_match() {
        let mut quality = Raster::<u16>::new(2, 2);
        quality.set_crs(Some(CRS::from_epsg(32618)));
        let mut utm = Raster::filled(2, 2, 0.2);
        utm.set_crs(Some(CRS::from_epsg(32618)));
        let mut albers = utm.clone();
        albers.set_crs(Some(CRS::conus_albers()));

        let mut scene = Scene::new(at(1), quality);
        scene.insert_band("B4", utm).unwrap();
        let err = scene.insert_band("B8", albers);
        assert!(matches!(err, Err(Error::GridMismatch { .. })));
        assert_eq!(scene.band_count(), 1);
    }

    #[test]
    fn test_resampled_has_no_quality() {
        let scene = Scene::resampled(at(3));
        assert!(matches!(scene.quality(), Err(Error::MissingQuality(_))));
        assert_eq!(scene.shape(), None);
    }

    #[test]
    fn test_series_sorted_by_acquisition() {
        let series = TimeSeries::new(vec![
            Scene::resampled(at(20)),
            Scene::resampled(at(2)),
            Scene::resampled(at(11)),
        ]);
        assert_eq!(series.timestamps(), vec![at(2), at(11), at(20)]);
    }

    #[test]
    fn test_raw_band_names() {
        let names: Vec<&str> = RawBand::ALL.iter().map(RawBand::name).collect();
        assert_eq!(names, ["B2", "B3", "B4", "B8", "B11", "B12"]);
    }
}

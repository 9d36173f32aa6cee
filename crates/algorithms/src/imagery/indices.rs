//! Spectral indices
//!
//! The eight land-surface indices derived for every scene. All operate on
//! single-band `f64` rasters; no-data in any input band, or a zero
//! denominator, yields NaN at that pixel rather than an error.

use std::fmt;
use std::str::FromStr;

use crate::maybe_rayon::*;
use terracomp_core::raster::Raster;
use terracomp_core::scene::{RawBand, Scene};
use terracomp_core::{Error, Result};

/// The derived bands appended to every scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    NDVI,
    /// Enhanced Vegetation Index
    EVI,
    /// Soil Adjusted Vegetation Index
    SAVI,
    /// Normalized Difference Water Index (McFeeters)
    NDWI,
    /// Bare Soil Index
    BSI,
    /// Normalized Difference Built-up Index
    NDBI,
    /// Modified NDWI (Xu, uses SWIR1)
    MNDWI,
    /// Normalized Burn Ratio
    NBR,
}

impl SpectralIndex {
    /// Every index, in export order
    pub const ALL: [SpectralIndex; 8] = [
        SpectralIndex::NDVI,
        SpectralIndex::EVI,
        SpectralIndex::SAVI,
        SpectralIndex::NDWI,
        SpectralIndex::BSI,
        SpectralIndex::NDBI,
        SpectralIndex::MNDWI,
        SpectralIndex::NBR,
    ];

    /// Band name used in scenes, composites and export labels
    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::NDVI => "NDVI",
            SpectralIndex::EVI => "EVI",
            SpectralIndex::SAVI => "SAVI",
            SpectralIndex::NDWI => "NDWI",
            SpectralIndex::BSI => "BSI",
            SpectralIndex::NDBI => "NDBI",
            SpectralIndex::MNDWI => "MNDWI",
            SpectralIndex::NBR => "NBR",
        }
    }

    /// Raw bands the formula reads
    pub fn required_bands(&self) -> &'static [RawBand] {
        use RawBand::*;
        match self {
            SpectralIndex::NDVI | SpectralIndex::SAVI => &[Nir, Red],
            SpectralIndex::EVI => &[Nir, Red, Blue],
            SpectralIndex::NDWI => &[Green, Nir],
            SpectralIndex::BSI => &[Swir1, Red, Nir, Blue],
            SpectralIndex::NDBI => &[Swir1, Nir],
            SpectralIndex::MNDWI => &[Green, Swir1],
            SpectralIndex::NBR => &[Nir, Swir2],
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpectralIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SpectralIndex::ALL
            .iter()
            .copied()
            .find(|idx| idx.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidParameter {
                name: "index",
                value: s.to_string(),
                reason: "not one of NDVI, EVI, SAVI, NDWI, BSI, NDBI, MNDWI, NBR".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Pixels where the sum is zero or either band is no-data are NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    combine([band_a, band_b], |[a, b]| safe_div(a - b, a + b))
}

/// `NDVI = (NIR - Red) / (NIR + Red)`
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

/// `NDWI = (Green - NIR) / (Green + NIR)`; positive over open water.
pub fn ndwi(green: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(green, nir)
}

/// `NDBI = (SWIR1 - NIR) / (SWIR1 + NIR)`; positive over built-up surfaces.
pub fn ndbi(swir1: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(swir1, nir)
}

/// `MNDWI = (Green - SWIR1) / (Green + SWIR1)`
pub fn mndwi(green: &Raster<f64>, swir1: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(green, swir1)
}

/// `NBR = (NIR - SWIR2) / (NIR + SWIR2)`; low values indicate burned areas.
pub fn nbr(nir: &Raster<f64>, swir2: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, swir2)
}

// ---------------------------------------------------------------------------
// SAVI
// ---------------------------------------------------------------------------

/// Parameters for SAVI
#[derive(Debug, Clone, Copy)]
pub struct SaviParams {
    /// Soil brightness correction factor. Default: 0.5
    pub l_factor: f64,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = (1 + L) * (NIR - Red) / (NIR + Red + L)`, which with the default
/// `L = 0.5` is `1.5 * (NIR - Red) / (NIR + Red + 0.5)`.
pub fn savi(nir: &Raster<f64>, red: &Raster<f64>, params: SaviParams) -> Result<Raster<f64>> {
    let l = params.l_factor;
    combine([nir, red], |[n, r]| {
        safe_div(n - r, n + r + l).map(|v| v * (1.0 + l))
    })
}

// ---------------------------------------------------------------------------
// EVI
// ---------------------------------------------------------------------------

/// Parameters for EVI
#[derive(Debug, Clone, Copy)]
pub struct EviParams {
    /// Gain factor (default: 2.5)
    pub g: f64,
    /// Aerosol coefficient for red band (default: 6.0)
    pub c1: f64,
    /// Aerosol coefficient for blue band (default: 7.5)
    pub c2: f64,
    /// Canopy background adjustment (default: 1.0)
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            g: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Enhanced Vegetation Index (Huete et al., 2002)
///
/// `EVI = G * (NIR - Red) / (NIR + C1 * Red - C2 * Blue + L)`
pub fn evi(
    nir: &Raster<f64>,
    red: &Raster<f64>,
    blue: &Raster<f64>,
    params: EviParams,
) -> Result<Raster<f64>> {
    combine([nir, red, blue], |[n, r, b]| {
        safe_div(params.g * (n - r), n + params.c1 * r - params.c2 * b + params.l)
    })
}

// ---------------------------------------------------------------------------
// BSI
// ---------------------------------------------------------------------------

/// Bare Soil Index
///
/// `BSI = ((SWIR1 + Red) - (NIR + Blue)) / ((SWIR1 + Red) + (NIR + Blue))`
pub fn bsi(
    swir1: &Raster<f64>,
    red: &Raster<f64>,
    nir: &Raster<f64>,
    blue: &Raster<f64>,
) -> Result<Raster<f64>> {
    combine([swir1, red, nir, blue], |[sw, r, n, b]| {
        let soil = sw + r;
        let veg = n + b;
        safe_div(soil - veg, soil + veg)
    })
}

// ---------------------------------------------------------------------------
// Scene dispatch
// ---------------------------------------------------------------------------

/// Compute one index from a scene's raw bands.
///
/// Fails with `MissingBand` when the scene lacks a band the formula reads.
pub fn compute_index(index: SpectralIndex, scene: &Scene) -> Result<Raster<f64>> {
    use RawBand::*;
    match index {
        SpectralIndex::NDVI => ndvi(scene.raw(Nir)?, scene.raw(Red)?),
        SpectralIndex::EVI => evi(
            scene.raw(Nir)?,
            scene.raw(Red)?,
            scene.raw(Blue)?,
            EviParams::default(),
        ),
        SpectralIndex::SAVI => savi(scene.raw(Nir)?, scene.raw(Red)?, SaviParams::default()),
        SpectralIndex::NDWI => ndwi(scene.raw(Green)?, scene.raw(Nir)?),
        SpectralIndex::BSI => bsi(
            scene.raw(Swir1)?,
            scene.raw(Red)?,
            scene.raw(Nir)?,
            scene.raw(Blue)?,
        ),
        SpectralIndex::NDBI => ndbi(scene.raw(Swir1)?, scene.raw(Nir)?),
        SpectralIndex::MNDWI => mndwi(scene.raw(Green)?, scene.raw(Swir1)?),
        SpectralIndex::NBR => nbr(scene.raw(Nir)?, scene.raw(Swir2)?),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Division that yields no value for an exactly zero denominator
fn safe_div(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 { None } else { Some(num / den) }
}

/// Evaluate `f` per pixel over `N` same-shape bands.
///
/// Pixels where any input is no-data, or where `f` returns `None`, are NaN.
fn combine<const N: usize, F>(bands: [&Raster<f64>; N], f: F) -> Result<Raster<f64>>
where
    F: Fn([f64; N]) -> Option<f64> + Sync + Send,
{
    let first = bands[0];
    for band in &bands[1..] {
        first.check_same_shape(*band)?;
    }

    let (rows, cols) = first.shape();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            'pixels: for (col, out) in row_data.iter_mut().enumerate() {
                let mut values = [0.0; N];
                for (value, band) in values.iter_mut().zip(bands.iter()) {
                    // SAFETY: row < rows and col < cols, shapes checked above
                    let v = unsafe { band.get_unchecked(row, col) };
                    if band.is_nodata(v) {
                        continue 'pixels;
                    }
                    *value = v;
                }
                if let Some(result) = f(values) {
                    *out = result;
                }
            }
            row_data
        })
        .collect();

    let mut output = first.like_from_vec(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Mask → indices → smoothing → composite on synthetic scenes.
//!
//! Every scene is a 4x4 grid of 1-unit cells over [0, 4] x [0, 4] with
//! constant reflectances, so index values can be checked by hand.

use chrono::{DateTime, Duration, TimeZone, Utc};
use geo::polygon;
use terracomp_algorithms::imagery::{SpectralIndex, augment, mask_scene};
use terracomp_algorithms::temporal::{SmoothingParams, composite, smooth};
use terracomp_algorithms::vector::{SplitParams, split_region, verify_partition};
use terracomp_core::{GeoTransform, Raster, RawBand, Region, Scene, SplitAxis, SplitPolicy, TimeSeries};

const SIZE: usize = 4;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 5, 3, 16, 30, 0).unwrap()
}

fn band(value: f64) -> Raster<f64> {
    let mut r = Raster::filled(SIZE, SIZE, value);
    r.set_transform(GeoTransform::new(0.0, SIZE as f64, 1.0, -1.0));
    r
}

/// Raw scene with `red` and `nir` varying, cloud flagged on `cloudy` cells
fn raw_scene(day: i64, red: f64, nir: f64, cloudy: &[(usize, usize)]) -> Scene {
    let mut quality = Raster::new(SIZE, SIZE);
    quality.set_transform(GeoTransform::new(0.0, SIZE as f64, 1.0, -1.0));
    for &(row, col) in cloudy {
        quality.set(row, col, 1u16 << 10).unwrap();
    }
    let mut scene = Scene::new(start() + Duration::days(day), quality);
    for raw in RawBand::ALL {
        let value = match raw {
            RawBand::Red => red,
            RawBand::Nir => nir,
            _ => 0.1,
        };
        scene.insert_band(raw.name(), band(value)).unwrap();
    }
    scene
}

fn square_region(name: &str) -> Region {
    let s = SIZE as f64;
    Region::from_polygon(
        name,
        polygon![(x: 0.0, y: 0.0), (x: s, y: 0.0), (x: s, y: s), (x: 0.0, y: s)],
    )
    .unwrap()
}

fn prepare(scenes: Vec<Scene>) -> TimeSeries {
    scenes
        .iter()
        .map(|s| augment(&mask_scene(s).unwrap()).unwrap())
        .collect()
}

#[test]
fn cloudy_pixels_never_reach_the_indices() {
    let scene = raw_scene(0, 0.1, 0.5, &[(0, 0), (2, 3)]);
    let augmented = augment(&mask_scene(&scene).unwrap()).unwrap();

    for (name, raster) in augmented.bands() {
        assert!(raster.get(0, 0).unwrap().is_nan(), "{name} kept a cloudy pixel");
        assert!(raster.get(2, 3).unwrap().is_nan(), "{name} kept a cloudy pixel");
    }
    let ndvi = augmented.band("NDVI").unwrap().get(1, 1).unwrap();
    assert!((ndvi - 0.4 / 0.6).abs() < 1e-12);
}

#[test]
fn smoothed_composite_matches_hand_computation() {
    // NDVI values: day 0 → 0.5, day 4 → 0.6, day 30 → 0.0
    let series = prepare(vec![
        raw_scene(0, 0.1, 0.3, &[]),
        raw_scene(4, 0.1, 0.4, &[(0, 0)]),
        raw_scene(30, 0.2, 0.2, &[]),
    ]);
    let smoothed = smooth(&series, SmoothingParams { window_days: 20.0 }).unwrap();
    assert_eq!(smoothed.len(), 3);

    let ndvi_at = |i: usize, row, col| smoothed.scenes()[i].band("NDVI").unwrap().get(row, col).unwrap();
    assert!((ndvi_at(0, 1, 1) - 0.55).abs() < 1e-12);
    assert!((ndvi_at(1, 1, 1) - 0.55).abs() < 1e-12);
    assert!((ndvi_at(2, 1, 1) - 0.0).abs() < 1e-12);
    // cloudy on day 4 only: the window falls back to day 0 alone
    assert!((ndvi_at(0, 0, 0) - 0.5).abs() < 1e-12);

    let comp = composite(&smoothed, &square_region("Ohio"), 2021).unwrap();
    let ndvi = comp.layer(SpectralIndex::NDVI).unwrap();
    assert_eq!(ndvi.get(1, 1).unwrap(), 0.55f32);
    assert_eq!(ndvi.get(0, 0).unwrap(), 0.5f32);
}

#[test]
fn split_halves_composite_disjoint_cells() {
    let parent = square_region("Texas").with_policy(SplitPolicy::split_along(SplitAxis::Longitude));
    let parts = split_region(&parent, &SplitParams::default()).unwrap();
    assert_eq!(parts.len(), 2);
    assert!(verify_partition(&parent, &parts[0].0, &parts[1].0).within(1e-9));

    let series = prepare(vec![raw_scene(0, 0.1, 0.3, &[])]);
    let west = composite(&series, &parts[0].0, 2021).unwrap();
    let east = composite(&series, &parts[1].0, 2021).unwrap();

    let w = west.layer(SpectralIndex::NBR).unwrap();
    let e = east.layer(SpectralIndex::NBR).unwrap();
    for row in 0..SIZE {
        for col in 0..SIZE {
            let in_west = !w.get(row, col).unwrap().is_nan();
            let in_east = !e.get(row, col).unwrap().is_nan();
            assert!(in_west ^ in_east, "cell ({row}, {col}) in both or neither half");
            assert_eq!(in_west, col < SIZE / 2);
        }
    }
}

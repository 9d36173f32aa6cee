//! Run the pipeline over a synthetic catalog and archive.
//!
//! Two regions, one of which is oversized and gets split, two seasons of
//! cloud-flagged scenes, and a channel standing in for the execution
//! engine. Prints every label the engine receives.
//!
//! ```text
//! cargo run -p terracomp-pipeline --example synthetic_run
//! TERRACOMP_VERBOSE=1 cargo run -p terracomp-pipeline --example synthetic_run
//! ```

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use geo::{MultiPolygon, polygon};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use terracomp_core::{BoundingBox, GeoTransform, Raster, RawBand, Scene};
use terracomp_pipeline::{ArchivedScene, ChannelEngine, InMemoryArchive, InMemoryCatalog, PipelineConfig, run};

const SIZE: usize = 32;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn rectangle(bbox: BoundingBox) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: bbox.min_x, y: bbox.min_y),
        (x: bbox.max_x, y: bbox.min_y),
        (x: bbox.max_x, y: bbox.max_y),
        (x: bbox.min_x, y: bbox.max_y),
    ]])
}

/// A scene whose vegetation greens up through the season, with a diagonal
/// band of cloud that moves with the acquisition day.
fn synthetic_scene(bbox: BoundingBox, day_of_season: i64, year: i32) -> Result<Scene> {
    let acquired = Utc
        .with_ymd_and_hms(year, 5, 1, 15, 45, 0)
        .single()
        .context("invalid acquisition date")?
        + Duration::days(day_of_season);

    let transform = GeoTransform::new(
        bbox.min_x,
        bbox.max_y,
        bbox.width() / SIZE as f64,
        -bbox.height() / SIZE as f64,
    );

    let mut quality = Raster::<u16>::new(SIZE, SIZE);
    quality.set_transform(transform);
    for i in 0..SIZE {
        let col = (i + day_of_season as usize) % SIZE;
        quality.set(i, col, 1 << 10)?;
    }

    let green_up = (day_of_season as f64 / 180.0).min(1.0);
    let mut scene = Scene::new(acquired, quality);
    for band in RawBand::ALL {
        let base = match band {
            RawBand::Blue => 0.04,
            RawBand::Green => 0.07,
            RawBand::Red => 0.08 - 0.04 * green_up,
            RawBand::Nir => 0.25 + 0.2 * green_up,
            RawBand::Swir1 => 0.18,
            RawBand::Swir2 => 0.11,
        };
        let mut raster = Raster::new(SIZE, SIZE);
        raster.set_transform(transform);
        for row in 0..SIZE {
            for col in 0..SIZE {
                let texture = ((row * 31 + col * 17) % 11) as f64 / 500.0;
                raster.set(row, col, base + texture)?;
            }
        }
        scene.insert_band(band.name(), raster)?;
    }
    Ok(scene)
}

fn main() -> Result<()> {
    setup_logging(std::env::var_os("TERRACOMP_VERBOSE").is_some())?;

    let regions = [
        ("New York", BoundingBox::new(-79.76, 40.49, -71.85, 45.01)),
        ("Montana", BoundingBox::new(-116.05, 44.36, -104.04, 49.0)),
    ];

    let mut catalog = InMemoryCatalog::new();
    let mut archive = InMemoryArchive::new();
    for (name, bbox) in regions {
        catalog.insert(name, rectangle(bbox));
        for year in [2020, 2021] {
            for (i, day) in (0..180).step_by(9).enumerate() {
                archive.push(ArchivedScene {
                    collection: "sentinel-2-l1c".into(),
                    footprint: bbox,
                    cloud_percent: (i * 7 % 40) as f64,
                    scene: synthetic_scene(bbox, day, year)?,
                });
            }
        }
    }

    let config = PipelineConfig {
        first_year: 2020,
        last_year: 2021,
        fan_out: true,
        ..PipelineConfig::with_regions(regions.iter().map(|(name, _)| *name))
    };
    info!(scenes = archive.len(), regions = catalog.len(), "synthetic world ready");

    let (engine, requests) = ChannelEngine::unbounded();
    let report = run(&catalog, &archive, &engine, &config)?;

    for request in requests.try_iter() {
        let (rows, cols) = request.raster.shape();
        println!(
            "{:<36} {}x{} valid={:<5} -> {}/ @ {} m, {}",
            request.label,
            rows,
            cols,
            request.raster.valid_count(),
            request.folder,
            request.scale,
            request.crs
        );
    }
    for failure in &report.failures {
        println!("failed: {} {:?}: {}", failure.region, failure.year, failure.error);
    }
    info!(
        submitted = report.submission.submitted_count(),
        failed = report.failures.len(),
        "done"
    );
    Ok(())
}

//! Scene manifests decoded from STAC items.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use terracomp_core::{ArchiveQuery, QUALITY_BAND, RawBand};

use crate::error::{CloudError, Result};
use crate::stac_models::{StacItem, StacItemCollection};

/// Where to find the rasters of one archive scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneManifest {
    pub id: String,
    pub acquired: DateTime<Utc>,
    pub cloud_cover: Option<f64>,
    pub epsg: Option<u32>,
    /// Asset href per raw reflectance band
    pub bands: BTreeMap<RawBand, String>,
    /// Asset href of the quality bitmask
    pub quality: String,
}

impl SceneManifest {
    /// Decode one STAC item.
    ///
    /// Every raw band and the quality band must be present as an asset.
    /// Assets are looked up by their zero-padded key (`B02`) first, then by
    /// the band name itself (`B2`).
    pub fn from_item(item: &StacItem) -> Result<Self> {
        let acquired = item.acquired()?;

        let mut bands = BTreeMap::new();
        for band in RawBand::ALL {
            bands.insert(band, asset_href(item, band.name())?);
        }
        let quality = asset_href(item, QUALITY_BAND)?;

        Ok(Self {
            id: item.id.clone(),
            acquired,
            cloud_cover: item.cloud_cover(),
            epsg: item.epsg(),
            bands,
            quality,
        })
    }

    /// Href of one raw band
    pub fn href(&self, band: RawBand) -> Option<&str> {
        self.bands.get(&band).map(String::as_str)
    }
}

fn asset_href(item: &StacItem, band: &str) -> Result<String> {
    let padded = padded_key(band);
    item.asset(&padded)
        .or_else(|| item.asset(band))
        .map(|asset| asset.href.clone())
        .ok_or_else(|| CloudError::MissingAsset {
            item: item.id.clone(),
            asset: band.to_string(),
        })
}

/// `B2` -> `B02`; other names unchanged
fn padded_key(band: &str) -> String {
    match band.strip_prefix('B') {
        Some(digits) if digits.len() == 1 && digits.chars().all(|c| c.is_ascii_digit()) => {
            format!("B0{digits}")
        }
        _ => band.to_string(),
    }
}

/// Decode a search page into manifests that satisfy `query`, ordered by
/// acquisition time.
///
/// Items outside the query's day window or at or above its cloud ceiling
/// are dropped; an item with no cloud cover is kept. A kept item without
/// all required assets fails the whole page.
pub fn manifests_for(page: &StacItemCollection, query: &ArchiveQuery) -> Result<Vec<SceneManifest>> {
    let mut manifests = Vec::with_capacity(page.len());
    for item in &page.features {
        let acquired = item.acquired()?;
        let cloud_ok = item.cloud_cover().is_none_or(|pct| query.accepts_cloud_cover(pct));
        if !query.covers_date(acquired.date_naive()) || !cloud_ok {
            debug!(item = %item.id, "item outside archive query");
            continue;
        }
        manifests.push(SceneManifest::from_item(item)?);
    }
    manifests.sort_by_key(|m| m.acquired);
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use terracomp_core::BoundingBox;

    const FIXTURE: &str = include_str!("../tests/fixtures/l1c_search.json");

    fn page() -> StacItemCollection {
        serde_json::from_str(FIXTURE).unwrap()
    }

    fn query(max_cloud_percent: f64) -> ArchiveQuery {
        ArchiveQuery {
            collection: "sentinel-2-l1c".into(),
            bbox: BoundingBox::new(-79.76, 40.49, -71.85, 45.01),
            start: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 10, 31).unwrap(),
            max_cloud_percent,
        }
    }

    #[test]
    fn test_padded_key() {
        assert_eq!(padded_key("B2"), "B02");
        assert_eq!(padded_key("B8"), "B08");
        assert_eq!(padded_key("B11"), "B11");
        assert_eq!(padded_key("QA60"), "QA60");
    }

    #[test]
    fn test_manifest_from_complete_item() {
        let page = page();
        let manifest = SceneManifest::from_item(&page.features[0]).unwrap();

        assert_eq!(manifest.id, "S2B_18TWL_20210612_0_L1C");
        assert_eq!(manifest.cloud_cover, Some(12.5));
        assert_eq!(manifest.epsg, Some(32618));
        assert_eq!(manifest.bands.len(), 6);
        assert_eq!(manifest.href(RawBand::Nir), Some("s3://archive/18TWL/2021/6/12/B08.jp2"));
        assert_eq!(manifest.href(RawBand::Swir2), Some("s3://archive/18TWL/2021/6/12/B12.jp2"));
        assert!(manifest.quality.ends_with("QA60.jp2"));
    }

    #[test]
    fn test_missing_asset() {
        let page = page();
        let err = SceneManifest::from_item(&page.features[1]).unwrap_err();
        match err {
            CloudError::MissingAsset { item, asset } => {
                assert_eq!(item, "S2A_18TWL_20210617_0_L1C");
                assert_eq!(asset, "B2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_manifests_filtered_by_cloud_ceiling() {
        // the 12.5% item is dropped, the incomplete 3% item is kept and fails
        let err = manifests_for(&page(), &query(10.0));
        assert!(matches!(err, Err(CloudError::MissingAsset { .. })));

        let mut page = page();
        page.features.truncate(1);
        let manifests = manifests_for(&page, &query(30.0)).unwrap();
        assert_eq!(manifests.len(), 1);
        assert!(manifests_for(&page, &query(12.5)).unwrap().is_empty());
    }

    #[test]
    fn test_manifests_filtered_by_date() {
        let mut page = page();
        page.features.truncate(1);
        let mut late = query(30.0);
        late.start = NaiveDate::from_ymd_opt(2021, 6, 13).unwrap();
        assert!(manifests_for(&page, &late).unwrap().is_empty());
    }
}

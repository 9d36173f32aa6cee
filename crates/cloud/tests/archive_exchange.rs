//! Query encoding and response decoding through the public API, using the
//! search page fixture under `tests/fixtures/`.

use chrono::NaiveDate;
use terracomp_cloud::{CloudError, StacItemCollection, StacSearchParams, manifests_for};
use terracomp_core::{ArchiveQuery, BoundingBox, RawBand};

const PAGE: &str = include_str!("fixtures/l1c_search.json");

fn new_york_2021() -> ArchiveQuery {
    ArchiveQuery {
        collection: "sentinel-2-l1c".into(),
        bbox: BoundingBox::new(-79.76, 40.49, -71.85, 45.01),
        start: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2021, 10, 31).unwrap(),
        max_cloud_percent: 30.0,
    }
}

#[test]
fn search_body_round_trips_through_json() {
    let params = StacSearchParams::from(&new_york_2021());
    let body = serde_json::to_string(&params).unwrap();
    let back: StacSearchParams = serde_json::from_str(&body).unwrap();

    assert_eq!(back, params);
    assert_eq!(back.collections, vec!["sentinel-2-l1c".to_string()]);
    assert_eq!(back.datetime, "2021-05-01T00:00:00Z/2021-10-31T23:59:59Z");
    assert_eq!(back.query.cloud_cover.lt, 30.0);
}

#[test]
fn page_with_incomplete_item_is_rejected() {
    let page: StacItemCollection = serde_json::from_str(PAGE).unwrap();
    let err = manifests_for(&page, &new_york_2021()).unwrap_err();
    assert!(matches!(err, CloudError::MissingAsset { ref asset, .. } if asset == "B2"));
    assert!(err.to_string().contains("S2A_18TWL_20210617_0_L1C"));
}

#[test]
fn complete_items_become_manifests() {
    let mut page: StacItemCollection = serde_json::from_str(PAGE).unwrap();
    page.features.retain(|item| item.asset("B02").is_some());

    let manifests = manifests_for(&page, &new_york_2021()).unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].acquired.date_naive(), NaiveDate::from_ymd_opt(2021, 6, 12).unwrap());
    assert!(RawBand::ALL.iter().all(|band| manifests[0].href(*band).is_some()));
}

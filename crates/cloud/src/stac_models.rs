//! STAC (SpatioTemporal Asset Catalog) data types.
//!
//! Serde models for one STAC Item Search exchange: the `POST /search` body
//! built from an [`ArchiveQuery`], and the item collection that comes back.
//! Only the members the scene archive reads are modelled; everything else
//! in a response is ignored on decode.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use terracomp_core::ArchiveQuery;

use crate::error::{CloudError, Result};

const RFC3339_SECONDS: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Search body for one archive query.
///
/// Serialises as
/// `{"bbox": [w, s, e, n], "datetime": "<from>/<to>", "collections": [..],
/// "query": {"eo:cloud_cover": {"lt": pct}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacSearchParams {
    /// `[west, south, east, north]` in degrees
    pub bbox: [f64; 4],
    /// Closed RFC 3339 interval covering whole days
    pub datetime: String,
    pub collections: Vec<String>,
    pub query: CloudCoverQuery,
}

/// Query-extension filter on the scene cloud percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudCoverQuery {
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: LessThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LessThan {
    pub lt: f64,
}

/// `start` at midnight to the last second of `end`, both UTC.
fn day_interval(start: NaiveDate, end: NaiveDate) -> String {
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let to = end
        .and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| end.and_time(NaiveTime::MIN))
        .and_utc();
    format!("{}/{}", from.format(RFC3339_SECONDS), to.format(RFC3339_SECONDS))
}

impl From<&ArchiveQuery> for StacSearchParams {
    fn from(query: &ArchiveQuery) -> Self {
        let bbox = query.bbox;
        Self {
            bbox: [bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y],
            datetime: day_interval(query.start, query.end),
            collections: vec![query.collection.clone()],
            query: CloudCoverQuery {
                cloud_cover: LessThan {
                    lt: query.max_cloud_percent,
                },
            },
        }
    }
}

/// Search response (a GeoJSON FeatureCollection of items).
#[derive(Debug, Clone, Deserialize)]
pub struct StacItemCollection {
    pub features: Vec<StacItem>,
}

impl StacItemCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One archive scene as a STAC item.
#[derive(Debug, Clone, Deserialize)]
pub struct StacItem {
    pub id: String,
    pub properties: StacItemProperties,
    /// Keyed by band name as the catalog spells it (`B02`, `QA60`)
    pub assets: HashMap<String, StacAsset>,
    #[serde(default)]
    pub collection: Option<String>,
}

impl StacItem {
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }

    /// Projection code from the `proj:epsg` property.
    pub fn epsg(&self) -> Option<u32> {
        self.properties.epsg.and_then(|code| u32::try_from(code).ok())
    }

    /// Acquisition timestamp from the `datetime` property.
    pub fn acquired(&self) -> Result<DateTime<Utc>> {
        let value = self
            .properties
            .datetime
            .as_deref()
            .ok_or_else(|| CloudError::MissingDatetime { item: self.id.clone() })?;
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| CloudError::InvalidDatetime {
                item: self.id.clone(),
                value: value.to_string(),
            })
    }

    /// Scene-level cloud percentage, if the catalog reports one.
    pub fn cloud_cover(&self) -> Option<f64> {
        self.properties.cloud_cover
    }
}

/// The item properties the archive reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StacItemProperties {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover", default)]
    pub cloud_cover: Option<f64>,
    #[serde(rename = "proj:epsg", default)]
    pub epsg: Option<u64>,
}

/// Location of one band raster.
#[derive(Debug, Clone, Deserialize)]
pub struct StacAsset {
    pub href: String,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use terracomp_core::BoundingBox;

    const FIXTURE: &str = include_str!("../tests/fixtures/l1c_search.json");

    fn query() -> ArchiveQuery {
        ArchiveQuery {
            collection: "sentinel-2-l1c".into(),
            bbox: BoundingBox::new(-79.76, 40.49, -71.85, 45.01),
            start: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 10, 31).unwrap(),
            max_cloud_percent: 30.0,
        }
    }

    #[test]
    fn parse_item_collection() {
        // links and match counts in the page are ignored
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(col.len(), 2);
        assert!(!col.is_empty());
    }

    #[test]
    fn parse_properties() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let item = &col.features[0];
        assert_eq!(item.collection.as_deref(), Some("sentinel-2-l1c"));
        assert_eq!(item.cloud_cover(), Some(12.5));
        assert_eq!(item.epsg(), Some(32618));
        assert_eq!(item.asset("QA60").and_then(|a| a.media_type.as_deref()), Some("image/jp2"));
        assert!(item.asset("B05").is_none());

        // optional members may be absent
        let bare = &col.features[1];
        assert_eq!(bare.epsg(), None);
        assert_eq!(bare.asset("B04").and_then(|a| a.media_type.as_deref()), None);
    }

    #[test]
    fn acquisition_time_is_utc() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let acquired = col.features[0].acquired().unwrap();
        assert_eq!(acquired.format("%Y-%m-%dT%H:%M:%S").to_string(), "2021-06-12T15:57:41");
        assert_eq!(acquired.timestamp_subsec_millis(), 24);
    }

    #[test]
    fn bad_datetime_is_reported() {
        let mut col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let item = &mut col.features[1];
        item.properties.datetime = Some("12/06/2021".into());
        assert!(matches!(item.acquired(), Err(CloudError::InvalidDatetime { .. })));

        item.properties.datetime = None;
        assert!(matches!(item.acquired(), Err(CloudError::MissingDatetime { .. })));
    }

    #[test]
    fn archive_query_encoding() {
        let params = StacSearchParams::from(&query());

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["bbox"], serde_json::json!([-79.76, 40.49, -71.85, 45.01]));
        assert_eq!(json["datetime"], "2021-05-01T00:00:00Z/2021-10-31T23:59:59Z");
        assert_eq!(json["collections"], serde_json::json!(["sentinel-2-l1c"]));
        assert_eq!(json["query"]["eo:cloud_cover"]["lt"], 30.0);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn single_day_interval() {
        let day = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(day_interval(day, day), "2020-02-29T00:00:00Z/2020-02-29T23:59:59Z");
    }
}

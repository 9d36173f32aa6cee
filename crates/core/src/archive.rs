//! Scene archive queries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::vector::BoundingBox;

/// What the scene archive is asked for: scenes over `bbox`, acquired on
/// `start..=end`, with scene-level cloud cover below `max_cloud_percent`.
///
/// Spatial and temporal filtering happen on the archive side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveQuery {
    pub collection: String,
    pub bbox: BoundingBox,
    pub start: NaiveDate,
    /// Inclusive last acquisition day
    pub end: NaiveDate,
    pub max_cloud_percent: f64,
}

impl ArchiveQuery {
    /// Whether an acquisition day falls inside the query window
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether a scene-level cloud percentage passes the ceiling
    pub fn accepts_cloud_cover(&self, percent: f64) -> bool {
        percent < self.max_cloud_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ArchiveQuery {
        ArchiveQuery {
            collection: "sentinel-2-l1c".into(),
            bbox: BoundingBox::new(-80.0, 40.0, -72.0, 45.0),
            start: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 10, 31).unwrap(),
            max_cloud_percent: 30.0,
        }
    }

    #[test]
    fn test_date_window_inclusive() {
        let q = query();
        assert!(q.covers_date(NaiveDate::from_ymd_opt(2021, 5, 1).unwrap()));
        assert!(q.covers_date(NaiveDate::from_ymd_opt(2021, 10, 31).unwrap()));
        assert!(!q.covers_date(NaiveDate::from_ymd_opt(2021, 11, 1).unwrap()));
    }

    #[test]
    fn test_cloud_ceiling_exclusive() {
        let q = query();
        assert!(q.accepts_cloud_cover(29.9));
        assert!(!q.accepts_cloud_cover(30.0));
    }
}

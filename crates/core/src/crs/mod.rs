//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// NAD83 / Conus Albers equal-area (EPSG:5070), the export projection
    pub fn conus_albers() -> Self {
        Self::from_epsg(5070)
    }

    /// EPSG code
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Whether coordinates are in degrees rather than projected units
    pub fn is_geographic(&self) -> bool {
        self.epsg == 4326
    }

    /// String identifier in `EPSG:<code>` form
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_identifier() {
        assert_eq!(CRS::conus_albers().identifier(), "EPSG:5070");
        assert_eq!(CRS::default().to_string(), "EPSG:4326");
    }

    #[test]
    fn test_geographic() {
        assert!(CRS::wgs84().is_geographic());
        assert!(!CRS::conus_albers().is_geographic());
    }
}

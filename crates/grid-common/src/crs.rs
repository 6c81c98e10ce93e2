//! Coordinate Reference System identifiers.
//!
//! Two concerns live here: the codes of the map CRSs a host map may run in,
//! and the check that a coverage's horizontal reference system is geodetic
//! (longitude/latitude on WGS84).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known map CRS codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic, plate carrée (lat/lon in degrees)
    Epsg4326,
    /// Web Mercator (spherical)
    Epsg3857,
    /// World Mercator (ellipsoidal)
    Epsg3395,
    /// Plain cartesian map, lat = -y and lon = x
    Simple,
    /// Polar Stereographic North
    Epsg3413,
    /// Polar Stereographic South
    Epsg3031,
}

impl CrsCode {
    /// Parse a CRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:3857"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    /// - "Simple"
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:3395" => Ok(CrsCode::Epsg3395),
            "SIMPLE" => Ok(CrsCode::Simple),
            "EPSG:3413" => Ok(CrsCode::Epsg3413),
            "EPSG:3031" => Ok(CrsCode::Epsg3031),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg3395 => "EPSG:3395",
            CrsCode::Simple => "Simple",
            CrsCode::Epsg3413 => "EPSG:3413",
            CrsCode::Epsg3031 => "EPSG:3031",
        };
        write!(f, "{}", code)
    }
}

/// CRS URIs that denote longitude/latitude on the WGS84 datum.
const WGS84_URIS: [&str; 4] = [
    "http://www.opengis.net/def/crs/OGC/1.3/CRS84",
    "http://www.opengis.net/def/crs/EPSG/0/4326",
    "http://www.opengis.net/def/crs/EPSG/0/4979",
    "http://www.opengis.net/def/crs/OGC/0/CRS84h",
];

/// Check whether a geographic CRS identifier is on the WGS84 datum.
///
/// A geographic CRS without an identifier is assumed to be WGS84, as
/// CoverageJSON producers commonly omit it.
pub fn is_wgs84_geographic(id: Option<&str>) -> bool {
    match id {
        None => true,
        Some(id) => {
            let id = id.trim_end_matches('/');
            WGS84_URIS.iter().any(|uri| uri.eq_ignore_ascii_case(id))
                || id.eq_ignore_ascii_case("EPSG:4326")
                || id.eq_ignore_ascii_case("CRS:84")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

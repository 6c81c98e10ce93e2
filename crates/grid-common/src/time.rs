//! Time axis handling.
//!
//! CoverageJSON time axes are ISO 8601 strings. They are stored as numeric
//! milliseconds since the Unix epoch (UTC) so nearest-value search works the
//! same on every axis.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{GridError, GridResult};

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339 with an offset, a naive date-time (assumed UTC), or a
/// bare date.
pub fn parse_iso8601(s: &str) -> GridResult<DateTime<Utc>> {
    let s = s.trim();

    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(GridError::InvalidTime(s.to_string()))
}

/// Convert a timestamp to the numeric axis representation.
pub fn to_axis_value(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64
}

/// Convert a numeric axis value back to a timestamp.
pub fn from_axis_value(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(value.round() as i64)
}

/// Parse an ISO 8601 string straight to an axis value.
pub fn iso_to_axis_value(s: &str) -> GridResult<f64> {
    parse_iso8601(s).map(|dt| to_axis_value(&dt))
}

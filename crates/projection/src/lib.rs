//! Map projections for tile rendering.
//!
//! The host map addresses pixels in a zoom-dependent plane. A
//! [`MapProjection`] turns those pixel positions back into latitude and
//! longitude. The built-in CRSs mirror the common web map set (EPSG:3857,
//! EPSG:3395, EPSG:4326, Simple); anything else is a custom projection.
//!
//! Implements map projections from scratch without external dependencies.

pub mod classify;
pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod point;
pub mod transform;

pub use classify::{classify, DrawStrategy};
pub use geographic::{Equirectangular, SimpleCrs};
pub use lambert::{LambertConformal, ProjectionError};
pub use mercator::{WebMercator, WorldMercator};
pub use point::{LatLon, PixelPoint};
pub use transform::Transformation;

use grid_common::CrsCode;

/// A host map's coordinate system, as seen by the tile renderer.
pub trait MapProjection: Send + Sync {
    /// Well-known code of this projection, or `None` for custom projections.
    fn code(&self) -> Option<CrsCode>;

    /// Convert a pixel position at `zoom` to geographic coordinates.
    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon;

    /// Convert geographic coordinates to a pixel position at `zoom`.
    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint;
}

/// The built-in projection for a well-known code.
///
/// Returns `None` for codes that have no built-in implementation.
pub fn for_code(code: CrsCode) -> Option<Box<dyn MapProjection>> {
    match code {
        CrsCode::Epsg3857 => Some(Box::new(WebMercator)),
        CrsCode::Epsg3395 => Some(Box::new(WorldMercator)),
        CrsCode::Epsg4326 => Some(Box::new(Equirectangular)),
        CrsCode::Simple => Some(Box::new(SimpleCrs)),
        CrsCode::Epsg3413 | CrsCode::Epsg3031 => None,
    }
}

/// Pixel size of the world at zoom 0 for the earth CRSs.
pub const BASE_TILE_SCALE: f64 = 256.0;

/// Scale factor of the earth CRSs at a zoom level.
#[inline]
pub fn earth_scale(zoom: u32) -> f64 {
    BASE_TILE_SCALE * 2f64.powi(zoom as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_code_round_trips_code() {
        for code in [
            CrsCode::Epsg3857,
            CrsCode::Epsg3395,
            CrsCode::Epsg4326,
            CrsCode::Simple,
        ] {
            let proj = for_code(code).unwrap();
            assert_eq!(proj.code(), Some(code));
        }
        assert!(for_code(CrsCode::Epsg3413).is_none());
    }

    #[test]
    fn test_earth_scale() {
        assert_eq!(earth_scale(0), 256.0);
        assert_eq!(earth_scale(3), 2048.0);
    }
}

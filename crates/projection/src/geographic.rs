//! Plate carrée (EPSG:4326) and the Simple CRS.
//!
//! Both map longitude/latitude linearly to pixels; they differ in scale and
//! origin only.

use grid_common::CrsCode;

use crate::point::{LatLon, PixelPoint};
use crate::transform::Transformation;
use crate::{earth_scale, MapProjection};

const EQUIRECTANGULAR_TRANSFORM: Transformation =
    Transformation::new(1.0 / 180.0, 1.0, -1.0 / 180.0, 0.5);

/// Equirectangular longitude/latitude, EPSG:4326.
///
/// At zoom 0 the world is two tiles wide and one tile high.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl MapProjection for Equirectangular {
    fn code(&self) -> Option<CrsCode> {
        Some(CrsCode::Epsg4326)
    }

    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon {
        let (lon, lat) = EQUIRECTANGULAR_TRANSFORM.untransform(point, earth_scale(zoom));
        LatLon::new(lat, lon)
    }

    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint {
        EQUIRECTANGULAR_TRANSFORM.transform(latlon.lon, latlon.lat, earth_scale(zoom))
    }
}

const SIMPLE_TRANSFORM: Transformation = Transformation::new(1.0, 0.0, -1.0, 0.0);

/// Identity-like CRS: one unit per pixel at zoom 0, y up.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCrs;

impl SimpleCrs {
    fn scale(zoom: u32) -> f64 {
        2f64.powi(zoom as i32)
    }
}

impl MapProjection for SimpleCrs {
    fn code(&self) -> Option<CrsCode> {
        Some(CrsCode::Simple)
    }

    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon {
        let (lon, lat) = SIMPLE_TRANSFORM.untransform(point, Self::scale(zoom));
        LatLon::new(lat, lon)
    }

    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint {
        SIMPLE_TRANSFORM.transform(latlon.lon, latlon.lat, Self::scale(zoom))
    }
}

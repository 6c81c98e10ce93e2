//! Mercator projections (EPSG:3857 spherical, EPSG:3395 ellipsoidal).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use grid_common::CrsCode;

use crate::point::{LatLon, PixelPoint};
use crate::transform::Transformation;
use crate::{earth_scale, MapProjection};

/// WGS84 semi-major axis in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
pub const EARTH_RADIUS_MINOR: f64 = 6_356_752.314_245_179;
/// Latitude where spherical mercator becomes a square world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

const MERCATOR_SCALE: f64 = 0.5 / (PI * EARTH_RADIUS);
const MERCATOR_TRANSFORM: Transformation =
    Transformation::new(MERCATOR_SCALE, 0.5, -MERCATOR_SCALE, 0.5);

/// Spherical (web) mercator, EPSG:3857.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Geographic to projected meters.
    pub fn forward(latlon: LatLon) -> (f64, f64) {
        let lat = latlon.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin = lat.to_radians().sin();
        (
            EARTH_RADIUS * latlon.lon.to_radians(),
            EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    /// Projected meters to geographic.
    pub fn inverse(x: f64, y: f64) -> LatLon {
        LatLon::new(
            (2.0 * (y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
            (x / EARTH_RADIUS).to_degrees(),
        )
    }
}

impl MapProjection for WebMercator {
    fn code(&self) -> Option<CrsCode> {
        Some(CrsCode::Epsg3857)
    }

    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon {
        let (x, y) = MERCATOR_TRANSFORM.untransform(point, earth_scale(zoom));
        Self::inverse(x, y)
    }

    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint {
        let (x, y) = Self::forward(latlon);
        MERCATOR_TRANSFORM.transform(x, y, earth_scale(zoom))
    }
}

/// Ellipsoidal (world) mercator, EPSG:3395.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldMercator;

impl WorldMercator {
    fn eccentricity() -> f64 {
        let ratio = EARTH_RADIUS_MINOR / EARTH_RADIUS;
        (1.0 - ratio * ratio).sqrt()
    }

    pub fn forward(latlon: LatLon) -> (f64, f64) {
        let e = Self::eccentricity();
        let phi = latlon.lat.to_radians();
        let con = e * phi.sin();
        let ts = (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - con) / (1.0 + con)).powf(e / 2.0);
        (
            latlon.lon.to_radians() * EARTH_RADIUS,
            -EARTH_RADIUS * ts.max(1e-10).ln(),
        )
    }

    /// Inverse by fixed-point iteration on the isometric latitude.
    pub fn inverse(x: f64, y: f64) -> LatLon {
        let e = Self::eccentricity();
        let ts = (-y / EARTH_RADIUS).exp();
        let mut phi = FRAC_PI_2 - 2.0 * ts.atan();

        let mut dphi: f64 = 0.1;
        let mut i = 0;
        while i < 15 && dphi.abs() > 1e-7 {
            let con = e * phi.sin();
            let con = ((1.0 - con) / (1.0 + con)).powf(e / 2.0);
            dphi = FRAC_PI_2 - 2.0 * (ts * con).atan() - phi;
            phi += dphi;
            i += 1;
        }

        LatLon::new(phi.to_degrees(), (x / EARTH_RADIUS).to_degrees())
    }
}

impl MapProjection for WorldMercator {
    fn code(&self) -> Option<CrsCode> {
        Some(CrsCode::Epsg3395)
    }

    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon {
        let (x, y) = MERCATOR_TRANSFORM.untransform(point, earth_scale(zoom));
        Self::inverse(x, y)
    }

    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint {
        let (x, y) = Self::forward(latlon);
        MERCATOR_TRANSFORM.transform(x, y, earth_scale(zoom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_web_mercator_world_corners() {
        let proj = WebMercator;
        let center = proj.unproject(PixelPoint::new(128.0, 128.0), 0);
        assert_coords_approx_eq!((center.lat, center.lon), (0.0, 0.0), 1e-9);

        let top_left = proj.unproject(PixelPoint::new(0.0, 0.0), 0);
        assert_approx_eq!(top_left.lon, -180.0, 1e-9);
        assert_approx_eq!(top_left.lat, MAX_LATITUDE, 1e-6);
    }

    #[test]
    fn test_web_mercator_roundtrip() {
        let proj = WebMercator;
        let original = LatLon::new(51.5, -0.12);
        let pixel = proj.project(original, 7);
        let back = proj.unproject(pixel, 7);
        assert_coords_approx_eq!((back.lat, back.lon), (original.lat, original.lon), 1e-9);
    }

    #[test]
    fn test_world_mercator_roundtrip() {
        let proj = WorldMercator;
        for lat in [-80.0, -45.0, 0.0, 30.0, 70.0] {
            let original = LatLon::new(lat, 12.5);
            let back = proj.unproject(proj.project(original, 3), 3);
            assert_approx_eq!(back.lat, lat, 1e-6);
            assert_approx_eq!(back.lon, 12.5, 1e-9);
        }
    }

    #[test]
    fn test_world_mercator_differs_from_spherical() {
        // Same longitude scale, different latitude scale
        let p = LatLon::new(60.0, 10.0);
        let web = WebMercator.project(p, 0);
        let world = WorldMercator.project(p, 0);
        assert_approx_eq!(web.x, world.x, 1e-9);
        assert!((web.y - world.y).abs() > 0.1);
    }
}

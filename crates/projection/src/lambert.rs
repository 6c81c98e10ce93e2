//! Lambert Conformal Conic projection.
//!
//! Maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! Used here as a custom map surface: it has no well-known code, so tiles
//! drawn on it always take the per-pixel path.
//!
//! The projection parameters include:
//! - Central meridian (lon0)
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//! - Grid spacing: dx, dy in meters
//! - First grid point: lat1, lon1

use std::f64::consts::PI;

use grid_common::CrsCode;
use thiserror::Error;

use crate::point::{LatLon, PixelPoint};
use crate::MapProjection;

/// Spherical earth radius used by the cone (meters).
const EARTH_RADIUS: f64 = 6_371_229.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Invalid projection parameters: {0}")]
    InvalidParameters(String),
}

/// Lambert Conformal Conic projection over a regular grid of cells.
///
/// Grid index `(i, j)` has `i` growing east and `j` growing north from the
/// first grid point.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Latitude of first grid point in radians
    pub lat1: f64,
    /// Longitude of first grid point in radians
    pub lon1: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    /// Number of grid points in X (i) direction
    pub nx: usize,
    /// Number of grid points in Y (j) direction
    pub ny: usize,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at first grid point
    rho0: f64,
    /// First grid point in projection coordinates
    origin: (f64, f64),
}

#[allow(clippy::too_many_arguments)]
impl LambertConformal {
    /// Create a projection from degrees and meters.
    pub fn new(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, ProjectionError> {
        if dx <= 0.0 || dy <= 0.0 || nx == 0 || ny == 0 {
            return Err(ProjectionError::InvalidParameters(format!(
                "grid must be non-empty with positive spacing (dx={}, dy={}, {}x{})",
                dx, dy, nx, ny
            )));
        }

        let proj = Self::from_radians(
            lat1_deg.to_radians(),
            lon1_deg.to_radians(),
            lov_deg.to_radians(),
            latin1_deg.to_radians(),
            latin2_deg.to_radians(),
            dx,
            dy,
            nx,
            ny,
        );
        if !proj.n.is_finite() || proj.n.abs() < 1e-10 || !proj.rho0.is_finite() {
            return Err(ProjectionError::InvalidParameters(format!(
                "standard parallels {} and {} do not define a cone",
                latin1_deg, latin2_deg
            )));
        }
        Ok(proj)
    }

    /// The 3 km CONUS grid of the HRRR model.
    ///
    /// - First point: 21.138123°N, -122.719528°E
    /// - LoV: -97.5°E
    /// - Standard parallels: 38.5°N (both)
    /// - Grid: 1799 x 1059, 3km spacing
    pub fn hrrr() -> Self {
        Self::from_radians(
            21.138123f64.to_radians(),
            (-122.719528f64).to_radians(),
            (-97.5f64).to_radians(),
            38.5f64.to_radians(),
            38.5f64.to_radians(),
            3000.0,
            3000.0,
            1799,
            1059,
        )
    }

    fn from_radians(
        lat1: f64,
        lon1: f64,
        lon0: f64,
        latin1: f64,
        latin2: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        // Cone constant
        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = EARTH_RADIUS * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * normalize_angle(lon1 - lon0);
        let origin = (rho0 * theta0.sin(), rho0 - rho0 * theta0.cos());

        Self {
            lon0,
            latin1,
            latin2,
            lat1,
            lon1,
            dx,
            dy,
            nx,
            ny,
            n,
            f,
            rho0,
            origin,
        }
    }

    /// Geographic coordinates (degrees) to fractional grid indices `(i, j)`.
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        let rho = EARTH_RADIUS * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        ((x - self.origin.0) / self.dx, (y - self.origin.1) / self.dy)
    }

    /// Grid indices to geographic coordinates `(lat, lon)` in degrees.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.origin.0 + i * self.dx;
        let y = self.origin.1 + j * self.dy;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };
        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((EARTH_RADIUS * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat.to_degrees(), lon.to_degrees())
    }

    /// Approximate geographic extent `(min_lon, min_lat, max_lon, max_lat)`.
    ///
    /// The grid's edges are curved in lat/lon, so this samples along all four
    /// edges.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let last_i = self.nx as f64 - 1.0;
        let last_j = self.ny as f64 - 1.0;
        let mut bounds = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);

        for t in 0..=20 {
            let frac = t as f64 / 20.0;
            for (i, j) in [
                (frac * last_i, 0.0),
                (frac * last_i, last_j),
                (0.0, frac * last_j),
                (last_i, frac * last_j),
            ] {
                let (lat, lon) = self.grid_to_geo(i, j);
                bounds.0 = bounds.0.min(lon);
                bounds.1 = bounds.1.min(lat);
                bounds.2 = bounds.2.max(lon);
                bounds.3 = bounds.3.max(lat);
            }
        }

        bounds
    }

    /// Check if a geographic point is within the grid.
    pub fn contains(&self, lat_deg: f64, lon_deg: f64) -> bool {
        let (i, j) = self.geo_to_grid(lat_deg, lon_deg);
        i >= 0.0 && i < self.nx as f64 && j >= 0.0 && j < self.ny as f64
    }

    /// Get grid dimensions.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Pixel size of one grid cell at a zoom level.
    fn cell_pixels(zoom: u32) -> f64 {
        2f64.powi(zoom as i32)
    }
}

/// As a map surface: one pixel per grid cell at zoom 0, north up.
impl MapProjection for LambertConformal {
    fn code(&self) -> Option<CrsCode> {
        None
    }

    fn unproject(&self, point: PixelPoint, zoom: u32) -> LatLon {
        let scale = Self::cell_pixels(zoom);
        let i = point.x / scale;
        let j = self.ny as f64 - point.y / scale;
        let (lat, lon) = self.grid_to_geo(i, j);
        LatLon::new(lat, lon)
    }

    fn project(&self, latlon: LatLon, zoom: u32) -> PixelPoint {
        let scale = Self::cell_pixels(zoom);
        let (i, j) = self.geo_to_grid(latlon.lat, latlon.lon);
        PixelPoint::new(i * scale, (self.ny as f64 - j) * scale)
    }
}

/// Wrap an angle in radians into `[-π, π]`.
fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_hrrr_first_grid_point() {
        let proj = LambertConformal::hrrr();

        // First grid point should map to (0, 0)
        let (i, j) = proj.geo_to_grid(21.138123, -122.719528);
        assert!(i.abs() < 0.1, "i should be ~0, got {}", i);
        assert!(j.abs() < 0.1, "j should be ~0, got {}", j);
    }

    #[test]
    fn test_hrrr_roundtrip() {
        let proj = LambertConformal::hrrr();

        let (lat, lon) = proj.grid_to_geo(900.0, 500.0);
        let (i, j) = proj.geo_to_grid(lat, lon);

        assert_coords_approx_eq!((i, j), (900.0, 500.0), 0.01);
    }

    #[test]
    fn test_hrrr_geographic_bounds() {
        let proj = LambertConformal::hrrr();
        let (min_lon, min_lat, max_lon, max_lat) = proj.geographic_bounds();

        // HRRR should cover approximately CONUS
        assert!(min_lon < -120.0, "min_lon should be < -120, got {}", min_lon);
        assert!(max_lon > -65.0, "max_lon should be > -65, got {}", max_lon);
        assert!(min_lat > 20.0 && min_lat < 25.0, "min_lat should be ~21-25, got {}", min_lat);
        assert!(max_lat > 45.0, "max_lat should be > 45, got {}", max_lat);
    }

    #[test]
    fn test_new_matches_preset() {
        let built = LambertConformal::new(
            21.138123, -122.719528, -97.5, 38.5, 38.5, 3000.0, 3000.0, 1799, 1059,
        )
        .unwrap();
        let preset = LambertConformal::hrrr();

        let (a_lat, a_lon) = built.grid_to_geo(400.0, 300.0);
        let (b_lat, b_lon) = preset.grid_to_geo(400.0, 300.0);
        assert_coords_approx_eq!((a_lat, a_lon), (b_lat, b_lon), 1e-9);
    }

    #[test]
    fn test_invalid_cone_rejected() {
        assert!(LambertConformal::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 10, 10).is_err());
        assert!(LambertConformal::new(0.0, 0.0, 0.0, 30.0, 30.0, 0.0, 1.0, 10, 10).is_err());
    }

    #[test]
    fn test_map_surface_has_no_code() {
        let proj = LambertConformal::hrrr();
        assert_eq!(proj.code(), None);

        // Kansas City should land inside the zoom-0 surface
        let p = proj.project(LatLon::new(39.0, -94.5), 0);
        assert!(p.x > 700.0 && p.x < 1100.0, "x = {}", p.x);
        assert!(p.y > 300.0 && p.y < 700.0, "y = {}", p.y);

        let back = proj.unproject(p, 0);
        assert_approx_eq!(back.lat, 39.0, 1e-6);
        assert_approx_eq!(back.lon, -94.5, 1e-6);
    }
}

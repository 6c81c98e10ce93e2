//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Spatial extent of a grid in its native coordinates.
///
/// For geodetic domains x is longitude and y is latitude in degrees. The
/// longitude range may extend past ±180 for grids crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    ///
    /// NaN coordinates are never contained.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    #[inline]
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    #[inline]
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    /// Interpret as longitude/latitude bounds for the host map.
    pub fn to_lat_lon_bounds(&self) -> LatLonBounds {
        LatLonBounds {
            south: self.min_y,
            west: self.min_x,
            north: self.max_y,
            east: self.max_x,
        }
    }
}

/// A geographic rectangle handed to the host map (`getBounds`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLonBounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

//! Common test fixtures.
//!
//! Pre-defined grids, extents, times and categories that tests across the
//! workspace share.

/// Common bounding box definitions for testing, as
/// `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// Crosses the antimeridian using longitudes past 180
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, -50.0, 220.0, 50.0);
}

/// Common grid specifications for testing.
pub mod grid {
    /// 1 degree global grid, cell centres from -179.5 to 179.5
    pub const GLOBAL_1DEG: GridSpec = GridSpec {
        width: 360,
        height: 180,
        min_lon: -179.5,
        max_lon: 179.5,
        min_lat: -89.5,
        max_lat: 89.5,
    };

    /// 0..360 longitude convention
    pub const GLOBAL_0_360: GridSpec = GridSpec {
        width: 360,
        height: 181,
        min_lon: 0.0,
        max_lon: 359.0,
        min_lat: -90.0,
        max_lat: 90.0,
    };

    /// Europe at half a degree
    pub const EUROPE_HALF_DEG: GridSpec = GridSpec {
        width: 121,
        height: 75,
        min_lon: -15.0,
        max_lon: 45.0,
        min_lat: 35.0,
        max_lat: 72.0,
    };

    /// Small grid straddling the antimeridian (170..190)
    pub const ANTIMERIDIAN: GridSpec = GridSpec {
        width: 21,
        height: 11,
        min_lon: 170.0,
        max_lon: 190.0,
        min_lat: -5.0,
        max_lat: 5.0,
    };

    /// Simple 10x10 test grid
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        width: 10,
        height: 10,
        min_lon: -10.0,
        max_lon: 10.0,
        min_lat: -10.0,
        max_lat: 10.0,
    };

    /// Grid specification for testing.
    ///
    /// The min/max values are the first and last cell centres.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_lon: f64,
        pub max_lon: f64,
        pub min_lat: f64,
        pub max_lat: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the spacing between cell centres in degrees.
        pub fn resolution(&self) -> (f64, f64) {
            let dx = (self.max_lon - self.min_lon) / (self.width.max(2) - 1) as f64;
            let dy = (self.max_lat - self.min_lat) / (self.height.max(2) - 1) as f64;
            (dx, dy)
        }

        /// Ascending longitude values.
        pub fn lon_values(&self) -> Vec<f64> {
            crate::linear_values(self.min_lon, self.max_lon, self.width)
        }

        /// Ascending latitude values.
        pub fn lat_values(&self) -> Vec<f64> {
            crate::linear_values(self.min_lat, self.max_lat, self.height)
        }

        /// Latitude values running north to south.
        pub fn lat_values_descending(&self) -> Vec<f64> {
            let mut values = self.lat_values();
            values.reverse();
            values
        }
    }
}

/// Common time values for testing.
pub mod time {
    /// A fixed reference time for tests
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    /// Three six-hourly steps
    pub const SIX_HOURLY: [&str; 3] = [
        "2024-01-15T00:00:00Z",
        "2024-01-15T06:00:00Z",
        "2024-01-15T12:00:00Z",
    ];

    /// Epoch milliseconds of [`SIX_HOURLY`]
    pub const SIX_HOURLY_MS: [f64; 3] = [1_705_276_800_000.0, 1_705_298_400_000.0, 1_705_320_000_000.0];
}

/// Categorical fixtures.
pub mod categories {
    /// `(id, label, preferred colour, raw code)`
    pub const LAND_COVER: [(&str, &str, &str, i64); 4] = [
        ("water", "Water", "#1f78b4", 1),
        ("forest", "Forest", "#33a02c", 2),
        ("urban", "Urban", "#e31a1c", 3),
        ("ice", "Ice", "#f0f0f0", 4),
    ];
}

/// Common CRS identifiers.
pub mod crs {
    /// OGC CRS84 (lon/lat order)
    pub const CRS84_URI: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

    /// EPSG:4326 as a URI
    pub const EPSG_4326_URI: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

    /// British National Grid, a projected CRS
    pub const EPSG_27700_URI: &str = "http://www.opengis.net/def/crs/EPSG/0/27700";
}

//! Decide how a tile may be resampled under a given map projection.

use std::fmt;

use grid_common::CrsCode;

use crate::MapProjection;

/// Resampling strategy for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawStrategy {
    /// Latitude depends on the pixel row only and longitude on the column
    /// only, so each can be computed once per row/column.
    RectilinearFastPath,
    /// Unproject every pixel.
    GenericPath,
}

impl fmt::Display for DrawStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawStrategy::RectilinearFastPath => write!(f, "rectilinear"),
            DrawStrategy::GenericPath => write!(f, "generic"),
        }
    }
}

/// Whether a known CRS keeps meridians vertical and parallels horizontal.
pub fn is_rectilinear(code: CrsCode) -> bool {
    matches!(
        code,
        CrsCode::Epsg3857 | CrsCode::Epsg3395 | CrsCode::Epsg4326 | CrsCode::Simple
    )
}

/// Classify a projection. Custom projections always take the generic path.
pub fn classify(projection: &dyn MapProjection) -> DrawStrategy {
    match projection.code() {
        Some(code) if is_rectilinear(code) => DrawStrategy::RectilinearFastPath,
        _ => DrawStrategy::GenericPath,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Equirectangular, LambertConformal, LatLon, PixelPoint, SimpleCrs, WebMercator,
        WorldMercator,
    };

    struct PolarStereographic;

    impl MapProjection for PolarStereographic {
        fn code(&self) -> Option<CrsCode> {
            Some(CrsCode::Epsg3413)
        }

        fn unproject(&self, _point: PixelPoint, _zoom: u32) -> LatLon {
            LatLon::new(90.0, 0.0)
        }

        fn project(&self, _latlon: LatLon, _zoom: u32) -> PixelPoint {
            PixelPoint::default()
        }
    }

    #[test]
    fn test_allow_listed_projections_are_fast() {
        let fast: [&dyn MapProjection; 4] =
            [&WebMercator, &WorldMercator, &Equirectangular, &SimpleCrs];
        for proj in fast {
            assert_eq!(classify(proj), DrawStrategy::RectilinearFastPath);
        }
    }

    #[test]
    fn test_other_projections_are_generic() {
        assert_eq!(classify(&PolarStereographic), DrawStrategy::GenericPath);
        assert_eq!(classify(&LambertConformal::hrrr()), DrawStrategy::GenericPath);
    }
}

//! Tile resampling.
//!
//! Maps every pixel of an output tile back to the nearest source grid cell
//! and writes its colour. Two strategies:
//!
//! - **Rectilinear fast path**: for projections where latitude depends only
//!   on the pixel row and longitude only on the column, unproject once per
//!   row and once per column and cache the resulting grid indices.
//! - **Generic path**: unproject every pixel.
//!
//! Both sample at pixel centres and produce identical output for the
//! projections that allow the fast path.

use rayon::prelude::*;
use tracing::debug;

use grid_common::{
    Axis, AxisId, BoundingBox, Domain, GridRange, GridResult, Rgb, TileCoord, TileImage,
};
use projection::{classify, DrawStrategy, MapProjection, PixelPoint};

use crate::bounds::derive_bounding_box;
use crate::colorize::ColorMode;
use crate::search::nearest_index;

/// Width of the longitude window a query is wrapped into.
const LONGITUDE_SPAN: f64 = 360.0;

/// Wrap a longitude into `[min, min + 360)`.
#[inline]
pub fn wrap_longitude(lon: f64, min: f64) -> f64 {
    (lon - min).rem_euclid(LONGITUDE_SPAN) + min
}

/// Everything needed to draw tiles of one subset.
///
/// Immutable once built, so tiles can be drawn concurrently against it.
#[derive(Debug, Clone)]
pub struct RenderContext {
    x: Axis,
    y: Axis,
    bbox: BoundingBox,
    range: GridRange,
    mode: ColorMode,
}

impl RenderContext {
    /// Validate a domain/range pair for drawing.
    ///
    /// Fails on non-grid domains, non-geodetic horizontal reference systems,
    /// empty axes, and ranges whose shape does not match the x/y axes.
    pub fn new(domain: &Domain, range: GridRange, mode: ColorMode) -> GridResult<Self> {
        domain.ensure_grid()?;
        domain.ensure_geodetic()?;

        let x = domain.require_axis(AxisId::X)?.clone();
        let y = domain.require_axis(AxisId::Y)?.clone();
        let bbox = derive_bounding_box(domain)?;
        range.ensure_shape(x.len(), y.len())?;

        Ok(Self {
            x,
            y,
            bbox,
            range,
            mode,
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn mode(&self) -> &ColorMode {
        &self.mode
    }

    pub fn range(&self) -> &GridRange {
        &self.range
    }

    /// Draw one tile, picking the strategy from the projection.
    pub fn render_tile(
        &self,
        projection: &dyn MapProjection,
        tile: TileCoord,
        tile_size: usize,
    ) -> TileImage {
        self.render_tile_with(classify(projection), projection, tile, tile_size)
    }

    /// Draw one tile with an explicit strategy.
    ///
    /// Forcing the fast path on a projection that is not rectilinear gives
    /// wrong output; this exists for comparing the two paths.
    pub fn render_tile_with(
        &self,
        strategy: DrawStrategy,
        projection: &dyn MapProjection,
        tile: TileCoord,
        tile_size: usize,
    ) -> TileImage {
        debug!(
            tile = %tile.cache_key(),
            strategy = %strategy,
            "Rendering tile"
        );

        match &self.mode {
            ColorMode::Continuous { palette, extent } => {
                let steps = palette.steps();
                self.draw(strategy, projection, tile, tile_size, |v| {
                    extent.palette_index(v, steps).and_then(|i| palette.get(i))
                })
            }
            ColorMode::Categorical { palette, index } => {
                self.draw(strategy, projection, tile, tile_size, |v| {
                    index.get(v).and_then(|i| palette.get(i))
                })
            }
        }
    }

    /// Draw many tiles in parallel.
    pub fn render_tiles(
        &self,
        projection: &dyn MapProjection,
        tiles: &[TileCoord],
        tile_size: usize,
    ) -> Vec<TileImage> {
        let strategy = classify(projection);
        tiles
            .par_iter()
            .map(|tile| self.render_tile_with(strategy, projection, *tile, tile_size))
            .collect()
    }

    fn draw<F>(
        &self,
        strategy: DrawStrategy,
        projection: &dyn MapProjection,
        tile: TileCoord,
        tile_size: usize,
        lookup: F,
    ) -> TileImage
    where
        F: Fn(f64) -> Option<Rgb>,
    {
        match strategy {
            DrawStrategy::RectilinearFastPath => {
                self.draw_rectilinear(projection, tile, tile_size, lookup)
            }
            DrawStrategy::GenericPath => self.draw_generic(projection, tile, tile_size, lookup),
        }
    }

    #[inline]
    fn y_index(&self, lat: f64) -> Option<usize> {
        if !self.bbox.contains_y(lat) {
            return None;
        }
        nearest_index(self.y.values(), lat)
    }

    #[inline]
    fn x_index(&self, lon: f64) -> Option<usize> {
        let lon = wrap_longitude(lon, self.bbox.min_x);
        if !self.bbox.contains_x(lon) {
            return None;
        }
        nearest_index(self.x.values(), lon)
    }

    fn draw_generic<F>(
        &self,
        projection: &dyn MapProjection,
        tile: TileCoord,
        tile_size: usize,
        lookup: F,
    ) -> TileImage
    where
        F: Fn(f64) -> Option<Rgb>,
    {
        let mut image = TileImage::new(tile_size);
        let (origin_x, origin_y) = tile.pixel_origin(tile_size);

        for row in 0..tile_size {
            let py = origin_y + row as f64 + 0.5;
            for col in 0..tile_size {
                let px = origin_x + col as f64 + 0.5;
                let ll = projection.unproject(PixelPoint::new(px, py), tile.z);

                let Some(iy) = self.y_index(ll.lat) else {
                    continue;
                };
                let Some(ix) = self.x_index(ll.lon) else {
                    continue;
                };
                if let Some(color) = self.range.get(ix, iy).and_then(&lookup) {
                    image.set_pixel(row, col, color);
                }
            }
        }

        image
    }

    fn draw_rectilinear<F>(
        &self,
        projection: &dyn MapProjection,
        tile: TileCoord,
        tile_size: usize,
        lookup: F,
    ) -> TileImage
    where
        F: Fn(f64) -> Option<Rgb>,
    {
        let mut image = TileImage::new(tile_size);
        let (origin_x, origin_y) = tile.pixel_origin(tile_size);
        let center_x = origin_x + 0.5;
        let center_y = origin_y + 0.5;

        let rows: Vec<Option<usize>> = (0..tile_size)
            .map(|row| {
                let py = origin_y + row as f64 + 0.5;
                let lat = projection.unproject(PixelPoint::new(center_x, py), tile.z).lat;
                self.y_index(lat)
            })
            .collect();

        let cols: Vec<Option<usize>> = (0..tile_size)
            .map(|col| {
                let px = origin_x + col as f64 + 0.5;
                let lon = projection.unproject(PixelPoint::new(px, center_y), tile.z).lon;
                self.x_index(lon)
            })
            .collect();

        // Nothing to draw if the tile misses the grid on either dimension
        if rows.iter().all(Option::is_none) || cols.iter().all(Option::is_none) {
            return image;
        }

        for (row, iy) in rows.iter().enumerate() {
            let Some(iy) = *iy else {
                continue;
            };
            for (col, ix) in cols.iter().enumerate() {
                let Some(ix) = *ix else {
                    continue;
                };
                if let Some(color) = self.range.get(ix, iy).and_then(&lookup) {
                    image.set_pixel(row, col, color);
                }
            }
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::{AxisIndices, NdRange, Palette, PaletteExtent};
    use projection::Equirectangular;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(-175.0, 170.0), 185.0);
        assert_eq!(wrap_longitude(175.0, 170.0), 175.0);
        assert_eq!(wrap_longitude(530.0, 170.0), 170.0);
        assert_eq!(wrap_longitude(180.0, -180.0), -180.0);
        assert_eq!(wrap_longitude(-180.0, -180.0), -180.0);
        assert_eq!(wrap_longitude(170.0, -190.0), -190.0);
        assert!(wrap_longitude(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn test_longitude_congruent_to_west_edge_hits_first_column() {
        // Cell centres -185..145, so the grid spans -190..150
        let xs: Vec<f64> = (0..34).map(|i| -185.0 + 10.0 * i as f64).collect();
        let domain = Domain::grid(xs, vec![-5.0, 5.0], None, None).unwrap();
        let range = NdRange::grid(34, 2, vec![Some(1.0); 68])
            .unwrap()
            .grid_view(&AxisIndices::default())
            .unwrap();
        let palette = Palette::linear_hex(&["#000000", "#ffffff"], 2).unwrap();
        let mode = ColorMode::continuous(palette, PaletteExtent::new(0.0, 1.0));
        let ctx = RenderContext::new(&domain, range, mode).unwrap();

        assert_eq!(ctx.bbox().min_x, -190.0);
        assert_eq!(ctx.x_index(170.0), Some(0));
        assert_eq!(ctx.x_index(-190.0), Some(0));
        assert_eq!(ctx.x_index(160.0), None);
        assert_eq!(ctx.x_index(-214.0), Some(33));
    }

    fn whole_world_context() -> RenderContext {
        // 4 x 2 grid covering the globe, values 0..8
        let domain = Domain::grid(
            vec![-135.0, -45.0, 45.0, 135.0],
            vec![-45.0, 45.0],
            None,
            None,
        )
        .unwrap();
        let range = NdRange::grid(4, 2, (0..8).map(|v| Some(v as f64)).collect())
            .unwrap()
            .grid_view(&AxisIndices::default())
            .unwrap();
        let palette = Palette::linear_hex(&["#000000", "#ffffff"], 8).unwrap();
        let mode = ColorMode::continuous(palette, PaletteExtent::new(0.0, 7.0));
        RenderContext::new(&domain, range, mode).unwrap()
    }

    #[test]
    fn test_whole_world_tile_is_opaque() {
        let ctx = whole_world_context();
        let tile = ctx.render_tile(&Equirectangular, TileCoord::new(0, 0, 0), 16);
        // A 16px tile only covers the north-west corner of the zoom-0 world
        assert_eq!(tile.opaque_count(), 16 * 16);
    }

    #[test]
    fn test_quadrant_values() {
        let ctx = whole_world_context();
        let tile = ctx.render_tile(&Equirectangular, TileCoord::new(0, 0, 0), 16);

        // Top-left pixel: lon ~ -180, lat ~ 90 -> x index 0, y index 1 -> value 4
        let expected = ctx.mode().color(Some(4.0)).unwrap();
        let [r, g, b, a] = tile.pixel(0, 0);
        assert_eq!((r, g, b, a), (expected.r, expected.g, expected.b, 255));
    }

    #[test]
    fn test_render_tiles_parallel_matches_single() {
        let ctx = whole_world_context();
        let tiles = [TileCoord::new(0, 0, 0), TileCoord::new(0, 1, 0)];
        let many = ctx.render_tiles(&Equirectangular, &tiles, 8);
        assert_eq!(many.len(), 2);
        for (tile, image) in tiles.iter().zip(&many) {
            assert_eq!(image, &ctx.render_tile(&Equirectangular, *tile, 8));
        }
    }
}

//! Tile selection and output paths.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use grid_common::{LatLonBounds, TileCoord};
use projection::{LatLon, MapProjection};

/// Latitude limit of the Mercator maps; also keeps other maps finite.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Upper bound on tiles selected by a single `--zoom`.
pub const MAX_COVERING_TILES: usize = 4096;

/// Parse `z/x/y` tile arguments.
pub fn parse_tiles(specs: &[String]) -> Result<Vec<TileCoord>> {
    specs
        .iter()
        .map(|s| TileCoord::parse(s).with_context(|| format!("invalid tile '{}', expected z/x/y", s)))
        .collect()
}

/// Tiles at `zoom` that intersect `bounds`.
pub fn covering_tiles(
    projection: &dyn MapProjection,
    bounds: &LatLonBounds,
    zoom: u32,
    tile_size: usize,
) -> Result<Vec<TileCoord>> {
    let north = bounds.north.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let south = bounds.south.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let top_left = projection.project(LatLon::new(north, bounds.west), zoom);
    let bottom_right = projection.project(LatLon::new(south, bounds.east), zoom);

    let size = tile_size as f64;
    let index = |px: f64| (px / size).floor().max(0.0) as u32;
    let (x0, x1) = (index(top_left.x), index(bottom_right.x - 1e-9));
    let (y0, y1) = (index(top_left.y), index(bottom_right.y - 1e-9));
    if x1 < x0 || y1 < y0 {
        return Ok(Vec::new());
    }

    let count = (x1 - x0 + 1) as usize * (y1 - y0 + 1) as usize;
    if count > MAX_COVERING_TILES {
        bail!(
            "zoom {} needs {} tiles (limit {}); pick a lower zoom",
            zoom,
            count,
            MAX_COVERING_TILES
        );
    }

    Ok((y0..=y1)
        .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(zoom, x, y)))
        .collect())
}

/// `<root>/<z>/<x>/<y>.png`
pub fn tile_path(root: &Path, tile: TileCoord) -> PathBuf {
    root.join(tile.z.to_string())
        .join(tile.x.to_string())
        .join(format!("{}.png", tile.y))
}

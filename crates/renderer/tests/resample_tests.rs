//! Tests for tile resampling across map projections.
//!
//! Covers:
//! - Agreement of the rectilinear fast path with the per-pixel path
//! - Longitude wrapping for grids that cross the antimeridian
//! - Descending axes, missing values and unmapped categories
//! - Custom projections (Lambert Conformal) on the generic path

use grid_common::{
    Axis, AxisId, AxisIndices, CoverageDocument, Domain, DomainType, GridError, NdRange, Palette,
    PaletteExtent, ReferenceSystem, ReferenceSystemConnection, TileCoord,
};
use projection::{
    classify, DrawStrategy, Equirectangular, LambertConformal, LatLon, MapProjection, SimpleCrs,
    WebMercator, WorldMercator,
};
use renderer::{ColorMode, RenderContext};
use test_utils::{
    create_temperature_grid, create_test_grid, grid, grid_coverage, land_cover_coverage_json,
    linear_values, with_missing,
};

// ============================================================================
// Helper functions
// ============================================================================

fn temperature_mode() -> ColorMode {
    ColorMode::continuous(Palette::default_continuous(), PaletteExtent::new(250.0, 310.0))
}

/// Context over a grid using the `col * 1000 + row` test grid.
fn test_grid_context(spec: &grid::GridSpec) -> RenderContext {
    let (domain, range) = grid_coverage(spec, create_test_grid(spec.width, spec.height));
    let extent = PaletteExtent::new(0.0, ((spec.width - 1) * 1000 + spec.height - 1) as f64);
    let mode = ColorMode::continuous(Palette::default_continuous(), extent);
    RenderContext::new(&domain, range.grid_view(&AxisIndices::default()).unwrap(), mode).unwrap()
}

/// Tile and pixel (row, col) that contain a geographic point.
fn locate(
    proj: &dyn MapProjection,
    lat: f64,
    lon: f64,
    zoom: u32,
    tile_size: usize,
) -> (TileCoord, usize, usize) {
    let p = proj.project(LatLon::new(lat, lon), zoom);
    let size = tile_size as f64;
    let tx = (p.x / size).floor();
    let ty = (p.y / size).floor();
    let col = (p.x - tx * size) as usize;
    let row = (p.y - ty * size) as usize;
    (TileCoord::new(zoom, tx as u32, ty as u32), row, col)
}

fn rgba(ctx: &RenderContext, value: f64) -> [u8; 4] {
    let c = ctx.mode().color(Some(value)).unwrap();
    [c.r, c.g, c.b, 255]
}

// ============================================================================
// Fast path matches the generic path
// ============================================================================

#[test]
fn test_fast_path_matches_generic_on_earth_crs() {
    let (domain, range) = grid_coverage(
        &grid::GLOBAL_1DEG,
        create_temperature_grid(grid::GLOBAL_1DEG.width, grid::GLOBAL_1DEG.height),
    );
    let view = range.grid_view(&AxisIndices::default()).unwrap();
    let ctx = RenderContext::new(&domain, view, temperature_mode()).unwrap();

    let projections: [&dyn MapProjection; 3] = [&WebMercator, &WorldMercator, &Equirectangular];
    let tiles = [
        TileCoord::new(0, 0, 0),
        TileCoord::new(2, 0, 0),
        TileCoord::new(2, 1, 1),
        TileCoord::new(2, 3, 2),
    ];

    for proj in projections {
        assert_eq!(classify(proj), DrawStrategy::RectilinearFastPath);
        for tile in tiles {
            let fast = ctx.render_tile_with(DrawStrategy::RectilinearFastPath, proj, tile, 32);
            let generic = ctx.render_tile_with(DrawStrategy::GenericPath, proj, tile, 32);
            assert_eq!(fast, generic, "{:?} {}", proj.code(), tile.cache_key());
        }
    }
}

#[test]
fn test_fast_path_matches_generic_on_simple_crs() {
    // Simple CRS: lon = x / 2^z, lat = -y / 2^z
    let spec = grid::GridSpec {
        width: 50,
        height: 50,
        min_lon: 0.5,
        max_lon: 49.5,
        min_lat: -49.5,
        max_lat: -0.5,
    };
    let ctx = test_grid_context(&spec);

    let tile = TileCoord::new(0, 0, 0);
    let fast = ctx.render_tile_with(DrawStrategy::RectilinearFastPath, &SimpleCrs, tile, 64);
    let generic = ctx.render_tile_with(DrawStrategy::GenericPath, &SimpleCrs, tile, 64);
    assert_eq!(fast, generic);

    // 50 x 50 units of the 64 x 64 tile are covered
    assert_eq!(fast.opaque_count(), 50 * 50);
    // Pixel (row 0, col 3) is lon 3.5, lat -0.5 -> col 3, row 49
    assert_eq!(fast.pixel(0, 3), rgba(&ctx, 3049.0));
}

#[test]
fn test_whole_world_mercator_tile_is_opaque() {
    let (domain, range) = grid_coverage(
        &grid::GLOBAL_1DEG,
        create_temperature_grid(grid::GLOBAL_1DEG.width, grid::GLOBAL_1DEG.height),
    );
    let view = range.grid_view(&AxisIndices::default()).unwrap();
    let ctx = RenderContext::new(&domain, view, temperature_mode()).unwrap();

    let tile = ctx.render_tile(&WebMercator, TileCoord::new(0, 0, 0), 64);
    assert_eq!(tile.opaque_count(), 64 * 64);
}

// ============================================================================
// Antimeridian
// ============================================================================

#[test]
fn test_grid_beyond_180_is_drawn_west_of_antimeridian() {
    let spec = grid::ANTIMERIDIAN; // lon 170..190, lat -5..5
    let ctx = test_grid_context(&spec);
    assert_eq!(ctx.bbox().min_x, 169.5);
    assert_eq!(ctx.bbox().max_x, 190.5);

    // -175 wraps to 185 -> column 15; lat 0 -> row 5
    let (tile, row, col) = locate(&Equirectangular, 0.0, -175.0, 2, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert_eq!(image.pixel(row, col), rgba(&ctx, 15005.0));
    assert_ne!(rgba(&ctx, 15005.0), rgba(&ctx, 14005.0));

    // 175 needs no wrapping -> column 5
    let (tile, row, col) = locate(&Equirectangular, 0.0, 175.0, 2, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert_eq!(image.pixel(row, col), rgba(&ctx, 5005.0));
}

#[test]
fn test_tile_far_from_grid_is_transparent() {
    let ctx = test_grid_context(&grid::ANTIMERIDIAN);

    let (tile, _, _) = locate(&Equirectangular, 0.0, 0.0, 2, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert_eq!(image.opaque_count(), 0);
}

// ============================================================================
// Axis orientation and missing data
// ============================================================================

#[test]
fn test_descending_latitude_axis_renders_identically() {
    let spec = grid::EUROPE_HALF_DEG;
    let (w, h) = (spec.width, spec.height);
    let values = create_temperature_grid(w, h);

    let ascending = Domain::grid(spec.lon_values(), spec.lat_values(), None, None).unwrap();
    let asc_range = NdRange::grid(w, h, values.clone()).unwrap();

    // Same data with rows stored north to south
    let descending =
        Domain::grid(spec.lon_values(), spec.lat_values_descending(), None, None).unwrap();
    let flipped: Vec<Option<f64>> = values.chunks(w).rev().flatten().copied().collect();
    let desc_range = NdRange::grid(w, h, flipped).unwrap();

    let fixed = AxisIndices::default();
    let a = RenderContext::new(&ascending, asc_range.grid_view(&fixed).unwrap(), temperature_mode())
        .unwrap();
    let d = RenderContext::new(
        &descending,
        desc_range.grid_view(&fixed).unwrap(),
        temperature_mode(),
    )
    .unwrap();

    // Central Europe at zoom 4 and Scandinavia at zoom 3, both on the grid
    for (lat, lon, zoom) in [(50.0, 10.0, 4), (62.0, 15.0, 3)] {
        let (tile, row, col) = locate(&WebMercator, lat, lon, zoom, 64);
        let left = a.render_tile(&WebMercator, tile, 64);
        let right = d.render_tile(&WebMercator, tile, 64);
        assert!(!left.is_transparent(row, col), "tile {}", tile.cache_key());
        assert!(left.opaque_count() > 0);
        assert_eq!(left, right, "tile {}", tile.cache_key());
    }
}

#[test]
fn test_missing_values_are_transparent() {
    let spec = grid::ANTIMERIDIAN;
    let values = with_missing(create_test_grid(spec.width, spec.height), spec.width, &[(5, 5)]);
    let (domain, range) = grid_coverage(&spec, values);
    let mode = ColorMode::continuous(Palette::default_continuous(), PaletteExtent::new(0.0, 1.0));
    let ctx =
        RenderContext::new(&domain, range.grid_view(&AxisIndices::default()).unwrap(), mode)
            .unwrap();

    let (tile, row, col) = locate(&Equirectangular, 0.0, 175.0, 3, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert!(image.is_transparent(row, col));
    // One degree east is the neighbouring cell, which still draws
    assert!(!image.is_transparent(row, col + 12));
}

// ============================================================================
// Categorical data
// ============================================================================

#[test]
fn test_unmapped_category_is_transparent() {
    let spec = grid::SIMPLE_10X10;
    let doc = CoverageDocument::from_json(&land_cover_coverage_json(&spec, Some(99))).unwrap();
    let domain = doc.decode_domain().unwrap();
    let params = doc.decode_parameters().unwrap();
    let lc = &params["LC"];
    let palette = Palette::from_categories(lc.categories().unwrap()).unwrap();
    let mode = ColorMode::for_parameter(lc, palette, None).unwrap();

    let view = doc
        .decode_range("LC")
        .unwrap()
        .grid_view(&AxisIndices::default())
        .unwrap();
    let ctx = RenderContext::new(&domain, view, mode).unwrap();

    let lons = linear_values(spec.min_lon, spec.max_lon, spec.width);
    let lats = linear_values(spec.min_lat, spec.max_lat, spec.height);

    // Cell (0, 0) holds the unmapped code 99
    let (tile, row, col) = locate(&Equirectangular, lats[0], lons[0], 5, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert!(image.is_transparent(row, col));

    // Cell (1, 0) holds code 2, "forest"
    let (tile, row, col) = locate(&Equirectangular, lats[0], lons[1], 5, 64);
    let image = ctx.render_tile(&Equirectangular, tile, 64);
    assert_eq!(image.pixel(row, col), [0x33, 0xa0, 0x2c, 255]);
}

#[test]
fn test_categorical_palette_size_must_match() {
    let spec = grid::SIMPLE_10X10;
    let doc = CoverageDocument::from_json(&land_cover_coverage_json(&spec, None)).unwrap();
    let params = doc.decode_parameters().unwrap();
    let lc = &params["LC"];

    let err = ColorMode::for_parameter(lc, Palette::default_continuous(), None).unwrap_err();
    assert!(matches!(
        err,
        GridError::PaletteCategoryMismatch {
            palette_steps: 256,
            categories: 4
        }
    ));
}

// ============================================================================
// Custom projections
// ============================================================================

#[test]
fn test_lambert_surface_uses_generic_path() {
    let conus = grid::GridSpec {
        width: 71,
        height: 36,
        min_lon: -130.0,
        max_lon: -60.0,
        min_lat: 20.0,
        max_lat: 55.0,
    };
    let (domain, range) =
        grid_coverage(&conus, create_temperature_grid(conus.width, conus.height));
    let ctx = RenderContext::new(
        &domain,
        range.grid_view(&AxisIndices::default()).unwrap(),
        temperature_mode(),
    )
    .unwrap();

    let lambert = LambertConformal::hrrr();
    assert_eq!(classify(&lambert), DrawStrategy::GenericPath);

    // Central tile of the zoom-0 surface lies well inside CONUS
    let tile = TileCoord::new(0, 3, 2);
    let image = ctx.render_tile(&lambert, tile, 256);
    assert_eq!(image.opaque_count(), 256 * 256);
    assert_eq!(
        image,
        ctx.render_tile_with(DrawStrategy::GenericPath, &lambert, tile, 256)
    );
}

// ============================================================================
// Domain validation
// ============================================================================

#[test]
fn test_projected_domain_is_rejected() {
    let x = Axis::new(AxisId::X, vec![0.0, 1000.0]).unwrap();
    let y = Axis::new(AxisId::Y, vec![0.0, 1000.0]).unwrap();
    let domain = Domain::new(
        DomainType::Grid,
        vec![x, y],
        vec![ReferenceSystemConnection {
            coordinates: vec!["x".into(), "y".into()],
            system: ReferenceSystem::Projected {
                id: Some(test_utils::crs::EPSG_27700_URI.into()),
            },
        }],
    );
    let range = NdRange::grid(2, 2, vec![Some(1.0); 4]).unwrap();

    let err = RenderContext::new(
        &domain,
        range.grid_view(&AxisIndices::default()).unwrap(),
        temperature_mode(),
    )
    .unwrap_err();
    assert!(matches!(err, GridError::UnsupportedReferenceSystem(_)));
}

#[test]
fn test_range_shape_must_match_domain() {
    let spec = grid::SIMPLE_10X10;
    let domain = Domain::grid(spec.lon_values(), spec.lat_values(), None, None).unwrap();
    let range = NdRange::grid(5, 5, vec![Some(1.0); 25]).unwrap();

    let result = RenderContext::new(
        &domain,
        range.grid_view(&AxisIndices::default()).unwrap(),
        temperature_mode(),
    );
    assert!(result.is_err());
}

#[test]
fn test_point_domain_is_rejected() {
    let x = Axis::new(AxisId::X, vec![1.0]).unwrap();
    let y = Axis::new(AxisId::Y, vec![2.0]).unwrap();
    let domain = Domain::new(DomainType::Point, vec![x, y], vec![]);
    let range = NdRange::grid(1, 1, vec![Some(1.0)]).unwrap();

    let err = RenderContext::new(
        &domain,
        range.grid_view(&AxisIndices::default()).unwrap(),
        temperature_mode(),
    )
    .unwrap_err();
    assert!(matches!(err, GridError::UnsupportedDomainType(_)));
}

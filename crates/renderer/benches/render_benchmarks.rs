//! Benchmarks for the renderer crate - tile resampling, search and encoding.
//!
//! Run with: cargo bench --package renderer -- resample
//! Or: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use grid_common::{AxisIndices, Domain, NdRange, Palette, PaletteExtent, TileCoord};
use projection::{DrawStrategy, Equirectangular, LambertConformal, MapProjection, WebMercator};
use renderer::{encode_tile, nearest_index, ColorMode, RenderContext};

/// Generate a test temperature grid with realistic patterns.
/// Values are in Kelvin (typical surface temps: 220K to 320K).
fn generate_temperature_grid(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            // Base temperature varies with latitude (y position)
            let lat_factor = (y as f64 / height as f64 - 0.5) * 60.0;
            // Add some longitudinal variation
            let lon_factor = ((x as f64 / width as f64) * std::f64::consts::PI * 4.0).sin() * 5.0;
            // Add noise
            let noise = rng.gen_range(-3.0..3.0);

            data.push(Some(273.15 + lat_factor + lon_factor + noise));
        }
    }
    data
}

fn linear(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Global grid at the GFS 0.25 degree resolution.
fn global_context(width: usize, height: usize) -> RenderContext {
    let domain = Domain::grid(
        linear(-180.0, 179.75, width),
        linear(-90.0, 90.0, height),
        None,
        None,
    )
    .expect("domain");
    let range = NdRange::grid(width, height, generate_temperature_grid(width, height))
        .expect("range")
        .grid_view(&AxisIndices::default())
        .expect("view");
    let mode = ColorMode::continuous(Palette::default_continuous(), PaletteExtent::new(220.0, 320.0));
    RenderContext::new(&domain, range, mode).expect("context")
}

// =============================================================================
// RESAMPLE BENCHMARKS
// =============================================================================

fn bench_resample_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    let ctx = global_context(1440, 721);

    let projections: [(&dyn MapProjection, &str); 2] =
        [(&WebMercator, "EPSG3857"), (&Equirectangular, "EPSG4326")];

    for (proj, name) in projections {
        for zoom in [0u32, 3, 6] {
            let tile = TileCoord::new(zoom, 0, 0);
            group.throughput(Throughput::Elements(256 * 256));
            group.bench_with_input(
                BenchmarkId::new(format!("{}_fast", name), zoom),
                &tile,
                |b, tile| {
                    b.iter(|| {
                        ctx.render_tile_with(
                            DrawStrategy::RectilinearFastPath,
                            proj,
                            black_box(*tile),
                            256,
                        )
                    });
                },
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{}_generic", name), zoom),
                &tile,
                |b, tile| {
                    b.iter(|| {
                        ctx.render_tile_with(DrawStrategy::GenericPath, proj, black_box(*tile), 256)
                    });
                },
            );
        }
    }

    let lambert = LambertConformal::hrrr();
    group.bench_function("lambert_generic", |b| {
        b.iter(|| ctx.render_tile(&lambert, black_box(TileCoord::new(0, 3, 2)), 256));
    });

    group.finish();
}

fn bench_render_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_many");
    let ctx = global_context(1440, 721);
    let tiles: Vec<TileCoord> = (0..4)
        .flat_map(|x| (0..4).map(move |y| TileCoord::new(2, x, y)))
        .collect();

    group.throughput(Throughput::Elements(tiles.len() as u64));
    group.bench_function("zoom2_parallel", |b| {
        b.iter(|| ctx.render_tiles(&WebMercator, black_box(&tiles), 256));
    });
    group.bench_function("zoom2_sequential", |b| {
        b.iter(|| {
            tiles
                .iter()
                .map(|t| ctx.render_tile(&WebMercator, black_box(*t), 256))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

// =============================================================================
// SEARCH BENCHMARKS
// =============================================================================

fn bench_nearest_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_index");
    let mut rng = rand::thread_rng();

    for len in [100usize, 1440, 100_000] {
        let values = linear(-180.0, 180.0, len);
        let queries: Vec<f64> = (0..1024).map(|_| rng.gen_range(-190.0..190.0)).collect();

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_with_input(BenchmarkId::new("ascending", len), &values, |b, values| {
            b.iter(|| {
                for q in &queries {
                    black_box(nearest_index(values, *q));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    let ctx = global_context(1440, 721);

    for size in [256usize, 512] {
        let tile = ctx.render_tile(&WebMercator, TileCoord::new(1, 0, 0), size);
        group.throughput(Throughput::Bytes((size * size * 4) as u64));
        group.bench_with_input(BenchmarkId::new("tile", size), &tile, |b, tile| {
            b.iter(|| encode_tile(black_box(tile)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resample_strategies,
    bench_render_many,
    bench_nearest_index,
    bench_png_encoding,
);
criterion_main!(benches);

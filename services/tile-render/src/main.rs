//! Tile renderer.
//!
//! Loads a CoverageJSON grid coverage, draws one parameter as PNG map tiles
//! in a chosen map CRS and optionally writes a legend swatch.

mod tiles;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use grid_common::time::parse_iso8601;
use grid_common::{CrsCode, PaletteExtentSpec};
use grid_layer::{CoverageJsonSource, GridLayer, LayerOptions};
use renderer::{encode_tile, LegendTemplates, RenderConfig};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tile-render")]
#[command(about = "Render map tiles from a CoverageJSON grid coverage")]
struct Args {
    /// CoverageJSON file
    input: PathBuf,

    /// Parameter key to draw
    #[arg(short, long, env = "GRID_LAYER_PARAMETER")]
    parameter: String,

    /// Time to draw (ISO 8601); the nearest step is used
    #[arg(long, env = "GRID_LAYER_TIME")]
    time: Option<String>,

    /// Vertical coordinate to draw; the nearest level is used
    #[arg(long, env = "GRID_LAYER_VERTICAL")]
    vertical: Option<f64>,

    /// Palette extent: subset, fov, or low,high
    #[arg(long, env = "GRID_LAYER_PALETTE_EXTENT")]
    palette_extent: Option<String>,

    /// Map CRS of the tiles
    #[arg(long, default_value = "EPSG:3857")]
    crs: String,

    /// Tiles to render as z/x/y
    #[arg(short, long, num_args = 1..)]
    tile: Vec<String>,

    /// Render every tile covering the coverage at this zoom
    #[arg(short, long)]
    zoom: Option<u32>,

    /// Tile edge length in pixels (default: GRID_RENDER_TILE_SIZE or 256)
    #[arg(long)]
    tile_size: Option<usize>,

    /// Output directory; tiles land in <output>/<z>/<x>/<y>.png
    #[arg(short, long, default_value = "tiles")]
    output: PathBuf,

    /// Also write legend.png using this template (horizontal or vertical)
    #[arg(long)]
    legend: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args)?;

    let render_config = RenderConfig::from_env()?;
    let tile_size = args.tile_size.unwrap_or(render_config.tile_size);

    let crs = CrsCode::parse(&args.crs)?;
    let projection = projection::for_code(crs)
        .ok_or_else(|| anyhow!("no tile projection for {}", crs))?;

    let source = Arc::new(CoverageJsonSource::open(&args.input).await?);
    let layer = GridLayer::new(source, layer_options(&args, tile_size)?)?;
    layer
        .add()
        .await
        .with_context(|| format!("loading {}", args.input.display()))?;

    let bounds = layer
        .bounds()
        .ok_or_else(|| anyhow!("layer has no bounds after loading"))?;
    info!(
        parameter = %args.parameter,
        time = ?layer.time(),
        vertical = ?layer.vertical(),
        extent = ?layer.palette_extent(),
        bounds = ?bounds,
        "Coverage loaded"
    );

    let mut coords = tiles::parse_tiles(&args.tile)?;
    if let Some(zoom) = args.zoom {
        coords.extend(tiles::covering_tiles(
            projection.as_ref(),
            &bounds,
            zoom,
            tile_size,
        )?);
    }
    if coords.is_empty() && args.legend.is_none() {
        bail!("nothing to do: pass --tile, --zoom or --legend");
    }

    let images: Option<Vec<_>> = if render_config.parallel {
        layer.render_tiles(projection.as_ref(), &coords)
    } else {
        coords
            .iter()
            .map(|c| layer.render_tile(projection.as_ref(), *c))
            .collect()
    };
    let images = images.ok_or_else(|| anyhow!("layer is not loaded"))?;

    let mut empty = 0;
    for (coord, image) in coords.iter().zip(&images) {
        if image.is_empty() {
            empty += 1;
        }
        let path = tiles::tile_path(&args.output, *coord);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let png = encode_tile(image)?;
        tokio::fs::write(&path, &png)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(tile = %coord.cache_key(), bytes = png.len(), "Wrote tile");
    }
    if empty > 0 {
        warn!(empty, "Some tiles do not intersect the coverage");
    }
    info!(
        tiles = coords.len(),
        crs = %crs,
        output = %args.output.display(),
        "Rendered tiles"
    );

    if let Some(id) = &args.legend {
        write_legend(&layer, id, &args.output).await?;
    }

    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn layer_options(args: &Args, tile_size: usize) -> Result<LayerOptions> {
    let mut options = LayerOptions::new(&args.parameter);
    options.tile_size = tile_size;
    if let Some(time) = &args.time {
        options.time = Some(parse_iso8601(time)?);
    }
    options.vertical = args.vertical;
    if let Some(extent) = &args.palette_extent {
        options.palette_extent = Some(extent.parse::<PaletteExtentSpec>()?);
    }
    options.validate()?;
    Ok(options)
}

async fn write_legend(layer: &GridLayer, id: &str, output: &std::path::Path) -> Result<()> {
    let templates = LegendTemplates::default();
    let template = templates.get(id).ok_or_else(|| {
        anyhow!(
            "unknown legend template '{}' (known: {})",
            id,
            templates.ids().collect::<Vec<_>>().join(", ")
        )
    })?;
    let legend = layer
        .legend(template)?
        .ok_or_else(|| anyhow!("no palette extent to build a legend from"))?;

    tokio::fs::create_dir_all(output).await?;
    let path = output.join("legend.png");
    tokio::fs::write(&path, legend.swatch_png()?).await?;

    let model = serde_json::json!({
        "title": legend.title,
        "unit": legend.unit,
        "low": legend.low_label,
        "high": legend.high_label,
    });
    tokio::fs::write(output.join("legend.json"), serde_json::to_vec_pretty(&model)?).await?;

    info!(path = %path.display(), title = %legend.title, "Wrote legend");
    Ok(())
}

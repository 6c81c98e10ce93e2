//! Map layer for CoverageJSON grid coverages.
//!
//! A [`GridLayer`] draws one parameter of a grid coverage as map tiles. It
//! loads the domain and range through a [`CoverageSource`], selects a single
//! time step and vertical level, resolves the palette extent and hands an
//! immutable render snapshot to the resampler.
//!
//! # Architecture
//!
//! ```text
//! add() / set_time() / set_vertical()
//!      │
//!      ▼
//! generation += 1
//!      │
//!      ├─► load_domain ─► ensure grid + geodetic CRS
//!      │
//!      ├─► resolve_subset (nearest t / z)
//!      │
//!      ├─► subset_by_index ─► load_range
//!      │
//!      └─► apply (only if generation is still current)
//!               │
//!               ├─► resolve palette extent
//!               └─► swap RenderContext snapshot
//!                        │
//!                        ▼
//!               render_tile(projection, z/x/y)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use grid_layer::{CoverageJsonSource, GridLayer, LayerOptions};
//!
//! let source = Arc::new(CoverageJsonSource::open("temperature.covjson").await?);
//! let layer = GridLayer::new(source, LayerOptions::new("TMP"))?;
//! layer.add().await?;
//!
//! let tile = layer.render_tile(&projection::WebMercator, TileCoord::new(2, 1, 1));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod layer;
pub mod source;
pub mod subset;

pub use config::{LayerOptions, RedrawMode};
pub use error::{LayerError, Result};
pub use events::LayerEvent;
pub use layer::GridLayer;
pub use source::{CoverageJsonSource, CoverageSource};
pub use subset::{resolve_subset, AxisSubset, AxisSubsetState, SubsetPreference};

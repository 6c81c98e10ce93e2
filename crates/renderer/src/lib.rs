//! Tile rendering for gridded coverages.
//!
//! Turns a subset of a grid coverage into coloured map tiles:
//! - Nearest-index search on monotonic axes
//! - Bounding box and palette extent derivation
//! - Continuous and categorical colorization
//! - Tile resampling (rectilinear fast path and generic path)
//! - Continuous legends
//! - PNG encoding

pub mod bounds;
pub mod colorize;
pub mod config;
pub mod extent;
pub mod legend;
pub mod png;
pub mod resample;
pub mod search;

pub use bounds::derive_bounding_box;
pub use colorize::{CategoryIndex, ColorMode};
pub use config::RenderConfig;
pub use extent::resolve_palette_extent;
pub use legend::{ContinuousLegend, LegendOrientation, LegendTemplate, LegendTemplates};
pub use png::{encode_tile, PngError};
pub use resample::{wrap_longitude, RenderContext};
pub use search::{index_of_nearest, nearest_index};

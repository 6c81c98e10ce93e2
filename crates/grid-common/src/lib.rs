//! Common types shared across the grid tile workspace.
//!
//! The data model of a gridded coverage: axes, domain, range, parameters,
//! palettes, plus the CoverageJSON document layer that decodes into them.

pub mod axis;
pub mod bbox;
pub mod covjson;
pub mod crs;
pub mod domain;
pub mod error;
pub mod palette;
pub mod parameter;
pub mod range;
pub mod tile;
pub mod time;

pub use axis::{Axis, AxisId};
pub use bbox::{BoundingBox, LatLonBounds};
pub use covjson::CoverageDocument;
pub use crs::CrsCode;
pub use domain::{Domain, DomainType, ReferenceSystem, ReferenceSystemConnection};
pub use error::{ErrorCategory, GridError, GridResult};
pub use palette::{Palette, PaletteExtent, PaletteExtentSpec, Rgb};
pub use parameter::{Category, CategoryEncoding, Parameter, ParameterKind};
pub use range::{AxisIndices, GridRange, NdRange};
pub use tile::{TileCoord, TileImage, DEFAULT_TILE_SIZE};

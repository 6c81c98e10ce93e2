//! Renderer configuration.

use serde::{Deserialize, Serialize};
use std::env;

use grid_common::{GridError, GridResult, DEFAULT_TILE_SIZE};

/// Largest tile edge accepted.
pub const MAX_TILE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tile edge length in pixels.
    pub tile_size: usize,
    /// Render multi-tile requests on the rayon pool.
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Load from `GRID_RENDER_*` environment variables, falling back to
    /// defaults.
    pub fn from_env() -> GridResult<Self> {
        let mut config = Self::default();

        if let Ok(size) = env::var("GRID_RENDER_TILE_SIZE") {
            config.tile_size = size.parse().map_err(|_| {
                GridError::InvalidOperation(format!(
                    "GRID_RENDER_TILE_SIZE: invalid size '{}'",
                    size
                ))
            })?;
        }
        if let Ok(parallel) = env::var("GRID_RENDER_PARALLEL") {
            config.parallel = !matches!(parallel.to_lowercase().as_str(), "false" | "0");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(GridError::InvalidOperation(format!(
                "tile_size must be between 1 and {}, got {}",
                MAX_TILE_SIZE, self.tile_size
            )));
        }
        Ok(())
    }
}

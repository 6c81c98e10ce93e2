//! Resolution of palette extent policies into numeric extents.

use grid_common::{GridError, GridRange, GridResult, Parameter, PaletteExtent, PaletteExtentSpec};
use tracing::debug;

/// Turn an extent policy into a concrete `[low, high]` for the current
/// subset of a continuous parameter.
pub fn resolve_palette_extent(
    spec: &PaletteExtentSpec,
    parameter: &Parameter,
    range: &GridRange,
) -> GridResult<PaletteExtent> {
    if parameter.is_categorical() {
        return Err(GridError::InvalidOperation(format!(
            "palette extent does not apply to categorical parameter '{}'",
            parameter.key
        )));
    }

    let extent = match spec {
        PaletteExtentSpec::Explicit(extent) => *extent,
        PaletteExtentSpec::Subset => {
            let (low, high) = range.min_max().ok_or(GridError::EmptyRange)?;
            PaletteExtent::new(low, high)
        }
        PaletteExtentSpec::Fov => {
            return Err(GridError::NotImplemented("'fov' palette extent".to_string()));
        }
    };

    debug!(parameter = %parameter.key, extent = %extent, "Resolved palette extent");
    Ok(extent)
}

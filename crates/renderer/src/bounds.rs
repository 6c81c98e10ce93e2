//! Spatial extent of a grid domain.

use grid_common::{Axis, AxisId, BoundingBox, Domain, GridResult};

/// Derive the half-cell-extended bounding box of a domain's x/y axes.
///
/// Each end is pushed out by half the gap to its neighbour. Axes with
/// explicit cell bounds use the outermost bound instead. A single-sample axis
/// has zero extent on that dimension.
pub fn derive_bounding_box(domain: &Domain) -> GridResult<BoundingBox> {
    let (min_x, max_x) = axis_extent(domain.require_axis(AxisId::X)?)?;
    let (min_y, max_y) = axis_extent(domain.require_axis(AxisId::Y)?)?;
    Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
}

/// `(min, max)` covered by an axis.
pub fn axis_extent(axis: &Axis) -> GridResult<(f64, f64)> {
    let (first, last) = axis.first_last()?;

    let (lo, hi) = if let Some(bounds) = axis.bounds() {
        bounds
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(*b), hi.max(*b))
            })
    } else if axis.len() > 1 {
        let values = axis.values();
        let n = values.len();
        (
            first - (values[1] - first) / 2.0,
            last + (last - values[n - 2]) / 2.0,
        )
    } else {
        (first, last)
    };

    Ok(if lo > hi { (hi, lo) } else { (lo, hi) })
}

//! Nearest-value lookup on monotonic axes.

use grid_common::{Axis, GridError, GridResult};

/// Index of the value closest to `query` in an ascending or descending slice.
///
/// Ties go to the lower index. Queries beyond either end clamp to the
/// boundary index. Returns `None` for an empty slice or a NaN query.
#[inline]
pub fn nearest_index(values: &[f64], query: f64) -> Option<usize> {
    let n = values.len();
    if n == 0 || query.is_nan() {
        return None;
    }
    if n == 1 {
        return Some(0);
    }

    let descending = values[0] > values[n - 1];
    // First index past the query in axis order
    let i = if descending {
        values.partition_point(|v| *v > query)
    } else {
        values.partition_point(|v| *v < query)
    };

    if i == 0 {
        return Some(0);
    }
    if i == n {
        return Some(n - 1);
    }

    let below = (values[i - 1] - query).abs();
    let above = (values[i] - query).abs();
    Some(if below <= above { i - 1 } else { i })
}

/// Nearest index on an axis; an empty axis is an error.
pub fn index_of_nearest(axis: &Axis, query: f64) -> GridResult<usize> {
    if axis.is_empty() {
        return Err(GridError::EmptyAxis(axis.id()));
    }
    nearest_index(axis.values(), query).ok_or_else(|| {
        GridError::InvalidOperation(format!("cannot search axis '{}' for NaN", axis.id()))
    })
}

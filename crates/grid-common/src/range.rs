//! Range values: n-dimensional arrays and the 2-D views drawn from them.

use std::sync::Arc;

use crate::axis::AxisId;
use crate::error::{GridError, GridResult};

/// Indices selected for the non-horizontal axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisIndices {
    pub t: Option<usize>,
    pub z: Option<usize>,
}

impl AxisIndices {
    pub fn new(t: Option<usize>, z: Option<usize>) -> Self {
        Self { t, z }
    }

    pub fn get(&self, axis: AxisId) -> Option<usize> {
        match axis {
            AxisId::T => self.t,
            AxisId::Z => self.z,
            AxisId::X | AxisId::Y => None,
        }
    }
}

/// An n-dimensional array of nullable values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct NdRange {
    axis_names: Vec<AxisId>,
    shape: Vec<usize>,
    values: Arc<[Option<f64>]>,
}

impl NdRange {
    pub fn new(
        axis_names: Vec<AxisId>,
        shape: Vec<usize>,
        values: Vec<Option<f64>>,
    ) -> GridResult<Self> {
        if axis_names.len() != shape.len() {
            return Err(GridError::InvalidRange(format!(
                "{} axis names for a {}-dimensional shape",
                axis_names.len(),
                shape.len()
            )));
        }
        for (i, axis) in axis_names.iter().enumerate() {
            if axis_names[..i].contains(axis) {
                return Err(GridError::InvalidRange(format!(
                    "axis '{}' listed twice",
                    axis
                )));
            }
        }
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(GridError::InvalidRange(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            axis_names,
            shape,
            values: values.into(),
        })
    }

    /// Create a 2-D `[y, x]` range.
    pub fn grid(width: usize, height: usize, values: Vec<Option<f64>>) -> GridResult<Self> {
        Self::new(vec![AxisId::Y, AxisId::X], vec![height, width], values)
    }

    pub fn axis_names(&self) -> &[AxisId] {
        &self.axis_names
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length along an axis; axes not in the array have length 1.
    pub fn axis_len(&self, axis: AxisId) -> usize {
        self.position(axis).map(|i| self.shape[i]).unwrap_or(1)
    }

    fn position(&self, axis: AxisId) -> Option<usize> {
        self.axis_names.iter().position(|a| *a == axis)
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for i in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.shape[i + 1];
        }
        strides
    }

    /// Offset contribution of the fixed (t/z) axes, validating bounds.
    fn fixed_index(&self, axis: AxisId, fixed: &AxisIndices) -> GridResult<usize> {
        let len = self.axis_len(axis);
        match fixed.get(axis) {
            Some(idx) if idx < len => Ok(idx),
            Some(idx) => Err(GridError::InvalidRange(format!(
                "index {} out of bounds for axis '{}' of length {}",
                idx, axis, len
            ))),
            // An unfixed axis is only acceptable when it is degenerate
            None if len == 1 => Ok(0),
            None => Err(GridError::InvalidRange(format!(
                "axis '{}' has {} steps but no index was selected",
                axis, len
            ))),
        }
    }

    /// Copy out the slice at the given t/z indices.
    ///
    /// Fixed axes keep their name with length 1, so the result still lines up
    /// with the full domain's axis names.
    pub fn subset(&self, fixed: &AxisIndices) -> GridResult<NdRange> {
        let strides = self.strides();
        let mut out_shape = self.shape.clone();
        let mut base = 0;
        for (i, axis) in self.axis_names.iter().enumerate() {
            if !axis.is_horizontal() && fixed.get(*axis).is_some() {
                base += self.fixed_index(*axis, fixed)? * strides[i];
                out_shape[i] = 1;
            }
        }

        let total: usize = out_shape.iter().product();
        let mut values = Vec::with_capacity(total);
        let mut counter = vec![0usize; out_shape.len()];
        for _ in 0..total {
            let offset: usize = base
                + counter
                    .iter()
                    .zip(&strides)
                    .map(|(c, s)| c * s)
                    .sum::<usize>();
            values.push(self.values[offset]);

            // Advance the row-major counter
            for d in (0..counter.len()).rev() {
                counter[d] += 1;
                if counter[d] < out_shape[d] {
                    break;
                }
                counter[d] = 0;
            }
        }

        NdRange::new(self.axis_names.clone(), out_shape, values)
    }

    /// Zero-copy 2-D view over the x/y plane at the given t/z indices.
    pub fn grid_view(&self, fixed: &AxisIndices) -> GridResult<GridRange> {
        let strides = self.strides();
        let mut view = GridRange {
            values: Arc::clone(&self.values),
            width: 1,
            height: 1,
            x_stride: 0,
            y_stride: 0,
            offset: 0,
        };

        for (i, axis) in self.axis_names.iter().enumerate() {
            match axis {
                AxisId::X => {
                    view.width = self.shape[i];
                    view.x_stride = strides[i];
                }
                AxisId::Y => {
                    view.height = self.shape[i];
                    view.y_stride = strides[i];
                }
                AxisId::T | AxisId::Z => {
                    view.offset += self.fixed_index(*axis, fixed)? * strides[i];
                }
            }
        }

        Ok(view)
    }
}

/// A read-only `{x, y}` accessor with t/z already fixed.
///
/// Cloning is cheap; all views share the parent array.
#[derive(Debug, Clone)]
pub struct GridRange {
    values: Arc<[Option<f64>]>,
    width: usize,
    height: usize,
    x_stride: usize,
    y_stride: usize,
    offset: usize,
}

impl GridRange {
    /// Number of x samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of y samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at grid index `(x, y)`; `None` for no-data or out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values[self.offset + x * self.x_stride + y * self.y_stride]
    }

    /// Iterate over all values of the view (row by row).
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| self.get(x, y)))
    }

    /// Minimum and maximum of the non-null, non-NaN values.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    /// Ensure the view matches the domain's x/y axis lengths.
    pub fn ensure_shape(&self, x_len: usize, y_len: usize) -> GridResult<()> {
        if self.width != x_len || self.height != y_len {
            return Err(GridError::InvalidRange(format!(
                "range is {}x{} but domain axes are {}x{}",
                self.width, self.height, x_len, y_len
            )));
        }
        Ok(())
    }
}

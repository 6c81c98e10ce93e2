//! Coordinate axes of a gridded domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{GridError, GridResult};

/// Identifier of a domain axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    /// Horizontal axis (longitude / easting)
    X,
    /// Vertical map axis (latitude / northing)
    Y,
    /// Time
    T,
    /// Vertical level
    Z,
}

impl AxisId {
    /// Axes that are fixed to a single index before rendering.
    pub const SUBSETTABLE: [AxisId; 2] = [AxisId::T, AxisId::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            AxisId::X => "x",
            AxisId::Y => "y",
            AxisId::T => "t",
            AxisId::Z => "z",
        }
    }

    /// Check if this is one of the two horizontal axes.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, AxisId::X | AxisId::Y)
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisId {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(AxisId::X),
            "y" => Ok(AxisId::Y),
            "t" => Ok(AxisId::T),
            "z" => Ok(AxisId::Z),
            other => Err(GridError::InvalidCoverage(format!(
                "unknown axis name '{}'",
                other
            ))),
        }
    }
}

/// An ordered, monotonic sequence of coordinate values.
///
/// Values are shared behind an `Arc` so subsets and render snapshots can hold
/// the axis without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    id: AxisId,
    values: Arc<[f64]>,
    /// Cell bounds, two entries per coordinate (lower, upper).
    bounds: Option<Arc<[f64]>>,
}

impl Axis {
    /// Create an axis, rejecting sequences that are not strictly monotonic.
    ///
    /// An empty axis is accepted here; consumers that need a value report
    /// [`GridError::EmptyAxis`].
    pub fn new(id: AxisId, values: Vec<f64>) -> GridResult<Self> {
        if !is_monotonic(&values) {
            return Err(GridError::NonMonotonicAxis(id));
        }
        Ok(Self {
            id,
            values: values.into(),
            bounds: None,
        })
    }

    /// Create a regularly spaced axis from `start` to `stop` (inclusive).
    pub fn regular(id: AxisId, start: f64, stop: f64, num: usize) -> GridResult<Self> {
        let values = match num {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (num - 1) as f64;
                (0..num).map(|i| start + step * i as f64).collect()
            }
        };
        Self::new(id, values)
    }

    /// Attach cell bounds (`2 * len` values).
    pub fn with_bounds(mut self, bounds: Vec<f64>) -> GridResult<Self> {
        if bounds.len() != self.values.len() * 2 {
            return Err(GridError::InvalidCoverage(format!(
                "axis '{}' has {} values but {} bounds entries",
                self.id,
                self.values.len(),
                bounds.len()
            )));
        }
        self.bounds = Some(bounds.into());
        Ok(self)
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn bounds(&self) -> Option<&[f64]> {
        self.bounds.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied()
    }

    /// First and last coordinate, failing on an empty axis.
    pub fn first_last(&self) -> GridResult<(f64, f64)> {
        match (self.values.first(), self.values.last()) {
            (Some(&first), Some(&last)) => Ok((first, last)),
            _ => Err(GridError::EmptyAxis(self.id)),
        }
    }

    pub fn is_descending(&self) -> bool {
        self.values.len() > 1 && self.values[0] > self.values[self.values.len() - 1]
    }
}

fn is_monotonic(values: &[f64]) -> bool {
    if values.iter().any(|v| v.is_nan()) {
        return false;
    }
    if values.len() < 2 {
        return true;
    }
    let ascending = values.windows(2).all(|w| w[0] < w[1]);
    ascending || values.windows(2).all(|w| w[0] > w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_id_parse() {
        assert_eq!("x".parse::<AxisId>().unwrap(), AxisId::X);
        assert_eq!("t".parse::<AxisId>().unwrap(), AxisId::T);
        assert!("lat".parse::<AxisId>().is_err());
        assert_eq!(AxisId::Z.to_string(), "z");
    }

    #[test]
    fn test_monotonic_validation() {
        assert!(Axis::new(AxisId::X, vec![0.0, 1.0, 2.0]).is_ok());
        assert!(Axis::new(AxisId::Y, vec![20.0, 10.0, 0.0]).is_ok());
        assert!(Axis::new(AxisId::Y, vec![5.0]).is_ok());
        assert!(Axis::new(AxisId::Y, vec![]).is_ok());
        assert_eq!(
            Axis::new(AxisId::X, vec![0.0, 2.0, 1.0]),
            Err(GridError::NonMonotonicAxis(AxisId::X))
        );
        assert!(Axis::new(AxisId::X, vec![0.0, 0.0]).is_err());
        assert!(Axis::new(AxisId::X, vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_regular_axis() {
        let axis = Axis::regular(AxisId::X, -180.0, 180.0, 5).unwrap();
        assert_eq!(axis.values(), &[-180.0, -90.0, 0.0, 90.0, 180.0]);

        let single = Axis::regular(AxisId::Z, 850.0, 850.0, 1).unwrap();
        assert_eq!(single.values(), &[850.0]);
    }

    #[test]
    fn test_bounds_length_checked() {
        let axis = Axis::new(AxisId::X, vec![0.0, 1.0]).unwrap();
        assert!(axis.clone().with_bounds(vec![-0.5, 0.5, 0.5, 1.5]).is_ok());
        assert!(axis.with_bounds(vec![-0.5, 0.5]).is_err());
    }

    #[test]
    fn test_first_last_empty() {
        let axis = Axis::new(AxisId::T, vec![]).unwrap();
        assert_eq!(axis.first_last(), Err(GridError::EmptyAxis(AxisId::T)));
    }
}

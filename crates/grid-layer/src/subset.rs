//! Axis subsetting.
//!
//! Turns the user's preferred time and vertical coordinates into the indices
//! of the slice to draw. The two axes are always resolved together.

use grid_common::{AxisId, AxisIndices, Domain, GridResult};
use renderer::index_of_nearest;
use tracing::debug;

/// Resolved selection on one non-spatial axis.
///
/// `idx` and `coord` are `None` exactly when the domain lacks the axis; the
/// preference is kept either way.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisSubsetState {
    pub coord_pref: Option<f64>,
    pub idx: Option<usize>,
    pub coord: Option<f64>,
}

impl AxisSubsetState {
    /// An unresolved state holding only a preference.
    pub fn with_preference(coord_pref: Option<f64>) -> Self {
        Self {
            coord_pref,
            idx: None,
            coord: None,
        }
    }

    /// Resolve a preference against one axis of a domain.
    ///
    /// Without a preference the first step is selected; with one, the step
    /// nearest to it.
    pub fn resolve(domain: &Domain, axis: AxisId, coord_pref: Option<f64>) -> GridResult<Self> {
        let Some(values) = domain.axis(axis) else {
            return Ok(Self::with_preference(coord_pref));
        };

        let idx = match coord_pref {
            Some(pref) => index_of_nearest(values, pref)?,
            None => {
                values.first_last()?;
                0
            }
        };

        Ok(Self {
            coord_pref,
            idx: Some(idx),
            coord: values.get(idx),
        })
    }
}

/// Preferred coordinates for the time and vertical axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubsetPreference {
    /// Epoch milliseconds.
    pub t: Option<f64>,
    pub z: Option<f64>,
}

/// Resolved time and vertical selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisSubset {
    pub t: AxisSubsetState,
    pub z: AxisSubsetState,
}

impl AxisSubset {
    /// Unresolved selection carrying the preferences.
    pub fn unresolved(pref: SubsetPreference) -> Self {
        Self {
            t: AxisSubsetState::with_preference(pref.t),
            z: AxisSubsetState::with_preference(pref.z),
        }
    }

    pub fn preference(&self) -> SubsetPreference {
        SubsetPreference {
            t: self.t.coord_pref,
            z: self.z.coord_pref,
        }
    }

    /// Indices to pass to the data source.
    pub fn indices(&self) -> AxisIndices {
        AxisIndices::new(self.t.idx, self.z.idx)
    }
}

/// Resolve both axes as one unit.
pub fn resolve_subset(domain: &Domain, pref: SubsetPreference) -> GridResult<AxisSubset> {
    let subset = AxisSubset {
        t: AxisSubsetState::resolve(domain, AxisId::T, pref.t)?,
        z: AxisSubsetState::resolve(domain, AxisId::Z, pref.z)?,
    };
    debug!(
        t_idx = ?subset.t.idx,
        z_idx = ?subset.z.idx,
        "Resolved axis subset"
    );
    Ok(subset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::{Axis, GridError};

    fn domain() -> Domain {
        Domain::grid(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            Some(vec![100.0, 200.0, 300.0]),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_no_preference_selects_first() {
        let subset = resolve_subset(&domain(), SubsetPreference::default()).unwrap();
        assert_eq!(subset.t.idx, Some(0));
        assert_eq!(subset.t.coord, Some(100.0));
    }

    #[test]
    fn test_exact_value_selects_its_index() {
        let pref = SubsetPreference {
            t: Some(200.0),
            z: None,
        };
        let subset = resolve_subset(&domain(), pref).unwrap();
        assert_eq!(subset.t.idx, Some(1));
        assert_eq!(subset.indices(), AxisIndices::new(Some(1), None));
    }

    #[test]
    fn test_nearest_and_clamped() {
        let subset = resolve_subset(
            &domain(),
            SubsetPreference {
                t: Some(260.0),
                z: None,
            },
        )
        .unwrap();
        assert_eq!(subset.t.idx, Some(2));

        let subset = resolve_subset(
            &domain(),
            SubsetPreference {
                t: Some(-1e9),
                z: None,
            },
        )
        .unwrap();
        assert_eq!(subset.t.idx, Some(0));
    }

    #[test]
    fn test_absent_axis_keeps_preference() {
        let pref = SubsetPreference {
            t: None,
            z: Some(850.0),
        };
        let subset = resolve_subset(&domain(), pref).unwrap();
        assert_eq!(
            subset.z,
            AxisSubsetState {
                coord_pref: Some(850.0),
                idx: None,
                coord: None
            }
        );
        assert_eq!(subset.preference(), pref);
    }

    #[test]
    fn test_empty_axis_is_an_error() {
        let domain = Domain::new(
            grid_common::DomainType::Grid,
            vec![
                Axis::new(AxisId::X, vec![0.0]).unwrap(),
                Axis::new(AxisId::Y, vec![0.0]).unwrap(),
                Axis::new(AxisId::Z, vec![]).unwrap(),
            ],
            vec![],
        );
        let err = resolve_subset(&domain, SubsetPreference::default()).unwrap_err();
        assert_eq!(err, GridError::EmptyAxis(AxisId::Z));
    }
}

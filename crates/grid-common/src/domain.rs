//! Coverage domains: the axes a dataset is defined over plus their referencing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::axis::{Axis, AxisId};
use crate::crs::is_wgs84_geographic;
use crate::error::{GridError, GridResult};
use crate::range::AxisIndices;

/// Domain types defined by CoverageJSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainType {
    Grid,
    Point,
    PointSeries,
    VerticalProfile,
    Trajectory,
    MultiPoint,
    MultiPointSeries,
    Section,
    PolygonSeries,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Grid => "Grid",
            DomainType::Point => "Point",
            DomainType::PointSeries => "PointSeries",
            DomainType::VerticalProfile => "VerticalProfile",
            DomainType::Trajectory => "Trajectory",
            DomainType::MultiPoint => "MultiPoint",
            DomainType::MultiPointSeries => "MultiPointSeries",
            DomainType::Section => "Section",
            DomainType::PolygonSeries => "PolygonSeries",
        }
    }
}

/// Reference system definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ReferenceSystem {
    /// Geographic coordinate reference system.
    #[serde(rename = "GeographicCRS")]
    Geographic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Projected coordinate reference system.
    #[serde(rename = "ProjectedCRS")]
    Projected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Temporal reference system.
    #[serde(rename = "TemporalRS")]
    Temporal {
        #[serde(default = "default_calendar")]
        calendar: String,
    },

    /// Vertical reference system.
    #[serde(rename = "VerticalCRS")]
    Vertical {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Identifier-based reference system.
    #[serde(rename = "IdentifierRS")]
    Identifier {
        #[serde(rename = "targetConcept", default, skip_serializing_if = "Option::is_none")]
        target_concept: Option<serde_json::Value>,
    },
}

fn default_calendar() -> String {
    "Gregorian".to_string()
}

impl ReferenceSystem {
    /// WGS84 longitude/latitude.
    pub fn wgs84() -> Self {
        ReferenceSystem::Geographic {
            id: Some("http://www.opengis.net/def/crs/OGC/1.3/CRS84".to_string()),
        }
    }

    /// Check whether this is longitude/latitude on the WGS84 datum.
    pub fn is_geodetic(&self) -> bool {
        match self {
            ReferenceSystem::Geographic { id } => is_wgs84_geographic(id.as_deref()),
            _ => false,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ReferenceSystem::Geographic { id } => {
                format!("GeographicCRS {}", id.as_deref().unwrap_or("(no id)"))
            }
            ReferenceSystem::Projected { id } => {
                format!("ProjectedCRS {}", id.as_deref().unwrap_or("(no id)"))
            }
            ReferenceSystem::Temporal { calendar } => format!("TemporalRS {}", calendar),
            ReferenceSystem::Vertical { id } => {
                format!("VerticalCRS {}", id.as_deref().unwrap_or("(no id)"))
            }
            ReferenceSystem::Identifier { .. } => "IdentifierRS".to_string(),
        }
    }
}

/// Connection between axes and their reference system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSystemConnection {
    /// Axes that use this reference system.
    pub coordinates: Vec<String>,

    /// The reference system.
    pub system: ReferenceSystem,
}

/// The set of axes a coverage is defined over.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub domain_type: DomainType,
    axes: BTreeMap<AxisId, Axis>,
    pub referencing: Vec<ReferenceSystemConnection>,
}

impl Domain {
    pub fn new(
        domain_type: DomainType,
        axes: impl IntoIterator<Item = Axis>,
        referencing: Vec<ReferenceSystemConnection>,
    ) -> Self {
        let axes = axes.into_iter().map(|a| (a.id(), a)).collect();
        Self {
            domain_type,
            axes,
            referencing,
        }
    }

    /// Create a WGS84 grid domain.
    pub fn grid(
        x_values: Vec<f64>,
        y_values: Vec<f64>,
        t_values: Option<Vec<f64>>,
        z_values: Option<Vec<f64>>,
    ) -> GridResult<Self> {
        let mut axes = vec![
            Axis::new(AxisId::X, x_values)?,
            Axis::new(AxisId::Y, y_values)?,
        ];
        if let Some(t) = t_values {
            axes.push(Axis::new(AxisId::T, t)?);
        }
        if let Some(z) = z_values {
            axes.push(Axis::new(AxisId::Z, z)?);
        }

        let referencing = vec![ReferenceSystemConnection {
            coordinates: vec!["x".to_string(), "y".to_string()],
            system: ReferenceSystem::wgs84(),
        }];

        Ok(Self::new(DomainType::Grid, axes, referencing))
    }

    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.get(&id)
    }

    pub fn has_axis(&self, id: AxisId) -> bool {
        self.axes.contains_key(&id)
    }

    /// Get an axis that must exist.
    pub fn require_axis(&self, id: AxisId) -> GridResult<&Axis> {
        self.axes.get(&id).ok_or(GridError::MissingAxis(id))
    }

    pub fn axes(&self) -> impl Iterator<Item = &Axis> {
        self.axes.values()
    }

    /// Reduce the t/z axes to the single coordinate selected in `fixed`.
    ///
    /// Unselected axes and the horizontal axes are kept whole.
    pub fn subset_by_index(&self, fixed: &AxisIndices) -> GridResult<Domain> {
        let axes = self
            .axes
            .values()
            .map(|axis| match fixed.get(axis.id()) {
                Some(idx) if !axis.id().is_horizontal() => {
                    let value = axis.get(idx).ok_or_else(|| {
                        GridError::InvalidRange(format!(
                            "index {} out of bounds for axis '{}' of length {}",
                            idx,
                            axis.id(),
                            axis.len()
                        ))
                    })?;
                    let single = Axis::new(axis.id(), vec![value])?;
                    match axis.bounds() {
                        Some(bounds) => single.with_bounds(bounds[2 * idx..2 * idx + 2].to_vec()),
                        None => Ok(single),
                    }
                }
                _ => Ok(axis.clone()),
            })
            .collect::<GridResult<Vec<_>>>()?;

        Ok(Domain::new(self.domain_type, axes, self.referencing.clone()))
    }

    /// Reference system attached to the given axis.
    pub fn reference_system(&self, axis: AxisId) -> Option<&ReferenceSystem> {
        self.referencing
            .iter()
            .find(|r| r.coordinates.iter().any(|c| c == axis.as_str()))
            .map(|r| &r.system)
    }

    /// Reference system of the horizontal (x/y) axes.
    pub fn horizontal_crs(&self) -> Option<&ReferenceSystem> {
        self.reference_system(AxisId::X)
            .or_else(|| self.reference_system(AxisId::Y))
    }

    /// Ensure this is a Grid domain.
    pub fn ensure_grid(&self) -> GridResult<()> {
        if self.domain_type == DomainType::Grid {
            Ok(())
        } else {
            Err(GridError::UnsupportedDomainType(
                self.domain_type.as_str().to_string(),
            ))
        }
    }

    /// Ensure the horizontal axes are longitude/latitude on WGS84.
    ///
    /// No reprojection path exists, so any other system is fatal.
    pub fn ensure_geodetic(&self) -> GridResult<()> {
        match self.horizontal_crs() {
            Some(crs) if crs.is_geodetic() => Ok(()),
            Some(crs) => Err(GridError::UnsupportedReferenceSystem(format!(
                "{} (only WGS84 longitude/latitude grids can be drawn)",
                crs.describe()
            ))),
            None => Err(GridError::UnsupportedReferenceSystem(
                "domain has no reference system for the x/y axes".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_by_index_reduces_time() {
        let domain = Domain::grid(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            Some(vec![100.0, 200.0, 300.0]),
            Some(vec![10.0]),
        )
        .unwrap();

        let subset = domain
            .subset_by_index(&AxisIndices::new(Some(2), None))
            .unwrap();
        assert_eq!(subset.axis(AxisId::T).unwrap().values(), &[300.0]);
        assert_eq!(subset.axis(AxisId::Z).unwrap().values(), &[10.0]);
        assert_eq!(subset.axis(AxisId::X).unwrap().len(), 2);

        assert!(domain
            .subset_by_index(&AxisIndices::new(Some(3), None))
            .is_err());
    }

    #[test]
    fn test_grid_domain() {
        let domain = Domain::grid(
            vec![0.0, 1.0, 2.0],
            vec![10.0, 11.0],
            Some(vec![0.0, 3_600_000.0]),
            None,
        )
        .unwrap();

        assert!(domain.has_axis(AxisId::X));
        assert!(domain.has_axis(AxisId::T));
        assert!(!domain.has_axis(AxisId::Z));
        assert_eq!(domain.axis(AxisId::X).unwrap().len(), 3);
        assert!(domain.ensure_grid().is_ok());
        assert!(domain.ensure_geodetic().is_ok());
    }

    #[test]
    fn test_non_grid_rejected() {
        let x = Axis::new(AxisId::X, vec![1.0]).unwrap();
        let y = Axis::new(AxisId::Y, vec![2.0]).unwrap();
        let domain = Domain::new(DomainType::Point, vec![x, y], vec![]);
        assert_eq!(
            domain.ensure_grid(),
            Err(GridError::UnsupportedDomainType("Point".to_string()))
        );
    }

    #[test]
    fn test_projected_crs_rejected() {
        let x = Axis::new(AxisId::X, vec![0.0, 1000.0]).unwrap();
        let y = Axis::new(AxisId::Y, vec![0.0, 1000.0]).unwrap();
        let referencing = vec![ReferenceSystemConnection {
            coordinates: vec!["x".into(), "y".into()],
            system: ReferenceSystem::Projected {
                id: Some("http://www.opengis.net/def/crs/EPSG/0/27700".into()),
            },
        }];
        let domain = Domain::new(DomainType::Grid, vec![x, y], referencing);
        let err = domain.ensure_geodetic().unwrap_err();
        assert!(matches!(err, GridError::UnsupportedReferenceSystem(_)));
    }

    #[test]
    fn test_missing_referencing_rejected() {
        let x = Axis::new(AxisId::X, vec![0.0]).unwrap();
        let y = Axis::new(AxisId::Y, vec![0.0]).unwrap();
        let domain = Domain::new(DomainType::Grid, vec![x, y], vec![]);
        assert!(domain.ensure_geodetic().is_err());
    }
}

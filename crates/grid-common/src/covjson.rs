//! CoverageJSON documents.
//!
//! Serde types for the subset of CoverageJSON this workspace reads, plus the
//! decoding into the typed model ([`Domain`], [`Parameter`], [`NdRange`]).
//!
//! See: <https://covjson.org/>

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::axis::{Axis, AxisId};
use crate::domain::{Domain, DomainType, ReferenceSystemConnection};
use crate::error::{GridError, GridResult};
use crate::parameter::{Category, CategoryEncoding, Parameter};
use crate::range::NdRange;
use crate::time::iso_to_axis_value;

/// A CoverageJSON document containing a single coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageDocument {
    /// Document type (always "Coverage").
    #[serde(rename = "type")]
    pub type_: String,

    /// The domain defining the coverage's spatial/temporal extent.
    pub domain: DomainDocument,

    /// Parameter definitions.
    #[serde(default)]
    pub parameters: HashMap<String, ParameterDocument>,

    /// Data ranges for each parameter.
    #[serde(default)]
    pub ranges: HashMap<String, NdArrayDocument>,
}

impl CoverageDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let doc: CoverageDocument = serde_json::from_str(json)?;
        if doc.type_ != "Coverage" {
            return Err(GridError::InvalidCoverage(format!(
                "expected a Coverage document, got '{}'",
                doc.type_
            )));
        }
        Ok(doc)
    }

    /// Decode the domain into the typed model.
    pub fn decode_domain(&self) -> GridResult<Domain> {
        self.domain.decode()
    }

    /// Decode all parameter definitions, keyed by parameter key.
    pub fn decode_parameters(&self) -> GridResult<HashMap<String, Parameter>> {
        self.parameters
            .iter()
            .map(|(key, doc)| Ok((key.clone(), doc.decode(key)?)))
            .collect()
    }

    /// Decode the range of one parameter.
    pub fn decode_range(&self, key: &str) -> GridResult<NdRange> {
        let array = self
            .ranges
            .get(key)
            .ok_or_else(|| GridError::ParameterNotFound(key.to_string()))?;
        array.decode()
    }
}

/// The domain object of a coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainDocument {
    /// Domain object type ("Domain").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// The domain type (Grid, Point, etc.).
    #[serde(rename = "domainType")]
    pub domain_type: DomainType,

    /// Axis definitions.
    pub axes: HashMap<String, AxisDocument>,

    /// Reference systems for axes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referencing: Vec<ReferenceSystemConnection>,
}

impl DomainDocument {
    pub fn decode(&self) -> GridResult<Domain> {
        let mut axes = Vec::with_capacity(self.axes.len());
        for (name, doc) in &self.axes {
            let id: AxisId = name.parse()?;
            axes.push(doc.decode(id)?);
        }
        debug!(
            domain_type = self.domain_type.as_str(),
            axes = axes.len(),
            "Decoded CoverageJSON domain"
        );
        Ok(Domain::new(self.domain_type, axes, self.referencing.clone()))
    }
}

/// An axis in the domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisDocument {
    /// Explicit list of values, optionally with cell bounds.
    Values {
        values: Vec<AxisValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<Vec<AxisValue>>,
    },
    /// Regular axis defined by start, stop, and number of points.
    Regular { start: f64, stop: f64, num: usize },
}

impl AxisDocument {
    /// Get the number of values in this axis.
    pub fn len(&self) -> usize {
        match self {
            AxisDocument::Values { values, .. } => values.len(),
            AxisDocument::Regular { num, .. } => *num,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(&self, id: AxisId) -> GridResult<Axis> {
        match self {
            AxisDocument::Regular { start, stop, num } => Axis::regular(id, *start, *stop, *num),
            AxisDocument::Values { values, bounds } => {
                let values = decode_axis_values(id, values)?;
                let axis = Axis::new(id, values)?;
                match bounds {
                    Some(bounds) => axis.with_bounds(decode_axis_values(id, bounds)?),
                    None => Ok(axis),
                }
            }
        }
    }
}

fn decode_axis_values(id: AxisId, values: &[AxisValue]) -> GridResult<Vec<f64>> {
    values
        .iter()
        .map(|v| match (v, id) {
            (AxisValue::Float(f), _) => Ok(*f),
            (AxisValue::String(s), AxisId::T) => iso_to_axis_value(s),
            (AxisValue::String(s), _) => Err(GridError::InvalidCoverage(format!(
                "axis '{}' has non-numeric value '{}'",
                id, s
            ))),
        })
        .collect()
}

/// A value on an axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    /// Floating-point value (coordinates, levels).
    Float(f64),
    /// String value (timestamps).
    String(String),
}

/// A parameter definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDocument {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,

    #[serde(rename = "observedProperty")]
    pub observed_property: ObservedPropertyDocument,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitDocument>,

    /// Category id to the raw value(s) encoding it.
    #[serde(
        rename = "categoryEncoding",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_encoding: Option<HashMap<String, CategoryCode>>,
}

impl ParameterDocument {
    fn decode(&self, key: &str) -> GridResult<Parameter> {
        let label = self
            .observed_property
            .label
            .as_ref()
            .map(|l| l.text().to_string());
        let unit = self.unit.as_ref().and_then(UnitDocument::display);

        let mut parameter = match &self.category_encoding {
            None => Parameter::continuous(key),
            Some(encoding) => {
                let categories = self
                    .observed_property
                    .categories
                    .as_deref()
                    .unwrap_or(&[])
                    .iter()
                    .map(|c| Category {
                        id: c.id.clone(),
                        label: c
                            .label
                            .as_ref()
                            .map(|l| l.text().to_string())
                            .unwrap_or_else(|| c.id.clone()),
                        preferred_color: c.preferred_color.clone(),
                    })
                    .collect();
                let encoding = encoding
                    .iter()
                    .map(|(id, code)| (id.clone(), code.values()))
                    .collect();
                Parameter::categorical(key, categories, CategoryEncoding(encoding))?
            }
        };

        parameter.label = label;
        parameter.unit = unit;
        Ok(parameter)
    }
}

/// One raw value or a list of raw values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryCode {
    One(i64),
    Many(Vec<i64>),
}

impl CategoryCode {
    pub fn values(&self) -> Vec<i64> {
        match self {
            CategoryCode::One(v) => vec![*v],
            CategoryCode::Many(v) => v.clone(),
        }
    }
}

/// Internationalized string supporting multiple languages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum I18nString {
    /// Simple string (assumes English).
    Simple(String),
    /// Map of language codes to strings.
    Localized(HashMap<String, String>),
}

impl I18nString {
    /// Get the English text, or any available text.
    pub fn text(&self) -> &str {
        match self {
            I18nString::Simple(s) => s,
            I18nString::Localized(map) => map
                .get("en")
                .map(|s| s.as_str())
                .unwrap_or_else(|| map.values().next().map(|s| s.as_str()).unwrap_or("")),
        }
    }
}

/// The observed property being measured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservedPropertyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    /// Categories for categorical data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryDocument>>,
}

/// A category for categorical observed properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryDocument {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(
        rename = "preferredColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_color: Option<String>,
}

/// Unit of measurement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<UnitSymbol>,
}

impl UnitDocument {
    /// Symbol if present, otherwise the label.
    fn display(&self) -> Option<String> {
        match (&self.symbol, &self.label) {
            (Some(UnitSymbol::Simple(s)), _) => Some(s.clone()),
            (Some(UnitSymbol::Structured { value, .. }), _) => Some(value.clone()),
            (None, Some(label)) => Some(label.text().to_string()),
            (None, None) => None,
        }
    }
}

/// Unit symbol representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UnitSymbol {
    Simple(String),
    Structured {
        value: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_: Option<String>,
    },
}

/// N-dimensional array containing data values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdArrayDocument {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    #[serde(rename = "axisNames", default, skip_serializing_if = "Option::is_none")]
    pub axis_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,

    /// The data values (null for missing data).
    pub values: Vec<Option<f64>>,
}

impl NdArrayDocument {
    pub fn decode(&self) -> GridResult<NdRange> {
        match (&self.axis_names, &self.shape) {
            (Some(names), Some(shape)) => {
                let axis_names = names
                    .iter()
                    .map(|n| n.parse())
                    .collect::<GridResult<Vec<AxisId>>>()?;
                NdRange::new(axis_names, shape.clone(), self.values.clone())
            }
            (None, None) if self.values.len() == 1 => {
                NdRange::new(Vec::new(), Vec::new(), self.values.clone())
            }
            _ => Err(GridError::InvalidRange(
                "NdArray needs axisNames and shape".to_string(),
            )),
        }
    }
}

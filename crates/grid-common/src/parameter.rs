//! Parameters (observed quantities) and their categorical encodings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GridError, GridResult};

/// A category of a categorical parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    /// Hex color such as `#1f78b4`.
    #[serde(rename = "preferredColor", default, skip_serializing_if = "Option::is_none")]
    pub preferred_color: Option<String>,
}

/// Mapping from category id to the raw integer values that encode it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryEncoding(pub HashMap<String, Vec<i64>>);

impl CategoryEncoding {
    pub fn values_for(&self, category_id: &str) -> &[i64] {
        self.0.get(category_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Whether values form a continuum or enumerate categories.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Continuous,
    Categorical {
        categories: Vec<Category>,
        encoding: CategoryEncoding,
    },
}

/// A parameter of a coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub key: String,
    pub label: Option<String>,
    pub unit: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn continuous(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            unit: None,
            kind: ParameterKind::Continuous,
        }
    }

    /// Create a categorical parameter.
    ///
    /// Every encoding entry must name a declared category.
    pub fn categorical(
        key: impl Into<String>,
        categories: Vec<Category>,
        encoding: CategoryEncoding,
    ) -> GridResult<Self> {
        let key = key.into();
        if categories.is_empty() {
            return Err(GridError::InvalidCoverage(format!(
                "parameter '{}' has a category encoding but no categories",
                key
            )));
        }
        for id in encoding.0.keys() {
            if !categories.iter().any(|c| &c.id == id) {
                return Err(GridError::InvalidCoverage(format!(
                    "category encoding of '{}' refers to unknown category '{}'",
                    key, id
                )));
            }
        }
        Ok(Self {
            key,
            label: None,
            unit: None,
            kind: ParameterKind::Categorical {
                categories,
                encoding,
            },
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, ParameterKind::Categorical { .. })
    }

    pub fn categories(&self) -> Option<&[Category]> {
        match &self.kind {
            ParameterKind::Categorical { categories, .. } => Some(categories),
            ParameterKind::Continuous => None,
        }
    }

    /// Display title: label if present, otherwise the key.
    pub fn title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

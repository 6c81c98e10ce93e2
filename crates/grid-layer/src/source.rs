//! Coverage data sources.
//!
//! The layer never touches CoverageJSON directly; it talks to a
//! [`CoverageSource`], which may fetch lazily over the network or hold a
//! whole document in memory like [`CoverageJsonSource`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use grid_common::{AxisIndices, CoverageDocument, Domain, NdRange, Parameter};
use tracing::{debug, info};

use crate::error::{LayerError, Result};

/// Access to one coverage.
///
/// Parameter metadata is available synchronously so layer construction can
/// validate its options without awaiting anything.
#[async_trait]
pub trait CoverageSource: Send + Sync {
    /// Parameters of the coverage, keyed by parameter key.
    fn parameters(&self) -> &HashMap<String, Parameter>;

    /// Load the domain.
    async fn load_domain(&self) -> Result<Domain>;

    /// Load the range of one parameter.
    async fn load_range(&self, key: &str) -> Result<NdRange>;

    /// A source restricted to the given t/z indices.
    async fn subset_by_index(&self, fixed: &AxisIndices) -> Result<Arc<dyn CoverageSource>>;
}

/// An in-memory coverage decoded from a CoverageJSON document.
///
/// Subsets share the decoded ranges; only the selected indices change.
#[derive(Debug, Clone)]
pub struct CoverageJsonSource {
    domain: Arc<Domain>,
    parameters: HashMap<String, Parameter>,
    ranges: Arc<HashMap<String, NdRange>>,
    fixed: AxisIndices,
}

impl CoverageJsonSource {
    /// Decode a parsed document.
    pub fn from_document(doc: &CoverageDocument) -> Result<Self> {
        let domain = doc.decode_domain()?;
        let parameters = doc.decode_parameters()?;
        let ranges = doc
            .ranges
            .keys()
            .map(|key| Ok((key.clone(), doc.decode_range(key)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        debug!(
            parameters = parameters.len(),
            ranges = ranges.len(),
            "Decoded CoverageJSON coverage"
        );

        Ok(Self {
            domain: Arc::new(domain),
            parameters,
            ranges: Arc::new(ranges),
            fixed: AxisIndices::default(),
        })
    }

    /// Parse and decode a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(&CoverageDocument::from_json(json)?)
    }

    /// Read and decode a CoverageJSON file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        info!(path = %path.display(), bytes = json.len(), "Loaded CoverageJSON file");
        Self::from_json(&json)
    }

    /// Indices this source is restricted to.
    pub fn fixed(&self) -> AxisIndices {
        self.fixed
    }
}

#[async_trait]
impl CoverageSource for CoverageJsonSource {
    fn parameters(&self) -> &HashMap<String, Parameter> {
        &self.parameters
    }

    async fn load_domain(&self) -> Result<Domain> {
        Ok(self.domain.subset_by_index(&self.fixed)?)
    }

    async fn load_range(&self, key: &str) -> Result<NdRange> {
        let range = self
            .ranges
            .get(key)
            .ok_or_else(|| LayerError::source_failed(format!("no range for parameter '{}'", key)))?;
        Ok(range.subset(&self.fixed)?)
    }

    async fn subset_by_index(&self, fixed: &AxisIndices) -> Result<Arc<dyn CoverageSource>> {
        if (self.fixed.t.is_some() && fixed.t.is_some())
            || (self.fixed.z.is_some() && fixed.z.is_some())
        {
            return Err(LayerError::source_failed(
                "an axis of this source has already been subset",
            ));
        }
        let fixed = AxisIndices::new(self.fixed.t.or(fixed.t), self.fixed.z.or(fixed.z));

        // Validate the indices against the full domain up front
        self.domain.subset_by_index(&fixed)?;

        Ok(Arc::new(Self {
            domain: Arc::clone(&self.domain),
            parameters: self.parameters.clone(),
            ranges: Arc::clone(&self.ranges),
            fixed,
        }))
    }
}

// rust/feed-core/src/graph/feed.rs

use serde::{Deserialize, Serialize};

use crate::dataset::Feeder;
use crate::error::{Result, ValidationError};

use super::edge::EdgeType;
use super::sample::{unique_edge_set, GraphSample};
use super::EdgeKeyPolicy;

/// Edge set and bounds every graph sample is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFeedConfig {
    /// Edge kinds whose edges are checked. Must not contain duplicates.
    pub edge_set: Vec<EdgeType>,
    /// Inclusive upper bound for node type ids.
    pub max_node_type: i64,
    /// Inclusive upper bound for node subtoken ids.
    pub max_node_subtoken: i64,
    /// Treatment of edge keys outside `edge_set`.
    pub edge_keys: EdgeKeyPolicy,
}

impl Default for GraphFeedConfig {
    fn default() -> Self {
        Self {
            edge_set: EdgeType::ALL.to_vec(),
            max_node_type: 255,
            max_node_subtoken: 65_535,
            edge_keys: EdgeKeyPolicy::Lenient,
        }
    }
}

impl GraphFeedConfig {
    pub fn new(edge_set: Vec<EdgeType>, max_node_type: i64, max_node_subtoken: i64) -> Self {
        Self {
            edge_set,
            max_node_type,
            max_node_subtoken,
            edge_keys: EdgeKeyPolicy::Lenient,
        }
    }

    #[must_use]
    pub fn with_edge_keys(mut self, policy: EdgeKeyPolicy) -> Self {
        self.edge_keys = policy;
        self
    }

    /// Checks the configuration itself, independent of any sample.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEdgeType` if the edge set repeats a kind.
    pub fn check(&self) -> std::result::Result<(), ValidationError> {
        unique_edge_set(&self.edge_set).map(|_| ())
    }

    /// Validates `sample` against this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found in the sample.
    pub fn validate(&self, sample: &GraphSample) -> std::result::Result<(), ValidationError> {
        sample.assert_valid_with(
            &self.edge_set,
            self.max_node_type,
            self.max_node_subtoken,
            self.edge_keys,
        )
    }
}

/// Feeder adapter that validates every graph sample before handing it on.
///
/// A sample that fails validation surfaces as `FeedError::Validation`; the
/// upstream feeder has already advanced past it.
pub struct ValidatingFeeder<F> {
    inner: F,
    config: GraphFeedConfig,
    validated: u64,
}

impl<F> ValidatingFeeder<F>
where
    F: Feeder<Item = GraphSample>,
{
    /// # Errors
    ///
    /// Returns a validation error if `config` has a duplicate edge type.
    pub fn new(inner: F, config: GraphFeedConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            inner,
            config,
            validated: 0,
        })
    }

    pub fn config(&self) -> &GraphFeedConfig {
        &self.config
    }

    /// Number of samples that passed validation so far.
    pub fn validated(&self) -> u64 {
        self.validated
    }

    pub fn get_ref(&self) -> &F {
        &self.inner
    }
}

impl<F> Feeder for ValidatingFeeder<F>
where
    F: Feeder<Item = GraphSample>,
{
    type Item = GraphSample;

    fn next(&mut self) -> Result<GraphSample> {
        let sample = self.inner.next()?;
        self.config.validate(&sample)?;
        self.validated += 1;
        Ok(sample)
    }

    fn stop(&mut self) {
        self.inner.stop();
    }
}

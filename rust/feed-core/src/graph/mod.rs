// rust/feed-core/src/graph/mod.rs

//! Graph-shaped training samples and their validation.
//!
//! A [`GraphSample`] carries two parallel per-node maps (types and
//! subtokens, both [`SegmentedIndices`] keyed by node id) and typed edge
//! lists. [`GraphFeedConfig`] holds the edge set and bounds a sample is
//! checked against; [`ValidatingFeeder`] applies it to every sample pulled
//! from an upstream feeder.
//!
//! # Example
//!
//! ```
//! use feed_core::graph::{Edge, EdgeKey, EdgeType, GraphSample, SegmentedIndices};
//!
//! let sample = GraphSample::new(
//!     SegmentedIndices::from_segments([(0, vec![1]), (1, vec![2])]),
//!     SegmentedIndices::from_segments([(0, vec![7, 8]), (1, vec![9])]),
//! )
//! .with_edges(EdgeKey::forward(EdgeType::NextToken), [Edge::new(0, 1)]);
//!
//! sample.assert_valid(&[EdgeType::NextToken], 4, 16).unwrap();
//! ```

mod edge;
mod feed;
mod sample;
mod segmented;

use serde::{Deserialize, Serialize};

pub use edge::{Direction, Edge, EdgeKey, EdgeType, REVERSE_SUFFIX};
pub use feed::{GraphFeedConfig, ValidatingFeeder};
pub use sample::GraphSample;
pub use segmented::SegmentedIndices;

/// Identifier of a node within one sample.
pub type NodeId = u32;

/// How validation treats edge keys whose kind is not in the edge set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKeyPolicy {
    /// Skip those edges without checking them.
    #[default]
    Lenient,
    /// Reject the sample.
    Strict,
}

impl std::str::FromStr for EdgeKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(EdgeKeyPolicy::Lenient),
            "strict" => Ok(EdgeKeyPolicy::Strict),
            _ => Err(format!("unknown edge key policy '{s}', expected 'lenient' or 'strict'")),
        }
    }
}

// rust/feed-core/src/graph/sample.rs

//! A single typed-graph training example and its structural checks.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{NodeMap, ValidationError};

use super::edge::{Edge, EdgeKey, EdgeType};
use super::segmented::SegmentedIndices;
use super::EdgeKeyPolicy;

/// One graph sample: per-node types, per-node subtokens and typed edges.
///
/// Node ids index into both `node_types` and `node_subtokens`. Edge lists
/// whose key names a known edge kind are stored under an [`EdgeKey`];
/// any other key is carried verbatim in a pass-through map so that newer
/// edge kinds survive decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GraphSampleWire", into = "GraphSampleWire")]
pub struct GraphSample {
    node_types: SegmentedIndices,
    node_subtokens: SegmentedIndices,
    edges: BTreeMap<EdgeKey, Vec<Edge>>,
    unrecognized_edges: BTreeMap<String, Vec<Edge>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphSampleWire {
    node_types: SegmentedIndices,
    node_subtokens: SegmentedIndices,
    #[serde(default)]
    edges: BTreeMap<String, Vec<Edge>>,
}

impl From<GraphSampleWire> for GraphSample {
    fn from(wire: GraphSampleWire) -> Self {
        let mut sample = GraphSample::new(wire.node_types, wire.node_subtokens);
        for (key, edges) in wire.edges {
            match key.parse::<EdgeKey>() {
                Ok(edge_key) => sample.add_edges(edge_key, edges),
                Err(_) => {
                    sample.unrecognized_edges.entry(key).or_default().extend(edges);
                }
            }
        }
        sample
    }
}

impl From<GraphSample> for GraphSampleWire {
    fn from(sample: GraphSample) -> Self {
        let mut edges: BTreeMap<String, Vec<Edge>> = sample
            .edges
            .into_iter()
            .map(|(key, edges)| (key.to_string(), edges))
            .collect();
        edges.extend(sample.unrecognized_edges);

        GraphSampleWire {
            node_types: sample.node_types,
            node_subtokens: sample.node_subtokens,
            edges,
        }
    }
}

impl GraphSample {
    pub fn new(node_types: SegmentedIndices, node_subtokens: SegmentedIndices) -> Self {
        Self {
            node_types,
            node_subtokens,
            edges: BTreeMap::new(),
            unrecognized_edges: BTreeMap::new(),
        }
    }

    /// Appends `edges` to the list stored under `key`.
    pub fn add_edges(&mut self, key: EdgeKey, edges: impl IntoIterator<Item = Edge>) {
        self.edges.entry(key).or_default().extend(edges);
    }

    #[must_use]
    pub fn with_edges(mut self, key: EdgeKey, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.add_edges(key, edges);
        self
    }

    pub fn node_types(&self) -> &SegmentedIndices {
        &self.node_types
    }

    pub fn node_subtokens(&self) -> &SegmentedIndices {
        &self.node_subtokens
    }

    pub fn edges(&self, key: EdgeKey) -> &[Edge] {
        self.edges.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_lists(&self) -> impl Iterator<Item = (EdgeKey, &[Edge])> + '_ {
        self.edges.iter().map(|(&key, edges)| (key, edges.as_slice()))
    }

    /// Edge lists stored under keys that name no known edge kind.
    pub fn unrecognized_edges(&self) -> impl Iterator<Item = (&str, &[Edge])> + '_ {
        self.unrecognized_edges
            .iter()
            .map(|(key, edges)| (key.as_str(), edges.as_slice()))
    }

    /// Number of distinct edge keys, recognized or not.
    pub fn num_edge_keys(&self) -> usize {
        self.edges.len() + self.unrecognized_edges.len()
    }

    /// Number of distinct node ids in the node-types map.
    pub fn num_nodes(&self) -> usize {
        self.node_types.num_samples()
    }

    /// Validates the sample, skipping edge keys outside `edge_set`.
    ///
    /// # Errors
    ///
    /// See [`GraphSample::assert_valid_with`].
    pub fn assert_valid(
        &self,
        edge_set: &[EdgeType],
        max_node_type: i64,
        max_node_subtoken: i64,
    ) -> Result<(), ValidationError> {
        self.assert_valid_with(
            edge_set,
            max_node_type,
            max_node_subtoken,
            EdgeKeyPolicy::Lenient,
        )
    }

    /// Validates the sample against an edge set and inclusive upper bounds
    /// for node types and subtokens.
    ///
    /// Checks, in order: `edge_set` has no duplicates; node types and
    /// subtokens are within bounds; both maps cover the same node ids; the
    /// number of edge keys is at most twice the edge set; every edge under a
    /// configured kind has both endpoints in `[0, num_nodes)`. Edge keys
    /// outside the edge set are skipped under [`EdgeKeyPolicy::Lenient`] and
    /// rejected under [`EdgeKeyPolicy::Strict`].
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn assert_valid_with(
        &self,
        edge_set: &[EdgeType],
        max_node_type: i64,
        max_node_subtoken: i64,
        policy: EdgeKeyPolicy,
    ) -> Result<(), ValidationError> {
        let configured = unique_edge_set(edge_set)?;

        self.node_types.assert_valid(None, max_node_type)?;
        self.node_subtokens.assert_valid(None, max_node_subtoken)?;

        if let Some(node_id) = self
            .node_types
            .sample_ids()
            .find(|&id| !self.node_subtokens.contains(id))
        {
            return Err(ValidationError::NodeSetMismatch {
                node_id,
                missing_from: NodeMap::Subtokens,
            });
        }
        if let Some(node_id) = self
            .node_subtokens
            .sample_ids()
            .find(|&id| !self.node_types.contains(id))
        {
            return Err(ValidationError::NodeSetMismatch {
                node_id,
                missing_from: NodeMap::Types,
            });
        }

        let num_nodes = self.num_nodes();

        let max_keys = 2 * edge_set.len();
        if self.num_edge_keys() > max_keys {
            return Err(ValidationError::TooManyEdgeKeys {
                found: self.num_edge_keys(),
                max: max_keys,
            });
        }

        let log_skipped = tracing::enabled!(tracing::Level::DEBUG);
        let mut skipped = Vec::new();
        for (key, edges) in &self.edges {
            if !configured.contains(&key.edge_type) {
                match policy {
                    EdgeKeyPolicy::Lenient => {
                        if log_skipped {
                            skipped.push(key.to_string());
                        }
                        continue;
                    }
                    EdgeKeyPolicy::Strict => {
                        return Err(ValidationError::UnrecognizedEdgeKey(key.to_string()));
                    }
                }
            }

            if let Some(edge) = edges.iter().find(|edge| !edge.within(num_nodes)) {
                return Err(ValidationError::EdgeEndpointOutOfRange {
                    edge_key: key.to_string(),
                    edge: *edge,
                    num_nodes,
                });
            }
        }

        if let Some(key) = self.unrecognized_edges.keys().next() {
            if policy == EdgeKeyPolicy::Strict {
                return Err(ValidationError::UnrecognizedEdgeKey(key.clone()));
            }
        }
        if log_skipped {
            skipped.extend(self.unrecognized_edges.keys().cloned());
        }

        if !skipped.is_empty() {
            tracing::debug!(?skipped, "skipped edge keys outside the configured edge set");
        }

        Ok(())
    }
}

/// Returns the edge set as a lookup set, rejecting duplicates.
pub(crate) fn unique_edge_set(
    edge_set: &[EdgeType],
) -> Result<HashSet<EdgeType>, ValidationError> {
    let mut seen = HashSet::with_capacity(edge_set.len());
    for &edge_type in edge_set {
        if !seen.insert(edge_type) {
            return Err(ValidationError::DuplicateEdgeType(edge_type));
        }
    }
    Ok(seen)
}

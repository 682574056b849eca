// rust/feed-core/src/graph/segmented.rs

//! Jagged per-sample index lists.
//!
//! On the wire a `SegmentedIndices` is two parallel arrays: `sample_ids[i]`
//! names the sample that owns `indices[i]`. In memory the indices are
//! grouped per sample, keeping the order they appeared in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SegmentedIndicesWire", into = "SegmentedIndicesWire")]
pub struct SegmentedIndices {
    segments: BTreeMap<NodeId, Vec<i64>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SegmentedIndicesWire {
    sample_ids: Vec<NodeId>,
    indices: Vec<i64>,
}

impl TryFrom<SegmentedIndicesWire> for SegmentedIndices {
    type Error = String;

    fn try_from(wire: SegmentedIndicesWire) -> Result<Self, Self::Error> {
        if wire.sample_ids.len() != wire.indices.len() {
            return Err(format!(
                "sample_ids and indices differ in length ({} vs {})",
                wire.sample_ids.len(),
                wire.indices.len()
            ));
        }

        let mut segmented = SegmentedIndices::new();
        for (sample_id, index) in wire.sample_ids.into_iter().zip(wire.indices) {
            segmented.push(sample_id, index);
        }
        Ok(segmented)
    }
}

impl From<SegmentedIndices> for SegmentedIndicesWire {
    fn from(segmented: SegmentedIndices) -> Self {
        let len = segmented.num_indices();
        let mut wire = SegmentedIndicesWire {
            sample_ids: Vec::with_capacity(len),
            indices: Vec::with_capacity(len),
        };
        for (sample_id, indices) in segmented.segments {
            for index in indices {
                wire.sample_ids.push(sample_id);
                wire.indices.push(index);
            }
        }
        wire
    }
}

impl SegmentedIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from `(sample_id, indices)` pairs. A repeated sample id
    /// appends to the indices it already holds.
    pub fn from_segments<I, V>(segments: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, V)>,
        V: IntoIterator<Item = i64>,
    {
        let mut segmented = Self::new();
        for (sample_id, indices) in segments {
            segmented
                .segments
                .entry(sample_id)
                .or_default()
                .extend(indices);
        }
        segmented
    }

    /// Appends one index to the list owned by `sample_id`.
    pub fn push(&mut self, sample_id: NodeId, index: i64) {
        self.segments.entry(sample_id).or_default().push(index);
    }

    pub fn get(&self, sample_id: NodeId) -> Option<&[i64]> {
        self.segments.get(&sample_id).map(Vec::as_slice)
    }

    pub fn contains(&self, sample_id: NodeId) -> bool {
        self.segments.contains_key(&sample_id)
    }

    /// Sample ids present, ascending.
    pub fn sample_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.segments.keys().copied()
    }

    pub fn num_samples(&self) -> usize {
        self.segments.len()
    }

    pub fn num_indices(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[i64])> + '_ {
        self.segments.iter().map(|(&id, indices)| (id, indices.as_slice()))
    }

    /// Checks that every index lies in `[lower_bound, upper_bound]`.
    ///
    /// A `lower_bound` of `None` leaves indices unbounded below.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` for the first offending index, visiting
    /// samples in ascending id order.
    pub fn assert_valid(
        &self,
        lower_bound: Option<i64>,
        upper_bound: i64,
    ) -> Result<(), ValidationError> {
        for (sample_id, indices) in self.iter() {
            for &index in indices {
                let below = lower_bound.is_some_and(|lower| index < lower);
                if below || index > upper_bound {
                    return Err(ValidationError::IndexOutOfBounds {
                        sample_id,
                        index,
                        lower_bound,
                        upper_bound,
                    });
                }
            }
        }
        Ok(())
    }
}

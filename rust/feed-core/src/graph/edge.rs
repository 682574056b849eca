// rust/feed-core/src/graph/edge.rs

//! Edge kinds, edge keys and edges of a graph sample.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Suffix that marks the reverse direction of an edge kind in an edge key.
pub const REVERSE_SUFFIX: &str = "_reverse";

/// A directed relation kind between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    AstChild,
    NextToken,
    DataFlow,
    ComputedFrom,
    LastLexicalUse,
    LastRead,
    LastWrite,
    ReturnsTo,
}

impl EdgeType {
    pub const ALL: [EdgeType; 8] = [
        EdgeType::AstChild,
        EdgeType::NextToken,
        EdgeType::DataFlow,
        EdgeType::ComputedFrom,
        EdgeType::LastLexicalUse,
        EdgeType::LastRead,
        EdgeType::LastWrite,
        EdgeType::ReturnsTo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::AstChild => "ast_child",
            EdgeType::NextToken => "next_token",
            EdgeType::DataFlow => "data_flow",
            EdgeType::ComputedFrom => "computed_from",
            EdgeType::LastLexicalUse => "last_lexical_use",
            EdgeType::LastRead => "last_read",
            EdgeType::LastWrite => "last_write",
            EdgeType::ReturnsTo => "returns_to",
        }
    }

    /// Decodes the edge kind named by an edge key, ignoring its direction.
    pub fn from_edge_key(key: &str) -> Option<EdgeType> {
        key.parse::<EdgeKey>().ok().map(|k| k.edge_type)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown edge type '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

/// The discriminator an edge list is stored under: a kind plus a direction.
///
/// Rendered as `"<kind>"` for forward edges and `"<kind>_reverse"` for
/// reverse edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub edge_type: EdgeType,
    pub direction: Direction,
}

impl EdgeKey {
    pub fn forward(edge_type: EdgeType) -> Self {
        Self {
            edge_type,
            direction: Direction::Forward,
        }
    }

    pub fn reverse(edge_type: EdgeType) -> Self {
        Self {
            edge_type,
            direction: Direction::Reverse,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Forward => write!(f, "{}", self.edge_type),
            Direction::Reverse => write!(f, "{}{REVERSE_SUFFIX}", self.edge_type),
        }
    }
}

impl FromStr for EdgeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix(REVERSE_SUFFIX) {
            Some(name) => name.parse().map(EdgeKey::reverse),
            None => s.parse().map(EdgeKey::forward),
        }
    }
}

/// A directed edge, encoded on the wire as a `[from, to]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId)", into = "(NodeId, NodeId)")]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    /// True when both endpoints are ids in `[0, num_nodes)`.
    pub fn within(&self, num_nodes: usize) -> bool {
        (self.from as usize) < num_nodes && (self.to as usize) < num_nodes
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((from, to): (NodeId, NodeId)) -> Self {
        Self { from, to }
    }
}

impl From<Edge> for (NodeId, NodeId) {
    fn from(edge: Edge) -> Self {
        (edge.from, edge.to)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

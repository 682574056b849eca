// rust/feed-core/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::graph::{Edge, EdgeType};

#[derive(Error, Debug)]
pub enum FeedError {

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("'{path}' has too few samples ({total_lines}) to create a {partition} set")]
    InsufficientSamples {
        path: PathBuf,
        total_lines: u64,
        partition: &'static str,
    },

    #[error("Storage error at '{path}': {message}")]
    Storage {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Feeder for '{path}' used after stop()")]
    Stopped {
        path: PathBuf,
    },

    #[error("Reached end of '{path}' without reading any lines (start offset {start_offset})")]
    EmptyCycle {
        path: PathBuf,
        start_offset: u64,
    },

    #[error("Failed to decode line {line} of '{path}': {message}")]
    Decode {
        path: PathBuf,
        line: u64,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Structural problems found in a single graph sample or in the
/// configuration used to check it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "index {index} of sample {sample_id} out of bounds [{}, {upper_bound}]",
        .lower_bound.map_or_else(|| "-inf".to_string(), |b| b.to_string())
    )]
    IndexOutOfBounds {
        sample_id: u32,
        index: i64,
        lower_bound: Option<i64>,
        upper_bound: i64,
    },

    #[error("missing node {node_id} in {missing_from} but present in the other map")]
    NodeSetMismatch {
        node_id: u32,
        missing_from: NodeMap,
    },

    #[error("invalid edge {edge} for edge key '{edge_key}' (num nodes: {num_nodes})")]
    EdgeEndpointOutOfRange {
        edge_key: String,
        edge: Edge,
        num_nodes: usize,
    },

    #[error("duplicate edge type '{0}' in configuration")]
    DuplicateEdgeType(EdgeType),

    #[error("expected at most {max} edge keys, got {found}")]
    TooManyEdgeKeys {
        found: usize,
        max: usize,
    },

    #[error("edge key '{0}' does not name a configured edge type")]
    UnrecognizedEdgeKey(String),
}

/// Which of the two per-node maps of a graph sample an id was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMap {
    Types,
    Subtokens,
}

impl std::fmt::Display for NodeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeMap::Types => f.write_str("node types"),
            NodeMap::Subtokens => f.write_str("node subtokens"),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

// Convenience constructors
impl FeedError {

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn insufficient_samples(
        path: impl Into<PathBuf>,
        total_lines: u64,
        partition: &'static str,
    ) -> Self {
        Self::InsufficientSamples {
            path: path.into(),
            total_lines,
            partition,
        }
    }

    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn stopped(path: impl Into<PathBuf>) -> Self {
        Self::Stopped { path: path.into() }
    }

    pub fn empty_cycle(path: impl Into<PathBuf>, start_offset: u64) -> Self {
        Self::EmptyCycle {
            path: path.into(),
            start_offset,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, line: u64, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            line,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns true for errors that mean the caller handed in bad settings,
    /// as opposed to bad data or an unusable file.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InsufficientSamples { .. }
        ) || matches!(self, Self::Validation(ValidationError::DuplicateEdgeType(_)))
    }
}

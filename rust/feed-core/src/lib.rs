// rust/feed-core/src/lib.rs

//! Graph Sample Feeding - Core Library
//!
//! This crate feeds training samples stored as newline-delimited JSON:
//! deterministic train/validation splits by line index, feeders that cycle
//! over each partition forever, batching, and structural validation of
//! graph-shaped samples.

pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::FeedConfig;
pub use error::{FeedError, Result, ValidationError};
pub use storage::{LocalStorage, ObjectMeta, StorageBackend, StorageReader};

pub mod dataset;
pub use dataset::{
    Batcher, CyclicFileFeeder, DeterministicSplitter, Feeder, FeederSplit, RawRecord, SplitSpec,
};

pub mod graph;
pub use graph::{
    Edge, EdgeKey, EdgeKeyPolicy, EdgeType, GraphFeedConfig, GraphSample, SegmentedIndices,
    ValidatingFeeder,
};

pub mod runtime;
pub use runtime::{FeedRuntime, GraphBatcher, GraphBatchers};

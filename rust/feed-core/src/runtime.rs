// rust/feed-core/src/runtime.rs

//! Main feeding orchestration.
//!
//! This module provides the `FeedRuntime` struct that ties together the
//! storage backend, the train/validation splitter, graph validation and
//! batching.
//!
//! # Example
//!
//! ```no_run
//! use feed_core::{Feeder, FeedRuntime};
//!
//! // Create runtime with default configuration
//! let runtime = FeedRuntime::new()?;
//!
//! // Split a file of graph samples and batch both partitions
//! let mut batchers = runtime.graph_batchers("graphs.jsonl")?;
//! println!("{} train samples", batchers.spec.num_train);
//!
//! let batch = batchers.train.next()?;
//! println!("train batch of {}", batch.len());
//!
//! batchers.stop();
//! # Ok::<(), feed_core::FeedError>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::FeedConfig;
use crate::dataset::{
    Batcher, CyclicFileFeeder, DeterministicSplitter, Feeder, FeederSplit, SplitSpec,
};
use crate::error::Result;
use crate::graph::{GraphSample, ValidatingFeeder};
use crate::storage::{LocalStorage, StorageBackend};

/// Batches of validated graph samples cycling over one partition.
pub type GraphBatcher = Batcher<ValidatingFeeder<CyclicFileFeeder<GraphSample>>>;

/// The main runtime that orchestrates all components.
///
/// The `FeedRuntime` owns the storage backend and the configuration and
/// builds feeders from them:
/// - Raw train/validation splits of a file
/// - Validated, batched graph sample feeders
pub struct FeedRuntime {
    config: FeedConfig,
    storage: Arc<dyn StorageBackend>,
}

impl FeedRuntime {
    /// Creates a runtime with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::from_config(FeedConfig::default())
    }

    /// Creates a runtime from a configuration file.
    ///
    /// The configuration file should be in TOML format. Environment variable
    /// overrides are applied after loading the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or is invalid.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = FeedConfig::from_file(path)?.with_env_overrides();
        Self::from_config(config)
    }

    /// Creates a runtime from a configuration backed by local storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the storage
    /// backend cannot be initialized.
    pub fn from_config(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(&config.storage)?);
        Ok(Self { config, storage })
    }

    /// Creates a runtime over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_parts(config: FeedConfig, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, storage })
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Returns a splitter using the configured validation fraction.
    pub fn splitter(&self) -> DeterministicSplitter {
        DeterministicSplitter::new(self.storage.clone())
            .with_val_fraction(self.config.split.val_fraction)
    }

    /// Splits `path` into train and validation feeders decoding records as `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has too few lines.
    pub fn split<T>(&self, path: impl AsRef<Path>) -> Result<FeederSplit<T>>
    where
        T: DeserializeOwned,
    {
        self.splitter().split(path)
    }

    /// Splits `path` and wraps both partitions in graph validation and
    /// batching using the configured edge set and batch size.
    ///
    /// # Errors
    ///
    /// Returns an error if the split fails or the graph configuration is
    /// invalid.
    pub fn graph_batchers(&self, path: impl AsRef<Path>) -> Result<GraphBatchers> {
        let split = self.split::<GraphSample>(path)?;
        let spec = *split.spec();
        let (train, val) = split.into_feeders();

        let batch_size = self.config.batch.batch_size;
        let train = ValidatingFeeder::new(train, self.config.graph.clone())?;
        let val = ValidatingFeeder::new(val, self.config.graph.clone())?;
        let train = Batcher::new(train, batch_size)?;
        let val = Batcher::new(val, batch_size)?;

        debug!(
            batch_size,
            edge_types = self.config.graph.edge_set.len(),
            "Created graph batchers"
        );

        Ok(GraphBatchers { spec, train, val })
    }
}

impl std::fmt::Debug for FeedRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRuntime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Train and validation batchers over one split file.
pub struct GraphBatchers {
    pub spec: SplitSpec,
    pub train: GraphBatcher,
    pub val: GraphBatcher,
}

impl GraphBatchers {
    /// Stops both batchers and releases their file handles.
    pub fn stop(&mut self) {
        self.train.stop();
        self.val.stop();
    }
}

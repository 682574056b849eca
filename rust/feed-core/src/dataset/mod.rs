// rust/feed-core/src/dataset/mod.rs

//! Cyclic feeding of newline-delimited sample files.
//!
//! A [`DeterministicSplitter`] partitions one file by line index into a
//! train prefix and a validation suffix and opens a [`CyclicFileFeeder`]
//! over each. Feeders cycle forever; a [`Batcher`] groups their output
//! into fixed-size batches.
//!
//! # Example
//!
//! ```no_run
//! use feed_core::config::StorageConfig;
//! use feed_core::dataset::{Batcher, DeterministicSplitter, Feeder, RawRecord};
//! use feed_core::storage::LocalStorage;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(LocalStorage::new(&StorageConfig::default())?);
//! let split = DeterministicSplitter::new(storage)
//!     .with_val_fraction(0.1)
//!     .split::<RawRecord>("samples.jsonl")?;
//!
//! let (train, val) = split.into_feeders();
//! let mut batches = Batcher::new(train, 64)?;
//! let batch = batches.next()?;
//! assert_eq!(batch.len(), 64);
//! batches.stop();
//! # drop(val);
//! # Ok::<(), feed_core::FeedError>(())
//! ```

mod batcher;
mod feeder;
mod record;
mod splitter;
mod traits;

pub use batcher::Batcher;
pub use feeder::CyclicFileFeeder;
pub use record::RawRecord;
pub use splitter::{DeterministicSplitter, FeederSplit, SplitSpec, DEFAULT_VAL_FRACTION};
pub use traits::Feeder;

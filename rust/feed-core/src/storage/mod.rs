// rust/feed-core/src/storage/mod.rs

//! Storage abstraction for sample files.
//!
//! # Example
//!
//! ```no_run
//! use feed_core::config::StorageConfig;
//! use feed_core::storage::{LocalStorage, StorageBackend};
//! use std::io::Read;
//! use std::path::Path;
//!
//! let config = StorageConfig::default();
//! let storage = LocalStorage::new(&config).unwrap();
//!
//! let mut reader = storage.open_read(Path::new("samples.jsonl")).unwrap();
//! let mut content = String::new();
//! reader.read_to_string(&mut content).unwrap();
//! ```

mod local;
mod traits;

pub use local::LocalStorage;
pub use traits::{ObjectMeta, StorageBackend, StorageReader};

#[cfg(test)]
pub(crate) mod mock;

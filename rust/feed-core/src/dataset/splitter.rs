// rust/feed-core/src/dataset/splitter.rs

use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{FeedError, Result};
use crate::storage::StorageBackend;

use super::feeder::CyclicFileFeeder;
use super::record::RawRecord;

/// Validation fraction used when none is configured.
pub const DEFAULT_VAL_FRACTION: f64 = 0.2;

/// Boundaries of a train/validation split of one file.
///
/// Lines `[0, num_train)` form the train partition; the validation
/// partition starts at byte `val_offset`, right after line `num_train`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpec {
    pub total_lines: u64,
    pub num_train: u64,
    pub num_val: u64,
    pub val_offset: u64,
}

/// Splits a newline-delimited file into disjoint train and validation
/// feeders by line index.
///
/// The split is deterministic: the same file always yields the same
/// [`SplitSpec`]. The file is streamed twice (once to count lines, once to
/// locate the boundary) and never held in memory.
#[derive(Clone)]
pub struct DeterministicSplitter {
    storage: Arc<dyn StorageBackend>,
    val_fraction: f64,
}

impl DeterministicSplitter {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            val_fraction: DEFAULT_VAL_FRACTION,
        }
    }

    #[must_use]
    pub fn with_val_fraction(mut self, val_fraction: f64) -> Self {
        self.val_fraction = val_fraction;
        self
    }

    pub fn val_fraction(&self) -> f64 {
        self.val_fraction
    }

    /// Computes the split boundaries for `path`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the validation fraction is not in
    /// `(0, 1)`, `InsufficientSamples` if either partition would be empty,
    /// and a storage error if the file cannot be read.
    pub fn plan(&self, path: impl AsRef<Path>) -> Result<SplitSpec> {
        let path = path.as_ref();
        if !(self.val_fraction > 0.0 && self.val_fraction < 1.0) {
            return Err(FeedError::config(format!(
                "val_fraction out of range: {}",
                self.val_fraction
            )));
        }

        let mut reader = BufReader::new(self.storage.open_read(path)?);
        let total_lines = count_lines(&mut reader)
            .map_err(|e| FeedError::storage_with_source(path, "failed to count lines", e))?;

        let num_train = (total_lines as f64 * (1.0 - self.val_fraction)).floor() as u64;
        let num_val = (total_lines as f64 * self.val_fraction).floor() as u64;

        if num_train == 0 {
            return Err(FeedError::insufficient_samples(path, total_lines, "train"));
        }
        if num_val == 0 {
            return Err(FeedError::insufficient_samples(path, total_lines, "validation"));
        }

        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| FeedError::storage_with_source(path, "failed to seek to start", e))?;
        let val_offset = offset_after_lines(&mut reader, num_train)
            .map_err(|e| FeedError::storage_with_source(path, "failed to locate split offset", e))?
            .ok_or_else(|| {
                FeedError::storage(
                    path,
                    format!("file ended before line {num_train} while locating split offset"),
                )
            })?;

        info!(
            path = %path.display(),
            total_lines,
            num_train,
            num_val,
            val_offset,
            "{} has {} samples, will use {} for train and {} for validation",
            path.display(),
            total_lines,
            num_train,
            num_val
        );

        Ok(SplitSpec {
            total_lines,
            num_train,
            num_val,
            val_offset,
        })
    }

    /// Plans the split for `path` and opens the two feeders over it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`DeterministicSplitter::plan`] or from opening
    /// the feeders.
    pub fn split<T>(&self, path: impl AsRef<Path>) -> Result<FeederSplit<T>>
    where
        T: DeserializeOwned,
    {
        let path = path.as_ref();
        let spec = self.plan(path)?;

        let train = CyclicFileFeeder::open(&*self.storage, path, spec.num_train, 0)?;
        let val = CyclicFileFeeder::open(&*self.storage, path, spec.num_val, spec.val_offset)?;

        Ok(FeederSplit {
            path: path.to_path_buf(),
            spec,
            train,
            val,
        })
    }
}

impl std::fmt::Debug for DeterministicSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicSplitter")
            .field("val_fraction", &self.val_fraction)
            .finish()
    }
}

/// Train and validation feeders over disjoint parts of one file.
#[derive(Debug)]
pub struct FeederSplit<T = RawRecord> {
    path: PathBuf,
    spec: SplitSpec,
    train: CyclicFileFeeder<T>,
    val: CyclicFileFeeder<T>,
}

impl<T> FeederSplit<T> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spec(&self) -> &SplitSpec {
        &self.spec
    }

    /// Returns `(train, val)`.
    pub fn into_feeders(self) -> (CyclicFileFeeder<T>, CyclicFileFeeder<T>) {
        (self.train, self.val)
    }
}

/// Counts lines, including a final line without a trailing newline.
fn count_lines(reader: &mut impl BufRead) -> std::io::Result<u64> {
    let mut lines = 0u64;
    let mut unterminated = false;
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        lines += chunk.iter().filter(|&&b| b == b'\n').count() as u64;
        unterminated = chunk.last() != Some(&b'\n');
        let len = chunk.len();
        reader.consume(len);
    }
    Ok(lines + u64::from(unterminated))
}

/// Returns the byte offset right after the `n`-th line, or `None` if the
/// reader runs out first.
fn offset_after_lines(reader: &mut impl BufRead, n: u64) -> std::io::Result<Option<u64>> {
    let mut offset = 0u64;
    let mut remaining = n;
    while remaining > 0 {
        let (used, line_done) = {
            let chunk = reader.fill_buf()?;
            if chunk.is_empty() {
                return Ok(None);
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (chunk.len(), false),
            }
        };
        reader.consume(used);
        offset += used as u64;
        if line_done {
            remaining -= 1;
        }
    }
    Ok(Some(offset))
}

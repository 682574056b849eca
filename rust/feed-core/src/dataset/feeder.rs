// rust/feed-core/src/dataset/feeder.rs

use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::storage::{StorageBackend, StorageReader};

use super::record::RawRecord;
use super::traits::Feeder;

/// Cycles through newline-delimited JSON records starting at a byte offset.
///
/// A cycle is `count` records. Once a cycle completes the feeder seeks back
/// to `start_offset` and starts the next one. Hitting end-of-file before
/// the cycle is complete also seeks back, but the records already emitted
/// still count towards the cycle, so every cycle is exactly `count` records
/// long even when fewer lines are available.
///
/// Each feeder owns its own reader; feeders over the same file share no
/// state.
pub struct CyclicFileFeeder<T = RawRecord> {
    path: PathBuf,
    count: u64,
    start_offset: u64,
    reader: Option<BufReader<Box<dyn StorageReader>>>,
    /// Records emitted in the current cycle.
    cursor: u64,
    /// Lines read since the last seek to `start_offset`.
    pass_lines: u64,
    line: Vec<u8>,
    _record: PhantomData<fn() -> T>,
}

impl<T> CyclicFileFeeder<T>
where
    T: DeserializeOwned,
{
    /// Opens `path` and positions the feeder at `start_offset`.
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to read from
    /// * `path` - Path to a file of newline-delimited JSON records
    /// * `count` - Number of records per cycle
    /// * `start_offset` - Byte offset every cycle starts from
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `count` is 0 and a storage error if
    /// the file cannot be opened or the offset cannot be seeked to.
    pub fn open(
        storage: &dyn StorageBackend,
        path: impl Into<PathBuf>,
        count: u64,
        start_offset: u64,
    ) -> Result<Self> {
        let path = path.into();
        if count == 0 {
            return Err(FeedError::config(format!(
                "feeder count for '{}' must be greater than 0",
                path.display()
            )));
        }

        let reader = storage.open_read(&path)?;
        let mut feeder = Self {
            path,
            count,
            start_offset,
            reader: Some(BufReader::new(reader)),
            cursor: 0,
            pass_lines: 0,
            line: Vec::new(),
            _record: PhantomData,
        };
        feeder.rewind()?;

        debug!(
            path = %feeder.path.display(),
            count,
            start_offset,
            "opened cyclic feeder"
        );
        Ok(feeder)
    }

    /// Records per cycle.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Records emitted since the current cycle began.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_stopped(&self) -> bool {
        self.reader.is_none()
    }

    /// Seeks back to `start_offset` without touching the cycle cursor.
    fn rewind(&mut self) -> Result<()> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FeedError::stopped(&self.path))?;

        reader.seek(SeekFrom::Start(self.start_offset)).map_err(|e| {
            FeedError::storage_with_source(
                &self.path,
                format!("failed to seek to offset {}", self.start_offset),
                e,
            )
        })?;
        self.pass_lines = 0;
        Ok(())
    }

    /// Reads the next raw line into `self.line`, returning its length in
    /// bytes (0 at end-of-file).
    fn read_line(&mut self) -> Result<usize> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| FeedError::stopped(&self.path))?;

        self.line.clear();
        reader.read_until(b'\n', &mut self.line).map_err(|e| {
            FeedError::storage_with_source(&self.path, "failed to read line", e)
        })
    }
}

impl<T> Feeder for CyclicFileFeeder<T>
where
    T: DeserializeOwned,
{
    type Item = T;

    fn next(&mut self) -> Result<T> {
        if self.reader.is_none() {
            return Err(FeedError::stopped(&self.path));
        }

        if self.cursor >= self.count {
            debug!(path = %self.path.display(), count = self.count, "cycle complete, rewinding");
            self.rewind()?;
            self.cursor = 0;
        }

        // End-of-file before any record of this cycle was emitted is an
        // empty cycle. Right after a rewind the pass is empty, so there is
        // at most one rewind per call.
        while self.read_line()? == 0 {
            if self.cursor == 0 || self.pass_lines == 0 {
                return Err(FeedError::empty_cycle(&self.path, self.start_offset));
            }
            debug!(
                path = %self.path.display(),
                cursor = self.cursor,
                count = self.count,
                "end of file mid-cycle, wrapping to start offset"
            );
            self.rewind()?;
        }
        self.pass_lines += 1;

        let record = serde_json::from_slice(&self.line)
            .map_err(|e| FeedError::decode(&self.path, self.pass_lines, e))?;
        self.cursor += 1;
        Ok(record)
    }

    fn stop(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.path.display(), "stopped cyclic feeder");
        }
    }
}

impl<T> std::fmt::Debug for CyclicFileFeeder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyclicFileFeeder")
            .field("path", &self.path)
            .field("count", &self.count)
            .field("start_offset", &self.start_offset)
            .field("cursor", &self.cursor)
            .field("stopped", &self.reader.is_none())
            .finish()
    }
}

// rust/feed-core/src/dataset/batcher.rs

use crate::error::{FeedError, Result};

use super::traits::Feeder;

/// Groups items from a feeder into fixed-size batches.
///
/// `next()` pulls until exactly `batch_size` items are buffered and hands
/// the whole buffer to the caller. Partial batches are never returned: if
/// the feeder fails part-way, the items pulled so far stay buffered and the
/// next successful call completes that batch.
pub struct Batcher<F: Feeder> {
    feeder: F,
    batch_size: usize,
    samples: Vec<F::Item>,
}

impl<F: Feeder> Batcher<F> {
    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is 0.
    pub fn new(feeder: F, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(FeedError::config("batch_size must be greater than 0"));
        }
        Ok(Self {
            feeder,
            batch_size,
            samples: Vec::new(),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Items pulled towards the batch in progress.
    pub fn buffered(&self) -> usize {
        self.samples.len()
    }

    pub fn get_ref(&self) -> &F {
        &self.feeder
    }

}

impl<F: Feeder> Feeder for Batcher<F> {
    type Item = Vec<F::Item>;

    fn next(&mut self) -> Result<Vec<F::Item>> {
        while self.samples.len() < self.batch_size {
            self.samples.push(self.feeder.next()?);
        }
        Ok(std::mem::take(&mut self.samples))
    }

    fn stop(&mut self) {
        self.feeder.stop();
    }
}

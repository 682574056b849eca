// rust/feed-core/src/dataset/traits.rs

use crate::error::Result;

/// A synchronous, pull-based source of items.
///
/// All I/O happens on the caller's thread inside `next()`. Implementations
/// hold mutable cursor state without internal locking, so one instance must
/// not be driven from several threads at once.
pub trait Feeder {
    type Item;

    /// Produces the next item, blocking on I/O if needed.
    ///
    /// # Errors
    ///
    /// Errors propagate unchanged to the caller; feeders never retry
    /// internally.
    fn next(&mut self) -> Result<Self::Item>;

    /// Releases the underlying resources. Calling `next()` afterwards
    /// fails rather than reopening anything.
    fn stop(&mut self);
}

impl<F: Feeder + ?Sized> Feeder for Box<F> {
    type Item = F::Item;

    fn next(&mut self) -> Result<Self::Item> {
        (**self).next()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

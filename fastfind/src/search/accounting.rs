use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared count of accepted matches with an optional ceiling
#[derive(Debug)]
pub struct MatchCounter {
    count: AtomicUsize,
    limit: Option<NonZeroUsize>,
}

impl MatchCounter {
    /// Creates a counter; `limit` caps how many matches may be recorded
    pub fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            count: AtomicUsize::new(0),
            limit,
        }
    }

    /// Attempts to record one match.
    ///
    /// Returns the new count, or `None` when the limit has already been
    /// reached, in which case the count is left unchanged.
    pub fn record_match(&self) -> Option<usize> {
        let cap = self.limit.map_or(usize::MAX, NonZeroUsize::get);
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < cap).then(|| current + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    /// Whether a configured limit has been reached
    pub fn limit_reached(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.count.load(Ordering::Acquire) >= limit.get())
    }

    /// Current number of recorded matches
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }
}

//! Dispatch counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for the event dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Dispatch passes that ran listeners
    pub published: u64,

    /// Publishes that found no matching listener
    pub unrouted: u64,

    /// Dispatch passes stopped by a listener abort
    pub aborted: u64,

    /// Dispatch passes stopped by a listener error
    pub failed: u64,
}

impl fmt::Display for DispatcherStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Published: {}, Unrouted: {}, Aborted: {}, Failed: {}",
            self.published, self.unrouted, self.aborted, self.failed
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) published: AtomicU64,
    pub(crate) unrouted: AtomicU64,
    pub(crate) aborted: AtomicU64,
    pub(crate) failed: AtomicU64,
}

impl Counters {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            published: self.published.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

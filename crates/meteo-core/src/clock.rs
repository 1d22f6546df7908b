//! Monotonic time source shared by the main loop and the bus worker.
//!
//! Time is expressed as a [`Duration`] since an arbitrary origin. Only
//! differences between two readings of the same clock are meaningful.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{Local, NaiveDateTime};

/// A monotonic clock.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock origin.
    fn now(&self) -> Duration;

    /// Local wall-clock time, only used for the page header.
    fn local_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock backed by [`Instant`], starting at zero when created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven clock with millisecond resolution.
///
/// Clones share the same time, so a test can hand one copy to the runtime and
/// advance another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Duration) {
        self.millis.store(now.as_millis() as u64, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn local_time(&self) -> NaiveDateTime {
        (**self).local_time()
    }
}

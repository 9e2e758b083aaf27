//! In-process counters for the dispatcher and its audit sinks

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for admission and release decisions
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    admitted: AtomicU64,
    discarded: AtomicU64,
    released: AtomicU64,
    busy_reports: AtomicU64,
    empty_reports: AtomicU64,
    /// Records or poses whose outbound receiver was already gone
    undelivered: AtomicU64,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_busy_reports(&self) {
        self.busy_reports.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_empty_reports(&self) {
        self.empty_reports.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_undelivered(&self) {
        self.undelivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            busy_reports: self.busy_reports.load(Ordering::Relaxed),
            empty_reports: self.empty_reports.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DispatcherMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub admitted: u64,
    pub discarded: u64,
    pub released: u64,
    pub busy_reports: u64,
    pub empty_reports: u64,
    pub undelivered: u64,
}

impl DispatchSnapshot {
    /// Poses admitted but not yet released
    pub fn pending(&self) -> u64 {
        self.admitted.saturating_sub(self.released)
    }
}

/// Counters for one audit sink worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    write_count: AtomicU64,
    failure_count: AtomicU64,
    /// Records dropped because the sink worker had stopped
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            queue_len: self.queue_len.load(Ordering::Relaxed),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}

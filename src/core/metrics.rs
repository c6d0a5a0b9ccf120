//! Registry metrics for observability
//!
//! Counters describing what the routing core did: records emitted, sink
//! deliveries, isolated sink failures, re-entrant log calls that were dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for registry observability
///
/// # Example
///
/// ```
/// use treelog::RegistryMetrics;
///
/// let metrics = RegistryMetrics::new();
///
/// metrics.record_delivered();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.deliveries(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct RegistryMetrics {
    /// Records built and dispatched, regardless of how many sinks matched
    records_emitted: AtomicU64,

    /// Successful sink writes
    deliveries: AtomicU64,

    /// Sink writes that returned an error or panicked
    sink_failures: AtomicU64,

    /// Log calls dropped because they came from inside a sink of the same registry
    records_dropped: AtomicU64,

    /// Records that arrived through ingestion rather than a log call
    records_ingested: AtomicU64,
}

impl RegistryMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_emitted: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            records_ingested: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_dropped(&self) -> u64 {
        self.records_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_ingested(&self) -> u64 {
        self.records_ingested.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.records_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.records_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_ingested(&self) -> u64 {
        self.records_ingested.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed sink writes as a percentage of all sink writes
    pub fn failure_rate(&self) -> f64 {
        let failures = self.sink_failures() as f64;
        let total = failures + self.deliveries() as f64;
        if total == 0.0 {
            0.0
        } else {
            failures / total * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.records_emitted.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.records_dropped.store(0, Ordering::Relaxed);
        self.records_ingested.store(0, Ordering::Relaxed);
    }
}

impl Default for RegistryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

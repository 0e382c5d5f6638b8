//! Logger metrics for observability
//!
//! Counters describing what happened to each log call: written, filtered
//! out by the level mask, failed in a sink, or dropped after close.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use fieldlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_logged();
/// metrics.record_write_error();
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.write_errors(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records that passed the filter and were dispatched
    total_logged: AtomicU64,

    /// Records rejected by the level mask
    filtered_count: AtomicU64,

    /// Failed sink or console writes
    write_errors: AtomicU64,

    /// Calls made after the logger was closed
    dropped_after_close: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            dropped_after_close: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_after_close(&self) -> u64 {
        self.dropped_after_close.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) {
        self.total_logged.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_filtered(&self) {
        self.filtered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the error count before this one
    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped_after_close(&self) {
        self.dropped_after_close.fetch_add(1, Ordering::Relaxed);
    }

    /// Percentage of dispatched records that hit a write error
    pub fn write_error_rate(&self) -> f64 {
        let logged = self.total_logged();
        if logged == 0 {
            return 0.0;
        }
        (self.write_errors() as f64 / logged as f64) * 100.0
    }

    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.filtered_count.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.dropped_after_close.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

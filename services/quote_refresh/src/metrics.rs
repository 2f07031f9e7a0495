//! Refresh engine metrics collection

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshMetricsSnapshot {
    pub notifications: u64,
    pub unchanged: u64,
    pub suppressed: u64,
    pub debounces: u64,
    pub rejected: u64,
    pub fetches_issued: u64,
    pub results_applied: u64,
    pub results_superseded: u64,
    pub failures: u64,
    /// Time since the engine started
    pub uptime: Duration,
}

/// Thread-safe counters shared between the engine task and its handles
#[derive(Debug)]
pub struct RefreshMetrics {
    start_time: Instant,
    notifications: AtomicU64,
    unchanged: AtomicU64,
    suppressed: AtomicU64,
    debounces: AtomicU64,
    rejected: AtomicU64,
    fetches_issued: AtomicU64,
    results_applied: AtomicU64,
    results_superseded: AtomicU64,
    failures: AtomicU64,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            notifications: AtomicU64::new(0),
            unchanged: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            debounces: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            fetches_issued: AtomicU64::new(0),
            results_applied: AtomicU64::new(0),
            results_superseded: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn increment_notifications(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_debounces(&self) {
        self.debounces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetches(&self) {
        self.fetches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_applied(&self) {
        self.results_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_superseded(&self) {
        self.results_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> RefreshMetricsSnapshot {
        RefreshMetricsSnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            debounces: self.debounces.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            fetches_issued: self.fetches_issued.load(Ordering::Relaxed),
            results_applied: self.results_applied.load(Ordering::Relaxed),
            results_superseded: self.results_superseded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            uptime: self.uptime(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RefreshMetrics {
    fn default() -> Self {
        Self::new()
    }
}

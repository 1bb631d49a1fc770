//! Conversion metrics.
//!
//! Counts requests, cache hits and renderer invocations so callers can see
//! how much work the cache saves. Counters are atomics; duration samples
//! sit behind a mutex.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Maximum number of duration samples to keep in memory.
const MAX_DURATION_SAMPLES: usize = 1000;

/// Conversion metrics collector.
#[derive(Debug)]
pub struct ConversionMetrics {
    /// Conversion requests received.
    pub requests: AtomicU64,
    /// Requests answered from the cache.
    pub cache_hits: AtomicU64,
    /// External renderer invocations.
    pub invocations: AtomicU64,
    /// Invocations that produced the expected output.
    pub succeeded: AtomicU64,
    /// Invocations that failed.
    pub failed: AtomicU64,
    /// Recent invocation durations.
    duration_samples: Mutex<Vec<Duration>>,
}

impl ConversionMetrics {
    /// Create a new empty metrics collector.
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            invocations: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            duration_samples: Mutex::new(Vec::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record an incoming conversion request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request answered from the cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a renderer invocation.
    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful invocation with its duration.
    pub fn record_success(&self, duration: Duration) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.add_duration_sample(duration);
    }

    /// Record a failed invocation.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn add_duration_sample(&self, duration: Duration) {
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    /// Get the current snapshot of metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut durations = self
            .duration_samples
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        durations.sort();

        let percentile = |p: usize| {
            if durations.is_empty() {
                None
            } else {
                durations
                    .get((durations.len() * p / 100).min(durations.len() - 1))
                    .map(|d| d.as_millis() as u64)
            }
        };

        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            duration_p50_ms: percentile(50),
            duration_p95_ms: percentile(95),
            sample_count: durations.len() as u64,
        }
    }
}

impl Default for ConversionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of conversion metrics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Conversion requests received.
    pub requests: u64,
    /// Requests answered from the cache.
    pub cache_hits: u64,
    /// External renderer invocations.
    pub invocations: u64,
    /// Successful invocations.
    pub succeeded: u64,
    /// Failed invocations.
    pub failed: u64,
    /// Median invocation duration in milliseconds.
    pub duration_p50_ms: Option<u64>,
    /// 95th percentile invocation duration in milliseconds.
    pub duration_p95_ms: Option<u64>,
    /// Number of duration samples collected.
    pub sample_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let m = ConversionMetrics::new();
        m.record_request();
        m.record_request();
        m.record_cache_hit();
        m.record_invocation();
        m.record_success(Duration::from_millis(40));

        let snap = m.snapshot();
        assert_eq!(snap.requests, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.invocations, 1);
        assert_eq!(snap.succeeded, 1);
        assert_eq!(snap.failed, 0);
        assert_eq!(snap.duration_p50_ms, Some(40));
    }

    #[test]
    fn test_percentiles() {
        let m = ConversionMetrics::new();
        for i in 1..=100 {
            m.record_success(Duration::from_millis(i * 10));
        }
        let snap = m.snapshot();
        let p50 = snap.duration_p50_ms.expect("p50");
        let p95 = snap.duration_p95_ms.expect("p95");
        assert!(p95 > p50);
        assert_eq!(snap.sample_count, 100);
    }

    #[test]
    fn test_empty_percentiles() {
        let snap = ConversionMetrics::new().snapshot();
        assert!(snap.duration_p50_ms.is_none());
        assert!(snap.duration_p95_ms.is_none());
    }
}

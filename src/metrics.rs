//! In-process latency and error metrics for the inference service.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::info;

/// Number of recent latency samples kept for percentile computation
pub const LATENCY_WINDOW_CAPACITY: usize = 500;

/// Rolling latency window plus request/error counters.
#[derive(Debug)]
pub struct MetricsAggregator {
    /// Most recent latencies in milliseconds, oldest first
    latencies_ms: VecDeque<f64>,
    capacity: usize,
    /// Successful predictions since start
    total_requests: u64,
    /// Failed predictions since start
    total_errors: u64,
    started_at: Instant,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::with_capacity(LATENCY_WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            latencies_ms: VecDeque::with_capacity(capacity),
            capacity,
            total_requests: 0,
            total_errors: 0,
            started_at: Instant::now(),
        }
    }

    /// Record a successful prediction, evicting the oldest sample when full.
    pub fn record_success(&mut self, latency_ms: f64) {
        if self.latencies_ms.len() == self.capacity {
            self.latencies_ms.pop_front();
        }
        self.latencies_ms.push_back(latency_ms.max(0.0));
        self.total_requests += 1;
    }

    /// Record a failed prediction. The latency window is left untouched.
    pub fn record_error(&mut self) {
        self.total_errors += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let window: Vec<f64> = self.latencies_ms.iter().copied().collect();
        MetricsSnapshot {
            p95_latency_ms: percentile(&window, 95.0),
            total_requests: self.total_requests,
            total_errors: self.total_errors,
            window_len: window.len(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// `None` until the first successful prediction
    pub p95_latency_ms: Option<f64>,
    pub total_requests: u64,
    pub total_errors: u64,
    /// Samples currently in the latency window
    pub window_len: usize,
    pub uptime_secs: u64,
}

/// Percentile with linear interpolation between closest ranks.
///
/// `rank = p / 100 * (n - 1)`; returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Thread-safe wrapper; each update runs as one critical section.
#[derive(Debug, Default)]
pub struct SharedMetrics {
    inner: Mutex<MetricsAggregator>,
}

impl SharedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, latency_ms: f64) {
        self.lock().record_success(latency_ms);
    }

    pub fn record_error(&self) {
        self.lock().record_error();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().snapshot()
    }

    // Counters stay consistent even if a holder panicked mid-read
    fn lock(&self) -> MutexGuard<'_, MetricsAggregator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log summary statistics
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        let p95 = snapshot
            .p95_latency_ms
            .map(|v| format!("{v:.1} ms"))
            .unwrap_or_else(|| "no data".to_string());
        info!(
            total_requests = snapshot.total_requests,
            total_errors = snapshot.total_errors,
            window = snapshot.window_len,
            uptime_secs = snapshot.uptime_secs,
            "Metrics summary: p95 latency {}",
            p95
        );
    }
}

/// Periodically logs a metrics summary
pub struct MetricsReporter {
    metrics: Arc<SharedMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<SharedMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_no_p95() {
        let metrics = MetricsAggregator::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.p95_latency_ms, None);
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.total_errors, 0);
        assert_eq!(snapshot.window_len, 0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // rank = 0.95 * 9 = 8.55 -> 9 + 0.55 * (10 - 9)
        let p95 = percentile(&values, 95.0).unwrap();
        assert!((p95 - 9.55).abs() < 1e-9);
        assert_eq!(percentile(&[4.0], 95.0), Some(4.0));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(10.0));
        assert_eq!(percentile(&[], 95.0), None);
    }

    #[test]
    fn test_record_error_only_touches_error_counter() {
        let mut metrics = MetricsAggregator::new();
        metrics.record_success(3.0);
        metrics.record_error();
        metrics.record_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.total_errors, 2);
        assert_eq!(snapshot.window_len, 1);
        assert_eq!(snapshot.p95_latency_ms, Some(3.0));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut metrics = MetricsAggregator::new();
        for i in 0..1234 {
            metrics.record_success(i as f64);
        }
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 1234);
        assert_eq!(snapshot.window_len, LATENCY_WINDOW_CAPACITY);

        // Window holds 734..=1233
        let expected: Vec<f64> = (734..1234).map(|i| i as f64).collect();
        assert_eq!(snapshot.p95_latency_ms, percentile(&expected, 95.0));
    }

    #[test]
    fn test_full_window_then_eviction() {
        let latencies: Vec<f64> = (0..500).map(|i| ((i * 37) % 500) as f64 / 10.0).collect();
        let mut metrics = MetricsAggregator::new();
        for &l in &latencies {
            metrics.record_success(l);
        }
        assert_eq!(
            metrics.snapshot().p95_latency_ms,
            percentile(&latencies, 95.0)
        );

        // Evicts latencies[0]
        metrics.record_success(1000.0);
        let mut expected = latencies[1..].to_vec();
        expected.push(1000.0);
        assert_eq!(
            metrics.snapshot().p95_latency_ms,
            percentile(&expected, 95.0)
        );
        assert_eq!(metrics.snapshot().window_len, 500);
        assert_eq!(metrics.snapshot().total_requests, 501);
    }

    #[test]
    fn test_shared_metrics_across_threads() {
        let metrics = Arc::new(SharedMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        if i % 10 == 0 {
                            metrics.record_error();
                        } else {
                            metrics.record_success((t * 1000 + i) as f64);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 720);
        assert_eq!(snapshot.total_errors, 80);
        assert_eq!(snapshot.window_len, LATENCY_WINDOW_CAPACITY);
    }
}

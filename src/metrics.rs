//! Submission and inference statistics for the risk detection service.

use crate::types::prediction::{Label, RiskLevel};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by all request handlers
pub struct PredictionMetrics {
    /// Submissions scored by the model
    pub predictions: AtomicU64,
    /// Submissions rejected before reaching the model
    pub rejected: AtomicU64,
    /// Model calls that returned an error
    pub inference_failures: AtomicU64,
    /// At-risk verdicts
    pub at_risk: AtomicU64,
    /// Scored submissions by risk band
    by_band: RwLock<HashMap<RiskLevel, u64>>,
    /// Inference times (in microseconds)
    inference_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PredictionMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            at_risk: AtomicU64::new(0),
            by_band: RwLock::new(HashMap::new()),
            inference_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a scored submission
    pub fn record_prediction(&self, inference_time: Duration, label: Label, band: RiskLevel) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if label.is_at_risk() {
            self.at_risk.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.inference_times.write() {
            times.push(inference_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut by_band) = self.by_band.write() {
            *by_band.entry(band).or_insert(0) += 1;
        }
    }

    /// Record a submission rejected by validation
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed model call
    pub fn record_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get inference time statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted: Vec<u64> = match self.inference_times.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Get scored submissions by risk band
    pub fn get_by_band(&self) -> HashMap<RiskLevel, u64> {
        self.by_band
            .read()
            .map(|by_band| by_band.clone())
            .unwrap_or_default()
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions: self.predictions.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            at_risk: self.at_risk.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
            latency: self.get_latency_stats(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let at_risk_rate = if snapshot.predictions > 0 {
            (snapshot.at_risk as f64 / snapshot.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!(
            predictions = snapshot.predictions,
            rejected = snapshot.rejected,
            inference_failures = snapshot.inference_failures,
            at_risk = snapshot.at_risk,
            at_risk_rate = format!("{:.1}%", at_risk_rate),
            uptime_secs = snapshot.uptime_secs,
            "Prediction summary"
        );
        info!(
            mean_us = snapshot.latency.mean_us,
            p50_us = snapshot.latency.p50_us,
            p95_us = snapshot.latency.p95_us,
            max_us = snapshot.latency.max_us,
            "Inference latency"
        );
        for (band, count) in self.get_by_band() {
            info!(band = %band, count = count, "Submissions by risk band");
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Inference time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub max_us: u64,
}

/// Counters at one instant
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions: u64,
    pub rejected: u64,
    pub inference_failures: u64,
    pub at_risk: u64,
    pub uptime_secs: u64,
    pub latency: LatencyStats,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

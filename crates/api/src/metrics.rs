use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use triage::UrgencyLevel;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_analyses: AtomicUsize,
    failed_analyses: AtomicUsize,
    rejected_requests: AtomicUsize,
    reloads: AtomicUsize,

    // Timing (in microseconds)
    total_analysis_time_us: AtomicU64,

    // Overall triage outcomes
    triage_levels: DashMap<UrgencyLevel, usize>,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_analyses: AtomicUsize::new(0),
            failed_analyses: AtomicUsize::new(0),
            rejected_requests: AtomicUsize::new(0),
            reloads: AtomicUsize::new(0),
            total_analysis_time_us: AtomicU64::new(0),
            triage_levels: DashMap::new(),
        })
    }

    /// A chat request turned away before analysis (e.g. empty message).
    pub fn record_rejected(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis(&self, duration: Duration, success: bool, level: Option<UrgencyLevel>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_analysis_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if success {
            self.successful_analyses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_analyses.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(level) = level {
            *self.triage_levels.entry(level).or_insert(0) += 1;
        }
    }

    pub fn record_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_analyses.load(Ordering::Relaxed);
        let failed = self.failed_analyses.load(Ordering::Relaxed);
        let analyses = successful + failed;
        let total_us = self.total_analysis_time_us.load(Ordering::Relaxed) as f64;

        let triage_levels = UrgencyLevel::ALL
            .iter()
            .map(|level| {
                let count = self.triage_levels.get(level).map(|c| *c).unwrap_or(0);
                (level.as_str().to_string(), count)
            })
            .collect();

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_analyses: successful,
            failed_analyses: failed,
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
            avg_analysis_time_ms: if analyses > 0 {
                total_us / analyses as f64 / 1000.0 // Convert to ms
            } else {
                0.0
            },
            triage_levels,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_analyses: usize,
    pub failed_analyses: usize,
    pub rejected_requests: usize,
    pub reloads: usize,
    pub avg_analysis_time_ms: f64,
    pub triage_levels: BTreeMap<String, usize>,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

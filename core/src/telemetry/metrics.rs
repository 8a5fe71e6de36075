use serde::Serialize;
use std::sync::Mutex;

use crate::reconcile::ReconcileStats;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub synthesis_passes: usize,
    pub label_errors: usize,
    pub stations_reused: usize,
    pub stations_updated: usize,
    pub stations_added: usize,
    pub bounds_cache_hits: usize,
    pub bounds_cache_misses: usize,
}

#[derive(Default)]
struct Metrics {
    snapshot: MetricsSnapshot,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_synthesis_pass(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshot.synthesis_passes += 1;
        }
    }

    pub fn record_label_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshot.label_errors += 1;
        }
    }

    pub fn record_reconcile(&self, stats: &ReconcileStats) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshot.stations_reused += stats.reused;
            metrics.snapshot.stations_updated += stats.updated;
            metrics.snapshot.stations_added += stats.added;
        }
    }

    pub fn record_cache_hit(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshot.bounds_cache_hits += 1;
        }
    }

    pub fn record_cache_miss(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshot.bounds_cache_misses += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| metrics.snapshot)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_stats_accumulate() {
        let recorder = MetricsRecorder::new();
        recorder.record_reconcile(&ReconcileStats {
            reused: 2,
            updated: 1,
            added: 0,
        });
        recorder.record_reconcile(&ReconcileStats {
            reused: 1,
            updated: 0,
            added: 3,
        });
        recorder.record_cache_miss();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.stations_reused, 3);
        assert_eq!(snapshot.stations_added, 3);
        assert_eq!(snapshot.bounds_cache_misses, 1);
    }
}

use crate::workflow::config::WorkflowConfig;
use crate::workflow::samples::{MemorySampleSource, ScenarioPayload};
use anyhow::Context;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use waveviewcore::alignment::Offset;
use waveviewcore::boundaries::{AmplitudeBoundaryCalculator, AmplitudeBounds, BoundaryRequest, ScalingPolicy};
use waveviewcore::domain::{DomainSnapshot, StationVisibility};
use waveviewcore::prelude::TimeRange;
use waveviewcore::reconcile::{reconcile_stations, ReconcileStats};
use waveviewcore::synthesis::{DisplayParameters, ViewModelSynthesizer, ViewStation};
use waveviewcore::telemetry::{MetricsRecorder, MetricsSnapshot};

pub struct WorkflowResult {
    pub stations: Vec<Arc<ViewStation>>,
    pub offsets: Vec<Offset>,
    pub stats: ReconcileStats,
    pub zoom_interval: Option<TimeRange>,
    /// Bounds per rendered channel id.
    pub bounds: BTreeMap<String, AmplitudeBounds>,
}

/// Runs synthesis passes and keeps the last published tree.
pub struct Runner {
    config: WorkflowConfig,
    synthesizer: ViewModelSynthesizer,
    source: Arc<MemorySampleSource>,
    boundaries: AmplitudeBoundaryCalculator<MemorySampleSource>,
    metrics: Arc<MetricsRecorder>,
    previous: Mutex<Vec<Arc<ViewStation>>>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let metrics = Arc::new(MetricsRecorder::new());
        let source = Arc::new(MemorySampleSource::new(TimeRange::new(0.0, 0.0)));
        Self {
            synthesizer: ViewModelSynthesizer::new(config.display.clone(), metrics.clone()),
            boundaries: AmplitudeBoundaryCalculator::new(source.clone(), config.scaling.clone(), metrics.clone()),
            source,
            metrics,
            previous: Mutex::new(Vec::new()),
            config,
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn set_scaling(&self, policy: ScalingPolicy) {
        self.boundaries.set_policy(policy).await;
    }

    /// Stations missing from the visibility map are shown collapsed.
    fn params_for(&self, snapshot: &DomainSnapshot) -> DisplayParameters {
        let mut params = self.config.params.clone();
        for station in &snapshot.stations {
            if params.visibility.get(&station.name).is_none() {
                params
                    .visibility
                    .insert(station.name.clone(), StationVisibility::new(true, false));
            }
        }
        params
    }

    /// One full pass. Passes are serialized so no caller sees a mixed tree.
    pub async fn execute(&self, scenario: &ScenarioPayload) -> anyhow::Result<WorkflowResult> {
        let mut previous = self.previous.lock().await;

        self.source
            .replace(scenario.windows_by_channel(), scenario.visible_interval)
            .await;
        let params = self.params_for(&scenario.snapshot);
        let output = self
            .synthesizer
            .synthesize(&scenario.snapshot, &params)
            .context("synthesizing station tree")?;
        let zoom_interval = self
            .synthesizer
            .calculate_zoom_interval(&scenario.snapshot, &params)
            .context("calculating zoom interval")?;

        let (stations, stats) = reconcile_stations(&previous, output.stations);
        self.metrics.record_reconcile(&stats);
        *previous = stations.clone();
        info!(
            "pass complete: {} stations ({} reused, {} updated, {} added)",
            stations.len(),
            stats.reused,
            stats.updated,
            stats.added
        );

        let bounds = self.resolve_bounds(&stations).await;
        Ok(WorkflowResult {
            stations,
            offsets: output.offsets,
            stats,
            zoom_interval,
            bounds,
        })
    }

    async fn resolve_bounds(&self, stations: &[Arc<ViewStation>]) -> BTreeMap<String, AmplitudeBounds> {
        let mut resolved = BTreeMap::new();
        let channels = stations.iter().flat_map(|station| {
            std::iter::once(&station.default_channel).chain(station.non_default_channels.iter())
        }).collect::<Vec<_>>();
        for channel in channels {
            let request = BoundaryRequest::new(&channel.id);
            match self.boundaries.resolve(&request).await {
                Ok(Some(bounds)) => {
                    resolved.insert(channel.id.clone(), bounds);
                }
                Ok(None) => {}
                Err(err) => warn!("bounds for {} unavailable: {}", channel.id, err),
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_scenario;
    use waveviewcore::alignment::AlignmentMode;

    #[tokio::test]
    async fn runner_executes_workflow() {
        let cfg = WorkflowConfig::from_args(4, 3, AlignmentMode::PredictedPhase, false);
        let runner = Runner::new(cfg.clone());
        let scenario = build_scenario(&cfg.generator).unwrap();
        let result = runner.execute(&scenario).await.unwrap();

        assert_eq!(result.stations.len(), 4);
        assert_eq!(result.stats.added, 4);
        assert_eq!(result.stations[0].default_channel.time_offset_seconds, 0.0);
        assert!(result.zoom_interval.is_some());
        let bounds = &result.bounds[&result.stations[0].id];
        assert!(bounds.bottom_max <= bounds.channel_avg && bounds.channel_avg <= bounds.top_max);
    }

    #[tokio::test]
    async fn repeated_pass_reuses_tree() {
        let cfg = WorkflowConfig::from_args(3, 5, AlignmentMode::PredictedPhase, false);
        let runner = Runner::new(cfg.clone());
        let scenario = build_scenario(&cfg.generator).unwrap();
        let first = runner.execute(&scenario).await.unwrap();
        let second = runner.execute(&scenario).await.unwrap();

        assert_eq!(second.stats.reused, 3);
        for (a, b) in first.stations.iter().zip(second.stations.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
        assert_eq!(runner.metrics().synthesis_passes, 2);
    }

    #[tokio::test]
    async fn fixed_scaling_applies_to_every_channel() {
        let cfg = WorkflowConfig::from_args(2, 1, AlignmentMode::Time, false);
        let runner = Runner::new(cfg.clone());
        runner.set_scaling(ScalingPolicy::Fixed(26.0)).await;
        let scenario = build_scenario(&cfg.generator).unwrap();
        let result = runner.execute(&scenario).await.unwrap();
        assert!(result.bounds.values().all(|bounds| bounds.top_max == 26.0));
        assert!(result.offsets.is_empty());
    }
}

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::boundaries::bounds::{bounds_for_windows, AmplitudeBounds};
use crate::boundaries::cache::{BoundaryCache, BoundaryKey};
use crate::boundaries::source::SampleSource;
use crate::prelude::{BoundaryError, BoundaryResult, TimeRange};
use crate::telemetry::{LogManager, MetricsRecorder};

/// How channel amplitudes are scaled. Exactly one applies at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", content = "value", rename_all = "snake_case")]
pub enum ScalingPolicy {
    #[default]
    Auto,
    Fixed(f64),
    /// Freeze the first bounds resolved for each channel.
    FreezeCurrent,
    /// Scale every channel to the named reference channel.
    ScaleToChannel(String),
}

#[derive(Debug, Clone, Copy)]
pub struct BoundaryRequest<'a> {
    pub channel_id: &'a str,
    pub channel_segment_id: Option<&'a str>,
    /// Defaults to the renderer's visible interval.
    pub range: Option<TimeRange>,
    pub is_measure_window: bool,
}

impl<'a> BoundaryRequest<'a> {
    pub fn new(channel_id: &'a str) -> Self {
        Self {
            channel_id,
            channel_segment_id: None,
            range: None,
            is_measure_window: false,
        }
    }

    fn key(&self) -> BoundaryKey {
        BoundaryKey::new(self.channel_id, self.is_measure_window)
    }
}

pub struct AmplitudeBoundaryCalculator<S> {
    source: Arc<S>,
    policy: RwLock<ScalingPolicy>,
    cache: BoundaryCache,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl<S: SampleSource> AmplitudeBoundaryCalculator<S> {
    pub fn new(source: Arc<S>, policy: ScalingPolicy, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            source,
            policy: RwLock::new(policy),
            cache: BoundaryCache::new(),
            metrics,
            logger: LogManager::for_target("waveviewcore::boundaries"),
        }
    }

    pub async fn policy(&self) -> ScalingPolicy {
        self.policy.read().await.clone()
    }

    /// Switches policy and drops every cached bound.
    pub async fn set_policy(&self, policy: ScalingPolicy) {
        *self.policy.write().await = policy;
        self.cache.invalidate().await;
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    pub fn cache(&self) -> &BoundaryCache {
        &self.cache
    }

    /// Bounds for one channel under the active policy. `None` when the
    /// channel has no samples in range.
    pub async fn resolve(&self, request: &BoundaryRequest<'_>) -> BoundaryResult<Option<AmplitudeBounds>> {
        // Captured before the policy so a concurrent `set_policy` discards our write.
        let generation = self.cache.generation();
        let policy = self.policy().await;
        match policy {
            ScalingPolicy::Auto => self.resolve_auto(request, generation).await,
            ScalingPolicy::Fixed(value) => {
                let bounds = AmplitudeBounds::fixed(request.channel_id, value);
                self.store(request, &bounds, generation).await;
                Ok(Some(bounds))
            }
            ScalingPolicy::FreezeCurrent => {
                if let Some(frozen) = self.cache.get(&request.key()).await {
                    self.metrics.record_cache_hit();
                    return Ok(Some(frozen));
                }
                self.metrics.record_cache_miss();
                self.resolve_auto(request, generation).await
            }
            ScalingPolicy::ScaleToChannel(reference) => {
                self.resolve_scaled(&reference, request, generation).await
            }
        }
    }

    async fn store(&self, request: &BoundaryRequest<'_>, bounds: &AmplitudeBounds, generation: u64) {
        if !self
            .cache
            .insert(request.key(), bounds.clone(), generation)
            .await
        {
            self.logger.trace_pass(&format!(
                "dropping bounds for {} resolved before invalidation",
                request.channel_id
            ));
        }
    }

    async fn compute(&self, request: &BoundaryRequest<'_>) -> BoundaryResult<Option<AmplitudeBounds>> {
        let range = request
            .range
            .unwrap_or_else(|| self.source.visible_interval());
        if range.start_time_secs > range.end_time_secs {
            return Err(BoundaryError::InvalidRange(range.start_time_secs, range.end_time_secs));
        }
        let windows = self
            .source
            .read_windows(request.channel_id, request.channel_segment_id, range)
            .await?;
        Ok(bounds_for_windows(&windows, &range))
    }

    async fn resolve_auto(
        &self,
        request: &BoundaryRequest<'_>,
        generation: u64,
    ) -> BoundaryResult<Option<AmplitudeBounds>> {
        let bounds = self.compute(request).await?;
        match &bounds {
            Some(resolved) => self.store(request, resolved, generation).await,
            None => self
                .logger
                .trace_pass(&format!("no samples in range for {}", request.channel_id)),
        }
        Ok(bounds)
    }

    async fn resolve_scaled(
        &self,
        reference: &str,
        request: &BoundaryRequest<'_>,
        generation: u64,
    ) -> BoundaryResult<Option<AmplitudeBounds>> {
        let Some(own) = self.compute(request).await? else {
            return Ok(None);
        };
        let reference_request = BoundaryRequest {
            channel_id: reference,
            channel_segment_id: None,
            ..*request
        };
        let reference_bounds = match self.cache.get(&reference_request.key()).await {
            Some(cached) => {
                self.metrics.record_cache_hit();
                cached
            }
            None => {
                self.metrics.record_cache_miss();
                match self.resolve_auto(&reference_request, generation).await? {
                    Some(resolved) => resolved,
                    None => {
                        self.logger
                            .warn(&format!("reference channel {reference} has no samples to scale to"));
                        return Ok(None);
                    }
                }
            }
        };
        Ok(Some(AmplitudeBounds {
            top_max: reference_bounds.top_max,
            bottom_max: reference_bounds.bottom_max,
            offset: reference_bounds.top_max,
            channel_avg: reference_bounds.channel_avg,
            channel_segment_id: own.channel_segment_id,
            samples_count: own.samples_count,
            top_max_secs: None,
            bottom_max_secs: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::bounds::SampleWindow;
    use ndarray::Array1;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySource {
        windows: Mutex<HashMap<String, Vec<SampleWindow>>>,
        reads: AtomicUsize,
    }

    impl MemorySource {
        fn with(channel: &str, values: Vec<f32>) -> Self {
            let source = Self::default();
            source.set(channel, values);
            source
        }

        fn set(&self, channel: &str, values: Vec<f32>) {
            let window = SampleWindow {
                channel_segment_id: format!("{channel}-seg"),
                start_time_secs: 0.0,
                sample_rate_hz: 1.0,
                values: Array1::from(values),
            };
            self.windows
                .lock()
                .unwrap()
                .insert(channel.to_string(), vec![window]);
        }
    }

    impl SampleSource for MemorySource {
        async fn read_windows(
            &self,
            channel_id: &str,
            _channel_segment_id: Option<&str>,
            _range: TimeRange,
        ) -> BoundaryResult<Vec<SampleWindow>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .windows
                .lock()
                .unwrap()
                .get(channel_id)
                .cloned()
                .unwrap_or_default())
        }

        fn visible_interval(&self) -> TimeRange {
            TimeRange::new(0.0, 100.0)
        }
    }

    fn calculator(source: MemorySource, policy: ScalingPolicy) -> AmplitudeBoundaryCalculator<MemorySource> {
        AmplitudeBoundaryCalculator::new(Arc::new(source), policy, Arc::new(MetricsRecorder::new()))
    }

    #[tokio::test]
    async fn fixed_policy_ignores_samples() {
        let calc = calculator(MemorySource::with("AAK", vec![1000.0, -5.0]), ScalingPolicy::Fixed(26.0));
        let bounds = calc.resolve(&BoundaryRequest::new("AAK")).await.unwrap().unwrap();
        assert_eq!(bounds.top_max, 26.0);
        assert_eq!(bounds.bottom_max, -26.0);
        assert_eq!(bounds.offset, 26.0);
        assert_eq!(bounds.channel_avg, 0.0);
        assert_eq!(calc.source.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn auto_policy_uses_visible_interval() {
        let calc = calculator(MemorySource::with("AAK", vec![1.0, -7.0, 3.0]), ScalingPolicy::Auto);
        let bounds = calc.resolve(&BoundaryRequest::new("AAK")).await.unwrap().unwrap();
        assert_eq!(bounds.top_max, 7.0);
        assert_eq!(bounds.bottom_max, -7.0);
        assert_eq!(bounds.channel_segment_id, "AAK-seg");
        assert!(calc.resolve(&BoundaryRequest::new("ASAR")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn freeze_current_keeps_first_resolution() {
        let calc = calculator(MemorySource::with("AAK", vec![2.0, -1.0]), ScalingPolicy::FreezeCurrent);
        let request = BoundaryRequest::new("AAK");
        let first = calc.resolve(&request).await.unwrap().unwrap();

        calc.source.set("AAK", vec![50.0]);
        let second = calc.resolve(&request).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(calc.source.reads.load(Ordering::SeqCst), 1);

        let measure = BoundaryRequest {
            is_measure_window: true,
            ..request
        };
        assert_eq!(calc.resolve(&measure).await.unwrap().unwrap().top_max, 50.0);

        calc.invalidate().await;
        assert_eq!(calc.resolve(&request).await.unwrap().unwrap().top_max, 50.0);
    }

    #[tokio::test]
    async fn set_policy_clears_cache() {
        let calc = calculator(MemorySource::with("AAK", vec![2.0]), ScalingPolicy::Auto);
        calc.resolve(&BoundaryRequest::new("AAK")).await.unwrap();
        assert_eq!(calc.cache().len().await, 1);

        calc.set_policy(ScalingPolicy::FreezeCurrent).await;
        assert_eq!(calc.cache().len().await, 0);
        assert_eq!(calc.policy().await, ScalingPolicy::FreezeCurrent);
    }

    /// Holds every read until the test releases the gate.
    struct GatedSource {
        inner: MemorySource,
        entered: tokio::sync::Notify,
        gate: tokio::sync::Semaphore,
    }

    impl SampleSource for GatedSource {
        async fn read_windows(
            &self,
            channel_id: &str,
            channel_segment_id: Option<&str>,
            range: TimeRange,
        ) -> BoundaryResult<Vec<SampleWindow>> {
            let windows = self.inner.read_windows(channel_id, channel_segment_id, range).await;
            self.entered.notify_one();
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| BoundaryError::Unavailable(channel_id.to_string()))?;
            windows
        }

        fn visible_interval(&self) -> TimeRange {
            self.inner.visible_interval()
        }
    }

    #[tokio::test]
    async fn policy_switch_discards_in_flight_auto_result() {
        let source = Arc::new(GatedSource {
            inner: MemorySource::with("AAK", vec![3.0]),
            entered: tokio::sync::Notify::new(),
            gate: tokio::sync::Semaphore::new(0),
        });
        let calc = Arc::new(AmplitudeBoundaryCalculator::new(
            source.clone(),
            ScalingPolicy::Auto,
            Arc::new(MetricsRecorder::new()),
        ));

        let in_flight = tokio::spawn({
            let calc = calc.clone();
            async move { calc.resolve(&BoundaryRequest::new("AAK")).await }
        });
        source.entered.notified().await;
        calc.set_policy(ScalingPolicy::FreezeCurrent).await;
        source.gate.add_permits(16);

        let stale = in_flight.await.unwrap().unwrap().unwrap();
        assert_eq!(stale.top_max, 3.0);
        assert_eq!(calc.cache().len().await, 0);

        source.inner.set("AAK", vec![50.0]);
        let frozen = calc.resolve(&BoundaryRequest::new("AAK")).await.unwrap().unwrap();
        assert_eq!(frozen.top_max, 50.0);
        assert_eq!(calc.cache().len().await, 1);
    }

    #[tokio::test]
    async fn scale_to_channel_reports_reference_bounds() {
        let source = MemorySource::with("AAK", vec![2.0, -1.0]);
        source.set("ASAR", vec![10.0, -4.0]);
        let calc = calculator(source, ScalingPolicy::ScaleToChannel("ASAR".into()));

        let bounds = calc.resolve(&BoundaryRequest::new("AAK")).await.unwrap().unwrap();
        assert_eq!(bounds.top_max, 10.0);
        assert_eq!(bounds.bottom_max, -10.0);
        assert_eq!(bounds.offset, 10.0);
        assert_eq!(bounds.channel_segment_id, "AAK-seg");
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let calc = calculator(MemorySource::with("AAK", vec![1.0]), ScalingPolicy::Auto);
        let request = BoundaryRequest {
            range: Some(TimeRange::new(10.0, 5.0)),
            ..BoundaryRequest::new("AAK")
        };
        assert!(matches!(
            calc.resolve(&request).await,
            Err(BoundaryError::InvalidRange(_, _))
        ));
    }
}

use anyhow::Context;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;
use waveviewcore::boundaries::{SampleSource, SampleWindow};
use waveviewcore::domain::DomainSnapshot;
use waveviewcore::prelude::{BoundaryError, BoundaryResult, TimeRange};

/// Wire form of a sample window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleWindowPayload {
    pub channel_id: String,
    pub channel_segment_id: String,
    pub start_time_secs: f64,
    pub sample_rate_hz: f64,
    pub values: Vec<f32>,
}

/// Domain snapshot plus the sample data backing its channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioPayload {
    pub description: Option<String>,
    pub snapshot: DomainSnapshot,
    pub samples: Vec<SampleWindowPayload>,
    pub visible_interval: Option<TimeRange>,
}

impl ScenarioPayload {
    /// Reads a scenario from JSON (`.json`) or YAML (anything else).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario {}", path_ref.display()))?;
        let is_json = path_ref
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let scenario = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing scenario json {}", path_ref.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing scenario yaml {}", path_ref.display()))?
        };
        Ok(scenario)
    }

    pub fn windows_by_channel(&self) -> HashMap<String, Vec<SampleWindow>> {
        let mut windows: HashMap<String, Vec<SampleWindow>> = HashMap::new();
        for payload in &self.samples {
            windows
                .entry(payload.channel_id.clone())
                .or_default()
                .push(SampleWindow {
                    channel_segment_id: payload.channel_segment_id.clone(),
                    start_time_secs: payload.start_time_secs,
                    sample_rate_hz: payload.sample_rate_hz,
                    values: Array1::from(payload.values.clone()),
                });
        }
        windows
    }
}

/// In-memory stand-in for the renderer's waveform cache.
pub struct MemorySampleSource {
    windows: RwLock<HashMap<String, Vec<SampleWindow>>>,
    visible: std::sync::RwLock<TimeRange>,
}

impl MemorySampleSource {
    pub fn new(visible: TimeRange) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            visible: std::sync::RwLock::new(visible),
        }
    }

    pub async fn replace(&self, windows: HashMap<String, Vec<SampleWindow>>, visible: Option<TimeRange>) {
        *self.windows.write().await = windows;
        if let Some(range) = visible {
            if let Ok(mut guard) = self.visible.write() {
                *guard = range;
            }
        }
    }
}

impl SampleSource for MemorySampleSource {
    async fn read_windows(
        &self,
        channel_id: &str,
        channel_segment_id: Option<&str>,
        range: TimeRange,
    ) -> BoundaryResult<Vec<SampleWindow>> {
        let windows = self.windows.read().await;
        let channel_windows = windows
            .get(channel_id)
            .ok_or_else(|| BoundaryError::Unavailable(channel_id.to_string()))?;
        Ok(channel_windows
            .iter()
            .filter(|window| channel_segment_id.map_or(true, |id| window.channel_segment_id == id))
            .filter(|window| range.overlaps(window.start_time_secs, window.end_time_secs()))
            .cloned()
            .collect())
    }

    fn visible_interval(&self) -> TimeRange {
        self.visible
            .read()
            .map(|range| *range)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[tokio::test]
    async fn source_filters_by_segment_and_range() {
        let payload = ScenarioPayload {
            samples: vec![
                SampleWindowPayload {
                    channel_id: "AAK".into(),
                    channel_segment_id: "a".into(),
                    start_time_secs: 0.0,
                    sample_rate_hz: 1.0,
                    values: vec![1.0, 2.0],
                },
                SampleWindowPayload {
                    channel_id: "AAK".into(),
                    channel_segment_id: "b".into(),
                    start_time_secs: 50.0,
                    sample_rate_hz: 1.0,
                    values: vec![3.0],
                },
            ],
            ..Default::default()
        };
        let source = MemorySampleSource::new(TimeRange::new(0.0, 10.0));
        source.replace(payload.windows_by_channel(), None).await;

        let in_range = source
            .read_windows("AAK", None, TimeRange::new(0.0, 10.0))
            .await
            .unwrap();
        assert_eq!(in_range.len(), 1);
        let by_segment = source
            .read_windows("AAK", Some("b"), TimeRange::new(0.0, 100.0))
            .await
            .unwrap();
        assert_eq!(by_segment[0].channel_segment_id, "b");
        assert!(matches!(
            source.read_windows("ASAR", None, TimeRange::new(0.0, 1.0)).await,
            Err(BoundaryError::Unavailable(_))
        ));
    }

    #[test]
    fn scenario_loads_from_json_or_yaml() {
        let mut json = Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"description":"json","snapshot":{"stations":[]}}"#)
            .unwrap();
        let loaded = ScenarioPayload::load(json.path()).unwrap();
        assert_eq!(loaded.description.as_deref(), Some("json"));

        let mut yaml = Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(b"description: yaml\nsamples: []\n").unwrap();
        let loaded = ScenarioPayload::load(yaml.path()).unwrap();
        assert_eq!(loaded.description.as_deref(), Some("yaml"));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    ChannelSegmentsByChannel, Event, EventStatus, LocationDistance, PredictionsByReceiver, QcMask,
    SignalDetection, Station, WaveformFilter,
};

/// Everything the engine reads from the external data layer for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSnapshot {
    pub stations: Vec<Station>,
    pub detections: Vec<SignalDetection>,
    pub events: Vec<Event>,
    pub event_statuses: HashMap<String, EventStatus>,
    /// Feature predictions for the open event, when one is open.
    pub predictions: Option<PredictionsByReceiver>,
    /// Distances from the open event, keyed by station or channel name.
    pub distances: Vec<LocationDistance>,
    pub qc_masks: Vec<QcMask>,
    pub channel_segments: ChannelSegmentsByChannel,
    /// Analyst filter overrides per station or channel row.
    pub channel_filters: HashMap<String, WaveformFilter>,
    pub default_filters: Vec<WaveformFilter>,
}

impl DomainSnapshot {
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot: DomainSnapshot = serde_json::from_str(
            r#"{"stations":[{"name":"AAK","channels":[]}],"predictions":null}"#,
        )
        .unwrap();
        assert_eq!(snapshot.stations.len(), 1);
        assert!(snapshot.detections.is_empty());
        assert!(snapshot.predictions.is_none());
        assert!(snapshot.station("AAK").is_some());
    }
}

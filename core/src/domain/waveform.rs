use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const UNFILTERED: &str = "Unfiltered";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformFilter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sample_rate_hz: Option<f64>,
}

impl WaveformFilter {
    pub fn unfiltered() -> Self {
        Self {
            id: UNFILTERED.to_string(),
            name: UNFILTERED.to_string(),
            sample_rate_hz: None,
        }
    }

    fn matches_rate(&self, sample_rate_hz: Option<f64>) -> bool {
        match (self.sample_rate_hz, sample_rate_hz) {
            (None, _) => true,
            (Some(rate), Some(channel)) => (rate - channel).abs() < 1e-6,
            (Some(_), None) => false,
        }
    }
}

/// Waveform data already held by the external cache, described without samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSegmentDescriptor {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub is_selected: bool,
}

/// Channel name -> filter name -> segments.
pub type ChannelSegmentsByChannel = HashMap<String, BTreeMap<String, Vec<ChannelSegmentDescriptor>>>;

/// Resolves the filter applied to a channel or station row.
///
/// The measurement-mode amplitude filter wins, then an analyst override for
/// that row, then the first default filter matching the sample rate.
pub fn selected_waveform_filter(
    measurement_filter: Option<&WaveformFilter>,
    row_name: &str,
    sample_rate_hz: Option<f64>,
    channel_filters: &HashMap<String, WaveformFilter>,
    default_filters: &[WaveformFilter],
) -> WaveformFilter {
    if let Some(filter) = measurement_filter {
        return filter.clone();
    }
    if let Some(filter) = channel_filters.get(row_name) {
        return filter.clone();
    }
    default_filters
        .iter()
        .find(|filter| filter.matches_rate(sample_rate_hz))
        .cloned()
        .unwrap_or_else(WaveformFilter::unfiltered)
}

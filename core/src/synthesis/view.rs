//! Render descriptors handed to the external waveform renderer.
//!
//! Composite fields sit behind `Arc` so unchanged parts of the tree keep
//! their identity across synthesis passes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{AssociationStatus, ChannelSegmentDescriptor, QcMaskCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// Opaque colour tokens supplied by the host theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ThemeTokens(pub BTreeMap<String, String>);

impl ThemeTokens {
    pub fn color(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub time_secs: f64,
    pub line_style: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_time_secs_constraint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time_secs_constraint: Option<f64>,
}

impl Marker {
    pub fn fixed(id: &str, time_secs: f64, line_style: LineStyle) -> Self {
        Self {
            id: id.to_string(),
            time_secs,
            line_style,
            min_time_secs_constraint: None,
            max_time_secs_constraint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionWindowKind {
    Measurement,
    PeakTrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWindow {
    pub id: String,
    pub kind: SelectionWindowKind,
    pub start_marker: Marker,
    pub end_marker: Marker,
    pub is_moveable: bool,
    /// Drives warning styling in the renderer only.
    pub in_warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickMarker {
    pub id: String,
    pub label: String,
    pub time_secs: f64,
    pub uncertainty_secs: f64,
    pub show_uncertainty_bars: bool,
    pub color: Option<String>,
    pub is_selected: bool,
    pub is_conflicted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<AssociationStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewMask {
    pub id: String,
    pub category: QcMaskCategory,
    pub start_time_secs: f64,
    pub end_time_secs: f64,
}

/// Which cached waveform data the renderer should draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WaveformContent {
    pub channel_segment_id: String,
    pub channel_segments: BTreeMap<String, Vec<ChannelSegmentDescriptor>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewChannel {
    pub id: String,
    pub name: String,
    /// `beam.SHZ`-style suffix shown next to a station name.
    pub channel_label: String,
    pub tooltip: Option<String>,
    pub time_offset_seconds: f64,
    pub base_station_time: Option<f64>,
    pub height: u32,
    pub waveform: Arc<WaveformContent>,
    pub signal_detection_markers: Arc<Vec<PickMarker>>,
    pub predicted_phase_markers: Arc<Vec<PickMarker>>,
    pub selection_windows: Arc<Vec<SelectionWindow>>,
    pub vertical_markers: Arc<Vec<Marker>>,
    pub masks: Arc<Vec<ViewMask>>,
    pub distance: Option<f64>,
    pub azimuth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewStation {
    pub id: String,
    pub name: String,
    pub distance: f64,
    pub azimuth: f64,
    pub default_channel: Arc<ViewChannel>,
    pub non_default_channels: Arc<Vec<Arc<ViewChannel>>>,
    pub are_channels_showing: bool,
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::alignment::{AlignmentMode, Offset};
use crate::domain::station::find_distance;
use crate::domain::waveform::selected_waveform_filter;
use crate::domain::{
    Channel, ChannelSegmentDescriptor, DistanceUnits, DomainSnapshot, Event, MaskDisplayFilters,
    Phase, SignalDetection, Station, VisibilityDictionary, WaveformFilter,
};
use crate::prelude::{DisplayConfig, TimeRange};
use crate::synthesis::label::get_channel_label_and_tooltip;
use crate::synthesis::markers::{
    detection_pick_markers, interval_markers, predicted_phase_markers, DetectionMarkerContext,
};
use crate::synthesis::ordering::{DisplayMode, SortType};
use crate::synthesis::selection::generate_selection_windows;
use crate::synthesis::view::{
    PickMarker, ThemeTokens, ViewChannel, ViewMask, ViewStation, WaveformContent,
};
use crate::telemetry::LogManager;

fn default_channel_height() -> u32 {
    70
}

/// Analyst-selected display state applied to one synthesis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayParameters {
    pub mode: DisplayMode,
    /// Per-detection show/hide override for selection windows.
    pub measurement_entries: HashMap<String, bool>,
    pub sort_type: SortType,
    pub alignment: AlignmentMode,
    pub phase_to_align_on: Phase,
    pub current_interval: Option<TimeRange>,
    #[serde(default = "default_channel_height")]
    pub channel_height: u32,
    pub selected_detection_ids: HashSet<String>,
    pub mask_filters: MaskDisplayFilters,
    pub show_predicted_phases: bool,
    pub show_detection_uncertainty: bool,
    pub distance_units: DistanceUnits,
    pub open_event_id: Option<String>,
    pub visibility: VisibilityDictionary,
    pub theme: ThemeTokens,
}

impl Default for DisplayParameters {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Default,
            measurement_entries: HashMap::new(),
            sort_type: SortType::Distance,
            alignment: AlignmentMode::Time,
            phase_to_align_on: "P".into(),
            current_interval: None,
            channel_height: default_channel_height(),
            selected_detection_ids: HashSet::new(),
            mask_filters: MaskDisplayFilters::all_visible(),
            show_predicted_phases: true,
            show_detection_uncertainty: true,
            distance_units: DistanceUnits::Degrees,
            open_event_id: None,
            visibility: VisibilityDictionary::default(),
            theme: ThemeTokens::default(),
        }
    }
}

/// Shared, read-only inputs for building every station in a pass.
pub struct BuildContext<'a> {
    pub snapshot: &'a DomainSnapshot,
    pub params: &'a DisplayParameters,
    pub config: &'a DisplayConfig,
    pub offsets: &'a [Offset],
    pub open_event: Option<&'a Event>,
    pub logger: &'a LogManager,
}

impl<'a> BuildContext<'a> {
    fn offset_for(&self, receiver_name: &str) -> f64 {
        self.offsets
            .iter()
            .find(|offset| offset.receiver_name == receiver_name)
            .map(|offset| offset.offset)
            .unwrap_or(0.0)
    }

    fn base_station_time(&self) -> Option<f64> {
        self.offsets.first().map(|offset| offset.base_station_time)
    }

    fn measurement_filter(&self) -> Option<&WaveformFilter> {
        match self.params.mode {
            DisplayMode::Measurement => self.config.measurement_filter.as_ref(),
            DisplayMode::Default => None,
        }
    }

    fn selected_filter(&self, row_name: &str, sample_rate_hz: Option<f64>) -> WaveformFilter {
        selected_waveform_filter(
            self.measurement_filter(),
            row_name,
            sample_rate_hz,
            &self.snapshot.channel_filters,
            &self.snapshot.default_filters,
        )
    }

    fn marker_context(&self) -> DetectionMarkerContext<'_> {
        DetectionMarkerContext {
            events: &self.snapshot.events,
            open_event_id: self.params.open_event_id.as_deref(),
            event_statuses: &self.snapshot.event_statuses,
            selected_detection_ids: &self.params.selected_detection_ids,
            show_uncertainty: self.params.show_detection_uncertainty,
            theme: &self.params.theme,
        }
    }

    fn predicted_markers(&self, receiver_name: &str) -> Vec<PickMarker> {
        predicted_phase_markers(
            receiver_name,
            self.snapshot
                .predictions
                .as_ref()
                .and_then(|predictions| predictions.get(receiver_name)),
            self.params.show_predicted_phases,
            &self.params.phase_to_align_on,
            self.config,
            &self.params.theme,
        )
    }
}

/// Segments cached for `row_name`, flagging those measured by a selected detection.
pub fn selected_channel_segments(
    row_name: &str,
    detections: &[&SignalDetection],
    context: &BuildContext<'_>,
) -> BTreeMap<String, Vec<ChannelSegmentDescriptor>> {
    let selected_segment_ids: HashSet<&str> = detections
        .iter()
        .filter(|detection| context.params.selected_detection_ids.contains(&detection.id))
        .filter_map(|detection| detection.current_hypothesis())
        .filter_map(|hypothesis| hypothesis.measured_channel_segment_id())
        .collect();

    context
        .snapshot
        .channel_segments
        .get(row_name)
        .map(|by_filter| {
            by_filter
                .iter()
                .map(|(filter_name, segments)| {
                    let segments = segments
                        .iter()
                        .map(|segment| ChannelSegmentDescriptor {
                            is_selected: segment.is_selected
                                || selected_segment_ids.contains(segment.id.as_str()),
                            ..segment.clone()
                        })
                        .collect();
                    (filter_name.clone(), segments)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Station row: the beam/default channel carrying detections and windows.
pub fn create_default_channel(
    station: &Station,
    detections: &[&SignalDetection],
    context: &BuildContext<'_>,
) -> ViewChannel {
    let (channel_label, tooltip) = match get_channel_label_and_tooltip(detections) {
        Ok(label) => label,
        Err(err) => {
            context
                .logger
                .warn(&format!("Error generating station label for {}: {}", station.name, err));
            (String::new(), None)
        }
    };
    let selected_filter = context.selected_filter(&station.name, station.nominal_sample_rate_hz());
    let selection_windows = generate_selection_windows(
        detections,
        context.open_event,
        context.params.mode == DisplayMode::Measurement,
        &context.params.measurement_entries,
        context.config,
    );

    ViewChannel {
        id: station.name.clone(),
        name: station.name.clone(),
        channel_label,
        tooltip,
        time_offset_seconds: context.offset_for(&station.name),
        base_station_time: context.base_station_time(),
        height: context.params.channel_height,
        waveform: Arc::new(WaveformContent {
            channel_segment_id: selected_filter.id,
            channel_segments: selected_channel_segments(&station.name, detections, context),
        }),
        signal_detection_markers: Arc::new(detection_pick_markers(detections, &context.marker_context())),
        predicted_phase_markers: Arc::new(context.predicted_markers(&station.name)),
        selection_windows: Arc::new(selection_windows),
        vertical_markers: Arc::new(interval_markers(context.params.current_interval.as_ref())),
        masks: Arc::new(Vec::new()),
        distance: None,
        azimuth: None,
    }
}

/// Raw channel row beneath an expanded station.
pub fn create_non_default_channel(
    channel: &Channel,
    detections: &[&SignalDetection],
    context: &BuildContext<'_>,
) -> ViewChannel {
    let selected_filter = context.selected_filter(&channel.name, Some(channel.nominal_sample_rate_hz));
    let masks = context
        .snapshot
        .qc_masks
        .iter()
        .filter(|mask| mask.channel_name == channel.name)
        .filter(|mask| context.params.mask_filters.is_visible(mask.category))
        .map(|mask| ViewMask {
            id: mask.id.clone(),
            category: mask.category,
            start_time_secs: mask.start_time,
            end_time_secs: mask.end_time,
        })
        .collect();
    let distance = find_distance(&context.snapshot.distances, &channel.name);

    ViewChannel {
        id: channel.name.clone(),
        name: channel.name.clone(),
        channel_label: String::new(),
        tooltip: None,
        time_offset_seconds: context.offset_for(&channel.name),
        base_station_time: context.base_station_time(),
        height: context.params.channel_height,
        waveform: Arc::new(WaveformContent {
            channel_segment_id: selected_filter.id,
            channel_segments: selected_channel_segments(&channel.name, detections, context),
        }),
        signal_detection_markers: Arc::new(detection_pick_markers(detections, &context.marker_context())),
        predicted_phase_markers: Arc::new(context.predicted_markers(&channel.name)),
        selection_windows: Arc::new(Vec::new()),
        vertical_markers: Arc::new(interval_markers(context.params.current_interval.as_ref())),
        masks: Arc::new(masks),
        distance: distance.map(|d| d.in_units(context.params.distance_units)),
        azimuth: distance.map(|d| d.azimuth),
    }
}

/// Visible raw channels in canonical order. Empty in measurement mode or
/// when the station is collapsed.
pub fn create_non_default_channels(
    station: &Station,
    detections: &[&SignalDetection],
    context: &BuildContext<'_>,
) -> Vec<Arc<ViewChannel>> {
    if context.params.mode == DisplayMode::Measurement {
        return Vec::new();
    }
    context
        .params
        .visibility
        .displayed_channels(station)
        .into_iter()
        .map(|channel| {
            let channel_detections: Vec<&SignalDetection> = detections
                .iter()
                .copied()
                .filter(|detection| detection.channel_name() == Some(channel.name.as_str()))
                .collect();
            Arc::new(create_non_default_channel(channel, &channel_detections, context))
        })
        .collect()
}

pub fn create_view_station(
    station: &Station,
    detections: &[&SignalDetection],
    context: &BuildContext<'_>,
) -> ViewStation {
    let distance = find_distance(&context.snapshot.distances, &station.name);
    ViewStation {
        id: station.name.clone(),
        name: station.name.clone(),
        distance: distance.map(|d| d.distance_degrees).unwrap_or(0.0),
        azimuth: distance.map(|d| d.azimuth).unwrap_or(0.0),
        default_channel: Arc::new(create_default_channel(station, detections, context)),
        non_default_channels: Arc::new(create_non_default_channels(station, detections, context)),
        are_channels_showing: context.params.visibility.is_station_expanded(&station.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FeatureMeasurement, MeasurementValue, QcMask, QcMaskCategory, SignalDetectionHypothesis,
        StationVisibility,
    };

    fn channel(name: &str, orientation: char) -> Channel {
        Channel {
            name: name.into(),
            station_name: "AAK".into(),
            nominal_sample_rate_hz: 40.0,
            channel_group: "AAK".into(),
            band_code: 'B',
            instrument_code: 'H',
            orientation_code: orientation,
        }
    }

    fn station() -> Station {
        Station {
            name: "AAK".into(),
            channels: vec![channel("AAK.AAK.BHN", 'N'), channel("AAK.AAK.BHZ", 'Z')],
        }
    }

    fn detection(id: &str, channel_name: &str, segment: &str) -> SignalDetection {
        SignalDetection {
            id: id.into(),
            station_name: "AAK".into(),
            hypotheses: vec![SignalDetectionHypothesis {
                id: format!("{id}-h"),
                rejected: false,
                feature_measurements: vec![FeatureMeasurement {
                    channel_name: channel_name.into(),
                    measured_channel_segment_id: Some(segment.into()),
                    value: MeasurementValue::ArrivalTime {
                        value: Some(100.0),
                        standard_deviation: Some(0.1),
                    },
                }],
            }],
        }
    }

    fn snapshot() -> DomainSnapshot {
        let segment = |id: &str| ChannelSegmentDescriptor {
            id: id.into(),
            start_time: 0.0,
            end_time: 600.0,
            is_selected: false,
        };
        DomainSnapshot {
            stations: vec![station()],
            qc_masks: vec![
                QcMask {
                    id: "m1".into(),
                    channel_name: "AAK.AAK.BHZ".into(),
                    category: QcMaskCategory::StationSoh,
                    start_time: 10.0,
                    end_time: 20.0,
                },
                QcMask {
                    id: "m2".into(),
                    channel_name: "AAK.AAK.BHZ".into(),
                    category: QcMaskCategory::Rejected,
                    start_time: 30.0,
                    end_time: 40.0,
                },
            ],
            channel_segments: HashMap::from([(
                "AAK".to_string(),
                BTreeMap::from([("Unfiltered".to_string(), vec![segment("seg-1"), segment("seg-2")])]),
            )]),
            ..Default::default()
        }
    }

    fn expanded_params() -> DisplayParameters {
        let mut params = DisplayParameters::default();
        params
            .visibility
            .insert("AAK", StationVisibility::new(true, true).with_hidden_channel("AAK.AAK.BHN"));
        params.mask_filters = MaskDisplayFilters(HashMap::from([(QcMaskCategory::StationSoh, true)]));
        params.selected_detection_ids.insert("sd1".into());
        params
    }

    #[test]
    fn station_carries_offset_and_selected_segments() {
        let snapshot = snapshot();
        let params = expanded_params();
        let config = DisplayConfig::default();
        let offsets = vec![
            Offset {
                receiver_name: "ASAR".into(),
                offset: 0.0,
                base_station_time: 1_000.0,
            },
            Offset {
                receiver_name: "AAK".into(),
                offset: 12.5,
                base_station_time: 1_000.0,
            },
        ];
        let logger = LogManager::new();
        let context = BuildContext {
            snapshot: &snapshot,
            params: &params,
            config: &config,
            offsets: &offsets,
            open_event: None,
            logger: &logger,
        };
        let sd = detection("sd1", "AAK.AAK.BHZ", "seg-2");
        let view = create_view_station(&snapshot.stations[0], &[&sd], &context);

        assert_eq!(view.default_channel.time_offset_seconds, 12.5);
        assert_eq!(view.default_channel.base_station_time, Some(1_000.0));
        assert_eq!(view.default_channel.waveform.channel_segment_id, "Unfiltered");
        let segments = &view.default_channel.waveform.channel_segments["Unfiltered"];
        assert!(!segments[0].is_selected);
        assert!(segments[1].is_selected);
        assert!(view.are_channels_showing);
    }

    #[test]
    fn raw_channels_respect_visibility_and_mask_filters() {
        let snapshot = snapshot();
        let params = expanded_params();
        let config = DisplayConfig::default();
        let logger = LogManager::new();
        let context = BuildContext {
            snapshot: &snapshot,
            params: &params,
            config: &config,
            offsets: &[],
            open_event: None,
            logger: &logger,
        };
        let sd = detection("sd1", "AAK.AAK.BHZ", "seg-2");
        let channels = create_non_default_channels(&snapshot.stations[0], &[&sd], &context);

        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "AAK.AAK.BHZ");
        assert_eq!(channels[0].time_offset_seconds, 0.0);
        assert_eq!(channels[0].masks.len(), 1);
        assert_eq!(channels[0].masks[0].id, "m1");
        assert_eq!(channels[0].signal_detection_markers.len(), 1);
    }

    #[test]
    fn measurement_mode_hides_raw_channels() {
        let snapshot = snapshot();
        let params = DisplayParameters {
            mode: DisplayMode::Measurement,
            ..expanded_params()
        };
        let config = DisplayConfig::default();
        let logger = LogManager::new();
        let context = BuildContext {
            snapshot: &snapshot,
            params: &params,
            config: &config,
            offsets: &[],
            open_event: None,
            logger: &logger,
        };
        assert!(create_non_default_channels(&snapshot.stations[0], &[], &context).is_empty());
    }
}

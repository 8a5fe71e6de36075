use std::collections::{HashMap, HashSet};

use crate::domain::event::association_status;
use crate::domain::{Event, EventStatus, Phase, ReceiverPredictions, SignalDetection};
use crate::prelude::{DisplayConfig, TimeRange};
use crate::synthesis::view::{LineStyle, Marker, PickMarker, ThemeTokens};

pub const PREDICTED_PHASE_THEME_KEY: &str = "predicted_phase";

/// Inputs shared by every detection marker on a station.
pub struct DetectionMarkerContext<'a> {
    pub events: &'a [Event],
    pub open_event_id: Option<&'a str>,
    pub event_statuses: &'a HashMap<String, EventStatus>,
    pub selected_detection_ids: &'a HashSet<String>,
    pub show_uncertainty: bool,
    pub theme: &'a ThemeTokens,
}

/// Observed pick markers for a station's detections.
pub fn detection_pick_markers(
    detections: &[&SignalDetection],
    context: &DetectionMarkerContext<'_>,
) -> Vec<PickMarker> {
    detections
        .iter()
        .filter(|detection| !detection.is_rejected())
        .filter_map(|detection| {
            let hypothesis = detection.current_hypothesis()?;
            let time_secs = hypothesis.arrival_time()?;
            let uncertainty_secs = hypothesis.arrival_time_uncertainty().unwrap_or(0.0);
            let status = association_status(
                detection,
                context.events,
                context.open_event_id,
                context.event_statuses,
            );
            Some(PickMarker {
                id: detection.id.clone(),
                label: hypothesis
                    .phase()
                    .map(|phase| phase.to_string())
                    .unwrap_or_default(),
                time_secs,
                uncertainty_secs,
                show_uncertainty_bars: context.show_uncertainty && uncertainty_secs > 0.0,
                color: context.theme.color(status.theme_key()),
                is_selected: context.selected_detection_ids.contains(&detection.id),
                is_conflicted: false,
                association: Some(status),
            })
        })
        .collect()
}

/// Predicted pick markers for priority phases plus the alignment phase.
pub fn predicted_phase_markers(
    receiver_name: &str,
    predictions: Option<&ReceiverPredictions>,
    show_predicted_phases: bool,
    phase_to_align_on: &Phase,
    config: &DisplayConfig,
    theme: &ThemeTokens,
) -> Vec<PickMarker> {
    if !show_predicted_phases {
        return Vec::new();
    }
    let Some(predictions) = predictions else {
        return Vec::new();
    };
    let mut seen: HashSet<&Phase> = HashSet::new();
    predictions
        .feature_predictions
        .iter()
        .filter(|prediction| {
            config.priority_phases.contains(&prediction.phase) || prediction.phase == *phase_to_align_on
        })
        .filter_map(|prediction| {
            let phase = &prediction.phase;
            let time_secs = predictions.arrival_time(phase)?;
            if !seen.insert(phase) {
                return None;
            }
            Some(PickMarker {
                id: format!("{receiver_name}-{phase}"),
                label: phase.to_string(),
                time_secs,
                uncertainty_secs: prediction.standard_deviation.unwrap_or(0.0),
                show_uncertainty_bars: false,
                color: theme.color(PREDICTED_PHASE_THEME_KEY),
                is_selected: false,
                is_conflicted: false,
                association: None,
            })
        })
        .collect()
}

/// Vertical markers at the start and end of the loaded interval.
pub fn interval_markers(interval: Option<&TimeRange>) -> Vec<Marker> {
    match interval {
        Some(range) => vec![
            Marker::fixed("startTime", range.start_time_secs, LineStyle::Dashed),
            Marker::fixed("endTime", range.end_time_secs, LineStyle::Dashed),
        ],
        None => Vec::new(),
    }
}

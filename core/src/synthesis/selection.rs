use std::collections::HashMap;

use crate::domain::{AmplitudeKind, AmplitudeMeasurement, Event, SignalDetection};
use crate::prelude::DisplayConfig;
use crate::synthesis::view::{LineStyle, Marker, SelectionWindow, SelectionWindowKind};

/// Whether the peak/trough selection should be styled as a warning.
///
/// The period must sit inside the configured range and both ends must fall
/// inside the primary measurement window.
pub fn is_peak_trough_in_warning(
    arrival_time: f64,
    period: f64,
    trough_time: f64,
    peak_time: f64,
    config: &DisplayConfig,
) -> bool {
    let limits = &config.peak_trough;
    let selection_start = arrival_time + config.selection.start_offset_secs;
    let selection_end = arrival_time + config.selection.end_offset_secs;
    period < limits.min_period_secs
        || period > limits.max_period_secs
        || peak_time < trough_time
        || trough_time < selection_start
        || trough_time > selection_end
        || peak_time < selection_start
        || peak_time > selection_end
}

/// Peak/trough window spanning half a period from the trough.
pub fn generate_amplitude_selection_window(
    detection_id: &str,
    arrival_time: f64,
    amplitude: &AmplitudeMeasurement,
    measurement_mode: bool,
    config: &DisplayConfig,
) -> SelectionWindow {
    let trough_time = amplitude.trough_time;
    let peak_time = trough_time + amplitude.period / 2.0;
    let in_warning =
        is_peak_trough_in_warning(arrival_time, amplitude.period, trough_time, peak_time, config);
    let is_moveable = measurement_mode && config.peak_trough.is_moveable;
    let line_style = if is_moveable {
        LineStyle::Dashed
    } else {
        LineStyle::Solid
    };

    SelectionWindow {
        id: format!("{}{}", config.peak_trough.id_prefix, detection_id),
        kind: SelectionWindowKind::PeakTrough,
        start_marker: Marker {
            min_time_secs_constraint: Some(arrival_time + config.selection.start_offset_secs),
            ..Marker::fixed("start", trough_time, line_style)
        },
        end_marker: Marker {
            max_time_secs_constraint: Some(arrival_time + config.selection.end_offset_secs),
            ..Marker::fixed("end", peak_time, line_style)
        },
        is_moveable,
        in_warning,
    }
}

fn measurement_window(detection_id: &str, arrival_time: f64, config: &DisplayConfig) -> SelectionWindow {
    let selection = &config.selection;
    SelectionWindow {
        id: format!("{}{}", selection.id_prefix, detection_id),
        kind: SelectionWindowKind::Measurement,
        start_marker: Marker::fixed("start", arrival_time + selection.start_offset_secs, LineStyle::Solid),
        end_marker: Marker::fixed("end", arrival_time + selection.end_offset_secs, LineStyle::Solid),
        is_moveable: selection.is_moveable,
        in_warning: false,
    }
}

/// Measurement and peak/trough windows for a station's detections.
///
/// A detection gets windows when its override entry says so, or, absent an
/// override, when measurement mode is on and it is associated to the open
/// event with a measurable phase. Detections without an arrival are skipped.
pub fn generate_selection_windows(
    detections: &[&SignalDetection],
    open_event: Option<&Event>,
    measurement_mode: bool,
    entries: &HashMap<String, bool>,
    config: &DisplayConfig,
) -> Vec<SelectionWindow> {
    let mut windows = Vec::new();
    for detection in detections {
        let Some(hypothesis) = detection.current_hypothesis() else {
            continue;
        };
        let Some(arrival_time) = hypothesis.arrival_time() else {
            continue;
        };

        let measurable = open_event
            .map(|event| event.is_associated(detection))
            .unwrap_or(false)
            && hypothesis
                .phase()
                .map(|phase| config.measurement_phases.contains(phase))
                .unwrap_or(false);

        let show = match entries.get(&detection.id) {
            Some(explicit) => *explicit,
            None => measurement_mode && measurable,
        };
        if !show {
            continue;
        }

        windows.push(measurement_window(&detection.id, arrival_time, config));
        if let Some(amplitude) = hypothesis.amplitude(AmplitudeKind::A5Over2) {
            windows.push(generate_amplitude_selection_window(
                &detection.id,
                arrival_time,
                &amplitude,
                measurement_mode,
                config,
            ));
        }
    }
    windows
}

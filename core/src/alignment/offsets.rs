use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::event::is_open_associated;
use crate::domain::{Event, Phase, PredictionsByReceiver, ReceiverPredictions, SignalDetection};

/// Per-receiver time shift relative to the base station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub receiver_name: String,
    pub offset: f64,
    pub base_station_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlignmentMode {
    #[default]
    Time,
    PredictedPhase,
    ObservedPhase,
}

/// Predicted arrival of `phase` at the base station.
pub fn get_alignment_time(
    predictions: &PredictionsByReceiver,
    base_station_name: &str,
    phase: &Phase,
) -> Option<f64> {
    predictions
        .get(base_station_name)
        .and_then(|receiver| receiver.arrival_time(phase))
}

fn offset_from_prediction(
    receiver_name: &str,
    receiver: &ReceiverPredictions,
    base_station_time: f64,
    phase: &Phase,
) -> Option<Offset> {
    receiver.arrival_time(phase).map(|arrival| Offset {
        receiver_name: receiver_name.to_string(),
        offset: base_station_time - arrival,
        base_station_time,
    })
}

fn offset_from_detection(detection: &SignalDetection, base_station_time: f64) -> Option<Offset> {
    detection.arrival_time().map(|arrival| Offset {
        receiver_name: detection.station_name.clone(),
        offset: base_station_time - arrival,
        base_station_time,
    })
}

/// Offsets aligning every receiver on its predicted arrival of `phase`.
///
/// One entry per receiver in map order; `None` where the receiver has no
/// prediction for the phase. Empty when the base station has none.
pub fn calculate_offsets_predicted_phase(
    predictions: &PredictionsByReceiver,
    base_station_name: &str,
    phase: &Phase,
) -> Vec<Option<Offset>> {
    let Some(base_station_time) = get_alignment_time(predictions, base_station_name, phase) else {
        return Vec::new();
    };
    predictions
        .iter()
        .map(|(name, receiver)| offset_from_prediction(name, receiver, base_station_time, phase))
        .collect()
}

/// Offsets aligning on observed arrivals of `phase` for detections associated
/// to the open event, falling back to predictions for every other receiver.
pub fn calculate_offsets_observed_phase(
    detections: &[SignalDetection],
    predictions: &PredictionsByReceiver,
    base_station_name: &str,
    events: &[Event],
    open_event_id: Option<&str>,
    phase: &Phase,
) -> Vec<Offset> {
    let observed: Vec<&SignalDetection> = detections
        .iter()
        .filter(|detection| is_open_associated(detection, events, open_event_id))
        .filter(|detection| detection.phase() == Some(phase))
        .collect();

    let base_station_time = observed
        .iter()
        .find(|detection| detection.station_name == base_station_name)
        .and_then(|detection| detection.arrival_time())
        .or_else(|| get_alignment_time(predictions, base_station_name, phase));
    let Some(base_station_time) = base_station_time else {
        return Vec::new();
    };

    let mut covered = HashSet::new();
    let mut offsets = Vec::new();
    for detection in observed {
        if covered.contains(detection.station_name.as_str()) {
            continue;
        }
        if let Some(offset) = offset_from_detection(detection, base_station_time) {
            covered.insert(detection.station_name.as_str());
            offsets.push(offset);
        }
    }

    offsets.extend(
        predictions
            .iter()
            .filter(|(name, _)| !covered.contains(name.as_str()))
            .filter_map(|(name, receiver)| {
                offset_from_prediction(name, receiver, base_station_time, phase)
            }),
    );
    offsets
}

/// Inputs for a full offset pass.
pub struct AlignmentInputs<'a> {
    pub mode: AlignmentMode,
    pub phase: &'a Phase,
    pub predictions: Option<&'a PredictionsByReceiver>,
    pub detections: &'a [SignalDetection],
    pub events: &'a [Event],
    pub open_event_id: Option<&'a str>,
}

/// Offsets for the requested mode, using the first sorted visible station as
/// the base station. Time alignment produces no offsets.
pub fn calculate_offsets(inputs: &AlignmentInputs<'_>, base_station_name: Option<&str>) -> Vec<Offset> {
    let (Some(predictions), Some(base)) = (inputs.predictions, base_station_name) else {
        return Vec::new();
    };
    match inputs.mode {
        AlignmentMode::Time => Vec::new(),
        AlignmentMode::PredictedPhase => calculate_offsets_predicted_phase(predictions, base, inputs.phase)
            .into_iter()
            .flatten()
            .collect(),
        AlignmentMode::ObservedPhase => {
            if inputs.open_event_id.is_none() {
                return Vec::new();
            }
            calculate_offsets_observed_phase(
                inputs.detections,
                predictions,
                base,
                inputs.events,
                inputs.open_event_id,
                inputs.phase,
            )
        }
    }
}

/// Default phases with at least one prediction for the receiver.
pub fn alignable_phases(receiver: Option<&ReceiverPredictions>, default_phases: &[Phase]) -> Vec<Phase> {
    let Some(receiver) = receiver else {
        return Vec::new();
    };
    default_phases
        .iter()
        .filter(|phase| {
            receiver
                .feature_predictions
                .iter()
                .any(|prediction| prediction.phase == **phase)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EventHypothesis, FeatureMeasurement, FeaturePrediction, MeasurementValue, PredictionType,
        SignalDetectionHypothesis,
    };

    fn receiver(entries: &[(&str, f64)]) -> ReceiverPredictions {
        ReceiverPredictions {
            feature_predictions: entries
                .iter()
                .map(|(phase, time)| FeaturePrediction {
                    phase: Phase::from(*phase),
                    prediction_type: PredictionType::ArrivalTime,
                    arrival_time: Some(*time),
                    standard_deviation: None,
                })
                .collect(),
        }
    }

    fn predictions() -> PredictionsByReceiver {
        PredictionsByReceiver::from([
            ("AAK".to_string(), receiver(&[("P", 100.0), ("S", 160.0)])),
            ("ARCES".to_string(), receiver(&[("S", 190.0)])),
            ("ASAR".to_string(), receiver(&[("P", 130.0), ("S", 210.0)])),
        ])
    }

    fn detection(station: &str, hypothesis: &str, phase: &str, arrival: f64) -> SignalDetection {
        SignalDetection {
            id: format!("sd-{station}"),
            station_name: station.into(),
            hypotheses: vec![SignalDetectionHypothesis {
                id: hypothesis.into(),
                rejected: false,
                feature_measurements: vec![
                    FeatureMeasurement {
                        channel_name: format!("{station}.beam.SHZ/beam,fk"),
                        measured_channel_segment_id: None,
                        value: MeasurementValue::ArrivalTime {
                            value: Some(arrival),
                            standard_deviation: None,
                        },
                    },
                    FeatureMeasurement {
                        channel_name: format!("{station}.beam.SHZ/beam,fk"),
                        measured_channel_segment_id: None,
                        value: MeasurementValue::Phase { phase: phase.into() },
                    },
                ],
            }],
        }
    }

    fn open_event(associated: &[&str]) -> Vec<Event> {
        vec![Event {
            id: "event".into(),
            preferred_hypothesis_id: "eh".into(),
            hypotheses: vec![EventHypothesis {
                id: "eh".into(),
                rejected: false,
                associated_detection_hypothesis_ids: associated.iter().map(|s| s.to_string()).collect(),
            }],
        }]
    }

    #[test]
    fn alignment_time_reads_base_station_prediction() {
        let predictions = predictions();
        assert_eq!(get_alignment_time(&predictions, "ASAR", &"P".into()), Some(130.0));
        assert_eq!(get_alignment_time(&predictions, "ARCES", &"P".into()), None);
        assert_eq!(get_alignment_time(&predictions, "NOPE", &"P".into()), None);
    }

    #[test]
    fn predicted_phase_marks_receiver_without_phase_as_missing() {
        let offsets = calculate_offsets_predicted_phase(&predictions(), "AAK", &"P".into());
        assert_eq!(offsets.len(), 3);

        let aak = offsets[0].as_ref().unwrap();
        assert_eq!(aak.receiver_name, "AAK");
        assert_eq!(aak.offset, 0.0);
        assert!(offsets[1].is_none());
        let asar = offsets[2].as_ref().unwrap();
        assert_eq!(asar.offset, -30.0);
        assert_eq!(asar.base_station_time, 100.0);
    }

    #[test]
    fn predicted_phase_without_baseline_is_empty() {
        assert!(calculate_offsets_predicted_phase(&predictions(), "ARCES", &"P".into()).is_empty());
    }

    #[test]
    fn observed_phase_uses_observed_baseline_and_predicted_fallback() {
        let detections = vec![
            detection("AAK", "h-aak", "P", 104.0),
            detection("ASAR", "h-asar", "P", 128.0),
        ];
        let events = open_event(&["h-aak", "h-asar"]);
        let offsets = calculate_offsets_observed_phase(
            &detections,
            &predictions(),
            "AAK",
            &events,
            Some("event"),
            &"P".into(),
        );

        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0].receiver_name, "AAK");
        assert_eq!(offsets[0].offset, 0.0);
        assert_eq!(offsets[1].receiver_name, "ASAR");
        assert_eq!(offsets[1].offset, 104.0 - 128.0);
    }

    #[test]
    fn observed_phase_falls_back_to_predicted_baseline() {
        let detections = vec![detection("ASAR", "h-asar", "P", 128.0)];
        let events = open_event(&["h-asar"]);
        let offsets = calculate_offsets_observed_phase(
            &detections,
            &predictions(),
            "AAK",
            &events,
            Some("event"),
            &"P".into(),
        );

        let aak = offsets.iter().find(|o| o.receiver_name == "AAK").unwrap();
        assert_eq!(aak.offset, 0.0);
        let asar = offsets.iter().find(|o| o.receiver_name == "ASAR").unwrap();
        assert_eq!(asar.offset, 100.0 - 128.0);
    }

    #[test]
    fn observed_phase_never_repeats_a_receiver() {
        let detections = vec![
            detection("AAK", "h1", "P", 104.0),
            detection("AAK", "h2", "P", 105.0),
            detection("ASAR", "h3", "P", 128.0),
            detection("ASAR", "h4", "S", 200.0),
        ];
        let events = open_event(&["h1", "h2", "h3", "h4"]);
        let offsets = calculate_offsets_observed_phase(
            &detections,
            &predictions(),
            "AAK",
            &events,
            Some("event"),
            &"P".into(),
        );

        let mut names: Vec<&str> = offsets.iter().map(|o| o.receiver_name.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn unassociated_detections_do_not_drive_alignment() {
        let detections = vec![detection("ASAR", "h-asar", "P", 128.0)];
        let events = open_event(&[]);
        let offsets = calculate_offsets_observed_phase(
            &detections,
            &predictions(),
            "AAK",
            &events,
            Some("event"),
            &"P".into(),
        );
        let asar = offsets.iter().find(|o| o.receiver_name == "ASAR").unwrap();
        assert_eq!(asar.offset, -30.0);
    }

    #[test]
    fn time_mode_has_no_offsets() {
        let predictions = predictions();
        let phase = Phase::from("P");
        let inputs = AlignmentInputs {
            mode: AlignmentMode::Time,
            phase: &phase,
            predictions: Some(&predictions),
            detections: &[],
            events: &[],
            open_event_id: None,
        };
        assert!(calculate_offsets(&inputs, Some("AAK")).is_empty());

        let predicted = AlignmentInputs {
            mode: AlignmentMode::PredictedPhase,
            ..inputs
        };
        assert_eq!(calculate_offsets(&predicted, Some("AAK")).len(), 2);
    }

    #[test]
    fn alignable_phases_keep_default_order() {
        let predictions = predictions();
        let phases = alignable_phases(predictions.get("AAK"), &["S".into(), "Lg".into(), "P".into()]);
        assert_eq!(phases, vec![Phase::from("S"), Phase::from("P")]);
        assert!(alignable_phases(None, &["P".into()]).is_empty());
    }
}

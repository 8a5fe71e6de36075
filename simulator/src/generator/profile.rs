use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use waveviewcore::domain::{
    AmplitudeKind, Channel, ChannelSegmentDescriptor, DomainSnapshot, Event, EventHypothesis,
    EventStatus, FeatureMeasurement, FeaturePrediction, LocationDistance, MeasurementValue,
    PredictionType, PredictionsByReceiver, QcMask, QcMaskCategory, ReceiverPredictions,
    SignalDetection, SignalDetectionHypothesis, Station, WaveformFilter,
};
use waveviewcore::domain::waveform::UNFILTERED;
use waveviewcore::prelude::TimeRange;

use crate::generator::template::{arrival_envelope, sine_wave};
use crate::workflow::samples::{SampleWindowPayload, ScenarioPayload};

pub const GENERATED_EVENT_ID: &str = "event-1";

const STATION_NAMES: [&str; 12] = [
    "AAK", "ASAR", "ARCES", "BOSA", "CMAR", "FINES", "GERES", "ILAR", "KSRS", "MKAR", "PDAR", "TXAR",
];
const ORIENTATIONS: [char; 3] = ['Z', 'N', 'E'];
const P_SECS_PER_DEGREE: f64 = 8.0;
const S_SECS_PER_DEGREE: f64 = 14.5;

/// Configuration for generating a synthetic review scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub station_count: usize,
    pub sample_rate_hz: f64,
    pub start_time_secs: f64,
    pub duration_secs: f64,
    /// Seconds after `start_time_secs` at which the event occurs.
    pub origin_offset_secs: f64,
    pub frequency: f32,
    pub noise: f32,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            station_count: 6,
            sample_rate_hz: 20.0,
            start_time_secs: 1_700_000_000.0,
            duration_secs: 900.0,
            origin_offset_secs: 60.0,
            frequency: 1.5,
            noise: 0.05,
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_station_count(&self) -> usize {
        self.station_count.clamp(1, STATION_NAMES.len())
    }

    fn interval(&self) -> TimeRange {
        TimeRange::new(self.start_time_secs, self.start_time_secs + self.duration_secs.max(1.0))
    }
}

fn build_channels(station: &str, sample_rate_hz: f64) -> Vec<Channel> {
    ORIENTATIONS
        .iter()
        .map(|&orientation| Channel {
            name: format!("{station}.{station}.BH{orientation}"),
            station_name: station.to_string(),
            nominal_sample_rate_hz: sample_rate_hz,
            channel_group: station.to_string(),
            band_code: 'B',
            instrument_code: 'H',
            orientation_code: orientation,
        })
        .collect()
}

fn arrival_prediction(phase: &str, arrival: f64) -> FeaturePrediction {
    FeaturePrediction {
        phase: phase.into(),
        prediction_type: PredictionType::ArrivalTime,
        arrival_time: Some(arrival),
        standard_deviation: Some(1.0),
    }
}

fn build_detection(station: &str, index: usize, arrival: f64, rng: &mut StdRng) -> SignalDetection {
    let channel_name = format!("{station}.beam.SHZ/beam,fk,coherent");
    let measurement = |value| FeatureMeasurement {
        channel_name: channel_name.clone(),
        measured_channel_segment_id: Some(format!("{station}-{UNFILTERED}")),
        value,
    };
    let period = rng.gen_range(0.3..1.2);
    let id = format!("sd-{index}");
    SignalDetection {
        hypotheses: vec![SignalDetectionHypothesis {
            id: format!("{id}-h"),
            rejected: false,
            feature_measurements: vec![
                measurement(MeasurementValue::ArrivalTime {
                    value: Some(arrival),
                    standard_deviation: Some(rng.gen_range(0.05..0.5)),
                }),
                measurement(MeasurementValue::Phase { phase: "P".into() }),
                measurement(MeasurementValue::Amplitude {
                    kind: AmplitudeKind::A5Over2,
                    amplitude: rng.gen_range(0.5..5.0),
                    period,
                    start_time: arrival + rng.gen_range(0.0..1.0),
                }),
            ],
        }],
        id,
        station_name: station.to_string(),
    }
}

fn build_samples(
    channel_id: &str,
    interval: &TimeRange,
    arrival: f64,
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> SampleWindowPayload {
    let rate = config.sample_rate_hz.max(1.0);
    let length = (interval.duration() * rate) as usize + 1;
    let onset = ((arrival - interval.start_time_secs).max(0.0) * rate) as usize;
    let carrier = sine_wave(length, config.frequency, rate as f32);
    let envelope = arrival_envelope(length, onset, (rate * 20.0) as f32);
    let noise = config.noise.abs().max(f32::EPSILON);
    let values = carrier
        .iter()
        .zip(envelope.iter())
        .map(|(wave, env)| wave * env * 4.0 + rng.gen_range(-noise..noise))
        .collect();
    SampleWindowPayload {
        channel_id: channel_id.to_string(),
        channel_segment_id: format!("{channel_id}-{UNFILTERED}"),
        start_time_secs: interval.start_time_secs,
        sample_rate_hz: rate,
        values,
    }
}

/// Builds a deterministic scenario: one event, one P detection per station,
/// predictions, distances, unfiltered segments and sample data.
pub fn build_scenario(config: &GeneratorConfig) -> anyhow::Result<ScenarioPayload> {
    let interval = config.interval();
    let origin = interval.start_time_secs + config.origin_offset_secs;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut snapshot = DomainSnapshot {
        default_filters: vec![WaveformFilter::unfiltered()],
        ..Default::default()
    };
    let mut predictions = PredictionsByReceiver::new();
    let mut samples = Vec::new();
    let mut associated = Vec::new();

    for (index, station) in STATION_NAMES
        .iter()
        .take(config.normalized_station_count())
        .enumerate()
    {
        let degrees: f64 = rng.gen_range(1.0..90.0);
        let azimuth: f64 = rng.gen_range(0.0..360.0);
        let p_arrival = origin + degrees * P_SECS_PER_DEGREE;
        let observed = p_arrival + rng.gen_range(-1.5..1.5);
        let channels = build_channels(station, config.sample_rate_hz);

        snapshot.distances.push(LocationDistance {
            id: station.to_string(),
            distance_degrees: degrees,
            distance_km: degrees * 111.19,
            azimuth,
        });
        predictions.insert(
            station.to_string(),
            ReceiverPredictions {
                feature_predictions: vec![
                    arrival_prediction("P", p_arrival),
                    arrival_prediction("S", origin + degrees * S_SECS_PER_DEGREE),
                ],
            },
        );

        let detection = build_detection(station, index, observed, &mut rng);
        if let Some(hypothesis) = detection.current_hypothesis() {
            associated.push(hypothesis.id.clone());
        }
        snapshot.detections.push(detection);

        let mut segments = HashMap::new();
        for channel_id in std::iter::once(station.to_string()).chain(channels.iter().map(|c| c.name.clone())) {
            samples.push(build_samples(&channel_id, &interval, observed, config, &mut rng));
            segments.insert(
                channel_id.clone(),
                BTreeMap::from([(
                    UNFILTERED.to_string(),
                    vec![ChannelSegmentDescriptor {
                        id: format!("{channel_id}-{UNFILTERED}"),
                        start_time: interval.start_time_secs,
                        end_time: interval.end_time_secs,
                        is_selected: false,
                    }],
                )]),
            );
        }
        snapshot.channel_segments.extend(segments);

        if index % 3 == 2 {
            let first = channels
                .first()
                .context("generated station without channels")?;
            snapshot.qc_masks.push(QcMask {
                id: format!("mask-{index}"),
                channel_name: first.name.clone(),
                category: QcMaskCategory::WaveformQuality,
                start_time: observed - 30.0,
                end_time: observed - 10.0,
            });
        }
        snapshot.stations.push(Station {
            name: station.to_string(),
            channels,
        });
    }

    snapshot.events.push(Event {
        id: GENERATED_EVENT_ID.into(),
        preferred_hypothesis_id: format!("{GENERATED_EVENT_ID}-h"),
        hypotheses: vec![EventHypothesis {
            id: format!("{GENERATED_EVENT_ID}-h"),
            rejected: false,
            associated_detection_hypothesis_ids: associated,
        }],
    });
    snapshot
        .event_statuses
        .insert(GENERATED_EVENT_ID.into(), EventStatus::InProgress);
    snapshot.predictions = Some(predictions);

    Ok(ScenarioPayload {
        description: config.description.clone().or_else(|| config.scenario.clone()),
        snapshot,
        samples,
        visible_interval: Some(interval),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_one_detection_per_station() {
        let config = GeneratorConfig {
            station_count: 4,
            ..Default::default()
        };
        let scenario = build_scenario(&config).unwrap();
        let snapshot = &scenario.snapshot;
        assert_eq!(snapshot.stations.len(), 4);
        assert_eq!(snapshot.detections.len(), 4);
        assert_eq!(snapshot.distances.len(), 4);
        // station row plus three raw channels each
        assert_eq!(scenario.samples.len(), 16);
        assert_eq!(
            snapshot.events[0].hypotheses[0].associated_detection_hypothesis_ids.len(),
            4
        );
    }

    #[test]
    fn same_seed_reproduces_scenario() {
        let config = GeneratorConfig {
            seed: 13,
            station_count: 3,
            ..Default::default()
        };
        let first = build_scenario(&config).unwrap();
        let second = build_scenario(&config).unwrap();
        assert_eq!(first.snapshot, second.snapshot);
        assert_eq!(first.samples[0].values, second.samples[0].values);
    }
}

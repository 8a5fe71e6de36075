use serde::{Deserialize, Serialize};
use std::fmt;

/// Seismic phase label such as `P`, `Pn` or `Lg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(pub String);

impl Phase {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Phase {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmplitudeKind {
    A5Over2,
    ALrOver2,
}

/// Typed value carried by a feature measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeasurementValue {
    ArrivalTime {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default)]
        standard_deviation: Option<f64>,
    },
    Phase {
        phase: Phase,
    },
    Amplitude {
        kind: AmplitudeKind,
        amplitude: f64,
        period: f64,
        /// Trough time in epoch seconds.
        start_time: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMeasurement {
    pub channel_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_channel_segment_id: Option<String>,
    pub value: MeasurementValue,
}

/// Amplitude measurement resolved from a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeMeasurement {
    pub amplitude: f64,
    pub period: f64,
    pub trough_time: f64,
}

/// One version of a signal detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetectionHypothesis {
    pub id: String,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub feature_measurements: Vec<FeatureMeasurement>,
}

impl SignalDetectionHypothesis {
    /// Arrival time in epoch seconds, if one was measured.
    pub fn arrival_time(&self) -> Option<f64> {
        self.arrival_time_measurement()
            .and_then(|(value, _)| value)
            .filter(|value| value.is_finite())
    }

    pub fn arrival_time_uncertainty(&self) -> Option<f64> {
        self.arrival_time_measurement()
            .and_then(|(_, deviation)| deviation)
    }

    fn arrival_time_measurement(&self) -> Option<(Option<f64>, Option<f64>)> {
        self.feature_measurements
            .iter()
            .find_map(|measurement| match measurement.value {
                MeasurementValue::ArrivalTime {
                    value,
                    standard_deviation,
                } => Some((value, standard_deviation)),
                _ => None,
            })
    }

    /// Channel segment the arrival time was measured on.
    pub fn measured_channel_segment_id(&self) -> Option<&str> {
        self.feature_measurements
            .iter()
            .find(|measurement| matches!(measurement.value, MeasurementValue::ArrivalTime { .. }))
            .and_then(|measurement| measurement.measured_channel_segment_id.as_deref())
    }

    pub fn phase(&self) -> Option<&Phase> {
        self.feature_measurements
            .iter()
            .find_map(|measurement| match &measurement.value {
                MeasurementValue::Phase { phase } => Some(phase),
                _ => None,
            })
    }

    pub fn amplitude(&self, kind: AmplitudeKind) -> Option<AmplitudeMeasurement> {
        self.feature_measurements
            .iter()
            .find_map(|measurement| match measurement.value {
                MeasurementValue::Amplitude {
                    kind: measured,
                    amplitude,
                    period,
                    start_time,
                } if measured == kind => Some(AmplitudeMeasurement {
                    amplitude,
                    period,
                    trough_time: start_time,
                }),
                _ => None,
            })
    }
}

/// Analyst- or pipeline-produced pick of a signal arrival at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetection {
    pub id: String,
    pub station_name: String,
    pub hypotheses: Vec<SignalDetectionHypothesis>,
}

impl SignalDetection {
    /// Latest hypothesis; earlier entries have been superseded.
    pub fn current_hypothesis(&self) -> Option<&SignalDetectionHypothesis> {
        self.hypotheses.last()
    }

    pub fn arrival_time(&self) -> Option<f64> {
        self.current_hypothesis()
            .and_then(SignalDetectionHypothesis::arrival_time)
    }

    pub fn phase(&self) -> Option<&Phase> {
        self.current_hypothesis()
            .and_then(SignalDetectionHypothesis::phase)
    }

    /// Name of the channel the detection was made on, as recorded by its
    /// first feature measurement.
    pub fn channel_name(&self) -> Option<&str> {
        self.current_hypothesis()
            .and_then(|hypothesis| hypothesis.feature_measurements.first())
            .map(|measurement| measurement.channel_name.as_str())
    }

    pub fn is_rejected(&self) -> bool {
        self.current_hypothesis()
            .map(|hypothesis| hypothesis.rejected)
            .unwrap_or(false)
    }
}

/// Detections recorded at the named station.
pub fn detections_for_station<'a>(
    station_name: &str,
    detections: &'a [SignalDetection],
) -> Vec<&'a SignalDetection> {
    detections
        .iter()
        .filter(|detection| detection.station_name == station_name)
        .collect()
}
